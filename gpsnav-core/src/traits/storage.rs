//! Map storage

use alloc::vec::Vec;

use crate::map::MapDescriptor;

/// Trait for the map catalog source
pub trait MapSource {
    /// Storage error type
    type Error: core::fmt::Debug;

    /// Read every descriptor, in catalog order, unvalidated
    fn descriptors(&mut self) -> Result<Vec<MapDescriptor>, Self::Error>;

    /// Read the raw raster bytes of one map
    fn read_raster(&mut self, map: &MapDescriptor) -> Result<Vec<u8>, Self::Error>;
}
