//! Geo-referenced map images
//!
//! A map is a raw RGB565 raster plus the lat/long of its top-left and
//! bottom-right corners. The catalog is built once at startup and never
//! changes; at most one raster is held in memory at a time.

pub mod projection;

use alloc::vec::Vec;
use core::fmt;

use gpsnav_display::Rgb565;
use heapless::String;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

pub use projection::project;

/// Maximum raster file name length
pub const MAX_FILE_NAME_LEN: usize = 64;

/// Bytes per raster pixel
pub const BYTES_PER_PIXEL: usize = 2;

/// Errors from catalog validation and raster decoding
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum MapError {
    /// Width or height is zero
    EmptyRaster,
    /// Corners do not form a north-west / south-east rectangle
    InvertedBounds,
    /// Raster byte count differs from `width * height * 2`
    RasterSize { expected: usize, actual: usize },
    /// `width * height * 2` does not fit in memory addresses
    RasterTooLarge,
}

impl fmt::Display for MapError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::EmptyRaster => write!(f, "map has zero width or height"),
            Self::InvertedBounds => write!(f, "top-left corner is not north-west of bottom-right"),
            Self::RasterSize { expected, actual } => {
                write!(f, "raster is {} bytes, expected {}", actual, expected)
            }
            Self::RasterTooLarge => write!(f, "raster dimensions overflow the address space"),
        }
    }
}

/// A point in signed decimal degrees
#[derive(Debug, Clone, Copy, Default, PartialEq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct GeoPoint {
    pub latitude: f64,
    pub longitude: f64,
}

/// One entry of the map catalog
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct MapDescriptor {
    /// Raster file, relative to the map directory
    pub file: String<MAX_FILE_NAME_LEN>,
    /// Raster width in pixels
    pub width: u32,
    /// Raster height in pixels
    pub height: u32,
    /// North-west corner
    pub top_left: GeoPoint,
    /// South-east corner
    pub bottom_right: GeoPoint,
}

impl MapDescriptor {
    /// Check size and corner ordering
    pub fn validate(&self) -> Result<(), MapError> {
        if self.width == 0 || self.height == 0 {
            return Err(MapError::EmptyRaster);
        }
        if self.top_left.latitude <= self.bottom_right.latitude
            || self.top_left.longitude >= self.bottom_right.longitude
        {
            return Err(MapError::InvertedBounds);
        }
        if self.raster_len().is_none() {
            return Err(MapError::RasterTooLarge);
        }
        Ok(())
    }

    /// Whether the point lies inside the box, edges included
    pub fn contains(&self, latitude: f64, longitude: f64) -> bool {
        latitude <= self.top_left.latitude
            && latitude >= self.bottom_right.latitude
            && longitude >= self.top_left.longitude
            && longitude <= self.bottom_right.longitude
    }

    /// Expected raster size in bytes, `None` on overflow
    pub fn raster_len(&self) -> Option<usize> {
        usize::try_from(self.width)
            .ok()?
            .checked_mul(usize::try_from(self.height).ok()?)?
            .checked_mul(BYTES_PER_PIXEL)
    }
}

/// Ordered, validated list of maps
#[derive(Debug, Clone, Default, PartialEq)]
pub struct MapCatalog {
    maps: Vec<MapDescriptor>,
}

impl MapCatalog {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a descriptor if it is valid
    pub fn try_push(&mut self, map: MapDescriptor) -> Result<(), MapError> {
        map.validate()?;
        self.maps.push(map);
        Ok(())
    }

    pub fn len(&self) -> usize {
        self.maps.len()
    }

    pub fn is_empty(&self) -> bool {
        self.maps.is_empty()
    }

    pub fn get(&self, index: usize) -> Option<&MapDescriptor> {
        self.maps.get(index)
    }

    pub fn iter(&self) -> impl Iterator<Item = &MapDescriptor> {
        self.maps.iter()
    }

    /// Index of the first map containing the point
    ///
    /// Catalog order breaks ties on shared edges.
    pub fn find(&self, latitude: f64, longitude: f64) -> Option<usize> {
        self.maps
            .iter()
            .position(|map| map.contains(latitude, longitude))
    }
}

/// Decode a raw raster: row-major, top row first, big-endian RGB565 words
pub fn decode_raster(map: &MapDescriptor, bytes: &[u8]) -> Result<Vec<Rgb565>, MapError> {
    let expected = map.raster_len().ok_or(MapError::RasterTooLarge)?;
    if bytes.len() != expected {
        return Err(MapError::RasterSize {
            expected,
            actual: bytes.len(),
        });
    }

    Ok(bytes
        .chunks_exact(BYTES_PER_PIXEL)
        .map(|word| Rgb565::from_be_bytes([word[0], word[1]]))
        .collect())
}

/// The one raster currently held in memory
#[derive(Debug, Clone, PartialEq)]
pub struct LoadedMap {
    /// Catalog index of the map
    pub index: usize,
    pub pixels: Vec<Rgb565>,
}
