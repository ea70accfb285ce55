//! Board-agnostic core logic for the GPS navigator
//!
//! This crate contains all application logic that does not depend on
//! specific hardware implementations:
//!
//! - Capability traits (button source, byte stream, map source)
//! - Position model fused from NMEA fix data
//! - Map catalog, raster decoding and the rotated map projection
//! - Navigation state machine and main menu
//! - Configuration type definitions

#![no_std]
#![deny(unsafe_code)]

extern crate alloc;

#[cfg(test)]
extern crate std;

pub mod config;
pub mod map;
pub mod position;
pub mod state;
pub mod traits;

pub use position::{parse_sentence, FixResult, Position};
