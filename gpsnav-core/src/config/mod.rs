//! Configuration types
//!
//! Board-agnostic configuration structures. The application reads them
//! from a TOML file; every field has a default matching the reference
//! board (Raspberry Pi, 1.8" ST7735 panel, five buttons, NEO-6 receiver).

pub mod types;

pub use types::*;
