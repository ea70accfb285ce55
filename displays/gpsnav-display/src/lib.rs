//! Display abstraction and text console for gpsnav
//!
//! This crate provides:
//! - `Rgb565` pixel type and the 8-color ANSI palette
//! - `FrameBuffer`, an off-screen pixel buffer pushed to the panel in one go
//! - `DisplaySurface` trait implemented by panel drivers
//! - `Terminal`, a VT100-subset interpreter that turns text with escape
//!   sequences into cursor-addressed glyph blits
//!
//! # Architecture
//!
//! Drawing goes either straight to the panel or into a `FrameBuffer`
//! selected per call through `Target`. The navigator composes every
//! screen in a buffer and pushes it once per update.

#![no_std]

extern crate alloc;

#[cfg(test)]
extern crate std;

pub mod backend;
pub mod color;
pub mod framebuffer;
pub mod terminal;

// Re-export key types
pub use backend::{Canvas, DisplayError, DisplaySurface, Glyph, Target};
pub use color::Rgb565;
pub use framebuffer::FrameBuffer;
pub use terminal::{Cursor, Terminal, TerminalConfig};
