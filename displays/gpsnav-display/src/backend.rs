//! Display surface trait
//!
//! Defines the interface panel drivers implement.

use core::fmt;

use crate::color::Rgb565;
use crate::framebuffer::FrameBuffer;

/// Display surface errors
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum DisplayError {
    /// Bus or device write failed
    Communication,
    /// Coordinates outside the surface
    InvalidCoordinates,
    /// Display not initialized
    NotInitialized,
    /// Buffer dimensions differ from the panel
    SizeMismatch,
}

impl fmt::Display for DisplayError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let text = match self {
            Self::Communication => "display write failed",
            Self::InvalidCoordinates => "coordinates outside display",
            Self::NotInitialized => "display not initialized",
            Self::SizeMismatch => "frame buffer does not match display size",
        };
        f.write_str(text)
    }
}

/// Where a drawing call lands
#[derive(Debug)]
pub enum Target<'a> {
    /// Straight to the physical panel
    Panel,
    /// Into an off-screen buffer, visible after `push`
    Buffer(&'a mut FrameBuffer),
}

/// One character cell to draw
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct Glyph {
    /// Font index (ASCII for printable characters)
    pub code: u8,
    pub foreground: Rgb565,
    pub background: Rgb565,
    /// Integer magnification, 1 = native font size
    pub scale: u8,
    /// Leave background pixels untouched
    pub transparent: bool,
}

/// Display surface trait
///
/// Provides a hardware-agnostic interface for glyph and buffer output.
/// Implementations own the font and the bus to the panel.
pub trait DisplaySurface {
    /// Draw one glyph with its top-left corner at pixel `(x, y)`
    fn blit_glyph(
        &mut self,
        target: Target<'_>,
        x: u16,
        y: u16,
        glyph: &Glyph,
    ) -> Result<(), DisplayError>;

    /// Fill the whole target with one color
    fn fill(&mut self, target: Target<'_>, color: Rgb565) -> Result<(), DisplayError>;

    /// Copy a complete buffer to the panel
    fn push(&mut self, buffer: &FrameBuffer) -> Result<(), DisplayError>;

    /// Panel size in pixels (width, height)
    fn pixel_dimensions(&self) -> (u16, u16);
}

impl<T: DisplaySurface + ?Sized> DisplaySurface for &mut T {
    fn blit_glyph(
        &mut self,
        target: Target<'_>,
        x: u16,
        y: u16,
        glyph: &Glyph,
    ) -> Result<(), DisplayError> {
        (**self).blit_glyph(target, x, y, glyph)
    }

    fn fill(&mut self, target: Target<'_>, color: Rgb565) -> Result<(), DisplayError> {
        (**self).fill(target, color)
    }

    fn push(&mut self, buffer: &FrameBuffer) -> Result<(), DisplayError> {
        (**self).push(buffer)
    }

    fn pixel_dimensions(&self) -> (u16, u16) {
        (**self).pixel_dimensions()
    }
}

/// A surface bound to one drawing target
///
/// Bundles the surface, the optional off-screen buffer and the
/// transparency mode so text rendering does not have to thread all
/// three through every call.
pub struct Canvas<'a, S: ?Sized> {
    surface: &'a mut S,
    buffer: Option<&'a mut FrameBuffer>,
    transparent: bool,
}

impl<'a, S: DisplaySurface + ?Sized> Canvas<'a, S> {
    /// Draw directly on the panel
    pub fn panel(surface: &'a mut S) -> Self {
        Self {
            surface,
            buffer: None,
            transparent: false,
        }
    }

    /// Draw into `buffer`; call `present` to show it
    pub fn buffered(surface: &'a mut S, buffer: &'a mut FrameBuffer) -> Self {
        Self {
            surface,
            buffer: Some(buffer),
            transparent: false,
        }
    }

    /// Draw glyphs without their background pixels
    pub fn with_transparency(mut self, transparent: bool) -> Self {
        self.transparent = transparent;
        self
    }

    /// Blit one glyph using the canvas transparency mode
    pub fn glyph(
        &mut self,
        x: u16,
        y: u16,
        code: u8,
        foreground: Rgb565,
        background: Rgb565,
        scale: u8,
    ) -> Result<(), DisplayError> {
        let glyph = Glyph {
            code,
            foreground,
            background,
            scale,
            transparent: self.transparent,
        };
        let target = match self.buffer.as_deref_mut() {
            Some(buffer) => Target::Buffer(buffer),
            None => Target::Panel,
        };
        self.surface.blit_glyph(target, x, y, &glyph)
    }

    /// Fill the whole target
    pub fn fill(&mut self, color: Rgb565) -> Result<(), DisplayError> {
        let target = match self.buffer.as_deref_mut() {
            Some(buffer) => Target::Buffer(buffer),
            None => Target::Panel,
        };
        self.surface.fill(target, color)
    }

    /// Push the buffer to the panel; no-op when drawing directly
    pub fn present(&mut self) -> Result<(), DisplayError> {
        match self.buffer.as_deref() {
            Some(buffer) => self.surface.push(buffer),
            None => Ok(()),
        }
    }
}
