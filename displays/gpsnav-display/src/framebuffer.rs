//! Off-screen pixel buffer

use alloc::vec;
use alloc::vec::Vec;

use crate::color::Rgb565;

/// Row-major RGB565 buffer the size of the panel
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FrameBuffer {
    width: u16,
    height: u16,
    pixels: Vec<Rgb565>,
}

impl FrameBuffer {
    /// Allocate a buffer filled with `color`
    pub fn new(width: u16, height: u16, color: Rgb565) -> Self {
        Self {
            width,
            height,
            pixels: vec![color; width as usize * height as usize],
        }
    }

    pub fn width(&self) -> u16 {
        self.width
    }

    pub fn height(&self) -> u16 {
        self.height
    }

    /// Overwrite every pixel
    pub fn fill(&mut self, color: Rgb565) {
        self.pixels.fill(color);
    }

    /// Pixel at `(x, y)`, `None` off the edge
    pub fn pixel(&self, x: u16, y: u16) -> Option<Rgb565> {
        self.index(x, y).map(|index| self.pixels[index])
    }

    /// Set pixel at `(x, y)`; writes off the edge are clipped
    pub fn set_pixel(&mut self, x: u16, y: u16, color: Rgb565) {
        if let Some(index) = self.index(x, y) {
            self.pixels[index] = color;
        }
    }

    /// All pixels, row-major
    pub fn pixels(&self) -> &[Rgb565] {
        &self.pixels
    }

    /// All pixels, row-major
    pub fn pixels_mut(&mut self) -> &mut [Rgb565] {
        &mut self.pixels
    }

    #[cfg(test)]
    fn row(&self, y: u16) -> &[Rgb565] {
        let start = y as usize * self.width as usize;
        &self.pixels[start..start + self.width as usize]
    }

    fn index(&self, x: u16, y: u16) -> Option<usize> {
        (x < self.width && y < self.height).then(|| y as usize * self.width as usize + x as usize)
    }
}
