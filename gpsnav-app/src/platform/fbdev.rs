//! Linux framebuffer panel
//!
//! The panel driver exposes the TFT as an fbdev node taking RGB565
//! words, little-endian, row-major. A shadow copy of the screen backs
//! direct drawing, so every panel write is a full-frame write.

use std::convert::Infallible;
use std::fs::{File, OpenOptions};
use std::io::{self, Seek, SeekFrom, Write};

use embedded_graphics::mono_font::ascii::FONT_5X8;
use embedded_graphics::mono_font::MonoTextStyle;
use embedded_graphics::pixelcolor::BinaryColor;
use embedded_graphics::prelude::*;
use embedded_graphics::text::{Baseline, Text};
use gpsnav_core::config::DisplayConfig;
use gpsnav_display::{DisplayError, DisplaySurface, FrameBuffer, Glyph, Rgb565, Target};
use log::error;

/// fbdev display surface
pub struct FramebufferSurface<W = File> {
    device: W,
    shadow: FrameBuffer,
    /// Unscaled glyph cell
    cell_width: u16,
    cell_height: u16,
    bytes: Vec<u8>,
}

impl FramebufferSurface<File> {
    /// Open the configured framebuffer device
    pub fn open(config: &DisplayConfig) -> io::Result<Self> {
        let device = OpenOptions::new()
            .write(true)
            .open(config.device.as_str())?;
        Ok(Self::new(device, config))
    }
}

impl<W: Write + Seek> FramebufferSurface<W> {
    pub fn new(device: W, config: &DisplayConfig) -> Self {
        let background = config.background.rgb565();
        Self {
            device,
            shadow: FrameBuffer::new(config.width, config.height, background),
            cell_width: config.glyph_width,
            cell_height: config.glyph_height,
            bytes: Vec::with_capacity(config.width as usize * config.height as usize * 2),
        }
    }

    #[cfg(test)]
    fn into_inner(self) -> W {
        self.device
    }

    fn write_out(&mut self) -> Result<(), DisplayError> {
        self.bytes.clear();
        for pixel in self.shadow.pixels() {
            self.bytes.extend_from_slice(&pixel.raw().to_le_bytes());
        }

        self.device
            .seek(SeekFrom::Start(0))
            .and_then(|_| self.device.write_all(&self.bytes))
            .and_then(|_| self.device.flush())
            .map_err(|err| {
                error!("framebuffer write failed: {}", err);
                DisplayError::Communication
            })
    }
}

impl<W: Write + Seek> DisplaySurface for FramebufferSurface<W> {
    fn blit_glyph(
        &mut self,
        target: Target<'_>,
        x: u16,
        y: u16,
        glyph: &Glyph,
    ) -> Result<(), DisplayError> {
        let cell = (self.cell_width, self.cell_height);
        match target {
            Target::Buffer(buffer) => {
                draw_glyph(buffer, x, y, glyph, cell);
                Ok(())
            }
            Target::Panel => {
                draw_glyph(&mut self.shadow, x, y, glyph, cell);
                self.write_out()
            }
        }
    }

    fn fill(&mut self, target: Target<'_>, color: Rgb565) -> Result<(), DisplayError> {
        match target {
            Target::Buffer(buffer) => {
                buffer.fill(color);
                Ok(())
            }
            Target::Panel => {
                self.shadow.fill(color);
                self.write_out()
            }
        }
    }

    fn push(&mut self, buffer: &FrameBuffer) -> Result<(), DisplayError> {
        if buffer.width() != self.shadow.width() || buffer.height() != self.shadow.height() {
            return Err(DisplayError::SizeMismatch);
        }
        self.shadow.pixels_mut().copy_from_slice(buffer.pixels());
        self.write_out()
    }

    fn pixel_dimensions(&self) -> (u16, u16) {
        (self.shadow.width(), self.shadow.height())
    }
}

/// Rasterize one character cell into `buffer`
fn draw_glyph(buffer: &mut FrameBuffer, x: u16, y: u16, glyph: &Glyph, cell: (u16, u16)) {
    let scale = glyph.scale.max(1) as u16;

    if !glyph.transparent {
        for dy in 0..cell.1.saturating_mul(scale) {
            for dx in 0..cell.0.saturating_mul(scale) {
                buffer.set_pixel(x.saturating_add(dx), y.saturating_add(dy), glyph.background);
            }
        }
    }

    let ch = glyph.code as char;
    if !ch.is_ascii_graphic() {
        return;
    }
    let mut utf8 = [0u8; 4];
    let text = ch.encode_utf8(&mut utf8);

    let mut target = ScaledCell {
        buffer,
        x,
        y,
        scale,
        color: glyph.foreground,
    };
    let style = MonoTextStyle::new(&FONT_5X8, BinaryColor::On);
    let _ = Text::with_baseline(text, Point::zero(), style, Baseline::Top).draw(&mut target);
}

/// Draw target that paints lit font pixels as `scale`-sized blocks
struct ScaledCell<'a> {
    buffer: &'a mut FrameBuffer,
    x: u16,
    y: u16,
    scale: u16,
    color: Rgb565,
}

impl OriginDimensions for ScaledCell<'_> {
    fn size(&self) -> Size {
        Size::new(self.buffer.width() as u32, self.buffer.height() as u32)
    }
}

impl DrawTarget for ScaledCell<'_> {
    type Color = BinaryColor;
    type Error = Infallible;

    fn draw_iter<I>(&mut self, pixels: I) -> Result<(), Self::Error>
    where
        I: IntoIterator<Item = Pixel<Self::Color>>,
    {
        for Pixel(point, color) in pixels {
            if color != BinaryColor::On {
                continue;
            }
            let (Ok(px), Ok(py)) = (u16::try_from(point.x), u16::try_from(point.y)) else {
                continue;
            };
            let left = self.x.saturating_add(px.saturating_mul(self.scale));
            let top = self.y.saturating_add(py.saturating_mul(self.scale));
            for dy in 0..self.scale {
                for dx in 0..self.scale {
                    self.buffer
                        .set_pixel(left.saturating_add(dx), top.saturating_add(dy), self.color);
                }
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;

    fn surface() -> FramebufferSurface<Cursor<Vec<u8>>> {
        FramebufferSurface::new(Cursor::new(Vec::new()), &DisplayConfig::default())
    }

    fn glyph(code: u8, scale: u8, transparent: bool) -> Glyph {
        Glyph {
            code,
            foreground: Rgb565::WHITE,
            background: Rgb565::BLUE,
            scale,
            transparent,
        }
    }

    fn cell_pixels(buffer: &FrameBuffer, width: u16, height: u16) -> Vec<Rgb565> {
        (0..height)
            .flat_map(|y| (0..width).map(move |x| (x, y)))
            .filter_map(|(x, y)| buffer.pixel(x, y))
            .collect()
    }

    #[test]
    fn test_push_writes_little_endian_frame() {
        let mut surface = surface();
        let buffer = FrameBuffer::new(160, 128, Rgb565::RED);
        surface.push(&buffer).unwrap();

        let bytes = surface.into_inner().into_inner();
        assert_eq!(bytes.len(), 160 * 128 * 2);
        assert_eq!(&bytes[..4], &[0x00, 0xF8, 0x00, 0xF8]);
    }

    #[test]
    fn test_push_rejects_wrong_size() {
        let mut surface = surface();
        let buffer = FrameBuffer::new(128, 128, Rgb565::RED);
        assert_eq!(surface.push(&buffer), Err(DisplayError::SizeMismatch));
    }

    #[test]
    fn test_panel_writes_overwrite_frame() {
        let mut surface = surface();
        surface.fill(Target::Panel, Rgb565::GREEN).unwrap();
        surface.fill(Target::Panel, Rgb565::BLUE).unwrap();

        let bytes = surface.into_inner().into_inner();
        assert_eq!(bytes.len(), 160 * 128 * 2);
        assert_eq!(&bytes[..2], &[0x1F, 0x00]);
    }

    #[test]
    fn test_buffer_fill_leaves_panel_alone() {
        let mut surface = surface();
        let mut buffer = FrameBuffer::new(160, 128, Rgb565::BLACK);
        surface.fill(Target::Buffer(&mut buffer), Rgb565::CYAN).unwrap();

        assert!(buffer.pixels().iter().all(|&p| p == Rgb565::CYAN));
        assert!(surface.into_inner().into_inner().is_empty());
    }

    #[test]
    fn test_opaque_glyph_fills_cell() {
        let mut surface = surface();
        let mut buffer = FrameBuffer::new(160, 128, Rgb565::BLACK);
        surface
            .blit_glyph(Target::Buffer(&mut buffer), 0, 0, &glyph(b'A', 1, false))
            .unwrap();

        let cell = cell_pixels(&buffer, 6, 8);
        assert!(cell.contains(&Rgb565::WHITE));
        assert!(cell.contains(&Rgb565::BLUE));
        assert!(!cell.contains(&Rgb565::BLACK));
        // Nothing outside the cell
        assert_eq!(buffer.pixel(6, 0), Some(Rgb565::BLACK));
        assert_eq!(buffer.pixel(0, 8), Some(Rgb565::BLACK));
    }

    #[test]
    fn test_transparent_glyph_keeps_background() {
        let mut surface = surface();
        let mut buffer = FrameBuffer::new(160, 128, Rgb565::BLACK);
        surface
            .blit_glyph(Target::Buffer(&mut buffer), 0, 0, &glyph(b'A', 1, true))
            .unwrap();

        let cell = cell_pixels(&buffer, 6, 8);
        assert!(cell.contains(&Rgb565::WHITE));
        assert!(!cell.contains(&Rgb565::BLUE));
    }

    #[test]
    fn test_space_is_background_only() {
        let mut surface = surface();
        let mut buffer = FrameBuffer::new(160, 128, Rgb565::BLACK);
        surface
            .blit_glyph(Target::Buffer(&mut buffer), 6, 8, &glyph(b' ', 1, false))
            .unwrap();

        assert_eq!(buffer.pixel(6, 8), Some(Rgb565::BLUE));
        assert_eq!(buffer.pixel(11, 15), Some(Rgb565::BLUE));
        assert_eq!(buffer.pixel(12, 8), Some(Rgb565::BLACK));
    }

    #[test]
    fn test_scaled_glyph_covers_scaled_cell() {
        let mut surface = surface();
        let mut buffer = FrameBuffer::new(160, 128, Rgb565::BLACK);
        surface
            .blit_glyph(Target::Buffer(&mut buffer), 0, 0, &glyph(b'#', 2, false))
            .unwrap();

        assert!(!cell_pixels(&buffer, 12, 16).contains(&Rgb565::BLACK));
        assert_eq!(buffer.pixel(12, 0), Some(Rgb565::BLACK));
        assert_eq!(buffer.pixel(0, 16), Some(Rgb565::BLACK));
    }

    #[test]
    fn test_glyph_at_edge_is_clipped() {
        let mut surface = surface();
        let mut buffer = FrameBuffer::new(160, 128, Rgb565::BLACK);
        surface
            .blit_glyph(Target::Buffer(&mut buffer), 157, 124, &glyph(b'W', 3, false))
            .unwrap();
        assert_ne!(buffer.pixel(159, 127), Some(Rgb565::BLACK));
        assert_eq!(buffer.pixel(156, 127), Some(Rgb565::BLACK));
    }
}
