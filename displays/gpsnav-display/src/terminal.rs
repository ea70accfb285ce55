//! VT100 text console
//!
//! Interprets a byte stream containing a subset of VT100 escape
//! sequences and renders it as a grid of glyph cells on a
//! `DisplaySurface`. Rows and columns are 0-based.
//!
//! Supported sequences (`n`/`m` are decimal parameters):
//!
//! | Sequence        | Effect                                        |
//! |-----------------|-----------------------------------------------|
//! | `ESC[7h/7l`     | line wrap on / off                            |
//! | `ESC[r;cH/f`    | cursor to row `r`, column `c`; bare = home    |
//! | `ESC[nA/B/C/D`  | cursor up / down / forward / back (default 1) |
//! | `ESC[s` `ESC[u` | save / restore cursor                         |
//! | `ESC[K/1K/2K`   | erase to end / from start / whole line        |
//! | `ESC[2J`        | clear screen, home cursor                     |
//! | `ESC[n;mm`      | SGR colors, 30-37 foreground, 40-47 background|
//!
//! Anything else is dropped. Malformed input never fails; it can only
//! put glyphs in odd places.

use core::fmt::{self, Write};

use heapless::String;

use crate::backend::{Canvas, DisplayError, DisplaySurface};
use crate::color::Rgb565;

const ESC: u8 = 0x1B;
const CR: u8 = b'\r';
const LF: u8 = b'\n';
const BS: u8 = 0x08;
const SPACE: u8 = b' ';

/// Capacity of the parameter accumulator between `ESC[` and the command letter
pub const PARAMS_LEN: usize = 32;

/// Longest formatted line accepted by `Terminal::print`
pub const LINE_LEN: usize = 80;

/// Static terminal geometry and initial colors
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct TerminalConfig {
    /// Panel width in pixels
    pub width: u16,
    /// Panel height in pixels
    pub height: u16,
    /// Unscaled glyph cell width
    pub glyph_width: u16,
    /// Unscaled glyph cell height
    pub glyph_height: u16,
    pub scale: u8,
    pub foreground: Rgb565,
    pub background: Rgb565,
}

impl Default for TerminalConfig {
    fn default() -> Self {
        Self {
            width: 160,
            height: 128,
            glyph_width: 6,
            glyph_height: 8,
            scale: 1,
            foreground: Rgb565::WHITE,
            background: Rgb565::BLACK,
        }
    }
}

/// Cursor position in character cells
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct Cursor {
    pub row: u16,
    pub col: u16,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum EscapeState {
    /// Ordinary character emission
    Ground,
    /// Just consumed ESC
    EscapeSeen,
    /// Inside `ESC[`, collecting parameters
    InSequence,
}

/// VT100 interpreter state
#[derive(Debug, Clone)]
pub struct Terminal {
    rows: u16,
    cols: u16,
    cell_width: u16,
    cell_height: u16,
    scale: u8,
    cursor: Cursor,
    saved: Cursor,
    foreground: Rgb565,
    background: Rgb565,
    line_wrap: bool,
    state: EscapeState,
    params: String<PARAMS_LEN>,
}

impl Terminal {
    /// Create a terminal covering the configured panel
    ///
    /// Always has at least one row and one column, even if the scaled
    /// glyph is larger than the panel.
    pub fn new(config: TerminalConfig) -> Self {
        let scale = config.scale.max(1);
        let cell_width = config.glyph_width.max(1).saturating_mul(scale as u16);
        let cell_height = config.glyph_height.max(1).saturating_mul(scale as u16);

        Self {
            rows: (config.height / cell_height).max(1),
            cols: (config.width / cell_width).max(1),
            cell_width,
            cell_height,
            scale,
            cursor: Cursor::default(),
            saved: Cursor::default(),
            foreground: config.foreground,
            background: config.background,
            line_wrap: false,
            state: EscapeState::Ground,
            params: String::new(),
        }
    }

    pub fn rows(&self) -> u16 {
        self.rows
    }

    pub fn cols(&self) -> u16 {
        self.cols
    }

    pub fn cursor(&self) -> Cursor {
        self.cursor
    }

    pub fn foreground(&self) -> Rgb565 {
        self.foreground
    }

    pub fn background(&self) -> Rgb565 {
        self.background
    }

    pub fn line_wrap(&self) -> bool {
        self.line_wrap
    }

    /// Pixel position of the top-left corner of a cell
    pub fn cell_origin(&self, cursor: Cursor) -> (u16, u16) {
        (
            cursor.col.saturating_mul(self.cell_width),
            cursor.row.saturating_mul(self.cell_height),
        )
    }

    /// Interpret one byte
    pub fn feed<S: DisplaySurface + ?Sized>(
        &mut self,
        canvas: &mut Canvas<'_, S>,
        byte: u8,
    ) -> Result<(), DisplayError> {
        match self.state {
            EscapeState::Ground => {
                if byte == ESC {
                    self.state = EscapeState::EscapeSeen;
                    Ok(())
                } else {
                    self.emit(canvas, byte)
                }
            }
            EscapeState::EscapeSeen => {
                if byte == b'[' {
                    self.params.clear();
                    self.state = EscapeState::InSequence;
                } else {
                    self.state = EscapeState::Ground;
                }
                Ok(())
            }
            EscapeState::InSequence => {
                if byte.is_ascii_digit() || byte == b';' {
                    // Overflowing the accumulator drops the extra characters
                    let _ = self.params.push(byte as char);
                    Ok(())
                } else {
                    self.state = EscapeState::Ground;
                    self.execute(canvas, byte)
                }
            }
        }
    }

    /// Interpret every byte of `text`
    pub fn write_str<S: DisplaySurface + ?Sized>(
        &mut self,
        canvas: &mut Canvas<'_, S>,
        text: &str,
    ) -> Result<(), DisplayError> {
        text.bytes().try_for_each(|byte| self.feed(canvas, byte))
    }

    /// Format into a line buffer and interpret it
    ///
    /// Output past `LINE_LEN` characters is truncated.
    pub fn print<S: DisplaySurface + ?Sized>(
        &mut self,
        canvas: &mut Canvas<'_, S>,
        args: fmt::Arguments<'_>,
    ) -> Result<(), DisplayError> {
        let mut line = Truncating::<LINE_LEN>::new();
        let _ = line.write_fmt(args);
        self.write_str(canvas, &line.line)
    }

    fn emit<S: DisplaySurface + ?Sized>(
        &mut self,
        canvas: &mut Canvas<'_, S>,
        byte: u8,
    ) -> Result<(), DisplayError> {
        match byte {
            CR => self.cursor.col = 0,
            LF => self.cursor.row = (self.cursor.row + 1).min(self.rows - 1),
            BS => self.cursor.col = self.cursor.col.saturating_sub(1),
            _ => {
                self.draw_cell(canvas, self.cursor, byte)?;
                self.advance();
            }
        }
        Ok(())
    }

    fn advance(&mut self) {
        if self.cursor.col + 1 < self.cols {
            self.cursor.col += 1;
        } else if self.line_wrap {
            self.cursor.col = 0;
            self.cursor.row = (self.cursor.row + 1).min(self.rows - 1);
        }
    }

    fn draw_cell<S: DisplaySurface + ?Sized>(
        &self,
        canvas: &mut Canvas<'_, S>,
        cell: Cursor,
        code: u8,
    ) -> Result<(), DisplayError> {
        let (x, y) = self.cell_origin(cell);
        canvas.glyph(x, y, code, self.foreground, self.background, self.scale)
    }

    /// Up to two parameters; `None` marks an absent one, distinct from 0
    fn parameters(&self) -> (Option<u16>, Option<u16>) {
        let mut fields = self.params.split(';').map(parse_param);
        let first = fields.next().flatten();
        let second = fields.next().flatten();
        (first, second)
    }

    fn execute<S: DisplaySurface + ?Sized>(
        &mut self,
        canvas: &mut Canvas<'_, S>,
        command: u8,
    ) -> Result<(), DisplayError> {
        let (first, second) = self.parameters();
        let count = first.unwrap_or(1);

        match command {
            b'h' if first == Some(7) => self.line_wrap = true,
            b'l' if first == Some(7) => self.line_wrap = false,
            b'H' | b'f' => match (first, second) {
                (None, None) => self.cursor = Cursor::default(),
                (row, col) => {
                    if let Some(row) = row {
                        self.cursor.row = row.min(self.rows - 1);
                    }
                    if let Some(col) = col {
                        self.cursor.col = col.min(self.cols - 1);
                    }
                }
            },
            b'A' => self.cursor.row = self.cursor.row.saturating_sub(count),
            b'B' => self.cursor.row = self.cursor.row.saturating_add(count).min(self.rows - 1),
            b'C' => self.cursor.col = self.cursor.col.saturating_add(count).min(self.cols - 1),
            b'D' => self.cursor.col = self.cursor.col.saturating_sub(count),
            b's' => self.saved = self.cursor,
            b'u' => self.cursor = self.saved,
            b'K' => {
                let (start, end) = match first {
                    Some(1) => (0, self.cursor.col),
                    Some(2) => (0, self.cols),
                    _ => (self.cursor.col, self.cols),
                };
                let row = self.cursor.row;
                for col in start..end {
                    self.draw_cell(canvas, Cursor { row, col }, SPACE)?;
                }
            }
            // Erase up / erase down (`J`, `1J`) are not implemented
            b'J' if first == Some(2) => {
                canvas.fill(self.background)?;
                canvas.present()?;
                self.cursor = Cursor::default();
            }
            b'm' => {
                self.apply_sgr(first);
                self.apply_sgr(second);
            }
            _other => {
                #[cfg(feature = "log")]
                log::debug!(
                    "dropped escape sequence ESC[{}{}",
                    self.params,
                    _other as char
                );
            }
        }
        Ok(())
    }

    fn apply_sgr(&mut self, param: Option<u16>) {
        match param {
            Some(code @ 30..=37) => self.foreground = Rgb565::ANSI[(code - 30) as usize],
            Some(code @ 40..=47) => self.background = Rgb565::ANSI[(code - 40) as usize],
            _ => {}
        }
    }
}

/// Digits to a saturating count; empty means absent
fn parse_param(text: &str) -> Option<u16> {
    if text.is_empty() {
        return None;
    }
    Some(text.bytes().fold(0u16, |acc, digit| {
        acc.saturating_mul(10).saturating_add((digit - b'0') as u16)
    }))
}

/// `fmt::Write` adapter that keeps what fits and drops the rest
///
/// An escape sequence cut off at the limit is dropped whole, so the
/// interpreter never ends a line stuck inside a sequence.
struct Truncating<const N: usize> {
    line: String<N>,
    cut: bool,
}

impl<const N: usize> Truncating<N> {
    fn new() -> Self {
        Self {
            line: String::new(),
            cut: false,
        }
    }

    fn drop_open_sequence(&mut self) {
        if let Some(start) = self.line.rfind(ESC as char) {
            let open = self.line[start + 1..]
                .bytes()
                .all(|byte| byte == b'[' || byte == b';' || byte.is_ascii_digit());
            if open {
                self.line.truncate(start);
            }
        }
    }
}

impl<const N: usize> Write for Truncating<N> {
    fn write_str(&mut self, text: &str) -> fmt::Result {
        if self.cut {
            return Ok(());
        }
        for ch in text.chars() {
            if self.line.push(ch).is_err() {
                self.cut = true;
                self.drop_open_sequence();
                break;
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::backend::{Glyph, Target};
    use crate::framebuffer::FrameBuffer;
    use proptest::prelude::*;
    use std::vec::Vec;

    #[derive(Debug, Clone, Copy, PartialEq)]
    enum Call {
        Glyph { x: u16, y: u16, glyph: Glyph, buffered: bool },
        Fill { color: Rgb565, buffered: bool },
        Push,
    }

    #[derive(Default)]
    struct RecordingSurface {
        calls: Vec<Call>,
    }

    impl RecordingSurface {
        fn glyphs(&self) -> Vec<(u16, u16, u8)> {
            self.calls
                .iter()
                .filter_map(|call| match call {
                    Call::Glyph { x, y, glyph, .. } => Some((*x, *y, glyph.code)),
                    _ => None,
                })
                .collect()
        }
    }

    impl DisplaySurface for RecordingSurface {
        fn blit_glyph(
            &mut self,
            target: Target<'_>,
            x: u16,
            y: u16,
            glyph: &Glyph,
        ) -> Result<(), DisplayError> {
            let buffered = matches!(target, Target::Buffer(_));
            self.calls.push(Call::Glyph { x, y, glyph: *glyph, buffered });
            Ok(())
        }

        fn fill(&mut self, target: Target<'_>, color: Rgb565) -> Result<(), DisplayError> {
            let buffered = matches!(target, Target::Buffer(_));
            if let Target::Buffer(buffer) = target {
                buffer.fill(color);
            }
            self.calls.push(Call::Fill { color, buffered });
            Ok(())
        }

        fn push(&mut self, _buffer: &FrameBuffer) -> Result<(), DisplayError> {
            self.calls.push(Call::Push);
            Ok(())
        }

        fn pixel_dimensions(&self) -> (u16, u16) {
            (160, 128)
        }
    }

    fn write(term: &mut Terminal, surface: &mut RecordingSurface, text: &str) {
        let mut canvas = Canvas::panel(surface);
        term.write_str(&mut canvas, text).unwrap();
    }

    #[test]
    fn test_geometry_from_config() {
        let term = Terminal::new(TerminalConfig::default());
        assert_eq!(term.rows(), 16);
        assert_eq!(term.cols(), 26);

        let scaled = Terminal::new(TerminalConfig {
            scale: 2,
            ..TerminalConfig::default()
        });
        assert_eq!(scaled.rows(), 8);
        assert_eq!(scaled.cols(), 13);
    }

    #[test]
    fn test_plain_text_advances_cursor() {
        let mut term = Terminal::new(TerminalConfig::default());
        let mut surface = RecordingSurface::default();
        write(&mut term, &mut surface, "Hi");
        assert_eq!(surface.glyphs(), [(0, 0, b'H'), (6, 0, b'i')]);
        assert_eq!(term.cursor(), Cursor { row: 0, col: 2 });
    }

    #[test]
    fn test_crlf_and_backspace() {
        let mut term = Terminal::new(TerminalConfig::default());
        let mut surface = RecordingSurface::default();
        write(&mut term, &mut surface, "ab\r\nc\x08\x08\x08");
        assert_eq!(term.cursor(), Cursor { row: 1, col: 0 });
        assert_eq!(surface.glyphs()[2], (0, 8, b'c'));
    }

    #[test]
    fn test_linefeed_clamps_at_last_row() {
        let mut term = Terminal::new(TerminalConfig::default());
        let mut surface = RecordingSurface::default();
        write(&mut term, &mut surface, "\n".repeat(40).as_str());
        assert_eq!(term.cursor().row, 15);
    }

    #[test]
    fn test_clear_then_home_draws_top_left() {
        let mut term = Terminal::new(TerminalConfig::default());
        let mut surface = RecordingSurface::default();
        write(&mut term, &mut surface, "\x1b[5;7fxy\x1b[2J\x1b[HZ");
        assert_eq!(surface.glyphs().last(), Some(&(0, 0, b'Z')));
        assert!(surface.calls.contains(&Call::Fill {
            color: Rgb565::BLACK,
            buffered: false
        }));
        // Panel clear has nothing to push
        assert!(!surface.calls.contains(&Call::Push));
    }

    #[test]
    fn test_clear_buffered_pushes() {
        let mut term = Terminal::new(TerminalConfig::default());
        let mut surface = RecordingSurface::default();
        let mut buffer = FrameBuffer::new(160, 128, Rgb565::RED);
        {
            let mut canvas = Canvas::buffered(&mut surface, &mut buffer);
            term.write_str(&mut canvas, "\x1b[2J").unwrap();
        }
        assert_eq!(surface.calls.last(), Some(&Call::Push));
        assert!(buffer.pixels().iter().all(|&p| p == Rgb565::BLACK));
    }

    #[test]
    fn test_cursor_position_clamped() {
        let mut term = Terminal::new(TerminalConfig::default());
        let mut surface = RecordingSurface::default();
        write(&mut term, &mut surface, "\x1b[99;99H");
        assert_eq!(term.cursor(), Cursor { row: 15, col: 25 });

        write(&mut term, &mut surface, "\x1b[3H");
        assert_eq!(term.cursor(), Cursor { row: 3, col: 25 });

        write(&mut term, &mut surface, "\x1b[;4f");
        assert_eq!(term.cursor(), Cursor { row: 3, col: 4 });

        write(&mut term, &mut surface, "\x1b[H");
        assert_eq!(term.cursor(), Cursor::default());
    }

    #[test]
    fn test_relative_moves_clamp() {
        let mut term = Terminal::new(TerminalConfig::default());
        let mut surface = RecordingSurface::default();
        write(&mut term, &mut surface, "\x1b[999B");
        assert_eq!(term.cursor().row, 15);
        write(&mut term, &mut surface, "\x1b[A");
        assert_eq!(term.cursor().row, 14);
        write(&mut term, &mut surface, "\x1b[99999999C");
        assert_eq!(term.cursor().col, 25);
        write(&mut term, &mut surface, "\x1b[3D\x1b[100A");
        assert_eq!(term.cursor(), Cursor { row: 0, col: 22 });
    }

    #[test]
    fn test_save_restore() {
        let mut term = Terminal::new(TerminalConfig::default());
        let mut surface = RecordingSurface::default();
        write(&mut term, &mut surface, "\x1b[4;9f\x1b[s\x1b[H\x1b[u");
        assert_eq!(term.cursor(), Cursor { row: 4, col: 9 });
    }

    #[test]
    fn test_erase_line_variants() {
        let mut term = Terminal::new(TerminalConfig::default());
        let mut surface = RecordingSurface::default();

        write(&mut term, &mut surface, "\x1b[2;20f\x1b[K");
        let spaces: Vec<_> = surface.glyphs();
        assert_eq!(spaces.len(), 6);
        assert_eq!(spaces[0], (120, 16, b' '));

        surface.calls.clear();
        write(&mut term, &mut surface, "\x1b[1K");
        assert_eq!(surface.glyphs().len(), 20);

        surface.calls.clear();
        write(&mut term, &mut surface, "\x1b[2K");
        assert_eq!(surface.glyphs().len(), 26);
        // Erasing does not move the cursor
        assert_eq!(term.cursor(), Cursor { row: 2, col: 20 });
    }

    #[test]
    fn test_erase_up_down_are_noops() {
        let mut term = Terminal::new(TerminalConfig::default());
        let mut surface = RecordingSurface::default();
        write(&mut term, &mut surface, "\x1b[3;3f\x1b[J\x1b[1J");
        assert!(surface.calls.is_empty());
        assert_eq!(term.cursor(), Cursor { row: 3, col: 3 });
    }

    #[test]
    fn test_sgr_colors() {
        let mut term = Terminal::new(TerminalConfig::default());
        let mut surface = RecordingSurface::default();
        write(&mut term, &mut surface, "\x1b[30;47mX");
        assert_eq!(term.foreground(), Rgb565::BLACK);
        assert_eq!(term.background(), Rgb565::WHITE);

        let Some(Call::Glyph { glyph, .. }) = surface.calls.last() else {
            panic!("no glyph drawn");
        };
        assert_eq!(glyph.foreground, Rgb565::BLACK);
        assert_eq!(glyph.background, Rgb565::WHITE);

        // Out-of-range parameters are ignored individually
        write(&mut term, &mut surface, "\x1b[1;31m\x1b[39m\x1b[44m");
        assert_eq!(term.foreground(), Rgb565::RED);
        assert_eq!(term.background(), Rgb565::BLUE);
    }

    #[test]
    fn test_line_wrap_toggle() {
        let mut term = Terminal::new(TerminalConfig::default());
        let mut surface = RecordingSurface::default();
        assert!(!term.line_wrap());

        write(&mut term, &mut surface, &"x".repeat(30));
        assert_eq!(term.cursor(), Cursor { row: 0, col: 25 });

        write(&mut term, &mut surface, "\x1b[7h\x1b[H");
        assert!(term.line_wrap());
        write(&mut term, &mut surface, &"x".repeat(27));
        assert_eq!(term.cursor(), Cursor { row: 1, col: 1 });

        write(&mut term, &mut surface, "\x1b[7l");
        assert!(!term.line_wrap());
    }

    #[test]
    fn test_unknown_sequences_dropped() {
        let mut term = Terminal::new(TerminalConfig::default());
        let mut surface = RecordingSurface::default();
        write(&mut term, &mut surface, "\x1b[5z\x1bXA");
        // ESC followed by a non-'[' swallows that byte only
        assert_eq!(surface.glyphs(), [(0, 0, b'A')]);
    }

    #[test]
    fn test_transparent_canvas_flag() {
        let mut term = Terminal::new(TerminalConfig::default());
        let mut surface = RecordingSurface::default();
        let mut buffer = FrameBuffer::new(160, 128, Rgb565::BLACK);
        {
            let mut canvas =
                Canvas::buffered(&mut surface, &mut buffer).with_transparency(true);
            term.print(&mut canvas, format_args!("{}", 7)).unwrap();
        }
        assert!(matches!(
            surface.calls[0],
            Call::Glyph { glyph: Glyph { transparent: true, code: b'7', .. }, buffered: true, .. }
        ));
    }

    #[test]
    fn test_print_truncates_long_lines() {
        let mut term = Terminal::new(TerminalConfig::default());
        let mut surface = RecordingSurface::default();
        {
            let mut canvas = Canvas::panel(&mut surface);
            term.print(&mut canvas, format_args!("{}", "y".repeat(200))).unwrap();
        }
        assert_eq!(surface.glyphs().len(), LINE_LEN);
    }

    #[test]
    fn test_truncation_drops_cut_sequence() {
        let mut term = Terminal::new(TerminalConfig::default());
        let mut surface = RecordingSurface::default();
        let device = "/dev/serial/by-id/usb-u-blox_AG_GNSS_receiver-if00-port0";
        {
            let mut canvas = Canvas::panel(&mut surface);
            // The color reset straddles the line limit
            term.print(
                &mut canvas,
                format_args!("\x1b[3;0f\x1b[31mError on {}\x1b[37m", device),
            )
            .unwrap();
        }
        let drawn = surface.glyphs().len();
        assert_eq!(drawn, "Error on ".len() + device.len());

        {
            let mut canvas = Canvas::panel(&mut surface);
            term.print(&mut canvas, format_args!("\x1b[10;1fOK")).unwrap();
        }
        assert_eq!(surface.glyphs()[drawn..], [(6, 80, b'O'), (12, 80, b'K')]);
    }

    #[test]
    fn test_truncation_at_escape_start() {
        let mut term = Terminal::new(TerminalConfig::default());
        let mut surface = RecordingSurface::default();
        {
            let mut canvas = Canvas::panel(&mut surface);
            term.print(&mut canvas, format_args!("{:z<79}\x1b[31m", "")).unwrap();
            term.print(&mut canvas, format_args!("\x1b[1;0fA")).unwrap();
        }
        assert_eq!(term.foreground(), Rgb565::WHITE);
        assert_eq!(surface.glyphs().last(), Some(&(0, 8, b'A')));
    }

    proptest! {
        #[test]
        fn prop_cursor_stays_on_screen(
            moves in proptest::collection::vec((0u8..4, 0u32..100_000), 0..40)
        ) {
            let mut term = Terminal::new(TerminalConfig::default());
            let mut surface = RecordingSurface::default();
            for (direction, count) in moves {
                let letter = [b'A', b'B', b'C', b'D'][direction as usize] as char;
                let seq = std::format!("\x1b[{}{}", count, letter);
                write(&mut term, &mut surface, &seq);
                let cursor = term.cursor();
                prop_assert!(cursor.row < term.rows());
                prop_assert!(cursor.col < term.cols());
            }
        }
    }
}
