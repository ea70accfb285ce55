//! Screen rendering
//!
//! Every screen is VT100 text fed through the terminal, so layout is a
//! matter of cursor addressing. Rows and columns are 0-based.
//!
//! The 1.8" panel has 16 rows of 26 characters at scale 1.

use std::fmt::{self, Write};

use gpsnav_core::config::{DisplayConfig, PaletteColor};
use gpsnav_core::state::{MainMenu, MenuItem};
use gpsnav_core::Position;
use gpsnav_display::{Canvas, DisplayError, DisplaySurface, Terminal};
use heapless::String;

/// First menu row
pub const MENU_ROW: u16 = 5;
/// Column of the menu labels
pub const MENU_COL: u16 = 2;

/// Rows of the live fix readout
pub const HEARTBEAT_ROW: u16 = 2;
pub const FIELDS_ROW: u16 = 3;
pub const ADVISORY_ROW: u16 = 10;
pub const LOGGER_ROW: u16 = 11;
pub const LOGGED_ROW: u16 = 14;

/// Rows of the map view overlays
pub const NO_MAPS_ROW: u16 = 11;
pub const NO_MAP_HERE_ROW: u16 = 12;
pub const NO_FIX_ROW: u16 = 13;
pub const MAP_FOOTER_ROW: u16 = 15;

const EXIT_HINT: &str = "Press 'LEFT' to exit.";

/// SGR sequence, e.g. `ESC[37;40m`
pub type Sgr = String<12>;

fn sgr(foreground: PaletteColor, background: PaletteColor) -> Sgr {
    let mut out = Sgr::new();
    // 12 bytes always fit "\x1b[3N;4Nm"
    let _ = write!(out, "\x1b[{};{}m", 30 + foreground as u8, 40 + background as u8);
    out
}

/// Text attributes derived from the configured colors
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Style {
    /// Configured foreground on background
    pub normal: Sgr,
    /// Swapped colors for the menu highlight
    pub inverse: Sgr,
    /// Red advisories
    pub alert: Sgr,
    /// Blue map overlays
    pub info: Sgr,
}

impl Style {
    pub fn new(display: &DisplayConfig) -> Self {
        Self {
            normal: sgr(display.foreground, display.background),
            inverse: sgr(display.background, display.foreground),
            alert: sgr(PaletteColor::Red, display.background),
            info: sgr(PaletteColor::Blue, display.background),
        }
    }
}

/// Title block shown above the main menu
pub fn greeting<S: DisplaySurface + ?Sized>(
    term: &mut Terminal,
    canvas: &mut Canvas<'_, S>,
    style: &Style,
) -> Result<(), DisplayError> {
    term.print(
        canvas,
        format_args!(
            "\x1b[H{}GPS Navigator\r\nVersion {}\r\nUse UP/DOWN, SELECT",
            style.normal,
            env!("CARGO_PKG_VERSION")
        ),
    )
}

/// Menu entries, the selected one highlighted
pub fn menu<S: DisplaySurface + ?Sized>(
    term: &mut Terminal,
    canvas: &mut Canvas<'_, S>,
    style: &Style,
    menu: &MainMenu,
) -> Result<(), DisplayError> {
    for (row, item) in (MENU_ROW..).zip(MenuItem::ALL) {
        let attr = if item == menu.selected() {
            &style.inverse
        } else {
            &style.normal
        };
        term.print(
            canvas,
            format_args!("\x1b[{};{}f{}{}{}", row, MENU_COL, attr, item.label(), style.normal),
        )?;
    }
    Ok(())
}

/// First line of the fix readout
pub fn exit_hint<S: DisplaySurface + ?Sized>(
    term: &mut Terminal,
    canvas: &mut Canvas<'_, S>,
) -> Result<(), DisplayError> {
    term.print(canvas, format_args!("\x1b[H{}", EXIT_HINT))
}

/// Toggling receive indicator of the fix readout
pub fn heartbeat<S: DisplaySurface + ?Sized>(
    term: &mut Terminal,
    canvas: &mut Canvas<'_, S>,
    beat: bool,
) -> Result<(), DisplayError> {
    let mark = if beat { '*' } else { ' ' };
    term.print(canvas, format_args!("\x1b[{};1f{}", HEARTBEAT_ROW, mark))
}

/// The six position rows, each erased before it is rewritten
pub fn fix_fields<S: DisplaySurface + ?Sized>(
    term: &mut Terminal,
    canvas: &mut Canvas<'_, S>,
    position: &Position,
) -> Result<(), DisplayError> {
    let time = &position.time;
    term.print(
        canvas,
        format_args!(
            "\x1b[{};0f\x1b[2KUTC Time {:02}:{:02}:{:06.3}",
            FIELDS_ROW, time.hour, time.minute, time.second
        ),
    )?;
    term.print(
        canvas,
        format_args!("\x1b[{};0f\x1b[2KLatitude {:<10.6}", FIELDS_ROW + 1, position.latitude),
    )?;
    term.print(
        canvas,
        format_args!("\x1b[{};0f\x1b[2KLongitude {:<10.6}", FIELDS_ROW + 2, position.longitude),
    )?;
    term.print(
        canvas,
        format_args!("\x1b[{};0f\x1b[2KSatellites {}", FIELDS_ROW + 3, position.satellites),
    )?;
    term.print(
        canvas,
        format_args!(
            "\x1b[{};0f\x1b[2KGround speed {:<5.2} [mph]",
            FIELDS_ROW + 4,
            position.ground_speed_mph
        ),
    )?;
    term.print(
        canvas,
        format_args!("\x1b[{};0f\x1b[2KHeading {:<5.1} [deg]", FIELDS_ROW + 5, position.heading),
    )
}

/// Erase one whole row
pub fn clear_row<S: DisplaySurface + ?Sized>(
    term: &mut Terminal,
    canvas: &mut Canvas<'_, S>,
    row: u16,
) -> Result<(), DisplayError> {
    term.print(canvas, format_args!("\x1b[{};0f\x1b[2K", row))
}

/// Red message at the start of `row`
///
/// The color reset goes out on its own so a long message cut at the
/// line limit cannot take it along.
pub fn alert<S: DisplaySurface + ?Sized>(
    term: &mut Terminal,
    canvas: &mut Canvas<'_, S>,
    style: &Style,
    row: u16,
    text: fmt::Arguments<'_>,
) -> Result<(), DisplayError> {
    term.print(canvas, format_args!("\x1b[{};0f{}{}", row, style.alert, text))?;
    term.write_str(canvas, &style.normal)
}

/// Logger row counter
pub fn logged_points<S: DisplaySurface + ?Sized>(
    term: &mut Terminal,
    canvas: &mut Canvas<'_, S>,
    count: u32,
) -> Result<(), DisplayError> {
    term.print(
        canvas,
        format_args!("\x1b[{};0f\x1b[2KLogged points: {:<5}", LOGGED_ROW, count),
    )
}

/// Exit hint and heartbeat drawn over the map
pub fn map_footer<S: DisplaySurface + ?Sized>(
    term: &mut Terminal,
    canvas: &mut Canvas<'_, S>,
    style: &Style,
    beat: bool,
) -> Result<(), DisplayError> {
    term.print(
        canvas,
        format_args!(
            "\x1b[{};0f{}{}{}",
            MAP_FOOTER_ROW, style.info, EXIT_HINT, style.normal
        ),
    )?;
    let mark = if beat { '*' } else { ' ' };
    term.print(
        canvas,
        format_args!("\x1b[0;0f{}{}{}", style.info, mark, style.normal),
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_style() {
        let style = Style::new(&DisplayConfig::default());
        assert_eq!(style.normal.as_str(), "\x1b[37;40m");
        assert_eq!(style.inverse.as_str(), "\x1b[30;47m");
        assert_eq!(style.alert.as_str(), "\x1b[31;40m");
        assert_eq!(style.info.as_str(), "\x1b[34;40m");
    }

    #[test]
    fn test_style_follows_palette() {
        let display = DisplayConfig {
            foreground: PaletteColor::Yellow,
            background: PaletteColor::Blue,
            ..DisplayConfig::default()
        };
        let style = Style::new(&display);
        assert_eq!(style.normal.as_str(), "\x1b[33;44m");
        assert_eq!(style.inverse.as_str(), "\x1b[34;43m");
        assert_eq!(style.alert.as_str(), "\x1b[31;44m");
    }
}
