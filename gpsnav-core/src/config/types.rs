//! Configuration type definitions

use core::fmt;

use gpsnav_display::{Rgb565, TerminalConfig};
use heapless::String;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Maximum device or directory path length
pub const MAX_PATH_LEN: usize = 64;

/// Maximum file name length
pub const MAX_NAME_LEN: usize = 32;

fn text<const N: usize>(value: &str) -> String<N> {
    let mut out = String::new();
    let _ = out.push_str(value);
    out
}

/// Problems found by `NavConfig::validate`
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum ConfigIssue {
    /// Display width or height is zero
    ZeroDisplaySize,
    /// Glyph size or scale is zero
    ZeroGlyphSize,
    /// One scaled glyph does not fit on the panel
    GlyphLargerThanDisplay,
    /// Serial baud rate is zero
    ZeroBaudRate,
    /// Invalid-fix advisory threshold is zero
    ZeroInvalidFixLimit,
}

impl fmt::Display for ConfigIssue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let text = match self {
            Self::ZeroDisplaySize => "display width and height must be non-zero",
            Self::ZeroGlyphSize => "glyph size and scale must be non-zero",
            Self::GlyphLargerThanDisplay => "scaled glyph does not fit on the display",
            Self::ZeroBaudRate => "serial baud rate must be non-zero",
            Self::ZeroInvalidFixLimit => "invalid_fix_limit must be non-zero",
        };
        f.write_str(text)
    }
}

/// Named palette color
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "lowercase"))]
pub enum PaletteColor {
    Black,
    Red,
    Green,
    Yellow,
    Blue,
    Magenta,
    Cyan,
    White,
}

impl PaletteColor {
    pub fn rgb565(self) -> Rgb565 {
        Rgb565::ANSI[self as usize]
    }
}

/// GPS receiver UART
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct SerialConfig {
    /// Device node, e.g. `/dev/ttyAMA0`
    pub device: String<MAX_PATH_LEN>,
    /// Line speed; framing is always 8N1
    pub baud_rate: u32,
}

impl Default for SerialConfig {
    fn default() -> Self {
        Self {
            device: text("/dev/ttyAMA0"),
            baud_rate: 9600,
        }
    }
}

/// Pixel panel and text console
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct DisplayConfig {
    /// Framebuffer device, e.g. `/dev/fb1`
    pub device: String<MAX_PATH_LEN>,
    pub width: u16,
    pub height: u16,
    /// Unscaled glyph cell size
    pub glyph_width: u16,
    pub glyph_height: u16,
    /// Integer font magnification
    pub scale: u8,
    pub foreground: PaletteColor,
    pub background: PaletteColor,
}

impl Default for DisplayConfig {
    fn default() -> Self {
        Self {
            device: text("/dev/fb1"),
            width: 160,
            height: 128,
            glyph_width: 6,
            glyph_height: 8,
            scale: 1,
            foreground: PaletteColor::White,
            background: PaletteColor::Black,
        }
    }
}

impl DisplayConfig {
    /// Geometry and colors for the text console
    pub fn terminal(&self) -> TerminalConfig {
        TerminalConfig {
            width: self.width,
            height: self.height,
            glyph_width: self.glyph_width,
            glyph_height: self.glyph_height,
            scale: self.scale,
            foreground: self.foreground.rgb565(),
            background: self.background.rgb565(),
        }
    }
}

/// Front panel buttons, as GPIO line numbers
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct ButtonConfig {
    pub select: u32,
    pub up: u32,
    pub down: u32,
    pub left: u32,
    pub right: u32,
    /// Pressed reads as low (pull-ups to 3V3)
    pub active_low: bool,
    /// Confirmation delay after a press is first seen
    pub debounce_ms: u32,
}

impl Default for ButtonConfig {
    fn default() -> Self {
        Self {
            select: 4,
            up: 17,
            down: 27,
            left: 22,
            right: 23,
            active_low: true,
            debounce_ms: 100,
        }
    }
}

/// Removable storage layout
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct StorageConfig {
    /// Mount point of the USB stick
    pub usb_dir: String<MAX_PATH_LEN>,
    /// File whose presence means the stick is mounted and writable
    pub marker: String<MAX_NAME_LEN>,
    /// Track log, appended to
    pub log_file: String<MAX_NAME_LEN>,
    /// Map catalog (TOML)
    pub catalog: String<MAX_NAME_LEN>,
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            usb_dir: text("/home/pi/usb"),
            marker: text("go"),
            log_file: text("logger.csv"),
            catalog: text("maps.toml"),
        }
    }
}

/// Navigator behavior
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct NavigationConfig {
    /// Consecutive invalid fixes before the "no fix" advisory
    pub invalid_fix_limit: u32,
    /// Glyph drawn at the viewport center in the map view
    pub marker_glyph: char,
}

impl Default for NavigationConfig {
    fn default() -> Self {
        Self {
            invalid_fix_limit: 60,
            marker_glyph: '+',
        }
    }
}

/// Complete navigator configuration
#[derive(Debug, Clone, Default, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct NavConfig {
    pub serial: SerialConfig,
    pub display: DisplayConfig,
    pub buttons: ButtonConfig,
    pub storage: StorageConfig,
    pub navigation: NavigationConfig,
}

impl NavConfig {
    /// Check values a TOML file could get wrong
    pub fn validate(&self) -> Result<(), ConfigIssue> {
        let display = &self.display;
        if display.width == 0 || display.height == 0 {
            return Err(ConfigIssue::ZeroDisplaySize);
        }
        if display.glyph_width == 0 || display.glyph_height == 0 || display.scale == 0 {
            return Err(ConfigIssue::ZeroGlyphSize);
        }
        let scale = display.scale as u16;
        if display.glyph_width.saturating_mul(scale) > display.width
            || display.glyph_height.saturating_mul(scale) > display.height
        {
            return Err(ConfigIssue::GlyphLargerThanDisplay);
        }
        if self.serial.baud_rate == 0 {
            return Err(ConfigIssue::ZeroBaudRate);
        }
        if self.navigation.invalid_fix_limit == 0 {
            return Err(ConfigIssue::ZeroInvalidFixLimit);
        }
        Ok(())
    }
}
