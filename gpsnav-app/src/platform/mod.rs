//! Linux board support
//!
//! Concrete capabilities for a Raspberry Pi class board:
//! - fbdev panel (`/dev/fb1`, RGB565)
//! - sysfs GPIO buttons
//! - NMEA receiver on a UART

pub mod fbdev;
pub mod gpio;
pub mod serial;

use std::io;

use gpsnav_core::config::{ButtonConfig, SerialConfig};
use gpsnav_drivers::{ButtonPins, LineReader, PinButtons};

pub use fbdev::FramebufferSurface;
pub use gpio::{StdDelay, SysfsPin};
pub use serial::SerialPortIo;

/// Front panel buttons
pub type Buttons = PinButtons<SysfsPin, StdDelay>;

/// Line-framed receiver input
pub type Gps = LineReader<SerialPortIo>;

/// Acquire the five button lines
pub fn open_buttons(config: &ButtonConfig) -> io::Result<Buttons> {
    let pins = ButtonPins {
        select: SysfsPin::new(config.select)?,
        up: SysfsPin::new(config.up)?,
        down: SysfsPin::new(config.down)?,
        left: SysfsPin::new(config.left)?,
        right: SysfsPin::new(config.right)?,
    };
    Ok(PinButtons::new(
        pins,
        StdDelay,
        config.active_low,
        config.debounce_ms,
    ))
}

/// Open the receiver UART
pub fn open_gps(config: &SerialConfig) -> serialport::Result<Gps> {
    SerialPortIo::open(config).map(LineReader::new)
}
