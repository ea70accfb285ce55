//! sysfs GPIO inputs
//!
//! Lines must already be exported and configured as inputs
//! (`/sys/class/gpio/gpioN`), normally by the boot scripts.

use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use std::thread;
use std::time::Duration;

use embedded_hal::delay::DelayNs;
use embedded_hal::digital::{ErrorKind, ErrorType, InputPin};
use thiserror::Error;

const SYSFS_GPIO: &str = "/sys/class/gpio";

#[derive(Debug, Error)]
pub enum PinError {
    #[error("reading pin value: {0}")]
    Io(#[from] io::Error),
    #[error("unexpected pin value {0:?}")]
    Malformed(String),
}

impl embedded_hal::digital::Error for PinError {
    fn kind(&self) -> ErrorKind {
        ErrorKind::Other
    }
}

/// One exported GPIO line, read through its `value` file
#[derive(Debug)]
pub struct SysfsPin {
    path: PathBuf,
}

impl SysfsPin {
    /// Open an exported line by number
    pub fn new(line: u32) -> io::Result<Self> {
        Self::at(Path::new(SYSFS_GPIO).join(format!("gpio{}", line)).join("value"))
    }

    /// Open a `value` file directly
    pub fn at(path: impl Into<PathBuf>) -> io::Result<Self> {
        let path = path.into();
        fs::metadata(&path)?;
        Ok(Self { path })
    }

    fn level(&self) -> Result<bool, PinError> {
        let text = fs::read_to_string(&self.path)?;
        match text.trim() {
            "0" => Ok(false),
            "1" => Ok(true),
            other => Err(PinError::Malformed(other.to_owned())),
        }
    }
}

impl ErrorType for SysfsPin {
    type Error = PinError;
}

impl InputPin for SysfsPin {
    fn is_high(&mut self) -> Result<bool, Self::Error> {
        self.level()
    }

    fn is_low(&mut self) -> Result<bool, Self::Error> {
        self.level().map(|high| !high)
    }
}

/// Blocking delay on the calling thread
#[derive(Debug, Clone, Copy, Default)]
pub struct StdDelay;

impl DelayNs for StdDelay {
    fn delay_ns(&mut self, ns: u32) {
        thread::sleep(Duration::from_nanos(ns.into()));
    }

    fn delay_ms(&mut self, ms: u32) {
        thread::sleep(Duration::from_millis(ms.into()));
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use gpsnav_core::traits::{Button, ButtonSource};
    use gpsnav_drivers::{ButtonPins, PinButtons};
    use std::time::Instant;
    use tempfile::TempDir;

    fn value_file(dir: &TempDir, name: &str, value: &str) -> SysfsPin {
        let path = dir.path().join(name);
        fs::write(&path, value).unwrap();
        SysfsPin::at(path).unwrap()
    }

    #[test]
    fn test_reads_levels() {
        let dir = TempDir::new().unwrap();
        let mut high = value_file(&dir, "high", "1\n");
        let mut low = value_file(&dir, "low", "0\n");

        assert!(high.is_high().unwrap());
        assert!(!high.is_low().unwrap());
        assert!(low.is_low().unwrap());
    }

    #[test]
    fn test_follows_file_changes() {
        let dir = TempDir::new().unwrap();
        let mut pin = value_file(&dir, "value", "1\n");
        assert!(pin.is_high().unwrap());

        fs::write(dir.path().join("value"), "0\n").unwrap();
        assert!(pin.is_low().unwrap());
    }

    #[test]
    fn test_malformed_value() {
        let dir = TempDir::new().unwrap();
        let mut pin = value_file(&dir, "value", "in\n");
        assert!(matches!(pin.is_high(), Err(PinError::Malformed(v)) if v == "in"));
    }

    #[test]
    fn test_unexported_line() {
        let dir = TempDir::new().unwrap();
        assert!(SysfsPin::at(dir.path().join("gpio99/value")).is_err());
    }

    #[test]
    fn test_debounced_press_from_sysfs() {
        let dir = TempDir::new().unwrap();
        let pins = ButtonPins {
            select: value_file(&dir, "select", "1"),
            up: value_file(&dir, "up", "1"),
            down: value_file(&dir, "down", "0"),
            left: value_file(&dir, "left", "1"),
            right: value_file(&dir, "right", "1"),
        };
        let mut buttons = PinButtons::new(pins, StdDelay, true, 5);

        let started = Instant::now();
        assert_eq!(buttons.poll(), Some(Button::Down));
        assert!(started.elapsed() >= Duration::from_millis(5));
    }
}
