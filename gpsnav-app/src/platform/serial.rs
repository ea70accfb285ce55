//! Receiver UART
//!
//! Adapts a `serialport` handle to the `embedded-io` traits the line
//! reader is written against.

use std::io;
use std::time::Duration;

use embedded_io::{ErrorKind, ErrorType, Read, ReadReady};
use gpsnav_core::config::SerialConfig;
use log::info;
use serialport::{DataBits, FlowControl, Parity, SerialPort, StopBits};
use thiserror::Error;

/// Read timeout; reads only happen once bytes are waiting
const READ_TIMEOUT: Duration = Duration::from_millis(10);

#[derive(Debug, Error)]
#[error("serial port: {0}")]
pub struct PortError(#[from] io::Error);

impl From<serialport::Error> for PortError {
    fn from(err: serialport::Error) -> Self {
        Self(err.into())
    }
}

impl embedded_io::Error for PortError {
    fn kind(&self) -> ErrorKind {
        match self.0.kind() {
            io::ErrorKind::NotFound => ErrorKind::NotFound,
            io::ErrorKind::PermissionDenied => ErrorKind::PermissionDenied,
            io::ErrorKind::BrokenPipe => ErrorKind::BrokenPipe,
            io::ErrorKind::InvalidInput => ErrorKind::InvalidInput,
            io::ErrorKind::InvalidData => ErrorKind::InvalidData,
            io::ErrorKind::TimedOut => ErrorKind::TimedOut,
            io::ErrorKind::Interrupted => ErrorKind::Interrupted,
            _ => ErrorKind::Other,
        }
    }
}

/// Open 8N1 serial port
pub struct SerialPortIo {
    port: Box<dyn SerialPort>,
}

impl SerialPortIo {
    pub fn open(config: &SerialConfig) -> serialport::Result<Self> {
        let port = serialport::new(config.device.as_str(), config.baud_rate)
            .data_bits(DataBits::Eight)
            .parity(Parity::None)
            .stop_bits(StopBits::One)
            .flow_control(FlowControl::None)
            .timeout(READ_TIMEOUT)
            .open()?;
        info!("Opened {} at {} baud", config.device, config.baud_rate);
        Ok(Self { port })
    }
}

impl ErrorType for SerialPortIo {
    type Error = PortError;
}

impl Read for SerialPortIo {
    fn read(&mut self, buf: &mut [u8]) -> Result<usize, Self::Error> {
        match io::Read::read(&mut self.port, buf) {
            // Nothing arrived within the timeout
            Err(err) if err.kind() == io::ErrorKind::TimedOut => Ok(0),
            other => Ok(other?),
        }
    }
}

impl ReadReady for SerialPortIo {
    fn read_ready(&mut self) -> Result<bool, Self::Error> {
        Ok(self.port.bytes_to_read()? > 0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use embedded_io::Error as _;

    #[test]
    fn test_error_kinds() {
        let kind = |k: io::ErrorKind| PortError(io::Error::from(k)).kind();
        assert_eq!(kind(io::ErrorKind::NotFound), ErrorKind::NotFound);
        assert_eq!(kind(io::ErrorKind::PermissionDenied), ErrorKind::PermissionDenied);
        assert_eq!(kind(io::ErrorKind::UnexpectedEof), ErrorKind::Other);
    }

    #[test]
    fn test_missing_device() {
        let config = SerialConfig {
            device: heapless::String::try_from("/dev/gpsnav-no-such-tty").unwrap(),
            baud_rate: 4800,
        };
        assert!(SerialPortIo::open(&config).is_err());
    }
}
