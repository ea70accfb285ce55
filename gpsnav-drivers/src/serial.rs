//! NMEA line reader over a byte-oriented UART
//!
//! Reads only while the port reports data ready, so a call never
//! blocks. Partial lines are kept between calls.

use embedded_io::{Read, ReadReady};
use gpsnav_core::traits::{ByteStream, LineBuffer};
use gpsnav_protocol::LineFramer;

/// Line-framed byte stream
pub struct LineReader<R> {
    port: R,
    framer: LineFramer,
}

impl<R: Read + ReadReady> LineReader<R> {
    /// Wrap a non-blocking reader
    pub fn new(port: R) -> Self {
        Self {
            port,
            framer: LineFramer::new(),
        }
    }

    #[cfg(test)]
    fn port_mut(&mut self) -> &mut R {
        &mut self.port
    }
}

impl<R: Read + ReadReady> ByteStream for LineReader<R> {
    type Error = R::Error;

    fn read_line(&mut self, line: &mut LineBuffer) -> nb::Result<usize, Self::Error> {
        let mut byte = [0u8; 1];
        while self.port.read_ready()? {
            if self.port.read(&mut byte)? == 0 {
                break;
            }
            if let Some(complete) = self.framer.feed(byte[0]) {
                let count = complete.chars().count();
                *line = complete;
                return Ok(count);
            }
        }
        Err(nb::Error::WouldBlock)
    }

    fn discard_input(&mut self) {
        self.framer.reset();
        let mut scratch = [0u8; 64];
        while let Ok(true) = self.port.read_ready() {
            match self.port.read(&mut scratch) {
                Ok(0) | Err(_) => break,
                Ok(_) => {}
            }
        }
    }
}
