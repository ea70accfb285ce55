//! Line framing for the receiver byte stream.
//!
//! Bytes arrive one at a time from the UART. The framer collects them
//! until CR or LF and hands back the completed line without its
//! terminator.

use heapless::{String, Vec};

use crate::sentence::MAX_SENTENCE_LEN;

/// State machine for splitting a byte stream into lines
#[derive(Debug, Clone, Default)]
pub struct LineFramer {
    buffer: Vec<u8, MAX_SENTENCE_LEN>,
    /// Set after an over-long line; everything up to the next terminator is dropped
    discarding: bool,
}

impl LineFramer {
    /// Create an empty framer
    pub fn new() -> Self {
        Self::default()
    }

    /// Drop any partially received line
    pub fn reset(&mut self) {
        self.buffer.clear();
        self.discarding = false;
    }

    /// Number of bytes held for the line in progress
    #[cfg(test)]
    fn pending(&self) -> usize {
        self.buffer.len()
    }

    /// Feed a single byte
    ///
    /// Returns `Some(line)` when a terminator completes a non-empty line.
    /// Blank lines (the LF of a CRLF pair), over-long lines and lines that
    /// are not valid UTF-8 produce nothing.
    pub fn feed(&mut self, byte: u8) -> Option<String<MAX_SENTENCE_LEN>> {
        if byte == b'\r' || byte == b'\n' {
            let was_discarding = self.discarding;
            self.discarding = false;
            if was_discarding || self.buffer.is_empty() {
                self.buffer.clear();
                return None;
            }

            let line = core::str::from_utf8(&self.buffer)
                .ok()
                .and_then(|text| {
                    let mut line = String::new();
                    line.push_str(text).ok().map(|_| line)
                });
            self.buffer.clear();
            return line;
        }

        if self.discarding {
            return None;
        }

        if self.buffer.push(byte).is_err() {
            self.buffer.clear();
            self.discarding = true;
        }
        None
    }

    /// Feed bytes up to and including the first complete line
    #[cfg(test)]
    fn feed_bytes(&mut self, bytes: &[u8]) -> Option<String<MAX_SENTENCE_LEN>> {
        bytes.iter().find_map(|&byte| self.feed(byte))
    }
}
