//! Line-oriented GPS input

use gpsnav_protocol::MAX_SENTENCE_LEN;
use heapless::String;

/// One received line, terminator stripped
pub type LineBuffer = String<MAX_SENTENCE_LEN>;

/// Trait for the receiver byte stream
pub trait ByteStream {
    /// Transport error type
    type Error: core::fmt::Debug;

    /// Read one complete line into `line`
    ///
    /// Returns the number of characters read. `nb::Error::WouldBlock`
    /// means no complete line is available yet; `nb::Error::Other` is a
    /// hard I/O error.
    fn read_line(&mut self, line: &mut LineBuffer) -> nb::Result<usize, Self::Error>;

    /// Drop buffered input so the next line is fresh
    fn discard_input(&mut self);
}
