//! NMEA-0183 sentence codec
//!
//! This crate handles the text protocol spoken by the serial GPS receiver.
//! Every record is a single ASCII line:
//! ```text
//! $GPGGA,123519,4807.038,N,01131.000,E,1,08,0.9,545.4,M,46.9,M,,*47
//! └┬───┘ └──────────────── payload (comma separated) ─────────┘ └┬┘
//!  identifier                                         XOR checksum
//! ```
//!
//! Only the two sentences the navigator consumes are decoded: `GPGGA`
//! (fix data) and `GPRMC` (recommended minimum). Everything else is
//! reported as unsupported and left to the caller to ignore.

#![no_std]
#![deny(unsafe_code)]

#[cfg(test)]
extern crate std;

pub mod fields;
pub mod framer;
pub mod messages;
pub mod sentence;

pub use fields::{Axis, UtcTime};
pub use framer::LineFramer;
pub use messages::{Gga, Message, Rmc, KNOTS_TO_MPH};
pub use sentence::{checksum, Sentence, SentenceError, MAX_SENTENCE_LEN};
