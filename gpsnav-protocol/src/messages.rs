//! Decoded sentence types.
//!
//! Field layout (index 0 is the identifier):
//!
//! | idx | GPGGA        | GPRMC          |
//! |-----|--------------|----------------|
//! | 1   | UTC time     | UTC time       |
//! | 2   | latitude     | status A/V     |
//! | 3   | N/S          | latitude       |
//! | 4   | longitude    | N/S            |
//! | 5   | E/W          | longitude      |
//! | 6   | fix quality  | E/W            |
//! | 7   | satellites   | speed (knots)  |
//! | 8   | HDOP         | course (deg)   |
//! | 9   | altitude     | date           |

use crate::fields::{decode_coordinate, parse_f32, parse_u8, Axis, UtcTime};
use crate::sentence::{Sentence, SentenceError};

/// Knots to statute miles per hour
pub const KNOTS_TO_MPH: f32 = 1.150779;

/// Fix data sentence identifier
pub const GGA_ID: &str = "GPGGA";

/// Recommended minimum sentence identifier
pub const RMC_ID: &str = "GPRMC";

mod gga {
    pub const UTC: usize = 1;
    pub const LAT: usize = 2;
    pub const NS: usize = 3;
    pub const LONG: usize = 4;
    pub const EW: usize = 5;
    pub const FIX: usize = 6;
    pub const SATS: usize = 7;
}

mod rmc {
    pub const UTC: usize = 1;
    pub const STATUS: usize = 2;
    pub const LAT: usize = 3;
    pub const NS: usize = 4;
    pub const LONG: usize = 5;
    pub const EW: usize = 6;
    pub const SPEED: usize = 7;
    pub const COURSE: usize = 8;
}

/// GPGGA: time, position and fix quality
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct Gga<'a> {
    /// Raw `hhmmss.sss` field, kept for epoch matching
    pub utc: &'a str,
    pub time: UtcTime,
    /// Signed decimal degrees
    pub latitude: f64,
    /// Signed decimal degrees
    pub longitude: f64,
    /// 0 = no fix, 1 = GPS, 2 = DGPS, others receiver specific
    pub fix_quality: u8,
    pub satellites: u8,
}

impl Gga<'_> {
    /// Whether the receiver reports a usable position
    pub fn has_fix(&self) -> bool {
        matches!(self.fix_quality, 1 | 2)
    }
}

/// GPRMC: time, status, speed and course
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct Rmc<'a> {
    /// Raw `hhmmss.sss` field, kept for epoch matching
    pub utc: &'a str,
    /// Status flag was `A` (active) rather than `V` (void)
    pub active: bool,
    pub latitude: f64,
    pub longitude: f64,
    pub speed_knots: f32,
    /// Course over ground, degrees true
    pub course: f32,
}

impl Rmc<'_> {
    /// Ground speed converted to miles per hour
    pub fn speed_mph(&self) -> f32 {
        self.speed_knots * KNOTS_TO_MPH
    }
}

/// A checksummed sentence, decoded by identifier
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Message<'a> {
    Gga(Gga<'a>),
    Rmc(Rmc<'a>),
    /// Valid envelope, identifier not handled
    Unsupported(&'a str),
}

impl<'a> Message<'a> {
    #[cfg(test)]
    fn parse(raw: &'a str) -> Result<Self, SentenceError> {
        Sentence::parse(raw).map(|sentence| Self::decode(&sentence))
    }

    /// Decode an already validated sentence
    pub fn decode(sentence: &Sentence<'a>) -> Self {
        match sentence.identifier() {
            GGA_ID => Message::Gga(Gga {
                utc: sentence.field(gga::UTC),
                time: UtcTime::decode(sentence.field(gga::UTC)),
                latitude: decode_coordinate(
                    sentence.field(gga::LAT),
                    sentence.field(gga::NS),
                    Axis::Latitude,
                ),
                longitude: decode_coordinate(
                    sentence.field(gga::LONG),
                    sentence.field(gga::EW),
                    Axis::Longitude,
                ),
                fix_quality: parse_u8(sentence.field(gga::FIX)),
                satellites: parse_u8(sentence.field(gga::SATS)),
            }),
            RMC_ID => Message::Rmc(Rmc {
                utc: sentence.field(rmc::UTC),
                active: sentence.field(rmc::STATUS) == "A",
                latitude: decode_coordinate(
                    sentence.field(rmc::LAT),
                    sentence.field(rmc::NS),
                    Axis::Latitude,
                ),
                longitude: decode_coordinate(
                    sentence.field(rmc::LONG),
                    sentence.field(rmc::EW),
                    Axis::Longitude,
                ),
                speed_knots: parse_f32(sentence.field(rmc::SPEED)),
                course: parse_f32(sentence.field(rmc::COURSE)),
            }),
            other => Message::Unsupported(other),
        }
    }
}
