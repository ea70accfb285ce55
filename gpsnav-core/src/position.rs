//! Position model
//!
//! The latest fix, assembled from GPGGA (position, satellites) and GPRMC
//! (speed, heading). The two sentences of one receiver epoch carry the
//! same UTC stamp; when the stored stamps match and are not empty the
//! position is "fused" and safe to log as a single record.

use gpsnav_protocol::{Message, Sentence, UtcTime};
use heapless::String;

/// Room for `hhmmss.sss` plus some slack
pub const MAX_STAMP_LEN: usize = 16;

/// Outcome of feeding one sentence to the position model
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum FixResult {
    /// Position fields were updated from a valid fix
    FixUpdated,
    /// Receiver reports no fix / void status; position untouched
    FixInvalid,
    /// Envelope or checksum bad; position untouched
    ChecksumFailed,
    /// Valid sentence the navigator does not use
    UnsupportedSentence,
}

impl FixResult {
    pub fn is_update(self) -> bool {
        self == FixResult::FixUpdated
    }
}

/// Latest fix
#[derive(Debug, Clone, Default, PartialEq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct Position {
    /// UTC time of the last fix-data sentence
    pub time: UtcTime,
    /// Signed decimal degrees, north positive
    pub latitude: f64,
    /// Signed decimal degrees, east positive
    pub longitude: f64,
    pub satellites: u8,
    pub ground_speed_mph: f32,
    /// Course over ground in degrees
    pub heading: f32,
    pub(crate) gga_stamp: String<MAX_STAMP_LEN>,
    pub(crate) rmc_stamp: String<MAX_STAMP_LEN>,
    pub(crate) fused: bool,
}

impl Position {
    /// Zeroed position with no fix
    pub fn new() -> Self {
        Self::default()
    }

    /// Both sentence kinds of the same epoch have been applied
    pub fn is_fused(&self) -> bool {
        self.fused
    }

    /// Raw UTC field of the last applied GPGGA
    pub fn gga_stamp(&self) -> &str {
        &self.gga_stamp
    }

    /// Raw UTC field of the last applied GPRMC
    pub fn rmc_stamp(&self) -> &str {
        &self.rmc_stamp
    }

    /// Heading truncated to whole degrees in `0..360`
    pub fn heading_degrees(&self) -> u16 {
        (self.heading as i32).rem_euclid(360) as u16
    }

    /// Apply one raw sentence
    pub fn update(&mut self, raw: &str) -> FixResult {
        let sentence = match Sentence::parse(raw) {
            Ok(sentence) => sentence,
            Err(_) => return FixResult::ChecksumFailed,
        };

        let result = match Message::decode(&sentence) {
            Message::Gga(gga) => {
                if !gga.has_fix() || !in_range(gga.latitude, gga.longitude) {
                    return FixResult::FixInvalid;
                }
                self.time = gga.time;
                self.latitude = gga.latitude;
                self.longitude = gga.longitude;
                self.satellites = gga.satellites;
                copy_stamp(&mut self.gga_stamp, gga.utc);
                FixResult::FixUpdated
            }
            Message::Rmc(rmc) => {
                if !rmc.active {
                    return FixResult::FixInvalid;
                }
                self.ground_speed_mph = rmc.speed_mph();
                self.heading = rmc.course;
                copy_stamp(&mut self.rmc_stamp, rmc.utc);
                FixResult::FixUpdated
            }
            Message::Unsupported(_) => return FixResult::UnsupportedSentence,
        };

        self.fused = !self.gga_stamp.is_empty() && self.gga_stamp == self.rmc_stamp;
        result
    }
}

/// Feed one raw sentence into `position`
pub fn parse_sentence(raw: &str, position: &mut Position) -> FixResult {
    position.update(raw)
}

fn in_range(latitude: f64, longitude: f64) -> bool {
    (-90.0..=90.0).contains(&latitude) && (-180.0..=180.0).contains(&longitude)
}

fn copy_stamp(stamp: &mut String<MAX_STAMP_LEN>, utc: &str) {
    stamp.clear();
    for ch in utc.chars() {
        if stamp.push(ch).is_err() {
            break;
        }
    }
}
