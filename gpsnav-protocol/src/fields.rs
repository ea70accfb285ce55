//! Field-level decoding.
//!
//! NMEA fields are fixed-column text. A field shorter than its format
//! decodes as zero instead of failing the whole sentence; receivers
//! routinely emit empty fields while acquiring.

use core::fmt::Write;
use heapless::String;

/// Which coordinate a degree-minute field encodes
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Axis {
    /// `DDMM.MMMM`, hemisphere `N`/`S`
    Latitude,
    /// `DDDMM.MMMM`, hemisphere `E`/`W`
    Longitude,
}

impl Axis {
    /// Number of leading degree digits
    pub const fn degree_digits(self) -> usize {
        match self {
            Axis::Latitude => 2,
            Axis::Longitude => 3,
        }
    }

    /// Hemisphere letter that makes the value negative
    pub const fn negative_hemisphere(self) -> &'static str {
        match self {
            Axis::Latitude => "S",
            Axis::Longitude => "W",
        }
    }

    const fn positive_hemisphere(self) -> &'static str {
        match self {
            Axis::Latitude => "N",
            Axis::Longitude => "E",
        }
    }
}

/// UTC time of day from an `hhmmss.sss` field
#[derive(Debug, Clone, Copy, Default, PartialEq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct UtcTime {
    pub hour: u8,
    pub minute: u8,
    pub second: f32,
}

impl UtcTime {
    /// Decode `hhmmss[.sss]`, zero for any missing column
    pub fn decode(field: &str) -> Self {
        Self {
            hour: field.get(0..2).map(parse_u8).unwrap_or(0),
            minute: field.get(2..4).map(parse_u8).unwrap_or(0),
            second: field.get(4..).map(parse_f32).unwrap_or(0.0),
        }
    }
}

/// Lenient float parse: empty or garbage decodes as 0
pub fn parse_f64(field: &str) -> f64 {
    field.trim().parse().unwrap_or(0.0)
}

/// Lenient float parse: empty or garbage decodes as 0
pub fn parse_f32(field: &str) -> f32 {
    field.trim().parse().unwrap_or(0.0)
}

/// Lenient integer parse: empty or garbage decodes as 0
pub fn parse_u8(field: &str) -> u8 {
    field.trim().parse().unwrap_or(0)
}

/// Decode a degree-minute field plus hemisphere into signed decimal degrees
pub fn decode_coordinate(field: &str, hemisphere: &str, axis: Axis) -> f64 {
    let width = axis.degree_digits();
    let (degrees, minutes) = match (field.get(..width), field.get(width..)) {
        (Some(degrees), Some(minutes)) => (parse_f64(degrees), parse_f64(minutes)),
        _ => return 0.0,
    };

    let value = degrees + minutes / 60.0;
    if hemisphere == axis.negative_hemisphere() {
        -value
    } else {
        value
    }
}

/// Encode signed decimal degrees as a degree-minute field and hemisphere
///
/// Minutes are written with four decimals, the usual receiver resolution.
pub fn encode_coordinate(value: f64, axis: Axis) -> (String<16>, &'static str) {
    let hemisphere = if value < 0.0 {
        axis.negative_hemisphere()
    } else {
        axis.positive_hemisphere()
    };

    let magnitude = libm::fabs(value);
    let mut degrees = libm::floor(magnitude);
    let mut minutes = (magnitude - degrees) * 60.0;
    // 59.99995 would print as 60.0000
    if minutes >= 59.999_95 {
        degrees += 1.0;
        minutes = 0.0;
    }

    let mut field = String::new();
    let _ = match axis {
        Axis::Latitude => write!(field, "{:02}{:07.4}", degrees as u32, minutes),
        Axis::Longitude => write!(field, "{:03}{:07.4}", degrees as u32, minutes),
    };
    (field, hemisphere)
}
