//! Sentence envelope handling.
//!
//! Envelope format:
//! - `$` (optional on input): start of sentence
//! - payload: identifier and data fields separated by `,`
//! - `*HH`: XOR of every payload byte, as hex

use core::fmt;
use core::str::Split;

/// Longest line accepted from the receiver (NMEA allows 82, some chips run long)
pub const MAX_SENTENCE_LEN: usize = 128;

/// Errors produced while validating a sentence envelope
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum SentenceError {
    /// No `*` separator, so no checksum to verify
    MissingChecksum,
    /// Checksum digits are empty, too long, or not hex
    MalformedChecksum,
    /// Declared and computed checksums differ
    ChecksumMismatch {
        /// Value after the `*`
        declared: u8,
        /// XOR over the payload
        computed: u8,
    },
}

impl fmt::Display for SentenceError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::MissingChecksum => write!(f, "sentence has no checksum"),
            Self::MalformedChecksum => write!(f, "checksum is not a hex byte"),
            Self::ChecksumMismatch { declared, computed } => write!(
                f,
                "checksum mismatch (declared {:02X}, computed {:02X})",
                declared, computed
            ),
        }
    }
}

/// Running XOR over the payload bytes
pub fn checksum(payload: &[u8]) -> u8 {
    payload.iter().fold(0, |acc, &byte| acc ^ byte)
}

/// A sentence whose checksum has been verified
///
/// Borrows the payload from the input line; fields are extracted lazily.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Sentence<'a> {
    payload: &'a str,
}

impl<'a> Sentence<'a> {
    /// Validate a raw line and return its payload
    ///
    /// Trailing CR/LF and whitespace after the checksum are ignored.
    pub fn parse(raw: &'a str) -> Result<Self, SentenceError> {
        let body = raw.strip_prefix('$').unwrap_or(raw);
        let (payload, digits) = body
            .split_once('*')
            .ok_or(SentenceError::MissingChecksum)?;

        let declared = parse_hex_byte(digits.trim())?;
        let computed = checksum(payload.as_bytes());
        if declared != computed {
            return Err(SentenceError::ChecksumMismatch { declared, computed });
        }

        Ok(Self { payload })
    }

    /// Field 0, the talker + sentence identifier (e.g. `GPGGA`)
    pub fn identifier(&self) -> &'a str {
        self.field(0)
    }

    /// All fields in order, including empty ones between adjacent commas
    pub fn fields(&self) -> Split<'a, char> {
        self.payload.split(',')
    }

    /// Field at `index`, or an empty string if the sentence is shorter
    pub fn field(&self, index: usize) -> &'a str {
        self.fields().nth(index).unwrap_or("")
    }
}

fn parse_hex_byte(digits: &str) -> Result<u8, SentenceError> {
    if digits.is_empty() || digits.len() > 2 {
        return Err(SentenceError::MalformedChecksum);
    }
    u8::from_str_radix(digits, 16).map_err(|_| SentenceError::MalformedChecksum)
}

/// Write `$payload*HH` into `out`
///
/// Used by self-tests and fixtures to produce well-formed sentences.
pub fn encode<const N: usize>(
    payload: &str,
    out: &mut heapless::String<N>,
) -> Result<(), fmt::Error> {
    use core::fmt::Write;

    out.clear();
    write!(out, "${}*{:02X}", payload, checksum(payload.as_bytes()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    const GGA: &str = "$GPGGA,123519,4807.038,N,01131.000,E,1,08,0.9,545.4,M,46.9,M,,*47";
    const RMC: &str = "$GPRMC,123519,A,4807.038,N,01131.000,E,022.4,084.4,230394,003.1,W*6A";

    #[test]
    fn test_checksum_reference_sentences() {
        assert!(Sentence::parse(GGA).is_ok());
        assert!(Sentence::parse(RMC).is_ok());
    }

    #[test]
    fn test_dollar_is_optional() {
        let sentence = Sentence::parse(&GGA[1..]).unwrap();
        assert_eq!(sentence.identifier(), "GPGGA");
    }

    #[test]
    fn test_missing_checksum() {
        let result = Sentence::parse("$GPGGA,123519,4807.038,N");
        assert_eq!(result, Err(SentenceError::MissingChecksum));
    }

    #[test]
    fn test_malformed_checksum() {
        assert_eq!(
            Sentence::parse("$GPGGA,1*ZZ"),
            Err(SentenceError::MalformedChecksum)
        );
        assert_eq!(
            Sentence::parse("$GPGGA,1*"),
            Err(SentenceError::MalformedChecksum)
        );
    }

    #[test]
    fn test_trailing_line_ending_ignored() {
        let mut line = std::string::String::from(RMC);
        line.push_str("\r\n");
        assert!(Sentence::parse(&line).is_ok());
    }

    #[test]
    fn test_empty_fields_preserved() {
        let sentence = Sentence::parse(GGA).unwrap();
        // ",," before the checksum is a zero-length field
        assert_eq!(sentence.field(13), "");
        assert_eq!(sentence.field(14), "");
        assert_eq!(sentence.fields().count(), 15);
        // Past the end is also empty
        assert_eq!(sentence.field(40), "");
    }

    #[test]
    fn test_encode_produces_valid_sentence() {
        let mut out = heapless::String::<96>::new();
        encode("GPRMC,123519,A,4807.038,N,01131.000,E,022.4,084.4,230394,003.1,W", &mut out)
            .unwrap();
        assert_eq!(out.as_str(), RMC);
    }

    proptest! {
        #[test]
        fn prop_single_byte_flip_rejected(index in 1usize..60, bit in 0u8..7) {
            let mut bytes = std::vec::Vec::from(GGA.as_bytes());
            let star = GGA.find('*').unwrap();
            prop_assume!(index < star);
            bytes[index] ^= 1 << bit;
            // Only ASCII flips keep the line valid UTF-8
            if let Ok(line) = core::str::from_utf8(&bytes) {
                prop_assume!(!line[..star].contains('*'));
                let is_mismatch = matches!(
                    Sentence::parse(line),
                    Err(SentenceError::ChecksumMismatch { .. })
                );
                prop_assert!(is_mismatch);
            }
        }
    }
}
