//! CSV track logger
//!
//! Every logger session appends a comment header followed by one row
//! per fused fix. Rows are flushed immediately so pulling the USB stick
//! loses at most the row being written.

use std::fs::{File, OpenOptions};
use std::io::{self, Write};
use std::path::Path;

use gpsnav_core::Position;
use thiserror::Error;

/// Written at the start of every session
pub const HEADER: &str =
    "#\n# GPS logger\n#\n#logged_points,gga_time,latitude,longitude,ground_spd,heading\n";

/// Track log write errors
#[derive(Debug, Error)]
pub enum TrackLogError {
    #[error("log file: {0}")]
    Io(#[from] io::Error),
    #[error("log record: {0}")]
    Csv(#[from] csv::Error),
}

/// One logging session
pub struct TrackLog<W: Write> {
    writer: csv::Writer<W>,
    logged: u32,
}

impl TrackLog<File> {
    /// Open `path` for appending, creating it if needed
    pub fn open(path: &Path) -> Result<Self, TrackLogError> {
        let file = OpenOptions::new().append(true).create(true).open(path)?;
        Self::new(file)
    }
}

impl<W: Write> TrackLog<W> {
    /// Start a session on `inner` by writing the header
    pub fn new(mut inner: W) -> Result<Self, TrackLogError> {
        inner.write_all(HEADER.as_bytes())?;
        inner.flush()?;
        let writer = csv::WriterBuilder::new()
            .has_headers(false)
            .from_writer(inner);
        Ok(Self { writer, logged: 0 })
    }

    /// Rows written this session
    pub fn logged(&self) -> u32 {
        self.logged
    }

    /// Append one row and return the new row count
    pub fn append(&mut self, position: &Position) -> Result<u32, TrackLogError> {
        self.writer.write_record([
            self.logged.to_string(),
            position.gga_stamp().to_string(),
            format!("{:.6}", position.latitude),
            format!("{:.6}", position.longitude),
            format!("{:.2}", position.ground_speed_mph),
            format!("{:.1}", position.heading),
        ])?;
        self.writer.flush()?;
        self.logged += 1;
        Ok(self.logged)
    }

    /// Finish the session and return the sink
    #[cfg(test)]
    fn into_inner(self) -> Result<W, TrackLogError> {
        self.writer
            .into_inner()
            .map_err(|err| TrackLogError::Io(err.into_error()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use gpsnav_core::parse_sentence;
    use proptest::prelude::*;
    use std::fs;

    const GGA: &str = "$GPGGA,123519,4807.038,N,01131.000,E,1,08,0.9,545.4,M,46.9,M,,*47";
    const RMC: &str = "$GPRMC,123519,A,4807.038,N,01131.000,E,022.4,084.4,230394,003.1,W*6A";

    fn fused() -> Position {
        let mut position = Position::new();
        parse_sentence(GGA, &mut position);
        parse_sentence(RMC, &mut position);
        assert!(position.is_fused());
        position
    }

    #[test]
    fn test_header_then_rows() {
        let mut log = TrackLog::new(Vec::new()).unwrap();
        let position = fused();
        assert_eq!(log.append(&position).unwrap(), 1);
        assert_eq!(log.append(&position).unwrap(), 2);

        let text = String::from_utf8(log.into_inner().unwrap()).unwrap();
        let expected = format!(
            "{}0,123519,48.117300,11.516667,25.78,84.4\n1,123519,48.117300,11.516667,25.78,84.4\n",
            HEADER
        );
        assert_eq!(text, expected);
    }

    #[test]
    fn test_empty_session_is_header_only() {
        let log = TrackLog::new(Vec::new()).unwrap();
        assert_eq!(log.logged(), 0);
        assert_eq!(log.into_inner().unwrap(), HEADER.as_bytes());
    }

    #[test]
    fn test_sessions_append() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("logger.csv");
        let position = fused();

        for _ in 0..2 {
            let mut log = TrackLog::open(&path).unwrap();
            log.append(&position).unwrap();
        }

        let text = fs::read_to_string(&path).unwrap();
        assert_eq!(text.matches("# GPS logger").count(), 2);
        // Sequence restarts with each session
        assert_eq!(text.matches("\n0,123519,").count(), 2);
    }

    #[test]
    fn test_open_fails_without_directory() {
        let dir = tempfile::tempdir().unwrap();
        let result = TrackLog::open(&dir.path().join("missing").join("logger.csv"));
        assert!(matches!(result, Err(TrackLogError::Io(_))));
    }

    proptest! {
        #[test]
        fn prop_row_keeps_logged_precision(
            latitude in -90.0f64..=90.0,
            longitude in -180.0f64..=180.0,
            speed in 0.0f32..1000.0,
            heading in 0.0f32..360.0,
        ) {
            let mut position = Position::new();
            position.latitude = latitude;
            position.longitude = longitude;
            position.ground_speed_mph = speed;
            position.heading = heading;
            let mut log = TrackLog::new(Vec::new()).unwrap();
            log.append(&position).unwrap();

            let text = String::from_utf8(log.into_inner().unwrap()).unwrap();
            let row = text.strip_prefix(HEADER).unwrap().trim_end();
            let fields: Vec<&str> = row.split(',').collect();
            prop_assert_eq!(fields.len(), 6);
            prop_assert_eq!(fields[0], "0");
            prop_assert!((fields[2].parse::<f64>().unwrap() - latitude).abs() <= 5.1e-7);
            prop_assert!((fields[3].parse::<f64>().unwrap() - longitude).abs() <= 5.1e-7);
            prop_assert_eq!(fields[5].split('.').nth(1).map(str::len), Some(1));
        }
    }
}
