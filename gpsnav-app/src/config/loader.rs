//! Appliance configuration file
//!
//! A missing file is not an error: the navigator runs on the built-in
//! defaults for the reference board.

use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use gpsnav_core::config::{ConfigIssue, NavConfig};
use log::{info, warn};
use thiserror::Error;

/// Where the configuration is looked up without `--config`
pub const DEFAULT_CONFIG_PATH: &str = "/etc/gpsnav/gpsnav.toml";

/// Configuration loading errors
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("cannot read {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error("invalid TOML: {0}")]
    Parse(#[from] toml::de::Error),
    #[error("invalid configuration: {0}")]
    Invalid(ConfigIssue),
}

impl From<ConfigIssue> for ConfigError {
    fn from(issue: ConfigIssue) -> Self {
        ConfigError::Invalid(issue)
    }
}

/// Parse and validate configuration text
pub fn parse_config(text: &str) -> Result<NavConfig, ConfigError> {
    let config: NavConfig = toml::from_str(text)?;
    config.validate()?;
    Ok(config)
}

/// Load the configuration file at `path`
pub fn load_config(path: &Path) -> Result<NavConfig, ConfigError> {
    let text = match fs::read_to_string(path) {
        Ok(text) => text,
        Err(err) if err.kind() == io::ErrorKind::NotFound => {
            warn!("{} not found, using defaults", path.display());
            return Ok(NavConfig::default());
        }
        Err(source) => {
            return Err(ConfigError::Io {
                path: path.to_path_buf(),
                source,
            })
        }
    };

    let config = parse_config(&text)?;
    info!("Loaded configuration from {}", path.display());
    Ok(config)
}

#[cfg(test)]
mod tests {
    use super::*;
    use gpsnav_core::config::PaletteColor;
    use std::io::Write;

    #[test]
    fn test_sample_config_parses() {
        let config = parse_config(include_str!("../../gpsnav.toml")).unwrap();
        assert_eq!(config, NavConfig::default());
    }

    #[test]
    fn test_partial_file_keeps_defaults() {
        let config = parse_config(
            r#"
            [display]
            scale = 2
            foreground = "green"

            [navigation]
            marker_glyph = "x"
            "#,
        )
        .unwrap();

        assert_eq!(config.display.scale, 2);
        assert_eq!(config.display.foreground, PaletteColor::Green);
        assert_eq!(config.display.width, 160);
        assert_eq!(config.navigation.marker_glyph, 'x');
        assert_eq!(config.navigation.invalid_fix_limit, 60);
        assert_eq!(config.serial.baud_rate, 9600);
    }

    #[test]
    fn test_validation_failure_reported() {
        let err = parse_config("[serial]\nbaud_rate = 0\n").unwrap_err();
        assert!(matches!(err, ConfigError::Invalid(ConfigIssue::ZeroBaudRate)));
    }

    #[test]
    fn test_syntax_error_reported() {
        let err = parse_config("[display\nwidth = 1").unwrap_err();
        assert!(matches!(err, ConfigError::Parse(_)));
    }

    #[test]
    fn test_unknown_color_rejected() {
        let err = parse_config("[display]\nbackground = \"mauve\"\n").unwrap_err();
        assert!(matches!(err, ConfigError::Parse(_)));
    }

    #[test]
    fn test_missing_file_uses_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let config = load_config(&dir.path().join("absent.toml")).unwrap();
        assert_eq!(config, NavConfig::default());
    }

    #[test]
    fn test_load_from_disk() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "[serial]\ndevice = \"/dev/ttyUSB0\"\nbaud_rate = 4800").unwrap();

        let config = load_config(file.path()).unwrap();
        assert_eq!(config.serial.device.as_str(), "/dev/ttyUSB0");
        assert_eq!(config.serial.baud_rate, 4800);
    }
}
