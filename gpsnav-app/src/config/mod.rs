//! Configuration and map catalog loading
//!
//! Both files are TOML. The appliance configuration lives on the root
//! filesystem; the map catalog lives on the USB stick next to the rasters.

pub mod catalog;
pub mod loader;

pub use catalog::{CatalogError, FileMapSource};
pub use loader::{load_config, parse_config, ConfigError, DEFAULT_CONFIG_PATH};
