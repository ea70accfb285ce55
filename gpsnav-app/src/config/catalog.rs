//! Map catalog on removable storage
//!
//! `maps.toml` lists one `[[map]]` table per raster:
//!
//! ```toml
//! [[map]]
//! file = "framingham.raw"
//! width = 640
//! height = 480
//! top_left = { latitude = 42.2950, longitude = -71.2520 }
//! bottom_right = { latitude = 42.2490, longitude = -71.1760 }
//! ```
//!
//! Raster files are resolved relative to the catalog's directory.

use std::fs;
use std::io;
use std::path::PathBuf;

use gpsnav_core::map::MapDescriptor;
use gpsnav_core::traits::MapSource;
use log::{debug, warn};
use serde::Deserialize;
use thiserror::Error;

/// Catalog and raster read errors
#[derive(Debug, Error)]
pub enum CatalogError {
    #[error("cannot read {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error("invalid map catalog: {0}")]
    Parse(#[from] toml::de::Error),
}

#[derive(Debug, Default, Deserialize)]
struct CatalogFile {
    #[serde(default)]
    map: Vec<MapDescriptor>,
}

/// Parse catalog text, keeping file order
pub fn parse_catalog(text: &str) -> Result<Vec<MapDescriptor>, CatalogError> {
    let file: CatalogFile = toml::from_str(text)?;
    Ok(file.map)
}

/// File-backed map source
pub struct FileMapSource {
    dir: PathBuf,
    catalog: PathBuf,
}

impl FileMapSource {
    /// Catalog at `dir/catalog`, rasters under `dir`
    pub fn new(dir: impl Into<PathBuf>, catalog: &str) -> Self {
        let dir = dir.into();
        let catalog = dir.join(catalog);
        Self { dir, catalog }
    }
}

impl MapSource for FileMapSource {
    type Error = CatalogError;

    fn descriptors(&mut self) -> Result<Vec<MapDescriptor>, Self::Error> {
        let text = match fs::read_to_string(&self.catalog) {
            Ok(text) => text,
            Err(err) if err.kind() == io::ErrorKind::NotFound => {
                warn!("no map catalog at {}", self.catalog.display());
                return Ok(Vec::new());
            }
            Err(source) => {
                return Err(CatalogError::Io {
                    path: self.catalog.clone(),
                    source,
                })
            }
        };
        parse_catalog(&text)
    }

    fn read_raster(&mut self, map: &MapDescriptor) -> Result<Vec<u8>, Self::Error> {
        let path = self.dir.join(map.file.as_str());
        debug!("reading raster {}", path.display());
        fs::read(&path).map_err(|source| CatalogError::Io { path, source })
    }
}
