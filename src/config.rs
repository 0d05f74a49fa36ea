//! RM computation options
//!
//! Options can be built in code or loaded from YAML:
//!
//! ```yaml
//! timestep_seconds: 60
//! ionex_path: /data/IONEX
//! definition: /opt/psrchive/include/timer.h
//! sites:
//!   - name: ATCA
//!     aliases: [narrabri]
//!     x: -4752329.7
//!     y: 2790505.9
//!     z: -3200483.7
//! ```
//!
//! Every key is optional.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use crate::sites::{SiteCatalog, SiteEntry};
use crate::timer::SchemaSource;
use crate::{Result, RmError};

/// Default spacing between RM samples.
pub const DEFAULT_TIMESTEP_SECONDS: f64 = 100.0;
/// Default directory for downloaded IONEX maps.
pub const DEFAULT_IONEX_PATH: &str = "./IONEXdata/";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct RmOptions {
    /// Spacing of the computed RM series
    pub timestep_seconds: f64,
    /// Where the ionosphere model keeps IONEX maps
    pub ionex_path: PathBuf,
    /// Timer definition to use instead of the shipped one
    pub definition: Option<PathBuf>,
    /// Sites added to the built-in catalog
    pub sites: Vec<SiteEntry>,
}

impl Default for RmOptions {
    fn default() -> Self {
        Self {
            timestep_seconds: DEFAULT_TIMESTEP_SECONDS,
            ionex_path: PathBuf::from(DEFAULT_IONEX_PATH),
            definition: None,
            sites: Vec::new(),
        }
    }
}

impl RmOptions {
    pub fn from_yaml_str(yaml: &str) -> Result<Self> {
        let options: RmOptions = serde_yaml_ng::from_str(yaml)
            .map_err(|e| RmError::config_error("RM options YAML", e.to_string()))?;
        options.validate()?;
        Ok(options)
    }

    pub fn from_yaml_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let yaml = std::fs::read_to_string(path)
            .map_err(|e| RmError::file_error(path.to_path_buf(), e))?;
        Self::from_yaml_str(&yaml)
    }

    pub fn validate(&self) -> Result<()> {
        if !self.timestep_seconds.is_finite() || self.timestep_seconds <= 0.0 {
            return Err(RmError::config_error(
                "timestep_seconds",
                format!("must be a positive number of seconds, got {}", self.timestep_seconds),
            ));
        }
        if let Some(entry) = self.sites.iter().find(|s| s.name.trim().is_empty()) {
            return Err(RmError::config_error(
                "sites",
                format!("site at ({}, {}, {}) has an empty name", entry.x, entry.y, entry.z),
            ));
        }
        Ok(())
    }

    /// Where to read the Timer definition from.
    pub fn schema_source(&self) -> SchemaSource {
        SchemaSource::from_override(self.definition.clone())
    }

    /// Built-in sites extended with the configured ones.
    pub fn site_catalog(&self) -> SiteCatalog {
        SiteCatalog::with_entries(&self.sites)
    }
}
