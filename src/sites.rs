//! Observatory locations
//!
//! Resolves the telescope identifier written in a Timer header to geocentric
//! (ITRF) coordinates in metres. Lookups ignore case and surrounding whitespace,
//! and every site can be reached through its tempo code and common aliases.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use tracing::warn;

use crate::{Result, RmError};

/// Earth-centred, Earth-fixed position in metres.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GeocentricCoordinates {
    pub x: f64,
    pub y: f64,
    pub z: f64,
}

impl GeocentricCoordinates {
    pub const fn new(x: f64, y: f64, z: f64) -> Self {
        Self { x, y, z }
    }

    pub fn as_array(&self) -> [f64; 3] {
        [self.x, self.y, self.z]
    }
}

/// Resolves telescope identifiers to site coordinates.
pub trait SiteLookup: Send + Sync {
    /// Returns [`RmError::UnknownSite`] for identifiers it does not know.
    fn lookup_site(&self, telescope: &str) -> Result<GeocentricCoordinates>;
}

/// A named site, as accepted in configuration files.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SiteEntry {
    pub name: String,
    #[serde(default)]
    pub aliases: Vec<String>,
    pub x: f64,
    pub y: f64,
    pub z: f64,
}

impl SiteEntry {
    pub fn coordinates(&self) -> GeocentricCoordinates {
        GeocentricCoordinates::new(self.x, self.y, self.z)
    }
}

// (name, aliases, x, y, z) from the tempo2 observatory list
const BUILTIN_SITES: &[(&str, &[&str], f64, f64, f64)] = &[
    ("parkes", &["pks", "pk", "7"], -4554231.5, 2816759.1, -3454036.3),
    ("gbt", &["green bank", "gb", "1"], 882589.65, -4924872.32, 3943729.348),
    ("arecibo", &["ao", "3"], 2390490.0, -5564764.0, 1994727.0),
    ("effelsberg", &["eff", "ef", "g"], 4033949.5, 486989.4, 4900430.8),
    ("jodrell", &["jodrell bank", "jb", "8"], 3822626.04, -154105.65, 5086486.04),
    ("nancay", &["ncy", "nc", "f"], 4324165.81, 165927.11, 4670132.83),
    ("wsrt", &["westerbork", "we", "i"], 3828445.659, 445223.6, 5064921.5677),
    ("meerkat", &["mk", "m"], 5109360.133, 2006852.586, -3238948.127),
];

/// In-memory site table.
///
/// Aliases point at a canonical site name, so replacing a site's coordinates
/// moves every alias with it.
#[derive(Debug, Clone, Default)]
pub struct SiteCatalog {
    sites: HashMap<String, GeocentricCoordinates>,
    aliases: HashMap<String, String>,
}

impl SiteCatalog {
    /// An empty catalog.
    pub fn new() -> Self {
        Self::default()
    }

    /// Catalog preloaded with common pulsar observatories.
    pub fn builtin() -> Self {
        let mut catalog = Self::new();
        for (name, aliases, x, y, z) in BUILTIN_SITES {
            let coordinates = GeocentricCoordinates::new(*x, *y, *z);
            catalog.insert_with_aliases(name, aliases.iter().copied(), coordinates);
        }
        catalog
    }

    /// Built-in sites plus `entries`. An entry naming a built-in site or one of
    /// its aliases replaces that site's coordinates for every alias.
    pub fn with_entries<'a>(entries: impl IntoIterator<Item = &'a SiteEntry>) -> Self {
        let mut catalog = Self::builtin();
        for entry in entries {
            catalog.insert_with_aliases(
                &entry.name,
                entry.aliases.iter().map(String::as_str),
                entry.coordinates(),
            );
        }
        catalog
    }

    /// Set the coordinates of `name`, resolving it through the aliases first.
    pub fn insert(&mut self, name: &str, coordinates: GeocentricCoordinates) {
        let key = self.canonical(name);
        self.sites.insert(key, coordinates);
    }

    /// Set the coordinates of `name` and make each alias resolve to it.
    pub fn insert_with_aliases<'a>(
        &mut self,
        name: &str,
        aliases: impl IntoIterator<Item = &'a str>,
        coordinates: GeocentricCoordinates,
    ) {
        let key = self.canonical(name);
        for alias in aliases {
            let alias = normalize(alias);
            if alias != key {
                self.sites.remove(&alias);
                for target in self.aliases.values_mut().filter(|target| **target == alias) {
                    *target = key.clone();
                }
                self.aliases.insert(alias, key.clone());
            }
        }
        self.sites.insert(key, coordinates);
    }

    pub fn get(&self, telescope: &str) -> Option<GeocentricCoordinates> {
        self.sites.get(&self.canonical(telescope)).copied()
    }

    /// Number of names (including aliases) the catalog resolves.
    pub fn len(&self) -> usize {
        self.sites.len() + self.aliases.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sites.is_empty()
    }

    fn canonical(&self, name: &str) -> String {
        let name = normalize(name);
        self.aliases.get(&name).cloned().unwrap_or(name)
    }
}

impl SiteLookup for SiteCatalog {
    fn lookup_site(&self, telescope: &str) -> Result<GeocentricCoordinates> {
        self.get(telescope).ok_or_else(|| {
            warn!(telescope, "Unknown site");
            RmError::UnknownSite { telescope: telescope.to_string() }
        })
    }
}

fn normalize(name: &str) -> String {
    name.trim().to_lowercase()
}
