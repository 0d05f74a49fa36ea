//! PSRFITS observation headers
//!
//! PSRFITS archives record the pointing as sexagesimal strings, the start as an
//! integer day plus seconds, and the length as the sum of the sub-integration
//! times. They also record the telescope position (`ANT_X/Y/Z`), which stands in
//! for the site when the telescope name is not in the catalog.
//!
//! Reading the FITS file needs the `psrfits` feature. Turning the raw keywords
//! into a [`PsrfitsHeader`] does not.

#[cfg(feature = "psrfits")]
mod fits;
#[cfg(feature = "psrfits")]
pub use fits::{read_keywords, read_psrfits_header};

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use tracing::debug;

use crate::sites::GeocentricCoordinates;
use crate::types::{HeaderInfo, Position, SECONDS_PER_DAY};
use crate::{Result, RmError};

/// Header keywords and table columns read from a PSRFITS archive.
pub mod keywords {
    pub const TELESCOPE: &str = "TELESCOP";
    pub const SOURCE: &str = "SRC_NAME";
    pub const RA: &str = "RA";
    pub const DEC: &str = "DEC";
    pub const START_DAY: &str = "STT_IMJD";
    pub const START_SECONDS: &str = "STT_SMJD";
    pub const START_OFFSET: &str = "STT_OFFS";
    pub const ANTENNA: [&str; 3] = ["ANT_X", "ANT_Y", "ANT_Z"];
    pub const SUBINT_TABLE: &str = "SUBINT";
    pub const SUBINT_LENGTH: &str = "TSUBINT";
}

/// Raw header values of a PSRFITS archive.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PsrfitsKeywords {
    pub telescope: String,
    pub source_name: String,
    /// `RA` as written, `hh:mm:ss.s`
    pub ra: String,
    /// `DEC` as written, `[+-]dd:mm:ss.s`
    pub dec: String,
    pub start_day: i64,
    pub start_seconds: f64,
    pub start_offset_seconds: f64,
    /// `ANT_X/Y/Z` in metres, when the file has them
    pub antenna: Option<[f64; 3]>,
    /// `TSUBINT` of every sub-integration
    pub subint_seconds: Vec<f64>,
}

/// Observation summary of a PSRFITS archive.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PsrfitsHeader {
    pub path: PathBuf,
    pub info: HeaderInfo,
    /// Telescope position recorded in the file
    pub telescope_coordinates: Option<GeocentricCoordinates>,
}

impl PsrfitsKeywords {
    /// Derive the observation summary. `path` only labels errors.
    pub fn interpret(&self, path: &Path) -> Result<PsrfitsHeader> {
        let ra_rad = parse_hours(&self.ra).ok_or_else(|| unusable(path, keywords::RA, &self.ra))?;
        let dec_rad =
            parse_degrees(&self.dec).ok_or_else(|| unusable(path, keywords::DEC, &self.dec))?;

        let mjd = self.start_day as f64
            + (self.start_seconds + self.start_offset_seconds) / SECONDS_PER_DAY;
        let duration_seconds: f64 = self.subint_seconds.iter().sum();

        // All-zero antenna coordinates mean the writer did not know the site
        let telescope_coordinates = self
            .antenna
            .filter(|xyz| xyz.iter().any(|c| *c != 0.0))
            .map(|[x, y, z]| GeocentricCoordinates::new(x, y, z));

        let info = HeaderInfo {
            telescope: self.telescope.trim().to_string(),
            name: self.source_name.trim().to_string(),
            mjd,
            duration_seconds,
            position: Some(Position::Equatorial { ra_rad, dec_rad }),
        };
        debug!(
            path = %path.display(),
            telescope = %info.telescope,
            mjd,
            duration_seconds,
            subints = self.subint_seconds.len(),
            "Interpreted PSRFITS header"
        );
        Ok(PsrfitsHeader { path: path.to_path_buf(), info, telescope_coordinates })
    }
}

fn unusable(path: &Path, keyword: &str, value: &str) -> RmError {
    RmError::psrfits_error(path, format!("keyword {keyword} has unusable value '{value}'"))
}

/// Right ascension `hh:mm:ss.s` in radians.
pub fn parse_hours(text: &str) -> Option<f64> {
    let hours = parse_sexagesimal(text)?;
    (0.0..24.0).contains(&hours).then(|| (hours * 15.0).to_radians())
}

/// Declination `[+-]dd:mm:ss.s` in radians.
pub fn parse_degrees(text: &str) -> Option<f64> {
    let degrees = parse_sexagesimal(text)?;
    (-90.0..=90.0).contains(&degrees).then(|| degrees.to_radians())
}

/// Up to three colon-separated components; the sign applies to the whole value
/// so `-00:30:00` is negative.
fn parse_sexagesimal(text: &str) -> Option<f64> {
    let text = text.trim();
    let (negative, body) = match text.strip_prefix('-') {
        Some(rest) => (true, rest),
        None => (false, text.strip_prefix('+').unwrap_or(text)),
    };

    let mut value = 0.0;
    let mut scale = 1.0;
    for (index, part) in body.split(':').enumerate() {
        if index >= 3 {
            return None;
        }
        let part = part.trim();
        if part.starts_with(['-', '+']) {
            return None;
        }
        let component: f64 = part.parse().ok().filter(|c: &f64| c.is_finite())?;
        value += component / scale;
        scale *= 60.0;
    }
    Some(if negative { -value } else { value })
}
