//! Header summary derived from a decoded Timer record

use serde::{Deserialize, Serialize};

/// Seconds per day, for MJD conversions.
pub const SECONDS_PER_DAY: f64 = 86_400.0;

/// Sky position of the observed source.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum Position {
    /// Equatorial coordinates in radians
    Equatorial { ra_rad: f64, dec_rad: f64 },
    /// Galactic coordinates in degrees
    Galactic { l_deg: f64, b_deg: f64 },
}

/// Summary of a Timer header.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HeaderInfo {
    /// Observatory identifier as written by the backend
    pub telescope: String,
    /// Source (pulsar) name
    pub name: String,
    /// Start of the observation as a Modified Julian Day
    pub mjd: f64,
    /// Length of the observation in seconds
    pub duration_seconds: f64,
    /// Pointing, absent when the coordinate type is not recognised
    pub position: Option<Position>,
}

impl HeaderInfo {
    /// End of the observation as a Modified Julian Day.
    pub fn end_mjd(&self) -> f64 {
        self.mjd + self.duration_seconds / SECONDS_PER_DAY
    }

    pub fn window(&self) -> ObservationWindow {
        ObservationWindow { start_mjd: self.mjd, end_mjd: self.end_mjd() }
    }
}

/// Time span covered by an observation, in MJD.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ObservationWindow {
    pub start_mjd: f64,
    pub end_mjd: f64,
}

impl ObservationWindow {
    /// The window as `[start, end]` in seconds since MJD 0.
    pub fn to_seconds(&self) -> [f64; 2] {
        [self.start_mjd * SECONDS_PER_DAY, self.end_mjd * SECONDS_PER_DAY]
    }
}
