//! Ionospheric rotation measure orchestration
//!
//! The physics lives behind [`IonosphereModel`]; this module only prepares the
//! request (pointing, time range in seconds, site, timestep, IONEX directory) and
//! turns the answer back into an MJD-stamped [`RmSeries`].
//!
//! ## Usage Example
//!
//! ```rust,no_run
//! use simplerm::rm::{IonosphereModel, RawRmSeries, RmRequest, rm_for_timer_file};
//! use simplerm::RmOptions;
//!
//! struct Model;
//!
//! #[async_trait::async_trait]
//! impl IonosphereModel for Model {
//!     async fn compute_rm(&self, request: &RmRequest) -> simplerm::Result<Option<RawRmSeries>> {
//!         // Call out to an ionosphere library here.
//!         Ok(None)
//!     }
//! }
//!
//! #[tokio::main]
//! async fn main() -> simplerm::Result<()> {
//!     let options = RmOptions::default();
//!     let sites = options.site_catalog();
//!     if let Some((series, header)) =
//!         rm_for_timer_file("obs.timer", &sites, &Model, &options).await?
//!     {
//!         for (mjd, rm) in series.iter() {
//!             println!("{} {mjd:.6} {rm:.3}", header.name);
//!         }
//!     }
//!     Ok(())
//! }
//! ```

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use tracing::{debug, error};

use crate::config::RmOptions;
use crate::psrfits::PsrfitsHeader;
use crate::sites::{GeocentricCoordinates, SiteLookup};
use crate::timer::TimerReader;
use crate::timer::reader::join_blocking;
use crate::timer::interpret::fields;
use crate::types::{HeaderInfo, ObservationWindow, Position, SECONDS_PER_DAY};
use crate::{Result, RmError};

/// Everything the ionosphere model needs for one line of sight.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RmRequest {
    pub position: Position,
    /// `[start, end]` in seconds since MJD 0
    pub time_range_seconds: [f64; 2],
    pub site: GeocentricCoordinates,
    pub timestep_seconds: f64,
    pub ionex_path: PathBuf,
}

/// Model output: sample times in seconds since MJD 0 and RM in rad m^-2.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RawRmSeries {
    pub times_seconds: Vec<f64>,
    pub rm: Vec<f64>,
}

/// RM samples stamped with MJD.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RmSeries {
    pub times_mjd: Vec<f64>,
    pub rm: Vec<f64>,
}

impl RmSeries {
    /// Pairs of (MJD, RM).
    pub fn iter(&self) -> impl Iterator<Item = (f64, f64)> + '_ {
        self.times_mjd.iter().copied().zip(self.rm.iter().copied())
    }

    pub fn len(&self) -> usize {
        self.rm.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rm.is_empty()
    }
}

impl TryFrom<RawRmSeries> for RmSeries {
    type Error = RmError;

    fn try_from(raw: RawRmSeries) -> Result<Self> {
        if raw.times_seconds.len() != raw.rm.len() {
            return Err(RmError::model_failed(format!(
                "model returned {} times but {} RM values",
                raw.times_seconds.len(),
                raw.rm.len()
            )));
        }
        let times_mjd = raw.times_seconds.iter().map(|t| t / SECONDS_PER_DAY).collect();
        Ok(RmSeries { times_mjd, rm: raw.rm })
    }
}

/// External ionospheric RM computation.
#[async_trait::async_trait]
pub trait IonosphereModel: Send + Sync {
    /// Compute RM along the requested line of sight.
    ///
    /// Returns:
    /// - `Ok(Some(series))` - RM samples for the time range
    /// - `Ok(None)` - the model produced no result (for example no IONEX maps)
    /// - `Err(e)` - the model failed
    async fn compute_rm(&self, request: &RmRequest) -> Result<Option<RawRmSeries>>;
}

/// Compute RM for one pointing, site and time range.
pub async fn compute_rm<M>(
    model: &M,
    position: Position,
    window: ObservationWindow,
    site: GeocentricCoordinates,
    options: &RmOptions,
) -> Result<Option<RmSeries>>
where
    M: IonosphereModel + ?Sized,
{
    options.validate()?;
    let request = RmRequest {
        position,
        time_range_seconds: window.to_seconds(),
        site,
        timestep_seconds: options.timestep_seconds,
        ionex_path: options.ionex_path.clone(),
    };
    debug!(?site, ?position, start = window.start_mjd, end = window.end_mjd, "Computing RM");

    match model.compute_rm(&request).await? {
        Some(raw) => RmSeries::try_from(raw).map(Some),
        None => {
            error!("No RM results returned");
            Ok(None)
        }
    }
}

/// Compute RM for the observation recorded in a Timer file.
///
/// The header is decoded on the blocking pool. A header without a recognised
/// position and an unknown telescope are both errors; the caller decides how to
/// recover.
pub async fn rm_for_timer_file<P, S, M>(
    path: P,
    sites: &S,
    model: &M,
    options: &RmOptions,
) -> Result<Option<(RmSeries, HeaderInfo)>>
where
    P: AsRef<Path>,
    S: SiteLookup + ?Sized,
    M: IonosphereModel + ?Sized,
{
    let path = path.as_ref().to_path_buf();
    let source = options.schema_source();
    debug!(path = %path.display(), "Reading Timer file");

    let task_path = path.clone();
    let joined =
        tokio::task::spawn_blocking(move || TimerReader::open_with_source(&task_path, &source))
            .await;
    let reader = join_blocking(joined, &path)?;

    let header = reader.header().clone();
    let Some(position) = header.position else {
        let coord_type = reader.record().text(fields::COORD_TYPE).unwrap_or_default();
        return Err(RmError::MissingPosition { path, coord_type: coord_type.to_string() });
    };
    let site = sites.lookup_site(&header.telescope)?;

    let series = compute_rm(model, position, header.window(), site, options).await?;
    Ok(series.map(|series| (series, header)))
}

/// Site coordinates for `telescope`, falling back to the position recorded with
/// the observation when the catalog does not know the name.
pub fn resolve_site<S>(
    sites: &S,
    telescope: &str,
    recorded: Option<GeocentricCoordinates>,
) -> Result<GeocentricCoordinates>
where
    S: SiteLookup + ?Sized,
{
    match (sites.lookup_site(telescope), recorded) {
        (Err(RmError::UnknownSite { .. }), Some(coordinates)) => {
            debug!(telescope, ?coordinates, "Using telescope position recorded in the file");
            Ok(coordinates)
        }
        (result, _) => result,
    }
}

/// Compute RM for an observation described by a PSRFITS header.
///
/// A telescope missing from `sites` falls back to the coordinates recorded in
/// the file; only when neither is available is the site unknown.
pub async fn rm_for_psrfits_header<S, M>(
    header: PsrfitsHeader,
    sites: &S,
    model: &M,
    options: &RmOptions,
) -> Result<Option<(RmSeries, HeaderInfo)>>
where
    S: SiteLookup + ?Sized,
    M: IonosphereModel + ?Sized,
{
    let PsrfitsHeader { path, info, telescope_coordinates } = header;
    let Some(position) = info.position else {
        return Err(RmError::MissingPosition { path, coord_type: String::new() });
    };
    let site = resolve_site(sites, &info.telescope, telescope_coordinates)?;

    let series = compute_rm(model, position, info.window(), site, options).await?;
    Ok(series.map(|series| (series, info)))
}

/// Compute RM for the observation recorded in a PSRFITS file.
#[cfg(feature = "psrfits")]
pub async fn rm_for_psrfits_file<P, S, M>(
    path: P,
    sites: &S,
    model: &M,
    options: &RmOptions,
) -> Result<Option<(RmSeries, HeaderInfo)>>
where
    P: AsRef<Path>,
    S: SiteLookup + ?Sized,
    M: IonosphereModel + ?Sized,
{
    let path = path.as_ref().to_path_buf();
    let task_path = path.clone();
    let joined =
        tokio::task::spawn_blocking(move || crate::psrfits::read_psrfits_header(&task_path))
            .await;
    let header = join_blocking(joined, &path)?;
    rm_for_psrfits_header(header, sites, model, options).await
}
