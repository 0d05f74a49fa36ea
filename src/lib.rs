//! Ionospheric rotation measure for pulsar observations.
//!
//! simplerm reads the pointing, start time and length of an observation from a
//! PSRCHIVE Timer archive and asks an ionosphere model for the rotation measure
//! along that line of sight.
//!
//! # Features
//!
//! - **Schema-driven decoding**: the Timer header layout is derived from the C
//!   definition in `data/timer.h` (or any compatible file), parsed once per process
//! - **Typed results**: every header field is available, plus a [`HeaderInfo`] summary
//! - **PSRFITS headers**: pointing, start, length and telescope position from PSRFITS
//!   archives (file reading behind the `psrfits` feature)
//! - **Pluggable physics**: the RM computation sits behind [`rm::IonosphereModel`]
//!
//! ## Example (header only)
//!
//! ```rust,no_run
//! use simplerm::timer::TimerReader;
//!
//! fn main() -> simplerm::Result<()> {
//!     let reader = TimerReader::open("J0437-4715.timer")?;
//!     let header = reader.header();
//!     println!("{} at {} for {} s", header.name, header.mjd, header.duration_seconds);
//!     if let Some(position) = header.position {
//!         println!("pointing {position:?}");
//!     }
//!     Ok(())
//! }
//! ```

mod error;
#[cfg_attr(any(test, feature = "benchmark"), path = "test_utils.rs")]
#[cfg(any(test, feature = "benchmark"))]
pub mod test_utils;
pub mod types;

pub mod config;
pub mod psrfits;
pub mod rm;
pub mod sites;
pub mod timer;

// Core exports
pub use error::*;
pub use types::*;

pub use config::RmOptions;
pub use psrfits::{PsrfitsHeader, PsrfitsKeywords};
pub use sites::{GeocentricCoordinates, SiteCatalog, SiteLookup};
pub use timer::{SchemaCache, SchemaSource, TimerReader, read_header};
