//! Header summary extraction
//!
//! Maps the handful of Timer fields the RM pipeline needs onto a [`HeaderInfo`].
//! Everything else in the record is ignored here.

use tracing::debug;

use crate::InterpretError;
use crate::types::{DecodedRecord, HeaderInfo, Position};

/// Names of the Timer members read by [`interpret`].
pub mod fields {
    pub const MJD: &str = "mjd";
    pub const FRACMJD: &str = "fracmjd";
    pub const NSUB_INT: &str = "nsub_int";
    pub const SUB_INT_TIME: &str = "sub_int_time";
    pub const COORD_TYPE: &str = "coord_type";
    pub const RA: &str = "ra";
    pub const DEC: &str = "dec";
    pub const GAL_L: &str = "l";
    pub const GAL_B: &str = "b";
    pub const TELID: &str = "telid";
    pub const PSRNAME: &str = "psrname";
}

/// `coord_type` value for galactic coordinates (degrees).
pub const COORD_GALACTIC: &str = "04";
/// `coord_type` value for equatorial coordinates (radians).
pub const COORD_EQUATORIAL: &str = "05";

/// Build the header summary from a decoded record.
pub fn interpret(record: &DecodedRecord) -> Result<HeaderInfo, InterpretError> {
    let mjd = f64::from(record.int(fields::MJD)?) + record.real(fields::FRACMJD)?;
    let duration_seconds =
        f64::from(record.int(fields::NSUB_INT)?) * record.real(fields::SUB_INT_TIME)?;
    let position = position(record)?;
    let telescope = record.text(fields::TELID)?.to_string();
    let name = record.text(fields::PSRNAME)?.to_string();

    debug!(
        %telescope,
        source = %name,
        mjd,
        duration_seconds,
        ?position,
        "Interpreted Timer header"
    );
    Ok(HeaderInfo { telescope, name, mjd, duration_seconds, position })
}

/// Pointing selected by the `coord_type` discriminator.
///
/// Only the members of the selected coordinate system are required.
pub fn position(record: &DecodedRecord) -> Result<Option<Position>, InterpretError> {
    let position = match record.text(fields::COORD_TYPE)? {
        COORD_EQUATORIAL => Some(Position::Equatorial {
            ra_rad: record.real(fields::RA)?,
            dec_rad: record.real(fields::DEC)?,
        }),
        COORD_GALACTIC => Some(Position::Galactic {
            l_deg: record.real(fields::GAL_L)?,
            b_deg: record.real(fields::GAL_B)?,
        }),
        _ => None,
    };
    Ok(position)
}
