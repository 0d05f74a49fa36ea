//! PSRFITS keyword reading through CFITSIO

use std::path::Path;

use fitsio::FitsFile;
use fitsio::hdu::FitsHdu;
use fitsio::headers::ReadsKey;
use tracing::{debug, trace};

use super::{PsrfitsHeader, PsrfitsKeywords, keywords};
use crate::{Result, RmError};

// KEY_NO_EXIST, VALUE_UNDEFINED
const ABSENT_KEY_STATUS: [i32; 2] = [202, 204];

/// Read the header keywords and sub-integration lengths of a PSRFITS file.
pub fn read_keywords<P: AsRef<Path>>(path: P) -> Result<PsrfitsKeywords> {
    let path = path.as_ref();
    let mut fptr = FitsFile::open(path)
        .map_err(|e| RmError::psrfits_error(path, format!("cannot open: {e}")))?;
    let primary = fptr
        .primary_hdu()
        .map_err(|e| RmError::psrfits_error(path, format!("no primary HDU: {e}")))?;
    debug!(path = %path.display(), "Reading PSRFITS header");

    let mut antenna = [0.0; 3];
    let mut antenna_known = true;
    for (slot, keyword) in antenna.iter_mut().zip(keywords::ANTENNA) {
        match optional_key::<f64>(&mut fptr, &primary, path, keyword) {
            Ok(Some(value)) => *slot = value,
            Ok(None) => antenna_known = false,
            Err(e) => {
                trace!(keyword, error = %e, "Ignoring unreadable telescope coordinate");
                antenna_known = false;
            }
        }
    }

    let parsed = PsrfitsKeywords {
        telescope: required_key(&mut fptr, &primary, path, keywords::TELESCOPE)?,
        source_name: optional_key(&mut fptr, &primary, path, keywords::SOURCE)?
            .unwrap_or_default(),
        ra: required_key(&mut fptr, &primary, path, keywords::RA)?,
        dec: required_key(&mut fptr, &primary, path, keywords::DEC)?,
        start_day: required_key(&mut fptr, &primary, path, keywords::START_DAY)?,
        start_seconds: required_key(&mut fptr, &primary, path, keywords::START_SECONDS)?,
        start_offset_seconds: optional_key(&mut fptr, &primary, path, keywords::START_OFFSET)?
            .unwrap_or(0.0),
        antenna: antenna_known.then_some(antenna),
        subint_seconds: subint_lengths(&mut fptr, path)?,
    };
    Ok(parsed)
}

/// Read and interpret the observation summary of a PSRFITS file.
pub fn read_psrfits_header<P: AsRef<Path>>(path: P) -> Result<PsrfitsHeader> {
    let path = path.as_ref();
    read_keywords(path)?.interpret(path)
}

fn subint_lengths(fptr: &mut FitsFile, path: &Path) -> Result<Vec<f64>> {
    let table = fptr.hdu(keywords::SUBINT_TABLE).map_err(|e| {
        RmError::psrfits_error(path, format!("no {} table: {e}", keywords::SUBINT_TABLE))
    })?;
    table.read_col(fptr, keywords::SUBINT_LENGTH).map_err(|e| {
        RmError::psrfits_error(path, format!("reading {}: {e}", keywords::SUBINT_LENGTH))
    })
}

fn optional_key<T: ReadsKey>(
    fptr: &mut FitsFile,
    hdu: &FitsHdu,
    path: &Path,
    keyword: &str,
) -> Result<Option<T>> {
    match hdu.read_key::<T>(fptr, keyword) {
        Ok(value) => Ok(Some(value)),
        Err(fitsio::errors::Error::Fits(e)) if ABSENT_KEY_STATUS.contains(&e.status) => {
            trace!(keyword, "Keyword absent");
            Ok(None)
        }
        Err(e) => Err(RmError::psrfits_error(path, format!("reading {keyword}: {e}"))),
    }
}

fn required_key<T: ReadsKey>(
    fptr: &mut FitsFile,
    hdu: &FitsHdu,
    path: &Path,
    keyword: &str,
) -> Result<T> {
    optional_key(fptr, hdu, path, keyword)?
        .ok_or_else(|| RmError::psrfits_error(path, format!("missing keyword {keyword}")))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::Position;
    use fitsio::tables::{ColumnDataType, ColumnDescription};
    use std::path::PathBuf;
    use std::sync::atomic::{AtomicUsize, Ordering};

    fn temp_fits_path(label: &str) -> PathBuf {
        static COUNTER: AtomicUsize = AtomicUsize::new(0);
        std::env::temp_dir().join(format!(
            "simplerm-{label}-{}-{}.sf",
            std::process::id(),
            COUNTER.fetch_add(1, Ordering::Relaxed)
        ))
    }

    /// Minimal PSRFITS file: primary keywords plus a SUBINT table.
    fn write_archive(label: &str, with_start_day: bool, antenna: [f64; 3]) -> PathBuf {
        let path = temp_fits_path(label);
        let mut fptr = FitsFile::create(&path).open().unwrap();
        let primary = fptr.primary_hdu().unwrap();
        primary.write_key(&mut fptr, "TELESCOP", "Effelsberg").unwrap();
        primary.write_key(&mut fptr, "SRC_NAME", "B1937+21").unwrap();
        primary.write_key(&mut fptr, "RA", "19:39:38.56").unwrap();
        primary.write_key(&mut fptr, "DEC", "+21:34:59.1").unwrap();
        if with_start_day {
            primary.write_key(&mut fptr, "STT_IMJD", 59000i64).unwrap();
        }
        primary.write_key(&mut fptr, "STT_SMJD", 43200i64).unwrap();
        primary.write_key(&mut fptr, "STT_OFFS", 0.25f64).unwrap();
        for (keyword, value) in keywords::ANTENNA.iter().zip(antenna) {
            primary.write_key(&mut fptr, keyword, value).unwrap();
        }

        let column = ColumnDescription::new("TSUBINT")
            .with_type(ColumnDataType::Double)
            .create()
            .unwrap();
        let table = fptr.create_table("SUBINT", &[column]).unwrap();
        table.write_col(&mut fptr, "TSUBINT", &[30.0f64, 30.0, 30.0]).unwrap();
        path
    }

    #[test]
    fn reads_primary_keywords_and_subint_lengths() {
        let path = write_archive("psrfits-read", true, [4033949.5, 486989.4, 4900430.8]);

        let header = read_psrfits_header(&path).unwrap();
        assert_eq!(header.info.telescope, "Effelsberg");
        assert_eq!(header.info.name, "B1937+21");
        assert!((header.info.mjd - (59000.5 + 0.25 / 86_400.0)).abs() < 1e-9);
        assert_eq!(header.info.duration_seconds, 90.0);
        assert!(matches!(header.info.position, Some(Position::Equatorial { .. })));
        assert!(header.telescope_coordinates.is_some());

        std::fs::remove_file(path).ok();
    }

    #[test]
    fn missing_required_keyword_is_named() {
        let path = write_archive("psrfits-missing", false, [0.0; 3]);
        let err = read_keywords(&path).unwrap_err();
        assert!(matches!(err, RmError::Psrfits { ref details, .. } if details.contains("STT_IMJD")));
        std::fs::remove_file(path).ok();
    }

    #[test]
    fn missing_file_is_a_psrfits_error() {
        let err = read_keywords("/nonexistent/obs.sf").unwrap_err();
        assert!(matches!(err, RmError::Psrfits { .. }));
    }
}
