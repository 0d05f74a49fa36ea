//! Timer file reader
//!
//! Opens a Timer archive, decodes its header with the cached schema and derives
//! the [`HeaderInfo`] summary.
//!
//! ## Usage Example
//!
//! ```rust,no_run
//! use simplerm::timer::TimerReader;
//!
//! fn show(path: &str) -> simplerm::Result<()> {
//!     let reader = TimerReader::open(path)?;
//!     let header = reader.header();
//!     println!("{} observed {} at MJD {:.6}", header.telescope, header.name, header.mjd);
//!     Ok(())
//! }
//! ```

use std::fs::File;
use std::io::BufReader;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use futures::stream::{self, StreamExt};
use tokio::task::JoinError;
use tracing::{debug, warn};

use super::cache::{SchemaCache, SchemaSource};
use super::decoder::{decode_bytes, decode_record};
use super::interpret::interpret;
use crate::types::{DecodedRecord, HeaderInfo, Schema};
use crate::{Result, RmError};

/// Decoded header of one Timer archive.
#[derive(Debug, Clone)]
pub struct TimerReader {
    path: PathBuf,
    schema: Arc<Schema>,
    record: DecodedRecord,
    header: HeaderInfo,
}

impl TimerReader {
    /// Open a Timer file using the shipped definition.
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self> {
        Self::open_with_source(path, &SchemaSource::Builtin)
    }

    /// Open a Timer file using the definition from `source`.
    pub fn open_with_source<P: AsRef<Path>>(path: P, source: &SchemaSource) -> Result<Self> {
        let schema = SchemaCache::global().get(source)?;
        Self::open_with_schema(path, schema)
    }

    /// Open a Timer file with an already parsed schema.
    pub fn open_with_schema<P: AsRef<Path>>(path: P, schema: Arc<Schema>) -> Result<Self> {
        let path = path.as_ref().to_path_buf();
        let file = File::open(&path).map_err(|e| RmError::file_error(path.clone(), e))?;
        let mut reader = BufReader::new(file);

        debug!(path = %path.display(), record_size = schema.record_size(), "Reading Timer header");
        let record = decode_record(&schema, &mut reader)?;
        Self::from_record(record, schema, path)
    }

    /// Decode a header from bytes using the shipped definition (for testing).
    pub fn from_bytes(data: &[u8]) -> Result<Self> {
        let schema = SchemaCache::global().get(&SchemaSource::Builtin)?;
        Self::from_bytes_with_schema(data, schema)
    }

    /// Decode a header from bytes with an explicit schema.
    pub fn from_bytes_with_schema(data: &[u8], schema: Arc<Schema>) -> Result<Self> {
        let record = decode_bytes(&schema, data)?;
        Self::from_record(record, schema, PathBuf::from("<memory>"))
    }

    fn from_record(record: DecodedRecord, schema: Arc<Schema>, path: PathBuf) -> Result<Self> {
        let header = interpret(&record)?;
        if header.position.is_none() {
            warn!(path = %path.display(), "Timer header has no recognised coordinate type");
        }
        Ok(Self { path, schema, record, header })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Schema the header was decoded with.
    pub fn schema(&self) -> &Schema {
        &self.schema
    }

    /// Every decoded header field.
    pub fn record(&self) -> &DecodedRecord {
        &self.record
    }

    pub fn header(&self) -> &HeaderInfo {
        &self.header
    }

    pub fn into_header(self) -> HeaderInfo {
        self.header
    }
}

/// Read the header summary of one Timer file with the shipped definition.
pub fn read_header<P: AsRef<Path>>(path: P) -> Result<HeaderInfo> {
    TimerReader::open(path).map(TimerReader::into_header)
}

/// Read many Timer headers, decoding up to `concurrency` files at once on the
/// blocking thread pool. Results keep the order of `paths`.
pub async fn read_headers(
    paths: Vec<PathBuf>,
    source: SchemaSource,
    concurrency: usize,
) -> Vec<(PathBuf, Result<HeaderInfo>)> {
    stream::iter(paths)
        .map(|path| {
            let source = source.clone();
            async move {
                let task_path = path.clone();
                let joined = tokio::task::spawn_blocking(move || {
                    TimerReader::open_with_source(&task_path, &source).map(TimerReader::into_header)
                })
                .await;
                let result = join_blocking(joined, &path);
                (path, result)
            }
        })
        .buffered(concurrency.max(1))
        .collect()
        .await
}

/// Unwrap a blocking header read. A panic inside the task is resumed on the
/// caller; only cancellation becomes an error.
pub(crate) fn join_blocking<T>(
    joined: std::result::Result<Result<T>, JoinError>,
    path: &Path,
) -> Result<T> {
    match joined {
        Ok(result) => result,
        Err(e) => match e.try_into_panic() {
            Ok(payload) => std::panic::resume_unwind(payload),
            Err(_) => Err(RmError::Cancelled { path: path.to_path_buf() }),
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_utils::{sample_header_bytes, write_temp_file};
    use crate::types::Position;
    use crate::{DecodeError, InterpretError};

    #[test]
    fn from_bytes_decodes_sample_header() {
        let reader = TimerReader::from_bytes(&sample_header_bytes("05")).unwrap();
        let header = reader.header();
        assert_eq!(header.telescope, "parkes");
        assert_eq!(header.name, "J0437-4715");
        assert_eq!(header.mjd, 58000.25);
        assert_eq!(header.duration_seconds, 50.0);
        assert_eq!(header.position, Some(Position::Equatorial { ra_rad: 1.0, dec_rad: 0.5 }));
        assert_eq!(reader.record().len(), reader.schema().len());
        assert_eq!(reader.path(), Path::new("<memory>"));
    }

    #[test]
    fn open_reads_only_the_header_prefix() {
        let mut data = sample_header_bytes("04");
        data.extend_from_slice(&[0xFF; 1024]); // profile data follows the header
        let path = write_temp_file("reader-open", &data);

        let reader = TimerReader::open(&path).unwrap();
        assert_eq!(reader.header().position, Some(Position::Galactic { l_deg: 10.0, b_deg: 20.0 }));
        assert_eq!(reader.path(), path.as_path());

        std::fs::remove_file(path).ok();
    }

    #[test]
    fn truncated_file_yields_no_header() {
        let data = sample_header_bytes("05");
        let path = write_temp_file("reader-truncated", &data[..200]);

        let err = TimerReader::open(&path).unwrap_err();
        assert!(matches!(err, RmError::Decode(DecodeError::Truncated { .. })));

        std::fs::remove_file(path).ok();
    }

    #[test]
    fn missing_file_reports_path() {
        let err = read_header("/nonexistent/archive.timer").unwrap_err();
        assert!(matches!(err, RmError::File { .. }));
    }

    #[test]
    fn schema_without_required_fields_fails_to_interpret() {
        let schema = Arc::new(crate::timer::parse_definition("int mjd;").unwrap());
        let err = TimerReader::from_bytes_with_schema(&[0, 0, 0, 1], schema).unwrap_err();
        assert!(matches!(
            err,
            RmError::Interpret(InterpretError::MissingField { ref field }) if field == "fracmjd"
        ));
    }

    #[tokio::test]
    #[should_panic(expected = "decoder bug")]
    async fn panicked_read_is_resumed() {
        let joined = tokio::task::spawn_blocking(|| -> Result<HeaderInfo> { panic!("decoder bug") })
            .await;
        let _ = join_blocking(joined, Path::new("a.timer"));
    }

    #[tokio::test]
    async fn finished_read_passes_through() {
        let joined = tokio::task::spawn_blocking(|| -> Result<u32> { Ok(7) }).await;
        assert_eq!(join_blocking(joined, Path::new("a.timer")).unwrap(), 7);

        let joined = tokio::task::spawn_blocking(|| -> Result<u32> {
            Err(RmError::UnknownSite { telescope: "x".into() })
        })
        .await;
        assert!(matches!(join_blocking(joined, Path::new("a.timer")), Err(RmError::UnknownSite { .. })));
    }

    #[tokio::test]
    async fn batch_read_keeps_order_and_isolates_failures() {
        let _ = tracing_subscriber::fmt::try_init();
        let good = write_temp_file("batch-good", &sample_header_bytes("05"));
        let short = write_temp_file("batch-short", &[0u8; 10]);

        let results = read_headers(
            vec![good.clone(), short.clone(), good.clone()],
            SchemaSource::Builtin,
            2,
        )
        .await;

        assert_eq!(results.len(), 3);
        assert_eq!(results[0].0, good);
        assert!(results[0].1.is_ok());
        assert!(matches!(results[1].1, Err(RmError::Decode(DecodeError::Truncated { .. }))));
        assert_eq!(results[2].1.as_ref().unwrap().name, "J0437-4715");

        std::fs::remove_file(good).ok();
        std::fs::remove_file(short).ok();
    }
}
