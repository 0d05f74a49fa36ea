//! Error types for Timer header decoding and RM computation.
//!
//! Every stage of the header pipeline has its own error type so callers can tell
//! where a failure happened:
//!
//! - [`SchemaError`]: the Timer definition text could not be turned into a layout
//! - [`DecodeError`]: a header record could not be decoded with that layout
//! - [`InterpretError`]: a decoded record lacks a field the header summary needs
//!
//! [`RmError`] wraps all three together with the failures of the surrounding
//! pipeline (file access, configuration, site lookup and the ionosphere model).
//!
//! ## Recovery
//!
//! ```rust
//! use simplerm::{RmError, SchemaError};
//!
//! let error: RmError = SchemaError::UnknownType { line: 12, type_name: "short".into() }.into();
//! assert!(!error.is_retryable());
//! for suggestion in error.recovery_suggestions() {
//!     println!("  - {}", suggestion);
//! }
//! ```

use std::path::PathBuf;
use thiserror::Error;

/// Result type alias for simplerm operations.
pub type Result<T, E = RmError> = std::result::Result<T, E>;

/// Failure to build a field layout from a Timer definition.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum SchemaError {
    #[error("Schema parse error at line {line}: unknown field type '{type_name}'")]
    UnknownType { line: usize, type_name: String },

    #[error(
        "Schema parse error at line {line}: char array '{field}' has no usable length constant '{constant}'"
    )]
    UndefinedLength { line: usize, field: String, constant: String },

    #[error("Schema parse error at line {line}: field '{field}' is declared more than once")]
    DuplicateField { line: usize, field: String },
}

/// Failure to decode one header record.
#[derive(Error, Debug)]
#[non_exhaustive]
pub enum DecodeError {
    #[error(
        "Decode error in field '{field}' at offset {offset}: record truncated (need {expected} bytes, have {available})"
    )]
    Truncated { field: String, offset: usize, expected: usize, available: usize },

    #[error("Decode error in field '{field}' at offset {offset}: bytes are not valid UTF-8 text")]
    InvalidEncoding {
        field: String,
        offset: usize,
        #[source]
        source: std::str::Utf8Error,
    },

    #[error("Decode error in field '{field}' at offset {offset}: read failed")]
    Io {
        field: String,
        offset: usize,
        #[source]
        source: std::io::Error,
    },
}

/// Failure to turn a decoded record into a [`crate::HeaderInfo`].
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum InterpretError {
    #[error("Interpret error: required field '{field}' is missing from the record")]
    MissingField { field: String },

    #[error("Interpret error: field '{field}' holds {found} but {expected} is required")]
    WrongKind { field: String, expected: &'static str, found: &'static str },
}

/// Main error type for simplerm operations.
#[derive(Error, Debug)]
#[non_exhaustive]
pub enum RmError {
    #[error(transparent)]
    Schema(#[from] SchemaError),

    #[error(transparent)]
    Decode(#[from] DecodeError),

    #[error(transparent)]
    Interpret(#[from] InterpretError),

    #[error("Timer file error: {path}")]
    File {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Configuration error in {context}: {details}")]
    Config { context: String, details: String },

    #[error("Unknown site '{telescope}'")]
    UnknownSite { telescope: String },

    #[error("Header of {path} carries no usable sky position (coord_type '{coord_type}')")]
    MissingPosition { path: PathBuf, coord_type: String },

    #[error("PSRFITS header error in {path}: {details}")]
    Psrfits { path: PathBuf, details: String },

    #[error("Background header read of {path} was cancelled")]
    Cancelled { path: PathBuf },

    #[error("Ionosphere model failed: {reason}")]
    Model {
        reason: String,
        #[source]
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },
}

impl RmError {
    /// Returns whether this error is potentially recoverable through retry.
    pub fn is_retryable(&self) -> bool {
        match self {
            RmError::Model { .. } => true,
            RmError::Cancelled { .. } => true,
            RmError::Psrfits { .. } => false,
            RmError::File { .. } => false,
            RmError::Schema(_) => false,
            RmError::Decode(_) => false,
            RmError::Interpret(_) => false,
            RmError::Config { .. } => false,
            RmError::UnknownSite { .. } => false,
            RmError::MissingPosition { .. } => false,
        }
    }

    /// Returns suggested recovery actions for this error.
    pub fn recovery_suggestions(&self) -> Vec<&'static str> {
        match self {
            RmError::Schema(_) => vec![
                "Check the Timer definition for unsupported member types",
                "Define every char array length with a numeric #define",
                "Remove duplicated member declarations",
            ],
            RmError::Decode(_) => vec![
                "Check the file is a Timer archive and not PSRFITS",
                "Verify the file was copied completely",
                "Confirm the Timer definition matches the writing software",
            ],
            RmError::Interpret(_) => vec![
                "Confirm the Timer definition declares mjd, fracmjd and coord_type",
                "Check the definition override path in the configuration",
            ],
            RmError::File { .. } => vec![
                "Check file exists and is readable",
                "Check file permissions",
            ],
            RmError::Config { .. } => vec![
                "Check the YAML syntax of the configuration file",
                "Use a positive timestep",
            ],
            RmError::UnknownSite { .. } => vec![
                "Add the observatory to the sites section of the configuration",
                "Check the telid written by the backend",
            ],
            RmError::MissingPosition { .. } => vec![
                "Check coord_type is \"04\" (galactic) or \"05\" (equatorial)",
                "Supply the pointing explicitly instead of reading it from the header",
            ],
            RmError::Psrfits { .. } => vec![
                "Check the file is PSRFITS and carries a SUBINT table",
                "Confirm RA, DEC, TELESCOP and STT_* keywords are set in the primary header",
            ],
            RmError::Cancelled { .. } => vec!["Retry once the runtime is no longer shutting down"],
            RmError::Model { .. } => vec![
                "Check the IONEX directory is reachable and writable",
                "Retry once ionospheric maps for the epoch are published",
            ],
        }
    }

    /// Helper constructor for file errors with path context.
    pub fn file_error(path: PathBuf, source: std::io::Error) -> Self {
        RmError::File { path, source }
    }

    /// Helper constructor for configuration errors.
    pub fn config_error(context: impl Into<String>, details: impl Into<String>) -> Self {
        RmError::Config { context: context.into(), details: details.into() }
    }

    /// Helper constructor for PSRFITS header errors.
    pub fn psrfits_error(path: impl Into<PathBuf>, details: impl Into<String>) -> Self {
        RmError::Psrfits { path: path.into(), details: details.into() }
    }

    /// Helper constructor for ionosphere model failures.
    pub fn model_failed(reason: impl Into<String>) -> Self {
        RmError::Model { reason: reason.into(), source: None }
    }

    /// Helper constructor for ionosphere model failures with source.
    pub fn model_failed_with_source(
        reason: impl Into<String>,
        source: Box<dyn std::error::Error + Send + Sync>,
    ) -> Self {
        RmError::Model { reason: reason.into(), source: Some(source) }
    }
}

impl From<std::io::Error> for RmError {
    fn from(err: std::io::Error) -> Self {
        RmError::File { path: PathBuf::from("<unknown>"), source: err }
    }
}
