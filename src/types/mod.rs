//! Core types for Timer header decoding.
//!
//! - [`FieldKind`] is the closed set of member types a Timer definition may use
//! - [`FieldSpec`] and [`Schema`] describe the ordered on-disk layout
//! - [`DecodedRecord`] holds every decoded field of one header
//! - [`HeaderInfo`] is the summary handed to site lookup and the RM model
//!
//! ## Usage Example
//!
//! ```rust
//! use simplerm::types::{FieldKind, FieldSpec, Schema};
//!
//! let schema = Schema::new(vec![
//!     FieldSpec::new("telid", FieldKind::CharArray, 16),
//!     FieldSpec::new("mjd", FieldKind::Integer32, 4),
//!     FieldSpec::new("fracmjd", FieldKind::Float64, 8),
//! ]);
//!
//! assert_eq!(schema.offset_of("fracmjd"), Some(20));
//! assert_eq!(schema.record_size(), 28);
//! ```

mod field_kind;
mod header;
mod record;
mod schema;

pub use field_kind::{FieldKind, Value};
pub use header::{HeaderInfo, ObservationWindow, Position, SECONDS_PER_DAY};
pub use record::DecodedRecord;
pub use schema::{FieldSpec, Schema};
