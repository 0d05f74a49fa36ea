//! PSRCHIVE Timer header support
//!
//! A Timer archive starts with a fixed-size big-endian header whose layout is
//! described by the C definition in `data/timer.h`. Decoding runs in three steps:
//!
//! 1. [`parse_definition`] turns the definition text into a [`Schema`](crate::types::Schema)
//!    (memoized per source by [`SchemaCache`])
//! 2. [`decode_record`] reads one record laid out by that schema
//! 3. [`interpret`] derives the [`HeaderInfo`](crate::types::HeaderInfo) summary
//!
//! [`TimerReader`] wires the three together for a file or a byte buffer.

pub mod cache;
pub mod decoder;
pub mod definition;
pub mod interpret;
pub mod reader;

/// The Timer definition shipped with the crate.
pub const BUILTIN_DEFINITION: &str = include_str!("../../data/timer.h");

pub use cache::{SchemaCache, SchemaSource};
pub use decoder::{decode_bytes, decode_record};
pub use definition::parse_definition;
pub use interpret::interpret;
pub use reader::{TimerReader, read_header, read_headers};
