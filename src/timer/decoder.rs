//! Timer record decoding
//!
//! Reads one header record field by field, in schema order, from any [`Read`]
//! source. The reader is consumed strictly sequentially: no seeking and no
//! re-reading, so a [`std::io::BufReader`] over a file is enough.
//!
//! ## Encoding rules
//!
//! - `int`, `float`, `double`: big-endian two's complement / IEEE-754
//! - `char[N]`: UTF-8 text with trailing NUL bytes removed
//!
//! A record shorter than the schema is an error; fields are never partially filled.

use std::io::{Cursor, Read};

use tracing::{debug, trace};

use crate::DecodeError;
use crate::types::{DecodedRecord, FieldKind, FieldSpec, Schema, Value};

/// Decode one record laid out by `schema` from the current position of `reader`.
pub fn decode_record<R: Read>(
    schema: &Schema,
    reader: &mut R,
) -> Result<DecodedRecord, DecodeError> {
    let mut record = DecodedRecord::with_capacity(schema.len());
    let mut buffer = Vec::new();

    for (offset, field) in schema.iter_with_offsets() {
        buffer.clear();
        read_field(reader, field, offset, &mut buffer)?;
        let value = decode_value(field, offset, &buffer)?;
        trace!(field = %field.name, offset, value = ?value, "Decoded field");
        record.insert(field.name.clone(), value);
    }

    debug!(fields = record.len(), bytes = schema.record_size(), "Decoded Timer record");
    Ok(record)
}

/// Decode one record from the start of an in-memory buffer.
pub fn decode_bytes(schema: &Schema, data: &[u8]) -> Result<DecodedRecord, DecodeError> {
    decode_record(schema, &mut Cursor::new(data))
}

fn read_field<R: Read>(
    reader: &mut R,
    field: &FieldSpec,
    offset: usize,
    buffer: &mut Vec<u8>,
) -> Result<(), DecodeError> {
    (&mut *reader).take(field.byte_length as u64).read_to_end(buffer).map_err(|source| {
        DecodeError::Io { field: field.name.clone(), offset, source }
    })?;

    if buffer.len() < field.byte_length {
        return Err(DecodeError::Truncated {
            field: field.name.clone(),
            offset,
            expected: field.byte_length,
            available: buffer.len(),
        });
    }
    Ok(())
}

fn decode_value(field: &FieldSpec, offset: usize, bytes: &[u8]) -> Result<Value, DecodeError> {
    let value = match field.kind {
        FieldKind::Integer32 => Value::Int(i32::from_be_bytes(be_bytes(field, offset, bytes)?)),
        FieldKind::Float32 => Value::Float(f32::from_be_bytes(be_bytes(field, offset, bytes)?)),
        FieldKind::Float64 => Value::Double(f64::from_be_bytes(be_bytes(field, offset, bytes)?)),
        FieldKind::CharArray => {
            let text = std::str::from_utf8(bytes).map_err(|source| DecodeError::InvalidEncoding {
                field: field.name.clone(),
                offset,
                source,
            })?;
            Value::Text(text.trim_end_matches('\0').to_string())
        }
    };
    Ok(value)
}

/// Leading `N` bytes of a numeric field; a field declared narrower than its kind
/// cannot hold the value.
fn be_bytes<const N: usize>(
    field: &FieldSpec,
    offset: usize,
    bytes: &[u8],
) -> Result<[u8; N], DecodeError> {
    bytes.first_chunk::<N>().copied().ok_or_else(|| DecodeError::Truncated {
        field: field.name.clone(),
        offset,
        expected: N,
        available: bytes.len(),
    })
}
