//! Test utilities for building synthetic Timer headers
//!
//! Real Timer archives are large and not redistributable, so tests and
//! benchmarks encode headers from known values instead.

#![cfg(any(test, feature = "benchmark"))]

use std::collections::HashMap;
use std::path::PathBuf;
use std::sync::atomic::{AtomicUsize, Ordering};

use crate::timer::{BUILTIN_DEFINITION, parse_definition};
use crate::types::{FieldKind, FieldSpec, Schema, Value};

/// Schema of the shipped Timer definition, parsed without the global cache.
pub fn builtin_schema() -> Schema {
    parse_definition(BUILTIN_DEFINITION).expect("shipped Timer definition parses")
}

/// Encodes one record for a schema; unset fields are zero filled.
pub struct RecordBuilder<'a> {
    schema: &'a Schema,
    values: HashMap<String, Value>,
}

impl<'a> RecordBuilder<'a> {
    pub fn new(schema: &'a Schema) -> Self {
        Self { schema, values: HashMap::new() }
    }

    pub fn set(mut self, name: &str, value: impl Into<Value>) -> Self {
        self.values.insert(name.to_string(), value.into());
        self
    }

    pub fn build(&self) -> Vec<u8> {
        let mut data = Vec::with_capacity(self.schema.record_size());
        for field in self.schema.fields() {
            match self.values.get(&field.name) {
                Some(value) => data.extend_from_slice(&encode_value(field, value)),
                None => data.resize(data.len() + field.byte_length, 0),
            }
        }
        data
    }
}

/// Big-endian encoding of `value` in the width of `field`.
///
/// Panics when the value cannot be stored in the field; that is a bug in the test.
pub fn encode_value(field: &FieldSpec, value: &Value) -> Vec<u8> {
    match (field.kind, value) {
        (FieldKind::Integer32, Value::Int(v)) => v.to_be_bytes().to_vec(),
        (FieldKind::Float32, v) => {
            (v.as_real().expect("float value") as f32).to_be_bytes().to_vec()
        }
        (FieldKind::Float64, v) => v.as_real().expect("double value").to_be_bytes().to_vec(),
        (FieldKind::CharArray, Value::Text(text)) => {
            assert!(text.len() <= field.byte_length, "'{text}' does not fit in {}", field.name);
            let mut bytes = text.as_bytes().to_vec();
            bytes.resize(field.byte_length, 0);
            bytes
        }
        (kind, value) => panic!("cannot encode {value:?} as {kind:?} for {}", field.name),
    }
}

/// A complete shipped-layout header: Parkes, J0437-4715, MJD 58000.25, 5 x 10 s,
/// ra/dec = (1.0, 0.5) rad and l/b = (10, 20) deg, with the given `coord_type`.
pub fn sample_header_bytes(coord_type: &str) -> Vec<u8> {
    let schema = builtin_schema();
    RecordBuilder::new(&schema)
        .set("junk", "")
        .set("backend", "CPSR2")
        .set("psrname", "J0437-4715")
        .set("telid", "parkes")
        .set("mjd", 58000)
        .set("fracmjd", 0.25_f64)
        .set("nsub_int", 5)
        .set("sub_int_time", 10.0_f64)
        .set("nbin", 1024)
        .set("nominal_period", 0.005_757_f32)
        .set("bandwidth", -64.0_f64)
        .set("centre_frequency", 1369.0_f64)
        .set("npol", 4)
        .set("coord_type", coord_type)
        .set("ra", 1.0_f64)
        .set("dec", 0.5_f64)
        .set("l", 10.0_f64)
        .set("b", 20.0_f64)
        .set("dm", 2.64_f32)
        .set("comment", "synthetic")
        .build()
}

/// Write `data` to a fresh file under the system temp directory.
pub fn write_temp_file(label: &str, data: &[u8]) -> PathBuf {
    static COUNTER: AtomicUsize = AtomicUsize::new(0);
    let path = std::env::temp_dir().join(format!(
        "simplerm-{label}-{}-{}.timer",
        std::process::id(),
        COUNTER.fetch_add(1, Ordering::Relaxed)
    ));
    std::fs::write(&path, data).expect("write temp Timer file");
    path
}
