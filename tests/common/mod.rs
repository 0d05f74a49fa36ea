//! Shared helpers for integration tests

#![allow(dead_code)]

use std::collections::HashMap;
use std::path::PathBuf;

use simplerm::types::{FieldKind, Schema, Value};

/// Encode a record for `schema` from `values`; missing fields are zero filled.
pub fn encode(schema: &Schema, values: &HashMap<&str, Value>) -> Vec<u8> {
    let mut data = Vec::with_capacity(schema.record_size());
    for field in schema.fields() {
        let start = data.len();
        match (field.kind, values.get(field.name.as_str())) {
            (FieldKind::Integer32, Some(Value::Int(v))) => data.extend_from_slice(&v.to_be_bytes()),
            (FieldKind::Float32, Some(v)) => {
                data.extend_from_slice(&(v.as_real().unwrap() as f32).to_be_bytes())
            }
            (FieldKind::Float64, Some(v)) => data.extend_from_slice(&v.as_real().unwrap().to_be_bytes()),
            (FieldKind::CharArray, Some(Value::Text(t))) => data.extend_from_slice(t.as_bytes()),
            (_, None) => {}
            (kind, Some(other)) => panic!("cannot encode {other:?} as {kind:?}"),
        }
        data.resize(start + field.byte_length, 0);
    }
    data
}

/// Values for the shipped Timer layout.
pub fn header_values(coord_type: &str) -> HashMap<&'static str, Value> {
    HashMap::from([
        ("psrname", Value::from("B1937+21")),
        ("telid", Value::from("Effelsberg")),
        ("mjd", Value::from(59000)),
        ("fracmjd", Value::from(0.5_f64)),
        ("nsub_int", Value::from(12)),
        ("sub_int_time", Value::from(30.0_f64)),
        ("coord_type", Value::from(coord_type.to_string())),
        ("ra", Value::from(5.14_f64)),
        ("dec", Value::from(0.38_f64)),
        ("l", Value::from(57.5_f64)),
        ("b", Value::from(-0.29_f64)),
    ])
}

pub fn temp_path(label: &str) -> PathBuf {
    std::env::temp_dir().join(format!("simplerm-it-{label}-{}", std::process::id()))
}
