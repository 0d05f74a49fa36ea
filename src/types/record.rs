//! Decoded header record

use serde::Serialize;
use std::collections::HashMap;

use super::Value;
use crate::InterpretError;

/// Every field of one decoded Timer header, in on-disk order.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct DecodedRecord {
    entries: Vec<(String, Value)>,
    #[serde(skip)]
    index: HashMap<String, usize>,
}

impl DecodedRecord {
    pub fn with_capacity(capacity: usize) -> Self {
        Self { entries: Vec::with_capacity(capacity), index: HashMap::with_capacity(capacity) }
    }

    /// Append a field. A repeated name replaces the earlier value in place.
    pub fn insert(&mut self, name: impl Into<String>, value: Value) {
        let name = name.into();
        match self.index.get(&name) {
            Some(&i) => self.entries[i].1 = value,
            None => {
                self.index.insert(name.clone(), self.entries.len());
                self.entries.push((name, value));
            }
        }
    }

    pub fn get(&self, name: &str) -> Option<&Value> {
        self.index.get(name).map(|&i| &self.entries[i].1)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &Value)> {
        self.entries.iter().map(|(n, v)| (n.as_str(), v))
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    fn require(&self, name: &str) -> Result<&Value, InterpretError> {
        self.get(name).ok_or_else(|| InterpretError::MissingField { field: name.to_string() })
    }

    /// Required `int` field.
    pub fn int(&self, name: &str) -> Result<i32, InterpretError> {
        let value = self.require(name)?;
        value.as_int().ok_or_else(|| wrong_kind(name, "an integer", value))
    }

    /// Required `float` or `double` field, widened to `f64`.
    pub fn real(&self, name: &str) -> Result<f64, InterpretError> {
        let value = self.require(name)?;
        value.as_real().ok_or_else(|| wrong_kind(name, "a float or double", value))
    }

    /// Required text field.
    pub fn text(&self, name: &str) -> Result<&str, InterpretError> {
        let value = self.require(name)?;
        value.as_text().ok_or_else(|| wrong_kind(name, "text", value))
    }
}

fn wrong_kind(name: &str, expected: &'static str, value: &Value) -> InterpretError {
    InterpretError::WrongKind { field: name.to_string(), expected, found: value.kind().describe() }
}
