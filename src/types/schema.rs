//! Timer header layout types

use serde::{Deserialize, Serialize};

use super::FieldKind;

/// One member of the Timer header.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct FieldSpec {
    /// Member name with any array suffix removed
    pub name: String,
    /// Storage kind
    pub kind: FieldKind,
    /// Number of bytes the member occupies on disk
    pub byte_length: usize,
}

impl FieldSpec {
    pub fn new(name: impl Into<String>, kind: FieldKind, byte_length: usize) -> Self {
        Self { name: name.into(), kind, byte_length }
    }
}

/// Ordered field layout of a Timer header.
///
/// Declaration order is the on-disk order: each field starts where the previous
/// one ends, so offsets are the running sum of byte lengths.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Schema {
    fields: Vec<FieldSpec>,
}

impl Schema {
    /// Create a schema from fields already in on-disk order.
    pub fn new(fields: Vec<FieldSpec>) -> Self {
        Self { fields }
    }

    pub fn fields(&self) -> &[FieldSpec] {
        &self.fields
    }

    pub fn field(&self, name: &str) -> Option<&FieldSpec> {
        self.fields.iter().find(|f| f.name == name)
    }

    /// Byte offset of a field from the start of the record.
    pub fn offset_of(&self, name: &str) -> Option<usize> {
        let mut offset = 0;
        for field in &self.fields {
            if field.name == name {
                return Some(offset);
            }
            offset += field.byte_length;
        }
        None
    }

    /// Iterate fields together with their byte offsets.
    pub fn iter_with_offsets(&self) -> impl Iterator<Item = (usize, &FieldSpec)> {
        self.fields.iter().scan(0usize, |offset, field| {
            let start = *offset;
            *offset += field.byte_length;
            Some((start, field))
        })
    }

    /// Total bytes one record occupies.
    pub fn record_size(&self) -> usize {
        self.fields.iter().map(|f| f.byte_length).sum()
    }

    pub fn len(&self) -> usize {
        self.fields.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }
}
