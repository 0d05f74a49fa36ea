//! Timer field kinds and decoded values

use serde::{Deserialize, Serialize};

/// Storage kind of one Timer header member.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum FieldKind {
    /// 32-bit signed integer (`int`)
    Integer32,
    /// 32-bit IEEE-754 float (`float`)
    Float32,
    /// 64-bit IEEE-754 float (`double`)
    Float64,
    /// NUL padded text (`char name[LEN]`); width comes from the declaration
    CharArray,
}

impl FieldKind {
    /// Resolve a scalar C type token.
    ///
    /// `char` is not a scalar here: it needs an array length and is handled by the
    /// definition parser.
    pub fn from_scalar_token(token: &str) -> Option<Self> {
        match token {
            "int" => Some(FieldKind::Integer32),
            "float" => Some(FieldKind::Float32),
            "double" => Some(FieldKind::Float64),
            _ => None,
        }
    }

    /// Byte width of the fixed-size kinds, `None` for [`FieldKind::CharArray`].
    pub const fn fixed_size(&self) -> Option<usize> {
        match self {
            FieldKind::Integer32 | FieldKind::Float32 => Some(4),
            FieldKind::Float64 => Some(8),
            FieldKind::CharArray => None,
        }
    }

    /// Name used in error messages.
    pub const fn describe(&self) -> &'static str {
        match self {
            FieldKind::Integer32 => "an integer",
            FieldKind::Float32 => "a float",
            FieldKind::Float64 => "a double",
            FieldKind::CharArray => "text",
        }
    }
}

/// Decoded value of one header field.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Value {
    Int(i32),
    Float(f32),
    Double(f64),
    Text(String),
}

impl Value {
    pub fn kind(&self) -> FieldKind {
        match self {
            Value::Int(_) => FieldKind::Integer32,
            Value::Float(_) => FieldKind::Float32,
            Value::Double(_) => FieldKind::Float64,
            Value::Text(_) => FieldKind::CharArray,
        }
    }

    pub fn as_int(&self) -> Option<i32> {
        match self {
            Value::Int(v) => Some(*v),
            _ => None,
        }
    }

    /// Floating value widened to `f64`; integers are not coerced.
    pub fn as_real(&self) -> Option<f64> {
        match self {
            Value::Float(v) => Some(f64::from(*v)),
            Value::Double(v) => Some(*v),
            _ => None,
        }
    }

    pub fn as_text(&self) -> Option<&str> {
        match self {
            Value::Text(v) => Some(v),
            _ => None,
        }
    }
}

impl From<i32> for Value {
    fn from(value: i32) -> Self {
        Value::Int(value)
    }
}

impl From<f32> for Value {
    fn from(value: f32) -> Self {
        Value::Float(value)
    }
}

impl From<f64> for Value {
    fn from(value: f64) -> Self {
        Value::Double(value)
    }
}

impl From<&str> for Value {
    fn from(value: &str) -> Self {
        Value::Text(value.to_string())
    }
}

impl From<String> for Value {
    fn from(value: String) -> Self {
        Value::Text(value)
    }
}
