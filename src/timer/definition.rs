//! Timer definition parsing
//!
//! Turns the C-struct-like text of `timer.h` into an ordered [`Schema`].
//!
//! ## Accepted input
//!
//! - `//` and `/* */` comments anywhere; block comments may span lines
//! - `#define NAME VALUE` lines, where an integer VALUE becomes a char-array
//!   length constant and anything else is ignored
//! - member declarations `TYPE NAME;` with `TYPE` one of `int`, `float`,
//!   `double`, or `char NAME[LEN]` where `LEN` names a constant (or is a literal)
//!
//! Any other line that does not split into exactly two tokens before its `;`
//! (braces, `struct timer {`, `int a, b;`) is skipped without error, because the
//! definition file carries C boilerplate around the member list. A two-token line
//! whose type is known but whose name is not an identifier (`char *p;`) is an error.

use std::borrow::Cow;
use std::collections::HashMap;
use std::sync::LazyLock;

use regex::{Captures, Regex};
use tracing::{debug, trace};

use crate::SchemaError;
use crate::types::{FieldKind, FieldSpec, Schema};

static COMMENT_PATTERN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?s)//[^\n]*|/\*.*?\*/").expect("comment pattern compiles")
});

static DECLARATOR_PATTERN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^(?P<name>[A-Za-z_][A-Za-z0-9_]*)(?:\[(?P<len>[A-Za-z0-9_]*)\])?$")
        .expect("declarator pattern compiles")
});

const DEFINE_DIRECTIVE: &str = "#define";

/// Remove C comments, keeping every newline so line numbers stay meaningful.
pub fn strip_comments(text: &str) -> Cow<'_, str> {
    COMMENT_PATTERN.replace_all(text, |caps: &Captures<'_>| {
        caps[0].chars().filter(|&c| c == '\n').collect::<String>()
    })
}

/// Collect `#define NAME <integer>` constants.
///
/// Directives whose value is not an integer are ignored; they define unrelated
/// symbols such as version strings.
pub fn extract_constants(text: &str) -> HashMap<String, usize> {
    let mut constants = HashMap::new();
    for line in text.lines() {
        let tokens: Vec<&str> = line.split_whitespace().collect();
        if let [DEFINE_DIRECTIVE, name, value] = tokens.as_slice() {
            match value.parse::<usize>() {
                Ok(length) => {
                    constants.insert((*name).to_string(), length);
                }
                Err(_) => trace!(constant = %name, value = %value, "Ignoring non-numeric #define"),
            }
        }
    }
    constants
}

/// Parse a Timer definition into its field layout.
pub fn parse_definition(text: &str) -> Result<Schema, SchemaError> {
    let stripped = strip_comments(text);
    let constants = extract_constants(&stripped);
    let mut fields: Vec<FieldSpec> = Vec::new();

    for (index, raw_line) in stripped.lines().enumerate() {
        let line = index + 1;
        let trimmed = raw_line.trim();
        if trimmed.is_empty() || trimmed.starts_with('#') {
            continue;
        }

        let declaration = trimmed.split(';').next().unwrap_or_default();
        let tokens: Vec<&str> = declaration.split_whitespace().collect();
        let [type_token, name_token] = tokens.as_slice() else {
            trace!(line, text = trimmed, "Skipping non-declaration line");
            continue;
        };
        let Some(declarator) = DECLARATOR_PATTERN.captures(name_token) else {
            if let Some(err) = malformed_member(line, type_token, name_token) {
                return Err(err);
            }
            trace!(line, text = trimmed, "Skipping malformed declaration");
            continue;
        };

        let spec = resolve_field(line, type_token, &declarator, &constants)?;
        if fields.iter().any(|f| f.name == spec.name) {
            return Err(SchemaError::DuplicateField { line, field: spec.name });
        }
        trace!(
            line,
            field = %spec.name,
            kind = ?spec.kind,
            bytes = spec.byte_length,
            "Declared field"
        );
        fields.push(spec);
    }

    let schema = Schema::new(fields);
    debug!(
        fields = schema.len(),
        record_size = schema.record_size(),
        constants = constants.len(),
        "Parsed Timer definition"
    );
    Ok(schema)
}

/// A member of a known type whose name is not a plain identifier (pointers,
/// punctuation) cannot be laid out, and dropping it would shift every later field.
fn malformed_member(line: usize, type_token: &str, name_token: &str) -> Option<SchemaError> {
    if type_token == "char" {
        return Some(SchemaError::UndefinedLength {
            line,
            field: name_token.to_string(),
            constant: String::new(),
        });
    }
    FieldKind::from_scalar_token(type_token)?;
    let type_name = match name_token.strip_prefix('*') {
        Some(_) => format!("{type_token}*"),
        None => format!("{type_token} {name_token}"),
    };
    Some(SchemaError::UnknownType { line, type_name })
}

fn resolve_field(
    line: usize,
    type_token: &str,
    declarator: &Captures<'_>,
    constants: &HashMap<String, usize>,
) -> Result<FieldSpec, SchemaError> {
    let name = &declarator["name"];
    let array_length = declarator.name("len").map(|m| m.as_str());

    if type_token == "char" {
        let constant = array_length.unwrap_or_default();
        let length = constants
            .get(constant)
            .copied()
            .or_else(|| constant.parse::<usize>().ok())
            .filter(|&length| length > 0)
            .ok_or_else(|| SchemaError::UndefinedLength {
                line,
                field: name.to_string(),
                constant: constant.to_string(),
            })?;
        return Ok(FieldSpec::new(name, FieldKind::CharArray, length));
    }

    if array_length.is_some() {
        return Err(SchemaError::UnknownType { line, type_name: format!("{type_token}[]") });
    }

    let (kind, size) = FieldKind::from_scalar_token(type_token)
        .and_then(|kind| kind.fixed_size().map(|size| (kind, size)))
        .ok_or_else(|| SchemaError::UnknownType { line, type_name: type_token.to_string() })?;
    Ok(FieldSpec::new(name, kind, size))
}
