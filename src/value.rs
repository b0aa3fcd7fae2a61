//! Typed values and the raw-text conversion rules.

use std::fmt;

use serde::Serialize;

use crate::schema::FieldType;

/// A converted configuration value.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum Value {
    Text(String),
    Integer(i64),
    Float(f64),
    Boolean(bool),
    TextList(Vec<String>),
}

impl Value {
    /// The declared type this value satisfies.
    pub fn field_type(&self) -> FieldType {
        match self {
            Value::Text(_) => FieldType::Text,
            Value::Integer(_) => FieldType::Integer,
            Value::Float(_) => FieldType::Float,
            Value::Boolean(_) => FieldType::Boolean,
            Value::TextList(_) => FieldType::TextList,
        }
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Text(s) => f.write_str(s),
            Value::Integer(i) => write!(f, "{i}"),
            Value::Float(x) => write!(f, "{x}"),
            Value::Boolean(b) => write!(f, "{b}"),
            Value::TextList(items) => write!(f, "[{}]", items.join(", ")),
        }
    }
}

impl From<String> for Value {
    fn from(value: String) -> Self {
        Value::Text(value)
    }
}

impl From<&str> for Value {
    fn from(value: &str) -> Self {
        Value::Text(value.to_string())
    }
}

impl From<i64> for Value {
    fn from(value: i64) -> Self {
        Value::Integer(value)
    }
}

impl From<f64> for Value {
    fn from(value: f64) -> Self {
        Value::Float(value)
    }
}

impl From<bool> for Value {
    fn from(value: bool) -> Self {
        Value::Boolean(value)
    }
}

impl From<Vec<String>> for Value {
    fn from(value: Vec<String>) -> Self {
        Value::TextList(value)
    }
}

const TRUE_TOKENS: [&str; 4] = ["true", "1", "yes", "on"];
const FALSE_TOKENS: [&str; 4] = ["false", "0", "no", "off"];

/// Convert raw text according to a declared type.
///
/// Returns `None` when the text is not a valid literal for `ty`. `Text` and
/// `TextList` conversions always succeed.
pub fn convert(raw: &str, ty: FieldType) -> Option<Value> {
    match ty {
        FieldType::Text => Some(Value::Text(raw.to_string())),
        FieldType::Integer => parse_integer(raw).map(Value::Integer),
        FieldType::Float => parse_float(raw).map(Value::Float),
        FieldType::Boolean => parse_bool(raw).map(Value::Boolean),
        FieldType::TextList => Some(Value::TextList(parse_list(raw))),
    }
}

/// Surrounding whitespace is tolerated, an optional sign is accepted.
pub fn parse_integer(raw: &str) -> Option<i64> {
    raw.trim().parse().ok()
}

/// Accepts decimal and exponent forms as well as `inf` and `nan`.
pub fn parse_float(raw: &str) -> Option<f64> {
    raw.trim().parse().ok()
}

pub fn parse_bool(raw: &str) -> Option<bool> {
    let lowered = raw.to_lowercase();
    if TRUE_TOKENS.contains(&lowered.as_str()) {
        Some(true)
    } else if FALSE_TOKENS.contains(&lowered.as_str()) {
        Some(false)
    } else {
        None
    }
}

/// Split on `,`, trim each piece, drop the empty ones.
pub fn parse_list(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(str::trim)
        .filter(|item| !item.is_empty())
        .map(String::from)
        .collect()
}
