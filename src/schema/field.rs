//! Declared field types.

use std::fmt;
use std::str::FromStr;

/// The closed set of types a schema field can declare.
///
/// Each variant maps to exactly one conversion rule in [`crate::value`].
///
/// | Variant | Type names accepted in schema files |
/// |---------|-------------------------------------|
/// | `Text` | `str`, `text`, `string` |
/// | `Integer` | `int`, `integer` |
/// | `Float` | `float` |
/// | `Boolean` | `bool`, `boolean` |
/// | `TextList` | `list[str]`, `List[str]`, `list` |
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FieldType {
    /// Raw value, used as-is.
    Text,
    /// Base-10 signed 64-bit integer.
    Integer,
    /// 64-bit floating-point number.
    Float,
    /// One of `true`/`1`/`yes`/`on` or `false`/`0`/`no`/`off`, any case.
    Boolean,
    /// Comma-separated list of trimmed, non-empty strings.
    TextList,
}

impl FieldType {
    /// All supported field types, in declaration order.
    pub const ALL: [FieldType; 5] = [
        FieldType::Text,
        FieldType::Integer,
        FieldType::Float,
        FieldType::Boolean,
        FieldType::TextList,
    ];

    /// Canonical name used in error messages and schema files.
    pub fn name(self) -> &'static str {
        match self {
            FieldType::Text => "text",
            FieldType::Integer => "integer",
            FieldType::Float => "float",
            FieldType::Boolean => "boolean",
            FieldType::TextList => "list[str]",
        }
    }
}

impl fmt::Display for FieldType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Returned when a type name does not resolve to a [`FieldType`].
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("Unsupported field type: {0}")]
pub struct UnknownFieldType(pub String);

impl FromStr for FieldType {
    type Err = UnknownFieldType;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim() {
            "str" | "text" | "string" => Ok(FieldType::Text),
            "int" | "integer" => Ok(FieldType::Integer),
            "float" => Ok(FieldType::Float),
            "bool" | "boolean" => Ok(FieldType::Boolean),
            "list[str]" | "List[str]" | "list" => Ok(FieldType::TextList),
            other => Err(UnknownFieldType(other.to_string())),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_aliases() {
        assert_eq!("str".parse::<FieldType>().unwrap(), FieldType::Text);
        assert_eq!("integer".parse::<FieldType>().unwrap(), FieldType::Integer);
        assert_eq!("float".parse::<FieldType>().unwrap(), FieldType::Float);
        assert_eq!("bool".parse::<FieldType>().unwrap(), FieldType::Boolean);
        assert_eq!("List[str]".parse::<FieldType>().unwrap(), FieldType::TextList);
    }

    #[test]
    fn test_canonical_names_parse_back() {
        for ty in FieldType::ALL {
            assert_eq!(ty.name().parse::<FieldType>().unwrap(), ty);
        }
    }

    #[test]
    fn test_unsupported_list_types() {
        let err = "list[int]".parse::<FieldType>().unwrap_err();
        assert_eq!(err, UnknownFieldType("list[int]".to_string()));
        assert!("list[float]".parse::<FieldType>().is_err());
        assert!("Integer".parse::<FieldType>().is_err());
    }
}
