//! TOML schema-definition files.
//!
//! ```toml
//! [[sections]]
//! name = "general"
//! source = "General"
//! fields = [
//!     { name = "count", type = "int" },
//!     { name = "active", type = "bool" },
//! ]
//!
//! [[sections]]
//! name = "runtime"
//! load_from_file = false
//! fields = [{ name = "started_at", type = "str" }]
//! ```
//!
//! `source` defaults to `name`, `load_from_file` defaults to `true`. Fields
//! are decoded in the order they are listed.

use std::path::Path;

use serde::Deserialize;

use super::{FieldType, Schema, SchemaError, SectionSpec};

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct SchemaFile {
    #[serde(default)]
    sections: Vec<SectionEntry>,
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct SectionEntry {
    name: String,

    source: Option<String>,

    #[serde(default = "default_true")]
    load_from_file: bool,

    #[serde(default)]
    fields: Vec<FieldEntry>,
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct FieldEntry {
    name: String,

    #[serde(rename = "type")]
    type_name: String,
}

fn default_true() -> bool {
    true
}

/// Load a schema from a TOML definition file.
pub fn load_schema(path: &Path) -> Result<Schema, SchemaError> {
    let content = std::fs::read_to_string(path).map_err(|source| SchemaError::Read {
        path: path.to_path_buf(),
        source,
    })?;

    load_schema_str(&content)
}

/// Load a schema from a TOML definition string.
///
/// Type names are resolved here, so an unsupported type is reported before
/// any configuration file is decoded.
pub fn load_schema_str(content: &str) -> Result<Schema, SchemaError> {
    let file: SchemaFile = toml::from_str(content)?;

    let mut sections = Vec::with_capacity(file.sections.len());
    for entry in file.sections {
        let source = entry.source.unwrap_or_else(|| entry.name.clone());
        let mut section = SectionSpec::new(entry.name, source).load_from_file(entry.load_from_file);

        for field in entry.fields {
            let Ok(ty) = field.type_name.parse::<FieldType>() else {
                return Err(SchemaError::UnsupportedFieldType {
                    section: section.name().to_string(),
                    field: field.name,
                    type_name: field.type_name,
                });
            };
            section = section.field(field.name, ty);
        }

        sections.push(section);
    }

    Schema::new(sections)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    #[test]
    fn test_load_schema_str() {
        let schema = load_schema_str(
            r#"
            [[sections]]
            name = "general"
            source = "General"
            fields = [
                { name = "count", type = "int" },
                { name = "active", type = "bool" },
                { name = "tags", type = "list[str]" },
            ]

            [[sections]]
            name = "runtime"
            load_from_file = false
            fields = [{ name = "started_at", type = "str" }]
            "#,
        )
        .unwrap();

        let general = schema.section("general").unwrap();
        assert_eq!(general.source(), "General");
        assert!(general.is_loaded_from_file());
        let types: Vec<_> = general.fields().iter().map(|f| f.field_type()).collect();
        assert_eq!(
            types,
            vec![FieldType::Integer, FieldType::Boolean, FieldType::TextList]
        );

        let runtime = schema.section("runtime").unwrap();
        assert_eq!(runtime.source(), "runtime");
        assert!(!runtime.is_loaded_from_file());
    }

    #[test]
    fn test_unsupported_type_reported_with_location() {
        let err = load_schema_str(
            r#"
            [[sections]]
            name = "Another section"
            fields = [{ name = "another_list", type = "list[int]" }]
            "#,
        )
        .unwrap_err();

        match err {
            SchemaError::UnsupportedFieldType {
                section,
                field,
                type_name,
            } => {
                assert_eq!(section, "Another section");
                assert_eq!(field, "another_list");
                assert_eq!(type_name, "list[int]");
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn test_empty_definition_rejected() {
        assert!(matches!(load_schema_str(""), Err(SchemaError::Empty)));
    }

    #[test]
    fn test_unknown_keys_rejected() {
        let err = load_schema_str(
            r#"
            [[sections]]
            name = "general"
            optional = true
            "#,
        )
        .unwrap_err();
        assert!(matches!(err, SchemaError::Parse(_)));
    }

    #[test]
    fn test_load_schema_from_file() {
        let mut file = NamedTempFile::new().unwrap();
        writeln!(
            file,
            "[[sections]]\nname = \"General\"\nfields = [{{ name = \"count\", type = \"integer\" }}]"
        )
        .unwrap();

        let schema = load_schema(file.path()).unwrap();
        assert_eq!(schema.sections()[0].fields()[0].name(), "count");
    }

    #[test]
    fn test_missing_schema_file() {
        let err = load_schema(Path::new("/nonexistent/schema.toml")).unwrap_err();
        assert!(matches!(err, SchemaError::Read { .. }));
        assert!(err.to_string().contains("/nonexistent/schema.toml"));
    }
}
