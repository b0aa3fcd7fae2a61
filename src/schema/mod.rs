//! Schema definitions for the decoder.
//!
//! A [`Schema`] is an ordered list of [`SectionSpec`]s, each naming the INI
//! section it is read from and the typed fields it expects. Schemas are built
//! explicitly, either in code through [`Schema::builder`] or from a TOML
//! definition file (see [`file`]).
//!
//! # Example
//!
//! ```
//! use inischema::schema::{FieldType, Schema, SectionSpec};
//!
//! let schema = Schema::builder()
//!     .section(
//!         SectionSpec::new("general", "General")
//!             .field("count", FieldType::Integer)
//!             .field("active", FieldType::Boolean),
//!     )
//!     .section(SectionSpec::runtime("runtime").field("started_at", FieldType::Text))
//!     .build()?;
//!
//! assert_eq!(schema.sections().len(), 2);
//! # Ok::<(), inischema::schema::SchemaError>(())
//! ```

pub mod field;
pub mod file;

pub use field::{FieldType, UnknownFieldType};
pub use file::{load_schema, load_schema_str};

use std::collections::HashSet;
use std::path::PathBuf;

/// Errors in a schema definition.
///
/// These are defects in the schema, not in the configuration data, and are
/// reported when the schema is built rather than when a file is decoded.
#[derive(Debug, thiserror::Error)]
pub enum SchemaError {
    /// The schema declares no sections.
    #[error("Schema must declare at least one section")]
    Empty,

    /// Two sections share a record name or an INI source name.
    #[error("Duplicate section \"{0}\" in schema")]
    DuplicateSection(String),

    /// A section declares the same field twice.
    #[error("Duplicate field \"{field}\" in section \"{section}\"")]
    DuplicateField { section: String, field: String },

    /// A field declares a type outside the supported set.
    #[error("Unsupported field type \"{type_name}\" for field \"{field}\" in section \"{section}\"")]
    UnsupportedFieldType {
        section: String,
        field: String,
        type_name: String,
    },

    /// Failed to read a schema definition file.
    #[error("Failed to read schema file {path}: {source}", path = .path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// A schema definition file is not valid TOML or has the wrong shape.
    #[error("Failed to parse schema definition: {0}")]
    Parse(#[from] toml::de::Error),
}

/// A single typed field of a section.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldSpec {
    name: String,
    ty: FieldType,
}

impl FieldSpec {
    pub fn new(name: impl Into<String>, ty: FieldType) -> Self {
        Self {
            name: name.into(),
            ty,
        }
    }

    /// Key name looked up in the INI section.
    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn field_type(&self) -> FieldType {
        self.ty
    }
}

/// One section of a schema.
///
/// `name` identifies the section in the decoded [`Record`](crate::Record);
/// `source` is the INI header it is read from. Sections with
/// `load_from_file == false` are never read and stay unset after decode, to
/// be attached later by the caller.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SectionSpec {
    name: String,
    source: String,
    load_from_file: bool,
    fields: Vec<FieldSpec>,
}

impl SectionSpec {
    /// Create a section loaded from the INI section `source`.
    pub fn new(name: impl Into<String>, source: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            source: source.into(),
            load_from_file: true,
            fields: Vec::new(),
        }
    }

    /// Create a runtime-only section, never read from the file.
    pub fn runtime(name: impl Into<String>) -> Self {
        let name = name.into();
        Self {
            source: name.clone(),
            name,
            load_from_file: false,
            fields: Vec::new(),
        }
    }

    /// Append a field. Fields are decoded in the order they are added.
    pub fn field(mut self, name: impl Into<String>, ty: FieldType) -> Self {
        self.fields.push(FieldSpec::new(name, ty));
        self
    }

    /// Set whether this section is read from the file.
    pub fn load_from_file(mut self, load: bool) -> Self {
        self.load_from_file = load;
        self
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// INI section header this section is read from.
    pub fn source(&self) -> &str {
        &self.source
    }

    pub fn is_loaded_from_file(&self) -> bool {
        self.load_from_file
    }

    pub fn fields(&self) -> &[FieldSpec] {
        &self.fields
    }

    /// Look up a field by name.
    pub fn get_field(&self, name: &str) -> Option<&FieldSpec> {
        self.fields.iter().find(|f| f.name == name)
    }

    fn validate(&self) -> Result<(), SchemaError> {
        let mut seen = HashSet::new();
        for field in &self.fields {
            if !seen.insert(field.name.as_str()) {
                return Err(SchemaError::DuplicateField {
                    section: self.name.clone(),
                    field: field.name.clone(),
                });
            }
        }
        Ok(())
    }
}

/// A validated, ordered set of sections.
///
/// Invariants, checked by [`SchemaBuilder::build`]:
/// - at least one section
/// - section names are unique, and so are the source names of loaded sections
/// - field names are unique within a section
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Schema {
    sections: Vec<SectionSpec>,
}

impl Schema {
    pub fn builder() -> SchemaBuilder {
        SchemaBuilder::default()
    }

    /// Build a schema from a list of sections, validating it.
    pub fn new(sections: Vec<SectionSpec>) -> Result<Self, SchemaError> {
        if sections.is_empty() {
            return Err(SchemaError::Empty);
        }

        let mut names = HashSet::new();
        let mut sources = HashSet::new();
        for section in &sections {
            if !names.insert(section.name.as_str()) {
                return Err(SchemaError::DuplicateSection(section.name.clone()));
            }
            if section.load_from_file && !sources.insert(section.source.as_str()) {
                return Err(SchemaError::DuplicateSection(section.source.clone()));
            }
            section.validate()?;
        }

        Ok(Self { sections })
    }

    pub fn sections(&self) -> &[SectionSpec] {
        &self.sections
    }

    /// Look up a section by record name.
    pub fn section(&self, name: &str) -> Option<&SectionSpec> {
        self.sections.iter().find(|s| s.name == name)
    }
}

/// Incremental construction of a [`Schema`].
#[derive(Debug, Default)]
pub struct SchemaBuilder {
    sections: Vec<SectionSpec>,
}

impl SchemaBuilder {
    pub fn section(mut self, section: SectionSpec) -> Self {
        self.sections.push(section);
        self
    }

    pub fn build(self) -> Result<Schema, SchemaError> {
        Schema::new(self.sections)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_builder_preserves_order() {
        let schema = Schema::builder()
            .section(SectionSpec::new("b", "B").field("x", FieldType::Text))
            .section(SectionSpec::new("a", "A").field("y", FieldType::Integer))
            .build()
            .unwrap();

        let names: Vec<_> = schema.sections().iter().map(|s| s.name()).collect();
        assert_eq!(names, vec!["b", "a"]);
        assert_eq!(
            schema.section("a").unwrap().get_field("y").unwrap().field_type(),
            FieldType::Integer
        );
    }

    #[test]
    fn test_empty_schema_rejected() {
        let err = Schema::builder().build().unwrap_err();
        assert!(matches!(err, SchemaError::Empty));
    }

    #[test]
    fn test_duplicate_section_name_rejected() {
        let err = Schema::builder()
            .section(SectionSpec::new("general", "General"))
            .section(SectionSpec::new("general", "Other"))
            .build()
            .unwrap_err();
        assert!(matches!(err, SchemaError::DuplicateSection(name) if name == "general"));
    }

    #[test]
    fn test_duplicate_source_rejected() {
        let err = Schema::builder()
            .section(SectionSpec::new("one", "General"))
            .section(SectionSpec::new("two", "General"))
            .build()
            .unwrap_err();
        assert!(matches!(err, SchemaError::DuplicateSection(name) if name == "General"));
    }

    #[test]
    fn test_runtime_section_may_share_source_name() {
        let schema = Schema::builder()
            .section(SectionSpec::new("general", "runtime"))
            .section(SectionSpec::runtime("runtime"))
            .build();
        assert!(schema.is_ok());
    }

    #[test]
    fn test_duplicate_field_rejected() {
        let err = Schema::builder()
            .section(
                SectionSpec::new("general", "General")
                    .field("count", FieldType::Integer)
                    .field("count", FieldType::Text),
            )
            .build()
            .unwrap_err();
        assert!(matches!(
            err,
            SchemaError::DuplicateField { ref section, ref field }
                if section == "general" && field == "count"
        ));
    }

    #[test]
    fn test_runtime_section_flags() {
        let section = SectionSpec::runtime("runtime");
        assert!(!section.is_loaded_from_file());
        assert_eq!(section.source(), "runtime");

        let section = SectionSpec::new("general", "General").load_from_file(false);
        assert!(!section.is_loaded_from_file());
    }
}
