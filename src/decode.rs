//! Schema-driven decoding of INI files.
//!
//! [`decode`] reads a file, parses it, and converts every field of every
//! loaded section, in schema order. The first problem aborts the decode; no
//! partial record is ever returned.
//!
//! # Example
//!
//! ```
//! use inischema::decode::decode_str;
//! use inischema::schema::{FieldType, Schema, SectionSpec};
//!
//! let schema = Schema::builder()
//!     .section(
//!         SectionSpec::new("general", "General")
//!             .field("count", FieldType::Integer)
//!             .field("active", FieldType::Boolean),
//!     )
//!     .build()?;
//!
//! let record = decode_str(&schema, "[General]\ncount = 10\nactive = yes\n")?;
//! assert_eq!(record.get::<i64>("general", "count")?, 10);
//! assert!(record.get::<bool>("general", "active")?);
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use tracing::debug;

use crate::ini::{IniDocument, ParseError, SectionView};
use crate::record::{FromRecord, Record, SectionValues};
use crate::schema::{FieldType, Schema, SectionSpec};
use crate::value;

/// Origin reported for documents decoded from a string.
pub const STRING_ORIGIN: &str = "<string>";

/// Errors produced while decoding a configuration file.
#[derive(Debug, thiserror::Error)]
pub enum DecodeError {
    /// The file could not be read, or is not valid UTF-8.
    #[error("Failed to read config file {path}: {source}", path = .path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The file is not well-formed INI.
    #[error("Failed to parse {origin}: {source}")]
    Parse {
        origin: String,
        #[source]
        source: ParseError,
    },

    /// A section the schema loads from file is absent.
    #[error("Section \"{section}\" not found in {origin}")]
    SectionNotFound { section: String, origin: String },

    /// A declared field has no key in its section.
    #[error("Missing key \"{key}\" in [{section}]")]
    MissingKey { section: String, key: String },

    /// A raw value failed conversion to its declared type.
    #[error("Invalid value \"{raw}\" for key \"{key}\" in [{section}]: expected {expected}")]
    InvalidValue {
        section: String,
        key: String,
        raw: String,
        expected: FieldType,
    },
}

/// Decode the INI file at `path` against `schema`.
///
/// The file is read as UTF-8 in one go and closed before parsing starts.
pub fn decode(schema: &Schema, path: &Path) -> Result<Record, DecodeError> {
    let content = std::fs::read_to_string(path).map_err(|source| DecodeError::Read {
        path: path.to_path_buf(),
        source,
    })?;
    debug!("Read {} bytes from {}", content.len(), path.display());

    decode_with_origin(schema, &content, &path.display().to_string())
}

/// Decode INI text against `schema`.
pub fn decode_str(schema: &Schema, content: &str) -> Result<Record, DecodeError> {
    decode_with_origin(schema, content, STRING_ORIGIN)
}

fn decode_with_origin(schema: &Schema, content: &str, origin: &str) -> Result<Record, DecodeError> {
    let document = IniDocument::parse(content).map_err(|source| DecodeError::Parse {
        origin: origin.to_string(),
        source,
    })?;

    decode_document(schema, &document, origin)
}

/// Decode an already-parsed document against `schema`.
///
/// `origin` names the document in [`DecodeError::SectionNotFound`].
pub fn decode_document(
    schema: &Schema,
    document: &IniDocument,
    origin: &str,
) -> Result<Record, DecodeError> {
    let mut sections = Vec::with_capacity(schema.sections().len());

    for spec in schema.sections() {
        if !spec.is_loaded_from_file() {
            debug!("Skipping runtime section '{}'", spec.name());
            sections.push(None);
            continue;
        }

        let section =
            document
                .section(spec.source())
                .ok_or_else(|| DecodeError::SectionNotFound {
                    section: spec.source().to_string(),
                    origin: origin.to_string(),
                })?;

        let values = decode_section(spec, section)?;
        debug!("Decoded {} fields from [{}]", values.len(), spec.source());
        sections.push(Some(values));
    }

    Ok(Record::from_sections(schema, sections))
}

fn decode_section(spec: &SectionSpec, section: SectionView<'_>) -> Result<SectionValues, DecodeError> {
    let mut values = SectionValues::new(spec.name());

    for field in spec.fields() {
        let raw = section
            .get(field.name())
            .ok_or_else(|| DecodeError::MissingKey {
                section: spec.source().to_string(),
                key: field.name().to_string(),
            })?;

        let value = value::convert(raw, field.field_type()).ok_or_else(|| {
            DecodeError::InvalidValue {
                section: spec.source().to_string(),
                key: field.name().to_string(),
                raw: raw.to_string(),
                expected: field.field_type(),
            }
        })?;

        values.insert(field.name(), value);
    }

    Ok(values)
}

/// Load a strongly-typed configuration from an INI file.
///
/// Builds `T`'s schema, decodes `path` against it, and converts the record.
pub fn load<T: FromRecord>(path: &Path) -> Result<T> {
    let schema = T::schema().context("Invalid configuration schema")?;

    let record = decode(&schema, path)
        .with_context(|| format!("Failed to load config file: {}", path.display()))?;

    T::from_record(&record)
        .with_context(|| format!("Failed to build configuration from {}", path.display()))
}
