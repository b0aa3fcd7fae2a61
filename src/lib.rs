//! inischema: schema-driven loading of INI configuration files.
//!
//! A [`Schema`] declares which sections an INI file must contain and the
//! type of every key in them. [`decode`] reads a file against a schema and
//! returns a [`Record`] of typed values, or the first problem it found.
//!
//! # Architecture
//!
//! - **ini**: Parses INI text into ordered sections and entries
//! - **schema**: Declares sections and typed fields, in code or in TOML
//! - **value**: Converts raw text to text, integer, float, boolean or list
//! - **decode**: Drives the conversion and reports missing or invalid data
//! - **record**: Holds decoded values and maps them onto typed structs
//! - **presets**: Schemas bundled with the crate
//!
//! # Example
//!
//! ```no_run
//! use inischema::schema::{FieldType, Schema, SectionSpec};
//! use inischema::{decode, SectionValues};
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
//! let mut record = decode(&schema, std::path::Path::new("config.ini"))?;
//! record.attach(SectionValues::new("runtime").with("started_at", "15:38"))?;
//!
//! println!("count = {}", record.get::<i64>("general", "count")?);
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```

pub mod decode;
pub mod ini;
pub mod presets;
pub mod record;
pub mod schema;
pub mod value;

// Re-export commonly used types
pub use decode::{DecodeError, decode, decode_str, load};
pub use record::{FromRecord, FromValue, Record, RecordError, SectionValues, TypedSection};
pub use schema::{FieldType, Schema, SchemaError, SectionSpec};
pub use value::Value;
