//! Decoded records and typed access to them.
//!
//! A [`Record`] holds one slot per schema section, in schema order. Loaded
//! sections are filled by [`decode`](crate::decode()); runtime-only sections
//! start unset and are filled by the caller with [`Record::attach`].
//!
//! Strongly-typed configuration structs implement [`TypedSection`] (one
//! struct per section) and [`FromRecord`] (the whole configuration); see
//! [`crate::presets::simulation`] for a complete example.

use serde::ser::{Serialize, SerializeMap, Serializer};

use crate::schema::{FieldSpec, FieldType, Schema, SchemaError, SectionSpec};
use crate::value::Value;

/// Errors when reading typed values out of a [`Record`].
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum RecordError {
    /// No section with this name exists in the record's schema.
    #[error("Unknown section \"{0}\"")]
    UnknownSection(String),

    /// The section exists but has not been loaded or attached.
    #[error("Section \"{0}\" has not been set")]
    SectionNotSet(String),

    /// The section has no value for this key, or the schema does not
    /// declare it.
    #[error("Unknown field \"{key}\" in section \"{section}\"")]
    UnknownField { section: String, key: String },

    /// Attached values lack a field the schema declares.
    #[error("Missing field \"{key}\" in section \"{section}\"")]
    MissingField { section: String, key: String },

    /// The stored value has a different type than requested.
    #[error("Field \"{key}\" in section \"{section}\" is {actual}, not {expected}")]
    TypeMismatch {
        section: String,
        key: String,
        expected: FieldType,
        actual: FieldType,
    },
}

/// Conversion from a stored [`Value`] into a Rust type.
pub trait FromValue: Sized {
    /// The field type this Rust type corresponds to.
    const FIELD_TYPE: FieldType;

    /// `None` when `value` holds a different type.
    fn from_value(value: &Value) -> Option<Self>;
}

impl FromValue for String {
    const FIELD_TYPE: FieldType = FieldType::Text;

    fn from_value(value: &Value) -> Option<Self> {
        match value {
            Value::Text(s) => Some(s.clone()),
            _ => None,
        }
    }
}

impl FromValue for i64 {
    const FIELD_TYPE: FieldType = FieldType::Integer;

    fn from_value(value: &Value) -> Option<Self> {
        match value {
            Value::Integer(i) => Some(*i),
            _ => None,
        }
    }
}

impl FromValue for f64 {
    const FIELD_TYPE: FieldType = FieldType::Float;

    fn from_value(value: &Value) -> Option<Self> {
        match value {
            Value::Float(x) => Some(*x),
            _ => None,
        }
    }
}

impl FromValue for bool {
    const FIELD_TYPE: FieldType = FieldType::Boolean;

    fn from_value(value: &Value) -> Option<Self> {
        match value {
            Value::Boolean(b) => Some(*b),
            _ => None,
        }
    }
}

impl FromValue for Vec<String> {
    const FIELD_TYPE: FieldType = FieldType::TextList;

    fn from_value(value: &Value) -> Option<Self> {
        match value {
            Value::TextList(items) => Some(items.clone()),
            _ => None,
        }
    }
}

/// Typed values of one section, in field-declaration order.
///
/// ```
/// use inischema::SectionValues;
///
/// let values = SectionValues::new("runtime")
///     .with("user", "alice")
///     .with("retries", 3i64);
///
/// assert_eq!(values.len(), 2);
/// assert_eq!(values.get::<i64>("retries")?, 3);
/// let keys: Vec<_> = values.iter().map(|(key, _)| key).collect();
/// assert_eq!(keys, ["user", "retries"]);
/// # Ok::<(), inischema::RecordError>(())
/// ```
#[derive(Debug, Clone, PartialEq)]
pub struct SectionValues {
    name: String,
    entries: Vec<(String, Value)>,
}

impl SectionValues {
    /// An empty set of values for the section with record name `name`.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            entries: Vec::new(),
        }
    }

    /// Builder-style [`insert`](Self::insert), for runtime sections.
    pub fn with(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.insert(key, value);
        self
    }

    /// Set `key`, replacing any previous value.
    pub fn insert(&mut self, key: impl Into<String>, value: impl Into<Value>) {
        let key = key.into();
        let value = value.into();
        match self.entries.iter_mut().find(|(k, _)| *k == key) {
            Some(entry) => entry.1 = value,
            None => self.entries.push((key, value)),
        }
    }

    /// Record name of the section.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// The stored value of `key`, whatever its type.
    pub fn value(&self, key: &str) -> Option<&Value> {
        self.entries.iter().find(|(k, _)| k == key).map(|(_, v)| v)
    }

    /// Read `key` as `T`.
    pub fn get<T: FromValue>(&self, key: &str) -> Result<T, RecordError> {
        let value = self.value(key).ok_or_else(|| RecordError::UnknownField {
            section: self.name.clone(),
            key: key.to_string(),
        })?;

        T::from_value(value).ok_or_else(|| RecordError::TypeMismatch {
            section: self.name.clone(),
            key: key.to_string(),
            expected: T::FIELD_TYPE,
            actual: value.field_type(),
        })
    }

    /// Keys and values in field-declaration order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &Value)> {
        self.entries.iter().map(|(k, v)| (k.as_str(), v))
    }

    /// Number of stored keys.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

#[derive(Debug, Clone, PartialEq)]
struct Slot {
    name: String,
    fields: Vec<FieldSpec>,
    values: Option<SectionValues>,
}

impl Slot {
    fn new(spec: &SectionSpec, values: Option<SectionValues>) -> Self {
        Self {
            name: spec.name().to_string(),
            fields: spec.fields().to_vec(),
            values,
        }
    }

    /// Check that `values` holds exactly the declared fields, each with its
    /// declared type.
    fn check(&self, values: &SectionValues) -> Result<(), RecordError> {
        for field in &self.fields {
            let value = values
                .value(field.name())
                .ok_or_else(|| RecordError::MissingField {
                    section: self.name.clone(),
                    key: field.name().to_string(),
                })?;
            if value.field_type() != field.field_type() {
                return Err(RecordError::TypeMismatch {
                    section: self.name.clone(),
                    key: field.name().to_string(),
                    expected: field.field_type(),
                    actual: value.field_type(),
                });
            }
        }

        if let Some((key, _)) = values
            .iter()
            .find(|(key, _)| !self.fields.iter().any(|f| f.name() == *key))
        {
            return Err(RecordError::UnknownField {
                section: self.name.clone(),
                key: key.to_string(),
            });
        }

        Ok(())
    }
}

/// The result of decoding a configuration file against a [`Schema`].
///
/// Owned by the caller; the decoder keeps no reference to it. Each slot
/// remembers its section's declared fields, so attached values are checked
/// against the same schema that produced the record.
#[derive(Debug, Clone, PartialEq)]
pub struct Record {
    slots: Vec<Slot>,
}

impl Record {
    /// An empty record with one unset slot per schema section.
    pub fn empty(schema: &Schema) -> Self {
        Self {
            slots: schema
                .sections()
                .iter()
                .map(|spec| Slot::new(spec, None))
                .collect(),
        }
    }

    /// Build a record from decoded values, one entry per schema section in
    /// schema order.
    pub(crate) fn from_sections(schema: &Schema, values: Vec<Option<SectionValues>>) -> Self {
        Self {
            slots: schema
                .sections()
                .iter()
                .zip(values)
                .map(|(spec, values)| Slot::new(spec, values))
                .collect(),
        }
    }

    /// Assign a section after decode, typically a runtime-only one.
    ///
    /// The values must cover every declared field with its declared type
    /// and nothing else; otherwise the record is left unchanged. Replaces
    /// any values the section already had.
    pub fn attach(&mut self, values: SectionValues) -> Result<(), RecordError> {
        let slot = self
            .slots
            .iter_mut()
            .find(|slot| slot.name == values.name)
            .ok_or_else(|| RecordError::UnknownSection(values.name.clone()))?;
        slot.check(&values)?;
        slot.values = Some(values);
        Ok(())
    }

    /// Values of a section, or `None` if unknown or not set.
    pub fn section(&self, name: &str) -> Option<&SectionValues> {
        self.slots
            .iter()
            .find(|slot| slot.name == name)
            .and_then(|slot| slot.values.as_ref())
    }

    /// Values of a section, distinguishing unknown from unset sections.
    pub fn require(&self, name: &str) -> Result<&SectionValues, RecordError> {
        let slot = self
            .slots
            .iter()
            .find(|slot| slot.name == name)
            .ok_or_else(|| RecordError::UnknownSection(name.to_string()))?;
        slot.values
            .as_ref()
            .ok_or_else(|| RecordError::SectionNotSet(name.to_string()))
    }

    /// Whether the section has been decoded or attached.
    pub fn is_set(&self, name: &str) -> bool {
        self.section(name).is_some()
    }

    /// Read a single value as `T`.
    pub fn get<T: FromValue>(&self, section: &str, key: &str) -> Result<T, RecordError> {
        self.require(section)?.get(key)
    }

    /// Build a typed section struct from its slot.
    pub fn extract<T: TypedSection>(&self) -> Result<T, RecordError> {
        T::from_values(self.require(T::NAME)?)
    }

    /// Like [`extract`](Self::extract), but `None` when the section is unset.
    pub fn extract_optional<T: TypedSection>(&self) -> Result<Option<T>, RecordError> {
        match self.require(T::NAME) {
            Ok(values) => T::from_values(values).map(Some),
            Err(RecordError::SectionNotSet(_)) => Ok(None),
            Err(e) => Err(e),
        }
    }

    /// Section names in schema order, with their values if set.
    pub fn sections(&self) -> impl Iterator<Item = (&str, Option<&SectionValues>)> {
        self.slots
            .iter()
            .map(|slot| (slot.name.as_str(), slot.values.as_ref()))
    }
}

/// Serializes as `{ section: { key: value } }`; unset sections are `null`.
impl Serialize for Record {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.slots.len()))?;
        for slot in &self.slots {
            map.serialize_entry(&slot.name, &slot.values)?;
        }
        map.end()
    }
}

impl Serialize for SectionValues {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.entries.len()))?;
        for (key, value) in &self.entries {
            map.serialize_entry(key, value)?;
        }
        map.end()
    }
}

/// A strongly-typed struct bound to one schema section.
pub trait TypedSection: Sized {
    /// Record name of the section.
    const NAME: &'static str;

    /// The section's schema declaration.
    fn spec() -> SectionSpec;

    /// Build the struct from the section's decoded values.
    fn from_values(values: &SectionValues) -> Result<Self, RecordError>;
}

/// A strongly-typed configuration made up of several sections.
pub trait FromRecord: Sized {
    /// The schema the configuration is decoded against.
    fn schema() -> Result<Schema, SchemaError>;

    /// Build the configuration from a record decoded with [`schema`](Self::schema).
    fn from_record(record: &Record) -> Result<Self, RecordError>;
}

#[cfg(test)]
mod tests {
    use super::*;

    fn schema() -> Schema {
        Schema::builder()
            .section(SectionSpec::new("general", "General").field("count", FieldType::Integer))
            .section(SectionSpec::runtime("runtime").field("user", FieldType::Text))
            .build()
            .unwrap()
    }

    #[test]
    fn test_empty_record_has_unset_slots() {
        let record = Record::empty(&schema());
        assert!(!record.is_set("general"));
        assert!(!record.is_set("runtime"));
        assert_eq!(record.sections().count(), 2);
    }

    #[test]
    fn test_attach_runtime_section() {
        let mut record = Record::empty(&schema());
        record
            .attach(SectionValues::new("runtime").with("user", "alice"))
            .unwrap();

        assert_eq!(record.get::<String>("runtime", "user").unwrap(), "alice");
    }

    #[test]
    fn test_attach_unknown_section() {
        let mut record = Record::empty(&schema());
        let err = record.attach(SectionValues::new("other")).unwrap_err();
        assert_eq!(err, RecordError::UnknownSection("other".to_string()));
    }

    #[test]
    fn test_attach_rejects_wrong_type() {
        let mut record = Record::empty(&schema());
        let err = record
            .attach(SectionValues::new("runtime").with("user", 5i64))
            .unwrap_err();

        assert_eq!(
            err,
            RecordError::TypeMismatch {
                section: "runtime".to_string(),
                key: "user".to_string(),
                expected: FieldType::Text,
                actual: FieldType::Integer,
            }
        );
        assert!(!record.is_set("runtime"));
    }

    #[test]
    fn test_attach_rejects_missing_field() {
        let mut record = Record::empty(&schema());
        let err = record.attach(SectionValues::new("runtime")).unwrap_err();

        assert_eq!(
            err,
            RecordError::MissingField {
                section: "runtime".to_string(),
                key: "user".to_string(),
            }
        );
        assert_eq!(err.to_string(), "Missing field \"user\" in section \"runtime\"");
        assert!(!record.is_set("runtime"));
    }

    #[test]
    fn test_attach_rejects_undeclared_field() {
        let mut record = Record::empty(&schema());
        let err = record
            .attach(
                SectionValues::new("runtime")
                    .with("user", "alice")
                    .with("host", "box"),
            )
            .unwrap_err();

        assert_eq!(
            err,
            RecordError::UnknownField {
                section: "runtime".to_string(),
                key: "host".to_string(),
            }
        );
    }

    #[test]
    fn test_failed_attach_keeps_previous_values() {
        let mut record = Record::empty(&schema());
        record
            .attach(SectionValues::new("runtime").with("user", "alice"))
            .unwrap();
        assert!(record.attach(SectionValues::new("runtime")).is_err());

        assert_eq!(record.get::<String>("runtime", "user").unwrap(), "alice");
    }

    #[test]
    fn test_require_distinguishes_unknown_and_unset() {
        let record = Record::empty(&schema());
        assert_eq!(
            record.require("runtime").unwrap_err(),
            RecordError::SectionNotSet("runtime".to_string())
        );
        assert_eq!(
            record.require("missing").unwrap_err(),
            RecordError::UnknownSection("missing".to_string())
        );
    }

    #[test]
    fn test_typed_get() {
        let values = SectionValues::new("general")
            .with("count", 10i64)
            .with("ratio", 0.5)
            .with("active", true)
            .with("tags", vec!["a".to_string()]);

        assert_eq!(values.get::<i64>("count").unwrap(), 10);
        assert_eq!(values.get::<f64>("ratio").unwrap(), 0.5);
        assert!(values.get::<bool>("active").unwrap());
        assert_eq!(values.get::<Vec<String>>("tags").unwrap(), vec!["a"]);
    }

    #[test]
    fn test_typed_get_mismatch() {
        let values = SectionValues::new("general").with("count", 10i64);

        assert_eq!(
            values.get::<String>("count").unwrap_err(),
            RecordError::TypeMismatch {
                section: "general".to_string(),
                key: "count".to_string(),
                expected: FieldType::Text,
                actual: FieldType::Integer,
            }
        );
        assert!(matches!(
            values.get::<i64>("nope"),
            Err(RecordError::UnknownField { .. })
        ));
    }

    #[test]
    fn test_insert_replaces() {
        let mut values = SectionValues::new("s");
        values.insert("k", 1i64);
        values.insert("k", 2i64);
        assert_eq!(values.len(), 1);
        assert_eq!(values.get::<i64>("k").unwrap(), 2);
    }

    #[test]
    fn test_serialize_json() {
        let mut record = Record::empty(&schema());
        record
            .attach(SectionValues::new("general").with("count", 3i64))
            .unwrap();

        let json = serde_json::to_value(&record).unwrap();
        assert_eq!(
            json,
            serde_json::json!({ "general": { "count": 3 }, "runtime": null })
        );
    }
}
