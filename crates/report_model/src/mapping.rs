//! Field mappings from domain records to report columns
//!
//! A mapping names where a column's value lives inside a record and how the
//! value should be interpreted. Sources can be combined, which covers the
//! usual "first and last name, otherwise the username" kind of field.

use crate::table::SemanticType;
use crate::value::Value;
use serde::{Deserialize, Serialize};
use serde_json::Value as JsonValue;
use std::collections::BTreeMap;

/// Where a field's value comes from
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum FieldSource {
    /// Dotted path into the record, e.g. `"property.city"` or `"images.0.image"`
    Path(String),
    /// The first source that yields a non-empty value
    FirstNonEmpty(Vec<FieldSource>),
    /// Non-empty parts joined with a separator
    Join {
        parts: Vec<FieldSource>,
        #[serde(default = "default_separator")]
        separator: String,
    },
}

fn default_separator() -> String {
    " ".to_string()
}

impl FieldSource {
    pub fn path(path: impl Into<String>) -> Self {
        FieldSource::Path(path.into())
    }

    /// Resolve the source against one record; missing paths give `Value::Null`
    pub fn resolve(&self, record: &JsonValue) -> Value {
        match self {
            FieldSource::Path(path) => lookup_path(record, path)
                .map(Value::from_json)
                .unwrap_or(Value::Null),
            FieldSource::FirstNonEmpty(sources) => sources
                .iter()
                .map(|s| s.resolve(record))
                .find(|v| !v.is_empty())
                .unwrap_or(Value::Null),
            FieldSource::Join { parts, separator } => {
                let pieces: Vec<String> = parts
                    .iter()
                    .map(|p| p.resolve(record))
                    .filter(|v| !v.is_empty())
                    .map(|v| v.to_string_value().trim().to_string())
                    .collect();
                if pieces.is_empty() {
                    Value::Null
                } else {
                    Value::Text(pieces.join(separator))
                }
            }
        }
    }
}

/// Walk a dotted path through nested objects and arrays
///
/// Numeric segments index into arrays. Any segment that does not resolve
/// ends the walk with `None`.
pub fn lookup_path<'a>(record: &'a JsonValue, path: &str) -> Option<&'a JsonValue> {
    let mut current = record;
    for part in path.split('.') {
        current = match current {
            JsonValue::Object(obj) => obj.get(part)?,
            JsonValue::Array(arr) => arr.get(part.parse::<usize>().ok()?)?,
            _ => return None,
        };
    }
    Some(current)
}

/// How one column's cell is derived from a record
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FieldMapping {
    /// Column key this mapping fills
    pub key: String,
    /// Where the value comes from
    pub source: FieldSource,
    /// How the value is interpreted
    #[serde(default)]
    pub semantic_type: SemanticType,
    /// Malformed values skip the whole row instead of falling back to a default
    #[serde(default)]
    pub required: bool,
    /// Raw text to display label, e.g. `"true" -> "Active"`
    #[serde(default)]
    pub enum_labels: BTreeMap<String, String>,
    /// Overrides the report-wide placeholder for missing text
    #[serde(default)]
    pub placeholder: Option<String>,
}

impl FieldMapping {
    /// Create a new mapping
    pub fn new(key: impl Into<String>, source: FieldSource, semantic_type: SemanticType) -> Self {
        Self {
            key: key.into(),
            source,
            semantic_type,
            required: false,
            enum_labels: BTreeMap::new(),
            placeholder: None,
        }
    }

    /// Mapping that reads a single path
    pub fn path(key: impl Into<String>, path: impl Into<String>, semantic_type: SemanticType) -> Self {
        Self::new(key, FieldSource::path(path), semantic_type)
    }

    /// Mark the field as required
    pub fn required(mut self) -> Self {
        self.required = true;
        self
    }

    /// Add an enum label
    pub fn with_label(mut self, raw: impl Into<String>, label: impl Into<String>) -> Self {
        self.enum_labels.insert(raw.into(), label.into());
        self
    }

    /// Set a field-specific placeholder
    pub fn with_placeholder(mut self, placeholder: impl Into<String>) -> Self {
        self.placeholder = Some(placeholder.into());
        self
    }

    /// Look up the label for a raw enum value
    pub fn label_for(&self, raw: &str) -> Option<&str> {
        self.enum_labels.get(raw).map(String::as_str)
    }
}
