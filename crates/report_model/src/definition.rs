//! Per-call-site report configuration

use crate::error::{ProjectionError, Result};
use crate::mapping::{FieldMapping, FieldSource};
use crate::summary::SummarySpec;
use crate::table::{ColumnSpec, SemanticType};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;

/// Everything a dashboard tab supplies to export its records
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReportDefinition {
    /// Base of the exported file names, e.g. `"properties-report"`
    pub name: String,
    /// Heading shown in every artifact
    pub title: String,
    /// Optional second heading line
    #[serde(default)]
    pub subtitle: Option<String>,
    /// Noun used in the footer caption, e.g. `"Properties"`
    #[serde(default = "default_entity_label")]
    pub entity_label: String,
    /// Columns in display order
    pub columns: Vec<ColumnSpec>,
    /// How each column is filled
    #[serde(default)]
    pub fields: Vec<FieldMapping>,
    /// Summary lines
    #[serde(default)]
    pub summary: Vec<SummarySpec>,
}

fn default_entity_label() -> String {
    "Records".to_string()
}

impl ReportDefinition {
    /// Create a definition with no columns yet
    pub fn new(name: impl Into<String>, title: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            title: title.into(),
            subtitle: None,
            entity_label: default_entity_label(),
            columns: Vec::new(),
            fields: Vec::new(),
            summary: Vec::new(),
        }
    }

    pub fn with_subtitle(mut self, subtitle: impl Into<String>) -> Self {
        self.subtitle = Some(subtitle.into());
        self
    }

    pub fn with_entity_label(mut self, label: impl Into<String>) -> Self {
        self.entity_label = label.into();
        self
    }

    /// Add a column together with the mapping that fills it
    pub fn column(mut self, column: ColumnSpec, field: FieldMapping) -> Self {
        self.columns.push(column);
        self.fields.push(field);
        self
    }

    /// Add a summary line
    pub fn summarize(mut self, spec: SummarySpec) -> Self {
        self.summary.push(spec);
        self
    }

    /// Mapping for a column key
    ///
    /// Columns without an explicit mapping read the record field of the same
    /// name as text.
    pub fn field_for(&self, key: &str) -> FieldMapping {
        self.fields
            .iter()
            .find(|f| f.key == key)
            .cloned()
            .unwrap_or_else(|| FieldMapping::new(key, FieldSource::path(key), SemanticType::Text))
    }

    /// Column header labels in display order
    pub fn header_labels(&self) -> Vec<&str> {
        self.columns.iter().map(|c| c.header_label.as_str()).collect()
    }

    /// Check the definition can drive an export
    pub fn validate(&self) -> Result<()> {
        if self.name.trim().is_empty() {
            return Err(ProjectionError::InvalidDefinition(
                "report name is empty".to_string(),
            ));
        }
        if self.columns.is_empty() {
            return Err(ProjectionError::InvalidDefinition(format!(
                "report '{}' has no columns",
                self.name
            )));
        }

        let mut seen = HashSet::new();
        for column in &self.columns {
            if !seen.insert(column.key.as_str()) {
                return Err(ProjectionError::InvalidDefinition(format!(
                    "duplicate column key '{}'",
                    column.key
                )));
            }
        }

        for field in &self.fields {
            if !seen.contains(field.key.as_str()) {
                return Err(ProjectionError::InvalidDefinition(format!(
                    "field '{}' does not match any column",
                    field.key
                )));
            }
        }

        Ok(())
    }
}
