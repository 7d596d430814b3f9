//! Rows, cells, and column specifications

use crate::value::Value;
use serde::{Deserialize, Serialize};

/// How a cell's raw value is interpreted and displayed
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum SemanticType {
    /// Monetary amount, shown with symbol, grouping, and two decimals
    Currency,
    /// Date or timestamp, shown with the configured pattern
    Date,
    /// Free text
    #[default]
    Text,
    /// Whole number
    Integer,
    /// Status-like value mapped through a label table
    Enum,
}

impl SemanticType {
    /// Get string representation
    pub fn as_str(&self) -> &'static str {
        match self {
            SemanticType::Currency => "currency",
            SemanticType::Date => "date",
            SemanticType::Text => "text",
            SemanticType::Integer => "integer",
            SemanticType::Enum => "enum",
        }
    }
}

impl std::fmt::Display for SemanticType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// One display cell
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Cell {
    /// Text shown by every renderer
    pub display_text: String,
    /// Value the text was derived from
    pub raw_value: Value,
    /// Interpretation used to derive the text
    pub semantic_type: SemanticType,
}

impl Cell {
    pub fn new(display_text: impl Into<String>, raw_value: Value, semantic_type: SemanticType) -> Self {
        Self {
            display_text: display_text.into(),
            raw_value,
            semantic_type,
        }
    }

    /// A plain text cell whose raw value is its own text
    pub fn text(text: impl Into<String>) -> Self {
        let text = text.into();
        Self::new(text.clone(), Value::Text(text), SemanticType::Text)
    }
}

/// One exportable record reduced to an ordered list of cells
///
/// Cells are in column order of the report definition that produced the row.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct Row {
    pub cells: Vec<Cell>,
}

impl Row {
    pub fn new(cells: Vec<Cell>) -> Self {
        Self { cells }
    }

    /// Get a cell by column index
    pub fn get(&self, index: usize) -> Option<&Cell> {
        self.cells.get(index)
    }

    /// Display text of a cell, empty when the index is out of range
    pub fn text(&self, index: usize) -> &str {
        self.cells
            .get(index)
            .map(|c| c.display_text.as_str())
            .unwrap_or("")
    }

    pub fn len(&self) -> usize {
        self.cells.len()
    }

    pub fn is_empty(&self) -> bool {
        self.cells.is_empty()
    }

    /// Display texts in column order
    pub fn display_texts(&self) -> Vec<&str> {
        self.cells.iter().map(|c| c.display_text.as_str()).collect()
    }
}

/// What happens to text that does not fit its column
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum TruncationPolicy {
    /// Wrap onto as many lines as needed
    #[default]
    Wrap,
    /// Keep one line and end it with "..."
    Ellipsis,
    /// Keep one line and let the renderer clip it
    None,
}

/// Column definition shared by all renderers
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ColumnSpec {
    /// Field key, matched against the field mappings
    pub key: String,
    /// Header text
    pub header_label: String,
    /// Relative width share; zero hides the column on paged and raster output
    pub weight: f64,
    /// Overflow behaviour for cell text
    #[serde(default)]
    pub truncation: TruncationPolicy,
}

impl ColumnSpec {
    /// Create a new column spec
    pub fn new(key: impl Into<String>, header_label: impl Into<String>, weight: f64) -> Self {
        Self {
            key: key.into(),
            header_label: header_label.into(),
            weight,
            truncation: TruncationPolicy::default(),
        }
    }

    /// Set the truncation policy
    pub fn with_truncation(mut self, truncation: TruncationPolicy) -> Self {
        self.truncation = truncation;
        self
    }

    /// Whether the column takes up any width
    pub fn is_visible(&self) -> bool {
        self.weight.is_finite() && self.weight > 0.0
    }
}
