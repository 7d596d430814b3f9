//! Error types for layout engine

use serde::Serialize;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum LayoutError {
    #[error("No visible columns: every column has zero width")]
    NoVisibleColumns,

    #[error("Invalid content box: {0}")]
    InvalidContentBox(String),
}

pub type Result<T> = std::result::Result<T, LayoutError>;

/// A column too narrow to hold a single glyph
///
/// Layout keeps going: cells in the column get one unwrapped line and the
/// renderer clips them to the cell.
#[derive(Debug, Clone, PartialEq, Serialize, Error)]
#[error("Column '{column}' is {available_width:.2}pt wide, narrower than one {char_width:.2}pt glyph")]
pub struct LayoutOverflow {
    pub column: String,
    pub available_width: f64,
    pub char_width: f64,
}
