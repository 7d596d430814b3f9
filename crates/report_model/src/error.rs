//! Error types for record projection

use crate::table::SemanticType;
use thiserror::Error;

/// Errors raised while projecting records into rows
///
/// `NotAnObject` and `MalformedField` only ever cost the offending row;
/// the projector records them and moves on to the next record.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ProjectionError {
    /// The record is not a JSON object
    #[error("Record {index} is not an object")]
    NotAnObject { index: usize },

    /// A required field holds a value that cannot be coerced to its type
    #[error("Record {index}: field '{field}' cannot be read as {expected}: {value}")]
    MalformedField {
        index: usize,
        field: String,
        expected: SemanticType,
        value: String,
    },

    /// The report definition itself is unusable
    #[error("Invalid report definition: {0}")]
    InvalidDefinition(String),
}

/// Result type for projection operations
pub type Result<T> = std::result::Result<T, ProjectionError>;
