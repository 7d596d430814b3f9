//! Report Model - Records, rows, and summary statistics
//!
//! This crate turns already-fetched domain records (users, properties,
//! images, verifications, wishlists) into the uniform row model shared by
//! every export format.
//!
//! # Example
//!
//! ```rust
//! use report_model::{presets, ProjectorOptions, RecordProjector};
//!
//! let definition = presets::properties();
//! let records = vec![
//!     serde_json::json!({"id": 1, "name": "Sea View", "price": "250000", "is_available": true}),
//! ];
//!
//! let projector = RecordProjector::new(&definition, ProjectorOptions::default());
//! let projection = projector.project(&records);
//!
//! assert_eq!(projection.row_count(), 1);
//! assert_eq!(projection.summary.value("Active Properties"), Some(1.0));
//! ```

mod definition;
mod error;
mod format;
mod mapping;
mod projector;
mod summary;
mod table;
mod value;
pub mod presets;

pub use definition::ReportDefinition;
pub use error::{ProjectionError, Result};
pub use format::{format_currency, format_number, group_thousands, FormatOptions};
pub use mapping::{lookup_path, FieldMapping, FieldSource};
pub use projector::{Projection, ProjectorOptions, RecordProjector, SkippedRecord};
pub use summary::{Aggregate, Predicate, SummaryBlock, SummaryEntry, SummarySpec};
pub use table::{Cell, ColumnSpec, Row, SemanticType, TruncationPolicy};
pub use value::{try_parse_datetime, Value};
