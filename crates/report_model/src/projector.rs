//! Record projection
//!
//! Turns heterogeneous domain records into uniform rows plus the summary
//! block. Every cell gets a display text: missing numbers become zero and
//! missing text becomes the placeholder label, so renderers never see a hole.
//! Only a malformed *required* field (or a record that is not an object)
//! costs a row, and each such skip is logged.

use crate::definition::ReportDefinition;
use crate::error::{ProjectionError, Result};
use crate::format::FormatOptions;
use crate::mapping::FieldMapping;
use crate::summary::SummaryBlock;
use crate::table::{Cell, Row, SemanticType};
use crate::value::Value;
use chrono::NaiveDateTime;
use serde_json::Value as JsonValue;

/// Options for a projection run
#[derive(Debug, Clone, Default)]
pub struct ProjectorOptions {
    /// Cell formatting
    pub format: FormatOptions,
    /// "Now" for date-relative summary predicates
    pub reference_time: Option<NaiveDateTime>,
}

/// A record that was left out of the rows
#[derive(Debug, Clone, PartialEq)]
pub struct SkippedRecord {
    /// Position in the input collection
    pub index: usize,
    pub error: ProjectionError,
}

/// Rows and summary for one export
#[derive(Debug, Clone, Default)]
pub struct Projection {
    /// Rows in input order
    pub rows: Vec<Row>,
    /// Aggregates over every projected record
    pub summary: SummaryBlock,
    /// Records dropped because of a projection error
    pub skipped: Vec<SkippedRecord>,
}

impl Projection {
    pub fn row_count(&self) -> usize {
        self.rows.len()
    }
}

/// Projects records through a report definition
pub struct RecordProjector<'a> {
    definition: &'a ReportDefinition,
    fields: Vec<FieldMapping>,
    options: ProjectorOptions,
}

impl<'a> RecordProjector<'a> {
    /// Create a projector for a definition
    pub fn new(definition: &'a ReportDefinition, options: ProjectorOptions) -> Self {
        let fields = definition
            .columns
            .iter()
            .map(|c| definition.field_for(&c.key))
            .collect();
        Self {
            definition,
            fields,
            options,
        }
    }

    /// Project a whole collection
    ///
    /// Row order follows input order. The summary covers exactly the records
    /// that produced rows.
    pub fn project(&self, records: &[JsonValue]) -> Projection {
        let mut rows = Vec::with_capacity(records.len());
        let mut kept = Vec::with_capacity(records.len());
        let mut skipped = Vec::new();

        for (index, record) in records.iter().enumerate() {
            match self.project_record(index, record) {
                Ok(row) => {
                    rows.push(row);
                    kept.push(record);
                }
                Err(error) => {
                    tracing::warn!("Skipping record {} of '{}': {}", index, self.definition.name, error);
                    skipped.push(SkippedRecord { index, error });
                }
            }
        }

        let summary = SummaryBlock::compute(
            &self.definition.summary,
            &kept,
            &self.options.format.currency_symbol,
            self.options.reference_time,
        );

        tracing::debug!(
            "Projected {} rows ({} skipped) for '{}'",
            rows.len(),
            skipped.len(),
            self.definition.name
        );

        Projection {
            rows,
            summary,
            skipped,
        }
    }

    /// Project one record into a row
    pub fn project_record(&self, index: usize, record: &JsonValue) -> Result<Row> {
        if !record.is_object() {
            return Err(ProjectionError::NotAnObject { index });
        }

        let cells = self
            .fields
            .iter()
            .map(|field| self.project_cell(index, field, record))
            .collect::<Result<Vec<_>>>()?;

        Ok(Row::new(cells))
    }

    fn project_cell(&self, index: usize, field: &FieldMapping, record: &JsonValue) -> Result<Cell> {
        let raw = field.source.resolve(record);
        let format = &self.options.format;
        let placeholder = field.placeholder.as_deref().unwrap_or(&format.placeholder);

        let malformed = |raw: &Value| ProjectionError::MalformedField {
            index,
            field: field.key.clone(),
            expected: field.semantic_type,
            value: raw.to_string_value(),
        };

        let cell = match field.semantic_type {
            SemanticType::Currency => {
                let amount = match numeric(&raw) {
                    Some(n) => n,
                    None if field.required => return Err(malformed(&raw)),
                    None => 0.0,
                };
                Cell::new(format.currency(amount), Value::Number(amount), SemanticType::Currency)
            }
            SemanticType::Integer => {
                let n = match numeric(&raw) {
                    Some(n) => n.round() as i64,
                    None if field.required => return Err(malformed(&raw)),
                    None => 0,
                };
                Cell::new(n.to_string(), Value::Integer(n), SemanticType::Integer)
            }
            SemanticType::Date => match raw.as_datetime() {
                Some(dt) => Cell::new(format.date(&dt), Value::Date(dt), SemanticType::Date),
                None if field.required && !raw.is_empty() => return Err(malformed(&raw)),
                None => Cell::new(placeholder, raw, SemanticType::Date),
            },
            SemanticType::Enum => {
                let key = if raw.is_null() {
                    "null".to_string()
                } else {
                    raw.to_string_value()
                };
                let display = match field.label_for(&key) {
                    Some(label) => label.to_string(),
                    None if raw.is_empty() => placeholder.to_string(),
                    None => key,
                };
                Cell::new(display, raw, SemanticType::Enum)
            }
            SemanticType::Text => {
                let display = if raw.is_empty() {
                    placeholder.to_string()
                } else {
                    raw.to_string_value()
                };
                Cell::new(display, raw, SemanticType::Text)
            }
        };

        Ok(cell)
    }
}

/// Numeric reading of a raw value; a missing value reads as zero
fn numeric(raw: &Value) -> Option<f64> {
    if raw.is_empty() {
        return Some(0.0);
    }
    raw.as_f64()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mapping::FieldSource;
    use crate::summary::{Predicate, SummarySpec};
    use crate::table::ColumnSpec;
    use serde_json::json;

    fn definition() -> ReportDefinition {
        ReportDefinition::new("properties-report", "Properties")
            .column(
                ColumnSpec::new("name", "Name", 3.0),
                FieldMapping::path("name", "name", SemanticType::Text),
            )
            .column(
                ColumnSpec::new("price", "Price", 1.0),
                FieldMapping::path("price", "price", SemanticType::Currency).required(),
            )
            .column(
                ColumnSpec::new("status", "Status", 1.0),
                FieldMapping::path("status", "is_available", SemanticType::Enum)
                    .with_label("true", "Active")
                    .with_label("false", "Inactive"),
            )
            .column(
                ColumnSpec::new("listed", "Listed", 1.0),
                FieldMapping::path("listed", "created_at", SemanticType::Date),
            )
            .column(
                ColumnSpec::new("beds", "Beds", 0.5),
                FieldMapping::path("beds", "bedrooms", SemanticType::Integer),
            )
            .summarize(SummarySpec::count("Total"))
            .summarize(SummarySpec::count_where(
                "Active",
                Predicate::Truthy { field: "is_available".into() },
            ))
    }

    #[test]
    fn test_project_full_record() {
        let def = definition();
        let projector = RecordProjector::new(&def, ProjectorOptions::default());
        let record = json!({
            "name": "Sea View",
            "price": "1234.5",
            "is_available": true,
            "created_at": "2024-02-01T09:00:00Z",
            "bedrooms": 3
        });
        let row = projector.project_record(0, &record).unwrap();
        assert_eq!(
            row.display_texts(),
            vec!["Sea View", "$1,234.50", "Active", "2024-02-01", "3"]
        );
        assert_eq!(row.get(1).unwrap().raw_value, Value::Number(1234.5));
    }

    #[test]
    fn test_missing_fields_use_defaults() {
        let def = definition();
        let projector = RecordProjector::new(&def, ProjectorOptions::default());
        let row = projector.project_record(0, &json!({})).unwrap();
        assert_eq!(row.display_texts(), vec!["N/A", "$0.00", "N/A", "N/A", "0"]);
    }

    #[test]
    fn test_malformed_required_field_skips_row() {
        let def = definition();
        let projector = RecordProjector::new(&def, ProjectorOptions::default());
        let records = vec![
            json!({"name": "A", "price": 10, "is_available": true}),
            json!({"name": "B", "price": "call us", "is_available": true}),
            json!("not a record"),
            json!({"name": "C", "price": 30, "is_available": false}),
        ];

        let projection = projector.project(&records);
        assert_eq!(projection.row_count(), 2);
        assert_eq!(projection.skipped.len(), 2);
        assert_eq!(projection.skipped[0].index, 1);
        assert!(matches!(
            projection.skipped[0].error,
            ProjectionError::MalformedField { .. }
        ));
        assert_eq!(
            projection.skipped[1].error,
            ProjectionError::NotAnObject { index: 2 }
        );

        // Row order follows input order, summary covers kept records only
        assert_eq!(projection.rows[0].text(0), "A");
        assert_eq!(projection.rows[1].text(0), "C");
        assert_eq!(projection.summary.value("Total"), Some(2.0));
        assert_eq!(projection.summary.value("Active"), Some(1.0));
    }

    #[test]
    fn test_malformed_optional_field_falls_back() {
        let def = ReportDefinition::new("r", "R").column(
            ColumnSpec::new("price", "Price", 1.0),
            FieldMapping::path("price", "price", SemanticType::Currency),
        );
        let projector = RecordProjector::new(&def, ProjectorOptions::default());
        let row = projector
            .project_record(0, &json!({"price": "negotiable"}))
            .unwrap();
        assert_eq!(row.text(0), "$0.00");
    }

    #[test]
    fn test_composite_name_field() {
        let name = FieldSource::FirstNonEmpty(vec![
            FieldSource::Join {
                parts: vec![FieldSource::path("first_name"), FieldSource::path("last_name")],
                separator: " ".into(),
            },
            FieldSource::path("username"),
        ]);
        let def = ReportDefinition::new("users-report", "Users").column(
            ColumnSpec::new("name", "Name", 1.0),
            FieldMapping::new("name", name, SemanticType::Text),
        );
        let projector = RecordProjector::new(&def, ProjectorOptions::default());

        let full = projector
            .project_record(0, &json!({"first_name": "Ada", "last_name": "Lovelace", "username": "ada"}))
            .unwrap();
        assert_eq!(full.text(0), "Ada Lovelace");

        let fallback = projector
            .project_record(1, &json!({"first_name": "", "username": "ada"}))
            .unwrap();
        assert_eq!(fallback.text(0), "ada");
    }

    #[test]
    fn test_empty_collection() {
        let def = definition();
        let projector = RecordProjector::new(&def, ProjectorOptions::default());
        let projection = projector.project(&[]);
        assert!(projection.rows.is_empty());
        assert!(projection.skipped.is_empty());
        assert_eq!(projection.summary.value("Total"), Some(0.0));
        assert_eq!(projection.summary.value("Active"), Some(0.0));
    }

    #[test]
    fn test_field_placeholder_override() {
        let def = ReportDefinition::new("r", "R").column(
            ColumnSpec::new("phone", "Phone", 1.0),
            FieldMapping::path("phone", "phone_number", SemanticType::Text).with_placeholder("-"),
        );
        let projector = RecordProjector::new(&def, ProjectorOptions::default());
        let row = projector.project_record(0, &json!({})).unwrap();
        assert_eq!(row.text(0), "-");
    }

    mod proptests {
        use super::*;
        use proptest::prelude::*;

        fn record_strategy() -> impl Strategy<Value = JsonValue> {
            prop_oneof![
                (any::<u32>(), "[a-zA-Z ,\"]{0,12}")
                    .prop_map(|(price, name)| json!({"name": name, "price": price})),
                "[a-z]{1,8}".prop_map(|junk| json!({"name": "x", "price": junk})),
                any::<i64>().prop_map(|n| json!(n)),
            ]
        }

        proptest! {
            #[test]
            fn rows_plus_skips_equal_input(records in prop::collection::vec(record_strategy(), 0..40)) {
                let def = definition();
                let projector = RecordProjector::new(&def, ProjectorOptions::default());
                let projection = projector.project(&records);

                prop_assert_eq!(projection.rows.len() + projection.skipped.len(), records.len());
                prop_assert_eq!(projection.summary.value("Total"), Some(projection.rows.len() as f64));

                let mut indices: Vec<usize> = projection.skipped.iter().map(|s| s.index).collect();
                indices.dedup();
                prop_assert_eq!(indices.len(), projection.skipped.len());
            }
        }
    }
}
