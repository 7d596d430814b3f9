//! Aggregate statistics over a full record set
//!
//! The summary is computed once per export from every record that made it
//! through projection. Renderers only ever display it, so page splits and
//! row caps can never change the totals.

use crate::format::{format_currency, format_number};
use crate::mapping::lookup_path;
use crate::value::{try_parse_datetime, Value};
use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};
use serde_json::Value as JsonValue;

/// Condition tested against a raw record
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "op", rename_all = "camelCase")]
pub enum Predicate {
    /// Field equals a JSON value exactly
    Equals { field: String, value: JsonValue },
    /// Field is true, non-zero, or non-empty text other than "false"/"0"
    Truthy { field: String },
    /// Negation of `Truthy`, including a missing field
    Falsy { field: String },
    /// Field holds a date within `days` before the reference time
    WithinDays { field: String, days: i64 },
}

impl Predicate {
    /// Evaluate against one record
    ///
    /// `WithinDays` never matches without a reference time.
    pub fn matches(&self, record: &JsonValue, reference: Option<NaiveDateTime>) -> bool {
        match self {
            Predicate::Equals { field, value } => lookup_path(record, field) == Some(value),
            Predicate::Truthy { field } => is_truthy(lookup_path(record, field)),
            Predicate::Falsy { field } => !is_truthy(lookup_path(record, field)),
            Predicate::WithinDays { field, days } => {
                let Some(reference) = reference else {
                    return false;
                };
                let Some(date) = lookup_path(record, field)
                    .and_then(JsonValue::as_str)
                    .and_then(try_parse_datetime)
                else {
                    return false;
                };
                let age = reference.signed_duration_since(date);
                age.num_seconds() >= 0 && age.num_days() <= *days
            }
        }
    }
}

fn is_truthy(value: Option<&JsonValue>) -> bool {
    match value {
        None | Some(JsonValue::Null) => false,
        Some(JsonValue::Bool(b)) => *b,
        Some(JsonValue::Number(n)) => n.as_f64().is_some_and(|n| n != 0.0),
        Some(JsonValue::String(s)) => {
            let s = s.trim();
            !s.is_empty() && !s.eq_ignore_ascii_case("false") && s != "0"
        }
        Some(JsonValue::Array(a)) => !a.is_empty(),
        Some(JsonValue::Object(o)) => !o.is_empty(),
    }
}

/// Aggregate function of a summary entry
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "camelCase")]
pub enum Aggregate {
    /// Number of records
    Count,
    /// Number of records matching a predicate
    CountWhere { predicate: Predicate },
    /// Sum of a numeric field, missing values count as zero
    Sum { field: String },
    /// Smallest numeric value present
    Min { field: String },
    /// Largest numeric value present
    Max { field: String },
    /// Mean of the numeric values present
    Average { field: String },
    /// Share of records matching a predicate, 0 to 100
    Percentage { predicate: Predicate },
}

/// One configured summary line
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SummarySpec {
    pub label: String,
    pub aggregate: Aggregate,
    /// Display the value as a currency amount
    #[serde(default)]
    pub currency: bool,
}

impl SummarySpec {
    pub fn new(label: impl Into<String>, aggregate: Aggregate) -> Self {
        Self {
            label: label.into(),
            aggregate,
            currency: false,
        }
    }

    pub fn count(label: impl Into<String>) -> Self {
        Self::new(label, Aggregate::Count)
    }

    pub fn count_where(label: impl Into<String>, predicate: Predicate) -> Self {
        Self::new(label, Aggregate::CountWhere { predicate })
    }

    /// Display as currency
    pub fn as_currency(mut self) -> Self {
        self.currency = true;
        self
    }
}

/// A computed summary line
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SummaryEntry {
    pub label: String,
    pub value: f64,
    pub display: String,
}

/// Ordered label to aggregate mapping
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct SummaryBlock {
    entries: Vec<SummaryEntry>,
}

impl SummaryBlock {
    /// Compute every spec over the given records
    ///
    /// An empty record set yields zero for every entry.
    pub fn compute(
        specs: &[SummarySpec],
        records: &[&JsonValue],
        currency_symbol: &str,
        reference: Option<NaiveDateTime>,
    ) -> Self {
        let entries = specs
            .iter()
            .map(|spec| {
                let value = evaluate(&spec.aggregate, records, reference);
                let display = match (&spec.aggregate, spec.currency) {
                    (Aggregate::Percentage { .. }, _) => format!("{:.1}%", value),
                    (_, true) => format_currency(value, currency_symbol),
                    (_, false) => format_number(value),
                };
                SummaryEntry {
                    label: spec.label.clone(),
                    value,
                    display,
                }
            })
            .collect();
        Self { entries }
    }

    /// Entries in configured order
    pub fn entries(&self) -> &[SummaryEntry] {
        &self.entries
    }

    /// Look up an entry by label
    pub fn get(&self, label: &str) -> Option<&SummaryEntry> {
        self.entries.iter().find(|e| e.label == label)
    }

    /// Numeric value of an entry by label
    pub fn value(&self, label: &str) -> Option<f64> {
        self.get(label).map(|e| e.value)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Single-line rendering, e.g. `Total: 25 | Active: 23`
    pub fn one_line(&self, separator: &str) -> String {
        self.entries
            .iter()
            .map(|e| format!("{}: {}", e.label, e.display))
            .collect::<Vec<_>>()
            .join(separator)
    }
}

fn evaluate(aggregate: &Aggregate, records: &[&JsonValue], reference: Option<NaiveDateTime>) -> f64 {
    let numbers = |field: &str| -> Vec<f64> {
        records
            .iter()
            .filter_map(|r| lookup_path(r, field))
            .filter_map(|v| Value::from_json(v).as_f64())
            .collect()
    };

    match aggregate {
        Aggregate::Count => records.len() as f64,
        Aggregate::CountWhere { predicate } => records
            .iter()
            .filter(|r| predicate.matches(r, reference))
            .count() as f64,
        Aggregate::Sum { field } => numbers(field).iter().sum(),
        Aggregate::Min { field } => numbers(field).into_iter().reduce(f64::min).unwrap_or(0.0),
        Aggregate::Max { field } => numbers(field).into_iter().reduce(f64::max).unwrap_or(0.0),
        Aggregate::Average { field } => {
            let values = numbers(field);
            if values.is_empty() {
                0.0
            } else {
                values.iter().sum::<f64>() / values.len() as f64
            }
        }
        Aggregate::Percentage { predicate } => {
            if records.is_empty() {
                return 0.0;
            }
            let hits = records
                .iter()
                .filter(|r| predicate.matches(r, reference))
                .count();
            hits as f64 * 100.0 / records.len() as f64
        }
    }
}
