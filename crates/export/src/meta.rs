//! Report metadata shared by every output format

use chrono::{DateTime, Utc};
use report_model::ReportDefinition;
use std::fmt::Write;

/// Title, authorship and generation time of one export
#[derive(Debug, Clone, PartialEq)]
pub struct ReportMeta {
    pub title: String,
    pub subtitle: Option<String>,
    pub author: String,
    pub generated_at: DateTime<Utc>,
    /// Plural noun for the footer caption, e.g. "Properties"
    pub entity_label: String,
    /// Rows in the export (after skipped records)
    pub record_count: usize,
    date_pattern: String,
    timestamp_pattern: String,
}

impl ReportMeta {
    pub fn new(definition: &ReportDefinition, generated_at: DateTime<Utc>, record_count: usize) -> Self {
        Self {
            title: definition.title.clone(),
            subtitle: definition.subtitle.clone(),
            author: String::new(),
            generated_at,
            entity_label: definition.entity_label.clone(),
            record_count,
            date_pattern: "%Y-%m-%d".to_string(),
            timestamp_pattern: "%Y-%m-%d %H:%M".to_string(),
        }
    }

    pub fn with_author(mut self, author: impl Into<String>) -> Self {
        self.author = author.into();
        self
    }

    /// chrono patterns for the date and the full timestamp
    pub fn with_patterns(mut self, date_pattern: impl Into<String>, timestamp_pattern: impl Into<String>) -> Self {
        self.date_pattern = date_pattern.into();
        self.timestamp_pattern = timestamp_pattern.into();
        self
    }

    /// Generation date, e.g. `2024-03-01`
    pub fn date(&self) -> String {
        format_or_iso(&self.generated_at, &self.date_pattern, "%Y-%m-%d")
    }

    /// Generation time, e.g. `2024-03-01 09:30`
    pub fn timestamp(&self) -> String {
        format_or_iso(&self.generated_at, &self.timestamp_pattern, "%Y-%m-%d %H:%M")
    }

    /// "Generated on {timestamp} by {author}", without the author part when unset
    pub fn generated_line(&self) -> String {
        if self.author.is_empty() {
            format!("Generated on {}", self.timestamp())
        } else {
            format!("Generated on {} by {}", self.timestamp(), self.author)
        }
    }

    /// Footer caption, e.g. "Total Properties: 25 • Generated 2024-03-01"
    pub fn caption(&self) -> String {
        format!(
            "Total {}: {} \u{2022} Generated {}",
            self.entity_label,
            self.record_count,
            self.date()
        )
    }
}

fn format_or_iso(value: &DateTime<Utc>, pattern: &str, fallback: &str) -> String {
    let mut out = String::new();
    if write!(out, "{}", value.format(pattern)).is_err() {
        tracing::warn!("Invalid date pattern '{}', using '{}'", pattern, fallback);
        return value.format(fallback).to_string();
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use report_model::presets;

    fn meta() -> ReportMeta {
        let at = Utc.with_ymd_and_hms(2024, 3, 1, 9, 30, 0).unwrap();
        ReportMeta::new(&presets::properties(), at, 25)
    }

    #[test]
    fn test_caption_and_generated_line() {
        let meta = meta().with_author("admin");
        assert_eq!(meta.caption(), "Total Properties: 25 \u{2022} Generated 2024-03-01");
        assert_eq!(meta.generated_line(), "Generated on 2024-03-01 09:30 by admin");
        assert_eq!(meta.title, "Properties Report");
    }

    #[test]
    fn test_missing_author() {
        assert_eq!(meta().generated_line(), "Generated on 2024-03-01 09:30");
    }

    #[test]
    fn test_custom_and_invalid_patterns() {
        let meta = meta().with_patterns("%d/%m/%Y", "%Q");
        assert_eq!(meta.date(), "01/03/2024");
        assert_eq!(meta.timestamp(), "2024-03-01 09:30");
    }
}
