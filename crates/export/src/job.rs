//! Export jobs and their lifecycle

use crate::error::{ExportError, Result};
use chrono::{DateTime, NaiveDate, Utc};
use report_model::SummaryBlock;
use serde::{Deserialize, Serialize};
use serde_json::Value as JsonValue;
use std::fmt;
use std::str::FromStr;
use uuid::Uuid;

/// Destination file format
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ExportFormat {
    Pdf,
    Csv,
    Png,
}

impl ExportFormat {
    pub const ALL: [ExportFormat; 3] = [ExportFormat::Pdf, ExportFormat::Csv, ExportFormat::Png];

    pub fn extension(&self) -> &'static str {
        match self {
            ExportFormat::Pdf => "pdf",
            ExportFormat::Csv => "csv",
            ExportFormat::Png => "png",
        }
    }

    /// Infix placed between the report name and the date
    pub fn file_suffix(&self) -> Option<&'static str> {
        match self {
            ExportFormat::Png => Some("snapshot"),
            ExportFormat::Pdf | ExportFormat::Csv => None,
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            ExportFormat::Pdf => "PDF",
            ExportFormat::Csv => "CSV",
            ExportFormat::Png => "PNG",
        }
    }
}

impl fmt::Display for ExportFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.extension())
    }
}

impl FromStr for ExportFormat {
    type Err = ExportError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "pdf" => Ok(ExportFormat::Pdf),
            "csv" => Ok(ExportFormat::Csv),
            "png" | "image" | "snapshot" => Ok(ExportFormat::Png),
            other => Err(ExportError::Config(format!("Unknown export format '{}'", other))),
        }
    }
}

/// `{report-name}-{suffix}-{YYYY-MM-DD}.{ext}`; formats without a suffix drop it
pub fn export_file_name(report_name: &str, format: ExportFormat, date: NaiveDate) -> String {
    let name = sanitize(report_name);
    let date = date.format("%Y-%m-%d");
    match format.file_suffix() {
        Some(suffix) => format!("{}-{}-{}.{}", name, suffix, date, format.extension()),
        None => format!("{}-{}.{}", name, date, format.extension()),
    }
}

/// Lower-case, with runs of anything but letters and digits collapsed to `-`
fn sanitize(name: &str) -> String {
    let mut out = String::with_capacity(name.len());
    for c in name.trim().chars() {
        if c.is_alphanumeric() {
            out.extend(c.to_lowercase());
        } else if !out.ends_with('-') && !out.is_empty() {
            out.push('-');
        }
    }
    let out = out.trim_end_matches('-').to_string();
    if out.is_empty() {
        "report".to_string()
    } else {
        out
    }
}

/// Job status; only ever moves forward
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum JobStatus {
    Idle,
    Running,
    Done,
    Error,
}

impl JobStatus {
    pub fn is_finished(&self) -> bool {
        matches!(self, JobStatus::Done | JobStatus::Error)
    }

    fn can_become(&self, next: JobStatus) -> bool {
        matches!(
            (self, next),
            (JobStatus::Idle, JobStatus::Running)
                | (JobStatus::Running, JobStatus::Done)
                | (JobStatus::Running, JobStatus::Error)
        )
    }
}

/// One export run
///
/// The job owns a snapshot of the input records, taken when it is created.
#[derive(Debug, Clone)]
pub struct ExportJob {
    pub id: Uuid,
    pub report_name: String,
    pub format: ExportFormat,
    records: Vec<JsonValue>,
    status: JobStatus,
    summary: Option<SummaryBlock>,
    file_name: Option<String>,
    error: Option<String>,
    created_at: DateTime<Utc>,
    finished_at: Option<DateTime<Utc>>,
}

impl ExportJob {
    pub fn new(report_name: impl Into<String>, format: ExportFormat, records: &[JsonValue], now: DateTime<Utc>) -> Self {
        Self {
            id: Uuid::new_v4(),
            report_name: report_name.into(),
            format,
            records: records.to_vec(),
            status: JobStatus::Idle,
            summary: None,
            file_name: None,
            error: None,
            created_at: now,
            finished_at: None,
        }
    }

    pub fn records(&self) -> &[JsonValue] {
        &self.records
    }

    pub fn status(&self) -> JobStatus {
        self.status
    }

    pub fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    pub fn file_name(&self) -> Option<&str> {
        self.file_name.as_deref()
    }

    pub fn error(&self) -> Option<&str> {
        self.error.as_deref()
    }

    pub fn summary(&self) -> Option<&SummaryBlock> {
        self.summary.as_ref()
    }

    pub fn set_summary(&mut self, summary: SummaryBlock) {
        self.summary = Some(summary);
    }

    /// Move to `next`; backward or skipping transitions are rejected and
    /// leave the status unchanged
    pub fn transition(&mut self, next: JobStatus) -> Result<()> {
        if !self.status.can_become(next) {
            return Err(ExportError::JobState(format!("{:?} -> {:?}", self.status, next)));
        }
        self.status = next;
        Ok(())
    }

    pub fn start(&mut self) -> Result<()> {
        self.transition(JobStatus::Running)
    }

    pub fn complete(&mut self, file_name: String, now: DateTime<Utc>) -> Result<()> {
        self.transition(JobStatus::Done)?;
        self.file_name = Some(file_name);
        self.finished_at = Some(now);
        Ok(())
    }

    pub fn fail(&mut self, message: String, now: DateTime<Utc>) -> Result<()> {
        self.transition(JobStatus::Error)?;
        self.error = Some(message);
        self.finished_at = Some(now);
        Ok(())
    }

    /// Outcome details without the record snapshot
    pub fn report(&self) -> JobReport {
        JobReport {
            id: self.id,
            report_name: self.report_name.clone(),
            format: self.format,
            status: self.status,
            row_count: None,
            file_name: self.file_name.clone(),
            error: self.error.clone(),
            finished_at: self.finished_at,
        }
    }
}

/// What remains observable about a job after it finishes
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct JobReport {
    pub id: Uuid,
    pub report_name: String,
    pub format: ExportFormat,
    pub status: JobStatus,
    /// Rows exported, when projection ran
    pub row_count: Option<usize>,
    pub file_name: Option<String>,
    pub error: Option<String>,
    pub finished_at: Option<DateTime<Utc>>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn date() -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 3, 1).unwrap()
    }

    #[test]
    fn test_file_names() {
        assert_eq!(export_file_name("properties-report", ExportFormat::Pdf, date()), "properties-report-2024-03-01.pdf");
        assert_eq!(export_file_name("properties-report", ExportFormat::Csv, date()), "properties-report-2024-03-01.csv");
        assert_eq!(
            export_file_name("properties-report", ExportFormat::Png, date()),
            "properties-report-snapshot-2024-03-01.png"
        );
        assert_eq!(export_file_name("  My Users / 2 ", ExportFormat::Csv, date()), "my-users-2-2024-03-01.csv");
        assert_eq!(export_file_name("***", ExportFormat::Pdf, date()), "report-2024-03-01.pdf");
    }

    #[test]
    fn test_format_parsing() {
        assert_eq!("PDF".parse::<ExportFormat>().unwrap(), ExportFormat::Pdf);
        assert_eq!("snapshot".parse::<ExportFormat>().unwrap(), ExportFormat::Png);
        assert!("xlsx".parse::<ExportFormat>().is_err());
    }

    #[test]
    fn test_status_moves_forward_only() {
        let mut job = ExportJob::new("r", ExportFormat::Csv, &[], Utc::now());
        assert_eq!(job.status(), JobStatus::Idle);

        assert!(job.transition(JobStatus::Done).is_err());
        assert_eq!(job.status(), JobStatus::Idle);

        job.start().unwrap();
        assert!(job.start().is_err());
        job.complete("r.csv".to_string(), Utc::now()).unwrap();
        assert_eq!(job.status(), JobStatus::Done);
        assert!(job.status().is_finished());

        assert!(job.transition(JobStatus::Running).is_err());
        assert!(job.fail("late".to_string(), Utc::now()).is_err());
        assert_eq!(job.status(), JobStatus::Done);
        assert_eq!(job.error(), None);
        assert_eq!(job.file_name(), Some("r.csv"));
    }

    #[test]
    fn test_records_are_a_snapshot() {
        let mut source = vec![json!({"id": 1})];
        let job = ExportJob::new("r", ExportFormat::Pdf, &source, Utc::now());
        source.push(json!({"id": 2}));
        source[0] = json!({"id": 99});

        assert_eq!(job.records(), &[json!({"id": 1})]);
    }

    #[test]
    fn test_report_serializes_camel_case() {
        let mut job = ExportJob::new("r", ExportFormat::Png, &[], Utc::now());
        job.start().unwrap();
        job.fail("boom".to_string(), Utc::now()).unwrap();

        let json = serde_json::to_value(job.report()).unwrap();
        assert_eq!(json["status"], "error");
        assert_eq!(json["format"], "png");
        assert_eq!(json["error"], "boom");
        assert!(json.get("fileName").is_some());
    }
}
