//! Export coordination
//!
//! One [`ExportCoordinator`] serves one UI surface. It runs at most one
//! export at a time: a trigger that arrives while a job is in flight is
//! ignored. Every job ends in exactly one notification, and the busy flag
//! is released on every exit path.

use crate::api;
use crate::error::Result;
use crate::job::{export_file_name, ExportFormat, ExportJob, JobReport};
use crate::settings::ExportSettings;
use crate::sink::{DownloadSink, Notification, Notifier};
use chrono::{DateTime, Utc};
use report_model::ReportDefinition;
use serde_json::Value as JsonValue;
use std::path::PathBuf;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Instant;
use tokio::sync::RwLock;

/// Result of one trigger
#[derive(Debug, Clone, PartialEq)]
pub enum ExportOutcome {
    Completed(JobReport),
    Failed(JobReport),
    /// Another export was running; nothing happened
    Busy,
}

impl ExportOutcome {
    pub fn is_completed(&self) -> bool {
        matches!(self, ExportOutcome::Completed(_))
    }

    pub fn report(&self) -> Option<&JobReport> {
        match self {
            ExportOutcome::Completed(report) | ExportOutcome::Failed(report) => Some(report),
            ExportOutcome::Busy => None,
        }
    }
}

/// Holds the busy flag; clears it when dropped
struct BusyGuard<'a> {
    flag: &'a AtomicBool,
}

impl<'a> BusyGuard<'a> {
    fn acquire(flag: &'a AtomicBool) -> Option<Self> {
        if flag.swap(true, Ordering::SeqCst) {
            None
        } else {
            Some(Self { flag })
        }
    }
}

impl Drop for BusyGuard<'_> {
    fn drop(&mut self) {
        self.flag.store(false, Ordering::SeqCst);
    }
}

struct Delivered {
    file_name: String,
    path: PathBuf,
    rows: usize,
}

/// Runs export jobs for one report definition
pub struct ExportCoordinator {
    definition: ReportDefinition,
    settings: ExportSettings,
    sink: Arc<dyn DownloadSink>,
    notifier: Arc<dyn Notifier>,
    busy: AtomicBool,
    last_job: RwLock<Option<(Instant, JobReport)>>,
    clock: fn() -> DateTime<Utc>,
}

impl ExportCoordinator {
    pub fn new(
        definition: ReportDefinition,
        settings: ExportSettings,
        sink: Arc<dyn DownloadSink>,
        notifier: Arc<dyn Notifier>,
    ) -> Self {
        Self {
            definition,
            settings,
            sink,
            notifier,
            busy: AtomicBool::new(false),
            last_job: RwLock::new(None),
            clock: Utc::now,
        }
    }

    /// Replace the wall clock used for timestamps and file names
    pub fn with_clock(mut self, clock: fn() -> DateTime<Utc>) -> Self {
        self.clock = clock;
        self
    }

    pub fn definition(&self) -> &ReportDefinition {
        &self.definition
    }

    pub fn settings(&self) -> &ExportSettings {
        &self.settings
    }

    /// Whether a job is in flight
    pub fn is_busy(&self) -> bool {
        self.busy.load(Ordering::SeqCst)
    }

    pub async fn export_pdf(&self, records: &[JsonValue]) -> ExportOutcome {
        self.export(ExportFormat::Pdf, records).await
    }

    pub async fn export_csv(&self, records: &[JsonValue]) -> ExportOutcome {
        self.export(ExportFormat::Csv, records).await
    }

    pub async fn export_png(&self, records: &[JsonValue]) -> ExportOutcome {
        self.export(ExportFormat::Png, records).await
    }

    /// Run one export job
    ///
    /// `records` is copied into the job before anything else happens, so the
    /// caller may change its collection while the export is in flight.
    pub async fn export(&self, format: ExportFormat, records: &[JsonValue]) -> ExportOutcome {
        let Some(_guard) = BusyGuard::acquire(&self.busy) else {
            tracing::debug!(
                "Ignoring {} export of '{}': another export is running",
                format.label(),
                self.definition.name
            );
            return ExportOutcome::Busy;
        };

        let mut job = ExportJob::new(self.definition.name.clone(), format, records, (self.clock)());
        tracing::info!(
            "Starting {} export {} of '{}' ({} records)",
            format.label(),
            job.id,
            job.report_name,
            job.records().len()
        );

        let result = self.run(&mut job).await;
        let finished_at = (self.clock)();

        let outcome = match result {
            Ok(delivered) => {
                if let Err(e) = job.complete(delivered.file_name.clone(), finished_at) {
                    tracing::warn!("Could not mark export {} done: {}", job.id, e);
                }
                tracing::info!("Finished {} export {} -> {}", format.label(), job.id, delivered.path.display());
                self.notifier.notify(Notification::Success {
                    title: format!("{} Export Complete", format.label()),
                    message: format!("Saved {} ({} rows)", delivered.file_name, delivered.rows),
                });

                let mut report = job.report();
                report.row_count = Some(delivered.rows);
                ExportOutcome::Completed(report)
            }
            Err(e) => {
                tracing::error!("{} export {} of '{}' failed: {}", format.label(), job.id, job.report_name, e);
                if let Err(state) = job.fail(e.to_string(), finished_at) {
                    tracing::warn!("Could not mark export {} failed: {}", job.id, state);
                }
                self.notifier.notify(Notification::Error {
                    title: "Export Failed".to_string(),
                    message: format!("Could not export {} as {}: {}", self.definition.title, format.label(), e),
                });

                ExportOutcome::Failed(job.report())
            }
        };

        if let Some(report) = outcome.report() {
            *self.last_job.write().await = Some((Instant::now(), report.clone()));
        }
        outcome
    }

    async fn run(&self, job: &mut ExportJob) -> Result<Delivered> {
        job.start()?;

        let generated_at = job.created_at();
        let rendered = api::render(job.format, &self.definition, job.records(), &self.settings, generated_at)?;
        job.set_summary(rendered.projection.summary.clone());

        let file_name = export_file_name(&self.definition.name, job.format, generated_at.date_naive());
        let path = self.sink.save(&file_name, rendered.bytes).await?;

        Ok(Delivered {
            file_name,
            path,
            rows: rendered.rows_rendered,
        })
    }

    /// The last finished job, while it is inside the post-completion window
    pub async fn last_job(&self) -> Option<JobReport> {
        let window = self.settings.post_completion_window();
        let mut last = self.last_job.write().await;
        if matches!(last.as_ref(), Some((finished, _)) if finished.elapsed() >= window) {
            *last = None;
        }
        last.as_ref().map(|(_, report)| report.clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ExportError;
    use crate::job::JobStatus;
    use async_trait::async_trait;
    use chrono::TimeZone;
    use report_model::presets;
    use serde_json::json;
    use std::sync::Mutex;
    use std::time::Duration;

    #[derive(Default)]
    struct MemorySink {
        files: Mutex<Vec<(String, Vec<u8>)>>,
        delay: Option<Duration>,
    }

    #[async_trait]
    impl DownloadSink for MemorySink {
        async fn save(&self, file_name: &str, bytes: Vec<u8>) -> Result<PathBuf> {
            if let Some(delay) = self.delay {
                tokio::time::sleep(delay).await;
            }
            self.files.lock().unwrap().push((file_name.to_string(), bytes));
            Ok(PathBuf::from(file_name))
        }
    }

    struct FailingSink;

    #[async_trait]
    impl DownloadSink for FailingSink {
        async fn save(&self, _file_name: &str, _bytes: Vec<u8>) -> Result<PathBuf> {
            Err(ExportError::Io(std::io::Error::new(std::io::ErrorKind::PermissionDenied, "read-only")))
        }
    }

    #[derive(Default)]
    struct RecordingNotifier {
        seen: Mutex<Vec<Notification>>,
    }

    impl RecordingNotifier {
        fn all(&self) -> Vec<Notification> {
            self.seen.lock().unwrap().clone()
        }
    }

    impl Notifier for RecordingNotifier {
        fn notify(&self, notification: Notification) {
            self.seen.lock().unwrap().push(notification);
        }
    }

    fn fixed_clock() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 3, 1, 9, 30, 0).unwrap()
    }

    fn records() -> Vec<JsonValue> {
        (1..=3)
            .map(|i| json!({"id": i, "name": format!("Home {}", i), "price": 100 * i, "is_available": i != 2}))
            .collect()
    }

    fn make_coordinator(
        settings: ExportSettings,
        sink: Arc<dyn DownloadSink>,
    ) -> (ExportCoordinator, Arc<RecordingNotifier>) {
        let notifier = Arc::new(RecordingNotifier::default());
        let coordinator = ExportCoordinator::new(presets::properties(), settings, sink, notifier.clone())
            .with_clock(fixed_clock);
        (coordinator, notifier)
    }

    #[tokio::test]
    async fn test_csv_export_saves_named_file() {
        let sink = Arc::new(MemorySink::default());
        let (coordinator, notifier) = make_coordinator(ExportSettings::default(), sink.clone());

        let outcome = coordinator.export_csv(&records()).await;

        assert!(outcome.is_completed());
        let report = outcome.report().unwrap();
        assert_eq!(report.status, JobStatus::Done);
        assert_eq!(report.file_name.as_deref(), Some("properties-report-2024-03-01.csv"));
        assert_eq!(report.row_count, Some(3));

        let files = sink.files.lock().unwrap();
        assert_eq!(files.len(), 1);
        assert_eq!(files[0].0, "properties-report-2024-03-01.csv");
        assert!(String::from_utf8_lossy(&files[0].1).contains("Active Properties,2"));

        let seen = notifier.all();
        assert_eq!(seen.len(), 1);
        assert_eq!(seen[0].title(), "CSV Export Complete");
        assert!(!coordinator.is_busy());
    }

    #[tokio::test]
    async fn test_png_file_name_has_snapshot_suffix() {
        let sink = Arc::new(MemorySink::default());
        let mut settings = ExportSettings::default();
        settings.raster.row_cap = Some(5);
        settings.raster.scale = 1;
        let (coordinator, _) = make_coordinator(settings, sink.clone());

        let outcome = coordinator.export_png(&records()).await;

        assert!(outcome.is_completed());
        assert_eq!(
            sink.files.lock().unwrap()[0].0,
            "properties-report-snapshot-2024-03-01.png"
        );
    }

    #[tokio::test]
    async fn test_sink_failure_reports_once_and_releases() {
        let (coordinator, notifier) = make_coordinator(ExportSettings::default(), Arc::new(FailingSink));

        let outcome = coordinator.export_pdf(&records()).await;

        match &outcome {
            ExportOutcome::Failed(report) => {
                assert_eq!(report.status, JobStatus::Error);
                assert!(report.error.as_deref().unwrap_or_default().contains("read-only"));
                assert_eq!(report.file_name, None);
            }
            other => panic!("expected failure, got {:?}", other),
        }

        let seen = notifier.all();
        assert_eq!(seen.len(), 1);
        assert!(seen[0].is_error());
        assert_eq!(seen[0].title(), "Export Failed");
        assert!(!coordinator.is_busy());

        // A later trigger runs normally
        let again = coordinator.export_pdf(&records()).await;
        assert!(matches!(again, ExportOutcome::Failed(_)));
        assert_eq!(notifier.all().len(), 2);
    }

    #[tokio::test]
    async fn test_missing_row_cap_fails_png_export() {
        let sink = Arc::new(MemorySink::default());
        let (coordinator, notifier) = make_coordinator(ExportSettings::default(), sink.clone());

        let outcome = coordinator.export_png(&records()).await;

        assert!(matches!(outcome, ExportOutcome::Failed(_)));
        assert!(sink.files.lock().unwrap().is_empty());
        assert_eq!(notifier.all().len(), 1);
    }

    #[tokio::test]
    async fn test_trigger_while_busy_is_ignored() {
        let sink = Arc::new(MemorySink {
            delay: Some(Duration::from_millis(200)),
            ..Default::default()
        });
        let (coordinator, notifier) = make_coordinator(ExportSettings::default(), sink.clone());
        let data = records();

        let (first, second) = tokio::join!(coordinator.export_csv(&data), async {
            tokio::time::sleep(Duration::from_millis(20)).await;
            assert!(coordinator.is_busy());
            coordinator.export_pdf(&data).await
        });

        assert!(first.is_completed());
        assert_eq!(second, ExportOutcome::Busy);
        assert_eq!(sink.files.lock().unwrap().len(), 1);
        assert_eq!(notifier.all().len(), 1);
        assert!(!coordinator.is_busy());
    }

    #[tokio::test]
    async fn test_last_job_window() {
        let sink = Arc::new(MemorySink::default());
        let mut settings = ExportSettings::default();
        settings.post_completion_window_ms = 60_000;
        let (coordinator, _) = make_coordinator(settings, sink.clone());

        assert!(coordinator.last_job().await.is_none());
        coordinator.export_csv(&records()).await;
        let last = coordinator.last_job().await.unwrap();
        assert_eq!(last.format, ExportFormat::Csv);
        assert_eq!(last.status, JobStatus::Done);

        let mut settings = ExportSettings::default();
        settings.post_completion_window_ms = 0;
        let (expired, _) = make_coordinator(settings, sink);
        expired.export_csv(&records()).await;
        assert!(expired.last_job().await.is_none());
    }

    #[tokio::test]
    async fn test_busy_outcome_keeps_previous_last_job() {
        let sink = Arc::new(MemorySink::default());
        let (coordinator, _) = make_coordinator(ExportSettings::default(), sink);

        coordinator.export_csv(&records()).await;
        let first = coordinator.last_job().await.unwrap();

        let _guard = BusyGuard::acquire(&coordinator.busy).unwrap();
        assert_eq!(coordinator.export_pdf(&records()).await, ExportOutcome::Busy);
        assert_eq!(coordinator.last_job().await.unwrap().id, first.id);
    }
}
