//! Export - PDF, CSV, and PNG report rendering
//!
//! This crate renders projected report rows into the three downloadable
//! formats and coordinates export jobs: one job at a time per surface,
//! a file save on success and exactly one notification either way.
//!
//! # Example
//!
//! ```rust
//! use chrono::Utc;
//! use export::{render_csv, ExportSettings};
//! use report_model::presets;
//!
//! let records = vec![serde_json::json!({"id": 1, "name": "Loft", "price": 1500, "is_available": true})];
//! let report = render_csv(&presets::properties(), &records, &ExportSettings::default(), Utc::now()).unwrap();
//!
//! let text = String::from_utf8(report.bytes).unwrap();
//! assert!(text.starts_with("Properties Report\n"));
//! ```

mod api;
mod coordinator;
mod delimited;
mod error;
mod job;
mod meta;
mod settings;
mod sink;
pub mod pdf;
pub mod raster;

pub use api::*;
pub use coordinator::{ExportCoordinator, ExportOutcome};
pub use delimited::{parse_delimited, CsvOptions, DelimitedTextRenderer};
pub use error::*;
pub use job::{export_file_name, ExportFormat, ExportJob, JobReport, JobStatus};
pub use meta::ReportMeta;
pub use settings::*;
pub use sink::{DownloadSink, FsDownloadSink, LogNotifier, Notification, Notifier};

pub use pdf::{PdfExportOptions, PdfReportRenderer};
pub use raster::{RasterOptions, RasterSnapshotRenderer, SnapshotImage};
