//! Export command implementation

use crate::args::{Args, FormatArg, PageSizeArg};
use anyhow::{bail, Context, Result};
use export::{
    ExportCoordinator, ExportFormat, ExportOutcome, ExportSettings, FsDownloadSink, LogNotifier,
    SettingsManager,
};
use layout_engine::PageSize;
use report_model::{presets, ReportDefinition};
use serde_json::Value as JsonValue;
use std::path::{Path, PathBuf};
use std::sync::Arc;

/// Run the requested exports and return the written file paths
pub async fn run(args: Args) -> Result<Vec<PathBuf>> {
    let definition = load_definition(&args)?;
    let records = load_records(&args.records)?;
    let settings = load_settings(&args).await?;
    let out_dir = settings.download.output_dir.clone();

    tracing::info!(
        "Exporting {} records as '{}' into {}",
        records.len(),
        definition.name,
        out_dir.display()
    );

    let coordinator = ExportCoordinator::new(
        definition,
        settings,
        Arc::new(FsDownloadSink::new(&out_dir)),
        Arc::new(LogNotifier),
    );

    let mut written = Vec::new();
    let mut failures = Vec::new();
    for format in formats(args.format) {
        match coordinator.export(format, &records).await {
            ExportOutcome::Completed(report) => {
                if let Some(name) = report.file_name {
                    written.push(out_dir.join(name));
                }
            }
            ExportOutcome::Failed(report) => {
                failures.push(format!(
                    "{}: {}",
                    format.label(),
                    report.error.unwrap_or_else(|| "unknown error".to_string())
                ));
            }
            ExportOutcome::Busy => failures.push(format!("{}: another export was running", format.label())),
        }
    }

    if !failures.is_empty() {
        bail!("{} export(s) failed:\n  {}", failures.len(), failures.join("\n  "));
    }
    Ok(written)
}

fn formats(arg: FormatArg) -> Vec<ExportFormat> {
    match arg {
        FormatArg::Pdf => vec![ExportFormat::Pdf],
        FormatArg::Csv => vec![ExportFormat::Csv],
        FormatArg::Png => vec![ExportFormat::Png],
        FormatArg::All => ExportFormat::ALL.to_vec(),
    }
}

fn load_definition(args: &Args) -> Result<ReportDefinition> {
    if let Some(entity) = &args.entity {
        return presets::by_name(entity).with_context(|| {
            format!(
                "Unknown entity '{}' (expected one of: {})",
                entity,
                presets::PRESET_NAMES.join(", ")
            )
        });
    }

    let path = args
        .report
        .as_ref()
        .context("Either --entity or --report is required")?;
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read report definition {}", path.display()))?;
    let definition: ReportDefinition = serde_json::from_str(&content)
        .with_context(|| format!("Invalid report definition {}", path.display()))?;
    definition
        .validate()
        .with_context(|| format!("Unusable report definition {}", path.display()))?;
    Ok(definition)
}

/// Records come either as a bare array or as a paginated API response
/// with the array under `results`
fn load_records(path: &Path) -> Result<Vec<JsonValue>> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read records {}", path.display()))?;
    let value: JsonValue = serde_json::from_str(&content)
        .with_context(|| format!("Records file {} is not valid JSON", path.display()))?;
    records_from(value).with_context(|| format!("No record array found in {}", path.display()))
}

fn records_from(value: JsonValue) -> Option<Vec<JsonValue>> {
    match value {
        JsonValue::Array(items) => Some(items),
        JsonValue::Object(mut map) => match map.remove("results") {
            Some(JsonValue::Array(items)) => Some(items),
            _ => None,
        },
        _ => None,
    }
}

async fn load_settings(args: &Args) -> Result<ExportSettings> {
    let mut settings = match &args.settings {
        Some(dir) => {
            let mut manager = SettingsManager::new(dir.clone());
            manager
                .load()
                .await
                .with_context(|| format!("Failed to load settings from {}", dir.display()))?
                .clone()
        }
        None => ExportSettings::default(),
    };

    if let Some(author) = &args.author {
        settings.author = author.clone();
    }
    if let Some(cap) = args.row_cap {
        settings.raster.row_cap = Some(cap);
    }
    if let Some(dir) = &args.out_dir {
        settings.download.output_dir = dir.clone();
    }
    if let Some(size) = args.page_size {
        settings.pdf.page_size = match size {
            PageSizeArg::Letter => PageSize::Letter,
            PageSizeArg::A4 => PageSize::A4,
        };
    }
    Ok(settings)
}
