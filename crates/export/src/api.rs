//! Report Rendering Public API
//!
//! Each function runs one full export in memory: records are projected
//! through the definition, laid out when the format has physical pages,
//! and handed to the matching renderer. Nothing touches the filesystem here.

use crate::delimited::DelimitedTextRenderer;
use crate::error::Result;
use crate::job::ExportFormat;
use crate::meta::ReportMeta;
use crate::pdf::PdfReportRenderer;
use crate::raster::RasterSnapshotRenderer;
use crate::settings::ExportSettings;
use chrono::{DateTime, Utc};
use layout_engine::LayoutEngine;
use report_model::{Projection, ProjectorOptions, RecordProjector, ReportDefinition};
use serde_json::Value as JsonValue;

/// Bytes of one rendered report plus what went into them
#[derive(Debug, Clone)]
pub struct RenderedReport {
    pub format: ExportFormat,
    pub bytes: Vec<u8>,
    pub projection: Projection,
    /// Document pages; always 1 for CSV and PNG
    pub page_count: usize,
    /// Data rows present in the output
    pub rows_rendered: usize,
}

/// Project records and build the shared report metadata
///
/// # Example
///
/// ```rust
/// use chrono::Utc;
/// use export::{project, ExportSettings};
/// use report_model::presets;
///
/// let definition = presets::users();
/// let (projection, meta) = project(&definition, &[], &ExportSettings::default(), Utc::now()).unwrap();
///
/// assert_eq!(projection.row_count(), 0);
/// assert_eq!(meta.record_count, 0);
/// ```
pub fn project(
    definition: &ReportDefinition,
    records: &[JsonValue],
    settings: &ExportSettings,
    generated_at: DateTime<Utc>,
) -> Result<(Projection, ReportMeta)> {
    definition.validate()?;

    let options = ProjectorOptions {
        format: settings.formatting.format.clone(),
        reference_time: Some(generated_at.naive_utc()),
    };
    let projection = RecordProjector::new(definition, options).project(records);

    let meta = ReportMeta::new(definition, generated_at, projection.row_count())
        .with_author(settings.author.clone())
        .with_patterns(
            settings.formatting.format.date_pattern.clone(),
            settings.formatting.timestamp_pattern.clone(),
        );

    Ok((projection, meta))
}

/// Render a paginated PDF document
pub fn render_pdf(
    definition: &ReportDefinition,
    records: &[JsonValue],
    settings: &ExportSettings,
    generated_at: DateTime<Utc>,
) -> Result<RenderedReport> {
    let (projection, meta) = project(definition, records, settings, generated_at)?;

    let renderer = PdfReportRenderer::new(settings.pdf.clone());
    let engine = LayoutEngine::new(renderer.layout_config(&projection.summary));
    let layout = engine.layout(&projection.rows, &definition.columns)?;
    let bytes = renderer.render(&layout, &projection.summary, &meta)?;

    Ok(RenderedReport {
        format: ExportFormat::Pdf,
        bytes,
        page_count: layout.page_count().max(1),
        rows_rendered: layout.row_count(),
        projection,
    })
}

/// Render the delimited text export
///
/// No layout pass: every row and every column goes out, hidden ones included.
pub fn render_csv(
    definition: &ReportDefinition,
    records: &[JsonValue],
    settings: &ExportSettings,
    generated_at: DateTime<Utc>,
) -> Result<RenderedReport> {
    let (projection, meta) = project(definition, records, settings, generated_at)?;

    let text = DelimitedTextRenderer::new(settings.csv.clone()).render(&definition.columns, &projection, &meta)?;

    Ok(RenderedReport {
        format: ExportFormat::Csv,
        bytes: text.into_bytes(),
        page_count: 1,
        rows_rendered: projection.row_count(),
        projection,
    })
}

/// Render the fixed-size PNG snapshot of the first rows
///
/// Fails with a configuration error when `raster.rowCap` is not set.
pub fn render_png(
    definition: &ReportDefinition,
    records: &[JsonValue],
    settings: &ExportSettings,
    generated_at: DateTime<Utc>,
) -> Result<RenderedReport> {
    let options = settings.raster.to_options()?;
    let (projection, meta) = project(definition, records, settings, generated_at)?;

    let row_cap = options.row_cap;
    let renderer = RasterSnapshotRenderer::new(options);
    let engine = LayoutEngine::new(renderer.layout_config());
    let layout = engine.layout_snapshot(&projection.rows, &definition.columns, row_cap)?;
    let image = renderer.render(&layout, &projection.summary, &meta)?;

    Ok(RenderedReport {
        format: ExportFormat::Png,
        bytes: image.png,
        page_count: 1,
        rows_rendered: image.rows_drawn,
        projection,
    })
}

/// Render any format
pub fn render(
    format: ExportFormat,
    definition: &ReportDefinition,
    records: &[JsonValue],
    settings: &ExportSettings,
    generated_at: DateTime<Utc>,
) -> Result<RenderedReport> {
    match format {
        ExportFormat::Pdf => render_pdf(definition, records, settings, generated_at),
        ExportFormat::Csv => render_csv(definition, records, settings, generated_at),
        ExportFormat::Png => render_png(definition, records, settings, generated_at),
    }
}
