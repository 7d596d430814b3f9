//! Single-image report snapshots
//!
//! A snapshot shows the first `row_cap` rows only. Its height is fixed by
//! the cap, so a shorter dataset leaves the unused part of the table region
//! as background and the footer stays in place.

use super::canvas::{Canvas, PixelRect};
use super::glyphs::GLYPH_SIZE;
use super::RasterError;
use crate::meta::ReportMeta;
use image::Rgba;
use layout_engine::{truncate_with_ellipsis, ContentBox, LayoutConfig, LayoutEngine, TableLayout, TextMetrics};
use report_model::SummaryBlock;

const BAND_HEIGHT: u32 = 100;
const CELL_PADDING: f64 = 8.0;
const ROW_PADDING: f64 = 6.0;
const SECTION_GAP: u32 = 14;

const BACKGROUND: Rgba<u8> = Rgba([255, 255, 255, 255]);
const BAND: Rgba<u8> = Rgba([30, 64, 175, 255]);
const BAND_SUBTITLE: Rgba<u8> = Rgba([219, 234, 254, 255]);
const HEADER: Rgba<u8> = Rgba([59, 130, 246, 255]);
const STRIPE: Rgba<u8> = Rgba([248, 250, 252, 255]);
const RULE: Rgba<u8> = Rgba([226, 232, 240, 255]);
const TEXT: Rgba<u8> = Rgba([31, 41, 55, 255]);
const MUTED: Rgba<u8> = Rgba([107, 114, 128, 255]);
const WHITE: Rgba<u8> = Rgba([255, 255, 255, 255]);

/// Snapshot options
///
/// There is deliberately no `Default`: every caller must choose a row cap.
#[derive(Debug, Clone, PartialEq)]
pub struct RasterOptions {
    /// Maximum number of data rows drawn
    pub row_cap: usize,
    /// Image width in pixels
    pub width: u32,
    /// Integer glyph scale; glyphs are `8 * scale` pixels
    pub scale: u32,
    /// Left and right margin in pixels
    pub padding: u32,
}

impl RasterOptions {
    pub fn new(row_cap: usize) -> Self {
        Self {
            row_cap,
            width: 1400,
            scale: 2,
            padding: 40,
        }
    }

    pub fn with_width(mut self, width: u32) -> Self {
        self.width = width;
        self
    }

    pub fn with_scale(mut self, scale: u32) -> Self {
        self.scale = scale.max(1);
        self
    }
}

/// Vertical placement of every snapshot section, in pixels
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SnapshotGeometry {
    pub width: u32,
    pub height: u32,
    pub band_height: u32,
    pub meta_y: i64,
    pub summary_y: i64,
    pub table_top: i64,
    pub header_height: u32,
    pub rows_top: i64,
    pub row_height: u32,
    pub footer_y: i64,
}

impl SnapshotGeometry {
    /// Top edge of data row `index`
    pub fn row_top(&self, index: usize) -> i64 {
        self.rows_top + index as i64 * self.row_height as i64
    }
}

/// An encoded snapshot
#[derive(Debug, Clone)]
pub struct SnapshotImage {
    pub png: Vec<u8>,
    pub width: u32,
    pub height: u32,
    pub rows_drawn: usize,
}

/// Draws one fixed-size PNG from a row-capped layout
#[derive(Debug, Clone)]
pub struct RasterSnapshotRenderer {
    options: RasterOptions,
}

impl RasterSnapshotRenderer {
    pub fn new(options: RasterOptions) -> Self {
        Self { options }
    }

    pub fn options(&self) -> &RasterOptions {
        &self.options
    }

    fn glyph_px(&self) -> u32 {
        GLYPH_SIZE * self.options.scale.max(1)
    }

    /// Layout parameters in pixel units, for [`LayoutEngine::layout_snapshot`]
    pub fn layout_config(&self) -> LayoutConfig {
        let glyph = self.glyph_px() as f64;
        let metrics = TextMetrics::new(glyph, 1.0, glyph + 4.0);
        let header_height = glyph + 2.0 * ROW_PADDING;
        let row_height = metrics.line_height + 2.0 * ROW_PADDING;
        let content_box = ContentBox::new(
            self.options.width as f64,
            header_height + row_height * self.options.row_cap.max(1) as f64,
            header_height,
        )
        .with_margin(self.options.padding as f64);

        LayoutConfig::new(content_box, metrics)
            .with_cell_padding(CELL_PADDING)
            .with_row_padding(ROW_PADDING)
    }

    pub fn geometry(&self) -> SnapshotGeometry {
        let config = self.layout_config();
        let glyph = self.glyph_px();
        let header_height = config.content_box.header_height.round() as u32;
        let row_height = LayoutEngine::new(config).row_height(1).round() as u32;

        let meta_y = (BAND_HEIGHT + SECTION_GAP) as i64;
        let summary_y = meta_y + (glyph + SECTION_GAP) as i64;
        let table_top = summary_y + (glyph + 2 * SECTION_GAP) as i64;
        let rows_top = table_top + header_height as i64;
        // Saturates for absurd caps; the canvas rejects the resulting height
        let rows_extent = (row_height as i64).saturating_mul(i64::try_from(self.options.row_cap).unwrap_or(i64::MAX));
        let footer_y = rows_top
            .saturating_add(rows_extent)
            .saturating_add(2 * SECTION_GAP as i64);
        let height = footer_y.saturating_add((glyph + 2 * SECTION_GAP) as i64);

        SnapshotGeometry {
            width: self.options.width,
            height: u32::try_from(height.max(1)).unwrap_or(u32::MAX),
            band_height: BAND_HEIGHT,
            meta_y,
            summary_y,
            table_top,
            header_height,
            rows_top,
            row_height,
            footer_y,
        }
    }

    /// Render and encode the snapshot
    pub fn render(&self, layout: &TableLayout, summary: &SummaryBlock, meta: &ReportMeta) -> Result<SnapshotImage, RasterError> {
        let (canvas, rows_drawn) = self.compose(layout, summary, meta)?;
        let png = canvas.encode_png()?;
        tracing::debug!(
            "Rendered {}x{} snapshot with {} row(s), {} bytes",
            canvas.width(),
            canvas.height(),
            rows_drawn,
            png.len()
        );
        Ok(SnapshotImage {
            png,
            width: canvas.width(),
            height: canvas.height(),
            rows_drawn,
        })
    }

    /// Draw the snapshot, returning the canvas and the number of data rows drawn
    pub fn compose(&self, layout: &TableLayout, summary: &SummaryBlock, meta: &ReportMeta) -> Result<(Canvas, usize), RasterError> {
        let geometry = self.geometry();
        let scale = self.options.scale.max(1);
        let glyph = self.glyph_px();
        let padding = self.options.padding as i64;
        let mut canvas = Canvas::new(geometry.width, geometry.height, BACKGROUND)?;
        let text_chars = (geometry.width.saturating_sub(2 * self.options.padding) / glyph) as usize;

        // Header band
        canvas.fill_rect(PixelRect::new(0, 0, geometry.width, BAND_HEIGHT), BAND);
        let title_scale = scale + 1;
        let title_chars = (geometry.width.saturating_sub(2 * self.options.padding) / (GLYPH_SIZE * title_scale)) as usize;
        canvas.draw_text(
            padding,
            22,
            &truncate_with_ellipsis(&meta.title.to_uppercase(), title_chars),
            title_scale,
            WHITE,
            None,
        );
        if let Some(subtitle) = &meta.subtitle {
            canvas.draw_text(
                padding,
                22 + (GLYPH_SIZE * title_scale + 12) as i64,
                &truncate_with_ellipsis(subtitle, text_chars),
                scale,
                BAND_SUBTITLE,
                None,
            );
        }

        // Metadata and summary
        canvas.draw_text(
            padding,
            geometry.meta_y,
            &truncate_with_ellipsis(&meta.generated_line(), text_chars),
            scale,
            MUTED,
            None,
        );
        canvas.draw_text(
            padding,
            geometry.summary_y,
            &truncate_with_ellipsis(&summary.one_line("  |  "), text_chars),
            scale,
            TEXT,
            None,
        );

        // Column header row
        let (left, right) = table_bounds(layout);
        let text_inset = ((geometry.header_height - glyph) / 2) as i64;
        canvas.fill_rect(
            PixelRect::new(left, geometry.table_top, (right - left).max(0) as u32, geometry.header_height),
            HEADER,
        );
        for (column, label) in layout.columns.iter().zip(&layout.header_labels) {
            let cell = column_rect(column.x, column.width, geometry.table_top, geometry.header_height);
            canvas.draw_text(
                cell.x + CELL_PADDING as i64,
                geometry.table_top + text_inset,
                label,
                scale,
                WHITE,
                Some(cell),
            );
        }

        // Data rows
        let rows = layout
            .pages
            .first()
            .map(|page| &page.rows[..page.rows.len().min(self.options.row_cap)])
            .unwrap_or(&[]);
        for (i, row) in rows.iter().enumerate() {
            let top = geometry.row_top(i);
            if row.row_index % 2 == 1 {
                canvas.fill_rect(
                    PixelRect::new(left, top, (right - left).max(0) as u32, geometry.row_height),
                    STRIPE,
                );
            }
            canvas.hline(left, top + geometry.row_height as i64 - 1, (right - left).max(0) as u32, RULE);

            let text_top = top + ((geometry.row_height - glyph) / 2) as i64;
            for (column, lines) in layout.columns.iter().zip(&row.lines) {
                let cell = column_rect(column.x, column.width, top, geometry.row_height);
                if let Some(line) = lines.first() {
                    canvas.draw_text(cell.x + CELL_PADDING as i64, text_top, line, scale, TEXT, Some(cell));
                }
            }
        }

        // Footer
        canvas.hline(padding, geometry.footer_y - SECTION_GAP as i64, geometry.width.saturating_sub(2 * self.options.padding), RULE);
        canvas.draw_text(
            padding,
            geometry.footer_y,
            &truncate_with_ellipsis(&meta.caption(), text_chars),
            scale,
            MUTED,
            None,
        );

        Ok((canvas, rows.len()))
    }
}

fn column_rect(x: f64, width: f64, top: i64, height: u32) -> PixelRect {
    let left = x.round() as i64;
    let right = (x + width).round() as i64;
    PixelRect::new(left, top, (right - left).max(0) as u32, height)
}

fn table_bounds(layout: &TableLayout) -> (i64, i64) {
    let left = layout.columns.first().map(|c| c.x).unwrap_or(0.0);
    let right = layout.columns.last().map(|c| c.right()).unwrap_or(left);
    (left.round() as i64, right.round() as i64)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{TimeZone, Utc};
    use report_model::{presets, ProjectorOptions, RecordProjector};
    use serde_json::json;

    fn snapshot(count: usize, row_cap: usize) -> (RasterSnapshotRenderer, TableLayout, Canvas, usize) {
        let definition = presets::properties();
        let records: Vec<_> = (0..count)
            .map(|i| json!({"id": i + 1, "name": format!("Listing {}", i + 1), "price": 1000, "is_available": true}))
            .collect();
        let projection = RecordProjector::new(&definition, ProjectorOptions::default()).project(&records);
        let renderer = RasterSnapshotRenderer::new(RasterOptions::new(row_cap));
        let layout = LayoutEngine::new(renderer.layout_config())
            .layout_snapshot(&projection.rows, &definition.columns, row_cap)
            .unwrap();
        let meta = ReportMeta::new(&definition, Utc.with_ymd_and_hms(2024, 3, 1, 0, 0, 0).unwrap(), projection.row_count());
        let (canvas, drawn) = renderer.compose(&layout, &projection.summary, &meta).unwrap();
        (renderer, layout, canvas, drawn)
    }

    #[test]
    fn test_height_is_fixed_by_row_cap() {
        let (renderer, _, full, _) = snapshot(30, 10);
        let (_, _, short, _) = snapshot(3, 10);
        assert_eq!(full.height(), short.height());
        assert_eq!(full.height(), renderer.geometry().height);
        assert_eq!(full.width(), 1400);
    }

    #[test]
    fn test_rows_are_capped() {
        let (renderer, layout, canvas, drawn) = snapshot(50, 20);
        assert_eq!(drawn, 20);
        assert_eq!(layout.row_count(), 20);
        assert!(layout.overflows.is_empty());

        let geometry = renderer.geometry();
        let sample_x = (geometry.width - 41) as u32;
        // Odd rows are shaded; row 19 is the last one drawn
        assert_eq!(canvas.pixel(sample_x, (geometry.row_top(19) + 2) as u32), Some(STRIPE));
        assert_eq!(canvas.pixel(sample_x, (geometry.row_top(18) + 2) as u32), Some(BACKGROUND));
        assert!(geometry.row_top(20) + 2 < geometry.footer_y - SECTION_GAP as i64);
        assert_eq!(canvas.pixel(sample_x, (geometry.row_top(20) + 2) as u32), Some(BACKGROUND));
    }

    #[test]
    fn test_short_dataset_leaves_background() {
        let (renderer, _, canvas, drawn) = snapshot(2, 20);
        assert_eq!(drawn, 2);
        let geometry = renderer.geometry();
        let sample_x = (geometry.width - 41) as u32;
        assert_eq!(canvas.pixel(sample_x, (geometry.row_top(1) + 2) as u32), Some(STRIPE));
        assert_eq!(canvas.pixel(sample_x, (geometry.row_top(3) + 2) as u32), Some(BACKGROUND));
    }

    #[test]
    fn test_header_band_and_column_header() {
        let (renderer, _, canvas, _) = snapshot(0, 5);
        let geometry = renderer.geometry();
        assert_eq!(canvas.pixel(2, 2), Some(BAND));
        assert_eq!(canvas.pixel(41, (geometry.table_top + 1) as u32), Some(HEADER));
    }

    #[test]
    fn test_huge_row_cap_is_rejected_not_overflowed() {
        let definition = presets::users();
        let renderer = RasterSnapshotRenderer::new(RasterOptions::new(usize::MAX));
        let geometry = renderer.geometry();
        assert_eq!(geometry.height, u32::MAX);
        assert!(geometry.footer_y > geometry.rows_top);

        let layout = LayoutEngine::new(renderer.layout_config())
            .layout_snapshot(&[], &definition.columns, usize::MAX)
            .unwrap();
        let meta = ReportMeta::new(&definition, Utc.with_ymd_and_hms(2024, 3, 1, 0, 0, 0).unwrap(), 0);
        let result = renderer.compose(&layout, &SummaryBlock::default(), &meta);
        assert!(matches!(result, Err(RasterError::InvalidCanvas(_))));
    }

    #[test]
    fn test_render_encodes_png() {
        let definition = presets::users();
        let renderer = RasterSnapshotRenderer::new(RasterOptions::new(5).with_width(800));
        let layout = LayoutEngine::new(renderer.layout_config())
            .layout_snapshot(&[], &definition.columns, 5)
            .unwrap();
        let meta = ReportMeta::new(&definition, Utc.with_ymd_and_hms(2024, 3, 1, 0, 0, 0).unwrap(), 0);
        let image = renderer.render(&layout, &SummaryBlock::default(), &meta).unwrap();

        assert_eq!(image.width, 800);
        assert_eq!(image.rows_drawn, 0);
        let decoded = image::load_from_memory_with_format(&image.png, image::ImageFormat::Png).unwrap();
        assert_eq!(decoded.height(), image.height);
    }
}
