//! Report documents: header band, summary block, paginated table, footers
//!
//! Pages are composed in two passes. The first pass draws every page from
//! the table layout; only then is the page total known, and the second pass
//! appends the "Page N of T" footers before anything is serialized.

use super::document::DocumentInfo;
use super::fonts::{FontRegistry, StandardFont};
use super::options::PdfExportOptions;
use super::renderer::{LineRenderInfo, PageRenderInfo, PdfRenderItem, RectRenderInfo, RgbColor, TextRenderInfo};
use super::writer::{PdfDocumentWriter, Result};
use crate::meta::ReportMeta;
use layout_engine::{ContentBox, LaidOutRow, LayoutConfig, Rect, TableLayout, TextMetrics};
use report_model::SummaryBlock;

const BAND_HEIGHT: f64 = 72.0;
const SUMMARY_TOP_GAP: f64 = 14.0;
const SUMMARY_HEADING_HEIGHT: f64 = 16.0;
const SUMMARY_LINE_HEIGHT: f64 = 13.0;
const SUMMARY_BOTTOM_GAP: f64 = 12.0;
const HEADER_ROW_PADDING: f64 = 5.0;
const FOOTER_HEIGHT: f64 = 40.0;
const CELL_PADDING: f64 = 4.0;
const ROW_PADDING: f64 = 3.0;

fn band_color() -> RgbColor {
    RgbColor::from_u8(30, 64, 175)
}

fn header_color() -> RgbColor {
    RgbColor::from_u8(59, 130, 246)
}

fn stripe_color() -> RgbColor {
    RgbColor::from_u8(248, 250, 252)
}

fn rule_color() -> RgbColor {
    RgbColor::from_u8(226, 232, 240)
}

fn text_color() -> RgbColor {
    RgbColor::from_u8(31, 41, 55)
}

fn muted_color() -> RgbColor {
    RgbColor::from_u8(107, 114, 128)
}

/// Draws report documents from a table layout
#[derive(Debug, Clone, Default)]
pub struct PdfReportRenderer {
    options: PdfExportOptions,
}

impl PdfReportRenderer {
    pub fn new(options: PdfExportOptions) -> Self {
        Self { options }
    }

    pub fn options(&self) -> &PdfExportOptions {
        &self.options
    }

    /// Layout parameters matching this renderer's page geometry
    ///
    /// The first page loses the header band and summary block; every page
    /// loses the top margin and the footer zone.
    pub fn layout_config(&self, summary: &SummaryBlock) -> LayoutConfig {
        let (width, height) = self.options.page_size.dimensions();
        let margin = self.options.margin;
        let first_table_top = BAND_HEIGHT + summary_height(summary);

        let content_box = ContentBox::new(width, height - margin - FOOTER_HEIGHT, self.header_row_height())
            .with_margin(margin)
            .with_first_page_reserved((first_table_top - margin).max(0.0));

        LayoutConfig::new(content_box, TextMetrics::courier(self.options.body_font_size))
            .with_cell_padding(CELL_PADDING)
            .with_row_padding(ROW_PADDING)
    }

    /// Render the complete document
    pub fn render(&self, layout: &TableLayout, summary: &SummaryBlock, meta: &ReportMeta) -> Result<Vec<u8>> {
        let pages = self.compose(layout, summary, meta);

        let mut info = DocumentInfo::new();
        info.title = Some(meta.title.clone());
        info.subject = meta.subtitle.clone();
        if !meta.author.is_empty() {
            info.author = Some(meta.author.clone());
        }
        info.creation_date = Some(meta.generated_at);

        PdfDocumentWriter::new(info)
            .with_compression(self.options.compress)
            .write_to_bytes(&pages, &FontRegistry::with_report_fonts())
    }

    /// Build every page's display list, footers included
    pub fn compose(&self, layout: &TableLayout, summary: &SummaryBlock, meta: &ReportMeta) -> Vec<PageRenderInfo> {
        let config = self.layout_config(summary);
        let (width, height) = self.options.page_size.dimensions();

        let mut pages: Vec<PageRenderInfo> = layout
            .pages
            .iter()
            .map(|page| {
                let mut info = PageRenderInfo::new(width, height);
                let table_top = if page.page_index == 0 {
                    self.draw_band(&mut info, meta);
                    self.draw_summary(&mut info, summary);
                    config.content_box.margin + config.content_box.first_page_reserved
                } else {
                    config.content_box.margin
                };

                self.draw_header_row(&mut info, layout, table_top);
                let rows_top = table_top + config.content_box.header_height;
                for row in &page.rows {
                    self.draw_row(&mut info, layout, row, rows_top, &config);
                }
                if page.page_index == 0 && page.rows.is_empty() {
                    info.add_item(PdfRenderItem::Text(TextRenderInfo::new(
                        "No records to display",
                        config.content_box.margin + CELL_PADDING,
                        rows_top + 14.0,
                        StandardFont::Helvetica,
                        self.options.body_font_size,
                        muted_color(),
                    )));
                }
                info
            })
            .collect();

        let total = pages.len();
        for (index, page) in pages.iter_mut().enumerate() {
            self.draw_footer(page, index + 1, total, meta);
        }

        tracing::debug!("Composed {} PDF page(s) for '{}'", total, meta.title);
        pages
    }

    fn header_row_height(&self) -> f64 {
        self.options.header_font_size + 2.0 * HEADER_ROW_PADDING
    }

    fn draw_band(&self, page: &mut PageRenderInfo, meta: &ReportMeta) {
        let margin = self.options.margin;
        page.add_item(PdfRenderItem::Rectangle(RectRenderInfo::filled(
            Rect::new(0.0, 0.0, page.width, BAND_HEIGHT),
            band_color(),
        )));
        page.add_item(PdfRenderItem::Text(TextRenderInfo::new(
            meta.title.to_uppercase(),
            margin,
            30.0,
            StandardFont::HelveticaBold,
            self.options.title_font_size,
            RgbColor::white(),
        )));
        page.add_item(PdfRenderItem::Text(TextRenderInfo::new(
            meta.generated_line(),
            margin,
            48.0,
            StandardFont::Helvetica,
            9.0,
            RgbColor::white(),
        )));
        if let Some(subtitle) = &meta.subtitle {
            page.add_item(PdfRenderItem::Text(TextRenderInfo::new(
                subtitle.clone(),
                margin,
                62.0,
                StandardFont::Helvetica,
                9.0,
                RgbColor::from_u8(219, 234, 254),
            )));
        }
    }

    fn draw_summary(&self, page: &mut PageRenderInfo, summary: &SummaryBlock) {
        if summary.is_empty() {
            return;
        }
        let margin = self.options.margin;
        let heading_baseline = BAND_HEIGHT + SUMMARY_TOP_GAP + 11.0;
        page.add_item(PdfRenderItem::Text(TextRenderInfo::new(
            "Summary",
            margin,
            heading_baseline,
            StandardFont::HelveticaBold,
            11.0,
            text_color(),
        )));

        for (i, entry) in summary.entries().iter().enumerate() {
            page.add_item(PdfRenderItem::Text(TextRenderInfo::new(
                format!("{}: {}", entry.label, entry.display),
                margin,
                BAND_HEIGHT + SUMMARY_TOP_GAP + SUMMARY_HEADING_HEIGHT + SUMMARY_LINE_HEIGHT * (i + 1) as f64 - 3.0,
                StandardFont::Helvetica,
                9.0,
                text_color(),
            )));
        }
    }

    fn draw_header_row(&self, page: &mut PageRenderInfo, layout: &TableLayout, top: f64) {
        let height = self.header_row_height();
        let (left, right) = table_bounds(layout);
        page.add_item(PdfRenderItem::Rectangle(RectRenderInfo::filled(
            Rect::new(left, top, right - left, height),
            header_color(),
        )));

        let baseline = top + height - HEADER_ROW_PADDING - 1.0;
        for (column, label) in layout.columns.iter().zip(&layout.header_labels) {
            page.add_item(PdfRenderItem::Text(
                TextRenderInfo::new(
                    label.clone(),
                    column.x + CELL_PADDING,
                    baseline,
                    StandardFont::HelveticaBold,
                    self.options.header_font_size,
                    RgbColor::white(),
                )
                .clipped_to(Rect::new(column.x, top, column.width, height)),
            ));
        }
    }

    fn draw_row(&self, page: &mut PageRenderInfo, layout: &TableLayout, row: &LaidOutRow, rows_top: f64, config: &LayoutConfig) {
        let top = rows_top + row.y;
        let (left, right) = table_bounds(layout);

        if row.row_index % 2 == 1 {
            page.add_item(PdfRenderItem::Rectangle(RectRenderInfo::filled(
                Rect::new(left, top, right - left, row.height),
                stripe_color(),
            )));
        }
        page.add_item(PdfRenderItem::Line(LineRenderInfo {
            x1: left,
            y1: top + row.height,
            x2: right,
            y2: top + row.height,
            color: rule_color(),
            width: 0.5,
        }));

        let line_height = config.metrics.line_height;
        for (column, lines) in layout.columns.iter().zip(&row.lines) {
            let clip = Rect::new(column.x, top, column.width, row.height);
            for (j, line) in lines.iter().enumerate() {
                if line.is_empty() {
                    continue;
                }
                let baseline = top + config.row_padding + j as f64 * line_height + line_height * 0.78;
                page.add_item(PdfRenderItem::Text(
                    TextRenderInfo::new(
                        line.clone(),
                        column.x + config.cell_padding,
                        baseline,
                        StandardFont::Courier,
                        config.metrics.font_size,
                        text_color(),
                    )
                    .clipped_to(clip),
                ));
            }
        }
    }

    fn draw_footer(&self, page: &mut PageRenderInfo, number: usize, total: usize, meta: &ReportMeta) {
        let margin = self.options.margin;
        let size = self.options.footer_font_size;
        let rule_y = page.height - FOOTER_HEIGHT + 8.0;
        let baseline = page.height - 20.0;

        page.add_item(PdfRenderItem::Line(LineRenderInfo {
            x1: margin,
            y1: rule_y,
            x2: page.width - margin,
            y2: rule_y,
            color: rule_color(),
            width: 0.5,
        }));
        page.add_item(PdfRenderItem::Text(TextRenderInfo::new(
            meta.caption(),
            margin,
            baseline,
            StandardFont::Helvetica,
            size,
            muted_color(),
        )));

        let label = format!("Page {} of {}", number, total);
        let label_width = StandardFont::Helvetica.estimate_width(&label, size);
        page.add_item(PdfRenderItem::Text(TextRenderInfo::new(
            label,
            page.width - margin - label_width,
            baseline,
            StandardFont::Helvetica,
            size,
            muted_color(),
        )));
    }
}

fn summary_height(summary: &SummaryBlock) -> f64 {
    if summary.is_empty() {
        SUMMARY_BOTTOM_GAP
    } else {
        SUMMARY_TOP_GAP + SUMMARY_HEADING_HEIGHT + SUMMARY_LINE_HEIGHT * summary.len() as f64 + SUMMARY_BOTTOM_GAP
    }
}

fn table_bounds(layout: &TableLayout) -> (f64, f64) {
    let left = layout.columns.first().map(|c| c.x).unwrap_or(0.0);
    let right = layout.columns.last().map(|c| c.right()).unwrap_or(left);
    (left, right)
}
