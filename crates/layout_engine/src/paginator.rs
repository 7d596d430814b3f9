//! Table Pagination
//!
//! Flows measured rows onto pages of a fixed content box. The first page can
//! reserve extra height (header band, summary), every page keeps room for the
//! column header row, and a page is closed as soon as the next row would not
//! fit. A row taller than an empty page still gets a page of its own.
//!
//! Nothing here depends on iteration order of hashed collections or on
//! randomness, so the same input always produces the same page breaks.

use crate::columns::{distribute_columns, ColumnGeometry};
use crate::error::{LayoutOverflow, Result};
use crate::geometry::ContentBox;
use crate::line_breaker::{fit_cell_text, truncate_with_ellipsis};
use crate::metrics::TextMetrics;
use report_model::{ColumnSpec, Row, TruncationPolicy};
use serde::{Deserialize, Serialize};

/// Tolerance for floating point comparisons against page capacity
const EPSILON: f64 = 1e-9;

/// Parameters for a table layout
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LayoutConfig {
    pub content_box: ContentBox,
    /// Metrics of the cell font
    pub metrics: TextMetrics,
    /// Horizontal padding inside each cell, per side
    pub cell_padding: f64,
    /// Vertical padding inside each row, per side
    pub row_padding: f64,
}

impl LayoutConfig {
    pub fn new(content_box: ContentBox, metrics: TextMetrics) -> Self {
        Self {
            content_box,
            metrics,
            cell_padding: 4.0,
            row_padding: 3.0,
        }
    }

    pub fn with_cell_padding(mut self, padding: f64) -> Self {
        self.cell_padding = padding;
        self
    }

    pub fn with_row_padding(mut self, padding: f64) -> Self {
        self.row_padding = padding;
        self
    }
}

/// A row placed on a page
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LaidOutRow {
    /// Position of the row in the full row list
    pub row_index: usize,
    /// Wrapped lines, one entry per visible column
    pub lines: Vec<Vec<String>>,
    /// Offset from the top of the page's data area
    pub y: f64,
    pub height: f64,
}

impl LaidOutRow {
    /// Largest number of lines in any cell
    pub fn line_count(&self) -> usize {
        self.lines.iter().map(Vec::len).max().unwrap_or(1).max(1)
    }
}

/// Rows assigned to one page
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PageLayout {
    pub rows: Vec<LaidOutRow>,
    /// The column header row is repeated because the table continues from the previous page
    pub header_repeated: bool,
    pub page_index: usize,
}

impl PageLayout {
    fn new(page_index: usize) -> Self {
        Self {
            rows: Vec::new(),
            header_repeated: page_index > 0,
            page_index,
        }
    }

    /// Total height of the rows on this page
    pub fn used_height(&self) -> f64 {
        self.rows.iter().map(|r| r.height).sum()
    }

    pub fn row_count(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Row indices on this page, in order
    pub fn row_indices(&self) -> Vec<usize> {
        self.rows.iter().map(|r| r.row_index).collect()
    }
}

/// Result of laying out a table
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TableLayout {
    /// Visible columns with absolute positions
    pub columns: Vec<ColumnGeometry>,
    /// Header labels fitted to their columns, one per visible column
    pub header_labels: Vec<String>,
    pub pages: Vec<PageLayout>,
    /// Columns too narrow for a single glyph
    pub overflows: Vec<LayoutOverflow>,
}

impl TableLayout {
    pub fn page_count(&self) -> usize {
        self.pages.len()
    }

    /// Number of rows placed across all pages
    pub fn row_count(&self) -> usize {
        self.pages.iter().map(PageLayout::row_count).sum()
    }
}

/// Lays out rows for a fixed content box
#[derive(Debug, Clone)]
pub struct LayoutEngine {
    config: LayoutConfig,
}

impl LayoutEngine {
    pub fn new(config: LayoutConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &LayoutConfig {
        &self.config
    }

    /// Height of a row with the given number of lines
    pub fn row_height(&self, line_count: usize) -> f64 {
        line_count.max(1) as f64 * self.config.metrics.line_height + 2.0 * self.config.row_padding
    }

    /// Paginate every row
    ///
    /// Always yields at least one page; an empty row list gives one empty page.
    pub fn layout(&self, rows: &[Row], columns: &[ColumnSpec]) -> Result<TableLayout> {
        let mut table = self.prepare(columns, false)?;
        let content_box = &self.config.content_box;

        let mut pages = Vec::new();
        let mut current = PageLayout::new(0);
        let mut used = 0.0;

        for (row_index, row) in rows.iter().enumerate() {
            let mut laid_out = self.measure_row(row_index, row, &table, false);

            let capacity = content_box.capacity(current.page_index);
            if used + laid_out.height > capacity + EPSILON && !current.is_empty() {
                let next_index = current.page_index + 1;
                pages.push(std::mem::replace(&mut current, PageLayout::new(next_index)));
                used = 0.0;
            }

            if current.is_empty() && laid_out.height > content_box.capacity(current.page_index) + EPSILON {
                tracing::debug!(
                    "Row {} ({:.1}pt) is taller than page {}, placing it alone",
                    row_index,
                    laid_out.height,
                    current.page_index
                );
            }

            laid_out.y = used;
            used += laid_out.height;
            current.rows.push(laid_out);
        }
        pages.push(current);

        tracing::debug!("Laid out {} rows on {} pages", rows.len(), pages.len());
        table.pages = pages;
        Ok(table)
    }

    /// Single page holding at most `row_cap` leading rows, each one line high
    ///
    /// Used for fixed-size output, where every cell is cut to one line with
    /// an ellipsis whatever its column's policy.
    pub fn layout_snapshot(&self, rows: &[Row], columns: &[ColumnSpec], row_cap: usize) -> Result<TableLayout> {
        let mut table = self.prepare(columns, true)?;

        let mut page = PageLayout::new(0);
        let mut used = 0.0;
        for (row_index, row) in rows.iter().take(row_cap).enumerate() {
            let mut laid_out = self.measure_row(row_index, row, &table, true);
            laid_out.y = used;
            used += laid_out.height;
            page.rows.push(laid_out);
        }

        table.pages = vec![page];
        Ok(table)
    }

    /// Validate the box, place columns, and fit the header labels
    fn prepare(&self, columns: &[ColumnSpec], single_line: bool) -> Result<TableLayout> {
        let content_box = &self.config.content_box;
        content_box.validate()?;

        let mut geometry = distribute_columns(columns, content_box.margin, content_box.usable_width())?;
        if single_line {
            for column in &mut geometry {
                column.truncation = TruncationPolicy::Ellipsis;
            }
        }

        let mut overflows = Vec::new();
        let mut header_labels = Vec::with_capacity(geometry.len());
        for column in &geometry {
            let text_width = column.width - 2.0 * self.config.cell_padding;
            let max_chars = self.config.metrics.chars_that_fit(text_width);
            if max_chars == 0 {
                let overflow = LayoutOverflow {
                    column: column.key.clone(),
                    available_width: text_width.max(0.0),
                    char_width: self.config.metrics.char_width(),
                };
                tracing::warn!("{}; cell text will be clipped", overflow);
                overflows.push(overflow);
            }
            header_labels.push(truncate_with_ellipsis(&column.header_label, max_chars));
        }

        Ok(TableLayout {
            columns: geometry,
            header_labels,
            pages: Vec::new(),
            overflows,
        })
    }

    fn measure_row(&self, row_index: usize, row: &Row, table: &TableLayout, single_line: bool) -> LaidOutRow {
        let lines: Vec<Vec<String>> = table
            .columns
            .iter()
            .map(|column| {
                let text_width = column.width - 2.0 * self.config.cell_padding;
                let max_chars = self.config.metrics.chars_that_fit(text_width);
                let policy = if single_line {
                    TruncationPolicy::Ellipsis
                } else {
                    column.truncation
                };
                fit_cell_text(row.text(column.index), policy, max_chars)
            })
            .collect();

        let line_count = lines.iter().map(Vec::len).max().unwrap_or(1);
        LaidOutRow {
            row_index,
            lines,
            y: 0.0,
            height: self.row_height(line_count),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use report_model::Cell;

    fn columns() -> Vec<ColumnSpec> {
        vec![
            ColumnSpec::new("name", "Name", 2.0),
            ColumnSpec::new("city", "City", 1.0).with_truncation(TruncationPolicy::Ellipsis),
            ColumnSpec::new("notes", "Notes", 0.0),
        ]
    }

    fn row(name: &str, city: &str) -> Row {
        Row::new(vec![Cell::text(name), Cell::text(city), Cell::text("hidden")])
    }

    /// 10pt Courier, line height 12.5, padding 3 → one-line rows are 18.5pt
    fn engine(height: f64, reserved: f64) -> LayoutEngine {
        let content_box = ContentBox::new(340.0, height, 20.0)
            .with_margin(20.0)
            .with_first_page_reserved(reserved);
        LayoutEngine::new(LayoutConfig::new(content_box, TextMetrics::courier(10.0)))
    }

    #[test]
    fn test_empty_rows_give_one_page() {
        let layout = engine(200.0, 0.0).layout(&[], &columns()).unwrap();
        assert_eq!(layout.page_count(), 1);
        assert!(layout.pages[0].is_empty());
        assert!(!layout.pages[0].header_repeated);
    }

    #[test]
    fn test_hidden_column_not_laid_out() {
        let layout = engine(200.0, 0.0).layout(&[row("a", "b")], &columns()).unwrap();
        assert_eq!(layout.columns.len(), 2);
        assert_eq!(layout.header_labels, vec!["Name", "City"]);
        assert_eq!(layout.pages[0].rows[0].lines.len(), 2);
    }

    #[test]
    fn test_rows_split_across_pages() {
        // Capacity 200 - 20 = 180 → 9 rows of 18.5pt per page
        let rows: Vec<Row> = (0..20).map(|i| row(&format!("row {i}"), "x")).collect();
        let layout = engine(200.0, 0.0).layout(&rows, &columns()).unwrap();

        assert_eq!(layout.page_count(), 3);
        assert_eq!(layout.pages[0].row_count(), 9);
        assert_eq!(layout.pages[1].row_count(), 9);
        assert_eq!(layout.pages[2].row_count(), 2);
        assert!(!layout.pages[0].header_repeated);
        assert!(layout.pages[1].header_repeated);
        assert!(layout.pages[2].header_repeated);

        let order: Vec<usize> = layout.pages.iter().flat_map(|p| p.row_indices()).collect();
        assert_eq!(order, (0..20).collect::<Vec<_>>());
    }

    #[test]
    fn test_first_page_reserve() {
        // First page: 200 - 20 - 100 = 80 → 4 rows
        let rows: Vec<Row> = (0..6).map(|i| row(&format!("row {i}"), "x")).collect();
        let layout = engine(200.0, 100.0).layout(&rows, &columns()).unwrap();
        assert_eq!(layout.pages[0].row_count(), 4);
        assert_eq!(layout.pages[1].row_count(), 2);
    }

    #[test]
    fn test_wrapped_row_height() {
        // Name column is 200pt wide, 192pt of text → 32 chars per line
        let long = "word ".repeat(20);
        let layout = engine(400.0, 0.0).layout(&[row(&long, "x")], &columns()).unwrap();
        let laid_out = &layout.pages[0].rows[0];
        assert_eq!(laid_out.line_count(), 4);
        assert_eq!(laid_out.height, 4.0 * 12.5 + 6.0);
    }

    #[test]
    fn test_oversized_row_placed_alone() {
        let huge = "word ".repeat(200);
        let rows = vec![row("a", "x"), row(&huge, "x"), row("b", "x")];
        let layout = engine(200.0, 0.0).layout(&rows, &columns()).unwrap();

        assert_eq!(layout.page_count(), 3);
        assert_eq!(layout.pages[1].row_indices(), vec![1]);
        assert!(layout.pages[1].used_height() > 180.0);
        assert_eq!(layout.pages[2].row_indices(), vec![2]);
    }

    #[test]
    fn test_row_offsets() {
        let rows = vec![row("a", "x"), row("b", "x")];
        let layout = engine(200.0, 0.0).layout(&rows, &columns()).unwrap();
        assert_eq!(layout.pages[0].rows[0].y, 0.0);
        assert_eq!(layout.pages[0].rows[1].y, 18.5);
    }

    #[test]
    fn test_narrow_column_reports_overflow() {
        let columns = vec![
            ColumnSpec::new("wide", "Wide", 100.0),
            ColumnSpec::new("tiny", "Tiny", 1.0),
        ];
        let rows = vec![Row::new(vec![Cell::text("ok"), Cell::text("long\ntext")])];
        let layout = engine(200.0, 0.0).layout(&rows, &columns).unwrap();

        assert_eq!(layout.overflows.len(), 1);
        assert_eq!(layout.overflows[0].column, "tiny");
        assert_eq!(layout.pages[0].rows[0].lines[1], vec!["long text"]);
        assert_eq!(layout.header_labels[1], "");
    }

    #[test]
    fn test_snapshot_caps_rows_and_forces_single_lines() {
        let long = "word ".repeat(20);
        let rows: Vec<Row> = (0..50).map(|_| row(&long, "x")).collect();
        let layout = engine(200.0, 0.0).layout_snapshot(&rows, &columns(), 20).unwrap();

        assert_eq!(layout.page_count(), 1);
        assert_eq!(layout.row_count(), 20);
        for laid_out in &layout.pages[0].rows {
            assert_eq!(laid_out.line_count(), 1);
            assert!(laid_out.lines[0][0].ends_with("..."));
        }
    }

    #[test]
    fn test_snapshot_with_fewer_rows_than_cap() {
        let rows = vec![row("a", "x"), row("b", "y")];
        let layout = engine(200.0, 0.0).layout_snapshot(&rows, &columns(), 20).unwrap();
        assert_eq!(layout.row_count(), 2);
    }

    #[test]
    fn test_invalid_box_is_an_error() {
        let rows = vec![row("a", "x")];
        assert!(engine(10.0, 0.0).layout(&rows, &columns()).is_err());
    }

    mod proptests {
        use super::*;
        use proptest::prelude::*;

        fn text_strategy() -> impl Strategy<Value = String> {
            "[a-z ]{0,60}|[a-z]{0,120}"
        }

        proptest! {
            #[test]
            fn pages_respect_capacity(
                texts in prop::collection::vec((text_strategy(), text_strategy()), 0..60),
                height in 60.0f64..600.0,
                reserved in 0.0f64..30.0,
            ) {
                let rows: Vec<Row> = texts.iter().map(|(a, b)| row(a, b)).collect();
                let engine = engine(height, reserved);
                let layout = engine.layout(&rows, &columns()).unwrap();
                let content_box = engine.config().content_box;

                for page in &layout.pages {
                    let capacity = content_box.capacity(page.page_index);
                    if page.row_count() > 1 {
                        prop_assert!(page.used_height() <= capacity + EPSILON);
                    }
                    prop_assert_eq!(page.header_repeated, page.page_index > 0);
                }

                let order: Vec<usize> = layout.pages.iter().flat_map(|p| p.row_indices()).collect();
                prop_assert_eq!(order, (0..rows.len()).collect::<Vec<_>>());
            }

            #[test]
            fn layout_is_deterministic(
                texts in prop::collection::vec((text_strategy(), text_strategy()), 0..40),
                height in 60.0f64..400.0,
            ) {
                let rows: Vec<Row> = texts.iter().map(|(a, b)| row(a, b)).collect();
                let first = engine(height, 10.0).layout(&rows, &columns()).unwrap();
                let second = engine(height, 10.0).layout(&rows, &columns()).unwrap();
                prop_assert_eq!(first, second);
            }
        }
    }
}
