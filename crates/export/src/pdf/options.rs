//! PDF export options

use layout_engine::PageSize;
use serde::{Deserialize, Serialize};

/// Page and typography settings for report documents
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PdfExportOptions {
    #[serde(default)]
    pub page_size: PageSize,
    /// Margin on every side, in points
    #[serde(default = "default_margin")]
    pub margin: f64,
    #[serde(default = "default_title_font_size")]
    pub title_font_size: f64,
    /// Cell text size; also drives the layout metric
    #[serde(default = "default_body_font_size")]
    pub body_font_size: f64,
    #[serde(default = "default_header_font_size")]
    pub header_font_size: f64,
    #[serde(default = "default_footer_font_size")]
    pub footer_font_size: f64,
    /// Flate-compress content streams
    #[serde(default = "default_true")]
    pub compress: bool,
}

fn default_margin() -> f64 {
    40.0
}

fn default_title_font_size() -> f64 {
    18.0
}

fn default_body_font_size() -> f64 {
    8.0
}

fn default_header_font_size() -> f64 {
    8.5
}

fn default_footer_font_size() -> f64 {
    7.5
}

fn default_true() -> bool {
    true
}

impl Default for PdfExportOptions {
    fn default() -> Self {
        Self {
            page_size: PageSize::default(),
            margin: default_margin(),
            title_font_size: default_title_font_size(),
            body_font_size: default_body_font_size(),
            header_font_size: default_header_font_size(),
            footer_font_size: default_footer_font_size(),
            compress: true,
        }
    }
}

impl PdfExportOptions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_page_size(mut self, page_size: PageSize) -> Self {
        self.page_size = page_size;
        self
    }

    pub fn with_margin(mut self, margin: f64) -> Self {
        self.margin = margin;
        self
    }

    pub fn with_body_font_size(mut self, size: f64) -> Self {
        self.body_font_size = size;
        self
    }

    pub fn with_compression(mut self, compress: bool) -> Self {
        self.compress = compress;
        self
    }
}
