//! Page and content box geometry

use crate::error::{LayoutError, Result};
use serde::{Deserialize, Serialize};

/// A rectangle in layout coordinates (origin top-left, y grows downward)
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct Rect {
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
}

impl Rect {
    pub fn new(x: f64, y: f64, width: f64, height: f64) -> Self {
        Self { x, y, width, height }
    }

    pub fn right(&self) -> f64 {
        self.x + self.width
    }

    pub fn bottom(&self) -> f64 {
        self.y + self.height
    }

    pub fn is_finite(&self) -> bool {
        self.x.is_finite() && self.y.is_finite() && self.width.is_finite() && self.height.is_finite()
    }
}

/// Standard page sizes
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum PageSize {
    /// US Letter (8.5" x 11")
    Letter,
    /// A4 (210mm x 297mm)
    A4,
    /// Custom size in points
    Custom { width: f64, height: f64 },
}

impl PageSize {
    /// Get the width and height in points
    pub fn dimensions(&self) -> (f64, f64) {
        match self {
            PageSize::Letter => (612.0, 792.0),
            PageSize::A4 => (595.276, 841.89),
            PageSize::Custom { width, height } => (*width, *height),
        }
    }
}

impl Default for PageSize {
    fn default() -> Self {
        PageSize::A4
    }
}

/// The vertical and horizontal space a table may occupy on each page
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ContentBox {
    /// Full width, side margins included
    pub width: f64,
    /// Height available to the table (header row included) on each page
    pub height: f64,
    /// Height of the column header row
    pub header_height: f64,
    /// Margin on each side of the table
    #[serde(default)]
    pub margin: f64,
    /// Extra height taken on the first page, e.g. by the header band and summary
    #[serde(default)]
    pub first_page_reserved: f64,
}

impl ContentBox {
    pub fn new(width: f64, height: f64, header_height: f64) -> Self {
        Self {
            width,
            height,
            header_height,
            margin: 0.0,
            first_page_reserved: 0.0,
        }
    }

    pub fn with_margin(mut self, margin: f64) -> Self {
        self.margin = margin;
        self
    }

    pub fn with_first_page_reserved(mut self, reserved: f64) -> Self {
        self.first_page_reserved = reserved;
        self
    }

    /// Width left for columns once margins are taken off
    pub fn usable_width(&self) -> f64 {
        self.width - 2.0 * self.margin
    }

    /// Height available to data rows on a page
    pub fn capacity(&self, page_index: usize) -> f64 {
        let base = self.height - self.header_height;
        if page_index == 0 {
            base - self.first_page_reserved
        } else {
            base
        }
    }

    /// Reject boxes that cannot hold any row at all
    pub fn validate(&self) -> Result<()> {
        let values = [
            self.width,
            self.height,
            self.header_height,
            self.margin,
            self.first_page_reserved,
        ];
        if values.iter().any(|v| !v.is_finite() || *v < 0.0) {
            return Err(LayoutError::InvalidContentBox(format!(
                "dimensions must be finite and non-negative: {:?}",
                self
            )));
        }
        if self.usable_width() <= 0.0 {
            return Err(LayoutError::InvalidContentBox(format!(
                "margins of {}pt leave no width in {}pt",
                self.margin, self.width
            )));
        }
        if self.capacity(0) <= 0.0 || self.capacity(1) <= 0.0 {
            return Err(LayoutError::InvalidContentBox(format!(
                "no vertical space for rows (first page {:.2}pt, later pages {:.2}pt)",
                self.capacity(0),
                self.capacity(1)
            )));
        }
        Ok(())
    }
}
