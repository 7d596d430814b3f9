//! Fixed-advance text metrics
//!
//! Every renderer draws cell text with a monospace face (Courier in PDF, an
//! 8x8 bitmap font in PNG), so one advance per grapheme is exact rather than
//! an estimate.

use serde::{Deserialize, Serialize};
use unicode_segmentation::UnicodeSegmentation;

/// Advance of Courier glyphs, in em
pub const COURIER_ADVANCE_EM: f64 = 0.6;

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TextMetrics {
    /// Font size in layout units
    pub font_size: f64,
    /// Glyph advance as a fraction of the font size
    pub advance_em: f64,
    /// Distance between baselines
    pub line_height: f64,
}

impl TextMetrics {
    pub fn new(font_size: f64, advance_em: f64, line_height: f64) -> Self {
        Self {
            font_size,
            advance_em,
            line_height,
        }
    }

    /// Courier at the given size with 1.25 line spacing
    pub fn courier(font_size: f64) -> Self {
        Self::new(font_size, COURIER_ADVANCE_EM, font_size * 1.25)
    }

    /// Width of one glyph
    pub fn char_width(&self) -> f64 {
        self.font_size * self.advance_em
    }

    /// Number of glyphs that fit in `width`
    pub fn chars_that_fit(&self, width: f64) -> usize {
        let char_width = self.char_width();
        if !(width > 0.0) || !(char_width > 0.0) {
            return 0;
        }
        (width / char_width + 1e-9).floor() as usize
    }

    /// Width of a string
    pub fn text_width(&self, text: &str) -> f64 {
        text.graphemes(true).count() as f64 * self.char_width()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_chars_that_fit() {
        let metrics = TextMetrics::courier(10.0);
        assert_eq!(metrics.char_width(), 6.0);
        assert_eq!(metrics.chars_that_fit(60.0), 10);
        assert_eq!(metrics.chars_that_fit(59.9), 9);
        assert_eq!(metrics.chars_that_fit(5.0), 0);
        assert_eq!(metrics.chars_that_fit(-3.0), 0);
        assert_eq!(metrics.chars_that_fit(f64::NAN), 0);
    }

    #[test]
    fn test_text_width_counts_graphemes() {
        let metrics = TextMetrics::courier(10.0);
        assert_eq!(metrics.text_width("abc"), 18.0);
        assert_eq!(metrics.text_width("e\u{301}"), 6.0);
    }
}
