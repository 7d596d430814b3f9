//! Content stream builder
//!
//! Chainable writers for the operators used by report pages:
//! - `q`/`Q` graphics state, `w` line width
//! - `rg`/`RG` colors
//! - `m`, `l`, `re`, `f`, `S`, `W n` paths and clipping
//! - `BT`/`ET`, `Tf`, `Tm`, `Tj` text
//!
//! Operands are checked as they are written. A non-finite number is not
//! emitted; it is counted, and [`ContentStream::finish`] rejects the stream.

use super::fonts::encode_win_ansi;
use super::objects::{format_real, write_literal_string};
use super::writer::{PdfError, Result};

/// Content stream under construction
#[derive(Debug, Default)]
pub struct ContentStream {
    data: Vec<u8>,
    rejected: usize,
}

impl ContentStream {
    pub fn new() -> Self {
        Self::default()
    }

    /// Finished stream bytes, or an error if any operand was rejected
    pub fn finish(self) -> Result<Vec<u8>> {
        if self.rejected > 0 {
            return Err(PdfError::InvalidDocument(format!(
                "{} non-finite operand(s) in content stream",
                self.rejected
            )));
        }
        Ok(self.data)
    }

    pub fn len(&self) -> usize {
        self.data.len()
    }

    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    pub fn save_state(&mut self) -> &mut Self {
        self.op("q")
    }

    pub fn restore_state(&mut self) -> &mut Self {
        self.op("Q")
    }

    pub fn set_line_width(&mut self, width: f64) -> &mut Self {
        self.nums(&[width]).op("w")
    }

    pub fn set_fill_rgb(&mut self, r: f64, g: f64, b: f64) -> &mut Self {
        self.nums(&[r, g, b]).op("rg")
    }

    pub fn set_stroke_rgb(&mut self, r: f64, g: f64, b: f64) -> &mut Self {
        self.nums(&[r, g, b]).op("RG")
    }

    pub fn move_to(&mut self, x: f64, y: f64) -> &mut Self {
        self.nums(&[x, y]).op("m")
    }

    pub fn line_to(&mut self, x: f64, y: f64) -> &mut Self {
        self.nums(&[x, y]).op("l")
    }

    pub fn rect(&mut self, x: f64, y: f64, width: f64, height: f64) -> &mut Self {
        self.nums(&[x, y, width, height]).op("re")
    }

    pub fn fill(&mut self) -> &mut Self {
        self.op("f")
    }

    pub fn stroke(&mut self) -> &mut Self {
        self.op("S")
    }

    pub fn fill_and_stroke(&mut self) -> &mut Self {
        self.op("B")
    }

    /// Intersect the clip with the current path and discard it (`W n`)
    pub fn clip(&mut self) -> &mut Self {
        self.op("W").op("n")
    }

    pub fn begin_text(&mut self) -> &mut Self {
        self.op("BT")
    }

    pub fn end_text(&mut self) -> &mut Self {
        self.op("ET")
    }

    pub fn set_font(&mut self, resource_name: &str, size: f64) -> &mut Self {
        self.data.push(b'/');
        self.data.extend_from_slice(resource_name.as_bytes());
        self.data.push(b' ');
        self.nums(&[size]).op("Tf")
    }

    /// Place the text cursor at `(x, y)` with an identity matrix
    pub fn text_position(&mut self, x: f64, y: f64) -> &mut Self {
        self.nums(&[1.0, 0.0, 0.0, 1.0, x, y]).op("Tm")
    }

    /// Show text, encoded as WinAnsi
    pub fn show_text(&mut self, text: &str) -> &mut Self {
        write_literal_string(&encode_win_ansi(text), &mut self.data);
        self.op(" Tj")
    }

    fn nums(&mut self, values: &[f64]) -> &mut Self {
        for &value in values {
            if value.is_finite() {
                self.data.extend_from_slice(format_real(value).as_bytes());
            } else {
                self.rejected += 1;
                self.data.push(b'0');
            }
            self.data.push(b' ');
        }
        self
    }

    fn op(&mut self, operator: &str) -> &mut Self {
        self.data.extend_from_slice(operator.as_bytes());
        self.data.push(b'\n');
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn text_of(cs: ContentStream) -> String {
        String::from_utf8(cs.finish().unwrap()).unwrap()
    }

    #[test]
    fn test_filled_rectangle() {
        let mut cs = ContentStream::new();
        cs.save_state()
            .set_fill_rgb(1.0, 0.0, 0.0)
            .rect(100.0, 100.0, 200.0, 50.5)
            .fill()
            .restore_state();

        assert_eq!(text_of(cs), "q\n1 0 0 rg\n100 100 200 50.5 re\nf\nQ\n");
    }

    #[test]
    fn test_text_object() {
        let mut cs = ContentStream::new();
        cs.begin_text()
            .set_font("F1", 9.0)
            .text_position(40.0, 800.0)
            .show_text("Price (USD)")
            .end_text();

        let content = text_of(cs);
        assert!(content.contains("/F1 9 Tf"));
        assert!(content.contains("1 0 0 1 40 800 Tm"));
        assert!(content.contains("(Price \\(USD\\)) Tj"));
    }

    #[test]
    fn test_non_ascii_text_is_win_ansi() {
        let mut cs = ContentStream::new();
        cs.show_text("a • b 日");
        assert!(text_of(cs).contains("(a \\225 b ?) Tj"));
    }

    #[test]
    fn test_clip_path() {
        let mut cs = ContentStream::new();
        cs.rect(0.0, 0.0, 10.0, 10.0).clip();
        assert_eq!(text_of(cs), "0 0 10 10 re\nW\nn\n");
    }

    #[test]
    fn test_non_finite_operand_is_rejected() {
        let mut cs = ContentStream::new();
        cs.move_to(f64::NAN, 1.0).line_to(2.0, f64::INFINITY).stroke();
        match cs.finish() {
            Err(PdfError::InvalidDocument(msg)) => assert!(msg.starts_with("2 ")),
            other => panic!("expected rejection, got {:?}", other),
        }
    }
}
