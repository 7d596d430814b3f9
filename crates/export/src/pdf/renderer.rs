//! Page display lists and their conversion to content streams
//!
//! Items are positioned in layout coordinates (origin top-left, y down) and
//! drawn in list order, so backgrounds must be added before the text that
//! sits on them.

use super::content::ContentStream;
use super::fonts::{FontRegistry, StandardFont};
use super::writer::{PdfError, Result};
use layout_engine::Rect;

/// A color with components in 0.0..=1.0
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RgbColor {
    pub r: f64,
    pub g: f64,
    pub b: f64,
}

impl RgbColor {
    pub fn new(r: f64, g: f64, b: f64) -> Self {
        Self { r, g, b }
    }

    pub fn from_u8(r: u8, g: u8, b: u8) -> Self {
        Self {
            r: r as f64 / 255.0,
            g: g as f64 / 255.0,
            b: b as f64 / 255.0,
        }
    }

    pub fn black() -> Self {
        Self::new(0.0, 0.0, 0.0)
    }

    pub fn white() -> Self {
        Self::new(1.0, 1.0, 1.0)
    }
}

/// A run of text on one baseline
#[derive(Debug, Clone, PartialEq)]
pub struct TextRenderInfo {
    pub text: String,
    /// Left edge, in points from the page's left
    pub x: f64,
    /// Baseline, in points from the page's top
    pub y: f64,
    pub font: StandardFont,
    pub font_size: f64,
    pub color: RgbColor,
    /// Text outside this rectangle is not painted
    pub clip: Option<Rect>,
}

impl TextRenderInfo {
    pub fn new(text: impl Into<String>, x: f64, y: f64, font: StandardFont, font_size: f64, color: RgbColor) -> Self {
        Self {
            text: text.into(),
            x,
            y,
            font,
            font_size,
            color,
            clip: None,
        }
    }

    pub fn clipped_to(mut self, clip: Rect) -> Self {
        self.clip = Some(clip);
        self
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LineRenderInfo {
    pub x1: f64,
    pub y1: f64,
    pub x2: f64,
    pub y2: f64,
    pub color: RgbColor,
    pub width: f64,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RectRenderInfo {
    pub rect: Rect,
    pub fill: Option<RgbColor>,
    pub stroke: Option<RgbColor>,
    pub stroke_width: f64,
}

impl RectRenderInfo {
    pub fn filled(rect: Rect, color: RgbColor) -> Self {
        Self {
            rect,
            fill: Some(color),
            stroke: None,
            stroke_width: 0.0,
        }
    }
}

/// One drawing item
#[derive(Debug, Clone, PartialEq)]
pub enum PdfRenderItem {
    Text(TextRenderInfo),
    Line(LineRenderInfo),
    Rectangle(RectRenderInfo),
}

/// Everything drawn on one page
#[derive(Debug, Clone, PartialEq)]
pub struct PageRenderInfo {
    pub width: f64,
    pub height: f64,
    pub items: Vec<PdfRenderItem>,
}

impl PageRenderInfo {
    pub fn new(width: f64, height: f64) -> Self {
        Self {
            width,
            height,
            items: Vec::new(),
        }
    }

    pub fn add_item(&mut self, item: PdfRenderItem) {
        self.items.push(item);
    }

    /// Text of every text item, in drawing order
    pub fn texts(&self) -> impl Iterator<Item = &str> {
        self.items.iter().filter_map(|item| match item {
            PdfRenderItem::Text(text) => Some(text.text.as_str()),
            _ => None,
        })
    }
}

/// Converts page display lists into content stream bytes
pub struct PdfRenderer<'a> {
    fonts: &'a FontRegistry,
}

impl<'a> PdfRenderer<'a> {
    pub fn new(fonts: &'a FontRegistry) -> Self {
        Self { fonts }
    }

    /// Render one page
    ///
    /// Fails on text in an unregistered font or on any non-finite coordinate.
    pub fn render_page(&self, page: &PageRenderInfo) -> Result<Vec<u8>> {
        let mut content = ContentStream::new();
        for item in &page.items {
            match item {
                PdfRenderItem::Rectangle(rect) => render_rectangle(&mut content, rect, page.height),
                PdfRenderItem::Line(line) => render_line(&mut content, line, page.height),
                PdfRenderItem::Text(text) => self.render_text(&mut content, text, page.height)?,
            }
        }
        content.finish()
    }

    fn render_text(&self, content: &mut ContentStream, text: &TextRenderInfo, page_height: f64) -> Result<()> {
        let font_name = self.fonts.resource_name(text.font).ok_or_else(|| {
            PdfError::InvalidDocument(format!("Font {} is not registered", text.font.pdf_name()))
        })?;

        if let Some(clip) = text.clip {
            content
                .save_state()
                .rect(clip.x, page_height - clip.y - clip.height, clip.width, clip.height)
                .clip();
        }

        content
            .begin_text()
            .set_font(font_name, text.font_size)
            .set_fill_rgb(text.color.r, text.color.g, text.color.b)
            .text_position(text.x, page_height - text.y)
            .show_text(&text.text)
            .end_text();

        if text.clip.is_some() {
            content.restore_state();
        }
        Ok(())
    }
}

fn render_rectangle(content: &mut ContentStream, rect: &RectRenderInfo, page_height: f64) {
    if rect.fill.is_none() && rect.stroke.is_none() {
        return;
    }
    content.save_state();
    if let Some(fill) = rect.fill {
        content.set_fill_rgb(fill.r, fill.g, fill.b);
    }
    if let Some(stroke) = rect.stroke {
        content.set_stroke_rgb(stroke.r, stroke.g, stroke.b);
        content.set_line_width(rect.stroke_width);
    }

    let r = rect.rect;
    content.rect(r.x, page_height - r.y - r.height, r.width, r.height);
    match (rect.fill.is_some(), rect.stroke.is_some()) {
        (true, true) => content.fill_and_stroke(),
        (true, false) => content.fill(),
        _ => content.stroke(),
    };
    content.restore_state();
}

fn render_line(content: &mut ContentStream, line: &LineRenderInfo, page_height: f64) {
    content
        .save_state()
        .set_stroke_rgb(line.color.r, line.color.g, line.color.b)
        .set_line_width(line.width)
        .move_to(line.x1, page_height - line.y1)
        .line_to(line.x2, page_height - line.y2)
        .stroke()
        .restore_state();
}
