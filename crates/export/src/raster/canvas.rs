//! RGBA drawing surface backed by `image`

use super::glyphs::{glyph, GLYPH_SIZE};
use super::RasterError;
use image::{ImageFormat, Rgba, RgbaImage};
use std::io::Cursor;
use unicode_normalization::UnicodeNormalization;
use unicode_segmentation::UnicodeSegmentation;

/// Largest accepted side, in pixels
pub const MAX_DIMENSION: u32 = 16_384;

/// An axis-aligned pixel rectangle; may extend past the canvas
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PixelRect {
    pub x: i64,
    pub y: i64,
    pub width: u32,
    pub height: u32,
}

impl PixelRect {
    pub fn new(x: i64, y: i64, width: u32, height: u32) -> Self {
        Self { x, y, width, height }
    }

    pub fn contains(&self, x: i64, y: i64) -> bool {
        x >= self.x && y >= self.y && x < self.x + self.width as i64 && y < self.y + self.height as i64
    }
}

pub struct Canvas {
    image: RgbaImage,
}

impl Canvas {
    /// A canvas filled with `background`
    pub fn new(width: u32, height: u32, background: Rgba<u8>) -> Result<Self, RasterError> {
        if width == 0 || height == 0 || width > MAX_DIMENSION || height > MAX_DIMENSION {
            return Err(RasterError::InvalidCanvas(format!(
                "{}x{} is outside 1..={} pixels per side",
                width, height, MAX_DIMENSION
            )));
        }
        Ok(Self {
            image: RgbaImage::from_pixel(width, height, background),
        })
    }

    pub fn width(&self) -> u32 {
        self.image.width()
    }

    pub fn height(&self) -> u32 {
        self.image.height()
    }

    pub fn pixel(&self, x: u32, y: u32) -> Option<Rgba<u8>> {
        self.image.get_pixel_checked(x, y).copied()
    }

    /// Fill a rectangle, clipped to the canvas
    pub fn fill_rect(&mut self, rect: PixelRect, color: Rgba<u8>) {
        let x0 = rect.x.max(0);
        let y0 = rect.y.max(0);
        let x1 = (rect.x + rect.width as i64).min(self.width() as i64);
        let y1 = (rect.y + rect.height as i64).min(self.height() as i64);
        for y in y0..y1 {
            for x in x0..x1 {
                self.image.put_pixel(x as u32, y as u32, color);
            }
        }
    }

    pub fn hline(&mut self, x: i64, y: i64, width: u32, color: Rgba<u8>) {
        self.fill_rect(PixelRect::new(x, y, width, 1), color);
    }

    /// Draw `text` with its top-left corner at `(x, y)`
    ///
    /// Each glyph is `8 * scale` pixels square. Pixels outside `clip` (or
    /// the canvas) are dropped. Returns the advance in pixels.
    pub fn draw_text(&mut self, x: i64, y: i64, text: &str, scale: u32, color: Rgba<u8>, clip: Option<PixelRect>) -> u32 {
        let scale = scale.max(1);
        let advance = GLYPH_SIZE * scale;
        let mut pen = x;
        // One glyph per grapheme cluster, matching the layout's width metric
        let composed: String = text.nfc().collect();
        for cluster in composed.graphemes(true) {
            let rows = cluster.chars().next().map_or([0; 8], glyph);
            for (row, bits) in rows.iter().enumerate() {
                for col in 0..GLYPH_SIZE {
                    if bits & (1 << col) == 0 {
                        continue;
                    }
                    let px = pen + (col * scale) as i64;
                    let py = y + (row as u32 * scale) as i64;
                    let dot = PixelRect::new(px, py, scale, scale);
                    match clip {
                        Some(clip) => self.fill_clipped(dot, clip, color),
                        None => self.fill_rect(dot, color),
                    }
                }
            }
            pen += advance as i64;
        }
        (pen - x) as u32
    }

    fn fill_clipped(&mut self, dot: PixelRect, clip: PixelRect, color: Rgba<u8>) {
        let x0 = dot.x.max(clip.x);
        let y0 = dot.y.max(clip.y);
        let x1 = (dot.x + dot.width as i64).min(clip.x + clip.width as i64);
        let y1 = (dot.y + dot.height as i64).min(clip.y + clip.height as i64);
        if x1 > x0 && y1 > y0 {
            self.fill_rect(PixelRect::new(x0, y0, (x1 - x0) as u32, (y1 - y0) as u32), color);
        }
    }

    /// Encode as PNG
    pub fn encode_png(&self) -> Result<Vec<u8>, RasterError> {
        let mut bytes = Vec::new();
        self.image.write_to(&mut Cursor::new(&mut bytes), ImageFormat::Png)?;
        Ok(bytes)
    }
}
