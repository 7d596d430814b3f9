//! Raster snapshot export
//!
//! - `glyphs`: 8x8 bitmap glyph lookup
//! - `canvas`: RGBA surface with clipped fills and text
//! - `snapshot`: the report snapshot layout

mod canvas;
mod glyphs;
mod snapshot;

pub use canvas::{Canvas, PixelRect, MAX_DIMENSION};
pub use glyphs::{glyph, has_glyph, GLYPH_SIZE};
pub use snapshot::{RasterOptions, RasterSnapshotRenderer, SnapshotGeometry, SnapshotImage};

use thiserror::Error;

/// Error type for raster operations
#[derive(Debug, Error)]
pub enum RasterError {
    #[error("Image encoding failed: {0}")]
    Encode(#[from] image::ImageError),
    #[error("Invalid canvas: {0}")]
    InvalidCanvas(String),
}
