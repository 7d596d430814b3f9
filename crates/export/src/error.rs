//! Error types for report export

use crate::pdf::PdfError;
use crate::raster::RasterError;
use layout_engine::LayoutError;
use report_model::ProjectionError;
use thiserror::Error;

/// Export errors
#[derive(Debug, Error)]
pub enum ExportError {
    #[error("Projection error: {0}")]
    Projection(#[from] ProjectionError),

    #[error("Layout error: {0}")]
    Layout(#[from] LayoutError),

    #[error("PDF error: {0}")]
    Pdf(#[from] PdfError),

    #[error("Raster error: {0}")]
    Raster(#[from] RasterError),

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Invalid job transition: {0}")]
    JobState(String),
}

impl ExportError {
    /// Whether a drawing, encoding or file-save primitive failed
    pub fn is_render_backend(&self) -> bool {
        matches!(
            self,
            ExportError::Pdf(_) | ExportError::Raster(_) | ExportError::Csv(_) | ExportError::Io(_)
        )
    }
}

/// Result type for export operations
pub type Result<T> = std::result::Result<T, ExportError>;
