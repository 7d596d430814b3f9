//! PDF Export Module
//!
//! A small PDF 1.4 writer specialised for tabular reports.
//!
//! # Architecture
//!
//! - `objects`: PDF object model and serialization
//! - `content`: content stream operators
//! - `fonts`: base-14 fonts and WinAnsi encoding
//! - `document`: catalog, page tree and info dictionary
//! - `renderer`: page display lists to content streams
//! - `writer`: file structure, xref and compression
//! - `report`: header band, summary, table pages and footers

mod content;
mod document;
mod fonts;
mod objects;
mod options;
mod renderer;
mod report;
mod writer;

pub use content::ContentStream;
pub use document::{pdf_date, DocumentInfo};
pub use fonts::{encode_win_ansi, FontRegistry, StandardFont};
pub use objects::{PdfDictionary, PdfObject, PdfStream};
pub use options::PdfExportOptions;
pub use renderer::{LineRenderInfo, PageRenderInfo, PdfRenderItem, PdfRenderer, RectRenderInfo, RgbColor, TextRenderInfo};
pub use report::PdfReportRenderer;
pub use writer::{PdfDocumentWriter, PdfError, PdfWriter};
