//! PDF file writer
//!
//! Handles file structure (header, body, xref, trailer), object numbering
//! and stream compression. [`PdfDocumentWriter`] assembles finished page
//! display lists into a complete file.

use super::document::{create_catalog, create_page, create_pages, font_resources, DocumentInfo, PDF_VERSION};
use super::fonts::{create_font_dict, FontRegistry};
use super::objects::{PdfDictionary, PdfObject, PdfStream};
use super::renderer::{PageRenderInfo, PdfRenderer};
use std::io::{self, Write};
use thiserror::Error;

/// Error type for PDF operations
#[derive(Debug, Error)]
pub enum PdfError {
    #[error("IO error: {0}")]
    Io(#[from] io::Error),
    #[error("Invalid document: {0}")]
    InvalidDocument(String),
    #[error("Compression error: {0}")]
    Compression(String),
}

/// Result type for PDF operations
pub type Result<T> = std::result::Result<T, PdfError>;

/// Low-level writer tracking byte offsets for the xref table
pub struct PdfWriter<W: Write> {
    writer: W,
    position: u64,
    /// (object number, byte offset)
    offsets: Vec<(u32, u64)>,
    next_obj_num: u32,
    compress: bool,
}

impl<W: Write> PdfWriter<W> {
    pub fn new(writer: W) -> Self {
        Self {
            writer,
            position: 0,
            offsets: Vec::new(),
            next_obj_num: 1,
            compress: true,
        }
    }

    pub fn set_compression(&mut self, compress: bool) {
        self.compress = compress;
    }

    fn write_bytes(&mut self, data: &[u8]) -> Result<()> {
        self.writer.write_all(data)?;
        self.position += data.len() as u64;
        Ok(())
    }

    pub fn allocate_object(&mut self) -> u32 {
        let num = self.next_obj_num;
        self.next_obj_num += 1;
        num
    }

    /// Version line plus a binary marker comment
    pub fn write_header(&mut self) -> Result<()> {
        self.write_bytes(format!("%PDF-{}\n", PDF_VERSION).as_bytes())?;
        self.write_bytes(&[b'%', 0xE2, 0xE3, 0xCF, 0xD3, b'\n'])
    }

    pub fn write_object(&mut self, obj_num: u32, object: &PdfObject) -> Result<()> {
        self.offsets.push((obj_num, self.position));
        let mut body = format!("{} 0 obj\n", obj_num).into_bytes();
        object.write_to(&mut body);
        body.extend_from_slice(b"\nendobj\n");
        self.write_bytes(&body)
    }

    /// Write a stream, Flate-compressing it when compression is on
    pub fn write_stream_object(&mut self, obj_num: u32, mut stream: PdfStream) -> Result<()> {
        if self.compress && !stream.compressed {
            stream = compress_stream(stream)?;
        }
        stream.dict.insert("Length", PdfObject::Integer(stream.data.len() as i64));
        self.write_object(obj_num, &PdfObject::Stream(stream))
    }

    /// Cross-reference table, trailer and `%%EOF`
    pub fn write_xref_and_trailer(&mut self, catalog_ref: u32, info_ref: Option<u32>) -> Result<()> {
        let xref_offset = self.position;
        let mut offsets = std::mem::take(&mut self.offsets);
        offsets.sort_by_key(|(num, _)| *num);

        let mut table = format!("xref\n0 {}\n", self.next_obj_num);
        table.push_str("0000000000 65535 f \n");
        let mut expected = 1u32;
        for (num, offset) in &offsets {
            while expected < *num {
                table.push_str("0000000000 65535 f \n");
                expected += 1;
            }
            table.push_str(&format!("{:010} 00000 n \n", offset));
            expected = num + 1;
        }
        while expected < self.next_obj_num {
            table.push_str("0000000000 65535 f \n");
            expected += 1;
        }
        self.write_bytes(table.as_bytes())?;

        let mut trailer = PdfDictionary::new();
        trailer.insert("Size", PdfObject::Integer(self.next_obj_num as i64));
        trailer.insert("Root", PdfObject::Reference(catalog_ref));
        if let Some(info) = info_ref {
            trailer.insert("Info", PdfObject::Reference(info));
        }
        let mut tail = b"trailer\n".to_vec();
        PdfObject::Dictionary(trailer).write_to(&mut tail);
        tail.extend_from_slice(format!("\nstartxref\n{}\n%%EOF\n", xref_offset).as_bytes());
        self.write_bytes(&tail)?;

        self.offsets = offsets;
        Ok(())
    }

    pub fn finish(mut self) -> Result<W> {
        self.writer.flush()?;
        Ok(self.writer)
    }
}

fn compress_stream(mut stream: PdfStream) -> Result<PdfStream> {
    use flate2::write::ZlibEncoder;
    use flate2::Compression;

    let mut encoder = ZlibEncoder::new(Vec::new(), Compression::default());
    encoder
        .write_all(&stream.data)
        .map_err(|e| PdfError::Compression(e.to_string()))?;
    stream.data = encoder.finish().map_err(|e| PdfError::Compression(e.to_string()))?;
    stream.compressed = true;
    stream.dict.insert("Filter", PdfObject::name("FlateDecode"));
    Ok(stream)
}

/// Assembles page display lists into a PDF file
pub struct PdfDocumentWriter {
    info: DocumentInfo,
    compress: bool,
}

impl PdfDocumentWriter {
    pub fn new(info: DocumentInfo) -> Self {
        Self { info, compress: true }
    }

    pub fn with_compression(mut self, compress: bool) -> Self {
        self.compress = compress;
        self
    }

    /// Render every page and write the complete document
    ///
    /// All content streams are produced before the first byte is written, so
    /// a rejected page leaves `writer` untouched.
    pub fn write<W: Write>(&self, pages: &[PageRenderInfo], fonts: &FontRegistry, writer: W) -> Result<W> {
        if pages.is_empty() {
            return Err(PdfError::InvalidDocument("No pages to export".to_string()));
        }

        let renderer = PdfRenderer::new(fonts);
        let contents = pages
            .iter()
            .map(|page| renderer.render_page(page))
            .collect::<Result<Vec<_>>>()?;

        let mut pdf = PdfWriter::new(writer);
        pdf.set_compression(self.compress);
        pdf.write_header()?;

        let catalog_ref = pdf.allocate_object();
        let pages_ref = pdf.allocate_object();
        let info_ref = pdf.allocate_object();
        let font_refs: Vec<u32> = (0..fonts.len()).map(|_| pdf.allocate_object()).collect();
        let page_refs: Vec<(u32, u32)> = (0..pages.len())
            .map(|_| (pdf.allocate_object(), pdf.allocate_object()))
            .collect();

        pdf.write_object(catalog_ref, &PdfObject::Dictionary(create_catalog(pages_ref)))?;
        let kids: Vec<u32> = page_refs.iter().map(|(page, _)| *page).collect();
        pdf.write_object(pages_ref, &PdfObject::Dictionary(create_pages(&kids)))?;
        pdf.write_object(info_ref, &PdfObject::Dictionary(self.info.to_dictionary()))?;

        for ((_, font), font_ref) in fonts.entries().into_iter().zip(&font_refs) {
            pdf.write_object(*font_ref, &PdfObject::Dictionary(create_font_dict(font)))?;
        }

        let resources = font_resources(fonts, &font_refs);
        for ((page, content), (page_ref, content_ref)) in pages.iter().zip(contents).zip(&page_refs) {
            let dict = create_page(pages_ref, *content_ref, page.width, page.height, &resources);
            pdf.write_object(*page_ref, &PdfObject::Dictionary(dict))?;
            pdf.write_stream_object(*content_ref, PdfStream::new(content))?;
        }

        pdf.write_xref_and_trailer(catalog_ref, Some(info_ref))?;
        let writer = pdf.finish()?;

        tracing::debug!("Wrote PDF with {} page(s)", pages.len());
        Ok(writer)
    }

    pub fn write_to_bytes(&self, pages: &[PageRenderInfo], fonts: &FontRegistry) -> Result<Vec<u8>> {
        self.write(pages, fonts, Vec::new())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pdf::fonts::StandardFont;
    use std::io::Read;
    use crate::pdf::renderer::{PdfRenderItem, RgbColor, TextRenderInfo};

    fn one_page() -> PageRenderInfo {
        let mut page = PageRenderInfo::new(200.0, 100.0);
        page.add_item(PdfRenderItem::Text(TextRenderInfo::new(
            "Hello",
            10.0,
            20.0,
            StandardFont::Helvetica,
            12.0,
            RgbColor::black(),
        )));
        page
    }

    #[test]
    fn test_file_structure() {
        let bytes = PdfDocumentWriter::new(DocumentInfo::new())
            .with_compression(false)
            .write_to_bytes(&[one_page()], &FontRegistry::with_report_fonts())
            .unwrap();
        let text = String::from_utf8_lossy(&bytes);

        assert!(text.starts_with("%PDF-1.4\n"));
        assert!(text.contains("/Type /Catalog"));
        assert!(text.contains("/Count 1"));
        assert!(text.contains("(Hello) Tj"));
        assert!(text.contains("xref\n0 10\n0000000000 65535 f \n"));
        assert!(text.trim_end().ends_with("%%EOF"));
    }

    #[test]
    fn test_xref_offsets_point_at_objects() {
        let bytes = PdfDocumentWriter::new(DocumentInfo::new())
            .with_compression(false)
            .write_to_bytes(&[one_page()], &FontRegistry::with_report_fonts())
            .unwrap();
        let xref_start = bytes.windows(5).position(|w| w == b"xref\n").unwrap();
        let table = std::str::from_utf8(&bytes[xref_start..]).unwrap();
        let entries: Vec<&str> = table.lines().skip(3).take(9).collect();
        for (i, entry) in entries.iter().enumerate() {
            let offset: usize = entry[..10].parse().unwrap();
            let expected = format!("{} 0 obj", i + 1);
            assert!(
                bytes[offset..].starts_with(expected.as_bytes()),
                "bad offset for object {}",
                i + 1
            );
        }
    }

    #[test]
    fn test_compression_adds_filter() {
        let bytes = PdfDocumentWriter::new(DocumentInfo::new())
            .write_to_bytes(&[one_page()], &FontRegistry::with_report_fonts())
            .unwrap();
        let text = String::from_utf8_lossy(&bytes);
        assert!(text.contains("/Filter /FlateDecode"));

        // The page content stream is the last stream in the file
        let start = bytes.windows(10).rposition(|w| w == b">>\nstream\n").unwrap() + 10;
        let end = start + bytes[start..].windows(10).position(|w| w == b"\nendstream").unwrap();
        let mut decoded = String::new();
        flate2::read::ZlibDecoder::new(&bytes[start..end])
            .read_to_string(&mut decoded)
            .unwrap();
        assert!(decoded.contains("BT"));
        assert!(decoded.contains("(Hello) Tj"));
        assert!(decoded.contains("ET"));
    }

    #[test]
    fn test_empty_document_is_rejected() {
        let result = PdfDocumentWriter::new(DocumentInfo::new())
            .write_to_bytes(&[], &FontRegistry::with_report_fonts());
        assert!(matches!(result, Err(PdfError::InvalidDocument(_))));
    }

    #[test]
    fn test_rejected_page_fails_whole_document() {
        let mut bad = PageRenderInfo::new(200.0, 100.0);
        bad.add_item(PdfRenderItem::Text(TextRenderInfo::new(
            "x",
            f64::NAN,
            0.0,
            StandardFont::Helvetica,
            12.0,
            RgbColor::black(),
        )));

        let result = PdfDocumentWriter::new(DocumentInfo::new())
            .write_to_bytes(&[one_page(), bad], &FontRegistry::with_report_fonts());
        assert!(result.is_err());
    }
}
