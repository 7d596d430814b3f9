//! Delimited text export
//!
//! Serializes a projection straight to text, without pagination. The
//! output has three sections separated by blank lines: metadata, summary
//! pairs, and the table itself.

use crate::error::{ExportError, Result};
use crate::meta::ReportMeta;
use csv::{QuoteStyle, ReaderBuilder, Terminator, WriterBuilder};
use report_model::{ColumnSpec, Projection};
use serde::{Deserialize, Serialize};
use std::io;

/// Delimited text options
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CsvOptions {
    /// Field delimiter; must be a single ASCII character
    #[serde(default = "default_delimiter")]
    pub delimiter: char,
}

fn default_delimiter() -> char {
    ','
}

impl Default for CsvOptions {
    fn default() -> Self {
        Self {
            delimiter: default_delimiter(),
        }
    }
}

impl CsvOptions {
    pub fn with_delimiter(mut self, delimiter: char) -> Self {
        self.delimiter = delimiter;
        self
    }

    /// The delimiter as a byte, rejecting characters the format cannot use
    pub fn delimiter_byte(&self) -> Result<u8> {
        match self.delimiter {
            c if c.is_ascii() && !matches!(c, '"' | '\n' | '\r') => Ok(c as u8),
            c => Err(ExportError::Config(format!("Unsupported CSV delimiter {:?}", c))),
        }
    }
}

/// Writes projections as delimited text
#[derive(Debug, Clone, Default)]
pub struct DelimitedTextRenderer {
    options: CsvOptions,
}

impl DelimitedTextRenderer {
    pub fn new(options: CsvOptions) -> Self {
        Self { options }
    }

    /// Render metadata, summary and every row, in projection order
    ///
    /// Every column is written, including ones hidden from the paginated
    /// outputs by a zero weight.
    pub fn render(&self, columns: &[ColumnSpec], projection: &Projection, meta: &ReportMeta) -> Result<String> {
        let delimiter = self.options.delimiter_byte()?;
        let mut out = Vec::new();

        let timestamp = meta.timestamp();
        let mut metadata: Vec<Vec<&str>> = vec![vec![meta.title.as_str()]];
        if let Some(subtitle) = &meta.subtitle {
            metadata.push(vec![subtitle.as_str()]);
        }
        metadata.push(vec!["Generated", timestamp.as_str()]);
        if !meta.author.is_empty() {
            metadata.push(vec!["By", meta.author.as_str()]);
        }
        write_records(&mut out, delimiter, metadata)?;
        out.push(b'\n');

        let mut summary: Vec<Vec<&str>> = vec![vec!["Metric", "Value"]];
        summary.extend(
            projection
                .summary
                .entries()
                .iter()
                .map(|e| vec![e.label.as_str(), e.display.as_str()]),
        );
        write_records(&mut out, delimiter, summary)?;
        out.push(b'\n');

        let header: Vec<&str> = columns.iter().map(|c| c.header_label.as_str()).collect();
        let table = std::iter::once(header).chain(projection.rows.iter().map(|row| row.display_texts()));
        write_records(&mut out, delimiter, table)?;

        tracing::debug!("Rendered {} CSV rows ({} bytes)", projection.row_count(), out.len());
        String::from_utf8(out).map_err(|e| io::Error::new(io::ErrorKind::InvalidData, e).into())
    }
}

fn write_records<'a, I>(out: &mut Vec<u8>, delimiter: u8, records: I) -> Result<()>
where
    I: IntoIterator<Item = Vec<&'a str>>,
{
    let mut writer = WriterBuilder::new()
        .delimiter(delimiter)
        .quote_style(QuoteStyle::Necessary)
        .terminator(Terminator::Any(b'\n'))
        .flexible(true)
        .from_writer(out);
    for record in records {
        writer.write_record(&record)?;
    }
    writer.flush()?;
    Ok(())
}

/// Split delimited text back into records of unescaped fields
///
/// Blank separator lines are skipped, so the result holds the metadata,
/// summary and table records back to back.
pub fn parse_delimited(text: &str, delimiter: u8) -> Result<Vec<Vec<String>>> {
    let mut reader = ReaderBuilder::new()
        .has_headers(false)
        .flexible(true)
        .delimiter(delimiter)
        .from_reader(text.as_bytes());

    let mut records = Vec::new();
    for record in reader.records() {
        records.push(record?.iter().map(str::to_string).collect());
    }
    Ok(records)
}
