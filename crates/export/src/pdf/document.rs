//! Document-level dictionaries: catalog, page tree, pages and info

use super::fonts::FontRegistry;
use super::objects::{PdfDictionary, PdfObject};
use chrono::{DateTime, Utc};

/// PDF header version
pub const PDF_VERSION: &str = "1.4";

/// Document information dictionary
#[derive(Debug, Clone, Default, PartialEq)]
pub struct DocumentInfo {
    pub title: Option<String>,
    pub author: Option<String>,
    pub subject: Option<String>,
    pub creator: Option<String>,
    pub producer: Option<String>,
    pub creation_date: Option<DateTime<Utc>>,
}

impl DocumentInfo {
    pub fn new() -> Self {
        Self {
            creator: Some("Report Export".to_string()),
            producer: Some(format!("report-export {}", env!("CARGO_PKG_VERSION"))),
            ..Default::default()
        }
    }

    pub fn to_dictionary(&self) -> PdfDictionary {
        let mut dict = PdfDictionary::new();
        let fields = [
            ("Title", &self.title),
            ("Author", &self.author),
            ("Subject", &self.subject),
            ("Creator", &self.creator),
            ("Producer", &self.producer),
        ];
        for (key, value) in fields {
            if let Some(value) = value {
                dict.insert(key, PdfObject::text(value));
            }
        }
        if let Some(date) = self.creation_date {
            dict.insert("CreationDate", PdfObject::text(&pdf_date(&date)));
        }
        dict
    }
}

/// PDF date string, e.g. `D:20240301093000+00'00'`
pub fn pdf_date(date: &DateTime<Utc>) -> String {
    format!("D:{}+00'00'", date.format("%Y%m%d%H%M%S"))
}

pub fn create_catalog(pages_ref: u32) -> PdfDictionary {
    let mut catalog = PdfDictionary::typed("Catalog");
    catalog.insert("Pages", PdfObject::Reference(pages_ref));
    catalog
}

pub fn create_pages(page_refs: &[u32]) -> PdfDictionary {
    let mut pages = PdfDictionary::typed("Pages");
    pages.insert(
        "Kids",
        PdfObject::Array(page_refs.iter().map(|r| PdfObject::Reference(*r)).collect()),
    );
    pages.insert("Count", PdfObject::Integer(page_refs.len() as i64));
    pages
}

/// A page object with its media box and font resources
pub fn create_page(
    parent_ref: u32,
    contents_ref: u32,
    width: f64,
    height: f64,
    fonts: &[(&str, u32)],
) -> PdfDictionary {
    let mut page = PdfDictionary::typed("Page");
    page.insert("Parent", PdfObject::Reference(parent_ref));
    page.insert(
        "MediaBox",
        PdfObject::Array(vec![
            PdfObject::Integer(0),
            PdfObject::Integer(0),
            PdfObject::Real(width),
            PdfObject::Real(height),
        ]),
    );
    page.insert("Contents", PdfObject::Reference(contents_ref));

    let mut font_dict = PdfDictionary::new();
    for (name, font_ref) in fonts {
        font_dict.insert(*name, PdfObject::Reference(*font_ref));
    }
    let mut resources = PdfDictionary::new();
    resources.insert("Font", PdfObject::Dictionary(font_dict));
    resources.insert(
        "ProcSet",
        PdfObject::Array(vec![PdfObject::name("PDF"), PdfObject::name("Text")]),
    );
    page.insert("Resources", PdfObject::Dictionary(resources));
    page
}

/// Resource names of a registry, ready for [`create_page`]
pub(crate) fn font_resources<'a>(registry: &'a FontRegistry, refs: &[u32]) -> Vec<(&'a str, u32)> {
    registry
        .entries()
        .into_iter()
        .zip(refs.iter())
        .map(|((name, _), r)| (name, *r))
        .collect()
}
