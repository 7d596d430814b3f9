//! Standard fonts and WinAnsi text encoding
//!
//! Reports only use the base-14 fonts, so nothing is embedded. Every font is
//! registered up front under a resource name (`F1`, `F2`, ...) and the page
//! renderer refuses text in a font that was never registered.

use super::objects::{PdfDictionary, PdfObject};
use std::collections::BTreeMap;
use unicode_normalization::UnicodeNormalization;
use unicode_segmentation::UnicodeSegmentation;

/// Base-14 fonts used by report documents
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum StandardFont {
    Helvetica,
    HelveticaBold,
    Courier,
    CourierBold,
}

impl StandardFont {
    pub const ALL: [StandardFont; 4] = [
        StandardFont::Helvetica,
        StandardFont::HelveticaBold,
        StandardFont::Courier,
        StandardFont::CourierBold,
    ];

    /// PostScript name used as `/BaseFont`
    pub fn pdf_name(&self) -> &'static str {
        match self {
            StandardFont::Helvetica => "Helvetica",
            StandardFont::HelveticaBold => "Helvetica-Bold",
            StandardFont::Courier => "Courier",
            StandardFont::CourierBold => "Courier-Bold",
        }
    }

    /// Approximate advance of one character, in ems
    ///
    /// Courier is exact. Helvetica uses an average, which is only used to
    /// right-align short strings such as page numbers.
    pub fn average_advance_em(&self) -> f64 {
        match self {
            StandardFont::Courier | StandardFont::CourierBold => 0.6,
            StandardFont::Helvetica => 0.52,
            StandardFont::HelveticaBold => 0.56,
        }
    }

    /// Estimated rendered width of `text` at `size`
    pub fn estimate_width(&self, text: &str, size: f64) -> f64 {
        text.graphemes(true).count() as f64 * self.average_advance_em() * size
    }
}

/// Maps fonts to page resource names
#[derive(Debug, Clone, Default)]
pub struct FontRegistry {
    fonts: BTreeMap<StandardFont, String>,
}

impl FontRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registry with every report font registered
    pub fn with_report_fonts() -> Self {
        let mut registry = Self::new();
        for font in StandardFont::ALL {
            registry.register(font);
        }
        registry
    }

    /// Register a font, returning its resource name
    pub fn register(&mut self, font: StandardFont) -> &str {
        let next = format!("F{}", self.fonts.len() + 1);
        self.fonts.entry(font).or_insert(next)
    }

    /// Resource name of a registered font
    pub fn resource_name(&self, font: StandardFont) -> Option<&str> {
        self.fonts.get(&font).map(String::as_str)
    }

    /// Registered fonts with their resource names, in resource-name order
    pub fn entries(&self) -> Vec<(&str, StandardFont)> {
        let mut entries: Vec<_> = self.fonts.iter().map(|(font, name)| (name.as_str(), *font)).collect();
        entries.sort_by_key(|(name, _)| name[1..].parse::<u32>().unwrap_or(u32::MAX));
        entries
    }

    pub fn len(&self) -> usize {
        self.fonts.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fonts.is_empty()
    }
}

/// Font dictionary for a base-14 font
pub fn create_font_dict(font: StandardFont) -> PdfDictionary {
    let mut dict = PdfDictionary::typed("Font");
    dict.insert("Subtype", PdfObject::name("Type1"));
    dict.insert("BaseFont", PdfObject::name(font.pdf_name()));
    dict.insert("Encoding", PdfObject::name("WinAnsiEncoding"));
    dict
}

/// Encode text as WinAnsi (Windows-1252); unmappable characters become `?`
///
/// Text is NFC-composed first, then each grapheme cluster becomes exactly
/// one byte so the drawn width matches the grapheme-based layout metrics.
/// Marks left over after composition are dropped.
pub fn encode_win_ansi(text: &str) -> Vec<u8> {
    let composed: String = text.nfc().collect();
    composed
        .graphemes(true)
        .map(|cluster| cluster.chars().next().map_or(b'?', win_ansi_byte))
        .collect()
}

fn win_ansi_byte(c: char) -> u8 {
    let code = c as u32;
    match code {
        0x20..=0x7E | 0xA0..=0xFF => code as u8,
        0x09 | 0x0A | 0x0D => b' ',
        _ => match c {
            '€' => 0x80,
            '‚' => 0x82,
            'ƒ' => 0x83,
            '„' => 0x84,
            '…' => 0x85,
            '†' => 0x86,
            '‡' => 0x87,
            'ˆ' => 0x88,
            '‰' => 0x89,
            'Š' => 0x8A,
            '‹' => 0x8B,
            'Œ' => 0x8C,
            'Ž' => 0x8E,
            '\u{2018}' => 0x91,
            '\u{2019}' => 0x92,
            '\u{201C}' => 0x93,
            '\u{201D}' => 0x94,
            '•' => 0x95,
            '\u{2013}' => 0x96,
            '\u{2014}' => 0x97,
            '˜' => 0x98,
            '™' => 0x99,
            'š' => 0x9A,
            '›' => 0x9B,
            'œ' => 0x9C,
            'ž' => 0x9E,
            'Ÿ' => 0x9F,
            _ => b'?',
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_registry_names_are_stable() {
        let mut registry = FontRegistry::new();
        assert_eq!(registry.register(StandardFont::Courier), "F1");
        assert_eq!(registry.register(StandardFont::HelveticaBold), "F2");
        assert_eq!(registry.register(StandardFont::Courier), "F1");

        assert_eq!(registry.resource_name(StandardFont::HelveticaBold), Some("F2"));
        assert_eq!(registry.resource_name(StandardFont::Helvetica), None);
        assert_eq!(
            registry.entries(),
            vec![("F1", StandardFont::Courier), ("F2", StandardFont::HelveticaBold)]
        );
    }

    #[test]
    fn test_report_fonts() {
        let registry = FontRegistry::with_report_fonts();
        assert_eq!(registry.len(), 4);
        assert_eq!(registry.resource_name(StandardFont::Helvetica), Some("F1"));
        assert_eq!(registry.resource_name(StandardFont::CourierBold), Some("F4"));
    }

    #[test]
    fn test_font_dict() {
        let dict = create_font_dict(StandardFont::CourierBold);
        assert_eq!(dict.get("BaseFont"), Some(&PdfObject::name("Courier-Bold")));
        assert_eq!(dict.get("Encoding"), Some(&PdfObject::name("WinAnsiEncoding")));
    }

    #[test]
    fn test_win_ansi_encoding() {
        assert_eq!(encode_win_ansi("Total • 2"), vec![b'T', b'o', b't', b'a', b'l', b' ', 0x95, b' ', b'2']);
        assert_eq!(encode_win_ansi("café"), vec![b'c', b'a', b'f', 0xE9]);
        assert_eq!(encode_win_ansi("€5"), vec![0x80, b'5']);
        assert_eq!(encode_win_ansi("日本"), b"??".to_vec());
    }

    #[test]
    fn test_combining_marks_encode_one_byte_per_grapheme() {
        // Decomposed e + acute composes to é
        assert_eq!(encode_win_ansi("cafe\u{301}"), vec![b'c', b'a', b'f', 0xE9]);
        // No precomposed form: the base letter is kept, the marks dropped
        assert_eq!(encode_win_ansi("x\u{301}\u{323}y"), vec![b'x', b'y']);
        assert_eq!(encode_win_ansi("a\r\nb"), vec![b'a', b' ', b'b']);
    }

    #[test]
    fn test_courier_width_is_exact() {
        assert!((StandardFont::Courier.estimate_width("abcde", 10.0) - 30.0).abs() < 1e-9);
        assert!((StandardFont::Courier.estimate_width("e\u{301}", 10.0) - 6.0).abs() < 1e-9);
    }
}
