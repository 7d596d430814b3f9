//! 8x8 bitmap glyphs
//!
//! ASCII and Latin-1 come from `font8x8`. A few common typographic
//! characters map to their nearest Latin-1 look-alike; anything else draws
//! as `?`.

use font8x8::{UnicodeFonts, BASIC_FONTS, LATIN_FONTS};

/// Glyph cell size in unscaled pixels
pub const GLYPH_SIZE: u32 = 8;

/// Bitmap rows for `c`, top row first; bit 0 is the leftmost pixel
pub fn glyph(c: char) -> [u8; 8] {
    let c = substitute(c);
    BASIC_FONTS
        .get(c)
        .or_else(|| LATIN_FONTS.get(c))
        .or_else(|| BASIC_FONTS.get('?'))
        .unwrap_or([0; 8])
}

/// Whether `c` draws as itself rather than a fallback
pub fn has_glyph(c: char) -> bool {
    let c = substitute(c);
    BASIC_FONTS.get(c).is_some() || LATIN_FONTS.get(c).is_some()
}

fn substitute(c: char) -> char {
    match c {
        '\u{2022}' => '\u{00B7}',
        '\u{2013}' | '\u{2014}' => '-',
        '\u{2018}' | '\u{2019}' => '\'',
        '\u{201C}' | '\u{201D}' => '"',
        '\t' | '\n' | '\r' => ' ',
        _ => c,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ascii_glyphs() {
        assert_eq!(glyph(' '), [0; 8]);
        assert_ne!(glyph('A'), [0; 8]);
        assert!(has_glyph('z'));
    }

    #[test]
    fn test_latin_and_substitutes() {
        assert!(has_glyph('é'));
        assert!(has_glyph('•'));
        assert_eq!(glyph('•'), glyph('·'));
        assert_eq!(glyph('—'), glyph('-'));
    }

    #[test]
    fn test_unknown_falls_back_to_question_mark() {
        assert!(!has_glyph('日'));
        assert_eq!(glyph('日'), glyph('?'));
    }
}
