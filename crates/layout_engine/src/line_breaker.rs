//! Cell Text Wrapping
//!
//! Greedy line filling over Unicode line break opportunities (UAX #14).
//! Widths are counted in grapheme clusters because cell text is drawn with
//! a fixed advance per glyph.
//!
//! - Trailing spaces may hang past the line end
//! - Mandatory breaks (newlines) always end a line
//! - A word longer than a whole line is split on grapheme boundaries

use report_model::TruncationPolicy;
use unicode_linebreak::{linebreaks, BreakOpportunity};
use unicode_segmentation::UnicodeSegmentation;

const ELLIPSIS: &str = "...";

fn grapheme_len(s: &str) -> usize {
    s.graphemes(true).count()
}

fn is_line_terminator(c: char) -> bool {
    matches!(
        c,
        '\n' | '\r' | '\u{0B}' | '\u{0C}' | '\u{85}' | '\u{2028}' | '\u{2029}'
    )
}

/// Replace line terminators with spaces
pub fn single_line(text: &str) -> String {
    text.replace("\r\n", "\n")
        .chars()
        .map(|c| if is_line_terminator(c) { ' ' } else { c })
        .collect()
}

/// Wrap text into lines of at most `max_chars` graphemes
///
/// Always returns at least one line. With `max_chars == 0` nothing fits, so
/// the text comes back as a single unwrapped line for the renderer to clip.
pub fn wrap_text(text: &str, max_chars: usize) -> Vec<String> {
    if max_chars == 0 {
        return vec![single_line(text)];
    }
    if text.is_empty() {
        return vec![String::new()];
    }

    let mut filler = LineFiller::new(max_chars);
    let mut start = 0;

    for (index, opportunity) in linebreaks(text) {
        let segment = &text[start..index];
        start = index;

        match opportunity {
            BreakOpportunity::Mandatory => {
                filler.push_segment(segment.trim_end_matches(is_line_terminator));
                filler.end_line();
            }
            BreakOpportunity::Allowed => filler.push_segment(segment),
        }
    }
    if start < text.len() {
        filler.push_segment(&text[start..]);
    }

    filler.finish()
}

/// Keep one line, ending it with "..." when it does not fit
pub fn truncate_with_ellipsis(text: &str, max_chars: usize) -> String {
    let line = single_line(text);
    if grapheme_len(&line) <= max_chars {
        return line;
    }

    let ellipsis_len = grapheme_len(ELLIPSIS);
    if max_chars <= ellipsis_len {
        return ELLIPSIS.chars().take(max_chars).collect();
    }

    let kept: String = line.graphemes(true).take(max_chars - ellipsis_len).collect();
    format!("{}{}", kept.trim_end(), ELLIPSIS)
}

/// Lay out one cell's text under a truncation policy
pub fn fit_cell_text(text: &str, policy: TruncationPolicy, max_chars: usize) -> Vec<String> {
    match policy {
        TruncationPolicy::Wrap => wrap_text(text, max_chars),
        TruncationPolicy::Ellipsis if max_chars > 0 => vec![truncate_with_ellipsis(text, max_chars)],
        TruncationPolicy::Ellipsis | TruncationPolicy::None => vec![single_line(text)],
    }
}

/// Accumulates segments into lines
struct LineFiller {
    max_chars: usize,
    lines: Vec<String>,
    current: String,
    current_len: usize,
}

impl LineFiller {
    fn new(max_chars: usize) -> Self {
        Self {
            max_chars,
            lines: Vec::new(),
            current: String::new(),
            current_len: 0,
        }
    }

    fn push_segment(&mut self, segment: &str) {
        if segment.is_empty() {
            return;
        }

        let visible_len = grapheme_len(segment.trim_end());
        if self.current_len + visible_len <= self.max_chars {
            self.current.push_str(segment);
            self.current_len += grapheme_len(segment);
            return;
        }

        if !self.current.is_empty() {
            self.end_line();
        }

        if visible_len <= self.max_chars {
            self.current.push_str(segment);
            self.current_len = grapheme_len(segment);
            return;
        }

        // Longer than a whole line: hard split the visible part, the
        // trailing whitespace hangs off the last chunk
        let visible = segment.trim_end();
        let graphemes: Vec<&str> = visible.graphemes(true).collect();
        let mut chunks = graphemes.chunks(self.max_chars).peekable();
        while let Some(chunk) = chunks.next() {
            self.current = chunk.concat();
            self.current_len = chunk.len();
            if chunks.peek().is_some() {
                self.end_line();
            }
        }
        let hanging = &segment[visible.len()..];
        self.current.push_str(hanging);
        self.current_len += grapheme_len(hanging);
    }

    fn end_line(&mut self) {
        let line = std::mem::take(&mut self.current);
        self.lines.push(line.trim_end().to_string());
        self.current_len = 0;
    }

    fn finish(mut self) -> Vec<String> {
        if !self.current.is_empty() {
            self.end_line();
        }
        if self.lines.is_empty() {
            self.lines.push(String::new());
        }
        self.lines
    }
}
