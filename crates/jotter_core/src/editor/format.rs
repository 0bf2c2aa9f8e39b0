//! Selection-based inline formatting.
//!
//! # Responsibility
//! - Wrap or prefix a selected character range with lightweight markers.
//!
//! # Invariants
//! - Offsets are Unicode scalar (char) offsets into the text, half-open
//!   `[start, end)`.
//! - Out-of-range offsets clamp to the text length; reversed ranges are
//!   normalized.
//! - Text outside the selection is never altered.

use std::error::Error;
use std::fmt::{Display, Formatter};
use std::str::FromStr;

/// Supported inline format commands.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FormatKind {
    /// `**selection**`
    Bold,
    /// `*selection*`
    Italic,
    /// `# selection`
    Heading,
    /// `• selection`
    Bullet,
}

impl FormatKind {
    pub const ALL: [FormatKind; 4] = [Self::Bold, Self::Italic, Self::Heading, Self::Bullet];

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Bold => "bold",
            Self::Italic => "italic",
            Self::Heading => "heading",
            Self::Bullet => "bullet",
        }
    }

    fn markers(self) -> (&'static str, &'static str) {
        match self {
            Self::Bold => ("**", "**"),
            Self::Italic => ("*", "*"),
            Self::Heading => ("# ", ""),
            Self::Bullet => ("• ", ""),
        }
    }
}

impl Display for FormatKind {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Unknown format command name.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UnknownFormatKind(pub String);

impl Display for UnknownFormatKind {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "unknown format `{}`; expected bold|italic|heading|bullet",
            self.0
        )
    }
}

impl Error for UnknownFormatKind {}

impl FromStr for FormatKind {
    type Err = UnknownFormatKind;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        let normalized = value.trim().to_ascii_lowercase();
        Self::ALL
            .into_iter()
            .find(|kind| kind.as_str() == normalized)
            .ok_or_else(|| UnknownFormatKind(value.to_string()))
    }
}

/// New text plus the selection to restore in the editor.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FormatResult {
    pub text: String,
    /// Char offset where the originally selected text now starts.
    pub selection_start: usize,
    /// Char offset where the originally selected text now ends.
    pub selection_end: usize,
}

/// Applies `kind` to the `[selection_start, selection_end)` char range of `text`.
///
/// With an empty selection the markers are inserted at the caret and the
/// caret is placed right after the opening marker.
pub fn apply_inline_format(
    text: &str,
    selection_start: usize,
    selection_end: usize,
    kind: FormatKind,
) -> FormatResult {
    let char_len = text.chars().count();
    let mut start = selection_start.min(char_len);
    let mut end = selection_end.min(char_len);
    if start > end {
        std::mem::swap(&mut start, &mut end);
    }

    let start_byte = byte_offset(text, start);
    let end_byte = byte_offset(text, end);
    let (open, close) = kind.markers();

    let mut formatted = String::with_capacity(text.len() + open.len() + close.len());
    formatted.push_str(&text[..start_byte]);
    formatted.push_str(open);
    formatted.push_str(&text[start_byte..end_byte]);
    formatted.push_str(close);
    formatted.push_str(&text[end_byte..]);

    let shift = open.chars().count();
    FormatResult {
        text: formatted,
        selection_start: start + shift,
        selection_end: end + shift,
    }
}

fn byte_offset(text: &str, char_offset: usize) -> usize {
    text.char_indices()
        .nth(char_offset)
        .map_or(text.len(), |(index, _)| index)
}

#[cfg(test)]
mod tests {
    use super::{apply_inline_format, FormatKind};

    #[test]
    fn bold_wraps_selected_word() {
        let result = apply_inline_format("the cat sat", 4, 7, FormatKind::Bold);
        assert_eq!(result.text, "the **cat** sat");
        assert_eq!((result.selection_start, result.selection_end), (6, 9));
    }

    #[test]
    fn italic_wraps_with_single_star() {
        let result = apply_inline_format("a b", 2, 3, FormatKind::Italic);
        assert_eq!(result.text, "a *b*");
    }

    #[test]
    fn prefixes_do_not_close() {
        let heading = apply_inline_format("Plan", 0, 4, FormatKind::Heading);
        assert_eq!(heading.text, "# Plan");
        assert_eq!((heading.selection_start, heading.selection_end), (2, 6));

        let bullet = apply_inline_format("x\nmilk", 2, 6, FormatKind::Bullet);
        assert_eq!(bullet.text, "x\n• milk");
    }

    #[test]
    fn empty_selection_inserts_markers_at_caret() {
        let result = apply_inline_format("ab", 1, 1, FormatKind::Bold);
        assert_eq!(result.text, "a****b");
        assert_eq!((result.selection_start, result.selection_end), (3, 3));
    }

    #[test]
    fn uses_char_offsets_for_multibyte_text() {
        let result = apply_inline_format("café • ok", 0, 4, FormatKind::Bold);
        assert_eq!(result.text, "**café** • ok");
    }

    #[test]
    fn clamps_and_normalizes_range() {
        let result = apply_inline_format("abc", 10, 1, FormatKind::Italic);
        assert_eq!(result.text, "a*bc*");
        assert_eq!((result.selection_start, result.selection_end), (2, 4));
    }

    #[test]
    fn parses_kind_names() {
        assert_eq!("Bold".parse::<FormatKind>().unwrap(), FormatKind::Bold);
        assert_eq!(" bullet ".parse::<FormatKind>().unwrap(), FormatKind::Bullet);
        assert!("underline".parse::<FormatKind>().is_err());
    }
}
