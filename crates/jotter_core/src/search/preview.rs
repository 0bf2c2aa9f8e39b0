//! Plain-text previews for note cards.

use once_cell::sync::Lazy;
use regex::Regex;

const PREVIEW_MAX_CHARS: usize = 100;

static HEADING_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(^|\s)#+\s").expect("valid heading regex"));
static BULLET_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"•\s*").expect("valid bullet regex"));
static BOLD_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\*\*([^*]*)\*\*").expect("valid bold regex"));
static ITALIC_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\*([^*\n]*)\*").expect("valid italic regex"));
static WHITESPACE_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"\s+").expect("valid ws regex"));

/// Derives a one-line preview from note content.
///
/// Rules:
/// - inline markers inserted by the editor (`**x**`, `*x*`, `# `, `• `) are
///   removed; a lone `*` stays;
/// - whitespace runs collapse to one space;
/// - the first 100 chars are kept.
///
/// Returns `None` when nothing readable remains.
pub fn derive_preview(content: &str) -> Option<String> {
    let without_headings = HEADING_RE.replace_all(content, "$1");
    let without_bullets = BULLET_RE.replace_all(&without_headings, " ");
    let without_bold = BOLD_RE.replace_all(&without_bullets, "$1");
    let without_italic = ITALIC_RE.replace_all(&without_bold, "$1");
    let normalized = WHITESPACE_RE.replace_all(&without_italic, " ");
    let trimmed = normalized.trim();
    if trimmed.is_empty() {
        None
    } else {
        Some(trimmed.chars().take(PREVIEW_MAX_CHARS).collect())
    }
}

#[cfg(test)]
mod tests {
    use super::derive_preview;

    #[test]
    fn strips_editor_markers() {
        let preview = derive_preview("# Plan\n• **milk**\n• *eggs*").unwrap();
        assert_eq!(preview, "Plan milk eggs");
    }

    #[test]
    fn keeps_unpaired_asterisks() {
        assert_eq!(derive_preview("2*3=6").as_deref(), Some("2*3=6"));
        assert_eq!(
            derive_preview("**sum** 2*3=6").as_deref(),
            Some("sum 2*3=6")
        );
    }

    #[test]
    fn keeps_hashtags_without_space() {
        assert_eq!(derive_preview("tag #work").as_deref(), Some("tag #work"));
    }

    #[test]
    fn limits_length_and_handles_blank() {
        let long = "x".repeat(500);
        assert_eq!(derive_preview(&long).unwrap().chars().count(), 100);
        assert_eq!(derive_preview(" ** \n • "), None);
    }
}
