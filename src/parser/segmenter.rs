//! Text normalization and block segmentation.

use once_cell::sync::Lazy;
use regex::Regex;

static BLANK_LINE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?m)^ +$").unwrap_or_else(|err| panic!("{err}")));

static CHUNK_BREAK: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\n{2,}").unwrap_or_else(|err| panic!("{err}")));

/// Normalize line endings and whitespace.
///
/// CRLF and lone CR become LF, tabs become four spaces, no-break spaces
/// become plain spaces, U+2424 becomes LF, and lines holding only spaces
/// are emptied. Applying it twice gives the same result as applying it once.
#[must_use]
pub fn normalize(src: &str) -> String {
    let text = src
        .replace("\r\n", "\n")
        .replace('\r', "\n")
        .replace('\t', "    ")
        .replace('\u{a0}', " ")
        .replace('\u{2424}', "\n");
    BLANK_LINE.replace_all(&text, "").into_owned()
}

/// Split normalized text into block chunks on runs of blank lines.
///
/// Chunks keep their source order; an empty chunk is yielded for leading or
/// trailing blank runs and for empty input. A single trailing newline is not
/// part of the chunk.
pub fn split_chunks(text: &str) -> impl Iterator<Item = &str> {
    CHUNK_BREAK
        .split(text)
        .map(|chunk| chunk.trim_end_matches('\n'))
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_normalize_line_endings() {
        assert_eq!(normalize("a\r\nb\rc"), "a\nb\nc");
    }

    #[test]
    fn test_normalize_whitespace() {
        assert_eq!(normalize("\tx\u{a0}y\u{2424}z"), "    x y\nz");
    }

    #[test]
    fn test_normalize_blank_lines() {
        assert_eq!(normalize("a\n   \nb"), "a\n\nb");
    }

    #[test]
    fn test_normalize_idempotent() {
        let once = normalize("a\r\n\t \r\n\u{a0}\u{2424}b");
        assert_eq!(normalize(&once), once);
    }

    #[test]
    fn test_split_chunks() {
        let chunks: Vec<_> = split_chunks("# A\n\npara\nline\n\n\n$$ x $$").collect();
        assert_eq!(chunks, vec!["# A", "para\nline", "$$ x $$"]);
    }

    #[test]
    fn test_split_chunks_keeps_empty() {
        let chunks: Vec<_> = split_chunks("a\n\n").collect();
        assert_eq!(chunks, vec!["a", ""]);
        let chunks: Vec<_> = split_chunks("").collect();
        assert_eq!(chunks, vec![""]);
    }

    #[test]
    fn test_split_chunks_drops_single_trailing_newline() {
        let chunks: Vec<_> = split_chunks("# Title\n").collect();
        assert_eq!(chunks, vec!["# Title"]);
    }
}
