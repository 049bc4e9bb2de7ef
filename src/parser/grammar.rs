//! Compiled block and inline patterns.
//!
//! Block patterns are assembled once from shared sub-patterns (`REFARGS`,
//! `BULL`, `HREF`, `TABLE`) and anchored at the start of the chunk. Inline
//! patterns are anchored at the scan position. Rules that need lookaround or
//! backreferences are scanned by hand in [`super::inline`].

use once_cell::sync::Lazy;
use regex::Regex;

/// Bracketed argument list; capture is the raw argument text.
pub const REFARGS: &str = r"\[((?:(?:[^\]\[\\]|\\.)+|\[(?:[^\]\[]+)*\])*)\]";

/// Bullet marker: `*`, `+`, `-` or `N.`
pub const BULL: &str = r"(?:[*+-]|[0-9]+\.)";

/// Link target with optional quoted title; captures href and title.
pub const HREF: &str = r#"\s*<?([\s\S]*?)>?(?:\s+['"]([\s\S]*?)['"])?\s*"#;

/// Header row, alignment row and body rows of a pipe table.
pub const TABLE: &str = r"\|([^\n]+)\| *\n *\|( *[-:]+[-| :]*)\| *\n((?: *\|[^\n]*\| *(?:\n|$))*)\s*$";

fn compose(template: &str) -> Regex {
    let pattern = template
        .replace("REFARGS", REFARGS)
        .replace("BULL", BULL)
        .replace("HREF", HREF)
        .replace("TABLE", TABLE);
    Regex::new(&pattern).unwrap_or_else(|err| panic!("invalid grammar pattern {template}: {err}"))
}

fn literal(pattern: &str) -> Regex {
    Regex::new(pattern).unwrap_or_else(|err| panic!("invalid grammar pattern {pattern}: {err}"))
}

// block rules

pub static EMPTY: Lazy<Regex> = Lazy::new(|| literal(r"^\s*$"));

pub static EQUATION: Lazy<Regex> =
    Lazy::new(|| compose(r"^\$\$(\*&|&\*|\*|&)? *(?:REFARGS)?\s*"));

pub static FIGURE: Lazy<Regex> = Lazy::new(|| compose(r"^!(svg|gum)(\*)? *(?:REFARGS)?\s*"));

pub static FIGURE_TABLE: Lazy<Regex> =
    Lazy::new(|| compose(r"^!tab(\*)? *(?:REFARGS)?\s*\nTABLE"));

pub static UPLOAD: Lazy<Regex> = Lazy::new(|| compose(r"^!!(gum)? *(?:REFARGS)?\s*$"));

pub static IMAGE: Lazy<Regex> =
    Lazy::new(|| compose(r"^!(yt|youtube)?(\*)? *(?:REFARGS)? *(?:\(HREF\))?\s*"));

pub static COMMENT: Lazy<Regex> = Lazy::new(|| literal(r"^// ?"));

pub static CODE: Lazy<Regex> = Lazy::new(|| compose(r"^``(\*)? *(?:REFARGS)?(?:\n)?(?: |\n)?"));

pub static TITLE: Lazy<Regex> = Lazy::new(|| compose(r"^#! *(?:REFARGS)?\s*([^\n]*)\s*"));

pub static HEADING: Lazy<Regex> =
    Lazy::new(|| compose(r"^(#{1,6})(\*?) *(?:REFARGS)? *([^\n]+?)$"));

pub static ENV_BEGIN: Lazy<Regex> =
    Lazy::new(|| compose(r"^>>(!\*|\*!|!|\*)? *([A-Za-z0-9_-]+) *(?:REFARGS)?\s*"));

pub static ENV_END: Lazy<Regex> = Lazy::new(|| literal(r"^<<\s*"));

pub static SETEXT_HEADING: Lazy<Regex> = Lazy::new(|| literal(r"^([^\n]+)\n *(=|-){2,}\s*$"));

pub static RULE: Lazy<Regex> = Lazy::new(|| literal(r"^([-*_]){3,}\s*$"));

pub static BLOCKQUOTE: Lazy<Regex> = Lazy::new(|| literal(r"^q*>\s*\n?"));

pub static LIST: Lazy<Regex> = Lazy::new(|| compose(r"^((?: *(?:BULL) [^\n]*(?:\n|$))+)\s*$"));

pub static LIST_ITEM: Lazy<Regex> = Lazy::new(|| compose(r"^( *)(BULL) ?"));

pub static PIPE_TABLE: Lazy<Regex> = Lazy::new(|| compose(r"^TABLE"));

pub static PREAMBLE_TAG: Lazy<Regex> = Lazy::new(|| literal(r"#(\[[A-Za-z0-9_| ]+\]|[A-Za-z0-9_]+)"));

// inline rules

pub static SPECIAL: Lazy<Regex> = Lazy::new(|| literal(r#"^\\([`"^~'])\{([A-Za-z])\}"#));

pub static ESCAPE: Lazy<Regex> =
    Lazy::new(|| literal(r"^\\([\\/`*{}\[\]()#+\-.!_>$%&~|])"));

pub static MATH: Lazy<Regex> = Lazy::new(|| literal(r"^\$((?:\\\$|[\s\S])+?)\$"));

pub static INLINE_COMMENT: Lazy<Regex> = Lazy::new(|| literal(r"^//([^\n]*?)(?:\n|$)"));

pub static REFCITE: Lazy<Regex> = Lazy::new(|| literal(r"^(@{1,2})\[([^\]]+)\]"));

pub static INTERNAL_LINK: Lazy<Regex> = Lazy::new(|| literal(r"^\[\[([^\]]+)\]\]"));

pub static AUTOLINK: Lazy<Regex> = Lazy::new(|| literal(r"^<([^ >]+:/[^ >]+)>"));

pub static URL: Lazy<Regex> =
    Lazy::new(|| literal(r#"^(https?://[^\s<]+[^<.,:;"')\]\s])"#));

/// Parenthesised link target following a closing `]`.
pub static LINK_TARGET: Lazy<Regex> = Lazy::new(|| compose(r"^\(HREF\)"));

pub static HASH: Lazy<Regex> = Lazy::new(|| literal(r"^#(\[[A-Za-z0-9_| ]+\]|[A-Za-z0-9_]+)"));

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_all_patterns_compile() {
        let patterns: [&Lazy<Regex>; 29] = [
            &EMPTY,
            &EQUATION,
            &FIGURE,
            &FIGURE_TABLE,
            &UPLOAD,
            &IMAGE,
            &COMMENT,
            &CODE,
            &TITLE,
            &HEADING,
            &ENV_BEGIN,
            &ENV_END,
            &SETEXT_HEADING,
            &RULE,
            &BLOCKQUOTE,
            &LIST,
            &LIST_ITEM,
            &PIPE_TABLE,
            &PREAMBLE_TAG,
            &SPECIAL,
            &ESCAPE,
            &MATH,
            &INLINE_COMMENT,
            &REFCITE,
            &INTERNAL_LINK,
            &AUTOLINK,
            &URL,
            &LINK_TARGET,
            &HASH,
        ];
        for pattern in patterns {
            assert!(pattern.as_str().starts_with('^') || pattern.as_str().starts_with('#'));
        }
    }

    #[test]
    fn test_refargs_captures_nested_brackets() {
        let caps = HEADING.captures("## [id=a|caption=[x]] Title").unwrap();
        assert_eq!(&caps[3], "id=a|caption=[x]");
        assert_eq!(&caps[4], "Title");
    }

    #[test]
    fn test_refargs_allows_escaped_bracket() {
        let caps = EQUATION.captures(r"$$ [id=a\]b] x").unwrap();
        assert_eq!(&caps[2], r"id=a\]b");
    }

    #[test]
    fn test_url_excludes_trailing_punctuation() {
        let caps = URL.captures("https://example.com/a.b, rest").unwrap();
        assert_eq!(&caps[1], "https://example.com/a.b");
    }

    #[test]
    fn test_env_begin_combined_flags() {
        let caps = ENV_BEGIN.captures(">>!* theorem [id=t] body").unwrap();
        assert_eq!(&caps[1], "!*");
        assert_eq!(&caps[2], "theorem");
        assert_eq!(&caps[3], "id=t");
    }
}
