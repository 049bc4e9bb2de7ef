//! Target-language escaping and the accent table.

/// Escape text for HTML element content and attribute values.
#[must_use]
pub fn escape_html(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            '`' => out.push_str("&#96;"),
            _ => out.push(c),
        }
    }
    out
}

/// Escape text for LaTeX body content.
#[must_use]
pub fn escape_latex(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '\\' => out.push_str("\\textbackslash{}"),
            '#' | '&' | '%' | '_' | '$' | '{' | '}' => {
                out.push('\\');
                out.push(c);
            }
            '^' => out.push_str("\\textasciicircum{}"),
            '~' => out.push_str("\\textasciitilde{}"),
            _ => out.push(c),
        }
    }
    out
}

/// Escape a link or image target for `\href` and `\includegraphics`.
///
/// Unlike [`escape_latex`], `$` is left alone since it is not special inside
/// a URL argument.
#[must_use]
pub fn escape_latex_url(target: &str) -> String {
    let mut out = String::with_capacity(target.len());
    for c in target.chars() {
        match c {
            '#' | '%' | '&' | '_' | '{' | '}' => {
                out.push('\\');
                out.push(c);
            }
            '\\' => out.push_str("\\textbackslash{}"),
            '~' => out.push_str("\\textasciitilde{}"),
            '^' => out.push_str("\\textasciicircum{}"),
            _ => out.push(c),
        }
    }
    out
}

/// Accent marks usable in `\X{letter}` specials.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Accent {
    pub mark: char,
    /// HTML entity suffix, as in `&eacute;`
    pub name: &'static str,
    pub allowed: &'static str,
}

pub const ACCENTS: [Accent; 5] = [
    Accent {
        mark: '`',
        name: "grave",
        allowed: "aeiouAEIOU",
    },
    Accent {
        mark: '\'',
        name: "acute",
        allowed: "aeiouyAEIOUY",
    },
    Accent {
        mark: '^',
        name: "circ",
        allowed: "aeiouAEIOU",
    },
    Accent {
        mark: '"',
        name: "uml",
        allowed: "aeiouyAEIOUY",
    },
    Accent {
        mark: '~',
        name: "tilde",
        allowed: "anoANO",
    },
];

/// Look up the accent for `mark`, if it is one of the known marks.
#[must_use]
pub fn accent(mark: &str) -> Option<&'static Accent> {
    let mut chars = mark.chars();
    let c = chars.next()?;
    if chars.next().is_some() {
        return None;
    }
    ACCENTS.iter().find(|accent| accent.mark == c)
}

/// HTML for an accented letter: an entity when the pair is known, otherwise
/// the bare letter.
#[must_use]
pub fn special_html(mark: &str, letter: &str) -> String {
    match accent(mark) {
        Some(acc) if letter.len() == 1 && acc.allowed.contains(letter) => {
            format!("&{letter}{};", acc.name)
        }
        _ => escape_html(letter),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_escape_html() {
        assert_eq!(escape_html(r#"<a href="x">&'"#), "&lt;a href=&quot;x&quot;&gt;&amp;&#39;");
    }

    #[test]
    fn test_escape_latex() {
        assert_eq!(escape_latex("50% of a_b & #1"), r"50\% of a\_b \& \#1");
        assert_eq!(escape_latex("x^2"), r"x\textasciicircum{}2");
        assert_eq!(escape_latex(r"\"), r"\textbackslash{}");
    }

    #[test]
    fn test_escape_latex_url() {
        assert_eq!(escape_latex_url("/a_b.png"), r"/a\_b.png");
        assert_eq!(escape_latex_url("x?a=1&b=2#top"), r"x?a=1\&b=2\#top");
        assert_eq!(escape_latex_url("{~me}/$5"), r"\{\textasciitilde{}me\}/$5");
    }

    #[test]
    fn test_special_html() {
        assert_eq!(special_html("'", "e"), "&eacute;");
        assert_eq!(special_html("\"", "o"), "&ouml;");
        assert_eq!(special_html("~", "n"), "&ntilde;");
        assert_eq!(special_html("~", "e"), "e");
        assert_eq!(special_html("?", "e"), "e");
    }
}
