//! Inline scanner.
//!
//! At each position the rules in [`INLINE_RULES`] are tried in order and the
//! first match is consumed. Regex-expressible rules use the anchored patterns
//! in [`super::grammar`]; the rest are hand scanners over a [`Cursor`].
//! Adjacent text runs are merged into a single `Text` node.

use log::trace;

use super::args::{ArgMode, parse_args};
use super::cursor::Cursor;
use super::grammar;
use crate::error::{ParseError, ParseResult};
use crate::models::{Inline, Inlines, LinkKind, NoteKind, ReferenceKind};

/// Nested spans deeper than this are not opened; their delimiters stay text.
pub const MAX_NESTING: u16 = 32;

/// Scanning state threaded through nested spans.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct InlineContext {
    /// Inside a link label: bare URLs are kept as text and autolinks are
    /// not recognised.
    pub in_link: bool,
    /// Number of enclosing spans.
    pub depth: u16,
}

impl InlineContext {
    const fn inside_link(self) -> Self {
        Self {
            in_link: true,
            ..self
        }
    }

    const fn nested(self) -> Self {
        Self {
            depth: self.depth.saturating_add(1),
            ..self
        }
    }

    const fn at_limit(self) -> bool {
        self.depth >= MAX_NESTING
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InlineRule {
    Special,
    Escape,
    Math,
    Comment,
    RefCite,
    Footnote,
    InternalLink,
    Autolink,
    Url,
    Link,
    Strong,
    Hash,
    Em,
    Code,
    Break,
    Del,
    Text,
}

/// Rule priority, highest first.
pub const INLINE_RULES: [InlineRule; 17] = [
    InlineRule::Special,
    InlineRule::Escape,
    InlineRule::Math,
    InlineRule::Comment,
    InlineRule::RefCite,
    InlineRule::Footnote,
    InlineRule::InternalLink,
    InlineRule::Autolink,
    InlineRule::Url,
    InlineRule::Link,
    InlineRule::Strong,
    InlineRule::Hash,
    InlineRule::Em,
    InlineRule::Code,
    InlineRule::Break,
    InlineRule::Del,
    InlineRule::Text,
];

/// A matched node and the number of bytes it consumed.
type Match = (Inline, usize);

impl InlineRule {
    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            Self::Special => "special",
            Self::Escape => "escape",
            Self::Math => "math",
            Self::Comment => "comment",
            Self::RefCite => "refcite",
            Self::Footnote => "footnote",
            Self::InternalLink => "ilink",
            Self::Autolink => "autolink",
            Self::Url => "url",
            Self::Link => "link",
            Self::Strong => "strong",
            Self::Hash => "hash",
            Self::Em => "em",
            Self::Code => "code",
            Self::Break => "br",
            Self::Del => "del",
            Self::Text => "text",
        }
    }

    /// Whether a match scans its content as a nested span.
    #[must_use]
    pub const fn nests(self) -> bool {
        matches!(
            self,
            Self::RefCite
                | Self::Footnote
                | Self::InternalLink
                | Self::Link
                | Self::Strong
                | Self::Em
                | Self::Del
        )
    }

    /// Try this rule at the start of `src`, which sits at absolute `pos`.
    fn scan(self, src: &str, pos: usize, ctx: InlineContext) -> ParseResult<Option<Match>> {
        if self.nests() && ctx.at_limit() {
            return Ok(None);
        }
        match self {
            Self::Special => Ok(scan_special(src)),
            Self::Escape => Ok(grammar::ESCAPE.captures(src).map(|caps| {
                (
                    Inline::Escape {
                        text: caps[1].to_string(),
                    },
                    caps[0].len(),
                )
            })),
            Self::Math => Ok(grammar::MATH
                .captures(src)
                .map(|caps| (Inline::math(&caps[1]), caps[0].len()))),
            Self::Comment => Ok(grammar::INLINE_COMMENT.captures(src).map(|caps| {
                (
                    Inline::Comment {
                        text: caps[1].to_string(),
                    },
                    caps[0].len(),
                )
            })),
            Self::RefCite => scan_refcite(src, pos, ctx),
            Self::Footnote => scan_footnote(src, pos, ctx),
            Self::InternalLink => scan_internal_link(src, pos, ctx),
            Self::Autolink if !ctx.in_link => Ok(grammar::AUTOLINK
                .captures(src)
                .map(|caps| (bare_link(LinkKind::Auto, &caps[1]), caps[0].len()))),
            Self::Url if !ctx.in_link => Ok(grammar::URL
                .captures(src)
                .map(|caps| (bare_link(LinkKind::Url, &caps[1]), caps[0].len()))),
            Self::Url => Ok(grammar::URL
                .captures(src)
                .map(|caps| (Inline::text(&caps[1]), caps[0].len()))),
            Self::Autolink => Ok(None),
            Self::Link => scan_link(src, pos, ctx),
            Self::Strong => scan_strong(src, pos, ctx),
            Self::Hash => Ok(grammar::HASH.captures(src).map(|caps| {
                let tag = caps[1].replacen('[', "", 1).replacen(']', "", 1);
                (Inline::Hash { tag }, caps[0].len())
            })),
            Self::Em => scan_em(src, pos, ctx),
            Self::Code => Ok(scan_code(src)),
            Self::Break => Ok(scan_break(src).map(|len| (Inline::Newline, len))),
            Self::Del => scan_del(src, pos, ctx),
            Self::Text => Ok(scan_text(src).map(|len| (Inline::text(&src[..len]), len))),
        }
    }
}

/// Parse a span of inline markup.
///
/// # Errors
///
/// Returns [`ParseError::Stuck`] if no rule consumes input at some position.
pub fn parse_inline(src: &str) -> ParseResult<Inlines> {
    parse_inline_with(src, InlineContext::default())
}

/// Parse a span of inline markup with an explicit context.
///
/// # Errors
///
/// Returns [`ParseError::Stuck`] if no rule consumes input at some position.
pub fn parse_inline_with(src: &str, ctx: InlineContext) -> ParseResult<Inlines> {
    scan_span(src, 0, ctx)
}

fn scan_span(src: &str, base: usize, ctx: InlineContext) -> ParseResult<Inlines> {
    let mut cur = Cursor::new(src, base);
    let mut out = Inlines::new();

    'scan: while !cur.eof() {
        let rest = cur.rest();
        for rule in INLINE_RULES {
            if let Some((node, len)) = rule.scan(rest, cur.pos(), ctx)?
                && len > 0
            {
                trace!("inline rule {} matched {len} bytes at {}", rule.name(), cur.pos());
                push_coalesced(&mut out, node);
                cur.bump_n(len);
                continue 'scan;
            }
        }
        return Err(ParseError::stuck(cur.pos(), cur.peek()));
    }

    Ok(out)
}

fn push_coalesced(out: &mut Inlines, node: Inline) {
    if let Inline::Text { text } = &node
        && let Some(Inline::Text { text: prev }) = out.last_mut()
    {
        prev.push_str(text);
        return;
    }
    out.push(node);
}

fn bare_link(kind: LinkKind, href: &str) -> Inline {
    Inline::Link {
        kind,
        href: href.to_string(),
        title: None,
        content: vec![Inline::text(href)],
    }
}

const fn is_word_byte(b: u8) -> bool {
    b.is_ascii_alphanumeric() || b == b'_'
}

fn scan_special(src: &str) -> Option<Match> {
    grammar::SPECIAL.captures(src).map(|caps| {
        (
            Inline::Special {
                accent: caps[1].to_string(),
                letter: caps[2].to_string(),
            },
            caps[0].len(),
        )
    })
}

fn scan_refcite(src: &str, pos: usize, ctx: InlineContext) -> ParseResult<Option<Match>> {
    let Some(caps) = grammar::REFCITE.captures(src) else {
        return Ok(None);
    };
    let kind = if &caps[1] == "@" {
        ReferenceKind::Reference
    } else {
        ReferenceKind::Citation
    };
    let args = parse_args(Some(&caps[2]), ArgMode::Reference);
    let text = match args.get_any(&["text", "txt", "t"]) {
        Some(text) => scan_span(text, pos, ctx.nested())?,
        None => Inlines::new(),
    };
    Ok(Some((Inline::Reference { kind, args, text }, caps[0].len())))
}

fn scan_internal_link(src: &str, pos: usize, ctx: InlineContext) -> ParseResult<Option<Match>> {
    let Some(caps) = grammar::INTERNAL_LINK.captures(src) else {
        return Ok(None);
    };
    let args = parse_args(Some(&caps[1]), ArgMode::Reference);
    let text = match args.get_any(&["text", "txt", "t"]) {
        Some(text) => scan_span(text, pos, ctx.nested())?,
        None => Inlines::new(),
    };
    Ok(Some((Inline::InternalLink { args, text }, caps[0].len())))
}

/// Candidate end positions of a bracketed label starting at `start`.
///
/// A label is a run of bracket-free characters, nested `[...]` groups, and
/// stray `]` characters that are followed by another `]` before any `[`.
/// Every prefix of that run is a candidate; callers want the positions where
/// the closing `]` sits.
fn label_ends(src: &str, start: usize) -> Vec<usize> {
    let b = src.as_bytes();
    let mut ends = vec![start];
    let mut cur = Cursor::at(src, start);
    while let Some(c) = cur.peek() {
        match c {
            b'[' => match b[cur.i + 1..].iter().position(|&x| x == b']') {
                Some(off) => cur.bump_n(off + 2),
                None => break,
            },
            b']' => {
                let tail = &b[cur.i + 1..];
                let closes = tail
                    .iter()
                    .find(|&&x| x == b'[' || x == b']')
                    .is_some_and(|&x| x == b']');
                if !closes {
                    break;
                }
                cur.bump_n(1);
            }
            _ => cur.bump_n(1),
        }
        ends.push(cur.i);
    }
    ends.into_iter().filter(|&e| b.get(e) == Some(&b']')).collect()
}

fn scan_footnote(src: &str, pos: usize, ctx: InlineContext) -> ParseResult<Option<Match>> {
    let (kind, open) = if src.starts_with("^![") {
        (NoteKind::Sidenote, 3)
    } else if src.starts_with("^[") {
        (NoteKind::Footnote, 2)
    } else {
        return Ok(None);
    };
    let Some(&end) = label_ends(src, open).last() else {
        return Ok(None);
    };
    let content = scan_span(&src[open..end], pos + open, ctx.nested())?;
    Ok(Some((Inline::Note { kind, content }, end + 1)))
}

fn scan_link(src: &str, pos: usize, ctx: InlineContext) -> ParseResult<Option<Match>> {
    let (image, open) = if src.starts_with("![") {
        (true, 2)
    } else if src.starts_with('[') {
        (false, 1)
    } else {
        return Ok(None);
    };

    for end in label_ends(src, open).into_iter().rev() {
        let Some(target) = grammar::LINK_TARGET.captures(&src[end + 1..]) else {
            continue;
        };
        let label = &src[open..end];
        let href = target[1].to_string();
        let title = target.get(2).map(|m| m.as_str().to_string());
        let len = end + 1 + target[0].len();
        let node = if image {
            Inline::Image {
                src: href,
                alt: label.to_string(),
                title,
            }
        } else {
            Inline::Link {
                kind: LinkKind::Explicit,
                href,
                title,
                content: scan_span(label, pos + open, ctx.inside_link().nested())?,
            }
        };
        return Ok(Some((node, len)));
    }
    Ok(None)
}

/// `__x__` or `**x**`, closing at the earliest doubled delimiter not
/// followed by a third.
fn scan_strong(src: &str, pos: usize, ctx: InlineContext) -> ParseResult<Option<Match>> {
    let b = src.as_bytes();
    let delim = match (b.first(), b.get(1)) {
        (Some(&d @ (b'_' | b'*')), Some(&e)) if d == e => d,
        _ => return Ok(None),
    };
    let close = (3..b.len().saturating_sub(1))
        .find(|&j| b[j] == delim && b[j + 1] == delim && b.get(j + 2) != Some(&delim));
    match close {
        Some(j) => {
            let content = scan_span(&src[2..j], pos + 2, ctx.nested())?;
            Ok(Some((Inline::bold(content), j + 2)))
        }
        None => Ok(None),
    }
}

fn scan_em(src: &str, pos: usize, ctx: InlineContext) -> ParseResult<Option<Match>> {
    let close = match src.as_bytes().first() {
        Some(b'_') => em_underscore_close(src),
        Some(b'*') => em_star_close(src),
        _ => None,
    };
    match close {
        Some(j) => {
            let content = scan_span(&src[1..j], pos + 1, ctx.nested())?;
            Ok(Some((Inline::italic(content), j + 1)))
        }
        None => Ok(None),
    }
}

/// `_x_` where the body is non-underscore characters or `__` pairs and the
/// closing `_` sits at a word boundary.
fn em_underscore_close(src: &str) -> Option<usize> {
    let mut cur = Cursor::at(src, 1);
    let mut tokens = 0;
    while !cur.eof() {
        if tokens > 0 && cur.peek() == Some(b'_') && !cur.peek_at(1).is_some_and(is_word_byte) {
            return Some(cur.i);
        }
        if cur.peek() != Some(b'_') {
            cur.bump_char();
        } else if cur.starts_with(b"__") {
            cur.bump_n(2);
        } else {
            return None;
        }
        tokens += 1;
    }
    None
}

/// `*x*` where the body is any characters or `**` pairs and the closing `*`
/// is not doubled. Explores token splits depth first, preferring `**`.
fn em_star_close(src: &str) -> Option<usize> {
    let b = src.as_bytes();
    let mut visited = vec![false; b.len() + 1];
    let mut stack = Vec::new();
    push_star_tokens(src, 1, &mut stack);

    while let Some(p) = stack.pop() {
        if p > b.len() || visited[p] {
            continue;
        }
        visited[p] = true;
        if b.get(p) == Some(&b'*') && b.get(p + 1) != Some(&b'*') {
            return Some(p);
        }
        push_star_tokens(src, p, &mut stack);
    }
    None
}

fn push_star_tokens(src: &str, p: usize, stack: &mut Vec<usize>) {
    let mut cur = Cursor::at(src, p);
    let double = cur.starts_with(b"**");
    if cur.bump_char().is_some() {
        stack.push(cur.i);
    }
    if double {
        stack.push(p + 2);
    }
}

/// Backtick code span closed by a run of exactly the opening length. When
/// the full opening run finds no partner, shorter openings are tried and the
/// leftover backticks become content.
fn scan_code(src: &str) -> Option<Match> {
    let run = Cursor::at(src, 0).eat_run(b'`');
    if run == 0 {
        return None;
    }

    // first closing run of each length up to `run`, in one pass
    let mut first = vec![None; run + 1];
    let mut cur = Cursor::at(src, run);
    while let Some(b) = cur.peek() {
        if b != b'`' {
            cur.bump_n(1);
            continue;
        }
        let start = cur.i;
        let len = cur.eat_run(b'`');
        if len <= run && first[len].is_none() {
            first[len] = Some(start);
            if len == run {
                break;
            }
        }
    }

    let (n, close) = (1..=run).rev().find_map(|n| first[n].map(|j| (n, j)))?;
    let inner = &src[n..close];
    let trimmed = inner.trim();
    let code = if trimmed.is_empty() {
        inner.chars().last().map(String::from).unwrap_or_default()
    } else {
        trimmed.to_string()
    };
    Some((Inline::monospace(code), close + n))
}

/// Two or more spaces and a newline, when something other than whitespace
/// follows.
fn scan_break(src: &str) -> Option<usize> {
    let mut cur = Cursor::at(src, 0);
    if cur.eat_run(b' ') < 2 || cur.peek() != Some(b'\n') {
        return None;
    }
    cur.bump_n(1);
    if cur.rest().trim().is_empty() {
        return None;
    }
    Some(cur.i)
}

fn scan_del(src: &str, pos: usize, ctx: InlineContext) -> ParseResult<Option<Match>> {
    if !src.starts_with("~~") || !src[2..].chars().next().is_some_and(|c| !c.is_whitespace()) {
        return Ok(None);
    }
    let b = src.as_bytes();
    let close = (3..b.len()).find(|&j| {
        b[j..].starts_with(b"~~")
            && src[..j].chars().next_back().is_some_and(|c| !c.is_whitespace())
    });
    match close {
        Some(j) => {
            let content = scan_span(&src[2..j], pos + 2, ctx.nested())?;
            Ok(Some((Inline::strikeout(content), j + 2)))
        }
        None => Ok(None),
    }
}

const TEXT_STOP: &[u8] = b"/\\<![_*`$^@#~";

fn text_stops_at(cur: &Cursor<'_>) -> bool {
    let Some(b) = cur.peek() else {
        return true;
    };
    if TEXT_STOP.contains(&b) || cur.starts_with(b"http://") || cur.starts_with(b"https://") {
        return true;
    }
    if b == b' ' {
        let mut ahead = cur.clone();
        return ahead.eat_run(b' ') >= 2 && ahead.peek() == Some(b'\n');
    }
    false
}

/// At least one character, up to the next position where another rule
/// could start. A backtick run is taken whole: the code rule has already
/// failed at its start, so it fails inside the run as well.
fn scan_text(src: &str) -> Option<usize> {
    let mut cur = Cursor::at(src, 0);
    if cur.eat_run(b'`') == 0 {
        cur.bump_char()?;
    }
    while !text_stops_at(&cur) {
        cur.bump_char();
    }
    Some(cur.i)
}
