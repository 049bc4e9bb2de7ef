//! Inline scanner behaviour through the public entry points.

use elltwo::models::{Inline, LinkKind, NoteKind, ReferenceKind};
use elltwo::parser::{InlineContext, parse_inline, parse_inline_with};
use pretty_assertions::assert_eq;
use rstest::rstest;

fn text(s: &str) -> Inline {
    Inline::text(s)
}

#[rstest]
#[case("plain", vec![text("plain")])]
#[case("**bold**", vec![Inline::bold(vec![text("bold")])])]
#[case("**a*b**", vec![Inline::bold(vec![text("a*b")])])]
#[case("_em_", vec![Inline::italic(vec![text("em")])])]
#[case("~~gone~~", vec![Inline::strikeout(vec![text("gone")])])]
#[case("a `code` b", vec![text("a "), Inline::monospace("code"), text(" b")])]
#[case("``a`", vec![Inline::monospace("`a")])]
#[case("$x^2$", vec![Inline::math("x^2")])]
#[case(r"\*not em\*", vec![
    Inline::Escape { text: "*".to_string() },
    text("not em"),
    Inline::Escape { text: "*".to_string() },
])]
#[case("#rust", vec![Inline::Hash { tag: "rust".to_string() }])]
#[case("#[two words]", vec![Inline::Hash { tag: "two words".to_string() }])]
fn test_inline_cases(#[case] src: &str, #[case] expected: Vec<Inline>) {
    assert_eq!(parse_inline(src).unwrap(), expected);
}

#[test]
fn test_bare_url() {
    assert_eq!(
        parse_inline("see https://example.org.").unwrap(),
        vec![
            text("see "),
            Inline::Link {
                kind: LinkKind::Url,
                href: "https://example.org".to_string(),
                title: None,
                content: vec![text("https://example.org")],
            },
            text("."),
        ]
    );
}

#[test]
fn test_explicit_link_label_is_parsed() {
    assert_eq!(
        parse_inline("[**x**](/a)").unwrap(),
        vec![Inline::Link {
            kind: LinkKind::Explicit,
            href: "/a".to_string(),
            title: None,
            content: vec![Inline::bold(vec![text("x")])],
        }]
    );
}

#[test]
fn test_references_and_citations() {
    let nodes = parse_inline("@[eq1] @@[knuth|text=Knuth]").unwrap();
    let Inline::Reference { kind, args, text: shown } = &nodes[0] else {
        panic!("expected a reference");
    };
    assert_eq!(*kind, ReferenceKind::Reference);
    assert_eq!(args.id(), Some("eq1"));
    assert!(shown.is_empty());

    let Inline::Reference { kind, args, text: shown } = &nodes[2] else {
        panic!("expected a citation");
    };
    assert_eq!(*kind, ReferenceKind::Citation);
    assert_eq!(args.id(), Some("knuth"));
    assert_eq!(shown, &vec![text("Knuth")]);
}

#[test]
fn test_footnote_and_sidenote() {
    assert_eq!(
        parse_inline("^[foot] ^![side]").unwrap(),
        vec![
            Inline::Note {
                kind: NoteKind::Footnote,
                content: vec![text("foot")],
            },
            text(" "),
            Inline::Note {
                kind: NoteKind::Sidenote,
                content: vec![text("side")],
            },
        ]
    );
}

#[test]
fn test_internal_link() {
    let nodes = parse_inline("[[intro]]").unwrap();
    let [Inline::InternalLink { args, text: shown }] = nodes.as_slice() else {
        panic!("expected one internal link");
    };
    assert_eq!(args.id(), Some("intro"));
    assert!(shown.is_empty());
}

#[test]
fn test_line_break_needs_following_content() {
    assert_eq!(
        parse_inline("a  \nb").unwrap(),
        vec![text("a"), Inline::Newline, text("b")]
    );
}

#[test]
fn test_link_context_suppresses_bare_urls() {
    let ctx = InlineContext {
        in_link: true,
        ..InlineContext::default()
    };
    let nodes = parse_inline_with("see https://example.org/a.", ctx).unwrap();
    assert_eq!(nodes, vec![text("see https://example.org/a.")]);
}

#[test]
fn test_link_label_keeps_url_text() {
    assert_eq!(
        parse_inline("[https://a.org/x](https://a.org/x)").unwrap(),
        vec![Inline::Link {
            kind: LinkKind::Explicit,
            href: "https://a.org/x".to_string(),
            title: None,
            content: vec![text("https://a.org/x")],
        }]
    );
}

#[test]
fn test_long_star_run_parses() {
    let src = format!("x {}", "*".repeat(10_000));
    assert!(parse_inline(&src).is_ok());
}

#[test]
fn test_unclosed_delimiters_fall_back_to_text() {
    assert_eq!(parse_inline("**open").unwrap(), vec![text("**open")]);
    assert_eq!(parse_inline("$5").unwrap(), vec![text("$5")]);
}
