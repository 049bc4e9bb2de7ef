//! Block grammar: an ordered table of chunk-level rules.
//!
//! Each chunk is tested against [`BLOCK_RULES`] in order and the first rule
//! that matches builds the block. `Paragraph` accepts anything, so every
//! chunk yields a block.

use log::debug;
use regex::Captures;

use super::args::{ArgMode, parse_args};
use super::grammar;
use super::inline::parse_inline;
use super::lists::{parse_list, parse_preamble, parse_table};
use super::segmenter::normalize;
use crate::error::ParseResult;
use crate::models::{Args, Block, Figure, FigureKind, Inlines};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BlockRule {
    Empty,
    Equation,
    Figure,
    FigureTable,
    Upload,
    Image,
    Comment,
    Code,
    Title,
    Heading,
    EnvBegin,
    EnvEnd,
    SetextHeading,
    Rule,
    Blockquote,
    List,
    Table,
    Paragraph,
}

/// Rule priority, highest first.
pub const BLOCK_RULES: [BlockRule; 18] = [
    BlockRule::Empty,
    BlockRule::Equation,
    BlockRule::Figure,
    BlockRule::FigureTable,
    BlockRule::Upload,
    BlockRule::Image,
    BlockRule::Comment,
    BlockRule::Code,
    BlockRule::Title,
    BlockRule::Heading,
    BlockRule::EnvBegin,
    BlockRule::EnvEnd,
    BlockRule::SetextHeading,
    BlockRule::Rule,
    BlockRule::Blockquote,
    BlockRule::List,
    BlockRule::Table,
    BlockRule::Paragraph,
];

/// Prefix flags such as `*`, `&` or `!*`, tested by membership.
#[derive(Debug, Clone, Copy, Default)]
struct Flags<'a>(&'a str);

impl<'a> Flags<'a> {
    fn from_group(caps: &Captures<'a>, group: usize) -> Self {
        Self(caps.get(group).map_or("", |m| m.as_str()))
    }

    fn has(self, flag: char) -> bool {
        self.0.contains(flag)
    }
}

fn group<'a>(caps: &Captures<'a>, index: usize) -> Option<&'a str> {
    caps.get(index).map(|m| m.as_str())
}

fn block_args(caps: &Captures<'_>, index: usize) -> Args {
    parse_args(group(caps, index), ArgMode::Block)
}

/// Text following the rule's matched prefix.
fn remainder<'a>(src: &'a str, caps: &Captures<'_>) -> &'a str {
    &src[caps[0].len()..]
}

fn caption(args: &Args) -> ParseResult<Option<Inlines>> {
    args.get("caption").map(parse_inline).transpose()
}

/// Remove a closing `$$` (and whitespace around it) unless it is escaped.
fn strip_closing_dollars(body: &str) -> &str {
    let trimmed = body.trim_end();
    match trimmed.strip_suffix("$$") {
        Some(inner) if !inner.ends_with('\\') => inner.trim_end(),
        _ => body,
    }
}

impl BlockRule {
    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            Self::Empty => "empty",
            Self::Equation => "equation",
            Self::Figure => "figure",
            Self::FigureTable => "figtab",
            Self::Upload => "upload",
            Self::Image => "image",
            Self::Comment => "comment",
            Self::Code => "code",
            Self::Title => "title",
            Self::Heading => "heading",
            Self::EnvBegin => "envbeg",
            Self::EnvEnd => "envend",
            Self::SetextHeading => "lheading",
            Self::Rule => "hrule",
            Self::Blockquote => "blockquote",
            Self::List => "list",
            Self::Table => "table",
            Self::Paragraph => "paragraph",
        }
    }

    /// Whether this rule's pattern accepts the chunk, regardless of priority.
    #[must_use]
    pub fn matches(self, src: &str) -> bool {
        match self {
            Self::Empty => grammar::EMPTY.is_match(src),
            Self::Equation => grammar::EQUATION.is_match(src),
            Self::Figure => grammar::FIGURE.is_match(src),
            Self::FigureTable => grammar::FIGURE_TABLE.is_match(src),
            Self::Upload => grammar::UPLOAD.is_match(src),
            Self::Image => grammar::IMAGE.is_match(src),
            Self::Comment => grammar::COMMENT.is_match(src),
            Self::Code => grammar::CODE.is_match(src),
            Self::Title => grammar::TITLE.is_match(src),
            Self::Heading => grammar::HEADING.is_match(src),
            Self::EnvBegin => grammar::ENV_BEGIN.is_match(src),
            Self::EnvEnd => grammar::ENV_END.is_match(src),
            Self::SetextHeading => grammar::SETEXT_HEADING.is_match(src),
            Self::Rule => grammar::RULE.is_match(src),
            Self::Blockquote => grammar::BLOCKQUOTE.is_match(src),
            Self::List => grammar::LIST.is_match(src),
            Self::Table => grammar::PIPE_TABLE.is_match(src),
            Self::Paragraph => true,
        }
    }

    /// Build the block for `src` if this rule matches.
    fn apply(self, src: &str) -> ParseResult<Option<Block>> {
        match self {
            Self::Empty => Ok(self.matches(src).then_some(Block::Empty)),
            Self::Equation => equation(src),
            Self::Figure => figure(src),
            Self::FigureTable => figure_table(src),
            Self::Upload => Ok(upload(src)),
            Self::Image => image(src),
            Self::Comment => Ok(grammar::COMMENT.captures(src).map(|caps| Block::Comment {
                text: remainder(src, &caps).to_string(),
            })),
            Self::Code => Ok(code(src)),
            Self::Title => title(src),
            Self::Heading => heading(src),
            Self::EnvBegin => env_begin(src),
            Self::EnvEnd => match grammar::ENV_END.captures(src) {
                Some(caps) => Ok(Some(Block::EnvEnd {
                    content: parse_inline(remainder(src, &caps))?,
                })),
                None => Ok(None),
            },
            Self::SetextHeading => setext_heading(src),
            Self::Rule => Ok(self.matches(src).then_some(Block::Rule)),
            Self::Blockquote => match grammar::BLOCKQUOTE.captures(src) {
                Some(caps) => Ok(Some(Block::Blockquote {
                    content: parse_inline(remainder(src, &caps))?,
                })),
                None => Ok(None),
            },
            Self::List => match grammar::LIST.captures(src) {
                Some(caps) => parse_list(&caps[1]).map(Some),
                None => Ok(None),
            },
            Self::Table => match grammar::PIPE_TABLE.captures(src) {
                Some(caps) => Ok(Some(Block::Table {
                    table: parse_table(&caps[1], &caps[2], &caps[3])?,
                })),
                None => Ok(None),
            },
            Self::Paragraph => Ok(Some(Block::Paragraph {
                content: parse_inline(src)?,
            })),
        }
    }
}

fn equation(src: &str) -> ParseResult<Option<Block>> {
    let Some(caps) = grammar::EQUATION.captures(src) else {
        return Ok(None);
    };
    let flags = Flags::from_group(&caps, 1);
    Ok(Some(Block::Equation {
        tex: strip_closing_dollars(remainder(src, &caps)).to_string(),
        numbered: !flags.has('*'),
        multiline: flags.has('&'),
        args: block_args(&caps, 2),
    }))
}

fn figure(src: &str) -> ParseResult<Option<Block>> {
    let Some(caps) = grammar::FIGURE.captures(src) else {
        return Ok(None);
    };
    let code = remainder(src, &caps).to_string();
    let kind = if &caps[1] == "gum" {
        FigureKind::Gum { code }
    } else {
        FigureKind::Svg { code }
    };
    let args = block_args(&caps, 3);
    Ok(Some(Block::Figure {
        figure: Figure {
            kind,
            numbered: caps.get(2).is_none(),
            caption: caption(&args)?,
            args,
        },
    }))
}

fn figure_table(src: &str) -> ParseResult<Option<Block>> {
    let Some(caps) = grammar::FIGURE_TABLE.captures(src) else {
        return Ok(None);
    };
    let table = parse_table(&caps[3], &caps[4], &caps[5])?;
    let args = block_args(&caps, 2);
    Ok(Some(Block::Figure {
        figure: Figure {
            kind: FigureKind::Table { table },
            numbered: caps.get(1).is_none(),
            caption: caption(&args)?,
            args,
        },
    }))
}

fn upload(src: &str) -> Option<Block> {
    let caps = grammar::UPLOAD.captures(src)?;
    let args = block_args(&caps, 2);
    Some(Block::Upload {
        id: args.id().map(str::to_string),
        gum: caps.get(1).is_some(),
        args,
    })
}

fn image(src: &str) -> ParseResult<Option<Block>> {
    let Some(caps) = grammar::IMAGE.captures(src) else {
        return Ok(None);
    };
    let src_url = group(&caps, 4)
        .filter(|href| !href.is_empty())
        .map(str::to_string);
    let title = group(&caps, 5).map(str::to_string);
    let kind = if caps.get(1).is_some() {
        FigureKind::Video {
            src: src_url,
            title,
        }
    } else {
        FigureKind::Image {
            src: src_url,
            title,
        }
    };
    let args = block_args(&caps, 3);
    Ok(Some(Block::Figure {
        figure: Figure {
            kind,
            numbered: caps.get(2).is_none(),
            caption: caption(&args)?,
            args,
        },
    }))
}

fn code(src: &str) -> Option<Block> {
    let caps = grammar::CODE.captures(src)?;
    Some(Block::Code {
        code: remainder(src, &caps).to_string(),
        numbered: caps.get(1).is_none(),
        args: block_args(&caps, 2),
    })
}

fn title(src: &str) -> ParseResult<Option<Block>> {
    let Some(caps) = grammar::TITLE.captures(src) else {
        return Ok(None);
    };
    Ok(Some(Block::Title {
        content: parse_inline(&caps[2])?,
        preamble: parse_preamble(remainder(src, &caps)),
        args: block_args(&caps, 1),
    }))
}

fn heading(src: &str) -> ParseResult<Option<Block>> {
    let Some(caps) = grammar::HEADING.captures(src) else {
        return Ok(None);
    };
    Ok(Some(Block::Heading {
        level: u8::try_from(caps[1].len()).unwrap_or(6),
        numbered: !caps[2].is_empty(),
        content: parse_inline(&caps[4])?,
        args: block_args(&caps, 3),
    }))
}

fn env_begin(src: &str) -> ParseResult<Option<Block>> {
    let Some(caps) = grammar::ENV_BEGIN.captures(src) else {
        return Ok(None);
    };
    let flags = Flags::from_group(&caps, 1);
    let env = caps[2].to_string();
    let numbered = !flags.has('*');
    let content = parse_inline(remainder(src, &caps))?;
    let args = block_args(&caps, 3);
    Ok(Some(if flags.has('!') {
        Block::EnvSingle {
            env,
            numbered,
            content,
            args,
        }
    } else {
        Block::EnvBegin {
            env,
            numbered,
            content,
            args,
        }
    }))
}

fn setext_heading(src: &str) -> ParseResult<Option<Block>> {
    let Some(caps) = grammar::SETEXT_HEADING.captures(src) else {
        return Ok(None);
    };
    Ok(Some(Block::Heading {
        level: if &caps[2] == "=" { 1 } else { 2 },
        numbered: false,
        content: parse_inline(&caps[1])?,
        args: Args::default(),
    }))
}

/// Classify an already-normalized chunk.
pub(crate) fn parse_chunk(src: &str) -> ParseResult<Block> {
    for rule in BLOCK_RULES {
        if let Some(block) = rule.apply(src)? {
            debug!("block rule {} matched {} bytes", rule.name(), src.len());
            return Ok(block);
        }
    }
    Ok(Block::Paragraph {
        content: parse_inline(src)?,
    })
}

/// Parse a single chunk of source into a block.
///
/// The chunk is normalized first, so callers may pass raw editor text.
///
/// # Errors
///
/// Returns [`crate::ParseError::Stuck`] if the inline scanner cannot make
/// progress, which indicates a defect in the rule tables.
pub fn parse_block(src: &str) -> ParseResult<Block> {
    parse_chunk(&normalize(src))
}

/// The rule that would classify `src`.
#[must_use]
pub fn classify(src: &str) -> BlockRule {
    BLOCK_RULES
        .into_iter()
        .find(|rule| rule.matches(src))
        .unwrap_or(BlockRule::Paragraph)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::Inline;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_strip_closing_dollars() {
        assert_eq!(strip_closing_dollars("x=y $$"), "x=y");
        assert_eq!(strip_closing_dollars("x=y$$\n"), "x=y");
        assert_eq!(strip_closing_dollars(r"x=\$$"), r"x=\$$");
        assert_eq!(strip_closing_dollars("x=y"), "x=y");
    }

    #[test]
    fn test_equation_block() {
        let block = parse_block("$$[id=eq1]\nx=y$$").unwrap();
        assert_eq!(
            block,
            Block::Equation {
                tex: "x=y".to_string(),
                numbered: true,
                multiline: false,
                args: [("id", "eq1")].into_iter().collect(),
            }
        );
    }

    #[test]
    fn test_equation_combined_flags() {
        let Block::Equation {
            numbered,
            multiline,
            ..
        } = parse_block("$$*& a &= b").unwrap()
        else {
            panic!("expected equation");
        };
        assert!(!numbered);
        assert!(multiline);
    }

    #[test]
    fn test_heading_numbering_is_opt_in() {
        let Block::Heading { numbered, .. } = parse_block("## Plain").unwrap() else {
            panic!("expected heading");
        };
        assert!(!numbered);
        let Block::Heading { numbered, level, .. } = parse_block("##* Numbered").unwrap() else {
            panic!("expected heading");
        };
        assert!(numbered);
        assert_eq!(level, 2);
    }

    #[test]
    fn test_env_single_flag() {
        let block = parse_block(">>! proof Trivial.").unwrap();
        assert_eq!(
            block,
            Block::EnvSingle {
                env: "proof".to_string(),
                numbered: true,
                content: vec![Inline::text("Trivial.")],
                args: Args::default(),
            }
        );
    }

    #[test]
    fn test_classify_prefers_earlier_rule() {
        assert!(BlockRule::Paragraph.matches("---"));
        assert!(BlockRule::Rule.matches("---"));
        assert_eq!(classify("---"), BlockRule::Rule);
        assert_eq!(classify("!!"), BlockRule::Upload);
        assert_eq!(classify(""), BlockRule::Empty);
    }

    #[test]
    fn test_code_block_keeps_body_raw() {
        let block = parse_block("``[lang=rust]\nfn main() { *x* }").unwrap();
        assert_eq!(
            block,
            Block::Code {
                code: "fn main() { *x* }".to_string(),
                numbered: true,
                args: [("lang", "rust")].into_iter().collect(),
            }
        );
    }
}
