//! Parser for elltwo markup
//!
//! Parsing runs in three layers:
//! - The segmenter normalizes the source and splits it into blank-line
//!   delimited chunks
//! - The block grammar classifies each chunk with an ordered rule table
//! - The inline scanner turns block text into nested inline nodes
//!
//! Every layer is a pure function of its input; unmatched syntax degrades to
//! paragraphs and plain text rather than errors.

pub mod args;
pub mod block;
pub mod cursor;
pub mod grammar;
pub mod inline;
pub mod lists;
pub mod segmenter;

pub use args::{ArgMode, parse_args};
pub use block::{BLOCK_RULES, BlockRule, classify, parse_block};
pub use inline::{
    INLINE_RULES, InlineContext, InlineRule, MAX_NESTING, parse_inline, parse_inline_with,
};
pub use lists::{parse_biblio, parse_list, parse_preamble, parse_table};
pub use segmenter::{normalize, split_chunks};

use log::debug;

use crate::error::ParseResult;
use crate::models::Document;

/// Parse a whole document.
///
/// The result holds one block per chunk, in source order, including
/// `Empty` blocks for blank chunks.
///
/// # Errors
///
/// Returns [`crate::ParseError::Stuck`] only if the inline rule table fails
/// to make progress, which no input should trigger.
pub fn parse_document(src: &str) -> ParseResult<Document> {
    let text = normalize(src);
    let blocks = split_chunks(&text)
        .map(block::parse_chunk)
        .collect::<ParseResult<Vec<_>>>()?;
    debug!("parsed {} blocks from {} bytes", blocks.len(), src.len());
    Ok(Document::new(blocks))
}
