//! `UniFFI` bindings for the elltwo parser and renderers
//!
//! Exposes a stateful [`ElltwoDocument`] handle plus one-shot helpers so
//! editors on other platforms (iOS, Android, Python, etc.) can parse and
//! render markup without linking against the Rust API directly.
#![allow(
    clippy::cast_possible_truncation,
    clippy::missing_panics_doc,
    clippy::needless_pass_by_value
)]

use std::sync::{Mutex, MutexGuard, PoisonError};

use log::debug;

use crate::config::RenderConfig;
use crate::error::ElltwoError;
use crate::formats::{CborFormat, DocumentFormat};
use crate::models::{Block, Document};
use crate::parser::{parse_block, parse_document};
use crate::render::{HtmlRenderer, LatexRenderer, Render, RenderContext};

/// A parsed document held across calls
#[derive(uniffi::Object)]
pub struct ElltwoDocument {
    document: Mutex<Document>,
    config: Mutex<RenderConfig>,
}

impl ElltwoDocument {
    fn document(&self) -> MutexGuard<'_, Document> {
        self.document.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn context(&self) -> RenderContext {
        let config = self.config.lock().unwrap_or_else(PoisonError::into_inner);
        RenderContext::new(config.clone())
    }
}

#[uniffi::export]
impl ElltwoDocument {
    /// Create an empty document with default render settings
    #[uniffi::constructor]
    #[must_use]
    pub fn new() -> Self {
        Self {
            document: Mutex::new(Document::default()),
            config: Mutex::new(RenderConfig::default()),
        }
    }

    /// Replace the render settings from TOML text
    ///
    /// # Errors
    ///
    /// Returns an error if the TOML is malformed
    pub fn configure(&self, text: String) -> Result<(), ElltwoError> {
        let config = RenderConfig::from_toml_str(&text)?;
        *self.config.lock().unwrap_or_else(PoisonError::into_inner) = config;
        Ok(())
    }

    /// Parse a document from raw text, replacing the current blocks
    ///
    /// # Errors
    ///
    /// Returns an error if the inline scanner gets stuck
    pub fn parse(&self, text: &str) -> Result<u32, ElltwoError> {
        let parsed = parse_document(text)?;
        let count = parsed.len() as u32;
        debug!("ffi parse produced {count} blocks");
        *self.document() = parsed;
        Ok(count)
    }

    /// Get total number of blocks
    pub fn block_count(&self) -> u32 {
        self.document().len() as u32
    }

    /// Get a block at the given index
    pub fn get_block(&self, index: u32) -> Option<Block> {
        self.document().blocks.get(index as usize).cloned()
    }

    /// Get all blocks
    pub fn blocks(&self) -> Vec<Block> {
        self.document().blocks.clone()
    }

    /// Re-parse one block from edited chunk text
    ///
    /// # Errors
    ///
    /// Returns an error if the index is out of range or parsing fails
    pub fn update_block(&self, index: u32, text: String) -> Result<(), ElltwoError> {
        let block = parse_block(&text)?;
        let mut document = self.document();
        let slot = document
            .blocks
            .get_mut(index as usize)
            .ok_or(ElltwoError::InvalidIndex(index))?;
        *slot = block;
        Ok(())
    }

    /// Render the whole document as HTML
    pub fn render_html(&self) -> String {
        HtmlRenderer::new(self.context()).render_document(&self.document())
    }

    /// Render the whole document as a LaTeX body
    pub fn render_latex(&self) -> String {
        LatexRenderer::new(self.context()).render_document(&self.document())
    }

    /// Encode the document as CBOR
    ///
    /// # Errors
    ///
    /// Returns an error if encoding fails
    pub fn to_cbor(&self) -> Result<Vec<u8>, ElltwoError> {
        Ok(CborFormat.serialize(&self.document())?)
    }

    /// Replace the document with one decoded from CBOR
    ///
    /// # Errors
    ///
    /// Returns an error for malformed input
    pub fn load_cbor(&self, data: Vec<u8>) -> Result<u32, ElltwoError> {
        let decoded = CborFormat.deserialize(&data)?;
        let count = decoded.len() as u32;
        *self.document() = decoded;
        Ok(count)
    }
}

impl Default for ElltwoDocument {
    fn default() -> Self {
        Self::new()
    }
}

/// Parse markup into a document in one call
///
/// # Errors
///
/// Returns an error if the inline scanner gets stuck
#[uniffi::export]
pub fn parse_markup(text: &str) -> Result<Document, ElltwoError> {
    Ok(parse_document(text)?)
}

/// Parse markup and render it as HTML with default settings
///
/// # Errors
///
/// Returns an error if the inline scanner gets stuck
#[uniffi::export]
pub fn render_markup_html(text: &str) -> Result<String, ElltwoError> {
    let doc = parse_document(text)?;
    Ok(HtmlRenderer::default().render_document(&doc))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_and_query() {
        let doc = ElltwoDocument::new();
        assert_eq!(doc.parse("# Title\n\nbody text").unwrap(), 2);
        assert_eq!(doc.block_count(), 2);
        assert!(doc.get_block(0).unwrap().is_heading());
        assert!(doc.get_block(5).is_none());
    }

    #[test]
    fn test_update_block() {
        let doc = ElltwoDocument::new();
        doc.parse("first\n\nsecond").unwrap();
        doc.update_block(1, "---".to_string()).unwrap();
        assert!(doc.blocks()[1].is_rule());
        assert!(matches!(
            doc.update_block(9, "x".to_string()),
            Err(ElltwoError::InvalidIndex(9))
        ));
    }

    #[test]
    fn test_configure_changes_output() {
        let doc = ElltwoDocument::new();
        doc.parse("---").unwrap();
        doc.configure("class_prefix = \"x-\"".to_string()).unwrap();
        assert!(doc.render_html().contains("x-rule-block"));
        assert!(doc.configure("class_prefix = [".to_string()).is_err());
    }

    #[test]
    fn test_cbor_roundtrip_through_handle() {
        let doc = ElltwoDocument::new();
        doc.parse("#* A\n\n$$ x $$").unwrap();
        let bytes = doc.to_cbor().unwrap();
        let other = ElltwoDocument::default();
        assert_eq!(other.load_cbor(bytes).unwrap(), 2);
        assert_eq!(other.render_latex(), doc.render_latex());
    }

    #[test]
    fn test_one_shot_helpers() {
        assert_eq!(parse_markup("a\n\nb").unwrap().len(), 2);
        assert!(render_markup_html("**hi**").unwrap().contains("bold-inline"));
    }
}
