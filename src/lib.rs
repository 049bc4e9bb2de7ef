#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]

uniffi::setup_scaffolding!();

pub mod config;
pub mod document;
pub mod error;
pub mod ffi;
pub mod formats;
pub mod models;
pub mod parser;
pub mod render;

// Re-export common error types for convenience
pub use error::{
    ConfigError, ConfigResult, ElltwoError, ElltwoResult, ParseError, ParseResult, RenderError,
    RenderResult, SerializationError, SerializationResult,
};

pub use config::RenderConfig;
pub use models::{Block, Document, Inline};
pub use parser::{parse_block, parse_document, parse_inline};
pub use render::{HtmlRenderer, LatexRenderer, Render, RenderContext};
