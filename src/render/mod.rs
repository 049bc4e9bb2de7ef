//! Rendering contract and injectable collaborators.
//!
//! A renderer turns parsed blocks into a target string. Math, graphics and
//! upload lookups are delegated to collaborators held in a
//! [`RenderContext`], so the renderers never depend on a particular TeX
//! engine or graphics backend.

pub mod escape;
pub mod html;
pub mod latex;

pub use html::HtmlRenderer;
pub use latex::LatexRenderer;

use std::fmt;

use crate::config::RenderConfig;
use crate::document::numbering::{Numbering, number_document};
use crate::error::{RenderError, RenderResult};
use crate::models::{Args, Block, Document, Inline};

/// Turns TeX source into target markup.
pub trait MathRenderer: Send + Sync {
    fn render_tex(&self, tex: &str, display: bool) -> String;
}

/// Turns graphics-DSL source into markup, or reports why it could not.
pub trait GraphicsRenderer: Send + Sync {
    /// # Errors
    ///
    /// Returns the collaborator's own failure for malformed source.
    fn render_graphic(&self, code: &str, hints: &SizeHints) -> RenderResult<String>;
}

/// Looks up uploaded binary data by key.
pub trait UploadResolver: Send + Sync {
    fn resolve(&self, key: &str) -> Option<Vec<u8>>;
}

/// Size arguments forwarded to the graphics collaborator.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SizeHints {
    /// Width as a percentage of the text column
    pub width: u32,
    /// Pixel size of the drawing canvas, if given
    pub pixel: Option<u32>,
}

impl SizeHints {
    #[must_use]
    pub fn from_args(args: &Args, default_width: u32) -> Self {
        Self {
            width: args
                .get("width")
                .and_then(|w| w.trim().parse().ok())
                .unwrap_or(default_width),
            pixel: args.get("pixel").and_then(|p| p.trim().parse().ok()),
        }
    }
}

/// Leaves TeX to a client-side engine: escaped source inside `\(..\)` or
/// `\[..\]`.
#[derive(Debug, Default, Clone, Copy)]
pub struct PassthroughMath;

impl MathRenderer for PassthroughMath {
    fn render_tex(&self, tex: &str, display: bool) -> String {
        let tex = escape::escape_html(tex);
        if display {
            format!("\\[{tex}\\]")
        } else {
            format!("\\({tex}\\)")
        }
    }
}

/// Rejects every graphic; figures render as error elements.
#[derive(Debug, Default, Clone, Copy)]
pub struct NoGraphics;

impl GraphicsRenderer for NoGraphics {
    fn render_graphic(&self, _code: &str, _hints: &SizeHints) -> RenderResult<String> {
        Err(RenderError::graphics("no graphics renderer configured"))
    }
}

#[derive(Debug, Default, Clone, Copy)]
pub struct NoUploads;

impl UploadResolver for NoUploads {
    fn resolve(&self, _key: &str) -> Option<Vec<u8>> {
        None
    }
}

/// Configuration plus collaborators shared by the renderers.
pub struct RenderContext {
    pub config: RenderConfig,
    pub math: Box<dyn MathRenderer>,
    pub graphics: Box<dyn GraphicsRenderer>,
    pub uploads: Box<dyn UploadResolver>,
}

impl RenderContext {
    #[must_use]
    pub fn new(config: RenderConfig) -> Self {
        Self {
            config,
            math: Box::new(PassthroughMath),
            graphics: Box::new(NoGraphics),
            uploads: Box::new(NoUploads),
        }
    }

    #[must_use]
    pub fn with_math(mut self, math: impl MathRenderer + 'static) -> Self {
        self.math = Box::new(math);
        self
    }

    #[must_use]
    pub fn with_graphics(mut self, graphics: impl GraphicsRenderer + 'static) -> Self {
        self.graphics = Box::new(graphics);
        self
    }

    #[must_use]
    pub fn with_uploads(mut self, uploads: impl UploadResolver + 'static) -> Self {
        self.uploads = Box::new(uploads);
        self
    }
}

impl Default for RenderContext {
    fn default() -> Self {
        Self::new(RenderConfig::default())
    }
}

impl fmt::Debug for RenderContext {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RenderContext")
            .field("config", &self.config)
            .finish_non_exhaustive()
    }
}

/// Per-document state while rendering blocks in order.
#[derive(Debug)]
pub struct RenderState<'a> {
    pub numbering: &'a Numbering,
    /// Index of the block being rendered
    pub index: usize,
    footnotes: u32,
    envs: Vec<String>,
}

impl<'a> RenderState<'a> {
    #[must_use]
    pub const fn new(numbering: &'a Numbering) -> Self {
        Self {
            numbering,
            index: 0,
            footnotes: 0,
            envs: Vec::new(),
        }
    }

    /// Number of the current block, if it is numbered.
    #[must_use]
    pub fn number(&self) -> Option<&'a str> {
        self.numbering.block_number(self.index)
    }

    fn next_footnote(&mut self) -> u32 {
        self.footnotes += 1;
        self.footnotes
    }

    fn open_env(&mut self, env: &str) {
        self.envs.push(env.to_string());
    }

    fn close_env(&mut self) -> Option<String> {
        self.envs.pop()
    }
}

/// Text shown for a reference without explicit text: `Figure 2`, or the
/// bare number with `format=plain`.
fn reference_label(args: &Args, numbering: &Numbering) -> Option<String> {
    let label = numbering.label(args.id()?)?;
    Some(if args.get("format") == Some("plain") {
        label.number.clone()
    } else {
        label.describe()
    })
}

/// A render target.
pub trait Render {
    fn render_block(&self, block: &Block, state: &mut RenderState<'_>) -> String;

    fn render_inlines(&self, inlines: &[Inline], state: &mut RenderState<'_>) -> String;

    /// Render every block, numbering the document first. Blocks that render
    /// to nothing (such as `Empty`) are skipped.
    fn render_document(&self, doc: &Document) -> String {
        let numbering = number_document(doc);
        let mut state = RenderState::new(&numbering);
        let mut parts = Vec::new();
        for (index, block) in doc.iter().enumerate() {
            state.index = index;
            let out = self.render_block(block, &mut state);
            if !out.is_empty() {
                parts.push(out);
            }
        }
        parts.join("\n")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_size_hints_from_args() {
        let args: Args = [("width", "70"), ("pixel", "300")].into_iter().collect();
        assert_eq!(
            SizeHints::from_args(&args, 50),
            SizeHints {
                width: 70,
                pixel: Some(300)
            }
        );
        let args: Args = [("width", "wide")].into_iter().collect();
        assert_eq!(SizeHints::from_args(&args, 50).width, 50);
    }

    #[test]
    fn test_passthrough_math() {
        assert_eq!(PassthroughMath.render_tex("a<b", false), "\\(a&lt;b\\)");
        assert_eq!(PassthroughMath.render_tex("x", true), "\\[x\\]");
    }

    #[test]
    fn test_default_collaborators() {
        let ctx = RenderContext::default();
        assert!(ctx.graphics.render_graphic("", &SizeHints::from_args(&Args::default(), 50)).is_err());
        assert!(ctx.uploads.resolve("key").is_none());
    }

    #[test]
    fn test_reference_label_formats() {
        let doc = crate::parser::parse_document("$$[eq1] x $$").unwrap();
        let numbering = number_document(&doc);
        let args: Args = [("id", "eq1")].into_iter().collect();
        assert_eq!(reference_label(&args, &numbering).as_deref(), Some("Equation 1"));
        let args: Args = [("id", "eq1"), ("format", "plain")].into_iter().collect();
        assert_eq!(reference_label(&args, &numbering).as_deref(), Some("1"));
    }
}
