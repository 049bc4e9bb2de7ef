use log::warn;

use super::escape::{escape_html, special_html};
use super::{Render, RenderContext, RenderState, SizeHints, reference_label};
use crate::error::RenderError;
use crate::models::{
    Alignment, Block, Figure, FigureKind, Inline, LinkKind, ListItem, NoteKind, ReferenceKind,
    Table,
};

/// HTML output using the elltwo element classes.
#[derive(Debug, Default)]
pub struct HtmlRenderer {
    ctx: RenderContext,
}

fn id_attr(id: Option<&str>) -> String {
    id.map(|id| format!(r#" id="{}""#, escape_html(id)))
        .unwrap_or_default()
}

const fn align_css(align: Option<Alignment>) -> &'static str {
    match align {
        Some(Alignment::Left) => r#" style="text-align: left""#,
        Some(Alignment::Center) => r#" style="text-align: center""#,
        Some(Alignment::Right) => r#" style="text-align: right""#,
        None => "",
    }
}

impl HtmlRenderer {
    #[must_use]
    pub const fn new(ctx: RenderContext) -> Self {
        Self { ctx }
    }

    #[must_use]
    pub const fn context(&self) -> &RenderContext {
        &self.ctx
    }

    fn classes(&self, classes: &str) -> String {
        classes
            .split_whitespace()
            .map(|class| self.ctx.config.class(class))
            .collect::<Vec<_>>()
            .join(" ")
    }

    fn span(&self, classes: &str, inner: &str) -> String {
        format!(r#"<span class="{}">{inner}</span>"#, self.classes(classes))
    }

    fn div(&self, classes: &str, id: Option<&str>, inner: &str) -> String {
        format!(
            r#"<div class="{}"{}>{inner}</div>"#,
            self.classes(classes),
            id_attr(id)
        )
    }

    fn number_span(&self, class: &str, number: Option<&str>, wrap: (&str, &str)) -> String {
        number
            .map(|n| self.span(class, &format!("{}{}{}", wrap.0, escape_html(n), wrap.1)))
            .unwrap_or_default()
    }

    fn list(&self, ordered: bool, items: &[ListItem], state: &mut RenderState<'_>) -> String {
        let tag = if ordered { "ol" } else { "ul" };
        let items: String = items
            .iter()
            .map(|item| {
                format!(
                    r#"<li class="{}" data-indent="{}">{}</li>"#,
                    self.classes("list-item"),
                    item.indent,
                    self.render_inlines(&item.content, state)
                )
            })
            .collect();
        format!("<{tag}>{items}</{tag}>")
    }

    fn table(&self, table: &Table, state: &mut RenderState<'_>) -> String {
        let mut out = String::from("<table><thead><tr>");
        for (i, cell) in table.header.iter().enumerate() {
            let align = align_css(table.align.get(i).copied().flatten());
            out.push_str(&format!("<th{align}>{}</th>", self.render_inlines(cell, state)));
        }
        out.push_str("</tr></thead><tbody>");
        for row in &table.rows {
            out.push_str("<tr>");
            for (i, cell) in row.iter().enumerate() {
                let align = align_css(table.align.get(i).copied().flatten());
                out.push_str(&format!("<td{align}>{}</td>", self.render_inlines(cell, state)));
            }
            out.push_str("</tr>");
        }
        out.push_str("</tbody></table>");
        out
    }

    /// Resolve an image source: URLs and paths pass through, bare keys go
    /// through the upload resolver.
    fn image_src(&self, src: &str) -> Result<String, RenderError> {
        if src.contains('/') || src.contains(':') {
            return Ok(src.to_string());
        }
        match self.ctx.uploads.resolve(src) {
            Some(_) => Ok(format!("{}{src}", self.ctx.config.image_base)),
            None => Err(RenderError::missing_upload(src)),
        }
    }

    fn figure(&self, figure: &Figure, id: Option<&str>, state: &mut RenderState<'_>) -> String {
        let hints = SizeHints::from_args(&figure.args, self.ctx.config.figure_width);
        let sizer = |class: &str, inner: &str| {
            format!(
                r#"<div class="{}" style="width: {}%">{inner}</div>"#,
                self.classes(class),
                hints.width
            )
        };

        let (kind_class, body) = match &figure.kind {
            FigureKind::Svg { code } => ("svg-block".to_string(), sizer("svg-sizer", code)),
            FigureKind::Gum { code } => match self.ctx.graphics.render_graphic(code, &hints) {
                Ok(svg) => ("gum-block".to_string(), sizer("gum-sizer", &svg)),
                Err(err) => {
                    warn!("gum figure {} failed: {err}", id.unwrap_or("<unnamed>"));
                    (
                        "gum-block gum-error".to_string(),
                        self.div("gum-error-message", None, &escape_html(&err.to_string())),
                    )
                }
            },
            FigureKind::Image { src, title } => {
                let title = title
                    .as_deref()
                    .map(|t| format!(r#" title="{}""#, escape_html(t)))
                    .unwrap_or_default();
                match src.as_deref().map(|src| self.image_src(src)) {
                    Some(Ok(src)) => (
                        "image-block".to_string(),
                        sizer(
                            "image-sizer",
                            &format!(r#"<img src="{}"{title} />"#, escape_html(&src)),
                        ),
                    ),
                    Some(Err(err)) => {
                        warn!("image figure {} failed: {err}", id.unwrap_or("<unnamed>"));
                        (
                            "image-block image-missing".to_string(),
                            self.div("image-error-message", None, &escape_html(&err.to_string())),
                        )
                    }
                    None => ("image-block image-missing".to_string(), String::new()),
                }
            }
            FigureKind::Video { src, title } => {
                let title = title
                    .as_deref()
                    .map(|t| format!(r#" title="{}""#, escape_html(t)))
                    .unwrap_or_default();
                let src = src.as_deref().unwrap_or_default();
                (
                    "video-block".to_string(),
                    sizer(
                        "video-sizer",
                        &format!(
                            r#"<iframe src="{}"{title} allowfullscreen></iframe>"#,
                            escape_html(src)
                        ),
                    ),
                )
            }
            FigureKind::Table { table } => ("table-block".to_string(), self.table(table, state)),
        };

        let caption = figure
            .caption
            .as_ref()
            .map(|caption| {
                let label = state
                    .numbering
                    .block_label(state.index)
                    .map(|label| self.span("caption-number", &format!("{}: ", label.describe())))
                    .unwrap_or_default();
                let inner = self.render_inlines(caption, state);
                self.div("figure-caption", None, &format!("{label}{inner}"))
            })
            .unwrap_or_default();

        self.div(
            &format!("block figure-block {kind_class}"),
            id,
            &format!("{body}{caption}"),
        )
    }

    fn inline(&self, inline: &Inline, state: &mut RenderState<'_>) -> String {
        match inline {
            Inline::Text { text } | Inline::Escape { text } => escape_html(text),
            Inline::Special { accent, letter } => special_html(accent, letter),
            Inline::Comment { text } => self.span("comment-inline", &escape_html(text)),
            Inline::Math { tex } => {
                self.span("math-inline", &self.ctx.math.render_tex(tex, false))
            }
            Inline::Reference { kind, args, text } => {
                let id = args.id().unwrap_or_default();
                let shown = if text.is_empty() {
                    None
                } else {
                    Some(self.render_inlines(text, state))
                };
                match kind {
                    ReferenceKind::Citation => format!(
                        r##"<a href="#cite-{}" class="{}">{}</a>"##,
                        escape_html(id),
                        self.classes("cite-inline"),
                        shown.unwrap_or_else(|| escape_html(id))
                    ),
                    ReferenceKind::Reference => {
                        let href = match id.split_once(':') {
                            Some((art, key)) => {
                                format!("{}{art}#{key}", self.ctx.config.internal_link_base)
                            }
                            None => format!("#{id}"),
                        };
                        let shown = shown
                            .or_else(|| reference_label(args, state.numbering).map(|l| escape_html(&l)))
                            .unwrap_or_else(|| escape_html(id));
                        format!(
                            r#"<a href="{}" class="{}">{shown}</a>"#,
                            escape_html(&href),
                            self.classes("ref-inline")
                        )
                    }
                }
            }
            Inline::Note { kind, content } => {
                let inner = self.render_inlines(content, state);
                match kind {
                    NoteKind::Footnote => {
                        let n = state.next_footnote();
                        self.span(
                            "footnote-inline",
                            &format!("<sup>{n}</sup>{}", self.span("footnote-content", &inner)),
                        )
                    }
                    NoteKind::Sidenote => self.span("sidenote-inline", &inner),
                }
            }
            Inline::InternalLink { args, text } => {
                let target = args.id().unwrap_or_default();
                let shown = if text.is_empty() {
                    escape_html(target)
                } else {
                    self.render_inlines(text, state)
                };
                format!(
                    r#"<a href="{}" class="{}">{shown}</a>"#,
                    escape_html(&format!("{}{target}", self.ctx.config.internal_link_base)),
                    self.classes("link-inline internal-link")
                )
            }
            Inline::Link {
                kind,
                href,
                title,
                content,
            } => {
                let title = title
                    .as_deref()
                    .map(|t| format!(r#" title="{}""#, escape_html(t)))
                    .unwrap_or_default();
                let class = match kind {
                    LinkKind::Explicit => "link-inline",
                    LinkKind::Auto | LinkKind::Url => "link-inline autolink",
                };
                format!(
                    r#"<a href="{}" class="{}"{title}>{}</a>"#,
                    escape_html(href),
                    self.classes(class),
                    self.render_inlines(content, state)
                )
            }
            Inline::Image { src, alt, title } => {
                let title = title
                    .as_deref()
                    .map(|t| format!(r#" title="{}""#, escape_html(t)))
                    .unwrap_or_default();
                format!(
                    r#"<img src="{}" alt="{}" class="{}"{title} />"#,
                    escape_html(src),
                    escape_html(alt),
                    self.classes("image-inline")
                )
            }
            Inline::Bold { content } => {
                let inner = self.render_inlines(content, state);
                self.span("bold-inline", &inner)
            }
            Inline::Italic { content } => {
                let inner = self.render_inlines(content, state);
                self.span("italic-inline", &inner)
            }
            Inline::Strikeout { content } => {
                let inner = self.render_inlines(content, state);
                self.span("strikeout-inline", &inner)
            }
            Inline::Monospace { code } => self.span("code-inline", &escape_html(code)),
            Inline::Hash { tag } => format!(
                r#"<a href="{}" class="{}">#{}</a>"#,
                escape_html(&format!("{}{tag}", self.ctx.config.hash_link_base)),
                self.classes("hash-inline"),
                escape_html(tag)
            ),
            Inline::Newline => format!(r#"<br class="{}" />"#, self.classes("newline-inline")),
        }
    }
}

impl Render for HtmlRenderer {
    fn render_block(&self, block: &Block, state: &mut RenderState<'_>) -> String {
        let id = block.id();
        match block {
            Block::Empty => String::new(),
            Block::Paragraph { content } => {
                let inner = self.render_inlines(content, state);
                self.div("block text-block", None, &inner)
            }
            Block::Heading { level, content, .. } => {
                let number = self.number_span("heading-number", state.number(), ("", " "));
                let inner = self.render_inlines(content, state);
                self.div(
                    &format!("block heading-block h{level}-block"),
                    id,
                    &format!("{number}{inner}"),
                )
            }
            Block::Title {
                content, preamble, ..
            } => {
                let inner = self.render_inlines(content, state);
                let tags: String = preamble
                    .tags
                    .iter()
                    .map(|tag| {
                        self.inline(
                            &Inline::Hash {
                                tag: tag.clone(),
                            },
                            state,
                        )
                    })
                    .collect();
                let tags = if tags.is_empty() {
                    tags
                } else {
                    self.div("title-tags", None, &tags)
                };
                self.div("block title-block", id, &format!("{inner}{tags}"))
            }
            Block::Rule => self.div("block rule-block", None, "<hr />"),
            Block::Blockquote { content } => {
                let inner = self.render_inlines(content, state);
                self.div("block quote-block", None, &inner)
            }
            Block::Comment { text } => {
                self.div("block comment-block", None, &escape_html(text))
            }
            Block::Code { code, args, .. } => {
                let classes = match args.get("lang") {
                    Some(lang) => format!("block code-block code-lang-{}", escape_html(lang)),
                    None => "block code-block".to_string(),
                };
                self.div(
                    &classes,
                    id,
                    &format!("<pre><code>{}</code></pre>", escape_html(code)),
                )
            }
            Block::Equation { tex, multiline, .. } => {
                let tex = if *multiline {
                    format!("\\begin{{aligned}}{tex}\\end{{aligned}}")
                } else {
                    tex.clone()
                };
                let math = self.ctx.math.render_tex(&tex, true);
                let number = if self.ctx.config.equation_numbers {
                    self.number_span("equation-number", state.number(), ("(", ")"))
                } else {
                    String::new()
                };
                self.div("block equation-block", id, &format!("{math}{number}"))
            }
            Block::Figure { figure } => self.figure(figure, id, state),
            Block::List { ordered, items } => {
                let inner = self.list(*ordered, items, state);
                self.div("block list-block", None, &inner)
            }
            Block::Table { table } => {
                let inner = self.table(table, state);
                self.div("block table-block", None, &inner)
            }
            Block::EnvBegin { env, content, .. } | Block::EnvSingle { env, content, .. } => {
                let single = block.is_env_single();
                if !single {
                    state.open_env(env);
                }
                let title = state
                    .numbering
                    .block_label(state.index)
                    .map(|label| self.span("env-title", &escape_html(&label.describe())))
                    .unwrap_or_default();
                let inner = self.render_inlines(content, state);
                let kind = if single { "env-single" } else { "env-begin" };
                self.div(
                    &format!("block {kind} env-{}", escape_html(env)),
                    id,
                    &format!("{title}{inner}"),
                )
            }
            Block::EnvEnd { content } => {
                let env = state.close_env();
                let inner = self.render_inlines(content, state);
                let classes = match env {
                    Some(env) => format!("block env-end env-{}", escape_html(&env)),
                    None => "block env-end".to_string(),
                };
                self.div(&classes, None, &inner)
            }
            Block::Upload { id: key, gum, .. } => {
                let key = key.as_deref().unwrap_or_default();
                let missing = if key.is_empty() || self.ctx.uploads.resolve(key).is_none() {
                    " upload-missing"
                } else {
                    ""
                };
                format!(
                    r#"<div class="{}" data-key="{}" data-gum="{gum}"></div>"#,
                    self.classes(&format!("block upload-block{missing}")),
                    escape_html(key)
                )
            }
            Block::Biblio { id, entries } => {
                let inner: String = entries
                    .iter()
                    .map(|entry| {
                        self.span(
                            &format!("biblio-{}", escape_html(&entry.key)),
                            &escape_html(&entry.value),
                        )
                    })
                    .collect();
                self.div("block biblio-block", Some(format!("cite-{id}").as_str()), &inner)
            }
        }
    }

    fn render_inlines(&self, inlines: &[Inline], state: &mut RenderState<'_>) -> String {
        inlines.iter().map(|inline| self.inline(inline, state)).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parser::{parse_document, parse_inline};
    use crate::render::{GraphicsRenderer, SizeHints};
    use crate::error::RenderResult;
    use crate::document::numbering::Numbering;

    fn inline_html(src: &str) -> String {
        let numbering = Numbering::default();
        let mut state = RenderState::new(&numbering);
        HtmlRenderer::default().render_inlines(&parse_inline(src).unwrap(), &mut state)
    }

    #[test]
    fn test_inline_markup() {
        assert_eq!(
            inline_html("a **b** *c*"),
            r#"a <span class="bold-inline">b</span> <span class="italic-inline">c</span>"#
        );
    }

    #[test]
    fn test_text_is_escaped() {
        assert_eq!(inline_html("1 < 2 & 3"), "1 &lt; 2 &amp; 3");
    }

    #[test]
    fn test_special_entity() {
        assert_eq!(inline_html(r"caf\'{e}"), "caf&eacute;");
    }

    #[test]
    fn test_hash_link() {
        assert_eq!(
            inline_html("#rust"),
            r##"<a href="/t/rust" class="hash-inline">#rust</a>"##
        );
    }

    #[test]
    fn test_footnotes_are_counted() {
        let html = inline_html("a^[one] b^[two]");
        assert!(html.contains("<sup>1</sup>"));
        assert!(html.contains("<sup>2</sup>"));
    }

    #[test]
    fn test_reference_uses_numbering() {
        let doc = parse_document("$$[eq1] x $$\n\nSee @[eq1].").unwrap();
        let html = HtmlRenderer::default().render_document(&doc);
        assert!(html.contains(r##"<a href="#eq1" class="ref-inline">Equation 1</a>"##));
        assert!(html.contains(r#"<span class="equation-number">(1)</span>"#));
    }

    struct FailingGum;

    impl GraphicsRenderer for FailingGum {
        fn render_graphic(&self, _code: &str, _hints: &SizeHints) -> RenderResult<String> {
            Err(RenderError::graphics("unexpected token"))
        }
    }

    #[test]
    fn test_gum_failure_is_isolated() {
        let doc = parse_document("!gum[g1] bad(\n\nafter").unwrap();
        let renderer = HtmlRenderer::new(RenderContext::default().with_graphics(FailingGum));
        let html = renderer.render_document(&doc);
        assert!(html.contains("gum-error"));
        assert!(html.contains("unexpected token"));
        assert!(html.contains(r#"<div class="block text-block">after</div>"#));
    }

    #[test]
    fn test_class_prefix() {
        let config = crate::config::RenderConfig {
            class_prefix: "l2-".to_string(),
            ..Default::default()
        };
        let renderer = HtmlRenderer::new(RenderContext::new(config));
        let doc = parse_document("---").unwrap();
        assert_eq!(
            renderer.render_document(&doc),
            r#"<div class="l2-block l2-rule-block"><hr /></div>"#
        );
    }
}
