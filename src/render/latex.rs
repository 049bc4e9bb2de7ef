use log::warn;

use super::escape::{accent, escape_latex, escape_latex_url};
use super::{Render, RenderContext, RenderState};
use crate::models::{
    Alignment, Block, Figure, FigureKind, Inline, ListItem, NoteKind, ReferenceKind, Table,
};

/// LaTeX body output. Preamble and document class are left to the caller.
#[derive(Debug, Default)]
pub struct LatexRenderer {
    ctx: RenderContext,
}

const SECTIONS: [&str; 6] = [
    "section",
    "subsection",
    "subsubsection",
    "paragraph",
    "subparagraph",
    "subparagraph",
];

fn label(id: Option<&str>) -> String {
    id.map(|id| format!("\\label{{{id}}}")).unwrap_or_default()
}

fn environment(name: &str, body: &str) -> String {
    format!("\\begin{{{name}}}\n{body}\n\\end{{{name}}}")
}

fn column_spec(table: &Table) -> String {
    (0..table.header.len())
        .map(|i| match table.align.get(i).copied().flatten() {
            Some(Alignment::Center) => 'c',
            Some(Alignment::Right) => 'r',
            Some(Alignment::Left) | None => 'l',
        })
        .collect()
}

impl LatexRenderer {
    #[must_use]
    pub const fn new(ctx: RenderContext) -> Self {
        Self { ctx }
    }

    fn row(&self, cells: &[Vec<Inline>], state: &mut RenderState<'_>) -> String {
        let cells: Vec<String> = cells
            .iter()
            .map(|cell| self.render_inlines(cell, state))
            .collect();
        format!("{} \\\\", cells.join(" & "))
    }

    fn tabular(&self, table: &Table, state: &mut RenderState<'_>) -> String {
        let mut lines = vec![
            format!("\\begin{{tabular}}{{{}}}", column_spec(table)),
            "\\hline".to_string(),
            self.row(&table.header, state),
            "\\hline".to_string(),
        ];
        for row in &table.rows {
            lines.push(self.row(row, state));
        }
        lines.push("\\hline".to_string());
        lines.push("\\end{tabular}".to_string());
        lines.join("\n")
    }

    fn list(&self, ordered: bool, items: &[ListItem], state: &mut RenderState<'_>) -> String {
        let body: Vec<String> = items
            .iter()
            .map(|item| format!("\\item {}", self.render_inlines(&item.content, state)))
            .collect();
        environment(if ordered { "enumerate" } else { "itemize" }, &body.join("\n"))
    }

    fn caption(&self, figure: &Figure, state: &mut RenderState<'_>) -> String {
        figure
            .caption
            .as_ref()
            .map(|caption| format!("\\caption{{{}}}", self.render_inlines(caption, state)))
            .unwrap_or_default()
    }

    fn figure(&self, figure: &Figure, id: Option<&str>, state: &mut RenderState<'_>) -> String {
        let width = figure
            .args
            .get("width")
            .and_then(|w| w.trim().parse::<u32>().ok())
            .unwrap_or(self.ctx.config.figure_width);
        match &figure.kind {
            FigureKind::Image { src: Some(src), .. } => {
                let caption = self.caption(figure, state);
                let body = [
                    "\\centering".to_string(),
                    format!(
                        "\\includegraphics[width={:.2}\\textwidth]{{{}}}",
                        f64::from(width) / 100.0,
                        escape_latex_url(src)
                    ),
                    caption,
                    label(id),
                ];
                format!("\\begin{{figure}}[h]\n{}\n\\end{{figure}}", join_nonempty(&body))
            }
            FigureKind::Table { table } => {
                let caption = self.caption(figure, state);
                let body = [
                    "\\centering".to_string(),
                    self.tabular(table, state),
                    caption,
                    label(id),
                ];
                format!("\\begin{{table}}[h]\n{}\n\\end{{table}}", join_nonempty(&body))
            }
            FigureKind::Video { src, .. } => {
                let src = src.as_deref().unwrap_or_default();
                format!("\\href{{{}}}{{{}}}", escape_latex_url(src), escape_latex(src))
            }
            FigureKind::Image { src: None, .. } => {
                warn!("image figure {} has no source", id.unwrap_or("<unnamed>"));
                String::new()
            }
            FigureKind::Svg { .. } | FigureKind::Gum { .. } => {
                format!("% {} figure {}", figure.kind.name(), id.unwrap_or_default())
            }
        }
    }

    fn reference(&self, kind: ReferenceKind, id: &str, text: Option<String>) -> String {
        match (kind, id.split_once(':'), text) {
            (ReferenceKind::Citation, _, _) => format!("\\cite{{{id}}}"),
            (ReferenceKind::Reference, Some((art, key)), text) => format!(
                "\\href{{{}\\#{}}}{{{}}}",
                escape_latex_url(&format!("{}{art}", self.ctx.config.internal_link_base)),
                escape_latex_url(key),
                text.unwrap_or_else(|| escape_latex(id))
            ),
            (ReferenceKind::Reference, None, Some(text)) => {
                format!("\\hyperref[{id}]{{{text}}}")
            }
            (ReferenceKind::Reference, None, None) => format!("\\cref{{{id}}}"),
        }
    }

    fn inline(&self, inline: &Inline, state: &mut RenderState<'_>) -> String {
        match inline {
            Inline::Text { text } | Inline::Escape { text } => escape_latex(text),
            Inline::Special { accent: mark, letter } => match accent(mark) {
                Some(acc) => format!("\\{}{{{letter}}}", acc.mark),
                None => escape_latex(letter),
            },
            Inline::Comment { .. } => String::new(),
            Inline::Math { tex } => format!("${tex}$"),
            Inline::Reference { kind, args, text } => {
                let text = if text.is_empty() {
                    None
                } else {
                    Some(self.render_inlines(text, state))
                };
                self.reference(*kind, args.id().unwrap_or_default(), text)
            }
            Inline::Note { kind, content } => {
                let inner = self.render_inlines(content, state);
                match kind {
                    NoteKind::Footnote | NoteKind::Sidenote => format!("\\footnote{{{inner}}}"),
                }
            }
            Inline::InternalLink { args, text } => {
                let target = args.id().unwrap_or_default();
                let shown = if text.is_empty() {
                    escape_latex(target)
                } else {
                    self.render_inlines(text, state)
                };
                let href = format!("{}{target}", self.ctx.config.internal_link_base);
                format!("\\href{{{}}}{{{shown}}}", escape_latex_url(&href))
            }
            Inline::Link { href, content, .. } => {
                let inner = self.render_inlines(content, state);
                format!("\\href{{{}}}{{{inner}}}", escape_latex_url(href))
            }
            Inline::Image { src, .. } => {
                format!("\\includegraphics{{{}}}", escape_latex_url(src))
            }
            Inline::Bold { content } => {
                format!("\\textbf{{{}}}", self.render_inlines(content, state))
            }
            Inline::Italic { content } => {
                format!("\\textit{{{}}}", self.render_inlines(content, state))
            }
            Inline::Strikeout { content } => {
                format!("\\sout{{{}}}", self.render_inlines(content, state))
            }
            Inline::Monospace { code } => format!("\\texttt{{{}}}", escape_latex(code)),
            Inline::Hash { tag } => format!("\\#{}", escape_latex(tag)),
            Inline::Newline => "\\\\\n".to_string(),
        }
    }
}

fn join_nonempty(parts: &[String]) -> String {
    parts
        .iter()
        .filter(|part| !part.is_empty())
        .cloned()
        .collect::<Vec<_>>()
        .join("\n")
}

impl Render for LatexRenderer {
    fn render_block(&self, block: &Block, state: &mut RenderState<'_>) -> String {
        let id = block.id();
        match block {
            Block::Empty | Block::Upload { .. } => String::new(),
            Block::Paragraph { content } => self.render_inlines(content, state),
            Block::Heading {
                level,
                numbered,
                content,
                ..
            } => {
                let command = SECTIONS[usize::from(level.saturating_sub(1)).min(5)];
                let star = if *numbered { "" } else { "*" };
                format!(
                    "\\{command}{star}{{{}}}{}",
                    self.render_inlines(content, state),
                    label(id)
                )
            }
            Block::Title { content, .. } => environment(
                "center",
                &format!("{{\\LARGE\\bfseries {}}}", self.render_inlines(content, state)),
            ),
            Block::Rule => "\\noindent\\rule{\\textwidth}{0.4pt}".to_string(),
            Block::Blockquote { content } => {
                environment("quote", &self.render_inlines(content, state))
            }
            Block::Comment { text } => text
                .lines()
                .map(|line| format!("% {line}"))
                .collect::<Vec<_>>()
                .join("\n"),
            Block::Code { code, .. } => environment(&self.ctx.config.latex_code_env, code),
            Block::Equation {
                tex,
                numbered,
                multiline,
                ..
            } => {
                let env = match (multiline, numbered) {
                    (true, true) => "align",
                    (true, false) => "align*",
                    (false, true) => "equation",
                    (false, false) => "equation*",
                };
                environment(env, &join_nonempty(&[tex.clone(), label(id)]))
            }
            Block::Figure { figure } => self.figure(figure, id, state),
            Block::List { ordered, items } => self.list(*ordered, items, state),
            Block::Table { table } => self.tabular(table, state),
            Block::EnvBegin {
                env,
                numbered,
                content,
                ..
            }
            | Block::EnvSingle {
                env,
                numbered,
                content,
                ..
            } => {
                let name = if *numbered {
                    env.clone()
                } else {
                    format!("{env}*")
                };
                let title = self.render_inlines(content, state);
                let open = if title.is_empty() {
                    format!("\\begin{{{name}}}{}", label(id))
                } else {
                    format!("\\begin{{{name}}}[{title}]{}", label(id))
                };
                if block.is_env_single() {
                    format!("{open}\n\\end{{{name}}}")
                } else {
                    state.open_env(&name);
                    open
                }
            }
            Block::EnvEnd { content } => {
                let body = self.render_inlines(content, state);
                match state.close_env() {
                    Some(name) => join_nonempty(&[body, format!("\\end{{{name}}}")]),
                    None => {
                        warn!("environment end without a matching begin");
                        body
                    }
                }
            }
            Block::Biblio { id, entries } => {
                let mut lines = vec![format!("% bibliography entry {id}")];
                lines.extend(
                    entries
                        .iter()
                        .map(|entry| format!("%   {}: {}", entry.key, entry.value)),
                );
                lines.join("\n")
            }
        }
    }

    fn render_inlines(&self, inlines: &[Inline], state: &mut RenderState<'_>) -> String {
        inlines.iter().map(|inline| self.inline(inline, state)).collect()
    }

    /// Blocks are separated by blank lines, matching LaTeX paragraphs.
    fn render_document(&self, doc: &crate::models::Document) -> String {
        let numbering = crate::document::numbering::number_document(doc);
        let mut state = RenderState::new(&numbering);
        let mut parts = Vec::new();
        for (index, block) in doc.iter().enumerate() {
            state.index = index;
            let out = self.render_block(block, &mut state);
            if !out.is_empty() {
                parts.push(out);
            }
        }
        parts.join("\n\n")
    }
}
