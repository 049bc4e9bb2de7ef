use std::collections::HashMap;

use crate::models::{Block, Document, FigureKind};

/// What a label points at
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LabelKind {
    Section,
    Equation,
    Figure,
    Table,
    Listing,
    Environment(String),
}

impl LabelKind {
    /// Human-readable prefix used when a reference has no explicit text
    #[must_use]
    pub fn display_name(&self) -> String {
        match self {
            Self::Section => "Section".to_string(),
            Self::Equation => "Equation".to_string(),
            Self::Figure => "Figure".to_string(),
            Self::Table => "Table".to_string(),
            Self::Listing => "Listing".to_string(),
            Self::Environment(env) => {
                let mut chars = env.chars();
                chars
                    .next()
                    .map(|first| first.to_uppercase().chain(chars).collect())
                    .unwrap_or_default()
            }
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Label {
    pub kind: LabelKind,
    pub number: String,
}

impl Label {
    /// `Figure 2`, `Section 1.3`, ...
    #[must_use]
    pub fn describe(&self) -> String {
        format!("{} {}", self.kind.display_name(), self.number)
    }
}

/// Display numbers for a document's blocks and its label table.
#[derive(Debug, Clone, Default)]
pub struct Numbering {
    labels: HashMap<String, Label>,
    blocks: Vec<Option<Label>>,
}

impl Numbering {
    /// Label registered for `id`, if a numbered block carries it.
    #[must_use]
    pub fn label(&self, id: &str) -> Option<&Label> {
        self.labels.get(id)
    }

    /// Label of the block at `index`, if that block is numbered.
    #[must_use]
    pub fn block_label(&self, index: usize) -> Option<&Label> {
        self.blocks.get(index).and_then(Option::as_ref)
    }

    /// Number assigned to the block at `index`.
    #[must_use]
    pub fn block_number(&self, index: usize) -> Option<&str> {
        self.block_label(index).map(|label| label.number.as_str())
    }

    #[must_use]
    pub fn label_count(&self) -> usize {
        self.labels.len()
    }
}

/// Open numbered headings, innermost last, with their running counts.
#[derive(Debug, Default)]
struct SectionStack {
    stack: Vec<(u8, u32)>,
}

impl SectionStack {
    fn next(&mut self, level: u8) -> String {
        while self.stack.last().is_some_and(|&(top, _)| top > level) {
            self.stack.pop();
        }
        match self.stack.last_mut() {
            Some((top, count)) if *top == level => *count += 1,
            _ => self.stack.push((level, 1)),
        }
        self.stack
            .iter()
            .map(|(_, count)| count.to_string())
            .collect::<Vec<_>>()
            .join(".")
    }
}

#[derive(Debug, Default)]
struct Counters {
    sections: SectionStack,
    equations: u32,
    figures: u32,
    tables: u32,
    listings: u32,
    envs: HashMap<String, u32>,
}

fn bump(counter: &mut u32) -> String {
    *counter += 1;
    counter.to_string()
}

impl Counters {
    fn label_for(&mut self, block: &Block) -> Option<Label> {
        if !block.numbered() {
            return None;
        }
        let (kind, number) = match block {
            Block::Heading { level, .. } => (LabelKind::Section, self.sections.next(*level)),
            Block::Equation { .. } => (LabelKind::Equation, bump(&mut self.equations)),
            Block::Figure { figure } => match figure.kind {
                FigureKind::Table { .. } => (LabelKind::Table, bump(&mut self.tables)),
                _ => (LabelKind::Figure, bump(&mut self.figures)),
            },
            Block::Code { .. } => (LabelKind::Listing, bump(&mut self.listings)),
            Block::EnvBegin { env, .. } | Block::EnvSingle { env, .. } => {
                let number = bump(self.envs.entry(env.clone()).or_default());
                (LabelKind::Environment(env.clone()), number)
            }
            _ => return None,
        };
        Some(Label { kind, number })
    }
}

/// Assign display numbers to every numbered block, in document order.
///
/// Numbered headings get hierarchical section numbers; equations, figures,
/// tables, code listings and each environment name count independently.
/// Blocks with an `id` argument are entered into the label table; a later
/// block reusing an id replaces the earlier entry.
#[must_use]
pub fn number_document(doc: &Document) -> Numbering {
    let mut counters = Counters::default();
    let mut numbering = Numbering::default();

    for block in doc.iter() {
        let label = counters.label_for(block);
        if let (Some(label), Some(id)) = (&label, block.id()) {
            numbering.labels.insert(id.to_string(), label.clone());
        }
        numbering.blocks.push(label);
    }

    numbering
}
