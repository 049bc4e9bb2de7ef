use serde::{Deserialize, Serialize};

pub type Blocks = Vec<Block>;
pub type Inlines = Vec<Inline>;

/// A key-value attribute pair for `UniFFI` compatibility
#[derive(Debug, Clone, Deserialize, Serialize, PartialEq, Eq, uniffi::Record)]
pub struct Attribute {
    pub key: String,
    pub value: String,
}

impl Attribute {
    #[must_use]
    pub fn new(key: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            key: key.into(),
            value: value.into(),
        }
    }
}

/// Key/value arguments attached to a block or reference.
///
/// Keys are unique; inserting an existing key overwrites its value in place.
/// Values are stored verbatim, escapes included.
#[derive(Debug, Clone, Default, Deserialize, Serialize, PartialEq, Eq, uniffi::Record)]
pub struct Args {
    pub entries: Vec<Attribute>,
}

impl Args {
    #[must_use]
    pub fn get(&self, key: &str) -> Option<&str> {
        self.entries
            .iter()
            .find(|attr| attr.key == key)
            .map(|attr| attr.value.as_str())
    }

    /// First value present among `keys`, in the given order.
    #[must_use]
    pub fn get_any(&self, keys: &[&str]) -> Option<&str> {
        keys.iter().find_map(|key| self.get(key))
    }

    #[must_use]
    pub fn contains_key(&self, key: &str) -> bool {
        self.get(key).is_some()
    }

    pub fn insert(&mut self, key: impl Into<String>, value: impl Into<String>) {
        let key = key.into();
        let value = value.into();
        match self.entries.iter_mut().find(|attr| attr.key == key) {
            Some(attr) => attr.value = value,
            None => self.entries.push(Attribute { key, value }),
        }
    }

    pub fn remove(&mut self, key: &str) -> Option<String> {
        let pos = self.entries.iter().position(|attr| attr.key == key)?;
        Some(self.entries.remove(pos).value)
    }

    #[must_use]
    pub fn id(&self) -> Option<&str> {
        self.get("id")
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.entries
            .iter()
            .map(|attr| (attr.key.as_str(), attr.value.as_str()))
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl<K: Into<String>, V: Into<String>> FromIterator<(K, V)> for Args {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        let mut args = Self::default();
        for (key, value) in iter {
            args.insert(key, value);
        }
        args
    }
}

#[derive(Debug, Clone, Copy, Deserialize, Serialize, PartialEq, Eq, uniffi::Enum)]
pub enum Alignment {
    Left,
    Center,
    Right,
}

/// Pipe table: header cells, per-column alignment and body rows.
#[derive(Debug, Clone, Default, Deserialize, Serialize, PartialEq, Eq, uniffi::Record)]
pub struct Table {
    pub header: Vec<Inlines>,
    pub align: Vec<Option<Alignment>>,
    pub rows: Vec<Vec<Inlines>>,
}

#[derive(Debug, Clone, Deserialize, Serialize, PartialEq, Eq, uniffi::Record)]
pub struct ListItem {
    /// Leading spaces before the bullet
    pub indent: u32,
    pub content: Inlines,
}

/// Title preamble: `name:value` macros and `#tag` entries
#[derive(Debug, Clone, Default, Deserialize, Serialize, PartialEq, Eq, uniffi::Record)]
pub struct Preamble {
    pub macros: Vec<Attribute>,
    pub tags: Vec<String>,
}

#[derive(Debug, Clone, Deserialize, Serialize, PartialEq, Eq, uniffi::Enum)]
pub enum FigureKind {
    Svg {
        code: String,
    },
    Gum {
        code: String,
    },
    Image {
        src: Option<String>,
        title: Option<String>,
    },
    Video {
        src: Option<String>,
        title: Option<String>,
    },
    Table {
        table: Table,
    },
}

impl FigureKind {
    #[must_use]
    pub const fn name(&self) -> &'static str {
        match self {
            Self::Svg { .. } => "svg",
            Self::Gum { .. } => "gum",
            Self::Image { .. } => "image",
            Self::Video { .. } => "video",
            Self::Table { .. } => "table",
        }
    }
}

#[derive(Debug, Clone, Deserialize, Serialize, PartialEq, Eq, uniffi::Record)]
pub struct Figure {
    pub kind: FigureKind,
    pub numbered: bool,
    pub caption: Option<Inlines>,
    pub args: Args,
}

#[derive(Debug, Clone, Deserialize, Serialize, PartialEq, Eq, uniffi::Enum)]
pub enum Block {
    Empty,
    Paragraph {
        content: Inlines,
    },
    Heading {
        level: u8,
        numbered: bool,
        content: Inlines,
        args: Args,
    },
    Title {
        content: Inlines,
        preamble: Preamble,
        args: Args,
    },
    Rule,
    Blockquote {
        content: Inlines,
    },
    Comment {
        text: String,
    },
    Code {
        code: String,
        numbered: bool,
        args: Args,
    },
    Equation {
        tex: String,
        numbered: bool,
        multiline: bool,
        args: Args,
    },
    Figure {
        figure: Figure,
    },
    List {
        ordered: bool,
        items: Vec<ListItem>,
    },
    Table {
        table: Table,
    },
    EnvBegin {
        env: String,
        numbered: bool,
        content: Inlines,
        args: Args,
    },
    EnvSingle {
        env: String,
        numbered: bool,
        content: Inlines,
        args: Args,
    },
    EnvEnd {
        content: Inlines,
    },
    Upload {
        id: Option<String>,
        gum: bool,
        args: Args,
    },
    Biblio {
        id: String,
        entries: Vec<Attribute>,
    },
}

impl Block {
    #[must_use]
    pub const fn paragraph(content: Inlines) -> Self {
        Self::Paragraph { content }
    }

    #[must_use]
    pub const fn heading(level: u8, content: Inlines) -> Self {
        Self::Heading {
            level,
            numbered: false,
            content,
            args: Args {
                entries: Vec::new(),
            },
        }
    }

    /// Name of the variant, used in logs and CSS classes
    #[must_use]
    pub const fn kind_name(&self) -> &'static str {
        match self {
            Self::Empty => "empty",
            Self::Paragraph { .. } => "paragraph",
            Self::Heading { .. } => "heading",
            Self::Title { .. } => "title",
            Self::Rule => "rule",
            Self::Blockquote { .. } => "blockquote",
            Self::Comment { .. } => "comment",
            Self::Code { .. } => "code",
            Self::Equation { .. } => "equation",
            Self::Figure { .. } => "figure",
            Self::List { .. } => "list",
            Self::Table { .. } => "table",
            Self::EnvBegin { .. } => "env_begin",
            Self::EnvSingle { .. } => "env_single",
            Self::EnvEnd { .. } => "env_end",
            Self::Upload { .. } => "upload",
            Self::Biblio { .. } => "biblio",
        }
    }

    #[must_use]
    pub const fn args(&self) -> Option<&Args> {
        match self {
            Self::Heading { args, .. }
            | Self::Title { args, .. }
            | Self::Code { args, .. }
            | Self::Equation { args, .. }
            | Self::EnvBegin { args, .. }
            | Self::EnvSingle { args, .. }
            | Self::Upload { args, .. } => Some(args),
            Self::Figure { figure } => Some(&figure.args),
            _ => None,
        }
    }

    #[must_use]
    pub fn id(&self) -> Option<&str> {
        self.args().and_then(Args::id)
    }

    #[must_use]
    pub const fn numbered(&self) -> bool {
        match self {
            Self::Heading { numbered, .. }
            | Self::Code { numbered, .. }
            | Self::Equation { numbered, .. }
            | Self::EnvBegin { numbered, .. }
            | Self::EnvSingle { numbered, .. } => *numbered,
            Self::Figure { figure } => figure.numbered,
            _ => false,
        }
    }

    /// Inline content carried directly by the block, if any
    #[must_use]
    pub fn inlines(&self) -> Option<&[Inline]> {
        match self {
            Self::Paragraph { content }
            | Self::Heading { content, .. }
            | Self::Title { content, .. }
            | Self::Blockquote { content }
            | Self::EnvBegin { content, .. }
            | Self::EnvSingle { content, .. }
            | Self::EnvEnd { content } => Some(content.as_slice()),
            _ => None,
        }
    }
}

macro_rules! impl_block_helpers {
    ($($variant:ident),*) => {
        impl Block {
            paste::paste! {
                $(
                    #[must_use]
                    pub const fn [<is_ $variant:snake>](&self) -> bool {
                        matches!(self, Self::$variant { .. })
                    }
                )*
            }
        }
    };
}

impl_block_helpers!(
    Empty, Paragraph, Heading, Title, Rule, Blockquote, Comment, Code, Equation, Figure, List,
    Table, EnvBegin, EnvSingle, EnvEnd, Upload, Biblio
);

#[derive(Debug, Clone, Copy, Deserialize, Serialize, PartialEq, Eq, uniffi::Enum)]
pub enum ReferenceKind {
    /// `@[...]`
    Reference,
    /// `@@[...]`
    Citation,
}

#[derive(Debug, Clone, Copy, Deserialize, Serialize, PartialEq, Eq, uniffi::Enum)]
pub enum NoteKind {
    /// `^[...]`
    Footnote,
    /// `^![...]`
    Sidenote,
}

#[derive(Debug, Clone, Copy, Deserialize, Serialize, PartialEq, Eq, uniffi::Enum)]
pub enum LinkKind {
    /// `<scheme:/...>`
    Auto,
    /// Bare `http(s)://` URL
    Url,
    /// `[label](href "title")`
    Explicit,
}

#[derive(Debug, Clone, Deserialize, Serialize, PartialEq, Eq, uniffi::Enum)]
pub enum Inline {
    Text {
        text: String,
    },
    /// Accented letter such as `\'{e}`
    Special {
        accent: String,
        letter: String,
    },
    Escape {
        text: String,
    },
    Comment {
        text: String,
    },
    Math {
        tex: String,
    },
    Reference {
        kind: ReferenceKind,
        args: Args,
        text: Inlines,
    },
    Note {
        kind: NoteKind,
        content: Inlines,
    },
    InternalLink {
        args: Args,
        text: Inlines,
    },
    Link {
        kind: LinkKind,
        href: String,
        title: Option<String>,
        content: Inlines,
    },
    Image {
        src: String,
        alt: String,
        title: Option<String>,
    },
    Bold {
        content: Inlines,
    },
    Italic {
        content: Inlines,
    },
    Strikeout {
        content: Inlines,
    },
    Monospace {
        code: String,
    },
    Hash {
        tag: String,
    },
    Newline,
}

impl Inline {
    #[must_use]
    pub fn text(text: impl Into<String>) -> Self {
        Self::Text { text: text.into() }
    }

    #[must_use]
    pub const fn bold(content: Inlines) -> Self {
        Self::Bold { content }
    }

    #[must_use]
    pub const fn italic(content: Inlines) -> Self {
        Self::Italic { content }
    }

    #[must_use]
    pub const fn strikeout(content: Inlines) -> Self {
        Self::Strikeout { content }
    }

    #[must_use]
    pub fn math(tex: impl Into<String>) -> Self {
        Self::Math { tex: tex.into() }
    }

    #[must_use]
    pub fn monospace(code: impl Into<String>) -> Self {
        Self::Monospace { code: code.into() }
    }

    /// Nested inline children, if the variant has any
    #[must_use]
    pub fn children(&self) -> Option<&[Self]> {
        match self {
            Self::Reference { text, .. } | Self::InternalLink { text, .. } => Some(text.as_slice()),
            Self::Note { content, .. }
            | Self::Link { content, .. }
            | Self::Bold { content }
            | Self::Italic { content }
            | Self::Strikeout { content } => Some(content.as_slice()),
            _ => None,
        }
    }

    /// Concatenated plain text of this node and its children
    #[must_use]
    pub fn plain_text(&self) -> String {
        match self {
            Self::Text { text } | Self::Escape { text } => text.clone(),
            Self::Special { letter, .. } => letter.clone(),
            Self::Math { tex } => tex.clone(),
            Self::Monospace { code } => code.clone(),
            Self::Hash { tag } => format!("#{tag}"),
            Self::Image { alt, .. } => alt.clone(),
            Self::Newline => "\n".to_string(),
            Self::Comment { .. } => String::new(),
            _ => self
                .children()
                .map(|children| children.iter().map(Self::plain_text).collect())
                .unwrap_or_default(),
        }
    }
}

/// A parsed document: one block per chunk, in source order
#[derive(Debug, Clone, Default, Deserialize, Serialize, PartialEq, Eq, uniffi::Record)]
pub struct Document {
    pub blocks: Blocks,
}

impl Document {
    #[must_use]
    pub const fn new(blocks: Blocks) -> Self {
        Self { blocks }
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.blocks.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.blocks.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Block> {
        self.blocks.iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_args_insert_overwrites() {
        let mut args = Args::default();
        args.insert("id", "a");
        args.insert("width", "40");
        args.insert("id", "b");
        assert_eq!(args.len(), 2);
        assert_eq!(args.id(), Some("b"));
        assert_eq!(args.iter().next(), Some(("id", "b")));
    }

    #[test]
    fn test_args_remove() {
        let mut args: Args = [("id", "x"), ("caption", "c")].into_iter().collect();
        assert_eq!(args.remove("id"), Some("x".to_string()));
        assert_eq!(args.remove("id"), None);
        assert!(!args.contains_key("id"));
        assert_eq!(args.get_any(&["text", "caption"]), Some("c"));
    }

    #[test]
    fn test_block_helpers() {
        let block = Block::heading(2, vec![Inline::text("Intro")]);
        assert!(block.is_heading());
        assert!(!block.is_paragraph());
        assert!(Block::Empty.is_empty());
        assert!(Block::Rule.is_rule());
        assert_eq!(block.kind_name(), "heading");
        assert!(!block.numbered());
    }

    #[test]
    fn test_block_id_from_figure_args() {
        let block = Block::Figure {
            figure: Figure {
                kind: FigureKind::Svg {
                    code: "<svg/>".to_string(),
                },
                numbered: true,
                caption: None,
                args: [("id", "fig")].into_iter().collect(),
            },
        };
        assert_eq!(block.id(), Some("fig"));
        assert!(block.numbered());
        assert!(block.is_figure());
    }

    #[test]
    fn test_inline_plain_text() {
        let inline = Inline::bold(vec![
            Inline::text("a "),
            Inline::italic(vec![Inline::text("b")]),
            Inline::Hash {
                tag: "c".to_string(),
            },
        ]);
        assert_eq!(inline.plain_text(), "a b#c");
    }

    #[test]
    fn test_serialization_roundtrip() {
        let doc = Document::new(vec![
            Block::paragraph(vec![Inline::text("x")]),
            Block::Rule,
        ]);
        let bytes = serde_cbor::to_vec(&doc).unwrap();
        let back: Document = serde_cbor::from_slice(&bytes).unwrap();
        assert_eq!(doc, back);
    }
}
