use serde_json::{Map, Value};

/// The root of a rich-text document
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Document {
    pub content: Vec<Block>,
}

impl Document {
    /// The canonical empty document: one paragraph holding one empty text run.
    ///
    /// Parsing absent or unusable input always lands here, so renderers never
    /// have to branch on a missing document.
    pub fn empty() -> Self {
        Self {
            content: vec![Block::Paragraph {
                text_align: None,
                content: vec![Inline::text("")],
            }],
        }
    }
}

/// Block-level nodes
#[derive(Debug, Clone, PartialEq)]
pub enum Block {
    Paragraph {
        text_align: Option<String>,
        content: Vec<Inline>,
    },
    Heading {
        level: u8,
        text_align: Option<String>,
        content: Vec<Inline>,
    },
    BulletList {
        content: Vec<Block>,
    },
    OrderedList {
        start: u32,
        content: Vec<Block>,
    },
    ListItem {
        content: Vec<Block>,
    },
    Blockquote {
        content: Vec<Block>,
    },
    CodeBlock {
        language: Option<String>,
        content: Vec<Inline>,
    },
    Image(Image),
    HardBreak,
    HorizontalRule,
    Unknown(Unknown),
}

impl Block {
    /// The stored tag for this node.
    pub fn kind(&self) -> &str {
        match self {
            Block::Paragraph { .. } => "paragraph",
            Block::Heading { .. } => "heading",
            Block::BulletList { .. } => "bulletList",
            Block::OrderedList { .. } => "orderedList",
            Block::ListItem { .. } => "listItem",
            Block::Blockquote { .. } => "blockquote",
            Block::CodeBlock { .. } => "codeBlock",
            Block::Image(_) => "image",
            Block::HardBreak => "hardBreak",
            Block::HorizontalRule => "horizontalRule",
            Block::Unknown(unknown) => &unknown.kind,
        }
    }
}

/// Inline nodes flowing inside a block
#[derive(Debug, Clone, PartialEq)]
pub enum Inline {
    Text { text: String, marks: Vec<Mark> },
    HardBreak,
    Image(Image),
    Unknown(Unknown),
}

impl Inline {
    /// An unmarked text run.
    pub fn text(text: impl Into<String>) -> Self {
        Inline::Text {
            text: text.into(),
            marks: Vec::new(),
        }
    }

    pub fn kind(&self) -> &str {
        match self {
            Inline::Text { .. } => "text",
            Inline::HardBreak => "hardBreak",
            Inline::Image(_) => "image",
            Inline::Unknown(unknown) => &unknown.kind,
        }
    }
}

/// Either side of the block/inline split, used where the position of a
/// child is not known ahead of time.
#[derive(Debug, Clone, PartialEq)]
pub enum Node {
    Block(Block),
    Inline(Inline),
}

/// A node whose tag is not recognized.
///
/// Everything the node carried is kept so that it can be written back
/// unchanged and its children still render.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Unknown {
    pub kind: String,
    pub attrs: Map<String, Value>,
    pub text: Option<String>,
    pub content: Vec<Node>,
    /// Remaining top-level fields, such as `marks` or attributes stored
    /// directly on the node
    pub rest: Map<String, Value>,
}

/// Image attributes. All optional; the renderer substitutes defaults.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Image {
    pub src: Option<String>,
    pub alt: Option<String>,
    pub title: Option<String>,
    pub width: Option<u32>,
    pub height: Option<u32>,
}

/// Formatting applied to a text run
#[derive(Debug, Clone, PartialEq)]
pub enum Mark {
    Bold,
    Italic,
    Underline,
    Strike,
    Code,
    Link {
        href: String,
        target: Option<String>,
    },
    Highlight {
        color: Option<String>,
    },
    Unknown {
        kind: String,
        attrs: Map<String, Value>,
    },
}

impl Mark {
    pub fn kind(&self) -> &str {
        match self {
            Mark::Bold => "bold",
            Mark::Italic => "italic",
            Mark::Underline => "underline",
            Mark::Strike => "strike",
            Mark::Code => "code",
            Mark::Link { .. } => "link",
            Mark::Highlight { .. } => "highlight",
            Mark::Unknown { kind, .. } => kind,
        }
    }

    /// Wrapping order: lower values sit closer to the text.
    /// Unknown marks have no precedence and are never rendered.
    pub fn precedence(&self) -> Option<u8> {
        match self {
            Mark::Bold => Some(0),
            Mark::Italic => Some(1),
            Mark::Underline => Some(2),
            Mark::Strike => Some(3),
            Mark::Code => Some(4),
            Mark::Link { .. } => Some(5),
            Mark::Highlight { .. } => Some(6),
            Mark::Unknown { .. } => None,
        }
    }
}

/// Clamp a stored heading level into the valid `1..=6` range.
pub fn clamp_heading_level(level: i64) -> u8 {
    level.clamp(1, 6) as u8
}
