use std::fmt;

/// The kind of a top-level block span.
///
/// The set is closed: every per-block lookup in a [`RuleTable`](super::RuleTable)
/// is an array indexed by [`BlockKind::index`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum BlockKind {
    /// `$$ … $$` display formula.
    LatexBlock,
    /// One or more blank lines.
    Empty,
    /// ```` ``` ```` fenced block.
    Fence,
    /// `[label]: target` link reference definition.
    Reference,
    /// ATX heading (`# Title`).
    Header,
    /// Setext heading (text underlined with `===` or `---`).
    Header2,
    /// Thematic break.
    Rule,
    /// List item, including its lazy continuation lines.
    List,
    /// Block quote line.
    Quote,
    /// Catch-all.
    Paragraph,
}

impl BlockKind {
    pub const COUNT: usize = 10;

    pub const ALL: [BlockKind; Self::COUNT] = [
        BlockKind::LatexBlock,
        BlockKind::Empty,
        BlockKind::Fence,
        BlockKind::Reference,
        BlockKind::Header,
        BlockKind::Header2,
        BlockKind::Rule,
        BlockKind::List,
        BlockKind::Quote,
        BlockKind::Paragraph,
    ];

    pub fn index(self) -> usize {
        self as usize
    }

    /// The class name used by the overlay.
    pub fn as_str(self) -> &'static str {
        match self {
            BlockKind::LatexBlock => "latex-block",
            BlockKind::Empty => "empty",
            BlockKind::Fence => "fence",
            BlockKind::Reference => "reference",
            BlockKind::Header => "header",
            BlockKind::Header2 => "header2",
            BlockKind::Rule => "rule",
            BlockKind::List => "list",
            BlockKind::Quote => "quote",
            BlockKind::Paragraph => "paragraph",
        }
    }
}

impl fmt::Display for BlockKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// The kind of an inline sub-span.
///
/// Covers both the global inline rules and the rules only used inside
/// LaTeX blocks.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum InlineKind {
    Latex,
    Link,
    Bold,
    Italic,
    Strike,
    Sup,
    Sub,
    Code,
    Comment,
    Reference,
    Index,
    Bracket,
    Keyword,
    Keyword2,
    Keyword3,
    Delimiter,
}

impl InlineKind {
    pub fn as_str(self) -> &'static str {
        match self {
            InlineKind::Latex => "latex",
            InlineKind::Link => "link",
            InlineKind::Bold => "bold",
            InlineKind::Italic => "italic",
            InlineKind::Strike => "strike",
            InlineKind::Sup => "sup",
            InlineKind::Sub => "sub",
            InlineKind::Code => "code",
            InlineKind::Comment => "comment",
            InlineKind::Reference => "reference",
            InlineKind::Index => "index",
            InlineKind::Bracket => "bracket",
            InlineKind::Keyword => "keyword",
            InlineKind::Keyword2 => "keyword2",
            InlineKind::Keyword3 => "keyword3",
            InlineKind::Delimiter => "delimiter",
        }
    }
}

impl fmt::Display for InlineKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Block type carried by a token: the block kind, or its leading marker.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct BlockType {
    pub kind: BlockKind,
    pub is_mark: bool,
}

impl BlockType {
    pub fn block(kind: BlockKind) -> Self {
        Self {
            kind,
            is_mark: false,
        }
    }

    pub fn mark(kind: BlockKind) -> Self {
        Self {
            kind,
            is_mark: true,
        }
    }
}

impl From<BlockKind> for BlockType {
    fn from(kind: BlockKind) -> Self {
        Self::block(kind)
    }
}

impl fmt::Display for BlockType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_mark {
            write!(f, "{}-mark", self.kind)
        } else {
            write!(f, "{}", self.kind)
        }
    }
}
