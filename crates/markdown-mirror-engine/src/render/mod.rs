//! # Incremental View Renderer
//!
//! Keeps the highlighted overlay in step with the lexer output. Instead of
//! rebuilding the overlay on every keystroke, [`reconcile`] skips the common
//! prefix and suffix of the old nodes and the new tokens, rewrites the nodes
//! in between, and inserts or removes only the difference in count.
//!
//! The node list lives behind [`NodeSurface`] so that a host can mirror each
//! change onto its own widgets; `Vec<RenderedNode>` is the plain in-memory
//! surface.

pub mod decorator;

pub use decorator::Decorator;

use crate::lexer::Token;
use crate::rules::{BlockType, InlineKind};
use crate::scroll::SourceAnchor;

/// A visual element paired with one token.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RenderedNode {
    pub text: String,
    pub block: BlockType,
    pub inline: Option<InlineKind>,
    /// Line delta since the previous anchor, when this node starts a block.
    pub anchor: Option<u32>,
}

impl RenderedNode {
    pub fn from_token(token: &Token) -> Self {
        Self {
            text: token.text.clone(),
            block: token.block,
            inline: token.inline,
            anchor: (token.line != 0).then_some(token.line),
        }
    }

    /// Composite class, with `block-start` appended on anchored nodes.
    pub fn class(&self) -> String {
        let inline = self.inline.map_or("", InlineKind::as_str);
        if self.anchor.is_some() {
            format!("{} {} block-start", self.block, inline)
        } else {
            format!("{} {}", self.block, inline)
        }
    }

    /// Whether this node can stay in place for `token`.
    ///
    /// A node without an anchor accepts any line number.
    pub fn matches(&self, token: &Token) -> bool {
        self.text == token.text
            && self.block == token.block
            && self.anchor.is_none_or(|line| line == token.line)
    }
}

/// A mutable, ordered list of rendered nodes.
pub trait NodeSurface {
    fn len(&self) -> usize;

    fn is_empty(&self) -> bool {
        self.len() == 0
    }

    fn node(&self, index: usize) -> &RenderedNode;

    fn remove(&mut self, index: usize);

    fn insert(&mut self, index: usize, node: RenderedNode);

    /// Rewrite the node at `index` in place.
    fn update(&mut self, index: usize, node: RenderedNode);

    fn clear(&mut self);
}

impl NodeSurface for Vec<RenderedNode> {
    fn len(&self) -> usize {
        Vec::len(self)
    }

    fn node(&self, index: usize) -> &RenderedNode {
        &self[index]
    }

    fn remove(&mut self, index: usize) {
        Vec::remove(self, index);
    }

    fn insert(&mut self, index: usize, node: RenderedNode) {
        Vec::insert(self, index, node);
    }

    fn update(&mut self, index: usize, node: RenderedNode) {
        self[index] = node;
    }

    fn clear(&mut self) {
        Vec::clear(self);
    }
}

/// What a call to [`reconcile`] touched.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ReconcileStats {
    /// Leading nodes left untouched.
    pub prefix: usize,
    /// Trailing nodes left untouched.
    pub suffix: usize,
    pub removed: usize,
    pub updated: usize,
    pub inserted: usize,
}

impl ReconcileStats {
    /// Nothing was removed, rewritten or inserted.
    pub fn is_noop(&self) -> bool {
        self.removed == 0 && self.updated == 0 && self.inserted == 0
    }
}

/// Makes `nodes` mirror `tokens`, one node per token, changing as little as
/// possible.
pub fn reconcile<S: NodeSurface + ?Sized>(nodes: &mut S, tokens: &[Token]) -> ReconcileStats {
    let mut stats = ReconcileStats::default();

    let mut first = 0;
    while first < tokens.len() && first < nodes.len() && nodes.node(first).matches(&tokens[first])
    {
        first += 1;
    }
    stats.prefix = first;

    while tokens.len() < nodes.len() {
        nodes.remove(first);
        stats.removed += 1;
    }

    // Inclusive ends of the changed range; -1 when empty.
    let mut last_new = tokens.len() as isize - 1;
    let mut last_old = nodes.len() as isize - 1;
    while (first as isize) < last_old
        && nodes
            .node(last_old as usize)
            .matches(&tokens[last_new as usize])
    {
        last_new -= 1;
        last_old -= 1;
    }
    stats.suffix = (nodes.len() as isize - 1 - last_old) as usize;

    let mut index = first;
    while index as isize <= last_old {
        nodes.update(index, RenderedNode::from_token(&tokens[index]));
        stats.updated += 1;
        index += 1;
    }

    while index as isize <= last_new {
        nodes.insert(index, RenderedNode::from_token(&tokens[index]));
        stats.inserted += 1;
        index += 1;
    }

    debug_assert_eq!(nodes.len(), tokens.len(), "node/token parity after reconcile");
    stats
}

/// Total line breaks in the rendered text.
pub fn line_breaks<S: NodeSurface + ?Sized>(nodes: &S) -> usize {
    (0..nodes.len())
        .map(|i| nodes.node(i).text.matches('\n').count())
        .sum()
}

/// Anchored nodes with their vertical offsets, for the scroll map.
///
/// Assumes every source line takes exactly `line_height`.
pub fn source_anchors<S: NodeSurface + ?Sized>(nodes: &S, line_height: f64) -> Vec<SourceAnchor> {
    let mut anchors = Vec::new();
    let mut row = 0usize;
    for i in 0..nodes.len() {
        let node = nodes.node(i);
        if let Some(delta) = node.anchor {
            anchors.push(SourceAnchor {
                delta,
                offset: row as f64 * line_height,
            });
        }
        row += node.text.matches('\n').count();
    }
    anchors
}
