//! Engine of a live Markdown editor: a rule-driven lexer for the highlighted
//! source overlay, an incremental renderer that patches the overlay on each
//! edit, a `pulldown-cmark` preview with line-tagged blocks, and the scroll
//! synchronization between the two panes.

pub mod lexer;
pub mod preview;
pub mod render;
pub mod rules;
pub mod scroll;

// Re-export key types for easier usage
pub use lexer::{Lexer, Token, normalize_input, tokenize};
pub use preview::{PreviewBlock, PreviewKind, PreviewRenderer};
pub use render::{
    Decorator, NodeSurface, ReconcileStats, RenderedNode, decorator::EditorMetrics, reconcile,
};
pub use rules::{
    BlockKind, BlockType, InlineKind, RuleError, RuleOptions, RuleTable, RuleTableBuilder,
    markdown_rules,
};
pub use scroll::{Animator, Pane, PositionMap, ScrollError, ScrollHost, SyncScroll, Viewport};
