//! # Scroll Synchronization
//!
//! Keeps the source pane and the preview pane showing the same part of the
//! document. Both panes tag the start of each block with its source line;
//! [`PositionMap`] pairs the offsets of lines present in both and
//! interpolates between them. [`SyncScroll`] listens to the pane the user is
//! scrolling and steers the other one with an [`Animator`].

pub mod animator;
pub mod map;
pub mod sync;

pub use animator::{Animator, DEFAULT_ANIMATION_MS, Motion, Sample};
pub use map::{
    Extents, PositionMap, PreviewAnchor, ScrollMap, SourceAnchor, accumulate_lines, find_bisect,
};
pub use sync::{DEFAULT_END_SLACK, ScrollHost, SyncScroll};

use thiserror::Error;

/// One of the two synchronized panes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Pane {
    /// The editable text with its highlighted overlay.
    Source,
    /// The rendered preview.
    Result,
}

impl Pane {
    pub fn other(self) -> Self {
        match self {
            Pane::Source => Pane::Result,
            Pane::Result => Pane::Source,
        }
    }
}

/// Visible window of a pane.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct Viewport {
    pub scroll_top: f64,
    pub height: f64,
}

#[derive(Debug, Error)]
pub enum ScrollError {
    #[error("Scroll map columns differ in length: {source_len} source vs {result_len} result")]
    LengthMismatch {
        source_len: usize,
        result_len: usize,
    },
    #[error("Scroll map has no entries")]
    EmptyMap,
}
