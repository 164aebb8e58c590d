use crate::lexer::Lexer;
use crate::rules::RuleTable;
use crate::scroll::SourceAnchor;

use super::{NodeSurface, ReconcileStats, RenderedNode, line_breaks, reconcile, source_anchors};

/// Overlay geometry.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct EditorMetrics {
    /// Height of one source line.
    pub line_height: f64,
    /// The editable control is never shorter than this.
    pub min_height: f64,
}

impl Default for EditorMetrics {
    fn default() -> Self {
        Self {
            line_height: 1.0,
            min_height: 100.0,
        }
    }
}

/// Owns the overlay of an editable buffer and re-highlights it on input.
#[derive(Debug)]
pub struct Decorator<'r, S = Vec<RenderedNode>> {
    lexer: Lexer<'r>,
    nodes: S,
    metrics: EditorMetrics,
    editor_height: f64,
}

impl<'r> Decorator<'r> {
    pub fn new(rules: &'r RuleTable, metrics: EditorMetrics) -> Self {
        Self::with_surface(rules, metrics, Vec::new())
    }
}

impl<'r, S: NodeSurface> Decorator<'r, S> {
    pub fn with_surface(rules: &'r RuleTable, metrics: EditorMetrics, nodes: S) -> Self {
        let mut decorator = Self {
            lexer: Lexer::new(rules),
            nodes,
            metrics,
            editor_height: metrics.min_height,
        };
        decorator.recalc_height();
        decorator
    }

    /// Re-highlights after the buffer changed to `text`.
    pub fn update(&mut self, text: &str) -> ReconcileStats {
        let stats = if text.is_empty() {
            let removed = self.nodes.len();
            self.nodes.clear();
            ReconcileStats {
                removed,
                ..ReconcileStats::default()
            }
        } else {
            let tokens = self.lexer.tokenize(text);
            reconcile(&mut self.nodes, &tokens)
        };
        self.recalc_height();
        log::debug!(
            "overlay reconciled: {} nodes, kept {}+{}, updated {}, inserted {}, removed {}",
            self.nodes.len(),
            stats.prefix,
            stats.suffix,
            stats.updated,
            stats.inserted,
            stats.removed
        );
        stats
    }

    pub fn nodes(&self) -> &S {
        &self.nodes
    }

    pub fn metrics(&self) -> EditorMetrics {
        self.metrics
    }

    /// Height of the rendered overlay.
    pub fn overlay_height(&self) -> f64 {
        if self.nodes.is_empty() {
            return 0.0;
        }
        (line_breaks(&self.nodes) + 1) as f64 * self.metrics.line_height
    }

    /// Height the editable control must have to cover its overlay.
    pub fn editor_height(&self) -> f64 {
        self.editor_height
    }

    pub fn source_anchors(&self) -> Vec<SourceAnchor> {
        source_anchors(&self.nodes, self.metrics.line_height)
    }

    fn recalc_height(&mut self) {
        self.editor_height = self.overlay_height().max(self.metrics.min_height);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::rules::markdown_rules;

    fn metrics() -> EditorMetrics {
        EditorMetrics {
            line_height: 10.0,
            min_height: 30.0,
        }
    }

    #[test]
    fn height_never_drops_below_minimum() {
        let mut decorator = Decorator::new(markdown_rules(), metrics());
        assert_eq!(decorator.editor_height(), 30.0);

        decorator.update("one line");
        assert_eq!(decorator.overlay_height(), 10.0);
        assert_eq!(decorator.editor_height(), 30.0);
    }

    #[test]
    fn height_follows_overlay() {
        let mut decorator = Decorator::new(markdown_rules(), metrics());
        decorator.update("a\nb\nc\nd\ne");
        assert_eq!(decorator.editor_height(), 50.0);

        decorator.update("a");
        assert_eq!(decorator.editor_height(), 30.0);
    }

    #[test]
    fn empty_text_clears_the_overlay() {
        let mut decorator = Decorator::new(markdown_rules(), metrics());
        decorator.update("# a\n\nb");
        let stats = decorator.update("");
        assert!(decorator.nodes().is_empty());
        assert_eq!(stats.removed, 4);
    }

    #[test]
    fn typing_touches_only_the_edited_block() {
        let mut decorator = Decorator::new(markdown_rules(), metrics());
        decorator.update("# Title\n\nfirst\n\nsecond\n\nthird");
        let stats = decorator.update("# Title\n\nfirst\n\nsecondx\n\nthird");
        assert_eq!(stats.updated, 1);
        assert_eq!(stats.inserted, 0);
        assert_eq!(stats.removed, 0);
        assert_eq!(decorator.nodes()[5].text, "secondx\n");
    }

    #[test]
    fn anchors_use_line_height() {
        let mut decorator = Decorator::new(markdown_rules(), metrics());
        decorator.update("a\n\nb\n\nc");
        let anchors = decorator.source_anchors();
        assert_eq!(
            anchors,
            vec![
                SourceAnchor {
                    delta: 2,
                    offset: 20.0
                },
                SourceAnchor {
                    delta: 2,
                    offset: 40.0
                },
            ]
        );
    }
}
