//! Terminal styling of the highlighted source overlay.

use markdown_mirror_engine::{BlockKind, BlockType, InlineKind, RenderedNode};
use ratatui::style::{Color, Modifier, Style};
use ratatui::text::{Line, Span};

const TAB: &str = "    ";

/// Columns a tab takes in the source pane.
pub const TAB_WIDTH: usize = TAB.len();

fn block_style(block: BlockType) -> Style {
    if block.is_mark {
        return match block.kind {
            BlockKind::Header => Style::default().fg(Color::DarkGray),
            BlockKind::Quote => Style::default().fg(Color::Green),
            _ => Style::default().fg(Color::Yellow),
        };
    }
    match block.kind {
        BlockKind::Header | BlockKind::Header2 => Style::default()
            .fg(Color::Cyan)
            .add_modifier(Modifier::BOLD),
        BlockKind::Quote => Style::default()
            .fg(Color::Green)
            .add_modifier(Modifier::ITALIC),
        BlockKind::Fence => Style::default().fg(Color::Magenta),
        BlockKind::LatexBlock => Style::default().fg(Color::Blue),
        BlockKind::Reference | BlockKind::Rule => Style::default().fg(Color::DarkGray),
        BlockKind::List | BlockKind::Empty | BlockKind::Paragraph => Style::default(),
    }
}

fn inline_style(inline: InlineKind) -> Style {
    match inline {
        InlineKind::Bold => Style::default().add_modifier(Modifier::BOLD),
        InlineKind::Italic => Style::default().add_modifier(Modifier::ITALIC),
        InlineKind::Strike => Style::default().add_modifier(Modifier::CROSSED_OUT),
        InlineKind::Code => Style::default().fg(Color::Magenta),
        InlineKind::Link => Style::default()
            .fg(Color::Blue)
            .add_modifier(Modifier::UNDERLINED),
        InlineKind::Latex | InlineKind::Delimiter => Style::default().fg(Color::Blue),
        InlineKind::Sup | InlineKind::Sub => Style::default().add_modifier(Modifier::DIM),
        InlineKind::Comment | InlineKind::Reference => Style::default().fg(Color::DarkGray),
        InlineKind::Keyword | InlineKind::Keyword2 | InlineKind::Keyword3 => {
            Style::default().fg(Color::Cyan)
        }
        InlineKind::Bracket => Style::default().fg(Color::Yellow),
        InlineKind::Index => Style::default().fg(Color::LightBlue),
    }
}

pub fn node_style(node: &RenderedNode) -> Style {
    let style = block_style(node.block);
    match node.inline {
        Some(inline) => style.patch(inline_style(inline)),
        None => style,
    }
}

/// Lays the overlay nodes out as terminal rows, one per source line.
pub fn source_lines<'a, I>(nodes: I) -> Vec<Line<'static>>
where
    I: IntoIterator<Item = &'a RenderedNode>,
{
    let mut lines = Vec::new();
    let mut spans: Vec<Span<'static>> = Vec::new();
    for node in nodes {
        let style = node_style(node);
        let mut pieces = node.text.split('\n');
        if let Some(first) = pieces.next()
            && !first.is_empty()
        {
            spans.push(Span::styled(first.replace('\t', TAB), style));
        }
        for piece in pieces {
            lines.push(Line::from(std::mem::take(&mut spans)));
            if !piece.is_empty() {
                spans.push(Span::styled(piece.replace('\t', TAB), style));
            }
        }
    }
    lines.push(Line::from(spans));
    lines
}

#[cfg(test)]
mod tests {
    use super::*;
    use markdown_mirror_engine::{reconcile, tokenize};
    use pretty_assertions::assert_eq;

    fn nodes(text: &str) -> Vec<RenderedNode> {
        let mut nodes = Vec::new();
        reconcile(&mut nodes, &tokenize(text));
        nodes
    }

    fn plain(lines: &[Line]) -> Vec<String> {
        lines.iter().map(|l| l.to_string()).collect()
    }

    #[test]
    fn one_row_per_source_line() {
        let lines = source_lines(&nodes("# Title\n\nSome *text*.\n- a\tb"));
        assert_eq!(
            plain(&lines),
            vec!["# Title", "", "Some *text*.", "- a    b"]
        );
    }

    #[test]
    fn trailing_break_leaves_an_empty_row() {
        let lines = source_lines(&nodes("a\n"));
        // The overlay pads a trailing break with a space.
        assert_eq!(plain(&lines), vec!["a", " "]);
    }

    #[test]
    fn inline_style_is_layered_on_the_block() {
        let nodes = nodes("# Title *x*");
        let italic = nodes
            .iter()
            .find(|n| n.inline == Some(InlineKind::Italic))
            .unwrap();
        let style = node_style(italic);
        assert_eq!(style.fg, Some(Color::Cyan));
        assert!(style.add_modifier.contains(Modifier::BOLD | Modifier::ITALIC));
    }

    #[test]
    fn markers_are_dimmed() {
        let nodes = nodes("# Title");
        assert_eq!(node_style(&nodes[0]).fg, Some(Color::DarkGray));
    }
}
