//! Wrapping the preview blocks into terminal rows.

use markdown_mirror_engine::scroll::PreviewAnchor;
use markdown_mirror_engine::{PreviewBlock, PreviewKind};
use ratatui::style::{Color, Modifier, Style};
use ratatui::text::Line;
use unicode_width::{UnicodeWidthChar, UnicodeWidthStr};

/// The preview pane as rows, with the row each block starts on.
#[derive(Debug, Clone, Default)]
pub struct PreviewLayout {
    lines: Vec<Line<'static>>,
    anchors: Vec<PreviewAnchor>,
}

impl PreviewLayout {
    pub fn new(blocks: &[PreviewBlock], width: u16) -> Self {
        let width = usize::from(width).max(1);
        let mut lines = Vec::new();
        let mut anchors = Vec::with_capacity(blocks.len());

        for block in blocks {
            if !lines.is_empty() {
                lines.push(Line::default());
            }
            anchors.push(PreviewAnchor {
                line: block.line,
                offset: lines.len() as f64,
            });

            let style = block_style(block.kind);
            match block.kind {
                PreviewKind::Rule => lines.push(Line::styled("─".repeat(width), style)),
                PreviewKind::Quote => {
                    let inner = width.saturating_sub(2).max(1);
                    lines.extend(
                        wrap(&block.text, inner)
                            .into_iter()
                            .map(|row| Line::styled(format!("│ {row}"), style)),
                    );
                }
                _ => lines.extend(
                    wrap(&block.text, width)
                        .into_iter()
                        .map(|row| Line::styled(row, style)),
                ),
            }
        }

        Self { lines, anchors }
    }

    pub fn lines(&self) -> &[Line<'static>] {
        &self.lines
    }

    /// Start rows of the blocks, tagged with their source lines.
    pub fn anchors(&self) -> &[PreviewAnchor] {
        &self.anchors
    }

    pub fn height(&self) -> usize {
        self.lines.len()
    }
}

fn block_style(kind: PreviewKind) -> Style {
    match kind {
        PreviewKind::Heading(1) => Style::default()
            .fg(Color::Cyan)
            .add_modifier(Modifier::BOLD | Modifier::UNDERLINED),
        PreviewKind::Heading(_) => Style::default()
            .fg(Color::Cyan)
            .add_modifier(Modifier::BOLD),
        PreviewKind::Quote => Style::default()
            .fg(Color::Green)
            .add_modifier(Modifier::ITALIC),
        PreviewKind::Code => Style::default().fg(Color::Magenta),
        PreviewKind::Rule | PreviewKind::Html => Style::default().fg(Color::DarkGray),
        PreviewKind::Paragraph | PreviewKind::List | PreviewKind::Table | PreviewKind::Other => {
            Style::default()
        }
    }
}

/// Greedy word wrap to `width` columns. Leading indentation is kept on the
/// first row of each line; words wider than a row are split.
pub fn wrap(text: &str, width: usize) -> Vec<String> {
    let width = width.max(1);
    let mut rows = Vec::new();

    for line in text.split('\n') {
        let indent = &line[..line.len() - line.trim_start().len()];
        let mut row = indent.to_string();
        let mut row_width = indent.width();
        let mut has_word = false;

        for word in line.split_whitespace() {
            let needed = word.width() + usize::from(has_word);
            if has_word && row_width + needed > width {
                rows.push(std::mem::take(&mut row));
                row_width = 0;
                has_word = false;
            }
            if has_word {
                row.push(' ');
                row_width += 1;
            }
            for ch in word.chars() {
                let ch_width = ch.width().unwrap_or(0);
                if row_width > 0 && row_width + ch_width > width {
                    rows.push(std::mem::take(&mut row));
                    row_width = 0;
                }
                row.push(ch);
                row_width += ch_width;
            }
            has_word = true;
        }
        rows.push(row);
    }
    rows
}
