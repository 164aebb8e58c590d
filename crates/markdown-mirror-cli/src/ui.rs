use markdown_mirror_engine::Pane;
use ratatui::{
    Frame,
    layout::{Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Paragraph},
};

use crate::app::App;

/// Outer areas of the source pane, the preview pane and the help line.
pub fn areas(area: Rect) -> (Rect, Rect, Rect) {
    let rows = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Min(0), Constraint::Length(1)].as_ref())
        .split(area);
    let panes = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Percentage(50), Constraint::Percentage(50)].as_ref())
        .split(rows[0]);
    (panes[0], panes[1], rows[1])
}

/// Text areas of the two panes, inside their borders.
pub fn pane_areas(area: Rect) -> (Rect, Rect) {
    let (source, result, _) = areas(area);
    (inner(source), inner(result))
}

fn inner(area: Rect) -> Rect {
    Block::default().borders(Borders::ALL).inner(area)
}

fn visible(lines: &[Line<'static>], top: usize, height: u16) -> Vec<Line<'static>> {
    lines
        .iter()
        .skip(top)
        .take(usize::from(height))
        .cloned()
        .collect()
}

fn pane_block(title: String, driving: bool) -> Block<'static> {
    let border = if driving {
        Style::default().fg(Color::Yellow)
    } else {
        Style::default().fg(Color::DarkGray)
    };
    Block::default()
        .borders(Borders::ALL)
        .border_style(border)
        .title(title)
}

pub fn ui(f: &mut Frame, app: &App) {
    let (source_area, result_area, help_area) = areas(f.area());
    let view = app.view();
    let driving = app.driving();

    let file_name = app
        .path()
        .file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .unwrap_or_default();

    let marker = if app.is_dirty() { " [+]" } else { "" };
    let source_top = view.top_row(Pane::Source);
    let source_inner = inner(source_area);
    let source = Paragraph::new(visible(view.source_lines(), source_top, source_inner.height))
        .block(pane_block(
            format!("Source: {file_name}{marker}"),
            driving == Pane::Source,
        ));
    f.render_widget(source, source_area);

    if app.is_editing() {
        let (row, column) = app.cursor_position();
        if row >= source_top
            && row - source_top < usize::from(source_inner.height)
            && column < usize::from(source_inner.width)
        {
            f.set_cursor_position((
                source_inner.x + column as u16,
                source_inner.y + (row - source_top) as u16,
            ));
        }
    }

    let preview = Paragraph::new(visible(
        view.preview_lines(),
        view.top_row(Pane::Result),
        inner(result_area).height,
    ))
    .block(pane_block("Preview".to_string(), driving == Pane::Result));
    f.render_widget(preview, result_area);

    let help = match app.status() {
        Some(status) => Line::from(Span::styled(
            status.to_string(),
            Style::default().fg(Color::Red).add_modifier(Modifier::BOLD),
        )),
        None if app.is_editing() => Line::from(vec![
            Span::raw("Esc: Stop editing | "),
            Span::raw("Ctrl+S: Save | "),
            Span::raw("Arrows/Home/End: Move cursor"),
        ]),
        None => Line::from(vec![
            Span::raw("q: Quit | "),
            Span::raw("i: Edit | "),
            Span::raw("j/k ↑/↓ PgUp/PgDn: Scroll | "),
            Span::raw("Tab: Switch pane | "),
            Span::raw("Mouse wheel scrolls the pane under the pointer"),
        ]),
    };
    f.render_widget(Paragraph::new(help), help_area);
}
