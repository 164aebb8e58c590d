use anyhow::{Context, Result};
use crossterm::event::{KeyCode, KeyEvent, KeyModifiers, MouseEvent, MouseEventKind};
use markdown_mirror_config::Config;
use markdown_mirror_engine::scroll::{Extents, PositionMap, ScrollHost, SyncScroll};
use markdown_mirror_engine::{
    Decorator, Pane, PreviewBlock, PreviewRenderer, ReconcileStats, RuleTable, Viewport,
};
use ratatui::layout::Rect;
use ratatui::text::Line;
use std::path::{Path, PathBuf};
use std::time::{Duration, Instant, SystemTime};
use unicode_width::UnicodeWidthChar;

use crate::highlight::{TAB_WIDTH, source_lines};
use crate::layout::PreviewLayout;

/// Rows moved per mouse wheel notch.
const WHEEL_ROWS: f64 = 3.0;

/// How often the file is checked for changes.
const RELOAD_INTERVAL: Duration = Duration::from_millis(250);

/// Everything the scroll sync needs to see of the two panes.
pub struct View<'r> {
    decorator: Decorator<'r>,
    source_lines: Vec<Line<'static>>,
    layout: PreviewLayout,
    source: Viewport,
    result: Viewport,
    source_area: Rect,
    result_area: Rect,
    end_slack: f64,
}

impl View<'_> {
    fn line_height(&self) -> f64 {
        self.decorator.metrics().line_height
    }

    /// Scrollable height of `pane`, which is its content.
    fn extent(&self, pane: Pane) -> f64 {
        match pane {
            Pane::Source => self.decorator.overlay_height(),
            Pane::Result => self.layout.height() as f64,
        }
    }

    fn max_scroll(&self, pane: Pane) -> f64 {
        (self.extent(pane) - self.viewport(pane).height).max(0.0)
    }

    fn viewport_mut(&mut self, pane: Pane) -> &mut Viewport {
        match pane {
            Pane::Source => &mut self.source,
            Pane::Result => &mut self.result,
        }
    }

    /// First visible row of `pane`.
    pub fn top_row(&self, pane: Pane) -> usize {
        let top = self.viewport(pane).scroll_top;
        let rows = match pane {
            Pane::Source => top / self.line_height(),
            Pane::Result => top,
        };
        rows.round().max(0.0) as usize
    }

    pub fn source_lines(&self) -> &[Line<'static>] {
        &self.source_lines
    }

    pub fn preview_lines(&self) -> &[Line<'static>] {
        self.layout.lines()
    }

    fn relayout(&mut self, blocks: &[PreviewBlock]) {
        self.layout = PreviewLayout::new(blocks, self.result_area.width);
        self.source_lines = source_lines(self.decorator.nodes());
        for pane in [Pane::Source, Pane::Result] {
            let top = self.viewport(pane).scroll_top;
            self.set_scroll_top(pane, top);
        }
    }
}

impl ScrollHost for View<'_> {
    fn viewport(&self, pane: Pane) -> Viewport {
        match pane {
            Pane::Source => self.source,
            Pane::Result => self.result,
        }
    }

    fn set_scroll_top(&mut self, pane: Pane, scroll_top: f64) {
        let max = self.max_scroll(pane);
        self.viewport_mut(pane).scroll_top = scroll_top.clamp(0.0, max);
    }

    fn build_map(&self) -> PositionMap {
        PositionMap::from_anchors(
            self.layout.anchors(),
            &self.decorator.source_anchors(),
            Extents {
                source: self.extent(Pane::Source),
                result: self.extent(Pane::Result),
            },
            self.end_slack,
        )
    }
}

pub struct App<'r> {
    path: PathBuf,
    modified: Option<SystemTime>,
    last_reload_check: Instant,
    text: String,
    preview: PreviewRenderer,
    blocks: Vec<PreviewBlock>,
    view: View<'r>,
    sync: SyncScroll,
    started: Instant,
    status: Option<String>,
    editing: bool,
    /// Byte offset of the edit cursor in `text`.
    cursor: usize,
    dirty: bool,
    last_reconcile: ReconcileStats,
}

impl<'r> App<'r> {
    pub fn open(path: &Path, rules: &'r RuleTable, config: &Config) -> Result<Self> {
        let text = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read {}", path.display()))?;
        let mut app = Self::with_text(path, text, rules, config);
        app.modified = modified_time(path);
        log::info!("opened {}", path.display());
        Ok(app)
    }

    /// An app showing `text` as if it were read from `path`.
    pub fn with_text(path: &Path, text: String, rules: &'r RuleTable, config: &Config) -> Self {
        let mut decorator = Decorator::new(rules, config.editor_metrics());
        let last_reconcile = decorator.update(&text);
        let preview = PreviewRenderer::new();
        let blocks = preview.blocks(&text);

        let mut view = View {
            decorator,
            source_lines: Vec::new(),
            layout: PreviewLayout::default(),
            source: Viewport::default(),
            result: Viewport::default(),
            source_area: Rect::default(),
            result_area: Rect::default(),
            end_slack: config.scroll.end_slack,
        };
        view.relayout(&blocks);

        Self {
            path: path.to_path_buf(),
            modified: None,
            last_reload_check: Instant::now(),
            text,
            preview,
            blocks,
            view,
            sync: SyncScroll::new(config.scroll.animation_ms),
            started: Instant::now(),
            status: None,
            editing: false,
            cursor: 0,
            dirty: false,
            last_reconcile,
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn view(&self) -> &View<'r> {
        &self.view
    }

    pub fn driving(&self) -> Pane {
        self.sync.driving()
    }

    pub fn status(&self) -> Option<&str> {
        self.status.as_deref()
    }

    pub fn text(&self) -> &str {
        &self.text
    }

    pub fn is_editing(&self) -> bool {
        self.editing
    }

    /// The buffer has edits that are not saved yet.
    pub fn is_dirty(&self) -> bool {
        self.dirty
    }

    /// What the last change of the buffer did to the overlay.
    pub fn last_reconcile(&self) -> ReconcileStats {
        self.last_reconcile
    }

    /// Row and display column of the edit cursor in the source pane.
    pub fn cursor_position(&self) -> (usize, usize) {
        let before = &self.text[..self.cursor];
        let row = before.matches('\n').count();
        let column = before[line_start(before, self.cursor)..]
            .chars()
            .map(|ch| match ch {
                '\t' => TAB_WIDTH,
                '\r' => 0,
                ch => ch.width().unwrap_or(0),
            })
            .sum();
        (row, column)
    }

    pub fn is_animating(&self) -> bool {
        self.sync.is_animating()
    }

    /// Inner areas of the two panes, after a resize or on first draw.
    pub fn set_areas(&mut self, source: Rect, result: Rect) {
        if self.view.source_area == source && self.view.result_area == result {
            return;
        }
        self.view.source_area = source;
        self.view.result_area = result;
        self.view.source.height = f64::from(source.height) * self.view.line_height();
        self.view.result.height = f64::from(result.height);
        self.view.relayout(&self.blocks);
        self.sync.invalidate();
    }

    /// Handles a key press. Returns `true` to quit.
    pub fn handle_key(&mut self, key: KeyEvent) -> bool {
        if key.modifiers.contains(KeyModifiers::CONTROL) && key.code == KeyCode::Char('s') {
            self.save();
            return false;
        }
        if self.editing {
            self.handle_edit_key(key);
            return false;
        }

        let pane = self.sync.driving();
        let page = self.page_rows(pane);
        match key.code {
            KeyCode::Char('q') | KeyCode::Esc => return true,
            KeyCode::Tab => self.sync.switch_to(pane.other()),
            KeyCode::Down | KeyCode::Char('j') => self.scroll_by(pane, 1.0),
            KeyCode::Up | KeyCode::Char('k') => self.scroll_by(pane, -1.0),
            KeyCode::PageDown | KeyCode::Char(' ') => self.scroll_by(pane, page),
            KeyCode::PageUp => self.scroll_by(pane, -page),
            KeyCode::Home | KeyCode::Char('g') => self.scroll_to(pane, 0.0),
            KeyCode::End | KeyCode::Char('G') => self.scroll_to(pane, f64::INFINITY),
            KeyCode::Char('i') => self.start_editing(),
            _ => {}
        }
        false
    }

    fn handle_edit_key(&mut self, key: KeyEvent) {
        if key
            .modifiers
            .intersects(KeyModifiers::CONTROL | KeyModifiers::ALT)
        {
            return;
        }
        match key.code {
            KeyCode::Esc => {
                self.editing = false;
                return;
            }
            KeyCode::Char(ch) => self.insert(ch.encode_utf8(&mut [0; 4])),
            KeyCode::Enter => self.insert("\n"),
            KeyCode::Tab => self.insert("\t"),
            KeyCode::Backspace => {
                let end = self.cursor;
                self.cursor = prev_boundary(&self.text, end);
                self.remove(self.cursor..end);
            }
            KeyCode::Delete => {
                let end = next_boundary(&self.text, self.cursor);
                self.remove(self.cursor..end);
            }
            KeyCode::Left => self.cursor = prev_boundary(&self.text, self.cursor),
            KeyCode::Right => self.cursor = next_boundary(&self.text, self.cursor),
            KeyCode::Up => self.move_vertically(false),
            KeyCode::Down => self.move_vertically(true),
            KeyCode::Home => self.cursor = line_start(&self.text, self.cursor),
            KeyCode::End => self.cursor = line_end(&self.text, self.cursor),
            _ => return,
        }
        self.follow_cursor();
    }

    /// Starts editing the source at the cursor, or at the top visible line
    /// when the cursor is scrolled out of view.
    fn start_editing(&mut self) {
        self.editing = true;
        self.sync.switch_to(Pane::Source);
        let (row, _) = self.cursor_position();
        let top = self.view.top_row(Pane::Source);
        let rows = usize::from(self.view.source_area.height.max(1));
        if row < top || row >= top + rows {
            self.cursor = line_offset(&self.text, top);
        }
    }

    fn insert(&mut self, inserted: &str) {
        let mut text = self.text.clone();
        text.insert_str(self.cursor, inserted);
        self.cursor += inserted.len();
        self.edit(text);
    }

    fn remove(&mut self, range: std::ops::Range<usize>) {
        if range.is_empty() {
            return;
        }
        let mut text = self.text.clone();
        text.replace_range(range, "");
        self.edit(text);
    }

    fn edit(&mut self, text: String) {
        self.dirty = true;
        self.set_text(text);
    }

    fn move_vertically(&mut self, down: bool) {
        let start = line_start(&self.text, self.cursor);
        let column = self.text[start..self.cursor].chars().count();
        let target = if down {
            let end = line_end(&self.text, self.cursor);
            if end == self.text.len() {
                return;
            }
            end + 1
        } else {
            if start == 0 {
                return;
            }
            line_start(&self.text, start - 1)
        };
        let target_end = line_end(&self.text, target);
        self.cursor = self.text[target..target_end]
            .char_indices()
            .nth(column)
            .map_or(target_end, |(offset, _)| target + offset);
    }

    /// Scrolls the source pane so the cursor row is visible.
    fn follow_cursor(&mut self) {
        let line_height = self.view.line_height();
        let (row, _) = self.cursor_position();
        let top = row as f64 * line_height;
        let viewport = self.view.viewport(Pane::Source);
        if top < viewport.scroll_top {
            self.scroll_to(Pane::Source, top);
        } else if top + line_height > viewport.scroll_top + viewport.height {
            self.scroll_to(Pane::Source, top + line_height - viewport.height);
        }
    }

    /// Writes the buffer back to its file.
    pub fn save(&mut self) {
        match std::fs::write(&self.path, &self.text) {
            Ok(()) => {
                self.dirty = false;
                self.modified = modified_time(&self.path);
                self.status = None;
                log::info!("saved {}", self.path.display());
            }
            Err(e) => {
                log::warn!("Failed to save {}: {e}", self.path.display());
                self.status = Some(format!("Failed to save: {e}"));
            }
        }
    }

    pub fn handle_mouse(&mut self, mouse: MouseEvent) {
        let Some(pane) = self.pane_at(mouse.column, mouse.row) else {
            return;
        };
        match mouse.kind {
            MouseEventKind::ScrollDown => self.scroll_by(pane, WHEEL_ROWS),
            MouseEventKind::ScrollUp => self.scroll_by(pane, -WHEEL_ROWS),
            MouseEventKind::Moved => self.sync.switch_to(pane),
            _ => {}
        }
    }

    /// Advances the follower's animation to now and polls the file.
    pub fn tick(&mut self) {
        let elapsed = self.started.elapsed().as_secs_f64() * 1000.0;
        self.tick_at(elapsed);
        if self.last_reload_check.elapsed() >= RELOAD_INTERVAL {
            self.last_reload_check = Instant::now();
            self.reload_if_changed();
        }
    }

    /// Advances the animation to `timestamp` milliseconds.
    pub fn tick_at(&mut self, timestamp: f64) {
        self.sync.frame(timestamp, &mut self.view);
    }

    pub fn reload_if_changed(&mut self) {
        let modified = modified_time(&self.path);
        if modified.is_some() && modified != self.modified {
            self.modified = modified;
            if self.dirty {
                log::warn!(
                    "{} changed on disk, keeping unsaved edits",
                    self.path.display()
                );
                self.status = Some("File changed on disk; unsaved edits kept".to_string());
            } else {
                self.reload();
            }
        }
    }

    /// Re-reads the file and re-highlights what changed.
    pub fn reload(&mut self) {
        match std::fs::read_to_string(&self.path) {
            Ok(text) => {
                self.set_text(text);
                self.status = None;
                log::info!("reloaded {}", self.path.display());
            }
            Err(e) => {
                log::warn!("Failed to reload {}: {e}", self.path.display());
                self.status = Some(format!("Failed to reload: {e}"));
            }
        }
    }

    pub fn set_text(&mut self, text: String) {
        if text == self.text {
            return;
        }
        self.last_reconcile = self.view.decorator.update(&text);
        self.blocks = self.preview.blocks(&text);
        self.text = text;
        self.cursor = self.cursor.min(self.text.len());
        while !self.text.is_char_boundary(self.cursor) {
            self.cursor -= 1;
        }
        self.view.relayout(&self.blocks);
        self.sync.invalidate();
    }

    fn scroll_by(&mut self, pane: Pane, rows: f64) {
        let delta = match pane {
            Pane::Source => rows * self.view.line_height(),
            Pane::Result => rows,
        };
        let top = self.view.viewport(pane).scroll_top + delta;
        self.scroll_to(pane, top);
    }

    /// Scrolls `pane` by hand, making it the driving pane.
    fn scroll_to(&mut self, pane: Pane, scroll_top: f64) {
        self.sync.switch_to(pane);
        self.sync.stop(pane);
        let before = self.view.viewport(pane).scroll_top;
        let top = if scroll_top.is_finite() {
            scroll_top
        } else {
            self.view.max_scroll(pane)
        };
        self.view.set_scroll_top(pane, top);
        if self.view.viewport(pane).scroll_top != before {
            self.sync.on_scroll(pane, &self.view);
        }
    }

    fn page_rows(&self, pane: Pane) -> f64 {
        let rows = match pane {
            Pane::Source => self.view.source_area.height,
            Pane::Result => self.view.result_area.height,
        };
        f64::from(rows.saturating_sub(1).max(1))
    }

    fn pane_at(&self, column: u16, row: u16) -> Option<Pane> {
        let contains = |area: Rect| {
            column >= area.x
                && column < area.x + area.width
                && row >= area.y
                && row < area.y + area.height
        };
        if contains(self.view.source_area) {
            Some(Pane::Source)
        } else if contains(self.view.result_area) {
            Some(Pane::Result)
        } else {
            None
        }
    }
}

fn prev_boundary(text: &str, at: usize) -> usize {
    text[..at].char_indices().next_back().map_or(0, |(i, _)| i)
}

fn next_boundary(text: &str, at: usize) -> usize {
    text[at..].chars().next().map_or(at, |ch| at + ch.len_utf8())
}

fn line_start(text: &str, at: usize) -> usize {
    text[..at].rfind('\n').map_or(0, |i| i + 1)
}

fn line_end(text: &str, at: usize) -> usize {
    text[at..].find('\n').map_or(text.len(), |i| at + i)
}

/// Byte offset where line `row` starts, or the end of `text`.
fn line_offset(text: &str, row: usize) -> usize {
    if row == 0 {
        return 0;
    }
    text.match_indices('\n')
        .nth(row - 1)
        .map_or(text.len(), |(i, _)| i + 1)
}

fn modified_time(path: &Path) -> Option<SystemTime> {
    std::fs::metadata(path).and_then(|m| m.modified()).ok()
}
