use std::collections::HashMap;

use super::{Pane, ScrollError, Viewport};

/// A block in the preview pane, tagged with the absolute source line it
/// was rendered from.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PreviewAnchor {
    pub line: u32,
    pub offset: f64,
}

/// A block start in the source pane, tagged with the number of lines since
/// the previous anchor.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SourceAnchor {
    pub delta: u32,
    pub offset: f64,
}

/// Scrollable heights of both panes.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct Extents {
    pub source: f64,
    pub result: f64,
}

/// Index-aligned offsets of the same document lines in both panes.
#[derive(Debug, Clone, PartialEq)]
pub struct PositionMap {
    source: Vec<f64>,
    result: Vec<f64>,
}

impl PositionMap {
    pub fn new(source: Vec<f64>, result: Vec<f64>) -> Result<Self, ScrollError> {
        if source.len() != result.len() {
            return Err(ScrollError::LengthMismatch {
                source_len: source.len(),
                result_len: result.len(),
            });
        }
        if source.is_empty() {
            return Err(ScrollError::EmptyMap);
        }
        Ok(Self { source, result })
    }

    /// Pairs up the anchors both panes have in common.
    ///
    /// The map always starts at `(0, 0)` and ends with the bottom of both
    /// panes; the source end is pulled up by `end_slack` so that a source
    /// pane scrolled to its very bottom still reads as "at the end".
    pub fn from_anchors(
        preview: &[PreviewAnchor],
        source: &[SourceAnchor],
        extents: Extents,
        end_slack: f64,
    ) -> Self {
        let mut result_by_line: HashMap<u32, f64> = HashMap::with_capacity(preview.len());
        for anchor in preview {
            if anchor.line != 0 {
                result_by_line.insert(anchor.line, anchor.offset.round());
            }
        }

        let mut map_source = vec![0.0];
        let mut map_result = vec![0.0];
        let mut line = 0u32;
        for anchor in source {
            if anchor.delta == 0 {
                continue;
            }
            line += anchor.delta;
            if let Some(&offset) = result_by_line.get(&line) {
                map_source.push(anchor.offset);
                map_result.push(offset);
            }
        }

        let last_source = map_source[map_source.len() - 1];
        map_source.push((extents.source - end_slack).max(last_source));
        map_result.push(extents.result);

        log::debug!(
            "scroll map built: {} pairs from {} preview and {} source anchors",
            map_source.len(),
            preview.len(),
            source.len()
        );

        Self {
            source: map_source,
            result: map_result,
        }
    }

    pub fn column(&self, pane: Pane) -> &[f64] {
        match pane {
            Pane::Source => &self.source,
            Pane::Result => &self.result,
        }
    }

    pub fn len(&self) -> usize {
        self.source.len()
    }

    pub fn is_empty(&self) -> bool {
        self.source.is_empty()
    }

    /// Scroll position in the other pane matching `viewport` in `from`.
    pub fn translate(&self, from: Pane, viewport: Viewport) -> f64 {
        if viewport.scroll_top == 0.0 {
            return 0.0;
        }

        let from_column = self.column(from);
        let to_column = self.column(from.other());
        let last = from_column.len() - 1;
        if from_column[last] <= viewport.scroll_top + viewport.height {
            return to_column[last] - viewport.height;
        }

        let shift = viewport.height / 2.0;
        let level = viewport.scroll_top + shift;
        let (index, part) = find_bisect(level, from_column);
        let mut position = to_column[index] * (1.0 - part);
        if let Some(next) = to_column.get(index + 1) {
            position += next * part;
        }
        position - shift
    }
}

/// Finds the last entry of the ascending `values` below `max_value`.
///
/// Returns that index and how far `max_value` lies towards the next entry,
/// as a fraction in `0..=1`. Values outside the range clamp to either end
/// with a fraction of 0.
pub fn find_bisect(max_value: f64, values: &[f64]) -> (usize, f64) {
    let mut a = 0;
    let mut b = values.len() - 1;
    let mut f_a = values[a];
    if f_a >= max_value {
        return (a, 0.0);
    }
    let mut f_b = values[b];
    if f_b < max_value {
        return (b, 0.0);
    }

    while b - a > 1 {
        let c = a + (b - a).div_ceil(2);
        let f_c = values[c];
        if f_c >= max_value {
            b = c;
            f_b = f_c;
        } else {
            a = c;
            f_a = f_c;
        }
    }

    (a, (max_value - f_a) / (f_b - f_a))
}

/// Running sum of source anchor deltas.
pub fn accumulate_lines(deltas: &[u32]) -> Vec<u32> {
    deltas
        .iter()
        .scan(0u32, |line, delta| {
            *line += delta;
            Some(*line)
        })
        .collect()
}

/// A [`PositionMap`] that is built on first use and dropped on invalidation.
#[derive(Debug, Clone, Default)]
pub struct ScrollMap {
    map: Option<PositionMap>,
}

impl ScrollMap {
    pub fn new() -> Self {
        Self::default()
    }

    /// Forget the map; the next lookup rebuilds it.
    pub fn reset(&mut self) {
        self.map = None;
    }

    pub fn is_built(&self) -> bool {
        self.map.is_some()
    }

    pub fn get(&self) -> Option<&PositionMap> {
        self.map.as_ref()
    }

    /// Scroll position in the other pane, building the map with `build` if
    /// needed.
    pub fn position(
        &mut self,
        from: Pane,
        viewport: Viewport,
        build: impl FnOnce() -> PositionMap,
    ) -> f64 {
        if viewport.scroll_top == 0.0 {
            return 0.0;
        }
        self.map.get_or_insert_with(build).translate(from, viewport)
    }
}
