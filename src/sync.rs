//! Time-to-highlight mapping.
//!
//! `frame_state` is a pure read of (document, position): it computes which
//! lines and words are inside their half-open time interval at that instant.
//! `SyncTracker` compares consecutive frames and emits only the transitions,
//! so the presentation layer can react to enter/exit edges (the one-time
//! bring-into-view on line activation) without owning any timing logic.

use crate::lyrics::types::LyricDocument;

/// Active/highlight flags for one line at a given playback instant.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LineFrame {
    pub active: bool,
    /// One flag per word; all false while the line is inactive.
    pub words: Vec<bool>,
}

/// Full presentation state for one frame.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FrameState {
    pub lines: Vec<LineFrame>,
}

impl FrameState {
    /// Index of the first active line, if any.
    pub fn active_line(&self) -> Option<usize> {
        self.lines.iter().position(|l| l.active)
    }
}

/// Compute the per-line, per-word state for playback time `position`.
///
/// A line is active iff `position` lies in `[start_time, next_start)` where
/// `next_start` is the following line's start (or +infinity for the last
/// line). Each line is judged independently: an out-of-order document can
/// legitimately have zero or several active lines at once. Words are only
/// evaluated inside an active line; the last word's window closes at the
/// line's own `next_start`.
pub fn frame_state(doc: &LyricDocument, position: f64) -> FrameState {
    let lines = doc
        .lines
        .iter()
        .enumerate()
        .map(|(i, line)| {
            let next_start = doc.next_start(i);
            let active = position >= line.start_time && position < next_start;
            let words = if active {
                line.words
                    .iter()
                    .enumerate()
                    .map(|(j, w)| {
                        let next_word = line.words.get(j + 1).map_or(next_start, |n| n.time);
                        position >= w.time && position < next_word
                    })
                    .collect()
            } else {
                vec![false; line.words.len()]
            };
            LineFrame { active, words }
        })
        .collect();
    FrameState { lines }
}

/// A state transition observed between two consecutive frames.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SyncDelta {
    /// Fires once per inactive-to-active transition; the presentation trigger
    /// for bringing the line into view.
    LineActivated { line: usize },
    LineDeactivated { line: usize },
    WordHighlighted { line: usize, word: usize },
    WordCleared { line: usize, word: usize },
}

/// Holds the previous frame's snapshot and emits only the changes.
#[derive(Debug, Default)]
pub struct SyncTracker {
    prev: FrameState,
}

impl SyncTracker {
    pub fn new(doc: &LyricDocument) -> Self {
        Self { prev: cleared_state(doc) }
    }

    /// Re-snapshot after the document was replaced; the next `advance` then
    /// reports activations relative to an all-clear baseline.
    pub fn reset(&mut self, doc: &LyricDocument) {
        self.prev = cleared_state(doc);
    }

    /// Advance to `position`, returning the transitions since the last frame.
    pub fn advance(&mut self, doc: &LyricDocument, position: f64) -> Vec<SyncDelta> {
        let next = frame_state(doc, position);
        let deltas = diff(&self.prev, &next);
        self.prev = next;
        deltas
    }

    /// The most recently computed frame.
    pub fn current(&self) -> &FrameState {
        &self.prev
    }
}

fn cleared_state(doc: &LyricDocument) -> FrameState {
    FrameState {
        lines: doc
            .lines
            .iter()
            .map(|l| LineFrame { active: false, words: vec![false; l.words.len()] })
            .collect(),
    }
}

fn diff(prev: &FrameState, next: &FrameState) -> Vec<SyncDelta> {
    let mut deltas = Vec::new();
    for (i, line) in next.lines.iter().enumerate() {
        // A document swap can change the line count before the tracker is
        // reset; lines with no previous snapshot count as freshly cleared.
        let prev_line = prev.lines.get(i);
        let was_active = prev_line.is_some_and(|l| l.active);
        if line.active && !was_active {
            deltas.push(SyncDelta::LineActivated { line: i });
        } else if !line.active && was_active {
            deltas.push(SyncDelta::LineDeactivated { line: i });
        }
        for (j, &highlighted) in line.words.iter().enumerate() {
            let was = prev_line.and_then(|l| l.words.get(j)).copied().unwrap_or(false);
            if highlighted && !was {
                deltas.push(SyncDelta::WordHighlighted { line: i, word: j });
            } else if !highlighted && was {
                deltas.push(SyncDelta::WordCleared { line: i, word: j });
            }
        }
    }
    deltas
}
