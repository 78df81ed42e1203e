use std::sync::Arc;

/// A timed word inside a lyric line. "Word" means a tag-delimited chunk:
/// text between two inline tags is one word even when it contains spaces.
#[derive(Debug, Clone, PartialEq)]
pub struct Word {
    pub time: f64,
    pub text: String,
}

/// One timestamped lyric line. `start_time` is the line's own bracketed
/// timestamp and may differ from the first word's time.
#[derive(Debug, Clone, PartialEq)]
pub struct LyricLine {
    pub start_time: f64,
    pub words: Vec<Word>,
}

impl LyricLine {
    /// Display text of the line, words joined with single spaces.
    pub fn text(&self) -> String {
        self.words
            .iter()
            .map(|w| w.text.as_str())
            .collect::<Vec<_>>()
            .join(" ")
    }
}

/// Parsed lyrics in source order. Lines are never re-sorted: adjacency in
/// this vector defines the "next line" used by the sync rules, even when
/// the input timestamps are out of order.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct LyricDocument {
    pub lines: Vec<LyricLine>,
}

impl LyricDocument {
    pub fn len(&self) -> usize {
        self.lines.len()
    }

    pub fn is_empty(&self) -> bool {
        self.lines.is_empty()
    }

    /// Start time of the line after `index`, or +infinity for the last line.
    pub fn next_start(&self, index: usize) -> f64 {
        self.lines
            .get(index + 1)
            .map_or(f64::INFINITY, |l| l.start_time)
    }

    /// Rough track length when no real duration is known: the latest line
    /// start plus a fixed tail for the line itself to play out.
    pub fn estimated_duration(&self) -> Option<f64> {
        self.lines
            .iter()
            .map(|l| l.start_time)
            .fold(None, |acc: Option<f64>, t| Some(acc.map_or(t, |a| a.max(t))))
            .map(|last| last + 5.0)
    }
}

/// Documents are replaced wholesale on every load; readers hold snapshots.
pub type SharedDocument = Arc<LyricDocument>;
