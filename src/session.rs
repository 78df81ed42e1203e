// session.rs: state owned by one playback session

use crate::lyrics::types::{LyricDocument, SharedDocument};
use crate::player::{LocalPlayer, MediaElement};
use std::sync::Arc;
use std::sync::atomic::AtomicU64;

/// The lyrics side of the session. The document is replaced wholesale on
/// every load; readers keep whatever snapshot they were handed.
#[derive(Debug, Default)]
pub struct LyricState {
    pub document: SharedDocument,
}

impl LyricState {
    pub fn replace(&mut self, document: LyricDocument) {
        self.document = Arc::new(document);
    }
}

/// Bundles the media element and lyric state for one session, with a version
/// counter bumped on every observable change.
pub struct StateBundle {
    pub lyric_state: LyricState,
    pub player: LocalPlayer,
    pub title: String,
    pub artwork_url: Option<String>,
    pub err: Option<String>,
    pub version: u64,
    /// Last (version, playing) key published to the UI; lets `send_update`
    /// drop redundant snapshots without extra bookkeeping at call sites.
    pub last_sent_key: AtomicU64,
}

impl StateBundle {
    pub fn new(player: LocalPlayer, title: String) -> Self {
        Self {
            lyric_state: LyricState::default(),
            player,
            title,
            artwork_url: None,
            err: None,
            version: 0,
            last_sent_key: AtomicU64::new(u64::MAX),
        }
    }

    pub fn bump(&mut self) {
        self.version += 1;
    }

    pub fn replace_document(&mut self, document: LyricDocument, err: Option<String>) {
        self.lyric_state.replace(document);
        self.err = err;
        self.bump();
    }

    pub fn set_artwork(&mut self, url: String) {
        self.artwork_url = Some(url);
        self.bump();
    }

    pub fn toggle_play(&mut self) {
        if self.player.playing() {
            self.player.pause();
        } else {
            self.player.play();
        }
        self.bump();
    }

    /// Seek to the start of line `index`. Out-of-range indices are a no-op:
    /// the presentation tree may lag a document swap by a frame.
    pub fn seek_to_line(&mut self, index: usize) {
        if let Some(line) = self.lyric_state.document.lines.get(index) {
            self.player.seek(line.start_time);
            self.bump();
        }
    }

    /// Seek to word `word` of line `line`. This is the word-click path: it
    /// targets the word's own time and never consults the line's start, so a
    /// word selection cannot fall through to the line seek.
    pub fn seek_to_word(&mut self, line: usize, word: usize) {
        let target = self
            .lyric_state
            .document
            .lines
            .get(line)
            .and_then(|l| l.words.get(word))
            .map(|w| w.time);
        if let Some(t) = target {
            self.player.seek(t);
            self.bump();
        }
    }
}
