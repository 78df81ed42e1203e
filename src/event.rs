use crate::lyrics::types::SharedDocument;
use crate::player::MediaElement;
use crate::session::StateBundle;
use std::sync::atomic::Ordering;
use tokio::sync::mpsc;

/// User intent delivered from the presentation layer.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Command {
    TogglePlay,
    /// Slider seek: 0-100 mapped linearly onto the track duration.
    SeekPercent(f64),
    /// Signed offset from the current position.
    SeekRelative(f64),
    /// Direct 0.0-1.0 volume pass-through.
    SetVolume(f64),
    /// Line click: seek to the line's start time.
    SeekToLine(usize),
    /// Word click: seek to the word's time. Takes precedence over the
    /// containing line; the line seek is never also applied.
    SeekToWord { line: usize, word: usize },
    /// Re-read the lyrics file and replace the document.
    ReloadLyrics,
    Shutdown,
}

/// Snapshot published to the presentation layer.
#[derive(Debug, Clone, Default)]
pub struct Update {
    pub document: SharedDocument,
    pub playing: bool,
    pub position: f64,
    pub duration: f64,
    pub volume: f64,
    pub title: String,
    pub artwork_url: Option<String>,
    pub err: Option<String>,
    pub version: u64,
}

pub async fn send_update(state: &StateBundle, update_tx: &mpsc::Sender<Update>, force: bool) {
    let version = state.version;
    let playing_bit: u64 = if state.player.playing() { 1 } else { 0 };
    let key = (version << 1) | playing_bit;

    // Cheap early-out when nothing changed and the caller didn't force it.
    // The key tracks (version, playing) so a play/pause flip always sends.
    if !force && key == state.last_sent_key.load(Ordering::Relaxed) {
        return;
    }

    let update = Update {
        document: state.lyric_state.document.clone(),
        playing: state.player.playing(),
        position: state.player.current_time(),
        duration: state.player.duration(),
        volume: state.player.volume(),
        title: state.title.clone(),
        artwork_url: state.artwork_url.clone(),
        err: state.err.clone(),
        version,
    };

    if update_tx.send(update).await.is_ok() {
        state.last_sent_key.store(key, Ordering::Relaxed);
    }
}

/// Apply one command to the session and publish the resulting state.
/// Returns true when the session should shut down. `ReloadLyrics` is not
/// handled here: it needs file IO and stays with the pool loop.
pub async fn process_command(
    cmd: Command,
    state: &mut StateBundle,
    update_tx: &mpsc::Sender<Update>,
) -> bool {
    match cmd {
        Command::Shutdown => {
            send_update(state, update_tx, true).await;
            return true;
        }
        Command::TogglePlay => state.toggle_play(),
        Command::SeekPercent(p) => {
            state.player.seek_percent(p);
            state.bump();
        }
        Command::SeekRelative(d) => {
            state.player.seek_relative(d);
            state.bump();
        }
        Command::SetVolume(v) => {
            state.player.set_volume(v);
            state.bump();
        }
        Command::SeekToWord { line, word } => state.seek_to_word(line, word),
        Command::SeekToLine(i) => state.seek_to_line(i),
        Command::ReloadLyrics => {}
    }
    send_update(state, update_tx, false).await;
    false
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::lyrics::parse;
    use crate::player::LocalPlayer;

    fn state() -> StateBundle {
        let mut state = StateBundle::new(LocalPlayer::new(200.0, 1.0), "t".into());
        state.replace_document(parse("[00:01.00]<00:01.20>Hello <00:02.50>world"), None);
        state
    }

    #[tokio::test]
    async fn test_word_click_seeks_word_time_only() {
        let (tx, mut rx) = mpsc::channel(8);
        let mut state = state();
        let done = process_command(Command::SeekToWord { line: 0, word: 1 }, &mut state, &tx).await;
        assert!(!done);
        let upd = rx.recv().await.expect("update");
        assert_eq!(upd.position, 2.5);
    }

    #[tokio::test]
    async fn test_seek_percent_uses_duration() {
        let (tx, mut rx) = mpsc::channel(8);
        let mut state = state();
        process_command(Command::SeekPercent(50.0), &mut state, &tx).await;
        let upd = rx.recv().await.expect("update");
        assert_eq!(upd.position, 100.0);
    }

    #[tokio::test]
    async fn test_shutdown_flushes_and_stops() {
        let (tx, mut rx) = mpsc::channel(8);
        let mut state = state();
        let done = process_command(Command::Shutdown, &mut state, &tx).await;
        assert!(done);
        assert!(rx.recv().await.is_some());
    }

    #[tokio::test]
    async fn test_update_carries_player_fields() {
        let (tx, mut rx) = mpsc::channel(8);
        let mut state = state();
        process_command(Command::SetVolume(0.3), &mut state, &tx).await;
        let upd = rx.recv().await.expect("update");
        assert_eq!(upd.volume, 0.3);
        assert_eq!(upd.duration, 200.0);
        assert!(!upd.playing);
        assert_eq!(upd.document.len(), 1);
    }
}
