// pool.rs: central event loop for one playback session

use crate::event::{self, Command, Update};
use crate::lyrics::types::LyricDocument;
use crate::player::{LocalPlayer, MediaElement};
use crate::session::StateBundle;
use std::path::Path;
use tokio::sync::mpsc;
use tokio::time::Duration;

const POLL_INTERVAL: Duration = Duration::from_millis(1000);

/// Run the session: load the lyrics, kick off the artwork lookup, then serve
/// commands and publish `Update` snapshots until shutdown.
pub async fn listen(
    update_tx: mpsc::Sender<Update>,
    mut cmd_rx: mpsc::Receiver<Command>,
    cfg: crate::Config,
) {
    let title = track_title(&cfg.audio);
    let (document, err) = load_document(&cfg.lyrics).await;
    let duration = cfg
        .parsed_duration()
        .or_else(|| document.estimated_duration())
        .unwrap_or(0.0);

    let player = LocalPlayer::new(duration, cfg.volume);
    let mut state = StateBundle::new(player, title.clone());
    state.replace_document(document, err);

    // Artwork lookup keyed on the track title; the result arrives as a
    // one-shot message and failures already degraded to the fallback URL.
    let (art_tx, art_rx) = mpsc::channel(1);
    tokio::spawn(async move {
        let url = crate::artwork::lookup_or_fallback(&title).await;
        let _ = art_tx.send(url).await;
    });
    let mut art_rx = Some(art_rx);

    event::send_update(&state, &update_tx, true).await;

    let mut poll = tokio::time::interval(POLL_INTERVAL);
    loop {
        tokio::select! {
            maybe_cmd = cmd_rx.recv() => {
                let Some(cmd) = maybe_cmd else { break };
                if cmd == Command::ReloadLyrics {
                    let (document, err) = load_document(&cfg.lyrics).await;
                    state.replace_document(document, err);
                    event::send_update(&state, &update_tx, true).await;
                    continue;
                }
                if event::process_command(cmd, &mut state, &update_tx).await {
                    break;
                }
            }
            maybe_url = recv_artwork(&mut art_rx) => {
                if let Some(url) = maybe_url {
                    state.set_artwork(url);
                    event::send_update(&state, &update_tx, false).await;
                }
                art_rx = None;
            }
            _ = poll.tick() => {
                handle_poll(&mut state, &update_tx).await;
            }
        }
    }
}

/// Receive the single artwork result; once the channel is spent the branch
/// parks forever instead of spinning on a closed receiver.
async fn recv_artwork(art_rx: &mut Option<mpsc::Receiver<String>>) -> Option<String> {
    match art_rx {
        Some(rx) => rx.recv().await,
        None => futures_util::future::pending().await,
    }
}

/// Coarse periodic work: pause at end of track, and while playing push a
/// fresh authoritative position so the UI can re-anchor its estimates.
async fn handle_poll(state: &mut StateBundle, update_tx: &mpsc::Sender<Update>) {
    if !state.player.playing() {
        return;
    }
    let duration = state.player.duration();
    if duration > 0.0 && state.player.current_time() >= duration {
        state.player.pause();
        state.bump();
        event::send_update(state, update_tx, true).await;
    } else {
        state.bump();
        event::send_update(state, update_tx, false).await;
    }
}

/// Read and parse the lyrics file. Parsing is infallible, so the only error
/// path is the file read; it leaves an empty document plus an error string
/// for the UI.
async fn load_document(path: &Path) -> (LyricDocument, Option<String>) {
    match tokio::fs::read_to_string(path).await {
        Ok(text) => {
            let document = crate::lyrics::parse(&text);
            tracing::info!(
                path = %path.display(),
                lines = document.len(),
                "loaded lyrics"
            );
            (document, None)
        }
        Err(e) => {
            tracing::warn!(
                path = %path.display(),
                error = %e,
                "failed to read lyrics file"
            );
            let err = format!("cannot read {}: {}", path.display(), e);
            (LyricDocument::default(), Some(err))
        }
    }
}

/// Track title used for display and the artwork query: the audio file's
/// name with its extension stripped.
pub fn track_title(audio: &Path) -> String {
    audio
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_default()
}
