use crate::event::{Command, Update};
use crate::pool;
use crate::sync::{SyncDelta, SyncTracker};
use crate::ui::modern_helpers::estimate_position;
use std::sync::Arc;
use std::time::Instant;
use tokio::sync::mpsc;
use tokio::time::Interval;

/// Pipe mode (stdout only, for scripting): playback starts immediately and
/// each newly activated lyric line is printed once. The frame timer only
/// runs while playing, same as the full-screen mode.
pub async fn run(cfg: crate::Config) -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
    let (update_tx, mut update_rx) = mpsc::channel(32);
    let (cmd_tx, cmd_rx) = mpsc::channel(4);
    tokio::spawn(pool::listen(update_tx, cmd_rx, cfg.clone()));

    // No interactive transport here; start playing right away.
    let _ = cmd_tx.send(Command::TogglePlay).await;

    let mut last_update: Option<Update> = None;
    let mut received_at: Option<Instant> = None;
    let mut tracker = SyncTracker::default();
    let mut frame_timer: Option<Interval> = None;

    loop {
        tokio::select! {
            maybe_update = update_rx.recv() => {
                let Some(update) = maybe_update else { break };
                let document_swapped = last_update
                    .as_ref()
                    .is_none_or(|u| !Arc::ptr_eq(&u.document, &update.document));
                if document_swapped {
                    tracker.reset(&update.document);
                }
                let playing = update.playing;
                last_update = Some(update);
                received_at = Some(Instant::now());
                if playing {
                    if frame_timer.is_none() {
                        frame_timer = Some(tokio::time::interval(cfg.frame_period()));
                    }
                } else {
                    frame_timer = None;
                }
                emit_activated_lines(&mut tracker, &last_update, received_at);
            }
            _ = tick(&mut frame_timer) => {
                emit_activated_lines(&mut tracker, &last_update, received_at);
            }
        }
    }
    Ok(())
}

async fn tick(timer: &mut Option<Interval>) {
    match timer {
        Some(interval) => {
            interval.tick().await;
        }
        None => futures_util::future::pending().await,
    }
}

fn emit_activated_lines(
    tracker: &mut SyncTracker,
    last_update: &Option<Update>,
    received_at: Option<Instant>,
) {
    let Some(update) = last_update else { return };
    let position = estimate_position(update, received_at);
    for delta in tracker.advance(&update.document, position) {
        if let SyncDelta::LineActivated { line } = delta
            && let Some(l) = update.document.lines.get(line)
        {
            println!("{}", l.text());
        }
    }
}
