//! Full-screen terminal mode for real-time synchronized lyrics display.
//!
//! The event loop uses `tokio::select!` to handle:
//! - State updates from the playback session
//! - User keyboard input (transport, seeking, line/word selection)
//! - The frame timer driving highlight recomputation while playing
//!
//! The frame timer is armed on every play transition and dropped on pause,
//! so no per-frame work is scheduled while playback is stopped.

use crate::event::{Command, Update};
use crate::pool;
use crate::sync::{SyncDelta, SyncTracker};
use crate::ui::modern_helpers::{Selection, draw_ui, estimate_position};
use crate::ui::styles::LyricStyles;
use crossterm::{
    event::{Event, KeyCode, KeyModifiers},
    execute,
    terminal::{EnterAlternateScreen, LeaveAlternateScreen, disable_raw_mode, enable_raw_mode},
};
use ratatui::widgets::Paragraph;
use ratatui::{Terminal, backend::CrosstermBackend};
use std::io;
use std::sync::Arc;
use std::thread;
use std::time::{Duration, Instant};
use tokio::sync::mpsc;
use tokio::time::Interval;

/// UI state for the full-screen mode
pub struct ModernUIState {
    pub last_update: Option<Update>,
    /// Instant the last update arrived; used to estimate the current position
    pub last_update_instant: Option<Instant>,
    /// Cached wrapped display text for the current terminal width
    pub wrapped_cache: Option<(usize, Vec<Vec<String>>)>,
    pub tracker: SyncTracker,
    /// Bring-into-view anchor: set once per line activation
    pub center_line: Option<usize>,
    pub selection: Option<Selection>,
    pub karaoke_enabled: bool,
    pub should_exit: bool,
}

impl ModernUIState {
    pub fn new(karaoke_enabled: bool) -> Self {
        Self {
            last_update: None,
            last_update_instant: None,
            wrapped_cache: None,
            tracker: SyncTracker::default(),
            center_line: None,
            selection: None,
            karaoke_enabled,
            should_exit: false,
        }
    }
}

/// Run the full-screen UI against a playback session.
pub async fn run(cfg: crate::Config) -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
    let (update_tx, mut update_rx) = mpsc::channel(32);
    let (cmd_tx, cmd_rx) = mpsc::channel(32);
    tokio::spawn(pool::listen(update_tx, cmd_rx, cfg.clone()));

    enable_raw_mode().map_err(to_boxed_err)?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen).map_err(to_boxed_err)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend).map_err(to_boxed_err)?;

    let styles = LyricStyles::default();
    let mut state = ModernUIState::new(!cfg.no_karaoke);
    let frame_period = cfg.frame_period();
    let mut frame_timer: Option<Interval> = None;

    // Single background thread polling crossterm events and forwarding them
    // into the async runtime. Use try_send so the thread exits once the
    // receiver is gone.
    let (event_tx, mut event_rx) = mpsc::channel(32);
    thread::spawn(move || {
        loop {
            match crossterm::event::poll(Duration::from_millis(100)) {
                Ok(true) => match crossterm::event::read() {
                    Ok(ev) => {
                        if event_tx.try_send(ev).is_err() {
                            break;
                        }
                    }
                    Err(_) => {}
                },
                Ok(false) => {}
                Err(_) => {
                    thread::sleep(Duration::from_millis(100));
                }
            }
        }
    });

    while !state.should_exit {
        tokio::select! {
            biased;

            maybe_update = update_rx.recv() => {
                apply_update(&mut state, maybe_update);
                arm_frame_timer(&mut frame_timer, &state, frame_period);
                refresh(&mut terminal, &mut state, &styles)?;
            }

            maybe_event = event_rx.recv() => {
                if let Some(event) = maybe_event {
                    handle_input(event, &mut state, &cmd_tx).await;
                    refresh(&mut terminal, &mut state, &styles)?;
                } else {
                    state.should_exit = true;
                }
            }

            _ = tick(&mut frame_timer) => {
                refresh(&mut terminal, &mut state, &styles)?;
            }
        }
    }

    let _ = cmd_tx.send(Command::Shutdown).await;
    disable_raw_mode().map_err(to_boxed_err)?;
    execute!(io::stdout(), LeaveAlternateScreen).map_err(to_boxed_err)?;
    Ok(())
}

/// Await the next frame while playing; park forever while the timer is
/// disarmed so paused sessions schedule no per-frame work at all.
async fn tick(timer: &mut Option<Interval>) {
    match timer {
        Some(interval) => {
            interval.tick().await;
        }
        None => futures_util::future::pending().await,
    }
}

fn arm_frame_timer(timer: &mut Option<Interval>, state: &ModernUIState, period: Duration) {
    let playing = state.last_update.as_ref().is_some_and(|u| u.playing);
    if playing {
        if timer.is_none() {
            *timer = Some(tokio::time::interval(period));
        }
    } else {
        *timer = None;
    }
}

fn apply_update(state: &mut ModernUIState, maybe_update: Option<Update>) {
    let Some(update) = maybe_update else {
        // Channel closed -> exit gracefully
        state.should_exit = true;
        return;
    };

    let document_swapped = state
        .last_update
        .as_ref()
        .is_none_or(|u| !Arc::ptr_eq(&u.document, &update.document));
    if document_swapped {
        state.tracker.reset(&update.document);
        state.wrapped_cache = None;
        state.center_line = None;
        state.selection = None;
    }

    state.last_update = Some(update);
    state.last_update_instant = Some(Instant::now());
}

/// Recompute the frame from the estimated position and redraw. Line
/// activations move the centering anchor exactly once per transition.
fn refresh<B: ratatui::backend::Backend>(
    terminal: &mut Terminal<B>,
    state: &mut ModernUIState,
    styles: &LyricStyles,
) -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
    let Some(update) = state.last_update.clone() else {
        terminal
            .draw(|f| f.render_widget(Paragraph::new(""), f.area()))
            .map_err(to_boxed_err)?;
        return Ok(());
    };

    let position = estimate_position(&update, state.last_update_instant);
    for delta in state.tracker.advance(&update.document, position) {
        if let SyncDelta::LineActivated { line } = delta {
            state.center_line = Some(line);
        }
    }

    let focus = state
        .selection
        .map(|s| s.line)
        .or(state.center_line)
        .or_else(|| state.tracker.current().active_line())
        .unwrap_or(0);

    draw_ui(
        terminal,
        &update,
        state.tracker.current(),
        position,
        focus,
        state.selection,
        &mut state.wrapped_cache,
        styles,
        state.karaoke_enabled,
    )
}

/// Handle user input events (keyboard)
async fn handle_input(event: Event, state: &mut ModernUIState, cmd_tx: &mpsc::Sender<Command>) {
    let Event::Key(key) = event else { return };
    match key.code {
        KeyCode::Char('q') | KeyCode::Esc => {
            state.should_exit = true;
        }
        KeyCode::Char('c') if key.modifiers.contains(KeyModifiers::CONTROL) => {
            state.should_exit = true;
        }
        KeyCode::Char(' ') => {
            let _ = cmd_tx.send(Command::TogglePlay).await;
        }
        KeyCode::Left => {
            let _ = cmd_tx.send(Command::SeekRelative(-5.0)).await;
        }
        KeyCode::Right => {
            let _ = cmd_tx.send(Command::SeekRelative(5.0)).await;
        }
        KeyCode::Char(c @ '0'..='9') => {
            // Digit keys act as the seek slider: 0-90% of the track.
            let percent = f64::from(c as u8 - b'0') * 10.0;
            let _ = cmd_tx.send(Command::SeekPercent(percent)).await;
        }
        KeyCode::Char('+') | KeyCode::Char('=') => {
            if let Some(u) = &state.last_update {
                let _ = cmd_tx.send(Command::SetVolume(u.volume + 0.05)).await;
            }
        }
        KeyCode::Char('-') => {
            if let Some(u) = &state.last_update {
                let _ = cmd_tx.send(Command::SetVolume(u.volume - 0.05)).await;
            }
        }
        KeyCode::Char('j') | KeyCode::Down => select_line(state, 1),
        KeyCode::Char('k') | KeyCode::Up => select_line(state, -1),
        KeyCode::Char('h') => select_word(state, -1),
        KeyCode::Char('l') => select_word(state, 1),
        KeyCode::Enter => activate_selection(state, cmd_tx).await,
        KeyCode::Char('r') => {
            let _ = cmd_tx.send(Command::ReloadLyrics).await;
        }
        KeyCode::Char('K') => {
            // Toggle karaoke at runtime
            state.karaoke_enabled = !state.karaoke_enabled;
        }
        _ => {}
    }
}

fn select_line(state: &mut ModernUIState, dir: i64) {
    let Some(update) = &state.last_update else { return };
    let len = update.document.len();
    if len == 0 {
        return;
    }
    let anchor = state
        .selection
        .map(|s| s.line)
        .or(state.center_line)
        .or_else(|| state.tracker.current().active_line())
        .unwrap_or(0);
    // The first press grabs the anchor line; later presses move off it.
    let line = if state.selection.is_none() {
        anchor.min(len - 1)
    } else if dir < 0 {
        anchor.saturating_sub(1)
    } else {
        (anchor + 1).min(len - 1)
    };
    state.selection = Some(Selection { line, word: None });
    state.center_line = Some(line);
}

fn select_word(state: &mut ModernUIState, dir: i64) {
    let Some(update) = &state.last_update else { return };
    let Some(sel) = state.selection.as_mut() else { return };
    let Some(line) = update.document.lines.get(sel.line) else { return };
    let count = line.words.len();
    if count == 0 {
        return;
    }
    sel.word = Some(match sel.word {
        None => {
            if dir < 0 { count - 1 } else { 0 }
        }
        Some(w) => {
            if dir < 0 {
                w.saturating_sub(1)
            } else {
                (w + 1).min(count - 1)
            }
        }
    });
}

/// Seek to the current selection. A word selection wins outright: the
/// containing line's seek is suppressed, never sent alongside.
async fn activate_selection(state: &mut ModernUIState, cmd_tx: &mpsc::Sender<Command>) {
    let Some(sel) = state.selection.take() else { return };
    let cmd = match sel.word {
        Some(word) => Command::SeekToWord { line: sel.line, word },
        None => Command::SeekToLine(sel.line),
    };
    let _ = cmd_tx.send(cmd).await;
}

fn to_boxed_err<E: std::error::Error + Send + Sync + 'static>(
    e: E,
) -> Box<dyn std::error::Error + Send + Sync> {
    Box::new(e)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::lyrics::parse;

    fn state_with(doc: &str) -> ModernUIState {
        let mut state = ModernUIState::new(true);
        let update = Update {
            document: Arc::new(parse(doc)),
            duration: 100.0,
            ..Default::default()
        };
        state.tracker.reset(&update.document);
        state.last_update = Some(update);
        state
    }

    #[test]
    fn test_select_line_walks_document() {
        let mut state = state_with("[00:01.00]a\n[00:02.00]b\n[00:03.00]c");
        select_line(&mut state, 1);
        assert_eq!(state.selection, Some(Selection { line: 0, word: None }));
        select_line(&mut state, 1);
        assert_eq!(state.selection, Some(Selection { line: 1, word: None }));
        select_line(&mut state, -1);
        assert_eq!(state.selection, Some(Selection { line: 0, word: None }));
        select_line(&mut state, -1);
        assert_eq!(state.selection, Some(Selection { line: 0, word: None }));
    }

    #[test]
    fn test_select_word_within_selected_line() {
        let mut state = state_with("[00:01.00]<00:01.00>a <00:02.00>b");
        select_line(&mut state, 1);
        select_word(&mut state, 1);
        assert_eq!(state.selection, Some(Selection { line: 0, word: Some(0) }));
        select_word(&mut state, 1);
        assert_eq!(state.selection, Some(Selection { line: 0, word: Some(1) }));
        select_word(&mut state, 1);
        assert_eq!(state.selection, Some(Selection { line: 0, word: Some(1) }));
    }

    #[tokio::test]
    async fn test_activate_selection_word_wins() {
        let mut state = state_with("[00:01.00]<00:01.00>a <00:02.00>b");
        state.selection = Some(Selection { line: 0, word: Some(1) });
        let (tx, mut rx) = mpsc::channel(4);
        activate_selection(&mut state, &tx).await;
        assert_eq!(rx.recv().await, Some(Command::SeekToWord { line: 0, word: 1 }));
        // Selection is consumed and exactly one command was sent.
        assert!(state.selection.is_none());
        assert!(rx.try_recv().is_err());
    }

    #[tokio::test]
    async fn test_activate_selection_line_without_word() {
        let mut state = state_with("[00:01.00]a\n[00:02.00]b");
        state.selection = Some(Selection { line: 1, word: None });
        let (tx, mut rx) = mpsc::channel(4);
        activate_selection(&mut state, &tx).await;
        assert_eq!(rx.recv().await, Some(Command::SeekToLine(1)));
    }

    #[test]
    fn test_apply_update_resets_on_document_swap() {
        let mut state = state_with("[00:01.00]a");
        state.center_line = Some(0);
        state.wrapped_cache = Some((80, vec![vec!["a".into()]]));
        let update = Update {
            document: Arc::new(parse("[00:02.00]b")),
            ..Default::default()
        };
        apply_update(&mut state, Some(update));
        assert!(state.center_line.is_none());
        assert!(state.wrapped_cache.is_none());
        assert!(state.selection.is_none());
    }

    #[test]
    fn test_apply_update_channel_closed_exits() {
        let mut state = ModernUIState::new(true);
        apply_update(&mut state, None);
        assert!(state.should_exit);
    }
}
