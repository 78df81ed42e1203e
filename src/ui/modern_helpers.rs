use crate::event::Update;
use crate::lyrics::types::Word;
use crate::sync::FrameState;
use crate::text_utils::{format_time, wrap_text};
use crate::ui::styles::LyricStyles;
use ratatui::Terminal;
use ratatui::backend::Backend;
use ratatui::layout::{Alignment, Rect};
use ratatui::style::{Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::Paragraph;
use std::error::Error;
use std::time::Instant;

/// A line (and optionally a word within it) the user has picked for seeking.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Selection {
    pub line: usize,
    pub word: Option<usize>,
}

/// Estimate the current playback position from the last update anchor.
/// While playing, the published position plus elapsed wall time; clamped to
/// the track duration when one is known.
pub fn estimate_position(update: &Update, received_at: Option<Instant>) -> f64 {
    let mut pos = update.position;
    if update.playing
        && let Some(at) = received_at
    {
        pos += at.elapsed().as_secs_f64();
    }
    if update.duration > 0.0 { pos.min(update.duration) } else { pos }
}

/// Draw the full UI: header, then the lyric window centered vertically with
/// the focus line karaoke-styled.
#[allow(clippy::too_many_arguments)]
pub fn draw_ui<B: Backend>(
    terminal: &mut Terminal<B>,
    update: &Update,
    frame: &FrameState,
    position: f64,
    focus: usize,
    selection: Option<Selection>,
    wrapped_cache: &mut Option<(usize, Vec<Vec<String>>)>,
    styles: &LyricStyles,
    karaoke_enabled: bool,
) -> Result<(), Box<dyn Error + Send + Sync>> {
    terminal
        .draw(|f| {
            let area = f.area();
            let header_height = 3.min(area.height);
            let header_area = Rect { height: header_height, ..area };
            let header = Paragraph::new(build_header(update, position, styles))
                .alignment(Alignment::Center);
            f.render_widget(header, header_area);

            let body = Rect {
                y: area.y + header_height,
                height: area.height.saturating_sub(header_height),
                ..area
            };
            if body.width == 0 || body.height == 0 {
                return;
            }
            let w = body.width as usize;
            let h = body.height as usize;

            let rows: Vec<Line> = if let Some(err) = &update.err {
                wrap_text(err, w)
                    .into_iter()
                    .map(|l| Line::from(Span::styled(l, styles.current)))
                    .collect()
            } else if update.document.is_empty() {
                vec![Line::from(Span::styled(
                    "no synced lyrics".to_string(),
                    styles.before,
                ))]
            } else {
                let blocks = wrapped_blocks(update, w, wrapped_cache);
                gather_visible_lines(
                    update,
                    frame,
                    focus,
                    blocks,
                    w,
                    h,
                    styles,
                    karaoke_enabled,
                    selection,
                )
                .into_vec()
            };

            let top = h.saturating_sub(rows.len()) / 2;
            let render_area = Rect {
                y: body.y + top as u16,
                height: (rows.len() as u16).min(body.height),
                ..body
            };
            f.render_widget(
                Paragraph::new(rows).alignment(Alignment::Center),
                render_area,
            );
        })
        .map_err(|e| Box::new(e) as Box<dyn Error + Send + Sync>)?;
    Ok(())
}

fn build_header(update: &Update, position: f64, styles: &LyricStyles) -> Vec<Line<'static>> {
    let glyph = if update.playing { "\u{25b6}" } else { "\u{23f8}" };
    let transport = format!(
        "{}  {} / {}   vol {:.0}%",
        glyph,
        format_time(position),
        format_time(update.duration),
        update.volume * 100.0
    );
    let mut lines = vec![
        Line::from(Span::styled(update.title.clone(), styles.title)),
        Line::from(Span::styled(transport, styles.header)),
    ];
    if let Some(url) = &update.artwork_url {
        lines.push(Line::from(Span::styled(format!("art: {url}"), styles.header)));
    }
    lines
}

/// Width-keyed cache of each document line's wrapped display text. Rebuilt
/// when the terminal width changes; the caller clears it on document swaps.
fn wrapped_blocks<'a>(
    update: &Update,
    w: usize,
    cache: &'a mut Option<(usize, Vec<Vec<String>>)>,
) -> &'a [Vec<String>] {
    let stale = cache.as_ref().is_none_or(|(cw, _)| *cw != w);
    if stale {
        let blocks = update
            .document
            .lines
            .iter()
            .map(|l| {
                let wrapped = wrap_text(&l.text(), w.max(1));
                if wrapped.is_empty() { vec![String::new()] } else { wrapped }
            })
            .collect();
        *cache = Some((w, blocks));
    }
    match cache.as_ref() {
        Some((_, blocks)) => blocks,
        None => &[],
    }
}

/// A collection of styled rows ready for rendering.
pub struct VisibleLines<'a> {
    pub before: Vec<Line<'a>>,
    pub current: Vec<Line<'a>>,
    pub after: Vec<Line<'a>>,
}

impl<'a> VisibleLines<'a> {
    pub fn into_vec(self) -> Vec<Line<'a>> {
        [self.before, self.current, self.after].concat()
    }
}

/// Build the visible window: the focus line with karaoke styling, padded
/// above and below with dim context lines to fill the height.
#[allow(clippy::too_many_arguments)]
pub fn gather_visible_lines(
    update: &Update,
    frame: &FrameState,
    focus: usize,
    blocks: &[Vec<String>],
    w: usize,
    h: usize,
    styles: &LyricStyles,
    karaoke_enabled: bool,
    selection: Option<Selection>,
) -> VisibleLines<'static> {
    let focus = focus.min(blocks.len().saturating_sub(1));
    let current = focus_rows(update, frame, focus, w, styles, karaoke_enabled, selection);
    let current_height = current.len();

    if current_height >= h {
        return VisibleLines { before: Vec::new(), current, after: Vec::new() };
    }

    let context_lines = h - current_height;
    let lines_needed_before = context_lines / 2;
    let lines_needed_after = context_lines - lines_needed_before;

    let before = collect_before_spans(focus, blocks, lines_needed_before, styles.before, selection);
    let after = collect_after_spans(focus, blocks, lines_needed_after, styles.after, selection);

    VisibleLines { before, current, after }
}

/// Rows for the focus line, one span per word so highlight state and word
/// selection can style each independently.
fn focus_rows(
    update: &Update,
    frame: &FrameState,
    focus: usize,
    w: usize,
    styles: &LyricStyles,
    karaoke_enabled: bool,
    selection: Option<Selection>,
) -> Vec<Line<'static>> {
    let Some(line) = update.document.lines.get(focus) else {
        return Vec::new();
    };
    let line_frame = frame.lines.get(focus);
    let selected_word = selection
        .filter(|s| s.line == focus)
        .and_then(|s| s.word);

    split_words_into_rows(&line.words, w)
        .iter()
        .map(|row| {
            let mut spans = Vec::with_capacity(row.len());
            for (k, &j) in row.iter().enumerate() {
                let highlighted = karaoke_enabled
                    && line_frame.is_some_and(|lf| lf.words.get(j).copied().unwrap_or(false));
                let mut style = if highlighted { styles.highlight } else { styles.current };
                if selected_word == Some(j) {
                    style = style.add_modifier(Modifier::UNDERLINED);
                }
                let text = match line.words.get(j) {
                    Some(word) if k + 1 < row.len() => format!("{} ", word.text),
                    Some(word) => word.text.clone(),
                    None => continue,
                };
                spans.push(Span::styled(text, style));
            }
            Line::from(spans)
        })
        .collect()
}

/// Collects the styled rows that should appear *before* the focus line.
pub fn collect_before_spans(
    focus: usize,
    blocks: &[Vec<String>],
    mut lines_needed: usize,
    style: Style,
    selection: Option<Selection>,
) -> Vec<Line<'static>> {
    let mut before = Vec::new();
    let mut i = focus;
    while i > 0 && lines_needed > 0 {
        i -= 1;
        let block = &blocks[i];
        let take = block.len().min(lines_needed);
        let start = block.len() - take;
        let row_style = context_style(i, style, selection);
        let rows = block[start..]
            .iter()
            .map(|l| Line::from(Span::styled(l.clone(), row_style)));
        before.splice(0..0, rows); // Prepend to maintain order
        lines_needed -= take;
    }
    before
}

/// Collects the styled rows that should appear *after* the focus line.
pub fn collect_after_spans(
    focus: usize,
    blocks: &[Vec<String>],
    mut lines_needed: usize,
    style: Style,
    selection: Option<Selection>,
) -> Vec<Line<'static>> {
    let mut after = Vec::new();
    let mut j = focus + 1;
    while j < blocks.len() && lines_needed > 0 {
        let block = &blocks[j];
        let take = block.len().min(lines_needed);
        let row_style = context_style(j, style, selection);
        let rows = block[..take]
            .iter()
            .map(|l| Line::from(Span::styled(l.clone(), row_style)));
        after.extend(rows);
        lines_needed -= take;
        j += 1;
    }
    after
}

fn context_style(index: usize, base: Style, selection: Option<Selection>) -> Style {
    match selection {
        Some(s) if s.line == index => base.add_modifier(Modifier::UNDERLINED),
        _ => base,
    }
}

/// Split a word list into visual rows by width (chars), keeping each word
/// whole so per-word styling survives wrapping.
pub fn split_words_into_rows(words: &[Word], width: usize) -> Vec<Vec<usize>> {
    let mut rows: Vec<Vec<usize>> = Vec::new();
    let mut row: Vec<usize> = Vec::new();
    let mut row_len = 0usize;

    for (j, w) in words.iter().enumerate() {
        let wlen = w.text.chars().count();
        let new_len = if row.is_empty() { wlen } else { row_len + 1 + wlen };
        if !row.is_empty() && width > 0 && new_len > width {
            rows.push(row);
            row = Vec::new();
            row_len = 0;
        }
        if row.is_empty() {
            row.push(j);
            row_len = wlen;
        } else {
            row.push(j);
            row_len += 1 + wlen;
        }
    }
    if !row.is_empty() {
        rows.push(row);
    }
    if rows.is_empty() {
        rows.push(Vec::new());
    }
    rows
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::lyrics::parse;
    use std::sync::Arc;

    fn word(text: &str) -> Word {
        Word { time: 0.0, text: text.to_string() }
    }

    #[test]
    fn test_split_words_into_rows_respects_width() {
        let words = vec![word("aaaa"), word("bbbb"), word("cc")];
        // "aaaa bbbb" is 9 chars; width 8 forces a break after the first.
        let rows = split_words_into_rows(&words, 8);
        assert_eq!(rows, vec![vec![0], vec![1, 2]]);
    }

    #[test]
    fn test_split_words_single_row_when_wide() {
        let words = vec![word("a"), word("b")];
        assert_eq!(split_words_into_rows(&words, 80), vec![vec![0, 1]]);
    }

    #[test]
    fn test_estimate_position_paused_is_anchor() {
        let update = Update {
            document: Arc::new(parse("[00:01.00]x")),
            playing: false,
            position: 7.5,
            duration: 100.0,
            ..Default::default()
        };
        let at = Instant::now() - std::time::Duration::from_secs(3);
        assert_eq!(estimate_position(&update, Some(at)), 7.5);
    }

    #[test]
    fn test_estimate_position_clamps_to_duration() {
        let update = Update {
            document: Arc::new(parse("[00:01.00]x")),
            playing: true,
            position: 99.0,
            duration: 100.0,
            ..Default::default()
        };
        let at = Instant::now() - std::time::Duration::from_secs(30);
        assert_eq!(estimate_position(&update, Some(at)), 100.0);
    }
}
