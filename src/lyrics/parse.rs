use crate::lyrics::types::{LyricDocument, LyricLine, Word};
use once_cell::sync::Lazy;
use regex::Regex;

static LINE_TIME_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"\[(\d+):(\d+\.\d+)\]").unwrap());
static BRACKET_TAG_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"\[[^\]]*\]").unwrap());
static WORD_TIME_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"<(\d+):(\d+\.\d+)>").unwrap());

/// Parse LRC text into a `LyricDocument`.
///
/// Never fails: lines without a `[mm:ss.xx]` timestamp, or whose content is
/// empty once every bracketed tag is stripped, are silently dropped.
pub fn parse(text: &str) -> LyricDocument {
    let lines = text.lines().filter_map(parse_line).collect();
    LyricDocument { lines }
}

fn parse_line(raw: &str) -> Option<LyricLine> {
    let start_time = capture_seconds(&LINE_TIME_RE.captures(raw)?)?;

    // Strip every [..] tag, not just the leading timestamp, so extra bracket
    // metadata on the line never leaks into the words.
    let content = BRACKET_TAG_RE.replace_all(raw, "");
    let content = content.trim();
    if content.is_empty() {
        return None;
    }

    let words = collect_words(content, start_time);
    if words.is_empty() {
        return None;
    }
    Some(LyricLine { start_time, words })
}

/// Walk `content` alternating between `<mm:ss.xx>` tags and the text between
/// them. A tag replaces the running time; each non-empty text chunk becomes
/// one word stamped with the running time. Text before the first tag uses the
/// line's own timestamp.
fn collect_words(content: &str, line_start: f64) -> Vec<Word> {
    let mut words = Vec::new();
    let mut current_time = line_start;
    let mut cursor = 0;
    for caps in WORD_TIME_RE.captures_iter(content) {
        let Some(m) = caps.get(0) else { continue };
        push_word(&mut words, &content[cursor..m.start()], current_time);
        if let Some(t) = capture_seconds(&caps) {
            current_time = t;
        }
        cursor = m.end();
    }
    push_word(&mut words, &content[cursor..], current_time);
    words
}

fn push_word(words: &mut Vec<Word>, chunk: &str, time: f64) {
    let text = chunk.trim();
    if !text.is_empty() {
        words.push(Word {
            time,
            text: text.to_string(),
        });
    }
}

/// Minutes and fractional seconds from a timestamp capture, as seconds.
fn capture_seconds(caps: &regex::Captures<'_>) -> Option<f64> {
    let minutes = caps.get(1)?.as_str().parse::<u32>().ok()?;
    let seconds = caps.get(2)?.as_str().parse::<f64>().ok()?;
    Some(f64::from(minutes) * 60.0 + seconds)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_word_tagged_line() {
        let doc = parse("[00:01.00]<00:01.00>Hello <00:02.50>world");
        assert_eq!(doc.len(), 1);
        let line = &doc.lines[0];
        assert_eq!(line.start_time, 1.0);
        assert_eq!(line.words.len(), 2);
        assert_eq!(line.words[0], Word { time: 1.0, text: "Hello".into() });
        assert_eq!(line.words[1], Word { time: 2.5, text: "world".into() });
    }

    #[test]
    fn test_untagged_line_is_one_word() {
        let doc = parse("[01:05.25]No tags here");
        assert_eq!(doc.len(), 1);
        let line = &doc.lines[0];
        assert_eq!(line.start_time, 65.25);
        assert_eq!(line.words, vec![Word { time: 65.25, text: "No tags here".into() }]);
    }

    #[test]
    fn test_no_timestamp_dropped() {
        assert!(parse("no timestamp at all").is_empty());
    }

    #[test]
    fn test_whole_second_timestamp_dropped() {
        // The line pattern requires a fractional part.
        assert!(parse("[00:05]Text").is_empty());
    }

    #[test]
    fn test_tag_only_line_dropped() {
        assert!(parse("[00:10.00][id:whatever]").is_empty());
        assert!(parse("[00:10.00]   ").is_empty());
    }

    #[test]
    fn test_extra_bracket_tags_stripped() {
        let doc = parse("[00:10.00][extra]Some text[more]");
        assert_eq!(doc.len(), 1);
        assert_eq!(doc.lines[0].words[0].text, "Some text");
    }

    #[test]
    fn test_words_before_first_tag_use_line_time() {
        let doc = parse("[00:03.00]Intro <00:04.00>then");
        let line = &doc.lines[0];
        assert_eq!(line.words[0], Word { time: 3.0, text: "Intro".into() });
        assert_eq!(line.words[1], Word { time: 4.0, text: "then".into() });
    }

    #[test]
    fn test_tag_run_shares_time() {
        // No intervening tag between "two" and "words": both carry 4.0,
        // and they stay one word because only tags split the text.
        let doc = parse("[00:03.00]<00:04.00>two words <00:05.00>end");
        let line = &doc.lines[0];
        assert_eq!(line.words[0], Word { time: 4.0, text: "two words".into() });
        assert_eq!(line.words[1], Word { time: 5.0, text: "end".into() });
    }

    #[test]
    fn test_source_order_preserved() {
        let doc = parse("[00:20.00]later\n[00:10.00]earlier");
        assert_eq!(doc.lines[0].start_time, 20.0);
        assert_eq!(doc.lines[1].start_time, 10.0);
    }

    #[test]
    fn test_every_line_has_words() {
        let doc = parse("[00:01.00]a\n\njunk\n[00:02.00]<00:02.10>b\n[00:03.00]");
        assert_eq!(doc.len(), 2);
        assert!(doc.lines.iter().all(|l| !l.words.is_empty()));
    }

    #[test]
    fn test_deterministic() {
        let input = "[00:01.00]<00:01.00>Hello <00:02.50>world\n[00:04.00]plain";
        assert_eq!(parse(input), parse(input));
    }

    #[test]
    fn test_minutes_folded_into_seconds() {
        let doc = parse("[02:30.50]x");
        assert_eq!(doc.lines[0].start_time, 150.5);
    }

    #[test]
    fn test_estimated_duration_tail() {
        let doc = parse("[00:10.00]a\n[00:30.00]b");
        assert_eq!(doc.estimated_duration(), Some(35.0));
        assert_eq!(parse("").estimated_duration(), None);
    }
}
