//! Subtitle segmentation and timing.
//!
//! A narration line is split into display segments by a
//! language-specific segmenter, then each segment is assigned a time
//! span proportional to its share of the line's total character count.
//! Spans are laid end-to-end over the clip's pre-fade window.

use serde::{Deserialize, Serialize};

/// Maximum characters per rendered subtitle line.
const MAX_LINE_LENGTH: usize = 40;

/// One timed subtitle segment.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SubtitleSpan {
    /// On-timeline start, seconds
    pub start: f64,
    /// On-timeline end, seconds
    pub end: f64,
    /// Rendered text
    pub text: String,
}

/// Split a primary-language line into fixed-size character chunks.
///
/// Counts characters, not bytes; the last chunk may be shorter.
pub fn split_primary(line: &str) -> Vec<String> {
    let mut result = Vec::new();
    let mut current = String::new();
    let mut count = 0usize;

    for ch in line.chars() {
        current.push(ch);
        count += 1;
        if count == MAX_LINE_LENGTH {
            result.push(std::mem::take(&mut current));
            count = 0;
        }
    }

    if !current.is_empty() {
        result.push(current);
    }

    result
}

/// Split a secondary-language line by greedy word packing.
///
/// Words are packed onto a line while its length, including single
/// spaces between words, stays within the limit.
pub fn split_secondary(line: &str) -> Vec<String> {
    let mut result = Vec::new();
    let mut current: Vec<&str> = Vec::new();
    let mut current_len = 0usize;

    for word in line.split_whitespace() {
        let word_len = word.chars().count();
        let candidate_len = if current.is_empty() {
            word_len
        } else {
            current_len + 1 + word_len
        };

        if candidate_len <= MAX_LINE_LENGTH {
            current.push(word);
            current_len = candidate_len;
        } else {
            if !current.is_empty() {
                result.push(current.join(" "));
            }
            current = vec![word];
            current_len = word_len;
        }
    }

    if !current.is_empty() {
        result.push(current.join(" "));
    }

    result
}

/// Lay a line's segments end-to-end over `[window_start, window_end)`,
/// each span proportional to its share of the line's total character
/// count.
pub fn split_line_over_window(
    line: &str,
    window_start: f64,
    window_end: f64,
    segmenter: fn(&str) -> Vec<String>,
) -> Vec<SubtitleSpan> {
    let total_length = line.chars().count();
    if total_length == 0 {
        return Vec::new();
    }

    let total_duration = window_end - window_start;
    let mut start = window_start;
    let mut spans = Vec::new();

    for segment in segmenter(line) {
        let share = segment.chars().count() as f64 / total_length as f64;
        let end = start + total_duration * share;
        spans.push(SubtitleSpan {
            start,
            end,
            text: segment,
        });
        start = end;
    }

    spans
}

/// Render spans as an SRT document.
pub fn render_srt(spans: &[SubtitleSpan]) -> String {
    let mut out = String::new();
    for (i, span) in spans.iter().enumerate() {
        out.push_str(&format!(
            "{}\n{} --> {}\n{}\n\n",
            i + 1,
            srt_timestamp(span.start),
            srt_timestamp(span.end),
            span.text
        ));
    }
    out
}

/// Format seconds as an SRT `HH:MM:SS,mmm` timestamp.
fn srt_timestamp(seconds: f64) -> String {
    let total_ms = (seconds * 1000.0).round() as u64;
    let hours = total_ms / 3_600_000;
    let minutes = (total_ms % 3_600_000) / 60_000;
    let secs = (total_ms % 60_000) / 1000;
    let millis = total_ms % 1000;
    format!("{:02}:{:02}:{:02},{:03}", hours, minutes, secs, millis)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_split_primary_exact_chunks() {
        let line = "a".repeat(85);
        let chunks = split_primary(&line);
        let lengths: Vec<usize> = chunks.iter().map(|c| c.chars().count()).collect();
        assert_eq!(lengths, vec![40, 40, 5]);
    }

    #[test]
    fn test_split_primary_counts_chars_not_bytes() {
        let line = "好".repeat(41);
        let chunks = split_primary(&line);
        assert_eq!(chunks.len(), 2);
        assert_eq!(chunks[0].chars().count(), 40);
        assert_eq!(chunks[1].chars().count(), 1);
    }

    #[test]
    fn test_split_secondary_packs_words() {
        let line = "the quick brown fox jumps over the lazy dog near the river bank at dawn";
        let chunks = split_secondary(line);
        for chunk in &chunks {
            assert!(chunk.chars().count() <= 40, "line too long: {:?}", chunk);
        }
        assert_eq!(chunks.join(" "), line);
    }

    #[test]
    fn test_split_secondary_single_long_word_gets_own_line() {
        let line = "tiny supercalifragilisticexpialidociousword tail";
        let chunks = split_secondary(line);
        assert!(chunks.iter().any(|c| c.contains("supercali")));
    }

    #[test]
    fn test_proportional_spans_match_shares() {
        let line = "a".repeat(85);
        let spans = split_line_over_window(&line, 10.0, 20.0, split_primary);
        assert_eq!(spans.len(), 3);

        // 40/85, 40/85, 5/85 of a 10 second window
        assert!((spans[0].start - 10.0).abs() < 1e-9);
        assert!((spans[0].end - 14.70588).abs() < 1e-4);
        assert!((spans[1].end - 19.41176).abs() < 1e-4);
        assert!((spans[2].end - 20.0).abs() < 1e-9);

        // Contiguous
        assert_eq!(spans[0].end, spans[1].start);
        assert_eq!(spans[1].end, spans[2].start);
    }

    #[test]
    fn test_empty_line_produces_no_spans() {
        let spans = split_line_over_window("", 0.0, 4.0, split_primary);
        assert!(spans.is_empty());
    }

    #[test]
    fn test_srt_rendering() {
        let spans = vec![SubtitleSpan {
            start: 0.0,
            end: 1.5,
            text: "hello".into(),
        }];
        let srt = render_srt(&spans);
        assert_eq!(srt, "1\n00:00:00,000 --> 00:00:01,500\nhello\n\n");
    }

    #[test]
    fn test_srt_timestamp_rollover() {
        assert_eq!(srt_timestamp(3661.25), "01:01:01,250");
    }
}
