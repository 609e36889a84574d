// src/udemy/vtt.rs

use super::models::Cue;
use regex::Regex;
use std::sync::LazyLock;

// Short lectures use MM:SS.mmm ranges, longer ones HH:MM:SS.mmm.
static SHORT_RANGE_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^(\d{2}:\d{2}\.\d{3})\s*-->\s*\d{2}:\d{2}\.\d{3}").unwrap());
static LONG_RANGE_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^(\d{2}:\d{2}:\d{2}\.\d{3})\s*-->\s*\d{2}:\d{2}:\d{2}\.\d{3}").unwrap()
});

/// Parses a WebVTT document into timed cues.
///
/// Cue text may span several lines and ends at a blank line, the next
/// timestamp range, or a bare cue index.
pub fn parse(content: &str) -> Vec<Cue> {
    let lines: Vec<&str> = content.lines().collect();
    let mut cues = Vec::new();

    let mut i = 0;
    while i < lines.len() {
        let line = lines[i].trim();

        if !line.contains("-->") {
            i += 1;
            continue;
        }

        let start = SHORT_RANGE_RE
            .captures(line)
            .or_else(|| LONG_RANGE_RE.captures(line))
            .map(|c| c[1].to_string());
        let Some(start) = start else {
            i += 1;
            continue;
        };

        i += 1;
        let mut text_parts = Vec::new();
        while i < lines.len() {
            let text_line = lines[i].trim();
            if text_line.is_empty()
                || text_line.contains("-->")
                || text_line.chars().all(|c| c.is_ascii_digit())
            {
                break;
            }
            text_parts.push(text_line);
            i += 1;
        }

        if !text_parts.is_empty() {
            cues.push(Cue {
                time: normalize_time(&start),
                text: text_parts.join(" "),
            });
        }
    }

    cues
}

/// `MM:SS.mmm` stays minute-based; `HH:MM:SS.mmm` folds hours into
/// minutes so timestamps sort and display uniformly as MM:SS.
fn normalize_time(time_str: &str) -> String {
    let parts: Vec<&str> = time_str.split(':').collect();
    match parts.as_slice() {
        [minutes, seconds] => {
            let minutes: u64 = minutes.parse().unwrap_or(0);
            let seconds = seconds.parse::<f64>().unwrap_or(0.0) as u64;
            format!("{minutes:02}:{seconds:02}")
        }
        [hours, minutes, seconds] => {
            let hours: u64 = hours.parse().unwrap_or(0);
            let minutes: u64 = minutes.parse().unwrap_or(0);
            let seconds = seconds.parse::<f64>().unwrap_or(0.0) as u64;
            format!("{:02}:{seconds:02}", hours * 60 + minutes)
        }
        _ => "00:00".to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_short_format_cues() {
        let vtt = "WEBVTT\n\n1\n00:00.120 --> 00:02.840\nWelcome to the course\n\n2\n00:05.000 --> 00:08.000\nLet's get started\n";
        let cues = parse(vtt);
        assert_eq!(cues.len(), 2);
        assert_eq!(cues[0].time, "00:00");
        assert_eq!(cues[0].text, "Welcome to the course");
        assert_eq!(cues[1].time, "00:05");
    }

    #[test]
    fn folds_hours_into_minutes() {
        let vtt = "WEBVTT\n\n01:23:45.678 --> 01:23:50.000\nDeep into the course\n";
        let cues = parse(vtt);
        assert_eq!(cues[0].time, "83:45");
    }

    #[test]
    fn multi_line_cue_text_is_joined() {
        let vtt = "WEBVTT\n\n00:10.000 --> 00:12.000\nfirst line\nsecond line\n\n";
        let cues = parse(vtt);
        assert_eq!(cues[0].text, "first line second line");
    }

    #[test]
    fn cue_without_text_is_dropped() {
        let vtt = "WEBVTT\n\n00:10.000 --> 00:12.000\n\n00:13.000 --> 00:14.000\nspoken\n";
        let cues = parse(vtt);
        assert_eq!(cues.len(), 1);
        assert_eq!(cues[0].text, "spoken");
    }
}
