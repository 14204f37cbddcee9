use regex::Regex;
use std::sync::OnceLock;
use url::Url;

/// Average reading speed used for reading time estimates
const WORDS_PER_MINUTE: usize = 200;

fn bare_id_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"^[a-zA-Z0-9_-]{11}$").expect("valid video id regex"))
}

/// Check whether a string has the shape of a YouTube video id
pub fn is_video_id(input: &str) -> bool {
    bare_id_regex().is_match(input)
}

/// Turn a YouTube URL into its video id. Anything that is not a recognised
/// YouTube URL is returned unchanged.
pub fn extract_video_id(input: &str) -> String {
    video_id_from_url(input.trim()).unwrap_or_else(|| input.to_string())
}

fn video_id_from_url(input: &str) -> Option<String> {
    let parsed = Url::parse(input).ok()?;
    if !matches!(parsed.scheme(), "http" | "https") {
        return None;
    }

    let host = parsed.host_str()?;
    let host = host.strip_prefix("www.").unwrap_or(host);
    let host = host.strip_prefix("m.").unwrap_or(host);

    let candidate = match host {
        "youtu.be" => parsed.path_segments()?.next().map(str::to_string),
        "youtube.com" | "music.youtube.com" | "youtube-nocookie.com" => {
            let mut segments = parsed.path_segments()?;
            match segments.next() {
                Some("watch") => parsed
                    .query_pairs()
                    .find(|(key, _)| key == "v")
                    .map(|(_, value)| value.into_owned()),
                Some("embed") | Some("shorts") | Some("v") | Some("live") => {
                    segments.next().map(str::to_string)
                }
                _ => None,
            }
        }
        _ => None,
    }?;

    is_video_id(&candidate).then_some(candidate)
}

/// Format duration in human-readable format
pub fn format_duration(seconds: f64) -> String {
    let total_seconds = seconds.max(0.0) as u64;
    let hours = total_seconds / 3600;
    let minutes = (total_seconds % 3600) / 60;
    let secs = total_seconds % 60;

    if hours > 0 {
        format!("{}h {}m {}s", hours, minutes, secs)
    } else if minutes > 0 {
        format!("{}m {}s", minutes, secs)
    } else {
        format!("{}s", secs)
    }
}

/// Format a caption offset as `mm:ss.t`, or `h:mm:ss.t` past the hour
pub fn format_timestamp(seconds: f64) -> String {
    let tenths = (seconds.max(0.0) * 10.0).round() as u64;
    let hours = tenths / 36_000;
    let minutes = (tenths % 36_000) / 600;
    let secs = (tenths % 600) / 10;
    let fraction = tenths % 10;

    if hours > 0 {
        format!("{}:{:02}:{:02}.{}", hours, minutes, secs, fraction)
    } else {
        format!("{:02}:{:02}.{}", minutes, secs, fraction)
    }
}

/// Simple statistics about a transcript's text
#[derive(Debug, Clone, PartialEq)]
pub struct TranscriptStats {
    pub characters: usize,
    pub words: usize,
    pub sentences: usize,
    pub avg_words_per_sentence: usize,
    pub reading_minutes: usize,
}

impl TranscriptStats {
    pub fn from_text(text: &str) -> Self {
        let words = text.split_whitespace().count();
        let sentences = text
            .split(|c| matches!(c, '.' | '!' | '?'))
            .filter(|sentence| !sentence.trim().is_empty())
            .count();

        Self {
            characters: text.chars().count(),
            words,
            sentences,
            avg_words_per_sentence: if sentences == 0 {
                0
            } else {
                (words as f64 / sentences as f64).round() as usize
            },
            reading_minutes: words.div_ceil(WORDS_PER_MINUTE),
        }
    }
}

/// Shorten text to at most `max_chars` characters, appending an ellipsis when cut
pub fn preview(text: &str, max_chars: usize) -> String {
    if text.chars().count() <= max_chars {
        return text.to_string();
    }

    let cut: String = text.chars().take(max_chars).collect();
    format!("{}...", cut.trim_end())
}
