use anyhow::{Context, Result};
use console::style;
use std::io::Write;

use crate::source::{FetchedTranscript, TranscriptTrack};
use crate::transcript::{normalize_text, TranscriptResult};
use crate::utils::{format_duration, format_timestamp, preview, TranscriptStats};

/// Write the result as one JSON object followed by a newline
pub fn write_json<W: Write>(result: &TranscriptResult, mut writer: W) -> Result<()> {
    serde_json::to_writer(&mut writer, result)
        .context("Failed to serialize transcript result")?;
    writeln!(writer)?;
    writer.flush()?;
    Ok(())
}

/// Print the result to stdout
pub fn print_json(result: &TranscriptResult) -> Result<()> {
    let stdout = std::io::stdout();
    write_json(result, stdout.lock())
}

/// Human-readable summary of a fetched transcript
pub fn format_fetched(fetched: &FetchedTranscript, samples: usize) -> String {
    let text = normalize_text(fetched.segments.iter().map(|s| s.text.as_str()));
    let stats = TranscriptStats::from_text(&text);
    let covered = fetched
        .segments
        .last()
        .map(|s| s.start + s.duration)
        .unwrap_or(0.0);

    let mut out = String::new();
    out.push_str(&format!("  Language:     {} ({})\n", fetched.language, fetched.language_code));
    out.push_str(&format!("  Generated:    {}\n", yes_no(fetched.is_generated)));
    out.push_str(&format!("  Segments:     {}\n", fetched.segment_count()));
    out.push_str(&format!("  Covers:       {}\n", format_duration(covered)));
    out.push_str(&format!(
        "  Text:         {} chars, {} words, {} sentences (~{} min read)\n",
        stats.characters, stats.words, stats.sentences, stats.reading_minutes
    ));
    out.push_str(&format!("  Sentence len: ~{} words\n", stats.avg_words_per_sentence));

    if samples > 0 && !fetched.segments.is_empty() {
        out.push_str("  Sample segments:\n");
        for (i, segment) in fetched.segments.iter().take(samples).enumerate() {
            out.push_str(&format!(
                "    {}. [{}] \"{}\"\n",
                i + 1,
                style(format_timestamp(segment.start)).dim(),
                segment.text
            ));
        }
        out.push_str(&format!("  Preview:      \"{}\"\n", preview(&text, 200)));
    }

    out
}

/// Human-readable listing of available tracks
pub fn format_tracks(tracks: &[TranscriptTrack]) -> String {
    if tracks.is_empty() {
        return "  (no caption tracks)\n".to_string();
    }

    tracks
        .iter()
        .map(|track| {
            format!(
                "  - {} ({})  generated: {}  translatable: {}\n",
                track.language,
                style(&track.language_code).cyan(),
                yes_no(track.is_generated),
                yes_no(track.is_translatable)
            )
        })
        .collect()
}

fn yes_no(value: bool) -> &'static str {
    if value {
        "yes"
    } else {
        "no"
    }
}
