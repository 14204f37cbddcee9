use super::ErrorKind;

/// Ordered substring checks; the first matching row decides the kind.
const RULES: &[(&[&str], ErrorKind)] = &[
    (&["no transcript", "transcript not available"], ErrorKind::NoTranscript),
    (&["video not found", "unavailable"], ErrorKind::VideoNotFound),
    (&["disabled"], ErrorKind::TranscriptsDisabled),
];

/// Classify a failure message into an [`ErrorKind`].
///
/// This is a heuristic over free-text messages, not a parser. Sources give no
/// stable error codes, so reworded or localized messages fall through to
/// [`ErrorKind::UnknownError`].
pub fn classify_error(message: &str) -> ErrorKind {
    let message = message.to_lowercase();

    RULES
        .iter()
        .find(|(needles, _)| needles.iter().any(|needle| message.contains(needle)))
        .map(|(_, kind)| *kind)
        .unwrap_or(ErrorKind::UnknownError)
}

/// Join segment texts with single spaces, collapse whitespace runs and trim
pub fn normalize_text<'a, I>(texts: I) -> String
where
    I: IntoIterator<Item = &'a str>,
{
    let mut out = String::new();
    for text in texts {
        for word in text.split_whitespace() {
            if !out.is_empty() {
                out.push(' ');
            }
            out.push_str(word);
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_classification_table() {
        assert_eq!(classify_error("No transcript found for this video"), ErrorKind::NoTranscript);
        assert_eq!(classify_error("Transcript not available"), ErrorKind::NoTranscript);
        assert_eq!(classify_error("VIDEO NOT FOUND"), ErrorKind::VideoNotFound);
        assert_eq!(classify_error("Video abc is unavailable"), ErrorKind::VideoNotFound);
        assert_eq!(classify_error("Subtitles are disabled for this video"), ErrorKind::TranscriptsDisabled);
        assert_eq!(classify_error("connection reset by peer"), ErrorKind::UnknownError);
        assert_eq!(classify_error(""), ErrorKind::UnknownError);
    }

    #[test]
    fn test_classification_order() {
        assert_eq!(
            classify_error("Transcripts are disabled and video unavailable"),
            ErrorKind::VideoNotFound
        );
        assert_eq!(
            classify_error("no transcript: video unavailable, captions disabled"),
            ErrorKind::NoTranscript
        );
    }

    #[test]
    fn test_normalize_text() {
        assert_eq!(normalize_text(["Never", "gonna  give"]), "Never gonna give");
        assert_eq!(normalize_text(["  a\tb\n", "", "\n c  "]), "a b c");
        assert_eq!(normalize_text(["caf\u{e9}\u{a0}au lait"]), "caf\u{e9} au lait");
        assert_eq!(normalize_text(Vec::<&str>::new()), "");
    }
}
