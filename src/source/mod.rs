use async_trait::async_trait;
use serde::{Deserialize, Serialize};

pub mod captions;
pub mod youtube;

pub use youtube::YoutubeTranscriptSource;

/// One timed caption entry
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TranscriptSegment {
    /// Caption text as delivered by the source
    pub text: String,

    /// Start offset in seconds
    pub start: f64,

    /// Duration in seconds
    pub duration: f64,
}

impl TranscriptSegment {
    pub fn new(text: impl Into<String>, start: f64, duration: f64) -> Self {
        Self {
            text: text.into(),
            start,
            duration,
        }
    }
}

/// A transcript returned by a [`TranscriptSource`]
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FetchedTranscript {
    /// Segments in playback order
    pub segments: Vec<TranscriptSegment>,

    /// Video the transcript belongs to
    pub video_id: String,

    /// Language code of the selected track, e.g. `en`
    pub language_code: String,

    /// Display name of the selected track, e.g. `English (auto-generated)`
    pub language: String,

    /// True when the track was produced by speech recognition
    pub is_generated: bool,
}

impl FetchedTranscript {
    pub fn segment_count(&self) -> usize {
        self.segments.len()
    }
}

/// A caption track a video offers
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TranscriptTrack {
    pub language_code: String,
    pub language: String,
    pub is_generated: bool,
    pub is_translatable: bool,
}

/// Errors raised by a transcript source.
///
/// The `Display` text of these variants is what gets classified into an
/// error kind downstream, so keep the wording stable and keep caller input
/// (video ids, URLs) out of it.
#[derive(thiserror::Error, Debug)]
pub enum SourceError {
    #[error("No transcript found in languages {requested:?}; available: {available:?}")]
    NoTranscriptFound {
        video_id: String,
        requested: Vec<String>,
        available: Vec<String>,
    },

    #[error("No transcript available for this video")]
    NoTranscriptAvailable(String),

    #[error("This video is unavailable")]
    VideoUnavailable(String),

    #[error("Transcripts are disabled for this video")]
    TranscriptsDisabled(String),

    #[error("This video is age restricted and requires sign-in")]
    AgeRestricted(String),

    #[error("This video is unplayable: {reason}")]
    Unplayable { video_id: String, reason: String },

    #[error("YouTube is blocking requests from this IP (bot check)")]
    RequestBlocked,

    #[error("YouTube rate limited this client (HTTP 429 or captcha)")]
    TooManyRequests,

    #[error("Invalid video id: pass the video id, not the URL")]
    InvalidVideoId(String),

    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("YouTube responded with HTTP {status}")]
    Status { status: u16, url: String },

    #[error("Could not parse YouTube response: {0}")]
    Unparsable(String),
}

/// An external capability that retrieves caption transcripts
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait TranscriptSource: Send + Sync {
    /// Fetch a transcript, picking the first of `languages` the video offers.
    /// An empty slice lets the source choose any available track.
    async fn fetch(
        &self,
        video_id: &str,
        languages: &[String],
    ) -> Result<FetchedTranscript, SourceError>;

    /// List the caption tracks a video offers
    async fn list(&self, video_id: &str) -> Result<Vec<TranscriptTrack>, SourceError>;

    /// Name of the backing service
    fn name(&self) -> &'static str;
}
