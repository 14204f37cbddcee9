use serde::ser::{Serialize, Serializer};
use serde::Deserialize;

use crate::config::DEFAULT_LANGUAGES;
use crate::source::{FetchedTranscript, TranscriptSource};

pub mod classify;

pub use classify::{classify_error, normalize_text};

/// What to fetch, and in which languages
#[derive(Debug, Clone, PartialEq)]
pub struct TranscriptRequest {
    /// Video identifier; `None` when the caller supplied none
    pub video_id: Option<String>,

    /// Preferred languages, highest priority first
    pub languages: Vec<String>,
}

impl TranscriptRequest {
    pub fn new(video_id: impl Into<String>) -> Self {
        Self {
            video_id: Some(video_id.into()),
            languages: default_languages(),
        }
    }

    /// A request with no identifier at all
    pub fn missing() -> Self {
        Self {
            video_id: None,
            languages: default_languages(),
        }
    }

    /// The video id exactly as supplied, unless it is missing or blank
    pub fn video_id(&self) -> Option<&str> {
        self.video_id
            .as_deref()
            .filter(|id| !id.trim().is_empty())
    }

    /// Replace the language preferences; an empty list keeps the defaults
    pub fn with_languages(mut self, languages: Vec<String>) -> Self {
        if !languages.is_empty() {
            self.languages = languages;
        }
        self
    }
}

pub fn default_languages() -> Vec<String> {
    DEFAULT_LANGUAGES.iter().map(|lang| lang.to_string()).collect()
}

/// Failure categories reported to callers
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, serde::Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ErrorKind {
    NoTranscript,
    VideoNotFound,
    TranscriptsDisabled,
    InvalidArguments,
    UnknownError,
}

impl ErrorKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            ErrorKind::NoTranscript => "NO_TRANSCRIPT",
            ErrorKind::VideoNotFound => "VIDEO_NOT_FOUND",
            ErrorKind::TranscriptsDisabled => "TRANSCRIPTS_DISABLED",
            ErrorKind::InvalidArguments => "INVALID_ARGUMENTS",
            ErrorKind::UnknownError => "UNKNOWN_ERROR",
        }
    }
}

impl std::fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, serde::Serialize, Deserialize)]
pub struct TranscriptSuccess {
    pub transcript: String,
    pub language: String,
    pub language_name: String,
    pub is_generated: bool,
    pub segment_count: usize,
    pub video_id: String,
}

#[derive(Debug, Clone, PartialEq, serde::Serialize, Deserialize)]
pub struct TranscriptFailure {
    pub error: String,
    pub error_type: ErrorKind,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub video_id: Option<String>,
}

/// Outcome of a fetch. Serializes to one flat object led by a `success` flag.
#[derive(Debug, Clone, PartialEq)]
pub enum TranscriptResult {
    Success(TranscriptSuccess),
    Failure(TranscriptFailure),
}

impl TranscriptResult {
    pub fn failure(error: impl Into<String>, kind: ErrorKind, video_id: Option<String>) -> Self {
        TranscriptResult::Failure(TranscriptFailure {
            error: error.into(),
            error_type: kind,
            video_id,
        })
    }

    /// Failure for a request that carries no video id
    pub fn invalid_arguments() -> Self {
        Self::failure("Video ID argument required", ErrorKind::InvalidArguments, None)
    }

    /// Failure whose kind is derived from the message
    pub fn classified_failure(error: impl Into<String>, video_id: Option<String>) -> Self {
        let error = error.into();
        let kind = classify_error(&error);
        Self::failure(error, kind, video_id)
    }

    pub fn from_fetched(fetched: &FetchedTranscript, video_id: &str) -> Self {
        TranscriptResult::Success(TranscriptSuccess {
            transcript: normalize_text(fetched.segments.iter().map(|s| s.text.as_str())),
            language: fetched.language_code.clone(),
            language_name: fetched.language.clone(),
            is_generated: fetched.is_generated,
            segment_count: fetched.segment_count(),
            video_id: video_id.to_string(),
        })
    }

    pub fn is_success(&self) -> bool {
        matches!(self, TranscriptResult::Success(_))
    }

    pub fn error_kind(&self) -> Option<ErrorKind> {
        match self {
            TranscriptResult::Success(_) => None,
            TranscriptResult::Failure(failure) => Some(failure.error_type),
        }
    }
}

impl Serialize for TranscriptResult {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        #[derive(serde::Serialize)]
        struct Flat<'a, T> {
            success: bool,
            #[serde(flatten)]
            inner: &'a T,
        }

        match self {
            TranscriptResult::Success(inner) => Flat { success: true, inner }.serialize(serializer),
            TranscriptResult::Failure(inner) => Flat { success: false, inner }.serialize(serializer),
        }
    }
}

/// Fetch a transcript with a single language fallback.
///
/// The first attempt passes the whole preference list to the source. Any
/// error triggers exactly one unconstrained retry. A second error is
/// classified into a failure result; nothing escapes as an error.
pub async fn fetch_transcript<S>(source: &S, request: &TranscriptRequest) -> TranscriptResult
where
    S: TranscriptSource + ?Sized,
{
    let Some(video_id) = request.video_id() else {
        return TranscriptResult::invalid_arguments();
    };

    let languages = if request.languages.is_empty() {
        default_languages()
    } else {
        request.languages.clone()
    };

    tracing::debug!("Fetching {} transcript for {} in {:?}", source.name(), video_id, languages);

    let fetched = match source.fetch(video_id, &languages).await {
        Ok(fetched) => Ok(fetched),
        Err(e) => {
            tracing::debug!("Preferred languages failed for {}: {}; retrying unconstrained", video_id, e);
            source.fetch(video_id, &[]).await
        }
    };

    match fetched {
        Ok(fetched) => {
            tracing::info!(
                "Fetched {} segments ({}) for {}",
                fetched.segment_count(),
                fetched.language_code,
                video_id
            );
            TranscriptResult::from_fetched(&fetched, video_id)
        }
        Err(e) => {
            let result = TranscriptResult::classified_failure(e.to_string(), Some(video_id.to_string()));
            tracing::warn!(
                "Transcript fetch failed for {} ({}): {}",
                video_id,
                result.error_kind().map(|kind| kind.as_str()).unwrap_or_default(),
                e
            );
            result
        }
    }
}
