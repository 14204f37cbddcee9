//! Transcript Fetch - fetch YouTube caption transcripts and report them as JSON
//!
//! The core is [`transcript::fetch_transcript`]: it asks a [`source::TranscriptSource`]
//! for a transcript in the preferred languages, retries once without a language
//! constraint, and turns the outcome into a flat [`transcript::TranscriptResult`].

use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

pub mod cli;
pub mod config;
pub mod output;
pub mod source;
pub mod transcript;
pub mod utils;

pub use cli::{Cli, LogArgs, ProbeCli};
pub use config::{Config, LogFormat};
pub use source::{FetchedTranscript, SourceError, TranscriptSegment, TranscriptSource, TranscriptTrack, YoutubeTranscriptSource};
pub use transcript::{fetch_transcript, ErrorKind, TranscriptRequest, TranscriptResult};

/// Install the global tracing subscriber. Logs always go to stderr so stdout
/// stays reserved for program output.
pub fn init_tracing(args: &LogArgs, format: LogFormat) {
    let default_filter = if args.verbose {
        "transcript_fetch=debug"
    } else {
        "transcript_fetch=warn"
    };

    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| default_filter.into());

    let format = args.log_format.unwrap_or(format);
    let json = format == LogFormat::Json;

    // try_init: a subscriber may already be installed
    let _ = tracing_subscriber::registry()
        .with(filter)
        .with(json.then(|| tracing_subscriber::fmt::layer().json().with_writer(std::io::stderr)))
        .with((!json).then(|| tracing_subscriber::fmt::layer().with_writer(std::io::stderr)))
        .try_init();
}
