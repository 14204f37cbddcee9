use clap::Parser;

use crate::config::LogFormat;

#[derive(Parser, Debug)]
#[command(
    name = "get-transcript",
    about = "Fetch the transcript of a YouTube video and print it as JSON",
    version,
    long_about = "Fetches the caption transcript of a YouTube video, preferring the configured languages and falling back to any available track. Prints exactly one JSON object on stdout; failures are reported in the payload, not through the exit code."
)]
pub struct Cli {
    /// Video id or YouTube URL
    #[arg(value_name = "VIDEO_ID")]
    pub video_id: Option<String>,

    /// Preferred languages, highest priority first
    #[arg(short, long, value_name = "LANGS", value_delimiter = ',', env = "TRANSCRIPT_LANGUAGES")]
    pub languages: Vec<String>,

    /// Exit with status 1 when the payload reports a failure
    #[arg(long, env = "TRANSCRIPT_FAIL_ON_ERROR")]
    pub fail_on_error: bool,

    #[command(flatten)]
    pub logging: LogArgs,
}

#[derive(Parser, Debug)]
#[command(
    name = "transcript-probe",
    about = "Diagnose transcript availability for YouTube videos",
    version
)]
pub struct ProbeCli {
    /// Video ids or YouTube URLs to check
    #[arg(
        value_name = "VIDEO_IDS",
        default_values = ["dQw4w9WgXcQ", "jNQXAC9IVRw", "9bZkp7q19f0", "Mus_vwhTCq0"]
    )]
    pub video_ids: Vec<String>,

    /// Language priority used for the preference test
    #[arg(short, long, value_name = "LANGS", value_delimiter = ',', default_values = ["en", "de", "es"])]
    pub languages: Vec<String>,

    /// Number of sample segments to show
    #[arg(short, long, default_value = "5")]
    pub samples: usize,

    /// Exit with status 1 if any video failed
    #[arg(long)]
    pub strict: bool,

    /// Disable progress indicators
    #[arg(short, long)]
    pub quiet: bool,

    #[command(flatten)]
    pub logging: LogArgs,
}

#[derive(clap::Args, Debug, Clone, Default)]
pub struct LogArgs {
    /// Enable verbose logging
    #[arg(short, long)]
    pub verbose: bool,

    /// Log line format on stderr (overrides the config file)
    #[arg(long, value_enum, value_name = "FORMAT")]
    pub log_format: Option<LogFormat>,
}
