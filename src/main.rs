use anyhow::Result;
use clap::Parser;

use transcript_fetch::config::Config;
use transcript_fetch::source::YoutubeTranscriptSource;
use transcript_fetch::transcript::{fetch_transcript, TranscriptRequest, TranscriptResult};
use transcript_fetch::{init_tracing, output, utils, Cli};

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let loaded = Config::load();
    let format = loaded.as_ref().map(|config| config.logging.format).unwrap_or_default();
    init_tracing(&cli.logging, format);

    let config = loaded
        .unwrap_or_else(|e| {
            tracing::warn!("Ignoring configuration, using defaults: {:#}", e);
            Config::default()
        })
        .with_languages(cli.languages.clone());

    let result = run(&cli, &config).await;
    output::print_json(&result)?;

    if cli.fail_on_error && !result.is_success() {
        std::process::exit(1);
    }

    Ok(())
}

async fn run(cli: &Cli, config: &Config) -> TranscriptResult {
    let request = match cli.video_id.as_deref() {
        Some(input) => TranscriptRequest::new(utils::extract_video_id(input)),
        None => TranscriptRequest::missing(),
    }
    .with_languages(config.fetch.languages.clone());

    // Argument errors are reported before any client is built
    if request.video_id().is_none() {
        return TranscriptResult::invalid_arguments();
    }

    match YoutubeTranscriptSource::new(&config.http) {
        Ok(source) => fetch_transcript(&source, &request).await,
        Err(e) => {
            tracing::error!("Failed to build HTTP client: {}", e);
            TranscriptResult::classified_failure(e.to_string(), request.video_id().map(str::to_string))
        }
    }
}
