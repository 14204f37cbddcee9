use anyhow::{Context, Result};
use clap::Parser;
use console::style;
use indicatif::{ProgressBar, ProgressStyle};
use std::time::Duration;

use transcript_fetch::config::Config;
use transcript_fetch::source::{FetchedTranscript, SourceError, TranscriptSource, YoutubeTranscriptSource};
use transcript_fetch::{init_tracing, output, utils, ProbeCli};

#[tokio::main]
async fn main() -> Result<()> {
    let cli = ProbeCli::parse();

    let loaded = Config::load();
    let format = loaded.as_ref().map(|config| config.logging.format).unwrap_or_default();
    init_tracing(&cli.logging, format);

    let config = loaded.unwrap_or_else(|e| {
        tracing::warn!("Ignoring configuration, using defaults: {:#}", e);
        Config::default()
    });

    let source = YoutubeTranscriptSource::new(&config.http)
        .context("Failed to build HTTP client")?;

    println!(
        "{} transcript probe ({})",
        style(source.name()).bold(),
        chrono::Local::now().format("%Y-%m-%d %H:%M:%S")
    );

    let mut successful = Vec::new();
    for input in &cli.video_ids {
        let video_id = utils::extract_video_id(input);
        if probe_video(&source, &video_id, &cli).await {
            successful.push(video_id);
        }
    }

    println!();
    println!(
        "{}",
        style(format!("{}/{} videos returned a transcript", successful.len(), cli.video_ids.len())).bold()
    );
    for video_id in &successful {
        println!("  - {}", video_id);
    }

    if cli.strict && successful.len() < cli.video_ids.len() {
        std::process::exit(1);
    }

    Ok(())
}

/// Run the diagnostic steps for one video; true when a transcript was fetched
async fn probe_video(source: &dyn TranscriptSource, video_id: &str, cli: &ProbeCli) -> bool {
    println!();
    println!("{}", style(format!("=== {} ===", video_id)).cyan().bold());

    println!("{}", style("1. Default fetch").bold());
    let progress = spinner(cli.quiet, format!("Fetching transcript for {}...", video_id));
    let fetched = source.fetch(video_id, &[]).await;
    progress.finish_and_clear();

    let fetched_ok = match &fetched {
        Ok(fetched) => {
            print!("{}", output::format_fetched(fetched, cli.samples));
            true
        }
        Err(e) => {
            println!("  {} {}", style("FAILED:").red(), e);
            false
        }
    };

    println!("{}", style("2. Available tracks").bold());
    let progress = spinner(cli.quiet, format!("Listing tracks for {}...", video_id));
    let tracks = source.list(video_id).await;
    progress.finish_and_clear();

    match tracks {
        Ok(tracks) => print!("{}", output::format_tracks(&tracks)),
        Err(e) => println!("  {} {}", style("FAILED:").red(), e),
    }

    println!("{}", style("3. English track").bold());
    let progress = spinner(cli.quiet, "Fetching the English track...".to_string());
    let english = source.fetch(video_id, &["en".to_string()]).await;
    progress.finish_and_clear();
    report_retrieved(english);

    println!("{}", style(format!("4. Language priority {:?}", cli.languages)).bold());
    let progress = spinner(cli.quiet, "Fetching with language priority...".to_string());
    let preferred = source.fetch(video_id, &cli.languages).await;
    progress.finish_and_clear();
    report_retrieved(preferred);

    fetched_ok
}

fn report_retrieved(fetched: Result<FetchedTranscript, SourceError>) {
    match fetched {
        Ok(fetched) => println!(
            "  Retrieved {} ({}), {} segments",
            fetched.language,
            fetched.language_code,
            fetched.segment_count()
        ),
        Err(e) => println!("  {} {}", style("FAILED:").red(), e),
    }
}

fn spinner(quiet: bool, message: String) -> ProgressBar {
    if quiet {
        return ProgressBar::hidden();
    }

    let progress = ProgressBar::new_spinner();
    if let Ok(template) = ProgressStyle::default_spinner().template("{spinner:.green} {msg}") {
        progress.set_style(template);
    }
    progress.set_message(message);
    progress.enable_steady_tick(Duration::from_millis(100));
    progress
}
