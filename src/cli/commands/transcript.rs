//! Transcript command implementation.

use crate::cli::output::format_duration;
use crate::cli::preflight::{self, Operation};
use crate::cli::Output;
use crate::config::Settings;
use crate::transcript::{parse_video_id, TranscriptProvider, YoutubeTranscriptFetcher};
use anyhow::Result;

/// Fetch and print a video's transcript.
pub async fn run_transcript(video: &str, json: bool, settings: Settings) -> Result<()> {
    preflight::check(Operation::Transcript)?;

    let video_id = parse_video_id(video)
        .ok_or_else(|| anyhow::anyhow!("Not a YouTube video ID or URL: {}", video))?;

    let fetcher = YoutubeTranscriptFetcher::from_settings(&settings.transcript)?;

    let spinner = Output::spinner(&format!("Fetching transcript for {}...", video_id));
    let result = fetcher.fetch(&video_id).await;
    spinner.finish_and_clear();

    let transcript = match result {
        Ok(t) => t,
        Err(e) => {
            Output::error(&format!("{}", e));
            return Err(e.into());
        }
    };

    if json {
        println!("{}", serde_json::to_string_pretty(&transcript)?);
        return Ok(());
    }

    Output::header(&format!("Transcript of {}", transcript.video_id));
    Output::kv("Language", &transcript.language);
    Output::kv("Snippets", &transcript.snippets.len().to_string());
    Output::kv("Duration", &format_duration(transcript.duration_seconds()));
    println!("\n{}", transcript.text());

    Ok(())
}
