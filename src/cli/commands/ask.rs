//! Ask command implementation.

use crate::cli::preflight::{self, Operation};
use crate::cli::Output;
use crate::config::Settings;
use crate::session::Session;
use crate::transcript::parse_video_id;
use anyhow::Result;

/// Index `video` and answer `question` about it.
pub async fn run_ask(video: &str, question: &str, show_sources: bool, settings: Settings) -> Result<()> {
    if let Err(e) = preflight::check(Operation::Ask) {
        Output::error(&format!("{}", e));
        return Err(e.into());
    }

    let video_id = parse_video_id(video)
        .ok_or_else(|| anyhow::anyhow!("Not a YouTube video ID or URL: {}", video))?;

    let session = Session::from_settings(&settings)?;

    let spinner = Output::spinner(&format!("Indexing transcript of {}...", video_id));
    let outcome = match session.process_video(&video_id).await {
        Ok(outcome) => {
            spinner.finish_and_clear();
            outcome
        }
        Err(e) => {
            spinner.finish_and_clear();
            Output::error(&format!("Failed to process video: {}", e));
            return Err(e.into());
        }
    };
    Output::success(&format!(
        "Indexed {} chunks ({} characters)",
        outcome.chunk_count, outcome.transcript_length
    ));

    let spinner = Output::spinner("Thinking...");
    match session.ask_question(question).await {
        Ok(answer) => {
            spinner.finish_and_clear();
            println!("\n{}\n", answer.answer);

            if show_sources && !answer.sources.is_empty() {
                Output::header("Sources");
                for (rank, source) in answer.sources.iter().enumerate() {
                    Output::source(rank + 1, source.score, &source.text);
                }
            }
        }
        Err(e) => {
            spinner.finish_and_clear();
            Output::error(&format!("Failed to generate answer: {}", e));
            return Err(e.into());
        }
    }

    Ok(())
}
