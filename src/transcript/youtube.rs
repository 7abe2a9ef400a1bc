//! YouTube caption fetcher backed by `yt_transcript_rs`.

use super::{Transcript, TranscriptProvider, TranscriptSnippet};
use crate::config::TranscriptSettings;
use crate::error::{ChatTubeError, Result, UnavailableReason};
use async_trait::async_trait;
use std::time::Duration;
use tracing::{debug, info, instrument};
use yt_transcript_rs::api::YouTubeTranscriptApi;
use yt_transcript_rs::errors::{CouldNotRetrieveTranscript, CouldNotRetrieveTranscriptReason};
use yt_transcript_rs::FetchedTranscript;

/// Fetches captions from YouTube in language priority order.
pub struct YoutubeTranscriptFetcher {
    api: YouTubeTranscriptApi,
    languages: Vec<String>,
    timeout: Duration,
}

impl YoutubeTranscriptFetcher {
    /// Create a fetcher accepting `languages`, highest priority first.
    pub fn new(languages: Vec<String>, timeout: Duration) -> Result<Self> {
        let api = YouTubeTranscriptApi::new(None, None, None).map_err(|e| {
            ChatTubeError::Config(format!("Failed to create YouTube transcript client: {}", e))
        })?;

        Ok(Self {
            api,
            languages,
            timeout,
        })
    }

    pub fn from_settings(settings: &TranscriptSettings) -> Result<Self> {
        Self::new(
            settings.languages.clone(),
            Duration::from_secs(settings.timeout_secs),
        )
    }
}

#[async_trait]
impl TranscriptProvider for YoutubeTranscriptFetcher {
    #[instrument(skip(self))]
    async fn fetch(&self, video_id: &str) -> Result<Transcript> {
        info!("Fetching transcript for video ID: {}", video_id);

        let languages: Vec<&str> = self.languages.iter().map(String::as_str).collect();
        let fetched = tokio::time::timeout(
            self.timeout,
            self.api.fetch_transcript(video_id, &languages, false),
        )
        .await
        .map_err(|_| {
            ChatTubeError::TranscriptFetch(format!(
                "request to YouTube timed out after {}s",
                self.timeout.as_secs()
            ))
        })?
        .map_err(|e| map_fetch_error(video_id, e))?;

        debug!(
            "Caption track {} (generated: {})",
            fetched.language_code, fetched.is_generated
        );

        let transcript = into_transcript(fetched);
        info!(
            "Successfully fetched transcript. {} snippets, {} characters",
            transcript.snippets.len(),
            transcript.text().chars().count()
        );
        Ok(transcript)
    }
}

fn into_transcript(fetched: FetchedTranscript) -> Transcript {
    let snippets = fetched
        .snippets
        .into_iter()
        .filter_map(|s| {
            let text = s.text.trim();
            (!text.is_empty()).then(|| TranscriptSnippet::new(text, s.start, s.duration))
        })
        .collect();

    Transcript {
        video_id: fetched.video_id,
        language: fetched.language,
        language_code: fetched.language_code,
        is_generated: fetched.is_generated,
        snippets,
    }
}

fn map_fetch_error(video_id: &str, err: CouldNotRetrieveTranscript) -> ChatTubeError {
    let message = err.to_string();
    classify_reason(video_id, err.reason.as_ref(), message)
}

/// Sort a retrieval failure into the unavailable reasons or a retryable fetch error.
fn classify_reason(
    video_id: &str,
    reason: Option<&CouldNotRetrieveTranscriptReason>,
    message: String,
) -> ChatTubeError {
    let unavailable = match reason {
        Some(CouldNotRetrieveTranscriptReason::TranscriptsDisabled) => {
            UnavailableReason::CaptionsDisabled
        }
        Some(CouldNotRetrieveTranscriptReason::NoTranscriptFound { .. }) => {
            UnavailableReason::NoTranscript
        }
        Some(
            CouldNotRetrieveTranscriptReason::VideoUnavailable
            | CouldNotRetrieveTranscriptReason::VideoUnplayable { .. }
            | CouldNotRetrieveTranscriptReason::InvalidVideoId
            | CouldNotRetrieveTranscriptReason::AgeRestricted,
        ) => UnavailableReason::VideoUnavailable,
        // Blocking, rate limits, consent pages and network errors may clear up on retry.
        _ => return ChatTubeError::TranscriptFetch(message),
    };

    ChatTubeError::unavailable(video_id, unavailable, Some(message))
}
