//! Transcript retrieval for YouTube videos.
//!
//! Provides the [`TranscriptProvider`] capability and the YouTube caption fetcher.

mod youtube;

pub use youtube::YoutubeTranscriptFetcher;

use crate::error::Result;
use async_trait::async_trait;
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::sync::OnceLock;

/// One caption line.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TranscriptSnippet {
    /// Caption text.
    pub text: String,
    /// Start time in seconds.
    pub start: f64,
    /// Duration in seconds.
    pub duration: f64,
}

impl TranscriptSnippet {
    pub fn new(text: impl Into<String>, start: f64, duration: f64) -> Self {
        Self {
            text: text.into(),
            start,
            duration,
        }
    }
}

/// A complete transcript with snippets in temporal order.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Transcript {
    /// Video ID this transcript belongs to.
    pub video_id: String,
    /// Human-readable language name (e.g. "English (auto-generated)").
    pub language: String,
    /// Language code of the caption track.
    pub language_code: String,
    /// Whether YouTube generated the track automatically.
    pub is_generated: bool,
    pub snippets: Vec<TranscriptSnippet>,
}

impl Transcript {
    /// Full transcript text: snippet texts joined by single spaces.
    pub fn text(&self) -> String {
        self.snippets
            .iter()
            .map(|s| s.text.as_str())
            .collect::<Vec<_>>()
            .join(" ")
    }

    /// Total duration in seconds.
    pub fn duration_seconds(&self) -> f64 {
        self.snippets
            .last()
            .map(|s| s.start + s.duration)
            .unwrap_or(0.0)
    }
}

/// Trait for transcript sources.
#[async_trait]
pub trait TranscriptProvider: Send + Sync {
    /// Fetch the transcript for a video.
    ///
    /// Fails with `TranscriptUnavailable` when captions are disabled, missing
    /// in every accepted language, or the video cannot be played, and with
    /// `TranscriptFetch` for network or service trouble.
    async fn fetch(&self, video_id: &str) -> Result<Transcript>;
}

fn video_id_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(
            r"(?x)
            (?:
                # Full YouTube URLs
                (?:https?://)?
                (?:www\.|m\.)?
                (?:youtube\.com/watch\?(?:\S*&)?v=|youtu\.be/|youtube\.com/embed/|youtube\.com/v/|youtube\.com/shorts/)
                ([a-zA-Z0-9_-]{11})
            )
            |
            # Bare video ID (11 characters)
            ^([a-zA-Z0-9_-]{11})$
        ",
        )
        .expect("video id regex is valid")
    })
}

/// Extract an 11-character video ID from a YouTube URL or bare ID.
pub fn parse_video_id(input: &str) -> Option<String> {
    let caps = video_id_regex().captures(input.trim())?;

    caps.get(1)
        .or_else(|| caps.get(2))
        .map(|m| m.as_str().to_string())
}
