//! Error types for ChatTube.

use serde::Serialize;
use thiserror::Error;

/// Why a transcript could not be obtained for a video.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum UnavailableReason {
    /// The uploader disabled captions.
    CaptionsDisabled,
    /// Captions exist, but none in an accepted language.
    NoTranscript,
    /// The video does not exist, is private, or cannot be played.
    VideoUnavailable,
}

impl std::fmt::Display for UnavailableReason {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            UnavailableReason::CaptionsDisabled => write!(f, "transcripts are disabled for this video"),
            UnavailableReason::NoTranscript => write!(f, "no transcript is available"),
            UnavailableReason::VideoUnavailable => write!(f, "the video is unavailable"),
        }
    }
}

/// Whether a backend failure is worth retrying.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum FailureClass {
    /// Timeouts, connection problems, rate limits, server errors.
    Transient,
    /// Bad credentials, exhausted quota, malformed responses.
    Permanent,
}

impl std::fmt::Display for FailureClass {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            FailureClass::Transient => write!(f, "transient"),
            FailureClass::Permanent => write!(f, "permanent"),
        }
    }
}

/// Library-level error type for ChatTube operations.
#[derive(Error, Debug)]
pub enum ChatTubeError {
    #[error("Transcript unavailable for {video_id}: {reason}{}", detail_suffix(.detail))]
    TranscriptUnavailable {
        video_id: String,
        reason: UnavailableReason,
        detail: Option<String>,
    },

    #[error("Failed to fetch transcript: {0}")]
    TranscriptFetch(String),

    #[error("Transcript is empty")]
    EmptyTranscript,

    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("Embedding backend failure ({class}): {message}")]
    EmbeddingBackend { class: FailureClass, message: String },

    #[error("Generation backend failure ({class}): {message}")]
    GenerationBackend { class: FailureClass, message: String },

    #[error("No video has been processed yet. Please process a video first.")]
    NotReady,

    #[error("Another video is currently being processed")]
    IndexingInProgress,

    #[error("Vector index error: {0}")]
    VectorIndex(String),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("TOML parse error: {0}")]
    TomlParse(#[from] toml::de::Error),
}

fn detail_suffix(detail: &Option<String>) -> String {
    detail
        .as_ref()
        .map(|d| format!(" ({})", d))
        .unwrap_or_default()
}

/// Coarse error taxonomy, stable across message changes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorKind {
    TranscriptUnavailable,
    TranscriptFetch,
    EmptyTranscript,
    InvalidInput,
    EmbeddingBackendFailure,
    GenerationBackendFailure,
    NotReady,
    IndexingInProgress,
    Internal,
}

impl ChatTubeError {
    pub fn unavailable(video_id: &str, reason: UnavailableReason, detail: Option<String>) -> Self {
        ChatTubeError::TranscriptUnavailable {
            video_id: video_id.to_string(),
            reason,
            detail,
        }
    }

    pub fn kind(&self) -> ErrorKind {
        match self {
            ChatTubeError::TranscriptUnavailable { .. } => ErrorKind::TranscriptUnavailable,
            ChatTubeError::TranscriptFetch(_) => ErrorKind::TranscriptFetch,
            ChatTubeError::EmptyTranscript => ErrorKind::EmptyTranscript,
            ChatTubeError::InvalidInput(_) => ErrorKind::InvalidInput,
            ChatTubeError::EmbeddingBackend { .. } => ErrorKind::EmbeddingBackendFailure,
            ChatTubeError::GenerationBackend { .. } => ErrorKind::GenerationBackendFailure,
            ChatTubeError::NotReady => ErrorKind::NotReady,
            ChatTubeError::IndexingInProgress => ErrorKind::IndexingInProgress,
            ChatTubeError::VectorIndex(_)
            | ChatTubeError::Config(_)
            | ChatTubeError::Io(_)
            | ChatTubeError::Json(_)
            | ChatTubeError::TomlParse(_) => ErrorKind::Internal,
        }
    }

    /// True when repeating the same call later may succeed.
    pub fn is_transient(&self) -> bool {
        match self {
            ChatTubeError::TranscriptFetch(_) | ChatTubeError::IndexingInProgress => true,
            ChatTubeError::EmbeddingBackend { class, .. }
            | ChatTubeError::GenerationBackend { class, .. } => *class == FailureClass::Transient,
            _ => false,
        }
    }
}

/// Result type alias for ChatTube operations.
pub type Result<T> = std::result::Result<T, ChatTubeError>;
