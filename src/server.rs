//! HTTP API over a shared [`Session`].

use crate::error::{ChatTubeError, ErrorKind};
use crate::session::{Session, SessionState};
use crate::transcript::parse_video_id;
use crate::vector_index::ScoredChunk;
use axum::{
    extract::{rejection::JsonRejection, FromRequest, Request, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use chrono::{DateTime, Utc};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;
use tracing::{error, info, warn};

/// Build the API router.
pub fn router(session: Arc<Session>) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        .route("/", get(root))
        .route("/health", get(health))
        .route("/process-video", post(process_video))
        .route("/chat", post(chat))
        .route("/status", get(status))
        .layer(TraceLayer::new_for_http())
        .layer(cors)
        .with_state(session)
}

/// HTTP status for an error, by kind and retryability.
pub fn status_for(err: &ChatTubeError) -> StatusCode {
    match err.kind() {
        ErrorKind::InvalidInput => StatusCode::UNPROCESSABLE_ENTITY,
        ErrorKind::TranscriptUnavailable | ErrorKind::EmptyTranscript => StatusCode::NOT_FOUND,
        ErrorKind::NotReady => StatusCode::BAD_REQUEST,
        ErrorKind::IndexingInProgress => StatusCode::CONFLICT,
        ErrorKind::TranscriptFetch
        | ErrorKind::EmbeddingBackendFailure
        | ErrorKind::GenerationBackendFailure => {
            if err.is_transient() {
                StatusCode::SERVICE_UNAVAILABLE
            } else {
                StatusCode::BAD_GATEWAY
            }
        }
        ErrorKind::Internal => StatusCode::INTERNAL_SERVER_ERROR,
    }
}

// === Request/Response Types ===

#[derive(Debug, Serialize, Deserialize)]
struct HealthResponse {
    status: String,
    message: String,
}

#[derive(Debug, Deserialize)]
struct ProcessVideoRequest {
    /// 11-character id or any YouTube URL form
    video_id: String,
}

#[derive(Debug, Serialize)]
struct ProcessVideoResponse {
    message: String,
    video_id: String,
    chunks_count: usize,
    transcript_length: usize,
    status: String,
}

#[derive(Debug, Deserialize)]
struct ChatRequest {
    question: String,
    /// Must match the indexed video when given.
    #[serde(default)]
    video_id: Option<String>,
}

#[derive(Debug, Serialize)]
struct ChatResponse {
    answer: String,
    video_id: String,
    sources: Vec<ScoredChunk>,
    status: String,
}

#[derive(Debug, Serialize)]
struct StatusResponse {
    service_status: String,
    state: SessionState,
    current_video_id: Option<String>,
    ready_for_questions: bool,
    chunk_count: Option<usize>,
    indexed_at: Option<DateTime<Utc>>,
}

#[derive(Debug, Serialize)]
struct ErrorResponse {
    detail: String,
    kind: ErrorKind,
}

/// Error wrapper that renders as `{detail, kind}`.
#[derive(Debug)]
struct ApiError(ChatTubeError);

impl From<ChatTubeError> for ApiError {
    fn from(err: ChatTubeError) -> Self {
        Self(err)
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = status_for(&self.0);
        if status.is_server_error() {
            error!("Request failed: {}", self.0);
        } else {
            warn!("Request rejected: {}", self.0);
        }

        (
            status,
            Json(ErrorResponse {
                detail: self.0.to_string(),
                kind: self.0.kind(),
            }),
        )
            .into_response()
    }
}

/// JSON body extractor whose rejections render as [`ApiError`].
struct ApiJson<T>(T);

impl<S, T> FromRequest<S> for ApiJson<T>
where
    T: DeserializeOwned,
    Json<T>: FromRequest<S, Rejection = JsonRejection>,
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        match Json::<T>::from_request(req, state).await {
            Ok(Json(value)) => Ok(Self(value)),
            Err(rejection) => Err(ApiError(ChatTubeError::InvalidInput(format!(
                "invalid request body: {}",
                rejection.body_text()
            )))),
        }
    }
}

fn require_video_id(input: &str) -> Result<String, ApiError> {
    parse_video_id(input).ok_or_else(|| {
        ApiError(ChatTubeError::InvalidInput(format!(
            "not a YouTube video id or URL: {:?}",
            input
        )))
    })
}

// === Handlers ===

async fn root() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "healthy".to_string(),
        message: "ChatTube API is running".to_string(),
    })
}

async fn health() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "healthy".to_string(),
        message: "All services are operational".to_string(),
    })
}

async fn process_video(
    State(session): State<Arc<Session>>,
    ApiJson(req): ApiJson<ProcessVideoRequest>,
) -> Result<Json<ProcessVideoResponse>, ApiError> {
    let video_id = require_video_id(&req.video_id)?;
    info!("Video processing requested for ID: {}", video_id);

    let outcome = session.process_video(&video_id).await?;

    Ok(Json(ProcessVideoResponse {
        message: format!(
            "Video {} processed successfully into {} chunks",
            outcome.video_id, outcome.chunk_count
        ),
        video_id: outcome.video_id,
        chunks_count: outcome.chunk_count,
        transcript_length: outcome.transcript_length,
        status: "success".to_string(),
    }))
}

async fn chat(
    State(session): State<Arc<Session>>,
    ApiJson(req): ApiJson<ChatRequest>,
) -> Result<Json<ChatResponse>, ApiError> {
    if let Some(requested) = req.video_id.as_deref() {
        let requested = require_video_id(requested)?;
        if let Some(current) = session.status().video_id {
            if current != requested {
                return Err(ApiError(ChatTubeError::InvalidInput(format!(
                    "video {} is not indexed; the current video is {}",
                    requested, current
                ))));
            }
        }
    }

    let answer = session.ask_question(&req.question).await?;

    Ok(Json(ChatResponse {
        answer: answer.answer,
        video_id: answer.video_id,
        sources: answer.sources,
        status: "success".to_string(),
    }))
}

async fn status(State(session): State<Arc<Session>>) -> Json<StatusResponse> {
    let status = session.status();
    Json(StatusResponse {
        service_status: "initialized".to_string(),
        state: status.state,
        current_video_id: status.video_id,
        ready_for_questions: status.ready,
        chunk_count: status.chunk_count,
        indexed_at: status.indexed_at,
    })
}
