//! Session state machine.
//!
//! Coordinates the indexing path (fetch, chunk, embed, build) and the query
//! path (embed, search, synthesize) for one video at a time.
//!
//! The committed `(video_id, index)` pair lives behind a lock and is swapped
//! as one `Arc`, so readers see either the old pair or the new one. Indexing
//! is serialized by a separate async mutex that is held for the whole
//! `process_video` call; questions never wait on it.

use crate::chunking::{self, ChunkingConfig};
use crate::config::{BusyPolicy, Prompts, Settings};
use crate::embedding::{Embedder, OpenAIEmbedder};
use crate::error::{ChatTubeError, FailureClass, Result};
use crate::generation::OpenAIGenerator;
use crate::rag::AnswerSynthesizer;
use crate::transcript::{TranscriptProvider, YoutubeTranscriptFetcher};
use crate::vector_index::{IndexEntry, ScoredChunk, VectorIndex};
use chrono::{DateTime, Utc};
use serde::Serialize;
use std::sync::{Arc, PoisonError, RwLock, RwLockReadGuard, RwLockWriteGuard};
use tracing::{debug, info, instrument, warn};

/// Externally visible session state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum SessionState {
    /// No video has been indexed yet.
    Empty,
    /// A video is being fetched and indexed.
    Indexing,
    /// A video is indexed and questions can be answered.
    Ready,
}

impl std::fmt::Display for SessionState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SessionState::Empty => write!(f, "EMPTY"),
            SessionState::Indexing => write!(f, "INDEXING"),
            SessionState::Ready => write!(f, "READY"),
        }
    }
}

/// Snapshot returned by [`Session::status`].
#[derive(Debug, Clone, Serialize)]
pub struct SessionStatus {
    pub state: SessionState,
    /// Video whose index is currently committed.
    pub video_id: Option<String>,
    /// Whether questions can be answered right now.
    pub ready: bool,
    pub chunk_count: Option<usize>,
    pub indexed_at: Option<DateTime<Utc>>,
}

/// Result of processing a video.
#[derive(Debug, Clone, Serialize)]
pub struct ProcessOutcome {
    pub video_id: String,
    /// Number of chunks indexed.
    pub chunk_count: usize,
    /// Transcript length in characters.
    pub transcript_length: usize,
    /// Number of caption snippets in the transcript.
    pub snippet_count: usize,
}

/// An answer and the chunks it was grounded on.
#[derive(Debug, Clone, Serialize)]
pub struct Answer {
    pub answer: String,
    pub video_id: String,
    pub sources: Vec<ScoredChunk>,
}

/// Tunables for the pipeline.
#[derive(Debug, Clone)]
pub struct SessionConfig {
    pub chunking: ChunkingConfig,
    /// Chunks retrieved per question.
    pub top_k: usize,
    pub on_busy: BusyPolicy,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            chunking: ChunkingConfig::default(),
            top_k: 2,
            on_busy: BusyPolicy::Reject,
        }
    }
}

impl From<&Settings> for SessionConfig {
    fn from(settings: &Settings) -> Self {
        Self {
            chunking: ChunkingConfig::from(&settings.chunking),
            top_k: settings.retrieval.top_k,
            on_busy: settings.session.on_busy,
        }
    }
}

/// A committed video and its index. Never modified once published.
#[derive(Debug)]
struct IndexedVideo {
    video_id: String,
    index: VectorIndex,
    indexed_at: DateTime<Utc>,
}

#[derive(Debug, Default)]
struct Published {
    current: Option<Arc<IndexedVideo>>,
    indexing: bool,
}

/// The question-answering session for a single video.
pub struct Session {
    transcripts: Arc<dyn TranscriptProvider>,
    embedder: Arc<dyn Embedder>,
    synthesizer: AnswerSynthesizer,
    config: SessionConfig,
    published: RwLock<Published>,
    indexing_gate: tokio::sync::Mutex<()>,
}

/// Clears the in-flight flag when indexing ends, however it ends.
struct IndexingGuard<'a> {
    session: &'a Session,
    _gate: tokio::sync::MutexGuard<'a, ()>,
}

impl Drop for IndexingGuard<'_> {
    fn drop(&mut self) {
        self.session.write().indexing = false;
    }
}

impl Session {
    /// Create a session from explicit components.
    pub fn new(
        transcripts: Arc<dyn TranscriptProvider>,
        embedder: Arc<dyn Embedder>,
        synthesizer: AnswerSynthesizer,
        config: SessionConfig,
    ) -> Self {
        Self {
            transcripts,
            embedder,
            synthesizer,
            config,
            published: RwLock::new(Published::default()),
            indexing_gate: tokio::sync::Mutex::new(()),
        }
    }

    /// Create a session wired to YouTube and OpenAI.
    pub fn from_settings(settings: &Settings) -> Result<Self> {
        let prompts = Prompts::load(
            settings.prompts.custom_dir.as_deref(),
            Some(&settings.prompts.variables),
        )?;

        let transcripts = Arc::new(YoutubeTranscriptFetcher::from_settings(&settings.transcript)?);
        let embedder = Arc::new(OpenAIEmbedder::from_settings(&settings.embedding)?);
        let generator = OpenAIGenerator::from_settings(&settings.generation)?
            .with_system_prompt(prompts.answer.system.clone());

        info!(
            "Session using {} for embeddings and {} for answers",
            settings.embedding.model,
            generator.model()
        );
        let generator = Arc::new(generator);

        Ok(Self::new(
            transcripts,
            embedder,
            AnswerSynthesizer::new(generator).with_prompts(prompts),
            SessionConfig::from(settings),
        ))
    }

    /// Fetch, chunk, embed and index a video, replacing any previous one.
    #[instrument(skip(self))]
    pub async fn process_video(&self, video_id: &str) -> Result<ProcessOutcome> {
        let video_id = video_id.trim();
        if video_id.is_empty() {
            return Err(ChatTubeError::InvalidInput(
                "video_id must not be empty".to_string(),
            ));
        }

        let gate = match self.config.on_busy {
            BusyPolicy::Reject => self
                .indexing_gate
                .try_lock()
                .map_err(|_| ChatTubeError::IndexingInProgress)?,
            BusyPolicy::Wait => self.indexing_gate.lock().await,
        };

        self.write().indexing = true;
        let _guard = IndexingGuard {
            session: self,
            _gate: gate,
        };

        info!("Starting video processing for: {}", video_id);

        match self.build_index(video_id).await {
            Ok((index, outcome)) => {
                let indexed = Arc::new(IndexedVideo {
                    video_id: video_id.to_string(),
                    index,
                    indexed_at: Utc::now(),
                });

                let mut published = self.write();
                published.current = Some(indexed);
                published.indexing = false;

                info!(
                    "Video processing completed for {}: {} chunks from {} characters",
                    outcome.video_id, outcome.chunk_count, outcome.transcript_length
                );
                Ok(outcome)
            }
            Err(e) => {
                warn!("Error processing video {}: {}", video_id, e);
                Err(e)
            }
        }
    }

    async fn build_index(&self, video_id: &str) -> Result<(VectorIndex, ProcessOutcome)> {
        let transcript = self.transcripts.fetch(video_id).await?;
        let text = transcript.text();
        let transcript_length = text.chars().count();
        info!(
            "Fetched transcript: {} snippets, {} characters",
            transcript.snippets.len(),
            transcript_length
        );

        let chunks = chunking::split(&text, &self.config.chunking)?;
        info!("Created {} chunks from transcript", chunks.len());

        let texts: Vec<String> = chunks.iter().map(|c| c.content.clone()).collect();
        let embeddings = self.embedder.embed_batch(&texts).await?;
        if embeddings.len() != chunks.len() {
            return Err(ChatTubeError::EmbeddingBackend {
                class: FailureClass::Permanent,
                message: format!(
                    "embedder returned {} vectors for {} chunks",
                    embeddings.len(),
                    chunks.len()
                ),
            });
        }

        let entries: Vec<IndexEntry> = chunks
            .into_iter()
            .zip(embeddings)
            .map(|(chunk, embedding)| IndexEntry {
                text: chunk.content,
                embedding,
                order: chunk.order,
            })
            .collect();

        let index = VectorIndex::build(entries)?;
        debug!(
            "Built index of {} chunks with {} dimensions",
            index.chunk_count(),
            index.dimensions()
        );
        let outcome = ProcessOutcome {
            video_id: video_id.to_string(),
            chunk_count: index.chunk_count(),
            transcript_length,
            snippet_count: transcript.snippets.len(),
        };

        Ok((index, outcome))
    }

    /// Answer a question about the committed video.
    #[instrument(skip(self, question))]
    pub async fn ask_question(&self, question: &str) -> Result<Answer> {
        let snapshot = self
            .read()
            .current
            .clone()
            .ok_or(ChatTubeError::NotReady)?;

        let question = question.trim();
        if question.is_empty() {
            return Err(ChatTubeError::InvalidInput(
                "question must not be empty".to_string(),
            ));
        }

        info!(
            "Processing question about {}: {}",
            snapshot.video_id,
            question.chars().take(100).collect::<String>()
        );

        let query = self.embedder.embed(question).await?;
        let sources = snapshot.index.search(&query, self.config.top_k)?;

        let context: Vec<&str> = sources.iter().map(|s| s.text.as_str()).collect();
        let answer = self.synthesizer.answer(question, &context).await?;

        info!("Question answered from {} chunks", sources.len());
        Ok(Answer {
            answer,
            video_id: snapshot.video_id.clone(),
            sources,
        })
    }

    /// Current state. Never blocks on indexing and never fails.
    pub fn status(&self) -> SessionStatus {
        let published = self.read();
        let current = published.current.as_ref();

        let state = if published.indexing {
            SessionState::Indexing
        } else if current.is_some() {
            SessionState::Ready
        } else {
            SessionState::Empty
        };

        SessionStatus {
            state,
            video_id: current.map(|c| c.video_id.clone()),
            ready: current.is_some(),
            chunk_count: current.map(|c| c.index.chunk_count()),
            indexed_at: current.map(|c| c.indexed_at),
        }
    }

    fn read(&self) -> RwLockReadGuard<'_, Published> {
        self.published.read().unwrap_or_else(PoisonError::into_inner)
    }

    fn write(&self) -> RwLockWriteGuard<'_, Published> {
        self.published.write().unwrap_or_else(PoisonError::into_inner)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::chunking::expected_chunk_count;
    use crate::error::{ErrorKind, UnavailableReason};
    use crate::generation::Generator;
    use crate::transcript::{Transcript, TranscriptSnippet};
    use async_trait::async_trait;
    use std::collections::HashMap;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use tokio::sync::Notify;

    const DIMENSIONS: usize = 32;

    enum FakeVideo {
        Snippets(Vec<String>),
        Unavailable(UnavailableReason),
        NetworkDown,
    }

    /// Serves canned transcripts; one video id can be made to block.
    #[derive(Default)]
    struct FakeTranscripts {
        videos: HashMap<String, FakeVideo>,
        blocking_id: Option<String>,
        started: Notify,
        release: Notify,
    }

    impl FakeTranscripts {
        fn with(mut self, video_id: &str, video: FakeVideo) -> Self {
            self.videos.insert(video_id.to_string(), video);
            self
        }

        fn text(self, video_id: &str, text: &str) -> Self {
            self.with(video_id, FakeVideo::Snippets(vec![text.to_string()]))
        }

        fn blocking(mut self, video_id: &str) -> Self {
            self.blocking_id = Some(video_id.to_string());
            self
        }
    }

    #[async_trait]
    impl TranscriptProvider for FakeTranscripts {
        async fn fetch(&self, video_id: &str) -> Result<Transcript> {
            if self.blocking_id.as_deref() == Some(video_id) {
                self.started.notify_one();
                self.release.notified().await;
            }

            match self.videos.get(video_id) {
                Some(FakeVideo::Snippets(snippets)) => Ok(Transcript {
                    video_id: video_id.to_string(),
                    language: "English".to_string(),
                    language_code: "en".to_string(),
                    is_generated: false,
                    snippets: snippets
                        .iter()
                        .enumerate()
                        .map(|(i, s)| TranscriptSnippet::new(s.clone(), i as f64 * 2.0, 2.0))
                        .collect(),
                }),
                Some(FakeVideo::Unavailable(reason)) => {
                    Err(ChatTubeError::unavailable(video_id, *reason, None))
                }
                Some(FakeVideo::NetworkDown) => {
                    Err(ChatTubeError::TranscriptFetch("connection reset".to_string()))
                }
                None => Err(ChatTubeError::unavailable(
                    video_id,
                    UnavailableReason::VideoUnavailable,
                    None,
                )),
            }
        }
    }

    /// Bag-of-words embedder: each word bumps one hashed dimension.
    #[derive(Default)]
    struct FakeEmbedder {
        fail: bool,
        batch_calls: AtomicUsize,
    }

    fn bag_of_words(text: &str) -> Vec<f32> {
        let mut vector = vec![0.0; DIMENSIONS];
        for word in text
            .split(|c: char| !c.is_alphanumeric())
            .filter(|w| !w.is_empty())
        {
            let bucket = word
                .to_lowercase()
                .bytes()
                .fold(7usize, |h, b| h.wrapping_mul(31).wrapping_add(b as usize))
                % DIMENSIONS;
            vector[bucket] += 1.0;
        }
        vector
    }

    #[async_trait]
    impl Embedder for FakeEmbedder {
        async fn embed(&self, text: &str) -> Result<Vec<f32>> {
            let mut vectors = self.embed_batch(&[text.to_string()]).await?;
            Ok(vectors.remove(0))
        }

        async fn embed_batch(&self, texts: &[String]) -> Result<Vec<Vec<f32>>> {
            self.batch_calls.fetch_add(1, Ordering::SeqCst);
            if self.fail {
                return Err(ChatTubeError::EmbeddingBackend {
                    class: FailureClass::Permanent,
                    message: "invalid api key".to_string(),
                });
            }
            Ok(texts.iter().map(|t| bag_of_words(t)).collect())
        }

        fn dimensions(&self) -> usize {
            DIMENSIONS
        }
    }

    /// Answers with the prompt itself so tests can see the context used.
    struct EchoGenerator;

    #[async_trait]
    impl Generator for EchoGenerator {
        async fn complete(&self, prompt: &str) -> Result<String> {
            Ok(prompt.to_string())
        }
    }

    fn session_with(
        transcripts: FakeTranscripts,
        embedder: FakeEmbedder,
        config: SessionConfig,
    ) -> Session {
        Session::new(
            Arc::new(transcripts),
            Arc::new(embedder),
            AnswerSynthesizer::new(Arc::new(EchoGenerator)),
            config,
        )
    }

    fn session(transcripts: FakeTranscripts) -> Session {
        session_with(transcripts, FakeEmbedder::default(), SessionConfig::default())
    }

    const APPLES: &str = "Apples grow in orchards and the harvest happens every autumn.";
    const ROCKETS: &str = "Rockets reach orbit after launch when the engines burn long enough.";

    #[tokio::test]
    async fn test_new_session_is_empty() {
        let session = session(FakeTranscripts::default());
        let status = session.status();
        assert_eq!(status.state, SessionState::Empty);
        assert_eq!(status.video_id, None);
        assert!(!status.ready);
    }

    #[tokio::test]
    async fn test_ask_before_processing_is_not_ready() {
        let session = session(FakeTranscripts::default());
        for question in ["What is this video about?", "", "   "] {
            let err = session.ask_question(question).await.unwrap_err();
            assert_eq!(err.kind(), ErrorKind::NotReady);
        }
    }

    #[tokio::test]
    async fn test_process_then_ask() {
        let session = session(FakeTranscripts::default().text("abc12345678", ROCKETS));

        let outcome = session.process_video("abc12345678").await.unwrap();
        assert_eq!(outcome.chunk_count, 1);
        assert_eq!(outcome.transcript_length, ROCKETS.chars().count());

        let status = session.status();
        assert_eq!(status.state, SessionState::Ready);
        assert_eq!(status.video_id.as_deref(), Some("abc12345678"));
        assert_eq!(status.chunk_count, Some(1));
        assert!(status.indexed_at.is_some());

        let answer = session.ask_question("When do rockets reach orbit?").await.unwrap();
        assert_eq!(answer.video_id, "abc12345678");
        assert_eq!(answer.sources.len(), 1);
        assert!(answer.answer.contains(ROCKETS));
        assert!(answer.answer.contains("Question: When do rockets reach orbit?"));
    }

    #[tokio::test]
    async fn test_empty_inputs_are_rejected() {
        let session = session(FakeTranscripts::default().text("abc12345678", ROCKETS));

        let err = session.process_video("  ").await.unwrap_err();
        assert_eq!(err.kind(), ErrorKind::InvalidInput);
        assert_eq!(session.status().state, SessionState::Empty);

        session.process_video("abc12345678").await.unwrap();
        let err = session.ask_question(" ").await.unwrap_err();
        assert_eq!(err.kind(), ErrorKind::InvalidInput);
    }

    #[tokio::test]
    async fn test_chunk_count_for_long_transcript() {
        let snippets: Vec<String> = (0..168)
            .map(|i| format!("segment {} talks about the borrow checker and lifetimes", i))
            .collect();
        let text_len = snippets.join(" ").chars().count();

        let config = SessionConfig {
            chunking: ChunkingConfig {
                chunk_size: 1000,
                overlap: 200,
                boundary_tolerance: 0,
            },
            ..SessionConfig::default()
        };
        let embedder = FakeEmbedder::default();
        let session = session_with(
            FakeTranscripts::default().with("abc12345678", FakeVideo::Snippets(snippets)),
            embedder,
            config,
        );

        let outcome = session.process_video("abc12345678").await.unwrap();
        assert_eq!(outcome.snippet_count, 168);
        assert_eq!(outcome.transcript_length, text_len);
        assert_eq!(outcome.chunk_count, expected_chunk_count(text_len, 1000, 200));
        assert!(outcome.chunk_count > 1);
    }

    #[tokio::test]
    async fn test_index_is_built_with_one_batch_call() {
        let snippets: Vec<String> = (0..50).map(|i| format!("line number {} of the talk", i)).collect();
        let transcripts = FakeTranscripts::default().with("abc12345678", FakeVideo::Snippets(snippets));
        let embedder = Arc::new(FakeEmbedder::default());
        let config = SessionConfig {
            chunking: ChunkingConfig {
                chunk_size: 200,
                overlap: 50,
                boundary_tolerance: 20,
            },
            top_k: 1,
            ..SessionConfig::default()
        };
        let session = Session::new(
            Arc::new(transcripts),
            embedder.clone(),
            AnswerSynthesizer::new(Arc::new(EchoGenerator)),
            config,
        );

        let outcome = session.process_video("abc12345678").await.unwrap();
        assert!(outcome.chunk_count > 1);
        assert_eq!(embedder.batch_calls.load(Ordering::SeqCst), 1);

        let answer = session.ask_question("line number 0 of the talk").await.unwrap();
        assert_eq!(answer.sources.len(), 1);
        assert!(answer.sources[0].score > 0.5);

        let best = &answer.sources[0];
        let single = embedder.embed(&best.text).await.unwrap();
        let batched = embedder.embed_batch(&[best.text.clone()]).await.unwrap();
        assert_eq!(vec![single], batched);
    }

    #[tokio::test]
    async fn test_second_video_replaces_first() {
        let session = session(
            FakeTranscripts::default()
                .text("video000001", APPLES)
                .text("video000002", ROCKETS),
        );

        session.process_video("video000001").await.unwrap();
        session.process_video("video000002").await.unwrap();

        let answer = session.ask_question("Tell me about apples in orchards").await.unwrap();
        assert_eq!(answer.video_id, "video000002");
        assert!(answer.sources.iter().all(|s| s.text == ROCKETS));
        assert!(!answer.answer.contains("orchards and the harvest"));
        assert_eq!(session.status().video_id.as_deref(), Some("video000002"));
    }

    #[tokio::test]
    async fn test_fetch_failure_keeps_previous_video() {
        let session = session(
            FakeTranscripts::default()
                .text("video000001", APPLES)
                .with("disabled000", FakeVideo::Unavailable(UnavailableReason::CaptionsDisabled))
                .with("flaky000000", FakeVideo::NetworkDown),
        );

        session.process_video("video000001").await.unwrap();

        let err = session.process_video("disabled000").await.unwrap_err();
        match err {
            ChatTubeError::TranscriptUnavailable { reason, .. } => {
                assert_eq!(reason, UnavailableReason::CaptionsDisabled)
            }
            other => panic!("unexpected error: {}", other),
        }

        let err = session.process_video("flaky000000").await.unwrap_err();
        assert_eq!(err.kind(), ErrorKind::TranscriptFetch);
        assert!(err.is_transient());

        let status = session.status();
        assert_eq!(status.state, SessionState::Ready);
        assert_eq!(status.video_id.as_deref(), Some("video000001"));

        let answer = session.ask_question("When is the harvest?").await.unwrap();
        assert_eq!(answer.video_id, "video000001");
    }

    #[tokio::test]
    async fn test_first_failure_stays_empty() {
        let session = session(FakeTranscripts::default());
        let err = session.process_video("missing0000").await.unwrap_err();
        match err {
            ChatTubeError::TranscriptUnavailable { reason, .. } => {
                assert_eq!(reason, UnavailableReason::VideoUnavailable)
            }
            other => panic!("unexpected error: {}", other),
        }
        assert_eq!(session.status().state, SessionState::Empty);
        assert!(!session.status().ready);
    }

    #[tokio::test]
    async fn test_empty_transcript_fails() {
        let session = session(FakeTranscripts::default().with("silent00000", FakeVideo::Snippets(Vec::new())));
        let err = session.process_video("silent00000").await.unwrap_err();
        assert_eq!(err.kind(), ErrorKind::EmptyTranscript);
        assert_eq!(session.status().state, SessionState::Empty);
    }

    #[tokio::test]
    async fn test_embedding_failure_propagates_and_reverts() {
        let embedder = FakeEmbedder {
            fail: true,
            ..FakeEmbedder::default()
        };
        let session = session_with(
            FakeTranscripts::default().text("abc12345678", ROCKETS),
            embedder,
            SessionConfig::default(),
        );

        let err = session.process_video("abc12345678").await.unwrap_err();
        assert_eq!(err.kind(), ErrorKind::EmbeddingBackendFailure);
        assert!(!err.is_transient());
        assert_eq!(session.status().state, SessionState::Empty);
    }

    #[tokio::test]
    async fn test_concurrent_processing_is_rejected() {
        let transcripts = Arc::new(
            FakeTranscripts::default()
                .text("slow0000000", APPLES)
                .text("fast0000000", ROCKETS)
                .blocking("slow0000000"),
        );
        let session = Arc::new(Session::new(
            transcripts.clone(),
            Arc::new(FakeEmbedder::default()),
            AnswerSynthesizer::new(Arc::new(EchoGenerator)),
            SessionConfig::default(),
        ));

        let background = session.clone();
        let first = tokio::spawn(async move { background.process_video("slow0000000").await });
        transcripts.started.notified().await;

        let status = session.status();
        assert_eq!(status.state, SessionState::Indexing);
        assert!(!status.ready);

        let err = session.process_video("fast0000000").await.unwrap_err();
        assert_eq!(err.kind(), ErrorKind::IndexingInProgress);

        transcripts.release.notify_one();
        first.await.unwrap().unwrap();

        let status = session.status();
        assert_eq!(status.state, SessionState::Ready);
        assert_eq!(status.video_id.as_deref(), Some("slow0000000"));
    }

    #[tokio::test]
    async fn test_wait_policy_serializes_processing() {
        let transcripts = Arc::new(
            FakeTranscripts::default()
                .text("slow0000000", APPLES)
                .text("fast0000000", ROCKETS)
                .blocking("slow0000000"),
        );
        let session = Arc::new(Session::new(
            transcripts.clone(),
            Arc::new(FakeEmbedder::default()),
            AnswerSynthesizer::new(Arc::new(EchoGenerator)),
            SessionConfig {
                on_busy: BusyPolicy::Wait,
                ..SessionConfig::default()
            },
        ));

        let background = session.clone();
        let first = tokio::spawn(async move { background.process_video("slow0000000").await });
        transcripts.started.notified().await;

        let background = session.clone();
        let second = tokio::spawn(async move { background.process_video("fast0000000").await });
        for _ in 0..10 {
            tokio::task::yield_now().await;
        }
        assert!(!second.is_finished());
        assert_eq!(session.status().state, SessionState::Indexing);

        transcripts.release.notify_one();
        first.await.unwrap().unwrap();
        second.await.unwrap().unwrap();

        assert_eq!(session.status().video_id.as_deref(), Some("fast0000000"));
    }

    #[tokio::test]
    async fn test_cancelled_processing_clears_indexing_flag() {
        let transcripts = Arc::new(
            FakeTranscripts::default()
                .text("slow0000000", APPLES)
                .text("fast0000000", ROCKETS)
                .blocking("slow0000000"),
        );
        let session = Arc::new(Session::new(
            transcripts.clone(),
            Arc::new(FakeEmbedder::default()),
            AnswerSynthesizer::new(Arc::new(EchoGenerator)),
            SessionConfig::default(),
        ));

        let background = session.clone();
        let handle = tokio::spawn(async move { background.process_video("slow0000000").await });
        transcripts.started.notified().await;
        assert_eq!(session.status().state, SessionState::Indexing);

        handle.abort();
        assert!(handle.await.unwrap_err().is_cancelled());
        assert_eq!(session.status().state, SessionState::Empty);

        session.process_video("fast0000000").await.unwrap();
        assert_eq!(session.status().state, SessionState::Ready);
    }

    #[tokio::test]
    async fn test_questions_keep_answering_during_reindex() {
        let transcripts = Arc::new(
            FakeTranscripts::default()
                .text("video000001", APPLES)
                .text("slow0000000", ROCKETS)
                .blocking("slow0000000"),
        );
        let session = Arc::new(Session::new(
            transcripts.clone(),
            Arc::new(FakeEmbedder::default()),
            AnswerSynthesizer::new(Arc::new(EchoGenerator)),
            SessionConfig::default(),
        ));
        session.process_video("video000001").await.unwrap();

        let background = session.clone();
        let reindex = tokio::spawn(async move { background.process_video("slow0000000").await });
        transcripts.started.notified().await;

        let status = session.status();
        assert_eq!(status.state, SessionState::Indexing);
        assert!(status.ready);
        let answer = session.ask_question("What about the harvest?").await.unwrap();
        assert_eq!(answer.video_id, "video000001");

        transcripts.release.notify_one();
        reindex.await.unwrap().unwrap();
        let answer = session.ask_question("What about orbit?").await.unwrap();
        assert_eq!(answer.video_id, "slow0000000");
    }
}
