//! ChatTube - Ask questions about YouTube videos
//!
//! Fetches the captions of a YouTube video, splits them into overlapping
//! chunks, embeds them into an in-memory vector index and answers questions
//! from the retrieved chunks only.
//!
//! # Architecture
//!
//! - `transcript` - YouTube caption retrieval
//! - `chunking` - Overlapping fixed-size text chunks
//! - `embedding` - Embedding generation
//! - `vector_index` - In-memory cosine similarity search
//! - `generation` - Language model completion
//! - `rag` - Context-grounded answer synthesis
//! - `session` - The one-video-at-a-time state machine
//! - `server` - HTTP API over a session
//! - `config` - Settings and prompt templates
//!
//! # Example
//!
//! ```rust,no_run
//! use chattube::config::Settings;
//! use chattube::session::Session;
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let settings = Settings::load()?;
//!     let session = Session::from_settings(&settings)?;
//!
//!     let outcome = session.process_video("dQw4w9WgXcQ").await?;
//!     println!("Indexed {} chunks", outcome.chunk_count);
//!
//!     let answer = session.ask_question("What is the song about?").await?;
//!     println!("{}", answer.answer);
//!
//!     Ok(())
//! }
//! ```

pub mod chunking;
pub mod cli;
pub mod config;
pub mod embedding;
pub mod error;
pub mod generation;
pub mod openai;
pub mod rag;
pub mod server;
pub mod session;
pub mod transcript;
pub mod vector_index;

pub use error::{ChatTubeError, Result};
