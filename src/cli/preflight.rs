//! Pre-flight checks before expensive operations.
//!
//! Validates that required configuration is available before starting
//! operations that would otherwise fail midway.

use crate::error::{ChatTubeError, Result};

/// Requirements for different operations.
#[derive(Debug, Clone, Copy)]
pub enum Operation {
    /// Serving and asking call OpenAI for embeddings and answers.
    Serve,
    Ask,
    /// Fetching a transcript only talks to YouTube.
    Transcript,
}

/// Run pre-flight checks for the given operation.
pub fn check(operation: Operation) -> Result<()> {
    match operation {
        Operation::Serve | Operation::Ask => check_api_key(std::env::var("OPENAI_API_KEY").ok()),
        Operation::Transcript => Ok(()),
    }
}

fn check_api_key(key: Option<String>) -> Result<()> {
    match key {
        Some(key) if !key.trim().is_empty() => Ok(()),
        Some(_) => Err(ChatTubeError::Config(
            "OPENAI_API_KEY is empty. Set it with: export OPENAI_API_KEY='sk-...'".to_string(),
        )),
        None => Err(ChatTubeError::Config(
            "OPENAI_API_KEY not set. Set it with: export OPENAI_API_KEY='sk-...'".to_string(),
        )),
    }
}
