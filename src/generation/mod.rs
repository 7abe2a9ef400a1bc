//! Text generation backends.

mod openai;

pub use openai::OpenAIGenerator;

use crate::error::Result;
use async_trait::async_trait;

/// Trait for language model completion.
#[async_trait]
pub trait Generator: Send + Sync {
    /// Complete a fully rendered prompt and return the model's text.
    async fn complete(&self, prompt: &str) -> Result<String>;
}
