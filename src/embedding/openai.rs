//! OpenAI embeddings implementation.

use super::Embedder;
use crate::config::EmbeddingSettings;
use crate::error::{ChatTubeError, FailureClass, Result};
use crate::openai::{classify_error, create_client_with, OpenAIClient};
use async_openai::types::{CreateEmbeddingRequestArgs, EmbeddingInput};
use async_trait::async_trait;
use futures::stream::{self, StreamExt, TryStreamExt};
use std::time::Duration;
use tracing::{debug, instrument};

/// OpenAI-based embedder.
pub struct OpenAIEmbedder {
    client: OpenAIClient,
    model: String,
    dimensions: usize,
    batch_size: usize,
    max_concurrent_requests: usize,
}

impl OpenAIEmbedder {
    /// Create a new OpenAI embedder with default settings.
    pub fn new() -> Result<Self> {
        Self::from_settings(&EmbeddingSettings::default())
    }

    pub fn from_settings(settings: &EmbeddingSettings) -> Result<Self> {
        let client = create_client_with(
            settings.api_base.as_deref(),
            Duration::from_secs(settings.timeout_secs),
        )?;

        Ok(Self {
            client,
            model: settings.model.clone(),
            dimensions: settings.dimensions as usize,
            batch_size: settings.batch_size.max(1),
            max_concurrent_requests: settings.max_concurrent_requests.max(1),
        })
    }

    async fn embed_request(&self, input: Vec<String>) -> Result<Vec<Vec<f32>>> {
        let expected = input.len();

        let request = CreateEmbeddingRequestArgs::default()
            .model(&self.model)
            .input(EmbeddingInput::StringArray(input))
            .dimensions(self.dimensions as u32)
            .build()
            .map_err(|e| ChatTubeError::EmbeddingBackend {
                class: FailureClass::Permanent,
                message: format!("Failed to build request: {}", e),
            })?;

        let response = self.client.embeddings().create(request).await.map_err(|e| {
            ChatTubeError::EmbeddingBackend {
                class: classify_error(&e),
                message: format!("Embedding API error: {}", e),
            }
        })?;

        // Sort by index to ensure correct order
        let mut embeddings: Vec<_> = response.data.into_iter().collect();
        embeddings.sort_by_key(|e| e.index);

        if embeddings.len() != expected {
            return Err(ChatTubeError::EmbeddingBackend {
                class: FailureClass::Permanent,
                message: format!(
                    "Embedding API returned {} vectors for {} inputs",
                    embeddings.len(),
                    expected
                ),
            });
        }

        embeddings
            .into_iter()
            .map(|data| {
                if data.embedding.len() == self.dimensions {
                    Ok(data.embedding)
                } else {
                    Err(ChatTubeError::EmbeddingBackend {
                        class: FailureClass::Permanent,
                        message: format!(
                            "Embedding has {} dimensions, expected {}",
                            data.embedding.len(),
                            self.dimensions
                        ),
                    })
                }
            })
            .collect()
    }
}

#[async_trait]
impl Embedder for OpenAIEmbedder {
    #[instrument(skip(self, text))]
    async fn embed(&self, text: &str) -> Result<Vec<f32>> {
        let embeddings = self.embed_batch(&[text.to_string()]).await?;
        embeddings
            .into_iter()
            .next()
            .ok_or_else(|| ChatTubeError::EmbeddingBackend {
                class: FailureClass::Permanent,
                message: "Empty embedding response".to_string(),
            })
    }

    #[instrument(skip(self, texts), fields(count = texts.len()))]
    async fn embed_batch(&self, texts: &[String]) -> Result<Vec<Vec<f32>>> {
        if texts.is_empty() {
            return Ok(Vec::new());
        }

        debug!("Generating embeddings for {} texts", texts.len());

        let requests: Vec<Vec<String>> = texts
            .chunks(self.batch_size)
            .map(|chunk| chunk.to_vec())
            .collect();

        // `buffered` keeps request order, so batches come back in input order.
        let batches: Vec<Vec<Vec<f32>>> = stream::iter(requests)
            .map(|batch| self.embed_request(batch))
            .buffered(self.max_concurrent_requests)
            .try_collect()
            .await?;

        let all_embeddings: Vec<Vec<f32>> = batches.into_iter().flatten().collect();

        debug!("Generated {} embeddings", all_embeddings.len());
        Ok(all_embeddings)
    }

    fn dimensions(&self) -> usize {
        self.dimensions
    }
}
