//! OpenAI chat completions implementation.

use super::Generator;
use crate::config::GenerationSettings;
use crate::error::{ChatTubeError, FailureClass, Result};
use crate::openai::{classify_error, create_client_with, OpenAIClient};
use async_openai::types::{
    ChatCompletionRequestMessage, ChatCompletionRequestSystemMessageArgs,
    ChatCompletionRequestUserMessageArgs, CreateChatCompletionRequestArgs,
};
use async_trait::async_trait;
use std::time::Duration;
use tracing::{debug, instrument};

/// OpenAI chat-model generator.
pub struct OpenAIGenerator {
    client: OpenAIClient,
    model: String,
    temperature: f32,
    system_prompt: Option<String>,
}

impl OpenAIGenerator {
    pub fn from_settings(settings: &GenerationSettings) -> Result<Self> {
        let client = create_client_with(
            settings.api_base.as_deref(),
            Duration::from_secs(settings.timeout_secs),
        )?;

        Ok(Self {
            client,
            model: settings.model.clone(),
            temperature: settings.temperature,
            system_prompt: None,
        })
    }

    /// Send a system message ahead of every prompt.
    pub fn with_system_prompt(mut self, system_prompt: Option<String>) -> Self {
        self.system_prompt = system_prompt.filter(|s| !s.trim().is_empty());
        self
    }

    pub fn model(&self) -> &str {
        &self.model
    }

    fn build_error(e: impl std::fmt::Display) -> ChatTubeError {
        ChatTubeError::GenerationBackend {
            class: FailureClass::Permanent,
            message: format!("Failed to build request: {}", e),
        }
    }
}

#[async_trait]
impl Generator for OpenAIGenerator {
    #[instrument(skip(self, prompt), fields(model = %self.model, prompt_chars = prompt.len()))]
    async fn complete(&self, prompt: &str) -> Result<String> {
        let mut messages: Vec<ChatCompletionRequestMessage> = Vec::with_capacity(2);

        if let Some(system) = &self.system_prompt {
            messages.push(
                ChatCompletionRequestSystemMessageArgs::default()
                    .content(system.clone())
                    .build()
                    .map_err(Self::build_error)?
                    .into(),
            );
        }

        messages.push(
            ChatCompletionRequestUserMessageArgs::default()
                .content(prompt.to_string())
                .build()
                .map_err(Self::build_error)?
                .into(),
        );

        let request = CreateChatCompletionRequestArgs::default()
            .model(&self.model)
            .messages(messages)
            .temperature(self.temperature)
            .build()
            .map_err(Self::build_error)?;

        let response = self.client.chat().create(request).await.map_err(|e| {
            ChatTubeError::GenerationBackend {
                class: classify_error(&e),
                message: format!("Failed to generate response: {}", e),
            }
        })?;

        let answer = response
            .choices
            .into_iter()
            .next()
            .and_then(|c| c.message.content)
            .filter(|content| !content.trim().is_empty())
            .ok_or_else(|| ChatTubeError::GenerationBackend {
                class: FailureClass::Permanent,
                message: "Empty response from LLM".to_string(),
            })?;

        debug!("Generated {} characters", answer.len());
        Ok(answer)
    }
}
