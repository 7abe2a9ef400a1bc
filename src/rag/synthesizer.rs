//! Answer synthesizer.

use super::context::format_context_for_prompt;
use crate::config::Prompts;
use crate::error::Result;
use crate::generation::Generator;
use std::collections::HashMap;
use std::sync::Arc;
use tracing::{debug, instrument};

/// Answers one question at a time from supplied transcript chunks.
pub struct AnswerSynthesizer {
    generator: Arc<dyn Generator>,
    prompts: Prompts,
}

impl AnswerSynthesizer {
    pub fn new(generator: Arc<dyn Generator>) -> Self {
        Self {
            generator,
            prompts: Prompts::default(),
        }
    }

    /// Set custom prompts (with user-defined variables).
    pub fn with_prompts(mut self, prompts: Prompts) -> Self {
        self.prompts = prompts;
        self
    }

    /// Render the prompt sent to the model.
    pub fn build_prompt<S: AsRef<str>>(&self, question: &str, context_chunks: &[S]) -> String {
        let context = format_context_for_prompt(context_chunks)
            .unwrap_or_else(|| self.prompts.answer.empty_context.clone());

        let mut vars = HashMap::new();
        vars.insert("question".to_string(), question.to_string());
        vars.insert("context".to_string(), context);

        self.prompts
            .render_with_custom(&self.prompts.answer.template, &vars)
    }

    /// Answer `question` using only `context_chunks`.
    #[instrument(skip(self, context_chunks), fields(chunks = context_chunks.len()))]
    pub async fn answer<S: AsRef<str> + Sync>(
        &self,
        question: &str,
        context_chunks: &[S],
    ) -> Result<String> {
        let prompt = self.build_prompt(question, context_chunks);
        debug!("Prompt is {} characters", prompt.len());

        self.generator.complete(&prompt).await
    }
}
