//! Configuration module for ChatTube.
//!
//! Handles loading and managing application settings and prompt templates.

mod prompts;
mod settings;

pub use prompts::{AnswerPrompts, Prompts};
pub use settings::{
    BusyPolicy, ChunkingSettings, EmbeddingSettings, GeneralSettings, GenerationSettings,
    PromptSettings, RetrievalSettings, ServerSettings, SessionSettings, Settings,
    TranscriptSettings,
};
