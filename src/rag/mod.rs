//! Grounded answer synthesis.
//!
//! Renders retrieved transcript chunks and the question into a context-only
//! prompt and asks the language model for an answer.

mod context;
mod synthesizer;

pub use context::format_context_for_prompt;
pub use synthesizer::AnswerSynthesizer;
