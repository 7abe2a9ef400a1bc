//! CLI command implementations.

mod ask;
mod config;
mod serve;
mod transcript;

pub use ask::run_ask;
pub use config::run_config;
pub use serve::run_serve;
pub use transcript::run_transcript;
