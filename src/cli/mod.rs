//! CLI module for ChatTube.

pub mod commands;
mod output;
pub mod preflight;

pub use output::Output;

use crate::config::BusyPolicy;
use clap::{Parser, Subcommand};

/// ChatTube - Ask questions about YouTube videos
///
/// Fetches a video's captions, indexes them, and answers questions using only
/// what the video says.
#[derive(Parser, Debug)]
#[command(name = "chattube")]
#[command(version, about, long_about = None)]
pub struct Cli {
    /// Increase verbosity (-v for info, -vv for debug, -vvv for trace)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Path to configuration file
    #[arg(short, long, global = true, env = "CHATTUBE_CONFIG")]
    pub config: Option<String>,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Start the HTTP API server
    Serve {
        /// Host to bind to (defaults to server.host)
        #[arg(long)]
        host: Option<String>,

        /// Port to bind to (defaults to server.port)
        #[arg(short, long)]
        port: Option<u16>,

        /// What to do with a video submitted while another is indexing (reject, wait)
        #[arg(long)]
        on_busy: Option<BusyPolicy>,
    },

    /// Index a video and answer one question about it
    Ask {
        /// YouTube URL or video ID
        video: String,

        /// The question to ask
        #[arg(required = true, num_args = 1..)]
        question: Vec<String>,

        /// Also print the transcript chunks the answer was based on
        #[arg(short, long)]
        sources: bool,
    },

    /// Print a video's transcript
    Transcript {
        /// YouTube URL or video ID
        video: String,

        /// Print snippets with timings as JSON
        #[arg(long)]
        json: bool,
    },

    /// Manage configuration
    Config {
        #[command(subcommand)]
        action: ConfigAction,
    },
}

#[derive(Subcommand, Debug)]
pub enum ConfigAction {
    /// Show current configuration
    Show,

    /// Show configuration file path
    Path,
}
