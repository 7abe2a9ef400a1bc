//! ChatTube CLI entry point.

use anyhow::Result;
use chattube::cli::{commands, Cli, Commands};
use chattube::config::Settings;
use clap::Parser;
use std::path::PathBuf;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // Load configuration
    let config_path = cli.config.as_ref().map(PathBuf::from);
    let settings = Settings::load_from(config_path.as_ref())?;

    // Initialize logging
    let log_level = match cli.verbose {
        0 => settings.general.log_level.as_str(),
        1 => "info",
        2 => "debug",
        _ => "trace",
    };

    tracing_subscriber::registry()
        .with(EnvFilter::new(
            std::env::var("RUST_LOG").unwrap_or_else(|_| format!("chattube={}", log_level)),
        ))
        .with(tracing_subscriber::fmt::layer().with_target(false))
        .init();

    // Execute command
    match &cli.command {
        Commands::Serve {
            host,
            port,
            on_busy,
        } => {
            let mut settings = settings;
            if let Some(policy) = on_busy {
                settings.session.on_busy = *policy;
            }
            commands::run_serve(host.clone(), *port, settings).await?;
        }

        Commands::Ask {
            video,
            question,
            sources,
        } => {
            commands::run_ask(video, &question.join(" "), *sources, settings).await?;
        }

        Commands::Transcript { video, json } => {
            commands::run_transcript(video, *json, settings).await?;
        }

        Commands::Config { action } => {
            commands::run_config(action, config_path, settings)?;
        }
    }

    Ok(())
}
