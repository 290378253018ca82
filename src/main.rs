// codecast - streaming structured code generation in the terminal
//
// Sends a prompt to a generation service that streams a JSON object
// `{ code, language }` a piece at a time, and shows the code as it grows.
//
// Architecture:
// - Service (reqwest): opens the stream and yields partial objects
// - Session: validates increments against the schema and owns the lifecycle
// - Renderer (syntect): turns the partial object into highlighted lines
// - TUI (ratatui): prompt form, code panel, copy action, status
// - Headless: the same session driven once, code printed to stdout
// - Event system: an mpsc channel carries stream events to the session owner

mod cli;
mod config;
mod demo;
mod events;
mod headless;
mod logging;
mod render;
mod schema;
mod service;
mod session;
mod tui;

use anyhow::Result;
use clap::Parser;
use cli::{Cli, Commands};
use config::Config;
use logging::{LogBuffer, LogSink};
use service::{GenerationService, HttpGenerationService};
use std::sync::Arc;

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // Handle config commands first (--show, --reset, --edit, --path)
    if cli::handle_config_command(&cli) {
        return Ok(());
    }

    // Ensure config template exists (helps users discover options)
    Config::ensure_config_exists();

    let mut config = Config::from_env();
    if cli.demo {
        config.demo_mode = true;
    }

    // TUI mode captures logs into the panel buffer so they don't garble the
    // display; headless mode writes them to stderr, keeping stdout for code.
    // The guard flushes file logs and must outlive everything below.
    let log_buffer = LogBuffer::new();
    let sink = match cli.command {
        Some(Commands::Generate { .. }) => LogSink::Stderr,
        _ => LogSink::Tui,
    };
    let _file_guard = logging::init(&config.logging, sink, &log_buffer);

    let service: Arc<dyn GenerationService> = if config.demo_mode {
        tracing::info!("Running in DEMO MODE - streaming a scripted generation");
        Arc::new(demo::service())
    } else {
        tracing::info!("Using generation service at {}", config.service.endpoint);
        Arc::new(HttpGenerationService::new(&config.service)?)
    };

    match cli.command {
        Some(Commands::Generate {
            prompt,
            copy,
            no_line_numbers,
            plain,
        }) => {
            let options = headless::GenerateOptions {
                copy,
                plain,
                show_line_numbers: config.render.show_line_numbers && !no_line_numbers,
                syntax_theme: config.render.syntax_theme.clone(),
                copy_timeout: config.clipboard.copy_timeout(),
            };
            headless::generate(service, &prompt, options).await
        }
        // Handled above
        Some(Commands::Config { .. }) => Ok(()),
        None => {
            let initial_prompt = cli
                .prompt
                .or_else(|| config.demo_mode.then(|| demo::DEMO_PROMPT.to_string()));
            tui::run_tui(&config, service, log_buffer, initial_prompt).await?;
            tracing::info!("Shutting down");
            Ok(())
        }
    }
}
