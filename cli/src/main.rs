//! Deckhand - Entry Point
//!
//! Packages, uploads, builds and deploys platform projects.

use std::process::ExitCode;
use std::sync::Arc;

use anyhow::Context;
use clap::Parser;
use colored::Colorize;
use tracing::{error, info};

use deckhand::app::commands::{execute, Cli};
use deckhand::app::context::AppContext;
use deckhand::authn::token_mngr::TokenManager;
use deckhand::filesys::file::File;
use deckhand::logs::{init_logging, LogLevel, LogOptions};
use deckhand::status::console::ConsoleSink;
use deckhand::storage::layout::StorageLayout;
use deckhand::storage::settings::Settings;

/// Exit code after an interrupt
const INTERRUPTED: u8 = 130;

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();

    match run(cli).await {
        Ok(code) => code,
        Err(e) => {
            error!("{:#}", e);
            eprintln!("{} {:#}", "Error:".red().bold(), e);
            ExitCode::FAILURE
        }
    }
}

async fn run(cli: Cli) -> anyhow::Result<ExitCode> {
    // Retrieve the settings file
    let settings_file = match &cli.config {
        Some(path) => File::new(path),
        None => StorageLayout::default().settings_file(),
    };
    let settings = Settings::load(&settings_file)
        .await
        .context("Unable to load settings")?;

    // Initialize logging
    let log_options = LogOptions {
        log_level: if cli.debug {
            LogLevel::Debug
        } else {
            settings.log_level.clone()
        },
        json_format: cli.json_logs,
    };
    if let Err(e) = init_logging(log_options) {
        eprintln!("Failed to initialize logging: {e}");
    }

    let token_mngr = TokenManager::from_env(settings.accounts.clone());
    let ctx = AppContext::new(
        settings,
        cli.account.as_deref(),
        token_mngr,
        Arc::new(ConsoleSink::new()),
    )?;

    // Dropping the command future on interrupt removes any temporary archive
    tokio::select! {
        result = execute(cli.command, ctx) => Ok(result?),
        _ = tokio::signal::ctrl_c() => {
            info!("Ctrl+C received, stopping...");
            Ok(ExitCode::from(INTERRUPTED))
        }
    }
}
