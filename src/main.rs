//! typi - Typst local package installer
//!
//! CLI entry point that dispatches to the install or list command.

use clap::Parser;
use console::style;
use std::process::ExitCode;
use tracing::debug;
use tracing_subscriber::EnvFilter;
use typi::cli::Cli;
use typi::config::{ConfigManager, LogFormat};
use typi::error::TypiResult;

fn main() -> ExitCode {
    match run() {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("{} {}", style("Error:").red().bold(), e);
            if let Some(hint) = e.hint() {
                eprintln!("{} {}", style("Hint:").yellow(), hint);
            }
            ExitCode::FAILURE
        }
    }
}

fn run() -> TypiResult<()> {
    let cli = Cli::parse();

    let config_manager = match cli.config {
        Some(ref path) => ConfigManager::with_path(path.clone()),
        None => ConfigManager::new(),
    };
    let config = config_manager.load()?;

    // Initialize logging: 0 = warn, 1 = info, 2+ = debug
    let filter = match cli.verbose {
        0 => EnvFilter::new("typi=warn"),
        1 => EnvFilter::new("typi=info"),
        _ => EnvFilter::new("typi=debug"),
    };

    let subscriber = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .without_time();
    match config.general.log_format {
        LogFormat::Text => subscriber.init(),
        LogFormat::Json => subscriber.json().init(),
    }

    debug!("Using config {}", config_manager.path().display());
    let cache_root = ConfigManager::resolve_cache_root(cli.cache_root.as_deref(), &config)?;
    debug!("Package cache at {}", cache_root.display());

    match cli.path {
        Some(ref path) if !cli.list => {
            typi::cli::commands::install(path, cli.update, cli.honor_exclude, &cache_root)
        }
        _ => typi::cli::commands::list(&cache_root, cli.format),
    }
}
