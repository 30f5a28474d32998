//! CLI argument definitions using clap derive

use clap::{ArgAction, Parser, ValueEnum};
use std::path::PathBuf;

/// Minimalistic Typst local package installer
///
/// Copies a package directory into the local Typst package cache so it can
/// be imported as `@local/name:version`.
#[derive(Parser, Debug)]
#[command(name = "typi")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Path to the package source, or git+<url> to clone it first
    #[arg(value_name = "PATH", required_unless_present = "list")]
    pub path: Option<String>,

    /// Update the specified package if this version is already installed
    #[arg(short, long)]
    pub update: bool,

    /// Leave out files matching the `exclude` globs in typst.toml
    #[arg(short = 'x', long)]
    pub honor_exclude: bool,

    /// List installed packages (no install is performed)
    #[arg(short, long)]
    pub list: bool,

    /// Output format for --list
    #[arg(short, long, default_value = "table")]
    pub format: OutputFormat,

    /// Package cache root (defaults to the Typst data directory)
    #[arg(long, env = "TYPI_CACHE_ROOT")]
    pub cache_root: Option<PathBuf>,

    /// Configuration file path
    #[arg(short, long, env = "TYPI_CONFIG")]
    pub config: Option<PathBuf>,

    /// Increase verbosity (-v info, -vv debug)
    #[arg(short, long, action = ArgAction::Count)]
    pub verbose: u8,
}

/// Output format for listing
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    /// Human-readable table
    Table,
    /// JSON output
    Json,
    /// Simple text (one per line)
    Plain,
}
