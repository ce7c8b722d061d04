//! CLI module - Command-line interface definitions and handlers
//!
//! Uses clap v4 with derive macros for argument parsing.

use std::path::PathBuf;

use clap::{Parser, Subcommand};

pub use output::OutputFormat;

pub mod commands;
pub mod output;

/// testflow - Walk electrical inspection test flows and prepare site visits
#[derive(Parser, Debug)]
#[command(name = "testflow")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Machine-readable JSON output (same as --output-format=json)
    #[arg(long, global = true)]
    pub robot: bool,

    /// Output format (human, json, plain)
    #[arg(long, short = 'O', global = true, value_enum)]
    pub output_format: Option<OutputFormat>,

    /// Increase verbosity (-v, -vv, -vvv)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Suppress all logging except errors
    #[arg(short, long, global = true)]
    pub quiet: bool,

    /// Config file path (default: ~/.config/testflow/config.toml and <root>/config.toml)
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    /// Data directory holding session state and archives
    #[arg(long, global = true, env = "TESTFLOW_ROOT")]
    pub root: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Commands,
}

/// Available commands
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// List and inspect step catalogs
    Catalog(commands::catalog::CatalogArgs),

    /// Run an inspection test session
    Session(commands::session::SessionArgs),

    /// Generate and tick pre-start checklists
    Checklist(commands::checklist::ChecklistArgs),

    /// Cable capacity and Zs checks
    Validate(commands::validate::ValidateArgs),

    /// Show or edit configuration
    Config(commands::config::ConfigArgs),
}
