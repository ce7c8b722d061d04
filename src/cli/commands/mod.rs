//! CLI command implementations
//!
//! Each subcommand has its own module with:
//! - Args struct for command-line arguments
//! - `run()` function to execute the command

use crate::app::AppContext;
use crate::cli::Commands;
use crate::error::Result;

pub mod catalog;
pub mod checklist;
pub mod config;
pub mod session;
pub mod validate;

/// Dispatch a command to its handler
pub fn run(ctx: &AppContext, command: &Commands) -> Result<()> {
    match command {
        Commands::Catalog(args) => catalog::run(ctx, args),
        Commands::Session(args) => session::run(ctx, args),
        Commands::Checklist(args) => checklist::run(ctx, args),
        Commands::Validate(args) => validate::run(ctx, args),
        Commands::Config(args) => config::run(ctx, args),
    }
}
