//! Mode routing
//!
//! `serve` (the default) runs the HTTP server; the other subcommands are
//! one-shot CLI operations.

pub mod cli;
pub mod server;

pub use cli::{run_config_command, run_user_command};
pub use server::run_server;

use anyhow::Result;

use crate::cli::Commands;

/// Dispatch a parsed command; no subcommand means `serve`
pub async fn run(command: Option<Commands>) -> Result<()> {
    match command.unwrap_or(Commands::Serve) {
        Commands::Serve => run_server().await,
        Commands::Config { action } => run_config_command(action).await,
        Commands::User { action } => run_user_command(action).await,
    }
}
