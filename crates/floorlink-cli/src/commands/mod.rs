//! CLI command definitions and handlers.

use anyhow::Result;
use clap::{Parser, Subcommand};
use floorlink_core::config::Config;
use std::path::PathBuf;

pub mod notify;
pub mod serve;
pub mod token;
pub mod watch;

/// Floorlink - live presence and task relay for the warehouse board
#[derive(Parser)]
#[command(name = "floorlink")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Path to a TOML config file
    #[arg(short, long, global = true, env = "FLOORLINK_CONFIG")]
    pub config: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Start the realtime server
    Serve(serve::ServeArgs),

    /// Connect as a user and show who is online
    Watch(watch::WatchArgs),

    /// Tell connected dashboards that a task changed
    Notify(notify::NotifyArgs),

    /// Mint an identity token for testing
    Token(token::TokenArgs),
}

impl Cli {
    pub async fn execute(self) -> Result<()> {
        let config = Config::load(self.config.as_deref())?;

        match self.command {
            Commands::Serve(args) => serve::execute(args, config).await,
            Commands::Watch(args) => watch::execute(args).await,
            Commands::Notify(args) => notify::execute(args, &config).await,
            Commands::Token(args) => token::execute(args, &config),
        }
    }
}
