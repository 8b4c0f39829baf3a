//! Realtime server command.

use anyhow::Result;
use clap::Args;
use colored::Colorize;
use floorlink_core::config::Config;
use std::path::PathBuf;

#[derive(Args)]
pub struct ServeArgs {
    /// Port to listen on (overrides config)
    #[arg(long)]
    pub port: Option<u16>,

    /// Host to bind to (overrides config)
    #[arg(long)]
    pub host: Option<String>,

    /// Also write logs to a file
    #[arg(long)]
    pub log: bool,

    /// Log file path (with --log)
    #[arg(long)]
    pub log_file: Option<PathBuf>,
}

pub async fn execute(args: ServeArgs, mut config: Config) -> Result<()> {
    if let Some(port) = args.port {
        config.port = port;
    }
    if let Some(host) = args.host {
        config.host = host;
    }

    let auth = if config.jwt_secret.is_some() {
        "token required".green()
    } else {
        "trusting announce".yellow()
    };

    println!();
    println!("  {} {}", "Floorlink".cyan().bold(), "Realtime Server".bold());
    println!();
    println!("  {}  ws://{}/ws ({})", "WebSocket".green(), config.bind_addr(), auth);
    println!("  {}   http://{}/api/presence", "Presence".green(), config.bind_addr());
    println!("  {}     http://{}/internal/notify", "Notify".green(), config.bind_addr());
    println!();
    println!("  {}", "Ctrl+C to stop".dimmed());
    println!();

    floorlink_web::run_server(&config).await?;

    Ok(())
}
