//! Identity token command.

use anyhow::{Context, Result};
use clap::Args;
use floorlink_core::config::Config;
use floorlink_core::identity;
use floorlink_core::presence::{Identity, Role};

#[derive(Args)]
pub struct TokenArgs {
    #[arg(long)]
    pub user_id: String,

    #[arg(long)]
    pub username: String,

    #[arg(long)]
    pub role: Role,

    /// Lifetime in hours
    #[arg(long, default_value = "24")]
    pub ttl_hours: i64,
}

pub fn execute(args: TokenArgs, config: &Config) -> Result<()> {
    let secret = config
        .jwt_secret
        .as_deref()
        .context("No JWT secret configured (set JWT_SECRET or jwt_secret in the config file)")?;

    let identity = Identity::new(args.user_id, args.username, args.role);
    let token = identity::issue_token(secret.as_bytes(), &identity, ttl_secs(args.ttl_hours)?)?;
    println!("{}", token);
    Ok(())
}

fn ttl_secs(hours: i64) -> Result<i64> {
    hours
        .checked_mul(3600)
        .with_context(|| format!("--ttl-hours {} is out of range", hours))
}
