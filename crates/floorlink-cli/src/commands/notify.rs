//! Task mutation command.

use anyhow::{bail, Context, Result};
use clap::Args;
use colored::Colorize;
use floorlink_core::config::Config;
use floorlink_core::identity;
use floorlink_core::notifier::TaskNotifier;
use floorlink_core::presence::{Identity, Role};
use floorlink_core::protocol::MutationKind;
use serde_json::value::RawValue;

/// Lifetime of the token minted for a single notification.
const SERVICE_TOKEN_TTL_SECS: i64 = 60;

#[derive(Args)]
pub struct NotifyArgs {
    /// Mutation kind (created, updated, deleted)
    #[arg(long, default_value = "updated")]
    pub kind: MutationKind,

    /// Task payload as JSON
    #[arg(long)]
    pub payload: String,

    /// Server base URL (defaults to FLOORLINK_URL or http://127.0.0.1:5000)
    #[arg(long)]
    pub url: Option<String>,

    /// Bearer token; minted from the configured JWT secret when omitted
    #[arg(long, env = "FLOORLINK_TOKEN")]
    pub token: Option<String>,
}

pub async fn execute(args: NotifyArgs, config: &Config) -> Result<()> {
    let payload: Box<RawValue> =
        serde_json::from_str(&args.payload).context("Payload is not valid JSON")?;

    let notifier = match &args.url {
        Some(url) => TaskNotifier::with_url(url),
        None => TaskNotifier::new(),
    };
    let notifier = match (args.token, config.jwt_secret.as_deref()) {
        (Some(token), _) => notifier.with_token(token),
        (None, Some(secret)) => {
            let service = Identity::new("floorlink-cli", "floorlink", Role::Admin);
            notifier.with_token(identity::issue_token(
                secret.as_bytes(),
                &service,
                SERVICE_TOKEN_TTL_SECS,
            )?)
        }
        (None, None) => notifier,
    };

    if !notifier.notify(args.kind, &payload).await {
        bail!("Server at {} did not accept the notification", notifier.base_url());
    }

    println!("{} task {} notification sent", "✓".green(), args.kind);
    Ok(())
}
