//! Terminal presence consumer.

use anyhow::{Context, Result};
use clap::Args;
use colored::Colorize;
use floorlink_core::presence::{Identity, Role};
use floorlink_core::protocol::{ClientEvent, ServerEvent};
use floorlink_core::roster::RosterView;
use futures::{SinkExt, StreamExt};
use tokio_tungstenite::tungstenite::Message;
use tracing::{debug, warn};
use url::Url;

use crate::output;

#[derive(Args)]
pub struct WatchArgs {
    /// WebSocket endpoint
    #[arg(long, env = "FLOORLINK_WS_URL", default_value = "ws://127.0.0.1:5000/ws")]
    pub url: String,

    /// User id to announce
    #[arg(long)]
    pub user_id: String,

    /// Display name to announce
    #[arg(long)]
    pub username: String,

    /// Role to announce (admin, office, warehouse, monitor)
    #[arg(long, default_value = "monitor")]
    pub role: Role,

    /// Identity token, required when the server has a JWT secret
    #[arg(long, env = "FLOORLINK_TOKEN")]
    pub token: Option<String>,
}

pub async fn execute(args: WatchArgs) -> Result<()> {
    let url = ws_url(&args.url, args.token.as_deref())?;

    let (stream, _) = tokio_tungstenite::connect_async(url.as_str())
        .await
        .with_context(|| format!("Failed to connect to {}", args.url))?;
    let (mut sink, mut stream) = stream.split();

    let identity = Identity::new(args.user_id, args.username, args.role);
    let announce = ClientEvent::Announce(identity).encode()?;
    sink.send(Message::Text(announce.into())).await?;

    println!("{} {}", "Connected to".dimmed(), args.url);
    println!("{}", "Waiting for roster... (Ctrl+C to stop)".dimmed());

    let mut view = RosterView::new();
    loop {
        tokio::select! {
            msg = stream.next() => match msg {
                Some(Ok(Message::Text(text))) => match ServerEvent::decode(text.as_str()) {
                    Ok(event) => {
                        if view.apply(&event) {
                            output::print_roster(&view);
                        } else if let ServerEvent::TaskMutated(mutation) = &event {
                            output::print_mutation(mutation);
                        }
                    }
                    Err(e) => warn!(error = %e, "Ignoring server frame"),
                },
                Some(Ok(Message::Close(frame))) => {
                    match frame {
                        Some(frame) => println!("{} {} {}", "Closed by server:".red(), u16::from(frame.code), frame.reason.as_str()),
                        None => println!("{}", "Closed by server".red()),
                    }
                    break;
                }
                Some(Ok(_)) => {}
                Some(Err(e)) => {
                    warn!(error = %e, "WebSocket receive error");
                    break;
                }
                None => {
                    debug!("WebSocket stream ended");
                    break;
                }
            },
            _ = tokio::signal::ctrl_c() => {
                let _ = sink.send(Message::Close(None)).await;
                println!();
                println!("{}", "Disconnected".dimmed());
                break;
            }
        }
    }

    Ok(())
}

/// Endpoint with the token appended to whatever query `base` already has.
fn ws_url(base: &str, token: Option<&str>) -> Result<Url> {
    let mut url = Url::parse(base).with_context(|| format!("Invalid WebSocket URL: {}", base))?;
    if let Some(token) = token {
        url.query_pairs_mut().append_pair("token", token);
    }
    Ok(url)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ws_url_without_token() {
        let url = ws_url("ws://127.0.0.1:5000/ws", None).unwrap();
        assert_eq!(url.as_str(), "ws://127.0.0.1:5000/ws");
    }

    #[test]
    fn test_ws_url_appends_token() {
        let url = ws_url("ws://127.0.0.1:5000/ws", Some("abc.def")).unwrap();
        assert_eq!(url.as_str(), "ws://127.0.0.1:5000/ws?token=abc.def");

        let url = ws_url("wss://board.example.com/ws?site=north", Some("abc.def")).unwrap();
        assert_eq!(url.as_str(), "wss://board.example.com/ws?site=north&token=abc.def");
    }

    #[test]
    fn test_ws_url_rejects_garbage() {
        assert!(ws_url("not a url", None).is_err());
    }
}
