//! Task mutation notifier.
//!
//! Lets the CRUD service (or the CLI) tell the realtime server that a task
//! changed, so it can fan the change out to every connected dashboard.

use serde::Serialize;
use serde_json::value::RawValue;
use std::time::Duration;
use tracing::{debug, warn};

use crate::protocol::MutationKind;

/// Default realtime server URL.
const DEFAULT_SERVER_URL: &str = "http://127.0.0.1:5000";

#[derive(Serialize)]
struct NotifyBody<'a> {
    kind: MutationKind,
    payload: &'a RawValue,
}

/// Posts task mutations to `/internal/notify`.
#[derive(Clone)]
pub struct TaskNotifier {
    client: reqwest::Client,
    base_url: String,
    token: Option<String>,
}

impl TaskNotifier {
    /// Create a notifier with default settings.
    ///
    /// Uses the `FLOORLINK_URL` environment variable if set,
    /// otherwise defaults to `http://127.0.0.1:5000`. A `FLOORLINK_TOKEN`
    /// is sent as the bearer token.
    pub fn new() -> Self {
        let base_url =
            std::env::var("FLOORLINK_URL").unwrap_or_else(|_| DEFAULT_SERVER_URL.to_string());
        let notifier = Self::with_url(&base_url);
        match std::env::var("FLOORLINK_TOKEN") {
            Ok(token) => notifier.with_token(token),
            Err(_) => notifier,
        }
    }

    /// Create a notifier with a custom base URL.
    pub fn with_url(base_url: &str) -> Self {
        debug!(base_url = %base_url, "TaskNotifier initialized");
        Self {
            client: reqwest::Client::builder()
                .timeout(Duration::from_secs(2))
                .build()
                .unwrap_or_default(),
            base_url: base_url.trim_end_matches('/').to_string(),
            token: None,
        }
    }

    /// Authenticate with `token`, required when the server has a JWT secret.
    pub fn with_token(mut self, token: impl Into<String>) -> Self {
        self.token = Some(token.into());
        self
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Send one mutation. Returns whether the server accepted it.
    ///
    /// The payload text is posted unchanged. Failures are logged, never
    /// raised: the relay is advisory and dashboards still converge on their
    /// next refresh.
    pub async fn notify(&self, kind: MutationKind, payload: &RawValue) -> bool {
        let url = format!("{}/internal/notify", self.base_url);
        let body = NotifyBody { kind, payload };

        debug!(url = %url, kind = %kind, "Sending task mutation notification");

        let mut request = self.client.post(&url).json(&body);
        if let Some(token) = &self.token {
            request = request.bearer_auth(token);
        }

        match request.send().await {
            Ok(response) if response.status().is_success() => {
                debug!(kind = %kind, "Task mutation notification sent");
                true
            }
            Ok(response) => {
                warn!(
                    kind = %kind,
                    status_code = %response.status(),
                    "Task mutation notification failed with status"
                );
                false
            }
            Err(e) => {
                // Expected when the realtime server is not running.
                debug!(
                    error = %e,
                    url = %url,
                    "Failed to send task mutation notification (server may not be running)"
                );
                false
            }
        }
    }

    pub async fn notify_task_created(&self, task: &RawValue) -> bool {
        self.notify(MutationKind::Created, task).await
    }

    pub async fn notify_task_updated(&self, task: &RawValue) -> bool {
        self.notify(MutationKind::Updated, task).await
    }

    pub async fn notify_task_deleted(&self, task_id: &str) -> bool {
        match serde_json::value::to_raw_value(&serde_json::json!({ "_id": task_id })) {
            Ok(payload) => self.notify(MutationKind::Deleted, &payload).await,
            Err(e) => {
                warn!(error = %e, "Failed to encode deleted task id");
                false
            }
        }
    }
}

impl Default for TaskNotifier {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_trailing_slash_trimmed() {
        let notifier = TaskNotifier::with_url("http://localhost:5000/");
        assert_eq!(notifier.base_url(), "http://localhost:5000");
        assert!(notifier.token.is_none());
    }

    #[test]
    fn test_body_keeps_payload_text() {
        let payload = RawValue::from_string(r#"{"b":1,"a":2}"#.to_string()).unwrap();
        let body = NotifyBody {
            kind: MutationKind::Updated,
            payload: &payload,
        };
        assert_eq!(
            serde_json::to_string(&body).unwrap(),
            r#"{"kind":"updated","payload":{"b":1,"a":2}}"#
        );
    }

    #[tokio::test]
    async fn test_unreachable_server_is_not_an_error() {
        // Port 9 (discard) is closed on test machines.
        let notifier = TaskNotifier::with_url("http://127.0.0.1:9");
        assert!(!notifier.notify_task_deleted("t1").await);
    }
}
