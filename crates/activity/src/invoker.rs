//! `ActivityInvoker` — the contract every action invocation goes through.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use tracing::warn;

use crate::model::{ActivityConfig, ActivityOutcome};

/// Per-call timeout. Matches the source's fixed 120s action-call budget.
const CALL_TIMEOUT: Duration = Duration::from_secs(120);

/// Attempts made per invocation before giving up. No sleep happens
/// between attempts here — the source looped immediately, and any
/// backoff between separate *activity* invocations is the durable
/// runtime's job (`runtime::RetryPolicy`), not the invoker's.
const MAX_ATTEMPTS: u32 = 3;

#[async_trait]
pub trait ActivityInvoker: Send + Sync {
    async fn invoke(&self, config: &ActivityConfig) -> ActivityOutcome;
}

/// HTTP-backed invoker used in production.
pub struct HttpActivityInvoker {
    client: Client,
}

impl HttpActivityInvoker {
    pub fn new() -> Self {
        let client = Client::builder()
            .timeout(CALL_TIMEOUT)
            .build()
            .expect("reqwest client builder with static config never fails");
        Self { client }
    }
}

impl Default for HttpActivityInvoker {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl ActivityInvoker for HttpActivityInvoker {
    async fn invoke(&self, config: &ActivityConfig) -> ActivityOutcome {
        let body = serde_json::json!({
            "event_data": config.event_data,
            "configurations": config.configurations,
            "data": config.data,
        });

        let mut last_error = String::from("no attempt made");

        for attempt in 1..=MAX_ATTEMPTS {
            let mut request = self
                .client
                .request(method(&config.http_method), &config.endpoint)
                .header("Content-Type", "application/json")
                .json(&body);

            if let (Some(user), Some(password)) = (&config.auth_user, &config.auth_password) {
                request = request.basic_auth(user, Some(password));
            }

            match request.send().await {
                Ok(response) => {
                    let status = response.status();
                    if status.is_success() {
                        return match response.json::<serde_json::Value>().await {
                            Ok(data) => ActivityOutcome::Success { data },
                            Err(err) => ActivityOutcome::Failed {
                                error: format!("invalid response body: {err}"),
                            },
                        };
                    }

                    last_error = format!("http status {status}");
                    if !status.is_server_error() {
                        // 4xx: not retryable.
                        return ActivityOutcome::Failed { error: last_error };
                    }
                    warn!(attempt, %status, "activity call returned a server error, retrying");
                }
                Err(err) => {
                    last_error = format!("transport error: {err}");
                    warn!(attempt, error = %err, "activity call failed to reach upstream, retrying");
                }
            }
        }

        ActivityOutcome::Failed { error: last_error }
    }
}

fn method(name: &str) -> reqwest::Method {
    name.parse().unwrap_or(reqwest::Method::POST)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn config(endpoint: &str) -> ActivityConfig {
        ActivityConfig {
            endpoint: endpoint.to_string(),
            http_method: "POST".to_string(),
            auth_user: None,
            auth_password: None,
            event_data: json!({}),
            configurations: json!({}),
            data: json!({}),
        }
    }

    #[tokio::test]
    async fn unreachable_endpoint_becomes_failed_outcome_not_a_panic() {
        let invoker = HttpActivityInvoker::new();
        let outcome = invoker
            .invoke(&config("http://127.0.0.1:1/unreachable"))
            .await;
        assert!(!outcome.is_success());
    }

    #[test]
    fn method_parses_known_verbs_and_falls_back_to_post() {
        assert_eq!(method("GET"), reqwest::Method::GET);
        assert_eq!(method("nonsense"), reqwest::Method::POST);
    }

    /// Minimal HTTP/1.1 responder: accepts one connection, drains the
    /// request, writes back `body` with `Connection: close` so the client
    /// can't reuse the socket for the next attempt, then closes.
    async fn serve_one(listener: &tokio::net::TcpListener, status_line: &str, body: &str) {
        use tokio::io::{AsyncReadExt, AsyncWriteExt};

        let (mut socket, _) = listener.accept().await.expect("accept");
        let mut buf = [0u8; 1024];
        // Just enough to drain the client's request off the wire; the
        // invoker doesn't wait for this read, so errors here are ignored.
        let _ = socket.read(&mut buf).await;

        let response = format!(
            "{status_line}\r\nContent-Type: application/json\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{body}",
            body.len(),
        );
        let _ = socket.write_all(response.as_bytes()).await;
        let _ = socket.shutdown().await;
    }

    #[tokio::test]
    async fn retries_past_two_server_errors_then_succeeds_on_the_third_call() {
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();

        let server = tokio::spawn(async move {
            serve_one(&listener, "HTTP/1.1 500 Internal Server Error", "{}").await;
            serve_one(&listener, "HTTP/1.1 500 Internal Server Error", "{}").await;
            serve_one(&listener, "HTTP/1.1 200 OK", r#"{"ok":true}"#).await;
        });

        let invoker = HttpActivityInvoker::new();
        let outcome = invoker.invoke(&config(&format!("http://{addr}/action"))).await;

        server.await.expect("mock server task panicked");
        assert!(outcome.is_success());
    }
}
