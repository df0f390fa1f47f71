//! Posts a single guard check to the sidecar and interprets its verdict.
//! Grounded in `guardClient.py`'s `GuardClient.checkGuard`.

use std::time::Duration;

use optimodel_core::error::GatewayError;
use optimodel_core::guard::GuardConfig;
use optimodel_core::types::Message;
use serde::Deserialize;
use serde_json::json;

/// Same ceiling the adapters wrap outbound provider calls in; the sidecar
/// is a local service but a hung classifier should not stall a query
/// forever.
const GUARD_REQUEST_TIMEOUT: Duration = Duration::from_secs(300);

/// The sidecar's response body: `{"failure": bool, "metadata": {...}}`.
#[derive(Debug, Deserialize)]
struct GuardResponseBody {
    failure: bool,
    #[serde(default)]
    metadata: serde_json::Value,
}

/// The outcome of checking one guard, translated out of the sidecar's raw
/// wire shape into something the pipeline can act on directly.
#[derive(Debug, Clone)]
pub struct GuardCheckOutcome {
    pub failure: bool,
    pub metadata: serde_json::Value,
}

pub struct GuardClient {
    client: reqwest::Client,
    guard_endpoint: String,
}

impl GuardClient {
    /// `guard_base_url` is the sidecar's origin, e.g. `http://localhost:8001`;
    /// the path `/optimodel-guard/api/v1/guard` is fixed, matching the
    /// sidecar's own route table in `optimodel_guard/index.py`.
    pub fn new(guard_base_url: &str) -> Self {
        let trimmed = guard_base_url.trim_end_matches('/');
        GuardClient {
            client: reqwest::Client::new(),
            guard_endpoint: format!("{trimmed}/optimodel-guard/api/v1/guard"),
        }
    }

    /// Checks one guard against a conversation. When `model_output` is
    /// `Some`, it is appended as a trailing assistant-role message before
    /// the guard sees the conversation — the same way `checkGuard` folds a
    /// provider's output back in for post-query guards.
    ///
    /// A transport failure (connection refused, timeout, non-2xx, bad body)
    /// always surfaces as `GuardTransportError`; whether that blocks the
    /// request is the pipeline's decision based on `guard.block_request()`,
    /// not this client's.
    pub async fn check_guard(
        &self,
        guard: &GuardConfig,
        messages: &[Message],
        model_output: Option<&str>,
    ) -> Result<GuardCheckOutcome, GatewayError> {
        let mut messages = crate::reduce::strip_non_text(messages);
        if let Some(output) = model_output {
            messages.push(Message {
                role: "assistant".to_string(),
                content: optimodel_core::types::MessageContent::Text(output.to_string()),
            });
        }

        let body = json!({
            "guard": guard,
            "messages": messages,
        });

        let send = || {
            self.client
                .post(&self.guard_endpoint)
                .json(&body)
                .send()
        };

        let response = tokio::time::timeout(GUARD_REQUEST_TIMEOUT, send())
            .await
            .map_err(|_| GatewayError::GuardTransportError {
                guard_name: guard.guard_name().to_string(),
                reason: "request timed out".to_string(),
            })?
            .map_err(|e| GatewayError::GuardTransportError {
                guard_name: guard.guard_name().to_string(),
                reason: e.to_string(),
            })?;

        if !response.status().is_success() {
            return Err(GatewayError::GuardTransportError {
                guard_name: guard.guard_name().to_string(),
                reason: format!("sidecar returned status {}", response.status()),
            });
        }

        let parsed: GuardResponseBody =
            response
                .json()
                .await
                .map_err(|e| GatewayError::GuardTransportError {
                    guard_name: guard.guard_name().to_string(),
                    reason: format!("malformed guard response: {e}"),
                })?;

        Ok(GuardCheckOutcome {
            failure: parsed.failure,
            metadata: parsed.metadata,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use optimodel_core::guard::GuardPhase;
    use wiremock::matchers::{method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn sample_guard() -> GuardConfig {
        GuardConfig::Regex {
            guard_type: GuardPhase::PreQuery,
            block_request: true,
            block_request_message: Some("blocked".to_string()),
            pattern: "\\d{3}-\\d{2}-\\d{4}".to_string(),
        }
    }

    fn sample_messages() -> Vec<Message> {
        vec![Message {
            role: "user".to_string(),
            content: optimodel_core::types::MessageContent::Text("hi".to_string()),
        }]
    }

    #[tokio::test]
    async fn passes_through_a_passing_verdict() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/optimodel-guard/api/v1/guard"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({"failure": false, "metadata": {}})))
            .mount(&server)
            .await;

        let client = GuardClient::new(&server.uri());
        let outcome = client
            .check_guard(&sample_guard(), &sample_messages(), None)
            .await
            .unwrap();
        assert!(!outcome.failure);
    }

    #[tokio::test]
    async fn image_content_never_reaches_the_sidecar() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/optimodel-guard/api/v1/guard"))
            .respond_with(|req: &wiremock::Request| {
                let body: serde_json::Value = req.body_json().unwrap();
                let raw = body.to_string();
                assert!(
                    !raw.contains("super-secret-pixels"),
                    "guard payload carried image bytes: {raw}"
                );
                ResponseTemplate::new(200).set_body_json(json!({"failure": false, "metadata": {}}))
            })
            .mount(&server)
            .await;

        let messages = vec![Message {
            role: "user".to_string(),
            content: optimodel_core::types::MessageContent::Parts(vec![
                optimodel_core::types::ContentPart::Text {
                    text: "what is this".to_string(),
                },
                optimodel_core::types::ContentPart::Image {
                    source: optimodel_core::types::ImageSource {
                        media_type: "image/png".to_string(),
                        encoding: "base64".to_string(),
                        data: "super-secret-pixels".to_string(),
                    },
                },
            ]),
        }];

        let client = GuardClient::new(&server.uri());
        let outcome = client
            .check_guard(&sample_guard(), &messages, None)
            .await
            .unwrap();
        assert!(!outcome.failure);
    }

    #[tokio::test]
    async fn non_2xx_status_is_a_transport_error() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/optimodel-guard/api/v1/guard"))
            .respond_with(ResponseTemplate::new(500))
            .mount(&server)
            .await;

        let client = GuardClient::new(&server.uri());
        let result = client
            .check_guard(&sample_guard(), &sample_messages(), None)
            .await;
        assert!(matches!(result, Err(GatewayError::GuardTransportError { .. })));
    }
}
