//! Anthropic adapter: chat-style archetype with a native `system` field.
//! Grounded in `AnthropicProvider.py`.

use std::future::Future;

use optimodel_core::credentials::Credentials;
use optimodel_core::error::{GatewayError, GatewayResult};
use optimodel_core::model::{LogicalModel, ProviderId};
use optimodel_core::types::{ContentPart, MessageContent, QueryResponse};
use serde_json::{json, Value};

use crate::common::{self, REQUEST_TIMEOUT};
use crate::{ProviderAdapter, QueryParams};

const PROVIDER_LABEL: &str = "anthropic";
const DEFAULT_MAX_TOKENS: u32 = 1024;

const DEFAULT_BASE_URL: &str = "https://api.anthropic.com";

pub struct AnthropicAdapter {
    client: reqwest::Client,
    api_key: Option<String>,
    base_url: String,
}

impl AnthropicAdapter {
    pub fn from_env() -> Self {
        AnthropicAdapter {
            client: reqwest::Client::new(),
            api_key: std::env::var("ANTHROPIC_API_KEY").ok(),
            base_url: DEFAULT_BASE_URL.to_string(),
        }
    }

    #[cfg(test)]
    fn with_base_url(base_url: impl Into<String>, api_key: impl Into<String>) -> Self {
        AnthropicAdapter {
            client: reqwest::Client::new(),
            api_key: Some(api_key.into()),
            base_url: base_url.into(),
        }
    }

    fn model_id(model: LogicalModel) -> GatewayResult<&'static str> {
        use LogicalModel::*;
        Ok(match model {
            Claude3_5Sonnet20240620 | Claude3_5Sonnet => "claude-3-5-sonnet-20240620",
            Claude3_5Sonnet20241022 => "claude-3-5-sonnet-20241022",
            Claude3Haiku => "claude-3-haiku-20240307",
            other => {
                return Err(GatewayError::UnsupportedModel {
                    provider: PROVIDER_LABEL.to_string(),
                    model: other.to_string(),
                })
            }
        })
    }
}

fn part_to_json(part: &ContentPart) -> Value {
    match part {
        ContentPart::Text { text } => json!({"type": "text", "text": text}),
        ContentPart::Image { source } => json!({
            "type": "image",
            "source": {
                "data": source.data,
                "media_type": source.media_type,
                "type": source.encoding,
            },
        }),
        ContentPart::VideoGemini { .. } => json!({"type": "text", "text": ""}),
    }
}

impl ProviderAdapter for AnthropicAdapter {
    fn provider_id(&self) -> ProviderId {
        ProviderId::Anthropic
    }

    fn supports_images(&self) -> bool {
        true
    }

    fn validate<'a>(&'a self) -> Box<dyn Future<Output = bool> + Send + 'a> {
        Box::new(async move { self.api_key.is_some() })
    }

    fn make_query<'a>(
        &'a self,
        params: QueryParams<'a>,
    ) -> Box<dyn Future<Output = GatewayResult<QueryResponse>> + Send + 'a> {
        Box::new(async move {
            let api_key = match common::require_credentials_if_saas(
                &params,
                ProviderId::Anthropic,
                PROVIDER_LABEL,
            )? {
                Some(Credentials::Anthropic { anthropic_api_key }) => anthropic_api_key.clone(),
                Some(_) => unreachable!("filtered by provider"),
                None => {
                    self.api_key
                        .clone()
                        .ok_or(GatewayError::MissingCredentials {
                            provider: PROVIDER_LABEL.to_string(),
                        })?
                }
            };

            let model_id = Self::model_id(params.entry.name)?;

            let mut system_message: Option<Value> = None;
            let mut messages = Vec::new();
            for m in params.messages {
                if common::is_system(m) {
                    system_message = Some(match &m.content {
                        MessageContent::Text(t) => json!(t),
                        MessageContent::Parts(parts) => json!(parts
                            .iter()
                            .find_map(|p| match p {
                                ContentPart::Text { text } => Some(text.clone()),
                                _ => None,
                            })
                            .unwrap_or_default()),
                    });
                    continue;
                }
                let content = match &m.content {
                    MessageContent::Text(text) => json!(text),
                    MessageContent::Parts(parts) => {
                        json!(parts.iter().map(part_to_json).collect::<Vec<_>>())
                    }
                };
                messages.push(json!({"role": m.role, "content": content}));
            }

            let mut body = json!({
                "model": model_id,
                "messages": messages,
                "max_tokens": params.max_gen_len.unwrap_or(DEFAULT_MAX_TOKENS),
            });
            if let Some(system) = system_message {
                body["system"] = system;
            }
            if let Some(temperature) = params.temperature {
                body["temperature"] = json!(temperature);
            }

            let response = tokio::time::timeout(
                REQUEST_TIMEOUT,
                self.client
                    .post(format!("{}/v1/messages", self.base_url))
                    .header("x-api-key", &api_key)
                    .header("anthropic-version", "2023-06-01")
                    .json(&body)
                    .send(),
            )
            .await
            .map_err(|_| GatewayError::ProviderFailure {
                provider: PROVIDER_LABEL.to_string(),
                reason: "request timed out".to_string(),
            })??;

            let payload: Value = response.json().await?;
            let prompt_tokens = payload["usage"]["input_tokens"].as_u64().ok_or_else(|| {
                GatewayError::ProviderFailure {
                    provider: PROVIDER_LABEL.to_string(),
                    reason: "response missing usage.input_tokens".to_string(),
                }
            })? as u32;
            let generation_tokens =
                payload["usage"]["output_tokens"]
                    .as_u64()
                    .ok_or_else(|| GatewayError::ProviderFailure {
                        provider: PROVIDER_LABEL.to_string(),
                        reason: "response missing usage.output_tokens".to_string(),
                    })? as u32;
            let model_output = payload["content"][0]["text"]
                .as_str()
                .ok_or_else(|| GatewayError::ProviderFailure {
                    provider: PROVIDER_LABEL.to_string(),
                    reason: "response missing content[0].text".to_string(),
                })?
                .to_string();

            Ok(QueryResponse {
                model_response: model_output,
                prompt_tokens,
                generation_tokens,
                cost: None,
                provider: ProviderId::Anthropic,
                guard_errors: Vec::new(),
            })
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use optimodel_core::catalog::ProviderEntry;
    use optimodel_core::types::Message;
    use wiremock::matchers::{method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn entry() -> ProviderEntry {
        ProviderEntry {
            provider: ProviderId::Anthropic,
            name: LogicalModel::Claude3_5Sonnet20241022,
            max_gen_len: 4096,
            speed: 10,
            price_per_1m_input: 1.0,
            price_per_1m_output: 1.0,
            price_per_1m_input_above_128k: None,
            price_per_1m_output_above_128k: None,
        }
    }

    fn messages() -> Vec<optimodel_core::types::Message> {
        vec![Message {
            role: "user".to_string(),
            content: MessageContent::Text("hi".to_string()),
        }]
    }

    #[tokio::test]
    async fn make_query_parses_a_successful_response() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/v1/messages"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "content": [{"text": "hello there"}],
                "usage": {"input_tokens": 4, "output_tokens": 6},
            })))
            .mount(&server)
            .await;

        let adapter = AnthropicAdapter::with_base_url(server.uri(), "test-key");
        let entry = entry();
        let params = QueryParams {
            messages: &messages(),
            entry: &entry,
            temperature: None,
            max_gen_len: None,
            json_mode: false,
            credentials: None,
        };
        let response = adapter.make_query(params).await.unwrap();
        assert_eq!(response.model_response, "hello there");
        assert_eq!(response.prompt_tokens, 4);
        assert_eq!(response.generation_tokens, 6);
    }

    #[tokio::test]
    async fn make_query_surfaces_malformed_responses_as_provider_failure() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/v1/messages"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({"content": []})))
            .mount(&server)
            .await;

        let adapter = AnthropicAdapter::with_base_url(server.uri(), "test-key");
        let entry = entry();
        let params = QueryParams {
            messages: &messages(),
            entry: &entry,
            temperature: None,
            max_gen_len: None,
            json_mode: false,
            credentials: None,
        };
        let err = adapter.make_query(params).await.unwrap_err();
        assert!(matches!(err, GatewayError::ProviderFailure { .. }));
    }
}
