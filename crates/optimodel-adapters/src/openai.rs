//! OpenAI adapter: chat-style archetype with JSON mode and image content
//! parts. Grounded in `OpenAIProvider.py`.

use std::future::Future;

use optimodel_core::error::{GatewayError, GatewayResult};
use optimodel_core::model::{LogicalModel, ProviderId};
use optimodel_core::types::{MessageContent, QueryResponse};
use serde_json::{json, Value};

use crate::common::{self, REQUEST_TIMEOUT};
use crate::{ProviderAdapter, QueryParams};

const PROVIDER_LABEL: &str = "openai";

const DEFAULT_BASE_URL: &str = "https://api.openai.com";

pub struct OpenAiAdapter {
    client: reqwest::Client,
    api_key: Option<String>,
    base_url: String,
}

impl OpenAiAdapter {
    pub fn from_env() -> Self {
        OpenAiAdapter {
            client: reqwest::Client::new(),
            api_key: std::env::var("OPEN_AI_KEY").ok(),
            base_url: DEFAULT_BASE_URL.to_string(),
        }
    }

    /// Points the adapter at a wiremock server instead of the real API.
    #[cfg(test)]
    fn with_base_url(base_url: impl Into<String>, api_key: impl Into<String>) -> Self {
        OpenAiAdapter {
            client: reqwest::Client::new(),
            api_key: Some(api_key.into()),
            base_url: base_url.into(),
        }
    }

    fn model_id(model: LogicalModel) -> GatewayResult<&'static str> {
        use LogicalModel::*;
        Ok(match model {
            Gpt4 => "gpt-4",
            Gpt35Turbo => "gpt-3.5-turbo",
            Gpt4o => "gpt-4o",
            Gpt4Turbo => "gpt-4-turbo",
            Gpt35Turbo0125 => "gpt-3.5-turbo-0125",
            Gpt4oMini => "gpt-4o-mini",
            Gpt4oMini20240718 => "gpt-4o-mini-2024-07-18",
            Gpt4o20240806 => "gpt-4o-2024-08-06",
            Gpt4o20240513 => "gpt-4o-2024-05-13",
            O1Preview => "o1-preview",
            O1Preview20240912 => "o1-preview-2024-09-12",
            O1Mini => "o1-mini",
            O1Mini20240912 => "o1-mini-2024-09-12",
            other => {
                return Err(GatewayError::UnsupportedModel {
                    provider: PROVIDER_LABEL.to_string(),
                    model: other.to_string(),
                })
            }
        })
    }
}

impl ProviderAdapter for OpenAiAdapter {
    fn provider_id(&self) -> ProviderId {
        ProviderId::OpenAi
    }

    fn supports_json_mode(&self) -> bool {
        true
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
                ProviderId::OpenAi,
                PROVIDER_LABEL,
            )? {
                Some(creds) => match creds {
                    optimodel_core::credentials::Credentials::OpenAi { openai_key } => {
                        openai_key.clone()
                    }
                    _ => unreachable!("require_credentials_if_saas filtered by provider"),
                },
                None => self.api_key.clone().ok_or(GatewayError::MissingCredentials {
                    provider: PROVIDER_LABEL.to_string(),
                })?,
            };

            let model_id = Self::model_id(params.entry.name)?;

            let messages: Vec<Value> = params
                .messages
                .iter()
                .map(|m| match &m.content {
                    MessageContent::Text(text) => json!({"role": m.role, "content": text}),
                    MessageContent::Parts(parts) => {
                        let content: Vec<Value> = parts
                            .iter()
                            .map(|p| match p {
                                optimodel_core::types::ContentPart::Text { text } => {
                                    json!({"type": "text", "text": text})
                                }
                                optimodel_core::types::ContentPart::Image { source } => json!({
                                    "type": "image_url",
                                    "image_url": {
                                        "url": format!(
                                            "data:{};{},{}",
                                            source.media_type, source.encoding, source.data
                                        ),
                                    },
                                }),
                                optimodel_core::types::ContentPart::VideoGemini { .. } => {
                                    json!({"type": "text", "text": ""})
                                }
                            })
                            .collect();
                        json!({"role": m.role, "content": content})
                    }
                })
                .collect();

            let is_o1 = model_id.starts_with("o1");
            let mut body = json!({
                "model": model_id,
                "messages": messages,
            });
            if let Some(temperature) = params.temperature {
                if !is_o1 {
                    body["temperature"] = json!(temperature);
                }
            }
            if let Some(max_gen_len) = params.max_gen_len {
                if is_o1 {
                    body["max_completion_tokens"] = json!(max_gen_len);
                } else {
                    body["max_tokens"] = json!(max_gen_len);
                }
            }
            if params.json_mode {
                body["response_format"] = json!({"type": "json_object"});
            }

            let response = tokio::time::timeout(
                REQUEST_TIMEOUT,
                self.client
                    .post(format!("{}/v1/chat/completions", self.base_url))
                    .bearer_auth(&api_key)
                    .json(&body)
                    .send(),
            )
            .await
            .map_err(|_| GatewayError::ProviderFailure {
                provider: PROVIDER_LABEL.to_string(),
                reason: "request timed out".to_string(),
            })??;

            let payload: Value = response.json().await?;
            let prompt_tokens = payload["usage"]["prompt_tokens"]
                .as_u64()
                .ok_or_else(|| GatewayError::ProviderFailure {
                    provider: PROVIDER_LABEL.to_string(),
                    reason: "response missing usage.prompt_tokens".to_string(),
                })? as u32;
            let generation_tokens = payload["usage"]["completion_tokens"]
                .as_u64()
                .ok_or_else(|| GatewayError::ProviderFailure {
                    provider: PROVIDER_LABEL.to_string(),
                    reason: "response missing usage.completion_tokens".to_string(),
                })? as u32;
            let model_output = payload["choices"][0]["message"]["content"]
                .as_str()
                .ok_or_else(|| GatewayError::ProviderFailure {
                    provider: PROVIDER_LABEL.to_string(),
                    reason: "response missing choices[0].message.content".to_string(),
                })?
                .to_string();

            Ok(QueryResponse {
                model_response: model_output,
                prompt_tokens,
                generation_tokens,
                cost: None,
                provider: ProviderId::OpenAi,
                guard_errors: Vec::new(),
            })
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use optimodel_core::catalog::ProviderEntry;
    use optimodel_core::types::{Message, MessageContent};
    use wiremock::matchers::{method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn entry() -> ProviderEntry {
        ProviderEntry {
            provider: ProviderId::OpenAi,
            name: LogicalModel::Gpt4o,
            max_gen_len: 4096,
            speed: 10,
            price_per_1m_input: 1.0,
            price_per_1m_output: 1.0,
            price_per_1m_input_above_128k: None,
            price_per_1m_output_above_128k: None,
        }
    }

    fn messages() -> Vec<Message> {
        vec![Message {
            role: "user".to_string(),
            content: MessageContent::Text("hi".to_string()),
        }]
    }

    #[tokio::test]
    async fn make_query_parses_a_successful_response() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/v1/chat/completions"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "choices": [{"message": {"content": "hello there"}}],
                "usage": {"prompt_tokens": 3, "completion_tokens": 2},
            })))
            .mount(&server)
            .await;

        let adapter = OpenAiAdapter::with_base_url(server.uri(), "test-key");
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
        assert_eq!(response.prompt_tokens, 3);
        assert_eq!(response.generation_tokens, 2);
    }

    #[tokio::test]
    async fn make_query_surfaces_malformed_responses_as_provider_failure() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/v1/chat/completions"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({"choices": []})))
            .mount(&server)
            .await;

        let adapter = OpenAiAdapter::with_base_url(server.uri(), "test-key");
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
