//! Together AI adapter: text-only chat-style archetype, no JSON mode, no
//! images. Grounded in `TogetherProvider.py`.

use std::future::Future;

use optimodel_core::credentials::Credentials;
use optimodel_core::error::{GatewayError, GatewayResult};
use optimodel_core::model::{LogicalModel, ProviderId};
use optimodel_core::types::QueryResponse;
use serde_json::{json, Value};

use crate::common::{self, REQUEST_TIMEOUT};
use crate::{ProviderAdapter, QueryParams};

const PROVIDER_LABEL: &str = "togetherai";

const DEFAULT_BASE_URL: &str = "https://api.together.xyz";

pub struct TogetherAdapter {
    client: reqwest::Client,
    api_key: Option<String>,
    base_url: String,
}

impl TogetherAdapter {
    pub fn from_env() -> Self {
        TogetherAdapter {
            client: reqwest::Client::new(),
            api_key: std::env::var("TOGETHER_API_KEY").ok(),
            base_url: DEFAULT_BASE_URL.to_string(),
        }
    }

    #[cfg(test)]
    fn with_base_url(base_url: impl Into<String>, api_key: impl Into<String>) -> Self {
        TogetherAdapter {
            client: reqwest::Client::new(),
            api_key: Some(api_key.into()),
            base_url: base_url.into(),
        }
    }

    fn model_id(model: LogicalModel) -> GatewayResult<&'static str> {
        use LogicalModel::*;
        Ok(match model {
            Llama3_8bInstruct => "meta-llama/Llama-3-8b-chat-hf",
            Llama3_70bInstruct => "meta-llama/Llama-3-70b-chat-hf",
            other => {
                return Err(GatewayError::UnsupportedModel {
                    provider: PROVIDER_LABEL.to_string(),
                    model: other.to_string(),
                })
            }
        })
    }
}

impl ProviderAdapter for TogetherAdapter {
    fn provider_id(&self) -> ProviderId {
        ProviderId::TogetherAi
    }

    fn validate<'a>(&'a self) -> Box<dyn Future<Output = bool> + Send + 'a> {
        Box::new(async move { self.api_key.is_some() })
    }

    fn make_query<'a>(
        &'a self,
        params: QueryParams<'a>,
    ) -> Box<dyn Future<Output = GatewayResult<QueryResponse>> + Send + 'a> {
        Box::new(async move {
            common::reject_json_mode(params.json_mode, PROVIDER_LABEL)?;
            common::reject_images(params.messages, PROVIDER_LABEL)?;

            let api_key = match common::require_credentials_if_saas(
                &params,
                ProviderId::TogetherAi,
                PROVIDER_LABEL,
            )? {
                Some(Credentials::TogetherAi { together_api_key }) => together_api_key.clone(),
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
            let messages: Vec<Value> = common::text_only_messages(params.messages, PROVIDER_LABEL)?
                .into_iter()
                .map(|(role, content)| json!({"role": role, "content": content}))
                .collect();

            let mut body = json!({
                "model": model_id,
                "messages": messages,
                "temperature": params.temperature,
            });
            if let Some(max_gen_len) = params.max_gen_len {
                body["max_tokens"] = json!(max_gen_len);
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
            let prompt_tokens = payload["usage"]["prompt_tokens"].as_u64().ok_or_else(|| {
                GatewayError::ProviderFailure {
                    provider: PROVIDER_LABEL.to_string(),
                    reason: "response missing usage.prompt_tokens".to_string(),
                }
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
                provider: ProviderId::TogetherAi,
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
            provider: ProviderId::TogetherAi,
            name: LogicalModel::Llama3_70bInstruct,
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

        let adapter = TogetherAdapter::with_base_url(server.uri(), "test-key");
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
    async fn make_query_rejects_json_mode() {
        let entry = entry();
        let adapter = TogetherAdapter::with_base_url("http://unused.invalid", "test-key");
        let params = QueryParams {
            messages: &messages(),
            entry: &entry,
            temperature: None,
            max_gen_len: None,
            json_mode: true,
            credentials: None,
        };
        let err = adapter.make_query(params).await.unwrap_err();
        assert!(matches!(err, GatewayError::UnsupportedOption { .. }));
    }
}
