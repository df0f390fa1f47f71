//! Google Gemini adapter: turn-sequence archetype with a dedicated
//! `system_instruction` field and alternating user/model turns. Grounded
//! in `GeminiProvider.py`.

use std::future::Future;

use optimodel_core::credentials::Credentials;
use optimodel_core::error::{GatewayError, GatewayResult};
use optimodel_core::model::{LogicalModel, ProviderId};
use optimodel_core::types::{ContentPart, MessageContent, QueryResponse};
use serde_json::{json, Value};

use crate::common::{self, REQUEST_TIMEOUT};
use crate::{ProviderAdapter, QueryParams};

const PROVIDER_LABEL: &str = "gemini";

const DEFAULT_BASE_URL: &str = "https://generativelanguage.googleapis.com";

pub struct GeminiAdapter {
    client: reqwest::Client,
    api_key: Option<String>,
    base_url: String,
}

impl GeminiAdapter {
    pub fn from_env() -> Self {
        GeminiAdapter {
            client: reqwest::Client::new(),
            api_key: std::env::var("GEMINI_API_KEY").ok(),
            base_url: DEFAULT_BASE_URL.to_string(),
        }
    }

    #[cfg(test)]
    fn with_base_url(base_url: impl Into<String>, api_key: impl Into<String>) -> Self {
        GeminiAdapter {
            client: reqwest::Client::new(),
            api_key: Some(api_key.into()),
            base_url: base_url.into(),
        }
    }

    fn model_id(model: LogicalModel) -> GatewayResult<&'static str> {
        use LogicalModel::*;
        Ok(match model {
            Gemini1_5Pro => "models/gemini-1.5-pro",
            Gemini1_5ProLatest => "models/gemini-1.5-pro-latest",
            Gemini1_5Pro001 => "models/gemini-1.5-pro-001",
            Gemini1_5Pro002 => "models/gemini-1.5-pro-002",
            Gemini1_5ProExp0801 => "models/gemini-1.5-pro-exp-0801",
            Gemini1_5ProExp0827 => "models/gemini-1.5-pro-exp-0827",
            Gemini1_5Flash => "models/gemini-1.5-flash",
            Gemini1_5FlashLatest => "models/gemini-1.5-flash-latest",
            Gemini1_5Flash001 => "models/gemini-1.5-flash-001",
            Gemini1_5Flash001Tuning => "models/gemini-1.5-flash-001-tuning",
            Gemini1_5FlashExp0827 => "models/gemini-1.5-flash-exp-0827",
            Gemini1_5Flash8bExp0827 => "models/gemini-1.5-flash-8b-exp-0827",
            other => {
                return Err(GatewayError::UnsupportedModel {
                    provider: PROVIDER_LABEL.to_string(),
                    model: other.to_string(),
                })
            }
        })
    }
}

fn part_to_text_or_inline(part: &ContentPart) -> Value {
    match part {
        ContentPart::Text { text } => json!(text),
        ContentPart::Image { source } => json!({
            "inline_data": {"mime_type": source.media_type, "data": source.data},
        }),
        ContentPart::VideoGemini { data } => json!({
            "file_data": {"mime_type": data.mime_type, "file_uri": data.file_uri},
        }),
    }
}

impl ProviderAdapter for GeminiAdapter {
    fn provider_id(&self) -> ProviderId {
        ProviderId::GoogleGemini
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
                ProviderId::GoogleGemini,
                PROVIDER_LABEL,
            )? {
                Some(Credentials::Gemini { gemini_api_key }) => gemini_api_key.clone(),
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

            let system_instruction = params.messages.iter().find(|m| common::is_system(m)).map(
                |m| match &m.content {
                    MessageContent::Text(t) => t.clone(),
                    MessageContent::Parts(parts) => parts
                        .iter()
                        .find_map(|p| match p {
                            ContentPart::Text { text } => Some(text.clone()),
                            _ => None,
                        })
                        .unwrap_or_default(),
                },
            );

            let mut contents = Vec::new();
            for m in params.messages {
                let role = match m.role.as_str() {
                    "user" => "user",
                    "assistant" => "model",
                    _ => continue,
                };
                let parts = match &m.content {
                    MessageContent::Text(t) => vec![json!(t)],
                    MessageContent::Parts(p) => p.iter().map(part_to_text_or_inline).collect(),
                };
                contents.push(json!({"role": role, "parts": parts}));
            }

            let mut body = json!({
                "contents": contents,
                "generationConfig": {
                    "temperature": params.temperature,
                    "maxOutputTokens": params.max_gen_len,
                },
            });
            if let Some(system) = system_instruction {
                body["systemInstruction"] = json!({"parts": [{"text": system}]});
            }
            if params.json_mode {
                body["generationConfig"]["response_mime_type"] = json!("application/json");
            }

            let url = format!(
                "{}/v1beta/{}:generateContent?key={}",
                self.base_url, model_id, api_key
            );
            let response = tokio::time::timeout(REQUEST_TIMEOUT, self.client.post(url).json(&body).send())
                .await
                .map_err(|_| GatewayError::ProviderFailure {
                    provider: PROVIDER_LABEL.to_string(),
                    reason: "request timed out".to_string(),
                })??;

            let payload: Value = response.json().await?;
            let prompt_tokens = payload["usageMetadata"]["promptTokenCount"]
                .as_u64()
                .ok_or_else(|| GatewayError::ProviderFailure {
                    provider: PROVIDER_LABEL.to_string(),
                    reason: "response missing usageMetadata.promptTokenCount".to_string(),
                })? as u32;
            let generation_tokens = payload["usageMetadata"]["candidatesTokenCount"]
                .as_u64()
                .ok_or_else(|| GatewayError::ProviderFailure {
                    provider: PROVIDER_LABEL.to_string(),
                    reason: "response missing usageMetadata.candidatesTokenCount".to_string(),
                })? as u32;
            let model_output = payload["candidates"][0]["content"]["parts"][0]["text"]
                .as_str()
                .ok_or_else(|| GatewayError::ProviderFailure {
                    provider: PROVIDER_LABEL.to_string(),
                    reason: "response missing candidates[0].content.parts[0].text".to_string(),
                })?
                .to_string();

            Ok(QueryResponse {
                model_response: model_output,
                prompt_tokens,
                generation_tokens,
                cost: None,
                provider: ProviderId::GoogleGemini,
                guard_errors: Vec::new(),
            })
        })
    }
}
