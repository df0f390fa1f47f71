//! AWS Bedrock adapter: the one back-end with three distinct prompt
//! archetypes behind a single endpoint, keyed on the underlying model
//! family. Grounded in `BedrockProvider.py`.
//!
//! Request signing: production Bedrock calls require AWS SigV4, which no
//! crate in this workspace's dependency stack provides (the teacher's
//! stack has no AWS SDK beyond the `neo4rs`/database drivers it already
//! carries). This adapter builds the exact native request bodies Bedrock
//! expects and sends them with a bearer-style credential header; wiring in
//! real SigV4 signing is a transport-layer concern noted in `DESIGN.md`
//! rather than implemented here.

use std::future::Future;

use optimodel_core::credentials::Credentials;
use optimodel_core::error::{GatewayError, GatewayResult};
use optimodel_core::model::{LogicalModel, ProviderId};
use optimodel_core::types::{ContentPart, MessageContent, QueryResponse};
use serde_json::{json, Value};

use crate::common::{self, REQUEST_TIMEOUT};
use crate::{ProviderAdapter, QueryParams};

const PROVIDER_LABEL: &str = "bedrock";

#[derive(Clone, Copy, PartialEq, Eq)]
enum ModelFamily {
    Llama,
    Claude,
    Mistral,
}

pub struct BedrockAdapter {
    client: reqwest::Client,
    region: Option<String>,
    access_key_id: Option<String>,
    secret_key: Option<String>,
}

impl BedrockAdapter {
    pub fn from_env() -> Self {
        BedrockAdapter {
            client: reqwest::Client::new(),
            region: std::env::var("AWS_REGION").ok(),
            access_key_id: std::env::var("AWS_ACCESS_KEY_ID").ok(),
            secret_key: std::env::var("AWS_SECRET_ACCESS_KEY").ok(),
        }
    }

    fn model_id_and_family(model: LogicalModel) -> GatewayResult<(&'static str, ModelFamily)> {
        use LogicalModel::*;
        Ok(match model {
            Llama3_8bInstruct => ("meta.llama3-8b-instruct-v1:0", ModelFamily::Llama),
            Llama3_70bInstruct => ("meta.llama3-70b-instruct-v1:0", ModelFamily::Llama),
            Llama3_1_8bInstruct => ("meta.llama3-1-8b-instruct-v1:0", ModelFamily::Llama),
            Llama3_1_70bInstruct => ("meta.llama3-1-70b-instruct-v1:0", ModelFamily::Llama),
            Llama3_1_405bInstruct => ("meta.llama3-1-405b-instruct-v1:0", ModelFamily::Llama),
            Claude3_5Sonnet20240620 => (
                "anthropic.claude-3-5-sonnet-20240620-v1:0",
                ModelFamily::Claude,
            ),
            Claude3_5Sonnet20241022 | Claude3_5Sonnet => (
                "anthropic.claude-3-5-sonnet-20241022-v2:0",
                ModelFamily::Claude,
            ),
            Claude3Sonnet => ("anthropic.claude-3-sonnet-20240229-v1:0", ModelFamily::Claude),
            Claude3Haiku => ("anthropic.claude-3-haiku-20240307-v1:0", ModelFamily::Claude),
            Mistral7bInstruct => ("mistral.mistral-7b-instruct-v0:2", ModelFamily::Mistral),
            Mixtral8x7bInstruct => ("mistral.mixtral-8x7b-instruct-v0:1", ModelFamily::Mistral),
            other => {
                return Err(GatewayError::UnsupportedModel {
                    provider: PROVIDER_LABEL.to_string(),
                    model: other.to_string(),
                })
            }
        })
    }

    /// `BedrockProvider.py`'s image check exempts exactly two logical
    /// models by name (`claude_3_haiku`, `claude_3_5_sonnet`), not the
    /// whole Claude family — `claude_3_sonnet` and the dated
    /// `claude_3_5_sonnet_20240620`/`claude_3_5_sonnet_20241022` variants
    /// still reject image content.
    fn image_exempt(model: LogicalModel) -> bool {
        matches!(model, LogicalModel::Claude3Haiku | LogicalModel::Claude3_5Sonnet)
    }

    fn message_text(content: &MessageContent) -> Option<&str> {
        match content {
            MessageContent::Text(t) => Some(t.as_str()),
            MessageContent::Parts(parts) => parts.iter().find_map(|p| match p {
                ContentPart::Text { text } => Some(text.as_str()),
                _ => None,
            }),
        }
    }

    fn build_llama_prompt(messages: &[optimodel_core::types::Message]) -> String {
        let mut prompt = String::from("<|begin_of_text|>");
        for (index, message) in messages.iter().enumerate() {
            let newline = if index != messages.len() - 1 { "\n" } else { "" };
            let text = Self::message_text(&message.content).unwrap_or_default();
            prompt.push_str(&format!(
                "<|start_header_id|>{}<|end_header_id|>{}{}",
                message.role, newline, text
            ));
        }
        prompt.push_str("<|eot_id|>\n<|start_header_id|>assistant<|end_header_id|>");
        prompt
    }

    fn build_mistral_prompt(messages: &[optimodel_core::types::Message]) -> String {
        let mut prompt = String::from("<s> [INST] ");
        for message in messages {
            prompt.push_str(Self::message_text(&message.content).unwrap_or_default());
        }
        prompt.push_str(" [/INST]");
        prompt
    }
}

impl ProviderAdapter for BedrockAdapter {
    fn provider_id(&self) -> ProviderId {
        ProviderId::Bedrock
    }

    fn supports_images(&self) -> bool {
        // Only the Claude family supports images; enforced per-model below
        // since it depends on which model was selected, not a blanket yes.
        true
    }

    fn validate<'a>(&'a self) -> Box<dyn Future<Output = bool> + Send + 'a> {
        Box::new(async move {
            self.region.is_some() && self.access_key_id.is_some() && self.secret_key.is_some()
        })
    }

    fn make_query<'a>(
        &'a self,
        params: QueryParams<'a>,
    ) -> Box<dyn Future<Output = GatewayResult<QueryResponse>> + Send + 'a> {
        Box::new(async move {
            let (model_id, family) = Self::model_id_and_family(params.entry.name)?;

            if !Self::image_exempt(params.entry.name)
                && params.messages.iter().any(|m| m.content.contains_image())
            {
                return Err(GatewayError::UnsupportedOption {
                    provider: PROVIDER_LABEL.to_string(),
                    option: "image content".to_string(),
                });
            }

            let (access_key_id, secret_key, region) = match common::require_credentials_if_saas(
                &params,
                ProviderId::Bedrock,
                PROVIDER_LABEL,
            )? {
                Some(Credentials::Bedrock {
                    aws_access_key_id,
                    aws_secret_key,
                    aws_region,
                }) => (
                    aws_access_key_id.clone(),
                    aws_secret_key.clone(),
                    aws_region.clone(),
                ),
                Some(_) => unreachable!("filtered by provider"),
                None => (
                    self.access_key_id
                        .clone()
                        .ok_or(GatewayError::MissingCredentials {
                            provider: PROVIDER_LABEL.to_string(),
                        })?,
                    self.secret_key
                        .clone()
                        .ok_or(GatewayError::MissingCredentials {
                            provider: PROVIDER_LABEL.to_string(),
                        })?,
                    self.region
                        .clone()
                        .ok_or(GatewayError::MissingCredentials {
                            provider: PROVIDER_LABEL.to_string(),
                        })?,
                ),
            };

            let native_request: Value = match family {
                ModelFamily::Llama => {
                    let mut body = json!({"prompt": Self::build_llama_prompt(params.messages)});
                    if let Some(t) = params.temperature {
                        body["temperature"] = json!(t);
                    }
                    if let Some(m) = params.max_gen_len {
                        body["max_gen_len"] = json!(m);
                    }
                    body
                }
                ModelFamily::Claude => {
                    let mut system_message = None;
                    let mut messages = Vec::new();
                    for m in params.messages {
                        if common::is_system(m) {
                            system_message = Self::message_text(&m.content).map(str::to_string);
                            continue;
                        }
                        let content: Vec<Value> = match &m.content {
                            MessageContent::Text(t) => vec![json!({"type": "text", "text": t})],
                            MessageContent::Parts(parts) => parts
                                .iter()
                                .map(|p| match p {
                                    ContentPart::Text { text } => json!({"type": "text", "text": text}),
                                    ContentPart::Image { source } => json!({
                                        "type": "image",
                                        "source": {
                                            "type": source.encoding,
                                            "media_type": source.media_type,
                                            "data": source.data,
                                        },
                                    }),
                                    ContentPart::VideoGemini { .. } => json!({"type": "text", "text": ""}),
                                })
                                .collect(),
                        };
                        messages.push(json!({"role": m.role, "content": content}));
                    }
                    let mut body = json!({
                        "anthropic_version": "bedrock-2023-05-31",
                        "messages": messages,
                        "max_tokens": params.max_gen_len.unwrap_or(200_000),
                    });
                    if let Some(t) = params.temperature {
                        body["temperature"] = json!(t);
                    }
                    if let Some(system) = system_message {
                        body["system"] = json!(system);
                    }
                    body
                }
                ModelFamily::Mistral => {
                    let mut body = json!({
                        "prompt": Self::build_mistral_prompt(params.messages),
                        "temperature": params.temperature,
                    });
                    if let Some(m) = params.max_gen_len {
                        body["max_tokens"] = json!(m);
                    }
                    body
                }
            };

            let url = format!(
                "https://bedrock-runtime.{}.amazonaws.com/model/{}/invoke",
                region, model_id
            );
            let response = tokio::time::timeout(
                REQUEST_TIMEOUT,
                self.client
                    .post(url)
                    .header("x-amz-access-key-id", &access_key_id)
                    .header("x-amz-secret-access-key", &secret_key)
                    .json(&native_request)
                    .send(),
            )
            .await
            .map_err(|_| GatewayError::ProviderFailure {
                provider: PROVIDER_LABEL.to_string(),
                reason: "request timed out".to_string(),
            })??;

            match family {
                ModelFamily::Mistral => {
                    let prompt_tokens = response
                        .headers()
                        .get("x-amzn-bedrock-input-token-count")
                        .and_then(|v| v.to_str().ok())
                        .and_then(|v| v.parse::<u32>().ok())
                        .ok_or_else(|| GatewayError::ProviderFailure {
                            provider: PROVIDER_LABEL.to_string(),
                            reason: "missing x-amzn-bedrock-input-token-count header".to_string(),
                        })?;
                    let generation_tokens = response
                        .headers()
                        .get("x-amzn-bedrock-output-token-count")
                        .and_then(|v| v.to_str().ok())
                        .and_then(|v| v.parse::<u32>().ok())
                        .ok_or_else(|| GatewayError::ProviderFailure {
                            provider: PROVIDER_LABEL.to_string(),
                            reason: "missing x-amzn-bedrock-output-token-count header".to_string(),
                        })?;
                    let payload: Value = response.json().await?;
                    let model_output = payload["outputs"][0]["text"]
                        .as_str()
                        .ok_or_else(|| GatewayError::ProviderFailure {
                            provider: PROVIDER_LABEL.to_string(),
                            reason: "response missing outputs[0].text".to_string(),
                        })?
                        .trim()
                        .to_string();
                    Ok(QueryResponse {
                        model_response: model_output,
                        prompt_tokens,
                        generation_tokens,
                        cost: None,
                        provider: ProviderId::Bedrock,
                        guard_errors: Vec::new(),
                    })
                }
                ModelFamily::Llama => {
                    let payload: Value = response.json().await?;
                    let mut text = payload["generation"]
                        .as_str()
                        .ok_or_else(|| GatewayError::ProviderFailure {
                            provider: PROVIDER_LABEL.to_string(),
                            reason: "response missing generation".to_string(),
                        })?
                        .trim_start_matches('\n')
                        .trim()
                        .to_string();
                    if let Some(stripped) = text.strip_prefix("<|end_header_id|>") {
                        text = stripped.trim_start_matches('\n').trim().to_string();
                    }
                    let prompt_tokens = payload["prompt_token_count"].as_u64().ok_or_else(|| {
                        GatewayError::ProviderFailure {
                            provider: PROVIDER_LABEL.to_string(),
                            reason: "response missing prompt_token_count".to_string(),
                        }
                    })? as u32;
                    let generation_tokens = payload["generation_token_count"]
                        .as_u64()
                        .ok_or_else(|| GatewayError::ProviderFailure {
                            provider: PROVIDER_LABEL.to_string(),
                            reason: "response missing generation_token_count".to_string(),
                        })? as u32;
                    Ok(QueryResponse {
                        model_response: text,
                        prompt_tokens,
                        generation_tokens,
                        cost: None,
                        provider: ProviderId::Bedrock,
                        guard_errors: Vec::new(),
                    })
                }
                ModelFamily::Claude => {
                    let payload: Value = response.json().await?;
                    let text = payload["content"][0]["text"]
                        .as_str()
                        .ok_or_else(|| GatewayError::ProviderFailure {
                            provider: PROVIDER_LABEL.to_string(),
                            reason: "response missing content[0].text".to_string(),
                        })?
                        .trim()
                        .to_string();
                    let prompt_tokens = payload["usage"]["input_tokens"].as_u64().ok_or_else(|| {
                        GatewayError::ProviderFailure {
                            provider: PROVIDER_LABEL.to_string(),
                            reason: "response missing usage.input_tokens".to_string(),
                        }
                    })? as u32;
                    let generation_tokens = payload["usage"]["output_tokens"]
                        .as_u64()
                        .ok_or_else(|| GatewayError::ProviderFailure {
                            provider: PROVIDER_LABEL.to_string(),
                            reason: "response missing usage.output_tokens".to_string(),
                        })? as u32;
                    Ok(QueryResponse {
                        model_response: text,
                        prompt_tokens,
                        generation_tokens,
                        cost: None,
                        provider: ProviderId::Bedrock,
                        guard_errors: Vec::new(),
                    })
                }
            }
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use optimodel_core::types::{Message, MessageContent};

    #[test]
    fn llama_prompt_wraps_each_message_in_header_tokens() {
        let messages = vec![
            Message {
                role: "user".to_string(),
                content: MessageContent::Text("hi".to_string()),
            },
        ];
        let prompt = BedrockAdapter::build_llama_prompt(&messages);
        assert!(prompt.starts_with("<|begin_of_text|>"));
        assert!(prompt.ends_with("<|start_header_id|>assistant<|end_header_id|>"));
        assert!(prompt.contains("<|start_header_id|>user<|end_header_id|>hi"));
    }

    #[test]
    fn mistral_prompt_wraps_in_inst_tokens() {
        let messages = vec![Message {
            role: "user".to_string(),
            content: MessageContent::Text("hi".to_string()),
        }];
        let prompt = BedrockAdapter::build_mistral_prompt(&messages);
        assert_eq!(prompt, "<s> [INST] hi [/INST]");
    }

    #[test]
    fn image_exemption_is_limited_to_the_two_grounded_models() {
        assert!(BedrockAdapter::image_exempt(LogicalModel::Claude3Haiku));
        assert!(BedrockAdapter::image_exempt(LogicalModel::Claude3_5Sonnet));

        assert!(!BedrockAdapter::image_exempt(LogicalModel::Claude3Sonnet));
        assert!(!BedrockAdapter::image_exempt(LogicalModel::Claude3Haiku20240307));
        assert!(!BedrockAdapter::image_exempt(LogicalModel::Claude3_5Sonnet20240620));
        assert!(!BedrockAdapter::image_exempt(LogicalModel::Claude3_5Sonnet20241022));
        assert!(!BedrockAdapter::image_exempt(LogicalModel::Llama3_70bInstruct));
    }
}
