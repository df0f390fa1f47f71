//! Helpers shared by every adapter: the SAAS-mode switch, credential
//! lookup, and the plain-text message flattening several chat-style
//! providers require.

use std::time::Duration;

use optimodel_core::credentials::Credentials;
use optimodel_core::error::GatewayError;
use optimodel_core::model::ProviderId;
use optimodel_core::types::{Message, MessageContent};

use crate::QueryParams;

/// Every outbound provider call gets the same ceiling the teacher's engines
/// wrap `reqwest` calls in (`tokio::time::timeout(Duration::from_secs(300))`
/// in `OpenAIEngine::execute`).
pub const REQUEST_TIMEOUT: Duration = Duration::from_secs(300);

/// `OPTIMODEL_SAAS_MODE`'s *presence*, not its value, toggles SAAS mode —
/// `Config/types.py`: `SAAS_MODE = os.environ.get("OPTIMODEL_SAAS_MODE", None)`.
pub fn saas_mode() -> bool {
    std::env::var_os("OPTIMODEL_SAAS_MODE").is_some()
}

/// Resolves which credentials an adapter should use for this call: in SAAS
/// mode, the caller-supplied credentials already filtered to `provider` by
/// the planner; in self-hosted mode, `None` (the adapter already holds its
/// own preconfigured client).
pub fn require_credentials_if_saas<'a>(
    params: &QueryParams<'a>,
    provider: ProviderId,
    provider_label: &str,
) -> Result<Option<&'a Credentials>, GatewayError> {
    if !saas_mode() {
        return Ok(None);
    }
    let creds = params
        .credentials
        .filter(|c| c.provider() == provider)
        .ok_or_else(|| GatewayError::MissingCredentials {
            provider: provider_label.to_string(),
        })?;
    Ok(Some(creds))
}

/// Flattens a message's content down to plain text, taking only the first
/// text part and ignoring images — the behavior `GroqProvider.py`,
/// `TogetherProvider.py`, and `MistralAIProvider.py` all share for
/// providers with no native multi-part content schema.
pub fn text_only_messages(
    messages: &[Message],
    provider_label: &str,
) -> Result<Vec<(String, String)>, GatewayError> {
    messages
        .iter()
        .map(|m| {
            m.content
                .first_text()
                .map(|t| (m.role.clone(), t.to_string()))
                .ok_or_else(|| GatewayError::ProviderFailure {
                    provider: provider_label.to_string(),
                    reason: format!("no text found for role {}", m.role),
                })
        })
        .collect()
}

/// Rejects requests containing any image content part — the
/// `containsImageInMessages` guard `CommonUtils.py` shares across Groq,
/// Together AI, and Mistral AI.
pub fn reject_images(
    messages: &[Message],
    provider_label: &str,
) -> Result<(), GatewayError> {
    if messages.iter().any(|m| m.content.contains_image()) {
        return Err(GatewayError::UnsupportedOption {
            provider: provider_label.to_string(),
            option: "image content".to_string(),
        });
    }
    Ok(())
}

/// Rejects `json_mode: true` outright — the unconditional check
/// `GroqProvider.py`, `TogetherProvider.py`, and `MistralAIProvider.py`
/// perform before doing anything else.
pub fn reject_json_mode(json_mode: bool, provider_label: &str) -> Result<(), GatewayError> {
    if json_mode {
        return Err(GatewayError::UnsupportedOption {
            provider: provider_label.to_string(),
            option: "json_mode".to_string(),
        });
    }
    Ok(())
}

pub fn is_system(message: &Message) -> bool {
    message.role == "system"
}
