//! Wire-agnostic request/response types shared by the planner, the
//! provider adapters, and the guard client.
//!
//! These mirror the Pydantic models the routing service used
//! (`ModelMessage`, `QueryBody`, `QueryResponse`) but use Rust enums in
//! place of the original's `isinstance` content-type checks.

use serde::{Deserialize, Serialize};

use crate::model::{LogicalModel, SpeedPriority};

/// A single turn in a conversation passed to a provider.
///
/// `content` is either plain text or a list of typed parts (text, image,
/// file) — the two shapes the original message model supported
/// interchangeably via `str | list[...]`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Message {
    pub role: String,
    pub content: MessageContent,
}

/// The body of a `Message`: either a flat string or a list of typed parts.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(untagged)]
pub enum MessageContent {
    Text(String),
    Parts(Vec<ContentPart>),
}

impl MessageContent {
    /// The first text part found, ignoring any image/file parts — used by
    /// adapters that only accept plain text (Groq, Together AI, Mistral AI).
    pub fn first_text(&self) -> Option<&str> {
        match self {
            MessageContent::Text(t) => Some(t.as_str()),
            MessageContent::Parts(parts) => parts.iter().find_map(|p| match p {
                ContentPart::Text { text } => Some(text.as_str()),
                _ => None,
            }),
        }
    }

    /// True if any part of this content is non-text.
    pub fn contains_image(&self) -> bool {
        matches!(self, MessageContent::Parts(parts) if parts.iter().any(|p| matches!(p, ContentPart::Image { .. })))
    }
}

/// One entry of a multi-part message.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "kebab-case")]
pub enum ContentPart {
    Text { text: String },
    Image { source: ImageSource },
    #[serde(rename = "video-gemini")]
    VideoGemini { data: GeminiFileData },
}

/// An inline base64-encoded image, in the shape every chat-style provider
/// accepts (`{mediaType, type, data}`).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ImageSource {
    #[serde(rename = "mediaType")]
    pub media_type: String,
    /// Always `"base64"` today; kept as a field rather than a constant
    /// because the original wire format carries it explicitly.
    #[serde(rename = "type")]
    pub encoding: String,
    pub data: String,
}

/// A file already uploaded to Gemini's file API, referenced by URI.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GeminiFileData {
    #[serde(rename = "mimeType")]
    pub mime_type: String,
    #[serde(rename = "fileUri")]
    pub file_uri: String,
}

/// A client's request to route and execute a query.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct QueryRequest {
    pub messages: Vec<Message>,
    pub model_to_use: LogicalModel,
    #[serde(default)]
    pub speed_priority: SpeedPriority,
    #[serde(default)]
    pub temperature: Option<f64>,
    #[serde(default)]
    pub max_gen_len: Option<u32>,
    #[serde(default)]
    pub json_mode: bool,
    /// Optionally pin this request to one provider, skipping the planner's
    /// ordering entirely.
    #[serde(default)]
    pub provider: Option<crate::model::ProviderId>,
    #[serde(default)]
    pub guards: Vec<crate::guard::GuardConfig>,
    #[serde(default)]
    pub user_id: Option<String>,
    #[serde(default)]
    pub session_id: Option<String>,
    #[serde(default)]
    pub credentials: Option<Vec<crate::credentials::Credentials>>,
}

/// Token usage for a single completed query.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, Default)]
pub struct Usage {
    pub prompt_tokens: u32,
    pub generation_tokens: u32,
}

impl Usage {
    pub fn total(&self) -> u32 {
        self.prompt_tokens + self.generation_tokens
    }
}

/// The outcome of a `QueryPipeline` run — what the external HTTP surface
/// would serialize back to the caller.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct QueryResponse {
    pub model_response: String,
    pub prompt_tokens: u32,
    pub generation_tokens: u32,
    pub cost: Option<f64>,
    pub provider: crate::model::ProviderId,
    #[serde(default)]
    pub guard_errors: Vec<GuardErrorSummary>,
}

/// One guard's verdict, attached to a `QueryResponse` regardless of whether
/// it blocked the request — a caller needs to see non-blocking failures too.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GuardErrorSummary {
    pub guard_name: String,
    pub failure: bool,
    pub block_request: bool,
    #[serde(default)]
    pub metadata: serde_json::Value,
}
