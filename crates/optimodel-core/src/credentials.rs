//! Per-provider credentials, carried on the wire in SAAS mode.
//!
//! `Debug` is hand-implemented rather than derived so a credentials value
//! never leaks its secret into a log line — the same discipline
//! `fluent_core::auth::SecureString` applies to bearer tokens.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::model::ProviderId;

/// A tagged union of per-provider credential shapes.
///
/// Exactly one variant matches a given `ProviderId`; `provider()` gives the
/// mapping so callers (the planner's SAAS-mode filter, the adapters'
/// credential lookup) don't have to match on variant names themselves.
#[derive(Clone, Serialize, Deserialize)]
#[serde(tag = "provider")]
pub enum Credentials {
    #[serde(rename = "openai")]
    OpenAi {
        #[serde(rename = "openAiKey")]
        openai_key: String,
    },
    #[serde(rename = "anthropic")]
    Anthropic {
        #[serde(rename = "anthropicApiKey")]
        anthropic_api_key: String,
    },
    #[serde(rename = "groq")]
    Groq {
        #[serde(rename = "groqApiKey")]
        groq_api_key: String,
    },
    #[serde(rename = "togetherai")]
    TogetherAi {
        #[serde(rename = "togetherApiKey")]
        together_api_key: String,
    },
    #[serde(rename = "mistralai")]
    MistralAi {
        #[serde(rename = "mistralApiKey")]
        mistral_api_key: String,
    },
    #[serde(rename = "gemini")]
    Gemini {
        #[serde(rename = "geminiApiKey")]
        gemini_api_key: String,
    },
    #[serde(rename = "bedrock")]
    Bedrock {
        #[serde(rename = "awsAccessKeyId")]
        aws_access_key_id: String,
        #[serde(rename = "awsSecretKey")]
        aws_secret_key: String,
        #[serde(rename = "awsRegion")]
        aws_region: String,
    },
}

impl Credentials {
    pub fn provider(&self) -> ProviderId {
        match self {
            Credentials::OpenAi { .. } => ProviderId::OpenAi,
            Credentials::Anthropic { .. } => ProviderId::Anthropic,
            Credentials::Groq { .. } => ProviderId::Groq,
            Credentials::TogetherAi { .. } => ProviderId::TogetherAi,
            Credentials::MistralAi { .. } => ProviderId::MistralAi,
            Credentials::Gemini { .. } => ProviderId::GoogleGemini,
            Credentials::Bedrock { .. } => ProviderId::Bedrock,
        }
    }
}

impl fmt::Debug for Credentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Credentials {{ provider: {:?}, secret: <redacted> }}", self.provider())
    }
}

/// Picks out the first credential set matching `provider`, the way every
/// provider adapter's `makeQuery` does before falling through to
/// `MissingCredentials`.
pub fn find_for<'a>(credentials: &'a [Credentials], provider: ProviderId) -> Option<&'a Credentials> {
    credentials.iter().find(|c| c.provider() == provider)
}
