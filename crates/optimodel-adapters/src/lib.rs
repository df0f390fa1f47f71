//! One `ProviderAdapter` implementation per LLM back-end.
//!
//! Mirrors `fluent_core::traits::Engine`: trait methods return
//! `Box<dyn Future<...> + Send + 'a>` rather than using `#[async_trait]`,
//! so adapters stay object-safe and can be stored as `Box<dyn
//! ProviderAdapter>` in the catalog-to-adapter registry the pipeline holds.

pub mod anthropic;
pub mod bedrock;
pub mod gemini;
pub mod groq;
pub mod mistral;
pub mod openai;
pub mod together;
mod common;

use std::future::Future;

use optimodel_core::catalog::ProviderEntry;
use optimodel_core::credentials::Credentials;
use optimodel_core::error::GatewayResult;
use optimodel_core::model::ProviderId;
use optimodel_core::types::{Message, QueryResponse};

/// The parameters a pipeline passes to an adapter for a single attempt
/// against one ordered candidate provider. Mirrors `QueryParams` in
/// `BaseProviderClass.py`.
pub struct QueryParams<'a> {
    pub messages: &'a [Message],
    pub entry: &'a ProviderEntry,
    pub temperature: Option<f64>,
    pub max_gen_len: Option<u32>,
    pub json_mode: bool,
    /// `None` in self-hosted mode (the adapter uses its own preconfigured
    /// client); `Some` in SAAS mode, already filtered to this provider's
    /// credential variant by the caller.
    pub credentials: Option<&'a Credentials>,
}

/// The contract every provider back-end implements: can it be used right
/// now, and can it execute a query. Mirrors `BaseProviderClass` in
/// `BaseProviderClass.py`.
pub trait ProviderAdapter: Send + Sync {
    fn provider_id(&self) -> ProviderId;

    /// Whether this adapter accepts `json_mode: true` requests.
    fn supports_json_mode(&self) -> bool {
        false
    }

    /// Whether this adapter accepts image content parts.
    fn supports_images(&self) -> bool {
        false
    }

    /// Self-hosted-mode readiness check — e.g. "is an API key configured",
    /// or for Bedrock, "can we reach AWS STS with these credentials".
    /// Not called at all in SAAS mode, where credentials arrive per-request
    /// instead.
    fn validate<'a>(&'a self) -> Box<dyn Future<Output = bool> + Send + 'a>;

    fn make_query<'a>(
        &'a self,
        params: QueryParams<'a>,
    ) -> Box<dyn Future<Output = GatewayResult<QueryResponse>> + Send + 'a>;
}

/// Whether the gateway is running in SAAS mode — exposed so the pipeline
/// can decide whether to require caller-supplied credentials before even
/// attempting a candidate provider.
pub fn saas_mode() -> bool {
    common::saas_mode()
}

/// Builds the full set of provider adapters this gateway knows about.
/// Self-hosted credentials are read from the environment at construction
/// time by each adapter, the same way `OpenAIProvider.__init__` reads
/// `OPEN_AI_KEY` once at process start.
pub fn all_adapters() -> Vec<Box<dyn ProviderAdapter>> {
    vec![
        Box::new(openai::OpenAiAdapter::from_env()),
        Box::new(anthropic::AnthropicAdapter::from_env()),
        Box::new(groq::GroqAdapter::from_env()),
        Box::new(together::TogetherAdapter::from_env()),
        Box::new(mistral::MistralAdapter::from_env()),
        Box::new(gemini::GeminiAdapter::from_env()),
        Box::new(bedrock::BedrockAdapter::from_env()),
    ]
}
