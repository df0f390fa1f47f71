//! The gateway's closed error taxonomy.
//!
//! Mirrors the shape of `fluent_core::error::FluentError`: a top-level enum,
//! manual `Display` impls instead of `thiserror`, and `From` bridges from
//! the error types that show up at the network/serialization boundary.

use std::fmt;

/// Every way routing or executing a query can fail.
#[derive(Debug)]
pub enum GatewayError {
    /// The requested logical model has no catalog entry at all.
    NoSuchModel { model: String },

    /// The model exists, but no candidate provider survived filtering
    /// (credentials, `maxGenLen`, capability gates).
    NoEligibleProvider { model: String },

    /// A specific adapter's native-model mapping table has no entry for
    /// the requested logical model (distinct from `NoSuchModel`, which is
    /// the catalog's own "never heard of this model" case).
    UnsupportedModel { provider: String, model: String },

    /// SAAS mode is active and the caller didn't supply credentials for
    /// any surviving candidate provider.
    MissingCredentials { provider: String },

    /// The request asked for something (JSON mode, image content) the
    /// selected provider's adapter can't do.
    UnsupportedOption { provider: String, option: String },

    /// The provider's API rejected the request or returned malformed data.
    ProviderFailure { provider: String, reason: String },

    /// A blocking guard found a violation and the pipeline returned its
    /// `block_request_message` instead of querying the provider.
    GuardFailure { guard_name: String, reason: String },

    /// A blocking guard could not be reached at all (the sidecar is
    /// unreachable, timed out, or returned a non-2xx status).
    GuardTransportError { guard_name: String, reason: String },

    /// Every ordered candidate provider failed; carries each candidate's
    /// failure so a caller can see what was tried.
    NoAvailableProvider { attempts: Vec<String> },

    /// The run's `CancellationToken` fired before a response was produced.
    Cancelled,

    /// Anything else — config parsing, catalog validation, internal bugs.
    Internal(String),
}

impl fmt::Display for GatewayError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            GatewayError::NoSuchModel { model } => {
                write!(f, "no catalog entry for model '{}'", model)
            }
            GatewayError::NoEligibleProvider { model } => {
                write!(f, "no eligible provider for model '{}'", model)
            }
            GatewayError::UnsupportedModel { provider, model } => {
                write!(f, "provider '{}' has no native mapping for model '{}'", provider, model)
            }
            GatewayError::MissingCredentials { provider } => {
                write!(f, "missing credentials for provider '{}'", provider)
            }
            GatewayError::UnsupportedOption { provider, option } => {
                write!(f, "provider '{}' does not support '{}'", provider, option)
            }
            GatewayError::ProviderFailure { provider, reason } => {
                write!(f, "provider '{}' failed: {}", provider, reason)
            }
            GatewayError::GuardFailure { guard_name, reason } => {
                write!(f, "guard '{}' blocked the request: {}", guard_name, reason)
            }
            GatewayError::GuardTransportError { guard_name, reason } => {
                write!(f, "guard '{}' could not be reached: {}", guard_name, reason)
            }
            GatewayError::NoAvailableProvider { attempts } => {
                write!(f, "no available provider. Got errors: {:?}", attempts)
            }
            GatewayError::Cancelled => write!(f, "query was cancelled"),
            GatewayError::Internal(msg) => write!(f, "internal error: {}", msg),
        }
    }
}

impl std::error::Error for GatewayError {}

pub type GatewayResult<T> = Result<T, GatewayError>;

impl From<anyhow::Error> for GatewayError {
    fn from(err: anyhow::Error) -> Self {
        GatewayError::Internal(err.to_string())
    }
}

impl From<serde_json::Error> for GatewayError {
    fn from(err: serde_json::Error) -> Self {
        GatewayError::Internal(format!("json error: {}", err))
    }
}

impl From<reqwest::Error> for GatewayError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_timeout() {
            GatewayError::ProviderFailure {
                provider: err
                    .url()
                    .map(|u| u.to_string())
                    .unwrap_or_else(|| "unknown".to_string()),
                reason: "request timed out".to_string(),
            }
        } else {
            GatewayError::ProviderFailure {
                provider: err
                    .url()
                    .map(|u| u.to_string())
                    .unwrap_or_else(|| "unknown".to_string()),
                reason: err.to_string(),
            }
        }
    }
}
