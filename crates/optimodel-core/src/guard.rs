//! Guard configuration types.
//!
//! A `GuardConfig` only describes *what* to check and *when*; the check
//! itself (the classifier, the regex engine, the entity detector) runs in
//! the separate guard sidecar process and is out of scope here — see
//! `optimodel-guard::client` for the HTTP call that invokes it.

use serde::{Deserialize, Serialize};

/// Whether a guard runs before the provider is queried or after.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum GuardPhase {
    PreQuery,
    PostQuery,
}

/// A single guard attached to a `QueryRequest`.
///
/// Tagged by `guardName` on the wire, matching the sidecar's own
/// `GuardMapping` dispatch table.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "guardName")]
pub enum GuardConfig {
    #[serde(rename = "META_LLAMA_PROMPT_GUARD_86M", rename_all = "camelCase")]
    PromptInjection {
        guard_type: GuardPhase,
        block_request: bool,
        block_request_message: Option<String>,
        jailbreak_threshold: Option<f64>,
        injection_threshold: Option<f64>,
    },
    #[serde(rename = "LYTIX_REGEX_GUARD", rename_all = "camelCase")]
    Regex {
        guard_type: GuardPhase,
        block_request: bool,
        block_request_message: Option<String>,
        #[serde(rename = "regex")]
        pattern: String,
    },
    #[serde(rename = "MICROSOFT_PRESIDIO_GUARD", rename_all = "camelCase")]
    EntityDetection {
        guard_type: GuardPhase,
        block_request: bool,
        block_request_message: Option<String>,
        #[serde(rename = "entitiesToCheck")]
        entities: Vec<String>,
    },
}

impl GuardConfig {
    pub fn guard_type(&self) -> GuardPhase {
        match self {
            GuardConfig::PromptInjection { guard_type, .. }
            | GuardConfig::Regex { guard_type, .. }
            | GuardConfig::EntityDetection { guard_type, .. } => *guard_type,
        }
    }

    pub fn block_request(&self) -> bool {
        match self {
            GuardConfig::PromptInjection { block_request, .. }
            | GuardConfig::Regex { block_request, .. }
            | GuardConfig::EntityDetection { block_request, .. } => *block_request,
        }
    }

    pub fn block_request_message(&self) -> Option<&str> {
        match self {
            GuardConfig::PromptInjection {
                block_request_message,
                ..
            }
            | GuardConfig::Regex {
                block_request_message,
                ..
            }
            | GuardConfig::EntityDetection {
                block_request_message,
                ..
            } => block_request_message.as_deref(),
        }
    }

    /// The wire name the sidecar's `GuardMapping` keys on.
    pub fn guard_name(&self) -> &'static str {
        match self {
            GuardConfig::PromptInjection { .. } => "META_LLAMA_PROMPT_GUARD_86M",
            GuardConfig::Regex { .. } => "LYTIX_REGEX_GUARD",
            GuardConfig::EntityDetection { .. } => "MICROSOFT_PRESIDIO_GUARD",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn round_trips_through_json() {
        let guard = GuardConfig::Regex {
            guard_type: GuardPhase::PreQuery,
            block_request: true,
            block_request_message: Some("blocked".to_string()),
            pattern: "\\d{3}-\\d{2}-\\d{4}".to_string(),
        };
        let json = serde_json::to_string(&guard).unwrap();
        let back: GuardConfig = serde_json::from_str(&json).unwrap();
        assert_eq!(back.guard_name(), "LYTIX_REGEX_GUARD");
        assert!(back.block_request());
    }

    #[test]
    fn guard_name_matches_sidecar_mapping() {
        let guard = GuardConfig::PromptInjection {
            guard_type: GuardPhase::PreQuery,
            block_request: false,
            block_request_message: None,
            jailbreak_threshold: Some(0.5),
            injection_threshold: Some(0.5),
        };
        assert_eq!(guard.guard_name(), "META_LLAMA_PROMPT_GUARD_86M");
    }
}
