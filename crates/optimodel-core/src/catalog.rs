//! Catalog loading: the mapping from a `LogicalModel` to the list of
//! providers that can serve it, enriched with pricing and speed-rank data.
//!
//! Grounded in `Config.py`'s `Config.__init__`/`_validateConfig`: parse a
//! JSON document, validate every entry's model name against the closed
//! model enum (fatal on an unknown model), and drop entries for an
//! unrecognized provider string with a warning rather than failing the
//! whole load.

use std::collections::HashMap;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::{GatewayError, GatewayResult};
use crate::model::{LogicalModel, ProviderId};

/// One provider's offering of a logical model, as it appears in the JSON
/// catalog document.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProviderEntry {
    pub provider: ProviderId,
    /// The logical model name re-stated here, passed straight through to
    /// the adapter's `make_query` as the model to dispatch on internally —
    /// the original service does the same (`potentialProvider["name"]`).
    pub name: LogicalModel,
    pub max_gen_len: u32,
    /// Lower is faster; used by the planner's speed-priority ordering.
    pub speed: u32,
    #[serde(rename = "pricePer1MInput")]
    pub price_per_1m_input: f64,
    #[serde(rename = "pricePer1MOutput")]
    pub price_per_1m_output: f64,
    #[serde(default, rename = "pricePer1MInputAbove125K")]
    pub price_per_1m_input_above_128k: Option<f64>,
    #[serde(default, rename = "pricePer1MOutputAbove125K")]
    pub price_per_1m_output_above_128k: Option<f64>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct CatalogDocument {
    available_models: HashMap<String, Vec<ProviderEntry>>,
}

/// The loaded, validated model-to-provider index.
#[derive(Debug, Clone, Default)]
pub struct Catalog {
    model_to_providers: HashMap<LogicalModel, Vec<ProviderEntry>>,
}

impl Catalog {
    /// Parse and validate a catalog document, grouping entries by logical
    /// model. A provider key that doesn't parse as a `ProviderId` is
    /// dropped with a `log::warn!`, matching the original's unsupported-
    /// provider handling; everything else is fatal (an unparseable
    /// document, or an entry whose `name` isn't a known `LogicalModel`,
    /// which `serde` already rejects during deserialization).
    pub fn load_from_str(json: &str) -> GatewayResult<Self> {
        let doc: CatalogDocument = serde_json::from_str(json)?;
        let mut model_to_providers: HashMap<LogicalModel, Vec<ProviderEntry>> = HashMap::new();

        for (provider_key, entries) in doc.available_models {
            if ProviderId::from_str(&provider_key).is_err() {
                log::warn!("dropping catalog entries for unsupported provider '{provider_key}'");
                continue;
            }
            for entry in entries {
                model_to_providers
                    .entry(entry.name)
                    .or_default()
                    .push(entry);
            }
        }

        Ok(Catalog { model_to_providers })
    }

    /// All provider entries for a logical model, in the order they appeared
    /// in the catalog document. The planner is responsible for ordering;
    /// this returns `NoSuchModel` only when the model has zero entries.
    pub fn lookup(&self, model: LogicalModel) -> GatewayResult<&[ProviderEntry]> {
        self.model_to_providers
            .get(&model)
            .map(Vec::as_slice)
            .filter(|entries| !entries.is_empty())
            .ok_or(GatewayError::NoSuchModel {
                model: model.to_string(),
            })
    }

    /// Drop every entry whose provider fails `is_valid` (e.g. a
    /// self-hosted-mode credential check performed by the adapter layer,
    /// which this crate cannot call directly without depending on
    /// `optimodel-adapters`). Mirrors `_validateConfig`'s self-hosted
    /// `validateProvider()` gate.
    pub fn retain_valid_providers(&mut self, mut is_valid: impl FnMut(ProviderId) -> bool) {
        for entries in self.model_to_providers.values_mut() {
            entries.retain(|entry| {
                let ok = is_valid(entry.provider);
                if !ok {
                    log::warn!(
                        "dropping provider '{}' for model '{}': failed validation",
                        entry.provider,
                        entry.name
                    );
                }
                ok
            });
        }
    }
}
