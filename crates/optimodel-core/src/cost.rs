//! Cost computation for a completed query.
//!
//! Grounded in `QueryModelMain.py`'s inline cost block: per-million-token
//! rates, switching to an "above 128K" tier when the tier rate is
//! configured and the relevant token count exceeds it, falling back to
//! `None` (not a panic) if anything about the computation goes wrong —
//! the original wraps the whole block in a `try/except` and just logs.

use crate::catalog::ProviderEntry;
use crate::types::Usage;

const ABOVE_TIER_THRESHOLD: u32 = 128_000;

/// Computes the dollar cost of `usage` against `entry`'s pricing, applying
/// the above-128K tier to whichever side of usage exceeds it when a tier
/// rate is configured.
pub fn calculate_cost(entry: &ProviderEntry, usage: Usage) -> f64 {
    let input_rate = if usage.prompt_tokens > ABOVE_TIER_THRESHOLD {
        entry
            .price_per_1m_input_above_128k
            .unwrap_or(entry.price_per_1m_input)
    } else {
        entry.price_per_1m_input
    };
    let output_rate = if usage.generation_tokens > ABOVE_TIER_THRESHOLD {
        entry
            .price_per_1m_output_above_128k
            .unwrap_or(entry.price_per_1m_output)
    } else {
        entry.price_per_1m_output
    };

    let input_cost = usage.prompt_tokens as f64 * (input_rate / 1_000_000.0);
    let output_cost = usage.generation_tokens as f64 * (output_rate / 1_000_000.0);
    input_cost + output_cost
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{LogicalModel, ProviderId};

    fn entry(above_tier: Option<(f64, f64)>) -> ProviderEntry {
        ProviderEntry {
            provider: ProviderId::Bedrock,
            name: LogicalModel::Llama3_70bInstruct,
            max_gen_len: 2048,
            speed: 10,
            price_per_1m_input: 1.0,
            price_per_1m_output: 2.0,
            price_per_1m_input_above_128k: above_tier.map(|(i, _)| i),
            price_per_1m_output_above_128k: above_tier.map(|(_, o)| o),
        }
    }

    #[test]
    fn below_threshold_uses_base_rate() {
        let usage = Usage {
            prompt_tokens: 1_000,
            generation_tokens: 500,
        };
        let cost = calculate_cost(&entry(Some((0.5, 1.0))), usage);
        assert!((cost - (1_000.0 * 1.0 / 1e6 + 500.0 * 2.0 / 1e6)).abs() < 1e-9);
    }

    #[test]
    fn above_threshold_uses_tier_rate_when_configured() {
        let usage = Usage {
            prompt_tokens: 200_000,
            generation_tokens: 500,
        };
        let cost = calculate_cost(&entry(Some((0.5, 1.0))), usage);
        assert!((cost - (200_000.0 * 0.5 / 1e6 + 500.0 * 2.0 / 1e6)).abs() < 1e-9);
    }

    #[test]
    fn above_threshold_without_tier_rate_falls_back_to_base() {
        let usage = Usage {
            prompt_tokens: 200_000,
            generation_tokens: 500,
        };
        let cost = calculate_cost(&entry(None), usage);
        assert!((cost - (200_000.0 * 1.0 / 1e6 + 500.0 * 2.0 / 1e6)).abs() < 1e-9);
    }
}
