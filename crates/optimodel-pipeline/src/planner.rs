//! Pure selection logic: given a logical model's candidate providers and a
//! request, decide which are eligible and in what order to try them.
//! Grounded in `Planner.py`'s `getAllAvailableProviders`/`orderProviders`.

use optimodel_core::catalog::ProviderEntry;
use optimodel_core::credentials::{self, Credentials};
use optimodel_core::error::{GatewayError, GatewayResult};
use optimodel_core::model::SpeedPriority;

/// Tunables that change eligibility filtering independent of the request
/// itself. `enforce_max_gen_len` defaults to `false`: the original always
/// ran `provider.maxGenLen >= body.maxGenLen`, but `maxGenLen` is commonly
/// left unset on a request, and filtering against a present-but-unset
/// value there is an artifact of the original's loose typing rather than a
/// real requirement. See `DESIGN.md` for the full rationale.
#[derive(Debug, Clone, Copy)]
pub struct PlannerPolicy {
    pub enforce_max_gen_len: bool,
}

impl Default for PlannerPolicy {
    fn default() -> Self {
        PlannerPolicy {
            enforce_max_gen_len: false,
        }
    }
}

/// Filters a model's candidate providers down to the ones eligible for this
/// request, then orders them by the request's `speed_priority`.
///
/// `saas_credentials` is `Some` only in SAAS mode; when present, a provider
/// survives only if the caller supplied matching credentials for it.
pub fn plan(
    candidates: &[ProviderEntry],
    speed_priority: SpeedPriority,
    max_gen_len: Option<u32>,
    policy: PlannerPolicy,
    saas_credentials: Option<&[Credentials]>,
) -> GatewayResult<Vec<ProviderEntry>> {
    let mut eligible: Vec<ProviderEntry> = candidates.to_vec();

    if policy.enforce_max_gen_len {
        if let Some(requested) = max_gen_len {
            eligible.retain(|p| p.max_gen_len >= requested);
        }
    }

    if let Some(creds) = saas_credentials {
        eligible.retain(|p| credentials::find_for(creds, p.provider).is_some());
    }

    if eligible.is_empty() {
        return Err(GatewayError::NoEligibleProvider {
            model: candidates
                .first()
                .map(|p| p.name.to_string())
                .unwrap_or_else(|| "unknown".to_string()),
        });
    }

    order_providers(&mut eligible, speed_priority);
    Ok(eligible)
}

/// Speed-priority requests sort by `speed` ascending (lower is faster);
/// otherwise sort by the average of input/output price, cheapest first.
fn order_providers(providers: &mut [ProviderEntry], speed_priority: SpeedPriority) {
    match speed_priority {
        SpeedPriority::High => providers.sort_by_key(|p| p.speed),
        SpeedPriority::Low => providers.sort_by(|a, b| {
            let avg_a = (a.price_per_1m_input + a.price_per_1m_output) / 2.0;
            let avg_b = (b.price_per_1m_input + b.price_per_1m_output) / 2.0;
            avg_a.partial_cmp(&avg_b).unwrap_or(std::cmp::Ordering::Equal)
        }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use optimodel_core::model::{LogicalModel, ProviderId};

    fn entry(provider: ProviderId, max_gen_len: u32, speed: u32, price: f64) -> ProviderEntry {
        ProviderEntry {
            provider,
            name: LogicalModel::Llama3_70bInstruct,
            max_gen_len,
            speed,
            price_per_1m_input: price,
            price_per_1m_output: price,
            price_per_1m_input_above_128k: None,
            price_per_1m_output_above_128k: None,
        }
    }

    #[test]
    fn orders_by_speed_when_high_priority_requested() {
        let candidates = vec![
            entry(ProviderId::Bedrock, 4096, 20, 0.9),
            entry(ProviderId::TogetherAi, 4096, 10, 0.5),
        ];
        let ordered = plan(
            &candidates,
            SpeedPriority::High,
            None,
            PlannerPolicy::default(),
            None,
        )
        .unwrap();
        assert_eq!(ordered[0].provider, ProviderId::TogetherAi);
    }

    #[test]
    fn orders_by_average_price_when_low_priority() {
        let candidates = vec![
            entry(ProviderId::Bedrock, 4096, 5, 0.9),
            entry(ProviderId::TogetherAi, 4096, 10, 0.5),
        ];
        let ordered = plan(
            &candidates,
            SpeedPriority::Low,
            None,
            PlannerPolicy::default(),
            None,
        )
        .unwrap();
        assert_eq!(ordered[0].provider, ProviderId::TogetherAi);
    }

    #[test]
    fn max_gen_len_filter_is_off_by_default() {
        let candidates = vec![entry(ProviderId::Bedrock, 1024, 5, 0.9)];
        let ordered = plan(
            &candidates,
            SpeedPriority::Low,
            Some(4096),
            PlannerPolicy::default(),
            None,
        )
        .unwrap();
        assert_eq!(ordered.len(), 1);
    }

    #[test]
    fn max_gen_len_filter_applies_when_enforced() {
        let candidates = vec![
            entry(ProviderId::Bedrock, 1024, 5, 0.9),
            entry(ProviderId::TogetherAi, 8192, 10, 0.5),
        ];
        let policy = PlannerPolicy {
            enforce_max_gen_len: true,
        };
        let ordered = plan(&candidates, SpeedPriority::Low, Some(4096), policy, None).unwrap();
        assert_eq!(ordered.len(), 1);
        assert_eq!(ordered[0].provider, ProviderId::TogetherAi);
    }

    #[test]
    fn saas_mode_drops_providers_without_matching_credentials() {
        let candidates = vec![
            entry(ProviderId::Bedrock, 4096, 5, 0.9),
            entry(ProviderId::TogetherAi, 4096, 10, 0.5),
        ];
        let creds = vec![Credentials::TogetherAi {
            together_api_key: "key".to_string(),
        }];
        let ordered = plan(
            &candidates,
            SpeedPriority::Low,
            None,
            PlannerPolicy::default(),
            Some(&creds),
        )
        .unwrap();
        assert_eq!(ordered.len(), 1);
        assert_eq!(ordered[0].provider, ProviderId::TogetherAi);
    }

    #[test]
    fn no_eligible_providers_is_an_error() {
        let creds = vec![Credentials::OpenAi {
            openai_key: "key".to_string(),
        }];
        let candidates = vec![entry(ProviderId::Bedrock, 4096, 5, 0.9)];
        let err = plan(
            &candidates,
            SpeedPriority::Low,
            None,
            PlannerPolicy::default(),
            Some(&creds),
        )
        .unwrap_err();
        assert!(matches!(err, GatewayError::NoEligibleProvider { .. }));
    }
}
