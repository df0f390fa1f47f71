//! The query orchestrator: resolve a logical model to its ordered
//! candidate providers, run guards, attempt each candidate until one
//! succeeds. Grounded step for step in `QueryModelMain.py`.

use optimodel_adapters::{ProviderAdapter, QueryParams};
use optimodel_core::catalog::Catalog;
use optimodel_core::cost;
use optimodel_core::credentials;
use optimodel_core::error::{GatewayError, GatewayResult};
use optimodel_core::guard::{GuardConfig, GuardPhase};
use optimodel_core::types::{GuardErrorSummary, QueryRequest, QueryResponse, Usage};
use optimodel_guard::{GuardCheckOutcome, GuardClient};
use tokio_util::sync::CancellationToken;

use crate::planner::{self, PlannerPolicy};

/// Ties together everything a single `run` needs: the catalog to resolve
/// models against, the live adapters to query, and an optional guard
/// sidecar client (`None` when no guards will ever be configured, e.g. in
/// tests).
pub struct QueryPipeline<'a> {
    catalog: &'a Catalog,
    adapters: &'a [Box<dyn ProviderAdapter>],
    guard_client: Option<&'a GuardClient>,
    policy: PlannerPolicy,
}

impl<'a> QueryPipeline<'a> {
    pub fn new(
        catalog: &'a Catalog,
        adapters: &'a [Box<dyn ProviderAdapter>],
        guard_client: Option<&'a GuardClient>,
        policy: PlannerPolicy,
    ) -> Self {
        QueryPipeline {
            catalog,
            adapters,
            guard_client,
            policy,
        }
    }

    fn adapter_for(&self, provider: optimodel_core::model::ProviderId) -> Option<&dyn ProviderAdapter> {
        self.adapters
            .iter()
            .find(|a| a.provider_id() == provider)
            .map(|b| b.as_ref())
    }

    async fn check_guard(
        &self,
        guard: &GuardConfig,
        request: &QueryRequest,
        model_output: Option<&str>,
    ) -> GatewayResult<GuardCheckOutcome> {
        match self.guard_client {
            Some(client) => client.check_guard(guard, &request.messages, model_output).await,
            None => Ok(GuardCheckOutcome {
                failure: false,
                metadata: serde_json::Value::Null,
            }),
        }
    }

    /// Races `fut` against `cancellation` so a cancel fired mid-flight wins
    /// over a guard check or adapter call that is still running, instead of
    /// only being noticed the next time the loop top is reached.
    async fn race_cancel<F, T>(cancellation: &CancellationToken, fut: F) -> GatewayResult<T>
    where
        F: std::future::Future<Output = T>,
    {
        tokio::select! {
            _ = cancellation.cancelled() => Err(GatewayError::Cancelled),
            out = fut => Ok(out),
        }
    }

    fn guard_summary(guard: &GuardConfig, outcome: &GuardCheckOutcome) -> GuardErrorSummary {
        GuardErrorSummary {
            guard_name: guard.guard_name().to_string(),
            failure: true,
            block_request: guard.block_request(),
            metadata: outcome.metadata.clone(),
        }
    }

    /// Runs a full query: plan candidates, attempt them in order, apply
    /// guards at the configured phases. Returns as soon as one candidate
    /// succeeds (subject to post-query guards), or `NoAvailableProvider`
    /// once every candidate has failed.
    pub async fn run(
        &self,
        request: QueryRequest,
        cancellation: CancellationToken,
    ) -> GatewayResult<QueryResponse> {
        let candidates = self.catalog.lookup(request.model_to_use)?;
        let candidates: Vec<optimodel_core::catalog::ProviderEntry> = match request.provider {
            Some(pinned) => {
                let filtered: Vec<_> = candidates.iter().filter(|c| c.provider == pinned).cloned().collect();
                if filtered.is_empty() {
                    return Err(GatewayError::NoEligibleProvider {
                        model: request.model_to_use.to_string(),
                    });
                }
                filtered
            }
            None => candidates.to_vec(),
        };
        let candidates = candidates.as_slice();

        let saas_mode = optimodel_adapters::saas_mode();
        let saas_credentials = if saas_mode {
            Some(
                request
                    .credentials
                    .as_deref()
                    .ok_or_else(|| GatewayError::MissingCredentials {
                        provider: "any".to_string(),
                    })?,
            )
        } else {
            None
        };

        let ordered = planner::plan(
            candidates,
            request.speed_priority,
            request.max_gen_len,
            self.policy,
            saas_credentials,
        )?;

        let pre_guards: Vec<&GuardConfig> = request
            .guards
            .iter()
            .filter(|g| g.guard_type() == GuardPhase::PreQuery)
            .collect();
        let post_guards: Vec<&GuardConfig> = request
            .guards
            .iter()
            .filter(|g| g.guard_type() == GuardPhase::PostQuery)
            .collect();

        let mut attempt_errors: Vec<String> = Vec::new();

        'candidates: for candidate in &ordered {
            if cancellation.is_cancelled() {
                return Err(GatewayError::Cancelled);
            }

            let adapter = match self.adapter_for(candidate.provider) {
                Some(a) => a,
                None => {
                    attempt_errors.push(format!("{}: no adapter registered", candidate.provider));
                    continue;
                }
            };

            let mut guard_errors: Vec<GuardErrorSummary> = Vec::new();

            for guard in &pre_guards {
                match Self::race_cancel(&cancellation, self.check_guard(guard, &request, None)).await? {
                    Ok(outcome) if outcome.failure => {
                        guard_errors.push(Self::guard_summary(guard, &outcome));
                        if guard.block_request() {
                            return Ok(QueryResponse {
                                model_response: guard.block_request_message().unwrap_or("").to_string(),
                                prompt_tokens: 0,
                                generation_tokens: 0,
                                cost: Some(0.0),
                                provider: candidate.provider,
                                guard_errors,
                            });
                        }
                    }
                    Ok(_) => {}
                    Err(e) => {
                        if guard.block_request() {
                            attempt_errors.push(format!("{}: {}", candidate.provider, e));
                            continue 'candidates;
                        }
                    }
                }
            }

            let credentials = saas_credentials
                .and_then(|creds| credentials::find_for(creds, candidate.provider));

            let params = QueryParams {
                messages: &request.messages,
                entry: candidate,
                temperature: request.temperature,
                max_gen_len: request.max_gen_len,
                json_mode: request.json_mode,
                credentials,
            };

            let response = Self::race_cancel(&cancellation, adapter.make_query(params)).await?;
            let mut response = match response {
                Ok(r) => r,
                Err(e) => {
                    attempt_errors.push(format!("{}: {}", candidate.provider, e));
                    continue;
                }
            };

            response.cost = Some(cost::calculate_cost(
                candidate,
                Usage {
                    prompt_tokens: response.prompt_tokens,
                    generation_tokens: response.generation_tokens,
                },
            ));
            response.guard_errors = guard_errors;

            for guard in &post_guards {
                match Self::race_cancel(
                    &cancellation,
                    self.check_guard(guard, &request, Some(&response.model_response)),
                )
                .await?
                {
                    Ok(outcome) if outcome.failure => {
                        response.guard_errors.push(Self::guard_summary(guard, &outcome));
                        if guard.block_request() {
                            response.model_response =
                                guard.block_request_message().unwrap_or("").to_string();
                            return Ok(response);
                        }
                    }
                    Ok(_) => {}
                    Err(e) => {
                        if guard.block_request() {
                            attempt_errors.push(format!("{}: {}", candidate.provider, e));
                            continue 'candidates;
                        }
                    }
                }
            }

            return Ok(response);
        }

        Err(GatewayError::NoAvailableProvider {
            attempts: attempt_errors,
        })
    }
}
