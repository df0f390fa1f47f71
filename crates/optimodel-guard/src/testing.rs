//! In-process mock guard sidecar for other crates' test suites.
//!
//! Spins up a `wiremock::MockServer` that speaks the same wire protocol as
//! the real sidecar (`{"failure": bool, "metadata": {...}}`) so pipeline
//! tests can exercise pre-/post-query guard behavior without a real guard
//! process running. Grounded in the same route shape `GuardClient` posts
//! to, matching `examples/original_source/guardServer`'s single
//! `/optimodel-guard/api/v1/guard` endpoint.

use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

use crate::GuardClient;

/// A guard sidecar double that always returns the same verdict, regardless
/// of what it's asked to check.
pub struct MockGuardSidecar {
    server: MockServer,
}

impl MockGuardSidecar {
    /// Starts a sidecar double that reports `failure` on every check.
    pub async fn always_returning(failure: bool) -> Self {
        Self::always_returning_with_metadata(failure, serde_json::Value::Null).await
    }

    /// Same as [`always_returning`](Self::always_returning), but with a
    /// caller-supplied `metadata` body, for tests that assert on what a
    /// guard's failure metadata carries.
    pub async fn always_returning_with_metadata(
        failure: bool,
        metadata: serde_json::Value,
    ) -> Self {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/optimodel-guard/api/v1/guard"))
            .respond_with(
                ResponseTemplate::new(200)
                    .set_body_json(serde_json::json!({"failure": failure, "metadata": metadata})),
            )
            .mount(&server)
            .await;
        MockGuardSidecar { server }
    }

    /// A `GuardClient` wired to this double's address.
    pub fn client(&self) -> GuardClient {
        GuardClient::new(&self.server.uri())
    }
}
