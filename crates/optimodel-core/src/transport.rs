//! Wire shapes for the external HTTP surface.
//!
//! This crate does not implement the routing framework (out of scope) —
//! these structs exist so whatever framework a caller wires up
//! (`axum`, `actix-web`, ...) can reuse the same serialization this crate
//! already defines for `/query`, `/list-models`, and `/health`, instead of
//! redeclaring it.

use serde::Serialize;

use crate::error::GatewayError;
use crate::model::{LogicalModel, ProviderId};

/// Body of a `GET /list-models` response: every logical model the catalog
/// currently has at least one provider for.
#[derive(Debug, Serialize)]
pub struct ListModelsResponse {
    pub models: Vec<ModelSummary>,
}

#[derive(Debug, Serialize)]
pub struct ModelSummary {
    pub model: LogicalModel,
    pub providers: Vec<ProviderId>,
}

/// Body of a `GET /health` response.
#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: &'static str,
}

impl Default for HealthResponse {
    fn default() -> Self {
        HealthResponse { status: "ok" }
    }
}

/// The error envelope a `GatewayError` serializes to on `/query`.
#[derive(Debug, Serialize)]
pub struct ErrorEnvelope {
    pub error: String,
}

impl GatewayError {
    /// HTTP status code a routing layer should respond with for this
    /// error. Every terminal `GatewayError` maps to 503, matching
    /// `queryModelMain`'s `JSONResponse(status_code=503, ...)` — schema
    /// validation failures (422) happen upstream of this crate, in the
    /// framework's request-parsing layer, not here.
    pub fn http_status(&self) -> u16 {
        match self {
            GatewayError::Cancelled => 499,
            _ => 503,
        }
    }

    pub fn to_envelope(&self) -> ErrorEnvelope {
        ErrorEnvelope {
            error: self.to_string(),
        }
    }
}
