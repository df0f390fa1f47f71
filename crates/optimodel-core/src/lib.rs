//! Core data model, catalog, credentials, cost accounting, and error
//! taxonomy for the Optimodel routing gateway.
//!
//! This crate has no knowledge of any particular provider's wire format or
//! of the guard sidecar's protocol — those live in `optimodel-adapters` and
//! `optimodel-guard` respectively. It only defines the shapes both of those
//! crates, and the pipeline that orchestrates them, agree on.

pub mod catalog;
pub mod cost;
pub mod credentials;
pub mod error;
pub mod guard;
pub mod model;
pub mod transport;
pub mod types;

pub use credentials::Credentials;
pub use error::{GatewayError, GatewayResult};
pub use model::{LogicalModel, ProviderId};
pub use types::{ContentPart, Message, QueryRequest, QueryResponse, Usage};
