//! HTTP client for the guard sidecar. The sidecar itself (prompt-injection
//! scoring, regex matching, entity detection) is a separate service; this
//! crate only speaks its wire protocol. Grounded in `guardClient.py`.

pub mod client;
pub mod reduce;
#[cfg(feature = "testing")]
pub mod testing;

pub use client::{GuardCheckOutcome, GuardClient};
pub use reduce::{reduce_text, strip_non_text};
