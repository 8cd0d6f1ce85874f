//! New Relic side of Lambda onboarding
//!
//! A thin NerdGraph (GraphQL) client plus the typed operations the
//! workflows need: license keys, linked cloud accounts and the Lambda
//! cloud integration. One request per operation, no retries; API-level
//! errors come back flattened into readable messages.

pub mod cloud;
pub mod error;
pub mod nerdgraph;

// Re-exports
pub use cloud::{Integration, LAMBDA_SERVICE_SLUG, LinkedAccount};
pub use error::{NewRelicError, Result};
pub use nerdgraph::{NerdGraph, NewRelicRegion};
