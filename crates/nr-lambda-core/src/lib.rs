//! Shared model for the nr-lambda workflows
//!
//! This crate holds what every workflow produces and reports on: the
//! per-action [`OperationResult`] record, the ordered [`RunSummary`]
//! accumulator, the report formatting used by the CLI, and the table of
//! AWS regions the log-ingestion function can be deployed to.

pub mod regions;
pub mod report;
pub mod result;

// Re-exports
pub use regions::SUPPORTED_REGIONS;
pub use result::{OperationResult, RunSummary};
