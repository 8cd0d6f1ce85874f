//! AWS side of New Relic Lambda onboarding
//!
//! Wraps the `aws` CLI for the IAM, CloudFormation, Lambda and CloudWatch
//! Logs calls the workflows need. Probes return `Option` for missing
//! resources; provisioning operations probe before they mutate so that
//! re-running them is always safe.

pub mod awscli;
pub mod error;
pub mod provision;

// Re-exports
pub use awscli::{
    AwsCli, CallerIdentity, CommandOutput, CommandRunner, FunctionConfig, Role, ShellRunner,
    SubscriptionFilter,
};
pub use error::{AwsError, Result};
pub use provision::{
    FILTER_NAME, FILTER_PATTERN, INGESTION_FUNCTION, INGESTION_STACK, IngestionOutcome,
    RemovalOutcome, SubscriptionOutcome, ensure_integration_role, ensure_log_ingestion,
    ensure_log_subscription, integration_role_name, integration_role_stack,
    remove_log_subscription,
};
