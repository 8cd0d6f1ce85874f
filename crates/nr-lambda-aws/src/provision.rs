//! Idempotent provisioning operations
//!
//! Every mutator probes first and only mutates when the probe shows the
//! resource is missing or misconfigured. A stack left behind in an
//! unexpected state is surfaced as a remediation error for the operator;
//! nothing here deletes or retries on its own.

use crate::awscli::{AwsCli, Role, SubscriptionFilter};
use crate::error::{AwsError, Result};

/// Name of the log-ingestion function deployed per region.
pub const INGESTION_FUNCTION: &str = "newrelic-log-ingestion";

/// Stack that deploys the log-ingestion function.
pub const INGESTION_STACK: &str = "NewRelicLogIngestion";

/// Name of the managed subscription filter.
pub const FILTER_NAME: &str = "NewRelicLogStreaming";

/// Pattern that limits streamed log lines to what the platform ingests.
pub const FILTER_PATTERN: &str = "?REPORT ?NR_LAMBDA_MONITORING ?\"Task timed out\" ?RequestId";

const ROLE_TEMPLATE: &str = "templates/nr-lambda-integration-role.yaml";
const INGESTION_TEMPLATE: &str = "templates/newrelic-log-ingestion.yaml";

/// Role the integration assumes, scoped to one New Relic account.
pub fn integration_role_name(nr_account_id: i64) -> String {
    format!("NewRelicLambdaIntegrationRole_{nr_account_id}")
}

/// Stack that creates the integration role.
pub fn integration_role_stack(nr_account_id: i64) -> String {
    format!("NewRelicLambdaIntegrationRole-{nr_account_id}")
}

/// Outcome of the per-region log-ingestion operation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IngestionOutcome {
    Created,
    AlreadyExists,
}

/// Outcome of installing the log subscription on one function.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SubscriptionOutcome {
    /// No filter was present; the managed filter was installed.
    Created,
    /// A legacy managed filter with an empty pattern was replaced.
    Recreated,
    /// The managed filter is already in place with a pattern.
    AlreadyConfigured,
    /// An unrelated filter exists; it was left untouched.
    SkippedForeignFilter(String),
}

/// Outcome of removing the log subscription from one function.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RemovalOutcome {
    Removed,
    NotInstalled,
    /// An unrelated filter exists; it was left untouched.
    SkippedForeignFilter(String),
}

/// Create the integration role if it does not exist and return it.
///
/// An existing role is returned unchanged, whatever state its stack is
/// in. A stack without its role is a conflict the operator must resolve.
pub async fn ensure_integration_role(
    aws: &AwsCli,
    nr_account_id: i64,
    policy_name: &str,
) -> Result<Role> {
    let role_name = integration_role_name(nr_account_id);
    if let Some(role) = aws.get_role(&role_name).await? {
        tracing::debug!("integration role already exists: {}", role.arn);
        return Ok(role);
    }

    let stack = integration_role_stack(nr_account_id);
    if let Some(status) = aws.get_stack_status(&stack, None).await? {
        return Err(AwsError::StackConflict { stack, status });
    }

    let account_number = nr_account_id.to_string();
    aws.create_stack(
        &stack,
        ROLE_TEMPLATE,
        &[
            ("NewRelicAccountNumber", account_number.as_str()),
            ("PolicyName", policy_name),
        ],
        None,
    )
    .await?;
    aws.wait_stack_create_complete(&stack, None).await?;

    aws.get_role(&role_name)
        .await?
        .ok_or(AwsError::RoleMissingAfterCreate(role_name))
}

/// Deploy the log-ingestion function in a region if it is missing.
pub async fn ensure_log_ingestion(
    aws: &AwsCli,
    region: &str,
    license_key: &str,
) -> Result<IngestionOutcome> {
    if aws.get_function(INGESTION_FUNCTION, region).await?.is_some() {
        tracing::debug!("{INGESTION_FUNCTION} already deployed in {region}");
        return Ok(IngestionOutcome::AlreadyExists);
    }

    if let Some(status) = aws.get_stack_status(INGESTION_STACK, Some(region)).await? {
        return Err(AwsError::StackConflict {
            stack: INGESTION_STACK.to_string(),
            status,
        });
    }

    aws.create_stack(
        INGESTION_STACK,
        INGESTION_TEMPLATE,
        &[("NewRelicLicenseKey", license_key)],
        Some(region),
    )
    .await?;
    aws.wait_stack_create_complete(INGESTION_STACK, Some(region))
        .await?;

    Ok(IngestionOutcome::Created)
}

/// What to do with the filters currently on a function's log group.
#[derive(Debug, Clone, PartialEq, Eq)]
enum FilterPlan {
    Install,
    Recreate,
    UpToDate,
    Foreign(String),
}

/// At most one managed filter per function; unrelated filters are never
/// touched. A managed filter with an empty pattern is a legacy install
/// that gets replaced.
fn subscription_plan(filters: &[SubscriptionFilter]) -> FilterPlan {
    if filters.is_empty() {
        return FilterPlan::Install;
    }
    match filters.iter().find(|f| f.filter_name == FILTER_NAME) {
        Some(filter) if filter.filter_pattern.is_empty() => FilterPlan::Recreate,
        Some(_) => FilterPlan::UpToDate,
        None => FilterPlan::Foreign(filters[0].filter_name.clone()),
    }
}

/// Point a function's logs at the region's ingestion function.
///
/// The ingestion function must already be deployed in the region.
pub async fn ensure_log_subscription(
    aws: &AwsCli,
    function: &str,
    region: &str,
) -> Result<SubscriptionOutcome> {
    let ingestion = aws
        .get_function(INGESTION_FUNCTION, region)
        .await?
        .ok_or_else(|| AwsError::IngestionFunctionMissing {
            function: INGESTION_FUNCTION.to_string(),
            region: region.to_string(),
        })?;

    let filters = aws.list_subscription_filters(function, region).await?;
    match subscription_plan(&filters) {
        FilterPlan::Install => {
            aws.put_subscription_filter(
                function,
                region,
                FILTER_NAME,
                FILTER_PATTERN,
                &ingestion.function_arn,
            )
            .await?;
            Ok(SubscriptionOutcome::Created)
        }
        FilterPlan::Recreate => {
            aws.delete_subscription_filter(function, region, FILTER_NAME)
                .await?;
            aws.put_subscription_filter(
                function,
                region,
                FILTER_NAME,
                FILTER_PATTERN,
                &ingestion.function_arn,
            )
            .await?;
            Ok(SubscriptionOutcome::Recreated)
        }
        FilterPlan::UpToDate => Ok(SubscriptionOutcome::AlreadyConfigured),
        FilterPlan::Foreign(name) => Ok(SubscriptionOutcome::SkippedForeignFilter(name)),
    }
}

/// Remove the managed filter from a function, if present.
pub async fn remove_log_subscription(
    aws: &AwsCli,
    function: &str,
    region: &str,
) -> Result<RemovalOutcome> {
    let filters = aws.list_subscription_filters(function, region).await?;

    if filters.iter().any(|f| f.filter_name == FILTER_NAME) {
        aws.delete_subscription_filter(function, region, FILTER_NAME)
            .await?;
        return Ok(RemovalOutcome::Removed);
    }
    match filters.first() {
        Some(foreign) => Ok(RemovalOutcome::SkippedForeignFilter(
            foreign.filter_name.clone(),
        )),
        None => Ok(RemovalOutcome::NotInstalled),
    }
}
