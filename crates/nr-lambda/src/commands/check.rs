//! Read-only status check
//!
//! Probes the whole setup in a fixed order and collects one failure
//! result per broken condition. An empty list means everything passed;
//! `None` means the check itself could not run, which the report treats
//! differently from a clean pass.

use crate::report;
use colored::Colorize;
use nr_lambda_aws::{AwsCli, FILTER_NAME, INGESTION_FUNCTION, provision};
use nr_lambda_core::OperationResult;
use nr_lambda_newrelic::{NerdGraph, NewRelicRegion};

pub struct CheckArgs {
    pub nr_account_id: i64,
    pub linked_account_name: String,
    pub nr_api_key: String,
    pub functions: Vec<String>,
    pub nr_region: NewRelicRegion,
    pub regions: Vec<String>,
}

pub async fn handle(args: CheckArgs) -> anyhow::Result<()> {
    let aws = AwsCli::new();
    let nr = NerdGraph::new(&args.nr_api_key, args.nr_region);
    let regions = super::resolve_regions(&args.regions);

    println!("{}", "Checking the New Relic Lambda setup...".blue().bold());

    let outcome = match run_checks(&aws, &nr, &args, &regions).await {
        Ok(failures) => Some(failures),
        Err(e) => {
            eprintln!("{} {e:#}", "✗".red().bold());
            None
        }
    };

    report::print_check_report(outcome.as_deref());
    Ok(())
}

async fn run_checks(
    aws: &AwsCli,
    nr: &NerdGraph,
    args: &CheckArgs,
    regions: &[String],
) -> anyhow::Result<Vec<OperationResult>> {
    let mut failures = Vec::new();

    // Identity: a linked account under this name must record the AWS
    // account the current credentials belong to.
    let caller = aws.caller_identity().await?;
    if let Some(account) = nr
        .find_linked_account(args.nr_account_id, &args.linked_account_name)
        .await?
        && let Some(external) = account.external_id.as_deref()
        && external != caller.account
    {
        failures.push(OperationResult::failure(
            None,
            None,
            format!(
                "linked account '{}' records AWS account {external}, current credentials belong to {}",
                account.name, caller.account
            ),
        ));
    }

    // Integration role
    let role_name = provision::integration_role_name(args.nr_account_id);
    if aws.get_role(&role_name).await?.is_none() {
        failures.push(OperationResult::failure(
            None,
            None,
            format!("integration role {role_name} not found"),
        ));
    }

    // Log ingestion per region
    for region in regions {
        if aws
            .get_function(INGESTION_FUNCTION, region)
            .await?
            .is_none()
        {
            failures.push(OperationResult::failure(
                Some(INGESTION_FUNCTION),
                Some(region),
                "log-ingestion function not deployed",
            ));
        }
    }

    // Named functions and their subscription filters
    for region in regions {
        for function in &args.functions {
            match aws.get_function(function, region).await? {
                None => failures.push(OperationResult::failure(
                    Some(function),
                    Some(region),
                    "function does not exist",
                )),
                Some(_) => {
                    let filters = aws.list_subscription_filters(function, region).await?;
                    let streaming = filters
                        .iter()
                        .any(|f| f.filter_name == FILTER_NAME && !f.filter_pattern.is_empty());
                    if !streaming {
                        failures.push(OperationResult::failure(
                            Some(function),
                            Some(region),
                            "log subscription filter not installed",
                        ));
                    }
                }
            }
        }
    }

    // Without a linked account nothing below is checkable.
    let Some(account) = nr
        .find_linked_account(args.nr_account_id, &args.linked_account_name)
        .await?
    else {
        failures.push(OperationResult::failure(
            None,
            None,
            format!("no linked account named '{}'", args.linked_account_name),
        ));
        return Ok(failures);
    };

    if !nr
        .is_lambda_integration_enabled(args.nr_account_id, account.id)
        .await?
    {
        failures.push(OperationResult::failure(
            None,
            None,
            "Lambda integration is not enabled",
        ));
    }

    Ok(failures)
}
