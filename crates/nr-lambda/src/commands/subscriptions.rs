//! Log subscription install/uninstall workflows
//!
//! Both walk regions in the outer loop and functions in the inner loop,
//! produce exactly one result per (function, region) pair, and never
//! stop early — a failed pair does not affect the others.

use crate::report;
use colored::Colorize;
use nr_lambda_aws::{AwsCli, RemovalOutcome, SubscriptionOutcome, provision};
use nr_lambda_core::RunSummary;

pub async fn handle_install(functions: &[String], regions: &[String]) -> anyhow::Result<()> {
    let aws = AwsCli::new();
    let regions = super::resolve_regions(regions);

    println!("{}", "Installing log subscriptions...".blue().bold());
    let summary = install(&aws, functions, &regions).await;
    report::print_action_summary(&summary);
    Ok(())
}

pub async fn handle_uninstall(functions: &[String], regions: &[String]) -> anyhow::Result<()> {
    let aws = AwsCli::new();
    let regions = super::resolve_regions(regions);

    println!("{}", "Removing log subscriptions...".blue().bold());
    let summary = uninstall(&aws, functions, &regions).await;
    report::print_action_summary(&summary);
    Ok(())
}

pub(crate) async fn install(
    aws: &AwsCli,
    functions: &[String],
    regions: &[String],
) -> RunSummary {
    let mut summary = RunSummary::new();
    for region in regions {
        for function in functions {
            match install_one(aws, function, region).await {
                Ok(message) => {
                    println!("  {} {function} ({region}): {message}", "✓".green());
                    summary.add_success(Some(function), Some(region));
                }
                Err(e) => {
                    eprintln!("  {} {function} ({region}): {e:#}", "✗".red());
                    summary.add_failure(Some(function), Some(region), format!("{e:#}"));
                }
            }
        }
    }
    summary
}

async fn install_one(aws: &AwsCli, function: &str, region: &str) -> anyhow::Result<String> {
    if aws.get_function(function, region).await?.is_none() {
        anyhow::bail!("function {function} does not exist in {region}");
    }

    let message = match provision::ensure_log_subscription(aws, function, region).await? {
        SubscriptionOutcome::Created => "subscription filter installed".to_string(),
        SubscriptionOutcome::Recreated => "legacy filter replaced".to_string(),
        SubscriptionOutcome::AlreadyConfigured => "already configured".to_string(),
        SubscriptionOutcome::SkippedForeignFilter(name) => {
            eprintln!(
                "  {} {function} ({region}): filter '{name}' is not managed by nr-lambda, leaving it untouched",
                "⚠".yellow()
            );
            format!("skipped, unrelated filter '{name}' present")
        }
    };
    Ok(message)
}

pub(crate) async fn uninstall(
    aws: &AwsCli,
    functions: &[String],
    regions: &[String],
) -> RunSummary {
    let mut summary = RunSummary::new();
    for region in regions {
        for function in functions {
            match uninstall_one(aws, function, region).await {
                Ok(message) => {
                    println!("  {} {function} ({region}): {message}", "✓".green());
                    summary.add_success(Some(function), Some(region));
                }
                Err(e) => {
                    eprintln!("  {} {function} ({region}): {e:#}", "✗".red());
                    summary.add_failure(Some(function), Some(region), format!("{e:#}"));
                }
            }
        }
    }
    summary
}

async fn uninstall_one(aws: &AwsCli, function: &str, region: &str) -> anyhow::Result<String> {
    if aws.get_function(function, region).await?.is_none() {
        anyhow::bail!("function {function} does not exist in {region}");
    }

    let message = match provision::remove_log_subscription(aws, function, region).await? {
        RemovalOutcome::Removed => "subscription filter removed".to_string(),
        RemovalOutcome::NotInstalled => "no subscription filter installed".to_string(),
        RemovalOutcome::SkippedForeignFilter(name) => {
            eprintln!(
                "  {} {function} ({region}): filter '{name}' is not managed by nr-lambda, leaving it untouched",
                "⚠".yellow()
            );
            format!("skipped, unrelated filter '{name}' present")
        }
    };
    Ok(message)
}
