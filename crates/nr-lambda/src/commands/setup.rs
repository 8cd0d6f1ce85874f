//! Full integration setup workflow
//!
//! Phases, in order: license key, identity validation, per-region log
//! ingestion, integration role, account link, Lambda integration.
//! Per-region ingestion failures are recorded and do not stop the later
//! phases; a failure anywhere else aborts the rest of the workflow and
//! is recorded as a single unattributed result.

use crate::report;
use colored::Colorize;
use nr_lambda_aws::{AwsCli, INGESTION_FUNCTION, IngestionOutcome, provision};
use nr_lambda_core::RunSummary;
use nr_lambda_newrelic::{LinkedAccount, NerdGraph, NewRelicRegion};

pub struct SetupArgs {
    pub nr_account_id: i64,
    pub linked_account_name: String,
    pub nr_api_key: String,
    pub policy_name: String,
    pub nr_region: NewRelicRegion,
    pub regions: Vec<String>,
}

pub async fn handle(args: SetupArgs) -> anyhow::Result<()> {
    let aws = AwsCli::new();
    let nr = NerdGraph::new(&args.nr_api_key, args.nr_region);
    let regions = super::resolve_regions(&args.regions);

    println!(
        "{}",
        "Setting up New Relic AWS Lambda monitoring...".blue().bold()
    );

    let mut summary = RunSummary::new();
    if let Err(e) = run_phases(&aws, &nr, &args, &regions, &mut summary).await {
        eprintln!("{} {e:#}", "✗".red().bold());
        summary.add_failure(None, None, format!("{e:#}"));
    }

    report::print_action_summary(&summary);
    Ok(())
}

async fn run_phases(
    aws: &AwsCli,
    nr: &NerdGraph,
    args: &SetupArgs,
    regions: &[String],
    summary: &mut RunSummary,
) -> anyhow::Result<()> {
    // Nothing downstream can proceed without the license key.
    println!("{}", "Fetching the account license key...".blue());
    let license_key = nr.get_license_key(args.nr_account_id).await?;
    println!("  {} license key fetched", "✓".green());

    // An account already linked under this name must point at the AWS
    // account the current credentials belong to.
    let caller = aws.caller_identity().await?;
    if let Some(account) = nr
        .find_linked_account(args.nr_account_id, &args.linked_account_name)
        .await?
    {
        validate_external_id(&account, &caller.account)?;
    }

    // Per-region log ingestion. Failures are reported per region and
    // never block the account-level phases below.
    for region in regions {
        println!(
            "{}",
            format!("Setting up log ingestion in {region}...").blue()
        );
        match provision::ensure_log_ingestion(aws, region, &license_key).await {
            Ok(IngestionOutcome::Created) => {
                println!("  {} {INGESTION_FUNCTION} deployed", "✓".green());
                summary.add_success(Some(INGESTION_FUNCTION), Some(region));
            }
            Ok(IngestionOutcome::AlreadyExists) => {
                println!("  {} {INGESTION_FUNCTION} already deployed", "✓".green());
                summary.add_success(Some(INGESTION_FUNCTION), Some(region));
            }
            Err(e) => {
                eprintln!("  {} {region}: {e}", "⚠".yellow());
                summary.add_failure(Some(INGESTION_FUNCTION), Some(region), e.to_string());
            }
        }
    }

    println!("{}", "Creating the integration role...".blue());
    let role =
        provision::ensure_integration_role(aws, args.nr_account_id, &args.policy_name).await?;
    println!("  {} {}", "✓".green(), role.arn);
    summary.add_success(None, None);

    println!("{}", "Linking the AWS account...".blue());
    let account = match nr
        .find_linked_account(args.nr_account_id, &args.linked_account_name)
        .await?
    {
        Some(existing) => {
            println!(
                "  {} account already linked as '{}' (id {})",
                "✓".green(),
                existing.name,
                existing.id
            );
            existing
        }
        None => {
            let created = nr
                .link_account(args.nr_account_id, &args.linked_account_name, &role.arn)
                .await?;
            println!(
                "  {} linked '{}' (id {})",
                "✓".green(),
                created.name,
                created.id
            );
            created
        }
    };
    summary.add_success(None, None);

    println!("{}", "Enabling the Lambda integration...".blue());
    if nr
        .is_lambda_integration_enabled(args.nr_account_id, account.id)
        .await?
    {
        println!("  {} Lambda integration already enabled", "✓".green());
    } else {
        let integrations = nr
            .enable_lambda_integration(args.nr_account_id, account.id)
            .await?;
        let ids: Vec<String> = integrations.iter().map(|i| i.id.to_string()).collect();
        println!(
            "  {} Lambda integration enabled (id {})",
            "✓".green(),
            ids.join(", ")
        );
    }
    summary.add_success(None, None);

    Ok(())
}

fn validate_external_id(account: &LinkedAccount, caller_account: &str) -> anyhow::Result<()> {
    match account.external_id.as_deref() {
        Some(external) if external == caller_account => Ok(()),
        None => Ok(()),
        Some(external) => anyhow::bail!(
            "linked account '{}' records AWS account {external}, but the current \
             credentials belong to {caller_account}. Switch AWS credentials or pick a \
             different --linked-account-name. See \
             https://docs.newrelic.com/docs/serverless-function-monitoring/aws-lambda-monitoring/troubleshooting/",
            account.name
        ),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn linked(name: &str, external_id: Option<&str>) -> LinkedAccount {
        LinkedAccount {
            id: 1,
            name: name.to_string(),
            auth_label: None,
            created_at: None,
            external_id: external_id.map(String::from),
        }
    }

    #[test]
    fn matching_external_id_passes() {
        let account = linked("prod", Some("123456789012"));
        assert!(validate_external_id(&account, "123456789012").is_ok());
    }

    #[test]
    fn mismatched_external_id_is_fatal() {
        let account = linked("prod", Some("999999999999"));
        let err = validate_external_id(&account, "123456789012").unwrap_err();
        assert!(err.to_string().contains("999999999999"));
        assert!(err.to_string().contains("123456789012"));
    }

    #[test]
    fn missing_external_id_is_not_compared() {
        let account = linked("prod", None);
        assert!(validate_external_id(&account, "123456789012").is_ok());
    }
}
