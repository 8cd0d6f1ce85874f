mod commands;
mod report;

use clap::{Parser, Subcommand};
use nr_lambda_newrelic::NewRelicRegion;

/// Debug log file; every outbound command/query and its raw response is
/// appended here when --debug is set.
const DEBUG_LOG_FILE: &str = "nr-lambda-debug.log";

#[derive(Parser)]
#[command(name = "nr-lambda", version)]
#[command(about = "Set up New Relic AWS Lambda monitoring", long_about = None)]
struct Cli {
    /// Append every outbound command and API call to nr-lambda-debug.log
    #[arg(long, global = true)]
    debug: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Link the AWS account, deploy log ingestion and enable the Lambda integration
    Setup {
        /// New Relic account id
        #[arg(long, env = "NEW_RELIC_ACCOUNT_ID")]
        nr_account_id: i64,
        /// Display name for the linked AWS account
        #[arg(long)]
        linked_account_name: String,
        /// New Relic User API key
        #[arg(long, env = "NEW_RELIC_API_KEY", hide_env_values = true)]
        nr_api_key: String,
        /// IAM policy name created with the integration role
        #[arg(long, default_value = "NewRelicLambdaPolicy")]
        policy_name: String,
        /// New Relic region (us or eu)
        #[arg(long, default_value = "us")]
        nr_region: String,
        /// AWS regions to deploy log ingestion in (default: all supported)
        #[arg(long = "regions", num_args = 1..)]
        regions: Vec<String>,
    },
    /// Manage log subscription filters on Lambda functions
    #[command(subcommand)]
    Subscriptions(SubscriptionsCommands),
    /// Verify an existing setup and list anything broken
    Check {
        /// New Relic account id
        #[arg(long, env = "NEW_RELIC_ACCOUNT_ID")]
        nr_account_id: i64,
        /// Display name of the linked AWS account
        #[arg(long)]
        linked_account_name: String,
        /// New Relic User API key
        #[arg(long, env = "NEW_RELIC_API_KEY", hide_env_values = true)]
        nr_api_key: String,
        /// Lambda function names to check
        #[arg(short = 'f', long = "function", required = true)]
        functions: Vec<String>,
        /// New Relic region (us or eu)
        #[arg(long, default_value = "us")]
        nr_region: String,
        /// AWS regions to check (default: all supported)
        #[arg(long = "regions", num_args = 1..)]
        regions: Vec<String>,
    },
}

#[derive(Subcommand)]
enum SubscriptionsCommands {
    /// Install the managed subscription filter on functions
    Install {
        /// Lambda function names
        #[arg(short = 'f', long = "function", required = true)]
        functions: Vec<String>,
        /// AWS regions to cover (default: all supported)
        #[arg(long = "regions", num_args = 1..)]
        regions: Vec<String>,
    },
    /// Remove the managed subscription filter from functions
    Uninstall {
        /// Lambda function names
        #[arg(short = 'f', long = "function", required = true)]
        functions: Vec<String>,
        /// AWS regions to cover (default: all supported)
        #[arg(long = "regions", num_args = 1..)]
        regions: Vec<String>,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.debug)?;

    match cli.command {
        Commands::Setup {
            nr_account_id,
            linked_account_name,
            nr_api_key,
            policy_name,
            nr_region,
            regions,
        } => {
            let nr_region: NewRelicRegion =
                nr_region.parse().map_err(|e: String| anyhow::anyhow!(e))?;
            commands::setup::handle(commands::setup::SetupArgs {
                nr_account_id,
                linked_account_name,
                nr_api_key,
                policy_name,
                nr_region,
                regions,
            })
            .await
        }
        Commands::Subscriptions(SubscriptionsCommands::Install { functions, regions }) => {
            commands::subscriptions::handle_install(&functions, &regions).await
        }
        Commands::Subscriptions(SubscriptionsCommands::Uninstall { functions, regions }) => {
            commands::subscriptions::handle_uninstall(&functions, &regions).await
        }
        Commands::Check {
            nr_account_id,
            linked_account_name,
            nr_api_key,
            functions,
            nr_region,
            regions,
        } => {
            let nr_region: NewRelicRegion =
                nr_region.parse().map_err(|e: String| anyhow::anyhow!(e))?;
            commands::check::handle(commands::check::CheckArgs {
                nr_account_id,
                linked_account_name,
                nr_api_key,
                functions,
                nr_region,
                regions,
            })
            .await
        }
    }
}

fn init_tracing(debug: bool) -> anyhow::Result<()> {
    if !debug {
        tracing_subscriber::fmt::init();
        return Ok(());
    }

    // Debug runs append to a local file so the full command/response
    // exchange can be attached to a support ticket.
    use std::io::Write;
    let mut file = std::fs::OpenOptions::new()
        .create(true)
        .append(true)
        .open(DEBUG_LOG_FILE)?;
    writeln!(
        file,
        "=== nr-lambda {} invoked at {} ===",
        env!("CARGO_PKG_VERSION"),
        chrono::Local::now().format("%Y-%m-%d %H:%M:%S")
    )?;

    tracing_subscriber::fmt()
        .with_writer(std::sync::Arc::new(file))
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive(tracing::Level::DEBUG.into()),
        )
        .with_ansi(false)
        .init();

    Ok(())
}
