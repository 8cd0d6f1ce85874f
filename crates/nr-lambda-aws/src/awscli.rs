//! aws CLI wrapper
//!
//! Wraps the `aws` CLI for IAM, CloudFormation, Lambda and CloudWatch
//! Logs operations. Every invocation forces `--output json` and captures
//! stdout and stderr combined; a nonzero exit is not an error here —
//! callers interpret the output through the not-found marker table.

use crate::error::{AwsError, Result};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::process::Stdio;
use std::sync::Arc;
use tokio::process::Command;

/// Marker substrings the AWS CLI prints when a resource does not exist.
///
/// The only place that tracks the CLI's error vocabulary: a match means
/// "resource absent", everything else on a nonzero exit is a failure.
const NOT_FOUND_MARKERS: &[&str] = &[
    // iam get-role
    "NoSuchEntity",
    // lambda get-function, logs describe-subscription-filters
    "ResourceNotFoundException",
    // cloudformation describe-stacks on a missing stack
    "ValidationError",
];

/// Exit status and combined stdout/stderr of one invocation.
#[derive(Debug, Clone)]
pub struct CommandOutput {
    pub code: i32,
    pub text: String,
}

impl CommandOutput {
    pub fn success(&self) -> bool {
        self.code == 0
    }

    /// Whether the output carries a recognized not-found marker.
    pub fn resource_absent(&self) -> bool {
        NOT_FOUND_MARKERS.iter().any(|m| self.text.contains(m))
    }
}

/// Execution seam for the `aws` binary. Tests install scripted runners.
#[async_trait]
pub trait CommandRunner: Send + Sync {
    async fn run(&self, args: &[String]) -> std::io::Result<CommandOutput>;
}

/// Production runner; shells out to `aws`.
pub struct ShellRunner;

#[async_trait]
impl CommandRunner for ShellRunner {
    async fn run(&self, args: &[String]) -> std::io::Result<CommandOutput> {
        let output = Command::new("aws")
            .args(args)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .output()
            .await?;

        let mut text = String::from_utf8_lossy(&output.stdout).into_owned();
        text.push_str(&String::from_utf8_lossy(&output.stderr));

        Ok(CommandOutput {
            code: output.status.code().unwrap_or(-1),
            text,
        })
    }
}

/// AWS CLI wrapper
pub struct AwsCli {
    runner: Arc<dyn CommandRunner>,
}

impl Default for AwsCli {
    fn default() -> Self {
        Self::new()
    }
}

impl AwsCli {
    pub fn new() -> Self {
        Self {
            runner: Arc::new(ShellRunner),
        }
    }

    pub fn with_runner(runner: Arc<dyn CommandRunner>) -> Self {
        Self { runner }
    }

    /// Run an aws subcommand with `--output json` appended and return the
    /// exit status with combined output. Only a spawn failure is an error.
    async fn run(&self, args: &[&str]) -> Result<CommandOutput> {
        let mut full: Vec<String> = args.iter().map(|s| s.to_string()).collect();
        full.push("--output".to_string());
        full.push("json".to_string());

        tracing::debug!("Running: aws {}", full.join(" "));

        let output = self.runner.run(&full).await.map_err(|e| {
            if e.kind() == std::io::ErrorKind::NotFound {
                AwsError::AwsCliNotFound
            } else {
                AwsError::IoError(e)
            }
        })?;

        tracing::debug!(code = output.code, "aws output: {}", output.text.trim_end());

        Ok(output)
    }

    /// Look up an IAM role by name, `None` when it does not exist.
    pub async fn get_role(&self, role_name: &str) -> Result<Option<Role>> {
        let output = self
            .run(&["iam", "get-role", "--role-name", role_name])
            .await?;

        if output.success() {
            let decoded: GetRole = serde_json::from_str(&output.text)?;
            return Ok(Some(decoded.role));
        }
        if output.resource_absent() {
            return Ok(None);
        }
        Err(AwsError::CommandFailed(output.text))
    }

    /// Look up a Lambda function in a region, `None` when it does not exist.
    pub async fn get_function(&self, name: &str, region: &str) -> Result<Option<FunctionConfig>> {
        let output = self
            .run(&[
                "lambda",
                "get-function",
                "--function-name",
                name,
                "--region",
                region,
            ])
            .await?;

        if output.success() {
            let decoded: GetFunction = serde_json::from_str(&output.text)?;
            return Ok(Some(decoded.configuration));
        }
        if output.resource_absent() {
            return Ok(None);
        }
        Err(AwsError::CommandFailed(output.text))
    }

    /// Status string of a CloudFormation stack, `None` when no such stack.
    pub async fn get_stack_status(
        &self,
        stack_name: &str,
        region: Option<&str>,
    ) -> Result<Option<String>> {
        let mut args = vec![
            "cloudformation",
            "describe-stacks",
            "--stack-name",
            stack_name,
        ];
        if let Some(region) = region {
            args.push("--region");
            args.push(region);
        }

        let output = self.run(&args).await?;

        if output.success() {
            let decoded: DescribeStacks = serde_json::from_str(&output.text)?;
            return Ok(decoded.stacks.into_iter().next().map(|s| s.stack_status));
        }
        if output.resource_absent() {
            return Ok(None);
        }
        Err(AwsError::CommandFailed(output.text))
    }

    /// Subscription filters on a function's log group. A missing log
    /// group counts as "no filters", not an error.
    pub async fn list_subscription_filters(
        &self,
        function: &str,
        region: &str,
    ) -> Result<Vec<SubscriptionFilter>> {
        let log_group = log_group_name(function);
        let output = self
            .run(&[
                "logs",
                "describe-subscription-filters",
                "--log-group-name",
                &log_group,
                "--region",
                region,
            ])
            .await?;

        if output.success() {
            let decoded: DescribeSubscriptionFilters = serde_json::from_str(&output.text)?;
            return Ok(decoded.subscription_filters);
        }
        if output.resource_absent() {
            return Ok(Vec::new());
        }
        Err(AwsError::CommandFailed(output.text))
    }

    /// Identity of the current AWS credentials.
    pub async fn caller_identity(&self) -> Result<CallerIdentity> {
        let output = self.run(&["sts", "get-caller-identity"]).await?;

        if !output.success() {
            return Err(AwsError::CommandFailed(output.text));
        }
        Ok(serde_json::from_str(&output.text)?)
    }

    /// Create a CloudFormation stack from a template file.
    pub async fn create_stack(
        &self,
        stack_name: &str,
        template: &str,
        parameters: &[(&str, &str)],
        region: Option<&str>,
    ) -> Result<()> {
        let template_body = format!("file://{template}");
        let parameter_args: Vec<String> = parameters
            .iter()
            .map(|(key, value)| format!("ParameterKey={key},ParameterValue={value}"))
            .collect();

        let mut args = vec![
            "cloudformation",
            "create-stack",
            "--stack-name",
            stack_name,
            "--template-body",
            &template_body,
            "--capabilities",
            "CAPABILITY_NAMED_IAM",
        ];
        if !parameter_args.is_empty() {
            args.push("--parameters");
            args.extend(parameter_args.iter().map(String::as_str));
        }
        if let Some(region) = region {
            args.push("--region");
            args.push(region);
        }

        let output = self.run(&args).await?;
        if !output.success() {
            return Err(AwsError::CommandFailed(output.text));
        }
        Ok(())
    }

    /// Block until stack creation completes. The poll loop lives inside
    /// the CLI's own `wait` subcommand.
    pub async fn wait_stack_create_complete(
        &self,
        stack_name: &str,
        region: Option<&str>,
    ) -> Result<()> {
        let mut args = vec![
            "cloudformation",
            "wait",
            "stack-create-complete",
            "--stack-name",
            stack_name,
        ];
        if let Some(region) = region {
            args.push("--region");
            args.push(region);
        }

        let output = self.run(&args).await?;
        if !output.success() {
            return Err(AwsError::CommandFailed(output.text));
        }
        Ok(())
    }

    /// Put a subscription filter on a function's log group.
    pub async fn put_subscription_filter(
        &self,
        function: &str,
        region: &str,
        filter_name: &str,
        filter_pattern: &str,
        destination_arn: &str,
    ) -> Result<()> {
        let log_group = log_group_name(function);
        let output = self
            .run(&[
                "logs",
                "put-subscription-filter",
                "--log-group-name",
                &log_group,
                "--filter-name",
                filter_name,
                "--filter-pattern",
                filter_pattern,
                "--destination-arn",
                destination_arn,
                "--region",
                region,
            ])
            .await?;

        if !output.success() {
            return Err(AwsError::CommandFailed(output.text));
        }
        Ok(())
    }

    /// Delete a subscription filter from a function's log group.
    pub async fn delete_subscription_filter(
        &self,
        function: &str,
        region: &str,
        filter_name: &str,
    ) -> Result<()> {
        let log_group = log_group_name(function);
        let output = self
            .run(&[
                "logs",
                "delete-subscription-filter",
                "--log-group-name",
                &log_group,
                "--filter-name",
                filter_name,
                "--region",
                region,
            ])
            .await?;

        if !output.success() {
            return Err(AwsError::CommandFailed(output.text));
        }
        Ok(())
    }
}

fn log_group_name(function: &str) -> String {
    format!("/aws/lambda/{function}")
}

#[derive(Debug, Deserialize)]
struct GetRole {
    #[serde(rename = "Role")]
    role: Role,
}

/// IAM role as decoded from `iam get-role`
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Role {
    #[serde(rename = "RoleName")]
    pub role_name: String,

    #[serde(rename = "Arn")]
    pub arn: String,
}

#[derive(Debug, Deserialize)]
struct GetFunction {
    #[serde(rename = "Configuration")]
    configuration: FunctionConfig,
}

/// Lambda function as decoded from `lambda get-function`
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FunctionConfig {
    #[serde(rename = "FunctionName")]
    pub function_name: String,

    #[serde(rename = "FunctionArn")]
    pub function_arn: String,
}

#[derive(Debug, Deserialize)]
struct DescribeStacks {
    #[serde(rename = "Stacks")]
    stacks: Vec<Stack>,
}

#[derive(Debug, Clone, Deserialize)]
struct Stack {
    #[serde(rename = "StackStatus")]
    stack_status: String,
}

#[derive(Debug, Deserialize)]
struct DescribeSubscriptionFilters {
    #[serde(rename = "subscriptionFilters")]
    subscription_filters: Vec<SubscriptionFilter>,
}

/// CloudWatch Logs subscription filter. The logs API returns camelCase.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SubscriptionFilter {
    #[serde(rename = "filterName")]
    pub filter_name: String,

    #[serde(rename = "filterPattern", default)]
    pub filter_pattern: String,

    #[serde(rename = "destinationArn")]
    pub destination_arn: Option<String>,
}

/// Identity as decoded from `sts get-caller-identity`
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CallerIdentity {
    #[serde(rename = "Account")]
    pub account: String,

    #[serde(rename = "Arn")]
    pub arn: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn not_found_markers_mean_absent() {
        for marker in ["NoSuchEntity", "ResourceNotFoundException", "ValidationError"] {
            let output = CommandOutput {
                code: 254,
                text: format!("An error occurred ({marker}) when calling the operation"),
            };
            assert!(output.resource_absent(), "{marker} should read as absent");
        }
    }

    #[test]
    fn other_failures_are_not_absent() {
        let output = CommandOutput {
            code: 255,
            text: "An error occurred (AccessDenied) when calling the GetRole operation".into(),
        };
        assert!(!output.resource_absent());
        assert!(!output.success());
    }

    #[test]
    fn decodes_subscription_filters() {
        let body = r#"{"subscriptionFilters": [{"filterName": "NewRelicLogStreaming",
            "filterPattern": "", "destinationArn": "arn:aws:lambda:us-east-1:1:function:ingest"}]}"#;
        let decoded: DescribeSubscriptionFilters = serde_json::from_str(body).unwrap();
        assert_eq!(decoded.subscription_filters.len(), 1);
        assert!(decoded.subscription_filters[0].filter_pattern.is_empty());
    }

    #[test]
    fn decodes_caller_identity() {
        let body = r#"{"UserId": "AIDA...", "Account": "123456789012",
            "Arn": "arn:aws:iam::123456789012:user/ops"}"#;
        let identity: CallerIdentity = serde_json::from_str(body).unwrap();
        assert_eq!(identity.account, "123456789012");
    }
}
