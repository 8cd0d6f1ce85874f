//! AWS wrapper error types

use thiserror::Error;

#[derive(Error, Debug)]
pub enum AwsError {
    #[error(
        "aws CLI not found. Please install: https://docs.aws.amazon.com/cli/latest/userguide/getting-started-install.html"
    )]
    AwsCliNotFound,

    #[error("aws command failed: {0}")]
    CommandFailed(String),

    #[error(
        "CloudFormation stack {stack} already exists in state {status}. \
         Delete the stack manually and run the command again. \
         See https://docs.newrelic.com/docs/serverless-function-monitoring/aws-lambda-monitoring/troubleshooting/"
    )]
    StackConflict { stack: String, status: String },

    #[error("role {0} did not appear after stack creation")]
    RoleMissingAfterCreate(String),

    #[error(
        "log-ingestion function {function} not found in {region}. \
         Run `nr-lambda setup` for this region first."
    )]
    IngestionFunctionMissing { function: String, region: String },

    #[error("JSON parse error: {0}")]
    JsonError(#[from] serde_json::Error),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),
}

pub type Result<T> = std::result::Result<T, AwsError>;
