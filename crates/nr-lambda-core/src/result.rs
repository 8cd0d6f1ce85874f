//! Outcome records collected by the workflows

use serde::{Deserialize, Serialize};

/// Outcome of a single provisioning or verification action.
///
/// `function` and `region` attribute the action when it applied to a
/// specific Lambda function or AWS region; workflow-level actions carry
/// neither. `error` is present exactly when `failed` is set.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OperationResult {
    /// Lambda function the action applied to, if any
    pub function: Option<String>,

    /// AWS region the action applied to, if any
    pub region: Option<String>,

    /// Whether the action failed
    pub failed: bool,

    /// Error message, present iff `failed`
    pub error: Option<String>,
}

impl OperationResult {
    pub fn success(function: Option<&str>, region: Option<&str>) -> Self {
        Self {
            function: function.map(String::from),
            region: region.map(String::from),
            failed: false,
            error: None,
        }
    }

    pub fn failure(function: Option<&str>, region: Option<&str>, error: impl Into<String>) -> Self {
        Self {
            function: function.map(String::from),
            region: region.map(String::from),
            failed: true,
            error: Some(error.into()),
        }
    }
}

/// Ordered collection of results for one workflow run.
///
/// Results keep insertion order; order matters only for display.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RunSummary {
    results: Vec<OperationResult>,
}

impl RunSummary {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, result: OperationResult) {
        self.results.push(result);
    }

    pub fn add_success(&mut self, function: Option<&str>, region: Option<&str>) {
        self.push(OperationResult::success(function, region));
    }

    pub fn add_failure(
        &mut self,
        function: Option<&str>,
        region: Option<&str>,
        error: impl Into<String>,
    ) {
        self.push(OperationResult::failure(function, region, error));
    }

    pub fn is_success(&self) -> bool {
        !self.results.iter().any(|r| r.failed)
    }

    pub fn results(&self) -> &[OperationResult] {
        &self.results
    }

    pub fn succeeded(&self) -> usize {
        self.results.iter().filter(|r| !r.failed).count()
    }

    pub fn failures(&self) -> impl Iterator<Item = &OperationResult> {
        self.results.iter().filter(|r| r.failed)
    }
}
