//! Report formatting for workflow results
//!
//! Two report styles: an action summary for the mutating workflows, and
//! a status-check report that distinguishes "ran and found nothing" from
//! "could not even run". Formatting is plain text; the CLI adds color.

use crate::result::{OperationResult, RunSummary};

/// One display line for a result: attribution plus the error, if any.
pub fn describe(result: &OperationResult) -> String {
    let subject = match (result.function.as_deref(), result.region.as_deref()) {
        (Some(function), Some(region)) => format!("{function} ({region})"),
        (Some(function), None) => function.to_string(),
        (None, Some(region)) => region.to_string(),
        (None, None) => "setup".to_string(),
    };

    match result.error.as_deref() {
        Some(error) => format!("{subject}: {error}"),
        None => subject,
    }
}

/// Headline for the action-summary style.
pub fn action_headline(summary: &RunSummary) -> String {
    let total = summary.results().len();
    let failed = total - summary.succeeded();
    if failed == 0 {
        format!("{total} actions completed")
    } else {
        format!("{} actions completed, {failed} failed", summary.succeeded())
    }
}

/// Headline for the status-check style. `None` means the check itself
/// could not run, which is reported differently from zero findings.
pub fn check_headline(outcome: Option<&[OperationResult]>) -> String {
    match outcome {
        None => "status check could not be completed".to_string(),
        Some([]) => "everything checks out".to_string(),
        Some(failures) => format!("{} problems found", failures.len()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn describe_attributes_function_and_region() {
        let result = OperationResult::failure(Some("f1"), Some("us-east-1"), "does not exist");
        assert_eq!(describe(&result), "f1 (us-east-1): does not exist");
    }

    #[test]
    fn describe_without_attribution() {
        let result = OperationResult::failure(None, None, "license key fetch failed");
        assert_eq!(describe(&result), "setup: license key fetch failed");

        let ok = OperationResult::success(None, Some("eu-west-1"));
        assert_eq!(describe(&ok), "eu-west-1");
    }

    #[test]
    fn action_headline_counts_failures() {
        let mut summary = RunSummary::new();
        summary.add_success(None, None);
        summary.add_failure(Some("f"), Some("us-east-1"), "x");
        assert_eq!(action_headline(&summary), "1 actions completed, 1 failed");

        let mut clean = RunSummary::new();
        clean.add_success(None, None);
        assert_eq!(action_headline(&clean), "1 actions completed");
    }

    #[test]
    fn check_headline_distinguishes_missing_from_empty() {
        assert_eq!(check_headline(None), "status check could not be completed");
        assert_eq!(check_headline(Some(&[])), "everything checks out");

        let failures = [OperationResult::failure(None, None, "role missing")];
        assert_eq!(check_headline(Some(&failures)), "1 problems found");
    }
}
