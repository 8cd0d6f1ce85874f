//! Terminal rendering of workflow reports

use colored::Colorize;
use nr_lambda_core::{OperationResult, RunSummary, report};

/// Action summary: headline plus one line per failure.
pub fn print_action_summary(summary: &RunSummary) {
    println!();
    let headline = report::action_headline(summary);
    if summary.is_success() {
        println!("{} {}", "✓".green().bold(), headline.green().bold());
    } else {
        println!("{} {}", "✗".red().bold(), headline.yellow().bold());
        for failure in summary.failures() {
            println!("  {} {}", "✗".red(), report::describe(failure));
        }
    }
}

/// Status-check report: all clear, the failure list, or "could not run".
pub fn print_check_report(outcome: Option<&[OperationResult]>) {
    println!();
    let headline = report::check_headline(outcome);
    match outcome {
        None => println!("{} {}", "✗".red().bold(), headline.red().bold()),
        Some([]) => println!("{} {}", "✓".green().bold(), headline.green().bold()),
        Some(failures) => {
            println!("{} {}", "✗".red().bold(), headline.red().bold());
            for failure in failures {
                println!("  {} {}", "•".red(), report::describe(failure));
            }
        }
    }
}
