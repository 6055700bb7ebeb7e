//! Turns check outcomes into output and an exit status

use anyhow::Result;
use colored::Colorize;
use std::path::Path;

use hintcheck_engine::{CheckOutcome, ModelOutcome};

/// Print one line per violation and return the run status
pub fn print_violations(outcome: &CheckOutcome) -> i32 {
    for diagnostic in outcome.violations() {
        println!("{}", diagnostic.message);
    }
    outcome.status()
}

/// Write the v1 JSON report
pub fn save_report(outcome: &CheckOutcome, path: &Path) -> Result<()> {
    outcome.to_report().save_to_file(path)?;
    Ok(())
}

/// Per-model summary on stderr (verbose mode)
pub fn print_summary(outcome: &CheckOutcome) {
    eprintln!();
    for result in &outcome.results {
        let marker = match &result.outcome {
            ModelOutcome::NotPartitioned => "skip".dimmed(),
            ModelOutcome::Compliant { .. } => "ok".green(),
            ModelOutcome::Violation(_) => "FAIL".red().bold(),
        };
        eprintln!("  [{}] {}", marker, result.unique_id);
    }

    eprintln!(
        "Checked {} models ({} partitioned), {} violations",
        outcome.results.len(),
        outcome.partitioned_count(),
        outcome.violations().count()
    );
}
