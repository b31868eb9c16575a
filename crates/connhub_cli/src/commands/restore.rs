//! Restore command implementation.

use connhub_storage::{restore_names, RestoreOutcome};
use std::path::Path;

/// Runs the restore command.
pub fn run(dir: &Path) -> Result<(), Box<dyn std::error::Error>> {
    println!("Restoring file names in {:?}", dir);
    println!();

    let outcomes = restore_names(dir)?;
    let summary = summarize(&outcomes);
    for outcome in &outcomes {
        match outcome {
            RestoreOutcome::Renamed { from, to } => println!("  {from} -> {to}"),
            RestoreOutcome::Skipped { name, reason } => println!("  skipped {name}: {reason}"),
            RestoreOutcome::Failed { name, error } => println!("  failed {name}: {error}"),
        }
    }

    println!();
    println!(
        "Renamed: {}, skipped: {}, failed: {}",
        summary.renamed, summary.skipped, summary.failed
    );
    if summary.failed == 0 {
        Ok(())
    } else {
        Err(format!("{} file(s) could not be renamed", summary.failed).into())
    }
}

/// Outcome counts.
#[derive(Debug, Default, PartialEq, Eq)]
pub struct RestoreSummary {
    /// Entries renamed.
    pub renamed: usize,
    /// Entries left alone.
    pub skipped: usize,
    /// Entries whose rename failed.
    pub failed: usize,
}

fn summarize(outcomes: &[RestoreOutcome]) -> RestoreSummary {
    let mut summary = RestoreSummary::default();
    for outcome in outcomes {
        match outcome {
            RestoreOutcome::Renamed { .. } => summary.renamed += 1,
            RestoreOutcome::Skipped { .. } => summary.skipped += 1,
            RestoreOutcome::Failed { .. } => summary.failed += 1,
        }
    }
    summary
}
