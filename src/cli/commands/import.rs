//! Import command: flat files into the store.

use anyhow::Context;
use console::style;

use crate::cli::helpers::confirm_recreate;
use crate::config::Settings;
use crate::repository::StoreError;
use crate::services::{import_flat_files, FileCounts, ImportError};

/// Clean and load the flat files. Without `yes`, recreating an existing
/// store asks first; declining leaves it untouched.
pub fn cmd_import(settings: &Settings, yes: bool) -> anyhow::Result<()> {
    let db_path = settings.database_path();
    println!(
        "{} Importing {} into {}",
        style("→").cyan(),
        settings.data_dir.display(),
        db_path.display()
    );

    let result = import_flat_files(&settings.data_dir, &db_path, |path| {
        yes || confirm_recreate(path)
    });

    let summary = match result {
        Ok(summary) => summary,
        Err(ImportError::Store(StoreError::StoreExists(_))) => {
            println!("{} Cancelled; store left unchanged", style("!").yellow());
            return Ok(());
        }
        Err(e) => return Err(e).context("import failed; store holds no rows from this run"),
    };

    print_counts("batting", &summary.batting);
    print_counts("pitching", &summary.pitching);
    println!(
        "{} Loaded {} batting and {} pitching rows, {} teams",
        style("✓").green(),
        summary.load.batting,
        summary.load.pitching,
        summary.load.teams
    );
    Ok(())
}

fn print_counts(label: &str, counts: &FileCounts) {
    println!(
        "  {:<9} {} read, {} kept ({} unparseable, {} duplicates, {} skipped)",
        label, counts.read, counts.kept, counts.dropped, counts.duplicates, counts.skipped
    );
}
