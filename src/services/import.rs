//! Import of the crawl's flat files into the store.

use std::path::Path;

use thiserror::Error;
use tracing::info;

use super::cleaner::{clean, CleanReport};
use crate::models::Category;
use crate::repository::{LoadReport, Loader, StoreError};
use crate::storage::{read_observations, FlatFileError};

#[derive(Debug, Error)]
pub enum ImportError {
    #[error(transparent)]
    FlatFile(#[from] FlatFileError),

    #[error(transparent)]
    Store(#[from] StoreError),
}

/// Per-file cleaning counts.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct FileCounts {
    pub read: usize,
    /// Unreadable rows and rows with an unknown or foreign statistic.
    pub skipped: usize,
    pub dropped: usize,
    pub duplicates: usize,
    pub kept: usize,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ImportSummary {
    pub batting: FileCounts,
    pub pitching: FileCounts,
    pub load: LoadReport,
}

/// Read and clean both category files from `data_dir`, then load them into
/// a fresh store at `db_path`.
///
/// Nothing touches the store until both files have been read and cleaned.
/// `confirm` gates recreating an existing store.
pub fn import_flat_files(
    data_dir: &Path,
    db_path: &Path,
    confirm: impl FnOnce(&Path) -> bool,
) -> Result<ImportSummary, ImportError> {
    let mut summary = ImportSummary::default();
    let mut rows = Vec::new();

    for category in Category::ALL {
        let path = data_dir.join(category.file_name());
        let file = read_observations(&path, category)?;
        let read = file.rows.len();
        let CleanReport {
            rows: clean_rows,
            dropped,
            duplicates,
        } = clean(file.rows);

        info!(
            "{}: {} rows before cleaning, {} after",
            path.display(),
            read,
            clean_rows.len()
        );

        let counts = FileCounts {
            read,
            skipped: file.skipped,
            dropped,
            duplicates,
            kept: clean_rows.len(),
        };
        match category {
            Category::Batting => summary.batting = counts,
            Category::Pitching => summary.pitching = counts,
        }
        rows.extend(clean_rows);
    }

    let mut loader = Loader::new();
    loader.prepare(db_path, confirm)?;
    summary.load = loader.load(&rows)?;
    Ok(summary)
}
