//! Service layer between the crawl output and the store.

pub mod cleaner;
pub mod import;

pub use cleaner::{clean, CleanReport};
pub use import::{import_flat_files, FileCounts, ImportError, ImportSummary};
