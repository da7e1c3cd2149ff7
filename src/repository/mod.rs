//! Relational store for league-leader statistics.
//!
//! SQLite via rusqlite. `teams` is a dimension table; each statistic
//! category has its own fact table referencing it.

mod loader;
mod queries;
mod schema;

use std::path::{Path, PathBuf};

use rusqlite::Connection;
use thiserror::Error;

pub use loader::{LoadReport, LoadState, Loader};
pub use queries::{PlayerBest, TeamLeaderCount, YearLeader, YearValue};
pub use schema::{StatsStore, StoreCounts};

/// Errors from the statistics store.
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("Database error: {0}")]
    Sqlite(#[from] rusqlite::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Store already exists at {0}; recreate it to load again")]
    StoreExists(PathBuf),

    #[error("No store at {0}; run an import first")]
    NotFound(PathBuf),

    #[error("Loader is {found}, expected {expected}")]
    InvalidState {
        expected: &'static str,
        found: &'static str,
    },

    #[error("Load rolled back: {0}")]
    LoadAborted(#[source] rusqlite::Error),
}

pub type Result<T> = std::result::Result<T, StoreError>;

/// Open a connection with the pragmas every store connection uses.
pub fn connect(db_path: &Path) -> Result<Connection> {
    let conn = Connection::open(db_path)?;
    conn.execute_batch(
        r#"
        PRAGMA foreign_keys = ON;
        PRAGMA busy_timeout = 5000;
        "#,
    )?;
    Ok(conn)
}
