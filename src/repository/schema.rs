//! Store creation and recreation.

use std::fs;
use std::path::{Path, PathBuf};

use rusqlite::Connection;
use tracing::{info, warn};

use super::{connect, Result, StoreError};
use crate::models::Category;

const SCHEMA: &str = r#"
    CREATE TABLE IF NOT EXISTS teams (
        id INTEGER PRIMARY KEY,
        name TEXT NOT NULL UNIQUE
    );

    CREATE TABLE IF NOT EXISTS batting_stats (
        id INTEGER PRIMARY KEY AUTOINCREMENT,
        year INTEGER NOT NULL,
        name TEXT NOT NULL,
        team_id INTEGER NOT NULL REFERENCES teams(id),
        stat TEXT NOT NULL,
        value REAL NOT NULL
    );

    CREATE TABLE IF NOT EXISTS pitching_stats (
        id INTEGER PRIMARY KEY AUTOINCREMENT,
        year INTEGER NOT NULL,
        name TEXT NOT NULL,
        team_id INTEGER NOT NULL REFERENCES teams(id),
        stat TEXT NOT NULL,
        value REAL NOT NULL
    );

    CREATE INDEX IF NOT EXISTS idx_batting_year ON batting_stats(year);
    CREATE INDEX IF NOT EXISTS idx_batting_stat ON batting_stats(stat);
    CREATE INDEX IF NOT EXISTS idx_pitching_year ON pitching_stats(year);
    CREATE INDEX IF NOT EXISTS idx_pitching_stat ON pitching_stats(stat);
"#;

/// Row counts per table.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct StoreCounts {
    pub teams: u64,
    pub batting: u64,
    pub pitching: u64,
}

/// Handle to an existing statistics store.
#[derive(Debug, Clone)]
pub struct StatsStore {
    db_path: PathBuf,
}

impl StatsStore {
    /// Open an existing store for reading.
    pub fn open(db_path: &Path) -> Result<Self> {
        if !db_path.exists() {
            return Err(StoreError::NotFound(db_path.to_path_buf()));
        }
        Ok(Self {
            db_path: db_path.to_path_buf(),
        })
    }

    /// Create a fresh store at `db_path`.
    ///
    /// If a store is already there, `confirm` decides whether it is dropped
    /// and recreated. Declining returns [`StoreError::StoreExists`] and
    /// leaves the existing store untouched.
    pub fn create(db_path: &Path, confirm: impl FnOnce(&Path) -> bool) -> Result<Self> {
        if db_path.exists() {
            if !confirm(db_path) {
                return Err(StoreError::StoreExists(db_path.to_path_buf()));
            }
            warn!("Recreating store at {}", db_path.display());
            remove_store_files(db_path)?;
        }

        if let Some(parent) = db_path.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent)?;
            }
        }

        let store = Self {
            db_path: db_path.to_path_buf(),
        };
        let conn = store.connect()?;
        init_schema(&conn)?;
        info!("Created store at {}", db_path.display());
        Ok(store)
    }

    pub fn connect(&self) -> Result<Connection> {
        connect(&self.db_path)
    }

    pub fn database_path(&self) -> &Path {
        &self.db_path
    }

    pub fn counts(&self) -> Result<StoreCounts> {
        let conn = self.connect()?;
        let count = |table: &str| -> Result<u64> {
            let n: i64 =
                conn.query_row(&format!("SELECT COUNT(*) FROM {}", table), [], |row| {
                    row.get(0)
                })?;
            Ok(n as u64)
        };
        Ok(StoreCounts {
            teams: count("teams")?,
            batting: count(Category::Batting.table_name())?,
            pitching: count(Category::Pitching.table_name())?,
        })
    }
}

pub(crate) fn init_schema(conn: &Connection) -> Result<()> {
    conn.execute_batch(SCHEMA)?;
    Ok(())
}

/// Remove the database file and its WAL side files.
fn remove_store_files(db_path: &Path) -> Result<()> {
    fs::remove_file(db_path)?;
    for suffix in ["-wal", "-shm"] {
        let mut side = db_path.as_os_str().to_owned();
        side.push(suffix);
        match fs::remove_file(PathBuf::from(side)) {
            Ok(()) => {}
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {}
            Err(e) => return Err(e.into()),
        }
    }
    Ok(())
}
