//! Transactional load of clean observations.
//!
//! One run is one transaction: teams and both fact tables commit together
//! or not at all.

use std::collections::HashMap;
use std::path::Path;

use rusqlite::{params, Connection, TransactionBehavior};
use tracing::{debug, info, warn};

use super::schema::StatsStore;
use super::{Result, StoreError};
use crate::models::{Category, CleanObservation};

/// Where a loader is in its run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LoadState {
    Uninitialized,
    SchemaReady,
    Loading,
    Committed(LoadReport),
    /// The transaction was rolled back; the store is as it was at
    /// `SchemaReady`.
    Aborted,
}

impl LoadState {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Uninitialized => "uninitialized",
            Self::SchemaReady => "schema ready",
            Self::Loading => "loading",
            Self::Committed(_) => "committed",
            Self::Aborted => "aborted",
        }
    }
}

/// Rows written by one committed run.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct LoadReport {
    /// Team rows created by this run.
    pub teams: usize,
    pub batting: usize,
    pub pitching: usize,
}

/// Loads clean observations into a freshly created store.
pub struct Loader {
    store: Option<StatsStore>,
    state: LoadState,
}

impl Default for Loader {
    fn default() -> Self {
        Self::new()
    }
}

impl Loader {
    pub fn new() -> Self {
        Self {
            store: None,
            state: LoadState::Uninitialized,
        }
    }

    pub fn state(&self) -> &LoadState {
        &self.state
    }

    pub fn store(&self) -> Option<&StatsStore> {
        self.store.as_ref()
    }

    /// Schema phase. See [`StatsStore::create`] for how `confirm` gates an
    /// existing store.
    pub fn prepare(&mut self, db_path: &Path, confirm: impl FnOnce(&Path) -> bool) -> Result<()> {
        self.expect_state(LoadState::Uninitialized)?;
        self.store = Some(StatsStore::create(db_path, confirm)?);
        self.state = LoadState::SchemaReady;
        Ok(())
    }

    /// Insert phase. Rows are written in input order.
    pub fn load(&mut self, rows: &[CleanObservation]) -> Result<LoadReport> {
        self.expect_state(LoadState::SchemaReady)?;
        let Some(store) = self.store.as_ref() else {
            return Err(StoreError::InvalidState {
                expected: LoadState::SchemaReady.as_str(),
                found: self.state.as_str(),
            });
        };
        let mut conn = store.connect()?;

        self.state = LoadState::Loading;
        match insert_all(&mut conn, rows) {
            Ok(report) => {
                info!(
                    "Loaded {} batting and {} pitching rows ({} teams)",
                    report.batting, report.pitching, report.teams
                );
                self.state = LoadState::Committed(report);
                Ok(report)
            }
            Err(e) => {
                warn!("Load failed, rolled back: {}", e);
                self.state = LoadState::Aborted;
                Err(StoreError::LoadAborted(e))
            }
        }
    }

    fn expect_state(&self, expected: LoadState) -> Result<()> {
        if self.state == expected {
            Ok(())
        } else {
            Err(StoreError::InvalidState {
                expected: expected.as_str(),
                found: self.state.as_str(),
            })
        }
    }
}

/// Insert every row inside one transaction. Dropping the transaction on an
/// early return rolls it back.
fn insert_all(
    conn: &mut Connection,
    rows: &[CleanObservation],
) -> std::result::Result<LoadReport, rusqlite::Error> {
    let tx = conn.transaction_with_behavior(TransactionBehavior::Immediate)?;
    let mut report = LoadReport::default();
    let mut team_ids: HashMap<String, i64> = HashMap::new();

    {
        let mut insert_team =
            tx.prepare("INSERT INTO teams (name) VALUES (?1) ON CONFLICT(name) DO NOTHING")?;
        let mut select_team = tx.prepare("SELECT id FROM teams WHERE name = ?1")?;
        let mut insert_batting = tx.prepare(&insert_fact_sql(Category::Batting))?;
        let mut insert_pitching = tx.prepare(&insert_fact_sql(Category::Pitching))?;

        for row in rows {
            let team_id = match team_ids.get(&row.team) {
                Some(&id) => id,
                None => {
                    report.teams += insert_team.execute(params![row.team])?;
                    let id: i64 = select_team.query_row(params![row.team], |r| r.get(0))?;
                    team_ids.insert(row.team.clone(), id);
                    id
                }
            };

            let insert_fact = match row.category() {
                Category::Batting => {
                    report.batting += 1;
                    &mut insert_batting
                }
                Category::Pitching => {
                    report.pitching += 1;
                    &mut insert_pitching
                }
            };
            insert_fact.execute(params![
                row.period,
                row.player,
                team_id,
                row.stat.label(),
                row.value
            ])?;
        }
    }

    tx.commit()?;
    debug!("Committed {} fact rows", report.batting + report.pitching);
    Ok(report)
}

fn insert_fact_sql(category: Category) -> String {
    format!(
        "INSERT INTO {} (year, name, team_id, stat, value) VALUES (?1, ?2, ?3, ?4, ?5)",
        category.table_name()
    )
}
