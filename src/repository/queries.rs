//! Read queries consumed by dashboards and the `leaders` command.

use rusqlite::params;
use serde::Serialize;

use super::schema::StatsStore;
use super::Result;
use crate::models::{Category, Stat};

/// A team and how many leader rows it holds in one category.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TeamLeaderCount {
    pub team: String,
    pub count: u64,
}

/// A player's best value for one statistic.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PlayerBest {
    pub player: String,
    pub value: f64,
}

/// One leader row of a given year.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct YearLeader {
    /// `Batting` or `Pitching`.
    pub role: String,
    pub stat: String,
    pub player: String,
    pub team: String,
    pub value: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct YearValue {
    pub year: i32,
    pub value: f64,
}

impl StatsStore {
    /// Teams ranked by number of leader rows, ties by name.
    pub fn top_teams_by_leader_count(
        &self,
        category: Category,
        limit: usize,
    ) -> Result<Vec<TeamLeaderCount>> {
        let conn = self.connect()?;
        let mut stmt = conn.prepare(&format!(
            r#"
            SELECT t.name, COUNT(*) AS leader_count
            FROM {} s
            JOIN teams t ON t.id = s.team_id
            GROUP BY t.id, t.name
            ORDER BY leader_count DESC, t.name ASC
            LIMIT ?1
            "#,
            category.table_name()
        ))?;

        let rows = stmt
            .query_map(params![limit as i64], |row| {
                Ok(TeamLeaderCount {
                    team: row.get(0)?,
                    count: row.get::<_, i64>(1)? as u64,
                })
            })?
            .collect::<std::result::Result<Vec<_>, _>>()?;
        Ok(rows)
    }

    /// Players ranked by their best value for `stat`, one row per player,
    /// ties by name. Empty when `stat` is not a `category` statistic.
    pub fn top_players_by_stat(
        &self,
        category: Category,
        stat: Stat,
        limit: usize,
    ) -> Result<Vec<PlayerBest>> {
        if stat.category() != category {
            return Ok(Vec::new());
        }

        let conn = self.connect()?;
        let mut stmt = conn.prepare(&format!(
            r#"
            SELECT name, MAX(value) AS best
            FROM {}
            WHERE stat = ?1
            GROUP BY name
            ORDER BY best DESC, name ASC
            LIMIT ?2
            "#,
            category.table_name()
        ))?;

        let rows = stmt
            .query_map(params![stat.label(), limit as i64], |row| {
                Ok(PlayerBest {
                    player: row.get(0)?,
                    value: row.get(1)?,
                })
            })?
            .collect::<std::result::Result<Vec<_>, _>>()?;
        Ok(rows)
    }

    /// Every leader row of `year` across both categories, ordered by role
    /// then statistic. A year with no data yields an empty list.
    pub fn leaders_for_year(&self, year: i32) -> Result<Vec<YearLeader>> {
        let conn = self.connect()?;
        let mut stmt = conn.prepare(&format!(
            r#"
            SELECT '{}' AS role, s.stat AS stat, s.name AS player, t.name AS team, s.value AS value
            FROM {} s JOIN teams t ON t.id = s.team_id
            WHERE s.year = ?1
            UNION ALL
            SELECT '{}' AS role, s.stat AS stat, s.name AS player, t.name AS team, s.value AS value
            FROM {} s JOIN teams t ON t.id = s.team_id
            WHERE s.year = ?1
            ORDER BY role, stat, player
            "#,
            Category::Batting.role(),
            Category::Batting.table_name(),
            Category::Pitching.role(),
            Category::Pitching.table_name(),
        ))?;

        let rows = stmt
            .query_map(params![year], |row| {
                Ok(YearLeader {
                    role: row.get(0)?,
                    stat: row.get(1)?,
                    player: row.get(2)?,
                    team: row.get(3)?,
                    value: row.get(4)?,
                })
            })?
            .collect::<std::result::Result<Vec<_>, _>>()?;
        Ok(rows)
    }

    /// Values of `stat` by year, ascending. Empty when `stat` is not a
    /// `category` statistic.
    pub fn yearly_trend(&self, category: Category, stat: Stat) -> Result<Vec<YearValue>> {
        if stat.category() != category {
            return Ok(Vec::new());
        }

        let conn = self.connect()?;
        let mut stmt = conn.prepare(&format!(
            "SELECT year, value FROM {} WHERE stat = ?1 ORDER BY year ASC, id ASC",
            category.table_name()
        ))?;

        let rows = stmt
            .query_map(params![stat.label()], |row| {
                Ok(YearValue {
                    year: row.get(0)?,
                    value: row.get(1)?,
                })
            })?
            .collect::<std::result::Result<Vec<_>, _>>()?;
        Ok(rows)
    }
}
