//! Schema shape tests
//!
//! Verifies the tables, columns and foreign keys a freshly created store
//! exposes to downstream consumers.

use std::collections::BTreeMap;

use almanac::repository::StatsStore;
use rusqlite::{Connection, Result as SqliteResult};

#[derive(Debug, Clone, PartialEq, Eq)]
struct ColumnInfo {
    col_type: String,
    not_null: bool,
    primary_key: bool,
}

#[derive(Debug, Clone, PartialEq, Eq)]
struct ForeignKey {
    from: String,
    table: String,
    to: String,
}

/// Extract column definitions per table.
fn extract_tables(conn: &Connection) -> SqliteResult<BTreeMap<String, BTreeMap<String, ColumnInfo>>> {
    let mut tables = BTreeMap::new();

    let mut stmt = conn.prepare(
        "SELECT name FROM sqlite_master WHERE type='table' AND name NOT LIKE 'sqlite_%' ORDER BY name",
    )?;
    let table_names: Vec<String> = stmt
        .query_map([], |row| row.get(0))?
        .collect::<SqliteResult<Vec<_>>>()?;

    for table_name in table_names {
        let mut columns = BTreeMap::new();
        let mut pragma = conn.prepare(&format!("PRAGMA table_info(\"{}\")", table_name))?;
        let column_iter = pragma.query_map([], |row| {
            Ok((
                row.get::<_, String>(1)?,
                ColumnInfo {
                    col_type: row.get::<_, String>(2)?.to_uppercase(),
                    not_null: row.get(3)?,
                    primary_key: row.get::<_, i32>(5)? > 0,
                },
            ))
        })?;
        for col in column_iter {
            let (name, info) = col?;
            columns.insert(name, info);
        }
        tables.insert(table_name, columns);
    }

    Ok(tables)
}

fn extract_foreign_keys(conn: &Connection, table: &str) -> SqliteResult<Vec<ForeignKey>> {
    let mut pragma = conn.prepare(&format!("PRAGMA foreign_key_list(\"{}\")", table))?;
    let keys = pragma
        .query_map([], |row| {
            Ok(ForeignKey {
                table: row.get(2)?,
                from: row.get(3)?,
                to: row.get(4)?,
            })
        })?
        .collect::<SqliteResult<Vec<_>>>()?;
    Ok(keys)
}

fn column(col_type: &str, not_null: bool, primary_key: bool) -> ColumnInfo {
    ColumnInfo {
        col_type: col_type.to_string(),
        not_null,
        primary_key,
    }
}

fn fresh_store() -> (tempfile::TempDir, StatsStore) {
    let dir = tempfile::tempdir().unwrap();
    let store = StatsStore::create(&dir.path().join("stats.db"), |_| true).unwrap();
    (dir, store)
}

#[test]
fn test_store_tables() {
    let (_dir, store) = fresh_store();
    let conn = store.connect().unwrap();
    let tables = extract_tables(&conn).unwrap();

    let names: Vec<&str> = tables.keys().map(String::as_str).collect();
    assert_eq!(names, vec!["batting_stats", "pitching_stats", "teams"]);

    let teams = &tables["teams"];
    assert_eq!(teams["id"], column("INTEGER", false, true));
    assert_eq!(teams["name"], column("TEXT", true, false));
}

#[test]
fn test_fact_tables_share_one_shape() {
    let (_dir, store) = fresh_store();
    let conn = store.connect().unwrap();
    let tables = extract_tables(&conn).unwrap();

    let batting = &tables["batting_stats"];
    assert_eq!(batting, &tables["pitching_stats"]);

    let expected: BTreeMap<String, ColumnInfo> = [
        ("id", column("INTEGER", false, true)),
        ("year", column("INTEGER", true, false)),
        ("name", column("TEXT", true, false)),
        ("team_id", column("INTEGER", true, false)),
        ("stat", column("TEXT", true, false)),
        ("value", column("REAL", true, false)),
    ]
    .into_iter()
    .map(|(k, v)| (k.to_string(), v))
    .collect();
    assert_eq!(batting, &expected);
}

#[test]
fn test_fact_tables_reference_teams() {
    let (_dir, store) = fresh_store();
    let conn = store.connect().unwrap();

    for table in ["batting_stats", "pitching_stats"] {
        let keys = extract_foreign_keys(&conn, table).unwrap();
        assert_eq!(
            keys,
            vec![ForeignKey {
                from: "team_id".to_string(),
                table: "teams".to_string(),
                to: "id".to_string(),
            }],
            "{} foreign keys",
            table
        );
    }
}

#[test]
fn test_team_names_are_unique_and_fks_enforced() {
    let (_dir, store) = fresh_store();
    let conn = store.connect().unwrap();

    conn.execute("INSERT INTO teams (name) VALUES ('Boston')", [])
        .unwrap();
    assert!(conn
        .execute("INSERT INTO teams (name) VALUES ('Boston')", [])
        .is_err());

    let orphan = conn.execute(
        "INSERT INTO batting_stats (year, name, team_id, stat, value) VALUES (1950, 'X', 999, 'Home Runs', 1.0)",
        [],
    );
    assert!(orphan.is_err());
}
