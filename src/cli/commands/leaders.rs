//! Non-interactive printers over the store's read queries.

use console::style;
use serde::Serialize;

use crate::config::Settings;
use crate::models::{Category, Stat};
use crate::repository::StatsStore;

fn open(settings: &Settings) -> anyhow::Result<StatsStore> {
    Ok(StatsStore::open(&settings.database_path())?)
}

fn print_json<T: Serialize>(rows: &[T]) -> anyhow::Result<()> {
    println!("{}", serde_json::to_string_pretty(rows)?);
    Ok(())
}

pub fn cmd_teams(
    settings: &Settings,
    category: Category,
    limit: usize,
    json: bool,
) -> anyhow::Result<()> {
    let rows = open(settings)?.top_teams_by_leader_count(category, limit)?;
    if json {
        return print_json(&rows);
    }

    println!("{}", style(format!("Top {} teams", category)).bold());
    for (i, row) in rows.iter().enumerate() {
        println!("{:>3}. {:<30} {}", i + 1, row.team, row.count);
    }
    Ok(())
}

pub fn cmd_players(settings: &Settings, stat: Stat, limit: usize, json: bool) -> anyhow::Result<()> {
    let rows = open(settings)?.top_players_by_stat(stat.category(), stat, limit)?;
    if json {
        return print_json(&rows);
    }

    println!("{}", style(format!("Top players by {}", stat)).bold());
    for (i, row) in rows.iter().enumerate() {
        println!("{:>3}. {:<30} {}", i + 1, row.player, row.value);
    }
    Ok(())
}

pub fn cmd_year(settings: &Settings, year: i32, json: bool) -> anyhow::Result<()> {
    let rows = open(settings)?.leaders_for_year(year)?;
    if json {
        return print_json(&rows);
    }

    if rows.is_empty() {
        println!("{} No leaders recorded for {}", style("!").yellow(), year);
        return Ok(());
    }
    println!("{}", style(format!("{} league leaders", year)).bold());
    for row in &rows {
        println!(
            "  {:<9} {:<14} {:<25} {:<20} {}",
            row.role, row.stat, row.player, row.team, row.value
        );
    }
    Ok(())
}

pub fn cmd_trend(settings: &Settings, stat: Stat, json: bool) -> anyhow::Result<()> {
    let rows = open(settings)?.yearly_trend(stat.category(), stat)?;
    if json {
        return print_json(&rows);
    }

    println!("{}", style(format!("{} by year", stat)).bold());
    for row in &rows {
        println!("  {}  {}", row.year, row.value);
    }
    Ok(())
}
