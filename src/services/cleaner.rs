//! Value coercion and deduplication between the crawl and the load.
//!
//! A row survives when its year parses as an integer and its value as a
//! finite decimal number. Rows that fail are dropped and counted, never
//! reported as errors. Exact duplicates (compared on the coerced values)
//! collapse to their first occurrence, so output order follows input order.

use std::collections::HashSet;

use tracing::debug;

use crate::models::{CleanObservation, RawObservation, Stat};

/// Output of one cleaning pass.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct CleanReport {
    pub rows: Vec<CleanObservation>,
    /// Rows whose year or value did not parse.
    pub dropped: usize,
    /// Rows removed as exact duplicates of an earlier row.
    pub duplicates: usize,
}

/// Identity of a clean row. Values compare numerically; `-0.0` and `0.0`
/// are the same value.
#[derive(Debug, PartialEq, Eq, Hash)]
struct RowKey {
    period: i32,
    stat: Stat,
    player: String,
    team: String,
    value_bits: u64,
}

impl RowKey {
    fn of(row: &CleanObservation) -> Self {
        let value = if row.value == 0.0 { 0.0 } else { row.value };
        Self {
            period: row.period,
            stat: row.stat,
            player: row.player.clone(),
            team: row.team.clone(),
            value_bits: value.to_bits(),
        }
    }
}

/// Coerce a raw value. Only finite decimals are accepted.
pub fn parse_value(raw: &str) -> Option<f64> {
    raw.trim().parse::<f64>().ok().filter(|v| v.is_finite())
}

fn coerce(row: RawObservation) -> Option<CleanObservation> {
    let period = row.period.trim().parse::<i32>().ok()?;
    let value = parse_value(&row.raw_value)?;
    Some(CleanObservation {
        period,
        stat: row.stat,
        player: row.player.trim().to_string(),
        team: row.team.trim().to_string(),
        value,
    })
}

/// Clean a batch of raw observations.
pub fn clean(rows: impl IntoIterator<Item = RawObservation>) -> CleanReport {
    let mut report = CleanReport::default();
    let mut seen = HashSet::new();

    for raw in rows {
        let Some(row) = coerce(raw) else {
            report.dropped += 1;
            continue;
        };
        if seen.insert(RowKey::of(&row)) {
            report.rows.push(row);
        } else {
            report.duplicates += 1;
        }
    }

    debug!(
        "Cleaned {} rows ({} dropped, {} duplicates)",
        report.rows.len(),
        report.dropped,
        report.duplicates
    );
    report
}
