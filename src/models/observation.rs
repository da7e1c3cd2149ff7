//! Records produced by the crawl and consumed by the import.

use serde::{Deserialize, Serialize};

use super::{Category, Stat};

/// One year page discovered on the index page.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct YearEntry {
    /// Period label as shown in the link text (usually a four digit year).
    pub period: String,
    pub source_url: String,
}

impl YearEntry {
    pub fn new(period: impl Into<String>, source_url: impl Into<String>) -> Self {
        Self {
            period: period.into(),
            source_url: source_url.into(),
        }
    }
}

/// A statistic row as extracted from a year page, before validation.
///
/// `raw_value` is kept as text: malformed markup on the source produces
/// values like `"--"` or `"20*"` that only the cleaner decides about.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RawObservation {
    pub period: String,
    pub stat: Stat,
    pub player: String,
    pub team: String,
    pub raw_value: String,
}

impl RawObservation {
    pub fn category(&self) -> Category {
        self.stat.category()
    }
}

impl From<&CleanObservation> for RawObservation {
    fn from(clean: &CleanObservation) -> Self {
        Self {
            period: clean.period.to_string(),
            stat: clean.stat,
            player: clean.player.clone(),
            team: clean.team.clone(),
            raw_value: clean.value.to_string(),
        }
    }
}

/// Why a year page (or one statistic on it) produced no observation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LoadFailureKind {
    Timeout,
    Transport,
}

impl LoadFailureKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Timeout => "timeout",
            Self::Transport => "transport",
        }
    }
}

/// Reason attached to a defective link.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum DefectReason {
    /// The statistic's row was not on an otherwise loaded page.
    Missing(Stat),
    /// The row was found but had fewer cells than expected.
    Malformed(Stat),
    /// The page itself could not be loaded.
    LoadError(LoadFailureKind),
}

impl std::fmt::Display for DefectReason {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Missing(stat) => write!(f, "missing {}", stat.label()),
            Self::Malformed(stat) => write!(f, "malformed {}", stat.label()),
            Self::LoadError(kind) => write!(f, "load error: {}", kind.as_str()),
        }
    }
}

/// A failure to extract an expected statistic, or to load a page at all.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DefectiveLink {
    pub period: String,
    pub source_url: String,
    pub reason: DefectReason,
}

impl DefectiveLink {
    pub fn new(entry: &YearEntry, reason: DefectReason) -> Self {
        Self {
            period: entry.period.clone(),
            source_url: entry.source_url.clone(),
            reason,
        }
    }

    /// The `URL (Issue)` column of the defect file.
    pub fn url_with_issue(&self) -> String {
        format!("{} ({})", self.source_url, self.reason)
    }
}

/// A validated observation ready to be loaded.
///
/// `value` is always finite.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CleanObservation {
    pub period: i32,
    pub stat: Stat,
    pub player: String,
    pub team: String,
    pub value: f64,
}

impl CleanObservation {
    pub fn category(&self) -> Category {
        self.stat.category()
    }
}
