//! Statistic categories and the fixed set of league-leader statistics we track.

use serde::{Deserialize, Serialize};

/// Statistic category. Each category is persisted in its own fact table and
/// its own flat file.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Category {
    Batting,
    Pitching,
}

impl Category {
    pub const ALL: [Category; 2] = [Category::Batting, Category::Pitching];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Batting => "batting",
            Self::Pitching => "pitching",
        }
    }

    pub fn from_str(s: &str) -> Option<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "batting" | "hitting" => Some(Self::Batting),
            "pitching" => Some(Self::Pitching),
            _ => None,
        }
    }

    /// Display label used as the `role` column in year lookups.
    pub fn role(&self) -> &'static str {
        match self {
            Self::Batting => "Batting",
            Self::Pitching => "Pitching",
        }
    }

    /// Fact table holding this category's observations.
    pub fn table_name(&self) -> &'static str {
        match self {
            Self::Batting => "batting_stats",
            Self::Pitching => "pitching_stats",
        }
    }

    /// Flat file this category is exported to.
    pub fn file_name(&self) -> &'static str {
        match self {
            Self::Batting => "batting_stats.csv",
            Self::Pitching => "pitching_stats.csv",
        }
    }

    /// Statistics extracted for this category, in extraction order.
    pub fn stats(&self) -> &'static [Stat] {
        match self {
            Self::Batting => &[Stat::BaseOnBalls, Stat::HomeRuns],
            Self::Pitching => &[Stat::Wins, Stat::Era],
        }
    }
}

impl std::fmt::Display for Category {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A league-leader statistic. The label doubles as the link text searched for
/// on year pages and as the `stat` column in storage.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Stat {
    HomeRuns,
    BaseOnBalls,
    Wins,
    Era,
}

impl Stat {
    pub const ALL: [Stat; 4] = [Stat::BaseOnBalls, Stat::HomeRuns, Stat::Wins, Stat::Era];

    pub fn label(&self) -> &'static str {
        match self {
            Self::HomeRuns => "Home Runs",
            Self::BaseOnBalls => "Base on Balls",
            Self::Wins => "Wins",
            Self::Era => "ERA",
        }
    }

    pub fn from_label(s: &str) -> Option<Self> {
        let s = s.trim();
        Self::ALL
            .into_iter()
            .find(|stat| stat.label().eq_ignore_ascii_case(s))
    }

    pub fn category(&self) -> Category {
        match self {
            Self::HomeRuns | Self::BaseOnBalls => Category::Batting,
            Self::Wins | Self::Era => Category::Pitching,
        }
    }
}

impl std::fmt::Display for Stat {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.label())
    }
}
