//! Flat-file hand-off between the crawl and the import.
//!
//! The crawl accumulates into an [`ObservationSink`] and writes it out as
//! CSV files with fixed headers; the import reads the observation files back.
//! The two phases may run in separate processes.

use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{debug, info, warn};

use crate::models::{Category, DefectiveLink, RawObservation, Stat, YearEntry};

/// Defect file name.
pub const DEFECTS_FILE: &str = "defective_links.csv";
/// Visited year pages file name.
pub const YEAR_LINKS_FILE: &str = "year_links.csv";

/// Errors reading or writing flat files.
#[derive(Debug, Error)]
pub enum FlatFileError {
    #[error("IO error on {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("CSV error on {path}: {source}")]
    Csv {
        path: PathBuf,
        #[source]
        source: csv::Error,
    },
}

impl FlatFileError {
    fn csv(path: &Path, source: csv::Error) -> Self {
        Self::Csv {
            path: path.to_path_buf(),
            source,
        }
    }
}

/// `Year, Stat, Player, Team, Value` row.
#[derive(Debug, Serialize, Deserialize)]
struct ObservationRecord {
    #[serde(rename = "Year")]
    year: String,
    #[serde(rename = "Stat")]
    stat: String,
    #[serde(rename = "Player")]
    player: String,
    #[serde(rename = "Team")]
    team: String,
    #[serde(rename = "Value")]
    value: String,
}

impl From<&RawObservation> for ObservationRecord {
    fn from(obs: &RawObservation) -> Self {
        Self {
            year: obs.period.clone(),
            stat: obs.stat.label().to_string(),
            player: obs.player.clone(),
            team: obs.team.clone(),
            value: obs.raw_value.clone(),
        }
    }
}

#[derive(Debug, Serialize)]
struct DefectRecord<'a> {
    #[serde(rename = "Year")]
    year: &'a str,
    #[serde(rename = "URL (Issue)")]
    url_issue: String,
}

#[derive(Debug, Serialize)]
struct YearLinkRecord<'a> {
    #[serde(rename = "Year")]
    year: &'a str,
    #[serde(rename = "URL")]
    url: &'a str,
}

/// Crawl-level counts shown at the end of a run.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CrawlSummary {
    pub years: usize,
    pub batting: usize,
    pub pitching: usize,
    pub defects: usize,
}

/// Append-only accumulator for one crawl.
#[derive(Debug, Clone, Default)]
pub struct ObservationSink {
    years: Vec<YearEntry>,
    batting: Vec<RawObservation>,
    pitching: Vec<RawObservation>,
    defects: Vec<DefectiveLink>,
}

impl ObservationSink {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn record_year(&mut self, entry: YearEntry) {
        self.years.push(entry);
    }

    pub fn record_observation(&mut self, obs: RawObservation) {
        match obs.category() {
            Category::Batting => self.batting.push(obs),
            Category::Pitching => self.pitching.push(obs),
        }
    }

    pub fn record_defect(&mut self, defect: DefectiveLink) {
        self.defects.push(defect);
    }

    pub fn years(&self) -> &[YearEntry] {
        &self.years
    }

    pub fn observations(&self, category: Category) -> &[RawObservation] {
        match category {
            Category::Batting => &self.batting,
            Category::Pitching => &self.pitching,
        }
    }

    pub fn defects(&self) -> &[DefectiveLink] {
        &self.defects
    }

    pub fn summary(&self) -> CrawlSummary {
        CrawlSummary {
            years: self.years.len(),
            batting: self.batting.len(),
            pitching: self.pitching.len(),
            defects: self.defects.len(),
        }
    }

    /// Write every collection to `dir`, one CSV per collection, each with a
    /// header row even when empty.
    pub fn write_to(&self, dir: &Path) -> Result<(), FlatFileError> {
        fs::create_dir_all(dir).map_err(|source| FlatFileError::Io {
            path: dir.to_path_buf(),
            source,
        })?;

        for category in Category::ALL {
            let path = dir.join(category.file_name());
            let records = self.observations(category).iter().map(ObservationRecord::from);
            write_records(&path, &["Year", "Stat", "Player", "Team", "Value"], records)?;
        }

        let path = dir.join(DEFECTS_FILE);
        let records = self.defects.iter().map(|d| DefectRecord {
            year: &d.period,
            url_issue: d.url_with_issue(),
        });
        write_records(&path, &["Year", "URL (Issue)"], records)?;

        let path = dir.join(YEAR_LINKS_FILE);
        let records = self.years.iter().map(|y| YearLinkRecord {
            year: &y.period,
            url: &y.source_url,
        });
        write_records(&path, &["Year", "URL"], records)?;

        info!("Wrote crawl output to {}", dir.display());
        Ok(())
    }
}

fn write_records<T: Serialize>(
    path: &Path,
    header: &[&str],
    records: impl Iterator<Item = T>,
) -> Result<(), FlatFileError> {
    let mut writer = csv::WriterBuilder::new()
        .has_headers(false)
        .from_path(path)
        .map_err(|e| FlatFileError::csv(path, e))?;

    writer
        .write_record(header)
        .map_err(|e| FlatFileError::csv(path, e))?;
    let mut count = 0usize;
    for record in records {
        writer
            .serialize(record)
            .map_err(|e| FlatFileError::csv(path, e))?;
        count += 1;
    }
    writer.flush().map_err(|source| FlatFileError::Io {
        path: path.to_path_buf(),
        source,
    })?;

    debug!("Wrote {} rows to {}", count, path.display());
    Ok(())
}

/// Observations read back from a category file.
#[derive(Debug, Clone, Default)]
pub struct ObservationFile {
    pub rows: Vec<RawObservation>,
    /// Rows that could not be read, named an unknown statistic, or named a
    /// statistic of another category.
    pub skipped: usize,
}

/// Read a category's observation file.
pub fn read_observations(path: &Path, category: Category) -> Result<ObservationFile, FlatFileError> {
    let mut reader = csv::ReaderBuilder::new()
        .has_headers(true)
        .flexible(true)
        .from_path(path)
        .map_err(|e| FlatFileError::csv(path, e))?;

    let mut file = ObservationFile::default();
    for (line, record) in reader.deserialize::<ObservationRecord>().enumerate() {
        let record = match record {
            Ok(record) => record,
            Err(e) => {
                warn!("{}: skipping unreadable row {}: {}", path.display(), line + 2, e);
                file.skipped += 1;
                continue;
            }
        };

        match Stat::from_label(&record.stat) {
            Some(stat) if stat.category() == category => file.rows.push(RawObservation {
                period: record.year,
                stat,
                player: record.player,
                team: record.team,
                raw_value: record.value,
            }),
            Some(stat) => {
                warn!(
                    "{}: skipping {} row in {} file",
                    path.display(),
                    stat,
                    category
                );
                file.skipped += 1;
            }
            None => {
                warn!("{}: skipping unknown statistic {:?}", path.display(), record.stat);
                file.skipped += 1;
            }
        }
    }

    Ok(file)
}
