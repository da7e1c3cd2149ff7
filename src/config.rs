//! Configuration management using the prefer crate.
//!
//! A config file is discovered with `prefer` (or given with `--config`) and
//! parsed with serde by extension. [`Settings`] is the resolved runtime view:
//! defaults, then the config file, then command-line overrides.

use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::scrapers::{BrowserEngineConfig, CrawlSettings, IndexCrawler};

pub const DEFAULT_INDEX_URL: &str = "https://www.baseball-almanac.com/yearmenu.shtml";
pub const DEFAULT_BASE_URL: &str = "https://www.baseball-almanac.com/yearly/";
pub const DEFAULT_ANCHOR_LABEL: &str = "The History of the American League";
pub const DEFAULT_DATABASE: &str = "db/baseball_stats.db";

const DEFAULT_INDEX_SETTLE_MS: u64 = 5000;
const DEFAULT_PAGE_SETTLE_MS: u64 = 3000;

/// Errors loading an explicitly requested config file.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config file {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to parse config file {path}: {message}")]
    Parse { path: PathBuf, message: String },
}

/// `[crawl]` section.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CrawlConfig {
    /// Page listing every season.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub index_url: Option<String>,
    /// Year page links are resolved against this URL.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub base_url: Option<String>,
    /// Label of the index row preceding the year links.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub anchor_label: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub index_settle_ms: Option<u64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub page_settle_ms: Option<u64>,
    /// Pause between year pages, on top of the settle wait.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub request_delay_ms: Option<u64>,
}

/// Configuration file structure.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    /// Directory the flat files are written to and read from.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub data_dir: Option<String>,
    /// Database path, relative to the data directory unless absolute.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub database: Option<String>,
    #[serde(default)]
    pub crawl: CrawlConfig,
    #[serde(default)]
    pub browser: BrowserEngineConfig,
    /// Path to the config file this was loaded from (not serialized).
    #[serde(skip)]
    pub source_path: Option<PathBuf>,
}

impl Config {
    /// Discover a config file with prefer. Falls back to defaults when none
    /// is found or the discovered file cannot be parsed.
    pub async fn load() -> Self {
        match prefer::load("almanac").await {
            Ok(pref_config) => {
                if let Some(path) = pref_config.source_path() {
                    match Self::load_from_path(path).await {
                        Ok(config) => config,
                        Err(e) => {
                            tracing::warn!("{}; using defaults", e);
                            Self::default()
                        }
                    }
                } else {
                    Self::default()
                }
            }
            Err(_) => Self::default(),
        }
    }

    /// Load configuration from a specific file path.
    /// TOML, YAML and JSON are chosen by file extension.
    pub async fn load_from_path(path: &Path) -> Result<Self, ConfigError> {
        let contents = tokio::fs::read_to_string(path)
            .await
            .map_err(|source| ConfigError::Read {
                path: path.to_path_buf(),
                source,
            })?;

        let mut config = Self::parse(&contents, path)?;
        config.source_path = Some(path.to_path_buf());
        Ok(config)
    }

    fn parse(contents: &str, path: &Path) -> Result<Self, ConfigError> {
        let ext = path.extension().and_then(|e| e.to_str()).unwrap_or("json");
        let parse_error = |message: String| ConfigError::Parse {
            path: path.to_path_buf(),
            message,
        };

        match ext {
            "toml" => toml::from_str(contents).map_err(|e| parse_error(e.to_string())),
            "yaml" | "yml" => serde_yaml::from_str(contents).map_err(|e| parse_error(e.to_string())),
            _ => serde_json::from_str(contents).map_err(|e| parse_error(e.to_string())),
        }
    }

    /// Directory relative paths resolve against: the config file's parent.
    pub fn base_dir(&self) -> Option<PathBuf> {
        self.source_path
            .as_ref()
            .and_then(|p| p.parent().map(|p| p.to_path_buf()))
    }

    /// Absolute paths are kept, `~` is expanded, anything else is joined
    /// onto `base_dir`.
    pub fn resolve_path(&self, path_str: &str, base_dir: &Path) -> PathBuf {
        resolve_path(path_str, base_dir)
    }

    pub fn apply_to_settings(&self, settings: &mut Settings, base_dir: &Path) {
        if let Some(ref data_dir) = self.data_dir {
            settings.data_dir = self.resolve_path(data_dir, base_dir);
        }
        if let Some(ref database) = self.database {
            settings.database = database.clone();
        }

        let crawl = &self.crawl;
        if let Some(ref url) = crawl.index_url {
            settings.index_url = url.clone();
        }
        if let Some(ref url) = crawl.base_url {
            settings.base_url = url.clone();
        }
        if let Some(ref label) = crawl.anchor_label {
            settings.anchor_label = label.clone();
        }
        if let Some(ms) = crawl.index_settle_ms {
            settings.index_settle = Duration::from_millis(ms);
        }
        if let Some(ms) = crawl.page_settle_ms {
            settings.page_settle = Duration::from_millis(ms);
        }
        if let Some(ms) = crawl.request_delay_ms {
            settings.request_delay = Duration::from_millis(ms);
        }

        settings.browser = self.browser.clone();
    }
}

fn resolve_path(path_str: &str, base_dir: &Path) -> PathBuf {
    let expanded = shellexpand::tilde(path_str);
    let path = Path::new(expanded.as_ref());

    if path.is_absolute() {
        path.to_path_buf()
    } else {
        base_dir.join(path)
    }
}

/// Application settings.
#[derive(Debug, Clone)]
pub struct Settings {
    /// Flat-file directory.
    pub data_dir: PathBuf,
    /// Database path; relative paths resolve against `data_dir`.
    pub database: String,
    pub index_url: String,
    pub base_url: String,
    pub anchor_label: String,
    pub index_settle: Duration,
    pub page_settle: Duration,
    pub request_delay: Duration,
    pub browser: BrowserEngineConfig,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            data_dir: PathBuf::from("."),
            database: DEFAULT_DATABASE.to_string(),
            index_url: DEFAULT_INDEX_URL.to_string(),
            base_url: DEFAULT_BASE_URL.to_string(),
            anchor_label: DEFAULT_ANCHOR_LABEL.to_string(),
            index_settle: Duration::from_millis(DEFAULT_INDEX_SETTLE_MS),
            page_settle: Duration::from_millis(DEFAULT_PAGE_SETTLE_MS),
            request_delay: Duration::ZERO,
            browser: BrowserEngineConfig::default(),
        }
    }
}

impl Settings {
    pub fn database_path(&self) -> PathBuf {
        resolve_path(&self.database, &self.data_dir)
    }

    pub fn index_crawler(&self) -> Result<IndexCrawler, url::ParseError> {
        IndexCrawler::new(self.anchor_label.clone(), &self.base_url)
    }

    pub fn crawl_settings(&self, limit: usize) -> CrawlSettings {
        CrawlSettings {
            index_url: self.index_url.clone(),
            index_settle: self.index_settle,
            page_settle: self.page_settle,
            request_delay: self.request_delay,
            limit,
        }
    }
}

/// Options for loading settings.
#[derive(Debug, Clone, Default)]
pub struct LoadOptions {
    /// Explicit config file path (overrides auto-discovery).
    pub config_path: Option<PathBuf>,
    /// Data directory override (`--data-dir` / `ALMANAC_DATA_DIR`).
    pub data_dir: Option<PathBuf>,
}

/// Resolve settings: defaults, then the config file, then overrides.
///
/// An explicit config path must load; a discovered one falls back to
/// defaults.
pub async fn load_settings(options: LoadOptions) -> Result<(Settings, Config), ConfigError> {
    let config = match options.config_path {
        Some(ref path) => Config::load_from_path(path).await?,
        None => Config::load().await,
    };

    let cwd = std::env::current_dir().unwrap_or_else(|_| PathBuf::from("."));
    let base_dir = config.base_dir().unwrap_or_else(|| cwd.clone());

    let mut settings = Settings::default();
    config.apply_to_settings(&mut settings, &base_dir);

    if let Some(data_dir) = options.data_dir {
        settings.data_dir = resolve_path(&data_dir.to_string_lossy(), &cwd);
    }

    if let Some(ref path) = config.source_path {
        tracing::debug!("Using config {}", path.display());
    }
    Ok((settings, config))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::scrapers::PageEngine;

    #[test]
    fn test_defaults() {
        let settings = Settings::default();
        assert_eq!(settings.index_url, DEFAULT_INDEX_URL);
        assert_eq!(settings.page_settle, Duration::from_secs(3));
        assert_eq!(settings.index_settle, Duration::from_secs(5));
        assert_eq!(
            settings.database_path(),
            PathBuf::from("./db/baseball_stats.db")
        );
    }

    #[test]
    fn test_parse_by_extension() {
        let toml = r#"
            data_dir = "out"

            [crawl]
            page_settle_ms = 250

            [browser]
            engine = "http"
        "#;
        let config = Config::parse(toml, Path::new("almanac.toml")).unwrap();
        assert_eq!(config.crawl.page_settle_ms, Some(250));
        assert_eq!(config.browser.engine, PageEngine::Http);

        let yaml = "database: /var/lib/almanac.db\ncrawl:\n  request_delay_ms: 1000\n";
        let config = Config::parse(yaml, Path::new("almanac.yml")).unwrap();
        assert_eq!(config.database.as_deref(), Some("/var/lib/almanac.db"));
        assert_eq!(config.crawl.request_delay_ms, Some(1000));

        let json = r#"{"crawl": {"anchor_label": "The History of the National League"}}"#;
        let config = Config::parse(json, Path::new("almanac.json")).unwrap();
        assert_eq!(
            config.crawl.anchor_label.as_deref(),
            Some("The History of the National League")
        );

        assert!(Config::parse("crawl = [", Path::new("bad.toml")).is_err());
    }

    #[test]
    fn test_apply_resolves_relative_to_config_dir() {
        let config = Config {
            data_dir: Some("stats".to_string()),
            database: Some("/tmp/league.db".to_string()),
            crawl: CrawlConfig {
                page_settle_ms: Some(10),
                ..Default::default()
            },
            ..Default::default()
        };

        let mut settings = Settings::default();
        config.apply_to_settings(&mut settings, Path::new("/etc/almanac"));
        assert_eq!(settings.data_dir, PathBuf::from("/etc/almanac/stats"));
        assert_eq!(settings.database_path(), PathBuf::from("/tmp/league.db"));
        assert_eq!(settings.page_settle, Duration::from_millis(10));
        assert_eq!(settings.index_settle, Duration::from_secs(5));
    }

    #[tokio::test]
    async fn test_explicit_config_path() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("almanac.toml");
        std::fs::write(&path, "database = \"league.db\"\n").unwrap();

        let (settings, config) = load_settings(LoadOptions {
            config_path: Some(path.clone()),
            data_dir: Some(dir.path().join("data")),
        })
        .await
        .unwrap();

        assert_eq!(config.source_path, Some(path));
        assert_eq!(settings.data_dir, dir.path().join("data"));
        assert_eq!(settings.database_path(), dir.path().join("data").join("league.db"));
    }

    #[tokio::test]
    async fn test_missing_explicit_config_is_error() {
        let dir = tempfile::tempdir().unwrap();
        let result = load_settings(LoadOptions {
            config_path: Some(dir.path().join("absent.toml")),
            data_dir: None,
        })
        .await;
        assert!(matches!(result, Err(ConfigError::Read { .. })));
    }
}
