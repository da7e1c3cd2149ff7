//! Page source configuration types.

use serde::{Deserialize, Serialize};

/// Page fetching configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BrowserEngineConfig {
    /// How pages are fetched.
    #[serde(default)]
    pub engine: PageEngine,

    /// Run in headless mode (default: true).
    /// Set to false for debugging or if headless detection is an issue.
    #[serde(default = "default_headless")]
    pub headless: bool,

    /// Proxy server URL (e.g., "socks5://127.0.0.1:1080").
    #[serde(default)]
    pub proxy: Option<String>,

    /// Page load timeout in seconds.
    #[serde(default = "default_timeout")]
    pub timeout: u64,

    /// User agent sent with every request.
    #[serde(default = "default_user_agent")]
    pub user_agent: String,

    /// When set, the settle wait polls for this CSS selector and ends as soon
    /// as it appears, instead of sleeping for the full settle duration.
    #[serde(default)]
    pub wait_for_selector: Option<String>,

    /// Additional Chrome arguments.
    #[serde(default)]
    pub chrome_args: Vec<String>,

    /// Remote Chrome DevTools URL (e.g., "ws://localhost:9222").
    /// If set, connects to existing browser instead of launching one.
    #[serde(default)]
    pub remote_url: Option<String>,
}

impl Default for BrowserEngineConfig {
    fn default() -> Self {
        Self {
            engine: PageEngine::default(),
            headless: default_headless(),
            proxy: None,
            timeout: default_timeout(),
            user_agent: default_user_agent(),
            wait_for_selector: None,
            chrome_args: Vec::new(),
            remote_url: None,
        }
    }
}

pub fn default_headless() -> bool {
    true
}

pub fn default_timeout() -> u64 {
    30
}

pub fn default_user_agent() -> String {
    "Mozilla/5.0".to_string()
}

/// Page fetching engines.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, Default, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum PageEngine {
    /// Headless Chrome via chromiumoxide; runs client-side scripts (default).
    #[default]
    Browser,

    /// Plain HTTP requests; for sources that render on the server.
    Http,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_from_empty_toml() {
        let config: BrowserEngineConfig = toml::from_str("").unwrap();
        assert_eq!(config.engine, PageEngine::Browser);
        assert!(config.headless);
        assert_eq!(config.timeout, 30);
        assert_eq!(config.user_agent, "Mozilla/5.0");
    }

    #[test]
    fn test_http_engine() {
        let config: BrowserEngineConfig = toml::from_str("engine = \"http\"").unwrap();
        assert_eq!(config.engine, PageEngine::Http);
    }
}
