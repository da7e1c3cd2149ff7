//! Browser-backed page source for client-rendered pages.
//!
//! Uses chromiumoxide (CDP). One browser and one tab are kept for the whole
//! crawl so the source sees a single, sequential visitor.

mod config;

pub use config::{BrowserEngineConfig, PageEngine};

#[cfg(feature = "browser")]
use std::time::Duration;

#[cfg(feature = "browser")]
use async_trait::async_trait;
#[cfg(feature = "browser")]
use chromiumoxide::cdp::browser_protocol::network::SetUserAgentOverrideParams;
#[cfg(feature = "browser")]
use chromiumoxide::cdp::browser_protocol::page::NavigateParams;
#[cfg(feature = "browser")]
use chromiumoxide::{Browser, BrowserConfig, Page};
#[cfg(feature = "browser")]
use futures::StreamExt;
#[cfg(feature = "browser")]
use tokio::task::JoinHandle;
#[cfg(feature = "browser")]
use tracing::{debug, info, warn};

#[cfg(feature = "browser")]
use super::source::{LoadError, PageSource, RenderedPage};

/// How often the settle wait checks for `wait_for_selector`.
#[cfg(feature = "browser")]
const SELECTOR_POLL_INTERVAL: Duration = Duration::from_millis(250);

/// Headless Chrome page source.
#[cfg(feature = "browser")]
pub struct BrowserPageSource {
    config: BrowserEngineConfig,
    browser: Option<Browser>,
    page: Option<Page>,
    handler: Option<JoinHandle<()>>,
}

#[cfg(feature = "browser")]
impl BrowserPageSource {
    /// Common Chrome executable paths to check.
    const CHROME_PATHS: &'static [&'static str] = &[
        // Linux
        "/usr/bin/google-chrome",
        "/usr/bin/google-chrome-stable",
        "/usr/bin/chromium",
        "/usr/bin/chromium-browser",
        "/snap/bin/chromium",
        // macOS
        "/Applications/Google Chrome.app/Contents/MacOS/Google Chrome",
        "/Applications/Chromium.app/Contents/MacOS/Chromium",
        // Common install locations
        "/opt/google/chrome/google-chrome",
    ];

    pub fn new(config: BrowserEngineConfig) -> Self {
        Self {
            config,
            browser: None,
            page: None,
            handler: None,
        }
    }

    fn find_chrome() -> Option<std::path::PathBuf> {
        for path in Self::CHROME_PATHS {
            let p = std::path::Path::new(path);
            if p.exists() {
                info!("Found Chrome at: {}", path);
                return Some(p.to_path_buf());
            }
        }

        for cmd in &[
            "google-chrome",
            "google-chrome-stable",
            "chromium",
            "chromium-browser",
        ] {
            if let Ok(output) = std::process::Command::new("which").arg(cmd).output() {
                if output.status.success() {
                    let path = String::from_utf8_lossy(&output.stdout).trim().to_string();
                    if !path.is_empty() {
                        info!("Found Chrome in PATH: {}", path);
                        return Some(std::path::PathBuf::from(path));
                    }
                }
            }
        }

        None
    }

    /// Resolve the DevTools WebSocket URL from the `/json/version` endpoint.
    async fn remote_ws_url(remote_url: &str) -> anyhow::Result<String> {
        let http_url = remote_url
            .replace("ws://", "http://")
            .replace("wss://", "https://");
        let version_url = format!("{}/json/version", http_url.trim_end_matches('/'));

        let resp: serde_json::Value = reqwest::Client::new()
            .get(&version_url)
            .send()
            .await?
            .json()
            .await?;

        resp.get("webSocketDebuggerUrl")
            .and_then(|v| v.as_str())
            .map(str::to_string)
            .ok_or_else(|| anyhow::anyhow!("No webSocketDebuggerUrl in response"))
    }

    /// Launch or connect to the browser and open the shared tab, once.
    async fn ensure_page(&mut self, url: &str) -> Result<Page, LoadError> {
        if let Some(page) = &self.page {
            return Ok(page.clone());
        }

        let (browser, mut handler) = if let Some(remote_url) = self.config.remote_url.clone() {
            info!("Connecting to remote browser at {}", remote_url);
            let ws_url = Self::remote_ws_url(&remote_url)
                .await
                .map_err(|e| LoadError::transport(url, format!("browser connect: {}", e)))?;
            Browser::connect(ws_url)
                .await
                .map_err(|e| LoadError::transport(url, format!("browser connect: {}", e)))?
        } else {
            let chrome_path = Self::find_chrome().ok_or_else(|| {
                LoadError::transport(url, "Chrome/Chromium not found; install it or set remote_url")
            })?;
            info!("Launching browser (headless={})", self.config.headless);

            let mut builder = BrowserConfig::builder().chrome_executable(chrome_path);
            if !self.config.headless {
                builder = builder.with_head();
            }
            if let Some(ref proxy) = self.config.proxy {
                builder = builder.arg(format!("--proxy-server={}", proxy));
            }
            builder = builder
                .arg("--disable-dev-shm-usage")
                .arg("--no-first-run")
                .arg("--no-default-browser-check")
                .arg("--no-sandbox") // Often needed for headless in containers/restricted environments
                .arg("--disable-gpu");
            for arg in &self.config.chrome_args {
                builder = builder.arg(arg);
            }
            let config = builder
                .build()
                .map_err(|e| LoadError::transport(url, format!("browser config: {}", e)))?;

            Browser::launch(config)
                .await
                .map_err(|e| LoadError::transport(url, format!("browser launch: {}", e)))?
        };

        self.handler = Some(tokio::spawn(async move {
            while let Some(h) = handler.next().await {
                if h.is_err() {
                    break;
                }
            }
        }));

        let page = browser
            .new_page("about:blank")
            .await
            .map_err(|e| LoadError::transport(url, e))?;
        page.execute(SetUserAgentOverrideParams::new(self.config.user_agent.clone()))
            .await
            .map_err(|e| LoadError::transport(url, e))?;

        self.browser = Some(browser);
        self.page = Some(page.clone());
        Ok(page)
    }

    /// Wait for client-rendered content. Polls for the configured selector
    /// when there is one, never longer than `settle`.
    async fn settle(&self, page: &Page, settle: Duration) {
        let Some(ref selector) = self.config.wait_for_selector else {
            tokio::time::sleep(settle).await;
            return;
        };

        let deadline = tokio::time::Instant::now() + settle;
        loop {
            if page.find_element(selector.as_str()).await.is_ok() {
                debug!("Selector {} present", selector);
                return;
            }
            if tokio::time::Instant::now() + SELECTOR_POLL_INTERVAL > deadline {
                warn!("Selector {} not present after {:?}", selector, settle);
                tokio::time::sleep_until(deadline).await;
                return;
            }
            tokio::time::sleep(SELECTOR_POLL_INTERVAL).await;
        }
    }
}

#[cfg(feature = "browser")]
#[async_trait]
impl PageSource for BrowserPageSource {
    async fn open(&mut self, url: &str, settle: Duration) -> Result<RenderedPage, LoadError> {
        let page = self.ensure_page(url).await?;

        debug!("Navigating to {}", url);
        let nav_params = NavigateParams::builder()
            .url(url)
            .build()
            .map_err(|e| LoadError::transport(url, format!("invalid URL: {}", e)))?;

        let timeout = Duration::from_secs(self.config.timeout);
        let response = match tokio::time::timeout(timeout, page.execute(nav_params)).await {
            Err(_) => return Err(LoadError::timeout(url)),
            Ok(Err(e)) => return Err(LoadError::transport(url, e)),
            Ok(Ok(response)) => response,
        };
        if let Some(ref error_text) = response.result.error_text {
            if error_text.contains("TIMED_OUT") {
                return Err(LoadError::timeout(url));
            }
            return Err(LoadError::transport(url, error_text));
        }

        self.settle(&page, settle).await;

        let final_url = page
            .url()
            .await
            .ok()
            .flatten()
            .map(|u| u.to_string())
            .unwrap_or_else(|| url.to_string());
        let content = page
            .content()
            .await
            .map_err(|e| LoadError::transport(url, e))?;

        Ok(RenderedPage {
            url: url.to_string(),
            final_url,
            content,
        })
    }

    async fn close(&mut self) {
        if let Some(page) = self.page.take() {
            let _ = page.close().await;
        }
        if let Some(mut browser) = self.browser.take() {
            // A remote browser outlives us; only shut down what we launched.
            if self.config.remote_url.is_none() {
                let _ = browser.close().await;
                let _ = browser.wait().await;
            }
            info!("Browser session closed");
        }
        if let Some(handler) = self.handler.take() {
            handler.abort();
        }
    }
}

/// Unwinding past the crawl skips `close`; stop the CDP handler so it does
/// not outlive the source. Dropping the `Browser` kills a launched child.
#[cfg(feature = "browser")]
impl Drop for BrowserPageSource {
    fn drop(&mut self) {
        if let Some(handler) = self.handler.take() {
            handler.abort();
        }
        if self.page.take().is_some() {
            debug!("Browser source dropped without close");
        }
    }
}
