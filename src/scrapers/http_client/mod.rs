//! Plain HTTP page source for server-rendered pages.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use tracing::debug;

use super::browser::BrowserEngineConfig;
use super::source::{LoadError, PageSource, RenderedPage};

/// HTTP page source. The settle wait still applies after each request, which
/// keeps pacing identical to the browser source.
pub struct HttpPageSource {
    client: Option<Client>,
}

impl HttpPageSource {
    pub fn new(config: &BrowserEngineConfig) -> Result<Self, reqwest::Error> {
        let mut builder = Client::builder()
            .user_agent(&config.user_agent)
            .timeout(Duration::from_secs(config.timeout))
            .gzip(true)
            .brotli(true);

        if let Some(ref proxy) = config.proxy {
            builder = builder.proxy(reqwest::Proxy::all(proxy)?);
        }

        Ok(Self {
            client: Some(builder.build()?),
        })
    }
}

fn classify(url: &str, e: reqwest::Error) -> LoadError {
    if e.is_timeout() {
        LoadError::timeout(url)
    } else {
        LoadError::transport(url, e)
    }
}

#[async_trait]
impl PageSource for HttpPageSource {
    async fn open(&mut self, url: &str, settle: Duration) -> Result<RenderedPage, LoadError> {
        let client = self
            .client
            .as_ref()
            .ok_or_else(|| LoadError::transport(url, "session already closed"))?;

        debug!("GET {}", url);
        let response = client.get(url).send().await.map_err(|e| classify(url, e))?;

        let status = response.status();
        if !status.is_success() {
            return Err(LoadError::transport(url, format!("HTTP {}", status)));
        }

        let final_url = response.url().to_string();
        let content = response.text().await.map_err(|e| classify(url, e))?;

        tokio::time::sleep(settle).await;

        Ok(RenderedPage {
            url: url.to_string(),
            final_url,
            content,
        })
    }

    async fn close(&mut self) {
        self.client = None;
    }
}
