//! Page source abstraction shared by the browser and HTTP fetchers.

use std::time::Duration;

use async_trait::async_trait;
use scraper::Html;
use thiserror::Error;

use crate::models::LoadFailureKind;

/// Errors that can occur while loading a page.
///
/// Never fatal to a crawl on its own: a year page that fails to load is
/// recorded as a defect and the crawl moves on.
#[derive(Debug, Error)]
pub enum LoadError {
    #[error("Timed out loading {url}")]
    Timeout { url: String },

    #[error("Failed to load {url}: {message}")]
    Transport { url: String, message: String },
}

impl LoadError {
    pub fn transport(url: &str, message: impl std::fmt::Display) -> Self {
        Self::Transport {
            url: url.to_string(),
            message: message.to_string(),
        }
    }

    pub fn timeout(url: &str) -> Self {
        Self::Timeout {
            url: url.to_string(),
        }
    }

    /// Failure category recorded in defect reasons.
    pub fn kind(&self) -> LoadFailureKind {
        match self {
            Self::Timeout { .. } => LoadFailureKind::Timeout,
            Self::Transport { .. } => LoadFailureKind::Transport,
        }
    }
}

/// Content of a page after navigation and the settle wait.
#[derive(Debug, Clone)]
pub struct RenderedPage {
    pub url: String,
    pub final_url: String,
    pub content: String,
}

impl RenderedPage {
    pub fn new(url: impl Into<String>, content: impl Into<String>) -> Self {
        let url = url.into();
        Self {
            final_url: url.clone(),
            url,
            content: content.into(),
        }
    }

    /// Parse the page content.
    pub fn document(&self) -> Html {
        Html::parse_document(&self.content)
    }
}

/// A source of rendered pages.
///
/// Implementations own a single browsing session that lives across the whole
/// crawl; `close` releases it and must be safe to call more than once.
#[async_trait]
pub trait PageSource: Send {
    /// Navigate to `url`, wait `settle` for client-side content, and return
    /// the rendered page.
    async fn open(&mut self, url: &str, settle: Duration) -> Result<RenderedPage, LoadError>;

    /// Release the browsing session.
    async fn close(&mut self);
}
