//! Page sources and the league-leader crawl.

pub mod browser;
mod crawl;
mod extract;
mod http_client;
mod index;
mod source;

#[cfg(feature = "browser")]
pub use browser::BrowserPageSource;
pub use browser::{BrowserEngineConfig, PageEngine};
pub use crawl::{CrawlSettings, Crawler};
pub use extract::{Extraction, StatExtractor, StatOutcome};
pub use http_client::HttpPageSource;
pub use index::IndexCrawler;
pub use source::{LoadError, PageSource, RenderedPage};

/// Build the page source selected by `config`.
pub fn page_source(config: &BrowserEngineConfig) -> Result<Box<dyn PageSource>, LoadError> {
    match config.engine {
        #[cfg(feature = "browser")]
        PageEngine::Browser => Ok(Box::new(BrowserPageSource::new(config.clone()))),
        #[cfg(not(feature = "browser"))]
        PageEngine::Browser => Err(LoadError::transport(
            "about:blank",
            "browser support not compiled in; set browser.engine = \"http\"",
        )),
        PageEngine::Http => HttpPageSource::new(config)
            .map(|s| Box::new(s) as Box<dyn PageSource>)
            .map_err(|e| LoadError::transport("about:blank", e)),
    }
}
