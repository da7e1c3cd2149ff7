//! Crawl driver: index page, then each year page in order.

use std::time::Duration;

use indicatif::ProgressBar;
use tracing::{debug, info, warn};

use super::extract::StatExtractor;
use super::index::IndexCrawler;
use super::source::PageSource;
use crate::models::{DefectReason, DefectiveLink};
use crate::storage::ObservationSink;

/// Timing and scope of one crawl.
#[derive(Debug, Clone)]
pub struct CrawlSettings {
    pub index_url: String,
    pub index_settle: Duration,
    pub page_settle: Duration,
    /// Extra pause between year pages, on top of the settle wait.
    pub request_delay: Duration,
    /// Maximum year pages to visit (0 = all).
    pub limit: usize,
}

pub struct Crawler {
    index: IndexCrawler,
    extractor: StatExtractor,
    settings: CrawlSettings,
    progress: Option<ProgressBar>,
}

impl Crawler {
    pub fn new(index: IndexCrawler, extractor: StatExtractor, settings: CrawlSettings) -> Self {
        Self {
            index,
            extractor,
            settings,
            progress: None,
        }
    }

    /// Report per-year progress on `bar`. Its length is set once the index
    /// page has been read.
    pub fn with_progress(mut self, bar: ProgressBar) -> Self {
        self.progress = Some(bar);
        self
    }

    /// Crawl every year page and return the accumulated observations.
    ///
    /// Page failures never end the crawl early: an unreachable index page
    /// yields an empty sink, a failed year page becomes a defect. The
    /// source's session is closed before returning.
    pub async fn run(&self, source: &mut dyn PageSource) -> ObservationSink {
        let sink = self.crawl(source).await;
        source.close().await;
        if let Some(ref bar) = self.progress {
            bar.finish_and_clear();
        }
        sink
    }

    async fn crawl(&self, source: &mut dyn PageSource) -> ObservationSink {
        let mut sink = ObservationSink::new();

        info!("Loading index page {}", self.settings.index_url);
        let index_page = match source
            .open(&self.settings.index_url, self.settings.index_settle)
            .await
        {
            Ok(page) => page,
            Err(e) => {
                warn!("Index page unavailable, nothing to crawl: {}", e);
                return sink;
            }
        };

        let mut entries = {
            let document = index_page.document();
            self.index.list_year_pages(&document)
        };

        if entries.is_empty() {
            warn!(
                "No year links found on {}; nothing to crawl",
                index_page.final_url
            );
            return sink;
        }

        if self.settings.limit > 0 && entries.len() > self.settings.limit {
            entries.truncate(self.settings.limit);
        }
        info!("Found {} year pages", entries.len());
        if let Some(ref bar) = self.progress {
            bar.set_length(entries.len() as u64);
        }

        for (i, entry) in entries.into_iter().enumerate() {
            if i > 0 && !self.settings.request_delay.is_zero() {
                tokio::time::sleep(self.settings.request_delay).await;
            }
            if let Some(ref bar) = self.progress {
                bar.set_message(entry.period.clone());
            }

            match source.open(&entry.source_url, self.settings.page_settle).await {
                Ok(page) => {
                    let extraction = {
                        let document = page.document();
                        self.extractor.extract(&document, &entry.period)
                    };
                    debug!(
                        "{}: {} observations, {} misses",
                        entry.period,
                        extraction.observations.len(),
                        extraction.misses.len()
                    );
                    for obs in extraction.observations {
                        sink.record_observation(obs);
                    }
                    for reason in extraction.misses {
                        sink.record_defect(DefectiveLink::new(&entry, reason));
                    }
                }
                Err(e) => {
                    warn!("{}", e);
                    sink.record_defect(DefectiveLink::new(
                        &entry,
                        DefectReason::LoadError(e.kind()),
                    ));
                }
            }

            sink.record_year(entry);
            if let Some(ref bar) = self.progress {
                bar.inc(1);
            }
        }

        sink
    }
}
