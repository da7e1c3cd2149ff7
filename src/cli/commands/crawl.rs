//! Crawl command.

use anyhow::Context;
use console::style;

use crate::cli::helpers::crawl_progress_bar;
use crate::config::Settings;
use crate::scrapers::{page_source, Crawler, StatExtractor};
use crate::storage::CrawlSummary;

/// Crawl every year page and write the flat files to the data directory.
pub async fn cmd_crawl(settings: &Settings, limit: usize) -> anyhow::Result<CrawlSummary> {
    let index = settings
        .index_crawler()
        .with_context(|| format!("invalid base URL {:?}", settings.base_url))?;
    let mut source = page_source(&settings.browser)?;

    println!(
        "{} Crawling {}",
        style("→").cyan(),
        style(&settings.index_url).dim()
    );

    let crawler = Crawler::new(index, StatExtractor::default(), settings.crawl_settings(limit))
        .with_progress(crawl_progress_bar());
    let sink = crawler.run(source.as_mut()).await;

    sink.write_to(&settings.data_dir)
        .with_context(|| format!("writing flat files to {}", settings.data_dir.display()))?;

    let summary = sink.summary();
    if summary.years == 0 {
        println!("{} No year pages crawled; the index page was unavailable or empty", style("!").yellow());
    }
    println!(
        "{} {} years: {} batting, {} pitching observations, {} defective links",
        style("✓").green(),
        summary.years,
        summary.batting,
        summary.pitching,
        summary.defects
    );
    Ok(summary)
}
