//! Year discovery from the index page.

use std::sync::LazyLock;

use scraper::{Html, Selector};
use tracing::debug;
use url::Url;

use crate::models::YearEntry;
use crate::utils::{closest_ancestor, element_text, next_sibling_element, own_text};

static CELL: LazyLock<Selector> = LazyLock::new(|| Selector::parse("td").unwrap());
static LINK: LazyLock<Selector> = LazyLock::new(|| Selector::parse("a").unwrap());

/// Finds the per-year pages listed on the index page.
///
/// The year links live in the table row right after the row whose cell
/// carries `anchor_label`.
#[derive(Debug, Clone)]
pub struct IndexCrawler {
    anchor_label: String,
    base_url: Url,
}

impl IndexCrawler {
    pub fn new(anchor_label: impl Into<String>, base_url: &str) -> Result<Self, url::ParseError> {
        // Ensure joins append to the base instead of replacing its last segment.
        let base_url = if base_url.ends_with('/') {
            Url::parse(base_url)?
        } else {
            Url::parse(&format!("{}/", base_url))?
        };

        Ok(Self {
            anchor_label: anchor_label.into(),
            base_url,
        })
    }

    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    /// List year pages in page order. An empty list means the anchor section
    /// or its links were not found.
    pub fn list_year_pages(&self, index: &Html) -> Vec<YearEntry> {
        let Some(anchor) = index
            .select(&CELL)
            .find(|td| own_text(*td).contains(&self.anchor_label))
        else {
            debug!("Anchor label {:?} not found", self.anchor_label);
            return Vec::new();
        };

        let Some(links_row) =
            closest_ancestor(anchor, "tr").and_then(|row| next_sibling_element(row, "tr"))
        else {
            debug!("No row follows the anchor row");
            return Vec::new();
        };

        links_row
            .select(&LINK)
            .filter_map(|link| {
                let href = link.value().attr("href")?.trim();
                let segment = href.rsplit('/').next().filter(|s| !s.is_empty())?;
                match self.base_url.join(segment) {
                    Ok(url) => Some(YearEntry::new(element_text(link), url.to_string())),
                    Err(e) => {
                        debug!("Skipping link {:?}: {}", href, e);
                        None
                    }
                }
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const LABEL: &str = "The History of the American League";
    const BASE: &str = "https://www.baseball-almanac.com/yearly/";

    fn crawler() -> IndexCrawler {
        IndexCrawler::new(LABEL, BASE).unwrap()
    }

    #[test]
    fn test_lists_links_in_row_after_anchor() {
        let html = Html::parse_document(&format!(
            r#"<table>
                <tr><td>The History of the National League</td></tr>
                <tr><td><a href="/yearly/yr1900n.shtml">1900</a></td></tr>
                <tr><td>{LABEL}</td></tr>
                <tr><td>
                    <a href="../yearly/yr1901a.shtml"> 1901 </a>
                    <a href="https://www.baseball-almanac.com/yearly/yr1902a.shtml">1902</a>
                    <a>no href</a>
                </td></tr>
                <tr><td><a href="/yearly/yr1903a.shtml">1903</a></td></tr>
            </table>"#
        ));

        let entries = crawler().list_year_pages(&html);
        assert_eq!(
            entries,
            vec![
                YearEntry::new("1901", format!("{BASE}yr1901a.shtml")),
                YearEntry::new("1902", format!("{BASE}yr1902a.shtml")),
            ]
        );
    }

    #[test]
    fn test_missing_anchor_yields_empty() {
        let html = Html::parse_document("<table><tr><td>Nothing here</td></tr></table>");
        assert!(crawler().list_year_pages(&html).is_empty());
    }

    #[test]
    fn test_anchor_in_last_row_yields_empty() {
        let html = Html::parse_document(&format!("<table><tr><td>{LABEL}</td></tr></table>"));
        assert!(crawler().list_year_pages(&html).is_empty());
    }

    #[test]
    fn test_base_without_trailing_slash() {
        let crawler = IndexCrawler::new(LABEL, "https://example.com/yearly").unwrap();
        assert_eq!(crawler.base_url().as_str(), "https://example.com/yearly/");
    }
}
