//! League-leader row extraction from year pages.

use std::sync::LazyLock;

use scraper::{Html, Selector};

use crate::models::{DefectReason, RawObservation, Stat};
use crate::utils::{closest_ancestor, element_text, row_cells};

static CELL_LINK: LazyLock<Selector> = LazyLock::new(|| Selector::parse("td > a").unwrap());

/// Cells a leader row must have: label, player, team, value.
const MIN_CELLS: usize = 4;

/// Outcome of looking up one statistic on a page.
#[derive(Debug, Clone, PartialEq)]
pub enum StatOutcome {
    Found(RawObservation),
    Missing(DefectReason),
}

/// Everything extracted from one page.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Extraction {
    pub observations: Vec<RawObservation>,
    pub misses: Vec<DefectReason>,
}

/// Extracts a fixed set of statistics from year pages.
#[derive(Debug, Clone)]
pub struct StatExtractor {
    targets: Vec<Stat>,
}

impl Default for StatExtractor {
    fn default() -> Self {
        Self::new(Stat::ALL)
    }
}

impl StatExtractor {
    pub fn new(targets: impl IntoIterator<Item = Stat>) -> Self {
        Self {
            targets: targets.into_iter().collect(),
        }
    }

    pub fn targets(&self) -> &[Stat] {
        &self.targets
    }

    /// Locate the row for `stat`: the first table row holding a cell link
    /// whose text contains the statistic's label.
    pub fn locate(&self, page: &Html, period: &str, stat: Stat) -> StatOutcome {
        let row = page
            .select(&CELL_LINK)
            .find(|link| element_text(*link).contains(stat.label()))
            .and_then(|link| closest_ancestor(link, "tr"));

        let Some(row) = row else {
            return StatOutcome::Missing(DefectReason::Missing(stat));
        };

        let cells = row_cells(row);
        if cells.len() < MIN_CELLS {
            return StatOutcome::Missing(DefectReason::Malformed(stat));
        }

        StatOutcome::Found(RawObservation {
            period: period.to_string(),
            stat,
            player: element_text(cells[1]),
            team: element_text(cells[2]),
            raw_value: element_text(cells[3]),
        })
    }

    /// Evaluate every target independently; a miss on one never affects
    /// the others.
    pub fn extract(&self, page: &Html, period: &str) -> Extraction {
        let mut extraction = Extraction::default();
        for &stat in &self.targets {
            match self.locate(page, period, stat) {
                StatOutcome::Found(obs) => extraction.observations.push(obs),
                StatOutcome::Missing(reason) => extraction.misses.push(reason),
            }
        }
        extraction
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn pitching_page(rows: &str) -> Html {
        Html::parse_document(&format!(
            r#"<html><body>
                <table>
                    <tr><td colspan="4">Pitching Statistics League Leaders</td></tr>
                    {rows}
                </table>
            </body></html>"#
        ))
    }

    #[test]
    fn test_present_and_absent_are_independent() {
        let page = pitching_page(
            r#"<tr><td><a href="/w">Wins</a></td><td>Bob Lemon</td><td>Cleveland</td><td>23</td></tr>"#,
        );
        let extractor = StatExtractor::new([Stat::Wins, Stat::Era]);

        let extraction = extractor.extract(&page, "1950");
        assert_eq!(
            extraction.observations,
            vec![RawObservation {
                period: "1950".to_string(),
                stat: Stat::Wins,
                player: "Bob Lemon".to_string(),
                team: "Cleveland".to_string(),
                raw_value: "23".to_string(),
            }]
        );
        assert_eq!(extraction.misses, vec![DefectReason::Missing(Stat::Era)]);
        assert_eq!(extraction.misses[0].to_string(), "missing ERA");
    }

    #[test]
    fn test_cell_text_is_normalised() {
        let page = pitching_page(
            r#"<tr><td><a href="/era">ERA</a></td>
                   <td> <a href="/p">Early
                        Wynn</a> </td>
                   <td>Cleveland</td>
                   <td> 3.20 </td></tr>"#,
        );
        let outcome = StatExtractor::default().locate(&page, "1950", Stat::Era);
        let StatOutcome::Found(obs) = outcome else {
            panic!("expected a row, got {outcome:?}");
        };
        assert_eq!(obs.player, "Early Wynn");
        assert_eq!(obs.raw_value, "3.20");
    }

    #[test]
    fn test_short_row_is_malformed() {
        let page = pitching_page(r#"<tr><td><a href="/w">Wins</a></td><td>Bob Lemon</td></tr>"#);
        assert_eq!(
            StatExtractor::default().locate(&page, "1950", Stat::Wins),
            StatOutcome::Missing(DefectReason::Malformed(Stat::Wins))
        );
    }

    #[test]
    fn test_non_numeric_value_is_kept_raw() {
        let page = pitching_page(
            r#"<tr><td><a href="/w">Wins</a></td><td>Foo</td><td>BOS</td><td>abc</td></tr>"#,
        );
        let StatOutcome::Found(obs) = StatExtractor::default().locate(&page, "1950", Stat::Wins)
        else {
            panic!("expected a row");
        };
        assert_eq!(obs.raw_value, "abc");
    }

    #[test]
    fn test_link_outside_cell_is_ignored() {
        let page = Html::parse_document(r#"<p><a href="/w">Wins</a></p><table><tr><td>x</td></tr></table>"#);
        assert_eq!(
            StatExtractor::default().locate(&page, "1950", Stat::Wins),
            StatOutcome::Missing(DefectReason::Missing(Stat::Wins))
        );
    }

    #[test]
    fn test_empty_page_misses_every_target() {
        let page = Html::parse_document("<html><body></body></html>");
        let extraction = StatExtractor::default().extract(&page, "1950");
        assert!(extraction.observations.is_empty());
        assert_eq!(extraction.misses.len(), Stat::ALL.len());
    }
}
