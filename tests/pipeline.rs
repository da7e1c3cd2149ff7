//! End-to-end: crawl a scripted site, hand off through flat files, import,
//! and query the store.

use std::collections::HashMap;
use std::time::Duration;

use almanac::models::Category;
use almanac::repository::StatsStore;
use almanac::scrapers::{
    CrawlSettings, Crawler, IndexCrawler, LoadError, PageSource, RenderedPage, StatExtractor,
};
use almanac::services::import_flat_files;
use almanac::storage::{read_observations, DEFECTS_FILE, YEAR_LINKS_FILE};
use async_trait::async_trait;

const INDEX: &str = "https://almanac.test/yearmenu.shtml";
const BASE: &str = "https://almanac.test/yearly/";
const LABEL: &str = "The History of the American League";

/// Serves canned pages; anything unknown is a transport failure.
struct CannedSite {
    pages: HashMap<String, String>,
    closed: bool,
}

#[async_trait]
impl PageSource for CannedSite {
    async fn open(&mut self, url: &str, _settle: Duration) -> Result<RenderedPage, LoadError> {
        if self.closed {
            return Err(LoadError::transport(url, "closed"));
        }
        self.pages
            .get(url)
            .map(|html| RenderedPage::new(url, html.clone()))
            .ok_or_else(|| LoadError::transport(url, "404"))
    }

    async fn close(&mut self) {
        self.closed = true;
    }
}

fn leader_row(stat: &str, player: &str, team: &str, value: &str) -> String {
    format!(
        r#"<tr><td><a href="/stat">{stat}</a></td><td><a href="/p">{player}</a></td><td>{team}</td><td>{value}</td></tr>"#
    )
}

fn site() -> CannedSite {
    let index = format!(
        r#"<html><body><table>
            <tr><td>The History of the National League</td></tr>
            <tr><td><a href="../yearly/yr1950n.shtml">1950</a></td></tr>
            <tr><td>{LABEL}</td></tr>
            <tr><td>
                <a href="../yearly/yr1949a.shtml">1949</a>
                <a href="../yearly/yr1950a.shtml">1950</a>
                <a href="../yearly/yr1951a.shtml">1951</a>
            </td></tr>
        </table></body></html>"#
    );

    let y1949 = format!(
        "<table>{}{}{}{}</table>",
        leader_row("Base on Balls", "Ted Williams", "Boston", "162"),
        leader_row("Home Runs", "Ted Williams", "Boston", "43"),
        leader_row("Wins", "Mel Parnell", "Boston", "25"),
        leader_row("ERA", "Mike Garcia", "Cleveland", "2.36"),
    );
    // Split across two tables, with an unparseable ERA value.
    let y1950 = format!(
        "<table>{}{}</table><table>{}{}</table>",
        leader_row("Home Runs", "Al Rosen", "Cleveland", "37"),
        leader_row("Wins", "Bob Lemon", "Cleveland", "23"),
        leader_row("ERA", "Early Wynn", "Cleveland", "--"),
        leader_row("Base on Balls", "Eddie Yost", "Washington", "141"),
    );

    let pages = HashMap::from([
        (INDEX.to_string(), index),
        (format!("{BASE}yr1949a.shtml"), y1949),
        (format!("{BASE}yr1950a.shtml"), y1950),
    ]);
    CannedSite {
        pages,
        closed: false,
    }
}

fn crawler() -> Crawler {
    Crawler::new(
        IndexCrawler::new(LABEL, BASE).unwrap(),
        StatExtractor::default(),
        CrawlSettings {
            index_url: INDEX.to_string(),
            index_settle: Duration::ZERO,
            page_settle: Duration::ZERO,
            request_delay: Duration::ZERO,
            limit: 0,
        },
    )
}

#[tokio::test]
async fn test_crawl_export_import_query() {
    let dir = tempfile::tempdir().unwrap();
    let mut source = site();

    let sink = crawler().run(&mut source).await;
    assert!(source.closed);
    sink.write_to(dir.path()).unwrap();

    let summary = sink.summary();
    assert_eq!(summary.years, 3);
    assert_eq!(summary.batting, 4);
    assert_eq!(summary.pitching, 4);
    // 1951 failed to load; everything on 1949 and 1950 was found.
    assert_eq!(summary.defects, 1);

    let defects = std::fs::read_to_string(dir.path().join(DEFECTS_FILE)).unwrap();
    assert!(defects.contains("yr1951a.shtml (load error: transport)"));
    let years = std::fs::read_to_string(dir.path().join(YEAR_LINKS_FILE)).unwrap();
    assert_eq!(years.lines().count(), 4);

    let pitching = read_observations(&dir.path().join("pitching_stats.csv"), Category::Pitching)
        .unwrap();
    assert_eq!(pitching.rows.len(), 4);
    assert_eq!(pitching.skipped, 0);

    let db = dir.path().join("db").join("baseball_stats.db");
    let imported = import_flat_files(dir.path(), &db, |_| false).unwrap();
    assert_eq!(imported.pitching.dropped, 1);
    assert_eq!(imported.load.batting, 4);
    assert_eq!(imported.load.pitching, 3);
    assert_eq!(imported.load.teams, 3);

    let store = StatsStore::open(&db).unwrap();
    let teams = store
        .top_teams_by_leader_count(Category::Batting, 5)
        .unwrap();
    assert_eq!(teams[0].team, "Boston");
    assert_eq!(teams[0].count, 2);

    let leaders = store.leaders_for_year(1950).unwrap();
    assert_eq!(leaders.len(), 3);
    assert!(leaders.iter().all(|l| l.stat != "ERA"));
    assert!(store.leaders_for_year(1951).unwrap().is_empty());
}

#[tokio::test]
async fn test_reimport_requires_confirmation() {
    let dir = tempfile::tempdir().unwrap();
    let mut source = site();
    crawler()
        .run(&mut source)
        .await
        .write_to(dir.path())
        .unwrap();

    let db = dir.path().join("stats.db");
    import_flat_files(dir.path(), &db, |_| false).unwrap();

    let declined = import_flat_files(dir.path(), &db, |_| false);
    assert!(declined.is_err());
    let counts = StatsStore::open(&db).unwrap().counts().unwrap();
    assert_eq!(counts.batting, 4);

    let again = import_flat_files(dir.path(), &db, |_| true).unwrap();
    assert_eq!(again.load.batting, 4);
    let counts = StatsStore::open(&db).unwrap().counts().unwrap();
    assert_eq!(counts.batting, 4);
    assert_eq!(counts.teams, 3);
}

#[tokio::test]
async fn test_unreachable_index_writes_header_only_files() {
    let dir = tempfile::tempdir().unwrap();
    let mut source = CannedSite {
        pages: HashMap::new(),
        closed: false,
    };

    let sink = crawler().run(&mut source).await;
    assert!(source.closed);
    assert_eq!(sink.summary().years, 0);
    sink.write_to(dir.path()).unwrap();

    for category in Category::ALL {
        let content = std::fs::read_to_string(dir.path().join(category.file_name())).unwrap();
        assert_eq!(content.trim_end(), "Year,Stat,Player,Team,Value");
    }
    let defects = std::fs::read_to_string(dir.path().join(DEFECTS_FILE)).unwrap();
    assert_eq!(defects.trim_end(), "Year,URL (Issue)");
    let years = std::fs::read_to_string(dir.path().join(YEAR_LINKS_FILE)).unwrap();
    assert_eq!(years.trim_end(), "Year,URL");
}
