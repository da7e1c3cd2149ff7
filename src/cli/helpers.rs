//! Shared helper functions for CLI commands.

use std::io::{self, Write};
use std::path::Path;

use console::style;
use indicatif::{ProgressBar, ProgressStyle};

/// Ask before dropping an existing store. Only `y` confirms.
pub fn confirm_recreate(db_path: &Path) -> bool {
    print!(
        "{} Store {} already exists. Drop and recreate it? [y/N] ",
        style("!").yellow(),
        db_path.display()
    );
    if io::stdout().flush().is_err() {
        return false;
    }
    let mut input = String::new();
    if io::stdin().read_line(&mut input).is_err() {
        return false;
    }
    input.trim().eq_ignore_ascii_case("y")
}

/// Progress bar for the year-page crawl; length is set by the crawler.
pub fn crawl_progress_bar() -> ProgressBar {
    let pb = ProgressBar::new(0);
    pb.set_style(
        ProgressStyle::default_bar()
            .template("{spinner:.green} [{bar:30.cyan/blue}] {pos}/{len} {wide_msg}")
            .unwrap()
            .progress_chars("█▓░"),
    );
    pb
}
