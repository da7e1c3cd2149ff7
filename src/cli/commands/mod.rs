//! CLI parser and dispatch to command modules.

mod crawl;
mod import;
mod leaders;

use std::path::PathBuf;

use anyhow::Context;
use clap::{Parser, Subcommand};

use crate::config::{load_settings, LoadOptions};
use crate::models::{Category, Stat};

#[derive(Parser)]
#[command(name = "almanac")]
#[command(about = "League-leader statistics crawler and loader")]
#[command(version)]
pub struct Cli {
    /// Config file (TOML, YAML or JSON). Discovered automatically if omitted.
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    /// Directory the flat files are written to and read from
    #[arg(long, global = true, env = "ALMANAC_DATA_DIR")]
    data_dir: Option<PathBuf>,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

/// Check if verbose mode is enabled (for early logging setup).
pub fn is_verbose() -> bool {
    std::env::args().any(|arg| arg == "-v" || arg == "--verbose")
}

#[derive(Subcommand)]
enum Commands {
    /// Crawl the year pages and write the flat files
    Crawl {
        /// Limit number of year pages to visit (0 = unlimited)
        #[arg(short, long, default_value = "0")]
        limit: usize,
    },

    /// Clean the flat files and load them into a fresh store
    Import {
        /// Recreate an existing store without asking
        #[arg(short, long)]
        yes: bool,
    },

    /// Crawl, then import
    Run {
        /// Limit number of year pages to visit (0 = unlimited)
        #[arg(short, long, default_value = "0")]
        limit: usize,
        /// Recreate an existing store without asking
        #[arg(short, long)]
        yes: bool,
    },

    /// Query the loaded store
    Leaders {
        #[command(subcommand)]
        command: LeadersCommands,

        /// Print JSON instead of a table
        #[arg(long, global = true)]
        json: bool,
    },
}

#[derive(Subcommand)]
enum LeadersCommands {
    /// Teams with the most leader rows in a category
    Teams {
        /// batting or pitching
        #[arg(value_parser = parse_category)]
        category: Category,
        #[arg(short, long, default_value = "10")]
        limit: usize,
    },

    /// Players with the best value for a statistic
    Players {
        /// Statistic label, e.g. "Home Runs" or ERA
        #[arg(value_parser = parse_stat)]
        stat: Stat,
        #[arg(short, long, default_value = "10")]
        limit: usize,
    },

    /// Every leader of one year
    Year { year: i32 },

    /// A statistic's leading value year by year
    Trend {
        #[arg(value_parser = parse_stat)]
        stat: Stat,
    },
}

fn parse_category(s: &str) -> Result<Category, String> {
    Category::from_str(s).ok_or_else(|| format!("unknown category {:?} (batting, pitching)", s))
}

fn parse_stat(s: &str) -> Result<Stat, String> {
    Stat::from_label(s).ok_or_else(|| {
        let labels: Vec<&str> = Stat::ALL.iter().map(|s| s.label()).collect();
        format!("unknown statistic {:?} ({})", s, labels.join(", "))
    })
}

/// Run the CLI.
pub async fn run() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let (settings, _config) = load_settings(LoadOptions {
        config_path: cli.config,
        data_dir: cli.data_dir,
    })
    .await
    .context("loading configuration")?;

    match cli.command {
        Commands::Crawl { limit } => crawl::cmd_crawl(&settings, limit).await.map(|_| ()),
        Commands::Import { yes } => import::cmd_import(&settings, yes),
        Commands::Run { limit, yes } => {
            crawl::cmd_crawl(&settings, limit).await?;
            import::cmd_import(&settings, yes)
        }
        Commands::Leaders { command, json } => match command {
            LeadersCommands::Teams { category, limit } => {
                leaders::cmd_teams(&settings, category, limit, json)
            }
            LeadersCommands::Players { stat, limit } => {
                leaders::cmd_players(&settings, stat, limit, json)
            }
            LeadersCommands::Year { year } => leaders::cmd_year(&settings, year, json),
            LeadersCommands::Trend { stat } => leaders::cmd_trend(&settings, stat, json),
        },
    }
}
