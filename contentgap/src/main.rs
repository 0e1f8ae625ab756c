//! `image-gap`: surfaces popular wiki articles that have no image.

use std::path::PathBuf;
use std::sync::Arc;

use anyhow::Context;
use clap::{Parser, Subcommand};

use contentgap::bot::{BotConfig, GapBot};
use contentgap::client::{ClientConfig, MediaWikiClient, PageviewsClient};
use contentgap::corpus::CorpusQuery;
use contentgap::observability::{init_logging, LogConfig};
use contentgap::report::FileReportSink;

#[derive(Parser)]
#[command(
    name = "image-gap",
    version,
    about = "Analyzing Wikipedia to surface image content gap"
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Language code for Wikipedia
    #[arg(short = 'w', long = "wikipedia", default_value = "fr")]
    lang: String,

    /// Page name to write a report to
    #[arg(short, long)]
    report: String,

    /// Config file with login and password
    #[arg(short = 'f', long = "configfile", env = "IMAGE_GAP_CONFIG")]
    config_file: Option<PathBuf>,

    /// Seconds between two report saves (default: 60 for recent, 600 otherwise)
    #[arg(long)]
    frequency: Option<u64>,

    /// Page-view window in days (30, 60 or 90)
    #[arg(long, default_value_t = 90)]
    window: u32,

    /// Write reports as files under this directory instead of editing the wiki
    #[arg(long)]
    dry_run_dir: Option<PathBuf>,

    /// Also write debug logs to this file
    #[arg(long)]
    log_file: Option<PathBuf>,

    /// Log every analyzed article
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Log as JSON lines
    #[arg(long, global = true)]
    json: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Articles of a category and its sub-categories
    Category {
        /// Category name
        name: String,
        /// Depth of search into sub-categories
        #[arg(short, long, default_value_t = 0)]
        depth: u32,
    },
    /// Articles including a template
    Template {
        /// Template name
        name: String,
    },
    /// Distinct random articles
    Random {
        /// Number of articles
        #[arg(short, long, default_value_t = 1000)]
        count: usize,
    },
    /// Articles changed in the hours before the latest change
    Recent {
        /// Hours to look back
        #[arg(long, default_value_t = 1)]
        hours: u32,
    },
}

impl Commands {
    fn query(&self) -> CorpusQuery {
        match self {
            Self::Category { name, depth } => CorpusQuery::Category {
                name: name.clone(),
                depth: *depth,
            },
            Self::Template { name } => CorpusQuery::Template { name: name.clone() },
            Self::Random { count } => CorpusQuery::Random { count: *count },
            Self::Recent { hours } => CorpusQuery::RecentChanges { hours: *hours },
        }
    }

    fn default_frequency(&self) -> u64 {
        match self {
            Self::Recent { .. } => 60,
            _ => 600,
        }
    }
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    init_logging(&LogConfig {
        verbose: cli.verbose,
        json: cli.json,
        file: cli.log_file.clone(),
    })
    .context("failed to set up logging")?;

    let client_config = ClientConfig::new(cli.lang.clone());
    tracing::info!(user_agent = %client_config.user_agent, "Connecting to {}", client_config.api_endpoint());
    let wiki = Arc::new(MediaWikiClient::new(client_config.clone())?);
    let pageviews = Arc::new(PageviewsClient::new(client_config)?);

    let mut config = BotConfig::new(cli.report.clone())
        .with_frequency(cli.frequency.unwrap_or_else(|| cli.command.default_frequency()))
        .with_view_window(cli.window);
    if let Some(path) = &cli.config_file {
        config = config.with_credentials(path.clone());
    }

    let mut bot = GapBot::new(config, wiki, pageviews)?;
    if let Some(dir) = &cli.dry_run_dir {
        tracing::info!(dir = %dir.display(), "Dry run: reports are written to files");
        bot = bot.with_sink(Arc::new(FileReportSink::new(dir.clone())));
    }

    let query = cli.command.query();
    let snapshot = bot
        .run(&query)
        .await
        .with_context(|| format!("scan of {query} failed"))?;

    tracing::info!(
        total = snapshot.total_seen,
        filtered = snapshot.total_filtered,
        "Report saved"
    );
    Ok(())
}
