//! # News Digest
//!
//! Imports recent news articles from the Perigon API, scrapes each article
//! page for its readable text, and stores a short extractive summary next to
//! the article metadata.
//!
//! ## Features
//!
//! - Pulls the last week of English articles and upserts them by URL
//! - Extracts paragraph text from article pages
//! - Summarizes with a frequency-based sentence ranker that favors leading
//!   sentences and sentences sharing words with the headline
//! - Summarizes ad-hoc text from a file or stdin
//!
//! ## Usage
//!
//! ```sh
//! news_digest import --dump ./perigon_articles.json
//! news_digest summarize --limit 100
//! news_digest text --title "Budget passes" article.txt
//! ```
//!
//! ## Architecture
//!
//! 1. **Importing**: Query the news API and upsert articles into SQLite
//! 2. **Fetching**: Download pages of unsummarized articles (bounded concurrency)
//! 3. **Summarizing**: Pure extractive summarizer, see [`summarizer`]
//! 4. **Storing**: Write the summary back, or record the failure for retry

use clap::Parser;
use reqwest::Client;
use std::error::Error;
use std::time::Duration;
use tracing::{debug, info, instrument};
use tracing_subscriber::{EnvFilter, fmt as tfmt};

mod api;
mod cli;
mod models;
mod outputs;
mod pipeline;
mod scrapers;
mod store;
mod summarizer;
mod utils;

use cli::{Cli, Command};
use store::ArticleStore;

#[tokio::main]
#[instrument]
async fn main() -> Result<(), Box<dyn Error>> {
    // --- Environment (.env is optional) ---
    let dotenv_path = dotenvy::dotenv().ok();

    // --- Tracing init ---
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tfmt()
        .with_env_filter(filter)
        .with_target(true)
        .with_file(false)
        .with_line_number(false)
        .with_writer(std::io::stderr)
        .with_timer(tracing_subscriber::fmt::time::UtcTime::rfc_3339())
        .init();

    let start_time = std::time::Instant::now();
    info!(env_file = ?dotenv_path, "news_digest starting up");

    let args = Cli::parse();
    debug!(database = %args.database.display(), command = ?args.command, "Parsed CLI arguments");

    match &args.command {
        Command::Import(import) => {
            let client = http_client()?;
            let mut store = ArticleStore::open(&args.database)?;
            let stats = pipeline::run_import(&mut store, &client, import).await?;
            println!(
                "Imported {} new and {} updated articles ({} skipped).",
                stats.inserted, stats.updated, stats.skipped
            );
        }
        Command::Summarize(summarize) => {
            let client = http_client()?;
            let pages = api::retrying_fetcher(&client);
            let store = ArticleStore::open(&args.database)?;
            let stats = pipeline::run_summarize(&store, &pages, summarize).await?;
            println!(
                "Summarized {} articles, {} failed.",
                stats.summarized, stats.failed
            );
        }
        Command::Text(text) => {
            let summary = pipeline::run_text(text).await?;
            println!("{summary}");
        }
        Command::Status => {
            let store = ArticleStore::open(&args.database)?;
            let counts = store.counts()?;
            println!(
                "{} articles: {} summarized, {} pending, {} failed",
                counts.total, counts.summarized, counts.pending, counts.failed
            );
        }
    }

    let elapsed = start_time.elapsed();
    info!(
        ?elapsed,
        secs = elapsed.as_secs(),
        millis = elapsed.subsec_millis(),
        "Execution complete"
    );

    Ok(())
}

/// Shared HTTP client for the news API and article pages.
fn http_client() -> reqwest::Result<Client> {
    Client::builder()
        .user_agent(concat!(env!("CARGO_PKG_NAME"), "/", env!("CARGO_PKG_VERSION")))
        .timeout(Duration::from_secs(30))
        .build()
}
