//! Command-line interface definitions for News Digest.
//!
//! This module defines the CLI arguments and options using the `clap` crate.
//! Most options can also come from environment variables, which `main`
//! seeds from a `.env` file before parsing.

use crate::scrapers::perigon::DEFAULT_BASE_URL;
use crate::summarizer::DEFAULT_SENTENCE_COUNT;
use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;

/// Command-line arguments for the News Digest application.
///
/// # Examples
///
/// ```sh
/// # Pull the last week of articles into the database
/// news_digest import
///
/// # Summarize up to 50 pending articles, 3 sentences each
/// news_digest summarize --limit 50
///
/// # Summarize a local file
/// news_digest text --title "Budget passes" article.txt
/// ```
#[derive(Parser, Debug)]
#[command(author, version, about)]
pub struct Cli {
    /// Path to the SQLite article database
    #[arg(long, env = "DATABASE_PATH", default_value = "articles.db", global = true)]
    pub database: PathBuf,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Import recent articles from the Perigon API
    Import(ImportArgs),
    /// Scrape and summarize articles that have no summary yet
    Summarize(SummarizeArgs),
    /// Summarize a local file (or stdin) and print the result
    Text(TextArgs),
    /// Show how many articles are pending, summarized, or failed
    Status,
}

#[derive(Args, Debug)]
pub struct ImportArgs {
    /// Perigon API key
    #[arg(long, env = "PERIGON_API_KEY", hide_env_values = true)]
    pub api_key: String,

    /// Perigon articles endpoint
    #[arg(long, env = "PERIGON_BASE_URL", default_value = DEFAULT_BASE_URL)]
    pub base_url: String,

    /// How many days back to search
    #[arg(long, default_value_t = 7)]
    pub days: i64,

    /// Articles per request
    #[arg(long, default_value_t = 100)]
    pub page_size: u32,

    /// Article language filter
    #[arg(long, default_value = "en")]
    pub language: String,

    /// Also write the raw API response to this JSON file
    #[arg(long)]
    pub dump: Option<PathBuf>,
}

#[derive(Args, Debug)]
pub struct SummarizeArgs {
    /// Sentences per summary
    #[arg(short, long, env = "SUMMARY_SENTENCES", default_value_t = DEFAULT_SENTENCE_COUNT)]
    pub sentences: usize,

    /// Stop after this many articles
    #[arg(short, long)]
    pub limit: Option<usize>,

    /// Article pages fetched at the same time
    #[arg(short, long, default_value_t = 4)]
    pub concurrency: usize,
}

#[derive(Args, Debug)]
pub struct TextArgs {
    /// Title used for the title-word bonus
    #[arg(short, long, default_value = "")]
    pub title: String,

    /// Sentences in the summary
    #[arg(short, long, env = "SUMMARY_SENTENCES", default_value_t = DEFAULT_SENTENCE_COUNT)]
    pub sentences: usize,

    /// File to read; stdin when omitted
    pub file: Option<PathBuf>,
}
