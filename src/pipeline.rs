//! Subcommand implementations.
//!
//! - [`run_import`]: news API -> article table
//! - [`run_summarize`]: pending rows -> page scrape -> summary -> article table
//! - [`run_text`]: local file or stdin -> summary
//!
//! Per-article failures in [`run_summarize`] are recorded on the row and
//! logged; they never abort the batch.

use crate::api::FetchAsync;
use crate::cli::{ImportArgs, SummarizeArgs, TextArgs};
use crate::models::{ArticleRecord, NewsArticle};
use crate::outputs::json;
use crate::scrapers::{page, perigon};
use crate::store::{ArticleStore, UpsertStats};
use crate::summarizer::{SummarizeError, summarize};
use crate::utils::truncate_for_log;
use chrono::Local;
use futures::stream::{self, StreamExt};
use reqwest::Client;
use std::error::Error;
use std::io::Read;
use tracing::{debug, error, info, instrument, warn};

/// What happened to one article in a summarization run.
#[derive(Debug, PartialEq)]
pub enum Outcome {
    Summarized(String),
    Failed(String),
}

/// Totals of a summarization run.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct RunStats {
    pub summarized: usize,
    pub failed: usize,
}

impl RunStats {
    pub fn attempted(&self) -> usize {
        self.summarized + self.failed
    }
}

/// Pull recent articles from the news API and upsert them.
#[instrument(level = "info", skip_all, fields(days = args.days, language = %args.language))]
pub async fn run_import(
    store: &mut ArticleStore,
    client: &Client,
    args: &ImportArgs,
) -> Result<UpsertStats, Box<dyn Error>> {
    let today = Local::now().date_naive();
    let query = perigon::PerigonQuery::last_days(today, args.days, &args.language, args.page_size);

    let payload = perigon::index_articles(client, &args.base_url, &args.api_key, &query).await?;

    if let Some(path) = &args.dump {
        json::write_response(&payload, path).await?;
    }

    let articles = perigon::parse_articles(&payload)?;
    if articles.is_empty() {
        warn!("Data received, but no article data found in the payload");
        return Ok(UpsertStats::default());
    }

    let stats = store.upsert_articles(&articles)?;
    info!(
        processed = articles.len(),
        inserted = stats.inserted,
        updated = stats.updated,
        "Import complete"
    );
    Ok(stats)
}

/// Summarize pending articles until none are left or `args.limit` is hit.
///
/// Pages are fetched from `pages` `args.concurrency` at a time; each pending
/// row is visited at most once per run.
#[instrument(level = "info", skip_all, fields(sentences = args.sentences, limit = ?args.limit))]
pub async fn run_summarize<F>(
    store: &ArticleStore,
    pages: &F,
    args: &SummarizeArgs,
) -> Result<RunStats, Box<dyn Error>>
where
    F: FetchAsync<Response = String>,
{
    if args.sentences == 0 {
        return Err(SummarizeError::InvalidArgument("sentence count must be at least 1").into());
    }

    let concurrency = args.concurrency.max(1);
    let mut stats = RunStats::default();
    let mut cursor = 0;

    loop {
        let remaining = args
            .limit
            .map_or(usize::MAX, |l| l.saturating_sub(stats.attempted()));
        if remaining == 0 {
            break;
        }

        let batch = store.pending_articles(cursor, concurrency.min(remaining))?;
        let Some(last) = batch.last() else {
            break;
        };
        cursor = last.id;
        debug!(batch = batch.len(), cursor, "Fetching article pages");

        let fetched: Vec<(ArticleRecord, Result<Option<NewsArticle>, String>)> = stream::iter(batch)
            .map(|record| async move {
                debug!(
                    id = record.id,
                    domain = ?record.domain,
                    language = ?record.language,
                    "Fetching article page"
                );
                let res = page::fetch_article(pages, &record.url)
                    .await
                    .map_err(|e| e.to_string());
                (record, res)
            })
            .buffer_unordered(concurrency)
            .collect()
            .await;

        for (record, res) in fetched {
            let outcome = summarize_fetched(&record, res, args.sentences);
            apply_outcome(store, &record, &outcome)?;
            match outcome {
                Outcome::Summarized(_) => stats.summarized += 1,
                Outcome::Failed(_) => stats.failed += 1,
            }
        }
    }

    info!(
        summarized = stats.summarized,
        failed = stats.failed,
        "Summarization run complete"
    );
    Ok(stats)
}

/// Turn a fetch result into a summary or a failure reason.
///
/// The stored title drives the title bonus; the scraped headline stands in
/// when the row has none.
pub fn summarize_fetched(
    record: &ArticleRecord,
    fetched: Result<Option<NewsArticle>, String>,
    sentences: usize,
) -> Outcome {
    let article = match fetched {
        Ok(Some(article)) => article,
        Ok(None) => return Outcome::Failed("no readable text on page".to_string()),
        Err(e) => return Outcome::Failed(format!("fetch failed: {e}")),
    };

    let title = record
        .title
        .as_deref()
        .filter(|t| !t.trim().is_empty())
        .or(article.headline.as_deref())
        .unwrap_or("");
    debug!(source = %article.source, title, "Summarizing article");

    match summarize(&article.content, title, sentences) {
        Ok(summary) => Outcome::Summarized(summary),
        Err(e) => Outcome::Failed(e.to_string()),
    }
}

/// Persist `outcome` for `record`.
pub fn apply_outcome(
    store: &ArticleStore,
    record: &ArticleRecord,
    outcome: &Outcome,
) -> Result<(), Box<dyn Error>> {
    match outcome {
        Outcome::Summarized(summary) => {
            if !store.save_summary(record.id, summary)? {
                warn!(id = record.id, url = %record.url, "Article row vanished; summary not saved");
                return Ok(());
            }
            info!(
                id = record.id,
                url = %record.url,
                summary = %truncate_for_log(summary, 200),
                "Saved summary"
            );
        }
        Outcome::Failed(reason) => {
            store.record_failure(record.id, reason)?;
            error!(id = record.id, url = %record.url, %reason, "Could not summarize article");
        }
    }
    Ok(())
}

/// Summarize a local file, or stdin when no file is given.
#[instrument(level = "info", skip_all, fields(file = ?args.file))]
pub async fn run_text(args: &TextArgs) -> Result<String, Box<dyn Error>> {
    let text = match &args.file {
        Some(path) => tokio::fs::read_to_string(path).await?,
        None => {
            let mut buf = String::new();
            std::io::stdin().read_to_string(&mut buf)?;
            buf
        }
    };
    debug!(bytes = text.len(), "Read input text");
    Ok(summarize(&text, &args.title, args.sentences)?)
}
