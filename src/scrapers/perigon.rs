//! Perigon news API client.
//!
//! Queries [`/v1/articles/all`](https://docs.perigon.io) for the most recent
//! English articles within a rolling date window, newest first, reprints
//! excluded.
//!
//! # Query
//!
//! ```text
//! GET https://api.perigon.io/v1/articles/all
//!     ?language=en&from=2025-04-29&to=2025-05-06&sortBy=date
//!     &showNumResults=true&page=0&size=100&showReprints=false&apiKey=...
//! ```

use crate::api::fetch_with_backoff;
use crate::models::{PerigonArticle, PerigonResponse};
use crate::utils::mask_secret;
use chrono::{Duration, NaiveDate};
use reqwest::Client;
use serde::Deserialize;
use std::error::Error;
use tracing::{debug, info, instrument};
use url::Url;

/// Public endpoint for article search.
pub const DEFAULT_BASE_URL: &str = "https://api.perigon.io/v1/articles/all";

/// Parameters of one article search request.
#[derive(Debug, Clone, PartialEq)]
pub struct PerigonQuery {
    pub language: String,
    pub from: NaiveDate,
    pub to: NaiveDate,
    pub page: u32,
    pub size: u32,
}

impl PerigonQuery {
    /// First page of articles published between `today - days` and `today`.
    pub fn last_days(today: NaiveDate, days: i64, language: &str, size: u32) -> Self {
        Self {
            language: language.to_string(),
            from: today - Duration::days(days),
            to: today,
            page: 0,
            size,
        }
    }

    /// Build the full request URL, API key included.
    pub fn to_url(&self, base_url: &str, api_key: &str) -> Result<Url, url::ParseError> {
        Url::parse_with_params(
            base_url,
            &[
                ("language", self.language.clone()),
                ("from", self.from.to_string()),
                ("to", self.to.to_string()),
                ("sortBy", "date".to_string()),
                ("showNumResults", "true".to_string()),
                ("page", self.page.to_string()),
                ("size", self.size.to_string()),
                ("showReprints", "false".to_string()),
                ("apiKey", api_key.to_string()),
            ],
        )
    }
}

/// Run `query` against the API and return the raw JSON payload.
///
/// The raw value is kept so callers can dump it verbatim; use
/// [`parse_articles`] to get typed articles out of it.
#[instrument(level = "info", skip_all, fields(from = %query.from, to = %query.to))]
pub async fn index_articles(
    client: &Client,
    base_url: &str,
    api_key: &str,
    query: &PerigonQuery,
) -> Result<serde_json::Value, Box<dyn Error>> {
    info!(key = %mask_secret(api_key), "Using Perigon API key");
    let url = query.to_url(base_url, api_key)?;

    let body = fetch_with_backoff(client, url.as_str()).await?;
    let payload: serde_json::Value = serde_json::from_str(&body)?;

    let count = payload
        .get("articles")
        .and_then(|a| a.as_array())
        .map_or(0, Vec::len);
    info!(count, "Fetched Perigon articles");
    debug!(num_results = ?payload.get("numResults"), "Perigon result total");

    Ok(payload)
}

/// Extract the typed article list from a raw API payload.
pub fn parse_articles(payload: &serde_json::Value) -> Result<Vec<PerigonArticle>, serde_json::Error> {
    PerigonResponse::deserialize(payload).map(|r| r.articles)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn may_6() -> NaiveDate {
        NaiveDate::from_ymd_opt(2025, 5, 6).unwrap()
    }

    #[test]
    fn test_last_days_window() {
        let q = PerigonQuery::last_days(may_6(), 7, "en", 100);
        assert_eq!(q.from, NaiveDate::from_ymd_opt(2025, 4, 29).unwrap());
        assert_eq!(q.to, may_6());
        assert_eq!(q.page, 0);
        assert_eq!(q.size, 100);
    }

    #[test]
    fn test_to_url_contains_all_params() {
        let q = PerigonQuery::last_days(may_6(), 7, "en", 100);
        let url = q.to_url(DEFAULT_BASE_URL, "k&y").unwrap();

        assert_eq!(url.host_str(), Some("api.perigon.io"));
        assert_eq!(url.path(), "/v1/articles/all");

        let pairs: Vec<(String, String)> = url
            .query_pairs()
            .map(|(k, v)| (k.into_owned(), v.into_owned()))
            .collect();
        let get = |key: &str| {
            pairs
                .iter()
                .find(|(k, _)| k == key)
                .map(|(_, v)| v.as_str())
        };
        assert_eq!(get("language"), Some("en"));
        assert_eq!(get("from"), Some("2025-04-29"));
        assert_eq!(get("to"), Some("2025-05-06"));
        assert_eq!(get("sortBy"), Some("date"));
        assert_eq!(get("showNumResults"), Some("true"));
        assert_eq!(get("page"), Some("0"));
        assert_eq!(get("size"), Some("100"));
        assert_eq!(get("showReprints"), Some("false"));
        assert_eq!(get("apiKey"), Some("k&y"));
    }

    #[test]
    fn test_to_url_rejects_bad_base() {
        let q = PerigonQuery::last_days(may_6(), 1, "en", 10);
        assert!(q.to_url("not a url", "key").is_err());
    }

    #[test]
    fn test_parse_articles() {
        let payload = json!({
            "status": 200,
            "numResults": 1,
            "articles": [{ "url": "https://example.com/a", "title": "A" }]
        });
        let articles = parse_articles(&payload).unwrap();
        assert_eq!(articles.len(), 1);
        assert_eq!(articles[0].title.as_deref(), Some("A"));

        assert!(parse_articles(&json!({})).unwrap().is_empty());
        assert!(parse_articles(&json!({ "articles": "nope" })).is_err());
    }
}
