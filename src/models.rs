//! Data models for imported, stored, and scraped news articles.
//!
//! This module defines the core data structures used throughout the application:
//! - [`PerigonResponse`] / [`PerigonArticle`]: payload of the Perigon news API
//! - [`ArticleRecord`]: an article row waiting for a summary
//! - [`NewsArticle`]: readable text scraped from an article page
//!
//! API fields are optional because the upstream payload omits them freely;
//! missing values become `NULL` columns rather than import failures.

use serde::{Deserialize, Serialize};

/// Top-level response of `GET /v1/articles/all`.
#[derive(Debug, Default, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PerigonResponse {
    /// HTTP-like status echoed in the body.
    pub status: Option<u16>,
    /// Total matches for the query (present when `showNumResults=true`).
    pub num_results: Option<u64>,
    /// The page of articles.
    #[serde(default)]
    pub articles: Vec<PerigonArticle>,
}

/// One article as returned by the Perigon API.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PerigonArticle {
    pub url: Option<String>,
    pub title: Option<String>,
    pub description: Option<String>,
    pub image_url: Option<String>,
    pub source: Option<PerigonSource>,
    pub country: Option<String>,
    pub language: Option<String>,
    pub medium: Option<String>,
    pub pub_date: Option<String>,
    pub score: Option<f64>,
    pub sentiment: Option<PerigonSentiment>,
}

impl PerigonArticle {
    /// The publishing domain, e.g. `"apnews.com"`.
    pub fn domain(&self) -> Option<&str> {
        self.source.as_ref().and_then(|s| s.domain.as_deref())
    }

    /// The positive sentiment probability, if scored.
    pub fn sentiment_positive(&self) -> Option<f64> {
        self.sentiment.as_ref().and_then(|s| s.positive)
    }
}

/// Publisher block of a [`PerigonArticle`].
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct PerigonSource {
    pub domain: Option<String>,
}

/// Sentiment block of a [`PerigonArticle`].
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct PerigonSentiment {
    pub positive: Option<f64>,
}

/// A stored article that still needs a summary.
#[derive(Debug, Clone, PartialEq)]
pub struct ArticleRecord {
    pub id: i64,
    pub url: String,
    pub title: Option<String>,
    pub domain: Option<String>,
    pub language: Option<String>,
}

/// Readable text scraped from an article page.
///
/// # Fields
///
/// * `source` - The URL the page was fetched from
/// * `headline` - The page's `<h1>` or `<title>`, when present
/// * `content` - Paragraph text, paragraphs separated by blank lines
#[derive(Debug)]
pub struct NewsArticle {
    pub source: String,
    pub headline: Option<String>,
    pub content: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_response_deserialization() {
        let json = r#"{
            "status": 200,
            "numResults": 2,
            "articles": [
                {
                    "url": "https://apnews.com/article/one",
                    "title": "First",
                    "imageUrl": "https://img.example/1.jpg",
                    "source": { "domain": "apnews.com" },
                    "language": "en",
                    "pubDate": "2025-05-06T12:00:00+00:00",
                    "score": 42.5,
                    "sentiment": { "positive": 0.7, "negative": 0.1, "neutral": 0.2 },
                    "unknownField": true
                },
                { "title": "No url here" }
            ]
        }"#;

        let response: PerigonResponse = serde_json::from_str(json).unwrap();
        assert_eq!(response.status, Some(200));
        assert_eq!(response.num_results, Some(2));
        assert_eq!(response.articles.len(), 2);

        let first = &response.articles[0];
        assert_eq!(first.domain(), Some("apnews.com"));
        assert_eq!(first.sentiment_positive(), Some(0.7));
        assert_eq!(first.image_url.as_deref(), Some("https://img.example/1.jpg"));
        assert_eq!(first.pub_date.as_deref(), Some("2025-05-06T12:00:00+00:00"));

        let second = &response.articles[1];
        assert!(second.url.is_none());
        assert_eq!(second.domain(), None);
        assert_eq!(second.sentiment_positive(), None);
    }

    #[test]
    fn test_response_without_articles() {
        let response: PerigonResponse = serde_json::from_str(r#"{"status": 200}"#).unwrap();
        assert!(response.articles.is_empty());
    }
}
