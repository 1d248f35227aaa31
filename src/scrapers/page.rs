//! Readable-text extraction from article pages.
//!
//! Pages are downloaded through any [`FetchAsync`] source (in production the
//! retrying HTTP fetcher from [`crate::api::retrying_fetcher`]) and parsed
//! with `scraper`.
//! Paragraph text is taken from the most specific container available:
//!
//! 1. `<article>` paragraphs
//! 2. `<main>` paragraphs
//! 3. every `<p>` on the page
//!
//! Paragraphs are whitespace-collapsed and joined with blank lines, so the
//! summarizer treats each paragraph break as a sentence boundary.

use crate::api::FetchAsync;
use crate::models::NewsArticle;
use crate::utils::collapse_whitespace;
use once_cell::sync::Lazy;
use scraper::{Html, Selector};
use std::error::Error;
use tracing::{info, instrument};

static PARAGRAPH_SELECTORS: Lazy<Vec<Selector>> = Lazy::new(|| {
    ["article p", "main p", "p"]
        .iter()
        .map(|s| Selector::parse(s).expect("paragraph selector is valid"))
        .collect()
});

static HEADLINE_SELECTORS: Lazy<Vec<Selector>> = Lazy::new(|| {
    ["h1", "title"]
        .iter()
        .map(|s| Selector::parse(s).expect("headline selector is valid"))
        .collect()
});

/// Fetch a single article page and extract its readable text.
///
/// # Returns
///
/// `Ok(None)` when the page downloaded but contained no paragraph text.
#[instrument(level = "info", skip_all, fields(%url))]
pub async fn fetch_article<F>(pages: &F, url: &str) -> Result<Option<NewsArticle>, Box<dyn Error>>
where
    F: FetchAsync<Response = String>,
{
    let body = pages.fetch(url).await?;
    let article = extract_article(url, &body);

    match &article {
        Some(a) => info!(bytes = a.content.len(), "Parsed article page"),
        None => info!("No readable text on page"),
    }
    Ok(article)
}

/// Parse `html` into a [`NewsArticle`], or `None` without paragraph text.
pub fn extract_article(url: &str, html: &str) -> Option<NewsArticle> {
    let document = Html::parse_document(html);

    let content = PARAGRAPH_SELECTORS.iter().find_map(|selector| {
        let paragraphs: Vec<String> = document
            .select(selector)
            .map(|p| collapse_whitespace(&p.text().collect::<String>()))
            .filter(|p| !p.is_empty())
            .collect();
        (!paragraphs.is_empty()).then(|| paragraphs.join("\n\n"))
    })?;

    let headline = HEADLINE_SELECTORS.iter().find_map(|selector| {
        document
            .select(selector)
            .map(|h| collapse_whitespace(&h.text().collect::<String>()))
            .find(|h| !h.is_empty())
    });

    Some(NewsArticle {
        source: url.to_string(),
        headline,
        content,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    const URL: &str = "https://example.com/story";

    #[test]
    fn test_prefers_article_paragraphs() {
        let html = r#"
            <html><head><title>Site | Story</title></head>
            <body>
              <nav><p>Subscribe now</p></nav>
              <article>
                <h1>  Council passes
                   budget </h1>
                <p>The council   voted on Monday.</p>
                <p>
                  The budget adds bus routes.
                </p>
                <p>   </p>
              </article>
              <footer><p>Copyright</p></footer>
            </body></html>"#;

        let article = extract_article(URL, html).unwrap();
        assert_eq!(article.source, URL);
        assert_eq!(article.headline.as_deref(), Some("Council passes budget"));
        assert_eq!(
            article.content,
            "The council voted on Monday.\n\nThe budget adds bus routes."
        );
    }

    #[test]
    fn test_falls_back_to_main_then_any_paragraph() {
        let html = "<body><main><p>Main text.</p></main><p>Aside.</p></body>";
        let article = extract_article(URL, html).unwrap();
        assert_eq!(article.content, "Main text.");

        let html = "<html><head><title>Only title</title></head><body><div><p>Loose text.</p></div></body></html>";
        let article = extract_article(URL, html).unwrap();
        assert_eq!(article.content, "Loose text.");
        assert_eq!(article.headline.as_deref(), Some("Only title"));
    }

    #[test]
    fn test_script_and_style_are_ignored() {
        let html = "<body><script>var x = 1;</script><style>p { color: red }</style><p>Real text.</p></body>";
        let article = extract_article(URL, html).unwrap();
        assert_eq!(article.content, "Real text.");
        assert_eq!(article.headline, None);
    }

    #[test]
    fn test_page_without_paragraphs_is_none() {
        assert!(extract_article(URL, "<html><body><div>Just a div</div></body></html>").is_none());
        assert!(extract_article(URL, "").is_none());
    }
}
