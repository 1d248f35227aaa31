//! HTTP fetching with exponential backoff retry logic.
//!
//! Both the news API and article pages are plain `GET` requests whose
//! failures are mostly transient (rate limits, timeouts, flaky origins).
//! This module wraps them in a retry decorator with exponential backoff and
//! jitter.
//!
//! # Architecture
//!
//! - [`FetchAsync`]: Core trait defining an async fetch of a URL
//! - [`HttpFetcher`]: Wraps a shared `reqwest::Client`
//! - [`RetryFetch`]: Decorator that adds retry logic to any `FetchAsync` implementation
//!
//! # Retry Strategy
//!
//! - Maximum 5 retry attempts
//! - Exponential backoff starting at 1 second
//! - Maximum delay capped at 30 seconds
//! - Random jitter (0-250ms) added to prevent thundering herd
//! - Client errors other than 429 ([`StatusError`]) fail immediately

use rand::{Rng, rng};
use reqwest::{Client, StatusCode};
use std::error::Error;
use std::fmt;
use std::time::{Duration as StdDuration, Instant};
use tokio::time::sleep;
use tracing::{debug, error, instrument, warn};

/// A response with a non-success status code.
#[derive(Debug, thiserror::Error)]
#[error("HTTP {status} for {url}")]
pub struct StatusError {
    pub status: StatusCode,
    pub url: String,
}

impl StatusError {
    /// Server errors and rate limiting may clear up; other statuses will not.
    pub fn is_retryable(&self) -> bool {
        self.status.is_server_error() || self.status == StatusCode::TOO_MANY_REQUESTS
    }
}

/// Transport errors and anything without a status are retried.
fn is_retryable(err: &(dyn Error + 'static)) -> bool {
    err.downcast_ref::<StatusError>()
        .is_none_or(StatusError::is_retryable)
}

/// Trait for fetching a URL asynchronously.
///
/// Implementors return the response body; decorators such as [`RetryFetch`]
/// can wrap any implementation.
pub trait FetchAsync {
    /// The type of response returned.
    type Response;

    /// Fetch `url` and return its body.
    async fn fetch(&self, url: &str) -> Result<Self::Response, Box<dyn Error>>;
}

/// Wrapper that adds exponential backoff retry logic to any [`FetchAsync`] implementation.
///
/// The delay between retries follows this formula:
/// ```text
/// delay = min(base_delay * 2^(attempt-1), max_delay) + random_jitter(0..250ms)
/// ```
pub struct RetryFetch<T> {
    /// The underlying fetcher to wrap.
    inner: T,
    /// Maximum number of retry attempts before giving up.
    max_retries: usize,
    /// Initial delay between retries (doubles with each attempt).
    base_delay: StdDuration,
    /// Maximum delay cap to prevent excessive waiting.
    max_delay: StdDuration,
}

impl<T> RetryFetch<T>
where
    T: FetchAsync,
{
    /// Create a new retry wrapper around an existing [`FetchAsync`] implementation.
    ///
    /// # Example
    ///
    /// ```ignore
    /// let fetcher = HttpFetcher { client: &client };
    /// let retrying = RetryFetch::new(fetcher, 5, Duration::from_secs(1));
    /// ```
    pub fn new(inner: T, max_retries: usize, base_delay: StdDuration) -> Self {
        Self {
            inner,
            max_retries,
            base_delay,
            max_delay: StdDuration::from_secs(30),
        }
    }

    /// Backoff before retry number `attempt` (1-based), without jitter.
    fn backoff(&self, attempt: usize) -> StdDuration {
        let shift = (attempt - 1).min(31) as u32;
        self.base_delay
            .saturating_mul(1u32 << shift)
            .min(self.max_delay)
    }
}

impl<T> fmt::Debug for RetryFetch<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RetryFetch")
            .field("max_retries", &self.max_retries)
            .field("base_delay", &self.base_delay)
            .field("max_delay", &self.max_delay)
            .finish()
    }
}

impl<T> FetchAsync for RetryFetch<T>
where
    T: FetchAsync,
{
    type Response = T::Response;

    #[instrument(level = "debug", skip_all, fields(%url))]
    async fn fetch(&self, url: &str) -> Result<Self::Response, Box<dyn Error>> {
        let total_t0 = Instant::now();
        let mut attempt = 0usize;

        loop {
            let attempt_t0 = Instant::now();
            match self.inner.fetch(url).await {
                Ok(resp) => {
                    return Ok(resp);
                }
                Err(e) => {
                    attempt += 1;
                    let attempt_dt = attempt_t0.elapsed();
                    let total_dt = total_t0.elapsed();

                    if !is_retryable(&*e) {
                        warn!(
                            attempt,
                            elapsed_ms_total = total_dt.as_millis(),
                            error = %e,
                            "fetch() failed permanently; not retrying"
                        );
                        return Err(e);
                    }

                    if attempt > self.max_retries {
                        error!(
                            attempt,
                            max = self.max_retries,
                            elapsed_ms_attempt = attempt_dt.as_millis(),
                            elapsed_ms_total = total_dt.as_millis(),
                            error = %e,
                            "fetch() exhausted retries"
                        );
                        return Err(e);
                    }

                    let jitter_ms: u64 = rng().random_range(0..=250);
                    let delay = self.backoff(attempt) + StdDuration::from_millis(jitter_ms);

                    warn!(
                        attempt,
                        max = self.max_retries,
                        elapsed_ms_attempt = attempt_dt.as_millis(),
                        elapsed_ms_total = total_dt.as_millis(),
                        ?delay,
                        error = %e,
                        "fetch() attempt failed; backing off"
                    );
                    sleep(delay).await;
                }
            }
        }
    }
}

/// [`FetchAsync`] over a shared `reqwest::Client`.
///
/// Non-success status codes are turned into [`StatusError`]s.
#[derive(Debug)]
pub struct HttpFetcher<'a> {
    pub client: &'a Client,
}

impl<'a> FetchAsync for HttpFetcher<'a> {
    type Response = String;

    async fn fetch(&self, url: &str) -> Result<Self::Response, Box<dyn Error>> {
        let t0 = Instant::now();
        let body = get_text(self.client, url).await;
        let dt = t0.elapsed();

        match &body {
            Ok(b) => debug!(elapsed_ms = dt.as_millis(), bytes = b.len(), "GET succeeded"),
            Err(e) => warn!(elapsed_ms = dt.as_millis(), error = %e, "GET failed"),
        }
        Ok(body?)
    }
}

async fn get_text(client: &Client, url: &str) -> Result<String, Box<dyn Error>> {
    let resp = client.get(url).send().await?;
    let status = resp.status();
    if !status.is_success() {
        return Err(StatusError {
            status,
            url: url.to_string(),
        }
        .into());
    }
    Ok(resp.text().await?)
}

/// [`HttpFetcher`] with up to 5 retries and exponential backoff.
///
/// # Retry Behavior
///
/// - Exponential backoff: 1s, 2s, 4s, 8s, 16s (capped at 30s)
/// - Random jitter added to prevent thundering herd
pub fn retrying_fetcher(client: &Client) -> RetryFetch<HttpFetcher<'_>> {
    RetryFetch::new(HttpFetcher { client }, 5, StdDuration::from_secs(1))
}

/// GET `url` through [`retrying_fetcher`].
#[instrument(level = "info", skip_all, fields(%url))]
pub async fn fetch_with_backoff(client: &Client, url: &str) -> Result<String, Box<dyn Error>> {
    retrying_fetcher(client).fetch(url).await
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::Cell;

    /// Fails a fixed number of times, then succeeds.
    struct Flaky {
        failures_left: Cell<usize>,
        calls: Cell<usize>,
    }

    impl FetchAsync for Flaky {
        type Response = String;

        async fn fetch(&self, url: &str) -> Result<Self::Response, Box<dyn Error>> {
            self.calls.set(self.calls.get() + 1);
            if self.failures_left.get() > 0 {
                self.failures_left.set(self.failures_left.get() - 1);
                Err("temporary failure".into())
            } else {
                Ok(format!("body of {url}"))
            }
        }
    }

    /// Always answers with the same HTTP status.
    struct Status {
        status: StatusCode,
        calls: Cell<usize>,
    }

    impl FetchAsync for Status {
        type Response = String;

        async fn fetch(&self, url: &str) -> Result<Self::Response, Box<dyn Error>> {
            self.calls.set(self.calls.get() + 1);
            Err(StatusError {
                status: self.status,
                url: url.to_string(),
            }
            .into())
        }
    }

    fn status(status: StatusCode) -> Status {
        Status {
            status,
            calls: Cell::new(0),
        }
    }

    fn flaky(failures: usize) -> Flaky {
        Flaky {
            failures_left: Cell::new(failures),
            calls: Cell::new(0),
        }
    }

    #[tokio::test(start_paused = true)]
    async fn test_retry_recovers_after_failures() {
        let retry = RetryFetch::new(flaky(2), 5, StdDuration::from_millis(10));
        let body = retry.fetch("https://example.com").await.unwrap();
        assert_eq!(body, "body of https://example.com");
        assert_eq!(retry.inner.calls.get(), 3);
    }

    #[tokio::test(start_paused = true)]
    async fn test_retry_gives_up_after_max_retries() {
        let retry = RetryFetch::new(flaky(10), 2, StdDuration::from_millis(10));
        let err = retry.fetch("https://example.com").await.unwrap_err();
        assert_eq!(err.to_string(), "temporary failure");
        assert_eq!(retry.inner.calls.get(), 3);
    }

    #[tokio::test(start_paused = true)]
    async fn test_client_error_is_not_retried() {
        let retry = RetryFetch::new(status(StatusCode::NOT_FOUND), 5, StdDuration::from_millis(10));
        let err = retry.fetch("https://example.com/gone").await.unwrap_err();
        assert_eq!(err.to_string(), "HTTP 404 Not Found for https://example.com/gone");
        assert_eq!(retry.inner.calls.get(), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_server_error_and_rate_limit_are_retried() {
        let retry = RetryFetch::new(status(StatusCode::SERVICE_UNAVAILABLE), 2, StdDuration::from_millis(10));
        retry.fetch("https://example.com").await.unwrap_err();
        assert_eq!(retry.inner.calls.get(), 3);

        let retry = RetryFetch::new(status(StatusCode::TOO_MANY_REQUESTS), 2, StdDuration::from_millis(10));
        retry.fetch("https://example.com").await.unwrap_err();
        assert_eq!(retry.inner.calls.get(), 3);
    }

    #[test]
    fn test_backoff_doubles_and_caps() {
        let retry = RetryFetch::new(flaky(0), 5, StdDuration::from_secs(1));
        assert_eq!(retry.backoff(1), StdDuration::from_secs(1));
        assert_eq!(retry.backoff(2), StdDuration::from_secs(2));
        assert_eq!(retry.backoff(5), StdDuration::from_secs(16));
        assert_eq!(retry.backoff(6), StdDuration::from_secs(30));
        assert_eq!(retry.backoff(40), StdDuration::from_secs(30));
    }
}
