//! Article discovery and content fetching.
//!
//! The pipeline follows a two-phase pattern:
//!
//! 1. **Indexing**: Discover recent articles from the news API ([`perigon`])
//! 2. **Fetching**: Download each article page and extract readable text ([`page`])
//!
//! Both phases go through the retry decorator in [`crate::api`], so transient
//! network failures are retried before they surface as errors.

pub mod page;
pub mod perigon;
