// src/news/fetcher.rs
use anyhow::{Context, Result};
use async_trait::async_trait;
use metrics::{counter, histogram};
use reqwest::Client;
use std::collections::HashMap;
use std::time::{Duration, Instant};

use crate::news::feed::parse_feed;
use crate::news::types::RawFeedEntry;

/// Browser-like identification; several publishers refuse obvious bot agents.
pub const BROWSER_USER_AGENT: &str =
    "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/120.0 Safari/537.36";
pub const FETCH_TIMEOUT_SECS: u64 = 10;

#[derive(Debug, thiserror::Error)]
pub enum FeedError {
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("unexpected HTTP status {0}")]
    Status(u16),

    #[error("feed parse error: {0}")]
    Parse(String),
}

/// Retrieves one feed. Implementations swallow their own failures: a source that
/// cannot be read contributes no entries.
#[async_trait]
pub trait FeedFetcher: Send + Sync {
    async fn fetch(&self, url: &str) -> Vec<RawFeedEntry>;
}

pub struct HttpFeedFetcher {
    client: Client,
}

impl HttpFeedFetcher {
    pub fn new() -> Result<Self> {
        Self::with_timeout(Duration::from_secs(FETCH_TIMEOUT_SECS))
    }

    pub fn with_timeout(timeout: Duration) -> Result<Self> {
        let client = Client::builder()
            .user_agent(BROWSER_USER_AGENT)
            .timeout(timeout)
            .build()
            .context("building feed http client")?;
        Ok(Self { client })
    }

    /// Fallible variant of [`FeedFetcher::fetch`].
    pub async fn try_fetch(&self, url: &str) -> Result<Vec<RawFeedEntry>, FeedError> {
        let t0 = Instant::now();
        let resp = self.client.get(url).send().await?;
        let status = resp.status();
        if !status.is_success() {
            return Err(FeedError::Status(status.as_u16()));
        }
        let body = resp.text().await?;
        let entries = parse_feed(&body)?;

        histogram!("news_fetch_ms").record(t0.elapsed().as_secs_f64() * 1_000.0);
        Ok(entries)
    }
}

#[async_trait]
impl FeedFetcher for HttpFeedFetcher {
    async fn fetch(&self, url: &str) -> Vec<RawFeedEntry> {
        match self.try_fetch(url).await {
            Ok(entries) => {
                tracing::debug!(target: "news", %url, entries = entries.len(), "feed fetched");
                entries
            }
            Err(e) => {
                tracing::warn!(target: "news", %url, error = %e, "feed fetch failed");
                counter!("news_source_errors_total").increment(1);
                Vec::new()
            }
        }
    }
}

/// Serves feed documents from memory, keyed by URL. Unknown URLs and documents
/// that do not parse yield no entries, like an unreachable source would.
#[derive(Debug, Clone, Default)]
pub struct FixtureFetcher {
    documents: HashMap<String, String>,
}

impl FixtureFetcher {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_document(mut self, url: &str, xml: &str) -> Self {
        self.documents.insert(url.to_string(), xml.to_string());
        self
    }
}

#[async_trait]
impl FeedFetcher for FixtureFetcher {
    async fn fetch(&self, url: &str) -> Vec<RawFeedEntry> {
        let Some(xml) = self.documents.get(url) else {
            tracing::warn!(target: "news", %url, "no fixture for url");
            return Vec::new();
        };
        match parse_feed(xml) {
            Ok(entries) => entries,
            Err(e) => {
                tracing::warn!(target: "news", %url, error = %e, "fixture parse failed");
                Vec::new()
            }
        }
    }
}
