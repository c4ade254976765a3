// src/news/aggregator.rs
use chrono::Utc;
use metrics::{counter, gauge};
use serde::Serialize;
use std::sync::Arc;

use crate::news::classifier::Classifier;
use crate::news::dedup::Deduplicator;
use crate::news::fetcher::FeedFetcher;
use crate::news::recency::RecencyFilter;
use crate::news::types::{FeedSource, NormalizedArticle};

/// Upper bound on articles returned by one collection run.
pub const MAX_ARTICLES: usize = 10;

/// Per-run counters, also exported as Prometheus series.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct RunStats {
    pub sources: usize,
    pub empty_sources: usize,
    pub entries: usize,
    pub stale: usize,
    pub irrelevant: usize,
    pub duplicates: usize,
    /// Admitted but cut by [`MAX_ARTICLES`]; recorded as seen all the same.
    pub over_cap: usize,
    pub kept: usize,
}

/// Runs fetch → recency → normalize → classify → dedup over the configured feeds.
pub struct Aggregator {
    sources: Vec<FeedSource>,
    fetcher: Arc<dyn FeedFetcher>,
    recency: RecencyFilter,
    classifier: Classifier,
    dedup: Arc<Deduplicator>,
}

impl Aggregator {
    pub fn new(
        sources: Vec<FeedSource>,
        fetcher: Arc<dyn FeedFetcher>,
        classifier: Classifier,
        dedup: Arc<Deduplicator>,
    ) -> Self {
        Self {
            sources,
            fetcher,
            recency: RecencyFilter::default(),
            classifier,
            dedup,
        }
    }

    pub fn with_recency(mut self, recency: RecencyFilter) -> Self {
        self.recency = recency;
        self
    }

    pub fn sources(&self) -> &[FeedSource] {
        &self.sources
    }

    pub fn dedup(&self) -> &Arc<Deduplicator> {
        &self.dedup
    }

    /// Fresh, relevant, not-yet-emitted articles in source order then feed order,
    /// at most [`MAX_ARTICLES`]. Never fails; sources that cannot be read simply
    /// contribute nothing.
    pub async fn collect_latest(&self, window_hours: u32) -> Vec<NormalizedArticle> {
        self.collect_latest_at(window_hours, Utc::now().timestamp())
            .await
            .0
    }

    /// Explicit clock, also returning the run counters.
    ///
    /// Every source is fetched and every fresh, relevant entry goes through the
    /// seen-set; the cap is applied once at the end, so overflow is consumed.
    pub async fn collect_latest_at(
        &self,
        window_hours: u32,
        now_unix: i64,
    ) -> (Vec<NormalizedArticle>, RunStats) {
        let mut out = Vec::new();
        let mut stats = RunStats::default();

        for source in &self.sources {
            tracing::info!(target: "news", source = %source.name, "fetching");
            stats.sources += 1;

            let entries = self.fetcher.fetch(&source.url).await;
            if entries.is_empty() {
                stats.empty_sources += 1;
            }

            for entry in &entries {
                stats.entries += 1;

                if !self
                    .recency
                    .is_recent_at(entry.published.as_deref(), window_hours, now_unix)
                {
                    stats.stale += 1;
                    continue;
                }

                let article = NormalizedArticle::from_raw(entry, &source.name);

                // Classified on the full summary, not the truncated display copy.
                let verdict = self
                    .classifier
                    .evaluate(article.title(), entry.summary.as_deref().unwrap_or_default());
                if !verdict.relevant {
                    tracing::debug!(
                        target: "news",
                        source = %source.name,
                        title = article.title(),
                        blocked_by = ?verdict.blocked_by,
                        "not relevant"
                    );
                    stats.irrelevant += 1;
                    continue;
                }

                if !self.dedup.admit(article.identity()) {
                    stats.duplicates += 1;
                    continue;
                }

                tracing::debug!(
                    target: "news",
                    source = %source.name,
                    title = article.title(),
                    matched = ?verdict.matched,
                    "accepted"
                );
                out.push(article);
            }
        }

        if out.len() > MAX_ARTICLES {
            stats.over_cap = out.len() - MAX_ARTICLES;
            tracing::info!(
                target: "news",
                cap = MAX_ARTICLES,
                dropped = stats.over_cap,
                "article cap reached"
            );
            out.truncate(MAX_ARTICLES);
        }
        stats.kept = out.len();
        record_metrics(&stats, now_unix);
        tracing::info!(
            target: "news",
            window_hours,
            sources = stats.sources,
            empty_sources = stats.empty_sources,
            entries = stats.entries,
            stale = stats.stale,
            irrelevant = stats.irrelevant,
            duplicates = stats.duplicates,
            over_cap = stats.over_cap,
            kept = stats.kept,
            "collection finished"
        );
        (out, stats)
    }
}

fn record_metrics(stats: &RunStats, now_unix: i64) {
    counter!("news_entries_total").increment(stats.entries as u64);
    counter!("news_stale_total").increment(stats.stale as u64);
    counter!("news_irrelevant_total").increment(stats.irrelevant as u64);
    counter!("news_dedup_total").increment(stats.duplicates as u64);
    counter!("news_over_cap_total").increment(stats.over_cap as u64);
    counter!("news_kept_total").increment(stats.kept as u64);
    gauge!("news_last_run_ts").set(now_unix as f64);
}
