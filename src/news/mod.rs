// src/news/mod.rs
pub mod aggregator;
pub mod classifier;
pub mod company;
pub mod dedup;
pub mod feed;
pub mod fetcher;
pub mod recency;
pub mod types;

use metrics::{describe_counter, describe_gauge, describe_histogram};
use once_cell::sync::OnceCell;
use std::sync::Arc;

use crate::news::aggregator::{Aggregator, MAX_ARTICLES};
use crate::news::company::AnnouncementSource;
use crate::news::dedup::Deduplicator;
use crate::news::types::NormalizedArticle;

/// Window used by the `/latest` command.
pub const ON_DEMAND_WINDOW_HOURS: u32 = 48;
/// Window used by the periodic push; matches the push interval.
pub const SCHEDULED_WINDOW_HOURS: u32 = 6;

/// One-time metrics registration (so series show up on /metrics).
pub fn ensure_metrics_described() {
    static ONCE: OnceCell<()> = OnceCell::new();
    ONCE.get_or_init(|| {
        describe_counter!("news_entries_total", "Feed entries seen by the aggregator.");
        describe_counter!("news_stale_total", "Entries outside the recency window.");
        describe_counter!(
            "news_irrelevant_total",
            "Entries rejected by the keyword classifier."
        );
        describe_counter!("news_dedup_total", "Entries already emitted earlier.");
        describe_counter!(
            "news_over_cap_total",
            "Admitted articles dropped by the per-run cap."
        );
        describe_counter!("news_kept_total", "Articles handed to delivery.");
        describe_counter!(
            "news_source_errors_total",
            "Feed or blog fetch/parse failures."
        );
        describe_histogram!("news_fetch_ms", "Feed fetch+parse time in milliseconds.");
        describe_gauge!("news_last_run_ts", "Unix ts of the last aggregation run.");
    });
}

/// Feed text to plain text: decode entities, drop tags, collapse whitespace.
pub fn normalize_text(s: &str) -> String {
    static RE_TAGS: OnceCell<regex::Regex> = OnceCell::new();
    let re_tags =
        RE_TAGS.get_or_init(|| regex::Regex::new(r"(?is)</?[a-z!][^>]*>").expect("tag regex"));

    // Escaped markup (`&lt;p&gt;`) only becomes a tag after the first decode.
    let decoded = html_escape::decode_html_entities(s);
    let stripped = re_tags.replace_all(&decoded, " ");
    tidy(&html_escape::decode_html_entities(&stripped))
}

/// Titles are plain text: one decode, no tag stripping, so `&lt;think&gt;`
/// stays a literal `<think>`.
pub fn clean_title(s: &str) -> String {
    tidy(&html_escape::decode_html_entities(s))
}

fn tidy(s: &str) -> String {
    static RE_WS: OnceCell<regex::Regex> = OnceCell::new();
    let re_ws = RE_WS.get_or_init(|| regex::Regex::new(r"\s+").expect("whitespace regex"));

    let out = s
        .replace(['\u{201C}', '\u{201D}'], "\"")
        .replace(['\u{2018}', '\u{2019}'], "'")
        .replace('\u{00A0}', " ");
    re_ws.replace_all(&out, " ").trim().to_string()
}

/// Caller-level merge: company announcements first, then feed articles, capped.
pub struct NewsDesk {
    aggregator: Aggregator,
    announcements: Option<Arc<dyn AnnouncementSource>>,
}

impl NewsDesk {
    pub fn new(aggregator: Aggregator) -> Self {
        ensure_metrics_described();
        Self {
            aggregator,
            announcements: None,
        }
    }

    pub fn with_announcements(mut self, source: Arc<dyn AnnouncementSource>) -> Self {
        self.announcements = Some(source);
        self
    }

    pub fn aggregator(&self) -> &Aggregator {
        &self.aggregator
    }

    pub fn dedup(&self) -> &Arc<Deduplicator> {
        self.aggregator.dedup()
    }

    /// Feed names in order, then the announcement source if any.
    pub fn source_names(&self) -> Vec<String> {
        let mut names: Vec<String> = self
            .aggregator
            .sources()
            .iter()
            .map(|s| s.name.clone())
            .collect();
        if let Some(src) = &self.announcements {
            names.push(src.name().to_string());
        }
        names
    }

    /// Company announcements first, then feed articles; at most [`MAX_ARTICLES`].
    pub async fn gather(&self, window_hours: u32) -> Vec<NormalizedArticle> {
        self.gather_at(window_hours, chrono::Utc::now().timestamp()).await
    }

    pub async fn gather_at(&self, window_hours: u32, now_unix: i64) -> Vec<NormalizedArticle> {
        let mut merged: Vec<NormalizedArticle> = match &self.announcements {
            Some(src) => {
                let dedup = self.aggregator.dedup();
                src.announcements()
                    .await
                    .into_iter()
                    .filter(|a| dedup.admit(a.identity()))
                    .collect()
            }
            None => Vec::new(),
        };

        let (feed, _) = self.aggregator.collect_latest_at(window_hours, now_unix).await;
        merged.extend(feed);
        merged.truncate(MAX_ARTICLES);
        merged
    }
}
