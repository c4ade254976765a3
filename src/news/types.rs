// src/news/types.rs
use serde::{Deserialize, Serialize};

pub const DEFAULT_TITLE: &str = "No title";
pub const DEFAULT_SOURCE: &str = "Unknown";
pub const DEFAULT_PUBLISHED: &str = "Unknown date";

/// Summaries longer than this (in chars) are cut and suffixed with [`ELLIPSIS`].
pub const SUMMARY_MAX_CHARS: usize = 300;
pub const ELLIPSIS: &str = "...";

/// One `item`/`entry` as extracted from a feed document, before normalization.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RawFeedEntry {
    pub title: Option<String>,
    pub link: Option<String>,
    pub summary: Option<String>,
    pub published: Option<String>,
    pub position: usize,
}

/// A named feed URL.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FeedSource {
    pub name: String,
    pub url: String,
}

impl FeedSource {
    pub fn new(name: &str, url: &str) -> Self {
        Self {
            name: name.to_string(),
            url: url.to_string(),
        }
    }
}

/// The feeds polled when no `feeds.toml` overrides them. Order is the merge order.
pub fn default_sources() -> Vec<FeedSource> {
    vec![
        FeedSource::new(
            "techcrunch_ai",
            "https://techcrunch.com/category/artificial-intelligence/feed/",
        ),
        FeedSource::new("venturebeat_ai", "https://venturebeat.com/ai/feed/"),
        FeedSource::new(
            "the_verge_ai",
            "https://www.theverge.com/ai-artificial-intelligence/rss/index.xml",
        ),
        FeedSource::new(
            "ars_technica",
            "https://feeds.arstechnica.com/arstechnica/technology-lab",
        ),
        FeedSource::new("ai_news", "https://artificialintelligence-news.com/feed/"),
    ]
}

/// Article record handed to classification, dedup and formatting.
/// Immutable once built; `identity` is fixed at construction.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct NormalizedArticle {
    title: String,
    link: String,
    summary: String,
    source: String,
    published: String,
    identity: String,
}

impl NormalizedArticle {
    /// Applies the field defaults and summary truncation.
    pub fn new(
        title: Option<&str>,
        link: Option<&str>,
        summary: Option<&str>,
        source: &str,
        published: Option<&str>,
    ) -> Self {
        let title = non_blank(title).unwrap_or(DEFAULT_TITLE).to_string();
        let link = link.map(str::trim).unwrap_or_default().to_string();
        let summary = truncate_summary(summary.unwrap_or_default());
        let source = non_blank(Some(source)).unwrap_or(DEFAULT_SOURCE).to_string();
        let published = non_blank(published)
            .unwrap_or(DEFAULT_PUBLISHED)
            .to_string();
        let identity = if link.is_empty() {
            title.clone()
        } else {
            link.clone()
        };

        Self {
            title,
            link,
            summary,
            source,
            published,
            identity,
        }
    }

    /// Normalize a raw feed entry coming from `source`.
    pub fn from_raw(entry: &RawFeedEntry, source: &str) -> Self {
        Self::new(
            entry.title.as_deref(),
            entry.link.as_deref(),
            entry.summary.as_deref(),
            source,
            entry.published.as_deref(),
        )
    }

    pub fn title(&self) -> &str {
        &self.title
    }

    pub fn link(&self) -> &str {
        &self.link
    }

    pub fn summary(&self) -> &str {
        &self.summary
    }

    pub fn source(&self) -> &str {
        &self.source
    }

    pub fn published(&self) -> &str {
        &self.published
    }

    pub fn identity(&self) -> &str {
        &self.identity
    }
}

fn non_blank(s: Option<&str>) -> Option<&str> {
    s.map(str::trim).filter(|s| !s.is_empty())
}

/// Cut to [`SUMMARY_MAX_CHARS`] chars plus ellipsis; shorter input is returned as is.
pub fn truncate_summary(summary: &str) -> String {
    if summary.chars().count() <= SUMMARY_MAX_CHARS {
        return summary.to_string();
    }
    let mut out: String = summary.chars().take(SUMMARY_MAX_CHARS).collect();
    out.push_str(ELLIPSIS);
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_fill_missing_fields() {
        let a = NormalizedArticle::new(None, None, None, "", None);
        assert_eq!(a.title(), DEFAULT_TITLE);
        assert_eq!(a.source(), DEFAULT_SOURCE);
        assert_eq!(a.published(), DEFAULT_PUBLISHED);
        assert_eq!(a.link(), "");
        assert_eq!(a.summary(), "");
    }

    #[test]
    fn blank_title_gets_default() {
        let a = NormalizedArticle::new(Some("   "), None, None, "ai_news", Some(" "));
        assert_eq!(a.title(), DEFAULT_TITLE);
        assert_eq!(a.published(), DEFAULT_PUBLISHED);
    }

    #[test]
    fn identity_prefers_link_then_title() {
        let with_link = NormalizedArticle::new(
            Some("Title"),
            Some("https://example.test/a"),
            None,
            "s",
            None,
        );
        assert_eq!(with_link.identity(), "https://example.test/a");

        let no_link = NormalizedArticle::new(Some("Title"), Some(""), None, "s", None);
        assert_eq!(no_link.identity(), "Title");
    }

    #[test]
    fn summary_truncation_boundary() {
        let exact = "a".repeat(SUMMARY_MAX_CHARS);
        assert_eq!(truncate_summary(&exact), exact);

        let long = "b".repeat(SUMMARY_MAX_CHARS + 1);
        let cut = truncate_summary(&long);
        assert_eq!(cut.chars().count(), SUMMARY_MAX_CHARS + ELLIPSIS.len());
        assert!(cut.ends_with(ELLIPSIS));
    }

    #[test]
    fn truncation_counts_chars_not_bytes() {
        let long = "é".repeat(400);
        let cut = truncate_summary(&long);
        assert_eq!(cut.chars().count(), 303);
    }

    #[test]
    fn default_sources_keep_configured_order() {
        let names: Vec<_> = default_sources().into_iter().map(|s| s.name).collect();
        assert_eq!(
            names,
            vec![
                "techcrunch_ai",
                "venturebeat_ai",
                "the_verge_ai",
                "ars_technica",
                "ai_news"
            ]
        );
    }
}
