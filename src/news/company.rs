// src/news/company.rs
//! Company blog scraping.
//!
//! Blog index pages have no feed, so posts are found by scanning anchor tags for
//! blog-looking hrefs. Markup-agnostic and therefore heuristic: whatever the
//! page links to under `/blog/` with a descriptive enough label is taken as a post.

use anyhow::{Context, Result};
use async_trait::async_trait;
use metrics::counter;
use once_cell::sync::OnceCell;
use regex::Regex;
use reqwest::Client;
use std::time::Duration;

use crate::news::fetcher::{BROWSER_USER_AGENT, FETCH_TIMEOUT_SECS};
use crate::news::normalize_text;
use crate::news::types::NormalizedArticle;

pub const MAX_ANNOUNCEMENTS: usize = 3;
/// Labels this short are navigation ("Blog", "Read more"), not post titles.
pub const MIN_TITLE_CHARS: usize = 10;

/// Anything producing ready-made articles outside the feed pipeline.
#[async_trait]
pub trait AnnouncementSource: Send + Sync {
    /// Label shown in `/help`.
    fn name(&self) -> &str;

    /// Never fails; an unreachable page yields an empty list.
    async fn announcements(&self) -> Vec<NormalizedArticle>;
}

#[derive(Debug, Clone)]
pub struct BlogPage {
    pub page_url: String,
    pub base_url: String,
    pub path_marker: String,
    pub source: String,
    pub summary: String,
}

impl BlogPage {
    pub fn openai() -> Self {
        Self {
            page_url: "https://openai.com/blog/".to_string(),
            base_url: "https://openai.com".to_string(),
            path_marker: "/blog/".to_string(),
            source: "OpenAI Blog".to_string(),
            summary: "Latest announcement from OpenAI".to_string(),
        }
    }

    fn absolute(&self, href: &str) -> String {
        if href.starts_with("http://") || href.starts_with("https://") {
            href.to_string()
        } else if href.starts_with('/') {
            format!("{}{}", self.base_url.trim_end_matches('/'), href)
        } else {
            format!("{}/{}", self.base_url.trim_end_matches('/'), href)
        }
    }
}

fn anchor_re() -> &'static Regex {
    static RE: OnceCell<Regex> = OnceCell::new();
    RE.get_or_init(|| {
        Regex::new(r#"(?is)<a\b[^>]*?\bhref\s*=\s*["']([^"']+)["'][^>]*>(.*?)</a\s*>"#)
            .expect("anchor regex")
    })
}

/// Extract up to [`MAX_ANNOUNCEMENTS`] post links from an HTML page.
pub fn extract_posts(html: &str, page: &BlogPage) -> Vec<NormalizedArticle> {
    let mut out: Vec<NormalizedArticle> = Vec::new();
    for caps in anchor_re().captures_iter(html) {
        let href = html_escape::decode_html_entities(caps[1].trim()).to_string();
        if !href.contains(page.path_marker.as_str()) {
            continue;
        }
        let title = normalize_text(&caps[2]);
        if title.chars().count() <= MIN_TITLE_CHARS {
            continue;
        }
        let link = page.absolute(&href);
        if out.iter().any(|a| a.link() == link) {
            continue;
        }
        out.push(NormalizedArticle::new(
            Some(&title),
            Some(&link),
            Some(&page.summary),
            &page.source,
            Some("Recent"),
        ));
        if out.len() >= MAX_ANNOUNCEMENTS {
            break;
        }
    }
    out
}

pub struct CompanyScraper {
    client: Client,
    page: BlogPage,
}

impl CompanyScraper {
    pub fn new(page: BlogPage) -> Result<Self> {
        let client = Client::builder()
            .user_agent(BROWSER_USER_AGENT)
            .timeout(Duration::from_secs(FETCH_TIMEOUT_SECS))
            .build()
            .context("building scraper http client")?;
        Ok(Self { client, page })
    }

    pub fn page(&self) -> &BlogPage {
        &self.page
    }

    async fn fetch_page(&self) -> Result<String> {
        let resp = self
            .client
            .get(&self.page.page_url)
            .send()
            .await
            .context("blog http get()")?
            .error_for_status()
            .context("blog non-2xx")?;
        resp.text().await.context("blog http .text()")
    }
}

#[async_trait]
impl AnnouncementSource for CompanyScraper {
    fn name(&self) -> &str {
        &self.page.source
    }

    async fn announcements(&self) -> Vec<NormalizedArticle> {
        match self.fetch_page().await {
            Ok(html) => {
                let posts = extract_posts(&html, &self.page);
                tracing::info!(target: "news", source = %self.page.source, posts = posts.len(), "blog scraped");
                posts
            }
            Err(e) => {
                tracing::warn!(target: "news", source = %self.page.source, error = ?e, "blog scrape failed");
                counter!("news_source_errors_total").increment(1);
                Vec::new()
            }
        }
    }
}

/// Fixed list, for wiring tests and for running without the scraper.
#[derive(Debug, Clone, Default)]
pub struct StaticAnnouncements(pub Vec<NormalizedArticle>);

#[async_trait]
impl AnnouncementSource for StaticAnnouncements {
    fn name(&self) -> &str {
        "Company announcements"
    }

    async fn announcements(&self) -> Vec<NormalizedArticle> {
        self.0.clone()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const PAGE: &str = r#"
<html><body>
  <nav><a href="/blog/">Blog</a></nav>
  <a class="card" href="/blog/introducing-something-new"><span>Introducing</span> something new</a>
  <a href="/research/paper-x">A research paper with a long title</a>
  <a href="https://openai.com/blog/introducing-something-new">Introducing something new again</a>
  <a href='/blog/second-post?ref=a&amp;b=c'>Second post title here</a>
  <a href="/blog/third">Third announcement title</a>
  <a href="/blog/fourth">Fourth announcement title</a>
</body></html>"#;

    #[test]
    fn extracts_blog_links_with_descriptive_titles() {
        let posts = extract_posts(PAGE, &BlogPage::openai());
        assert_eq!(posts.len(), MAX_ANNOUNCEMENTS);

        assert_eq!(posts[0].title(), "Introducing something new");
        assert_eq!(posts[0].link(), "https://openai.com/blog/introducing-something-new");
        assert_eq!(posts[0].source(), "OpenAI Blog");
        assert_eq!(posts[0].published(), "Recent");
        assert_eq!(posts[0].summary(), "Latest announcement from OpenAI");

        assert_eq!(posts[1].link(), "https://openai.com/blog/second-post?ref=a&b=c");
        assert_eq!(posts[2].title(), "Third announcement title");
    }

    #[test]
    fn page_without_posts_yields_nothing() {
        assert!(extract_posts("<html><a href='/about'>About us and more</a></html>", &BlogPage::openai()).is_empty());
        assert!(extract_posts("", &BlogPage::openai()).is_empty());
    }

    #[test]
    fn relative_hrefs_are_joined() {
        let p = BlogPage::openai();
        assert_eq!(p.absolute("blog/x"), "https://openai.com/blog/x");
        assert_eq!(p.absolute("/blog/x"), "https://openai.com/blog/x");
        assert_eq!(p.absolute("https://cdn.test/blog/x"), "https://cdn.test/blog/x");
    }
}
