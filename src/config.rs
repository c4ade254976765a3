// src/config.rs
use anyhow::{anyhow, bail, Context, Result};
use serde::Deserialize;
use std::fmt;
use std::fs;
use std::net::SocketAddr;
use std::path::{Path, PathBuf};
use std::time::Duration;

use crate::bot::telegram::DEFAULT_API_BASE;
use crate::news::classifier::Classifier;
use crate::news::types::{default_sources, FeedSource};

pub const ENV_BOT_TOKEN: &str = "TELEGRAM_BOT_TOKEN";
pub const ENV_API_BASE: &str = "TELEGRAM_API_BASE";
pub const ENV_FEEDS_PATH: &str = "NEWS_FEEDS_PATH";
pub const ENV_KEYWORDS_PATH: &str = "NEWS_KEYWORDS_PATH";
pub const ENV_PUSH_INTERVAL_HOURS: &str = "PUSH_INTERVAL_HOURS";
pub const ENV_SEND_DELAY_MS: &str = "SEND_DELAY_MS";
pub const ENV_STATUS_ADDR: &str = "STATUS_ADDR";

pub const DEFAULT_FEEDS_PATH: &str = "config/feeds.toml";
pub const DEFAULT_KEYWORDS_PATH: &str = "config/keywords.toml";
pub const DEFAULT_PUSH_INTERVAL_HOURS: u64 = 6;
pub const DEFAULT_SEND_DELAY_MS: u64 = 1000;
pub const DEFAULT_STATUS_ADDR: &str = "127.0.0.1:8080";

pub struct AppConfig {
    pub bot_token: String,
    pub api_base: String,
    pub feeds: Vec<FeedSource>,
    pub classifier: Classifier,
    pub push_interval_hours: u64,
    pub send_delay: Duration,
    /// `None` when the status API is switched off.
    pub status_addr: Option<SocketAddr>,
}

impl fmt::Debug for AppConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AppConfig")
            .field("bot_token", &"<redacted>")
            .field("api_base", &self.api_base)
            .field("feeds", &self.feeds)
            .field("positive_keywords", &self.classifier.positive().len())
            .field("exclude_keywords", &self.classifier.exclude().len())
            .field("push_interval_hours", &self.push_interval_hours)
            .field("send_delay", &self.send_delay)
            .field("status_addr", &self.status_addr)
            .finish()
    }
}

impl AppConfig {
    /// Read everything from the environment (call `dotenvy::dotenv()` first).
    pub fn from_env() -> Result<Self> {
        let bot_token = std::env::var(ENV_BOT_TOKEN)
            .ok()
            .map(|t| t.trim().to_string())
            .filter(|t| !t.is_empty())
            .ok_or_else(|| anyhow!("{ENV_BOT_TOKEN} not found in environment variables"))?;

        let api_base = std::env::var(ENV_API_BASE)
            .ok()
            .filter(|s| !s.trim().is_empty())
            .unwrap_or_else(|| DEFAULT_API_BASE.to_string());

        let feeds = match resolve_path(ENV_FEEDS_PATH, DEFAULT_FEEDS_PATH)? {
            Some(p) => load_feeds_from(&p)?,
            None => default_sources(),
        };

        let classifier = match resolve_path(ENV_KEYWORDS_PATH, DEFAULT_KEYWORDS_PATH)? {
            Some(p) => Classifier::from_path(&p)?,
            None => Classifier::default(),
        };

        let push_interval_hours =
            env_u64(ENV_PUSH_INTERVAL_HOURS, DEFAULT_PUSH_INTERVAL_HOURS).max(1);
        let send_delay = Duration::from_millis(env_u64(ENV_SEND_DELAY_MS, DEFAULT_SEND_DELAY_MS));
        let status_addr = parse_status_addr(std::env::var(ENV_STATUS_ADDR).ok().as_deref())?;

        Ok(Self {
            bot_token,
            api_base,
            feeds,
            classifier,
            push_interval_hours,
            send_delay,
            status_addr,
        })
    }
}

/// 1) `$env` (must exist if set)
/// 2) `fallback` if present
/// 3) nothing: caller uses built-in defaults
fn resolve_path(env: &str, fallback: &str) -> Result<Option<PathBuf>> {
    if let Ok(p) = std::env::var(env) {
        let pb = PathBuf::from(p);
        if pb.exists() {
            return Ok(Some(pb));
        }
        bail!("{env} points to non-existent path {}", pb.display());
    }
    let pb = PathBuf::from(fallback);
    Ok(pb.exists().then_some(pb))
}

fn env_u64(name: &str, default: u64) -> u64 {
    parse_u64_or(name, std::env::var(name).ok().as_deref(), default)
}

fn parse_u64_or(name: &str, raw: Option<&str>, default: u64) -> u64 {
    match raw.map(str::trim) {
        None | Some("") => default,
        Some(s) => s.parse().unwrap_or_else(|_| {
            tracing::warn!(var = name, value = s, default, "unparseable number, using default");
            default
        }),
    }
}

fn parse_status_addr(raw: Option<&str>) -> Result<Option<SocketAddr>> {
    let s = raw.map(str::trim).filter(|s| !s.is_empty()).unwrap_or(DEFAULT_STATUS_ADDR);
    if s.eq_ignore_ascii_case("off") {
        return Ok(None);
    }
    s.parse()
        .map(Some)
        .with_context(|| format!("{ENV_STATUS_ADDR}={s} is not a socket address"))
}

#[derive(Debug, Deserialize)]
struct FeedsFile {
    feeds: Vec<FeedSource>,
}

pub fn load_feeds_from(path: &Path) -> Result<Vec<FeedSource>> {
    let content = fs::read_to_string(path)
        .with_context(|| format!("reading feeds from {}", path.display()))?;
    parse_feeds(&content).with_context(|| format!("parsing feeds in {}", path.display()))
}

/// `[[feeds]]` tables with `name` and `url`; blank entries are dropped.
pub fn parse_feeds(s: &str) -> Result<Vec<FeedSource>> {
    let file: FeedsFile = toml::from_str(s)?;
    let feeds: Vec<FeedSource> = file
        .feeds
        .into_iter()
        .map(|f| FeedSource::new(f.name.trim(), f.url.trim()))
        .filter(|f| !f.name.is_empty() && !f.url.is_empty())
        .collect();
    if feeds.is_empty() {
        bail!("no feeds configured");
    }
    Ok(feeds)
}
