// src/news/recency.rs
//! Recency window checks on feed timestamps.

use chrono::{DateTime, Utc};
use time::format_description::well_known::{Rfc2822, Rfc3339};
use time::{OffsetDateTime, UtcOffset};

/// What to do with an entry whose timestamp is present but unreadable.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum UnparsedDatePolicy {
    /// Keep the entry. Feeds with odd date formats still get through, at the cost
    /// of occasionally letting a stale article in.
    #[default]
    AssumeRecent,
    /// Drop the entry.
    AssumeStale,
}

impl UnparsedDatePolicy {
    pub fn is_recent(self) -> bool {
        matches!(self, Self::AssumeRecent)
    }
}

/// Parse a feed timestamp into unix seconds.
///
/// Tries RFC 2822 (RSS `pubDate`) and RFC 3339 (Atom), then a lenient RFC 2822
/// pass that accepts named zones such as `EST` or `PDT`.
pub fn parse_timestamp(raw: &str) -> Option<i64> {
    let s = raw.trim();
    if s.is_empty() {
        return None;
    }
    OffsetDateTime::parse(s, &Rfc2822)
        .or_else(|_| OffsetDateTime::parse(s, &Rfc3339))
        .ok()
        .map(|dt| dt.to_offset(UtcOffset::UTC).unix_timestamp())
        .or_else(|| {
            DateTime::parse_from_rfc2822(s)
                .ok()
                .map(|dt| dt.with_timezone(&Utc).timestamp())
        })
}

#[derive(Debug, Clone, Copy, Default)]
pub struct RecencyFilter {
    policy: UnparsedDatePolicy,
}

impl RecencyFilter {
    pub fn new(policy: UnparsedDatePolicy) -> Self {
        Self { policy }
    }

    pub fn policy(&self) -> UnparsedDatePolicy {
        self.policy
    }

    /// `published` is `None` when the entry carries no date at all; such entries
    /// bypass the window.
    pub fn is_recent(&self, published: Option<&str>, window_hours: u32) -> bool {
        self.is_recent_at(published, window_hours, Utc::now().timestamp())
    }

    pub fn is_recent_at(&self, published: Option<&str>, window_hours: u32, now_unix: i64) -> bool {
        let Some(raw) = published else {
            return true;
        };
        match parse_timestamp(raw) {
            Some(ts) => ts > now_unix - i64::from(window_hours) * 3_600,
            None => self.policy.is_recent(),
        }
    }
}
