// src/lib.rs
// Public library surface for the binary and integration tests.

pub mod api;
pub mod bot;
pub mod config;
pub mod format;
pub mod metrics;
pub mod news;

// ---- Re-exports for stable public API ----
pub use crate::api::create_router;
pub use crate::bot::Bot;
pub use crate::config::AppConfig;
pub use crate::news::aggregator::{Aggregator, RunStats, MAX_ARTICLES};
pub use crate::news::types::{FeedSource, NormalizedArticle};
pub use crate::news::NewsDesk;
