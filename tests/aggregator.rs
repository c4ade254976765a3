// tests/aggregator.rs
//
// End-to-end runs of the Aggregator and NewsDesk over in-memory feeds.
//
// Covered:
// - mixed RSS + Atom sources: recency, relevance, cross-source dedup
// - every source failing still yields an empty, non-error result
// - NewsDesk puts company announcements first and honors the cap

use std::sync::Arc;

use ai_news_tracker::news::aggregator::{Aggregator, RunStats, MAX_ARTICLES};
use ai_news_tracker::news::classifier::Classifier;
use ai_news_tracker::news::company::StaticAnnouncements;
use ai_news_tracker::news::dedup::Deduplicator;
use ai_news_tracker::news::fetcher::{FixtureFetcher, HttpFeedFetcher};
use ai_news_tracker::news::recency::{RecencyFilter, UnparsedDatePolicy};
use ai_news_tracker::news::types::{default_sources, FeedSource, NormalizedArticle};
use ai_news_tracker::news::NewsDesk;

const TECHCRUNCH: &str = include_str!("fixtures/techcrunch_rss.xml");
const VERGE: &str = include_str!("fixtures/verge_atom.xml");

// 2025-10-14T12:00:00Z
const NOW: i64 = 1_760_443_200;

fn two_sources() -> (FixtureFetcher, Vec<FeedSource>) {
    let fetcher = FixtureFetcher::new()
        .with_document("mem://techcrunch", TECHCRUNCH)
        .with_document("mem://verge", VERGE);
    let sources = vec![
        FeedSource::new("techcrunch_ai", "mem://techcrunch"),
        FeedSource::new("the_verge_ai", "mem://verge"),
    ];
    (fetcher, sources)
}

fn aggregator(fetcher: FixtureFetcher, sources: Vec<FeedSource>) -> Aggregator {
    Aggregator::new(
        sources,
        Arc::new(fetcher),
        Classifier::default(),
        Arc::new(Deduplicator::new()),
    )
}

#[tokio::test]
async fn scheduled_window_over_two_sources() {
    let (fetcher, sources) = two_sources();
    let agg = aggregator(fetcher, sources);

    let (out, stats) = agg.collect_latest_at(6, NOW).await;

    let links: Vec<&str> = out.iter().map(|a| a.link()).collect();
    assert_eq!(
        links,
        vec![
            "https://techcrunch.com/2025/10/14/openai-gpt-5/",
            "https://www.theverge.com/2025/10/14/gemini-agents",
            "https://www.theverge.com/2025/10/14/llama-phones",
        ]
    );
    assert_eq!(out[0].source(), "techcrunch_ai");
    assert_eq!(out[1].source(), "the_verge_ai");
    assert_eq!(
        stats,
        RunStats {
            sources: 2,
            empty_sources: 0,
            entries: 7,
            stale: 1,
            irrelevant: 2,
            duplicates: 1,
            over_cap: 0,
            kept: 3,
        }
    );
}

#[tokio::test]
async fn on_demand_window_reaches_back_further() {
    let (fetcher, sources) = two_sources();
    let agg = aggregator(fetcher, sources);

    let (out, _) = agg.collect_latest_at(48, NOW).await;
    assert!(out
        .iter()
        .any(|a| a.title() == "Anthropic announces Claude for enterprise teams"));
    assert_eq!(out.len(), 4);
}

#[tokio::test]
async fn strict_policy_drops_unparseable_dates() {
    let (fetcher, sources) = two_sources();
    let agg = aggregator(fetcher, sources)
        .with_recency(RecencyFilter::new(UnparsedDatePolicy::AssumeStale));

    let (out, stats) = agg.collect_latest_at(6, NOW).await;
    assert!(out.iter().all(|a| !a.link().contains("llama-phones")));
    assert_eq!(stats.stale, 2);
}

#[tokio::test]
async fn same_link_from_two_sources_is_emitted_once() {
    let (fetcher, sources) = two_sources();
    let agg = aggregator(fetcher, sources);

    let (out, _) = agg.collect_latest_at(48, NOW).await;
    let gpt5 = out
        .iter()
        .filter(|a| a.link() == "https://techcrunch.com/2025/10/14/openai-gpt-5/")
        .count();
    assert_eq!(gpt5, 1);
}

#[tokio::test]
async fn all_sources_failing_yields_empty_result() {
    // Port 9 (discard) on loopback refuses connections.
    let sources: Vec<FeedSource> = default_sources()
        .into_iter()
        .enumerate()
        .map(|(i, s)| FeedSource::new(&s.name, &format!("http://127.0.0.1:9/feed/{i}")))
        .collect();
    let fetcher = HttpFeedFetcher::with_timeout(std::time::Duration::from_secs(2)).unwrap();
    let agg = Aggregator::new(
        sources,
        Arc::new(fetcher),
        Classifier::default(),
        Arc::new(Deduplicator::new()),
    );

    assert!(agg.collect_latest(48).await.is_empty());

    let (out, stats) = agg.collect_latest_at(48, NOW).await;
    assert!(out.is_empty());
    assert_eq!(stats.sources, 5);
    assert_eq!(stats.empty_sources, 5);
}

fn company_post(i: usize) -> NormalizedArticle {
    let title = format!("Company post number {i}");
    let link = format!("https://openai.com/blog/post-{i}");
    NormalizedArticle::new(
        Some(&title),
        Some(&link),
        Some("Latest announcement from OpenAI"),
        "OpenAI Blog",
        Some("Recent"),
    )
}

#[tokio::test]
async fn desk_puts_announcements_first_and_dedups_them() {
    let (fetcher, sources) = two_sources();
    let desk = NewsDesk::new(aggregator(fetcher, sources))
        .with_announcements(Arc::new(StaticAnnouncements(vec![company_post(1), company_post(2)])));

    let first = desk.gather_at(48, NOW).await;
    assert_eq!(first[0].source(), "OpenAI Blog");
    assert_eq!(first[1].source(), "OpenAI Blog");
    assert_eq!(first[2].source(), "techcrunch_ai");
    assert_eq!(first.len(), 6);

    // Everything was recorded; the same posts do not come back.
    assert!(desk.gather_at(48, NOW).await.is_empty());
    assert_eq!(desk.dedup().len(), 6);
}

#[tokio::test]
async fn desk_caps_merged_output() {
    let (fetcher, sources) = two_sources();
    let posts: Vec<NormalizedArticle> = (0..8).map(company_post).collect();
    let desk = NewsDesk::new(aggregator(fetcher, sources))
        .with_announcements(Arc::new(StaticAnnouncements(posts)));

    let out = desk.gather_at(48, NOW).await;
    assert_eq!(out.len(), MAX_ARTICLES);
    assert_eq!(out[8].source(), "techcrunch_ai");

    // Articles cut by the cap were still recorded and do not come back.
    assert_eq!(desk.dedup().len(), 12);
    assert!(desk.gather_at(48, NOW).await.is_empty());
}

#[tokio::test]
async fn desk_lists_feed_and_announcement_names() {
    let (fetcher, sources) = two_sources();
    let desk = NewsDesk::new(aggregator(fetcher, sources))
        .with_announcements(Arc::new(StaticAnnouncements::default()));
    assert_eq!(
        desk.source_names(),
        vec!["techcrunch_ai", "the_verge_ai", "Company announcements"]
    );
}
