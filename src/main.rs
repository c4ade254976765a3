//! AI news tracker: binary entrypoint.
//! Loads config, wires the news desk and the Telegram bot, starts the push
//! scheduler and the status API, then long-polls for commands until Ctrl-C.

use anyhow::{Context, Result};
use std::sync::Arc;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use ai_news_tracker::api::{create_router, AppState};
use ai_news_tracker::bot::delivery::Delivery;
use ai_news_tracker::bot::runner::run_polling;
use ai_news_tracker::bot::scheduler::{spawn_push_scheduler, PushSchedulerCfg};
use ai_news_tracker::bot::subscribers::SubscriberRegistry;
use ai_news_tracker::bot::telegram::TelegramClient;
use ai_news_tracker::bot::Bot;
use ai_news_tracker::config::AppConfig;
use ai_news_tracker::metrics::Metrics;
use ai_news_tracker::news::aggregator::Aggregator;
use ai_news_tracker::news::company::{BlogPage, CompanyScraper};
use ai_news_tracker::news::dedup::Deduplicator;
use ai_news_tracker::news::fetcher::HttpFeedFetcher;
use ai_news_tracker::news::NewsDesk;

/// `RUST_LOG` filter (default `info`); JSON lines when `LOG_FORMAT=json`.
fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let json = std::env::var("LOG_FORMAT")
        .map(|v| v.eq_ignore_ascii_case("json"))
        .unwrap_or(false);

    if json {
        tracing_subscriber::registry()
            .with(filter)
            .with(fmt::layer().json())
            .init();
    } else {
        tracing_subscriber::registry()
            .with(filter)
            .with(fmt::layer().compact())
            .init();
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    // .env is optional.
    let _ = dotenvy::dotenv();
    init_tracing();

    let cfg = AppConfig::from_env()?;
    tracing::info!(config = ?cfg, "configuration loaded");

    let metrics = Metrics::init(cfg.push_interval_hours)?;

    // --- News pipeline ---
    let dedup = Arc::new(Deduplicator::new());
    let aggregator = Aggregator::new(
        cfg.feeds.clone(),
        Arc::new(HttpFeedFetcher::new()?),
        cfg.classifier.clone(),
        Arc::clone(&dedup),
    );
    let desk = Arc::new(
        NewsDesk::new(aggregator).with_announcements(Arc::new(CompanyScraper::new(BlogPage::openai())?)),
    );

    // --- Bot ---
    let http = reqwest::Client::builder()
        .build()
        .context("building telegram http client")?;
    let telegram = Arc::new(TelegramClient::new(http, cfg.api_base.clone(), cfg.bot_token.clone()));
    let subscribers = Arc::new(SubscriberRegistry::new());
    let bot = Arc::new(Bot::new(
        Arc::clone(&desk),
        Arc::clone(&subscribers),
        Delivery::new(telegram.clone(), cfg.send_delay),
        cfg.push_interval_hours,
    ));

    let _scheduler = spawn_push_scheduler(
        PushSchedulerCfg::every_hours(cfg.push_interval_hours),
        Arc::clone(&bot),
    );

    // --- Status API ---
    if let Some(addr) = cfg.status_addr {
        let router = create_router(
            AppState {
                desk: Arc::clone(&desk),
                subscribers: Arc::clone(&subscribers),
            },
            Some(&metrics),
        );
        let listener = tokio::net::TcpListener::bind(addr)
            .await
            .with_context(|| format!("binding status API on {addr}"))?;
        tracing::info!(%addr, "status API listening");
        tokio::spawn(async move {
            if let Err(e) = axum::serve(listener, router).await {
                tracing::error!(error = ?e, "status API stopped");
            }
        });
    }

    tracing::info!("Bot started successfully!");
    tokio::select! {
        _ = run_polling(telegram, bot) => {}
        res = tokio::signal::ctrl_c() => {
            res.context("waiting for ctrl-c")?;
            tracing::info!("shutting down");
        }
    }
    Ok(())
}
