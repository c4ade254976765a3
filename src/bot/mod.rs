// src/bot/mod.rs
pub mod commands;
pub mod delivery;
pub mod runner;
pub mod scheduler;
pub mod subscribers;
pub mod telegram;

use metrics::{counter, describe_counter};
use once_cell::sync::OnceCell;
use std::sync::Arc;

use crate::bot::commands::Command;
use crate::bot::delivery::{BroadcastReport, Delivery};
use crate::bot::subscribers::SubscriberRegistry;
use crate::format;
use crate::news::{NewsDesk, ON_DEMAND_WINDOW_HOURS, SCHEDULED_WINDOW_HOURS};

pub fn ensure_metrics_described() {
    static ONCE: OnceCell<()> = OnceCell::new();
    ONCE.get_or_init(|| {
        describe_counter!("bot_commands_total", "Commands received, by command.");
        describe_counter!("bot_messages_sent_total", "Messages accepted by Telegram.");
        describe_counter!("bot_send_errors_total", "Messages Telegram refused or never got.");
        describe_counter!(
            "bot_subscribers_removed_total",
            "Subscribers dropped after a chat-not-found error."
        );
        describe_counter!("bot_push_runs_total", "Scheduled push runs.");
    });
}

/// Command handling and the periodic push, over one shared [`NewsDesk`].
pub struct Bot {
    desk: Arc<NewsDesk>,
    subscribers: Arc<SubscriberRegistry>,
    delivery: Delivery,
    push_interval_hours: u64,
}

impl Bot {
    pub fn new(
        desk: Arc<NewsDesk>,
        subscribers: Arc<SubscriberRegistry>,
        delivery: Delivery,
        push_interval_hours: u64,
    ) -> Self {
        ensure_metrics_described();
        Self {
            desk,
            subscribers,
            delivery,
            push_interval_hours,
        }
    }

    pub fn desk(&self) -> &Arc<NewsDesk> {
        &self.desk
    }

    pub fn subscribers(&self) -> &Arc<SubscriberRegistry> {
        &self.subscribers
    }

    pub async fn handle(&self, chat_id: i64, command: Command) {
        counter!("bot_commands_total", "command" => command.as_str()).increment(1);
        tracing::info!(target: "bot", chat_id, command = command.as_str(), "command");

        // Reply failures are already logged by delivery.
        match command {
            Command::Start => {
                if self.subscribers.subscribe(chat_id) {
                    tracing::info!(target: "bot", chat_id, "new subscriber");
                }
                let _ = self
                    .delivery
                    .notify(chat_id, &format::welcome_text(self.push_interval_hours))
                    .await;
            }
            Command::Stop => {
                if self.subscribers.unsubscribe(chat_id) {
                    tracing::info!(target: "bot", chat_id, "unsubscribed");
                }
                let _ = self
                    .delivery
                    .notify(chat_id, format::unsubscribed_text())
                    .await;
            }
            Command::Latest => self.latest(chat_id).await,
            Command::Help => {
                let text = format::help_text(self.push_interval_hours, &self.desk.source_names());
                let _ = self.delivery.notify(chat_id, &text).await;
            }
        }
    }

    /// On-demand fetch over the wide window, answered in the requesting chat.
    pub async fn latest(&self, chat_id: i64) {
        let _ = self.delivery.notify(chat_id, format::scanning_text()).await;

        let articles = self.desk.gather(ON_DEMAND_WINDOW_HOURS).await;
        if articles.is_empty() {
            let _ = self
                .delivery
                .notify(chat_id, &format::nothing_found_text(ON_DEMAND_WINDOW_HOURS))
                .await;
            return;
        }

        let _ = self
            .delivery
            .notify(chat_id, &format::found_text(articles.len()))
            .await;
        match self.delivery.send_articles(chat_id, &articles).await {
            Ok(n) => tracing::info!(target: "bot", chat_id, delivered = n, "latest answered"),
            Err(e) => tracing::warn!(target: "bot", chat_id, error = ?e, "latest aborted"),
        }
    }

    /// One scheduled push. `None` when nobody is subscribed, in which case no
    /// source is fetched.
    pub async fn push_once(&self) -> Option<BroadcastReport> {
        counter!("bot_push_runs_total").increment(1);
        if self.subscribers.is_empty() {
            tracing::info!(target: "bot", "no subscribers, push skipped");
            return None;
        }

        let articles = self.desk.gather(SCHEDULED_WINDOW_HOURS).await;
        if articles.is_empty() {
            tracing::info!(target: "bot", "no new articles to push");
            return Some(BroadcastReport::default());
        }

        tracing::info!(
            target: "bot",
            articles = articles.len(),
            subscribers = self.subscribers.len(),
            "pushing"
        );
        let report = self.delivery.broadcast(&self.subscribers, &articles).await;
        tracing::info!(
            target: "bot",
            chats = report.chats,
            delivered = report.delivered,
            failed = report.failed,
            removed = report.removed,
            "push finished"
        );
        Some(report)
    }
}
