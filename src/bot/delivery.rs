// src/bot/delivery.rs
use metrics::counter;
use serde::Serialize;
use std::sync::Arc;
use std::time::Duration;

use crate::bot::subscribers::SubscriberRegistry;
use crate::bot::telegram::{ChatTransport, TelegramError};
use crate::format;
use crate::news::types::NormalizedArticle;

pub const DEFAULT_SEND_DELAY: Duration = Duration::from_millis(1000);

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct BroadcastReport {
    pub chats: usize,
    pub delivered: usize,
    pub failed: usize,
    pub removed: usize,
}

/// Sequential, rate-limited message delivery.
pub struct Delivery {
    transport: Arc<dyn ChatTransport>,
    delay: Duration,
}

impl Delivery {
    pub fn new(transport: Arc<dyn ChatTransport>, delay: Duration) -> Self {
        Self { transport, delay }
    }

    pub fn transport(&self) -> &Arc<dyn ChatTransport> {
        &self.transport
    }

    /// Plain notice; failures are logged and reported to the caller.
    pub async fn notify(&self, chat_id: i64, text: &str) -> Result<(), TelegramError> {
        let res = self.transport.send_text(chat_id, text).await;
        match &res {
            Ok(()) => counter!("bot_messages_sent_total").increment(1),
            Err(e) => {
                counter!("bot_send_errors_total").increment(1);
                tracing::warn!(target: "bot", chat_id, error = ?e, "notice not delivered");
            }
        }
        res
    }

    /// One HTML message per article with a pause after each. A message that
    /// fails is skipped; only a vanished chat stops the run, as `Err`.
    pub async fn send_articles(
        &self,
        chat_id: i64,
        articles: &[NormalizedArticle],
    ) -> Result<usize, TelegramError> {
        let mut delivered = 0;
        for (i, article) in articles.iter().enumerate() {
            match self.transport.send_html(chat_id, &format::render(article)).await {
                Ok(()) => {
                    delivered += 1;
                    counter!("bot_messages_sent_total").increment(1);
                }
                Err(e) if e.is_chat_not_found() => return Err(e),
                Err(e) => {
                    counter!("bot_send_errors_total").increment(1);
                    tracing::warn!(
                        target: "bot",
                        chat_id,
                        link = article.link(),
                        error = ?e,
                        "article not delivered"
                    );
                }
            }
            if !self.delay.is_zero() && i + 1 < articles.len() {
                tokio::time::sleep(self.delay).await;
            }
        }
        Ok(delivered)
    }

    /// Header plus articles to every subscriber. A chat the API reports as not
    /// found is dropped from the registry; any other header failure skips that chat.
    pub async fn broadcast(
        &self,
        subscribers: &SubscriberRegistry,
        articles: &[NormalizedArticle],
    ) -> BroadcastReport {
        let mut report = BroadcastReport::default();
        let header = format::push_header_text(articles.len());

        for chat_id in subscribers.snapshot() {
            report.chats += 1;

            let outcome = match self.transport.send_text(chat_id, &header).await {
                Ok(()) => {
                    counter!("bot_messages_sent_total").increment(1);
                    self.send_articles(chat_id, articles).await
                }
                Err(e) => Err(e),
            };

            match outcome {
                Ok(n) => report.delivered += n,
                Err(e) => {
                    report.failed += 1;
                    counter!("bot_send_errors_total").increment(1);
                    tracing::warn!(target: "bot", chat_id, error = ?e, "push to chat failed");
                    if e.is_chat_not_found() && subscribers.unsubscribe(chat_id) {
                        report.removed += 1;
                        counter!("bot_subscribers_removed_total").increment(1);
                        tracing::info!(target: "bot", chat_id, "removed unreachable subscriber");
                    }
                }
            }
        }
        report
    }
}
