// src/bot/runner.rs
use async_trait::async_trait;
use std::sync::Arc;
use std::time::Duration;
use tokio::task::JoinHandle;

use crate::bot::commands::Command;
use crate::bot::telegram::{TelegramClient, TelegramError, Update};
use crate::bot::Bot;

pub const POLL_TIMEOUT_SECS: u64 = 30;
pub const POLL_RETRY_PAUSE: Duration = Duration::from_secs(5);

/// Where updates come from; the Bot API in production.
#[async_trait]
pub trait UpdateSource: Send + Sync {
    async fn poll(&self, offset: Option<i64>, timeout_secs: u64) -> Result<Vec<Update>, TelegramError>;
}

#[async_trait]
impl UpdateSource for TelegramClient {
    async fn poll(&self, offset: Option<i64>, timeout_secs: u64) -> Result<Vec<Update>, TelegramError> {
        self.get_updates(offset, timeout_secs).await
    }
}

/// Dispatch one batch of updates. Each recognized command runs on its own task
/// so a slow `/latest` does not hold up other chats. Returns the next offset.
pub fn dispatch(
    updates: Vec<Update>,
    bot: &Arc<Bot>,
    offset: Option<i64>,
) -> (Option<i64>, Vec<JoinHandle<()>>) {
    let mut next = offset;
    let mut tasks = Vec::new();
    for update in updates {
        next = Some(next.map_or(update.update_id + 1, |o| o.max(update.update_id + 1)));

        let Some(message) = update.message else { continue };
        let Some(command) = message.text.as_deref().and_then(Command::parse) else {
            continue;
        };
        let bot = Arc::clone(bot);
        let chat_id = message.chat.id;
        tasks.push(tokio::spawn(async move {
            bot.handle(chat_id, command).await;
        }));
    }
    (next, tasks)
}

/// Await command tasks off the polling loop, logging any that panicked or were
/// cancelled. Resolves to the number of failed tasks.
pub fn reap(tasks: Vec<JoinHandle<()>>) -> JoinHandle<usize> {
    tokio::spawn(async move {
        let mut failed = 0;
        for task in tasks {
            if let Err(e) = task.await {
                failed += 1;
                tracing::error!(target: "bot", error = ?e, panicked = e.is_panic(), "command task failed");
            }
        }
        failed
    })
}

/// Long-poll forever. Polling errors are logged and retried after a pause.
pub async fn run_polling(source: Arc<dyn UpdateSource>, bot: Arc<Bot>) {
    let mut offset: Option<i64> = None;
    tracing::info!(target: "bot", "polling for updates");
    loop {
        match source.poll(offset, POLL_TIMEOUT_SECS).await {
            Ok(updates) => {
                let (next, tasks) = dispatch(updates, &bot, offset);
                offset = next;
                if !tasks.is_empty() {
                    reap(tasks);
                }
            }
            Err(e) => {
                tracing::warn!(target: "bot", error = ?e, "getUpdates failed");
                tokio::time::sleep(POLL_RETRY_PAUSE).await;
            }
        }
    }
}
