// src/bot/subscribers.rs
use std::collections::BTreeSet;
use std::sync::Mutex;

/// Chats receiving the periodic push. In-memory only; a restart starts empty.
#[derive(Debug, Default)]
pub struct SubscriberRegistry {
    chats: Mutex<BTreeSet<i64>>,
}

impl SubscriberRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// True if the chat was not subscribed before.
    pub fn subscribe(&self, chat_id: i64) -> bool {
        self.chats
            .lock()
            .unwrap_or_else(|p| p.into_inner())
            .insert(chat_id)
    }

    pub fn unsubscribe(&self, chat_id: i64) -> bool {
        self.chats
            .lock()
            .unwrap_or_else(|p| p.into_inner())
            .remove(&chat_id)
    }

    pub fn contains(&self, chat_id: i64) -> bool {
        self.chats
            .lock()
            .unwrap_or_else(|p| p.into_inner())
            .contains(&chat_id)
    }

    /// Copy of the current set, so a broadcast can remove chats while iterating.
    pub fn snapshot(&self) -> Vec<i64> {
        self.chats
            .lock()
            .unwrap_or_else(|p| p.into_inner())
            .iter()
            .copied()
            .collect()
    }

    pub fn len(&self) -> usize {
        self.chats.lock().unwrap_or_else(|p| p.into_inner()).len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}
