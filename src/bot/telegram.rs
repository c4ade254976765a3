// src/bot/telegram.rs
use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;
use serde_json::json;
use std::time::Duration;
use thiserror::Error;

pub const DEFAULT_API_BASE: &str = "https://api.telegram.org";

#[derive(Debug, Error)]
pub enum TelegramError {
    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Telegram API error {code}: {description}")]
    Api { code: i64, description: String },
}

impl TelegramError {
    /// The chat is gone (blocked the bot, deleted, never existed).
    pub fn is_chat_not_found(&self) -> bool {
        match self {
            TelegramError::Api { description, .. } => {
                description.to_ascii_lowercase().contains("chat not found")
            }
            TelegramError::Http(_) => false,
        }
    }
}

/// The delivery seam: everything the bot needs to talk to a chat.
#[async_trait]
pub trait ChatTransport: Send + Sync {
    async fn send_text(&self, chat_id: i64, text: &str) -> Result<(), TelegramError>;

    /// HTML parse mode, link previews off.
    async fn send_html(&self, chat_id: i64, html: &str) -> Result<(), TelegramError>;
}

#[derive(Debug, Deserialize)]
struct Envelope<T> {
    ok: bool,
    result: Option<T>,
    error_code: Option<i64>,
    description: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Update {
    pub update_id: i64,
    pub message: Option<Message>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Message {
    pub chat: Chat,
    pub text: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Chat {
    pub id: i64,
}

/// Minimal Bot API client: long polling plus sendMessage.
pub struct TelegramClient {
    client: Client,
    api_base: String,
    bot_token: String,
}

impl TelegramClient {
    pub fn new(client: Client, api_base: impl Into<String>, bot_token: impl Into<String>) -> Self {
        Self {
            client,
            api_base: api_base.into().trim_end_matches('/').to_string(),
            bot_token: bot_token.into(),
        }
    }

    fn method_url(&self, method: &str) -> String {
        format!("{}/bot{}/{}", self.api_base, self.bot_token, method)
    }

    async fn call<T: serde::de::DeserializeOwned>(
        &self,
        method: &str,
        body: serde_json::Value,
        timeout: Option<Duration>,
    ) -> Result<T, TelegramError> {
        let mut req = self.client.post(self.method_url(method)).json(&body);
        if let Some(t) = timeout {
            req = req.timeout(t);
        }
        let resp = req.send().await?;
        let status = resp.status();
        let text = resp.text().await?;

        // The API answers errors with a JSON envelope and a 4xx status.
        match serde_json::from_str::<Envelope<T>>(&text) {
            Ok(Envelope {
                ok: true,
                result: Some(result),
                ..
            }) => Ok(result),
            Ok(env) => Err(TelegramError::Api {
                code: env.error_code.unwrap_or(i64::from(status.as_u16())),
                description: env
                    .description
                    .unwrap_or_else(|| "missing result".to_string()),
            }),
            Err(_) => Err(TelegramError::Api {
                code: i64::from(status.as_u16()),
                description: text,
            }),
        }
    }

    /// Long poll for updates newer than `offset`.
    pub async fn get_updates(
        &self,
        offset: Option<i64>,
        timeout_secs: u64,
    ) -> Result<Vec<Update>, TelegramError> {
        let mut body = json!({
            "timeout": timeout_secs,
            "allowed_updates": ["message"],
        });
        if let Some(o) = offset {
            body["offset"] = json!(o);
        }
        // Leave the server's long poll room to answer before the client gives up.
        let timeout = Duration::from_secs(timeout_secs + 10);
        self.call("getUpdates", body, Some(timeout)).await
    }

    pub async fn send_message(&self, chat_id: i64, text: &str, html: bool) -> Result<(), TelegramError> {
        let mut body = json!({
            "chat_id": chat_id,
            "text": text,
        });
        if html {
            body["parse_mode"] = json!("HTML");
            body["disable_web_page_preview"] = json!(true);
        }
        let _: serde_json::Value = self.call("sendMessage", body, None).await?;
        Ok(())
    }
}

#[async_trait]
impl ChatTransport for TelegramClient {
    async fn send_text(&self, chat_id: i64, text: &str) -> Result<(), TelegramError> {
        self.send_message(chat_id, text, false).await
    }

    async fn send_html(&self, chat_id: i64, html: &str) -> Result<(), TelegramError> {
        self.send_message(chat_id, html, true).await
    }
}
