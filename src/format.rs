// src/format.rs
//! Telegram HTML rendering of articles and the bot's fixed texts.

use html_escape::encode_double_quoted_attribute as escape;

use crate::news::types::NormalizedArticle;

/// One article as a self-contained HTML message.
///
/// Title, summary and link are escaped (`& < > "`); the summary block is left
/// out entirely when the summary is empty.
pub fn render(article: &NormalizedArticle) -> String {
    let mut msg = format!("🤖 <b>{}</b>\n\n", escape(article.title()));
    msg.push_str(&format!("📰 Source: {}\n", escape(article.source())));
    msg.push_str(&format!("📅 Published: {}\n\n", escape(article.published())));

    let summary = escape(article.summary());
    if !summary.is_empty() {
        msg.push_str(&format!("📝 {summary}\n\n"));
    }

    msg.push_str(&format!(
        "🔗 <a href=\"{}\">Read more</a>",
        escape(article.link())
    ));
    msg
}

pub fn welcome_text(push_interval_hours: u64) -> String {
    format!(
        "🤖 Welcome to AI Advancement Tracker!\n\n\
         I'll keep you updated with the latest AI developments from around the web.\n\n\
         Commands:\n\
         /start - Subscribe to updates\n\
         /stop - Unsubscribe from updates\n\
         /latest - Get latest AI news now\n\
         /help - Show this help message\n\n\
         You'll receive automatic updates every {push_interval_hours} hours with the latest AI advancements!"
    )
}

pub fn unsubscribed_text() -> &'static str {
    "You've been unsubscribed from AI updates. Use /start to subscribe again."
}

pub fn help_text(push_interval_hours: u64, sources: &[String]) -> String {
    let mut text = String::from(
        "🤖 AI Advancement Tracker Bot\n\n\
         This bot scans multiple sources for AI developments and sends you updates.\n\n\
         Commands:\n\
         /start - Subscribe to automatic updates\n\
         /stop - Unsubscribe from updates\n\
         /latest - Get latest AI news immediately\n\
         /help - Show this help\n\n\
         Sources monitored:\n",
    );
    for s in sources {
        text.push_str(&format!("• {s}\n"));
    }
    text.push_str(&format!(
        "\nUpdates are sent every {push_interval_hours} hours automatically to subscribers."
    ));
    text
}

pub fn scanning_text() -> &'static str {
    "🔍 Scanning for latest AI advancements..."
}

pub fn found_text(count: usize) -> String {
    format!("Found {count} recent AI product releases & announcements:")
}

pub fn nothing_found_text(window_hours: u32) -> String {
    format!("No new AI product releases or announcements found in the last {window_hours} hours.")
}

pub fn push_header_text(count: usize) -> String {
    format!("🚨 {count} new AI developments found!")
}
