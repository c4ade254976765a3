// src/bot/commands.rs
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Command {
    Start,
    Stop,
    Latest,
    Help,
}

impl Command {
    /// Parse the leading `/command` of a message; `/latest@SomeBot extra` → `Latest`.
    /// Anything else (plain text, unknown commands) is `None`.
    pub fn parse(text: &str) -> Option<Self> {
        let first = text.split_whitespace().next()?;
        let name = first.strip_prefix('/')?;
        let name = name.split('@').next().unwrap_or(name);
        match name.to_ascii_lowercase().as_str() {
            "start" => Some(Command::Start),
            "stop" => Some(Command::Stop),
            "latest" => Some(Command::Latest),
            "help" => Some(Command::Help),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Command::Start => "start",
            Command::Stop => "stop",
            Command::Latest => "latest",
            Command::Help => "help",
        }
    }
}
