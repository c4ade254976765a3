// src/news/classifier.rs
//! Keyword gate deciding whether an article is about an AI product or company event.
//!
//! Matching is plain lower-case substring containment. No tokenization: "llm"
//! also hits inside longer words. Any exclusion hit rejects the article no matter
//! how many positive keywords matched.

use anyhow::{bail, Context, Result};
use serde::Deserialize;
use std::fs;
use std::path::Path;

pub const DEFAULT_POSITIVE_KEYWORDS: &[&str] = &[
    // companies and products
    "openai",
    "anthropic",
    "google ai",
    "microsoft ai",
    "meta ai",
    "nvidia ai",
    "chatgpt",
    "claude",
    "gemini",
    "copilot",
    "bard",
    "llama",
    // release verbs
    "releases",
    "launches",
    "announces",
    "unveils",
    "introduces",
    // models and agents
    "new model",
    "ai model",
    "language model",
    "llm",
    "ai agent",
    "ai assistant",
    "chatbot",
    "voice assistant",
    "gpt-4",
    "gpt-5",
    "claude-3",
    "gemini pro",
    "dall-e",
    "midjourney",
    // capabilities
    "multimodal",
    "text-to-image",
    "text-to-video",
    "code generation",
    "reasoning",
    "function calling",
    "tool use",
    // business
    "funding",
    "investment",
    "valuation",
    "startup",
    "acquisition",
    "partnership",
    "collaboration",
];

pub const DEFAULT_EXCLUDE_KEYWORDS: &[&str] = &[
    "paper",
    "research",
    "study",
    "arxiv",
    "conference",
    "journal",
    "publication",
    "dataset",
    "benchmark",
];

/// Outcome of [`Classifier::evaluate`].
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Verdict {
    pub relevant: bool,
    pub matched: Vec<String>,
    pub blocked_by: Option<String>,
}

#[derive(Debug, Deserialize)]
struct KeywordFile {
    keywords: KeywordSection,
}

#[derive(Debug, Deserialize)]
struct KeywordSection {
    #[serde(default)]
    positive: Option<Vec<String>>,
    #[serde(default)]
    exclude: Option<Vec<String>>,
}

#[derive(Debug, Clone)]
pub struct Classifier {
    positive: Vec<String>,
    exclude: Vec<String>,
}

impl Default for Classifier {
    fn default() -> Self {
        Self {
            positive: owned(DEFAULT_POSITIVE_KEYWORDS),
            exclude: owned(DEFAULT_EXCLUDE_KEYWORDS),
        }
    }
}

fn owned(words: &[&str]) -> Vec<String> {
    words.iter().map(|w| w.to_string()).collect()
}

fn clean_list(words: Vec<String>) -> Vec<String> {
    let mut out: Vec<String> = Vec::with_capacity(words.len());
    for w in words {
        let w = w.trim().to_lowercase();
        if !w.is_empty() && !out.contains(&w) {
            out.push(w);
        }
    }
    out
}

impl Classifier {
    pub fn new(positive: Vec<String>, exclude: Vec<String>) -> Result<Self> {
        let positive = clean_list(positive);
        if positive.is_empty() {
            bail!("positive keyword set is empty; nothing would ever be relevant");
        }
        Ok(Self {
            positive,
            exclude: clean_list(exclude),
        })
    }

    /// Parse a `[keywords]` table. A missing list keeps the built-in one.
    pub fn from_toml_str(s: &str) -> Result<Self> {
        let file: KeywordFile = toml::from_str(s).context("parsing keyword toml")?;
        let positive = file
            .keywords
            .positive
            .unwrap_or_else(|| owned(DEFAULT_POSITIVE_KEYWORDS));
        let exclude = file
            .keywords
            .exclude
            .unwrap_or_else(|| owned(DEFAULT_EXCLUDE_KEYWORDS));
        Self::new(positive, exclude)
    }

    pub fn from_path(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path)
            .with_context(|| format!("reading keywords from {}", path.display()))?;
        Self::from_toml_str(&content)
    }

    pub fn positive(&self) -> &[String] {
        &self.positive
    }

    pub fn exclude(&self) -> &[String] {
        &self.exclude
    }

    pub fn evaluate(&self, title: &str, summary: &str) -> Verdict {
        let text = format!("{title} {summary}").to_lowercase();

        if let Some(hit) = self.exclude.iter().find(|k| text.contains(k.as_str())) {
            return Verdict {
                relevant: false,
                matched: Vec::new(),
                blocked_by: Some(hit.clone()),
            };
        }

        let matched: Vec<String> = self
            .positive
            .iter()
            .filter(|k| text.contains(k.as_str()))
            .cloned()
            .collect();

        Verdict {
            relevant: !matched.is_empty(),
            matched,
            blocked_by: None,
        }
    }

    pub fn is_relevant(&self, title: &str, summary: &str) -> bool {
        self.evaluate(title, summary).relevant
    }
}
