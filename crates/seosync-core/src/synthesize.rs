//! Generated metadata for pages that have no record yet.

use crate::page_key::PageKey;
use seosync_store::SeoRecord;
use serde::Deserialize;

pub const TOPIC_PLACEHOLDER: &str = "{topic}";

/// Tunables for generated records.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct SynthesisConfig {
    /// Appended to every title as ` | <brand>`.
    pub brand: String,
    /// Description text; `{topic}` is replaced by the space-joined key tokens.
    pub description_template: String,
    /// Always the last keyword.
    pub trailing_keyword: String,
    /// Tokens shorter than this (in characters) are not keywords.
    pub min_keyword_len: usize,
    /// Cap on key-derived keywords, before the trailing keyword.
    pub max_keywords: usize,
}

impl Default for SynthesisConfig {
    fn default() -> Self {
        Self {
            brand: "D-Secure Tech".to_string(),
            description_template: "Explore {topic} with D-Secure Tech's certified data erasure \
                                   solutions for secure and compliant data sanitization."
                .to_string(),
            trailing_keyword: "D-Secure Tech".to_string(),
            min_keyword_len: 3,
            max_keywords: 4,
        }
    }
}

/// Builds records from page keys. Pure: the same key and URL always give the
/// same record.
#[derive(Debug, Clone, Default)]
pub struct Synthesizer {
    config: SynthesisConfig,
}

impl Synthesizer {
    pub fn new(config: SynthesisConfig) -> Self {
        Self { config }
    }

    pub fn synthesize(&self, key: &PageKey, canonical_url: &str) -> SeoRecord {
        SeoRecord {
            title: self.title(key),
            description: self.description(key),
            keywords: self.keywords(key),
            canonical_url: canonical_url.to_string(),
        }
    }

    fn title(&self, key: &PageKey) -> String {
        let words = key.tokens().map(capitalize).collect::<Vec<_>>().join(" ");
        if self.config.brand.is_empty() {
            words
        } else {
            format!("{words} | {}", self.config.brand)
        }
    }

    fn description(&self, key: &PageKey) -> String {
        let topic = key.tokens().collect::<Vec<_>>().join(" ");
        self.config
            .description_template
            .replace(TOPIC_PLACEHOLDER, &topic)
    }

    fn keywords(&self, key: &PageKey) -> Vec<String> {
        let mut keywords: Vec<String> = key
            .tokens()
            .filter(|token| token.chars().count() >= self.config.min_keyword_len)
            .take(self.config.max_keywords)
            .map(str::to_string)
            .collect();
        if !self.config.trailing_keyword.is_empty() {
            keywords.push(self.config.trailing_keyword.clone());
        }
        keywords
    }
}

fn capitalize(token: &str) -> String {
    let mut chars = token.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}
