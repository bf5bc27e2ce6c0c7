//! Enrichment gateway: remote exchange rates, translation and speech synthesis.
//!
//! Every public operation recovers locally. Callers receive a sentinel
//! (`0.0`, `"Error"`, no audio) instead of an error, and a warning is logged.

pub mod rates;
pub mod speech;
pub mod translation;

use std::fmt;
use std::str::FromStr;
use std::time::Duration;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

pub use rates::ExchangeRateClient;
pub use speech::TranslateTtsClient;
pub use translation::MyMemoryTranslator;

const USER_AGENT: &str = concat!("pocketbook/", env!("CARGO_PKG_VERSION"));

/// Text stored in both target fields when translation fails.
pub const TRANSLATION_SENTINEL: &str = "Error";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Language {
    Japanese,
    English,
    German,
}

impl Language {
    pub fn code(self) -> &'static str {
        match self {
            Language::Japanese => "ja",
            Language::English => "en",
            Language::German => "de",
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            Language::Japanese => "Japanese",
            Language::English => "English",
            Language::German => "German",
        }
    }
}

impl fmt::Display for Language {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.code())
    }
}

impl FromStr for Language {
    type Err = EnrichmentError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim().to_ascii_lowercase().as_str() {
            "ja" | "japanese" => Ok(Language::Japanese),
            "en" | "english" => Ok(Language::English),
            "de" | "german" => Ok(Language::German),
            other => Err(EnrichmentError::UnsupportedLanguage(other.to_string())),
        }
    }
}

/// Result of a rate lookup. `rate` is `0.0` whenever `warning` is set.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RateQuote {
    pub base: String,
    pub quote: String,
    pub rate: f64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub warning: Option<String>,
}

impl RateQuote {
    pub fn available(base: &str, quote: &str, rate: f64) -> Self {
        Self {
            base: base.to_string(),
            quote: quote.to_string(),
            rate,
            warning: None,
        }
    }

    pub fn unavailable(base: &str, quote: &str, warning: String) -> Self {
        Self {
            base: base.to_string(),
            quote: quote.to_string(),
            rate: 0.0,
            warning: Some(warning),
        }
    }

    pub fn pair(&self) -> String {
        format!("{}/{}", self.base, self.quote)
    }

    pub fn is_available(&self) -> bool {
        self.warning.is_none()
    }
}

/// English and German renderings of one Japanese source text.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TranslationPair {
    pub english: String,
    pub german: String,
}

impl TranslationPair {
    pub fn new(english: impl Into<String>, german: impl Into<String>) -> Self {
        Self {
            english: english.into(),
            german: german.into(),
        }
    }

    pub fn sentinel() -> Self {
        Self::new(TRANSLATION_SENTINEL, TRANSLATION_SENTINEL)
    }

    pub fn is_sentinel(&self) -> bool {
        self.english == TRANSLATION_SENTINEL && self.german == TRANSLATION_SENTINEL
    }
}

/// Synthesized audio, kept in memory only.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SpeechClip {
    pub language: Language,
    pub content_type: String,
    pub bytes: Vec<u8>,
}

#[async_trait]
pub trait RateSource: Send + Sync {
    async fn fetch_rate(&self, base: &str, quote: &str) -> RateQuote;
}

#[async_trait]
pub trait Translator: Send + Sync {
    async fn translate(&self, source_text: &str) -> TranslationPair;
}

#[async_trait]
pub trait SpeechSynthesizer: Send + Sync {
    async fn synthesize(&self, text: &str, language: Language) -> Option<SpeechClip>;
}

/// Failures inside the remote clients. Only client construction surfaces
/// these; lookups convert them into sentinels.
#[derive(Debug, thiserror::Error)]
pub enum EnrichmentError {
    #[error("request failed: {0}")]
    Network(#[from] reqwest::Error),
    #[error("service answered with status {0}")]
    Status(u16),
    #[error("malformed response: {0}")]
    Malformed(String),
    #[error("response is missing {0}")]
    MissingField(String),
    #[error("unsupported language '{0}'")]
    UnsupportedLanguage(String),
}

pub(crate) fn build_http_client(timeout: Duration) -> Result<reqwest::Client, EnrichmentError> {
    let client = reqwest::Client::builder()
        .user_agent(USER_AGENT)
        .timeout(timeout)
        .build()?;
    Ok(client)
}

pub(crate) fn join_url(base_url: &str, path: &str) -> String {
    format!(
        "{}/{}",
        base_url.trim_end_matches('/'),
        path.trim_start_matches('/')
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn languages_parse_from_codes_and_names() {
        assert_eq!("de".parse::<Language>().expect("code"), Language::German);
        assert_eq!(
            "Japanese".parse::<Language>().expect("name"),
            Language::Japanese
        );
        assert!("fr".parse::<Language>().is_err());
    }

    #[test]
    fn sentinel_pair_is_recognised() {
        assert!(TranslationPair::sentinel().is_sentinel());
        assert!(!TranslationPair::new("Hello", "Error").is_sentinel());
    }

    #[test]
    fn join_url_tolerates_slashes() {
        assert_eq!(join_url("http://x/v6/", "/latest/EUR"), "http://x/v6/latest/EUR");
        assert_eq!(join_url("http://x", "get"), "http://x/get");
    }
}
