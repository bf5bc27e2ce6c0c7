use async_trait::async_trait;
use serde::Deserialize;
use tracing::{debug, warn};

use super::{
    build_http_client, join_url, EnrichmentError, Language, TranslationPair, Translator,
};
use crate::config::TranslationConfig;

const SOURCE_LANGUAGE: Language = Language::Japanese;

#[derive(Debug, Deserialize)]
struct TranslateResponse {
    #[serde(rename = "responseData")]
    response_data: Option<ResponseData>,
    #[serde(rename = "responseStatus")]
    response_status: Option<serde_json::Value>,
}

#[derive(Debug, Deserialize)]
struct ResponseData {
    #[serde(rename = "translatedText")]
    translated_text: Option<String>,
}

/// Translator backed by the MyMemory `GET /get?q=..&langpair=ja|xx` API.
#[derive(Debug, Clone)]
pub struct MyMemoryTranslator {
    http: reqwest::Client,
    base_url: String,
    contact_email: Option<String>,
}

impl MyMemoryTranslator {
    pub fn new(config: &TranslationConfig) -> Result<Self, EnrichmentError> {
        Ok(Self {
            http: build_http_client(config.timeout)?,
            base_url: config.base_url.clone(),
            contact_email: config.contact_email.clone(),
        })
    }

    async fn translate_into(&self, text: &str, target: Language) -> Result<String, EnrichmentError> {
        let langpair = format!("{}|{}", SOURCE_LANGUAGE.code(), target.code());
        let mut query = vec![("q", text), ("langpair", langpair.as_str())];
        if let Some(email) = self.contact_email.as_deref() {
            query.push(("de", email));
        }

        let response = self
            .http
            .get(join_url(&self.base_url, "get"))
            .query(&query)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            return Err(EnrichmentError::Status(status.as_u16()));
        }

        let body = response.bytes().await?;
        let parsed: TranslateResponse = serde_json::from_slice(&body)
            .map_err(|err| EnrichmentError::Malformed(err.to_string()))?;

        if let Some(code) = parsed.response_status.as_ref().and_then(status_code) {
            if code != 200 {
                return Err(EnrichmentError::Status(code));
            }
        }

        parsed
            .response_data
            .and_then(|data| data.translated_text)
            .filter(|text| !text.trim().is_empty())
            .ok_or_else(|| EnrichmentError::MissingField("responseData.translatedText".into()))
    }

    async fn try_translate(&self, text: &str) -> Result<TranslationPair, EnrichmentError> {
        let english = self.translate_into(text, Language::English).await?;
        let german = self.translate_into(text, Language::German).await?;
        Ok(TranslationPair { english, german })
    }
}

// The provider reports its status as either a number or a numeric string.
fn status_code(value: &serde_json::Value) -> Option<u16> {
    match value {
        serde_json::Value::Number(number) => number.as_u64().and_then(|n| u16::try_from(n).ok()),
        serde_json::Value::String(text) => text.trim().parse().ok(),
        _ => None,
    }
}

#[async_trait]
impl Translator for MyMemoryTranslator {
    async fn translate(&self, source_text: &str) -> TranslationPair {
        match self.try_translate(source_text).await {
            Ok(pair) => {
                debug!(english = %pair.english, german = %pair.german, "translation complete");
                pair
            }
            Err(err) => {
                warn!(error = %err, "translation failed, storing sentinel pair");
                TranslationPair::sentinel()
            }
        }
    }
}
