use async_trait::async_trait;
use tracing::{debug, warn};

use super::{build_http_client, join_url, EnrichmentError, Language, SpeechClip, SpeechSynthesizer};
use crate::config::SpeechConfig;

const MPEG: &str = "audio/mpeg";

/// Speech synthesis through the public `translate_tts` endpoint. Returns MP3.
#[derive(Debug, Clone)]
pub struct TranslateTtsClient {
    http: reqwest::Client,
    base_url: String,
}

impl TranslateTtsClient {
    pub fn new(config: &SpeechConfig) -> Result<Self, EnrichmentError> {
        Ok(Self {
            http: build_http_client(config.timeout)?,
            base_url: config.base_url.clone(),
        })
    }

    async fn request_audio(&self, text: &str, language: Language) -> Result<Vec<u8>, EnrichmentError> {
        let response = self
            .http
            .get(join_url(&self.base_url, "translate_tts"))
            .query(&[
                ("ie", "UTF-8"),
                ("client", "tw-ob"),
                ("tl", language.code()),
                ("q", text),
            ])
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            return Err(EnrichmentError::Status(status.as_u16()));
        }

        let bytes = response.bytes().await?;
        if bytes.is_empty() {
            return Err(EnrichmentError::MissingField("audio body".into()));
        }
        Ok(bytes.to_vec())
    }
}

#[async_trait]
impl SpeechSynthesizer for TranslateTtsClient {
    async fn synthesize(&self, text: &str, language: Language) -> Option<SpeechClip> {
        let text = text.trim();
        if text.is_empty() {
            return None;
        }

        match self.request_audio(text, language).await {
            Ok(bytes) => {
                debug!(%language, size = bytes.len(), "speech synthesized");
                Some(SpeechClip {
                    language,
                    content_type: MPEG.to_string(),
                    bytes,
                })
            }
            Err(err) => {
                warn!(%language, error = %err, "speech synthesis failed");
                None
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use httpmock::prelude::*;
    use std::time::Duration;

    fn client_for(server: &MockServer) -> TranslateTtsClient {
        TranslateTtsClient::new(&SpeechConfig {
            base_url: server.base_url(),
            timeout: Duration::from_secs(3),
        })
        .expect("client builds")
    }

    #[tokio::test]
    async fn returns_audio_bytes_for_the_requested_language() {
        let server = MockServer::start();
        let mock = server.mock(|when, then| {
            when.method(GET)
                .path("/translate_tts")
                .query_param("tl", "de")
                .query_param("q", "Guten Morgen");
            then.status(200)
                .header("content-type", MPEG)
                .body([0x49u8, 0x44, 0x33, 0x04]);
        });

        let clip = client_for(&server)
            .synthesize("Guten Morgen", Language::German)
            .await
            .expect("audio returned");

        mock.assert();
        assert_eq!(clip.language, Language::German);
        assert_eq!(clip.content_type, MPEG);
        assert_eq!(clip.bytes, vec![0x49, 0x44, 0x33, 0x04]);
    }

    #[tokio::test]
    async fn empty_input_never_reaches_the_service() {
        let server = MockServer::start();
        let mock = server.mock(|when, then| {
            when.method(GET).path("/translate_tts");
            then.status(200).body([1u8]);
        });

        let clip = client_for(&server).synthesize("   ", Language::Japanese).await;

        assert!(clip.is_none());
        assert_eq!(mock.calls(), 0);
    }

    #[tokio::test]
    async fn failures_yield_no_audio() {
        let server = MockServer::start();
        server.mock(|when, then| {
            when.method(GET).path("/translate_tts");
            then.status(429).body("slow down");
        });

        let clip = client_for(&server).synthesize("Hallo", Language::German).await;

        assert!(clip.is_none());
    }
}
