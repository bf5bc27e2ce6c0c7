use std::collections::HashMap;

use async_trait::async_trait;
use serde::Deserialize;
use tracing::{debug, warn};

use super::{build_http_client, join_url, EnrichmentError, RateQuote, RateSource};
use crate::config::RatesConfig;

#[derive(Debug, Deserialize)]
struct LatestRates {
    rates: HashMap<String, serde_json::Value>,
}

/// Client for `GET {base_url}/latest/{base}` style exchange-rate providers.
#[derive(Debug, Clone)]
pub struct ExchangeRateClient {
    http: reqwest::Client,
    base_url: String,
}

impl ExchangeRateClient {
    pub fn new(config: &RatesConfig) -> Result<Self, EnrichmentError> {
        Ok(Self {
            http: build_http_client(config.timeout)?,
            base_url: config.base_url.clone(),
        })
    }

    async fn request_rate(&self, base: &str, quote: &str) -> Result<f64, EnrichmentError> {
        let url = join_url(&self.base_url, &format!("latest/{base}"));
        let response = self.http.get(&url).send().await?;

        let status = response.status();
        if !status.is_success() {
            return Err(EnrichmentError::Status(status.as_u16()));
        }

        let body = response.bytes().await?;
        let latest: LatestRates = serde_json::from_slice(&body)
            .map_err(|err| EnrichmentError::Malformed(err.to_string()))?;

        latest
            .rates
            .get(quote)
            .and_then(serde_json::Value::as_f64)
            .ok_or_else(|| EnrichmentError::MissingField(format!("rates.{quote}")))
    }
}

#[async_trait]
impl RateSource for ExchangeRateClient {
    async fn fetch_rate(&self, base: &str, quote: &str) -> RateQuote {
        match self.request_rate(base, quote).await {
            Ok(rate) => {
                debug!(base, quote, rate, "exchange rate fetched");
                RateQuote::available(base, quote, rate)
            }
            Err(err) => {
                warn!(base, quote, error = %err, "exchange rate unavailable, using 0.0");
                RateQuote::unavailable(base, quote, format!("exchange rate unavailable: {err}"))
            }
        }
    }
}
