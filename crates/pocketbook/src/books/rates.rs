use std::sync::Arc;

use chrono::{DateTime, Utc};
use serde::Serialize;
use tracing::{info, warn};

use crate::enrichment::{RateQuote, RateSource};
use crate::storage::{
    read_records, Column, FieldValue, Record, RecordStore, SortOrder, StorageError, StoredRow,
    TableSpec,
};

pub const BASE_CURRENCY: &str = "EUR";
pub const QUOTE_CURRENCY: &str = "MYR";

static EXCHANGE_RATES: TableSpec = TableSpec {
    name: "exchange_rates",
    columns: &[
        Column::timestamp("recorded_at"),
        Column::text("pair"),
        Column::real("rate"),
    ],
    order: SortOrder::OldestFirst,
};

/// One manually recorded rate observation. Append-only.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ExchangeRateSample {
    pub id: i64,
    pub recorded_at: DateTime<Utc>,
    pub pair: String,
    pub rate: f64,
}

impl Record for ExchangeRateSample {
    fn table() -> &'static TableSpec {
        &EXCHANGE_RATES
    }

    fn from_row(row: StoredRow) -> Result<Self, StorageError> {
        let id = row.id;
        let mut reader = row.reader(&EXCHANGE_RATES);
        Ok(Self {
            id,
            recorded_at: reader.timestamp()?,
            pair: reader.text()?,
            rate: reader.real()?,
        })
    }
}

/// Outcome of the record action: the quote that was fetched and, when the
/// provider answered, the sample that was appended.
#[derive(Debug, Clone, Serialize)]
pub struct RateRecording {
    pub quote: RateQuote,
    pub sample: Option<ExchangeRateSample>,
}

pub struct RateBook {
    store: Arc<dyn RecordStore>,
    source: Arc<dyn RateSource>,
}

impl RateBook {
    pub fn new(store: Arc<dyn RecordStore>, source: Arc<dyn RateSource>) -> Self {
        Self { store, source }
    }

    pub async fn current(&self) -> RateQuote {
        self.source.fetch_rate(BASE_CURRENCY, QUOTE_CURRENCY).await
    }

    /// Fetch the live rate and append it to the history. The `0.0` sentinel
    /// is reported back but never stored.
    pub async fn record(&self) -> Result<RateRecording, StorageError> {
        let quote = self.current().await;
        if !quote.is_available() {
            warn!(pair = %quote.pair(), "rate unavailable, nothing recorded");
            return Ok(RateRecording {
                quote,
                sample: None,
            });
        }

        let recorded_at = Utc::now();
        let pair = quote.pair();
        let id = self
            .store
            .write(
                &EXCHANGE_RATES,
                vec![
                    FieldValue::Timestamp(recorded_at),
                    FieldValue::Text(pair.clone()),
                    FieldValue::Real(quote.rate),
                ],
            )
            .await?;

        info!(id, %pair, rate = quote.rate, "exchange rate recorded");
        let sample = ExchangeRateSample {
            id,
            recorded_at,
            pair,
            rate: quote.rate,
        };
        Ok(RateRecording {
            quote,
            sample: Some(sample),
        })
    }

    pub async fn history(&self) -> Result<Vec<ExchangeRateSample>, StorageError> {
        read_records(self.store.as_ref()).await
    }
}
