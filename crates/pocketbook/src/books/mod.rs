//! Record books. Each book validates its form, calls enrichment where the
//! book needs it, and writes through its own storage gateway.

pub mod candidates;
pub mod export;
pub mod filter;
pub mod phrases;
pub mod rates;
pub mod vocabulary;

pub use candidates::{Candidate, CandidateBook, CandidateForm, SKILL_CHOICES};
pub use export::write_csv;
pub use filter::{filter_rows, Searchable};
pub use phrases::{PhraseBook, PhraseEntry, PhraseForm, PhraseOutcome};
pub use rates::{ExchangeRateSample, RateBook, RateRecording, BASE_CURRENCY, QUOTE_CURRENCY};
pub use vocabulary::{VocabularyBook, VocabularyEntry, VocabularyForm};

use std::sync::Arc;

use crate::config::{BookStorageConfig, EnrichmentConfig};
use crate::enrichment::{ExchangeRateClient, MyMemoryTranslator, TranslateTtsClient};
use crate::error::AppError;
use crate::storage::SqliteStore;

/// All books served by one process.
pub struct Pocketbook {
    pub candidates: CandidateBook,
    pub rates: RateBook,
    pub vocabulary: VocabularyBook,
    pub phrases: PhraseBook,
}

impl Pocketbook {
    /// Open one storage pool per book and build the remote clients.
    pub async fn connect(
        storage: &BookStorageConfig,
        enrichment: &EnrichmentConfig,
    ) -> Result<Self, AppError> {
        let candidates = Arc::new(SqliteStore::connect(&storage.candidates).await?);
        let rates = Arc::new(SqliteStore::connect(&storage.rates).await?);
        let vocabulary = Arc::new(SqliteStore::connect(&storage.vocabulary).await?);
        let phrases = Arc::new(SqliteStore::connect(&storage.phrases).await?);

        let rate_source = Arc::new(ExchangeRateClient::new(&enrichment.rates)?);
        let translator = Arc::new(MyMemoryTranslator::new(&enrichment.translation)?);
        let speech = Arc::new(TranslateTtsClient::new(&enrichment.speech)?);

        Ok(Self {
            candidates: CandidateBook::new(candidates),
            rates: RateBook::new(rates, rate_source),
            vocabulary: VocabularyBook::new(vocabulary),
            phrases: PhraseBook::new(phrases, translator, speech),
        })
    }
}

/// Trimmed value of a required text field, or `None` when it is blank.
pub(crate) fn required(value: &str) -> Option<String> {
    let trimmed = value.trim();
    (!trimmed.is_empty()).then(|| trimmed.to_string())
}
