#![allow(dead_code)]

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use pocketbook::books::{CandidateBook, PhraseBook, Pocketbook, RateBook, VocabularyBook};
use pocketbook::enrichment::{
    Language, RateQuote, RateSource, SpeechClip, SpeechSynthesizer, TranslationPair, Translator,
};
use pocketbook::storage::{FieldValue, MemoryStore, RecordStore, StorageError, StoredRow, TableSpec};

pub struct StubTranslator {
    pair: TranslationPair,
    calls: AtomicUsize,
}

impl StubTranslator {
    pub fn answering(english: &str, german: &str) -> Self {
        Self {
            pair: TranslationPair::new(english, german),
            calls: AtomicUsize::new(0),
        }
    }

    pub fn failing() -> Self {
        Self {
            pair: TranslationPair::sentinel(),
            calls: AtomicUsize::new(0),
        }
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl Translator for StubTranslator {
    async fn translate(&self, _source_text: &str) -> TranslationPair {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.pair.clone()
    }
}

#[derive(Default)]
pub struct RecordingSpeech {
    requests: Mutex<Vec<(String, Language)>>,
}

impl RecordingSpeech {
    pub fn requests(&self) -> Vec<(String, Language)> {
        self.requests.lock().expect("speech mutex poisoned").clone()
    }
}

#[async_trait]
impl SpeechSynthesizer for RecordingSpeech {
    async fn synthesize(&self, text: &str, language: Language) -> Option<SpeechClip> {
        self.requests
            .lock()
            .expect("speech mutex poisoned")
            .push((text.to_string(), language));
        Some(SpeechClip {
            language,
            content_type: "audio/mpeg".to_string(),
            bytes: text.as_bytes().to_vec(),
        })
    }
}

pub struct FixedRate(pub Option<f64>);

#[async_trait]
impl RateSource for FixedRate {
    async fn fetch_rate(&self, base: &str, quote: &str) -> RateQuote {
        match self.0 {
            Some(rate) => RateQuote::available(base, quote, rate),
            None => RateQuote::unavailable(base, quote, "exchange rate unavailable: timeout".into()),
        }
    }
}

/// A store whose database connection is gone: every call fails.
pub struct ClosedStore;

#[async_trait]
impl RecordStore for ClosedStore {
    async fn write(
        &self,
        _table: &'static TableSpec,
        _fields: Vec<FieldValue>,
    ) -> Result<i64, StorageError> {
        Err(StorageError::Database(sqlx::Error::PoolClosed))
    }

    async fn read_all(&self, _table: &'static TableSpec) -> Result<Vec<StoredRow>, StorageError> {
        Err(StorageError::Database(sqlx::Error::PoolClosed))
    }

    async fn delete_by_id(&self, _table: &'static TableSpec, _id: i64) -> Result<bool, StorageError> {
        Err(StorageError::Database(sqlx::Error::PoolClosed))
    }
}

/// Books whose vocabulary store is unreachable; everything else works.
pub fn books_with_closed_vocabulary() -> Arc<Pocketbook> {
    Arc::new(Pocketbook {
        candidates: CandidateBook::new(Arc::new(MemoryStore::default())),
        rates: RateBook::new(Arc::new(MemoryStore::default()), Arc::new(FixedRate(Some(4.97)))),
        vocabulary: VocabularyBook::new(Arc::new(ClosedStore)),
        phrases: PhraseBook::new(
            Arc::new(MemoryStore::default()),
            Arc::new(StubTranslator::answering("Good morning", "Guten Morgen")),
            Arc::new(RecordingSpeech::default()),
        ),
    })
}

pub struct Harness {
    pub books: Arc<Pocketbook>,
    pub candidates: MemoryStore,
    pub rates: MemoryStore,
    pub vocabulary: MemoryStore,
    pub phrases: MemoryStore,
    pub translator: Arc<StubTranslator>,
    pub speech: Arc<RecordingSpeech>,
}

pub fn harness_with(translator: StubTranslator, rate: Option<f64>) -> Harness {
    let candidates = MemoryStore::default();
    let rates = MemoryStore::default();
    let vocabulary = MemoryStore::default();
    let phrases = MemoryStore::default();
    let translator = Arc::new(translator);
    let speech = Arc::new(RecordingSpeech::default());

    let books = Pocketbook {
        candidates: CandidateBook::new(Arc::new(candidates.clone())),
        rates: RateBook::new(Arc::new(rates.clone()), Arc::new(FixedRate(rate))),
        vocabulary: VocabularyBook::new(Arc::new(vocabulary.clone())),
        phrases: PhraseBook::new(
            Arc::new(phrases.clone()),
            translator.clone(),
            speech.clone(),
        ),
    };

    Harness {
        books: Arc::new(books),
        candidates,
        rates,
        vocabulary,
        phrases,
        translator,
        speech,
    }
}

pub fn harness() -> Harness {
    harness_with(StubTranslator::answering("Good morning", "Guten Morgen"), Some(4.97))
}
