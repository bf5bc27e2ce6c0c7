use std::sync::Arc;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use super::filter::{filter_rows, Searchable};
use super::required;
use crate::enrichment::{Language, SpeechClip, SpeechSynthesizer, Translator};
use crate::storage::{
    read_records, Column, FieldValue, Record, RecordStore, SortOrder, StorageError, StoredRow,
    TableSpec,
};

static PHRASE_BOOK: TableSpec = TableSpec {
    name: "phrase_book",
    columns: &[
        Column::text("japanese"),
        Column::text("english"),
        Column::text("german"),
        Column::text("memo"),
        Column::timestamp("created_at"),
    ],
    order: SortOrder::NewestFirst,
};

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PhraseEntry {
    pub id: i64,
    pub japanese: String,
    pub english: String,
    pub german: String,
    pub memo: String,
    pub created_at: DateTime<Utc>,
}

impl PhraseEntry {
    pub fn text_in(&self, language: Language) -> &str {
        match language {
            Language::Japanese => &self.japanese,
            Language::English => &self.english,
            Language::German => &self.german,
        }
    }

    pub fn label(&self) -> String {
        format!("{} / {}", self.japanese, self.german)
    }
}

impl Record for PhraseEntry {
    fn table() -> &'static TableSpec {
        &PHRASE_BOOK
    }

    fn from_row(row: StoredRow) -> Result<Self, StorageError> {
        let id = row.id;
        let mut reader = row.reader(&PHRASE_BOOK);
        Ok(Self {
            id,
            japanese: reader.text()?,
            english: reader.text()?,
            german: reader.text()?,
            memo: reader.text()?,
            created_at: reader.timestamp()?,
        })
    }
}

impl Searchable for PhraseEntry {
    fn search_fields(&self) -> Vec<&str> {
        vec![
            self.japanese.as_str(),
            self.english.as_str(),
            self.german.as_str(),
        ]
    }
}

/// Only the Japanese source is entered; English and German are derived.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct PhraseForm {
    #[serde(default)]
    pub japanese: String,
    #[serde(default)]
    pub memo: String,
}

/// A stored phrase together with the German audio synthesized right after.
#[derive(Debug, Clone)]
pub struct PhraseOutcome {
    pub entry: PhraseEntry,
    pub translation_failed: bool,
    pub audio: Option<SpeechClip>,
}

pub struct PhraseBook {
    store: Arc<dyn RecordStore>,
    translator: Arc<dyn Translator>,
    speech: Arc<dyn SpeechSynthesizer>,
}

impl PhraseBook {
    pub fn new(
        store: Arc<dyn RecordStore>,
        translator: Arc<dyn Translator>,
        speech: Arc<dyn SpeechSynthesizer>,
    ) -> Self {
        Self {
            store,
            translator,
            speech,
        }
    }

    /// Translate, store, then synthesize the German reading, strictly in
    /// that order. The sentinel translation is stored like any other.
    pub async fn add(&self, form: PhraseForm) -> Result<Option<PhraseOutcome>, StorageError> {
        let Some(japanese) = required(&form.japanese) else {
            return Ok(None);
        };
        let memo = form.memo.trim().to_string();

        let translation = self.translator.translate(&japanese).await;
        let translation_failed = translation.is_sentinel();
        if translation_failed {
            warn!(%japanese, "storing phrase with sentinel translation");
        }

        let created_at = Utc::now();
        let id = self
            .store
            .write(
                &PHRASE_BOOK,
                vec![
                    FieldValue::Text(japanese.clone()),
                    FieldValue::Text(translation.english.clone()),
                    FieldValue::Text(translation.german.clone()),
                    FieldValue::Text(memo.clone()),
                    FieldValue::Timestamp(created_at),
                ],
            )
            .await?;
        info!(id, "phrase saved");

        let entry = PhraseEntry {
            id,
            japanese,
            english: translation.english,
            german: translation.german,
            memo,
            created_at,
        };

        let audio = if translation_failed {
            None
        } else {
            self.speech.synthesize(&entry.german, Language::German).await
        };

        Ok(Some(PhraseOutcome {
            entry,
            translation_failed,
            audio,
        }))
    }

    pub async fn list(&self, query: Option<&str>) -> Result<Vec<PhraseEntry>, StorageError> {
        let rows = read_records::<PhraseEntry>(self.store.as_ref()).await?;
        Ok(filter_rows(rows, query))
    }

    pub async fn delete(&self, id: i64) -> Result<bool, StorageError> {
        self.store.delete_by_id(&PHRASE_BOOK, id).await
    }

    /// Synthesize one stored phrase in `language`. `Ok(None)` covers both an
    /// unknown id and a synthesis failure.
    pub async fn speak(
        &self,
        id: i64,
        language: Language,
    ) -> Result<Option<SpeechClip>, StorageError> {
        let entries = read_records::<PhraseEntry>(self.store.as_ref()).await?;
        let Some(entry) = entries.into_iter().find(|entry| entry.id == id) else {
            return Ok(None);
        };
        Ok(self.speech.synthesize(entry.text_in(language), language).await)
    }
}
