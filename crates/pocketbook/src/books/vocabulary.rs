use std::sync::Arc;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::info;

use super::filter::{filter_rows, Searchable};
use super::required;
use crate::storage::{
    read_records, Column, FieldValue, Record, RecordStore, SortOrder, StorageError, StoredRow,
    TableSpec,
};

static VOCAB_BOOK: TableSpec = TableSpec {
    name: "vocab_book",
    columns: &[
        Column::text("german"),
        Column::text("japanese"),
        Column::text("memo"),
        Column::timestamp("created_at"),
    ],
    order: SortOrder::NewestFirst,
};

/// A German word with its Japanese meaning and an optional memo.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct VocabularyEntry {
    pub id: i64,
    pub german: String,
    pub japanese: String,
    pub memo: String,
    pub created_at: DateTime<Utc>,
}

impl VocabularyEntry {
    /// Display label for the delete selector; the selector value is the id.
    pub fn label(&self) -> String {
        format!("{} ({})", self.german, self.japanese)
    }
}

impl Record for VocabularyEntry {
    fn table() -> &'static TableSpec {
        &VOCAB_BOOK
    }

    fn from_row(row: StoredRow) -> Result<Self, StorageError> {
        let id = row.id;
        let mut reader = row.reader(&VOCAB_BOOK);
        Ok(Self {
            id,
            german: reader.text()?,
            japanese: reader.text()?,
            memo: reader.text()?,
            created_at: reader.timestamp()?,
        })
    }
}

impl Searchable for VocabularyEntry {
    fn search_fields(&self) -> Vec<&str> {
        vec![self.german.as_str(), self.japanese.as_str()]
    }
}

/// German and Japanese are required; the memo is optional.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct VocabularyForm {
    #[serde(default)]
    pub german: String,
    #[serde(default)]
    pub japanese: String,
    #[serde(default)]
    pub memo: String,
}

pub struct VocabularyBook {
    store: Arc<dyn RecordStore>,
}

impl VocabularyBook {
    pub fn new(store: Arc<dyn RecordStore>) -> Self {
        Self { store }
    }

    pub async fn add(&self, form: VocabularyForm) -> Result<Option<VocabularyEntry>, StorageError> {
        let (Some(german), Some(japanese)) = (required(&form.german), required(&form.japanese))
        else {
            return Ok(None);
        };
        let memo = form.memo.trim().to_string();

        let created_at = Utc::now();
        let id = self
            .store
            .write(
                &VOCAB_BOOK,
                vec![
                    FieldValue::Text(german.clone()),
                    FieldValue::Text(japanese.clone()),
                    FieldValue::Text(memo.clone()),
                    FieldValue::Timestamp(created_at),
                ],
            )
            .await?;

        info!(id, %german, "vocabulary entry saved");
        Ok(Some(VocabularyEntry {
            id,
            german,
            japanese,
            memo,
            created_at,
        }))
    }

    pub async fn list(&self, query: Option<&str>) -> Result<Vec<VocabularyEntry>, StorageError> {
        let rows = read_records::<VocabularyEntry>(self.store.as_ref()).await?;
        Ok(filter_rows(rows, query))
    }

    /// Remove one entry. Unknown ids are a no-op and return `false`.
    pub async fn delete(&self, id: i64) -> Result<bool, StorageError> {
        self.store.delete_by_id(&VOCAB_BOOK, id).await
    }
}
