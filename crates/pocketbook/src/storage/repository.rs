use async_trait::async_trait;

use super::table::{ColumnKind, FieldValue, Record, StoredRow, TableSpec};

/// Storage abstraction so the books can be exercised in isolation.
///
/// Every call runs exactly one statement (plus the idempotent table creation
/// on writes) and releases its connection before returning.
#[async_trait]
pub trait RecordStore: Send + Sync {
    /// Insert one row and return the identifier the store assigned to it.
    async fn write(
        &self,
        table: &'static TableSpec,
        fields: Vec<FieldValue>,
    ) -> Result<i64, StorageError>;

    /// All rows in table order. A table that was never written reads as empty.
    async fn read_all(&self, table: &'static TableSpec) -> Result<Vec<StoredRow>, StorageError>;

    /// Remove the row with `id`, returning whether anything was removed.
    async fn delete_by_id(&self, table: &'static TableSpec, id: i64) -> Result<bool, StorageError>;
}

/// Error enumeration for storage failures.
#[derive(Debug, thiserror::Error)]
pub enum StorageError {
    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),
    #[error("table {table} expects {expected} values, got {actual}")]
    ColumnMismatch {
        table: &'static str,
        expected: usize,
        actual: usize,
    },
    #[error("column {table}.{column} holds an unexpected {found:?} value")]
    UnexpectedValue {
        table: &'static str,
        column: &'static str,
        found: ColumnKind,
    },
}

/// Read every row of `R`'s table and decode it.
pub async fn read_records<R: Record>(store: &dyn RecordStore) -> Result<Vec<R>, StorageError> {
    store
        .read_all(R::table())
        .await?
        .into_iter()
        .map(R::from_row)
        .collect()
}
