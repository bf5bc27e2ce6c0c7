use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::query::Query;
use sqlx::sqlite::{Sqlite, SqliteArguments, SqlitePool, SqlitePoolOptions, SqliteRow};
use sqlx::Row;
use tracing::{debug, info};

use super::repository::{RecordStore, StorageError};
use super::table::{ColumnKind, FieldValue, StoredRow, TableSpec};
use crate::config::StorageConfig;

/// SQLite-backed [`RecordStore`]. Connections come from a pool and are held
/// only for the statement being executed.
#[derive(Debug, Clone)]
pub struct SqliteStore {
    pool: SqlitePool,
}

impl SqliteStore {
    pub async fn connect(config: &StorageConfig) -> Result<Self, StorageError> {
        let pool = SqlitePoolOptions::new()
            .max_connections(config.max_connections.max(1))
            .connect(&config.database_url)
            .await?;
        debug!(database_url = %config.database_url, "storage pool opened");
        Ok(Self { pool })
    }

    /// A private in-memory database. The pool keeps exactly one connection
    /// alive, otherwise every new connection would see an empty database.
    pub async fn in_memory() -> Result<Self, StorageError> {
        let pool = SqlitePoolOptions::new()
            .max_connections(1)
            .min_connections(1)
            .idle_timeout(None)
            .max_lifetime(None)
            .connect("sqlite::memory:")
            .await?;
        Ok(Self { pool })
    }
}

#[async_trait]
impl RecordStore for SqliteStore {
    async fn write(
        &self,
        table: &'static TableSpec,
        fields: Vec<FieldValue>,
    ) -> Result<i64, StorageError> {
        table.check_arity(&fields)?;

        let mut conn = self.pool.acquire().await?;
        let create = table.create_statement();
        sqlx::query(&create).execute(&mut *conn).await?;

        let insert = table.insert_statement();
        let query = fields
            .into_iter()
            .fold(sqlx::query(&insert), |query, value| bind_value(query, value));
        let id = query.execute(&mut *conn).await?.last_insert_rowid();

        info!(table = table.name, id, "row written");
        Ok(id)
    }

    async fn read_all(&self, table: &'static TableSpec) -> Result<Vec<StoredRow>, StorageError> {
        let select = table.select_statement();
        let rows = match sqlx::query(&select).fetch_all(&self.pool).await {
            Ok(rows) => rows,
            Err(err) if is_missing_table(&err) => {
                debug!(table = table.name, "table not created yet, reading as empty");
                return Ok(Vec::new());
            }
            Err(err) => return Err(err.into()),
        };

        rows.iter().map(|row| decode_row(table, row)).collect()
    }

    async fn delete_by_id(&self, table: &'static TableSpec, id: i64) -> Result<bool, StorageError> {
        let delete = table.delete_statement();
        let result = match sqlx::query(&delete).bind(id).execute(&self.pool).await {
            Ok(result) => result,
            Err(err) if is_missing_table(&err) => return Ok(false),
            Err(err) => return Err(err.into()),
        };

        let removed = result.rows_affected() > 0;
        info!(table = table.name, id, removed, "delete executed");
        Ok(removed)
    }
}

fn bind_value<'q>(
    query: Query<'q, Sqlite, SqliteArguments<'q>>,
    value: FieldValue,
) -> Query<'q, Sqlite, SqliteArguments<'q>> {
    match value {
        FieldValue::Text(text) => query.bind(text),
        FieldValue::Real(number) => query.bind(number),
        FieldValue::Timestamp(at) => query.bind(at),
    }
}

fn decode_row(table: &'static TableSpec, row: &SqliteRow) -> Result<StoredRow, StorageError> {
    let id: i64 = row.try_get("id")?;
    let values = table
        .columns
        .iter()
        .map(|column| {
            let value = match column.kind {
                ColumnKind::Text => FieldValue::Text(row.try_get::<String, _>(column.name)?),
                ColumnKind::Real => FieldValue::Real(row.try_get::<f64, _>(column.name)?),
                ColumnKind::Timestamp => {
                    FieldValue::Timestamp(row.try_get::<DateTime<Utc>, _>(column.name)?)
                }
            };
            Ok(value)
        })
        .collect::<Result<Vec<_>, sqlx::Error>>()?;

    Ok(StoredRow { id, values })
}

fn is_missing_table(err: &sqlx::Error) -> bool {
    match err {
        sqlx::Error::Database(db) => db.message().contains("no such table"),
        _ => false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::table::{Column, SortOrder};

    static WORDS: TableSpec = TableSpec {
        name: "words",
        columns: &[Column::text("word"), Column::real("score"), Column::timestamp("seen_at")],
        order: SortOrder::OldestFirst,
    };

    fn fields(word: &str) -> Vec<FieldValue> {
        vec![
            FieldValue::Text(word.to_string()),
            FieldValue::Real(0.5),
            FieldValue::Timestamp(Utc::now()),
        ]
    }

    #[tokio::test]
    async fn reading_a_table_that_was_never_written_is_empty() {
        let store = SqliteStore::in_memory().await.expect("memory store");
        let rows = store.read_all(&WORDS).await.expect("missing table reads empty");
        assert!(rows.is_empty());
    }

    #[tokio::test]
    async fn writes_assign_fresh_identifiers() {
        let store = SqliteStore::in_memory().await.expect("memory store");
        let first = store.write(&WORDS, fields("Haus")).await.expect("write");
        let second = store.write(&WORDS, fields("Auto")).await.expect("write");
        assert_ne!(first, second);

        let rows = store.read_all(&WORDS).await.expect("read");
        assert_eq!(rows.len(), 2);
        assert_eq!(rows[0].id, first);
        assert_eq!(rows[0].values[0], FieldValue::Text("Haus".into()));
        assert_eq!(rows[1].id, second);
    }

    #[tokio::test]
    async fn identifiers_are_not_reused_after_delete() {
        let store = SqliteStore::in_memory().await.expect("memory store");
        let first = store.write(&WORDS, fields("Haus")).await.expect("write");
        assert!(store.delete_by_id(&WORDS, first).await.expect("delete"));
        let second = store.write(&WORDS, fields("Haus")).await.expect("write");
        assert!(second > first);
    }

    #[tokio::test]
    async fn user_text_is_bound_not_interpolated() {
        let store = SqliteStore::in_memory().await.expect("memory store");
        let hostile = "x'); DROP TABLE words; --";
        store.write(&WORDS, fields(hostile)).await.expect("write");
        let rows = store.read_all(&WORDS).await.expect("table survives");
        assert_eq!(rows[0].values[0], FieldValue::Text(hostile.into()));
    }

    #[tokio::test]
    async fn deleting_from_a_missing_table_is_a_no_op() {
        let store = SqliteStore::in_memory().await.expect("memory store");
        assert!(!store.delete_by_id(&WORDS, 7).await.expect("no-op"));
    }

    #[tokio::test]
    async fn mismatched_field_count_is_rejected() {
        let store = SqliteStore::in_memory().await.expect("memory store");
        let err = store
            .write(&WORDS, vec![FieldValue::Text("short".into())])
            .await
            .expect_err("arity mismatch");
        assert!(matches!(err, StorageError::ColumnMismatch { .. }));
    }
}
