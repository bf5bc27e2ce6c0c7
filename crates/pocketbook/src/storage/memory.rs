use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use async_trait::async_trait;

use super::repository::{RecordStore, StorageError};
use super::table::{FieldValue, SortOrder, StoredRow, TableSpec};

#[derive(Debug, Default)]
struct MemoryTable {
    last_id: i64,
    rows: Vec<StoredRow>,
}

/// Process-local [`RecordStore`] used by tests and demos. Counts write calls so
/// callers can assert that gated submissions never reach storage.
#[derive(Debug, Default, Clone)]
pub struct MemoryStore {
    tables: Arc<Mutex<HashMap<&'static str, MemoryTable>>>,
    writes: Arc<AtomicUsize>,
}

impl MemoryStore {
    pub fn writes(&self) -> usize {
        self.writes.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl RecordStore for MemoryStore {
    async fn write(
        &self,
        table: &'static TableSpec,
        fields: Vec<FieldValue>,
    ) -> Result<i64, StorageError> {
        self.writes.fetch_add(1, Ordering::SeqCst);
        table.check_arity(&fields)?;

        let mut guard = self.tables.lock().expect("memory store mutex poisoned");
        let entry = guard.entry(table.name).or_default();
        entry.last_id += 1;
        let id = entry.last_id;
        entry.rows.push(StoredRow { id, values: fields });
        Ok(id)
    }

    async fn read_all(&self, table: &'static TableSpec) -> Result<Vec<StoredRow>, StorageError> {
        let guard = self.tables.lock().expect("memory store mutex poisoned");
        let mut rows = guard
            .get(table.name)
            .map(|entry| entry.rows.clone())
            .unwrap_or_default();
        if table.order == SortOrder::NewestFirst {
            rows.reverse();
        }
        Ok(rows)
    }

    async fn delete_by_id(&self, table: &'static TableSpec, id: i64) -> Result<bool, StorageError> {
        let mut guard = self.tables.lock().expect("memory store mutex poisoned");
        let Some(entry) = guard.get_mut(table.name) else {
            return Ok(false);
        };
        let before = entry.rows.len();
        entry.rows.retain(|row| row.id != id);
        Ok(entry.rows.len() != before)
    }
}
