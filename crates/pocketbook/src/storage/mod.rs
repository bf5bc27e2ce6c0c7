//! Storage gateway: one statement per call against a book's table.

pub mod memory;
pub mod repository;
pub mod sqlite;
pub mod table;

pub use memory::MemoryStore;
pub use repository::{read_records, RecordStore, StorageError};
pub use sqlite::SqliteStore;
pub use table::{
    Column, ColumnKind, FieldValue, Record, RowReader, SortOrder, StoredRow, TableSpec,
};
