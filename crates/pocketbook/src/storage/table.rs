use chrono::{DateTime, Utc};

use super::repository::StorageError;

/// Storage class of a single column.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ColumnKind {
    Text,
    Real,
    Timestamp,
}

impl ColumnKind {
    fn sql_type(self) -> &'static str {
        match self {
            ColumnKind::Text | ColumnKind::Timestamp => "TEXT",
            ColumnKind::Real => "REAL",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Column {
    pub name: &'static str,
    pub kind: ColumnKind,
}

impl Column {
    pub const fn text(name: &'static str) -> Self {
        Self {
            name,
            kind: ColumnKind::Text,
        }
    }

    pub const fn real(name: &'static str) -> Self {
        Self {
            name,
            kind: ColumnKind::Real,
        }
    }

    pub const fn timestamp(name: &'static str) -> Self {
        Self {
            name,
            kind: ColumnKind::Timestamp,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SortOrder {
    OldestFirst,
    NewestFirst,
}

/// Static description of a book table. Table and column names never come
/// from user input; user values are always bound as parameters.
#[derive(Debug, PartialEq, Eq)]
pub struct TableSpec {
    pub name: &'static str,
    pub columns: &'static [Column],
    pub order: SortOrder,
}

impl TableSpec {
    pub fn create_statement(&self) -> String {
        let columns: Vec<String> = self
            .columns
            .iter()
            .map(|column| format!("{} {} NOT NULL", column.name, column.kind.sql_type()))
            .collect();
        format!(
            "CREATE TABLE IF NOT EXISTS {} (id INTEGER PRIMARY KEY AUTOINCREMENT, {})",
            self.name,
            columns.join(", ")
        )
    }

    pub fn insert_statement(&self) -> String {
        let names: Vec<&str> = self.columns.iter().map(|column| column.name).collect();
        let placeholders = vec!["?"; self.columns.len()].join(", ");
        format!(
            "INSERT INTO {} ({}) VALUES ({})",
            self.name,
            names.join(", "),
            placeholders
        )
    }

    pub fn select_statement(&self) -> String {
        let names: Vec<&str> = self.columns.iter().map(|column| column.name).collect();
        let direction = match self.order {
            SortOrder::OldestFirst => "ASC",
            SortOrder::NewestFirst => "DESC",
        };
        format!(
            "SELECT id, {} FROM {} ORDER BY id {}",
            names.join(", "),
            self.name,
            direction
        )
    }

    pub fn delete_statement(&self) -> String {
        format!("DELETE FROM {} WHERE id = ?", self.name)
    }

    pub(crate) fn check_arity(&self, fields: &[FieldValue]) -> Result<(), StorageError> {
        if fields.len() == self.columns.len() {
            Ok(())
        } else {
            Err(StorageError::ColumnMismatch {
                table: self.name,
                expected: self.columns.len(),
                actual: fields.len(),
            })
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum FieldValue {
    Text(String),
    Real(f64),
    Timestamp(DateTime<Utc>),
}

impl FieldValue {
    pub fn kind(&self) -> ColumnKind {
        match self {
            FieldValue::Text(_) => ColumnKind::Text,
            FieldValue::Real(_) => ColumnKind::Real,
            FieldValue::Timestamp(_) => ColumnKind::Timestamp,
        }
    }
}

/// A row as returned by the store: the storage-assigned id followed by the
/// values in `TableSpec::columns` order.
#[derive(Debug, Clone, PartialEq)]
pub struct StoredRow {
    pub id: i64,
    pub values: Vec<FieldValue>,
}

impl StoredRow {
    pub fn reader(self, table: &'static TableSpec) -> RowReader {
        RowReader {
            table,
            position: 0,
            values: self.values.into_iter(),
        }
    }
}

/// Sequential, type-checked access to the values of a [`StoredRow`].
#[derive(Debug)]
pub struct RowReader {
    table: &'static TableSpec,
    position: usize,
    values: std::vec::IntoIter<FieldValue>,
}

impl RowReader {
    pub fn text(&mut self) -> Result<String, StorageError> {
        match self.next()? {
            FieldValue::Text(value) => Ok(value),
            other => Err(self.unexpected(other)),
        }
    }

    pub fn real(&mut self) -> Result<f64, StorageError> {
        match self.next()? {
            FieldValue::Real(value) => Ok(value),
            other => Err(self.unexpected(other)),
        }
    }

    pub fn timestamp(&mut self) -> Result<DateTime<Utc>, StorageError> {
        match self.next()? {
            FieldValue::Timestamp(value) => Ok(value),
            other => Err(self.unexpected(other)),
        }
    }

    fn next(&mut self) -> Result<FieldValue, StorageError> {
        let value = self.values.next().ok_or(StorageError::ColumnMismatch {
            table: self.table.name,
            expected: self.table.columns.len(),
            actual: self.position,
        })?;
        self.position += 1;
        Ok(value)
    }

    fn unexpected(&self, value: FieldValue) -> StorageError {
        let column = self
            .table
            .columns
            .get(self.position - 1)
            .map_or("?", |column| column.name);
        StorageError::UnexpectedValue {
            table: self.table.name,
            column,
            found: value.kind(),
        }
    }
}

/// A typed record that lives in one table.
pub trait Record: Sized {
    fn table() -> &'static TableSpec;
    fn from_row(row: StoredRow) -> Result<Self, StorageError>;
}

#[cfg(test)]
mod tests {
    use super::*;

    static NOTES: TableSpec = TableSpec {
        name: "notes",
        columns: &[Column::text("body"), Column::real("weight")],
        order: SortOrder::NewestFirst,
    };

    #[test]
    fn statements_only_use_placeholders_for_values() {
        assert_eq!(
            NOTES.create_statement(),
            "CREATE TABLE IF NOT EXISTS notes (id INTEGER PRIMARY KEY AUTOINCREMENT, body TEXT NOT NULL, weight REAL NOT NULL)"
        );
        assert_eq!(
            NOTES.insert_statement(),
            "INSERT INTO notes (body, weight) VALUES (?, ?)"
        );
        assert_eq!(
            NOTES.select_statement(),
            "SELECT id, body, weight FROM notes ORDER BY id DESC"
        );
        assert_eq!(NOTES.delete_statement(), "DELETE FROM notes WHERE id = ?");
    }

    #[test]
    fn reader_reports_the_offending_column() {
        let row = StoredRow {
            id: 1,
            values: vec![FieldValue::Text("x".into()), FieldValue::Text("y".into())],
        };
        let mut reader = row.reader(&NOTES);
        assert_eq!(reader.text().expect("body is text"), "x");
        match reader.real() {
            Err(StorageError::UnexpectedValue { column, found, .. }) => {
                assert_eq!(column, "weight");
                assert_eq!(found, ColumnKind::Text);
            }
            other => panic!("expected type mismatch, got {other:?}"),
        }
    }

    #[test]
    fn arity_is_checked_before_writing() {
        let err = NOTES
            .check_arity(&[FieldValue::Text("only one".into())])
            .expect_err("two columns expected");
        assert!(matches!(
            err,
            StorageError::ColumnMismatch {
                expected: 2,
                actual: 1,
                ..
            }
        ));
    }
}
