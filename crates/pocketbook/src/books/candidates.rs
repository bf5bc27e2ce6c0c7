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

/// Skills offered in the registration form. Free text is accepted as well.
pub const SKILL_CHOICES: &[&str] = &[
    "Software engineering",
    "Nursing",
    "Caregiving",
    "Hospitality",
    "Construction",
    "Agriculture",
    "Manufacturing",
];

static CANDIDATES: TableSpec = TableSpec {
    name: "candidates",
    columns: &[
        Column::text("name"),
        Column::text("skill"),
        Column::text("target_country"),
        Column::timestamp("created_at"),
    ],
    order: SortOrder::OldestFirst,
};

/// A registered migration candidate.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Candidate {
    pub id: i64,
    pub name: String,
    pub skill: String,
    pub target_country: String,
    pub created_at: DateTime<Utc>,
}

impl Record for Candidate {
    fn table() -> &'static TableSpec {
        &CANDIDATES
    }

    fn from_row(row: StoredRow) -> Result<Self, StorageError> {
        let id = row.id;
        let mut reader = row.reader(&CANDIDATES);
        Ok(Self {
            id,
            name: reader.text()?,
            skill: reader.text()?,
            target_country: reader.text()?,
            created_at: reader.timestamp()?,
        })
    }
}

impl Searchable for Candidate {
    fn search_fields(&self) -> Vec<&str> {
        vec![
            self.name.as_str(),
            self.skill.as_str(),
            self.target_country.as_str(),
        ]
    }
}

/// Raw registration form. Every field is required.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct CandidateForm {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub skill: String,
    #[serde(default)]
    pub target_country: String,
}

impl CandidateForm {
    fn validate(&self) -> Option<[String; 3]> {
        Some([
            required(&self.name)?,
            required(&self.skill)?,
            required(&self.target_country)?,
        ])
    }
}

pub struct CandidateBook {
    store: Arc<dyn RecordStore>,
}

impl CandidateBook {
    pub fn new(store: Arc<dyn RecordStore>) -> Self {
        Self { store }
    }

    /// Store a candidate. `None` means a required field was blank and
    /// nothing was written.
    pub async fn register(&self, form: CandidateForm) -> Result<Option<Candidate>, StorageError> {
        let Some([name, skill, target_country]) = form.validate() else {
            return Ok(None);
        };

        let created_at = Utc::now();
        let id = self
            .store
            .write(
                &CANDIDATES,
                vec![
                    FieldValue::Text(name.clone()),
                    FieldValue::Text(skill.clone()),
                    FieldValue::Text(target_country.clone()),
                    FieldValue::Timestamp(created_at),
                ],
            )
            .await?;

        info!(id, %target_country, "candidate registered");
        Ok(Some(Candidate {
            id,
            name,
            skill,
            target_country,
            created_at,
        }))
    }

    pub async fn list(&self, query: Option<&str>) -> Result<Vec<Candidate>, StorageError> {
        let rows = read_records::<Candidate>(self.store.as_ref()).await?;
        Ok(filter_rows(rows, query))
    }
}
