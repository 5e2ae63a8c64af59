//! Storage trait and structured error types.
//!
//! The Storage trait abstracts over the relational table set so the access
//! layer can swap implementations and mock for tests. Implementations must
//! support per-table column listing and range predicates on the date column;
//! nothing else is assumed about the engine.

pub mod sqlite;

use chrono::NaiveDate;
use thiserror::Error;

pub use sqlite::SqliteStore;

/// Column name identifying the entity in every table.
pub const ENTITY_COLUMN: &str = "entity_id";

/// Column name carrying the date dimension, where present.
pub const DATE_COLUMN: &str = "date";

/// One long-format observation row: (entity, date, value).
#[derive(Debug, Clone, PartialEq)]
pub struct Observation {
    pub entity_id: String,
    pub date: NaiveDate,
    pub value: f64,
}

/// A table's name and column listing, as reported by introspection.
#[derive(Debug, Clone)]
pub struct TableSchema {
    pub name: String,
    pub columns: Vec<String>,
}

impl TableSchema {
    /// Whether the table carries a date dimension (and is therefore in
    /// scope for windowed queries).
    pub fn has_date_dimension(&self) -> bool {
        self.columns.iter().any(|c| c == DATE_COLUMN)
    }
}

/// Structured error types for storage operations.
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("sqlite error: {0}")]
    Sqlite(#[from] rusqlite::Error),

    #[error("unparseable date '{text}' in table '{table}'")]
    BadDate { table: String, text: String },
}

/// Trait for relational stores holding the historical table set.
///
/// The access layer sits above this trait; stores know nothing about
/// calendars, caching, or cutoffs.
pub trait Storage {
    /// Enumerate tables and their columns.
    fn tables(&self) -> Result<Vec<TableSchema>, StoreError>;

    /// Distinct dates present in a table, ascending and deduplicated.
    ///
    /// When `sample` is given, only rows belonging to those entities are
    /// scanned; the result then covers exactly the dates the sample traded.
    fn distinct_dates(
        &self,
        table: &str,
        sample: Option<&[String]>,
    ) -> Result<Vec<NaiveDate>, StoreError>;

    /// Fetch (entity, date, value) rows for one field column, with
    /// `start <= date <= end` inclusive. Rows whose value is NULL are not
    /// observations and must be omitted.
    fn fetch_observations(
        &self,
        table: &str,
        field: &str,
        start: NaiveDate,
        end: NaiveDate,
    ) -> Result<Vec<Observation>, StoreError>;
}
