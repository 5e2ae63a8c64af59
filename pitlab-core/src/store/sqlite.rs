//! SQLite-backed storage.
//!
//! Tables are introspected through `sqlite_master` and `PRAGMA table_info`.
//! Dates are stored as ISO-8601 text (`YYYY-MM-DD`), which sorts and range-
//! compares correctly as text; datetime-suffixed values (`YYYY-MM-DD HH:MM`)
//! are tolerated by parsing the date prefix.

use super::{Observation, StoreError, Storage, TableSchema, DATE_COLUMN, ENTITY_COLUMN};
use crate::config::StorageConfig;
use chrono::NaiveDate;
use rusqlite::{params, Connection};
use std::collections::BTreeSet;
use std::path::Path;
use std::time::Duration;

/// Storage over a SQLite database file (or an in-memory database in tests).
pub struct SqliteStore {
    conn: Connection,
}

impl SqliteStore {
    /// Open a database file.
    ///
    /// The configured busy timeout bounds how long a fetch may block on a
    /// locked database before surfacing a `StoreError`.
    pub fn open(path: impl AsRef<Path>, config: &StorageConfig) -> Result<Self, StoreError> {
        let conn = Connection::open(path)?;
        conn.busy_timeout(Duration::from_millis(config.busy_timeout_ms))?;
        Ok(Self { conn })
    }

    /// Wrap an already-open connection (used for in-memory test databases,
    /// which vanish when their connection closes).
    pub fn from_connection(conn: Connection) -> Self {
        Self { conn }
    }

    pub fn connection(&self) -> &Connection {
        &self.conn
    }

    fn distinct_dates_sql(&self, sql: &str, table: &str, entity: Option<&str>) -> Result<BTreeSet<NaiveDate>, StoreError> {
        let mut stmt = self.conn.prepare(sql)?;
        let rows: Vec<String> = match entity {
            Some(e) => stmt.query_map(params![e], |row| row.get(0))?.collect::<Result<_, _>>()?,
            None => stmt.query_map([], |row| row.get(0))?.collect::<Result<_, _>>()?,
        };
        rows.iter().map(|text| parse_date_text(text, table)).collect()
    }
}

/// Parse the `YYYY-MM-DD` prefix of a stored date value.
fn parse_date_text(text: &str, table: &str) -> Result<NaiveDate, StoreError> {
    text.get(..10)
        .and_then(|head| NaiveDate::parse_from_str(head, "%Y-%m-%d").ok())
        .ok_or_else(|| StoreError::BadDate {
            table: table.to_string(),
            text: text.to_string(),
        })
}

impl Storage for SqliteStore {
    fn tables(&self) -> Result<Vec<TableSchema>, StoreError> {
        let mut stmt = self
            .conn
            .prepare("SELECT name FROM sqlite_master WHERE type = 'table' ORDER BY name")?;
        let names: Vec<String> = stmt
            .query_map([], |row| row.get(0))?
            .collect::<Result<_, _>>()?;

        let mut tables = Vec::with_capacity(names.len());
        for name in names {
            let mut info = self.conn.prepare(&format!("PRAGMA table_info(\"{name}\")"))?;
            let columns: Vec<String> = info
                .query_map([], |row| row.get(1))?
                .collect::<Result<_, _>>()?;
            tables.push(TableSchema { name, columns });
        }
        Ok(tables)
    }

    fn distinct_dates(
        &self,
        table: &str,
        sample: Option<&[String]>,
    ) -> Result<Vec<NaiveDate>, StoreError> {
        let dates = match sample {
            // One scan per sampled entity; the union is the inferred calendar.
            Some(entities) => {
                let sql = format!(
                    "SELECT DISTINCT {DATE_COLUMN} FROM \"{table}\" WHERE {ENTITY_COLUMN} = ?1"
                );
                let mut merged = BTreeSet::new();
                for entity in entities {
                    merged.extend(self.distinct_dates_sql(&sql, table, Some(entity))?);
                }
                merged
            }
            None => {
                let sql = format!("SELECT DISTINCT {DATE_COLUMN} FROM \"{table}\"");
                self.distinct_dates_sql(&sql, table, None)?
            }
        };
        Ok(dates.into_iter().collect())
    }

    fn fetch_observations(
        &self,
        table: &str,
        field: &str,
        start: NaiveDate,
        end: NaiveDate,
    ) -> Result<Vec<Observation>, StoreError> {
        let sql = format!(
            "SELECT {ENTITY_COLUMN}, {DATE_COLUMN}, \"{field}\" FROM \"{table}\" \
             WHERE {DATE_COLUMN} BETWEEN ?1 AND ?2 AND \"{field}\" IS NOT NULL \
             ORDER BY {DATE_COLUMN}, {ENTITY_COLUMN}"
        );
        let mut stmt = self.conn.prepare(&sql)?;
        let rows: Vec<(String, String, f64)> = stmt
            .query_map(params![start.to_string(), end.to_string()], |row| {
                Ok((row.get(0)?, row.get(1)?, row.get(2)?))
            })?
            .collect::<Result<_, _>>()?;

        rows.into_iter()
            .map(|(entity_id, date_text, value)| {
                Ok(Observation {
                    entity_id,
                    date: parse_date_text(&date_text, table)?,
                    value,
                })
            })
            .collect()
    }
}
