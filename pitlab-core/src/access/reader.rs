//! DataReader — the `get(field, n)` orchestration.
//!
//! Validation → window resolution → cache → fetch. Every call is a
//! deterministic function of (field, n, cutoff, cache contents). `get`
//! takes `&mut self`: one in-flight call per reader instance, enforced by
//! the borrow checker; wrap the reader in a mutex for cross-thread use.

use super::cache::FrameCache;
use super::calendar::TradingCalendar;
use super::catalog::{FieldCatalog, FieldLookup};
use super::fetch::fetch_window;
use super::window::{resolve_window, ResolvedWindow};
use crate::config::ReaderConfig;
use crate::domain::ObservationMatrix;
use crate::store::{Storage, StoreError};
use chrono::NaiveDate;
use thiserror::Error;

/// Structured error types for reader operations.
///
/// Conditions that still produce a usable (possibly empty) matrix are not
/// errors; they surface as [`WindowStatus`] on an `Ok` result.
#[derive(Debug, Error)]
pub enum DataError {
    #[error("lookback count must be positive (got {0})")]
    InvalidLookback(usize),

    #[error("field '{field}' exists in several tables ({tables:?}); qualify as 'table.{field}'")]
    AmbiguousField { field: String, tables: Vec<String> },

    #[error("storage error: {0}")]
    Storage(#[from] StoreError),
}

/// The caller-owned "as of" context: the cutoff date beyond which no data
/// may be observed. Constructing one per simulated point in time keeps
/// backtests free of hidden global state.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AsOf {
    cutoff: NaiveDate,
}

impl AsOf {
    /// Cut off at the real current date.
    pub fn today() -> Self {
        Self {
            cutoff: chrono::Local::now().date_naive(),
        }
    }

    /// Cut off at an arbitrary (usually past) date.
    pub fn at(cutoff: NaiveDate) -> Self {
        Self { cutoff }
    }

    pub fn cutoff(&self) -> NaiveDate {
        self.cutoff
    }
}

/// Why a window came back empty.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EmptyReason {
    /// The field is not registered in the catalog; storage was not queried.
    UnknownField,
    /// The field's table has no observation date at or before the cutoff.
    NoHistory,
}

/// How completely a window request was satisfied.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WindowStatus {
    /// Exactly the requested number of observation dates.
    Complete,
    /// History ran short: fewer dates than requested, best available
    /// window returned. A warning condition, not an error.
    Partial { requested: usize, available: usize },
    Empty(EmptyReason),
}

/// A materialized lookback window.
#[derive(Debug, Clone, PartialEq)]
pub struct FieldWindow {
    pub matrix: ObservationMatrix,
    pub status: WindowStatus,
}

impl FieldWindow {
    fn empty(reason: EmptyReason) -> Self {
        Self {
            matrix: ObservationMatrix::empty(),
            status: WindowStatus::Empty(reason),
        }
    }
}

/// Point-in-time reader over a relational table set.
pub struct DataReader<S: Storage> {
    store: S,
    catalog: FieldCatalog,
    calendar: TradingCalendar,
    cache: FrameCache,
}

impl<S: Storage> DataReader<S> {
    /// Introspect the store and precompute the catalog and calendar.
    pub fn open(store: S, config: &ReaderConfig) -> Result<Self, DataError> {
        let tables = store.tables()?;
        let catalog = FieldCatalog::from_tables(&tables);
        let calendar = TradingCalendar::build(&store, &tables, &config.calendar)?;
        Ok(Self {
            store,
            catalog,
            calendar,
            cache: FrameCache::new(config.cache.enabled),
        })
    }

    /// The last `n` observation dates of `field` at or before the cutoff,
    /// as a wide dates × entities matrix.
    pub fn get(&mut self, field: &str, n: usize, asof: &AsOf) -> Result<FieldWindow, DataError> {
        if n == 0 {
            return Err(DataError::InvalidLookback(n));
        }

        let (table, column) = match self.catalog.resolve(field) {
            FieldLookup::Found(field_ref) => {
                (field_ref.table.to_string(), field_ref.column.to_string())
            }
            FieldLookup::Unknown => {
                eprintln!("pitlab: unknown field '{field}'");
                return Ok(FieldWindow::empty(EmptyReason::UnknownField));
            }
            FieldLookup::Ambiguous(tables) => {
                return Err(DataError::AmbiguousField {
                    field: field.to_string(),
                    tables: tables.to_vec(),
                })
            }
        };

        // Fields in date-less tables have no windowed history.
        let Some(dates) = self.calendar.dates_for(&table) else {
            return Ok(FieldWindow::empty(EmptyReason::NoHistory));
        };

        let (start, end, len) = match resolve_window(dates, n, asof.cutoff()) {
            ResolvedWindow::Empty => return Ok(FieldWindow::empty(EmptyReason::NoHistory)),
            ResolvedWindow::Span { start, end, len } => (start, end, len),
        };
        let status = if len < n {
            WindowStatus::Partial {
                requested: n,
                available: len,
            }
        } else {
            WindowStatus::Complete
        };

        if let Some(matrix) = self.cache.try_get(field, start, end) {
            return Ok(FieldWindow { matrix, status });
        }

        let matrix = fetch_window(&self.store, &table, &column, start, end)?;
        self.cache.put(field, matrix.clone(), start, end);
        Ok(FieldWindow { matrix, status })
    }

    pub fn catalog(&self) -> &FieldCatalog {
        &self.catalog
    }

    pub fn calendar(&self) -> &TradingCalendar {
        &self.calendar
    }

    pub fn cache(&self) -> &FrameCache {
        &self.cache
    }

    pub fn store(&self) -> &S {
        &self.store
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::SqliteStore;
    use rusqlite::Connection;

    fn d(s: &str) -> NaiveDate {
        NaiveDate::parse_from_str(s, "%Y-%m-%d").unwrap()
    }

    fn reader(cache_enabled: bool) -> DataReader<SqliteStore> {
        let conn = Connection::open_in_memory().unwrap();
        conn.execute_batch(
            r#"
            CREATE TABLE price (entity_id TEXT, date TEXT, close REAL);
            INSERT INTO price VALUES ('2330', '2018-02-26', 250.0);
            INSERT INTO price VALUES ('2330', '2018-02-27', 252.0);
            INSERT INTO price VALUES ('2330', '2018-02-28', 253.0);
            INSERT INTO price VALUES ('2330', '2018-03-01', 255.0);
            INSERT INTO price VALUES ('0050', '2018-02-28', 80.0);
            INSERT INTO price VALUES ('0050', '2018-03-01', 81.0);
            "#,
        )
        .unwrap();
        let toml = if cache_enabled { "[cache]\nenabled = true\n" } else { "" };
        let config = ReaderConfig::from_toml(toml).unwrap();
        DataReader::open(SqliteStore::from_connection(conn), &config).unwrap()
    }

    #[test]
    fn get_returns_last_n_rows_ending_at_cutoff() {
        let mut r = reader(false);
        let w = r.get("close", 2, &AsOf::at(d("2018-03-01"))).unwrap();
        assert_eq!(w.status, WindowStatus::Complete);
        assert_eq!(w.matrix.height(), 2);
        assert_eq!(w.matrix.dates(), &[d("2018-02-28"), d("2018-03-01")]);
        assert_eq!(w.matrix.value(d("2018-03-01"), "0050"), Some(81.0));
    }

    #[test]
    fn zero_lookback_is_rejected_upfront() {
        let mut r = reader(false);
        assert!(matches!(
            r.get("close", 0, &AsOf::at(d("2018-03-01"))),
            Err(DataError::InvalidLookback(0))
        ));
    }

    #[test]
    fn unknown_field_is_empty_with_signal() {
        let mut r = reader(false);
        let w = r.get("nonexistent_field", 3, &AsOf::at(d("2018-03-01"))).unwrap();
        assert!(w.matrix.is_empty());
        assert_eq!(w.status, WindowStatus::Empty(EmptyReason::UnknownField));
    }

    #[test]
    fn cutoff_before_history_is_empty_no_history() {
        let mut r = reader(false);
        let w = r.get("close", 3, &AsOf::at(d("2017-12-31"))).unwrap();
        assert_eq!(w.status, WindowStatus::Empty(EmptyReason::NoHistory));
        assert!(w.matrix.is_empty());
    }

    #[test]
    fn short_history_is_partial_not_error() {
        let mut r = reader(false);
        let w = r.get("close", 10, &AsOf::at(d("2018-03-01"))).unwrap();
        assert_eq!(
            w.status,
            WindowStatus::Partial {
                requested: 10,
                available: 4
            }
        );
        assert_eq!(w.matrix.height(), 4);
    }

    #[test]
    fn cache_hit_equals_fresh_fetch() {
        let mut cached = reader(true);
        // Prime with a wide window, then ask for a contained narrower one.
        cached.get("close", 4, &AsOf::at(d("2018-03-01"))).unwrap();
        assert_eq!(cached.cache().len(), 1);
        let hit = cached.get("close", 2, &AsOf::at(d("2018-03-01"))).unwrap();

        let mut fresh = reader(false);
        let miss = fresh.get("close", 2, &AsOf::at(d("2018-03-01"))).unwrap();

        assert_eq!(hit, miss);
    }

    #[test]
    fn disabled_cache_stores_nothing() {
        let mut r = reader(false);
        r.get("close", 4, &AsOf::at(d("2018-03-01"))).unwrap();
        assert!(r.cache().is_empty());
    }

    #[test]
    fn earlier_cutoff_can_hit_later_cutoffs_entry() {
        let mut r = reader(true);
        r.get("close", 4, &AsOf::at(d("2018-03-01"))).unwrap();

        // As of 2018-02-28, the last 2 dates are 02-27 and 02-28 — contained
        // in the cached 02-26..03-01 coverage, so this is a hit; and the
        // answer must not see 03-01 even though the cache holds it.
        let w = r.get("close", 2, &AsOf::at(d("2018-02-28"))).unwrap();
        assert_eq!(w.matrix.dates(), &[d("2018-02-27"), d("2018-02-28")]);
        assert_eq!(w.matrix.last_date(), Some(d("2018-02-28")));
    }
}
