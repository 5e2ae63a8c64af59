//! Trading calendar — precomputed distinct dates per table.
//!
//! Built once when the reader opens and read-only afterward. Tables without
//! a date column get no entry: they are out of scope for windowed queries.
//! Large tables may use a sampled discovery policy, trading exactness for
//! a bounded scan (a gap in the sample becomes a gap in the calendar).

use crate::config::{CalendarConfig, DateDiscovery};
use crate::store::{Storage, StoreError, TableSchema};
use chrono::NaiveDate;
use std::collections::BTreeMap;

/// Distinct-date index for every date-dimensioned table.
#[derive(Debug)]
pub struct TradingCalendar {
    by_table: BTreeMap<String, Vec<NaiveDate>>,
}

impl TradingCalendar {
    /// Scan storage once, applying the configured discovery policy per table.
    pub fn build<S: Storage>(
        store: &S,
        tables: &[TableSchema],
        config: &CalendarConfig,
    ) -> Result<Self, StoreError> {
        let mut by_table = BTreeMap::new();
        for table in tables.iter().filter(|t| t.has_date_dimension()) {
            let dates = match config.policy_for(&table.name) {
                DateDiscovery::FullScan => store.distinct_dates(&table.name, None)?,
                DateDiscovery::Sample(entities) => {
                    store.distinct_dates(&table.name, Some(entities.as_slice()))?
                }
            };
            by_table.insert(table.name.clone(), dates);
        }
        Ok(Self { by_table })
    }

    /// Ascending distinct dates for a table; `None` for tables without a
    /// date dimension (or unknown tables).
    pub fn dates_for(&self, table: &str) -> Option<&[NaiveDate]> {
        self.by_table.get(table).map(|d| d.as_slice())
    }

    /// Iterate (table, dates) pairs, ascending by table name.
    pub fn tables(&self) -> impl Iterator<Item = (&str, &[NaiveDate])> + '_ {
        self.by_table
            .iter()
            .map(|(name, dates)| (name.as_str(), dates.as_slice()))
    }
}
