//! ObservationMatrix — the wide dates × entities observation table.
//!
//! Long (entity, date, value) rows pivot into a rectangular matrix: one row
//! per distinct date (ascending), one column per entity, and an explicit
//! absent cell for every (date, entity) combination without an observation.

use chrono::NaiveDate;
use serde::Serialize;
use std::collections::{BTreeMap, BTreeSet, HashMap};

/// Wide observation matrix for a single field.
///
/// Invariants: `dates` is strictly increasing with no duplicates; every row
/// of `values` has exactly `entities.len()` cells; the column set is the
/// entities with at least one observation in the covered range.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ObservationMatrix {
    dates: Vec<NaiveDate>,
    entities: Vec<String>,
    values: Vec<Vec<Option<f64>>>,
}

impl ObservationMatrix {
    /// The zero-row, zero-column matrix.
    pub fn empty() -> Self {
        Self {
            dates: Vec::new(),
            entities: Vec::new(),
            values: Vec::new(),
        }
    }

    /// Pivot long (entity, date, value) triples into a wide matrix.
    ///
    /// Dates and entities are deduplicated and sorted ascending; a duplicate
    /// (entity, date) pair keeps the last value seen. Combinations without
    /// an observation become explicit absent cells.
    pub fn from_triples<I>(triples: I) -> Self
    where
        I: IntoIterator<Item = (String, NaiveDate, f64)>,
    {
        let mut cells: BTreeMap<(NaiveDate, String), f64> = BTreeMap::new();
        let mut date_set = BTreeSet::new();
        let mut entity_set = BTreeSet::new();

        for (entity, date, value) in triples {
            date_set.insert(date);
            entity_set.insert(entity.clone());
            cells.insert((date, entity), value);
        }

        let dates: Vec<NaiveDate> = date_set.into_iter().collect();
        let entities: Vec<String> = entity_set.into_iter().collect();

        let values = dates
            .iter()
            .map(|date| {
                entities
                    .iter()
                    .map(|entity| cells.get(&(*date, entity.clone())).copied())
                    .collect()
            })
            .collect();

        Self {
            dates,
            entities,
            values,
        }
    }

    /// Number of date rows.
    pub fn height(&self) -> usize {
        self.dates.len()
    }

    /// Number of entity columns.
    pub fn width(&self) -> usize {
        self.entities.len()
    }

    pub fn is_empty(&self) -> bool {
        self.dates.is_empty()
    }

    /// The ascending date index.
    pub fn dates(&self) -> &[NaiveDate] {
        &self.dates
    }

    /// The entity columns, in ascending order.
    pub fn entities(&self) -> &[String] {
        &self.entities
    }

    pub fn first_date(&self) -> Option<NaiveDate> {
        self.dates.first().copied()
    }

    pub fn last_date(&self) -> Option<NaiveDate> {
        self.dates.last().copied()
    }

    /// Single-cell lookup. Absent cells and unknown coordinates are both `None`.
    pub fn value(&self, date: NaiveDate, entity: &str) -> Option<f64> {
        let row = self.dates.binary_search(&date).ok()?;
        let col = self
            .entities
            .binary_search_by(|e| e.as_str().cmp(entity))
            .ok()?;
        self.values[row][col]
    }

    /// One date's observations as an entity → value map.
    ///
    /// Returns `None` when the date is not in the index; entities with an
    /// absent cell on that date are omitted from the map.
    pub fn date_row(&self, date: NaiveDate) -> Option<HashMap<String, f64>> {
        let row = self.dates.binary_search(&date).ok()?;
        Some(
            self.entities
                .iter()
                .zip(&self.values[row])
                .filter_map(|(entity, cell)| cell.map(|v| (entity.clone(), v)))
                .collect(),
        )
    }

    /// Restrict to rows with `start <= date <= end`.
    ///
    /// Entity columns with no observation inside the restricted range are
    /// dropped, so the result is exactly what pivoting only the rows in
    /// range would have produced.
    pub fn slice(&self, start: NaiveDate, end: NaiveDate) -> Self {
        let lo = self.dates.partition_point(|d| *d < start);
        let hi = self.dates.partition_point(|d| *d <= end);
        if lo >= hi {
            return Self::empty();
        }

        let keep: Vec<usize> = (0..self.entities.len())
            .filter(|&col| self.values[lo..hi].iter().any(|row| row[col].is_some()))
            .collect();

        let entities = keep.iter().map(|&col| self.entities[col].clone()).collect();
        let values = self.values[lo..hi]
            .iter()
            .map(|row| keep.iter().map(|&col| row[col]).collect())
            .collect();

        Self {
            dates: self.dates[lo..hi].to_vec(),
            entities,
            values,
        }
    }

    /// Iterate rows as (date, cells) pairs.
    pub fn rows(&self) -> impl Iterator<Item = (NaiveDate, &[Option<f64>])> + '_ {
        self.dates
            .iter()
            .copied()
            .zip(self.values.iter().map(|row| row.as_slice()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn d(s: &str) -> NaiveDate {
        NaiveDate::parse_from_str(s, "%Y-%m-%d").unwrap()
    }

    fn sample() -> ObservationMatrix {
        ObservationMatrix::from_triples(vec![
            ("2330".to_string(), d("2018-02-26"), 250.0),
            ("2330".to_string(), d("2018-02-27"), 252.0),
            ("2330".to_string(), d("2018-03-01"), 255.0),
            ("0050".to_string(), d("2018-02-27"), 80.0),
            ("0050".to_string(), d("2018-03-01"), 81.0),
        ])
    }

    #[test]
    fn pivot_builds_sorted_rectangular_matrix() {
        let m = sample();
        assert_eq!(m.height(), 3);
        assert_eq!(m.width(), 2);
        assert_eq!(m.dates(), &[d("2018-02-26"), d("2018-02-27"), d("2018-03-01")]);
        assert_eq!(m.entities(), &["0050".to_string(), "2330".to_string()]);

        // 0050 was not observed on the first date: explicit absent cell.
        assert_eq!(m.value(d("2018-02-26"), "0050"), None);
        assert_eq!(m.value(d("2018-02-26"), "2330"), Some(250.0));
        assert_eq!(m.value(d("2018-03-01"), "0050"), Some(81.0));
    }

    #[test]
    fn pivot_of_nothing_is_empty() {
        let m = ObservationMatrix::from_triples(Vec::new());
        assert!(m.is_empty());
        assert_eq!(m.first_date(), None);
        assert_eq!(m.last_date(), None);
    }

    #[test]
    fn slice_restricts_rows_inclusive() {
        let m = sample();
        let s = m.slice(d("2018-02-27"), d("2018-03-01"));
        assert_eq!(s.dates(), &[d("2018-02-27"), d("2018-03-01")]);
        assert_eq!(s.value(d("2018-02-27"), "0050"), Some(80.0));
    }

    #[test]
    fn slice_drops_columns_with_no_observation_in_range() {
        let m = sample();
        // Only 2330 has an observation on 2018-02-26.
        let s = m.slice(d("2018-02-26"), d("2018-02-26"));
        assert_eq!(s.entities(), &["2330".to_string()]);
        assert_eq!(s.height(), 1);
    }

    #[test]
    fn slice_equals_direct_pivot_of_subrange() {
        let m = sample();
        let s = m.slice(d("2018-02-26"), d("2018-02-27"));
        let direct = ObservationMatrix::from_triples(vec![
            ("2330".to_string(), d("2018-02-26"), 250.0),
            ("2330".to_string(), d("2018-02-27"), 252.0),
            ("0050".to_string(), d("2018-02-27"), 80.0),
        ]);
        assert_eq!(s, direct);
    }

    #[test]
    fn slice_outside_range_is_empty() {
        let m = sample();
        assert!(m.slice(d("2018-03-02"), d("2018-03-09")).is_empty());
        assert!(m.slice(d("2018-01-01"), d("2018-01-31")).is_empty());
    }

    #[test]
    fn date_row_omits_absent_cells() {
        let m = sample();
        let row = m.date_row(d("2018-02-26")).unwrap();
        assert_eq!(row.len(), 1);
        assert_eq!(row["2330"], 250.0);
        assert!(m.date_row(d("2018-02-28")).is_none());
    }

    #[test]
    fn duplicate_triple_keeps_last_value() {
        let m = ObservationMatrix::from_triples(vec![
            ("2330".to_string(), d("2018-02-26"), 250.0),
            ("2330".to_string(), d("2018-02-26"), 251.0),
        ]);
        assert_eq!(m.value(d("2018-02-26"), "2330"), Some(251.0));
    }
}
