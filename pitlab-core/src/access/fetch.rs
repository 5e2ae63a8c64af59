//! Fetch/pivot engine — materialize one field window from storage.

use crate::domain::ObservationMatrix;
use crate::store::{Storage, StoreError};
use chrono::NaiveDate;

/// Fetch [start, end] of one field column and pivot it wide.
///
/// The storage query runs through `end + 1 day` to tolerate boundary and
/// timezone rounding in stored date text; parsed dates are then clipped
/// back to the requested range, so the result is a pure function of
/// (table, field, start, end) and never contains a date past `end`.
///
/// An empty result set is a valid outcome and yields the empty matrix.
pub fn fetch_window<S: Storage>(
    store: &S,
    table: &str,
    field: &str,
    start: NaiveDate,
    end: NaiveDate,
) -> Result<ObservationMatrix, StoreError> {
    let margin = end + chrono::Duration::days(1);
    let rows = store.fetch_observations(table, field, start, margin)?;
    Ok(ObservationMatrix::from_triples(
        rows.into_iter()
            .filter(|obs| obs.date >= start && obs.date <= end)
            .map(|obs| (obs.entity_id, obs.date, obs.value)),
    ))
}
