//! Equity ledger — append-only record of (date, snapshot, computed value).
//!
//! Persisted as a single JSON file. Writes are atomic: the whole log is
//! serialized to a `.tmp` sibling and renamed into place, so a crash can
//! never leave a half-written ledger behind.

use crate::domain::Snapshot;
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum LedgerError {
    #[error("an entry for {0} already exists")]
    DuplicateDate(NaiveDate),

    #[error("no entry found for {0}")]
    DateNotFound(NaiveDate),

    #[error("ledger I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("ledger serialization error: {0}")]
    Serde(#[from] serde_json::Error),
}

/// One recorded valuation.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LedgerEntry {
    pub date: NaiveDate,
    pub positions: BTreeMap<String, f64>,
    pub cash: f64,
    pub equity: f64,
}

/// The append-only equity log.
#[derive(Debug)]
pub struct EquityLedger {
    path: PathBuf,
    entries: Vec<LedgerEntry>,
}

impl EquityLedger {
    /// Load the ledger at `path`; a missing file is an empty ledger.
    pub fn open(path: impl Into<PathBuf>) -> Result<Self, LedgerError> {
        let path = path.into();
        let entries = match fs::read_to_string(&path) {
            Ok(content) => serde_json::from_str(&content)?,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Vec::new(),
            Err(e) => return Err(e.into()),
        };
        Ok(Self { path, entries })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Entries in insertion order.
    pub fn entries(&self) -> &[LedgerEntry] {
        &self.entries
    }

    /// Record a valuation. A date already present anywhere in the log is
    /// rejected.
    pub fn add(
        &mut self,
        date: NaiveDate,
        snapshot: &Snapshot,
        equity: f64,
    ) -> Result<(), LedgerError> {
        if self.entries.iter().any(|e| e.date == date) {
            return Err(LedgerError::DuplicateDate(date));
        }
        self.entries.push(LedgerEntry {
            date,
            positions: snapshot.positions.clone(),
            cash: snapshot.cash,
            equity,
        });
        self.save()
    }

    /// Delete the entry recorded for `date`.
    pub fn remove(&mut self, date: NaiveDate) -> Result<(), LedgerError> {
        let index = self
            .entries
            .iter()
            .position(|e| e.date == date)
            .ok_or(LedgerError::DateNotFound(date))?;
        self.entries.remove(index);
        self.save()
    }

    fn save(&self) -> Result<(), LedgerError> {
        let json = serde_json::to_string_pretty(&self.entries)?;
        let tmp = self.path.with_extension("json.tmp");
        fs::write(&tmp, json)?;
        fs::rename(&tmp, &self.path).map_err(|e| {
            let _ = fs::remove_file(&tmp);
            e
        })?;
        Ok(())
    }
}
