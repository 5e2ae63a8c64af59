//! PitLab Core — point-in-time access to wide historical time-series.
//!
//! The crate is organized around one flow: `DataReader::get(field, n, asof)`
//! resolves a lookback window over a precomputed trading calendar, checks an
//! in-process frame cache for containment, and on a miss fetches long rows
//! from storage and pivots them into a wide dates × entities matrix.
//!
//! - Domain types (`ObservationMatrix`, portfolio `Snapshot`)
//! - Storage seam (`Storage` trait + `SqliteStore`)
//! - Access layer (field catalog, trading calendar, window resolver,
//!   frame cache, fetch/pivot engine, `DataReader`)
//! - Equity ledger (append-only valuation log)
//! - Deterministic synthetic seeding for demos and tests

pub mod access;
pub mod config;
pub mod domain;
pub mod ledger;
pub mod store;
pub mod synthetic;

pub use access::{AsOf, DataError, DataReader, EmptyReason, FieldWindow, WindowStatus};
pub use config::ReaderConfig;
pub use domain::{ObservationMatrix, Snapshot};
pub use ledger::EquityLedger;
pub use store::SqliteStore;
