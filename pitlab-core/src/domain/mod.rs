//! Domain types: the wide observation matrix and portfolio snapshots.

pub mod matrix;
pub mod snapshot;

pub use matrix::ObservationMatrix;
pub use snapshot::Snapshot;
