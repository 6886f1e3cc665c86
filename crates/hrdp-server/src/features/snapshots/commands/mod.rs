//! Write operations for snapshots

pub mod export;
pub mod restore;

pub use restore::{RestoreMode, RestoreOutcome, RestoreSnapshotCommand};
