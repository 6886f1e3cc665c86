//! Read operations for snapshots

pub mod list;

pub use list::SnapshotSummary;
