//! Read operations for the rejection ledger

pub mod list;

pub use list::{ListRejectionsError, ListRejectionsQuery, ListRejectionsResponse, RejectionRecord};
