//! Transaction submission feature
//!
//! Single-call ingestion of an in-memory batch with strict (all-or-nothing)
//! or partial (best-effort plus ledger) commit semantics.

pub mod commands;
pub mod routes;

pub use routes::transactions_routes;
