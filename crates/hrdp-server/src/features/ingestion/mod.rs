//! Bulk ingestion feature
//!
//! HTTP trigger for the file-based ingestion pipeline in [`crate::ingest`].

pub mod commands;
pub mod routes;

pub use routes::ingestion_routes;
