//! HRDP Server Library
//!
//! HTTP server for the HR data platform: bulk and transactional ingestion
//! of hiring records with data-quality enforcement, a rejection ledger, and
//! table snapshot/restore.
//!
//! # Architecture
//!
//! Feature slices under [`features`] expose the API; the shared ingestion
//! machinery (parsing, normalization, rule chains, referential checks,
//! batch loading, the rejection ledger) lives under [`ingest`] and is
//! reused by both the bulk and transaction paths so identical bad input is
//! rejected with identical reason codes.
//!
//! ## Framework Stack
//!
//! - **Axum**: HTTP routing and extraction
//! - **SQLx**: PostgreSQL access and embedded migrations
//! - **Tower / tower-http**: tracing and CORS middleware
//! - **apache-avro**: snapshot artifact format

pub mod api;
pub mod config;
pub mod error;
pub mod features;
pub mod ingest;
pub mod middleware;

// Re-export commonly used types
pub use error::{AppError, ServerResult};
