//! HRDP Common Library
//!
//! Shared types and utilities for the HRDP workspace:
//!
//! - **Error Handling**: the crate-wide error and result types
//! - **Logging**: tracing subscriber bootstrap shared by every binary
//! - **Hashing**: deterministic row fingerprints for the rejection ledger

pub mod error;
pub mod hash;
pub mod logging;

// Re-export commonly used types
pub use error::{HrdpError, Result};
pub use hash::{stable_row_hash, RawRecord};
