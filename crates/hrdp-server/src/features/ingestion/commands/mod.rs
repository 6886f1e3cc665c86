//! Write operations for bulk ingestion

pub mod run;

pub use run::RunIngestionCommand;
