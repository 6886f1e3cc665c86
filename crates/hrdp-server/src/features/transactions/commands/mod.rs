//! Write operations for transaction submissions

pub mod process;

pub use process::{
    ProcessTransactionCommand, ProcessTransactionError, TransactionMode, TransactionOutcome,
    API_TRANSACTION_SOURCE, MAX_TRANSACTION_ROWS,
};
