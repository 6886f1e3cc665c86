//! Rejection ledger audit feature

pub mod queries;
pub mod routes;

pub use routes::rejections_routes;
