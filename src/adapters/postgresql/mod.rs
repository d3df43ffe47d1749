//! PostgreSQL integration
//!
//! Reads the clinical tables an export needs through a pooled client.

pub mod client;
mod rows;
pub mod source;

pub use client::PostgreSQLClient;
pub use source::PostgreSQLSource;
