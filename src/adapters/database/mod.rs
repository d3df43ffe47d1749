//! Clinical data access layer
//!
//! Exports read through the [`ClinicalDataSource`] trait so the coordinator
//! and HTTP layer work the same over PostgreSQL and in-memory snapshots.

pub mod factory;
pub mod memory;
pub mod traits;

pub use factory::create_data_source;
pub use memory::InMemorySource;
pub use traits::ClinicalDataSource;
