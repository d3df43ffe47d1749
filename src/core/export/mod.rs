//! Export orchestration
//!
//! - [`ExportCoordinator`] - fetch plus render for one patient
//! - [`ExportSummary`] - counts, size and timing of a finished export

pub mod coordinator;
pub mod summary;

pub use coordinator::{ExportCoordinator, ExportOutcome, ExportRequest};
pub use summary::ExportSummary;
