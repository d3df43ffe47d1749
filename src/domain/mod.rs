//! Domain models and types.
//!
//! # Overview
//!
//! The domain layer provides:
//! - **Strongly-typed identifiers** ([`PatientId`], [`TenantId`])
//! - **Clinical record snapshots** ([`Medication`], [`Allergy`], [`Condition`], ...)
//! - **The per-export aggregate** ([`PatientRecord`])
//! - **Error types** ([`ExportError`], [`DatabaseError`])
//! - **Result type alias** ([`Result`])
//!
//! # Type Safety
//!
//! Identifiers use the newtype pattern so a tenant ID can't be passed where a
//! patient ID is expected:
//!
//! ```rust
//! use ccda_export::domain::{PatientId, TenantId};
//!
//! # fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let patient_id = PatientId::new("7d44b88c-4199-4bad-97dc-d78268e01398")?;
//! let tenant_id = TenantId::new("clinic-a")?;
//! # let _ = (patient_id, tenant_id);
//! # Ok(())
//! # }
//! ```

pub mod errors;
pub mod ids;
pub mod patient;
pub mod records;
pub mod result;

// Re-export commonly used types for convenience
pub use errors::{DatabaseError, ExportError};
pub use ids::{PatientId, TenantId};
pub use patient::{PatientProfile, PatientRecord, SectionCounts};
pub use records::{
    Allergy, CarePlan, Condition, Immunization, LabResult, Medication, Procedure, VitalSign,
};
pub use result::Result;
