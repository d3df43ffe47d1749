//! C-CDA document generation
//!
//! Builds a Continuity of Care Document (CCD, C-CDA R2.1) from a
//! [`PatientRecord`](crate::domain::PatientRecord). Generation is a single
//! pass over the record that writes straight into a `String`:
//!
//! - [`encoding`] - escaping, HL7 timestamps and code mappings
//! - [`templates`] - template OIDs
//! - [`header`] - document identity, record target, author, custodian
//! - [`sections`] - the eight clinical sections
//! - [`document`] - envelope and fixed section order

pub mod context;
pub mod document;
pub mod encoding;
pub mod header;
pub mod sections;
pub mod templates;

pub use context::DocumentContext;
pub use document::render_document;
