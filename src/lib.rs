// ccda-export - C-CDA clinical document exporter
// Copyright (c) 2025 ccda-export Contributors
// Licensed under the MIT License

//! # ccda-export - C-CDA clinical document exporter
//!
//! Builds HL7 C-CDA R2.1 Continuity of Care Documents (CCD) from a tenant's
//! relational clinical data.
//!
//! ## Overview
//!
//! This library provides:
//! - **Fetching** one patient's profile and eight clinical tables concurrently
//! - **Rendering** the CDA header and eight CCD sections into one XML string
//! - **Serving** the export over an authenticated HTTP endpoint
//!
//! ## Architecture
//!
//! - [`cli`] - Command-line interface and argument parsing
//! - [`core`] - Document generation and export orchestration
//! - [`adapters`] - Clinical data sources (PostgreSQL, in-memory)
//! - [`server`] - HTTP boundary (axum)
//! - [`domain`] - Records, identifiers and errors
//! - [`config`] - Configuration management
//! - [`logging`] - Structured logging
//!
//! ## Quick Start
//!
//! ```rust
//! use ccda_export::config::DocumentConfig;
//! use ccda_export::core::ccda::{render_document, DocumentContext};
//! use ccda_export::domain::{PatientId, PatientProfile, PatientRecord, TenantId};
//!
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let profile = PatientProfile::new(
//!     PatientId::new("p-123")?,
//!     TenantId::new("clinic-a")?,
//!     "Ada",
//!     "Lovelace",
//! );
//! let record = PatientRecord::new(profile);
//!
//! let ctx = DocumentContext::new(&DocumentConfig::default());
//! let xml = render_document(&record, &ctx)?;
//!
//! assert!(xml.contains("No known allergies"));
//! # Ok(())
//! # }
//! ```
//!
//! ## Error Handling
//!
//! All fallible operations return [`domain::Result`], whose error type is
//! [`domain::ExportError`]. Driver errors are converted at the adapter
//! boundary.
//!
//! ## Logging
//!
//! Logging uses `tracing`. Identifiers, counts and timings are logged;
//! clinical values and demographics are not.

pub mod adapters;
pub mod cli;
pub mod config;
pub mod core;
pub mod domain;
pub mod logging;
pub mod server;
