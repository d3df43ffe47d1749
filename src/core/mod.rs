//! Core business logic
//!
//! # Modules
//!
//! - [`ccda`] - C-CDA CCD document generation
//! - [`export`] - Export orchestration
//!
//! # Export Workflow
//!
//! 1. **Authorize**: the caller's tenant (and patient, for patient keys) is checked
//! 2. **Fetch**: nine tenant-scoped reads run concurrently and are joined
//! 3. **Render**: header plus eight sections are written into one XML string
//! 4. **Report**: an [`ExportSummary`](export::ExportSummary) is logged
//!
//! # Example
//!
//! ```rust,no_run
//! use ccda_export::adapters::database::create_data_source;
//! use ccda_export::config::load_config;
//! use ccda_export::core::export::{ExportCoordinator, ExportRequest};
//! use ccda_export::domain::{PatientId, TenantId};
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let config = load_config("ccda-export.toml")?;
//! let coordinator = ExportCoordinator::new(create_data_source(&config)?, config.document.clone());
//!
//! let outcome = coordinator
//!     .export(&ExportRequest {
//!         patient_id: PatientId::new("p-123")?,
//!         tenant_id: TenantId::new("clinic-a")?,
//!     })
//!     .await?;
//!
//! println!("{} bytes", outcome.summary.bytes);
//! # Ok(())
//! # }
//! ```

pub mod ccda;
pub mod export;
