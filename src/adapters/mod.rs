//! External system integrations
//!
//! - [`database`] - the [`ClinicalDataSource`](database::ClinicalDataSource)
//!   trait, its factory and the in-memory implementation
//! - [`postgresql`] - PostgreSQL implementation
//!
//! # Example
//!
//! ```rust,no_run
//! use ccda_export::adapters::database::create_data_source;
//! use ccda_export::config::load_config;
//! use ccda_export::domain::{PatientId, TenantId};
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let config = load_config("ccda-export.toml")?;
//! let source = create_data_source(&config)?;
//! source.test_connection().await?;
//!
//! let record = source
//!     .fetch_patient_record(&PatientId::new("p-123")?, &TenantId::new("clinic-a")?)
//!     .await?;
//! println!("{} medications", record.medications.len());
//! # Ok(())
//! # }
//! ```

pub mod database;
pub mod postgresql;
