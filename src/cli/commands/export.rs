//! Export command implementation
//!
//! Reads one patient's record from PostgreSQL and writes the CCD.

use super::{exit_code_for, write_document};
use crate::adapters::database::create_data_source;
use crate::config::load_config;
use crate::core::export::{ExportCoordinator, ExportRequest};
use crate::domain::{PatientId, TenantId};
use clap::Args;
use std::path::PathBuf;

/// Arguments for the export command
#[derive(Args, Debug)]
pub struct ExportArgs {
    /// Patient to export
    #[arg(long)]
    pub patient_id: String,

    /// Tenant that owns the patient
    #[arg(long)]
    pub tenant_id: String,

    /// Write the document to this file instead of stdout
    #[arg(short, long)]
    pub output: Option<PathBuf>,
}

impl ExportArgs {
    /// Execute the export command
    pub async fn execute(&self, config_path: &str) -> anyhow::Result<i32> {
        tracing::info!("Starting export command");

        let config = match load_config(config_path) {
            Ok(c) => c,
            Err(e) => {
                eprintln!("❌ {e}");
                return Ok(2);
            }
        };

        let request = match (
            PatientId::new(self.patient_id.clone()),
            TenantId::new(self.tenant_id.clone()),
        ) {
            (Ok(patient_id), Ok(tenant_id)) => ExportRequest {
                patient_id,
                tenant_id,
            },
            (Err(e), _) | (_, Err(e)) => {
                eprintln!("❌ {e}");
                return Ok(2);
            }
        };

        let source = match create_data_source(&config) {
            Ok(s) => s,
            Err(e) => {
                eprintln!("❌ Failed to initialize data source: {e}");
                return Ok(exit_code_for(&e));
            }
        };

        if let Err(e) = source.test_connection().await {
            tracing::error!(error = %e, "Database connection test failed");
            eprintln!("❌ Database connection failed: {e}");
            return Ok(4);
        }

        let coordinator = ExportCoordinator::new(source, config.document.clone());
        let outcome = match coordinator.export(&request).await {
            Ok(o) => o,
            Err(e) => {
                eprintln!("❌ Export failed: {e}");
                return Ok(exit_code_for(&e));
            }
        };

        write_document(&outcome.xml, self.output.as_deref())?;

        if let Some(path) = &self.output {
            eprintln!(
                "✅ Wrote {} bytes ({} records) to {}",
                outcome.summary.bytes,
                outcome.summary.counts.total(),
                path.display()
            );
        }

        Ok(0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_missing_config_is_configuration_error() {
        let args = ExportArgs {
            patient_id: "p-1".into(),
            tenant_id: "t-1".into(),
            output: None,
        };
        assert_eq!(args.execute("does-not-exist.toml").await.unwrap(), 2);
    }
}
