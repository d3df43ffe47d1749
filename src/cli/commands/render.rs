//! Render command implementation
//!
//! Builds a CCD from a JSON `PatientRecord` snapshot without touching the
//! database. Organization settings come from the configuration file when it
//! exists and from defaults otherwise.

use super::{exit_code_for, write_document};
use crate::adapters::database::InMemorySource;
use crate::config::{load_config, DocumentConfig};
use crate::core::export::{ExportCoordinator, ExportRequest};
use crate::domain::PatientRecord;
use clap::Args;
use std::path::{Path, PathBuf};
use std::sync::Arc;

/// Arguments for the render command
#[derive(Args, Debug)]
pub struct RenderArgs {
    /// JSON snapshot of a patient record
    #[arg(short, long)]
    pub input: PathBuf,

    /// Write the document to this file instead of stdout
    #[arg(short, long)]
    pub output: Option<PathBuf>,
}

impl RenderArgs {
    /// Execute the render command
    pub async fn execute(&self, config_path: &str) -> anyhow::Result<i32> {
        let document = if Path::new(config_path).exists() {
            match load_config(config_path) {
                Ok(c) => c.document,
                Err(e) => {
                    eprintln!("❌ {e}");
                    return Ok(2);
                }
            }
        } else {
            tracing::debug!(config_path, "No configuration file, using document defaults");
            DocumentConfig::default()
        };

        let snapshot = std::fs::read_to_string(&self.input)?;
        let record: PatientRecord = match serde_json::from_str(&snapshot) {
            Ok(r) => r,
            Err(e) => {
                eprintln!("❌ Invalid snapshot {}: {e}", self.input.display());
                return Ok(5);
            }
        };

        let request = ExportRequest {
            patient_id: record.profile.id.clone(),
            tenant_id: record.profile.tenant_id.clone(),
        };
        let coordinator =
            ExportCoordinator::new(Arc::new(InMemorySource::with_record(record)), document);

        match coordinator.export(&request).await {
            Ok(outcome) => {
                write_document(&outcome.xml, self.output.as_deref())?;
                Ok(0)
            }
            Err(e) => {
                eprintln!("❌ Render failed: {e}");
                Ok(exit_code_for(&e))
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[tokio::test]
    async fn test_render_snapshot_to_file() {
        let dir = TempDir::new().unwrap();
        let input = dir.path().join("patient.json");
        let output = dir.path().join("ccd.xml");
        std::fs::write(
            &input,
            r#"{"profile":{"id":"p-1","tenant_id":"t-1","first_name":"Ada","last_name":"Lovelace"}}"#,
        )
        .unwrap();

        let args = RenderArgs {
            input,
            output: Some(output.clone()),
        };
        let missing_config = dir.path().join("none.toml");
        let code = args
            .execute(missing_config.to_str().unwrap())
            .await
            .unwrap();

        assert_eq!(code, 0);
        let xml = std::fs::read_to_string(output).unwrap();
        assert!(xml.contains("<family>Lovelace</family>"));
    }

    #[tokio::test]
    async fn test_invalid_snapshot_is_fatal() {
        let dir = TempDir::new().unwrap();
        let input = dir.path().join("patient.json");
        std::fs::write(&input, "{}").unwrap();

        let args = RenderArgs {
            input,
            output: None,
        };
        let code = args.execute("does-not-exist.toml").await.unwrap();
        assert_eq!(code, 5);
    }
}
