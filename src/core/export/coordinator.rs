//! Export coordinator
//!
//! Fetches one patient's record through a [`ClinicalDataSource`] and renders
//! it into a CCD. A failed fetch or render fails the whole export; no partial
//! document is ever returned.

use super::summary::ExportSummary;
use crate::adapters::database::ClinicalDataSource;
use crate::config::DocumentConfig;
use crate::core::ccda::{render_document, DocumentContext};
use crate::domain::{PatientId, PatientRecord, Result, TenantId};
use std::sync::Arc;
use std::time::Instant;

/// Patient and tenant an export is scoped to
#[derive(Debug, Clone)]
pub struct ExportRequest {
    pub patient_id: PatientId,
    pub tenant_id: TenantId,
}

/// Generated document plus its summary
#[derive(Debug, Clone)]
pub struct ExportOutcome {
    pub xml: String,
    pub summary: ExportSummary,
}

/// Orchestrates fetch and render for single-patient exports
///
/// Cheap to clone; the HTTP layer keeps one per process.
#[derive(Clone)]
pub struct ExportCoordinator {
    source: Arc<dyn ClinicalDataSource>,
    document: DocumentConfig,
}

impl ExportCoordinator {
    pub fn new(source: Arc<dyn ClinicalDataSource>, document: DocumentConfig) -> Self {
        Self { source, document }
    }

    /// The data source exports read from
    pub fn source(&self) -> &Arc<dyn ClinicalDataSource> {
        &self.source
    }

    /// Export one patient's CCD
    ///
    /// # Errors
    ///
    /// Returns [`ExportError::NotFound`](crate::domain::ExportError::NotFound)
    /// when the patient has no profile in the tenant, the first data source
    /// error when any fetch fails, or a render error.
    pub async fn export(&self, request: &ExportRequest) -> Result<ExportOutcome> {
        crate::log_export_start!(request.patient_id, request.tenant_id);
        let started = Instant::now();

        let record = self
            .source
            .fetch_patient_record(&request.patient_id, &request.tenant_id)
            .await
            .inspect_err(|e| {
                crate::log_error_with_context!(e, "Failed to fetch patient record");
            })?;

        tracing::debug!(
            source = self.source.source_name(),
            elapsed_ms = started.elapsed().as_millis() as u64,
            "Patient record fetched"
        );

        let xml = self.render(&record)?;

        let summary = ExportSummary {
            patient_id: request.patient_id.clone(),
            tenant_id: request.tenant_id.clone(),
            counts: record.section_counts(),
            bytes: xml.len(),
            duration: started.elapsed(),
        };
        summary.log_summary();

        Ok(ExportOutcome { xml, summary })
    }

    /// Render an already-fetched record with a fresh document identity
    pub fn render(&self, record: &PatientRecord) -> Result<String> {
        let ctx = DocumentContext::new(&self.document);
        render_document(record, &ctx)
    }
}
