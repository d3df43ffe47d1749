//! Per-document settings shared by the header and every section

use crate::config::DocumentConfig;
use chrono::{DateTime, Utc};
use uuid::Uuid;

/// Identity and authoring details of one generated document
#[derive(Debug, Clone)]
pub struct DocumentContext {
    /// `ClinicalDocument/id/@root`, freshly generated per export
    pub document_id: Uuid,
    /// Generation time, used for the document, author and concern timestamps
    pub effective_time: DateTime<Utc>,
    pub organization_name: String,
    /// OID root under which record identifiers are issued
    pub organization_oid: String,
    pub software_name: String,
    pub language_code: String,
    pub title: String,
}

impl DocumentContext {
    /// Builds a context for a new document with a random UUID and the current time
    pub fn new(settings: &DocumentConfig) -> Self {
        Self::with_identity(settings, Uuid::new_v4(), Utc::now())
    }

    /// Builds a context with an explicit identity, for reproducible output
    pub fn with_identity(
        settings: &DocumentConfig,
        document_id: Uuid,
        effective_time: DateTime<Utc>,
    ) -> Self {
        Self {
            document_id,
            effective_time,
            organization_name: settings.organization_name.clone(),
            organization_oid: settings.organization_oid.clone(),
            software_name: settings.software_name.clone(),
            language_code: settings.language_code.clone(),
            title: settings.title.clone(),
        }
    }
}
