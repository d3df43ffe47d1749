//! Clinical data source abstraction
//!
//! Every read performed by an export goes through [`ClinicalDataSource`].
//! Each method is scoped to one patient inside one tenant; implementations
//! must never return rows belonging to another tenant.

use crate::domain::{
    Allergy, CarePlan, Condition, ExportError, Immunization, LabResult, Medication, PatientId,
    PatientProfile, PatientRecord, Procedure, Result, TenantId, VitalSign,
};
use async_trait::async_trait;

/// Read access to a tenant's clinical tables
#[async_trait]
pub trait ClinicalDataSource: Send + Sync {
    /// Short name used in logs ("postgresql", "memory")
    fn source_name(&self) -> &str;

    /// Test the connection to the backing store
    ///
    /// # Errors
    ///
    /// Returns an error if the store cannot be reached.
    async fn test_connection(&self) -> Result<()>;

    /// Tenant that owns the patient, or `None` if no such patient exists
    async fn patient_tenant(&self, patient_id: &PatientId) -> Result<Option<TenantId>>;

    async fn fetch_profile(
        &self,
        patient_id: &PatientId,
        tenant_id: &TenantId,
    ) -> Result<Option<PatientProfile>>;

    async fn fetch_medications(
        &self,
        patient_id: &PatientId,
        tenant_id: &TenantId,
    ) -> Result<Vec<Medication>>;

    async fn fetch_allergies(
        &self,
        patient_id: &PatientId,
        tenant_id: &TenantId,
    ) -> Result<Vec<Allergy>>;

    async fn fetch_conditions(
        &self,
        patient_id: &PatientId,
        tenant_id: &TenantId,
    ) -> Result<Vec<Condition>>;

    async fn fetch_procedures(
        &self,
        patient_id: &PatientId,
        tenant_id: &TenantId,
    ) -> Result<Vec<Procedure>>;

    async fn fetch_immunizations(
        &self,
        patient_id: &PatientId,
        tenant_id: &TenantId,
    ) -> Result<Vec<Immunization>>;

    async fn fetch_vitals(
        &self,
        patient_id: &PatientId,
        tenant_id: &TenantId,
    ) -> Result<Vec<VitalSign>>;

    async fn fetch_lab_results(
        &self,
        patient_id: &PatientId,
        tenant_id: &TenantId,
    ) -> Result<Vec<LabResult>>;

    async fn fetch_care_plans(
        &self,
        patient_id: &PatientId,
        tenant_id: &TenantId,
    ) -> Result<Vec<CarePlan>>;

    /// Fetch everything an export needs
    ///
    /// The nine reads run concurrently and are joined before returning. The
    /// first failure fails the whole fetch; no partial record is produced.
    ///
    /// # Errors
    ///
    /// Returns [`ExportError::NotFound`] if the patient has no profile in the
    /// tenant, or the first error raised by any individual fetch.
    async fn fetch_patient_record(
        &self,
        patient_id: &PatientId,
        tenant_id: &TenantId,
    ) -> Result<PatientRecord> {
        let (
            profile,
            medications,
            allergies,
            conditions,
            procedures,
            immunizations,
            vitals,
            lab_results,
            care_plans,
        ) = tokio::try_join!(
            self.fetch_profile(patient_id, tenant_id),
            self.fetch_medications(patient_id, tenant_id),
            self.fetch_allergies(patient_id, tenant_id),
            self.fetch_conditions(patient_id, tenant_id),
            self.fetch_procedures(patient_id, tenant_id),
            self.fetch_immunizations(patient_id, tenant_id),
            self.fetch_vitals(patient_id, tenant_id),
            self.fetch_lab_results(patient_id, tenant_id),
            self.fetch_care_plans(patient_id, tenant_id),
        )?;

        let profile = profile.ok_or_else(|| {
            ExportError::NotFound(format!(
                "Patient {patient_id} not found in tenant {tenant_id}"
            ))
        })?;

        Ok(PatientRecord {
            profile,
            medications,
            allergies,
            conditions,
            procedures,
            immunizations,
            vitals,
            lab_results,
            care_plans,
        })
    }
}
