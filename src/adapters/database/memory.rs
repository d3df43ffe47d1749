//! In-memory clinical data source
//!
//! Backs the offline `render` command and the test suites. Records are kept
//! per patient; every read still honours the tenant scope.

use super::traits::ClinicalDataSource;
use crate::domain::{
    Allergy, CarePlan, Condition, DatabaseError, Immunization, LabResult, Medication, PatientId,
    PatientProfile, PatientRecord, Procedure, Result, TenantId, VitalSign,
};
use async_trait::async_trait;
use std::collections::HashMap;

/// [`ClinicalDataSource`] over a fixed set of [`PatientRecord`]s
#[derive(Debug, Default, Clone)]
pub struct InMemorySource {
    records: HashMap<PatientId, PatientRecord>,
    failing_table: Option<&'static str>,
}

impl InMemorySource {
    pub fn new() -> Self {
        Self::default()
    }

    /// Source holding a single patient
    pub fn with_record(record: PatientRecord) -> Self {
        let mut source = Self::new();
        source.insert(record);
        source
    }

    /// Adds or replaces the record for `record.profile.id`
    pub fn insert(&mut self, record: PatientRecord) {
        self.records.insert(record.profile.id.clone(), record);
    }

    /// Makes every read of `table` fail with a query error
    ///
    /// Table names match the PostgreSQL source: `patient_profiles`,
    /// `medications`, `allergies`, `conditions`, `procedures`,
    /// `immunizations`, `vital_signs`, `lab_results`, `care_plans`.
    pub fn fail_on(mut self, table: &'static str) -> Self {
        self.failing_table = Some(table);
        self
    }

    fn scoped(
        &self,
        table: &'static str,
        patient_id: &PatientId,
        tenant_id: &TenantId,
    ) -> Result<Option<&PatientRecord>> {
        if self.failing_table == Some(table) {
            return Err(DatabaseError::QueryFailed {
                table,
                message: "injected failure".to_string(),
            }
            .into());
        }

        Ok(self
            .records
            .get(patient_id)
            .filter(|r| &r.profile.tenant_id == tenant_id))
    }

    fn rows<T: Clone>(
        &self,
        table: &'static str,
        patient_id: &PatientId,
        tenant_id: &TenantId,
        select: impl Fn(&PatientRecord) -> &Vec<T>,
    ) -> Result<Vec<T>> {
        Ok(self
            .scoped(table, patient_id, tenant_id)?
            .map(|r| select(r).clone())
            .unwrap_or_default())
    }
}

#[async_trait]
impl ClinicalDataSource for InMemorySource {
    fn source_name(&self) -> &str {
        "memory"
    }

    async fn test_connection(&self) -> Result<()> {
        Ok(())
    }

    async fn patient_tenant(&self, patient_id: &PatientId) -> Result<Option<TenantId>> {
        if self.failing_table == Some("patient_profiles") {
            return Err(DatabaseError::QueryFailed {
                table: "patient_profiles",
                message: "injected failure".to_string(),
            }
            .into());
        }
        Ok(self
            .records
            .get(patient_id)
            .map(|r| r.profile.tenant_id.clone()))
    }

    async fn fetch_profile(
        &self,
        patient_id: &PatientId,
        tenant_id: &TenantId,
    ) -> Result<Option<PatientProfile>> {
        Ok(self
            .scoped("patient_profiles", patient_id, tenant_id)?
            .map(|r| r.profile.clone()))
    }

    async fn fetch_medications(
        &self,
        patient_id: &PatientId,
        tenant_id: &TenantId,
    ) -> Result<Vec<Medication>> {
        self.rows("medications", patient_id, tenant_id, |r| &r.medications)
    }

    async fn fetch_allergies(
        &self,
        patient_id: &PatientId,
        tenant_id: &TenantId,
    ) -> Result<Vec<Allergy>> {
        self.rows("allergies", patient_id, tenant_id, |r| &r.allergies)
    }

    async fn fetch_conditions(
        &self,
        patient_id: &PatientId,
        tenant_id: &TenantId,
    ) -> Result<Vec<Condition>> {
        self.rows("conditions", patient_id, tenant_id, |r| &r.conditions)
    }

    async fn fetch_procedures(
        &self,
        patient_id: &PatientId,
        tenant_id: &TenantId,
    ) -> Result<Vec<Procedure>> {
        self.rows("procedures", patient_id, tenant_id, |r| &r.procedures)
    }

    async fn fetch_immunizations(
        &self,
        patient_id: &PatientId,
        tenant_id: &TenantId,
    ) -> Result<Vec<Immunization>> {
        self.rows("immunizations", patient_id, tenant_id, |r| &r.immunizations)
    }

    async fn fetch_vitals(
        &self,
        patient_id: &PatientId,
        tenant_id: &TenantId,
    ) -> Result<Vec<VitalSign>> {
        self.rows("vital_signs", patient_id, tenant_id, |r| &r.vitals)
    }

    async fn fetch_lab_results(
        &self,
        patient_id: &PatientId,
        tenant_id: &TenantId,
    ) -> Result<Vec<LabResult>> {
        self.rows("lab_results", patient_id, tenant_id, |r| &r.lab_results)
    }

    async fn fetch_care_plans(
        &self,
        patient_id: &PatientId,
        tenant_id: &TenantId,
    ) -> Result<Vec<CarePlan>> {
        self.rows("care_plans", patient_id, tenant_id, |r| &r.care_plans)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::ExportError;

    fn record(patient: &str, tenant: &str) -> PatientRecord {
        let mut record = PatientRecord::new(PatientProfile::new(
            PatientId::new(patient).unwrap(),
            TenantId::new(tenant).unwrap(),
            "Ada",
            "Lovelace",
        ));
        record.care_plans.push(CarePlan {
            id: "cp-1".into(),
            title: "Walk daily".into(),
            description: None,
            goal: None,
            status: "active".into(),
            start_date: None,
            end_date: None,
        });
        record
    }

    #[tokio::test]
    async fn test_fetch_patient_record_joins_all_tables() {
        let source = InMemorySource::with_record(record("p-1", "t-1"));
        let fetched = source
            .fetch_patient_record(&PatientId::new("p-1").unwrap(), &TenantId::new("t-1").unwrap())
            .await
            .unwrap();
        assert_eq!(fetched.profile.first_name, "Ada");
        assert_eq!(fetched.care_plans.len(), 1);
    }

    #[tokio::test]
    async fn test_other_tenant_sees_nothing() {
        let source = InMemorySource::with_record(record("p-1", "t-1"));
        let patient = PatientId::new("p-1").unwrap();
        let other = TenantId::new("t-2").unwrap();

        assert!(source.fetch_care_plans(&patient, &other).await.unwrap().is_empty());
        let err = source.fetch_patient_record(&patient, &other).await.unwrap_err();
        assert!(matches!(err, ExportError::NotFound(_)));
    }

    #[tokio::test]
    async fn test_patient_tenant_lookup() {
        let source = InMemorySource::with_record(record("p-1", "t-1"));
        let tenant = source
            .patient_tenant(&PatientId::new("p-1").unwrap())
            .await
            .unwrap();
        assert_eq!(tenant.unwrap().as_str(), "t-1");
        assert!(source
            .patient_tenant(&PatientId::new("p-9").unwrap())
            .await
            .unwrap()
            .is_none());
    }

    #[tokio::test]
    async fn test_single_failing_fetch_fails_whole_record() {
        let source = InMemorySource::with_record(record("p-1", "t-1")).fail_on("lab_results");
        let err = source
            .fetch_patient_record(&PatientId::new("p-1").unwrap(), &TenantId::new("t-1").unwrap())
            .await
            .unwrap_err();
        assert!(matches!(err, ExportError::Database(_)));
        assert!(err.to_string().contains("lab_results"));
    }
}
