//! PostgreSQL implementation of [`ClinicalDataSource`]
//!
//! Expected tables, each carrying `patient_id` and `tenant_id` columns:
//! `patient_profiles` (keyed by `id`), `medications`, `allergies`,
//! `conditions`, `procedures`, `immunizations`, `vital_signs`,
//! `lab_results`, `care_plans`. Every query filters on both the patient and
//! the tenant.

use super::client::PostgreSQLClient;
use super::rows;
use crate::adapters::database::traits::ClinicalDataSource;
use crate::domain::{
    Allergy, CarePlan, Condition, DatabaseError, Immunization, LabResult, Medication, PatientId,
    PatientProfile, Procedure, Result, TenantId, VitalSign,
};
use async_trait::async_trait;
use std::sync::Arc;
use tokio_postgres::Row;

const TENANT_SQL: &str = "SELECT tenant_id::text AS tenant_id FROM patient_profiles WHERE id::text = $1";

const PROFILE_SQL: &str = "\
SELECT id::text AS id, tenant_id::text AS tenant_id, mrn::text AS mrn,
       first_name::text AS first_name, last_name::text AS last_name,
       date_of_birth::date AS date_of_birth, gender::text AS gender,
       address_line::text AS address_line, city::text AS city, state::text AS state,
       postal_code::text AS postal_code, country::text AS country,
       phone::text AS phone, email::text AS email
FROM patient_profiles
WHERE id::text = $1 AND tenant_id::text = $2";

const MEDICATIONS_SQL: &str = "\
SELECT id::text AS id, name::text AS name, code::text AS code, code_system::text AS code_system,
       dosage::text AS dosage, frequency::text AS frequency, route::text AS route,
       status::text AS status, start_date::date AS start_date, end_date::date AS end_date
FROM medications
WHERE patient_id::text = $1 AND tenant_id::text = $2
ORDER BY start_date DESC NULLS LAST, id";

const ALLERGIES_SQL: &str = "\
SELECT id::text AS id, allergen::text AS allergen, allergen_type::text AS allergen_type,
       reaction::text AS reaction, severity::text AS severity, status::text AS status,
       onset_date::date AS onset_date
FROM allergies
WHERE patient_id::text = $1 AND tenant_id::text = $2
ORDER BY onset_date DESC NULLS LAST, id";

const CONDITIONS_SQL: &str = "\
SELECT id::text AS id, name::text AS name, code::text AS code, code_system::text AS code_system,
       status::text AS status, onset_date::date AS onset_date, resolved_date::date AS resolved_date
FROM conditions
WHERE patient_id::text = $1 AND tenant_id::text = $2
ORDER BY onset_date DESC NULLS LAST, id";

const PROCEDURES_SQL: &str = "\
SELECT id::text AS id, name::text AS name, code::text AS code, code_system::text AS code_system,
       status::text AS status, performed_at::timestamptz AS performed_at
FROM procedures
WHERE patient_id::text = $1 AND tenant_id::text = $2
ORDER BY performed_at DESC NULLS LAST, id";

const IMMUNIZATIONS_SQL: &str = "\
SELECT id::text AS id, vaccine_name::text AS vaccine_name, cvx_code::text AS cvx_code,
       status::text AS status, administered_at::timestamptz AS administered_at,
       lot_number::text AS lot_number, dose_number::int4 AS dose_number
FROM immunizations
WHERE patient_id::text = $1 AND tenant_id::text = $2
ORDER BY administered_at DESC NULLS LAST, id";

const VITALS_SQL: &str = "\
SELECT id::text AS id, kind::text AS kind, loinc_code::text AS loinc_code,
       value::text AS value, unit::text AS unit, measured_at::timestamptz AS measured_at
FROM vital_signs
WHERE patient_id::text = $1 AND tenant_id::text = $2
ORDER BY measured_at DESC NULLS LAST, id";

const LAB_RESULTS_SQL: &str = "\
SELECT id::text AS id, test_name::text AS test_name, loinc_code::text AS loinc_code,
       value::text AS value, unit::text AS unit, reference_range::text AS reference_range,
       interpretation::text AS interpretation, status::text AS status,
       collected_at::timestamptz AS collected_at
FROM lab_results
WHERE patient_id::text = $1 AND tenant_id::text = $2
ORDER BY collected_at DESC NULLS LAST, id";

const CARE_PLANS_SQL: &str = "\
SELECT id::text AS id, title::text AS title, description::text AS description,
       goal::text AS goal, status::text AS status,
       start_date::date AS start_date, end_date::date AS end_date
FROM care_plans
WHERE patient_id::text = $1 AND tenant_id::text = $2
ORDER BY start_date DESC NULLS LAST, id";

/// Clinical reads over a PostgreSQL pool
pub struct PostgreSQLSource {
    client: Arc<PostgreSQLClient>,
}

impl PostgreSQLSource {
    pub fn new(client: PostgreSQLClient) -> Self {
        Self {
            client: Arc::new(client),
        }
    }

    pub fn client(&self) -> &Arc<PostgreSQLClient> {
        &self.client
    }

    async fn scoped<T>(
        &self,
        table: &'static str,
        sql: &str,
        patient_id: &PatientId,
        tenant_id: &TenantId,
        map: fn(&Row) -> Result<T>,
    ) -> Result<Vec<T>> {
        let rows = self
            .client
            .query(table, sql, &[&patient_id.as_str(), &tenant_id.as_str()])
            .await?;

        tracing::debug!(table, rows = rows.len(), "Fetched clinical rows");
        rows.iter().map(map).collect()
    }
}

#[async_trait]
impl ClinicalDataSource for PostgreSQLSource {
    fn source_name(&self) -> &str {
        "postgresql"
    }

    async fn test_connection(&self) -> Result<()> {
        self.client.test_connection().await
    }

    async fn patient_tenant(&self, patient_id: &PatientId) -> Result<Option<TenantId>> {
        let rows = self
            .client
            .query("patient_profiles", TENANT_SQL, &[&patient_id.as_str()])
            .await?;

        match rows.first() {
            None => Ok(None),
            Some(row) => {
                let tenant: String = rows::column(row, "patient_profiles", "tenant_id")?;
                TenantId::new(tenant).map(Some).map_err(|message| {
                    DatabaseError::InvalidRow {
                        table: "patient_profiles",
                        message,
                    }
                    .into()
                })
            }
        }
    }

    async fn fetch_profile(
        &self,
        patient_id: &PatientId,
        tenant_id: &TenantId,
    ) -> Result<Option<PatientProfile>> {
        let mut profiles = self
            .scoped("patient_profiles", PROFILE_SQL, patient_id, tenant_id, rows::profile)
            .await?;
        Ok(profiles.pop())
    }

    async fn fetch_medications(
        &self,
        patient_id: &PatientId,
        tenant_id: &TenantId,
    ) -> Result<Vec<Medication>> {
        self.scoped("medications", MEDICATIONS_SQL, patient_id, tenant_id, rows::medication)
            .await
    }

    async fn fetch_allergies(
        &self,
        patient_id: &PatientId,
        tenant_id: &TenantId,
    ) -> Result<Vec<Allergy>> {
        self.scoped("allergies", ALLERGIES_SQL, patient_id, tenant_id, rows::allergy)
            .await
    }

    async fn fetch_conditions(
        &self,
        patient_id: &PatientId,
        tenant_id: &TenantId,
    ) -> Result<Vec<Condition>> {
        self.scoped("conditions", CONDITIONS_SQL, patient_id, tenant_id, rows::condition)
            .await
    }

    async fn fetch_procedures(
        &self,
        patient_id: &PatientId,
        tenant_id: &TenantId,
    ) -> Result<Vec<Procedure>> {
        self.scoped("procedures", PROCEDURES_SQL, patient_id, tenant_id, rows::procedure)
            .await
    }

    async fn fetch_immunizations(
        &self,
        patient_id: &PatientId,
        tenant_id: &TenantId,
    ) -> Result<Vec<Immunization>> {
        self.scoped(
            "immunizations",
            IMMUNIZATIONS_SQL,
            patient_id,
            tenant_id,
            rows::immunization,
        )
        .await
    }

    async fn fetch_vitals(
        &self,
        patient_id: &PatientId,
        tenant_id: &TenantId,
    ) -> Result<Vec<VitalSign>> {
        self.scoped("vital_signs", VITALS_SQL, patient_id, tenant_id, rows::vital_sign)
            .await
    }

    async fn fetch_lab_results(
        &self,
        patient_id: &PatientId,
        tenant_id: &TenantId,
    ) -> Result<Vec<LabResult>> {
        self.scoped("lab_results", LAB_RESULTS_SQL, patient_id, tenant_id, rows::lab_result)
            .await
    }

    async fn fetch_care_plans(
        &self,
        patient_id: &PatientId,
        tenant_id: &TenantId,
    ) -> Result<Vec<CarePlan>> {
        self.scoped("care_plans", CARE_PLANS_SQL, patient_id, tenant_id, rows::care_plan)
            .await
    }
}
