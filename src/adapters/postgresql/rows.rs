//! Row mapping for the clinical tables
//!
//! Queries cast every column to the Rust-facing type (`::text`, `::date`,
//! `::timestamptz`, `::int4`) so the mappers below only deal with those.

use crate::domain::{
    Allergy, CarePlan, Condition, DatabaseError, Immunization, LabResult, Medication, PatientId,
    PatientProfile, Procedure, Result, TenantId, VitalSign,
};
use tokio_postgres::types::FromSql;
use tokio_postgres::Row;

/// Typed column read that names the table on failure
pub(crate) fn column<'a, T: FromSql<'a>>(
    row: &'a Row,
    table: &'static str,
    name: &str,
) -> Result<T> {
    row.try_get(name).map_err(|e| {
        DatabaseError::InvalidRow {
            table,
            message: format!("column {name}: {e}"),
        }
        .into()
    })
}

/// Status columns are free text; absent values read as an empty string
fn status(row: &Row, table: &'static str) -> Result<String> {
    Ok(column::<Option<String>>(row, table, "status")?.unwrap_or_default())
}

pub(crate) fn profile(row: &Row) -> Result<PatientProfile> {
    const T: &str = "patient_profiles";
    let invalid = |message: String| DatabaseError::InvalidRow { table: T, message };

    let id = PatientId::new(column::<String>(row, T, "id")?).map_err(invalid)?;
    let tenant_id = TenantId::new(column::<String>(row, T, "tenant_id")?).map_err(invalid)?;

    Ok(PatientProfile {
        id,
        tenant_id,
        mrn: column(row, T, "mrn")?,
        first_name: column::<Option<String>>(row, T, "first_name")?.unwrap_or_default(),
        last_name: column::<Option<String>>(row, T, "last_name")?.unwrap_or_default(),
        date_of_birth: column(row, T, "date_of_birth")?,
        gender: column(row, T, "gender")?,
        address_line: column(row, T, "address_line")?,
        city: column(row, T, "city")?,
        state: column(row, T, "state")?,
        postal_code: column(row, T, "postal_code")?,
        country: column(row, T, "country")?,
        phone: column(row, T, "phone")?,
        email: column(row, T, "email")?,
    })
}

pub(crate) fn medication(row: &Row) -> Result<Medication> {
    const T: &str = "medications";
    Ok(Medication {
        id: column(row, T, "id")?,
        name: column(row, T, "name")?,
        code: column(row, T, "code")?,
        code_system: column(row, T, "code_system")?,
        dosage: column(row, T, "dosage")?,
        frequency: column(row, T, "frequency")?,
        route: column(row, T, "route")?,
        status: status(row, T)?,
        start_date: column(row, T, "start_date")?,
        end_date: column(row, T, "end_date")?,
    })
}

pub(crate) fn allergy(row: &Row) -> Result<Allergy> {
    const T: &str = "allergies";
    Ok(Allergy {
        id: column(row, T, "id")?,
        allergen: column(row, T, "allergen")?,
        allergen_type: column(row, T, "allergen_type")?,
        reaction: column(row, T, "reaction")?,
        severity: column(row, T, "severity")?,
        status: status(row, T)?,
        onset_date: column(row, T, "onset_date")?,
    })
}

pub(crate) fn condition(row: &Row) -> Result<Condition> {
    const T: &str = "conditions";
    Ok(Condition {
        id: column(row, T, "id")?,
        name: column(row, T, "name")?,
        code: column(row, T, "code")?,
        code_system: column(row, T, "code_system")?,
        status: status(row, T)?,
        onset_date: column(row, T, "onset_date")?,
        resolved_date: column(row, T, "resolved_date")?,
    })
}

pub(crate) fn procedure(row: &Row) -> Result<Procedure> {
    const T: &str = "procedures";
    Ok(Procedure {
        id: column(row, T, "id")?,
        name: column(row, T, "name")?,
        code: column(row, T, "code")?,
        code_system: column(row, T, "code_system")?,
        status: status(row, T)?,
        performed_at: column(row, T, "performed_at")?,
    })
}

pub(crate) fn immunization(row: &Row) -> Result<Immunization> {
    const T: &str = "immunizations";
    Ok(Immunization {
        id: column(row, T, "id")?,
        vaccine_name: column(row, T, "vaccine_name")?,
        cvx_code: column(row, T, "cvx_code")?,
        status: status(row, T)?,
        administered_at: column(row, T, "administered_at")?,
        lot_number: column(row, T, "lot_number")?,
        dose_number: column(row, T, "dose_number")?,
    })
}

pub(crate) fn vital_sign(row: &Row) -> Result<VitalSign> {
    const T: &str = "vital_signs";
    Ok(VitalSign {
        id: column(row, T, "id")?,
        kind: column(row, T, "kind")?,
        loinc_code: column(row, T, "loinc_code")?,
        value: column::<Option<String>>(row, T, "value")?.unwrap_or_default(),
        unit: column(row, T, "unit")?,
        measured_at: column(row, T, "measured_at")?,
    })
}

pub(crate) fn lab_result(row: &Row) -> Result<LabResult> {
    const T: &str = "lab_results";
    Ok(LabResult {
        id: column(row, T, "id")?,
        test_name: column(row, T, "test_name")?,
        loinc_code: column(row, T, "loinc_code")?,
        value: column(row, T, "value")?,
        unit: column(row, T, "unit")?,
        reference_range: column(row, T, "reference_range")?,
        interpretation: column(row, T, "interpretation")?,
        status: status(row, T)?,
        collected_at: column(row, T, "collected_at")?,
    })
}

pub(crate) fn care_plan(row: &Row) -> Result<CarePlan> {
    const T: &str = "care_plans";
    Ok(CarePlan {
        id: column(row, T, "id")?,
        title: column(row, T, "title")?,
        description: column(row, T, "description")?,
        goal: column(row, T, "goal")?,
        status: status(row, T)?,
        start_date: column(row, T, "start_date")?,
        end_date: column(row, T, "end_date")?,
    })
}
