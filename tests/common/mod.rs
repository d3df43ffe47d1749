//! Shared fixtures for integration tests

#![allow(dead_code)]

use ccda_export::domain::{
    Allergy, CarePlan, Condition, Immunization, LabResult, Medication, PatientId, PatientProfile,
    PatientRecord, Procedure, TenantId, VitalSign,
};
use chrono::{NaiveDate, TimeZone, Utc};

pub const PATIENT: &str = "7d44b88c-4199-4bad-97dc-d78268e01398";
pub const TENANT: &str = "riverside";

pub fn profile(patient: &str, tenant: &str) -> PatientProfile {
    let mut profile = PatientProfile::new(
        PatientId::new(patient).unwrap(),
        TenantId::new(tenant).unwrap(),
        "Ada",
        "Lovelace",
    );
    profile.mrn = Some("MRN-0042".into());
    profile.date_of_birth = NaiveDate::from_ymd_opt(1985, 12, 10);
    profile.gender = Some("female".into());
    profile.address_line = Some("12 St James's Square".into());
    profile.city = Some("London".into());
    profile.postal_code = Some("SW1Y 4JH".into());
    profile.phone = Some("+1-555-0100".into());
    profile
}

pub fn empty_record() -> PatientRecord {
    PatientRecord::new(profile(PATIENT, TENANT))
}

/// One record per section, every date populated
pub fn full_record() -> PatientRecord {
    let at = |d: u32, h: u32| Utc.with_ymd_and_hms(2024, 3, d, h, 15, 0).unwrap();
    let date = |y: i32, m: u32, d: u32| NaiveDate::from_ymd_opt(y, m, d);

    let mut record = empty_record();
    record.medications.push(Medication {
        id: "med-1".into(),
        name: "Metformin 500 MG Oral Tablet".into(),
        code: Some("861007".into()),
        code_system: Some("RxNorm".into()),
        dosage: Some("500 mg".into()),
        frequency: Some("twice daily".into()),
        route: Some("oral".into()),
        status: "active".into(),
        start_date: date(2023, 1, 5),
        end_date: date(2024, 1, 5),
    });
    record.allergies.push(Allergy {
        id: "alg-1".into(),
        allergen: "Penicillin".into(),
        allergen_type: Some("medication".into()),
        reaction: Some("Hives".into()),
        severity: Some("moderate".into()),
        status: "active".into(),
        onset_date: date(2010, 6, 1),
    });
    record.conditions.push(Condition {
        id: "cond-1".into(),
        name: "Type 2 diabetes mellitus".into(),
        code: Some("E11.9".into()),
        code_system: Some("ICD-10-CM".into()),
        status: "active".into(),
        onset_date: date(2022, 11, 20),
        resolved_date: date(2023, 11, 20),
    });
    record.procedures.push(Procedure {
        id: "proc-1".into(),
        name: "Colonoscopy".into(),
        code: Some("45378".into()),
        code_system: Some("CPT".into()),
        status: "completed".into(),
        performed_at: Some(at(2, 9)),
    });
    record.immunizations.push(Immunization {
        id: "imm-1".into(),
        vaccine_name: "Influenza, seasonal".into(),
        cvx_code: Some("141".into()),
        status: "completed".into(),
        administered_at: Some(at(3, 10)),
        lot_number: Some("LOT-7781".into()),
        dose_number: Some(1),
    });
    record.vitals.push(VitalSign {
        id: "vit-1".into(),
        kind: "Heart rate".into(),
        loinc_code: Some("8867-4".into()),
        value: "72".into(),
        unit: Some("/min".into()),
        measured_at: Some(at(4, 8)),
    });
    record.vitals.push(VitalSign {
        id: "vit-2".into(),
        kind: "Body weight".into(),
        loinc_code: Some("29463-7".into()),
        value: "68.5".into(),
        unit: Some("kg".into()),
        measured_at: Some(at(4, 8)),
    });
    record.lab_results.push(LabResult {
        id: "lab-1".into(),
        test_name: "Hemoglobin A1c".into(),
        loinc_code: Some("4548-4".into()),
        value: Some("7.1".into()),
        unit: Some("%".into()),
        reference_range: Some("4.0-5.6".into()),
        interpretation: Some("high".into()),
        status: "final".into(),
        collected_at: Some(at(5, 7)),
    });
    record.care_plans.push(CarePlan {
        id: "plan-1".into(),
        title: "Diabetes management".into(),
        description: Some("Diet and exercise".into()),
        goal: Some("HbA1c below 7%".into()),
        status: "active".into(),
        start_date: date(2024, 3, 6),
        end_date: None,
    });
    record
}
