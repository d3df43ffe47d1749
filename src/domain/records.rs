//! Clinical record snapshots
//!
//! Each type mirrors one row of a clinical table as it is read for an export.
//! Rows are read-only: nothing in the exporter mutates or writes them back.
//! Free-text fields are stored exactly as read; escaping happens at render time.

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

/// A medication on the patient's medication list
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Medication {
    pub id: String,
    /// Drug name as entered
    pub name: String,
    /// Drug code, usually RxNorm
    #[serde(default)]
    pub code: Option<String>,
    /// Code system name for `code` (e.g. "rxnorm", "ndc")
    #[serde(default)]
    pub code_system: Option<String>,
    #[serde(default)]
    pub dosage: Option<String>,
    #[serde(default)]
    pub frequency: Option<String>,
    #[serde(default)]
    pub route: Option<String>,
    pub status: String,
    #[serde(default)]
    pub start_date: Option<NaiveDate>,
    #[serde(default)]
    pub end_date: Option<NaiveDate>,
}

/// An allergy or intolerance
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Allergy {
    pub id: String,
    /// Substance the patient reacts to
    pub allergen: String,
    /// Category such as "medication", "food" or "environmental"
    #[serde(default)]
    pub allergen_type: Option<String>,
    #[serde(default)]
    pub reaction: Option<String>,
    /// Severity such as "mild", "moderate", "severe"
    #[serde(default)]
    pub severity: Option<String>,
    pub status: String,
    #[serde(default)]
    pub onset_date: Option<NaiveDate>,
}

/// A problem list entry
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Condition {
    pub id: String,
    pub name: String,
    /// Diagnosis code, usually ICD-10-CM or SNOMED CT
    #[serde(default)]
    pub code: Option<String>,
    #[serde(default)]
    pub code_system: Option<String>,
    pub status: String,
    #[serde(default)]
    pub onset_date: Option<NaiveDate>,
    #[serde(default)]
    pub resolved_date: Option<NaiveDate>,
}

/// A performed procedure
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Procedure {
    pub id: String,
    pub name: String,
    /// Procedure code, usually CPT or SNOMED CT
    #[serde(default)]
    pub code: Option<String>,
    #[serde(default)]
    pub code_system: Option<String>,
    pub status: String,
    #[serde(default)]
    pub performed_at: Option<DateTime<Utc>>,
}

/// An administered (or refused) immunization
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Immunization {
    pub id: String,
    pub vaccine_name: String,
    #[serde(default)]
    pub cvx_code: Option<String>,
    pub status: String,
    #[serde(default)]
    pub administered_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub lot_number: Option<String>,
    #[serde(default)]
    pub dose_number: Option<i32>,
}

/// A single vital sign measurement
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VitalSign {
    pub id: String,
    /// Measurement kind, e.g. "Heart rate" or "blood_pressure_systolic"
    pub kind: String,
    #[serde(default)]
    pub loinc_code: Option<String>,
    pub value: String,
    #[serde(default)]
    pub unit: Option<String>,
    #[serde(default)]
    pub measured_at: Option<DateTime<Utc>>,
}

/// A laboratory result
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LabResult {
    pub id: String,
    pub test_name: String,
    #[serde(default)]
    pub loinc_code: Option<String>,
    #[serde(default)]
    pub value: Option<String>,
    #[serde(default)]
    pub unit: Option<String>,
    #[serde(default)]
    pub reference_range: Option<String>,
    /// Interpretation flag such as "normal", "high", "low", "critical"
    #[serde(default)]
    pub interpretation: Option<String>,
    pub status: String,
    #[serde(default)]
    pub collected_at: Option<DateTime<Utc>>,
}

/// A care plan item
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CarePlan {
    pub id: String,
    pub title: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub goal: Option<String>,
    pub status: String,
    #[serde(default)]
    pub start_date: Option<NaiveDate>,
    #[serde(default)]
    pub end_date: Option<NaiveDate>,
}
