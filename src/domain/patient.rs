//! Patient profile and the per-export record snapshot

use super::ids::{PatientId, TenantId};
use super::records::{
    Allergy, CarePlan, Condition, Immunization, LabResult, Medication, Procedure, VitalSign,
};
use chrono::{NaiveDate, NaiveDateTime};
use serde::{Deserialize, Serialize};

/// Demographics for the patient the document is about
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PatientProfile {
    pub id: PatientId,
    pub tenant_id: TenantId,
    /// Medical record number assigned by the tenant, if any
    #[serde(default)]
    pub mrn: Option<String>,
    pub first_name: String,
    pub last_name: String,
    #[serde(default)]
    pub date_of_birth: Option<NaiveDate>,
    /// Free-text gender as stored ("male", "F", "non-binary", ...)
    #[serde(default)]
    pub gender: Option<String>,
    #[serde(default)]
    pub address_line: Option<String>,
    #[serde(default)]
    pub city: Option<String>,
    #[serde(default)]
    pub state: Option<String>,
    #[serde(default)]
    pub postal_code: Option<String>,
    #[serde(default)]
    pub country: Option<String>,
    #[serde(default)]
    pub phone: Option<String>,
    #[serde(default)]
    pub email: Option<String>,
}

impl PatientProfile {
    /// Creates a profile with only the required fields set
    pub fn new(
        id: PatientId,
        tenant_id: TenantId,
        first_name: impl Into<String>,
        last_name: impl Into<String>,
    ) -> Self {
        Self {
            id,
            tenant_id,
            mrn: None,
            first_name: first_name.into(),
            last_name: last_name.into(),
            date_of_birth: None,
            gender: None,
            address_line: None,
            city: None,
            state: None,
            postal_code: None,
            country: None,
            phone: None,
            email: None,
        }
    }

    /// Whether any postal address component is present
    pub fn has_address(&self) -> bool {
        [
            &self.address_line,
            &self.city,
            &self.state,
            &self.postal_code,
            &self.country,
        ]
        .iter()
        .any(|part| part.as_deref().is_some_and(|s| !s.trim().is_empty()))
    }
}

/// Everything read for one export, joined from the parallel fetches
///
/// This is also the shape of the JSON snapshots accepted by `ccda-export render`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PatientRecord {
    pub profile: PatientProfile,
    #[serde(default)]
    pub medications: Vec<Medication>,
    #[serde(default)]
    pub allergies: Vec<Allergy>,
    #[serde(default)]
    pub conditions: Vec<Condition>,
    #[serde(default)]
    pub procedures: Vec<Procedure>,
    #[serde(default)]
    pub immunizations: Vec<Immunization>,
    #[serde(default)]
    pub vitals: Vec<VitalSign>,
    #[serde(default)]
    pub lab_results: Vec<LabResult>,
    #[serde(default)]
    pub care_plans: Vec<CarePlan>,
}

/// Number of records per section, used for logging and summaries
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct SectionCounts {
    pub allergies: usize,
    pub medications: usize,
    pub problems: usize,
    pub procedures: usize,
    pub immunizations: usize,
    pub vital_signs: usize,
    pub results: usize,
    pub plan_of_care: usize,
}

impl SectionCounts {
    /// Total number of clinical records across all sections
    pub fn total(&self) -> usize {
        self.allergies
            + self.medications
            + self.problems
            + self.procedures
            + self.immunizations
            + self.vital_signs
            + self.results
            + self.plan_of_care
    }
}

impl PatientRecord {
    /// Creates a record with a profile and no clinical data
    pub fn new(profile: PatientProfile) -> Self {
        Self {
            profile,
            medications: Vec::new(),
            allergies: Vec::new(),
            conditions: Vec::new(),
            procedures: Vec::new(),
            immunizations: Vec::new(),
            vitals: Vec::new(),
            lab_results: Vec::new(),
            care_plans: Vec::new(),
        }
    }

    /// Record counts per CCD section
    pub fn section_counts(&self) -> SectionCounts {
        SectionCounts {
            allergies: self.allergies.len(),
            medications: self.medications.len(),
            problems: self.conditions.len(),
            procedures: self.procedures.len(),
            immunizations: self.immunizations.len(),
            vital_signs: self.vitals.len(),
            results: self.lab_results.len(),
            plan_of_care: self.care_plans.len(),
        }
    }

    /// Earliest and latest clinical date found in the record
    ///
    /// Dates are compared at midnight; timestamps are compared in UTC.
    /// Returns `None` when no record carries a date.
    pub fn clinical_date_range(&self) -> Option<(NaiveDateTime, NaiveDateTime)> {
        let from_date = |d: &NaiveDate| d.and_hms_opt(0, 0, 0);

        let dates = self
            .medications
            .iter()
            .flat_map(|m| [m.start_date.as_ref(), m.end_date.as_ref()])
            .chain(self.allergies.iter().map(|a| a.onset_date.as_ref()))
            .chain(
                self.conditions
                    .iter()
                    .flat_map(|c| [c.onset_date.as_ref(), c.resolved_date.as_ref()]),
            )
            .chain(
                self.care_plans
                    .iter()
                    .flat_map(|c| [c.start_date.as_ref(), c.end_date.as_ref()]),
            )
            .flatten()
            .filter_map(from_date);

        let stamps = self
            .procedures
            .iter()
            .map(|p| p.performed_at)
            .chain(self.immunizations.iter().map(|i| i.administered_at))
            .chain(self.vitals.iter().map(|v| v.measured_at))
            .chain(self.lab_results.iter().map(|l| l.collected_at))
            .flatten()
            .map(|t| t.naive_utc());

        dates.chain(stamps).fold(None, |range, t| match range {
            None => Some((t, t)),
            Some((lo, hi)) => Some((lo.min(t), hi.max(t))),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{TimeZone, Utc};

    fn profile() -> PatientProfile {
        PatientProfile::new(
            PatientId::new("p-1").unwrap(),
            TenantId::new("t-1").unwrap(),
            "Ada",
            "Lovelace",
        )
    }

    #[test]
    fn test_empty_record_has_no_date_range() {
        let record = PatientRecord::new(profile());
        assert_eq!(record.clinical_date_range(), None);
        assert_eq!(record.section_counts().total(), 0);
    }

    #[test]
    fn test_clinical_date_range_spans_dates_and_timestamps() {
        let mut record = PatientRecord::new(profile());
        record.allergies.push(Allergy {
            id: "a1".into(),
            allergen: "Peanuts".into(),
            allergen_type: Some("food".into()),
            reaction: None,
            severity: None,
            status: "active".into(),
            onset_date: NaiveDate::from_ymd_opt(2001, 5, 4),
        });
        record.vitals.push(VitalSign {
            id: "v1".into(),
            kind: "Heart rate".into(),
            loinc_code: Some("8867-4".into()),
            value: "72".into(),
            unit: Some("/min".into()),
            measured_at: Some(Utc.with_ymd_and_hms(2024, 3, 1, 9, 30, 0).unwrap()),
        });

        let (lo, hi) = record.clinical_date_range().unwrap();
        assert_eq!(lo.to_string(), "2001-05-04 00:00:00");
        assert_eq!(hi.to_string(), "2024-03-01 09:30:00");
        assert_eq!(record.section_counts().total(), 2);
    }

    #[test]
    fn test_has_address() {
        let mut p = profile();
        assert!(!p.has_address());
        p.city = Some("  ".into());
        assert!(!p.has_address());
        p.city = Some("Boston".into());
        assert!(p.has_address());
    }

    #[test]
    fn test_snapshot_defaults_missing_sections() {
        let json = r#"{
            "profile": {
                "id": "p-1", "tenant_id": "t-1",
                "first_name": "Ada", "last_name": "Lovelace"
            }
        }"#;
        let record: PatientRecord = serde_json::from_str(json).unwrap();
        assert!(record.medications.is_empty());
        assert!(record.care_plans.is_empty());
    }
}
