//! Export summary and reporting

use crate::domain::{PatientId, SectionCounts, TenantId};
use serde::Serialize;
use std::time::Duration;

/// Summary of one document export
#[derive(Debug, Clone, Serialize)]
pub struct ExportSummary {
    pub patient_id: PatientId,

    pub tenant_id: TenantId,

    /// Records rendered per section
    pub counts: SectionCounts,

    /// Size of the generated XML in bytes
    pub bytes: usize,

    /// Wall time for fetch plus render
    #[serde(rename = "duration_ms", serialize_with = "serialize_millis")]
    pub duration: Duration,
}

fn serialize_millis<S>(duration: &Duration, serializer: S) -> Result<S::Ok, S::Error>
where
    S: serde::Serializer,
{
    serializer.serialize_u64(duration.as_millis() as u64)
}

impl ExportSummary {
    /// Sections that rendered their empty-state narrative
    pub fn empty_sections(&self) -> Vec<&'static str> {
        let c = &self.counts;
        [
            ("allergies", c.allergies),
            ("medications", c.medications),
            ("problems", c.problems),
            ("procedures", c.procedures),
            ("immunizations", c.immunizations),
            ("vital_signs", c.vital_signs),
            ("results", c.results),
            ("plan_of_care", c.plan_of_care),
        ]
        .into_iter()
        .filter(|(_, n)| *n == 0)
        .map(|(name, _)| name)
        .collect()
    }

    /// Log the summary
    pub fn log_summary(&self) {
        crate::log_export_complete!(
            self.patient_id,
            self.counts.total(),
            self.bytes,
            self.duration
        );

        tracing::debug!(
            patient_id = %self.patient_id,
            tenant_id = %self.tenant_id,
            allergies = self.counts.allergies,
            medications = self.counts.medications,
            problems = self.counts.problems,
            procedures = self.counts.procedures,
            immunizations = self.counts.immunizations,
            vital_signs = self.counts.vital_signs,
            results = self.counts.results,
            plan_of_care = self.counts.plan_of_care,
            empty_sections = ?self.empty_sections(),
            "Section counts"
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn summary(counts: SectionCounts) -> ExportSummary {
        ExportSummary {
            patient_id: PatientId::new("p-1").unwrap(),
            tenant_id: TenantId::new("t-1").unwrap(),
            counts,
            bytes: 2048,
            duration: Duration::from_millis(42),
        }
    }

    #[test]
    fn test_empty_sections_lists_zero_counts() {
        let s = summary(SectionCounts {
            allergies: 2,
            results: 1,
            ..SectionCounts::default()
        });
        let empty = s.empty_sections();
        assert_eq!(empty.len(), 6);
        assert!(!empty.contains(&"allergies"));
        assert!(empty.contains(&"plan_of_care"));
    }

    #[test]
    fn test_summary_serializes_duration_as_millis() {
        let json = serde_json::to_value(summary(SectionCounts::default())).unwrap();
        assert_eq!(json["duration_ms"], 42);
        assert_eq!(json["patient_id"], "p-1");
        assert_eq!(json["counts"]["medications"], 0);
    }
}
