//! Medications section

use super::{
    event_status, reference_id, write_record_id, write_text_reference, NarrativeTable, SectionSpec,
};
use crate::core::ccda::context::DocumentContext;
use crate::core::ccda::encoding::{
    narrative_date, resolve_code_system, write_code, write_interval, CodeSystem,
};
use crate::core::ccda::templates::{
    MEDICATIONS_SECTION, MEDICATION_ACTIVITY, MEDICATION_INFORMATION,
};
use crate::domain::Medication;
use std::fmt::{self, Write};

pub const SECTION: SectionSpec = SectionSpec {
    template: MEDICATIONS_SECTION,
    code: "10160-0",
    code_display: "History of Medication use Narrative",
    title: "Medications",
    empty_text: "No known medications",
    null_flavor_when_empty: true,
};

pub fn render(medications: &[Medication], ctx: &DocumentContext, out: &mut String) -> fmt::Result {
    SECTION.open(out, medications.is_empty())?;

    if medications.is_empty() {
        SECTION.write_empty_text(out, None)?;
        SECTION.close(out);
        return Ok(());
    }

    let mut table = NarrativeTable::begin(
        out,
        &["Medication", "Dosage", "Frequency", "Route", "Status", "Start", "End"],
    );
    for (i, med) in medications.iter().enumerate() {
        table.row(
            &reference_id("medication", i),
            &[
                &med.name,
                med.dosage.as_deref().unwrap_or_default(),
                med.frequency.as_deref().unwrap_or_default(),
                med.route.as_deref().unwrap_or_default(),
                &med.status,
                &narrative_date(med.start_date.as_ref()),
                &narrative_date(med.end_date.as_ref()),
            ],
        )?;
    }
    table.end();

    for (i, med) in medications.iter().enumerate() {
        write_entry(out, ctx, med, &reference_id("medication", i))?;
    }

    SECTION.close(out);
    Ok(())
}

fn write_entry(
    out: &mut String,
    ctx: &DocumentContext,
    med: &Medication,
    reference: &str,
) -> fmt::Result {
    out.push_str(r#"<entry typeCode="DRIV">"#);
    out.push_str(r#"<substanceAdministration classCode="SBADM" moodCode="EVN">"#);
    MEDICATION_ACTIVITY.write(out)?;
    write_record_id(out, ctx, &med.id)?;
    write_text_reference(out, reference)?;
    write!(out, r#"<statusCode code="{}"/>"#, event_status(&med.status))?;
    write_interval(
        out,
        r#" xsi:type="IVL_TS""#,
        med.start_date.as_ref(),
        med.end_date.as_ref(),
    )?;

    if let Some(route) = med.route.as_deref().filter(|r| !r.trim().is_empty()) {
        write_code(out, "routeCode", "", None, None, route)?;
    }

    out.push_str(r#"<consumable><manufacturedProduct classCode="MANU">"#);
    MEDICATION_INFORMATION.write(out)?;
    out.push_str("<manufacturedMaterial>");
    write_code(
        out,
        "code",
        "",
        med.code.as_deref(),
        resolve_code_system(med.code_system.as_deref(), CodeSystem::RxNorm),
        &med.name,
    )?;
    out.push_str("</manufacturedMaterial>");
    out.push_str("</manufacturedProduct></consumable>");

    out.push_str("</substanceAdministration></entry>");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::ccda::sections::test_support::{context, count};
    use chrono::NaiveDate;

    fn medication() -> Medication {
        Medication {
            id: "m1".into(),
            name: "Lisinopril 10 MG Oral Tablet".into(),
            code: Some("314076".into()),
            code_system: None,
            dosage: Some("10 mg".into()),
            frequency: Some("daily".into()),
            route: Some("oral".into()),
            status: "active".into(),
            start_date: NaiveDate::from_ymd_opt(2022, 2, 14),
            end_date: None,
        }
    }

    #[test]
    fn test_empty_medications_fallback() {
        let mut out = String::new();
        render(&[], &context(), &mut out).unwrap();

        assert!(out.contains(r#"<section nullFlavor="NI">"#));
        assert!(out.contains("<paragraph>No known medications</paragraph>"));
        assert!(!out.contains("<table"));
        assert!(!out.contains("<entry"));
    }

    #[test]
    fn test_medication_entry_defaults_to_rxnorm() {
        let mut out = String::new();
        render(&[medication()], &context(), &mut out).unwrap();

        assert!(out.contains(r#"code="314076" codeSystem="2.16.840.1.113883.6.88""#));
        assert!(out.contains(
            r#"<effectiveTime xsi:type="IVL_TS"><low value="20220214000000"/></effectiveTime>"#
        ));
        assert!(out.contains(r#"<routeCode nullFlavor="UNK"><originalText>oral</originalText>"#));
        assert!(out.contains(r#"<td ID="medication-1">Lisinopril 10 MG Oral Tablet</td>"#));
        assert_eq!(count(&out, "<substanceAdministration "), 1);
    }

    #[test]
    fn test_unknown_code_system_falls_back_to_original_text() {
        let mut med = medication();
        med.code_system = Some("house-formulary".into());
        let mut out = String::new();
        render(&[med], &context(), &mut out).unwrap();

        assert!(out.contains(
            r#"<code nullFlavor="UNK"><originalText>Lisinopril 10 MG Oral Tablet</originalText></code>"#
        ));
    }

    #[test]
    fn test_ended_medication_has_high_bound() {
        let mut med = medication();
        med.status = "completed".into();
        med.end_date = NaiveDate::from_ymd_opt(2023, 1, 1);
        let mut out = String::new();
        render(&[med], &context(), &mut out).unwrap();

        assert!(out.contains(r#"<high value="20230101000000"/>"#));
        assert!(out.contains(r#"<statusCode code="completed"/>"#));
    }
}
