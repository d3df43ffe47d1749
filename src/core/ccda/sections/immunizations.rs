//! Immunizations section

use super::{reference_id, write_record_id, write_text_reference, NarrativeTable, SectionSpec};
use crate::core::ccda::context::DocumentContext;
use crate::core::ccda::encoding::{
    escape_xml, narrative_date, status_code, write_code, write_time, CodeSystem,
};
use crate::core::ccda::templates::{
    IMMUNIZATIONS_SECTION, IMMUNIZATION_ACTIVITY, IMMUNIZATION_MEDICATION_INFORMATION,
};
use crate::domain::Immunization;
use std::fmt::{self, Write};

pub const SECTION: SectionSpec = SectionSpec {
    template: IMMUNIZATIONS_SECTION,
    code: "11369-6",
    code_display: "History of Immunization Narrative",
    title: "Immunizations",
    empty_text: "No immunizations recorded",
    null_flavor_when_empty: true,
};

pub fn render(
    immunizations: &[Immunization],
    ctx: &DocumentContext,
    out: &mut String,
) -> fmt::Result {
    SECTION.open(out, immunizations.is_empty())?;

    if immunizations.is_empty() {
        SECTION.write_empty_text(out, None)?;
        SECTION.close(out);
        return Ok(());
    }

    let mut table = NarrativeTable::begin(out, &["Vaccine", "CVX", "Status", "Date", "Lot"]);
    for (i, imm) in immunizations.iter().enumerate() {
        table.row(
            &reference_id("immunization", i),
            &[
                &imm.vaccine_name,
                imm.cvx_code.as_deref().unwrap_or_default(),
                &imm.status,
                &narrative_date(imm.administered_at.as_ref()),
                imm.lot_number.as_deref().unwrap_or_default(),
            ],
        )?;
    }
    table.end();

    for (i, imm) in immunizations.iter().enumerate() {
        write_entry(out, ctx, imm, &reference_id("immunization", i))?;
    }

    SECTION.close(out);
    Ok(())
}

fn write_entry(
    out: &mut String,
    ctx: &DocumentContext,
    imm: &Immunization,
    reference: &str,
) -> fmt::Result {
    // A refused or not-given vaccine is recorded as a negated administration.
    let (negated, status) = match status_code(&imm.status) {
        "aborted" => (true, "completed"),
        "active" | "new" => (false, "active"),
        other => (false, other),
    };

    out.push_str(r#"<entry typeCode="DRIV">"#);
    write!(
        out,
        r#"<substanceAdministration classCode="SBADM" moodCode="EVN" negationInd="{negated}">"#
    )?;
    IMMUNIZATION_ACTIVITY.write(out)?;
    write_record_id(out, ctx, &imm.id)?;
    write_text_reference(out, reference)?;
    write!(out, r#"<statusCode code="{status}"/>"#)?;
    write_time(out, "effectiveTime", imm.administered_at.as_ref())?;
    if let Some(dose) = imm.dose_number.filter(|d| *d > 0) {
        write!(out, r#"<repeatNumber value="{dose}"/>"#)?;
    }

    out.push_str(r#"<consumable><manufacturedProduct classCode="MANU">"#);
    IMMUNIZATION_MEDICATION_INFORMATION.write(out)?;
    out.push_str("<manufacturedMaterial>");
    write_code(
        out,
        "code",
        "",
        imm.cvx_code.as_deref(),
        Some(CodeSystem::Cvx),
        &imm.vaccine_name,
    )?;
    if let Some(lot) = imm.lot_number.as_deref().filter(|l| !l.trim().is_empty()) {
        write!(out, "<lotNumberText>{}</lotNumberText>", escape_xml(lot.trim()))?;
    }
    out.push_str("</manufacturedMaterial>");
    out.push_str("</manufacturedProduct></consumable>");

    out.push_str("</substanceAdministration></entry>");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::ccda::sections::test_support::context;
    use chrono::{TimeZone, Utc};

    fn flu_shot(status: &str) -> Immunization {
        Immunization {
            id: "i1".into(),
            vaccine_name: "Influenza, seasonal, injectable".into(),
            cvx_code: Some("141".into()),
            status: status.into(),
            administered_at: Some(Utc.with_ymd_and_hms(2024, 10, 1, 10, 0, 0).unwrap()),
            lot_number: Some("FL-2024-A".into()),
            dose_number: Some(1),
        }
    }

    #[test]
    fn test_empty_immunizations_fallback() {
        let mut out = String::new();
        render(&[], &context(), &mut out).unwrap();
        assert!(out.contains("<paragraph>No immunizations recorded</paragraph>"));
    }

    #[test]
    fn test_given_immunization() {
        let mut out = String::new();
        render(&[flu_shot("completed")], &context(), &mut out).unwrap();

        assert!(out.contains(r#"negationInd="false""#));
        assert!(out.contains(r#"code="141" codeSystem="2.16.840.1.113883.12.292""#));
        assert!(out.contains("<lotNumberText>FL-2024-A</lotNumberText>"));
        assert!(out.contains(r#"<repeatNumber value="1"/>"#));
        assert!(out.contains(r#"<effectiveTime value="20241001100000"/>"#));
    }

    #[test]
    fn test_refused_immunization_is_negated() {
        let mut out = String::new();
        render(&[flu_shot("refused")], &context(), &mut out).unwrap();

        assert!(out.contains(r#"negationInd="true""#));
        assert!(out.contains(r#"<statusCode code="completed"/>"#));
    }
}
