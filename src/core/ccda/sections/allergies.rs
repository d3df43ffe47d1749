//! Allergies and Intolerances section

use super::{
    concern_status, reference_id, write_record_id, write_text_reference, NarrativeTable,
    SectionSpec,
};
use crate::core::ccda::context::DocumentContext;
use crate::core::ccda::encoding::{
    allergy_type_code, escape_xml, narrative_date, severity_code, write_code, write_time,
    AllergyTypeCode, CodeSystem,
};
use crate::core::ccda::templates::{
    ALLERGIES_SECTION, ALLERGY_CONCERN_ACT, ALLERGY_INTOLERANCE_OBSERVATION,
    REACTION_OBSERVATION, SEVERITY_OBSERVATION,
};
use crate::domain::Allergy;
use chrono::NaiveDate;
use std::fmt::{self, Write};

pub const SECTION: SectionSpec = SectionSpec {
    template: ALLERGIES_SECTION,
    code: "48765-2",
    code_display: "Allergies and adverse reactions Document",
    title: "Allergies and Intolerances",
    empty_text: "No known allergies",
    null_flavor_when_empty: false,
};

const NONE_REFERENCE: &str = "allergies-none";
const ACT_CODE_OID: &str = "2.16.840.1.113883.5.6";
const ACT_CODE_HL7_OID: &str = "2.16.840.1.113883.5.4";

pub fn render(allergies: &[Allergy], ctx: &DocumentContext, out: &mut String) -> fmt::Result {
    SECTION.open(out, allergies.is_empty())?;

    if allergies.is_empty() {
        SECTION.write_empty_text(out, Some(NONE_REFERENCE))?;
        write_no_known_allergies(out, ctx)?;
        SECTION.close(out);
        return Ok(());
    }

    let mut table = NarrativeTable::begin(
        out,
        &["Allergen", "Type", "Reaction", "Severity", "Status", "Onset"],
    );
    for (i, allergy) in allergies.iter().enumerate() {
        table.row(
            &reference_id("allergy", i),
            &[
                &allergy.allergen,
                allergy.allergen_type.as_deref().unwrap_or_default(),
                allergy.reaction.as_deref().unwrap_or_default(),
                allergy.severity.as_deref().unwrap_or_default(),
                &allergy.status,
                &narrative_date(allergy.onset_date.as_ref()),
            ],
        )?;
    }
    table.end();

    for (i, allergy) in allergies.iter().enumerate() {
        write_entry(out, ctx, allergy, &reference_id("allergy", i))?;
    }

    SECTION.close(out);
    Ok(())
}

fn open_concern(out: &mut String) -> fmt::Result {
    out.push_str(r#"<entry typeCode="DRIV"><act classCode="ACT" moodCode="EVN">"#);
    ALLERGY_CONCERN_ACT.write(out)
}

fn write_entry(
    out: &mut String,
    ctx: &DocumentContext,
    allergy: &Allergy,
    reference: &str,
) -> fmt::Result {
    let onset = allergy.onset_date.as_ref();

    open_concern(out)?;
    write_record_id(out, ctx, &allergy.id)?;
    write!(
        out,
        r#"<code code="CONC" codeSystem="{ACT_CODE_OID}" displayName="Concern"/>"#
    )?;
    write!(
        out,
        r#"<statusCode code="{}"/>"#,
        concern_status(&allergy.status)
    )?;
    out.push_str("<effectiveTime>");
    write_time(out, "low", onset)?;
    out.push_str("</effectiveTime>");

    out.push_str(r#"<entryRelationship typeCode="SUBJ">"#);
    out.push_str(r#"<observation classCode="OBS" moodCode="EVN">"#);
    ALLERGY_INTOLERANCE_OBSERVATION.write(out)?;
    write_record_id(out, ctx, &format!("{}-observation", allergy.id))?;
    write!(
        out,
        r#"<code code="ASSERTION" codeSystem="{ACT_CODE_HL7_OID}"/>"#
    )?;
    write_text_reference(out, reference)?;
    out.push_str(r#"<statusCode code="completed"/>"#);
    out.push_str("<effectiveTime>");
    write_time(out, "low", onset)?;
    out.push_str("</effectiveTime>");
    write_allergy_type(out, allergy_type_code(allergy.allergen_type.as_deref()))?;

    let allergen = escape_xml(&allergy.allergen);
    out.push_str(r#"<participant typeCode="CSM"><participantRole classCode="MANU">"#);
    out.push_str(r#"<playingEntity classCode="MMAT">"#);
    write_code(out, "code", "", None, None, &allergy.allergen)?;
    write!(out, "<name>{allergen}</name>")?;
    out.push_str("</playingEntity></participantRole></participant>");

    if let Some(reaction) = allergy.reaction.as_deref().filter(|r| !r.trim().is_empty()) {
        let severity = allergy.severity.as_deref().filter(|s| !s.trim().is_empty());
        write_reaction(out, ctx, &allergy.id, reaction, severity)?;
    }

    out.push_str("</observation></entryRelationship>");
    out.push_str("</act></entry>");
    Ok(())
}

fn write_allergy_type(out: &mut String, kind: AllergyTypeCode) -> fmt::Result {
    write!(
        out,
        r#"<value xsi:type="CD" code="{}" displayName="{}" codeSystem="{}" codeSystemName="{}"/>"#,
        kind.code(),
        kind.display_name(),
        CodeSystem::SnomedCt.oid(),
        CodeSystem::SnomedCt.name()
    )
}

fn write_reaction(
    out: &mut String,
    ctx: &DocumentContext,
    allergy_id: &str,
    reaction: &str,
    severity: Option<&str>,
) -> fmt::Result {
    out.push_str(r#"<entryRelationship typeCode="MFST" inversionInd="true">"#);
    out.push_str(r#"<observation classCode="OBS" moodCode="EVN">"#);
    REACTION_OBSERVATION.write(out)?;
    write_record_id(out, ctx, &format!("{allergy_id}-reaction"))?;
    write!(
        out,
        r#"<code code="ASSERTION" codeSystem="{ACT_CODE_HL7_OID}"/>"#
    )?;
    write!(out, "<text>{}</text>", escape_xml(reaction))?;
    out.push_str(r#"<statusCode code="completed"/>"#);
    write_code(out, "value", r#" xsi:type="CD""#, None, None, reaction)?;
    if let Some(severity) = severity {
        write_severity(out, severity)?;
    }
    out.push_str("</observation></entryRelationship>");
    Ok(())
}

/// Severity Observation, only valid inside a Reaction Observation
fn write_severity(out: &mut String, severity: &str) -> fmt::Result {
    out.push_str(r#"<entryRelationship typeCode="SUBJ" inversionInd="true">"#);
    out.push_str(r#"<observation classCode="OBS" moodCode="EVN">"#);
    SEVERITY_OBSERVATION.write(out)?;
    write!(
        out,
        r#"<code code="SEV" codeSystem="{ACT_CODE_HL7_OID}" displayName="Severity Observation"/>"#
    )?;
    out.push_str(r#"<statusCode code="completed"/>"#);
    match severity_code(severity) {
        Some((code, display)) => write_code(
            out,
            "value",
            r#" xsi:type="CD""#,
            Some(code),
            Some(CodeSystem::SnomedCt),
            display,
        )?,
        None => write_code(out, "value", r#" xsi:type="CD""#, None, None, severity)?,
    }
    out.push_str("</observation></entryRelationship>");
    Ok(())
}

/// Negated allergy assertion stating that no allergies are known
fn write_no_known_allergies(out: &mut String, ctx: &DocumentContext) -> fmt::Result {
    open_concern(out)?;
    out.push_str(r#"<id nullFlavor="NI"/>"#);
    write!(
        out,
        r#"<code code="CONC" codeSystem="{ACT_CODE_OID}" displayName="Concern"/>"#
    )?;
    out.push_str(r#"<statusCode code="active"/>"#);
    out.push_str("<effectiveTime>");
    write_time(out, "low", Some(&ctx.effective_time))?;
    out.push_str("</effectiveTime>");

    out.push_str(r#"<entryRelationship typeCode="SUBJ">"#);
    out.push_str(r#"<observation classCode="OBS" moodCode="EVN" negationInd="true">"#);
    ALLERGY_INTOLERANCE_OBSERVATION.write(out)?;
    out.push_str(r#"<id nullFlavor="NI"/>"#);
    write!(
        out,
        r#"<code code="ASSERTION" codeSystem="{ACT_CODE_HL7_OID}"/>"#
    )?;
    write_text_reference(out, NONE_REFERENCE)?;
    out.push_str(r#"<statusCode code="completed"/>"#);
    out.push_str("<effectiveTime>");
    write_time::<NaiveDate>(out, "low", None)?;
    out.push_str("</effectiveTime>");
    write_allergy_type(out, AllergyTypeCode::Substance)?;
    out.push_str(r#"<participant typeCode="CSM"><participantRole classCode="MANU">"#);
    out.push_str(r#"<playingEntity classCode="MMAT"><code nullFlavor="NA"/></playingEntity>"#);
    out.push_str("</participantRole></participant>");
    out.push_str("</observation></entryRelationship>");
    out.push_str("</act></entry>");
    Ok(())
}
