//! Problems section

use super::{
    concern_status, reference_id, write_record_id, write_text_reference, NarrativeTable,
    SectionSpec,
};
use crate::core::ccda::context::DocumentContext;
use crate::core::ccda::encoding::{
    narrative_date, resolve_code_system, write_code, write_interval, CodeSystem,
};
use crate::core::ccda::templates::{PROBLEMS_SECTION, PROBLEM_CONCERN_ACT, PROBLEM_OBSERVATION};
use crate::domain::Condition;
use std::fmt::{self, Write};

pub const SECTION: SectionSpec = SectionSpec {
    template: PROBLEMS_SECTION,
    code: "11450-4",
    code_display: "Problem list - Reported",
    title: "Problems",
    empty_text: "No known problems",
    null_flavor_when_empty: true,
};

pub fn render(conditions: &[Condition], ctx: &DocumentContext, out: &mut String) -> fmt::Result {
    SECTION.open(out, conditions.is_empty())?;

    if conditions.is_empty() {
        SECTION.write_empty_text(out, None)?;
        SECTION.close(out);
        return Ok(());
    }

    let mut table = NarrativeTable::begin(out, &["Problem", "Code", "Status", "Onset", "Resolved"]);
    for (i, condition) in conditions.iter().enumerate() {
        table.row(
            &reference_id("problem", i),
            &[
                &condition.name,
                condition.code.as_deref().unwrap_or_default(),
                &condition.status,
                &narrative_date(condition.onset_date.as_ref()),
                &narrative_date(condition.resolved_date.as_ref()),
            ],
        )?;
    }
    table.end();

    for (i, condition) in conditions.iter().enumerate() {
        write_entry(out, ctx, condition, &reference_id("problem", i))?;
    }

    SECTION.close(out);
    Ok(())
}

fn write_entry(
    out: &mut String,
    ctx: &DocumentContext,
    condition: &Condition,
    reference: &str,
) -> fmt::Result {
    let onset = condition.onset_date.as_ref();
    let resolved = condition.resolved_date.as_ref();

    out.push_str(r#"<entry typeCode="DRIV"><act classCode="ACT" moodCode="EVN">"#);
    PROBLEM_CONCERN_ACT.write(out)?;
    write_record_id(out, ctx, &condition.id)?;
    out.push_str(
        r#"<code code="CONC" codeSystem="2.16.840.1.113883.5.6" displayName="Concern"/>"#,
    );
    write!(
        out,
        r#"<statusCode code="{}"/>"#,
        concern_status(&condition.status)
    )?;
    write_interval(out, "", onset, resolved)?;

    out.push_str(r#"<entryRelationship typeCode="SUBJ">"#);
    out.push_str(r#"<observation classCode="OBS" moodCode="EVN">"#);
    PROBLEM_OBSERVATION.write(out)?;
    write_record_id(out, ctx, &format!("{}-observation", condition.id))?;
    write!(
        out,
        r#"<code code="55607006" codeSystem="{}" codeSystemName="{}" displayName="Problem"/>"#,
        CodeSystem::SnomedCt.oid(),
        CodeSystem::SnomedCt.name()
    )?;
    write_text_reference(out, reference)?;
    out.push_str(r#"<statusCode code="completed"/>"#);
    write_interval(out, "", onset, resolved)?;
    write_code(
        out,
        "value",
        r#" xsi:type="CD""#,
        condition.code.as_deref(),
        resolve_code_system(condition.code_system.as_deref(), CodeSystem::Icd10Cm),
        &condition.name,
    )?;
    out.push_str("</observation></entryRelationship>");

    out.push_str("</act></entry>");
    Ok(())
}
