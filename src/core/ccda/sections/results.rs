//! Results section
//!
//! Lab results collected at the same instant share one Result Organizer.

use super::{
    event_status, reference_id, with_unit, write_derived_id, write_measurement, write_record_id,
    write_text_reference, NarrativeTable, SectionSpec,
};
use crate::core::ccda::context::DocumentContext;
use crate::core::ccda::encoding::{
    escape_xml, interpretation_code, narrative_date, write_code, write_time, CodeSystem,
    OBSERVATION_INTERPRETATION_OID,
};
use crate::core::ccda::templates::{RESULTS_SECTION, RESULT_OBSERVATION, RESULT_ORGANIZER};
use crate::domain::LabResult;
use chrono::{DateTime, Utc};
use std::collections::BTreeMap;
use std::fmt::{self, Write};

pub const SECTION: SectionSpec = SectionSpec {
    template: RESULTS_SECTION,
    code: "30954-2",
    code_display: "Relevant diagnostic tests/laboratory data Narrative",
    title: "Results",
    empty_text: "No lab results recorded",
    null_flavor_when_empty: true,
};

pub fn render(results: &[LabResult], ctx: &DocumentContext, out: &mut String) -> fmt::Result {
    SECTION.open(out, results.is_empty())?;

    if results.is_empty() {
        SECTION.write_empty_text(out, None)?;
        SECTION.close(out);
        return Ok(());
    }

    let mut table = NarrativeTable::begin(
        out,
        &["Test", "Value", "Reference range", "Interpretation", "Status", "Date"],
    );
    for (i, result) in results.iter().enumerate() {
        let value = result
            .value
            .as_deref()
            .map(|v| with_unit(v, result.unit.as_deref()))
            .unwrap_or_default();
        table.row(
            &reference_id("result", i),
            &[
                &result.test_name,
                &value,
                result.reference_range.as_deref().unwrap_or_default(),
                result.interpretation.as_deref().unwrap_or_default(),
                &result.status,
                &narrative_date(result.collected_at.as_ref()),
            ],
        )?;
    }
    table.end();

    let mut panels: BTreeMap<Option<DateTime<Utc>>, Vec<usize>> = BTreeMap::new();
    for (i, result) in results.iter().enumerate() {
        panels.entry(result.collected_at).or_default().push(i);
    }

    for (panel, (collected_at, members)) in panels.iter().enumerate() {
        out.push_str(r#"<entry typeCode="DRIV"><organizer classCode="CLUSTER" moodCode="EVN">"#);
        RESULT_ORGANIZER.write(out)?;
        write_derived_id(out, ctx, "results", panel)?;
        write!(
            out,
            r#"<code code="26436-6" codeSystem="{}" codeSystemName="{}" displayName="Laboratory studies (set)"/>"#,
            CodeSystem::Loinc.oid(),
            CodeSystem::Loinc.name()
        )?;
        out.push_str(r#"<statusCode code="completed"/>"#);
        write_time(out, "effectiveTime", collected_at.as_ref())?;

        for &i in members {
            write_observation(out, ctx, &results[i], &reference_id("result", i))?;
        }

        out.push_str("</organizer></entry>");
    }

    SECTION.close(out);
    Ok(())
}

fn write_observation(
    out: &mut String,
    ctx: &DocumentContext,
    result: &LabResult,
    reference: &str,
) -> fmt::Result {
    out.push_str(r#"<component><observation classCode="OBS" moodCode="EVN">"#);
    RESULT_OBSERVATION.write(out)?;
    write_record_id(out, ctx, &result.id)?;
    write_code(
        out,
        "code",
        "",
        result.loinc_code.as_deref(),
        Some(CodeSystem::Loinc),
        &result.test_name,
    )?;
    write_text_reference(out, reference)?;
    write!(
        out,
        r#"<statusCode code="{}"/>"#,
        event_status(&result.status)
    )?;
    write_time(out, "effectiveTime", result.collected_at.as_ref())?;
    write_measurement(
        out,
        result.value.as_deref().unwrap_or_default(),
        result.unit.as_deref(),
    )?;

    if let Some((code, display)) = result.interpretation.as_deref().and_then(interpretation_code) {
        write!(
            out,
            r#"<interpretationCode code="{code}" codeSystem="{OBSERVATION_INTERPRETATION_OID}" displayName="{display}"/>"#
        )?;
    }

    if let Some(range) = result
        .reference_range
        .as_deref()
        .filter(|r| !r.trim().is_empty())
    {
        write!(
            out,
            "<referenceRange><observationRange><text>{}</text></observationRange></referenceRange>",
            escape_xml(range.trim())
        )?;
    }

    out.push_str("</observation></component>");
    Ok(())
}
