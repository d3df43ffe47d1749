//! Vital Signs section
//!
//! Measurements taken at the same instant are grouped into one Vital Signs
//! Organizer. Organizers are emitted in chronological order with undated
//! measurements first.

use super::{
    reference_id, with_unit, write_derived_id, write_measurement, write_record_id,
    write_text_reference, NarrativeTable, SectionSpec,
};
use crate::core::ccda::context::DocumentContext;
use crate::core::ccda::encoding::{narrative_date, write_code, write_time, CodeSystem};
use crate::core::ccda::templates::{
    VITAL_SIGNS_ORGANIZER, VITAL_SIGNS_SECTION, VITAL_SIGN_OBSERVATION,
};
use crate::domain::VitalSign;
use chrono::{DateTime, Utc};
use std::collections::BTreeMap;
use std::fmt::{self, Write};

pub const SECTION: SectionSpec = SectionSpec {
    template: VITAL_SIGNS_SECTION,
    code: "8716-3",
    code_display: "Vital signs",
    title: "Vital Signs",
    empty_text: "No vital signs recorded",
    null_flavor_when_empty: true,
};

/// LOINC code for a vital sign kind when the record carries none
///
/// Matching ignores case, spaces, hyphens and underscores, so
/// "Blood Pressure Systolic" and "blood_pressure_systolic" are equivalent.
pub fn loinc_for_kind(kind: &str) -> Option<&'static str> {
    let key: String = kind
        .chars()
        .filter(|c| c.is_ascii_alphanumeric())
        .collect::<String>()
        .to_ascii_lowercase();

    let code = match key.as_str() {
        "heartrate" | "pulse" | "hr" => "8867-4",
        "respiratoryrate" | "respirations" | "rr" => "9279-1",
        "temperature" | "bodytemperature" | "temp" => "8310-5",
        "systolic" | "bloodpressuresystolic" | "systolicbloodpressure" | "sbp" => "8480-6",
        "diastolic" | "bloodpressurediastolic" | "diastolicbloodpressure" | "dbp" => "8462-4",
        "height" | "bodyheight" => "8302-2",
        "weight" | "bodyweight" => "29463-7",
        "bmi" | "bodymassindex" => "39156-5",
        "oxygensaturation" | "spo2" | "o2sat" | "pulseoximetry" => "59408-5",
        "headcircumference" | "headoccipitalfrontalcircumference" => "9843-4",
        _ => return None,
    };
    Some(code)
}

pub fn render(vitals: &[VitalSign], ctx: &DocumentContext, out: &mut String) -> fmt::Result {
    SECTION.open(out, vitals.is_empty())?;

    if vitals.is_empty() {
        SECTION.write_empty_text(out, None)?;
        SECTION.close(out);
        return Ok(());
    }

    let mut table = NarrativeTable::begin(out, &["Measurement", "Value", "Date"]);
    for (i, vital) in vitals.iter().enumerate() {
        table.row(
            &reference_id("vital", i),
            &[
                &vital.kind,
                &with_unit(&vital.value, vital.unit.as_deref()),
                &narrative_date(vital.measured_at.as_ref()),
            ],
        )?;
    }
    table.end();

    let mut groups: BTreeMap<Option<DateTime<Utc>>, Vec<usize>> = BTreeMap::new();
    for (i, vital) in vitals.iter().enumerate() {
        groups.entry(vital.measured_at).or_default().push(i);
    }

    for (group, (measured_at, members)) in groups.iter().enumerate() {
        out.push_str(r#"<entry typeCode="DRIV"><organizer classCode="CLUSTER" moodCode="EVN">"#);
        VITAL_SIGNS_ORGANIZER.write(out)?;
        write_derived_id(out, ctx, "vitals", group)?;
        write!(
            out,
            r#"<code code="46680005" codeSystem="{}" codeSystemName="{}" displayName="Vital Signs">"#,
            CodeSystem::SnomedCt.oid(),
            CodeSystem::SnomedCt.name()
        )?;
        write!(
            out,
            r#"<translation code="74728-7" codeSystem="{}" codeSystemName="{}" displayName="Vital signs panel"/>"#,
            CodeSystem::Loinc.oid(),
            CodeSystem::Loinc.name()
        )?;
        out.push_str("</code>");
        out.push_str(r#"<statusCode code="completed"/>"#);
        write_time(out, "effectiveTime", measured_at.as_ref())?;

        for &i in members {
            write_observation(out, ctx, &vitals[i], &reference_id("vital", i))?;
        }

        out.push_str("</organizer></entry>");
    }

    SECTION.close(out);
    Ok(())
}

fn write_observation(
    out: &mut String,
    ctx: &DocumentContext,
    vital: &VitalSign,
    reference: &str,
) -> fmt::Result {
    let loinc = vital
        .loinc_code
        .as_deref()
        .filter(|c| !c.trim().is_empty())
        .or_else(|| loinc_for_kind(&vital.kind));

    out.push_str(r#"<component><observation classCode="OBS" moodCode="EVN">"#);
    VITAL_SIGN_OBSERVATION.write(out)?;
    write_record_id(out, ctx, &vital.id)?;
    write_code(out, "code", "", loinc, Some(CodeSystem::Loinc), &vital.kind)?;
    write_text_reference(out, reference)?;
    out.push_str(r#"<statusCode code="completed"/>"#);
    write_time(out, "effectiveTime", vital.measured_at.as_ref())?;
    write_measurement(out, &vital.value, vital.unit.as_deref())?;
    out.push_str("</observation></component>");
    Ok(())
}
