//! Plan of Treatment section

use super::{reference_id, write_record_id, write_text_reference, NarrativeTable, SectionSpec};
use crate::core::ccda::context::DocumentContext;
use crate::core::ccda::encoding::{escape_xml, narrative_date, write_code, write_interval, CodeSystem};
use crate::core::ccda::templates::{GOAL_OBSERVATION, PLANNED_ACT, PLAN_OF_TREATMENT_SECTION};
use crate::domain::CarePlan;
use std::fmt::{self, Write};

pub const SECTION: SectionSpec = SectionSpec {
    template: PLAN_OF_TREATMENT_SECTION,
    code: "18776-5",
    code_display: "Plan of care note",
    title: "Plan of Treatment",
    empty_text: "No care plan recorded",
    null_flavor_when_empty: false,
};

pub fn render(plans: &[CarePlan], ctx: &DocumentContext, out: &mut String) -> fmt::Result {
    SECTION.open(out, plans.is_empty())?;

    if plans.is_empty() {
        SECTION.write_empty_text(out, None)?;
        SECTION.close(out);
        return Ok(());
    }

    let mut table = NarrativeTable::begin(
        out,
        &["Plan", "Description", "Goal", "Status", "Start", "End"],
    );
    for (i, plan) in plans.iter().enumerate() {
        table.row(
            &reference_id("plan", i),
            &[
                &plan.title,
                plan.description.as_deref().unwrap_or_default(),
                plan.goal.as_deref().unwrap_or_default(),
                &plan.status,
                &narrative_date(plan.start_date.as_ref()),
                &narrative_date(plan.end_date.as_ref()),
            ],
        )?;
    }
    table.end();

    for (i, plan) in plans.iter().enumerate() {
        // Planned acts are always "active" regardless of the stored status.
        out.push_str(r#"<entry><act classCode="ACT" moodCode="INT">"#);
        PLANNED_ACT.write(out)?;
        write_record_id(out, ctx, &plan.id)?;
        write_code(out, "code", "", None, None, &plan.title)?;
        write_text_reference(out, &reference_id("plan", i))?;
        out.push_str(r#"<statusCode code="active"/>"#);
        write_interval(out, "", plan.start_date.as_ref(), plan.end_date.as_ref())?;

        if let Some(goal) = plan.goal.as_deref().filter(|g| !g.trim().is_empty()) {
            out.push_str(r#"<entryRelationship typeCode="COMP">"#);
            out.push_str(r#"<observation classCode="OBS" moodCode="GOL">"#);
            GOAL_OBSERVATION.write(out)?;
            write_record_id(out, ctx, &format!("{}-goal", plan.id))?;
            write!(
                out,
                r#"<code code="58144-7" codeSystem="{}" codeSystemName="{}" displayName="Resident's overall goal established during assessment process"/>"#,
                CodeSystem::Loinc.oid(),
                CodeSystem::Loinc.name()
            )?;
            out.push_str(r#"<statusCode code="active"/>"#);
            write!(out, r#"<value xsi:type="ST">{}</value>"#, escape_xml(goal.trim()))?;
            out.push_str("</observation></entryRelationship>");
        }

        out.push_str("</act></entry>");
    }

    SECTION.close(out);
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::ccda::sections::test_support::context;
    use chrono::NaiveDate;

    fn plan() -> CarePlan {
        CarePlan {
            id: "cp1".into(),
            title: "Diabetes management".into(),
            description: Some("Diet & exercise".into()),
            goal: Some("HbA1c < 7%".into()),
            status: "active".into(),
            start_date: NaiveDate::from_ymd_opt(2024, 1, 15),
            end_date: None,
        }
    }

    #[test]
    fn test_empty_plan_fallback_without_null_flavor() {
        let mut out = String::new();
        render(&[], &context(), &mut out).unwrap();
        assert!(out.contains("<paragraph>No care plan recorded</paragraph>"));
        assert!(out.starts_with("<component><section>"));
    }

    #[test]
    fn test_planned_act_with_goal() {
        let mut out = String::new();
        render(&[plan()], &context(), &mut out).unwrap();

        assert!(out.contains(r#"<act classCode="ACT" moodCode="INT">"#));
        assert!(out.contains(r#"moodCode="GOL""#));
        assert!(out.contains("HbA1c &lt; 7%"));
        assert!(out.contains("<td>Diet &amp; exercise</td>"));
        assert!(out.contains(r#"<low value="20240115000000"/>"#));
    }

    #[test]
    fn test_plan_without_goal() {
        let mut p = plan();
        p.goal = None;
        let mut out = String::new();
        render(&[p], &context(), &mut out).unwrap();
        assert!(!out.contains("GOL"));
    }
}
