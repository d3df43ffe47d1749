//! Procedures section

use super::{
    event_status, reference_id, write_record_id, write_text_reference, NarrativeTable, SectionSpec,
};
use crate::core::ccda::context::DocumentContext;
use crate::core::ccda::encoding::{
    narrative_date, resolve_code_system, write_code, write_time, CodeSystem,
};
use crate::core::ccda::templates::{PROCEDURES_SECTION, PROCEDURE_ACTIVITY};
use crate::domain::Procedure;
use std::fmt::{self, Write};

pub const SECTION: SectionSpec = SectionSpec {
    template: PROCEDURES_SECTION,
    code: "47519-4",
    code_display: "History of Procedures Document",
    title: "Procedures",
    empty_text: "No known procedures",
    null_flavor_when_empty: true,
};

pub fn render(procedures: &[Procedure], ctx: &DocumentContext, out: &mut String) -> fmt::Result {
    SECTION.open(out, procedures.is_empty())?;

    if procedures.is_empty() {
        SECTION.write_empty_text(out, None)?;
        SECTION.close(out);
        return Ok(());
    }

    let mut table = NarrativeTable::begin(out, &["Procedure", "Code", "Status", "Date"]);
    for (i, procedure) in procedures.iter().enumerate() {
        table.row(
            &reference_id("procedure", i),
            &[
                &procedure.name,
                procedure.code.as_deref().unwrap_or_default(),
                &procedure.status,
                &narrative_date(procedure.performed_at.as_ref()),
            ],
        )?;
    }
    table.end();

    for (i, procedure) in procedures.iter().enumerate() {
        out.push_str(r#"<entry typeCode="DRIV"><procedure classCode="PROC" moodCode="EVN">"#);
        PROCEDURE_ACTIVITY.write(out)?;
        write_record_id(out, ctx, &procedure.id)?;
        write_code(
            out,
            "code",
            "",
            procedure.code.as_deref(),
            resolve_code_system(procedure.code_system.as_deref(), CodeSystem::Cpt),
            &procedure.name,
        )?;
        write_text_reference(out, &reference_id("procedure", i))?;
        write!(
            out,
            r#"<statusCode code="{}"/>"#,
            event_status(&procedure.status)
        )?;
        write_time(out, "effectiveTime", procedure.performed_at.as_ref())?;
        out.push_str("</procedure></entry>");
    }

    SECTION.close(out);
    Ok(())
}
