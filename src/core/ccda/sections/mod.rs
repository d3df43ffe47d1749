//! CCD section generators
//!
//! Each submodule exposes a `render` function that appends exactly one
//! `<component><section>...</section></component>` to the output buffer.
//! The generators are pure: they read records and the document context and
//! never fail other than through [`std::fmt::Error`].
//!
//! A section always carries a human-readable `<text>` block. With records
//! present it is a table whose first cell per row has an `ID` that the
//! structured entry points back to; without records it is a single
//! paragraph with the section's fallback text.

pub mod allergies;
pub mod immunizations;
pub mod medications;
pub mod plan_of_care;
pub mod problems;
pub mod procedures;
pub mod results;
pub mod vital_signs;

use super::context::DocumentContext;
use super::encoding::{escape_xml, status_code, CodeSystem};
use super::templates::Template;
use std::fmt::{self, Write};

/// Static description of one CCD section
#[derive(Debug, Clone, Copy)]
pub struct SectionSpec {
    pub template: Template,
    /// LOINC section code
    pub code: &'static str,
    pub code_display: &'static str,
    pub title: &'static str,
    /// Paragraph rendered when the section has no records
    pub empty_text: &'static str,
    /// Whether an empty section is flagged with `nullFlavor="NI"`
    pub null_flavor_when_empty: bool,
}

impl SectionSpec {
    /// Writes `<component><section>` through `<title>`
    pub(crate) fn open(&self, out: &mut String, empty: bool) -> fmt::Result {
        out.push_str("<component>");
        if empty && self.null_flavor_when_empty {
            out.push_str(r#"<section nullFlavor="NI">"#);
        } else {
            out.push_str("<section>");
        }
        self.template.write(out)?;
        write!(
            out,
            r#"<code code="{}" codeSystem="{}" codeSystemName="{}" displayName="{}"/>"#,
            self.code,
            CodeSystem::Loinc.oid(),
            CodeSystem::Loinc.name(),
            self.code_display
        )?;
        write!(out, "<title>{}</title>", self.title)
    }

    /// Writes the fallback narrative, optionally with an `ID` for entries to reference
    pub(crate) fn write_empty_text(&self, out: &mut String, id: Option<&str>) -> fmt::Result {
        match id {
            Some(id) => write!(
                out,
                r#"<text><paragraph ID="{id}">{}</paragraph></text>"#,
                self.empty_text
            ),
            None => write!(out, "<text><paragraph>{}</paragraph></text>", self.empty_text),
        }
    }

    pub(crate) fn close(&self, out: &mut String) {
        out.push_str("</section></component>");
    }
}

/// Narrative table writer
///
/// Cells are escaped on the way in; the first cell of every row is tagged
/// with the caller-supplied reference ID.
pub(crate) struct NarrativeTable<'a> {
    out: &'a mut String,
}

impl<'a> NarrativeTable<'a> {
    pub(crate) fn begin(out: &'a mut String, headers: &[&str]) -> Self {
        out.push_str(r#"<text><table border="1" width="100%"><thead><tr>"#);
        for header in headers {
            out.push_str("<th>");
            out.push_str(header);
            out.push_str("</th>");
        }
        out.push_str("</tr></thead><tbody>");
        Self { out }
    }

    pub(crate) fn row(&mut self, id: &str, cells: &[&str]) -> fmt::Result {
        self.out.push_str("<tr>");
        for (i, cell) in cells.iter().enumerate() {
            if i == 0 {
                write!(self.out, r#"<td ID="{id}">{}</td>"#, escape_xml(cell))?;
            } else {
                write!(self.out, "<td>{}</td>", escape_xml(cell))?;
            }
        }
        self.out.push_str("</tr>");
        Ok(())
    }

    pub(crate) fn end(self) {
        self.out.push_str("</tbody></table></text>");
    }
}

/// Narrative reference ID for the `index`-th record (1-based) of a section
pub(crate) fn reference_id(prefix: &str, index: usize) -> String {
    format!("{prefix}-{}", index + 1)
}

/// `<id root="{organization OID}" extension="{record id}"/>`
pub(crate) fn write_record_id(out: &mut String, ctx: &DocumentContext, id: &str) -> fmt::Result {
    write!(
        out,
        r#"<id root="{}" extension="{}"/>"#,
        escape_xml(&ctx.organization_oid),
        escape_xml(id)
    )
}

/// `<id root="{document id}" extension="{kind}-{n}"/>`
///
/// For entries assembled at render time, like organizers, which have no
/// database ID of their own.
pub(crate) fn write_derived_id(
    out: &mut String,
    ctx: &DocumentContext,
    kind: &str,
    index: usize,
) -> fmt::Result {
    write!(
        out,
        r#"<id root="{}" extension="{}"/>"#,
        ctx.document_id,
        reference_id(kind, index)
    )
}

/// `<text><reference value="#id"/></text>`
pub(crate) fn write_text_reference(out: &mut String, id: &str) -> fmt::Result {
    write!(out, r##"<text><reference value="#{id}"/></text>"##)
}

/// Writes an observation `value`: physical quantity when numeric, string otherwise
///
/// Numeric values without a unit get the UCUM unity unit `1`.
pub(crate) fn write_measurement(out: &mut String, value: &str, unit: Option<&str>) -> fmt::Result {
    let trimmed = value.trim();
    let numeric = trimmed.parse::<f64>().is_ok_and(f64::is_finite);

    if numeric {
        let unit = unit.map(str::trim).filter(|u| !u.is_empty()).unwrap_or("1");
        write!(
            out,
            r#"<value xsi:type="PQ" value="{}" unit="{}"/>"#,
            escape_xml(trimmed),
            escape_xml(unit)
        )
    } else if trimmed.is_empty() {
        out.push_str(r#"<value xsi:type="ST" nullFlavor="NI"/>"#);
        Ok(())
    } else {
        write!(out, r#"<value xsi:type="ST">{}</value>"#, escape_xml(trimmed))
    }
}

/// Status of a concern act, which is either still active or finished
pub(crate) fn concern_status(status: &str) -> &'static str {
    match status_code(status) {
        "active" => "active",
        _ => "completed",
    }
}

/// Status of an event-mood entry; planned states read as active
pub(crate) fn event_status(status: &str) -> &'static str {
    match status_code(status) {
        "new" => "active",
        other => other,
    }
}

/// Joins a value and its unit for the narrative
pub(crate) fn with_unit(value: &str, unit: Option<&str>) -> String {
    match unit.map(str::trim).filter(|u| !u.is_empty()) {
        Some(unit) => format!("{} {unit}", value.trim()),
        None => value.trim().to_string(),
    }
}

#[cfg(test)]
pub(crate) mod test_support {
    use super::*;
    use crate::config::DocumentConfig;
    use chrono::{TimeZone, Utc};
    use uuid::Uuid;

    pub(crate) fn context() -> DocumentContext {
        DocumentContext::with_identity(
            &DocumentConfig::default(),
            Uuid::nil(),
            Utc.with_ymd_and_hms(2025, 6, 1, 12, 0, 0).unwrap(),
        )
    }

    /// Counts non-overlapping occurrences of `needle`
    pub(crate) fn count(haystack: &str, needle: &str) -> usize {
        haystack.matches(needle).count()
    }
}
