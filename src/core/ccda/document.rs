//! Full CCD assembly

use super::context::DocumentContext;
use super::{header, sections};
use crate::domain::{PatientRecord, Result};

const XML_DECLARATION: &str = r#"<?xml version="1.0" encoding="UTF-8"?>"#;
const ROOT_OPEN: &str = r#"<ClinicalDocument xmlns="urn:hl7-org:v3" xmlns:xsi="http://www.w3.org/2001/XMLSchema-instance" xmlns:sdtc="urn:hl7-org:sdtc">"#;

/// Renders a complete CCD for one patient
///
/// Sections always appear in the same order: allergies, medications,
/// problems, procedures, immunizations, vital signs, results, plan of
/// treatment. Every section is present even when it has no records.
///
/// # Errors
///
/// Returns [`ExportError::Render`](crate::domain::ExportError::Render) if
/// writing to the buffer fails.
///
/// # Examples
///
/// ```
/// use ccda_export::config::DocumentConfig;
/// use ccda_export::core::ccda::{render_document, DocumentContext};
/// use ccda_export::domain::{PatientId, PatientProfile, PatientRecord, TenantId};
///
/// # fn main() -> Result<(), Box<dyn std::error::Error>> {
/// let profile = PatientProfile::new(
///     PatientId::new("p-1")?,
///     TenantId::new("clinic-a")?,
///     "Ada",
///     "Lovelace",
/// );
/// let ctx = DocumentContext::new(&DocumentConfig::default());
/// let xml = render_document(&PatientRecord::new(profile), &ctx)?;
///
/// assert!(xml.starts_with("<?xml"));
/// assert!(xml.contains("No known allergies"));
/// # Ok(())
/// # }
/// ```
pub fn render_document(record: &PatientRecord, ctx: &DocumentContext) -> Result<String> {
    let mut out = String::with_capacity(estimate_capacity(record));

    out.push_str(XML_DECLARATION);
    out.push_str(ROOT_OPEN);
    header::render(record, ctx, &mut out)?;

    out.push_str("<component><structuredBody>");
    sections::allergies::render(&record.allergies, ctx, &mut out)?;
    sections::medications::render(&record.medications, ctx, &mut out)?;
    sections::problems::render(&record.conditions, ctx, &mut out)?;
    sections::procedures::render(&record.procedures, ctx, &mut out)?;
    sections::immunizations::render(&record.immunizations, ctx, &mut out)?;
    sections::vital_signs::render(&record.vitals, ctx, &mut out)?;
    sections::results::render(&record.lab_results, ctx, &mut out)?;
    sections::plan_of_care::render(&record.care_plans, ctx, &mut out)?;
    out.push_str("</structuredBody></component>");

    out.push_str("</ClinicalDocument>");
    Ok(out)
}

/// Rough output size so the buffer rarely reallocates
fn estimate_capacity(record: &PatientRecord) -> usize {
    8 * 1024 + record.section_counts().total() * 2 * 1024
}
