//! CDA header: document identity, record target, author, custodian

use super::context::DocumentContext;
use super::encoding::{escape_xml, gender_code, write_interval, write_time, ADMINISTRATIVE_GENDER_OID};
use super::templates::{CCD_DOCUMENT, US_REALM_HEADER};
use crate::domain::{PatientProfile, PatientRecord};
use std::fmt::{self, Write};

/// HL7 CDA R2 `typeId` root
const CDA_TYPE_ID_ROOT: &str = "2.16.840.1.113883.1.3";
const CONFIDENTIALITY_OID: &str = "2.16.840.1.113883.5.25";

/// Writes everything between `<ClinicalDocument>` and its `<component>`
pub fn render(record: &PatientRecord, ctx: &DocumentContext, out: &mut String) -> fmt::Result {
    out.push_str(r#"<realmCode code="US"/>"#);
    write!(
        out,
        r#"<typeId root="{CDA_TYPE_ID_ROOT}" extension="POCD_HD000040"/>"#
    )?;
    US_REALM_HEADER.write(out)?;
    CCD_DOCUMENT.write(out)?;
    write!(out, r#"<id root="{}"/>"#, ctx.document_id)?;
    out.push_str(
        r#"<code code="34133-9" codeSystem="2.16.840.1.113883.6.1" codeSystemName="LOINC" displayName="Summarization of Episode Note"/>"#,
    );
    write!(out, "<title>{}</title>", escape_xml(&ctx.title))?;
    write_time(out, "effectiveTime", Some(&ctx.effective_time))?;
    write!(
        out,
        r#"<confidentialityCode code="N" codeSystem="{CONFIDENTIALITY_OID}"/>"#
    )?;
    write!(
        out,
        r#"<languageCode code="{}"/>"#,
        escape_xml(&ctx.language_code)
    )?;

    write_record_target(out, &record.profile, ctx)?;
    write_author(out, ctx)?;
    write_custodian(out, ctx)?;
    write_documentation_of(out, record)
}

fn write_record_target(
    out: &mut String,
    profile: &PatientProfile,
    ctx: &DocumentContext,
) -> fmt::Result {
    let org_oid = escape_xml(&ctx.organization_oid);

    out.push_str("<recordTarget><patientRole>");
    write!(
        out,
        r#"<id root="{org_oid}" extension="{}"/>"#,
        escape_xml(profile.id.as_str())
    )?;
    if let Some(mrn) = non_blank(profile.mrn.as_deref()) {
        write!(
            out,
            r#"<id root="{org_oid}.1" extension="{}" assigningAuthorityName="MRN"/>"#,
            escape_xml(mrn)
        )?;
    }

    write_address(out, profile)?;
    write_telecoms(out, profile)?;

    let gender = gender_code(profile.gender.as_deref());
    out.push_str("<patient>");
    write!(
        out,
        r#"<name use="L"><given>{}</given><family>{}</family></name>"#,
        escape_xml(profile.first_name.trim()),
        escape_xml(profile.last_name.trim())
    )?;
    write!(
        out,
        r#"<administrativeGenderCode code="{}" codeSystem="{ADMINISTRATIVE_GENDER_OID}" displayName="{}"/>"#,
        gender.code(),
        gender.display_name()
    )?;
    write_time(out, "birthTime", profile.date_of_birth.as_ref())?;
    out.push_str("</patient>");

    out.push_str("</patientRole></recordTarget>");
    Ok(())
}

fn write_address(out: &mut String, profile: &PatientProfile) -> fmt::Result {
    if !profile.has_address() {
        out.push_str(r#"<addr nullFlavor="NI"/>"#);
        return Ok(());
    }

    out.push_str(r#"<addr use="HP">"#);
    let parts = [
        ("streetAddressLine", &profile.address_line),
        ("city", &profile.city),
        ("state", &profile.state),
        ("postalCode", &profile.postal_code),
        ("country", &profile.country),
    ];
    for (tag, value) in parts {
        if let Some(value) = non_blank(value.as_deref()) {
            write!(out, "<{tag}>{}</{tag}>", escape_xml(value))?;
        }
    }
    out.push_str("</addr>");
    Ok(())
}

fn write_telecoms(out: &mut String, profile: &PatientProfile) -> fmt::Result {
    let phone = non_blank(profile.phone.as_deref());
    let email = non_blank(profile.email.as_deref());

    if phone.is_none() && email.is_none() {
        out.push_str(r#"<telecom nullFlavor="NI"/>"#);
        return Ok(());
    }
    if let Some(phone) = phone {
        write!(out, r#"<telecom use="HP" value="tel:{}"/>"#, escape_xml(phone))?;
    }
    if let Some(email) = email {
        write!(out, r#"<telecom value="mailto:{}"/>"#, escape_xml(email))?;
    }
    Ok(())
}

fn write_author(out: &mut String, ctx: &DocumentContext) -> fmt::Result {
    let org_oid = escape_xml(&ctx.organization_oid);
    let org_name = escape_xml(&ctx.organization_name);
    let software = escape_xml(&ctx.software_name);

    out.push_str("<author>");
    write_time(out, "time", Some(&ctx.effective_time))?;
    out.push_str("<assignedAuthor>");
    write!(out, r#"<id root="{org_oid}"/>"#)?;
    out.push_str(r#"<addr nullFlavor="NI"/><telecom nullFlavor="NI"/>"#);
    write!(
        out,
        "<assignedAuthoringDevice><manufacturerModelName>{software}</manufacturerModelName>\
         <softwareName>{software} {}</softwareName></assignedAuthoringDevice>",
        env!("CARGO_PKG_VERSION")
    )?;
    write!(
        out,
        r#"<representedOrganization><id root="{org_oid}"/><name>{org_name}</name></representedOrganization>"#
    )?;
    out.push_str("</assignedAuthor></author>");
    Ok(())
}

fn write_custodian(out: &mut String, ctx: &DocumentContext) -> fmt::Result {
    write!(
        out,
        r#"<custodian><assignedCustodian><representedCustodianOrganization><id root="{}"/><name>{}</name><telecom nullFlavor="NI"/><addr nullFlavor="NI"/></representedCustodianOrganization></assignedCustodian></custodian>"#,
        escape_xml(&ctx.organization_oid),
        escape_xml(&ctx.organization_name)
    )
}

/// Service event spanning the earliest and latest clinical dates in the record
fn write_documentation_of(out: &mut String, record: &PatientRecord) -> fmt::Result {
    out.push_str(r#"<documentationOf><serviceEvent classCode="PCPR">"#);
    match record.clinical_date_range() {
        Some((low, high)) => write_interval(out, "", Some(&low), Some(&high))?,
        None => write_interval::<chrono::NaiveDateTime>(out, "", None, None)?,
    }
    out.push_str("</serviceEvent></documentationOf>");
    Ok(())
}

fn non_blank(value: Option<&str>) -> Option<&str> {
    value.map(str::trim).filter(|v| !v.is_empty())
}
