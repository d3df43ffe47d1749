//! Encoding helpers shared by the header and section generators
//!
//! Everything that turns a domain value into CDA text lives here: XML
//! escaping, HL7 timestamps, and the code-system and value-set mappings.

use chrono::{DateTime, Datelike, NaiveDate, NaiveDateTime, Utc};
use std::borrow::Cow;
use std::fmt::{self, Write};
use std::str::FromStr;

/// Characters allowed by the XML 1.0 `Char` production
fn is_xml_char(c: char) -> bool {
    matches!(c, '\t' | '\n' | '\r') || (c >= ' ' && c != '\u{FFFE}' && c != '\u{FFFF}')
}

/// Escapes text for use in XML element content or attribute values
///
/// Escapes `&`, `<`, `>`, `"` and `'`. Characters that XML 1.0 cannot
/// represent at all (most C0 controls) are dropped.
///
/// # Examples
///
/// ```
/// use ccda_export::core::ccda::encoding::escape_xml;
///
/// assert_eq!(escape_xml("Tom & Jerry's <b>"), "Tom &amp; Jerry&apos;s &lt;b&gt;");
/// ```
pub fn escape_xml(text: &str) -> Cow<'_, str> {
    if text.chars().all(is_xml_char) {
        return quick_xml::escape::escape(text);
    }

    let cleaned: String = text.chars().filter(|c| is_xml_char(*c)).collect();
    Cow::Owned(quick_xml::escape::escape(cleaned.as_str()).into_owned())
}

/// A value that can be rendered as an HL7 `YYYYMMDDHHMMSS` timestamp
pub trait Hl7Time {
    /// Renders the value, or `None` if it falls outside years 0000-9999
    fn to_hl7(&self) -> Option<String>;
}

impl Hl7Time for NaiveDate {
    fn to_hl7(&self) -> Option<String> {
        (0..=9999)
            .contains(&self.year())
            .then(|| self.format("%Y%m%d000000").to_string())
    }
}

impl Hl7Time for NaiveDateTime {
    fn to_hl7(&self) -> Option<String> {
        (0..=9999)
            .contains(&self.year())
            .then(|| self.format("%Y%m%d%H%M%S").to_string())
    }
}

impl Hl7Time for DateTime<Utc> {
    fn to_hl7(&self) -> Option<String> {
        self.naive_utc().to_hl7()
    }
}

/// Writes `<tag value="YYYYMMDDHHMMSS"/>`, or `<tag nullFlavor="NI"/>` when absent
pub fn write_time<T: Hl7Time + ?Sized>(
    out: &mut String,
    tag: &str,
    value: Option<&T>,
) -> fmt::Result {
    match value.and_then(Hl7Time::to_hl7) {
        Some(ts) => write!(out, r#"<{tag} value="{ts}"/>"#),
        None => write!(out, r#"<{tag} nullFlavor="NI"/>"#),
    }
}

/// Writes an `effectiveTime` interval with `low` and `high` bounds
///
/// An open-ended interval (no end) omits `high` entirely; only a missing
/// start is rendered as `nullFlavor="NI"`. `attrs` is inserted after the
/// tag name, e.g. ` xsi:type="IVL_TS"`.
pub fn write_interval<T: Hl7Time + ?Sized>(
    out: &mut String,
    attrs: &str,
    low: Option<&T>,
    high: Option<&T>,
) -> fmt::Result {
    write!(out, "<effectiveTime{attrs}>")?;
    write_time(out, "low", low)?;
    if high.is_some() {
        write_time(out, "high", high)?;
    }
    out.push_str("</effectiveTime>");
    Ok(())
}

/// Renders a date for the human-readable narrative (`YYYY-MM-DD`), or an empty string
pub fn narrative_date<T: Hl7Time + ?Sized>(value: Option<&T>) -> String {
    value
        .and_then(Hl7Time::to_hl7)
        .map(|ts| format!("{}-{}-{}", &ts[0..4], &ts[4..6], &ts[6..8]))
        .unwrap_or_default()
}

/// HL7 AdministrativeGender code
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GenderCode {
    Male,
    Female,
    Undifferentiated,
}

/// OID of the HL7 AdministrativeGender code system
pub const ADMINISTRATIVE_GENDER_OID: &str = "2.16.840.1.113883.5.1";

impl GenderCode {
    pub fn code(self) -> &'static str {
        match self {
            GenderCode::Male => "M",
            GenderCode::Female => "F",
            GenderCode::Undifferentiated => "UN",
        }
    }

    pub fn display_name(self) -> &'static str {
        match self {
            GenderCode::Male => "Male",
            GenderCode::Female => "Female",
            GenderCode::Undifferentiated => "Undifferentiated",
        }
    }
}

/// Maps a free-text gender to an AdministrativeGender code
///
/// Anything that isn't clearly male or female, including an absent value,
/// maps to `UN`.
pub fn gender_code(gender: Option<&str>) -> GenderCode {
    match gender.map(|g| g.trim().to_ascii_lowercase()).as_deref() {
        Some("male" | "m" | "man") => GenderCode::Male,
        Some("female" | "f" | "woman") => GenderCode::Female,
        _ => GenderCode::Undifferentiated,
    }
}

/// SNOMED CT allergy/intolerance type used as the allergy observation value
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AllergyTypeCode {
    Drug,
    Food,
    Environmental,
    Substance,
}

impl AllergyTypeCode {
    pub fn code(self) -> &'static str {
        match self {
            AllergyTypeCode::Drug => "416098002",
            AllergyTypeCode::Food => "414285001",
            AllergyTypeCode::Environmental => "426232007",
            AllergyTypeCode::Substance => "419199007",
        }
    }

    pub fn display_name(self) -> &'static str {
        match self {
            AllergyTypeCode::Drug => "Drug allergy",
            AllergyTypeCode::Food => "Food allergy",
            AllergyTypeCode::Environmental => "Environmental allergy",
            AllergyTypeCode::Substance => "Allergy to substance",
        }
    }
}

/// Maps a stored allergen category to the allergy type code
pub fn allergy_type_code(allergen_type: Option<&str>) -> AllergyTypeCode {
    let Some(kind) = allergen_type.map(|t| t.trim().to_ascii_lowercase()) else {
        return AllergyTypeCode::Substance;
    };

    if kind.contains("drug") || kind.contains("medication") || kind.contains("medicine") {
        AllergyTypeCode::Drug
    } else if kind.contains("food") {
        AllergyTypeCode::Food
    } else if kind.contains("environment") {
        AllergyTypeCode::Environmental
    } else {
        AllergyTypeCode::Substance
    }
}

/// Maps an allergy severity to its SNOMED CT code and display name
pub fn severity_code(severity: &str) -> Option<(&'static str, &'static str)> {
    match severity.trim().to_ascii_lowercase().as_str() {
        "mild" => Some(("255604002", "Mild")),
        "moderate" => Some(("6736007", "Moderate")),
        "severe" => Some(("24484000", "Severe")),
        "fatal" => Some(("399166001", "Fatal")),
        _ => None,
    }
}

/// Maps a lab interpretation flag to HL7 ObservationInterpretation
pub fn interpretation_code(flag: &str) -> Option<(&'static str, &'static str)> {
    match flag.trim().to_ascii_lowercase().as_str() {
        "normal" | "n" => Some(("N", "Normal")),
        "high" | "h" => Some(("H", "High")),
        "low" | "l" => Some(("L", "Low")),
        "critical high" | "critical_high" | "hh" => Some(("HH", "Critical high")),
        "critical low" | "critical_low" | "ll" => Some(("LL", "Critical low")),
        "abnormal" | "a" => Some(("A", "Abnormal")),
        "critical" | "aa" => Some(("AA", "Critical abnormal")),
        _ => None,
    }
}

/// OID of the HL7 ObservationInterpretation code system
pub const OBSERVATION_INTERPRETATION_OID: &str = "2.16.840.1.113883.5.83";

/// Maps a stored status to a CDA `statusCode`
pub fn status_code(status: &str) -> &'static str {
    match status.trim().to_ascii_lowercase().as_str() {
        "active" | "in-progress" | "in_progress" | "on-hold" | "on_hold" | "ongoing" => "active",
        "cancelled" | "canceled" | "entered-in-error" => "cancelled",
        "aborted" | "not-done" | "refused" => "aborted",
        "new" | "planned" | "draft" | "proposed" => "new",
        _ => "completed",
    }
}

/// Terminologies the exporter knows OIDs for
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CodeSystem {
    RxNorm,
    SnomedCt,
    Icd10Cm,
    Loinc,
    Cpt,
    Cvx,
    Ndc,
}

impl CodeSystem {
    /// HL7 OID used as the `codeSystem` attribute
    pub fn oid(self) -> &'static str {
        match self {
            CodeSystem::RxNorm => "2.16.840.1.113883.6.88",
            CodeSystem::SnomedCt => "2.16.840.1.113883.6.96",
            CodeSystem::Icd10Cm => "2.16.840.1.113883.6.90",
            CodeSystem::Loinc => "2.16.840.1.113883.6.1",
            CodeSystem::Cpt => "2.16.840.1.113883.6.12",
            CodeSystem::Cvx => "2.16.840.1.113883.12.292",
            CodeSystem::Ndc => "2.16.840.1.113883.6.69",
        }
    }

    /// Name used as the `codeSystemName` attribute
    pub fn name(self) -> &'static str {
        match self {
            CodeSystem::RxNorm => "RxNorm",
            CodeSystem::SnomedCt => "SNOMED CT",
            CodeSystem::Icd10Cm => "ICD-10-CM",
            CodeSystem::Loinc => "LOINC",
            CodeSystem::Cpt => "CPT-4",
            CodeSystem::Cvx => "CVX",
            CodeSystem::Ndc => "NDC",
        }
    }

    const ALL: [CodeSystem; 7] = [
        CodeSystem::RxNorm,
        CodeSystem::SnomedCt,
        CodeSystem::Icd10Cm,
        CodeSystem::Loinc,
        CodeSystem::Cpt,
        CodeSystem::Cvx,
        CodeSystem::Ndc,
    ];
}

impl FromStr for CodeSystem {
    type Err = String;

    /// Accepts common spellings ("SNOMED-CT", "icd10", "CPT4") or the OID itself
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let trimmed = s.trim();
        if let Some(system) = Self::ALL.iter().find(|cs| cs.oid() == trimmed) {
            return Ok(*system);
        }

        let normalized: String = trimmed
            .chars()
            .filter(|c| c.is_ascii_alphanumeric())
            .collect::<String>()
            .to_ascii_lowercase();

        match normalized.as_str() {
            "rxnorm" | "rxn" => Ok(CodeSystem::RxNorm),
            "snomed" | "snomedct" | "sct" | "snomedctus" => Ok(CodeSystem::SnomedCt),
            "icd10" | "icd10cm" => Ok(CodeSystem::Icd10Cm),
            "loinc" => Ok(CodeSystem::Loinc),
            "cpt" | "cpt4" => Ok(CodeSystem::Cpt),
            "cvx" => Ok(CodeSystem::Cvx),
            "ndc" => Ok(CodeSystem::Ndc),
            _ => Err(format!("Unknown code system: {s}")),
        }
    }
}

/// Writes a coded element such as `<code .../>` or `<value xsi:type="CD" .../>`
///
/// `attrs` is inserted verbatim after the tag name (e.g. ` xsi:type="CD"`).
/// When there is no code, or the code system isn't recognised, the element
/// gets `nullFlavor="UNK"` and carries the display text as `originalText`.
pub fn write_code(
    out: &mut String,
    tag: &str,
    attrs: &str,
    code: Option<&str>,
    system: Option<CodeSystem>,
    display: &str,
) -> fmt::Result {
    let display = escape_xml(display);
    match (code.map(str::trim).filter(|c| !c.is_empty()), system) {
        (Some(code), Some(system)) => write!(
            out,
            r#"<{tag}{attrs} code="{}" codeSystem="{}" codeSystemName="{}" displayName="{display}"/>"#,
            escape_xml(code),
            system.oid(),
            system.name(),
        ),
        _ => write!(
            out,
            r#"<{tag}{attrs} nullFlavor="UNK"><originalText>{display}</originalText></{tag}>"#
        ),
    }
}

/// Resolves an optional code-system name, falling back to `default`
pub fn resolve_code_system(name: Option<&str>, default: CodeSystem) -> Option<CodeSystem> {
    match name {
        None => Some(default),
        Some(n) if n.trim().is_empty() => Some(default),
        Some(n) => n.parse().ok(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use test_case::test_case;

    #[test]
    fn test_escape_all_special_characters() {
        assert_eq!(
            escape_xml(r#"a & b < c > d " e ' f"#),
            "a &amp; b &lt; c &gt; d &quot; e &apos; f"
        );
    }

    #[test]
    fn test_escape_borrows_plain_text() {
        assert!(matches!(escape_xml("plain text"), Cow::Borrowed(_)));
    }

    #[test]
    fn test_escape_drops_invalid_xml_characters() {
        assert_eq!(escape_xml("bad\u{0}\u{1b}char & co\ttab"), "badchar &amp; co\ttab");
    }

    #[test]
    fn test_hl7_date_pads_time() {
        let d = NaiveDate::from_ymd_opt(1985, 7, 9).unwrap();
        assert_eq!(d.to_hl7().as_deref(), Some("19850709000000"));
    }

    #[test]
    fn test_hl7_datetime() {
        let t = Utc.with_ymd_and_hms(2024, 12, 31, 23, 5, 9).unwrap();
        assert_eq!(t.to_hl7().as_deref(), Some("20241231230509"));
    }

    #[test]
    fn test_hl7_rejects_out_of_range_year() {
        let d = NaiveDate::from_ymd_opt(12000, 1, 1).unwrap();
        assert_eq!(d.to_hl7(), None);
    }

    #[test]
    fn test_write_time_null_flavor() {
        let mut out = String::new();
        write_time::<NaiveDate>(&mut out, "effectiveTime", None).unwrap();
        assert_eq!(out, r#"<effectiveTime nullFlavor="NI"/>"#);
    }

    #[test]
    fn test_write_interval_open_ended() {
        let mut out = String::new();
        let start = NaiveDate::from_ymd_opt(2020, 1, 2).unwrap();
        write_interval(&mut out, "", Some(&start), None).unwrap();
        assert_eq!(
            out,
            r#"<effectiveTime><low value="20200102000000"/></effectiveTime>"#
        );
    }

    #[test]
    fn test_narrative_date() {
        let d = NaiveDate::from_ymd_opt(2020, 1, 2).unwrap();
        assert_eq!(narrative_date(Some(&d)), "2020-01-02");
        assert_eq!(narrative_date::<NaiveDate>(None), "");
    }

    #[test_case(Some("male"), "M")]
    #[test_case(Some(" Female "), "F")]
    #[test_case(Some("F"), "F")]
    #[test_case(Some("non-binary"), "UN")]
    #[test_case(None, "UN")]
    fn test_gender_code(input: Option<&str>, expected: &str) {
        assert_eq!(gender_code(input).code(), expected);
    }

    #[test_case(Some("medication"), "416098002")]
    #[test_case(Some("Drug"), "416098002")]
    #[test_case(Some("food"), "414285001")]
    #[test_case(Some("environmental"), "426232007")]
    #[test_case(Some("latex"), "419199007")]
    #[test_case(None, "419199007")]
    fn test_allergy_type_code(input: Option<&str>, expected: &str) {
        assert_eq!(allergy_type_code(input).code(), expected);
    }

    #[test_case("RxNorm", CodeSystem::RxNorm)]
    #[test_case("SNOMED-CT", CodeSystem::SnomedCt)]
    #[test_case("icd-10", CodeSystem::Icd10Cm)]
    #[test_case("CPT4", CodeSystem::Cpt)]
    #[test_case("2.16.840.1.113883.6.1", CodeSystem::Loinc)]
    fn test_code_system_from_str(input: &str, expected: CodeSystem) {
        assert_eq!(input.parse::<CodeSystem>().unwrap(), expected);
    }

    #[test]
    fn test_code_system_unknown() {
        assert!("made-up".parse::<CodeSystem>().is_err());
    }

    #[test]
    fn test_resolve_code_system_defaults() {
        assert_eq!(
            resolve_code_system(None, CodeSystem::RxNorm),
            Some(CodeSystem::RxNorm)
        );
        assert_eq!(
            resolve_code_system(Some("snomed"), CodeSystem::RxNorm),
            Some(CodeSystem::SnomedCt)
        );
        assert_eq!(resolve_code_system(Some("??"), CodeSystem::RxNorm), None);
    }

    #[test]
    fn test_write_code_with_system() {
        let mut out = String::new();
        write_code(
            &mut out,
            "code",
            "",
            Some("197361"),
            Some(CodeSystem::RxNorm),
            "Amlodipine 5 MG",
        )
        .unwrap();
        assert_eq!(
            out,
            r#"<code code="197361" codeSystem="2.16.840.1.113883.6.88" codeSystemName="RxNorm" displayName="Amlodipine 5 MG"/>"#
        );
    }

    #[test]
    fn test_write_code_without_code_uses_original_text() {
        let mut out = String::new();
        write_code(&mut out, "value", r#" xsi:type="CD""#, None, None, "Cats & dogs").unwrap();
        assert_eq!(
            out,
            r#"<value xsi:type="CD" nullFlavor="UNK"><originalText>Cats &amp; dogs</originalText></value>"#
        );
    }

    #[test]
    fn test_status_code_mapping() {
        assert_eq!(status_code("Active"), "active");
        assert_eq!(status_code("resolved"), "completed");
        assert_eq!(status_code("entered-in-error"), "cancelled");
        assert_eq!(status_code("planned"), "new");
    }

    #[test]
    fn test_interpretation_and_severity() {
        assert_eq!(interpretation_code("High"), Some(("H", "High")));
        assert_eq!(interpretation_code("weird"), None);
        assert_eq!(severity_code("severe"), Some(("24484000", "Severe")));
    }
}
