//! C-CDA R2.1 template identifiers
//!
//! Each template is emitted twice, once bare and once with its version
//! extension, so that R1.1 and R2.1 consumers both recognise it.

use std::fmt::{self, Write};

/// A template OID with its optional version extension
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Template {
    pub root: &'static str,
    pub extension: Option<&'static str>,
}

impl Template {
    const fn versioned(root: &'static str, extension: &'static str) -> Self {
        Self {
            root,
            extension: Some(extension),
        }
    }

    const fn unversioned(root: &'static str) -> Self {
        Self {
            root,
            extension: None,
        }
    }

    /// Writes the `templateId` elements for this template
    pub fn write(&self, out: &mut String) -> fmt::Result {
        write!(out, r#"<templateId root="{}"/>"#, self.root)?;
        if let Some(ext) = self.extension {
            write!(out, r#"<templateId root="{}" extension="{ext}"/>"#, self.root)?;
        }
        Ok(())
    }
}

/// Version extension shared by the R2.1 document-level templates
pub const CCDA_R21_EXTENSION: &str = "2015-08-01";

// Document
pub const US_REALM_HEADER: Template =
    Template::versioned("2.16.840.1.113883.10.20.22.1.1", CCDA_R21_EXTENSION);
pub const CCD_DOCUMENT: Template =
    Template::versioned("2.16.840.1.113883.10.20.22.1.2", CCDA_R21_EXTENSION);

// Sections (entries required)
pub const ALLERGIES_SECTION: Template =
    Template::versioned("2.16.840.1.113883.10.20.22.2.6.1", "2015-08-01");
pub const MEDICATIONS_SECTION: Template =
    Template::versioned("2.16.840.1.113883.10.20.22.2.1.1", "2014-06-09");
pub const PROBLEMS_SECTION: Template =
    Template::versioned("2.16.840.1.113883.10.20.22.2.5.1", "2015-08-01");
pub const PROCEDURES_SECTION: Template =
    Template::versioned("2.16.840.1.113883.10.20.22.2.7.1", "2014-06-09");
pub const IMMUNIZATIONS_SECTION: Template =
    Template::versioned("2.16.840.1.113883.10.20.22.2.2.1", "2015-08-01");
pub const VITAL_SIGNS_SECTION: Template =
    Template::versioned("2.16.840.1.113883.10.20.22.2.4.1", "2015-08-01");
pub const RESULTS_SECTION: Template =
    Template::versioned("2.16.840.1.113883.10.20.22.2.3.1", "2015-08-01");
pub const PLAN_OF_TREATMENT_SECTION: Template =
    Template::versioned("2.16.840.1.113883.10.20.22.2.10", "2014-06-09");

// Entries
pub const ALLERGY_CONCERN_ACT: Template =
    Template::versioned("2.16.840.1.113883.10.20.22.4.30", "2015-08-01");
pub const ALLERGY_INTOLERANCE_OBSERVATION: Template =
    Template::versioned("2.16.840.1.113883.10.20.22.4.7", "2014-06-09");
pub const REACTION_OBSERVATION: Template =
    Template::versioned("2.16.840.1.113883.10.20.22.4.9", "2014-06-09");
pub const SEVERITY_OBSERVATION: Template =
    Template::versioned("2.16.840.1.113883.10.20.22.4.8", "2014-06-09");
pub const MEDICATION_ACTIVITY: Template =
    Template::versioned("2.16.840.1.113883.10.20.22.4.16", "2014-06-09");
pub const MEDICATION_INFORMATION: Template =
    Template::versioned("2.16.840.1.113883.10.20.22.4.23", "2014-06-09");
pub const PROBLEM_CONCERN_ACT: Template =
    Template::versioned("2.16.840.1.113883.10.20.22.4.3", "2015-08-01");
pub const PROBLEM_OBSERVATION: Template =
    Template::versioned("2.16.840.1.113883.10.20.22.4.4", "2015-08-01");
pub const PROCEDURE_ACTIVITY: Template =
    Template::versioned("2.16.840.1.113883.10.20.22.4.14", "2014-06-09");
pub const IMMUNIZATION_ACTIVITY: Template =
    Template::versioned("2.16.840.1.113883.10.20.22.4.52", "2015-08-01");
pub const IMMUNIZATION_MEDICATION_INFORMATION: Template =
    Template::versioned("2.16.840.1.113883.10.20.22.4.54", "2014-06-09");
pub const VITAL_SIGNS_ORGANIZER: Template =
    Template::versioned("2.16.840.1.113883.10.20.22.4.26", "2015-08-01");
pub const VITAL_SIGN_OBSERVATION: Template =
    Template::versioned("2.16.840.1.113883.10.20.22.4.27", "2014-06-09");
pub const RESULT_ORGANIZER: Template =
    Template::versioned("2.16.840.1.113883.10.20.22.4.1", "2015-08-01");
pub const RESULT_OBSERVATION: Template =
    Template::versioned("2.16.840.1.113883.10.20.22.4.2", "2015-08-01");
pub const PLANNED_ACT: Template =
    Template::versioned("2.16.840.1.113883.10.20.22.4.39", "2014-06-09");
pub const GOAL_OBSERVATION: Template = Template::unversioned("2.16.840.1.113883.10.20.22.4.121");
