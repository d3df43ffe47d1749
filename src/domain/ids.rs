//! Domain identifier types with validation
//!
//! Newtype wrappers keep patient and tenant identifiers from being mixed up
//! at call sites that take both.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Longest identifier accepted from callers
const MAX_ID_LEN: usize = 128;

fn validate_id(kind: &str, id: &str) -> Result<(), String> {
    if id.trim().is_empty() {
        return Err(format!("{kind} cannot be empty"));
    }
    if id.len() > MAX_ID_LEN {
        return Err(format!("{kind} exceeds {MAX_ID_LEN} characters"));
    }
    if id.chars().any(|c| c.is_control()) {
        return Err(format!("{kind} contains control characters"));
    }
    Ok(())
}

/// Patient identifier newtype wrapper
///
/// Identifies one patient profile. Usually a UUID, but any non-empty
/// identifier issued by the source database is accepted.
///
/// # Examples
///
/// ```
/// use ccda_export::domain::ids::PatientId;
/// use std::str::FromStr;
///
/// let id = PatientId::from_str("7d44b88c-4199-4bad-97dc-d78268e01398").unwrap();
/// assert_eq!(id.as_str(), "7d44b88c-4199-4bad-97dc-d78268e01398");
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct PatientId(String);

impl PatientId {
    /// Creates a new PatientId from a string
    ///
    /// # Errors
    ///
    /// Returns an error if the ID is empty, too long, or contains control characters
    pub fn new(id: impl Into<String>) -> Result<Self, String> {
        let id = id.into();
        validate_id("Patient ID", &id)?;
        Ok(Self(id))
    }

    /// Returns the patient ID as a string slice
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

/// Tenant identifier newtype wrapper
///
/// Identifies the organization that owns a patient's records.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct TenantId(String);

impl TenantId {
    /// Creates a new TenantId from a string
    ///
    /// # Errors
    ///
    /// Returns an error if the ID is empty, too long, or contains control characters
    pub fn new(id: impl Into<String>) -> Result<Self, String> {
        let id = id.into();
        validate_id("Tenant ID", &id)?;
        Ok(Self(id))
    }

    /// Returns the tenant ID as a string slice
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

macro_rules! impl_id_traits {
    ($ty:ident) => {
        impl fmt::Display for $ty {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, "{}", self.0)
            }
        }

        impl FromStr for $ty {
            type Err = String;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                Self::new(s)
            }
        }

        impl TryFrom<String> for $ty {
            type Error = String;

            fn try_from(s: String) -> Result<Self, Self::Error> {
                Self::new(s)
            }
        }

        impl From<$ty> for String {
            fn from(id: $ty) -> Self {
                id.0
            }
        }

        impl AsRef<str> for $ty {
            fn as_ref(&self) -> &str {
                &self.0
            }
        }
    };
}

impl_id_traits!(PatientId);
impl_id_traits!(TenantId);

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_patient_id_creation() {
        let id = PatientId::new("7d44b88c-4199-4bad-97dc-d78268e01398").unwrap();
        assert_eq!(id.as_str(), "7d44b88c-4199-4bad-97dc-d78268e01398");
    }

    #[test]
    fn test_patient_id_empty_fails() {
        assert!(PatientId::new("").is_err());
        assert!(PatientId::new("   ").is_err());
    }

    #[test]
    fn test_id_rejects_control_characters() {
        assert!(TenantId::new("tenant\n1").is_err());
    }

    #[test]
    fn test_id_rejects_overlong() {
        assert!(PatientId::new("a".repeat(MAX_ID_LEN + 1)).is_err());
        assert!(PatientId::new("a".repeat(MAX_ID_LEN)).is_ok());
    }

    #[test]
    fn test_tenant_id_display() {
        let id = TenantId::new("clinic-a").unwrap();
        assert_eq!(format!("{}", id), "clinic-a");
    }

    #[test]
    fn test_id_deserialization_validates() {
        let ok: PatientId = serde_json::from_str("\"p-1\"").unwrap();
        assert_eq!(ok.as_str(), "p-1");
        assert!(serde_json::from_str::<PatientId>("\"\"").is_err());
    }
}
