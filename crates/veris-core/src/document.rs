//! # Document Taxonomy
//!
//! The closed set of document classes the platform verifies. One enum
//! definition, exhaustive `match` everywhere.

use serde::{Deserialize, Serialize};

/// A class of government-issued document.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DocumentType {
    /// Travel passport.
    Passport,
    /// National identity card or equivalent civil registry document.
    NationalId,
    /// Driver's license.
    DriversLicense,
    /// Residence permit.
    ResidencePermit,
    /// Tax identification document.
    TaxId,
    /// Birth certificate.
    BirthCertificate,
    /// Entry visa.
    Visa,
}

impl DocumentType {
    /// Return the string value used in serialized form and audit entries.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Passport => "passport",
            Self::NationalId => "national_id",
            Self::DriversLicense => "drivers_license",
            Self::ResidencePermit => "residence_permit",
            Self::TaxId => "tax_id",
            Self::BirthCertificate => "birth_certificate",
            Self::Visa => "visa",
        }
    }

    /// All document types, in a fixed order.
    pub fn all() -> [DocumentType; 7] {
        [
            Self::Passport,
            Self::NationalId,
            Self::DriversLicense,
            Self::ResidencePermit,
            Self::TaxId,
            Self::BirthCertificate,
            Self::Visa,
        ]
    }
}

impl std::fmt::Display for DocumentType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}
