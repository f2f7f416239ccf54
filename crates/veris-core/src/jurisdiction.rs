//! # Jurisdiction Codes
//!
//! The addressing primitive for adapter routing, consent scoping, and
//! retention policy lookup. A jurisdiction code is an ISO 3166-1 style
//! 2-letter country code, optionally followed by a dash and a subdivision
//! suffix (`"US"`, `"US-CA"`, `"DE-BY"`).
//!
//! ## Country-Prefix Semantics
//!
//! Routing and consent validation both fall back from a subdivision code
//! to its 2-letter country prefix. [`JurisdictionCode::country`] exposes
//! the prefix; no fuzzy matching beyond that prefix is ever performed.

use serde::{Deserialize, Serialize};

use crate::error::ValidationError;

/// A validated jurisdiction code.
///
/// # Validation
///
/// - First two characters must be ASCII letters (the country code).
/// - An optional suffix must be introduced by `-` and consist of 1 to 5
///   ASCII alphanumeric characters.
/// - Input is uppercased for storage, so `"us-ca"` and `"US-CA"` compare
///   equal.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct JurisdictionCode(String);

impl JurisdictionCode {
    /// Create a jurisdiction code from a string, validating format.
    ///
    /// # Errors
    ///
    /// Returns [`ValidationError::InvalidJurisdictionCode`] if the string
    /// is not a 2-letter country code with an optional `-SUBDIV` suffix.
    pub fn new(value: impl Into<String>) -> Result<Self, ValidationError> {
        let raw = value.into();
        let upper = raw.trim().to_ascii_uppercase();

        let bytes = upper.as_bytes();
        if bytes.len() < 2 || !bytes[..2].iter().all(|b| b.is_ascii_uppercase()) {
            return Err(ValidationError::InvalidJurisdictionCode(raw));
        }

        match bytes.len() {
            2 => {}
            3 => return Err(ValidationError::InvalidJurisdictionCode(raw)),
            n if n <= 8 => {
                if bytes[2] != b'-'
                    || !bytes[3..].iter().all(|b| b.is_ascii_alphanumeric())
                {
                    return Err(ValidationError::InvalidJurisdictionCode(raw));
                }
            }
            _ => return Err(ValidationError::InvalidJurisdictionCode(raw)),
        }

        Ok(Self(upper))
    }

    /// Access the jurisdiction code string (uppercase canonical form).
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// The 2-letter country prefix (`"US-CA"` yields `"US"`).
    pub fn country(&self) -> &str {
        &self.0[..2]
    }

    /// Whether this code carries a subdivision suffix.
    pub fn has_subdivision(&self) -> bool {
        self.0.len() > 2
    }

    /// The country-level code for this jurisdiction. Returns `self`
    /// unchanged when there is no subdivision suffix.
    pub fn to_country(&self) -> Self {
        Self(self.country().to_string())
    }

    /// Whether `other` covers this jurisdiction: either an exact match or
    /// `other` is this code's country prefix.
    pub fn is_covered_by(&self, other: &JurisdictionCode) -> bool {
        self == other || (!other.has_subdivision() && self.country() == other.as_str())
    }
}

impl std::fmt::Display for JurisdictionCode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn country_only_code() {
        let j = JurisdictionCode::new("US").unwrap();
        assert_eq!(j.as_str(), "US");
        assert_eq!(j.country(), "US");
        assert!(!j.has_subdivision());
    }

    #[test]
    fn subdivision_code() {
        let j = JurisdictionCode::new("US-CA").unwrap();
        assert_eq!(j.as_str(), "US-CA");
        assert_eq!(j.country(), "US");
        assert!(j.has_subdivision());
        assert_eq!(j.to_country().as_str(), "US");
    }

    #[test]
    fn lowercase_input_is_canonicalized() {
        let j = JurisdictionCode::new("us-ca").unwrap();
        assert_eq!(j.as_str(), "US-CA");
        assert_eq!(j, JurisdictionCode::new("US-CA").unwrap());
    }

    #[test]
    fn rejects_invalid() {
        assert!(JurisdictionCode::new("").is_err());
        assert!(JurisdictionCode::new("U").is_err());
        assert!(JurisdictionCode::new("USA").is_err()); // 3 letters, no dash
        assert!(JurisdictionCode::new("US-").is_err()); // empty suffix
        assert!(JurisdictionCode::new("US_CA").is_err()); // wrong separator
        assert!(JurisdictionCode::new("12-CA").is_err()); // numeric country
        assert!(JurisdictionCode::new("US-TOOLONG").is_err());
    }

    #[test]
    fn coverage_exact_and_prefix() {
        let us = JurisdictionCode::new("US").unwrap();
        let us_ca = JurisdictionCode::new("US-CA").unwrap();
        let de = JurisdictionCode::new("DE").unwrap();

        assert!(us_ca.is_covered_by(&us_ca)); // exact
        assert!(us_ca.is_covered_by(&us)); // country prefix
        assert!(us.is_covered_by(&us));
        assert!(!us.is_covered_by(&us_ca)); // subdivision never covers country
        assert!(!us_ca.is_covered_by(&de));
    }

    #[test]
    fn serde_roundtrip() {
        let j = JurisdictionCode::new("DE-BY").unwrap();
        let json = serde_json::to_string(&j).unwrap();
        let back: JurisdictionCode = serde_json::from_str(&json).unwrap();
        assert_eq!(back, j);
    }
}
