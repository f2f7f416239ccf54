//! # Government Source Taxonomy
//!
//! The closed set of government data-source classes an adapter can
//! represent. Trust weighting per source kind is policy and lives with the
//! trust integrator; this module only defines the taxonomy.

use serde::{Deserialize, Serialize};

/// The class of government data source behind an adapter.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SourceKind {
    /// National passport issuing authority.
    PassportAuthority,
    /// Central civil/national population registry.
    NationalRegistry,
    /// Department of motor vehicles or licensing agency.
    Dmv,
    /// Tax authority.
    TaxAuthority,
    /// Vital records office (birth, death, marriage).
    VitalRecords,
    /// Immigration authority.
    Immigration,
}

impl SourceKind {
    /// Return the string value used in serialized form and audit entries.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::PassportAuthority => "passport_authority",
            Self::NationalRegistry => "national_registry",
            Self::Dmv => "dmv",
            Self::TaxAuthority => "tax_authority",
            Self::VitalRecords => "vital_records",
            Self::Immigration => "immigration",
        }
    }

    /// All source kinds, in a fixed order.
    pub fn all() -> [SourceKind; 6] {
        [
            Self::PassportAuthority,
            Self::NationalRegistry,
            Self::Dmv,
            Self::TaxAuthority,
            Self::VitalRecords,
            Self::Immigration,
        ]
    }
}

impl std::fmt::Display for SourceKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn display_matches_as_str() {
        for kind in SourceKind::all() {
            assert_eq!(kind.to_string(), kind.as_str());
        }
    }

    #[test]
    fn serde_roundtrip_all_variants() {
        for kind in SourceKind::all() {
            let json = serde_json::to_string(&kind).unwrap();
            let back: SourceKind = serde_json::from_str(&json).unwrap();
            assert_eq!(back, kind);
        }
    }
}
