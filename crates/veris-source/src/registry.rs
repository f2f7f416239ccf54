//! # Adapter Registry and Router
//!
//! Maps a (jurisdiction, document type) pairing to a registered adapter.
//! Selection is a strategy lookup over the capability trait, not a type
//! switch: adding a provider means registering one more implementation.
//!
//! ## Selection Order
//!
//! 1. Exact jurisdiction match among adapters supporting the document type.
//! 2. When the requested code carries a subdivision suffix, retry with the
//!    2-letter country prefix.
//! 3. Otherwise a routing error, distinguishing "no adapter for this
//!    jurisdiction" from "jurisdiction served, document class not".

use std::sync::Arc;

use parking_lot::RwLock;
use thiserror::Error;

use veris_core::{DocumentType, JurisdictionCode};

use crate::adapter::{AdapterStatus, SourceAdapter};

/// Routing failures. All are returned to the caller before any adapter
/// call is made.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum RouteError {
    /// No adapters are registered at all.
    #[error("no adapters registered")]
    NoAdapters,

    /// No registered adapter serves the jurisdiction, even after
    /// country-prefix fallback.
    #[error("jurisdiction {jurisdiction} is not supported by any registered adapter")]
    JurisdictionNotSupported {
        /// The requested jurisdiction.
        jurisdiction: JurisdictionCode,
    },

    /// Adapters serve the jurisdiction but none supports the document
    /// class.
    #[error("document type {document_type} is not supported in jurisdiction {jurisdiction}")]
    DocumentNotSupported {
        /// The requested jurisdiction.
        jurisdiction: JurisdictionCode,
        /// The unsupported document class.
        document_type: DocumentType,
    },
}

/// Registry of adapters with jurisdiction-fallback routing.
#[derive(Clone, Default)]
pub struct SourceRegistry {
    adapters: Arc<RwLock<Vec<Arc<dyn SourceAdapter>>>>,
}

impl SourceRegistry {
    /// Create an empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Register an adapter. Registration order is the tiebreaker when
    /// several adapters serve the same pairing.
    pub fn register(&self, adapter: Arc<dyn SourceAdapter>) {
        tracing::info!(
            adapter = adapter.name(),
            jurisdiction = %adapter.jurisdiction(),
            kind = %adapter.kind(),
            "registering source adapter"
        );
        self.adapters.write().push(adapter);
    }

    /// Number of registered adapters.
    pub fn len(&self) -> usize {
        self.adapters.read().len()
    }

    /// Whether the registry is empty.
    pub fn is_empty(&self) -> bool {
        self.adapters.read().is_empty()
    }

    /// Route a (jurisdiction, document type) pairing to an adapter.
    ///
    /// # Errors
    ///
    /// Returns a [`RouteError`] naming what was missing; no partial or
    /// fuzzy jurisdiction matching is performed beyond the documented
    /// country-prefix fallback.
    pub fn route(
        &self,
        jurisdiction: &JurisdictionCode,
        document_type: DocumentType,
    ) -> Result<Arc<dyn SourceAdapter>, RouteError> {
        let adapters = self.adapters.read();
        if adapters.is_empty() {
            return Err(RouteError::NoAdapters);
        }

        let mut jurisdiction_served = false;
        for candidate in [Some(jurisdiction.clone()), fallback(jurisdiction)]
            .into_iter()
            .flatten()
        {
            for adapter in adapters.iter() {
                if *adapter.jurisdiction() != candidate {
                    continue;
                }
                jurisdiction_served = true;
                if adapter.supports_document(document_type) {
                    return Ok(Arc::clone(adapter));
                }
            }
        }

        if jurisdiction_served {
            Err(RouteError::DocumentNotSupported {
                jurisdiction: jurisdiction.clone(),
                document_type,
            })
        } else {
            Err(RouteError::JurisdictionNotSupported {
                jurisdiction: jurisdiction.clone(),
            })
        }
    }

    /// Operational statistics for every registered adapter, in
    /// registration order.
    pub fn statuses(&self) -> Vec<AdapterStatus> {
        self.adapters.read().iter().map(|a| a.status()).collect()
    }
}

impl std::fmt::Debug for SourceRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SourceRegistry")
            .field("adapters", &self.len())
            .finish()
    }
}

/// The country-prefix fallback candidate, when distinct from the input.
fn fallback(jurisdiction: &JurisdictionCode) -> Option<JurisdictionCode> {
    jurisdiction
        .has_subdivision()
        .then(|| jurisdiction.to_country())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mock::MockSourceAdapter;
    use veris_core::SourceKind;

    fn code(s: &str) -> JurisdictionCode {
        JurisdictionCode::new(s).unwrap()
    }

    fn dmv(name: &str, jurisdiction: &str) -> Arc<MockSourceAdapter> {
        Arc::new(MockSourceAdapter::new(
            name,
            SourceKind::Dmv,
            code(jurisdiction),
            [DocumentType::DriversLicense],
        ))
    }

    #[test]
    fn empty_registry_routes_nothing() {
        let registry = SourceRegistry::new();
        assert_eq!(
            registry.route(&code("US"), DocumentType::Passport),
            Err(RouteError::NoAdapters)
        );
    }

    #[test]
    fn exact_match_wins() {
        let registry = SourceRegistry::new();
        let us = dmv("us-dmv", "US");
        let ca = dmv("ca-dmv", "US-CA");
        registry.register(us);
        registry.register(ca);

        let routed = registry
            .route(&code("US-CA"), DocumentType::DriversLicense)
            .unwrap();
        assert_eq!(routed.name(), "ca-dmv");
    }

    #[test]
    fn country_prefix_fallback() {
        let registry = SourceRegistry::new();
        registry.register(dmv("us-dmv", "US"));

        let routed = registry
            .route(&code("US-CA"), DocumentType::DriversLicense)
            .unwrap();
        assert_eq!(routed.name(), "us-dmv");
    }

    #[test]
    fn no_fallback_for_country_only_codes() {
        let registry = SourceRegistry::new();
        registry.register(dmv("ca-dmv", "US-CA"));

        // "US" must not match the "US-CA" adapter.
        assert_eq!(
            registry.route(&code("US"), DocumentType::DriversLicense),
            Err(RouteError::JurisdictionNotSupported {
                jurisdiction: code("US")
            })
        );
    }

    #[test]
    fn document_not_supported_is_distinguished() {
        let registry = SourceRegistry::new();
        registry.register(dmv("us-dmv", "US"));

        assert_eq!(
            registry.route(&code("US"), DocumentType::Passport),
            Err(RouteError::DocumentNotSupported {
                jurisdiction: code("US"),
                document_type: DocumentType::Passport
            })
        );
    }

    #[test]
    fn unrelated_jurisdiction_not_supported() {
        let registry = SourceRegistry::new();
        registry.register(dmv("us-dmv", "US"));

        assert_eq!(
            registry.route(&code("DE"), DocumentType::DriversLicense),
            Err(RouteError::JurisdictionNotSupported {
                jurisdiction: code("DE")
            })
        );
    }

    #[test]
    fn registration_order_breaks_ties() {
        let registry = SourceRegistry::new();
        registry.register(dmv("first", "US"));
        registry.register(dmv("second", "US"));

        let routed = registry
            .route(&code("US"), DocumentType::DriversLicense)
            .unwrap();
        assert_eq!(routed.name(), "first");
    }

    #[test]
    fn statuses_cover_all_adapters() {
        let registry = SourceRegistry::new();
        registry.register(dmv("a", "US"));
        registry.register(dmv("b", "DE"));
        let statuses = registry.statuses();
        assert_eq!(statuses.len(), 2);
        assert_eq!(statuses[0].name, "a");
        assert_eq!(statuses[1].name, "b");
    }
}
