//! End-to-end verification lifecycle tests, exercising the data flow
//! across crate boundaries: admission gates, routing with jurisdiction
//! fallback, adapter invocation, audit, trust integration, and cost
//! governance composed by the orchestrator.

use std::collections::BTreeSet;
use std::sync::Arc;

use chrono::{Duration, Utc};

use veris_audit::{AuditAction, AuditFilter};
use veris_core::{DocumentNumber, DocumentType, JurisdictionCode, RequesterId, SourceKind};
use veris_cost::{BudgetWindow, CostModel};
use veris_engine::{RateLimitConfig, ServiceConfig, Verifier, VerifyError};
use veris_source::{MockSourceAdapter, SourceRegistry, VerificationRequest, VerificationStatus};

fn code(s: &str) -> JurisdictionCode {
    JurisdictionCode::new(s).expect("valid jurisdiction code")
}

fn us_dmv_registry() -> SourceRegistry {
    let registry = SourceRegistry::new();
    registry.register(Arc::new(MockSourceAdapter::new(
        "us-dmv",
        SourceKind::Dmv,
        code("US"),
        [DocumentType::DriversLicense],
    )));
    registry
}

fn license_request(requester: &RequesterId) -> VerificationRequest {
    VerificationRequest::new(
        requester.clone(),
        DocumentType::DriversLicense,
        code("US-CA"),
        DocumentNumber::new("D1234567").expect("valid document number"),
    )
    .with_field("full_name", "Jane Example")
    .with_field("date_of_birth", "1990-04-01")
}

// =========================================================================
// Scenario: open gates, subdivision request served by a country adapter
// =========================================================================

#[tokio::test]
async fn us_ca_license_verifies_against_us_adapter() {
    let config = ServiceConfig::default()
        .without_consent()
        .without_rate_limiting();
    let verifier = Verifier::new(config, us_dmv_registry());

    let requester = RequesterId::new();
    let response = verifier
        .verify(license_request(&requester))
        .await
        .expect("verification should succeed");

    assert_eq!(response.status, VerificationStatus::Verified);
    assert!(response.confidence >= 0.9);
    let audit_id = response.audit_entry_id.expect("audit entry id");
    assert!(!audit_id.to_string().is_empty());

    // The entry is retrievable and records the attempt.
    let entry = verifier.audit().get(&audit_id).expect("audit entry");
    assert_eq!(entry.action, AuditAction::VerificationAttempted);
    assert_eq!(entry.status, "verified");
    assert_eq!(entry.jurisdiction, Some(code("US-CA")));
}

// =========================================================================
// Scenario: 1-per-minute limiter
// =========================================================================

#[tokio::test]
async fn second_request_in_same_minute_is_rate_limited() {
    let config = ServiceConfig::default()
        .without_consent()
        .with_rate_limit(RateLimitConfig {
            enabled: true,
            per_minute: 1,
            per_hour: 0,
            per_day: 0,
            burst: 0,
        });
    let verifier = Verifier::new(config, us_dmv_registry());
    let requester = RequesterId::new();

    let first = verifier
        .verify(license_request(&requester))
        .await
        .expect("first request admitted");
    assert_eq!(first.status, VerificationStatus::Verified);

    let second = verifier
        .verify(license_request(&requester))
        .await
        .expect_err("second request rejected");
    assert!(matches!(second, VerifyError::RateLimited));
    assert_eq!(second.status(), VerificationStatus::RateLimited);

    // An admin reset readmits the requester immediately.
    verifier.rate_limiter().reset(&requester);
    verifier
        .verify(license_request(&requester))
        .await
        .expect("admitted after reset");
}

// =========================================================================
// Scenario: consent scoped to driver's-license in US
// =========================================================================

#[tokio::test]
async fn consent_scope_rejects_passport_but_accepts_subdivision_license() {
    let registry = us_dmv_registry();
    registry.register(Arc::new(MockSourceAdapter::new(
        "us-passport",
        SourceKind::PassportAuthority,
        code("US"),
        [DocumentType::Passport],
    )));
    let config = ServiceConfig::default().without_rate_limiting();
    let verifier = Verifier::new(config, registry);
    let requester = RequesterId::new();

    let consent = verifier.grant_consent(
        requester.clone(),
        [DocumentType::DriversLicense].into_iter().collect(),
        [code("US")].into_iter().collect(),
        "identity verification",
    );

    // Passport in US: outside the consented document set.
    let passport = VerificationRequest::new(
        requester.clone(),
        DocumentType::Passport,
        code("US"),
        DocumentNumber::new("P7654321").expect("valid document number"),
    )
    .with_consent(consent.id.clone());
    let err = verifier.verify(passport).await.expect_err("consent scope");
    assert_eq!(err.status(), VerificationStatus::ConsentRequired);

    // Driver's license in US-CA: prefix match against the consented "US".
    let license = license_request(&requester).with_consent(consent.id.clone());
    let response = verifier.verify(license).await.expect("prefix match");
    assert_eq!(response.status, VerificationStatus::Verified);
}

// =========================================================================
// Cross-component flows
// =========================================================================

#[tokio::test]
async fn budget_ceiling_stops_further_verifications() {
    let config = ServiceConfig::default()
        .without_consent()
        .without_rate_limiting()
        .with_cost_model(
            "us-dmv",
            CostModel::per_call(100, "USD").with_budgets(200, 0),
        );
    let verifier = Verifier::new(config, us_dmv_registry());
    let requester = RequesterId::new();

    verifier
        .verify(license_request(&requester))
        .await
        .expect("first spend");
    verifier
        .verify(license_request(&requester))
        .await
        .expect("second spend reaches the ceiling");

    let err = verifier
        .verify(license_request(&requester))
        .await
        .expect_err("over budget");
    assert!(matches!(err, VerifyError::Budget(_)));

    let now = Utc::now();
    assert_eq!(verifier.costs().daily_spend("us-dmv", now), 200);
    let summary = verifier
        .costs()
        .summary(BudgetWindow::Daily, now - Duration::days(1), now + Duration::days(1));
    assert_eq!(summary.total_minor, 200);
    assert_eq!(summary.call_count, 2);
}

#[tokio::test]
async fn trust_score_accumulates_across_sources() {
    let registry = us_dmv_registry();
    registry.register(Arc::new(MockSourceAdapter::new(
        "us-passport",
        SourceKind::PassportAuthority,
        code("US"),
        [DocumentType::Passport],
    )));
    let config = ServiceConfig::default()
        .without_consent()
        .without_rate_limiting();
    let verifier = Verifier::new(config, registry);
    let requester = RequesterId::new();

    verifier
        .verify(license_request(&requester))
        .await
        .expect("license verification");
    let single = verifier
        .trust()
        .multi_source_score(&requester, Utc::now());
    assert!(single > 0.0);

    let passport = VerificationRequest::new(
        requester.clone(),
        DocumentType::Passport,
        code("US"),
        DocumentNumber::new("P7654321").expect("valid document number"),
    )
    .with_field("full_name", "Jane Example");
    verifier
        .verify(passport)
        .await
        .expect("passport verification");

    let double = verifier
        .trust()
        .multi_source_score(&requester, Utc::now());
    assert!(double > single);
    assert!(double <= 1.0);
    assert_eq!(verifier.trust().scopes_for(&requester).len(), 2);
}

#[tokio::test]
async fn audit_trail_supports_filtered_export() {
    let config = ServiceConfig::default().without_rate_limiting();
    let verifier = Verifier::new(config, us_dmv_registry());
    let requester = RequesterId::new();

    let consent = verifier.grant_consent(
        requester.clone(),
        BTreeSet::new(),
        BTreeSet::new(),
        "identity verification",
    );
    verifier
        .verify(license_request(&requester).with_consent(consent.id.clone()))
        .await
        .expect("verification");
    verifier.revoke_consent(&consent.id).expect("revoke");

    assert_eq!(verifier.audit().len(), 3);

    let verifications = verifier.audit().list(
        &AuditFilter::any()
            .for_requester(requester.clone())
            .with_action(AuditAction::VerificationAttempted),
    );
    assert_eq!(verifications.len(), 1);

    let json = verifier
        .audit()
        .export(
            &AuditFilter::any().for_requester(requester),
            veris_audit::ExportFormat::Json,
        )
        .expect("export");
    let parsed: serde_json::Value = serde_json::from_str(&json).expect("valid json");
    assert_eq!(parsed.as_array().map(Vec::len), Some(3));
}

#[tokio::test]
async fn housekeeping_eventually_clears_all_stores() {
    let config = ServiceConfig::default().without_rate_limiting();
    let verifier = Verifier::new(config, us_dmv_registry());
    let requester = RequesterId::new();

    let consent = verifier.grant_consent(
        requester.clone(),
        BTreeSet::new(),
        BTreeSet::new(),
        "identity verification",
    );
    verifier
        .verify(license_request(&requester).with_consent(consent.id))
        .await
        .expect("verification");

    // Nothing is due yet.
    let report = verifier.run_housekeeping(Utc::now());
    assert_eq!(report.total(), 0);

    // Far past every retention window and expiry, one pass drains the
    // consent store, audit log, result cache, and trust scopes.
    let distant = Utc::now() + Duration::days(20_000);
    let report = verifier.run_housekeeping(distant);
    assert!(report.consents_purged >= 1);
    assert!(report.audit_purged >= 3);
    assert!(report.results_purged >= 1);
    assert!(report.scopes_purged >= 1);

    let health = verifier.health();
    assert_eq!(health.consent_records, 0);
    assert_eq!(health.audit_entries, 0);
    assert_eq!(health.results_cached, 0);
    assert_eq!(health.trust_scopes, 0);
}
