//! # Service Configuration
//!
//! One document configures the whole core: admission, retention, trust,
//! fraud, and cost policy. Defaults are usable out of the box;
//! deployments load overrides from YAML and the `VERIS_*` environment
//! variables.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use veris_audit::ExportFormat;
use veris_core::RetentionSchedule;
use veris_cost::CostModel;
use veris_risk::FraudConfig;
use veris_trust::TrustConfig;

/// Configuration loading failures.
#[derive(Error, Debug)]
pub enum ConfigError {
    /// The YAML document did not parse into a configuration.
    #[error("invalid configuration document: {0}")]
    InvalidDocument(#[from] serde_yaml::Error),

    /// An environment override carried an unparseable value.
    #[error("invalid value for {variable}: \"{value}\"")]
    InvalidEnvValue {
        /// The environment variable.
        variable: String,
        /// The rejected value.
        value: String,
    },
}

/// Per-requester admission ceilings. A ceiling of 0 disables that
/// window.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct RateLimitConfig {
    /// Whether rate limiting is enforced at all.
    pub enabled: bool,
    /// Requests allowed per minute. 0 = unlimited.
    pub per_minute: u32,
    /// Requests allowed per hour. 0 = unlimited.
    pub per_hour: u32,
    /// Requests allowed per day. 0 = unlimited.
    pub per_day: u32,
    /// Extra headroom on the per-minute ceiling for short bursts.
    pub burst: u32,
}

impl Default for RateLimitConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            per_minute: 60,
            per_hour: 1_000,
            per_day: 10_000,
            burst: 10,
        }
    }
}

/// Top-level configuration for [`crate::Verifier`].
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ServiceConfig {
    /// Master switch. A disabled service rejects every request.
    pub enabled: bool,
    /// Default timeout handed to adapters, in seconds. The orchestrator
    /// itself imposes no timeout.
    pub default_timeout_secs: u64,
    /// Retry ceiling handed to adapters.
    pub max_retries: u32,
    /// Retry backoff handed to adapters, in milliseconds.
    pub retry_backoff_ms: u64,
    /// Admission ceilings.
    pub rate_limit: RateLimitConfig,
    /// Whether the consent gate is enforced.
    pub require_consent: bool,
    /// Duration of consents granted through the orchestrator, in days.
    pub default_consent_days: u32,
    /// Per-jurisdiction retention windows.
    pub retention: RetentionSchedule,
    /// Trust integration policy.
    pub trust: TrustConfig,
    /// Fraud engine policy.
    pub fraud: FraudConfig,
    /// Cost models keyed by adapter name.
    pub cost_models: BTreeMap<String, CostModel>,
    /// Format used by audit exports when the caller does not choose one.
    pub export_format: ExportFormat,
    /// Whether the post-verification fraud check runs.
    pub fraud_checks_enabled: bool,
    /// Whether successful verifications create trust scopes.
    pub trust_integration_enabled: bool,
    /// Optional ceiling on stored audit entries. `None` = unbounded.
    pub audit_capacity: Option<usize>,
}

impl Default for ServiceConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            default_timeout_secs: 30,
            max_retries: 3,
            retry_backoff_ms: 500,
            rate_limit: RateLimitConfig::default(),
            require_consent: true,
            default_consent_days: 365,
            retention: RetentionSchedule::default(),
            trust: TrustConfig::default(),
            fraud: FraudConfig::default(),
            cost_models: BTreeMap::new(),
            export_format: ExportFormat::Json,
            fraud_checks_enabled: true,
            trust_integration_enabled: true,
            audit_capacity: None,
        }
    }
}

impl ServiceConfig {
    /// Parse a configuration from a YAML document. Missing fields take
    /// their defaults.
    pub fn from_yaml_str(yaml: &str) -> Result<Self, ConfigError> {
        Ok(serde_yaml::from_str(yaml)?)
    }

    /// Apply `VERIS_*` environment overrides on top of this
    /// configuration.
    ///
    /// Variables:
    /// - `VERIS_ENABLED` (bool)
    /// - `VERIS_REQUIRE_CONSENT` (bool)
    /// - `VERIS_RATE_LIMIT_ENABLED` (bool)
    /// - `VERIS_DEFAULT_TIMEOUT_SECS` (u64)
    pub fn apply_env(mut self) -> Result<Self, ConfigError> {
        if let Some(value) = read_env_bool("VERIS_ENABLED")? {
            self.enabled = value;
        }
        if let Some(value) = read_env_bool("VERIS_REQUIRE_CONSENT")? {
            self.require_consent = value;
        }
        if let Some(value) = read_env_bool("VERIS_RATE_LIMIT_ENABLED")? {
            self.rate_limit.enabled = value;
        }
        if let Ok(value) = std::env::var("VERIS_DEFAULT_TIMEOUT_SECS") {
            self.default_timeout_secs =
                value
                    .parse()
                    .map_err(|_| ConfigError::InvalidEnvValue {
                        variable: "VERIS_DEFAULT_TIMEOUT_SECS".to_string(),
                        value,
                    })?;
        }
        Ok(self)
    }

    /// Builder: disable the consent gate.
    pub fn without_consent(mut self) -> Self {
        self.require_consent = false;
        self
    }

    /// Builder: disable rate limiting.
    pub fn without_rate_limiting(mut self) -> Self {
        self.rate_limit.enabled = false;
        self
    }

    /// Builder: set the admission ceilings.
    pub fn with_rate_limit(mut self, rate_limit: RateLimitConfig) -> Self {
        self.rate_limit = rate_limit;
        self
    }

    /// Builder: register a cost model for an adapter.
    pub fn with_cost_model(mut self, adapter: impl Into<String>, model: CostModel) -> Self {
        self.cost_models.insert(adapter.into(), model);
        self
    }

    /// Builder: set the retention schedule.
    pub fn with_retention(mut self, retention: RetentionSchedule) -> Self {
        self.retention = retention;
        self
    }
}

fn read_env_bool(variable: &str) -> Result<Option<bool>, ConfigError> {
    match std::env::var(variable) {
        Ok(value) => match value.to_ascii_lowercase().as_str() {
            "1" | "true" | "yes" | "on" => Ok(Some(true)),
            "0" | "false" | "no" | "off" => Ok(Some(false)),
            _ => Err(ConfigError::InvalidEnvValue {
                variable: variable.to_string(),
                value,
            }),
        },
        Err(_) => Ok(None),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_are_enforcing() {
        let config = ServiceConfig::default();
        assert!(config.enabled);
        assert!(config.require_consent);
        assert!(config.rate_limit.enabled);
        assert!(config.fraud_checks_enabled);
        assert!(config.trust_integration_enabled);
        assert!(config.cost_models.is_empty());
    }

    #[test]
    fn yaml_overrides_partial_fields() {
        let yaml = r#"
enabled: true
require_consent: false
rate_limit:
  enabled: true
  per_minute: 5
  per_hour: 50
  per_day: 500
  burst: 0
default_consent_days: 90
"#;
        let config = ServiceConfig::from_yaml_str(yaml).unwrap();
        assert!(!config.require_consent);
        assert_eq!(config.rate_limit.per_minute, 5);
        assert_eq!(config.default_consent_days, 90);
        // Unmentioned fields keep their defaults.
        assert_eq!(config.default_timeout_secs, 30);
        assert_eq!(config.fraud.block_threshold, 0.8);
    }

    #[test]
    fn yaml_rejects_malformed_documents() {
        assert!(ServiceConfig::from_yaml_str("enabled: [not, a, bool]").is_err());
    }

    #[test]
    fn builders_toggle_gates() {
        let config = ServiceConfig::default()
            .without_consent()
            .without_rate_limiting();
        assert!(!config.require_consent);
        assert!(!config.rate_limit.enabled);
    }

    #[test]
    fn cost_model_builder() {
        let config = ServiceConfig::default()
            .with_cost_model("us-dmv", CostModel::per_call(50, "USD"));
        assert!(config.cost_models.contains_key("us-dmv"));
    }

    #[test]
    fn serde_roundtrip() {
        let config = ServiceConfig::default();
        let json = serde_json::to_string(&config).unwrap();
        let back: ServiceConfig = serde_json::from_str(&json).unwrap();
        assert_eq!(back.enabled, config.enabled);
        assert_eq!(back.rate_limit, config.rate_limit);
    }
}
