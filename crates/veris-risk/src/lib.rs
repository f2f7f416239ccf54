//! # veris-risk: Fraud and Risk Engine
//!
//! Computes a fraud score and a recommended action for every checked
//! request. Four detectors run unconditionally (velocity, blacklist,
//! result analysis, liveness analysis); an external detector plug-in is
//! merged in when configured and available.
//!
//! ## Score Shape
//!
//! The aggregate score rewards one strong signal and lets corroborating
//! weaker signals push it further, without letting many weak signals
//! alone cross the block threshold: max signal score plus a small
//! fraction of the rest, clamped to [0, 1]. The coefficients are
//! configuration, not law; tests pin the qualitative shape.

pub mod config;
pub mod engine;
pub mod liveness;
pub mod plugin;
pub mod signal;

pub use config::FraudConfig;
pub use engine::FraudEngine;
pub use liveness::{LivenessResult, SpoofCategory};
pub use plugin::{
    ExternalAssessment, FraudDetector, FraudReport, FraudReporter, LivenessProbe, PluginError,
};
pub use signal::{FraudCheckResult, FraudSignal, RecommendedAction, Severity, SignalKind};
