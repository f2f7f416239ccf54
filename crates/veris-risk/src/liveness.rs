//! # Liveness Analysis Types
//!
//! The normalized output of the (external) liveness-detection pipeline,
//! consumed by the fraud engine when attached to a check. The pipeline
//! itself is out of scope; only its verdict crosses this boundary.

use serde::{Deserialize, Serialize};

/// The class of presentation attack a liveness check detected.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SpoofCategory {
    /// Synthetic or manipulated imagery.
    Deepfake,
    /// Physical mask.
    Mask,
    /// Printed photo.
    Photo,
    /// Replay from a screen.
    Screen,
}

impl SpoofCategory {
    /// Return the string value for serialization.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Deepfake => "deepfake",
            Self::Mask => "mask",
            Self::Photo => "photo",
            Self::Screen => "screen",
        }
    }
}

impl std::fmt::Display for SpoofCategory {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Verdict of one liveness check.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LivenessResult {
    /// Whether the subject passed the liveness check.
    pub passed: bool,
    /// Confidence of the verdict, within [0, 1].
    pub confidence: f64,
    /// The detected presentation attack, when one was classified.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub spoof: Option<SpoofCategory>,
}

impl LivenessResult {
    /// A passed check at the given confidence.
    pub fn passed(confidence: f64) -> Self {
        Self {
            passed: true,
            confidence: confidence.clamp(0.0, 1.0),
            spoof: None,
        }
    }

    /// A failed check with an optional spoof classification.
    pub fn failed(confidence: f64, spoof: Option<SpoofCategory>) -> Self {
        Self {
            passed: false,
            confidence: confidence.clamp(0.0, 1.0),
            spoof,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn constructors_clamp_confidence() {
        assert_eq!(LivenessResult::passed(1.4).confidence, 1.0);
        assert_eq!(LivenessResult::failed(-0.5, None).confidence, 0.0);
    }

    #[test]
    fn spoof_strings() {
        assert_eq!(SpoofCategory::Deepfake.to_string(), "deepfake");
        assert_eq!(SpoofCategory::Screen.to_string(), "screen");
    }

    #[test]
    fn serde_roundtrip() {
        let result = LivenessResult::failed(0.3, Some(SpoofCategory::Mask));
        let json = serde_json::to_string(&result).unwrap();
        let back: LivenessResult = serde_json::from_str(&json).unwrap();
        assert_eq!(back, result);
    }
}
