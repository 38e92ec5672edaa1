//! Threat level and assessment record

use chrono::{DateTime, Utc};
use emotion::Emotion;
use serde::{Deserialize, Serialize};

/// Geographic coordinates from the location collaborator
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GeoPoint {
    pub latitude: f64,
    pub longitude: f64,
}

/// Three-level classification surfaced to the user
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ThreatLevel {
    Low,
    Medium,
    High,
}

const LOW_KEYWORDS: &[&str] = &["low", "minimal", "none"];
const HIGH_KEYWORDS: &[&str] = &["high", "severe", "critical"];

impl ThreatLevel {
    /// Classify a raw model-provided level string by lowercase substring
    /// containment. The low group is checked before the high group; a
    /// string matching neither is Medium.
    pub fn classify(raw: &str) -> Self {
        let lower = raw.to_lowercase();
        if LOW_KEYWORDS.iter().any(|k| lower.contains(k)) {
            ThreatLevel::Low
        } else if HIGH_KEYWORDS.iter().any(|k| lower.contains(k)) {
            ThreatLevel::High
        } else {
            ThreatLevel::Medium
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            ThreatLevel::Low => "Low",
            ThreatLevel::Medium => "Medium",
            ThreatLevel::High => "High",
        }
    }
}

impl std::fmt::Display for ThreatLevel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Canonical output of threat assessment. Constructed exactly once per
/// panic event; the orchestrator attaches `emotion` immediately after
/// construction and nothing mutates the record afterwards.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ThreatAssessment {
    pub threat_level: ThreatLevel,

    /// Human-directed advisory, never empty
    pub recommendation: String,

    /// Explanation of the classification, never empty
    pub reasoning: String,

    /// Original image payload, passed through unchanged
    pub analyzed_image: String,

    /// Set at normalization time, not at capture time
    pub timestamp: DateTime<Utc>,

    pub detected_objects: Vec<String>,
    pub dangerous_objects: Vec<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub emotion: Option<Emotion>,
}
