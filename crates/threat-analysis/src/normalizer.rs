//! Response normalization
//!
//! Turns the raw model reply into a [`ThreatAssessment`]. The reply may be
//! clean JSON, JSON buried in a code fence or prose, a refusal, or
//! free-form text; every shape produces a fully-populated record. This
//! function cannot fail.
//!
//! Extraction is an ordered cascade and the order is load-bearing:
//! explicit structured JSON beats labeled sections, labeled sections beat
//! paragraph heuristics.

use chrono::Utc;
use detection::DetectionResult;
use once_cell::sync::Lazy;
use regex::Regex;
use tracing::debug;

use crate::assessment::{ThreatAssessment, ThreatLevel};

const REFUSAL_PREFIXES: &[&str] = &["I cannot", "I'm sorry", "As an AI", "I apologize"];

const DEFAULT_RECOMMENDATION: &str =
    "Please remain vigilant and stay aware of your surroundings.";
const DEFAULT_REASONING: &str = "Analysis based on the available information.";

const REFUSAL_RECOMMENDATION: &str = "Based on the image and information provided, I recommend staying aware of your surroundings and contacting someone you trust if you feel unsafe.";
const REFUSAL_REASONING: &str = "The system could not provide a complete analysis with the information available. This is a default safety recommendation.";

const ERROR_RECOMMENDATION: &str = "There was an error analyzing your situation. If you feel you're in danger, please contact emergency services immediately.";
const ERROR_REASONING: &str = "Error processing the threat analysis";

static FENCED_BLOCK: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"```(?:json)?\s*([\s\S]*?)\s*```").unwrap());
static OBJECT_LITERAL: Lazy<Regex> = Lazy::new(|| Regex::new(r"\{[\s\S]*?\}").unwrap());

static THREAT_PATTERNS: Lazy<Vec<Regex>> = Lazy::new(|| {
    vec![
        Regex::new(r#"(?i)threat level:?\s*["']?([A-Za-z]+)["']?"#).unwrap(),
        Regex::new(r#"(?i)threat_level["']?:\s*["']?([A-Za-z]+)["']?"#).unwrap(),
        Regex::new(r"(?i)threat[^\n]*?(low|medium|high)").unwrap(),
    ]
});

static RECOMMENDATION_PATTERNS: Lazy<Vec<Regex>> = Lazy::new(|| {
    vec![
        Regex::new(r"(?i)recommendation:?\s*([\s\S]*?)(?:\n\s*reasoning|\n\s*\d|\n\s*$)").unwrap(),
        Regex::new(r"(?i)safety recommendation:?\s*([\s\S]*?)(?:\n\s*reasoning|\n\s*\d|\n\s*$)")
            .unwrap(),
        // 2-3 sentence run
        Regex::new(r"(?i)(\w[^.!?]*[.!?]\s?[^.!?]*[.!?]\s?[^.!?]*[.!?])").unwrap(),
    ]
});

static REASONING_PATTERNS: Lazy<Vec<Regex>> = Lazy::new(|| {
    vec![
        Regex::new(r"(?i)reasoning:?\s*([\s\S]*?)(?:\n\s*\d|\n\s*$)").unwrap(),
        Regex::new(r"(?i)analysis:?\s*([\s\S]*?)(?:\n\s*\d|\n\s*$)").unwrap(),
    ]
});

static PARAGRAPH_SPLIT: Lazy<Regex> = Lazy::new(|| Regex::new(r"\n\n|\r\n\r\n").unwrap());

/// Candidate fields pulled out of the reply before normalization
#[derive(Debug, Default, serde::Deserialize)]
struct ParsedReply {
    #[serde(default)]
    threat_level: Option<String>,
    #[serde(default)]
    recommendation: Option<String>,
    #[serde(default)]
    reasoning: Option<String>,
}

impl ParsedReply {
    fn refusal_defaults() -> Self {
        Self {
            threat_level: Some("Medium".to_string()),
            recommendation: Some(REFUSAL_RECOMMENDATION.to_string()),
            reasoning: Some(REFUSAL_REASONING.to_string()),
        }
    }
}

/// Normalize a raw model reply into a complete assessment.
pub fn normalize(
    raw: &str,
    detection: Option<&DetectionResult>,
    analyzed_image: &str,
) -> ThreatAssessment {
    let parsed = if is_refusal(raw) {
        debug!("Model declined to answer; substituting default fields");
        ParsedReply::refusal_defaults()
    } else {
        match parse_structured(raw) {
            Some(reply) => reply,
            None => extract_unstructured(raw, detection),
        }
    };

    finalize(parsed, detection, analyzed_image)
}

/// Minimal record for when no reply text is available at all, e.g. a
/// completion that arrived without choices. Distinct from the simulated
/// fallback: this path still reflects the detection result.
pub fn default_assessment(
    detection: Option<&DetectionResult>,
    analyzed_image: &str,
) -> ThreatAssessment {
    let (threat_level, recommendation, reasoning) = match detection {
        Some(result) if result.has_dangerous_objects => {
            let list = result.dangerous_objects_found.join(", ");
            (
                ThreatLevel::High,
                format!(
                    "⚠️ ALERT: Dangerous objects detected ({list}). Please seek safety immediately and contact emergency services if needed."
                ),
                format!("Dangerous objects detected: {list}"),
            )
        }
        Some(result) => (
            ThreatLevel::Medium,
            ERROR_RECOMMENDATION.to_string(),
            format!("Image analysis: {}", result.scene_description),
        ),
        None => (
            ThreatLevel::Medium,
            ERROR_RECOMMENDATION.to_string(),
            ERROR_REASONING.to_string(),
        ),
    };

    ThreatAssessment {
        threat_level,
        recommendation,
        reasoning,
        analyzed_image: analyzed_image.to_string(),
        timestamp: Utc::now(),
        detected_objects: detection.map(|d| d.detected_objects.clone()).unwrap_or_default(),
        dangerous_objects: detection
            .map(|d| d.dangerous_objects_found.clone())
            .unwrap_or_default(),
        emotion: None,
    }
}

fn is_refusal(raw: &str) -> bool {
    REFUSAL_PREFIXES.iter().any(|p| raw.starts_with(p))
}

/// Pick the single best JSON candidate (fenced block, then first
/// brace-delimited literal, then the raw text) and try to parse it.
fn parse_structured(raw: &str) -> Option<ParsedReply> {
    let candidate = if let Some(inner) = FENCED_BLOCK
        .captures(raw)
        .and_then(|caps| caps.get(1))
        .map(|m| m.as_str())
        .filter(|s| !s.is_empty())
    {
        inner
    } else if let Some(found) = OBJECT_LITERAL.find(raw) {
        found.as_str()
    } else {
        raw
    };

    serde_json::from_str(candidate).ok()
}

/// Derive the three fields from free text when JSON extraction failed.
fn extract_unstructured(content: &str, detection: Option<&DetectionResult>) -> ParsedReply {
    let mut threat_level = "Medium".to_string();
    for pattern in THREAT_PATTERNS.iter() {
        if let Some(level) = pattern
            .captures(content)
            .and_then(|caps| caps.get(1))
            .map(|m| m.as_str())
            .filter(|s| !s.is_empty())
        {
            threat_level = level.trim().to_string();
            break;
        }
    }
    if detection.is_some_and(|d| d.has_dangerous_objects) {
        threat_level = "High".to_string();
    }

    let mut recommendation = String::new();
    for pattern in RECOMMENDATION_PATTERNS.iter() {
        if let Some(section) = pattern
            .captures(content)
            .and_then(|caps| caps.get(1))
            .map(|m| m.as_str())
            .filter(|s| s.len() > 20)
        {
            recommendation = section.trim().to_string();
            break;
        }
    }
    if recommendation.len() < 20 {
        let parts: Vec<&str> = PARAGRAPH_SPLIT.split(content).collect();
        if let Some(first) = parts.first() {
            recommendation = first.trim().to_string();
            if parts.len() > 1 && recommendation.len() < 50 {
                recommendation = format!("{} {}", first.trim(), parts[1].trim());
            }
        } else {
            recommendation = content.chars().take(200).collect::<String>().trim().to_string();
        }
    }

    let mut reasoning = String::new();
    for pattern in REASONING_PATTERNS.iter() {
        if let Some(section) = pattern
            .captures(content)
            .and_then(|caps| caps.get(1))
            .map(|m| m.as_str())
            .filter(|s| !s.is_empty())
        {
            reasoning = section.trim().to_string();
            break;
        }
    }
    if reasoning.is_empty() {
        let parts: Vec<&str> = PARAGRAPH_SPLIT.split(content).collect();
        reasoning = if parts.len() > 1 {
            parts[1].trim().to_string()
        } else {
            "Based on the available information and scene analysis.".to_string()
        };
    }

    debug!(threat_level = %threat_level, "Fields recovered from unstructured reply");

    ParsedReply {
        threat_level: Some(threat_level),
        recommendation: Some(if recommendation.is_empty() {
            DEFAULT_RECOMMENDATION.to_string()
        } else {
            recommendation
        }),
        reasoning: Some(reasoning),
    }
}

/// Normalization applied regardless of which path produced the fields:
/// level reclassification, the dangerous-object override, and non-empty
/// guarantees for both text fields.
fn finalize(
    parsed: ParsedReply,
    detection: Option<&DetectionResult>,
    analyzed_image: &str,
) -> ThreatAssessment {
    let mut threat_level =
        ThreatLevel::classify(parsed.threat_level.as_deref().unwrap_or("Medium"));
    let mut recommendation = parsed.recommendation.unwrap_or_default();

    if let Some(result) = detection {
        if result.has_dangerous_objects {
            threat_level = ThreatLevel::High;

            // Case-sensitive containment against the detector's normalized names
            if !recommendation.is_empty() {
                if let Some(first) = result.first_dangerous() {
                    if !recommendation.contains(first) {
                        recommendation = format!(
                            "⚠️ ALERT: Dangerous objects detected ({}). {}",
                            result.dangerous_objects_found.join(", "),
                            recommendation
                        );
                    }
                }
            }
        }
    }

    if recommendation.is_empty() {
        recommendation = DEFAULT_RECOMMENDATION.to_string();
    }

    let reasoning = match parsed.reasoning {
        Some(text) if !text.is_empty() => text,
        _ => DEFAULT_REASONING.to_string(),
    };

    ThreatAssessment {
        threat_level,
        recommendation,
        reasoning,
        analyzed_image: analyzed_image.to_string(),
        timestamp: Utc::now(),
        detected_objects: detection.map(|d| d.detected_objects.clone()).unwrap_or_default(),
        dangerous_objects: detection
            .map(|d| d.dangerous_objects_found.clone())
            .unwrap_or_default(),
        emotion: None,
    }
}
