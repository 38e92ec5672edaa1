//! Simulated response construction

use chrono::Utc;
use detection::DetectionResult;
use rand::seq::SliceRandom;
use threat_analysis::{ThreatAssessment, ThreatLevel};
use tracing::warn;

/// Marker reasoning for the simulated paths
pub const SIMULATED_REASONING: &str = "Simulated response (API fallback)";

const LOW_RECOMMENDATION: &str =
    "No immediate danger detected. Stay vigilant and keep your phone accessible.";
const MEDIUM_RECOMMENDATION: &str =
    "Potential risk detected. Move to a more public area and consider contacting a trusted person.";
const HIGH_RECOMMENDATION: &str = "Serious threat detected. Seek immediate shelter, call emergency services (100/112), and share your location with trusted contacts.";

/// Build an assessment without any model reply.
///
/// Dangerous objects force a High assessment with urgent advice. A clean
/// detection result keeps the Low default. With no detection at all the
/// level is picked uniformly at random, each with fixed advisory text.
pub fn simulated_assessment(
    detection: Option<&DetectionResult>,
    analyzed_image: &str,
) -> ThreatAssessment {
    warn!("Language-model service unavailable; producing simulated assessment");

    let mut threat_level = ThreatLevel::Low;
    let mut recommendation = LOW_RECOMMENDATION.to_string();
    let mut reasoning = SIMULATED_REASONING.to_string();

    match detection {
        Some(result) if result.has_dangerous_objects => {
            let list = result.dangerous_objects_found.join(", ");
            threat_level = ThreatLevel::High;
            recommendation = format!(
                "ALERT: Dangerous objects detected ({list}). Seek immediate shelter, call emergency services (100/112), and share your location with trusted contacts."
            );
            reasoning = format!("Dangerous objects detected: {list}");
        }
        Some(_) => {}
        None => {
            let levels = [ThreatLevel::Low, ThreatLevel::Medium, ThreatLevel::High];
            threat_level = *levels
                .choose(&mut rand::thread_rng())
                .unwrap_or(&ThreatLevel::Low);
            recommendation = match threat_level {
                ThreatLevel::Low => LOW_RECOMMENDATION,
                ThreatLevel::Medium => MEDIUM_RECOMMENDATION,
                ThreatLevel::High => HIGH_RECOMMENDATION,
            }
            .to_string();
        }
    }

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

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_dangerous_objects_force_high() {
        let detection = DetectionResult::from_annotations(
            vec!["gun".to_string(), "person".to_string()],
            vec![],
        );

        let assessment = simulated_assessment(Some(&detection), "img");

        assert_eq!(assessment.threat_level, ThreatLevel::High);
        assert!(assessment
            .recommendation
            .starts_with("ALERT: Dangerous objects detected (gun)."));
        assert_eq!(assessment.reasoning, "Dangerous objects detected: gun");
    }

    #[test]
    fn test_safe_detection_stays_low() {
        let detection =
            DetectionResult::from_annotations(vec!["person".to_string()], vec![]);

        let assessment = simulated_assessment(Some(&detection), "img");

        assert_eq!(assessment.threat_level, ThreatLevel::Low);
        assert_eq!(assessment.recommendation, LOW_RECOMMENDATION);
        assert_eq!(assessment.reasoning, SIMULATED_REASONING);
    }

    #[test]
    fn test_no_detection_picks_some_level_with_matching_text() {
        let assessment = simulated_assessment(None, "img");

        let expected = match assessment.threat_level {
            ThreatLevel::Low => LOW_RECOMMENDATION,
            ThreatLevel::Medium => MEDIUM_RECOMMENDATION,
            ThreatLevel::High => HIGH_RECOMMENDATION,
        };
        assert_eq!(assessment.recommendation, expected);
        assert_eq!(assessment.reasoning, SIMULATED_REASONING);
        assert!(assessment.detected_objects.is_empty());
    }

    #[test]
    fn test_image_passed_through() {
        let assessment = simulated_assessment(None, "data:image/jpeg;base64,abc");
        assert_eq!(assessment.analyzed_image, "data:image/jpeg;base64,abc");
    }
}
