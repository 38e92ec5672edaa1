//! Facial-Expression Boundary
//!
//! The expression model itself runs elsewhere; this crate normalizes its
//! scored class output into a labeled emotion with a confidence gate.

use serde::{Deserialize, Serialize};
use tracing::debug;

/// Minimum confidence for promoting the top class to a real label
pub const CONFIDENCE_THRESHOLD: f32 = 0.4;

/// Emotion label set, plus sentinels for absent or low-confidence detection
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Emotion {
    Happy,
    Sad,
    Angry,
    Fearful,
    Disgusted,
    Surprised,
    Neutral,

    /// No face or no usable expression output
    Unknown,

    /// A face was scored but below the confidence threshold
    Uncertain,
}

impl Emotion {
    /// Map a raw detector class name ("happy", "neutral", ...) to a label
    pub fn from_class_name(name: &str) -> Self {
        match name.to_lowercase().as_str() {
            "happy" => Emotion::Happy,
            "sad" => Emotion::Sad,
            "angry" => Emotion::Angry,
            "fearful" => Emotion::Fearful,
            "disgusted" => Emotion::Disgusted,
            "surprised" => Emotion::Surprised,
            "neutral" => Emotion::Neutral,
            _ => Emotion::Unknown,
        }
    }

    /// Display label ("Happy", "unknown", ...)
    pub fn as_str(&self) -> &'static str {
        match self {
            Emotion::Happy => "Happy",
            Emotion::Sad => "Sad",
            Emotion::Angry => "Angry",
            Emotion::Fearful => "Fearful",
            Emotion::Disgusted => "Disgusted",
            Emotion::Surprised => "Surprised",
            Emotion::Neutral => "Neutral",
            Emotion::Unknown => "unknown",
            Emotion::Uncertain => "uncertain",
        }
    }

    /// True for the Unknown/Uncertain sentinels
    pub fn is_sentinel(&self) -> bool {
        matches!(self, Emotion::Unknown | Emotion::Uncertain)
    }
}

impl std::fmt::Display for Emotion {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Labeled emotion with the score it was promoted from
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct EmotionResult {
    pub emotion: Emotion,
    pub confidence: f32,
}

impl EmotionResult {
    /// Pick the highest-scoring class and gate it on the confidence
    /// threshold. Empty score sets yield Unknown.
    pub fn from_scores(scores: &[(String, f32)]) -> Self {
        let top = scores
            .iter()
            .max_by(|a, b| a.1.partial_cmp(&b.1).unwrap_or(std::cmp::Ordering::Equal));

        let Some((class, confidence)) = top else {
            return Self {
                emotion: Emotion::Unknown,
                confidence: 0.0,
            };
        };

        let emotion = if *confidence > CONFIDENCE_THRESHOLD {
            Emotion::from_class_name(class)
        } else {
            Emotion::Uncertain
        };

        debug!(class = %class, confidence, label = %emotion, "Expression scores resolved");

        Self {
            emotion,
            confidence: *confidence,
        }
    }

    /// Result for frames where no face was found
    pub fn unknown() -> Self {
        Self {
            emotion: Emotion::Unknown,
            confidence: 0.0,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn scores(pairs: &[(&str, f32)]) -> Vec<(String, f32)> {
        pairs.iter().map(|(n, c)| (n.to_string(), *c)).collect()
    }

    #[test]
    fn test_top_class_promoted_above_threshold() {
        let result = EmotionResult::from_scores(&scores(&[
            ("fearful", 0.72),
            ("neutral", 0.2),
            ("sad", 0.08),
        ]));

        assert_eq!(result.emotion, Emotion::Fearful);
        assert!((result.confidence - 0.72).abs() < f32::EPSILON);
    }

    #[test]
    fn test_low_confidence_stays_uncertain() {
        let result = EmotionResult::from_scores(&scores(&[("happy", 0.39), ("neutral", 0.35)]));

        assert_eq!(result.emotion, Emotion::Uncertain);
    }

    #[test]
    fn test_threshold_is_strict() {
        // Exactly 0.4 is not enough
        let result = EmotionResult::from_scores(&scores(&[("angry", 0.4)]));
        assert_eq!(result.emotion, Emotion::Uncertain);
    }

    #[test]
    fn test_empty_scores_are_unknown() {
        let result = EmotionResult::from_scores(&[]);
        assert_eq!(result.emotion, Emotion::Unknown);
    }

    #[test]
    fn test_unmapped_class_is_unknown() {
        let result = EmotionResult::from_scores(&scores(&[("contempt", 0.9)]));
        assert_eq!(result.emotion, Emotion::Unknown);
    }

    #[test]
    fn test_display_labels() {
        assert_eq!(Emotion::Happy.to_string(), "Happy");
        assert_eq!(Emotion::Unknown.to_string(), "unknown");
        assert_eq!(Emotion::Uncertain.to_string(), "uncertain");
        assert!(Emotion::Uncertain.is_sentinel());
        assert!(!Emotion::Neutral.is_sentinel());
    }
}
