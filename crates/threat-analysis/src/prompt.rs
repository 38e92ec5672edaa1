//! Prompt construction for the threat-assessment request

use chrono::{Local, Timelike};
use detection::DetectionResult;
use emotion::Emotion;

use crate::assessment::GeoPoint;

const MAX_PROMPT_OBJECTS: usize = 5;

/// Render the user prompt for a panic event.
///
/// Pure apart from the time-of-day tag, which is derived from the current
/// local wall-clock hour rather than the event timestamp.
pub fn build_prompt(
    location: Option<&GeoPoint>,
    detection: Option<&DetectionResult>,
    emotion: Emotion,
) -> String {
    build_prompt_at(location, detection, emotion, Local::now().hour())
}

pub(crate) fn build_prompt_at(
    location: Option<&GeoPoint>,
    detection: Option<&DetectionResult>,
    emotion: Emotion,
    hour: u32,
) -> String {
    format!(
        r#"EMERGENCY ALERT DETAILS:
======================================
An emergency alert has been triggered by a person from {location}.
Facial emotion analysis shows the person {emotion}.

Scene analysis from camera:
{scene}

======================================

Based on this information, please provide a detailed threat assessment with the following:

1. THREAT LEVEL (must be exactly one of these values: "Low", "Medium", or "High")
2. A detailed, personalized SAFETY RECOMMENDATION that takes into account the detected emotion and surroundings
3. REASONING that explains your assessment, incorporating the detected objects and emotion

Please format your response as detailed, expressive, and empathetic text that speaks directly to the person in danger.
Use a calm but authoritative tone, avoiding technical language.

IMPORTANT: Your response MUST be in the following JSON format without any additional text or explanation outside the JSON:

{{
  "threat_level": "Low/Medium/High",
  "recommendation": "Your detailed safety recommendation...",
  "reasoning": "Your detailed reasoning..."
}}

DO NOT include any other text before or after the JSON. Only return valid, parsable JSON."#,
        location = location_text(location, hour),
        emotion = emotion_text(emotion),
        scene = scene_text(detection),
    )
}

fn location_text(location: Option<&GeoPoint>, hour: u32) -> String {
    match location {
        Some(point) => format!(
            "latitude {:.6}, longitude {:.6} during the {}",
            point.latitude,
            point.longitude,
            time_of_day(hour)
        ),
        None => "unknown location".to_string(),
    }
}

fn time_of_day(hour: u32) -> &'static str {
    if hour < 12 {
        "morning"
    } else if hour < 18 {
        "afternoon"
    } else {
        "evening"
    }
}

fn scene_text(detection: Option<&DetectionResult>) -> String {
    let Some(result) = detection else {
        return "No image analysis available".to_string();
    };

    let mut text = if result.scene_description.is_empty() {
        "No clear description available".to_string()
    } else {
        result.scene_description.clone()
    };

    if !result.detected_objects.is_empty() {
        let count = result.detected_objects.len();
        let shown = result.detected_objects[..count.min(MAX_PROMPT_OBJECTS)].join(", ");
        let ellipsis = if count > MAX_PROMPT_OBJECTS { "..." } else { "" };
        text.push_str(&format!(
            "\nObjects detected in the image ({count} total): {shown}{ellipsis}"
        ));
    }

    if !result.dangerous_objects_found.is_empty() {
        text.push_str(&format!(
            "\n⚠️ POTENTIALLY DANGEROUS OBJECTS DETECTED: {} ⚠️",
            result.dangerous_objects_found.join(", ")
        ));
    }

    text
}

fn emotion_text(emotion: Emotion) -> &'static str {
    match emotion {
        Emotion::Happy => "appears to be happy, which may not correlate with a distress situation",
        Emotion::Sad => "appears to be sad or distressed",
        Emotion::Angry => "appears to be angry or upset",
        Emotion::Fearful => "appears to be fearful or frightened",
        Emotion::Disgusted => "appears to be disgusted or repulsed",
        Emotion::Surprised => "appears to be surprised or startled",
        Emotion::Neutral => "has a neutral facial expression",
        Emotion::Unknown | Emotion::Uncertain => "unknown emotional state",
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn detection_with(objects: &[&str], labels: &[&str]) -> DetectionResult {
        DetectionResult::from_annotations(
            objects.iter().map(|s| s.to_string()).collect(),
            labels.iter().map(|s| s.to_string()).collect(),
        )
    }

    #[test]
    fn test_location_formatting() {
        let point = GeoPoint {
            latitude: 12.971598,
            longitude: 77.594566,
        };

        assert_eq!(
            location_text(Some(&point), 9),
            "latitude 12.971598, longitude 77.594566 during the morning"
        );
        assert_eq!(
            location_text(Some(&point), 14),
            "latitude 12.971598, longitude 77.594566 during the afternoon"
        );
        assert_eq!(
            location_text(Some(&point), 22),
            "latitude 12.971598, longitude 77.594566 during the evening"
        );
        assert_eq!(location_text(None, 9), "unknown location");
    }

    #[test]
    fn test_time_of_day_bucket_edges() {
        assert_eq!(time_of_day(0), "morning");
        assert_eq!(time_of_day(11), "morning");
        assert_eq!(time_of_day(12), "afternoon");
        assert_eq!(time_of_day(17), "afternoon");
        assert_eq!(time_of_day(18), "evening");
        assert_eq!(time_of_day(23), "evening");
    }

    #[test]
    fn test_scene_text_without_detection() {
        assert_eq!(scene_text(None), "No image analysis available");
    }

    #[test]
    fn test_scene_text_truncates_at_five_objects() {
        let result = detection_with(
            &["person", "car", "bag", "phone", "tree", "bench", "dog"],
            &[],
        );

        let text = scene_text(Some(&result));
        assert!(text
            .contains("Objects detected in the image (7 total): person, car, bag, phone, tree..."));
        assert!(!text.contains("bench"));
    }

    #[test]
    fn test_scene_text_no_ellipsis_at_five_or_fewer() {
        let result = detection_with(&["person", "car"], &[]);

        let text = scene_text(Some(&result));
        assert!(text.contains("Objects detected in the image (2 total): person, car"));
        assert!(!text.contains("..."));
    }

    #[test]
    fn test_scene_text_warns_about_dangerous_objects() {
        let result = detection_with(&["knife", "person"], &[]);

        let text = scene_text(Some(&result));
        assert!(text.contains("⚠️ POTENTIALLY DANGEROUS OBJECTS DETECTED: knife ⚠️"));
    }

    #[test]
    fn test_emotion_clauses() {
        assert_eq!(
            emotion_text(Emotion::Fearful),
            "appears to be fearful or frightened"
        );
        assert_eq!(emotion_text(Emotion::Unknown), "unknown emotional state");
        assert_eq!(emotion_text(Emotion::Uncertain), "unknown emotional state");
    }

    #[test]
    fn test_prompt_requests_strict_json() {
        let prompt = build_prompt_at(None, None, Emotion::Neutral, 10);

        assert!(prompt.contains("unknown location"));
        assert!(prompt.contains("No image analysis available"));
        assert!(prompt.contains("has a neutral facial expression"));
        assert!(prompt.contains("\"threat_level\": \"Low/Medium/High\""));
        assert!(prompt.contains("must be exactly one of these values: \"Low\", \"Medium\", or \"High\""));
        assert!(prompt.contains("DO NOT include any other text before or after the JSON."));
    }
}
