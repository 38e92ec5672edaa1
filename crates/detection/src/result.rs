//! Detection result model and dangerous-object matching

use serde::{Deserialize, Serialize};

/// Fixed vocabulary of weapon-class objects. A vocabulary entry counts as
/// found when any detected term contains it as a substring.
pub const DANGEROUS_OBJECTS: &[&str] = &[
    "knife", "dagger", "sword", "blade", "gun", "pistol", "firearm", "weapon", "rifle",
    "revolver", "shotgun", "handgun", "cutter", "machete", "axe",
];

/// Normalized output of the object-detection collaborator
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct DetectionResult {
    /// Lowercase object names, detector confidence order
    pub detected_objects: Vec<String>,

    /// Lowercase label annotations (scene-level terms)
    pub labels: Vec<String>,

    /// Vocabulary entries matched against the detected terms
    pub dangerous_objects_found: Vec<String>,

    /// Free-text scene summary
    pub scene_description: String,

    /// True iff dangerous_objects_found is non-empty
    pub has_dangerous_objects: bool,
}

impl DetectionResult {
    /// Build a result from raw annotation terms. Names are lowercased here;
    /// downstream matching is case-sensitive on these normalized terms.
    pub fn from_annotations(object_names: Vec<String>, label_descriptions: Vec<String>) -> Self {
        let detected_objects: Vec<String> =
            object_names.iter().map(|n| n.to_lowercase()).collect();
        let labels: Vec<String> = label_descriptions.iter().map(|l| l.to_lowercase()).collect();

        let dangerous_objects_found = match_dangerous(&detected_objects, &labels);
        let scene_description = describe_scene(&detected_objects, &labels);
        let has_dangerous_objects = !dangerous_objects_found.is_empty();

        Self {
            detected_objects,
            labels,
            dangerous_objects_found,
            scene_description,
            has_dangerous_objects,
        }
    }

    /// First dangerous object, in vocabulary order
    pub fn first_dangerous(&self) -> Option<&str> {
        self.dangerous_objects_found.first().map(|s| s.as_str())
    }
}

fn match_dangerous(objects: &[String], labels: &[String]) -> Vec<String> {
    DANGEROUS_OBJECTS
        .iter()
        .filter(|entry| {
            objects
                .iter()
                .chain(labels.iter())
                .any(|term| term.contains(*entry))
        })
        .map(|entry| entry.to_string())
        .collect()
}

fn describe_scene(objects: &[String], labels: &[String]) -> String {
    if !objects.is_empty() {
        let mut description = format!("The image shows {}", objects[..objects.len().min(3)].join(", "));
        if !labels.is_empty() {
            description.push_str(&format!(
                " and appears to be in a {} setting",
                labels[..labels.len().min(2)].join(", ")
            ));
        }
        description
    } else if !labels.is_empty() {
        format!(
            "The image shows a scene that can be described as {}",
            labels[..labels.len().min(3)].join(", ")
        )
    } else {
        "No clear objects or scene could be identified in the image".to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_dangerous_match_is_substring_containment() {
        let result = DetectionResult::from_annotations(
            vec!["Kitchen Knife".to_string(), "table".to_string()],
            vec!["indoor".to_string()],
        );

        assert_eq!(result.dangerous_objects_found, vec!["knife"]);
        assert!(result.has_dangerous_objects);
        assert_eq!(result.first_dangerous(), Some("knife"));
    }

    #[test]
    fn test_labels_also_matched_for_danger() {
        let result = DetectionResult::from_annotations(
            vec!["person".to_string()],
            vec!["Handgun".to_string()],
        );

        // "handgun" contains both "gun" and "handgun", vocabulary order kept
        assert_eq!(result.dangerous_objects_found, vec!["gun", "handgun"]);
    }

    #[test]
    fn test_no_dangerous_objects() {
        let result = DetectionResult::from_annotations(
            vec!["person".to_string(), "tree".to_string()],
            vec![],
        );

        assert!(result.dangerous_objects_found.is_empty());
        assert!(!result.has_dangerous_objects);
    }

    #[test]
    fn test_scene_from_objects_and_labels() {
        let result = DetectionResult::from_annotations(
            vec![
                "person".to_string(),
                "car".to_string(),
                "bag".to_string(),
                "phone".to_string(),
            ],
            vec!["street".to_string(), "night".to_string(), "city".to_string()],
        );

        assert_eq!(
            result.scene_description,
            "The image shows person, car, bag and appears to be in a street, night setting"
        );
    }

    #[test]
    fn test_scene_from_labels_only() {
        let result = DetectionResult::from_annotations(
            vec![],
            vec!["park".to_string(), "outdoor".to_string()],
        );

        assert_eq!(
            result.scene_description,
            "The image shows a scene that can be described as park, outdoor"
        );
    }

    #[test]
    fn test_scene_empty() {
        let result = DetectionResult::from_annotations(vec![], vec![]);

        assert_eq!(
            result.scene_description,
            "No clear objects or scene could be identified in the image"
        );
    }

    #[test]
    fn test_names_lowercased() {
        let result = DetectionResult::from_annotations(
            vec!["Person".to_string()],
            vec!["Street Light".to_string()],
        );

        assert_eq!(result.detected_objects, vec!["person"]);
        assert_eq!(result.labels, vec!["street light"]);
    }
}
