//! Image annotation client

use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::result::DetectionResult;
use crate::DetectionError;

const OBJECT_MAX_RESULTS: u32 = 10;
const LABEL_MAX_RESULTS: u32 = 10;

/// Annotation service configuration
#[derive(Debug, Clone)]
pub struct VisionConfig {
    /// Annotate endpoint URL
    pub endpoint: String,
    /// API key, passed as a query parameter
    pub api_key: String,
}

impl Default for VisionConfig {
    fn default() -> Self {
        Self {
            endpoint: "https://vision.googleapis.com/v1/images:annotate".to_string(),
            api_key: String::new(),
        }
    }
}

#[derive(Debug, Serialize)]
struct AnnotateRequest {
    requests: Vec<AnnotateEntry>,
}

#[derive(Debug, Serialize)]
struct AnnotateEntry {
    image: ImageContent,
    features: Vec<Feature>,
}

#[derive(Debug, Serialize)]
struct ImageContent {
    content: String,
}

#[derive(Debug, Serialize)]
struct Feature {
    #[serde(rename = "type")]
    feature_type: &'static str,
    #[serde(rename = "maxResults")]
    max_results: u32,
}

#[derive(Debug, Deserialize)]
struct AnnotateResponse {
    #[serde(default)]
    responses: Vec<AnnotateEntryResponse>,
}

#[derive(Debug, Default, Deserialize)]
struct AnnotateEntryResponse {
    #[serde(rename = "localizedObjectAnnotations", default)]
    localized_object_annotations: Vec<ObjectAnnotation>,
    #[serde(rename = "labelAnnotations", default)]
    label_annotations: Vec<LabelAnnotation>,
}

#[derive(Debug, Deserialize)]
struct ObjectAnnotation {
    name: String,
}

#[derive(Debug, Deserialize)]
struct LabelAnnotation {
    description: String,
}

/// Client for the remote object-detection service
pub struct VisionClient {
    config: VisionConfig,
    http: reqwest::Client,
}

impl VisionClient {
    /// Create a new client
    pub fn new(config: VisionConfig) -> Self {
        Self {
            config,
            http: reqwest::Client::new(),
        }
    }

    /// Annotate an image and normalize the result.
    ///
    /// Accepts raw base64 or a full data URL; any `data:image/...;base64,`
    /// prefix is stripped before upload.
    pub async fn detect(&self, image_base64: &str) -> Result<DetectionResult, DetectionError> {
        let content = strip_data_url_prefix(image_base64).to_string();

        let request = AnnotateRequest {
            requests: vec![AnnotateEntry {
                image: ImageContent { content },
                features: vec![
                    Feature {
                        feature_type: "OBJECT_LOCALIZATION",
                        max_results: OBJECT_MAX_RESULTS,
                    },
                    Feature {
                        feature_type: "LABEL_DETECTION",
                        max_results: LABEL_MAX_RESULTS,
                    },
                ],
            }],
        };

        let url = format!("{}?key={}", self.config.endpoint, self.config.api_key);
        let response = self.http.post(&url).json(&request).send().await?;

        if !response.status().is_success() {
            warn!("Annotation service returned {}", response.status());
            return Err(DetectionError::Status(response.status().as_u16()));
        }

        let annotated: AnnotateResponse = response.json().await?;
        let entry = annotated
            .responses
            .into_iter()
            .next()
            .ok_or(DetectionError::EmptyResponse)?;

        let objects: Vec<String> = entry
            .localized_object_annotations
            .into_iter()
            .map(|o| o.name)
            .collect();
        let labels: Vec<String> = entry
            .label_annotations
            .into_iter()
            .map(|l| l.description)
            .collect();

        debug!(
            objects = objects.len(),
            labels = labels.len(),
            "Annotation response received"
        );

        Ok(DetectionResult::from_annotations(objects, labels))
    }
}

fn strip_data_url_prefix(image: &str) -> &str {
    if let Some(rest) = image.strip_prefix("data:") {
        if let Some(idx) = rest.find("base64,") {
            return &rest[idx + "base64,".len()..];
        }
    }
    image
}
