//! Object Detection Boundary
//!
//! Consumes a remote image-annotation service and normalizes its output:
//! - Localized object and label extraction
//! - Dangerous-object matching against a fixed vocabulary
//! - Scene description synthesis

pub mod client;
pub mod result;

pub use client::{VisionClient, VisionConfig};
pub use result::{DetectionResult, DANGEROUS_OBJECTS};

use thiserror::Error;

/// Detection error types
#[derive(Error, Debug)]
pub enum DetectionError {
    #[error("Request failed: {0}")]
    Request(#[from] reqwest::Error),

    #[error("Annotation service returned status {0}")]
    Status(u16),

    #[error("Empty annotation response")]
    EmptyResponse,
}
