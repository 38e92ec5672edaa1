//! Threat Assessment Core
//!
//! Turns a panic event's raw inputs into a canonical threat assessment:
//! - Prompt construction from location, scene analysis, and emotion
//! - One-shot chat-completion call to the remote language model
//! - Response normalization: a possibly malformed or adversarial model
//!   reply always becomes a fully-populated [`ThreatAssessment`]

pub mod assessment;
pub mod client;
pub mod normalizer;
pub mod prompt;

pub use assessment::{GeoPoint, ThreatAssessment, ThreatLevel};
pub use client::{ChatClient, ChatConfig, RemoteCallError};
pub use normalizer::{default_assessment, normalize};
pub use prompt::build_prompt;
