//! Panic-Event Pipeline
//!
//! Orchestrates one panic event at a time through its collaborators:
//! best-effort SMS, object detection, emotion promotion, remote threat
//! analysis (or its degraded fallbacks), and the alert history. Input
//! acquisition (camera, geolocation) happens upstream; events arrive with
//! the captured frame and optional coordinates already attached.

pub mod settings;
pub mod sms;

mod orchestrator;

pub use orchestrator::{PanicEvent, Pipeline};
pub use settings::{ChatSettings, ConfigError, Settings, VisionSettings};
pub use sms::{LogSmsGateway, SmsError, SmsGateway};

use thiserror::Error;

/// Pipeline error types
#[derive(Error, Debug)]
pub enum PipelineError {
    #[error("A panic event is already in flight")]
    Busy,

    #[error("History error: {0}")]
    History(#[from] history::HistoryError),
}
