//! Panic-event orchestration

use std::collections::HashMap;

use detection::VisionClient;
use emotion::EmotionResult;
use fallback::simulated_assessment;
use history::{AlertHistory, AlertRecord, KeyValueStore};
use metrics::counter;
use serde::Deserialize;
use threat_analysis::{
    build_prompt, default_assessment, normalize, ChatClient, GeoPoint, RemoteCallError,
};
use tokio::sync::Mutex;
use tracing::{info, warn};

use crate::settings::Settings;
use crate::sms::SmsGateway;
use crate::PipelineError;

/// One user-triggered panic event with its captured inputs.
///
/// The camera and geolocation collaborators run upstream; detection and
/// threat analysis run here.
#[derive(Debug, Clone, Deserialize)]
pub struct PanicEvent {
    /// Captured frame, base64 (optionally a full data URL)
    pub image_base64: String,

    /// Last known coordinates, when geolocation succeeded
    #[serde(default)]
    pub location: Option<GeoPoint>,

    /// Raw expression scores from the face-expression collaborator
    #[serde(default)]
    pub expression_scores: HashMap<String, f32>,
}

/// Panic-event pipeline. Processes one event at a time; a second trigger
/// while one is in flight is rejected as busy rather than queued.
pub struct Pipeline<S: KeyValueStore> {
    vision: VisionClient,
    chat: ChatClient,
    history: AlertHistory<S>,
    sms: Box<dyn SmsGateway>,
    emergency_contact: Option<String>,
    busy: Mutex<()>,
}

impl<S: KeyValueStore> Pipeline<S> {
    /// Wire up the pipeline from settings and its stores
    pub fn new(settings: Settings, store: S, sms: Box<dyn SmsGateway>) -> Self {
        Self {
            vision: VisionClient::new(settings.vision.into()),
            chat: ChatClient::new(settings.chat.into()),
            history: AlertHistory::new(store),
            sms,
            emergency_contact: settings.emergency_contact,
            busy: Mutex::new(()),
        }
    }

    /// Run one panic event to completion.
    ///
    /// Collaborator failures degrade rather than abort: detection falls
    /// back to "no analysis", an unreachable language model falls back to
    /// the simulated assessment, and the SMS dispatch is best-effort. The
    /// caller always gets a recorded assessment unless the pipeline is
    /// busy or the history store itself fails.
    pub async fn handle_panic(&self, event: PanicEvent) -> Result<AlertRecord, PipelineError> {
        let _guard = self.busy.try_lock().map_err(|_| PipelineError::Busy)?;

        counter!("panic_events_total").increment(1);
        info!(has_location = event.location.is_some(), "Panic event received");

        // SMS goes out first so help is requested even if analysis fails
        if let Err(e) = self
            .sms
            .send_location(self.emergency_contact.as_deref(), event.location.as_ref())
        {
            warn!("Emergency SMS failed: {e}");
        }

        let detection = match self.vision.detect(&event.image_base64).await {
            Ok(result) => {
                if result.has_dangerous_objects {
                    warn!(objects = ?result.dangerous_objects_found, "Dangerous objects detected");
                }
                Some(result)
            }
            Err(e) => {
                warn!("Object detection unavailable, continuing without it: {e}");
                None
            }
        };

        let emotion = if event.expression_scores.is_empty() {
            EmotionResult::unknown()
        } else {
            let scores: Vec<(String, f32)> = event
                .expression_scores
                .iter()
                .map(|(class, score)| (class.clone(), *score))
                .collect();
            EmotionResult::from_scores(&scores)
        };

        let prompt = build_prompt(event.location.as_ref(), detection.as_ref(), emotion.emotion);
        let mut assessment = match self.chat.complete(&prompt).await {
            Ok(raw) => normalize(&raw, detection.as_ref(), &event.image_base64),
            Err(RemoteCallError::EmptyCompletion) => {
                counter!("assessment_defaults_total").increment(1);
                warn!("Completion carried no reply text; using default assessment");
                default_assessment(detection.as_ref(), &event.image_base64)
            }
            Err(e) => {
                counter!("assessment_fallbacks_total").increment(1);
                warn!("Remote analysis failed, falling back to simulated response: {e}");
                simulated_assessment(detection.as_ref(), &event.image_base64)
            }
        };
        assessment.emotion = Some(emotion.emotion);

        let record = self.history.record(assessment, event.location)?;
        info!(
            id = %record.id,
            threat_level = %record.assessment.threat_level,
            "Panic event processed"
        );

        Ok(record)
    }

    /// Retained alerts, most recent first
    pub fn recent_alerts(&self) -> Result<Vec<AlertRecord>, PipelineError> {
        Ok(self.history.recent()?)
    }
}
