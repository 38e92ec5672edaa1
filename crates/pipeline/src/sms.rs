//! SMS collaborator interface
//!
//! Message formatting and delivery (SMS URIs, carrier gateways) belong to
//! implementations; the pipeline only hands over the contact and the last
//! known location.

use thiserror::Error;
use threat_analysis::GeoPoint;
use tracing::info;

/// SMS error types
#[derive(Error, Debug)]
pub enum SmsError {
    #[error("Dispatch failed: {0}")]
    Dispatch(String),
}

/// Emergency SMS dispatch boundary
pub trait SmsGateway: Send + Sync {
    /// Fire-and-forget dispatch of an emergency message. `contact` may be
    /// absent (no configured number) and `location` may be absent
    /// (geolocation unavailable); implementations handle both.
    fn send_location(
        &self,
        contact: Option<&str>,
        location: Option<&GeoPoint>,
    ) -> Result<(), SmsError>;
}

/// Gateway that only records the dispatch in the log stream
#[derive(Debug, Default)]
pub struct LogSmsGateway;

impl SmsGateway for LogSmsGateway {
    fn send_location(
        &self,
        contact: Option<&str>,
        location: Option<&GeoPoint>,
    ) -> Result<(), SmsError> {
        match (contact, location) {
            (Some(contact), Some(point)) => info!(
                contact,
                latitude = point.latitude,
                longitude = point.longitude,
                "Emergency SMS dispatched"
            ),
            (Some(contact), None) => {
                info!(contact, "Emergency SMS dispatched without location")
            }
            (None, _) => info!("No emergency contact configured; SMS skipped"),
        }
        Ok(())
    }
}
