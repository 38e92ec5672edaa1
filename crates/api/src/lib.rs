//! Safety Alerting API Server
//!
//! HTTP surface for the panic pipeline: trigger endpoint, alert history,
//! and a health check.

use std::sync::Arc;

use axum::{
    extract::State,
    http::StatusCode,
    response::IntoResponse,
    routing::{get, post},
    Json, Router,
};
use serde::Serialize;
use tower_http::{cors::CorsLayer, trace::TraceLayer};
use tracing::{error, info, Level};
use tracing_subscriber::FmtSubscriber;

use history::KeyValueStore;
use pipeline::{PanicEvent, Pipeline, PipelineError};

type BoxedStore = Box<dyn KeyValueStore>;

/// Application state shared across handlers
pub struct AppState {
    /// Panic-event pipeline
    pub pipeline: Pipeline<BoxedStore>,
    /// Version string
    pub version: String,
    /// Start time
    pub start_time: std::time::Instant,
}

impl AppState {
    /// Create new application state around a wired pipeline
    pub fn new(pipeline: Pipeline<BoxedStore>) -> Self {
        Self {
            pipeline,
            version: env!("CARGO_PKG_VERSION").to_string(),
            start_time: std::time::Instant::now(),
        }
    }
}

/// Health response
#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: String,
    pub timestamp: u64,
    pub version: String,
    pub uptime_seconds: u64,
    pub alert_count: usize,
}

/// Response for the alerts endpoint
#[derive(Debug, Serialize)]
pub struct AlertsResponse {
    pub data: Vec<history::AlertRecord>,
    pub count: usize,
}

/// Error body
#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub error: String,
}

/// Create the application router
pub fn create_router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/api/v1/health", get(health_handler))
        .route("/api/v1/alerts", get(alerts_handler))
        .route("/api/v1/panic", post(panic_handler))
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
        .with_state(state)
}

/// Health check handler
async fn health_handler(State(state): State<Arc<AppState>>) -> impl IntoResponse {
    let timestamp = std::time::SystemTime::now()
        .duration_since(std::time::UNIX_EPOCH)
        .map(|d| d.as_secs())
        .unwrap_or(0);

    let alert_count = state.pipeline.recent_alerts().map(|a| a.len()).unwrap_or(0);

    Json(HealthResponse {
        status: "healthy".to_string(),
        timestamp,
        version: state.version.clone(),
        uptime_seconds: state.start_time.elapsed().as_secs(),
        alert_count,
    })
}

/// Recent alerts, most recent first
async fn alerts_handler(State(state): State<Arc<AppState>>) -> impl IntoResponse {
    match state.pipeline.recent_alerts() {
        Ok(data) => (
            StatusCode::OK,
            Json(AlertsResponse {
                count: data.len(),
                data,
            }),
        )
            .into_response(),
        Err(e) => {
            error!("Failed to read alert history: {e}");
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(ErrorResponse {
                    error: "alert history unavailable".to_string(),
                }),
            )
                .into_response()
        }
    }
}

/// Panic trigger: runs one event through the pipeline
async fn panic_handler(
    State(state): State<Arc<AppState>>,
    Json(event): Json<PanicEvent>,
) -> impl IntoResponse {
    match state.pipeline.handle_panic(event).await {
        Ok(record) => (StatusCode::OK, Json(record)).into_response(),
        Err(PipelineError::Busy) => (
            StatusCode::CONFLICT,
            Json(ErrorResponse {
                error: "a panic event is already being processed".to_string(),
            }),
        )
            .into_response(),
        Err(e) => {
            error!("Panic event failed: {e}");
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(ErrorResponse {
                    error: "failed to process panic event".to_string(),
                }),
            )
                .into_response()
        }
    }
}

/// Initialize logging
pub fn init_logging() {
    let subscriber = FmtSubscriber::builder()
        .with_max_level(Level::INFO)
        .with_target(true)
        .finish();

    tracing::subscriber::set_global_default(subscriber)
        .expect("Failed to set tracing subscriber");
}

/// Run the server
pub async fn run_server(addr: &str, state: Arc<AppState>) -> Result<(), Box<dyn std::error::Error>> {
    let app = create_router(state);

    info!("Starting API server on {}", addr);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
