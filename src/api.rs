//! HTTP control API for the generator.
//!
//! - `POST /start`, `POST /stop`, `GET /status` drive the controller
//! - `GET /health` and `GET /metrics` for operations

use crate::error::GenerationError;
use crate::generation::{GenerationController, GenerationStatus};
use crate::metrics;
use axum::extract::State;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::routing::{get, post};
use axum::{Json, Router};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::{info, warn};

/// HTTP API Server Configuration
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct ApiConfig {
    /// Host to bind to (default: 127.0.0.1)
    pub host: String,
    /// Port to listen on (default: 8080)
    pub port: u16,
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            host: "127.0.0.1".to_string(),
            port: 8080,
        }
    }
}

impl ApiConfig {
    pub fn bind_addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

/// Handle shared by every route.
pub type SharedController = Arc<GenerationController>;

// ============================================================================
// API Request/Response Types
// ============================================================================

/// Body of a successful start/stop.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LifecycleResponse {
    pub message: String,
    pub status: String,
}

/// Body of `GET /status`.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[allow(non_snake_case)]
pub struct StatusResponse {
    pub isGenerating: bool,
    pub status: String,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub sessionId: Option<String>,
}

impl From<GenerationStatus> for StatusResponse {
    fn from(status: GenerationStatus) -> Self {
        Self {
            isGenerating: status.is_generating,
            status: status.label().to_string(),
            message: "current generation status".to_string(),
            sessionId: status.session_id.map(|id| id.to_string()),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ErrorResponse {
    pub error: String,
}

impl IntoResponse for GenerationError {
    fn into_response(self) -> Response {
        let code = match &self {
            GenerationError::AlreadyRunning | GenerationError::NotRunning => StatusCode::CONFLICT,
            GenerationError::SinkUnavailable(_) => StatusCode::SERVICE_UNAVAILABLE,
            GenerationError::RuntimeUnavailable => StatusCode::INTERNAL_SERVER_ERROR,
        };
        (code, Json(ErrorResponse { error: self.to_string() })).into_response()
    }
}

// ============================================================================
// Handlers
// ============================================================================

async fn start(
    State(controller): State<SharedController>,
) -> Result<Json<LifecycleResponse>, GenerationError> {
    info!("POST /start");
    let status = controller.start().inspect_err(|err| warn!(error = %err, "start rejected"))?;
    Ok(Json(LifecycleResponse {
        message: "generation started".to_string(),
        status: status.label().to_string(),
    }))
}

async fn stop(
    State(controller): State<SharedController>,
) -> Result<Json<LifecycleResponse>, GenerationError> {
    info!("POST /stop");
    let status = controller.stop().inspect_err(|err| warn!(error = %err, "stop rejected"))?;
    Ok(Json(LifecycleResponse {
        message: "generation stopped".to_string(),
        status: status.label().to_string(),
    }))
}

async fn status(State(controller): State<SharedController>) -> Json<StatusResponse> {
    Json(controller.status().into())
}

async fn metrics_handler() -> String {
    metrics::render()
}

/// Build the control router.
pub fn router(controller: SharedController) -> Router {
    Router::new()
        .route("/start", post(start))
        .route("/stop", post(stop))
        .route("/status", get(status))
        .route("/metrics", get(metrics_handler))
        .route("/health", get(|| async { "OK" }))
        .with_state(controller)
}

/// API routes definition for documentation
pub fn api_routes() -> Vec<(&'static str, &'static str, &'static str)> {
    vec![
        ("POST", "/start", "Start generating measurements"),
        ("POST", "/stop", "Stop the running generation session"),
        ("GET", "/status", "Report whether generation is running"),
        ("GET", "/metrics", "Prometheus metrics"),
        ("GET", "/health", "Liveness probe"),
    ]
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::SinkError;
    use axum::body::to_bytes;

    async fn body_json(response: Response) -> serde_json::Value {
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        serde_json::from_slice(&bytes).unwrap()
    }

    #[tokio::test]
    async fn lifecycle_conflicts_map_to_409() {
        let response = GenerationError::AlreadyRunning.into_response();
        assert_eq!(response.status(), StatusCode::CONFLICT);
        assert_eq!(body_json(response).await["error"], "already running");

        let response = GenerationError::NotRunning.into_response();
        assert_eq!(response.status(), StatusCode::CONFLICT);
        assert_eq!(body_json(response).await["error"], "not running");
    }

    #[tokio::test]
    async fn unavailable_sink_maps_to_503() {
        let err = GenerationError::SinkUnavailable(SinkError::Unavailable("down".into()));
        assert_eq!(err.into_response().status(), StatusCode::SERVICE_UNAVAILABLE);
    }

    #[test]
    fn status_response_uses_labels() {
        let status = GenerationStatus {
            is_generating: false,
            state: crate::generation::GenerationState::Idle,
            session_id: None,
            started_at: None,
        };
        let body = serde_json::to_value(StatusResponse::from(status)).unwrap();
        assert_eq!(body["isGenerating"], false);
        assert_eq!(body["status"], "stopped");
        assert!(body.get("sessionId").is_none());
    }
}
