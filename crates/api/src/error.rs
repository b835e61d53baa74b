use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde_json::json;

use algodraft_bridge::BridgeError;
use algodraft_pipeline::{PipelineError, TemplateError};

/// Application-level error type for HTTP handlers.
///
/// Wraps [`PipelineError`] for domain errors and adds HTTP-specific
/// variants. Implements [`IntoResponse`] to produce consistent JSON error
/// responses.
#[derive(Debug, thiserror::Error)]
pub enum AppError {
    /// A domain-level error from the pipeline.
    #[error(transparent)]
    Pipeline(#[from] PipelineError),

    /// A bad request with a human-readable message.
    #[error("Bad request: {0}")]
    BadRequest(String),
}

/// Convenience type alias for handler return values.
pub type AppResult<T> = Result<T, AppError>;

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, code, message) = match &self {
            AppError::Pipeline(pipeline) => classify_pipeline_error(pipeline),
            AppError::BadRequest(msg) => (StatusCode::BAD_REQUEST, "BAD_REQUEST", msg.clone()),
        };

        let body = json!({
            "error": message,
            "code": code,
        });

        (status, axum::Json(body)).into_response()
    }
}

/// Classify a pipeline error into an HTTP status, error code, and message.
///
/// - Busy maps to 409 (the trigger was rejected, not queued).
/// - Unknown templates map to 404, bad names to 400.
/// - A missing editor connection maps to 503.
fn classify_pipeline_error(err: &PipelineError) -> (StatusCode, &'static str, String) {
    match err {
        PipelineError::Busy => (StatusCode::CONFLICT, "BUSY", err.to_string()),

        PipelineError::Template(template) => match template {
            TemplateError::NotFound { .. } => {
                (StatusCode::NOT_FOUND, "NOT_FOUND", template.to_string())
            }
            TemplateError::InvalidName(_) => {
                (StatusCode::BAD_REQUEST, "INVALID_NAME", template.to_string())
            }
            TemplateError::Io(e) => {
                tracing::error!(error = %e, "Template storage error");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "INTERNAL_ERROR",
                    "An internal error occurred".to_string(),
                )
            }
        },

        PipelineError::Bridge(bridge) => match bridge {
            BridgeError::NotAttached | BridgeError::ChannelClosed | BridgeError::Channel(_) => (
                StatusCode::SERVICE_UNAVAILABLE,
                "EDITOR_UNAVAILABLE",
                "The embedded editor is not connected".to_string(),
            ),
            other => {
                tracing::error!(error = %other, "Bridge error");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "INTERNAL_ERROR",
                    "An internal error occurred".to_string(),
                )
            }
        },

        PipelineError::State(e) => {
            tracing::error!(error = %e, "Run state machine error");
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                "INTERNAL_ERROR",
                "An internal error occurred".to_string(),
            )
        }
    }
}
