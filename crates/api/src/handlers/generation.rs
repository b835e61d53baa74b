//! Handlers for the diagram-to-code generation workflow.
//!
//! Routes:
//! - `POST /generate` — trigger a generation run
//! - `GET  /run`      — current run snapshot (status, logs, errors, code)

use axum::extract::State;
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::Json;

use algodraft_core::GenerationRun;

use crate::error::AppResult;
use crate::response::DataResponse;
use crate::state::AppState;

/// POST /api/v1/generate
///
/// Starts a new run and answers immediately; progress and outcome are
/// observed via `GET /run`. Returns 409 while a run is already in flight
/// (triggers are rejected, never queued).
pub async fn trigger(State(state): State<AppState>) -> AppResult<impl IntoResponse> {
    state.pipeline.start_detached()?;
    tracing::info!("Generation run triggered");

    Ok((
        StatusCode::ACCEPTED,
        Json(DataResponse {
            data: state.pipeline.snapshot(),
        }),
    ))
}

/// GET /api/v1/run
///
/// The published snapshot of the current generation run. `code_output`
/// holds the most recent successful result, surviving failed runs.
pub async fn current_run(State(state): State<AppState>) -> Json<DataResponse<GenerationRun>> {
    Json(DataResponse {
        data: state.pipeline.snapshot(),
    })
}
