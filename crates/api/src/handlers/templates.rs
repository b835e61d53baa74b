//! Handlers for the example-diagram catalog.
//!
//! Routes:
//! - `GET  /templates`              — built-in template catalog
//! - `POST /templates/{name}/load`  — load an example into the editor

use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::Json;
use serde::Serialize;

use crate::error::AppResult;
use crate::response::DataResponse;
use crate::state::AppState;

/// One catalog entry as served to the sidebar menu.
#[derive(Debug, Serialize)]
pub struct TemplateInfo {
    pub name: &'static str,
    pub title: &'static str,
}

/// GET /api/v1/templates
pub async fn list(State(state): State<AppState>) -> Json<DataResponse<Vec<TemplateInfo>>> {
    let templates = state
        .pipeline
        .templates()
        .list()
        .iter()
        .map(|entry| TemplateInfo {
            name: entry.name,
            title: entry.title,
        })
        .collect();

    Json(DataResponse { data: templates })
}

/// POST /api/v1/templates/{name}/load
///
/// Reads the named example document and sends it to the embedded editor.
/// Unknown names answer 404; every failure is also appended to the run's
/// `errors` so the UI sees it.
pub async fn load(
    State(state): State<AppState>,
    Path(name): Path<String>,
) -> AppResult<impl IntoResponse> {
    state.pipeline.load_example(&name).await?;

    Ok((
        StatusCode::ACCEPTED,
        Json(DataResponse { data: name }),
    ))
}
