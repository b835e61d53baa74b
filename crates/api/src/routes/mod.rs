pub mod health;

use axum::routing::{get, post};
use axum::Router;

use crate::handlers;
use crate::state::AppState;

/// Build the `/api/v1` route tree.
///
/// ```text
/// /generate                  POST  trigger a generation run
/// /run                       GET   current run snapshot
/// /templates                 GET   example-diagram catalog
/// /templates/{name}/load     POST  load an example into the editor
/// ```
pub fn api_routes() -> Router<AppState> {
    Router::new()
        .route("/generate", post(handlers::generation::trigger))
        .route("/run", get(handlers::generation::current_run))
        .route("/templates", get(handlers::templates::list))
        .route("/templates/{name}/load", post(handlers::templates::load))
}
