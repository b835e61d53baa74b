use std::path::Path;
use std::sync::Arc;
use std::time::Duration;

use axum::body::Body;
use axum::http::{Method, Request, Response};
use axum::Router;
use http_body_util::BodyExt;
use tower::ServiceExt;

use algodraft_api::config::ServerConfig;
use algodraft_api::router::build_app_router;
use algodraft_api::state::AppState;
use algodraft_bridge::FrameBridge;
use algodraft_pipeline::{GenerationPipeline, GeneratorApi, TemplateStore};

/// Origin the test bridge trusts.
pub const TRUSTED_ORIGIN: &str = "https://embed.diagrams.net";

/// Build a test `ServerConfig` with safe defaults.
pub fn test_config() -> ServerConfig {
    ServerConfig {
        host: "127.0.0.1".to_string(),
        port: 0,
        cors_origins: vec!["http://localhost:3000".to_string()],
        request_timeout_secs: 30,
        editor_origin: TRUSTED_ORIGIN.to_string(),
        // Nothing listens here; generation calls fail as network errors.
        generator_url: "http://127.0.0.1:1".to_string(),
        templates_dir: "templates".to_string(),
        export_timeout_secs: 5,
    }
}

/// Everything a test needs to drive the app and the bridge directly.
pub struct TestApp {
    pub router: Router,
    pub bridge: Arc<FrameBridge>,
    pub pipeline: Arc<GenerationPipeline>,
}

/// Build the full application router with all middleware layers.
///
/// Mirrors the wiring in `main.rs` so integration tests exercise the same
/// stack (CORS, request ID, timeout, tracing, panic recovery) that
/// production uses. `templates_dir` points the store at a test directory.
pub fn build_test_app(templates_dir: &Path) -> TestApp {
    let mut config = test_config();
    config.templates_dir = templates_dir.display().to_string();

    let bridge = Arc::new(FrameBridge::new(
        config.editor_origin.clone(),
        Duration::from_secs(config.export_timeout_secs),
    ));
    let generator = Arc::new(GeneratorApi::new(config.generator_url.clone()));
    let pipeline = Arc::new(GenerationPipeline::new(
        Arc::clone(&bridge),
        generator,
        TemplateStore::new(templates_dir),
    ));

    let state = AppState {
        config: Arc::new(config.clone()),
        bridge: Arc::clone(&bridge),
        pipeline: Arc::clone(&pipeline),
    };

    TestApp {
        router: build_app_router(state, &config),
        bridge,
        pipeline,
    }
}

/// Send a GET request to the router.
pub async fn get(app: Router, path: &str) -> Response<Body> {
    app.oneshot(
        Request::builder()
            .uri(path)
            .body(Body::empty())
            .unwrap(),
    )
    .await
    .unwrap()
}

/// Send a bodyless POST request to the router.
pub async fn post(app: Router, path: &str) -> Response<Body> {
    app.oneshot(
        Request::builder()
            .method(Method::POST)
            .uri(path)
            .body(Body::empty())
            .unwrap(),
    )
    .await
    .unwrap()
}

/// Collect a response body as JSON.
pub async fn body_json(response: Response<Body>) -> serde_json::Value {
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    serde_json::from_slice(&bytes).unwrap()
}
