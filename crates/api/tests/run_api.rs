mod common;

use std::sync::Arc;
use std::time::Duration;

use axum::http::StatusCode;
use tokio::sync::mpsc;

use algodraft_bridge::InboundMessage;
use algodraft_core::{GenerationRun, RunStatus};
use algodraft_pipeline::GenerationPipeline;

use common::{body_json, build_test_app, get, post, TRUSTED_ORIGIN};

/// Wait for the published run to reach a terminal status.
async fn wait_for_terminal(pipeline: &Arc<GenerationPipeline>) -> GenerationRun {
    let mut rx = pipeline.subscribe();
    tokio::time::timeout(Duration::from_secs(2), async {
        loop {
            let run = rx.borrow_and_update().clone();
            if run.status.is_terminal() {
                return run;
            }
            rx.changed().await.expect("pipeline dropped");
        }
    })
    .await
    .expect("run did not reach a terminal status")
}

#[tokio::test]
async fn run_starts_idle() {
    let dir = tempfile::tempdir().unwrap();
    let app = build_test_app(dir.path());

    let response = get(app.router, "/api/v1/run").await;
    assert_eq!(response.status(), StatusCode::OK);

    let body = body_json(response).await;
    assert_eq!(body["data"]["status"], "idle");
    assert_eq!(body["data"]["code_output"], "");
    assert_eq!(body["data"]["logs"].as_array().unwrap().len(), 0);
    assert_eq!(body["data"]["errors"].as_array().unwrap().len(), 0);
}

#[tokio::test]
async fn templates_catalog_lists_built_ins() {
    let dir = tempfile::tempdir().unwrap();
    let app = build_test_app(dir.path());

    let response = get(app.router, "/api/v1/templates").await;
    assert_eq!(response.status(), StatusCode::OK);

    let body = body_json(response).await;
    let entries = body["data"].as_array().unwrap();
    assert_eq!(entries.len(), 3);

    let names: Vec<_> = entries.iter().map(|e| e["name"].as_str().unwrap()).collect();
    assert_eq!(names, ["div_by_zero", "nested_loop", "reusable_function"]);
    assert_eq!(entries[1]["title"], "Nested Loop");
}

#[tokio::test]
async fn loading_an_unknown_template_is_404_and_recorded() {
    let dir = tempfile::tempdir().unwrap();
    let app = build_test_app(dir.path());

    let response = post(app.router.clone(), "/api/v1/templates/missing/load").await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);

    let body = body_json(response).await;
    assert_eq!(body["code"], "NOT_FOUND");

    // The failure is also visible on the published run.
    let response = get(app.router, "/api/v1/run").await;
    let body = body_json(response).await;
    assert_eq!(body["data"]["status"], "idle");
    let errors = body["data"]["errors"].as_array().unwrap();
    assert_eq!(errors.len(), 1);
    assert!(errors[0].as_str().unwrap().contains("missing"));
}

#[tokio::test]
async fn loading_a_template_without_an_editor_is_503() {
    let dir = tempfile::tempdir().unwrap();
    std::fs::write(dir.path().join("nested_loop.drawio"), "<mxfile/>").unwrap();
    let app = build_test_app(dir.path());

    let response = post(app.router, "/api/v1/templates/nested_loop/load").await;
    assert_eq!(response.status(), StatusCode::SERVICE_UNAVAILABLE);

    let body = body_json(response).await;
    assert_eq!(body["code"], "EDITOR_UNAVAILABLE");
}

#[tokio::test]
async fn loading_a_template_sends_it_to_the_editor() {
    let dir = tempfile::tempdir().unwrap();
    let content = "<mxfile>nested</mxfile>";
    std::fs::write(dir.path().join("nested_loop.drawio"), content).unwrap();
    let app = build_test_app(dir.path());

    let (tx, mut editor_rx) = mpsc::unbounded_channel::<String>();
    app.bridge.attach(Arc::new(tx));

    let response = post(app.router, "/api/v1/templates/nested_loop/load").await;
    assert_eq!(response.status(), StatusCode::ACCEPTED);

    let sent: serde_json::Value = serde_json::from_str(&editor_rx.try_recv().unwrap()).unwrap();
    assert_eq!(sent["action"], "load");
    assert_eq!(sent["xml"], content);
    assert_eq!(sent["title"], "Nested Loop");
}

#[tokio::test]
async fn generating_without_an_editor_fails_the_run() {
    let dir = tempfile::tempdir().unwrap();
    let app = build_test_app(dir.path());

    let response = post(app.router.clone(), "/api/v1/generate").await;
    assert_eq!(response.status(), StatusCode::ACCEPTED);

    let run = wait_for_terminal(&app.pipeline).await;
    assert_eq!(run.status, RunStatus::Failed);
    assert_eq!(run.errors.len(), 1);
    assert!(run.errors[0].contains("Diagram export failed"));

    // The outcome is observable over HTTP as well.
    let response = get(app.router, "/api/v1/run").await;
    let body = body_json(response).await;
    assert_eq!(body["data"]["status"], "failed");
}

#[tokio::test]
async fn generating_while_a_run_is_in_flight_is_409() {
    let dir = tempfile::tempdir().unwrap();
    let app = build_test_app(dir.path());

    // Attach an editor so the first run parks awaiting the export reply.
    let (tx, mut editor_rx) = mpsc::unbounded_channel::<String>();
    app.bridge.attach(Arc::new(tx));

    let response = post(app.router.clone(), "/api/v1/generate").await;
    assert_eq!(response.status(), StatusCode::ACCEPTED);

    let response = post(app.router.clone(), "/api/v1/generate").await;
    assert_eq!(response.status(), StatusCode::CONFLICT);
    let body = body_json(response).await;
    assert_eq!(body["code"], "BUSY");

    // Once the export command is out, the reply slot is registered.
    let sent = tokio::time::timeout(Duration::from_secs(2), editor_rx.recv())
        .await
        .expect("export command was never sent")
        .unwrap();
    let sent: serde_json::Value = serde_json::from_str(&sent).unwrap();
    assert_eq!(sent["action"], "export");

    app.bridge.handle_message(&InboundMessage {
        origin: TRUSTED_ORIGIN.to_string(),
        body: r#"{"event":"export","xml":"<diagram/>"}"#.to_string(),
    });

    // Nothing listens at the generator URL, so the upload fails and the
    // run finishes as failure data rather than an error.
    let run = wait_for_terminal(&app.pipeline).await;
    assert_eq!(run.status, RunStatus::Failed);
    assert_eq!(run.errors.len(), 1);
    assert!(run.errors[0].contains("Code generation failed"));
    assert_eq!(run.code_output, "");
}
