use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use algodraft_api::config::ServerConfig;
use algodraft_api::router::build_app_router;
use algodraft_api::state::AppState;
use algodraft_bridge::FrameBridge;
use algodraft_pipeline::{GenerationPipeline, GeneratorApi, TemplateStore};

#[tokio::main]
async fn main() {
    dotenvy::dotenv().ok();

    // --- Tracing ---
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "algodraft_api=debug,tower_http=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    // --- Configuration ---
    let config = ServerConfig::from_env();
    tracing::info!(host = %config.host, port = %config.port, "Loaded server configuration");

    // --- Frame bridge ---
    let bridge = Arc::new(FrameBridge::new(
        config.editor_origin.clone(),
        Duration::from_secs(config.export_timeout_secs),
    ));
    tracing::info!(origin = %config.editor_origin, "Frame bridge created");

    // --- Generation pipeline ---
    let generator = Arc::new(GeneratorApi::new(config.generator_url.clone()));
    let templates = TemplateStore::new(config.templates_dir.clone());
    let pipeline = Arc::new(GenerationPipeline::new(
        Arc::clone(&bridge),
        generator,
        templates,
    ));
    tracing::info!(generator_url = %config.generator_url, "Generation pipeline created");

    // --- App state ---
    let state = AppState {
        config: Arc::new(config.clone()),
        bridge: Arc::clone(&bridge),
        pipeline,
    };

    // --- Router ---
    let app = build_app_router(state, &config);

    // --- Start server ---
    let addr = SocketAddr::new(
        config.host.parse().expect("Invalid HOST address"),
        config.port,
    );
    tracing::info!(%addr, "Starting server");

    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .expect("Failed to bind to address");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .expect("Server error");

    // --- Post-shutdown cleanup ---
    tracing::info!("Server stopped accepting connections, cleaning up");

    // Drop the editor connection; pending export requests are discarded.
    bridge.detach();

    tracing::info!("Graceful shutdown complete");
}

/// Wait for a termination signal to initiate graceful shutdown.
///
/// Handles both SIGINT (Ctrl-C) and SIGTERM (on Unix) so the server
/// shuts down cleanly whether stopped interactively or by a process
/// manager (e.g. systemd, Docker, Kubernetes).
async fn shutdown_signal() {
    let ctrl_c = async {
        tokio::signal::ctrl_c()
            .await
            .expect("Failed to install Ctrl-C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate())
            .expect("Failed to install SIGTERM handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        () = ctrl_c => {
            tracing::info!("Received SIGINT (Ctrl-C), starting graceful shutdown");
        }
        () = terminate => {
            tracing::info!("Received SIGTERM, starting graceful shutdown");
        }
    }
}
