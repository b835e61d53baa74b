use std::sync::Arc;

use algodraft_bridge::FrameBridge;
use algodraft_pipeline::GenerationPipeline;

use crate::config::ServerConfig;

/// Shared application state available to all Axum handlers via `State<AppState>`.
///
/// Cheaply cloneable (everything is behind `Arc`).
#[derive(Clone)]
pub struct AppState {
    /// Server configuration.
    pub config: Arc<ServerConfig>,
    /// Bridge to the embedded editor; the WebSocket handler attaches the
    /// live connection and feeds it inbound frames.
    pub bridge: Arc<FrameBridge>,
    /// The generation pipeline and its published run state.
    pub pipeline: Arc<GenerationPipeline>,
}
