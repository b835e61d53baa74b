//! The embedded editor's message channel.
//!
//! The editor connects here over WebSocket. The connection's `Origin`
//! header is captured at upgrade time and stamped onto every inbound
//! frame, so the bridge can validate each message against the trusted
//! editor origin. Outbound bridge commands flow through an mpsc channel
//! that this handler forwards as text frames.
//!
//! Connections from other origins are refused before the upgrade: letting
//! them attach would displace the real editor's channel even though the
//! bridge would drop their messages.

use std::sync::Arc;

use axum::extract::ws::{Message, WebSocket, WebSocketUpgrade};
use axum::extract::State;
use axum::http::{header, HeaderMap, StatusCode};
use axum::response::IntoResponse;
use futures::{SinkExt, StreamExt};
use tokio::sync::mpsc;

use algodraft_bridge::{EditorChannel, FrameBridge, InboundMessage};

use crate::state::AppState;

/// GET /ws/editor -- upgrade the embedded editor's connection.
pub async fn editor_ws_handler(
    ws: WebSocketUpgrade,
    headers: HeaderMap,
    State(state): State<AppState>,
) -> impl IntoResponse {
    let origin = headers
        .get(header::ORIGIN)
        .and_then(|v| v.to_str().ok())
        .unwrap_or_default()
        .to_string();

    if origin != state.config.editor_origin {
        tracing::warn!(%origin, "Rejected editor WebSocket from untrusted origin");
        return StatusCode::FORBIDDEN.into_response();
    }

    ws.on_upgrade(move |socket| handle_editor_socket(socket, origin, state.bridge))
        .into_response()
}

/// Manage the editor connection after upgrade.
///
/// Splits the socket into a sink (outbound) and stream (inbound), then:
///   1. Attaches an mpsc sender to the bridge as its outbound channel.
///   2. Spawns a sender task forwarding bridge commands to the sink.
///   3. Feeds inbound text frames to the bridge on the current task.
///   4. Detaches the bridge on disconnect, discarding pending requests.
async fn handle_editor_socket(socket: WebSocket, origin: String, bridge: Arc<FrameBridge>) {
    tracing::info!(%origin, "Editor WebSocket connected");

    let (outbound_tx, mut outbound_rx) = mpsc::unbounded_channel::<String>();
    let channel: Arc<dyn EditorChannel> = Arc::new(outbound_tx);
    bridge.attach(Arc::clone(&channel));

    let (mut sink, mut stream) = socket.split();

    // Sender task: forward bridge commands to the WebSocket sink.
    let send_task = tokio::spawn(async move {
        while let Some(text) = outbound_rx.recv().await {
            if sink.send(Message::Text(text.into())).await.is_err() {
                tracing::debug!("Editor WebSocket sink closed");
                break;
            }
        }
    });

    // Receiver loop: every text frame becomes a bridge message.
    while let Some(result) = stream.next().await {
        match result {
            Ok(Message::Text(text)) => {
                bridge.handle_message(&InboundMessage {
                    origin: origin.clone(),
                    body: text.to_string(),
                });
            }
            Ok(Message::Close(_)) => break,
            Ok(Message::Ping(_) | Message::Pong(_)) => {
                // Handled automatically by axum.
            }
            Ok(_) => {}
            Err(e) => {
                tracing::debug!(error = %e, "Editor WebSocket receive error");
                break;
            }
        }
    }

    // Teardown: remove pending listeners before the consumer disappears.
    // Scoped to this connection's channel so a stale handler cannot tear
    // down a connection that replaced it.
    bridge.detach_if(&channel);
    send_task.abort();
    tracing::info!("Editor WebSocket disconnected");
}
