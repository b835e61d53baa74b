//! The seam between the bridge and the transport that reaches the editor.
//!
//! The bridge never talks to a socket directly: it sends through an
//! [`EditorChannel`] and is fed [`InboundMessage`]s by whoever owns the
//! connection (the API layer's WebSocket handler in production, an
//! in-memory fake in tests).

/// One raw message received from the editor's channel.
///
/// `origin` is the sender's origin as established by the transport (the
/// `Origin` header of the WebSocket upgrade). The bridge validates it
/// against the trusted editor origin before the body is ever parsed.
#[derive(Debug, Clone)]
pub struct InboundMessage {
    pub origin: String,
    pub body: String,
}

/// Errors from the outbound half of the channel.
#[derive(Debug, thiserror::Error)]
pub enum ChannelError {
    /// The connection to the editor is gone; the message was not delivered.
    #[error("editor channel closed")]
    Closed,
}

/// Outbound half of the editor connection.
///
/// Implementations queue the JSON text for delivery; delivery itself is
/// fire-and-forget (the protocol has no acknowledgements).
pub trait EditorChannel: Send + Sync {
    fn send(&self, text: String) -> Result<(), ChannelError>;
}

/// Any unbounded mpsc sender of strings can act as the outbound half.
///
/// This is the production shape: the WebSocket handler owns the receiving
/// end and forwards each string as a text frame.
impl EditorChannel for tokio::sync::mpsc::UnboundedSender<String> {
    fn send(&self, text: String) -> Result<(), ChannelError> {
        tokio::sync::mpsc::UnboundedSender::send(self, text).map_err(|_| ChannelError::Closed)
    }
}
