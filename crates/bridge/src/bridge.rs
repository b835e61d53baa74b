//! Request/response layer over the editor's one-way message channel.
//!
//! [`FrameBridge`] owns the correlation of outgoing requests with incoming
//! replies. The editor protocol has no request identifiers, so export
//! requests are serialized: at most one is pending at a time and a second
//! caller is rejected with [`BridgeError::Busy`]. Replies resolve the
//! pending request at most once; a reply that matches nothing is ignored.
//!
//! Inbound traffic is validated in two stages: messages whose origin does
//! not match the trusted editor origin are dropped before any parsing, and
//! trusted-origin messages that do not decode into a known event shape are
//! dropped silently, because the underlying channel also carries unrelated
//! traffic.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use chrono::{DateTime, Utc};
use tokio::sync::oneshot;

use crate::channel::{ChannelError, EditorChannel, InboundMessage};
use crate::messages::{parse_event, EditorCommand, EditorEvent, INITIAL_DOCUMENT_TITLE};

/// Errors surfaced to callers of the bridge's request API.
#[derive(Debug, thiserror::Error)]
pub enum BridgeError {
    /// An export request is already pending; the protocol cannot tell two
    /// concurrent replies apart, so new requests are rejected until the
    /// pending one resolves.
    #[error("an export request is already pending")]
    Busy,

    /// No editor connection is attached.
    #[error("no editor connection attached")]
    NotAttached,

    /// The editor never replied within the configured window.
    #[error("editor did not reply within {0:?}")]
    NoReply(Duration),

    /// The editor connection was torn down while the request was pending.
    #[error("editor channel closed while waiting for a reply")]
    ChannelClosed,

    /// Sending over the channel failed.
    #[error(transparent)]
    Channel(#[from] ChannelError),

    /// A command failed to encode as JSON.
    #[error("failed to encode editor command: {0}")]
    Encode(#[from] serde_json::Error),
}

/// One outstanding export request.
struct PendingExport {
    reply: oneshot::Sender<String>,
    /// Distinguishes this registration from successors during cleanup.
    generation: u64,
    /// When the request was registered. Diagnostics only.
    registered_at: DateTime<Utc>,
}

/// Bridge between the host and the embedded editor.
///
/// Created once and shared (`Arc`) between the pipeline and the WebSocket
/// handler that feeds it inbound messages. The pending-request slot is
/// mutated only by the bridge itself: registered on send, emptied on match,
/// timeout, or [`detach`](Self::detach).
pub struct FrameBridge {
    trusted_origin: String,
    export_timeout: Duration,
    channel: Mutex<Option<Arc<dyn EditorChannel>>>,
    pending_export: Mutex<Option<PendingExport>>,
    export_seq: AtomicU64,
}

impl FrameBridge {
    /// Create a bridge that trusts messages from `trusted_origin` and
    /// gives the editor `export_timeout` to answer an export request.
    pub fn new(trusted_origin: impl Into<String>, export_timeout: Duration) -> Self {
        Self {
            trusted_origin: trusted_origin.into(),
            export_timeout,
            channel: Mutex::new(None),
            pending_export: Mutex::new(None),
            export_seq: AtomicU64::new(0),
        }
    }

    /// Attach the outbound half of a live editor connection.
    ///
    /// Replaces any previous connection; a request pending against the old
    /// connection is discarded without firing, as in [`detach`](Self::detach).
    pub fn attach(&self, channel: Arc<dyn EditorChannel>) {
        self.drop_pending();
        *self.channel.lock().unwrap_or_else(|e| e.into_inner()) = Some(channel);
        tracing::info!(origin = %self.trusted_origin, "Editor channel attached");
    }

    /// Tear down the editor connection.
    ///
    /// The pending export listener (if any) is removed without being
    /// invoked; its caller observes [`BridgeError::ChannelClosed`].
    pub fn detach(&self) {
        *self.channel.lock().unwrap_or_else(|e| e.into_inner()) = None;
        self.drop_pending();
        tracing::info!("Editor channel detached");
    }

    /// Tear down the editor connection, but only if `channel` is still the
    /// attached one.
    ///
    /// Connection handlers tear down with this instead of
    /// [`detach`](Self::detach): when the editor reconnects before the stale
    /// socket's receive loop winds down, the stale handler must not displace
    /// the connection that already replaced it.
    pub fn detach_if(&self, channel: &Arc<dyn EditorChannel>) {
        {
            let mut slot = self.channel.lock().unwrap_or_else(|e| e.into_inner());
            match slot.as_ref() {
                Some(current) if Arc::ptr_eq(current, channel) => *slot = None,
                _ => return,
            }
        }
        self.drop_pending();
        tracing::info!("Editor channel detached");
    }

    /// Whether an editor connection is currently attached.
    pub fn is_attached(&self) -> bool {
        self.channel
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .is_some()
    }

    /// Ask the editor to export its current document and wait for the
    /// correlated reply.
    ///
    /// The reply callback fires at most once. Overlapping calls are
    /// rejected with [`BridgeError::Busy`]; a missing reply resolves to
    /// [`BridgeError::NoReply`] after the configured timeout instead of
    /// pending forever.
    pub async fn request_export(&self) -> Result<String, BridgeError> {
        let (rx, generation) = self.register_export()?;

        if let Err(e) = self.send_command(&EditorCommand::export()) {
            // The request never made it out; free the slot for the next caller.
            self.drop_pending_if(generation);
            return Err(e);
        }

        match tokio::time::timeout(self.export_timeout, rx).await {
            Ok(Ok(payload)) => Ok(payload),
            // Sender dropped: the connection was torn down while we waited.
            Ok(Err(_)) => Err(BridgeError::ChannelClosed),
            Err(_) => {
                self.drop_pending_if(generation);
                Err(BridgeError::NoReply(self.export_timeout))
            }
        }
    }

    /// Send new document content to the editor. Fire-and-forget: the
    /// protocol defines no reply for `load`, so nothing is registered.
    pub fn request_load(
        &self,
        xml: impl Into<String>,
        title: impl Into<String>,
    ) -> Result<(), BridgeError> {
        self.send_command(&EditorCommand::load(xml, title))
    }

    /// Feed one raw inbound message into the bridge.
    ///
    /// Called by the connection owner for every received frame. Untrusted
    /// origins are dropped unconditionally, before parsing and without
    /// logging as bridge traffic.
    pub fn handle_message(&self, msg: &InboundMessage) {
        if msg.origin != self.trusted_origin {
            return;
        }

        let event = match parse_event(&msg.body) {
            Ok(event) => event,
            Err(_) => {
                // Trusted origin, but not an editor event. The channel also
                // carries the host frame's own traffic; ignore it.
                tracing::trace!(body = %msg.body, "Ignoring non-event message from editor origin");
                return;
            }
        };

        match event {
            EditorEvent::Init => self.handle_init(),
            EditorEvent::Export { .. } => self.handle_export(&event),
        }
    }

    // ---- private helpers ----

    /// Handshake: the editor announced readiness, hand it the initial
    /// (blank) document. Exports are meaningless before this completes.
    fn handle_init(&self) {
        tracing::info!("Editor ready, loading initial document");
        if let Err(e) = self.request_load("", INITIAL_DOCUMENT_TITLE) {
            tracing::warn!(error = %e, "Failed to load initial document into editor");
        }
    }

    /// Resolve the pending export request, if one exists.
    fn handle_export(&self, event: &EditorEvent) {
        let Some(payload) = event.export_payload() else {
            // An export event with no document text is not the reply we
            // registered for; leave the pending request in place.
            tracing::trace!("Export event without payload, ignoring");
            return;
        };

        // Taking the entry empties the slot, so a duplicate reply finds
        // nothing to resolve.
        let Some(pending) = self
            .pending_export
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .take()
        else {
            tracing::debug!("Unsolicited export reply, no request pending");
            return;
        };

        let waited = Utc::now() - pending.registered_at;
        tracing::debug!(
            bytes = payload.len(),
            waited_ms = waited.num_milliseconds(),
            "Export reply received",
        );
        // The receiver may have timed out and gone away; nothing to do then.
        let _ = pending.reply.send(payload.to_string());
    }

    /// Register the one pending export slot, rejecting overlap.
    fn register_export(&self) -> Result<(oneshot::Receiver<String>, u64), BridgeError> {
        let mut pending = self
            .pending_export
            .lock()
            .unwrap_or_else(|e| e.into_inner());
        if pending.is_some() {
            return Err(BridgeError::Busy);
        }
        let generation = self.export_seq.fetch_add(1, Ordering::Relaxed);
        let (tx, rx) = oneshot::channel();
        *pending = Some(PendingExport {
            reply: tx,
            generation,
            registered_at: Utc::now(),
        });
        Ok((rx, generation))
    }

    /// Discard the pending export without firing its callback.
    fn drop_pending(&self) {
        self.pending_export
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .take();
    }

    /// Discard the pending export, but only if it is still the registration
    /// identified by `generation`.
    ///
    /// A reply can consume the entry right at the timeout deadline and a
    /// successor register before the timed-out caller resumes; the
    /// successor's entry must stay.
    fn drop_pending_if(&self, generation: u64) {
        let mut pending = self
            .pending_export
            .lock()
            .unwrap_or_else(|e| e.into_inner());
        if pending.as_ref().is_some_and(|p| p.generation == generation) {
            pending.take();
        }
    }

    fn send_command(&self, command: &EditorCommand) -> Result<(), BridgeError> {
        let channel = self
            .channel
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .clone()
            .ok_or(BridgeError::NotAttached)?;
        channel.send(command.to_json()?)?;
        Ok(())
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
