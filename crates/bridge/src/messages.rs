//! Editor message protocol types and parser.
//!
//! The embedded editor exchanges JSON-encoded strings. Host-to-editor
//! messages carry an `action` field (`load`, `export`); editor-to-host
//! messages carry an `event` field (`init`, `export`). The channel is
//! broadcast-style and also carries unrelated traffic: anything that does
//! not decode into a known shape is ignored by the caller, never treated
//! as an error.

use serde::{Deserialize, Serialize};

/// Export format identifier sent with the `export` action.
///
/// Matches the protocol revision of the deployed editor; other revisions
/// accept different identifiers.
pub const EXPORT_FORMAT: &str = "html2";

/// Title used when handing the initial blank document to the editor.
pub const INITIAL_DOCUMENT_TITLE: &str = "Blank";

// ---------------------------------------------------------------------------
// Host -> editor
// ---------------------------------------------------------------------------

/// A command sent from the host to the embedded editor.
///
/// Serialized via the `action` tag, e.g.
/// `{"action":"load","xml":"...","title":"...","autosave":1}`.
#[derive(Debug, Clone, Serialize)]
#[serde(tag = "action", rename_all = "lowercase")]
pub enum EditorCommand {
    /// Replace the editor's current document.
    Load {
        /// Diagram text; may be empty for a blank document.
        xml: String,
        title: String,
        autosave: u8,
    },
    /// Ask the editor to export its current document.
    Export { format: String },
}

impl EditorCommand {
    /// Build a `load` command with autosave enabled.
    pub fn load(xml: impl Into<String>, title: impl Into<String>) -> Self {
        EditorCommand::Load {
            xml: xml.into(),
            title: title.into(),
            autosave: 1,
        }
    }

    /// Build an `export` command with the fixed [`EXPORT_FORMAT`].
    pub fn export() -> Self {
        EditorCommand::Export {
            format: EXPORT_FORMAT.to_string(),
        }
    }

    /// Encode the command as the JSON string the editor expects.
    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string(self)
    }
}

// ---------------------------------------------------------------------------
// Editor -> host
// ---------------------------------------------------------------------------

/// An event received from the embedded editor.
///
/// Deserialized via the `event` tag. Unknown event kinds and malformed
/// bodies are parse errors; callers drop those silently because the same
/// channel carries traffic that is not ours.
#[derive(Debug, Clone, Deserialize)]
#[serde(tag = "event", rename_all = "lowercase")]
pub enum EditorEvent {
    /// Unsolicited readiness signal, sent once after the editor boots.
    Init,
    /// The editor finished exporting its document.
    ///
    /// Which field carries the document text differs between editor
    /// protocol revisions; both are kept optional and resolved by
    /// [`export_payload`](Self::export_payload).
    Export {
        data: Option<String>,
        xml: Option<String>,
    },
}

impl EditorEvent {
    /// The exported document text, if this is an export event that
    /// actually carries one.
    ///
    /// Single point of truth for the payload field across editor protocol
    /// revisions: prefer `xml` (raw document text), fall back to `data`.
    pub fn export_payload(&self) -> Option<&str> {
        match self {
            EditorEvent::Export { xml, data } => xml.as_deref().or(data.as_deref()),
            EditorEvent::Init => None,
        }
    }
}

/// Parse a raw channel message into a typed [`EditorEvent`].
///
/// Returns `Err` for malformed JSON, a missing `event` field, or an
/// unknown event kind.
pub fn parse_event(text: &str) -> Result<EditorEvent, serde_json::Error> {
    serde_json::from_str(text)
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
