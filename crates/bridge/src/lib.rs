//! Request/response bridge to the embedded diagram editor.
//!
//! The embedded editor speaks a fire-and-forget, broadcast-style JSON
//! message protocol with no request identifiers. This crate turns that
//! channel into a usable API: typed message parsing, per-message origin
//! validation, an init handshake, and one-shot export requests with an
//! explicit timeout.

pub mod bridge;
pub mod channel;
pub mod messages;

pub use bridge::{BridgeError, FrameBridge};
pub use channel::{ChannelError, EditorChannel, InboundMessage};
pub use messages::{EditorCommand, EditorEvent};
