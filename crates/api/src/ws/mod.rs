//! WebSocket endpoint for the embedded editor.

pub mod editor;
