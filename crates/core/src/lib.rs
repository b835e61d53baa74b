//! Domain types for the AlgoDraft diagram-to-code service.
//!
//! Pure state and validation logic with no IO: the generation run state
//! machine and the shared error type. The bridge and pipeline crates build
//! on these.

pub mod error;
pub mod run;

pub use error::CoreError;
pub use run::{GenerationRun, RunStatus};
