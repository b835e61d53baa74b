//! Diagram-to-code generation pipeline.
//!
//! Sequences one full attempt — export the diagram via the frame bridge,
//! upload it to the code-generation service, publish the outcome — and
//! owns the observable [`GenerationRun`](algodraft_core::GenerationRun)
//! state the UI renders from. Also loads named example diagrams into the
//! editor.

pub mod generator;
pub mod orchestrator;
pub mod templates;

pub use generator::{CodeGenerator, GeneratorApi, GeneratorApiError};
pub use orchestrator::{GenerationPipeline, PipelineError};
pub use templates::{TemplateError, TemplateStore};
