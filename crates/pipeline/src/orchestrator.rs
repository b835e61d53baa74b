//! Generation pipeline orchestrator.
//!
//! [`GenerationPipeline`] sequences one diagram-to-code attempt — export
//! via the frame bridge, upload to the generation service, publish the
//! outcome — and owns the current [`GenerationRun`]. Snapshots are
//! published through a [`tokio::sync::watch`] channel; the UI layer only
//! ever reads them. Terminal failures become run data (`errors` entries
//! and a `Failed` status), never errors propagated to the caller.

use std::sync::Arc;

use tokio::sync::watch;

use algodraft_bridge::{BridgeError, FrameBridge};
use algodraft_core::{CoreError, GenerationRun, RunStatus};

use crate::generator::CodeGenerator;
use crate::templates::{TemplateError, TemplateStore};

/// Errors returned across the pipeline boundary.
///
/// Run failures are *not* errors here — they are recorded on the run
/// itself. What remains is trigger rejection and example-loading failures
/// the HTTP layer wants to map to status codes.
#[derive(Debug, thiserror::Error)]
pub enum PipelineError {
    /// A run is already in progress; the trigger was rejected, not queued.
    #[error("a generation run is already in progress")]
    Busy,

    /// Example document lookup failed.
    #[error(transparent)]
    Template(#[from] TemplateError),

    /// Sending to the editor failed.
    #[error(transparent)]
    Bridge(#[from] BridgeError),

    /// The run state machine rejected a transition. Indicates a defect in
    /// the orchestration itself, not a runtime failure.
    #[error(transparent)]
    State(#[from] CoreError),
}

/// Orchestrates generation runs and publishes their observable state.
pub struct GenerationPipeline {
    bridge: Arc<FrameBridge>,
    generator: Arc<dyn CodeGenerator>,
    templates: TemplateStore,
    run_tx: watch::Sender<GenerationRun>,
    /// Held for the duration of a run; `try_lock` failure means busy.
    start_guard: Arc<tokio::sync::Mutex<()>>,
}

impl GenerationPipeline {
    /// Wire a pipeline to its collaborators.
    pub fn new(
        bridge: Arc<FrameBridge>,
        generator: Arc<dyn CodeGenerator>,
        templates: TemplateStore,
    ) -> Self {
        let (run_tx, _) = watch::channel(GenerationRun::idle());
        Self {
            bridge,
            generator,
            templates,
            run_tx,
            start_guard: Arc::new(tokio::sync::Mutex::new(())),
        }
    }

    /// Subscribe to run snapshots (readers never write back).
    pub fn subscribe(&self) -> watch::Receiver<GenerationRun> {
        self.run_tx.subscribe()
    }

    /// The current run snapshot.
    pub fn snapshot(&self) -> GenerationRun {
        self.run_tx.borrow().clone()
    }

    /// The example-document store (for the catalog endpoint).
    pub fn templates(&self) -> &TemplateStore {
        &self.templates
    }

    /// Run one full diagram-to-code attempt to completion.
    ///
    /// Rejected with [`PipelineError::Busy`] while another run is in
    /// flight. Export and upload failures do not surface as errors: they
    /// finish the run as `Failed` and this returns `Ok(())`.
    pub async fn start(&self) -> Result<(), PipelineError> {
        let _guard = Arc::clone(&self.start_guard)
            .try_lock_owned()
            .map_err(|_| PipelineError::Busy)?;
        self.run_once().await?;
        Ok(())
    }

    /// Trigger a run without waiting for it to finish.
    ///
    /// Same busy policy as [`start`](Self::start), decided synchronously so
    /// the caller can answer the UI immediately; the run itself proceeds on
    /// a spawned task and is observed via the published snapshots.
    pub fn start_detached(self: &Arc<Self>) -> Result<(), PipelineError> {
        let guard = Arc::clone(&self.start_guard)
            .try_lock_owned()
            .map_err(|_| PipelineError::Busy)?;

        let pipeline = Arc::clone(self);
        tokio::spawn(async move {
            let _guard = guard;
            if let Err(e) = pipeline.run_once().await {
                tracing::error!(error = %e, "Generation run aborted by an illegal state transition");
            }
        });
        Ok(())
    }

    /// The run body. Caller must hold the start guard.
    ///
    /// Mutates the published run in place via [`modify_run`](Self::modify_run);
    /// a local copy would overwrite entries appended concurrently (a failed
    /// `load_example` while the run awaits the editor) on its next publish.
    async fn run_once(&self) -> Result<(), CoreError> {
        let next = GenerationRun::next(&self.run_tx.borrow());
        self.run_tx.send_replace(next);

        self.modify_run(|run| {
            run.advance(RunStatus::Exporting)?;
            run.push_log("Requesting diagram export from editor");
            Ok(())
        })?;

        let xml = match self.bridge.request_export().await {
            Ok(xml) => xml,
            Err(e) => {
                tracing::warn!(error = %e, "Diagram export failed");
                self.modify_run(|run| run.fail(format!("Diagram export failed: {e}")))?;
                return Ok(());
            }
        };

        self.modify_run(|run| {
            run.push_log(format!("Received exported diagram ({} bytes)", xml.len()));
            run.advance(RunStatus::Uploading)
        })?;

        match self.generator.generate(&xml).await {
            Ok(code) => {
                tracing::info!(bytes = code.len(), "Code generation succeeded");
                self.modify_run(|run| {
                    run.push_log("Code generation succeeded");
                    run.succeed(code)
                })?;
            }
            Err(e) => {
                tracing::warn!(error = %e, "Code generation failed");
                self.modify_run(|run| run.fail(format!("Code generation failed: {e}")))?;
            }
        }
        Ok(())
    }

    /// Load a named example document into the editor.
    ///
    /// Failures are appended to the published run's `errors` (they must
    /// reach the UI) *and* returned so the HTTP layer can answer with an
    /// appropriate status.
    pub async fn load_example(&self, name: &str) -> Result<(), PipelineError> {
        let xml = match self.templates.load(name).await {
            Ok(xml) => xml,
            Err(e) => {
                self.record_error(format!("Failed to load example '{name}': {e}"));
                return Err(e.into());
            }
        };

        let title = self.templates.title_for(name);
        if let Err(e) = self.bridge.request_load(xml, title) {
            self.record_error(format!("Failed to send example '{name}' to editor: {e}"));
            return Err(e.into());
        }

        tracing::info!(name, "Example loaded into editor");
        self.run_tx
            .send_modify(|run| run.push_log(format!("Loaded example '{name}' into editor")));
        Ok(())
    }

    // ---- private helpers ----

    /// Mutate the published run in place and notify subscribers.
    fn modify_run<T>(&self, f: impl FnOnce(&mut GenerationRun) -> T) -> T {
        let mut result = None;
        self.run_tx.send_modify(|run| result = Some(f(run)));
        result.expect("send_modify invokes the closure exactly once")
    }

    /// Append an error to the published run without touching its status.
    fn record_error(&self, message: String) {
        tracing::warn!(error = %message, "Pipeline error recorded");
        self.run_tx.send_modify(|run| run.push_error(message.clone()));
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
