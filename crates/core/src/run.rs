//! Generation run state machine.
//!
//! A [`GenerationRun`] records one end-to-end attempt to turn the current
//! diagram into code: its status, an append-only log, an append-only error
//! list, and the most recent successfully generated source text. Status
//! transitions are monotonic — a run never moves backwards, and a finished
//! run is never mutated; a new trigger starts a fresh run via
//! [`GenerationRun::next`].

use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::error::CoreError;

// ---------------------------------------------------------------------------
// RunStatus
// ---------------------------------------------------------------------------

/// Phase of a generation run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum RunStatus {
    /// No work started yet.
    Idle,
    /// Waiting for the embedded editor to export the diagram.
    Exporting,
    /// Submitting the exported diagram to the code-generation service.
    Uploading,
    /// Generation finished and produced code.
    Succeeded,
    /// Generation failed at some step; see the run's `errors`.
    Failed,
}

impl RunStatus {
    /// The run has reached a final state.
    pub fn is_terminal(self) -> bool {
        matches!(self, RunStatus::Succeeded | RunStatus::Failed)
    }
}

// ---------------------------------------------------------------------------
// GenerationRun
// ---------------------------------------------------------------------------

/// Observable state of one diagram-to-code attempt.
///
/// Mutated only by the pipeline orchestrator; every other component reads
/// published snapshots.
#[derive(Debug, Clone, Serialize)]
pub struct GenerationRun {
    /// Current phase; moves strictly forward (see [`advance`](Self::advance)).
    pub status: RunStatus,
    /// Chronological, append-only progress entries.
    pub logs: Vec<String>,
    /// Chronological, append-only failure entries.
    pub errors: Vec<String>,
    /// Most recent successfully generated source text, or empty. Survives
    /// across failed runs so the user never loses their last good result.
    pub code_output: String,
    /// When this run was created (UTC). Diagnostics only.
    pub started_at: DateTime<Utc>,
}

impl GenerationRun {
    /// Create the initial run with no history and no output.
    pub fn idle() -> Self {
        Self {
            status: RunStatus::Idle,
            logs: Vec::new(),
            errors: Vec::new(),
            code_output: String::new(),
            started_at: Utc::now(),
        }
    }

    /// Start a fresh run after `previous`.
    ///
    /// Logs and errors start empty; `code_output` is carried forward so a
    /// failed retry does not erase the last successful result.
    pub fn next(previous: &GenerationRun) -> Self {
        Self {
            status: RunStatus::Idle,
            logs: Vec::new(),
            errors: Vec::new(),
            code_output: previous.code_output.clone(),
            started_at: Utc::now(),
        }
    }

    /// Move the run to `to`, enforcing the legal forward-only walk:
    ///
    /// ```text
    /// Idle -> Exporting -> Uploading -> Succeeded
    ///              \            \----> Failed
    ///               \-----------------> Failed
    /// ```
    pub fn advance(&mut self, to: RunStatus) -> Result<(), CoreError> {
        let legal = matches!(
            (self.status, to),
            (RunStatus::Idle, RunStatus::Exporting)
                | (RunStatus::Exporting, RunStatus::Uploading)
                | (RunStatus::Uploading, RunStatus::Succeeded)
                | (RunStatus::Exporting | RunStatus::Uploading, RunStatus::Failed)
        );
        if !legal {
            return Err(CoreError::InvalidTransition {
                from: self.status,
                to,
            });
        }
        self.status = to;
        Ok(())
    }

    /// Append a progress entry.
    pub fn push_log(&mut self, entry: impl Into<String>) {
        self.logs.push(entry.into());
    }

    /// Append a failure entry.
    pub fn push_error(&mut self, entry: impl Into<String>) {
        self.errors.push(entry.into());
    }

    /// Transition to `Succeeded` and overwrite `code_output`.
    ///
    /// This is the only place `code_output` is ever written.
    pub fn succeed(&mut self, code: String) -> Result<(), CoreError> {
        self.advance(RunStatus::Succeeded)?;
        self.code_output = code;
        Ok(())
    }

    /// Record `error` and transition to `Failed`. `code_output` is left
    /// untouched.
    pub fn fail(&mut self, error: impl Into<String>) -> Result<(), CoreError> {
        self.push_error(error);
        self.advance(RunStatus::Failed)
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
