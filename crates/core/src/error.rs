use crate::run::RunStatus;

/// Errors raised by the domain types themselves.
#[derive(Debug, thiserror::Error)]
pub enum CoreError {
    /// The run state machine rejected a transition.
    #[error("Invalid run transition: {from:?} -> {to:?}")]
    InvalidTransition { from: RunStatus, to: RunStatus },
}
