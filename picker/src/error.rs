use sift_search::EngineError;
use thiserror::Error;

/// Failure of a user-supplied custom action.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("{0}")]
pub struct ActionError(pub String);

impl ActionError {
    pub fn new(message: impl Into<String>) -> Self {
        Self(message.into())
    }
}

/// Non-fatal failure recorded by a session and drained with
/// `Session::take_errors`. The session keeps its previous ranked result.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum SessionError {
    #[error("engine error: {0}")]
    Engine(#[from] EngineError),

    #[error("action error: {0}")]
    Action(#[from] ActionError),

    #[error("candidate source failed: {0}")]
    Source(String),
}
