//! Domain error types.

use thiserror::Error;

use crate::status::SessionStatus;

/// Top-level error type for the quiz session engine.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum QuizError {
    /// A state-changing operation was called from a state that forbids it.
    #[error("invalid transition: cannot {operation} a session that is {status}")]
    InvalidTransition {
        /// The operation that was attempted.
        operation: &'static str,
        /// The status the session was in.
        status: SessionStatus,
    },

    /// `advance` was called before the current question was answered.
    #[error("cannot advance: the current question has not been answered")]
    NotLocked,

    /// The scoring collaborator could not accept the attempt.
    #[error("could not submit: {0}")]
    SubmissionFailed(String),

    /// A storage or identity collaborator call failed.
    #[error("collaborator error: {0}")]
    Collaborator(String),

    /// Solo submission requires a signed-in user.
    #[error("not authenticated: sign in before submitting")]
    NotAuthenticated,

    /// Malformed input or configuration.
    #[error("validation error: {0}")]
    Validation(String),
}
