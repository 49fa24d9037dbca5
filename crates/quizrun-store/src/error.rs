//! Adapter errors, converted to `QuizError` at the trait boundary.

use quizrun_core::error::QuizError;
use thiserror::Error;

/// Failures inside the storage adapters.
#[derive(Debug, Error)]
pub enum StoreError {
    /// The backend could not be reached or the response could not be read.
    #[error("transport error: {0}")]
    Transport(#[from] reqwest::Error),

    /// The backend answered with a non-success status.
    #[error("backend returned {status}: {message}")]
    Backend {
        /// HTTP status code.
        status: u16,
        /// The `message` field of the error body, or the raw body.
        message: String,
    },

    /// The question bank file could not be read.
    #[error("could not read question bank: {0}")]
    Io(#[from] std::io::Error),

    /// The question bank is not valid YAML.
    #[error("invalid question bank YAML: {0}")]
    Yaml(#[from] serde_yaml::Error),

    /// The question bank is not valid JSON.
    #[error("invalid question bank JSON: {0}")]
    Json(#[from] serde_json::Error),

    /// The question bank parsed but describes an impossible quiz.
    #[error("invalid question bank: {0}")]
    Invalid(String),

    /// The requested quiz does not exist or cannot be scored.
    #[error("{0}")]
    NotFound(String),

    /// The backend requires a bearer token and none is configured.
    #[error("no access token configured")]
    Unauthenticated,
}

impl From<StoreError> for QuizError {
    fn from(err: StoreError) -> Self {
        match err {
            StoreError::Invalid(msg) => QuizError::Validation(msg),
            StoreError::Yaml(_) | StoreError::Json(_) => QuizError::Validation(err.to_string()),
            StoreError::Unauthenticated | StoreError::Backend { status: 401, .. } => {
                QuizError::NotAuthenticated
            }
            StoreError::Transport(_)
            | StoreError::Backend { .. }
            | StoreError::Io(_)
            | StoreError::NotFound(_) => QuizError::Collaborator(err.to_string()),
        }
    }
}
