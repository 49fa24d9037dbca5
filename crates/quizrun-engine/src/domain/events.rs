//! Domain events for quiz sessions.

use quizrun_core::event::{DomainEvent, EventMetadata};
use quizrun_core::question::QuestionId;
use serde::{Deserialize, Serialize};

/// Why a session reached `Finished`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FinishReason {
    /// The player advanced past the last question (or had none).
    Completed,
    /// The countdown reached zero.
    Expired,
    /// The player chose to finish early.
    Submitted,
    /// The player quit; nothing is submitted.
    Abandoned,
}

impl FinishReason {
    /// Whether finishing this way hands the answers to the scoring
    /// collaborator.
    #[must_use]
    pub fn submits(self) -> bool {
        !matches!(self, Self::Abandoned)
    }
}

/// Emitted when a session starts.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionStarted {
    /// The player owning the session.
    pub owner_id: String,
    /// Number of questions assigned.
    pub question_count: usize,
}

/// Emitted when an answer is locked in.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AnswerSelected {
    /// The question answered.
    pub question_id: QuestionId,
    /// Cursor position of the question.
    pub cursor: usize,
    /// Index of the chosen option.
    pub option_index: usize,
    /// Text of the chosen option.
    pub chosen_option: String,
    /// Local correctness; `None` when the answer key is withheld.
    pub correct: Option<bool>,
}

/// Emitted when the cursor moves to the next question.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionAdvanced {
    /// The new cursor position.
    pub cursor: usize,
}

/// Emitted when a session reaches `Finished`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionFinished {
    /// How the session ended.
    pub reason: FinishReason,
    /// Number of answers that count toward the attempt.
    pub answered: usize,
    /// Locally accumulated score (authoritative only in competitive mode).
    pub accumulated_score: u32,
    /// Whole seconds between start and finish.
    pub elapsed_seconds: u64,
}

/// Emitted when a session is reset to `NotStarted`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionRestarted {
    /// The generation the session moved to.
    pub generation: u64,
}

/// Event type identifier for [`SessionStarted`].
pub const SESSION_STARTED_EVENT_TYPE: &str = "quiz.session_started";

/// Event type identifier for [`AnswerSelected`].
pub const ANSWER_SELECTED_EVENT_TYPE: &str = "quiz.answer_selected";

/// Event type identifier for [`SessionAdvanced`].
pub const SESSION_ADVANCED_EVENT_TYPE: &str = "quiz.session_advanced";

/// Event type identifier for [`SessionFinished`].
pub const SESSION_FINISHED_EVENT_TYPE: &str = "quiz.session_finished";

/// Event type identifier for [`SessionRestarted`].
pub const SESSION_RESTARTED_EVENT_TYPE: &str = "quiz.session_restarted";

/// Event payload variants for quiz sessions.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum SessionEventKind {
    /// The session started.
    SessionStarted(SessionStarted),
    /// An answer was locked in.
    AnswerSelected(AnswerSelected),
    /// The cursor advanced.
    SessionAdvanced(SessionAdvanced),
    /// The session finished.
    SessionFinished(SessionFinished),
    /// The session was reset.
    SessionRestarted(SessionRestarted),
}

impl SessionEventKind {
    /// Returns the event type name for this payload.
    #[must_use]
    pub fn event_type(&self) -> &'static str {
        match self {
            Self::SessionStarted(_) => SESSION_STARTED_EVENT_TYPE,
            Self::AnswerSelected(_) => ANSWER_SELECTED_EVENT_TYPE,
            Self::SessionAdvanced(_) => SESSION_ADVANCED_EVENT_TYPE,
            Self::SessionFinished(_) => SESSION_FINISHED_EVENT_TYPE,
            Self::SessionRestarted(_) => SESSION_RESTARTED_EVENT_TYPE,
        }
    }
}

/// Domain event envelope for quiz sessions.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionEvent {
    /// Event metadata.
    pub metadata: EventMetadata,
    /// Event-specific payload.
    pub kind: SessionEventKind,
}

impl DomainEvent for SessionEvent {
    fn event_type(&self) -> &'static str {
        self.kind.event_type()
    }

    fn to_payload(&self) -> serde_json::Value {
        // Serialization of derived Serialize types to Value is infallible.
        serde_json::to_value(&self.kind).expect("SessionEventKind serialization is infallible")
    }

    fn metadata(&self) -> &EventMetadata {
        &self.metadata
    }
}
