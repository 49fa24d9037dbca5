//! Collaborator abstractions: question storage, scoring, and identity.

use async_trait::async_trait;

use crate::error::QuizError;
use crate::question::{Answer, AttemptScore, Question, QuizId};

/// Storage collaborator holding quizzes and the authoritative answer keys.
#[async_trait]
pub trait QuizStore: Send + Sync {
    /// Fetch a quiz's questions in display order, with answer keys withheld.
    async fn fetch_quiz_questions(&self, quiz_id: QuizId) -> Result<Vec<Question>, QuizError>;

    /// Score a finished attempt. Implementations own any retry policy; the
    /// engine calls this at most once per submission request.
    async fn submit_attempt(
        &self,
        quiz_id: QuizId,
        answers: &[Answer],
    ) -> Result<AttemptScore, QuizError>;
}

/// Identity collaborator describing the signed-in user.
pub trait IdentityProvider: Send + Sync {
    /// Whether a user is currently signed in.
    fn is_authenticated(&self) -> bool;

    /// Identifier of the signed-in user, if any.
    fn current_user_id(&self) -> Option<String>;
}
