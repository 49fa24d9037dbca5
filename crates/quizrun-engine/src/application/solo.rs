//! Solo attempts: one signed-in player against the scoring collaborator.
//!
//! The attempt owns the session and the collaborators it needs. Every
//! finishing path (last answer, expiry, early finish) funnels into one
//! submission; a failed submission keeps its answers so the player can retry
//! by hand.

use std::sync::Arc;

use quizrun_core::clock::Clock;
use quizrun_core::collaborator::{IdentityProvider, QuizStore};
use quizrun_core::error::QuizError;
use quizrun_core::question::{AttemptScore, Question, QuizId};
use quizrun_core::status::SessionStatus;
use tracing::{info, instrument, warn};

use crate::domain::events::SessionEvent;
use crate::domain::pool::QuestionPool;
use crate::domain::session::{Advance, Expiry, QuizSession, ScoringMode, Selection, SubmissionRequest};

/// Owner recorded on sessions started without a signed-in user.
pub const ANONYMOUS_OWNER: &str = "anonymous";

/// Where the attempt's one submission stands.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SubmissionState {
    /// The session has not produced its submission yet.
    Idle,
    /// The submission failed and can be retried with the kept answers.
    Failed {
        /// The answers that were not accepted.
        request: SubmissionRequest,
        /// Why the last attempt failed.
        reason: String,
    },
    /// The collaborator scored the attempt.
    Scored(AttemptScore),
    /// The player quit; nothing will be submitted.
    Withdrawn,
}

/// Result of advancing a solo attempt.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AttemptProgress {
    /// Moved to the question at `cursor`.
    Moved {
        /// The new cursor position.
        cursor: usize,
    },
    /// The attempt finished and was scored.
    Scored(AttemptScore),
}

/// A solo quiz attempt.
pub struct SoloAttempt {
    quiz_id: QuizId,
    session: QuizSession,
    submission: SubmissionState,
    store: Arc<dyn QuizStore>,
    identity: Arc<dyn IdentityProvider>,
    clock: Arc<dyn Clock>,
}

impl std::fmt::Debug for SoloAttempt {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SoloAttempt")
            .field("quiz_id", &self.quiz_id)
            .field("session", &self.session)
            .field("submission", &self.submission)
            .finish_non_exhaustive()
    }
}

impl SoloAttempt {
    /// Fetches the quiz and prepares a session for the current user.
    ///
    /// Answer keys are stripped even if the store sent them: in solo play the
    /// store alone decides correctness.
    ///
    /// # Errors
    ///
    /// Returns `QuizError::Collaborator` if the fetch fails, or
    /// `QuizError::Validation` if the quiz has no questions or a question is
    /// malformed.
    #[instrument(skip_all, fields(quiz_id = %quiz_id))]
    pub async fn load(
        quiz_id: QuizId,
        store: Arc<dyn QuizStore>,
        identity: Arc<dyn IdentityProvider>,
        clock: Arc<dyn Clock>,
    ) -> Result<Self, QuizError> {
        let questions: Vec<Question> = store
            .fetch_quiz_questions(quiz_id)
            .await?
            .iter()
            .map(Question::without_answer)
            .collect();
        if questions.is_empty() {
            return Err(QuizError::Validation(format!(
                "quiz {quiz_id} has no questions"
            )));
        }
        let pool = QuestionPool::new(questions)?;
        let owner = identity
            .current_user_id()
            .unwrap_or_else(|| ANONYMOUS_OWNER.to_owned());
        info!(questions = pool.len(), owner = %owner, "quiz loaded");

        Ok(Self {
            quiz_id,
            session: QuizSession::new(owner, pool.questions().to_vec(), ScoringMode::Authoritative),
            submission: SubmissionState::Idle,
            store,
            identity,
            clock,
        })
    }

    /// The quiz being attempted.
    #[must_use]
    pub fn quiz_id(&self) -> QuizId {
        self.quiz_id
    }

    /// The underlying session.
    #[must_use]
    pub fn session(&self) -> &QuizSession {
        &self.session
    }

    /// Where the submission stands.
    #[must_use]
    pub fn submission(&self) -> &SubmissionState {
        &self.submission
    }

    /// The authoritative score, once the collaborator returned one.
    #[must_use]
    pub fn score(&self) -> Option<AttemptScore> {
        match self.submission {
            SubmissionState::Scored(score) => Some(score),
            _ => None,
        }
    }

    /// Starts the session.
    ///
    /// # Errors
    ///
    /// Returns `QuizError::InvalidTransition` unless the session is
    /// `NotStarted`.
    pub fn start(&mut self) -> Result<(), QuizError> {
        self.session.start(self.clock.as_ref())
    }

    /// Locks in an answer for the current question.
    ///
    /// # Errors
    ///
    /// Returns `QuizError::Validation` if `option` is out of range.
    pub fn select(&mut self, option: usize) -> Result<Selection, QuizError> {
        self.session.select_answer(option, self.clock.as_ref())
    }

    /// Moves to the next question, submitting after the last one.
    ///
    /// # Errors
    ///
    /// Returns `QuizError::NotLocked` or `QuizError::InvalidTransition` from
    /// the session, and the submission errors of [`SoloAttempt::retry_submission`]
    /// when this advance finished the attempt.
    pub async fn advance(&mut self) -> Result<AttemptProgress, QuizError> {
        match self.session.advance(self.clock.as_ref())? {
            Advance::Moved { cursor } => Ok(AttemptProgress::Moved { cursor }),
            Advance::Finished { submission } => {
                let score = self.submit_claimed(submission).await?;
                Ok(AttemptProgress::Scored(score))
            }
        }
    }

    /// Ends the attempt because time ran out and submits what was answered.
    /// Returns `Ok(None)` if the attempt had already finished.
    ///
    /// # Errors
    ///
    /// Returns `QuizError::InvalidTransition` if the session never started,
    /// and the submission errors of [`SoloAttempt::retry_submission`].
    pub async fn expire(&mut self) -> Result<Option<AttemptScore>, QuizError> {
        match self.session.force_expire(self.clock.as_ref())? {
            Expiry::AlreadyFinished => Ok(None),
            Expiry::Expired { submission } => self.submit_claimed(submission).await.map(Some),
        }
    }

    /// Ends the attempt early and submits what was answered.
    ///
    /// # Errors
    ///
    /// Returns `QuizError::InvalidTransition` if the session is not active,
    /// and the submission errors of [`SoloAttempt::retry_submission`].
    pub async fn finish_now(&mut self) -> Result<AttemptScore, QuizError> {
        let submission = self.session.finish_now(self.clock.as_ref())?;
        self.submit_claimed(submission).await
    }

    /// Abandons an active attempt without submitting. Quitting an attempt
    /// that is not active changes nothing.
    pub fn quit(&mut self) {
        if self.session.status() == SessionStatus::Active
            && self.session.abandon(self.clock.as_ref()).is_ok()
        {
            self.submission = SubmissionState::Withdrawn;
            info!(quiz_id = %self.quiz_id, "attempt abandoned");
        }
    }

    /// Clears every answer and returns to `NotStarted`, re-arming the
    /// submission.
    pub fn restart(&mut self) {
        self.session.restart(self.clock.as_ref());
        self.submission = SubmissionState::Idle;
    }

    /// Re-sends the answers of a failed submission. Returns the cached score
    /// without contacting the collaborator if the attempt was already scored.
    ///
    /// # Errors
    ///
    /// Returns `QuizError::InvalidTransition` if there is nothing to retry,
    /// `QuizError::NotAuthenticated` if no user is signed in, or
    /// `QuizError::SubmissionFailed` if the collaborator rejects the attempt.
    pub async fn retry_submission(&mut self) -> Result<AttemptScore, QuizError> {
        match &self.submission {
            SubmissionState::Scored(score) => Ok(*score),
            SubmissionState::Failed { request, .. } => {
                let request = request.clone();
                self.send(request).await
            }
            SubmissionState::Idle | SubmissionState::Withdrawn => {
                Err(QuizError::InvalidTransition {
                    operation: "retry submission for",
                    status: self.session.status(),
                })
            }
        }
    }

    /// Drains the session's uncommitted events.
    pub fn take_events(&mut self) -> Vec<SessionEvent> {
        self.session.take_events()
    }

    async fn submit_claimed(
        &mut self,
        submission: Option<SubmissionRequest>,
    ) -> Result<AttemptScore, QuizError> {
        match submission {
            Some(request) => self.send(request).await,
            // The session already handed out its request; report what became
            // of it.
            None => self.retry_submission().await,
        }
    }

    #[instrument(skip_all, fields(quiz_id = %self.quiz_id, answers = request.answers.len()))]
    async fn send(&mut self, request: SubmissionRequest) -> Result<AttemptScore, QuizError> {
        if !self.identity.is_authenticated() {
            warn!("submission refused: no signed-in user");
            self.submission = SubmissionState::Failed {
                request,
                reason: QuizError::NotAuthenticated.to_string(),
            };
            return Err(QuizError::NotAuthenticated);
        }

        match self.store.submit_attempt(self.quiz_id, &request.answers).await {
            Ok(score) => {
                info!(
                    score = score.score,
                    total = score.total_questions,
                    percentage = score.percentage(),
                    "attempt scored"
                );
                self.submission = SubmissionState::Scored(score);
                Ok(score)
            }
            Err(e) => {
                let reason = e.to_string();
                warn!(error = %reason, "submission failed");
                self.submission = SubmissionState::Failed {
                    request,
                    reason: reason.clone(),
                };
                Err(QuizError::SubmissionFailed(reason))
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use quizrun_core::question::QuestionId;
    use quizrun_test_support::{
        FailingQuizStore, ManualClock, RecordingQuizStore, StaticIdentity, fixed_now,
        sample_questions,
    };

    async fn attempt_with(
        store: Arc<dyn QuizStore>,
        identity: StaticIdentity,
    ) -> SoloAttempt {
        let mut attempt = SoloAttempt::load(
            QuizId(1),
            store,
            Arc::new(identity),
            Arc::new(ManualClock::new(fixed_now())),
        )
        .await
        .unwrap();
        attempt.start().unwrap();
        attempt
    }

    #[tokio::test]
    async fn test_load_strips_answer_keys() {
        let store = Arc::new(RecordingQuizStore::new(sample_questions()));

        let attempt = attempt_with(store.clone(), StaticIdentity::signed_in("user-1")).await;

        assert_eq!(store.fetch_count(), 1);
        assert!(attempt.session().questions().iter().all(|q| q.correct_option.is_none()));
        assert_eq!(attempt.session().owner_id(), "user-1");
    }

    #[tokio::test]
    async fn test_load_empty_quiz_is_validation_error() {
        let store: Arc<dyn QuizStore> = Arc::new(RecordingQuizStore::new(Vec::new()));

        let err = SoloAttempt::load(
            QuizId(9),
            store,
            Arc::new(StaticIdentity::signed_in("user-1")),
            Arc::new(ManualClock::new(fixed_now())),
        )
        .await
        .unwrap_err();

        assert!(matches!(err, QuizError::Validation(_)));
    }

    #[tokio::test]
    async fn test_load_propagates_fetch_failure() {
        let err = SoloAttempt::load(
            QuizId(1),
            Arc::new(FailingQuizStore),
            Arc::new(StaticIdentity::signed_in("user-1")),
            Arc::new(ManualClock::new(fixed_now())),
        )
        .await
        .unwrap_err();

        assert_eq!(err, QuizError::Collaborator("connection refused".into()));
    }

    #[tokio::test]
    async fn test_all_correct_attempt_submits_once_and_scores_full() {
        // Arrange
        let store = Arc::new(RecordingQuizStore::new(sample_questions()));
        let mut attempt = attempt_with(store.clone(), StaticIdentity::signed_in("user-1")).await;

        // Act
        let mut last = None;
        for option in [2, 1, 2] {
            attempt.select(option).unwrap();
            last = Some(attempt.advance().await.unwrap());
        }

        // Assert
        let expected = AttemptScore {
            score: 3,
            total_questions: 3,
        };
        assert_eq!(last, Some(AttemptProgress::Scored(expected)));
        let calls = store.submit_calls();
        assert_eq!(calls.len(), 1);
        assert_eq!(calls[0].answers.len(), 3);
        assert_eq!(calls[0].answers[0].question_id, QuestionId(1));
        assert_eq!(attempt.score(), Some(expected));
    }

    #[tokio::test]
    async fn test_expire_after_completion_does_not_resubmit() {
        let store = Arc::new(RecordingQuizStore::new(sample_questions()));
        let mut attempt = attempt_with(store.clone(), StaticIdentity::signed_in("user-1")).await;
        for option in [0, 0, 0] {
            attempt.select(option).unwrap();
            attempt.advance().await.unwrap();
        }

        let expired = attempt.expire().await.unwrap();

        assert_eq!(expired, None);
        assert_eq!(store.submit_calls().len(), 1);
    }

    #[tokio::test]
    async fn test_expire_submits_answers_before_cursor() {
        let store = Arc::new(RecordingQuizStore::new(sample_questions()));
        let mut attempt = attempt_with(store.clone(), StaticIdentity::signed_in("user-1")).await;
        attempt.select(2).unwrap();
        attempt.advance().await.unwrap();
        attempt.select(1).unwrap();

        let score = attempt.expire().await.unwrap().unwrap();

        assert_eq!(score.score, 1);
        assert_eq!(score.total_questions, 3);
        assert_eq!(store.submit_calls()[0].answers.len(), 1);
    }

    #[tokio::test]
    async fn test_unauthenticated_submission_fails_fast() {
        let store = Arc::new(RecordingQuizStore::new(sample_questions()));
        let mut attempt = attempt_with(store.clone(), StaticIdentity::anonymous()).await;
        attempt.select(2).unwrap();

        let err = attempt.finish_now().await.unwrap_err();

        assert_eq!(err, QuizError::NotAuthenticated);
        assert!(store.submit_calls().is_empty());
        assert!(attempt.session().is_finished());
        assert_eq!(attempt.session().owner_id(), ANONYMOUS_OWNER);
    }

    #[tokio::test]
    async fn test_failed_submission_keeps_answers_for_manual_retry() {
        // Arrange
        let store = Arc::new(RecordingQuizStore::failing_first(sample_questions(), 1));
        let mut attempt = attempt_with(store.clone(), StaticIdentity::signed_in("user-1")).await;
        attempt.select(2).unwrap();

        // Act
        let first = attempt.finish_now().await;
        let retried = attempt.retry_submission().await;

        // Assert
        assert!(matches!(first, Err(QuizError::SubmissionFailed(ref msg)) if msg.contains("connection reset")));
        assert_eq!(
            retried,
            Ok(AttemptScore {
                score: 1,
                total_questions: 3,
            })
        );
        let calls = store.submit_calls();
        assert_eq!(calls.len(), 2);
        assert_eq!(calls[0].answers, calls[1].answers);
        assert!(attempt.session().is_finished());
    }

    #[tokio::test]
    async fn test_retry_after_success_returns_cached_score() {
        let store = Arc::new(RecordingQuizStore::new(sample_questions()));
        let mut attempt = attempt_with(store.clone(), StaticIdentity::signed_in("user-1")).await;
        let score = attempt.finish_now().await.unwrap();

        let again = attempt.retry_submission().await.unwrap();

        assert_eq!(again, score);
        assert_eq!(store.submit_calls().len(), 1);
    }

    #[tokio::test]
    async fn test_retry_without_submission_is_invalid() {
        let store = Arc::new(RecordingQuizStore::new(sample_questions()));
        let mut attempt = attempt_with(store, StaticIdentity::signed_in("user-1")).await;

        assert!(matches!(
            attempt.retry_submission().await,
            Err(QuizError::InvalidTransition { .. })
        ));
    }

    #[tokio::test]
    async fn test_quit_withdraws_without_submitting() {
        let store = Arc::new(RecordingQuizStore::new(sample_questions()));
        let mut attempt = attempt_with(store.clone(), StaticIdentity::signed_in("user-1")).await;
        attempt.select(2).unwrap();

        attempt.quit();

        assert_eq!(attempt.submission(), &SubmissionState::Withdrawn);
        assert!(store.submit_calls().is_empty());
        assert_eq!(attempt.expire().await.unwrap(), None);
    }

    #[tokio::test]
    async fn test_restart_allows_a_second_submission() {
        let store = Arc::new(RecordingQuizStore::new(sample_questions()));
        let mut attempt = attempt_with(store.clone(), StaticIdentity::signed_in("user-1")).await;
        attempt.finish_now().await.unwrap();

        attempt.restart();
        attempt.start().unwrap();
        attempt.select(2).unwrap();
        attempt.finish_now().await.unwrap();

        assert_eq!(store.submit_calls().len(), 2);
        assert_eq!(attempt.score().unwrap().score, 1);
    }
}
