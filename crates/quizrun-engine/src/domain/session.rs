//! The session state machine: one player's walk through their questions.
//!
//! ```text
//! NotStarted --start--> Active --advance (last) / force_expire /
//!                                finish_now / abandon--> Finished
//!      ^                                                     |
//!      +------------------------restart----------------------+
//! ```
//!
//! A question is locked by the first accepted selection and unlocked only by
//! advancing. Reaching `Finished` in authoritative mode hands out a
//! [`SubmissionRequest`] at most once per session lifetime; a restart re-arms
//! it.

use chrono::{DateTime, Utc};
use quizrun_core::clock::Clock;
use quizrun_core::error::QuizError;
use quizrun_core::event::EventMetadata;
use quizrun_core::question::{Answer, Question, QuestionId};
use quizrun_core::status::SessionStatus;
use tracing::debug;
use uuid::Uuid;

use super::events::{
    AnswerSelected, FinishReason, SessionAdvanced, SessionEvent, SessionEventKind,
    SessionFinished, SessionRestarted, SessionStarted,
};

/// Who decides whether an answer is correct.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScoringMode {
    /// Solo play: the scoring collaborator holds the answer key and the
    /// local score is never incremented.
    Authoritative,
    /// Competitive play: answer keys are local and the session keeps score.
    Local,
}

/// Result of `select_answer`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Selection {
    /// The answer was locked in.
    Recorded {
        /// The question answered.
        question_id: QuestionId,
        /// Local correctness; `None` in authoritative mode.
        correct: Option<bool>,
    },
    /// The question was already locked or the session is not active.
    Ignored,
}

/// Answers handed to the scoring collaborator when a session finishes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SubmissionRequest {
    /// The session that produced the answers.
    pub session_id: Uuid,
    /// The session generation the answers belong to.
    pub generation: u64,
    /// Answers in the order they were given.
    pub answers: Vec<Answer>,
}

/// Result of `advance`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Advance {
    /// The cursor moved to the next question.
    Moved {
        /// The new cursor position.
        cursor: usize,
    },
    /// The last question was passed and the session finished.
    Finished {
        /// The one-time submission, present in authoritative mode.
        submission: Option<SubmissionRequest>,
    },
}

/// Result of `force_expire`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Expiry {
    /// The session was active and is now finished.
    Expired {
        /// The one-time submission, present in authoritative mode.
        submission: Option<SubmissionRequest>,
    },
    /// The session had already finished by another path; nothing happened.
    AlreadyFinished,
}

/// One player's progression through an assigned question sequence.
#[derive(Debug)]
pub struct QuizSession {
    id: Uuid,
    owner_id: String,
    mode: ScoringMode,
    questions: Vec<Question>,
    pub(crate) cursor: usize,
    pub(crate) locked: bool,
    pub(crate) selected: Option<usize>,
    pub(crate) accumulated_score: u32,
    answers: Vec<Answer>,
    pub(crate) status: SessionStatus,
    finish_reason: Option<FinishReason>,
    generation: u64,
    started_at: Option<DateTime<Utc>>,
    submission_claimed: bool,
    next_sequence: u64,
    uncommitted_events: Vec<SessionEvent>,
}

impl QuizSession {
    /// Creates a session in `NotStarted` for `owner_id` over `questions`.
    #[must_use]
    pub fn new(owner_id: impl Into<String>, questions: Vec<Question>, mode: ScoringMode) -> Self {
        Self {
            id: Uuid::new_v4(),
            owner_id: owner_id.into(),
            mode,
            questions,
            cursor: 0,
            locked: false,
            selected: None,
            accumulated_score: 0,
            answers: Vec::new(),
            status: SessionStatus::NotStarted,
            finish_reason: None,
            generation: 0,
            started_at: None,
            submission_claimed: false,
            next_sequence: 0,
            uncommitted_events: Vec::new(),
        }
    }

    /// Session identifier.
    #[must_use]
    pub fn id(&self) -> Uuid {
        self.id
    }

    /// The player owning this session.
    #[must_use]
    pub fn owner_id(&self) -> &str {
        &self.owner_id
    }

    /// Scoring mode.
    #[must_use]
    pub fn mode(&self) -> ScoringMode {
        self.mode
    }

    /// Current lifecycle status.
    #[must_use]
    pub fn status(&self) -> SessionStatus {
        self.status
    }

    /// Whether the session reached its terminal state.
    #[must_use]
    pub fn is_finished(&self) -> bool {
        self.status == SessionStatus::Finished
    }

    /// Index of the current question; equals the question count once every
    /// question has been passed.
    #[must_use]
    pub fn cursor(&self) -> usize {
        self.cursor
    }

    /// Whether the current question's answer is locked.
    #[must_use]
    pub fn is_locked(&self) -> bool {
        self.locked
    }

    /// Option index chosen for the current question, if any.
    #[must_use]
    pub fn selected(&self) -> Option<usize> {
        self.selected
    }

    /// Locally accumulated score. Always zero in authoritative mode.
    #[must_use]
    pub fn accumulated_score(&self) -> u32 {
        self.accumulated_score
    }

    /// Answers that currently count toward the attempt.
    #[must_use]
    pub fn answers(&self) -> &[Answer] {
        &self.answers
    }

    /// All assigned questions in order.
    #[must_use]
    pub fn questions(&self) -> &[Question] {
        &self.questions
    }

    /// Number of assigned questions.
    #[must_use]
    pub fn question_count(&self) -> usize {
        self.questions.len()
    }

    /// The question awaiting an answer, while the session is active.
    #[must_use]
    pub fn current_question(&self) -> Option<&Question> {
        if self.status == SessionStatus::Active {
            self.questions.get(self.cursor)
        } else {
            None
        }
    }

    /// How the session finished, once it has.
    #[must_use]
    pub fn finish_reason(&self) -> Option<FinishReason> {
        self.finish_reason
    }

    /// Restart generation; bumped by every effective restart.
    #[must_use]
    pub fn generation(&self) -> u64 {
        self.generation
    }

    /// When the session was started in its current generation.
    #[must_use]
    pub fn started_at(&self) -> Option<DateTime<Utc>> {
        self.started_at
    }

    /// Events produced since the last `take_events`.
    #[must_use]
    pub fn uncommitted_events(&self) -> &[SessionEvent] {
        &self.uncommitted_events
    }

    /// Drains the uncommitted event buffer.
    pub fn take_events(&mut self) -> Vec<SessionEvent> {
        std::mem::take(&mut self.uncommitted_events)
    }

    /// Moves `NotStarted` to `Active`. A session without questions finishes
    /// immediately with nothing to submit.
    ///
    /// # Errors
    ///
    /// Returns `QuizError::InvalidTransition` unless the session is
    /// `NotStarted`.
    pub fn start(&mut self, clock: &dyn Clock) -> Result<(), QuizError> {
        if self.status != SessionStatus::NotStarted {
            return Err(self.invalid("start"));
        }
        self.status = SessionStatus::Active;
        self.started_at = Some(clock.now());
        self.record(
            SessionEventKind::SessionStarted(SessionStarted {
                owner_id: self.owner_id.clone(),
                question_count: self.questions.len(),
            }),
            clock,
        );
        debug!(session_id = %self.id, owner = %self.owner_id, questions = self.questions.len(), "session started");

        if self.questions.is_empty() {
            let submission = self.finish(FinishReason::Completed, clock);
            debug_assert!(submission.is_none());
        }
        Ok(())
    }

    /// Locks in `option` for the current question.
    ///
    /// Silently ignored when the question is already locked or the session
    /// is not active: rapid repeated clicks race the lock routinely.
    ///
    /// # Errors
    ///
    /// Returns `QuizError::Validation` if `option` is not one of the current
    /// question's options.
    pub fn select_answer(
        &mut self,
        option: usize,
        clock: &dyn Clock,
    ) -> Result<Selection, QuizError> {
        if self.status != SessionStatus::Active || self.locked {
            return Ok(Selection::Ignored);
        }
        let question = &self.questions[self.cursor];
        let chosen = question
            .option(option)
            .ok_or_else(|| {
                QuizError::Validation(format!(
                    "option {option} does not exist; question {} has {} options",
                    question.id,
                    question.options.len()
                ))
            })?
            .to_owned();
        let question_id = question.id;
        let correct = match self.mode {
            ScoringMode::Local => question.is_correct(option),
            ScoringMode::Authoritative => None,
        };

        let answer = Answer {
            question_id,
            chosen_option: chosen.clone(),
        };
        match self.answers.iter_mut().find(|a| a.question_id == question_id) {
            Some(existing) => *existing = answer,
            None => self.answers.push(answer),
        }
        self.selected = Some(option);
        self.locked = true;
        if correct == Some(true) {
            self.accumulated_score += 1;
        }

        self.record(
            SessionEventKind::AnswerSelected(AnswerSelected {
                question_id,
                cursor: self.cursor,
                option_index: option,
                chosen_option: chosen,
                correct,
            }),
            clock,
        );
        Ok(Selection::Recorded {
            question_id,
            correct,
        })
    }

    /// Moves past the locked question, finishing after the last one.
    ///
    /// # Errors
    ///
    /// Returns `QuizError::InvalidTransition` if the session is not active,
    /// or `QuizError::NotLocked` if the current question is unanswered.
    pub fn advance(&mut self, clock: &dyn Clock) -> Result<Advance, QuizError> {
        if self.status != SessionStatus::Active {
            return Err(self.invalid("advance"));
        }
        if !self.locked {
            return Err(QuizError::NotLocked);
        }

        self.selected = None;
        self.locked = false;
        if self.cursor + 1 < self.questions.len() {
            self.cursor += 1;
            self.record(
                SessionEventKind::SessionAdvanced(SessionAdvanced {
                    cursor: self.cursor,
                }),
                clock,
            );
            return Ok(Advance::Moved {
                cursor: self.cursor,
            });
        }

        self.cursor = self.questions.len();
        let submission = self.finish(FinishReason::Completed, clock);
        Ok(Advance::Finished { submission })
    }

    /// Ends the session because time ran out.
    ///
    /// Questions from the cursor onward count as unanswered, so an answer
    /// locked on the current question is discarded (and its local point
    /// revoked). Calling this on a finished session is a no-op: it loses the
    /// race against whichever transition finished the session first.
    ///
    /// # Errors
    ///
    /// Returns `QuizError::InvalidTransition` if the session never started.
    pub fn force_expire(&mut self, clock: &dyn Clock) -> Result<Expiry, QuizError> {
        match self.status {
            SessionStatus::NotStarted => Err(self.invalid("expire")),
            SessionStatus::Finished => Ok(Expiry::AlreadyFinished),
            SessionStatus::Active => {
                if let Some(question) = self.questions.get(self.cursor) {
                    let question_id = question.id;
                    let revoked_point = self.mode == ScoringMode::Local
                        && self
                            .selected
                            .and_then(|option| question.is_correct(option))
                            .unwrap_or(false);
                    self.answers.retain(|a| a.question_id != question_id);
                    if revoked_point {
                        self.accumulated_score = self.accumulated_score.saturating_sub(1);
                    }
                }
                self.selected = None;
                self.locked = true;
                let submission = self.finish(FinishReason::Expired, clock);
                Ok(Expiry::Expired { submission })
            }
        }
    }

    /// Ends the session early at the player's request, keeping every answer
    /// given so far.
    ///
    /// # Errors
    ///
    /// Returns `QuizError::InvalidTransition` if the session is not active.
    pub fn finish_now(
        &mut self,
        clock: &dyn Clock,
    ) -> Result<Option<SubmissionRequest>, QuizError> {
        if self.status != SessionStatus::Active {
            return Err(self.invalid("finish"));
        }
        Ok(self.finish(FinishReason::Submitted, clock))
    }

    /// Ends the session because the player quit. Nothing is submitted.
    ///
    /// # Errors
    ///
    /// Returns `QuizError::InvalidTransition` if the session is not active.
    pub fn abandon(&mut self, clock: &dyn Clock) -> Result<(), QuizError> {
        if self.status != SessionStatus::Active {
            return Err(self.invalid("abandon"));
        }
        let submission = self.finish(FinishReason::Abandoned, clock);
        debug_assert!(submission.is_none());
        Ok(())
    }

    /// Resets every mutable field and returns to `NotStarted`.
    ///
    /// Always legal. Restarting a session that is already pristine changes
    /// nothing; otherwise the generation is bumped so that timers armed for
    /// the previous run can be recognised as stale.
    pub fn restart(&mut self, clock: &dyn Clock) {
        if self.is_pristine() {
            return;
        }
        self.cursor = 0;
        self.locked = false;
        self.selected = None;
        self.accumulated_score = 0;
        self.answers.clear();
        self.status = SessionStatus::NotStarted;
        self.finish_reason = None;
        self.started_at = None;
        self.submission_claimed = false;
        self.generation += 1;
        self.record(
            SessionEventKind::SessionRestarted(SessionRestarted {
                generation: self.generation,
            }),
            clock,
        );
        debug!(session_id = %self.id, generation = self.generation, "session restarted");
    }

    fn is_pristine(&self) -> bool {
        self.status == SessionStatus::NotStarted
            && self.cursor == 0
            && !self.locked
            && self.answers.is_empty()
            && self.accumulated_score == 0
    }

    fn finish(&mut self, reason: FinishReason, clock: &dyn Clock) -> Option<SubmissionRequest> {
        self.status = SessionStatus::Finished;
        self.finish_reason = Some(reason);
        let elapsed_seconds = self
            .started_at
            .map_or(0, |started| clock.seconds_since(started));
        self.record(
            SessionEventKind::SessionFinished(SessionFinished {
                reason,
                answered: self.answers.len(),
                accumulated_score: self.accumulated_score,
                elapsed_seconds,
            }),
            clock,
        );
        debug!(
            session_id = %self.id,
            reason = ?reason,
            answered = self.answers.len(),
            score = self.accumulated_score,
            "session finished"
        );

        let wants_submission = reason.submits()
            && self.mode == ScoringMode::Authoritative
            && !self.questions.is_empty();
        if !wants_submission || self.submission_claimed {
            return None;
        }
        self.submission_claimed = true;
        Some(SubmissionRequest {
            session_id: self.id,
            generation: self.generation,
            answers: self.answers.clone(),
        })
    }

    fn invalid(&self, operation: &'static str) -> QuizError {
        QuizError::InvalidTransition {
            operation,
            status: self.status,
        }
    }

    fn record(&mut self, kind: SessionEventKind, clock: &dyn Clock) {
        self.next_sequence += 1;
        let event = SessionEvent {
            metadata: EventMetadata {
                event_id: Uuid::new_v4(),
                event_type: kind.event_type().to_owned(),
                session_id: self.id,
                generation: self.generation,
                sequence_number: self.next_sequence,
                occurred_at: clock.now(),
            },
            kind,
        };
        self.uncommitted_events.push(event);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use quizrun_core::event::DomainEvent;
    use quizrun_test_support::{ManualClock, fixed_now, keyed_questions, sample_questions};

    fn clock() -> ManualClock {
        ManualClock::new(fixed_now())
    }

    fn solo(questions: Vec<Question>) -> QuizSession {
        let redacted = questions.iter().map(Question::without_answer).collect();
        QuizSession::new("user-1", redacted, ScoringMode::Authoritative)
    }

    fn competitive(questions: Vec<Question>) -> QuizSession {
        QuizSession::new("Player 1", questions, ScoringMode::Local)
    }

    fn event_types(session: &QuizSession) -> Vec<&'static str> {
        session
            .uncommitted_events()
            .iter()
            .map(DomainEvent::event_type)
            .collect()
    }

    // --- start ---

    #[test]
    fn test_start_from_not_started_activates() {
        let clock = clock();
        let mut session = solo(sample_questions());

        session.start(&clock).unwrap();

        assert_eq!(session.status(), SessionStatus::Active);
        assert_eq!(session.cursor(), 0);
        assert_eq!(session.started_at(), Some(fixed_now()));
        assert_eq!(event_types(&session), vec!["quiz.session_started"]);
    }

    #[test]
    fn test_start_twice_is_invalid_transition() {
        let clock = clock();
        let mut session = solo(sample_questions());
        session.start(&clock).unwrap();

        let err = session.start(&clock).unwrap_err();

        assert_eq!(
            err,
            QuizError::InvalidTransition {
                operation: "start",
                status: SessionStatus::Active,
            }
        );
    }

    #[test]
    fn test_start_on_empty_subset_finishes_with_zero() {
        let clock = clock();
        let mut session = competitive(Vec::new());

        session.start(&clock).unwrap();

        assert!(session.is_finished());
        assert_eq!(session.finish_reason(), Some(FinishReason::Completed));
        assert_eq!(session.accumulated_score(), 0);
        assert_eq!(session.current_question(), None);
    }

    // --- select_answer ---

    #[test]
    fn test_select_answer_locks_and_records() {
        let clock = clock();
        let mut session = solo(sample_questions());
        session.start(&clock).unwrap();

        let selection = session.select_answer(2, &clock).unwrap();

        assert_eq!(
            selection,
            Selection::Recorded {
                question_id: QuestionId(1),
                correct: None,
            }
        );
        assert!(session.is_locked());
        assert_eq!(session.selected(), Some(2));
        assert_eq!(session.answers().len(), 1);
        assert_eq!(session.answers()[0].chosen_option, "Polymorphism");
        assert_eq!(session.accumulated_score(), 0);
    }

    #[test]
    fn test_second_selection_on_locked_question_is_ignored() {
        let clock = clock();
        let mut session = solo(sample_questions());
        session.start(&clock).unwrap();
        session.select_answer(0, &clock).unwrap();

        let second = session.select_answer(2, &clock).unwrap();

        assert_eq!(second, Selection::Ignored);
        assert_eq!(session.selected(), Some(0));
        assert_eq!(session.answers().len(), 1);
        assert_eq!(session.answers()[0].chosen_option, "Inheritance");
    }

    #[test]
    fn test_select_answer_before_start_is_ignored() {
        let clock = clock();
        let mut session = solo(sample_questions());

        assert_eq!(session.select_answer(0, &clock).unwrap(), Selection::Ignored);
        assert!(session.answers().is_empty());
    }

    #[test]
    fn test_select_answer_out_of_range_is_validation_error() {
        let clock = clock();
        let mut session = solo(sample_questions());
        session.start(&clock).unwrap();

        let err = session.select_answer(4, &clock).unwrap_err();

        assert!(matches!(err, QuizError::Validation(_)));
        assert!(!session.is_locked());
    }

    #[test]
    fn test_local_mode_scores_correct_answers() {
        let clock = clock();
        let mut session = competitive(sample_questions());
        session.start(&clock).unwrap();

        let selection = session.select_answer(2, &clock).unwrap();

        assert_eq!(
            selection,
            Selection::Recorded {
                question_id: QuestionId(1),
                correct: Some(true),
            }
        );
        assert_eq!(session.accumulated_score(), 1);
    }

    #[test]
    fn test_authoritative_mode_never_scores_locally() {
        let clock = clock();
        // Keys left in place on purpose: authoritative mode must ignore them.
        let mut session =
            QuizSession::new("user-1", sample_questions(), ScoringMode::Authoritative);
        session.start(&clock).unwrap();

        let selection = session.select_answer(2, &clock).unwrap();

        assert!(matches!(selection, Selection::Recorded { correct: None, .. }));
        assert_eq!(session.accumulated_score(), 0);
    }

    // --- advance ---

    #[test]
    fn test_advance_without_answer_is_not_locked() {
        let clock = clock();
        let mut session = solo(sample_questions());
        session.start(&clock).unwrap();

        assert_eq!(session.advance(&clock).unwrap_err(), QuizError::NotLocked);
        assert_eq!(session.cursor(), 0);
    }

    #[test]
    fn test_advance_moves_cursor_and_unlocks() {
        let clock = clock();
        let mut session = solo(sample_questions());
        session.start(&clock).unwrap();
        session.select_answer(1, &clock).unwrap();

        let outcome = session.advance(&clock).unwrap();

        assert_eq!(outcome, Advance::Moved { cursor: 1 });
        assert!(!session.is_locked());
        assert_eq!(session.selected(), None);
        assert_eq!(session.current_question().unwrap().id, QuestionId(2));
    }

    #[test]
    fn test_advance_before_start_is_invalid_transition() {
        let clock = clock();
        let mut session = solo(sample_questions());

        assert!(matches!(
            session.advance(&clock),
            Err(QuizError::InvalidTransition {
                operation: "advance",
                status: SessionStatus::NotStarted,
            })
        ));
    }

    #[test]
    fn test_advance_past_last_question_finishes_and_submits_once() {
        // Arrange
        let clock = clock();
        let mut session = solo(sample_questions());
        session.start(&clock).unwrap();

        // Act
        let mut finished = None;
        for option in [2, 1, 2] {
            session.select_answer(option, &clock).unwrap();
            if let Advance::Finished { submission } = session.advance(&clock).unwrap() {
                finished = Some(submission);
            }
        }

        // Assert
        let submission = finished.expect("session should finish").expect("solo submits");
        assert_eq!(submission.session_id, session.id());
        assert_eq!(submission.answers.len(), 3);
        assert!(session.is_finished());
        assert_eq!(session.cursor(), 3);
        assert_eq!(session.finish_reason(), Some(FinishReason::Completed));
    }

    #[test]
    fn test_cursor_never_decreases() {
        let clock = clock();
        let mut session = competitive(keyed_questions(5));
        session.start(&clock).unwrap();

        let mut last = session.cursor();
        for step in 0..10 {
            let _ = session.select_answer(step % 3, &clock);
            let _ = session.advance(&clock);
            let _ = session.advance(&clock);
            assert!(session.cursor() >= last);
            assert!(session.cursor() <= session.question_count());
            last = session.cursor();
        }
        assert!(session.is_finished());
    }

    #[test]
    fn test_competitive_finish_produces_no_submission() {
        let clock = clock();
        let mut session = competitive(keyed_questions(1));
        session.start(&clock).unwrap();
        session.select_answer(0, &clock).unwrap();

        let outcome = session.advance(&clock).unwrap();

        assert_eq!(outcome, Advance::Finished { submission: None });
        assert_eq!(session.accumulated_score(), 1);
    }

    // --- force_expire ---

    #[test]
    fn test_force_expire_discards_answer_at_cursor() {
        let clock = clock();
        let mut session = solo(sample_questions());
        session.start(&clock).unwrap();
        session.select_answer(2, &clock).unwrap();
        session.advance(&clock).unwrap();
        session.select_answer(1, &clock).unwrap();

        let expiry = session.force_expire(&clock).unwrap();

        match expiry {
            Expiry::Expired {
                submission: Some(submission),
            } => {
                assert_eq!(submission.answers.len(), 1);
                assert_eq!(submission.answers[0].question_id, QuestionId(1));
            }
            other => panic!("expected Expired with submission, got {other:?}"),
        }
        assert_eq!(session.finish_reason(), Some(FinishReason::Expired));
        assert_eq!(session.cursor(), 1);
    }

    #[test]
    fn test_force_expire_revokes_local_point_at_cursor() {
        let clock = clock();
        let mut session = competitive(sample_questions());
        session.start(&clock).unwrap();
        session.select_answer(2, &clock).unwrap();
        session.advance(&clock).unwrap();
        session.select_answer(1, &clock).unwrap();
        assert_eq!(session.accumulated_score(), 2);

        session.force_expire(&clock).unwrap();

        assert_eq!(session.accumulated_score(), 1);
    }

    #[test]
    fn test_force_expire_after_finish_does_not_resubmit() {
        let clock = clock();
        let mut session = solo(keyed_questions(1));
        session.start(&clock).unwrap();
        session.select_answer(0, &clock).unwrap();
        let advance = session.advance(&clock).unwrap();
        assert!(matches!(
            advance,
            Advance::Finished {
                submission: Some(_)
            }
        ));

        let expiry = session.force_expire(&clock).unwrap();

        assert_eq!(expiry, Expiry::AlreadyFinished);
        assert_eq!(session.finish_reason(), Some(FinishReason::Completed));
    }

    #[test]
    fn test_force_expire_before_start_is_invalid_transition() {
        let clock = clock();
        let mut session = solo(sample_questions());

        assert!(matches!(
            session.force_expire(&clock),
            Err(QuizError::InvalidTransition {
                operation: "expire",
                ..
            })
        ));
    }

    #[test]
    fn test_force_expire_without_answers_submits_empty_attempt() {
        let clock = clock();
        let mut session = solo(sample_questions());
        session.start(&clock).unwrap();

        let expiry = session.force_expire(&clock).unwrap();

        match expiry {
            Expiry::Expired {
                submission: Some(submission),
            } => assert!(submission.answers.is_empty()),
            other => panic!("expected Expired with submission, got {other:?}"),
        }
        assert!(session.is_locked());
    }

    // --- finish_now / abandon ---

    #[test]
    fn test_finish_now_keeps_locked_answer() {
        let clock = clock();
        let mut session = solo(sample_questions());
        session.start(&clock).unwrap();
        session.select_answer(2, &clock).unwrap();

        let submission = session.finish_now(&clock).unwrap().unwrap();

        assert_eq!(submission.answers.len(), 1);
        assert_eq!(session.finish_reason(), Some(FinishReason::Submitted));
        assert!(session.finish_now(&clock).is_err());
    }

    #[test]
    fn test_abandon_finishes_without_submission() {
        let clock = clock();
        let mut session = solo(sample_questions());
        session.start(&clock).unwrap();

        session.abandon(&clock).unwrap();

        assert_eq!(session.finish_reason(), Some(FinishReason::Abandoned));
        assert_eq!(session.force_expire(&clock).unwrap(), Expiry::AlreadyFinished);
    }

    // --- restart ---

    #[test]
    fn test_restart_resets_and_bumps_generation() {
        let clock = clock();
        let mut session = competitive(sample_questions());
        session.start(&clock).unwrap();
        session.select_answer(2, &clock).unwrap();
        session.advance(&clock).unwrap();

        session.restart(&clock);

        assert_eq!(session.status(), SessionStatus::NotStarted);
        assert_eq!(session.cursor(), 0);
        assert!(!session.is_locked());
        assert_eq!(session.selected(), None);
        assert_eq!(session.accumulated_score(), 0);
        assert!(session.answers().is_empty());
        assert_eq!(session.finish_reason(), None);
        assert_eq!(session.generation(), 1);
    }

    #[test]
    fn test_restart_is_idempotent() {
        let clock = clock();
        let mut session = solo(sample_questions());
        session.start(&clock).unwrap();

        session.restart(&clock);
        let events_after_first = session.uncommitted_events().len();
        session.restart(&clock);

        assert_eq!(session.generation(), 1);
        assert_eq!(session.uncommitted_events().len(), events_after_first);
    }

    #[test]
    fn test_restart_rearms_submission() {
        let clock = clock();
        let mut session = solo(keyed_questions(1));
        session.start(&clock).unwrap();
        session.force_expire(&clock).unwrap();

        session.restart(&clock);
        session.start(&clock).unwrap();
        session.select_answer(0, &clock).unwrap();
        let advance = session.advance(&clock).unwrap();

        match advance {
            Advance::Finished {
                submission: Some(submission),
            } => assert_eq!(submission.generation, 1),
            other => panic!("expected a fresh submission, got {other:?}"),
        }
    }

    // --- events ---

    #[test]
    fn test_events_carry_sequence_and_elapsed_time() {
        let clock = clock();
        let mut session = competitive(keyed_questions(1));
        session.start(&clock).unwrap();
        session.select_answer(0, &clock).unwrap();
        clock.advance_seconds(42);
        session.advance(&clock).unwrap();

        let events = session.take_events();

        let sequence: Vec<u64> = events.iter().map(|e| e.metadata.sequence_number).collect();
        assert_eq!(sequence, vec![1, 2, 3]);
        match &events[2].kind {
            SessionEventKind::SessionFinished(payload) => {
                assert_eq!(payload.elapsed_seconds, 42);
                assert_eq!(payload.accumulated_score, 1);
                assert_eq!(payload.reason, FinishReason::Completed);
            }
            other => panic!("expected SessionFinished, got {other:?}"),
        }
        assert_eq!(events[1].to_payload()["AnswerSelected"]["correct"], true);
        assert!(session.uncommitted_events().is_empty());
    }
}
