//! Test stores: mock `QuizStore` implementations for tests.

use std::sync::Mutex;
use std::sync::atomic::{AtomicUsize, Ordering};

use async_trait::async_trait;
use quizrun_core::collaborator::QuizStore;
use quizrun_core::error::QuizError;
use quizrun_core::question::{Answer, AttemptScore, Question, QuizId};
use tokio::sync::Semaphore;

/// One recorded `submit_attempt` call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SubmitCall {
    /// The quiz the attempt was submitted for.
    pub quiz_id: QuizId,
    /// The answers submitted.
    pub answers: Vec<Answer>,
}

/// A store that serves a fixed question list (answer keys withheld), scores
/// submissions against the keys, and records every submit call.
#[derive(Debug)]
pub struct RecordingQuizStore {
    questions: Vec<Question>,
    submits: Mutex<Vec<SubmitCall>>,
    failures_remaining: Mutex<u32>,
    fetches: AtomicUsize,
}

impl RecordingQuizStore {
    /// Create a store over `questions`, which should carry answer keys.
    #[must_use]
    pub fn new(questions: Vec<Question>) -> Self {
        Self::failing_first(questions, 0)
    }

    /// Like [`RecordingQuizStore::new`], but the first `failures` submit
    /// calls fail with a collaborator error before any succeed.
    #[must_use]
    pub fn failing_first(questions: Vec<Question>, failures: u32) -> Self {
        Self {
            questions,
            submits: Mutex::new(Vec::new()),
            failures_remaining: Mutex::new(failures),
            fetches: AtomicUsize::new(0),
        }
    }

    /// Returns a snapshot of all submit calls, failed ones included.
    ///
    /// # Panics
    ///
    /// Panics if the internal mutex is poisoned.
    pub fn submit_calls(&self) -> Vec<SubmitCall> {
        self.submits.lock().unwrap().clone()
    }

    /// Number of `fetch_quiz_questions` calls served.
    pub fn fetch_count(&self) -> usize {
        self.fetches.load(Ordering::SeqCst)
    }

    fn score(&self, answers: &[Answer]) -> AttemptScore {
        let correct = answers
            .iter()
            .filter(|answer| {
                self.questions.iter().any(|q| {
                    q.id == answer.question_id && q.correct_text() == Some(answer.chosen_option.as_str())
                })
            })
            .count();
        AttemptScore {
            score: u32::try_from(correct).unwrap_or(u32::MAX),
            total_questions: u32::try_from(self.questions.len()).unwrap_or(u32::MAX),
        }
    }
}

#[async_trait]
impl QuizStore for RecordingQuizStore {
    async fn fetch_quiz_questions(&self, _quiz_id: QuizId) -> Result<Vec<Question>, QuizError> {
        self.fetches.fetch_add(1, Ordering::SeqCst);
        Ok(self.questions.iter().map(Question::without_answer).collect())
    }

    async fn submit_attempt(
        &self,
        quiz_id: QuizId,
        answers: &[Answer],
    ) -> Result<AttemptScore, QuizError> {
        self.submits.lock().unwrap().push(SubmitCall {
            quiz_id,
            answers: answers.to_vec(),
        });
        let mut failures = self.failures_remaining.lock().unwrap();
        if *failures > 0 {
            *failures -= 1;
            return Err(QuizError::Collaborator("connection reset by peer".into()));
        }
        Ok(self.score(answers))
    }
}

/// A store that always returns a collaborator error. Useful for testing
/// error-handling paths.
#[derive(Debug)]
pub struct FailingQuizStore;

#[async_trait]
impl QuizStore for FailingQuizStore {
    async fn fetch_quiz_questions(&self, _quiz_id: QuizId) -> Result<Vec<Question>, QuizError> {
        Err(QuizError::Collaborator("connection refused".into()))
    }

    async fn submit_attempt(
        &self,
        _quiz_id: QuizId,
        _answers: &[Answer],
    ) -> Result<AttemptScore, QuizError> {
        Err(QuizError::Collaborator("connection refused".into()))
    }
}

/// A recording store whose submit calls park until the test releases them,
/// for exercising inputs that arrive while a submission is in flight.
#[derive(Debug)]
pub struct GatedQuizStore {
    inner: RecordingQuizStore,
    gate: Semaphore,
    entered: AtomicUsize,
}

impl GatedQuizStore {
    /// Create a gated store over `questions`.
    #[must_use]
    pub fn new(questions: Vec<Question>) -> Self {
        Self {
            inner: RecordingQuizStore::new(questions),
            gate: Semaphore::new(0),
            entered: AtomicUsize::new(0),
        }
    }

    /// Let one parked submit call proceed.
    pub fn release(&self) {
        self.gate.add_permits(1);
    }

    /// Number of submit calls that have reached the gate.
    #[must_use]
    pub fn entered(&self) -> usize {
        self.entered.load(Ordering::SeqCst)
    }

    /// Submit calls that passed the gate.
    #[must_use]
    pub fn submit_calls(&self) -> Vec<SubmitCall> {
        self.inner.submit_calls()
    }
}

#[async_trait]
impl QuizStore for GatedQuizStore {
    async fn fetch_quiz_questions(&self, quiz_id: QuizId) -> Result<Vec<Question>, QuizError> {
        self.inner.fetch_quiz_questions(quiz_id).await
    }

    async fn submit_attempt(
        &self,
        quiz_id: QuizId,
        answers: &[Answer],
    ) -> Result<AttemptScore, QuizError> {
        self.entered.fetch_add(1, Ordering::SeqCst);
        let permit = self
            .gate
            .acquire()
            .await
            .map_err(|e| QuizError::Collaborator(format!("gate closed: {e}")))?;
        permit.forget();
        self.inner.submit_attempt(quiz_id, answers).await
    }
}
