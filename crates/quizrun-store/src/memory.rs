//! In-process scoring collaborator backed by a question bank.
//!
//! Scores the way the quiz backend does: an answer counts when its text
//! equals the stored correct option, and the total is the quiz's question
//! count regardless of how many answers were sent.

use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use quizrun_core::collaborator::{IdentityProvider, QuizStore};
use quizrun_core::error::QuizError;
use quizrun_core::question::{Answer, AttemptScore, Question, QuizId};
use tracing::info;

use crate::bank::{Quiz, QuizBank};
use crate::error::StoreError;

/// A scored attempt kept by [`InMemoryQuizStore`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AttemptRecord {
    /// Who submitted, if anyone was signed in.
    pub user_id: Option<String>,
    /// The quiz attempted.
    pub quiz_id: QuizId,
    /// The answers as submitted.
    pub answers: Vec<Answer>,
    /// The computed score.
    pub score: AttemptScore,
}

/// A quiz listing entry.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QuizSummary {
    /// Quiz identifier.
    pub id: QuizId,
    /// Display title.
    pub title: String,
    /// Number of questions.
    pub question_count: usize,
}

/// Scoring collaborator holding every quiz in memory.
pub struct InMemoryQuizStore {
    quizzes: HashMap<QuizId, Quiz>,
    order: Vec<QuizId>,
    identity: Option<Arc<dyn IdentityProvider>>,
    attempts: Mutex<Vec<AttemptRecord>>,
}

impl std::fmt::Debug for InMemoryQuizStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("InMemoryQuizStore")
            .field("quizzes", &self.order)
            .finish_non_exhaustive()
    }
}

impl InMemoryQuizStore {
    /// Creates a store over `bank`.
    #[must_use]
    pub fn new(bank: QuizBank) -> Self {
        let quizzes = bank.into_quizzes();
        let order = quizzes.iter().map(|q| q.id).collect();
        Self {
            quizzes: quizzes.into_iter().map(|q| (q.id, q)).collect(),
            order,
            identity: None,
            attempts: Mutex::new(Vec::new()),
        }
    }

    /// Records the signed-in user of `identity` with every attempt.
    #[must_use]
    pub fn with_identity(mut self, identity: Arc<dyn IdentityProvider>) -> Self {
        self.identity = Some(identity);
        self
    }

    /// Quizzes in bank order.
    #[must_use]
    pub fn list_quizzes(&self) -> Vec<QuizSummary> {
        self.order
            .iter()
            .filter_map(|id| self.quizzes.get(id))
            .map(|quiz| QuizSummary {
                id: quiz.id,
                title: quiz.title.clone(),
                question_count: quiz.questions.len(),
            })
            .collect()
    }

    /// A quiz's questions with answer keys, for competitive pools.
    ///
    /// # Errors
    ///
    /// Returns `QuizError::Collaborator` if the quiz does not exist.
    pub fn keyed_questions(&self, quiz_id: QuizId) -> Result<Vec<Question>, QuizError> {
        Ok(self.find(quiz_id)?.questions.clone())
    }

    /// Every question in the bank with answer keys, in bank order.
    #[must_use]
    pub fn all_keyed_questions(&self) -> Vec<Question> {
        self.order
            .iter()
            .filter_map(|id| self.quizzes.get(id))
            .flat_map(|quiz| quiz.questions.iter().cloned())
            .collect()
    }

    /// Snapshot of every scored attempt.
    ///
    /// # Panics
    ///
    /// Panics if the internal mutex is poisoned.
    #[must_use]
    pub fn attempts(&self) -> Vec<AttemptRecord> {
        self.attempts.lock().expect("attempt log poisoned").clone()
    }

    fn find(&self, quiz_id: QuizId) -> Result<&Quiz, StoreError> {
        self.quizzes
            .get(&quiz_id)
            .ok_or_else(|| StoreError::NotFound("Quiz not found".to_owned()))
    }
}

/// Counts answers whose text equals the correct option of their question.
#[must_use]
pub fn score_answers(questions: &[Question], answers: &[Answer]) -> AttemptScore {
    let correct = answers
        .iter()
        .filter(|answer| {
            questions.iter().any(|q| {
                q.id == answer.question_id
                    && q.correct_text() == Some(answer.chosen_option.as_str())
            })
        })
        .count();
    AttemptScore {
        score: u32::try_from(correct).unwrap_or(u32::MAX),
        total_questions: u32::try_from(questions.len()).unwrap_or(u32::MAX),
    }
}

#[async_trait]
impl QuizStore for InMemoryQuizStore {
    async fn fetch_quiz_questions(&self, quiz_id: QuizId) -> Result<Vec<Question>, QuizError> {
        let quiz = self.find(quiz_id)?;
        Ok(quiz.questions.iter().map(Question::without_answer).collect())
    }

    async fn submit_attempt(
        &self,
        quiz_id: QuizId,
        answers: &[Answer],
    ) -> Result<AttemptScore, QuizError> {
        let quiz = self
            .quizzes
            .get(&quiz_id)
            .filter(|quiz| !quiz.questions.is_empty())
            .ok_or_else(|| StoreError::NotFound("Quiz not found or has no questions".to_owned()))?;
        let score = score_answers(&quiz.questions, answers);
        let user_id = self.identity.as_ref().and_then(|i| i.current_user_id());

        self.attempts
            .lock()
            .map_err(|e| QuizError::Collaborator(format!("attempt log poisoned: {e}")))?
            .push(AttemptRecord {
                user_id: user_id.clone(),
                quiz_id,
                answers: answers.to_vec(),
                score,
            });
        info!(
            quiz_id = %quiz_id,
            user_id = user_id.as_deref().unwrap_or("-"),
            score = score.score,
            total = score.total_questions,
            "attempt recorded"
        );
        Ok(score)
    }
}
