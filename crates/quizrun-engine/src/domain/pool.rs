//! The question pool: an ordered, immutable, cheaply shared question list.

use std::collections::HashSet;
use std::sync::Arc;

use quizrun_core::error::QuizError;
use quizrun_core::question::Question;
use quizrun_core::rng::{DeterministicRng, fisher_yates};

/// Ordered, read-only sequence of questions.
///
/// Cloning shares the underlying storage, so one pool can back every
/// session of a round.
#[derive(Debug, Clone)]
pub struct QuestionPool {
    questions: Arc<[Question]>,
}

impl QuestionPool {
    /// Builds a pool, validating every question and rejecting duplicate ids.
    ///
    /// # Errors
    ///
    /// Returns `QuizError::Validation` if a question is malformed or two
    /// questions share an id.
    pub fn new(questions: Vec<Question>) -> Result<Self, QuizError> {
        let mut seen = HashSet::with_capacity(questions.len());
        for question in &questions {
            question.validate()?;
            if !seen.insert(question.id) {
                return Err(QuizError::Validation(format!(
                    "duplicate question id {} in pool",
                    question.id
                )));
            }
        }
        Ok(Self {
            questions: questions.into(),
        })
    }

    /// Number of questions.
    #[must_use]
    pub fn len(&self) -> usize {
        self.questions.len()
    }

    /// Whether the pool holds no questions.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.questions.is_empty()
    }

    /// Returns the question at `index`.
    #[must_use]
    pub fn get(&self, index: usize) -> Option<&Question> {
        self.questions.get(index)
    }

    /// All questions in pool order.
    #[must_use]
    pub fn questions(&self) -> &[Question] {
        &self.questions
    }

    /// Whether every question carries its answer key, as competitive mode
    /// requires.
    #[must_use]
    pub fn has_answer_keys(&self) -> bool {
        self.questions.iter().all(|q| q.correct_option.is_some())
    }

    /// Returns a shuffled copy of the questions; the pool itself is unchanged.
    #[must_use]
    pub fn shuffled(&self, rng: &mut dyn DeterministicRng) -> Vec<Question> {
        let mut questions = self.questions.to_vec();
        fisher_yates(&mut questions, rng);
        questions
    }
}
