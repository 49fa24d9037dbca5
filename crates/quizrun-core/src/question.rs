//! Question, answer and score records exchanged with collaborators.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::error::QuizError;

/// Identifier of a quiz held by the storage collaborator.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct QuizId(pub u64);

impl fmt::Display for QuizId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Identifier of a question within the storage collaborator.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct QuestionId(pub u64);

impl fmt::Display for QuestionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// A multiple-choice question. Immutable once loaded.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Question {
    /// Question identifier.
    pub id: QuestionId,
    /// The text shown to the player.
    pub prompt: String,
    /// Answer options in display order.
    pub options: Vec<String>,
    /// Index of the correct option. Withheld (`None`) in solo mode, where
    /// the scoring collaborator holds the answer key.
    pub correct_option: Option<usize>,
    /// Optional topic label.
    pub topic: Option<String>,
    /// Optional explanation shown after answering.
    pub explanation: Option<String>,
}

impl Question {
    /// Minimum number of options a question must offer.
    pub const MIN_OPTIONS: usize = 2;

    /// Checks structural validity: enough options and an in-range answer key.
    ///
    /// # Errors
    ///
    /// Returns `QuizError::Validation` describing the first problem found.
    pub fn validate(&self) -> Result<(), QuizError> {
        if self.options.len() < Self::MIN_OPTIONS {
            return Err(QuizError::Validation(format!(
                "question {} has {} options; at least {} are required",
                self.id,
                self.options.len(),
                Self::MIN_OPTIONS
            )));
        }
        if let Some(correct) = self.correct_option.filter(|c| *c >= self.options.len()) {
            return Err(QuizError::Validation(format!(
                "question {} marks option {correct} correct but has only {} options",
                self.id,
                self.options.len()
            )));
        }
        Ok(())
    }

    /// Returns the option text at `index`, if any.
    #[must_use]
    pub fn option(&self, index: usize) -> Option<&str> {
        self.options.get(index).map(String::as_str)
    }

    /// Returns the correct option's text when the answer key is known.
    #[must_use]
    pub fn correct_text(&self) -> Option<&str> {
        self.correct_option.and_then(|i| self.option(i))
    }

    /// Returns whether `index` is the correct option, or `None` when the
    /// answer key is withheld.
    #[must_use]
    pub fn is_correct(&self, index: usize) -> Option<bool> {
        self.correct_option.map(|correct| correct == index)
    }

    /// Returns a copy with the answer key removed.
    #[must_use]
    pub fn without_answer(&self) -> Self {
        Self {
            correct_option: None,
            ..self.clone()
        }
    }
}

/// A player's chosen option for one question.
///
/// Serialized in the storage collaborator's wire shape
/// (`questionId` / `selectedOption`).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Answer {
    /// The question answered.
    #[serde(rename = "questionId")]
    pub question_id: QuestionId,
    /// The chosen option's text.
    #[serde(rename = "selectedOption")]
    pub chosen_option: String,
}

/// Percentage at or above which an attempt is considered excellent.
pub const EXCELLENT_PERCENTAGE: u32 = 70;

/// Result returned by the scoring collaborator.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AttemptScore {
    /// Number of correct answers.
    pub score: u32,
    /// Number of questions in the quiz.
    pub total_questions: u32,
}

/// Coarse judgement of an attempt, used for results messaging.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Verdict {
    /// At least [`EXCELLENT_PERCENTAGE`] percent correct.
    Excellent,
    /// Below the excellence threshold.
    KeepPracticing,
}

impl AttemptScore {
    /// Score as a whole percentage, rounded half away from zero. Zero when
    /// the quiz has no questions.
    #[must_use]
    pub fn percentage(&self) -> u32 {
        if self.total_questions == 0 {
            return 0;
        }
        let scaled = u64::from(self.score) * 100;
        let total = u64::from(self.total_questions);
        let rounded = (scaled * 2 + total) / (total * 2);
        u32::try_from(rounded).unwrap_or(u32::MAX)
    }

    /// Returns the verdict for this score.
    #[must_use]
    pub fn verdict(&self) -> Verdict {
        if self.percentage() >= EXCELLENT_PERCENTAGE {
            Verdict::Excellent
        } else {
            Verdict::KeepPracticing
        }
    }
}
