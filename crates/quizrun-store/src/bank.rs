//! Question bank files: quizzes with their answer keys, in YAML or JSON.
//!
//! ```yaml
//! quizzes:
//!   - id: 1
//!     title: Software Engineering Fundamentals
//!     questions:
//!       - question: Which concept allows an object to take on many forms?
//!         options: [Inheritance, Encapsulation, Polymorphism, Abstraction]
//!         answer: Polymorphism
//!         topic: OOP
//! ```
//!
//! Answers are given as option text and turned into an index on load.
//! Questions without an explicit `id` are numbered in file order, continuing
//! after the highest explicit id seen so far.

use std::collections::HashSet;
use std::path::Path;

use quizrun_core::question::{Question, QuestionId, QuizId};
use serde::Deserialize;
use tracing::debug;

use crate::error::StoreError;

#[derive(Debug, Deserialize)]
struct BankFile {
    quizzes: Vec<QuizRecord>,
}

#[derive(Debug, Deserialize)]
struct QuizRecord {
    id: u64,
    title: String,
    #[serde(default)]
    description: Option<String>,
    #[serde(default)]
    questions: Vec<QuestionRecord>,
}

#[derive(Debug, Deserialize)]
struct QuestionRecord {
    #[serde(default)]
    id: Option<u64>,
    question: String,
    options: Vec<String>,
    #[serde(alias = "correct_answer")]
    answer: String,
    #[serde(default)]
    topic: Option<String>,
    #[serde(default)]
    explanation: Option<String>,
}

/// A quiz with its answer keys.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Quiz {
    /// Quiz identifier.
    pub id: QuizId,
    /// Display title.
    pub title: String,
    /// Optional blurb.
    pub description: Option<String>,
    /// Questions in display order, answer keys included.
    pub questions: Vec<Question>,
}

/// Every quiz in a bank file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QuizBank {
    quizzes: Vec<Quiz>,
}

impl QuizBank {
    /// Parses a YAML bank.
    ///
    /// # Errors
    ///
    /// Returns `StoreError::Yaml` on malformed YAML and `StoreError::Invalid`
    /// if a quiz or question is inconsistent.
    pub fn from_yaml_str(source: &str) -> Result<Self, StoreError> {
        Self::from_file(serde_yaml::from_str(source)?)
    }

    /// Parses a JSON bank.
    ///
    /// # Errors
    ///
    /// Returns `StoreError::Json` on malformed JSON and `StoreError::Invalid`
    /// if a quiz or question is inconsistent.
    pub fn from_json_str(source: &str) -> Result<Self, StoreError> {
        Self::from_file(serde_json::from_str(source)?)
    }

    /// Reads a bank from disk; `.json` files are parsed as JSON, anything
    /// else as YAML.
    ///
    /// # Errors
    ///
    /// Returns `StoreError::Io` if the file cannot be read, otherwise the
    /// parse errors of [`QuizBank::from_yaml_str`] / [`QuizBank::from_json_str`].
    pub fn load(path: &Path) -> Result<Self, StoreError> {
        let source = std::fs::read_to_string(path)?;
        let is_json = path
            .extension()
            .is_some_and(|ext| ext.eq_ignore_ascii_case("json"));
        let bank = if is_json {
            Self::from_json_str(&source)?
        } else {
            Self::from_yaml_str(&source)?
        };
        debug!(path = %path.display(), quizzes = bank.quizzes.len(), "question bank loaded");
        Ok(bank)
    }

    /// Quizzes in file order.
    #[must_use]
    pub fn quizzes(&self) -> &[Quiz] {
        &self.quizzes
    }

    /// Looks up a quiz by id.
    #[must_use]
    pub fn quiz(&self, id: QuizId) -> Option<&Quiz> {
        self.quizzes.iter().find(|q| q.id == id)
    }

    /// Every question of every quiz, answer keys included, for competitive
    /// pools.
    #[must_use]
    pub fn all_questions(&self) -> Vec<Question> {
        self.quizzes
            .iter()
            .flat_map(|quiz| quiz.questions.iter().cloned())
            .collect()
    }

    /// Consumes the bank, yielding its quizzes.
    #[must_use]
    pub fn into_quizzes(self) -> Vec<Quiz> {
        self.quizzes
    }

    fn from_file(file: BankFile) -> Result<Self, StoreError> {
        let mut quiz_ids = HashSet::new();
        let mut question_ids = HashSet::new();
        let mut next_id = 1;
        let mut quizzes = Vec::with_capacity(file.quizzes.len());

        for record in file.quizzes {
            if !quiz_ids.insert(record.id) {
                return Err(StoreError::Invalid(format!("duplicate quiz id {}", record.id)));
            }
            let mut questions = Vec::with_capacity(record.questions.len());
            for (position, q) in record.questions.into_iter().enumerate() {
                let id = match q.id {
                    Some(id) => id,
                    None => {
                        while question_ids.contains(&next_id) {
                            next_id += 1;
                        }
                        next_id
                    }
                };
                if !question_ids.insert(id) {
                    return Err(StoreError::Invalid(format!("duplicate question id {id}")));
                }
                next_id = next_id.max(id + 1);

                let correct = q.options.iter().position(|o| *o == q.answer).ok_or_else(|| {
                    StoreError::Invalid(format!(
                        "quiz {} question {}: answer {:?} is not one of its options",
                        record.id,
                        position + 1,
                        q.answer
                    ))
                })?;
                let question = Question {
                    id: QuestionId(id),
                    prompt: q.question,
                    options: q.options,
                    correct_option: Some(correct),
                    topic: q.topic,
                    explanation: q.explanation,
                };
                question
                    .validate()
                    .map_err(|e| StoreError::Invalid(format!("quiz {}: {e}", record.id)))?;
                questions.push(question);
            }
            quizzes.push(Quiz {
                id: QuizId(record.id),
                title: record.title,
                description: record.description,
                questions,
            });
        }
        Ok(Self { quizzes })
    }
}
