//! REST client for the quiz backend.
//!
//! `GET {base}/quizzes/{id}` returns the quiz and its questions;
//! `POST {base}/quizzes/{id}/submit` scores an attempt and requires a bearer
//! token. Error bodies carry a `message` field. The client does not retry.

use async_trait::async_trait;
use quizrun_core::collaborator::QuizStore;
use quizrun_core::error::QuizError;
use quizrun_core::question::{Answer, AttemptScore, Question, QuestionId, QuizId};
use serde::{Deserialize, Serialize};
use tracing::{debug, instrument, warn};

use crate::error::StoreError;

#[derive(Debug, Deserialize)]
struct QuizResponse {
    questions: Vec<WireQuestion>,
}

#[derive(Debug, Deserialize)]
struct WireQuestion {
    id: u64,
    question: String,
    options: Vec<String>,
    #[serde(default)]
    topic: Option<String>,
    #[serde(default)]
    explanation: Option<String>,
}

#[derive(Debug, Serialize)]
struct SubmitRequest<'a> {
    answers: &'a [Answer],
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct SubmitResponse {
    score: u32,
    total_questions: u32,
}

#[derive(Debug, Deserialize)]
struct ErrorBody {
    message: String,
}

/// Storage collaborator speaking to the quiz REST backend.
#[derive(Debug, Clone)]
pub struct HttpQuizStore {
    base_url: String,
    client: reqwest::Client,
    access_token: Option<String>,
}

impl HttpQuizStore {
    /// Creates a client for the backend at `base_url` (e.g.
    /// `http://localhost:5000/api`).
    #[must_use]
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into().trim_end_matches('/').to_owned(),
            client: reqwest::Client::new(),
            access_token: None,
        }
    }

    /// Sends `token` as a bearer token on submissions.
    #[must_use]
    pub fn with_access_token(mut self, token: Option<String>) -> Self {
        self.access_token = token;
        self
    }

    async fn fetch(&self, quiz_id: QuizId) -> Result<Vec<Question>, StoreError> {
        let response = self
            .client
            .get(format!("{}/quizzes/{quiz_id}", self.base_url))
            .send()
            .await?;
        let body: QuizResponse = check(response).await?.json().await?;
        Ok(body
            .questions
            .into_iter()
            .map(|q| Question {
                id: QuestionId(q.id),
                prompt: q.question,
                options: q.options,
                correct_option: None,
                topic: q.topic,
                explanation: q.explanation,
            })
            .collect())
    }

    async fn submit(&self, quiz_id: QuizId, answers: &[Answer]) -> Result<AttemptScore, StoreError> {
        let token = self.access_token.as_ref().ok_or(StoreError::Unauthenticated)?;
        let response = self
            .client
            .post(format!("{}/quizzes/{quiz_id}/submit", self.base_url))
            .bearer_auth(token)
            .json(&SubmitRequest { answers })
            .send()
            .await?;
        let body: SubmitResponse = check(response).await?.json().await?;
        Ok(AttemptScore {
            score: body.score,
            total_questions: body.total_questions,
        })
    }
}

/// Passes successful responses through and turns the rest into
/// `StoreError::Backend`, preferring the body's `message`.
async fn check(response: reqwest::Response) -> Result<reqwest::Response, StoreError> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }
    let text = response
        .text()
        .await
        .unwrap_or_else(|e| format!("failed to read error response: {e}"));
    let message = serde_json::from_str::<ErrorBody>(&text).map_or(text, |body| body.message);
    warn!(status = status.as_u16(), message = %message, "backend request failed");
    Err(StoreError::Backend {
        status: status.as_u16(),
        message,
    })
}

#[async_trait]
impl QuizStore for HttpQuizStore {
    #[instrument(skip(self), fields(base_url = %self.base_url))]
    async fn fetch_quiz_questions(&self, quiz_id: QuizId) -> Result<Vec<Question>, QuizError> {
        let questions = self.fetch(quiz_id).await?;
        debug!(questions = questions.len(), "quiz fetched");
        Ok(questions)
    }

    #[instrument(skip(self, answers), fields(base_url = %self.base_url, answers = answers.len()))]
    async fn submit_attempt(
        &self,
        quiz_id: QuizId,
        answers: &[Answer],
    ) -> Result<AttemptScore, QuizError> {
        let score = self.submit(quiz_id, answers).await?;
        debug!(score = score.score, total = score.total_questions, "attempt submitted");
        Ok(score)
    }
}
