//! Read-only snapshots for presentation layers.

use quizrun_core::question::{AttemptScore, Question, QuestionId, Verdict};
use quizrun_core::status::SessionStatus;
use serde::Serialize;
use uuid::Uuid;

use super::solo::{SoloAttempt, SubmissionState};
use crate::domain::countdown::{CountdownController, Urgency};
use crate::domain::events::FinishReason;
use crate::domain::round::{Round, RoundOutcome, Standing, TurnOutcome};
use crate::domain::session::QuizSession;

/// A question as shown to the player: no answer key.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct QuestionView {
    /// Question identifier.
    pub id: QuestionId,
    /// Prompt text.
    pub prompt: String,
    /// Options in display order.
    pub options: Vec<String>,
    /// Topic label.
    pub topic: Option<String>,
}

impl From<&Question> for QuestionView {
    fn from(question: &Question) -> Self {
        Self {
            id: question.id,
            prompt: question.prompt.clone(),
            options: question.options.clone(),
            topic: question.topic.clone(),
        }
    }
}

/// Countdown state.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TimerView {
    /// Seconds left.
    pub remaining_seconds: u32,
    /// Seconds left as `MM:SS`.
    pub display: String,
    /// How close time is to running out.
    pub urgency: Urgency,
    /// Whether the countdown is ticking.
    pub running: bool,
}

impl From<&CountdownController> for TimerView {
    fn from(countdown: &CountdownController) -> Self {
        Self {
            remaining_seconds: countdown.remaining(),
            display: countdown.display().to_string(),
            urgency: countdown.urgency(),
            running: countdown.is_running(),
        }
    }
}

/// The scored result of a solo attempt.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ResultView {
    /// Correct answers.
    pub score: u32,
    /// Questions in the quiz.
    pub total_questions: u32,
    /// Rounded percentage.
    pub percentage: u32,
    /// Results messaging bucket.
    pub verdict: Verdict,
}

impl From<AttemptScore> for ResultView {
    fn from(score: AttemptScore) -> Self {
        Self {
            score: score.score,
            total_questions: score.total_questions,
            percentage: score.percentage(),
            verdict: score.verdict(),
        }
    }
}

/// Snapshot of a solo session.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SessionView {
    /// Session identifier.
    pub session_id: Uuid,
    /// Lifecycle status.
    pub status: SessionStatus,
    /// Restart generation.
    pub generation: u64,
    /// Index of the current question.
    pub cursor: usize,
    /// Number of questions.
    pub question_count: usize,
    /// Whole-percent progress through the quiz.
    pub progress_percent: u32,
    /// The question awaiting an answer.
    pub current_question: Option<QuestionView>,
    /// Option chosen for the current question.
    pub selected: Option<usize>,
    /// Whether the current answer is locked.
    pub locked: bool,
    /// Answers that count toward the attempt.
    pub answered: usize,
    /// How the session finished.
    pub finish_reason: Option<FinishReason>,
    /// Countdown, for timed challenges.
    pub timer: Option<TimerView>,
    /// Authoritative result, once scored.
    pub result: Option<ResultView>,
    /// Why the last submission failed, while a retry is possible.
    pub submission_error: Option<String>,
}

impl SessionView {
    /// Snapshots `attempt`, with its countdown when timed.
    #[must_use]
    pub fn of(attempt: &SoloAttempt, countdown: Option<&CountdownController>) -> Self {
        let session = attempt.session();
        let submission_error = match attempt.submission() {
            SubmissionState::Failed { reason, .. } => Some(reason.clone()),
            _ => None,
        };
        Self {
            session_id: session.id(),
            status: session.status(),
            generation: session.generation(),
            cursor: session.cursor(),
            question_count: session.question_count(),
            progress_percent: progress_percent(session),
            current_question: session.current_question().map(QuestionView::from),
            selected: session.selected(),
            locked: session.is_locked(),
            answered: session.answers().len(),
            finish_reason: session.finish_reason(),
            timer: countdown.map(TimerView::from),
            result: attempt.score().map(ResultView::from),
            submission_error,
        }
    }
}

/// Progress as `(cursor + 1) / total` in whole percent; 100 once finished.
#[must_use]
pub fn progress_percent(session: &QuizSession) -> u32 {
    let total = session.question_count();
    if total == 0 {
        return 0;
    }
    if session.is_finished() {
        return 100;
    }
    let shown = (session.cursor() + 1).min(total);
    u32::try_from(shown * 100 / total).unwrap_or(100)
}

/// Snapshot of a competitive round.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RoundView {
    /// Whose turn it is.
    pub live_index: usize,
    /// Name of the player whose turn it is.
    pub live_player: Option<String>,
    /// 1-based position of the live question within that player's subset.
    pub live_question_number: Option<usize>,
    /// Size of the live player's subset.
    pub live_question_total: Option<usize>,
    /// The question the live player must answer.
    pub live_question: Option<QuestionView>,
    /// Option the live player has locked in but not yet confirmed.
    pub live_selected: Option<usize>,
    /// Scoreboard in turn order.
    pub players: Vec<Standing>,
    /// Whether every player has finished.
    pub finished: bool,
    /// Final result, once finished.
    pub outcome: Option<RoundOutcome>,
}

impl From<&Round> for RoundView {
    fn from(round: &Round) -> Self {
        let live = round.live_player();
        let mut players = round.standings();
        players.sort_by_key(|s| s.player_index);
        Self {
            live_index: round.live_index(),
            live_player: live.map(|p| p.name().to_owned()),
            live_question_number: live.map(|p| p.session().cursor() + 1),
            live_question_total: live.map(|p| p.session().question_count()),
            live_question: round.live_question().map(QuestionView::from),
            live_selected: live.and_then(|p| p.session().selected()),
            players,
            finished: round.is_finished(),
            outcome: round.outcome(),
        }
    }
}

/// One line of feedback after a turn.
#[must_use]
pub fn turn_feedback(round: &Round, turn: &TurnOutcome) -> String {
    let name = round
        .players()
        .get(turn.player_index)
        .map_or("Player", |p| p.name());
    if turn.correct {
        format!("Correct! {name} earns 1 point.")
    } else {
        match &turn.correct_option {
            Some(answer) => format!("Incorrect. The correct answer was: {answer}"),
            None => "Incorrect.".to_owned(),
        }
    }
}
