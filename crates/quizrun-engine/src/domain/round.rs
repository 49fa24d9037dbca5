//! Competitive rounds: several local sessions taking turns on one screen.

use quizrun_core::clock::Clock;
use quizrun_core::error::QuizError;
use quizrun_core::question::{Question, QuestionId};
use quizrun_core::rng::DeterministicRng;
use quizrun_core::status::SessionStatus;
use serde::Serialize;
use tracing::{debug, info};

use super::events::SessionEvent;
use super::partition::partition;
use super::pool::QuestionPool;
use super::session::{QuizSession, ScoringMode, Selection};

/// Fewest competitors a round accepts.
pub const MIN_PLAYERS: usize = 2;

/// Most competitors a round accepts.
pub const MAX_PLAYERS: usize = 4;

/// Name given to a competitor who did not pick one.
#[must_use]
pub fn default_player_name(index: usize) -> String {
    format!("Player {}", index + 1)
}

/// A named player and their session.
#[derive(Debug)]
pub struct Competitor {
    name: String,
    session: QuizSession,
}

impl Competitor {
    /// Display name.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// The competitor's session.
    #[must_use]
    pub fn session(&self) -> &QuizSession {
        &self.session
    }

    /// Whether the competitor has answered everything assigned to them.
    #[must_use]
    pub fn is_finished(&self) -> bool {
        self.session.is_finished()
    }
}

/// One row of the scoreboard.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Standing {
    /// Position of the player in turn order.
    pub player_index: usize,
    /// Display name.
    pub name: String,
    /// Points earned.
    pub score: u32,
    /// Questions answered so far.
    pub answered: usize,
    /// Questions assigned.
    pub question_count: usize,
}

/// What happened on one turn.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TurnOutcome {
    /// Who answered.
    pub player_index: usize,
    /// The question answered.
    pub question_id: QuestionId,
    /// Whether the answer earned a point.
    pub correct: bool,
    /// Text of the correct option, for feedback.
    pub correct_option: Option<String>,
    /// Whether this answer was the player's last.
    pub player_finished: bool,
    /// Whose turn it is now; `None` once the round is over.
    pub next_player: Option<usize>,
    /// Whether every player has finished.
    pub round_finished: bool,
}

/// Final result of a round.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RoundOutcome {
    /// Scoreboard, highest score first, ties in turn order.
    pub standings: Vec<Standing>,
    /// Every player sharing the highest score, in turn order.
    pub leaders: Vec<usize>,
}

impl RoundOutcome {
    /// The declared winner: the first leader in turn order.
    #[must_use]
    pub fn winner(&self) -> Option<usize> {
        self.leaders.first().copied()
    }

    /// Whether more than one player shares the highest score.
    #[must_use]
    pub fn is_tie(&self) -> bool {
        self.leaders.len() > 1
    }
}

/// Several sessions sharing one partitioned pool, answering in turn.
#[derive(Debug)]
pub struct Round {
    players: Vec<Competitor>,
    live_index: usize,
    finished: bool,
}

impl Round {
    /// Shuffles `pool`, deals one subset per name and starts the round.
    /// Blank names fall back to `Player N`.
    ///
    /// # Errors
    ///
    /// Returns `QuizError::Validation` if the number of names is outside
    /// [`MIN_PLAYERS`]..=[`MAX_PLAYERS`] or the pool lacks answer keys.
    pub fn deal(
        pool: &QuestionPool,
        names: &[String],
        rng: &mut dyn DeterministicRng,
        clock: &dyn Clock,
    ) -> Result<Self, QuizError> {
        check_player_count(names.len())?;
        if !pool.has_answer_keys() {
            return Err(QuizError::Validation(
                "competitive play needs every question's answer key".to_owned(),
            ));
        }
        let subsets = partition(pool, names.len(), rng)?;
        let players = names.iter().cloned().zip(subsets).collect();
        Self::new(players, clock)
    }

    /// Starts a round over pre-assigned `(name, questions)` pairs.
    ///
    /// # Errors
    ///
    /// Returns `QuizError::Validation` if the number of players is outside
    /// [`MIN_PLAYERS`]..=[`MAX_PLAYERS`].
    pub fn new(players: Vec<(String, Vec<Question>)>, clock: &dyn Clock) -> Result<Self, QuizError> {
        check_player_count(players.len())?;
        let mut competitors = Vec::with_capacity(players.len());
        for (index, (name, questions)) in players.into_iter().enumerate() {
            let name = if name.trim().is_empty() {
                default_player_name(index)
            } else {
                name.trim().to_owned()
            };
            let mut session = QuizSession::new(name.clone(), questions, ScoringMode::Local);
            session.start(clock)?;
            competitors.push(Competitor { name, session });
        }

        let mut round = Self {
            players: competitors,
            live_index: 0,
            finished: false,
        };
        if round.players[0].is_finished() {
            round.advance_turn();
        }
        info!(
            players = round.players.len(),
            live_index = round.live_index,
            finished = round.finished,
            "round started"
        );
        Ok(round)
    }

    /// Competitors in turn order.
    #[must_use]
    pub fn players(&self) -> &[Competitor] {
        &self.players
    }

    /// Index of the player whose turn it is.
    #[must_use]
    pub fn live_index(&self) -> usize {
        self.live_index
    }

    /// The player whose turn it is, while the round runs.
    #[must_use]
    pub fn live_player(&self) -> Option<&Competitor> {
        if self.finished {
            None
        } else {
            self.players.get(self.live_index)
        }
    }

    /// The question the live player must answer.
    #[must_use]
    pub fn live_question(&self) -> Option<&Question> {
        self.live_player()
            .and_then(|player| player.session.current_question())
    }

    /// Whether every player has finished.
    #[must_use]
    pub fn is_finished(&self) -> bool {
        self.finished
    }

    /// Locks `option` in for the live player's current question without
    /// passing the turn. A second selection before [`Round::confirm_turn`]
    /// is ignored.
    ///
    /// # Errors
    ///
    /// Returns `QuizError::InvalidTransition` if the round is over, or
    /// `QuizError::Validation` if `option` is out of range.
    pub fn select_turn_answer(
        &mut self,
        option: usize,
        clock: &dyn Clock,
    ) -> Result<Selection, QuizError> {
        if self.finished {
            return Err(round_over("select_turn_answer"));
        }
        let selection = self.players[self.live_index]
            .session
            .select_answer(option, clock)?;
        debug!(player_index = self.live_index, option, ?selection, "turn answer selected");
        Ok(selection)
    }

    /// Commits the live player's locked answer, advances that player and
    /// passes the turn.
    ///
    /// # Errors
    ///
    /// Returns `QuizError::InvalidTransition` if the round is over, or
    /// `QuizError::NotLocked` if no answer was selected. Either way the turn
    /// stays where it was.
    pub fn confirm_turn(&mut self, clock: &dyn Clock) -> Result<TurnOutcome, QuizError> {
        if self.finished {
            return Err(round_over("confirm_turn"));
        }
        let player_index = self.live_index;
        let session = &mut self.players[player_index].session;
        let (question_id, correct, correct_option) = match session.current_question() {
            Some(question) if session.is_locked() => (
                question.id,
                session
                    .selected()
                    .and_then(|option| question.is_correct(option))
                    .unwrap_or(false),
                question.correct_text().map(str::to_owned),
            ),
            _ => return Err(QuizError::NotLocked),
        };
        session.advance(clock)?;
        let player_finished = session.is_finished();
        debug!(
            player_index,
            question_id = %question_id,
            correct,
            player_finished,
            "turn confirmed"
        );

        let next_player = self.advance_turn();
        Ok(TurnOutcome {
            player_index,
            question_id,
            correct,
            correct_option,
            player_finished,
            next_player,
            round_finished: self.finished,
        })
    }

    /// Selects `option` and confirms it in one step. An answer the live
    /// player had already locked wins over `option`.
    ///
    /// # Errors
    ///
    /// See [`Round::select_turn_answer`] and [`Round::confirm_turn`]. A
    /// rejected option leaves the turn with the same player.
    pub fn submit_turn_answer(
        &mut self,
        option: usize,
        clock: &dyn Clock,
    ) -> Result<TurnOutcome, QuizError> {
        self.select_turn_answer(option, clock)?;
        self.confirm_turn(clock)
    }

    /// Passes the turn to the next player who still has questions, looking
    /// at most once around the table. Marks the round finished and returns
    /// `None` when nobody is left.
    pub fn advance_turn(&mut self) -> Option<usize> {
        let count = self.players.len();
        let mut next = self.live_index;
        for _ in 0..count {
            next = (next + 1) % count;
            if !self.players[next].is_finished() {
                self.live_index = next;
                return Some(next);
            }
        }
        if !self.finished {
            self.finished = true;
            info!(players = count, "round finished");
        }
        None
    }

    /// Scoreboard, highest score first, ties in turn order.
    #[must_use]
    pub fn standings(&self) -> Vec<Standing> {
        let mut standings: Vec<Standing> = self
            .players
            .iter()
            .enumerate()
            .map(|(player_index, player)| Standing {
                player_index,
                name: player.name.clone(),
                score: player.session.accumulated_score(),
                answered: player.session.answers().len(),
                question_count: player.session.question_count(),
            })
            .collect();
        standings.sort_by(|a, b| b.score.cmp(&a.score));
        standings
    }

    /// The result, once the round is finished.
    #[must_use]
    pub fn outcome(&self) -> Option<RoundOutcome> {
        if !self.finished {
            return None;
        }
        let standings = self.standings();
        let top = standings.first().map_or(0, |s| s.score);
        let mut leaders: Vec<usize> = standings
            .iter()
            .filter(|s| s.score == top)
            .map(|s| s.player_index)
            .collect();
        leaders.sort_unstable();
        Some(RoundOutcome { standings, leaders })
    }

    /// Drains every player's uncommitted events, in turn order.
    pub fn take_events(&mut self) -> Vec<SessionEvent> {
        self.players
            .iter_mut()
            .flat_map(|player| player.session.take_events())
            .collect()
    }
}

fn check_player_count(count: usize) -> Result<(), QuizError> {
    if (MIN_PLAYERS..=MAX_PLAYERS).contains(&count) {
        Ok(())
    } else {
        Err(QuizError::Validation(format!(
            "a round needs {MIN_PLAYERS} to {MAX_PLAYERS} players, got {count}"
        )))
    }
}

fn round_over(operation: &'static str) -> QuizError {
    QuizError::InvalidTransition {
        operation,
        status: SessionStatus::Finished,
    }
}
