//! Command handlers for competitive play.
//!
//! Competitive rounds are local: the pool carries its answer keys, scores are
//! kept by the sessions and nothing is submitted or persisted.

use quizrun_core::clock::Clock;
use quizrun_core::error::QuizError;
use quizrun_core::event::DomainEvent;
use quizrun_core::rng::DeterministicRng;
use tracing::{debug, info};

use crate::config::EngineConfig;
use crate::domain::pool::QuestionPool;
use crate::domain::round::{Round, TurnOutcome};
use crate::domain::session::Selection;

/// Command to open a competitive round.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StartRound {
    /// Number of competitors.
    pub player_count: usize,
    /// Names in turn order. Missing or blank entries become `Player N`;
    /// entries beyond `player_count` are ignored.
    pub player_names: Vec<String>,
}

impl StartRound {
    /// A round for `config.player_count` players with the given names.
    #[must_use]
    pub fn from_config(config: &EngineConfig, player_names: Vec<String>) -> Self {
        Self {
            player_count: config.player_count,
            player_names,
        }
    }
}

/// Handles the `StartRound` command: validates the player count, shuffles
/// and deals the pool, and starts every competitor's session.
///
/// # Errors
///
/// Returns `QuizError::Validation` if the player count is out of range or
/// the pool lacks answer keys.
pub fn handle_start_round(
    command: &StartRound,
    pool: &QuestionPool,
    rng: &mut dyn DeterministicRng,
    clock: &dyn Clock,
) -> Result<Round, QuizError> {
    let names: Vec<String> = (0..command.player_count)
        .map(|i| command.player_names.get(i).cloned().unwrap_or_default())
        .collect();
    let round = Round::deal(pool, &names, rng, clock)?;
    info!(
        player_count = command.player_count,
        pool_len = pool.len(),
        "competition started"
    );
    Ok(round)
}

/// Handles a selection: locks an option in for the live player. The turn
/// does not pass until [`handle_turn_confirm`].
///
/// # Errors
///
/// Returns the round's errors; see [`Round::select_turn_answer`].
pub fn handle_turn_selection(
    round: &mut Round,
    option: usize,
    clock: &dyn Clock,
) -> Result<Selection, QuizError> {
    let selection = round.select_turn_answer(option, clock)?;
    drain_events(round);
    Ok(selection)
}

/// Handles a confirmation: commits the live player's locked answer and
/// passes the turn.
///
/// # Errors
///
/// Returns the round's errors; see [`Round::confirm_turn`].
pub fn handle_turn_confirm(round: &mut Round, clock: &dyn Clock) -> Result<TurnOutcome, QuizError> {
    let outcome = round.confirm_turn(clock)?;
    drain_events(round);
    log_result(round);
    Ok(outcome)
}

/// Handles one whole turn: selects `option` for the live player and
/// confirms it.
///
/// # Errors
///
/// Returns the round's errors; see [`Round::submit_turn_answer`].
pub fn handle_turn_answer(
    round: &mut Round,
    option: usize,
    clock: &dyn Clock,
) -> Result<TurnOutcome, QuizError> {
    let outcome = round.submit_turn_answer(option, clock)?;
    drain_events(round);
    log_result(round);
    Ok(outcome)
}

fn drain_events(round: &mut Round) {
    for event in round.take_events() {
        debug!(
            event_type = event.event_type(),
            session_id = %event.metadata().session_id,
            sequence_number = event.metadata().sequence_number,
            "competition event"
        );
    }
}

fn log_result(round: &Round) {
    if let Some(result) = round.outcome() {
        info!(
            winner = ?result.winner(),
            tie = result.is_tie(),
            "competition finished"
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use quizrun_test_support::{ManualClock, MockRng, SequenceRng, fixed_now, keyed_questions};

    #[test]
    fn test_start_round_pads_missing_names() {
        let pool = QuestionPool::new(keyed_questions(9)).unwrap();
        let command = StartRound {
            player_count: 3,
            player_names: vec!["Ada".to_owned()],
        };

        let round =
            handle_start_round(&command, &pool, &mut MockRng, &ManualClock::new(fixed_now()))
                .unwrap();

        let names: Vec<&str> = round.players().iter().map(|p| p.name()).collect();
        assert_eq!(names, vec!["Ada", "Player 2", "Player 3"]);
        let sizes: Vec<usize> = round
            .players()
            .iter()
            .map(|p| p.session().question_count())
            .collect();
        assert_eq!(sizes, vec![3, 3, 3]);
    }

    #[test]
    fn test_start_round_ignores_extra_names() {
        let pool = QuestionPool::new(keyed_questions(4)).unwrap();
        let command = StartRound {
            player_count: 2,
            player_names: vec!["Ada".into(), "Bob".into(), "Cy".into()],
        };

        let round =
            handle_start_round(&command, &pool, &mut MockRng, &ManualClock::new(fixed_now()))
                .unwrap();

        assert_eq!(round.players().len(), 2);
    }

    #[test]
    fn test_start_round_rejects_single_player() {
        let pool = QuestionPool::new(keyed_questions(4)).unwrap();
        let command = StartRound::from_config(
            &EngineConfig {
                duration_seconds: 30,
                player_count: 1,
            },
            Vec::new(),
        );

        let result =
            handle_start_round(&command, &pool, &mut MockRng, &ManualClock::new(fixed_now()));

        assert!(matches!(result, Err(QuizError::Validation(_))));
    }

    #[test]
    fn test_turns_play_out_to_a_finished_round() {
        // Arrange
        let clock = ManualClock::new(fixed_now());
        let pool = QuestionPool::new(keyed_questions(5)).unwrap();
        let command = StartRound {
            player_count: 2,
            player_names: Vec::new(),
        };
        let mut round =
            handle_start_round(&command, &pool, &mut SequenceRng::identity_for(5), &clock)
                .unwrap();

        // Act: always pick option 0, which is right for odd ids only.
        let mut turns = Vec::new();
        while !round.is_finished() {
            turns.push(handle_turn_answer(&mut round, 0, &clock).unwrap());
        }

        // Assert: player 0 holds 1..=3 (two odd), player 1 holds 4..=5 (one odd).
        assert_eq!(turns.len(), 5);
        let outcome = round.outcome().unwrap();
        assert_eq!(outcome.winner(), Some(0));
        assert_eq!(outcome.standings[0].score, 2);
        assert_eq!(outcome.standings[1].score, 1);
    }

    #[test]
    fn test_selection_then_confirm_passes_the_turn() {
        // Arrange
        let clock = ManualClock::new(fixed_now());
        let pool = QuestionPool::new(keyed_questions(4)).unwrap();
        let command = StartRound {
            player_count: 2,
            player_names: Vec::new(),
        };
        let mut round =
            handle_start_round(&command, &pool, &mut SequenceRng::identity_for(4), &clock)
                .unwrap();

        // Act
        let premature = handle_turn_confirm(&mut round, &clock);
        let selection = handle_turn_selection(&mut round, 1, &clock).unwrap();
        let turn = handle_turn_confirm(&mut round, &clock).unwrap();

        // Assert
        assert_eq!(premature.unwrap_err(), QuizError::NotLocked);
        assert!(matches!(selection, Selection::Recorded { correct: Some(false), .. }));
        assert!(!turn.correct);
        assert_eq!(turn.correct_option.as_deref(), Some("1-a"));
        assert_eq!(round.live_index(), 1);
        assert!(round.take_events().is_empty());
    }
}
