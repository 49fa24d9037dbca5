//! Hot-seat competitive round on one terminal.

use std::error::Error;

use quizrun_core::clock::SystemClock;
use quizrun_core::error::QuizError;
use quizrun_core::question::QuizId;
use quizrun_core::rng::SeededRng;
use quizrun_engine::application::competition::{
    StartRound, handle_start_round, handle_turn_confirm, handle_turn_selection,
};
use quizrun_engine::application::views::{RoundView, turn_feedback};
use quizrun_engine::config::EngineConfig;
use quizrun_engine::domain::pool::QuestionPool;
use quizrun_engine::domain::session::Selection;
use quizrun_store::memory::InMemoryQuizStore;

use crate::input::{self, TurnAction};
use crate::render;

pub async fn run(
    store: &InMemoryQuizStore,
    config: &EngineConfig,
    names: Vec<String>,
    quiz: Option<u64>,
    seed: Option<u64>,
) -> Result<(), Box<dyn Error>> {
    let questions = match quiz {
        Some(id) => store.keyed_questions(QuizId(id))?,
        None => store.all_keyed_questions(),
    };
    let pool = QuestionPool::new(questions)?;
    let mut rng = seed.map_or_else(SeededRng::from_entropy, SeededRng::from_seed);
    let clock = SystemClock;

    let command = StartRound::from_config(config, names);
    let mut round = handle_start_round(&command, &pool, &mut rng, &clock)?;
    println!(
        "{} players, {} questions. Type an option number to pick, Enter to submit, 'q' to stop.",
        round.players().len(),
        pool.len()
    );

    let mut lines = input::lines();
    while !round.is_finished() {
        let view = RoundView::from(&round);
        render::round_turn(&view);

        let Some(line) = lines.next_line().await? else {
            println!("Round stopped.");
            return Ok(());
        };
        match input::parse_turn(&line) {
            Some(TurnAction::Quit) => {
                println!("Round stopped.");
                render::scoreboard(&view);
                return Ok(());
            }
            Some(TurnAction::Choose(option)) => {
                match handle_turn_selection(&mut round, option, &clock) {
                    Ok(Selection::Recorded { .. }) => {}
                    Ok(Selection::Ignored) => {
                        println!("Your answer is already locked. Press Enter to submit it.");
                    }
                    Err(QuizError::Validation(msg)) => println!("{msg}"),
                    Err(e) => return Err(e.into()),
                }
            }
            Some(TurnAction::Confirm) => match handle_turn_confirm(&mut round, &clock) {
                Ok(turn) => {
                    println!("{}", turn_feedback(&round, &turn));
                    render::scoreboard(&RoundView::from(&round));
                }
                Err(QuizError::NotLocked) => println!("Pick an option first."),
                Err(e) => return Err(e.into()),
            },
            None => println!("Type the number of an option, or Enter to submit."),
        }
    }

    if let Some(outcome) = round.outcome() {
        render::round_outcome(&outcome);
    }
    Ok(())
}
