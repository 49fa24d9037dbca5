//! Interactive solo attempt.

use std::error::Error;
use std::sync::Arc;

use quizrun_core::clock::SystemClock;
use quizrun_core::collaborator::{IdentityProvider, QuizStore};
use quizrun_core::error::QuizError;
use quizrun_core::question::QuizId;
use quizrun_engine::application::runtime::{SessionHandle, SessionRuntime};
use quizrun_engine::application::solo::SoloAttempt;
use quizrun_engine::application::views::SessionView;
use quizrun_engine::domain::events::FinishReason;
use quizrun_engine::domain::session::Selection;
use quizrun_store::identity::TokenIdentity;
use tracing::info;

use crate::input::{self, SoloAction};
use crate::render;

/// Whether the loop should keep reading input.
enum Flow {
    Continue,
    Stop,
}

pub async fn run(
    quiz: u64,
    store: Arc<dyn QuizStore>,
    identity: Arc<TokenIdentity>,
    timer: Option<u32>,
) -> Result<(), Box<dyn Error>> {
    let identity: Arc<dyn IdentityProvider> = identity;
    let attempt = SoloAttempt::load(QuizId(quiz), store, identity, Arc::new(SystemClock)).await?;
    let (handle, task) = SessionRuntime::spawn(attempt, timer);

    render::solo_help();
    handle.start().await?;

    let mut views = handle.subscribe();
    let mut shown = views.borrow_and_update().clone();
    render::session(&shown);
    let mut lines = input::lines();

    loop {
        tokio::select! {
            changed = views.changed() => {
                if changed.is_err() {
                    break;
                }
                let view = views.borrow_and_update().clone();
                let flow = show_change(&shown, &view);
                shown = view;
                if matches!(flow, Flow::Stop) {
                    break;
                }
            }
            line = lines.next_line() => {
                let Some(line) = line? else {
                    handle.quit().await?;
                    break;
                };
                if matches!(act(&handle, &line).await?, Flow::Stop) {
                    break;
                }
            }
        }
    }

    drop(views);
    drop(handle);
    let attempt = task.await?;
    info!(
        quiz_id = %attempt.quiz_id(),
        status = %attempt.session().status(),
        score = ?attempt.score().map(|s| s.score),
        "solo attempt closed"
    );
    Ok(())
}

/// Prints what changed between two snapshots.
fn show_change(before: &SessionView, after: &SessionView) -> Flow {
    if after.finish_reason == Some(FinishReason::Expired)
        && before.finish_reason != Some(FinishReason::Expired)
    {
        println!();
        println!("Time's up!");
    }
    if let Some(result) = &after.result {
        if before.result.is_none() {
            render::result(result);
        }
        return Flow::Stop;
    }
    let new_error = after
        .submission_error
        .as_ref()
        .filter(|error| before.submission_error.as_ref() != Some(*error));
    if let Some(error) = new_error {
        println!("Submission failed: {error}");
        println!("Type 'retry' to send it again, 'r' to start over or 'q' to quit.");
    }
    let moved = before.generation != after.generation
        || before.cursor != after.cursor
        || before.status != after.status
        || before.selected != after.selected
        || before.locked != after.locked;
    let urgency_changed = after.timer.as_ref().filter(|new| {
        before
            .timer
            .as_ref()
            .is_some_and(|old| old.urgency != new.urgency)
    });
    if moved {
        render::session(after);
    } else if let Some(timer) = urgency_changed {
        println!("[{}] remaining", timer.display);
    }
    Flow::Continue
}

async fn act(handle: &SessionHandle, line: &str) -> Result<Flow, QuizError> {
    let Some(action) = input::parse_solo(line) else {
        println!("Unknown command. Type 'help' for the list.");
        return Ok(Flow::Continue);
    };
    match action {
        SoloAction::Choose(option) => match handle.select(option).await {
            Ok(Selection::Recorded { .. }) => {}
            Ok(Selection::Ignored) => println!("That question is already answered."),
            Err(QuizError::Validation(msg)) => println!("{msg}"),
            Err(e) => return Err(e),
        },
        SoloAction::Next => match handle.advance().await {
            Ok(_) => {}
            Err(QuizError::NotLocked) => println!("Pick an option first."),
            Err(QuizError::InvalidTransition { .. }) => println!("The attempt is over."),
            Err(e) => report(&e),
        },
        SoloAction::Finish => match handle.finish().await {
            Ok(_) => {}
            Err(QuizError::InvalidTransition { .. }) => println!("The attempt is over."),
            Err(e) => report(&e),
        },
        SoloAction::Retry => {
            if let Err(e) = handle.retry().await {
                report(&e);
            }
        }
        SoloAction::Restart => {
            handle.restart().await?;
            handle.start().await?;
        }
        SoloAction::Quit => {
            handle.quit().await?;
            println!("Attempt abandoned.");
            return Ok(Flow::Stop);
        }
        SoloAction::Help => render::solo_help(),
    }
    Ok(Flow::Continue)
}

/// Submission failures are shown from the view; everything else here.
fn report(error: &QuizError) {
    match error {
        QuizError::SubmissionFailed(_) | QuizError::NotAuthenticated => {}
        other => println!("{other}"),
    }
}
