//! The session runtime: a task that owns a solo attempt and serializes
//! player input and countdown ticks through one queue.
//!
//! A separate ticker task sends one [`SessionInput::Tick`] per second,
//! stamped with the generation it was spawned for. Restarting or finishing
//! aborts the ticker; ticks already queued for an old generation are
//! recognised by the countdown and dropped.

use std::time::Duration;

use quizrun_core::error::QuizError;
use quizrun_core::event::DomainEvent;
use quizrun_core::question::AttemptScore;
use tokio::sync::{mpsc, oneshot, watch};
use tokio::task::JoinHandle;
use tokio::time::{Instant, interval_at};
use tracing::{debug, info, instrument, warn};

use super::solo::{AttemptProgress, SoloAttempt};
use super::views::SessionView;
use crate::domain::countdown::{CountdownController, Tick};
use crate::domain::session::Selection;

const INPUT_CAPACITY: usize = 64;
const TICK_PERIOD: Duration = Duration::from_secs(1);

type Reply<T> = oneshot::Sender<Result<T, QuizError>>;

/// Messages accepted by the runtime.
#[derive(Debug)]
pub enum SessionInput {
    /// Start the session and its countdown.
    Start(Reply<()>),
    /// Lock in an option for the current question.
    Select {
        /// Option index.
        option: usize,
        /// Where to send the result.
        reply: Reply<Selection>,
    },
    /// Move past the locked question.
    Advance(Reply<AttemptProgress>),
    /// Finish early and submit.
    Finish(Reply<AttemptScore>),
    /// Retry a failed submission.
    Retry(Reply<AttemptScore>),
    /// Reset to `NotStarted`.
    Restart(Reply<()>),
    /// Abandon without submitting.
    Quit(Reply<()>),
    /// One second elapsed for the given generation.
    Tick {
        /// Generation the ticker was spawned for.
        generation: u64,
    },
}

/// Cloneable front end to a running session.
#[derive(Debug, Clone)]
pub struct SessionHandle {
    inputs: mpsc::Sender<SessionInput>,
    views: watch::Receiver<SessionView>,
}

impl SessionHandle {
    /// Starts the session.
    ///
    /// # Errors
    ///
    /// Returns the session's transition error, or `QuizError::Collaborator`
    /// if the runtime has stopped.
    pub async fn start(&self) -> Result<(), QuizError> {
        self.request(SessionInput::Start).await
    }

    /// Locks in `option` for the current question.
    ///
    /// # Errors
    ///
    /// See [`SoloAttempt::select`].
    pub async fn select(&self, option: usize) -> Result<Selection, QuizError> {
        self.request(|reply| SessionInput::Select { option, reply })
            .await
    }

    /// Moves past the locked question.
    ///
    /// # Errors
    ///
    /// See [`SoloAttempt::advance`].
    pub async fn advance(&self) -> Result<AttemptProgress, QuizError> {
        self.request(SessionInput::Advance).await
    }

    /// Finishes early and submits.
    ///
    /// # Errors
    ///
    /// See [`SoloAttempt::finish_now`].
    pub async fn finish(&self) -> Result<AttemptScore, QuizError> {
        self.request(SessionInput::Finish).await
    }

    /// Retries a failed submission.
    ///
    /// # Errors
    ///
    /// See [`SoloAttempt::retry_submission`].
    pub async fn retry(&self) -> Result<AttemptScore, QuizError> {
        self.request(SessionInput::Retry).await
    }

    /// Resets the session.
    ///
    /// # Errors
    ///
    /// Returns `QuizError::Collaborator` if the runtime has stopped.
    pub async fn restart(&self) -> Result<(), QuizError> {
        self.request(SessionInput::Restart).await
    }

    /// Abandons the session.
    ///
    /// # Errors
    ///
    /// Returns `QuizError::Collaborator` if the runtime has stopped.
    pub async fn quit(&self) -> Result<(), QuizError> {
        self.request(SessionInput::Quit).await
    }

    /// Feeds one tick for `generation`, bypassing the interval ticker.
    ///
    /// # Errors
    ///
    /// Returns `QuizError::Collaborator` if the runtime has stopped.
    pub async fn tick(&self, generation: u64) -> Result<(), QuizError> {
        self.inputs
            .send(SessionInput::Tick { generation })
            .await
            .map_err(|_| stopped())
    }

    /// The latest snapshot.
    #[must_use]
    pub fn view(&self) -> SessionView {
        self.views.borrow().clone()
    }

    /// A receiver notified on every change.
    #[must_use]
    pub fn subscribe(&self) -> watch::Receiver<SessionView> {
        self.views.clone()
    }

    async fn request<T>(
        &self,
        input: impl FnOnce(Reply<T>) -> SessionInput,
    ) -> Result<T, QuizError> {
        let (reply, response) = oneshot::channel();
        self.inputs
            .send(input(reply))
            .await
            .map_err(|_| stopped())?;
        response.await.map_err(|_| stopped())?
    }
}

fn stopped() -> QuizError {
    QuizError::Collaborator("session runtime has stopped".to_owned())
}

/// The task owning a solo attempt.
pub struct SessionRuntime {
    attempt: SoloAttempt,
    countdown: Option<CountdownController>,
    inputs: mpsc::Receiver<SessionInput>,
    ticker_inputs: mpsc::WeakSender<SessionInput>,
    ticker: Option<JoinHandle<()>>,
    views: watch::Sender<SessionView>,
}

impl SessionRuntime {
    /// Spawns the runtime for `attempt`. With `duration_seconds` the attempt
    /// is a timed challenge.
    ///
    /// The runtime runs until every handle is dropped and then yields the
    /// attempt back through the join handle.
    #[must_use]
    pub fn spawn(
        attempt: SoloAttempt,
        duration_seconds: Option<u32>,
    ) -> (SessionHandle, JoinHandle<SoloAttempt>) {
        let countdown = duration_seconds.map(CountdownController::new);
        let (sender, inputs) = mpsc::channel(INPUT_CAPACITY);
        let (views, view_receiver) =
            watch::channel(SessionView::of(&attempt, countdown.as_ref()));
        let runtime = Self {
            attempt,
            countdown,
            inputs,
            ticker_inputs: sender.downgrade(),
            ticker: None,
            views,
        };
        let join = tokio::spawn(runtime.run());
        let handle = SessionHandle {
            inputs: sender,
            views: view_receiver,
        };
        (handle, join)
    }

    #[instrument(name = "session_runtime", skip_all, fields(quiz_id = %self.attempt.quiz_id(), session_id = %self.attempt.session().id()))]
    async fn run(mut self) -> SoloAttempt {
        info!(timed = self.countdown.is_some(), "session runtime started");
        while let Some(input) = self.inputs.recv().await {
            self.handle(input).await;
            self.publish();
        }
        self.stop_ticker();
        info!("session runtime stopped");
        self.attempt
    }

    async fn handle(&mut self, input: SessionInput) {
        match input {
            SessionInput::Start(reply) => {
                let result = self.attempt.start();
                if result.is_ok() {
                    self.start_countdown();
                }
                let _ = reply.send(result);
            }
            SessionInput::Select { option, reply } => {
                let _ = reply.send(self.attempt.select(option));
            }
            SessionInput::Advance(reply) => {
                let result = self.attempt.advance().await;
                self.stop_if_finished();
                let _ = reply.send(result);
            }
            SessionInput::Finish(reply) => {
                let result = self.attempt.finish_now().await;
                self.stop_if_finished();
                let _ = reply.send(result);
            }
            SessionInput::Retry(reply) => {
                let _ = reply.send(self.attempt.retry_submission().await);
            }
            SessionInput::Restart(reply) => {
                self.attempt.restart();
                self.stop_ticker();
                if let Some(countdown) = self.countdown.as_mut() {
                    countdown.reset();
                }
                let _ = reply.send(Ok(()));
            }
            SessionInput::Quit(reply) => {
                self.attempt.quit();
                self.stop_if_finished();
                let _ = reply.send(Ok(()));
            }
            SessionInput::Tick { generation } => self.on_tick(generation).await,
        }
    }

    async fn on_tick(&mut self, generation: u64) {
        let Some(countdown) = self.countdown.as_mut() else {
            return;
        };
        match countdown.tick_for(generation) {
            Tick::Running { remaining } => {
                if remaining % 10 == 0 {
                    debug!(remaining, "countdown running");
                }
            }
            Tick::Expired => {
                info!("time is up, submitting progress");
                self.stop_ticker();
                if let Err(e) = self.attempt.expire().await {
                    warn!(error = %e, "expired attempt was not scored");
                }
            }
            Tick::Stopped | Tick::Stale => {
                debug!(generation, "ignoring tick");
            }
        }
    }

    fn start_countdown(&mut self) {
        let generation = self.attempt.session().generation();
        let Some(countdown) = self.countdown.as_mut() else {
            return;
        };
        countdown.arm(generation);
        self.stop_ticker();

        let inputs = self.ticker_inputs.clone();
        self.ticker = Some(tokio::spawn(async move {
            let mut interval = interval_at(Instant::now() + TICK_PERIOD, TICK_PERIOD);
            loop {
                interval.tick().await;
                let Some(sender) = inputs.upgrade() else {
                    break;
                };
                if sender.send(SessionInput::Tick { generation }).await.is_err() {
                    break;
                }
            }
        }));
        debug!(generation, "countdown armed");
    }

    fn stop_if_finished(&mut self) {
        if self.attempt.session().is_finished() {
            if let Some(countdown) = self.countdown.as_mut() {
                countdown.stop();
            }
            self.stop_ticker();
        }
    }

    fn stop_ticker(&mut self) {
        if let Some(ticker) = self.ticker.take() {
            ticker.abort();
        }
    }

    fn publish(&mut self) {
        for event in self.attempt.take_events() {
            debug!(
                event_type = event.event_type(),
                sequence_number = event.metadata().sequence_number,
                generation = event.metadata().generation,
                payload = %event.to_payload(),
                "session event"
            );
        }
        self.views
            .send_replace(SessionView::of(&self.attempt, self.countdown.as_ref()));
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use super::*;
    use quizrun_core::collaborator::QuizStore;
    use quizrun_core::question::QuizId;
    use quizrun_core::status::SessionStatus;
    use quizrun_test_support::{
        GatedQuizStore, ManualClock, RecordingQuizStore, StaticIdentity, fixed_now,
        keyed_questions, sample_questions,
    };

    use crate::domain::events::FinishReason;

    async fn spawn_with(
        store: Arc<dyn QuizStore>,
        duration: Option<u32>,
    ) -> (SessionHandle, JoinHandle<SoloAttempt>) {
        let attempt = SoloAttempt::load(
            QuizId(1),
            store,
            Arc::new(StaticIdentity::signed_in("user-1")),
            Arc::new(ManualClock::new(fixed_now())),
        )
        .await
        .unwrap();
        SessionRuntime::spawn(attempt, duration)
    }

    #[tokio::test]
    async fn test_inputs_flow_through_the_actor() {
        // Arrange
        let store = Arc::new(RecordingQuizStore::new(sample_questions()));
        let (handle, _join) = spawn_with(store.clone(), None).await;

        // Act
        handle.start().await.unwrap();
        let mut last = None;
        for option in [2, 1, 2] {
            handle.select(option).await.unwrap();
            last = Some(handle.advance().await.unwrap());
        }

        // Assert
        assert!(matches!(last, Some(AttemptProgress::Scored(score)) if score.score == 3));
        let view = handle.view();
        assert_eq!(view.status, SessionStatus::Finished);
        assert_eq!(view.result.unwrap().percentage, 100);
        assert_eq!(store.submit_calls().len(), 1);
    }

    #[tokio::test]
    async fn test_double_select_keeps_first() {
        let store = Arc::new(RecordingQuizStore::new(sample_questions()));
        let (handle, _join) = spawn_with(store, None).await;
        handle.start().await.unwrap();

        let first = handle.select(0).await.unwrap();
        let second = handle.select(3).await.unwrap();

        assert!(matches!(first, Selection::Recorded { .. }));
        assert_eq!(second, Selection::Ignored);
        assert_eq!(handle.view().selected, Some(0));
    }

    #[tokio::test(start_paused = true)]
    async fn test_countdown_expires_idle_session() {
        // Arrange
        let store = Arc::new(RecordingQuizStore::new(sample_questions()));
        let (handle, _join) = spawn_with(store.clone(), Some(30)).await;
        let mut views = handle.subscribe();

        // Act
        handle.start().await.unwrap();
        let view = views
            .wait_for(|view| view.status == SessionStatus::Finished)
            .await
            .unwrap()
            .clone();

        // Assert
        assert_eq!(view.finish_reason, Some(FinishReason::Expired));
        assert_eq!(view.timer.as_ref().unwrap().display, "00:00");
        assert_eq!(view.result.unwrap().score, 0);
        let calls = store.submit_calls();
        assert_eq!(calls.len(), 1);
        assert!(calls[0].answers.is_empty());
    }

    #[tokio::test]
    async fn test_manual_ticks_drive_the_countdown() {
        let store = Arc::new(RecordingQuizStore::new(sample_questions()));
        let (handle, _join) = spawn_with(store.clone(), Some(10)).await;
        handle.start().await.unwrap();
        handle.select(2).await.unwrap();

        for _ in 0..30 {
            handle.tick(0).await.unwrap();
        }
        // Any request round-trips after the queued ticks.
        let score = handle.retry().await.unwrap();

        assert_eq!(handle.view().finish_reason, Some(FinishReason::Expired));
        assert_eq!(score.score, 0);
        assert_eq!(store.submit_calls().len(), 1);
    }

    #[tokio::test]
    async fn test_stale_ticks_after_restart_are_ignored() {
        let store = Arc::new(RecordingQuizStore::new(sample_questions()));
        let (handle, _join) = spawn_with(store.clone(), Some(30)).await;
        handle.start().await.unwrap();
        handle.restart().await.unwrap();
        handle.start().await.unwrap();

        for _ in 0..30 {
            handle.tick(0).await.unwrap();
        }
        handle.select(1).await.unwrap();

        let view = handle.view();
        assert_eq!(view.generation, 1);
        assert_eq!(view.status, SessionStatus::Active);
        assert_eq!(view.timer.unwrap().remaining_seconds, 30);
        assert!(store.submit_calls().is_empty());
    }

    #[tokio::test]
    async fn test_expiry_racing_final_advance_submits_once() {
        // Arrange
        let store = Arc::new(GatedQuizStore::new(keyed_questions(1)));
        let (handle, _join) = spawn_with(store.clone(), Some(30)).await;
        handle.start().await.unwrap();
        handle.select(0).await.unwrap();

        // Act: the last advance parks inside the store while the countdown
        // runs out behind it.
        let advancing = tokio::spawn({
            let handle = handle.clone();
            async move { handle.advance().await }
        });
        while store.entered() == 0 {
            tokio::task::yield_now().await;
        }
        for _ in 0..30 {
            handle.tick(0).await.unwrap();
        }
        store.release();
        let progress = advancing.await.unwrap().unwrap();
        handle.retry().await.unwrap();

        // Assert
        assert!(matches!(progress, AttemptProgress::Scored(score) if score.score == 1));
        assert_eq!(store.submit_calls().len(), 1);
        assert_eq!(store.entered(), 1);
        assert_eq!(handle.view().finish_reason, Some(FinishReason::Completed));
    }

    #[tokio::test]
    async fn test_quit_abandons_without_submitting() {
        let store = Arc::new(RecordingQuizStore::new(sample_questions()));
        let (handle, _join) = spawn_with(store.clone(), Some(30)).await;
        handle.start().await.unwrap();
        handle.select(2).await.unwrap();

        handle.quit().await.unwrap();
        handle.tick(0).await.unwrap();

        let view = handle.view();
        assert_eq!(view.finish_reason, Some(FinishReason::Abandoned));
        assert!(store.submit_calls().is_empty());
    }

    #[tokio::test]
    async fn test_runtime_returns_attempt_when_handles_drop() {
        let store = Arc::new(RecordingQuizStore::new(sample_questions()));
        let (handle, join) = spawn_with(store, Some(30)).await;
        handle.start().await.unwrap();

        drop(handle);
        let attempt = join.await.unwrap();

        assert_eq!(attempt.session().status(), SessionStatus::Active);
    }
}
