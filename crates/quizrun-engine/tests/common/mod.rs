//! Shared helpers for engine integration tests.
#![allow(dead_code)]

use std::sync::Arc;

use quizrun_core::clock::Clock;
use quizrun_core::collaborator::{IdentityProvider, QuizStore};
use quizrun_core::question::QuizId;
use quizrun_engine::application::runtime::{SessionHandle, SessionRuntime};
use quizrun_engine::application::solo::SoloAttempt;
use quizrun_test_support::{ManualClock, StaticIdentity, fixed_now};

/// Quiz id used by every scenario.
pub const QUIZ: QuizId = QuizId(1);

/// A clock pinned to the shared fixture instant.
pub fn clock() -> Arc<ManualClock> {
    Arc::new(ManualClock::new(fixed_now()))
}

/// Load a started solo attempt for a signed-in user.
pub async fn started_attempt(store: Arc<dyn QuizStore>) -> SoloAttempt {
    let identity: Arc<dyn IdentityProvider> = Arc::new(StaticIdentity::signed_in("user-1"));
    let clock: Arc<dyn Clock> = clock();
    let mut attempt = SoloAttempt::load(QUIZ, store, identity, clock)
        .await
        .unwrap();
    attempt.start().unwrap();
    attempt
}

/// Spawn a runtime over a freshly loaded (not yet started) attempt.
pub async fn spawn_runtime(store: Arc<dyn QuizStore>, duration: Option<u32>) -> SessionHandle {
    let attempt = SoloAttempt::load(
        QUIZ,
        store,
        Arc::new(StaticIdentity::signed_in("user-1")),
        clock(),
    )
    .await
    .unwrap();
    let (handle, _join) = SessionRuntime::spawn(attempt, duration);
    handle
}
