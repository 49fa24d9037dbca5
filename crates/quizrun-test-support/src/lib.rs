//! Shared test doubles and fixtures for the Quizrun session engine.

mod clock;
mod fixtures;
mod identity;
mod rng;
mod store;

pub use clock::ManualClock;
pub use fixtures::{fixed_now, keyed_questions, sample_questions};
pub use identity::StaticIdentity;
pub use rng::{MockRng, SequenceRng};
pub use store::{FailingQuizStore, GatedQuizStore, RecordingQuizStore, SubmitCall};
