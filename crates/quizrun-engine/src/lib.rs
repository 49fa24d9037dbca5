//! Quizrun: quiz session engine.
//!
//! Drives players through question sequences: answer locking, countdown
//! expiry, exactly-once submission to the scoring collaborator, and in
//! competitive mode the partitioning of a shared pool and turn rotation.

pub mod application;
pub mod config;
pub mod domain;
