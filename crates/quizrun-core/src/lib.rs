//! Quizrun Core: shared domain abstractions.
//!
//! This crate defines the traits and types that the session engine and its
//! collaborator adapters depend on. It contains no infrastructure code.

pub mod clock;
pub mod collaborator;
pub mod error;
pub mod event;
pub mod question;
pub mod rng;
pub mod status;
