//! Quizrun: storage and identity adapters.
//!
//! `InMemoryQuizStore` scores attempts locally from a question bank file;
//! `HttpQuizStore` talks to the quiz REST backend. Both implement
//! `quizrun_core::collaborator::QuizStore`.

pub mod bank;
pub mod error;
pub mod http;
pub mod identity;
pub mod memory;
