//! Application layer: orchestration around the domain state machines.

pub mod competition;
pub mod runtime;
pub mod solo;
pub mod views;
