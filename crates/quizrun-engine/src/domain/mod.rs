//! Domain model: pure, synchronous state machines.

pub mod countdown;
pub mod events;
pub mod partition;
pub mod pool;
pub mod round;
pub mod session;
