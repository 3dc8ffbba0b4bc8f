//! Observable screen state machines.
//!
//! Each machine publishes its current state on a `tokio::sync::watch`
//! channel; consumers hold a receiver and re-render on change. The entry
//! points (`refresh`, `load`, `retry`, `run`, `clear`) are the only way to
//! drive a machine — state is never mutated from outside.

mod detail;
mod list;
mod mutation;

pub use detail::{DetailState, DetailStateMachine};
pub use list::{ListState, ListStateMachine};
pub use mutation::{MutationState, MutationStateMachine};
