//! Client core for the Vinilos record catalog.
//!
//! Everything a frontend needs short of rendering: domain models, the REST
//! client, an optional sqlite read-through cache, per-entity repositories,
//! observable screen state machines (list / detail / mutation), and a
//! reference-resolution engine that loads a parent's child references
//! concurrently with per-child success/failure tracking.

pub mod api;
pub mod config;
pub mod domain;
pub mod error;
pub mod repository;
pub mod resolve;
pub mod state;
pub mod store;

#[cfg(feature = "test-utils")]
pub mod testing;

pub use error::FetchError;
