//! Scenario driving for the fluxnet engine.
//!
//! A scenario is an engine plus a declarative [`Timeline`] of
//! `(tick, command)` entries. The [`ScenarioRunner`] owns both and, on each
//! step, submits the commands due at the current tick before stepping the
//! engine -- so every scripted edit takes effect in that tick's pre-tick
//! phase, never mid-tick.
//!
//! The [`report`] module renders one-line-per-node textual summaries from
//! engine snapshots. It is a consumer of the query API: the core never
//! depends on it and never blocks on it.

pub mod compute_grid;
pub mod error;
pub mod report;
pub mod runner;
pub mod timeline;

pub use compute_grid::{ComputeGrid, build_compute_grid};
pub use error::ScenarioError;
pub use runner::ScenarioRunner;
pub use timeline::Timeline;
