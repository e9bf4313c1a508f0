//! Fluxnet Core -- a discrete-time resource-flow simulation engine.
//!
//! This crate provides the flow graph (nodes connected by pairwise links),
//! resource pools, generator sources, the command queue, events, queries,
//! and deterministic fixed-point arithmetic that fluxnet consumers
//! (drivers, renderers, metrics) build on.
//!
//! # Five-Phase Tick Pipeline
//!
//! Each call to [`engine::Engine::step`] advances the simulation by one tick
//! through the following phases:
//!
//! 1. **Pre-tick** -- Drain the command queue and apply driver edits.
//! 2. **Distribute** -- Every active source injects units into its receivers.
//! 3. **Consume** -- Every node drains a fraction of each pool and
//!    accumulates effectiveness.
//! 4. **Transfer** -- Every link, in declared order: signal handling,
//!    gradient computation, unit movement.
//! 5. **Post-tick** -- Deliver buffered events, increment the tick counter,
//!    recompute the state hash.
//!
//! Collections are processed strictly in their stored order (sources and
//! nodes in insertion order, links in declaration order). Pool mutation is
//! in place, so later links in the same tick observe the effects of earlier
//! ones -- that ordering is an observable part of the contract.
//!
//! # Command Pattern
//!
//! Runtime edits are queued and applied at the next tick boundary, never
//! immediately:
//!
//! ```rust,ignore
//! engine.submit(Command::SetSignal { node, signal: Signal::Danger });
//! engine.step(); // the signal is set during this step's pre-tick phase
//! ```
//!
//! # Key Types
//!
//! - [`engine::Engine`] -- Main simulation engine and pipeline orchestrator.
//! - [`graph::FlowGraph`] -- Nodes and the pairwise links between them, with
//!   explicit declaration-order iteration.
//! - [`node::Node`] -- Resource pools plus usage rate, effectiveness,
//!   behavioral state, and external signal.
//! - [`link::Link`] -- Pressure-gradient transfer channel between two nodes.
//! - [`source::Source`] -- Named generator with receivers and a per-tick
//!   distribution table.
//! - [`registry::Registry`] -- Immutable table of resource types (frozen at
//!   startup).
//! - [`fixed::Fixed64`] -- Q32.32 fixed-point type for deterministic math.
//! - [`event::EventBus`] -- Buffered event delivery with per-kind suppression.
//! - [`query`] -- Owned snapshot types for renderers and reporters.

pub mod command_queue;
pub mod engine;
pub mod event;
pub mod fixed;
pub mod graph;
pub mod id;
pub mod link;
pub mod node;
pub mod pool;
pub mod query;
pub mod registry;
pub mod sim;
pub mod source;

#[cfg(any(test, feature = "test-utils"))]
pub mod test_utils;
