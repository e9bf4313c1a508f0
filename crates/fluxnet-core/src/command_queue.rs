//! Input command queue for externally-submitted engine mutations.
//!
//! Commands are queued by the scenario driver and executed at tick
//! boundaries to keep the simulation deterministic. Each command is a single
//! atomic edit. Sources are addressed by name (a command may target a source
//! that another command in the same batch creates); nodes are fixed at setup
//! and addressed by id.
//!
//! Command application is silent and best-effort: a command whose target no
//! longer resolves is skipped, never an error.

use crate::fixed::{Fixed64, Ticks};
use crate::id::NodeId;
use crate::node::{NodeState, Signal};
use crate::source::ResourceTemplate;

// ---------------------------------------------------------------------------
// Command enum
// ---------------------------------------------------------------------------

/// A single command that can be submitted to the engine.
///
/// Commands are queued and executed at the start of the next tick (during
/// the pre-tick phase), so an edit submitted between ticks takes effect
/// starting with that tick's distribute/consume/transfer pass.
#[derive(Debug, Clone, PartialEq, serde::Serialize, serde::Deserialize)]
pub enum Command {
    /// Create a new, empty source.
    AddSource { name: String },
    /// Remove a source and stop its distribution.
    RemoveSource { name: String },
    /// Add a receiving node to a source.
    AddReceiver { source: String, node: NodeId },
    /// Remove a receiving node from a source.
    RemoveReceiver { source: String, node: NodeId },
    /// Append a distribution entry to a source.
    AddDistribution {
        source: String,
        template: ResourceTemplate,
        amount: Fixed64,
    },
    /// Remove the first value-equal distribution entry from a source.
    RemoveDistribution {
        source: String,
        template: ResourceTemplate,
    },
    /// Set a node's external signal.
    SetSignal { node: NodeId, signal: Signal },
    /// Set a node's behavioral state.
    SetState { node: NodeId, state: NodeState },
}

// ---------------------------------------------------------------------------
// CommandQueue
// ---------------------------------------------------------------------------

/// A queue of commands waiting to be executed at the next tick boundary.
///
/// Supports optional history tracking for replay and debugging.
#[derive(Debug, Default)]
pub struct CommandQueue {
    /// Commands waiting to be executed.
    pending: Vec<Command>,
    /// History of executed commands: (tick, command).
    history: Vec<(Ticks, Command)>,
    /// Maximum history entries to retain. 0 = no history.
    max_history: usize,
}

impl CommandQueue {
    /// Create a new empty command queue with no history tracking.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a new command queue that retains up to `max_history` entries.
    pub fn with_max_history(max_history: usize) -> Self {
        Self {
            pending: Vec::new(),
            history: Vec::new(),
            max_history,
        }
    }

    /// Push a single command onto the queue.
    pub fn submit(&mut self, command: Command) {
        self.pending.push(command);
    }

    /// Push multiple commands onto the queue at once.
    pub fn submit_batch(&mut self, commands: impl IntoIterator<Item = Command>) {
        self.pending.extend(commands);
    }

    /// Drain all pending commands, moving them to history with the given
    /// tick. Returns the drained commands in submission order.
    pub fn drain(&mut self, tick: Ticks) -> Vec<Command> {
        let commands: Vec<Command> = self.pending.drain(..).collect();

        if self.max_history > 0 {
            for cmd in &commands {
                self.history.push((tick, cmd.clone()));
            }
            let excess = self.history.len().saturating_sub(self.max_history);
            if excess > 0 {
                self.history.drain(..excess);
            }
        }

        commands
    }

    /// Number of commands waiting to be executed.
    pub fn pending_count(&self) -> usize {
        self.pending.len()
    }

    /// Whether the queue has no pending commands.
    pub fn is_empty(&self) -> bool {
        self.pending.is_empty()
    }

    /// Get the command history (tick, command) pairs.
    pub fn history(&self) -> &[(Ticks, Command)] {
        &self.history
    }

    /// Clear all history entries.
    pub fn clear_history(&mut self) {
        self.history.clear();
    }
}

// ===========================================================================
// Tests
// ===========================================================================
