//! Nodes: the actors of the flow graph.
//!
//! A node owns one [`ResourcePool`] per resource type it has ever seen, a
//! usage rate in `[0, 1]`, an unbounded effectiveness accumulator, a
//! behavioral state, and an externally-set signal. Once per tick every node
//! drains `floor(usage_rate * pool.len)` units from the front of each pool
//! and adds their value sum to its effectiveness -- independent of state and
//! signal.

use crate::fixed::{Fixed64, whole_units};
use crate::id::ResourceTypeId;
use crate::pool::{ResourcePool, ResourceUnit};
use std::collections::BTreeMap;

// ---------------------------------------------------------------------------
// Behavioral state and signal
// ---------------------------------------------------------------------------

/// Behavioral state of a node.
///
/// Each state carries an associated multiplier (see [`NodeState::multiplier`])
/// intended to scale behavior. The engine itself never applies it -- the
/// multiplier is observable data for consumers such as renderers or a future
/// consumption-rate hook.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
pub enum NodeState {
    #[default]
    Default,
    Conserving,
    Expending,
}

impl NodeState {
    /// The multiplier associated with this state. Inert in the base engine.
    pub fn multiplier(self) -> Fixed64 {
        match self {
            NodeState::Default => Fixed64::from_num(1),
            NodeState::Conserving => Fixed64::from_num(0.5),
            NodeState::Expending => Fixed64::from_num(2),
        }
    }
}

/// An externally-set hint consumed by adjacent links.
///
/// Links act on signals during their transfer pass but never clear them; a
/// signal persists until the driver explicitly resets it.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
pub enum Signal {
    #[default]
    None,
    Danger,
    Opportunity,
}

// ---------------------------------------------------------------------------
// Consume summary
// ---------------------------------------------------------------------------

/// Per-type result of one [`Node::consume`] call. Used for event emission.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DrainedPool {
    pub resource_type: ResourceTypeId,
    pub quantity: u64,
    pub value: Fixed64,
}

// ---------------------------------------------------------------------------
// Node
// ---------------------------------------------------------------------------

/// An actor in the flow graph.
///
/// Created at setup, never destroyed during a run. `state` and `signal` are
/// mutated by links and the external driver; `pools` and `effectiveness` are
/// mutated every tick.
#[derive(Debug, Clone, serde::Serialize, serde::Deserialize)]
pub struct Node {
    name: String,
    usage_rate: Fixed64,
    pools: BTreeMap<ResourceTypeId, ResourcePool>,
    effectiveness: Fixed64,
    state: NodeState,
    signal: Signal,
}

impl Node {
    pub(crate) fn new(name: String, usage_rate: Fixed64) -> Self {
        Self {
            name,
            usage_rate,
            pools: BTreeMap::new(),
            effectiveness: Fixed64::ZERO,
            state: NodeState::default(),
            signal: Signal::default(),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn usage_rate(&self) -> Fixed64 {
        self.usage_rate
    }

    pub fn effectiveness(&self) -> Fixed64 {
        self.effectiveness
    }

    pub fn state(&self) -> NodeState {
        self.state
    }

    pub fn signal(&self) -> Signal {
        self.signal
    }

    pub fn set_state(&mut self, state: NodeState) {
        self.state = state;
    }

    pub fn set_signal(&mut self, signal: Signal) {
        self.signal = signal;
    }

    /// Append `unit` to the pool matching its type, creating it if absent.
    pub fn receive(&mut self, unit: ResourceUnit) {
        self.pools.entry(unit.resource_type).or_default().push(unit);
    }

    /// Drain `floor(usage_rate * len)` units from the front of every pool and
    /// add the sum of their values to effectiveness.
    ///
    /// Runs once per tick for every node, independent of state and signal.
    /// Returns the per-type drains (types with a zero drain are omitted).
    pub fn consume(&mut self) -> Vec<DrainedPool> {
        let mut drained = Vec::new();
        for (&resource_type, pool) in self.pools.iter_mut() {
            let drain = whole_units(self.usage_rate * Fixed64::from_num(pool.len() as u64));
            if drain == 0 {
                continue;
            }
            let units = pool.take(drain);
            let value: Fixed64 = units.iter().map(|u| u.value).sum();
            self.effectiveness += value;
            drained.push(DrainedPool {
                resource_type,
                quantity: units.len() as u64,
                value,
            });
        }
        drained
    }

    /// Remove and return up to `count` units of `resource_type` from the
    /// front of its pool. Returns an empty Vec if the pool does not exist.
    #[must_use = "returns the units actually withdrawn, which may be fewer than requested"]
    pub fn withdraw(&mut self, resource_type: ResourceTypeId, count: u64) -> Vec<ResourceUnit> {
        match self.pools.get_mut(&resource_type) {
            Some(pool) => pool.take(count),
            None => Vec::new(),
        }
    }

    /// Weighted resource pressure for one type: `usage_rate * pool.len`.
    ///
    /// Zero if the node holds no pool of that type. Couples transfer volume
    /// to consumption rate: a node that burns resources faster generates
    /// more pull.
    pub fn pressure(&self, resource_type: ResourceTypeId) -> Fixed64 {
        match self.pools.get(&resource_type) {
            Some(pool) => self.usage_rate * Fixed64::from_num(pool.len() as u64),
            None => Fixed64::ZERO,
        }
    }

    /// Number of units held of one type (0 if the pool is absent).
    pub fn resource_count(&self, resource_type: ResourceTypeId) -> usize {
        self.pools.get(&resource_type).map_or(0, ResourcePool::len)
    }

    /// The resource types this node has ever held, in id order.
    pub fn resource_types(&self) -> impl Iterator<Item = ResourceTypeId> + '_ {
        self.pools.keys().copied()
    }

    /// Iterate (type, pool) pairs in id order.
    pub fn pools(&self) -> impl Iterator<Item = (ResourceTypeId, &ResourcePool)> {
        self.pools.iter().map(|(&t, p)| (t, p))
    }
}
