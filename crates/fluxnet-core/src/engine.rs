//! The simulation engine: owns the flow graph and sources and orchestrates
//! the five-phase tick pipeline.
//!
//! # Architecture
//!
//! The `Engine` owns:
//! - A [`FlowGraph`] (nodes and the pairwise links between them)
//! - The [`Source`] generators, in insertion order
//! - A [`Registry`] of resource types (immutable after construction)
//! - A [`CommandQueue`] of driver edits applied at tick boundaries
//! - An [`EventBus`] for typed simulation events
//! - A [`SimState`] (tick counter) and the last computed state hash
//!
//! # Five-Phase Pipeline
//!
//! Each `step()` runs:
//! 1. **Pre-tick** -- drain the command queue and apply edits
//! 2. **Distribute** -- sources inject units into their receivers
//! 3. **Consume** -- nodes drain pools and accumulate effectiveness
//! 4. **Transfer** -- links move units along pressure gradients, in
//!    declared order
//! 5. **Post-tick** -- deliver buffered events, bump the tick counter,
//!    recompute the state hash

use crate::command_queue::{Command, CommandQueue};
use crate::event::{Event, EventBus};
use crate::fixed::{Fixed64, Ticks, whole_units};
use crate::graph::{FlowGraph, GraphError};
use crate::id::{LinkId, NodeId, ResourceTypeId, SourceId};
use crate::link::{TransferDirection, resolve_signals};
use crate::node::{Node, NodeState, Signal};
use crate::query::{LinkSnapshot, NetworkSnapshot, NodeSnapshot, SourceSnapshot};
use crate::registry::Registry;
use crate::sim::{SimState, StateHash};
use crate::source::{ResourceTemplate, Source};
use slotmap::{Key, SlotMap};

// ---------------------------------------------------------------------------
// Engine
// ---------------------------------------------------------------------------

/// The core simulation engine.
#[derive(Debug)]
pub struct Engine {
    /// The flow graph (nodes and links).
    pub graph: FlowGraph,

    /// Immutable resource-type registry.
    registry: Registry,

    /// Sources by id, plus their insertion order (the distribution order).
    sources: SlotMap<SourceId, Source>,
    source_order: Vec<SourceId>,

    /// Queued driver edits, applied during pre-tick.
    commands: CommandQueue,

    /// Typed event bus for simulation events.
    pub event_bus: EventBus,

    /// Simulation bookkeeping (tick counter).
    pub sim_state: SimState,

    /// The most recently computed state hash.
    last_state_hash: u64,
}

impl Engine {
    /// Create a new engine over a frozen registry.
    pub fn new(registry: Registry) -> Self {
        Self {
            graph: FlowGraph::new(),
            registry,
            sources: SlotMap::with_key(),
            source_order: Vec::new(),
            commands: CommandQueue::new(),
            event_bus: EventBus::new(),
            sim_state: SimState::new(),
            last_state_hash: 0,
        }
    }

    /// Like [`new`](Self::new), but the command queue retains up to
    /// `max_history` executed `(tick, command)` pairs.
    pub fn with_command_history(registry: Registry, max_history: usize) -> Self {
        let mut engine = Self::new(registry);
        engine.commands = CommandQueue::with_max_history(max_history);
        engine
    }

    pub fn registry(&self) -> &Registry {
        &self.registry
    }

    /// Current tick counter (number of completed steps).
    pub fn tick(&self) -> Ticks {
        self.sim_state.tick
    }

    /// The state hash computed at the end of the most recent step.
    pub fn state_hash(&self) -> u64 {
        self.last_state_hash
    }

    // -----------------------------------------------------------------------
    // Setup: graph construction
    // -----------------------------------------------------------------------

    /// Add a node. Names are unique within an engine.
    pub fn add_node(&mut self, name: &str, usage_rate: Fixed64) -> Result<NodeId, GraphError> {
        self.graph.add_node(name, usage_rate)
    }

    /// Add a link between two existing nodes with the default
    /// minimum-gradient threshold.
    pub fn add_link(
        &mut self,
        first: NodeId,
        second: NodeId,
        effectiveness: Fixed64,
    ) -> Result<LinkId, GraphError> {
        self.graph.add_link(first, second, effectiveness)
    }

    /// Add a link with an explicit minimum-gradient threshold.
    pub fn add_link_with_tolerance(
        &mut self,
        first: NodeId,
        second: NodeId,
        effectiveness: Fixed64,
        min_gradient: Fixed64,
    ) -> Result<LinkId, GraphError> {
        self.graph
            .add_link_with_tolerance(first, second, effectiveness, min_gradient)
    }

    /// Add a source. Names are unique among live sources.
    pub fn add_source(&mut self, name: &str) -> Result<SourceId, GraphError> {
        if self.find_source(name).is_some() {
            return Err(GraphError::DuplicateSourceName(name.to_string()));
        }
        let id = self.sources.insert(Source::new(name.to_string()));
        self.source_order.push(id);
        self.event_bus.emit(Event::SourceAdded {
            source: id,
            tick: self.sim_state.tick,
        });
        Ok(id)
    }

    /// Remove a source. Returns whether a source was removed.
    pub fn remove_source(&mut self, id: SourceId) -> bool {
        if self.sources.remove(id).is_none() {
            return false;
        }
        self.source_order.retain(|&s| s != id);
        self.event_bus.emit(Event::SourceRemoved {
            source: id,
            tick: self.sim_state.tick,
        });
        true
    }

    // -----------------------------------------------------------------------
    // Setup / runtime: source and node mutators
    //
    // These are silent and best-effort: a missing target makes the edit a
    // no-op (returns false). The command queue routes through them.
    // -----------------------------------------------------------------------

    /// Add a receiving node to a source. Returns whether the edit applied.
    pub fn add_receiver(&mut self, source: SourceId, node: NodeId) -> bool {
        if !self.graph.nodes.contains_key(node) {
            return false;
        }
        match self.sources.get_mut(source) {
            Some(s) => {
                s.add_receiver(node);
                true
            }
            None => false,
        }
    }

    /// Remove a receiving node from a source.
    pub fn remove_receiver(&mut self, source: SourceId, node: NodeId) -> bool {
        match self.sources.get_mut(source) {
            Some(s) => {
                s.remove_receiver(node);
                true
            }
            None => false,
        }
    }

    /// Append a distribution entry to a source.
    pub fn add_distribution(
        &mut self,
        source: SourceId,
        template: ResourceTemplate,
        amount: Fixed64,
    ) -> bool {
        match self.sources.get_mut(source) {
            Some(s) => {
                s.add_distribution(template, amount);
                true
            }
            None => false,
        }
    }

    /// Remove the first value-equal distribution entry from a source.
    pub fn remove_distribution(&mut self, source: SourceId, template: &ResourceTemplate) -> bool {
        match self.sources.get_mut(source) {
            Some(s) => {
                s.remove_distribution(template);
                true
            }
            None => false,
        }
    }

    /// Set a node's external signal. The signal persists until explicitly
    /// reset; links act on it every tick without clearing it.
    pub fn set_signal(&mut self, node: NodeId, signal: Signal) -> bool {
        match self.graph.nodes.get_mut(node) {
            Some(n) => {
                n.set_signal(signal);
                self.event_bus.emit(Event::SignalSet {
                    node,
                    signal,
                    tick: self.sim_state.tick,
                });
                true
            }
            None => false,
        }
    }

    /// Set a node's behavioral state directly.
    pub fn set_state(&mut self, node: NodeId, state: NodeState) -> bool {
        if !self.graph.nodes.contains_key(node) {
            return false;
        }
        self.force_state(node, state);
        true
    }

    // -----------------------------------------------------------------------
    // Commands
    // -----------------------------------------------------------------------

    /// Queue a command for execution at the start of the next step.
    pub fn submit(&mut self, command: Command) {
        self.commands.submit(command);
    }

    /// Queue several commands at once, preserving order.
    pub fn submit_batch(&mut self, commands: impl IntoIterator<Item = Command>) {
        self.commands.submit_batch(commands);
    }

    /// Executed command history (empty unless constructed with
    /// [`with_command_history`](Self::with_command_history)).
    pub fn command_history(&self) -> &[(Ticks, Command)] {
        self.commands.history()
    }

    fn apply_command(&mut self, command: Command) {
        match command {
            Command::AddSource { name } => {
                // Silent skip on duplicate names.
                let _ = self.add_source(&name);
            }
            Command::RemoveSource { name } => {
                if let Some(id) = self.find_source(&name) {
                    self.remove_source(id);
                }
            }
            Command::AddReceiver { source, node } => {
                if let Some(id) = self.find_source(&source) {
                    self.add_receiver(id, node);
                }
            }
            Command::RemoveReceiver { source, node } => {
                if let Some(id) = self.find_source(&source) {
                    self.remove_receiver(id, node);
                }
            }
            Command::AddDistribution {
                source,
                template,
                amount,
            } => {
                if let Some(id) = self.find_source(&source) {
                    self.add_distribution(id, template, amount);
                }
            }
            Command::RemoveDistribution { source, template } => {
                if let Some(id) = self.find_source(&source) {
                    self.remove_distribution(id, &template);
                }
            }
            Command::SetSignal { node, signal } => {
                self.set_signal(node, signal);
            }
            Command::SetState { node, state } => {
                self.set_state(node, state);
            }
        }
    }

    // -----------------------------------------------------------------------
    // Stepping
    // -----------------------------------------------------------------------

    /// Run a single simulation step through the five-phase pipeline.
    pub fn step(&mut self) {
        self.phase_pre_tick();
        self.phase_distribute();
        self.phase_consume();
        self.phase_transfer();
        self.phase_post_tick();
    }

    /// Run `ticks` simulation steps.
    pub fn run(&mut self, ticks: Ticks) {
        for _ in 0..ticks {
            self.step();
        }
    }

    // -----------------------------------------------------------------------
    // Phase 1: Pre-tick -- command application
    // -----------------------------------------------------------------------

    fn phase_pre_tick(&mut self) {
        let commands = self.commands.drain(self.sim_state.tick);
        for command in commands {
            self.apply_command(command);
        }
    }

    // -----------------------------------------------------------------------
    // Phase 2: Distribute
    // -----------------------------------------------------------------------

    fn phase_distribute(&mut self) {
        let tick = self.sim_state.tick;
        for i in 0..self.source_order.len() {
            let source_id = self.source_order[i];
            let Some(source) = self.sources.get(source_id) else {
                continue;
            };
            for &node_id in source.receivers() {
                let Some(node) = self.graph.nodes.get_mut(node_id) else {
                    continue;
                };
                for entry in source.distribution() {
                    let quantity = whole_units(entry.amount);
                    for _ in 0..quantity {
                        node.receive(entry.template.instantiate());
                    }
                    if quantity > 0 {
                        self.event_bus.emit(Event::ResourceInjected {
                            source: source_id,
                            node: node_id,
                            resource_type: entry.template.resource_type,
                            quantity,
                            tick,
                        });
                    }
                }
            }
        }
    }

    // -----------------------------------------------------------------------
    // Phase 3: Consume
    // -----------------------------------------------------------------------

    #[cfg(not(feature = "parallel"))]
    fn phase_consume(&mut self) {
        let tick = self.sim_state.tick;
        for i in 0..self.graph.node_order.len() {
            let node_id = self.graph.node_order[i];
            let Some(node) = self.graph.nodes.get_mut(node_id) else {
                continue;
            };
            for drained in node.consume() {
                self.event_bus.emit(Event::ResourceConsumed {
                    node: node_id,
                    resource_type: drained.resource_type,
                    quantity: drained.quantity,
                    value: drained.value,
                    tick,
                });
            }
        }
    }

    /// Parallel consume: each node's consumption touches only that node, so
    /// the phase fans out across nodes. Events are still emitted in node
    /// insertion order to keep the event stream deterministic. Transfer is
    /// never parallelized -- link order is a real tie-break.
    #[cfg(feature = "parallel")]
    fn phase_consume(&mut self) {
        use rayon::prelude::*;

        let tick = self.sim_state.tick;
        let results: Vec<(NodeId, Vec<crate::node::DrainedPool>)> = self
            .graph
            .nodes
            .iter_mut()
            .collect::<Vec<_>>()
            .into_par_iter()
            .map(|(id, node)| (id, node.consume()))
            .collect();

        let mut by_node: slotmap::SecondaryMap<NodeId, Vec<crate::node::DrainedPool>> =
            slotmap::SecondaryMap::new();
        for (id, drained) in results {
            by_node.insert(id, drained);
        }
        for &node_id in &self.graph.node_order {
            let Some(drains) = by_node.remove(node_id) else {
                continue;
            };
            for drained in drains {
                self.event_bus.emit(Event::ResourceConsumed {
                    node: node_id,
                    resource_type: drained.resource_type,
                    quantity: drained.quantity,
                    value: drained.value,
                    tick,
                });
            }
        }
    }

    // -----------------------------------------------------------------------
    // Phase 4: Transfer
    // -----------------------------------------------------------------------

    fn phase_transfer(&mut self) {
        for i in 0..self.graph.link_order.len() {
            let link_id = self.graph.link_order[i];
            self.transfer_link(link_id);
        }
    }

    fn transfer_link(&mut self, link_id: LinkId) {
        let tick = self.sim_state.tick;
        let Some(link) = self.graph.links.get(link_id) else {
            return;
        };
        let (first, second) = (link.first(), link.second());
        let min_gradient = link.min_gradient();

        // 1. Signal handling. Signals are read once, before gradients, and
        //    are not cleared by acting on them.
        let signals = match (self.graph.nodes.get(first), self.graph.nodes.get(second)) {
            (Some(f), Some(s)) => (f.signal(), s.signal()),
            _ => return,
        };
        if let Some((first_state, second_state)) = resolve_signals(signals.0, signals.1) {
            self.force_state(first, first_state);
            self.force_state(second, second_state);
        }

        // 2. Gradient computation over the union of held types.
        let gradients: Vec<(ResourceTypeId, Fixed64)> = {
            let Some(link) = self.graph.links.get_mut(link_id) else {
                return;
            };
            let (Some(first_node), Some(second_node)) =
                (self.graph.nodes.get(first), self.graph.nodes.get(second))
            else {
                return;
            };
            link.compute_gradients(first_node, second_node);
            link.gradients().collect()
        };

        // 3. Unit movement, oldest units first, mass-conserving.
        for (resource_type, gradient) in gradients {
            let magnitude = gradient.abs();
            if magnitude < min_gradient {
                continue;
            }
            let quantity = whole_units(magnitude);
            if quantity == 0 {
                continue;
            }
            let direction = if gradient > Fixed64::ZERO {
                TransferDirection::FirstToSecond
            } else {
                TransferDirection::SecondToFirst
            };
            let (from, to) = match direction {
                TransferDirection::FirstToSecond => (first, second),
                TransferDirection::SecondToFirst => (second, first),
            };
            let Some([from_node, to_node]) = self.graph.nodes.get_disjoint_mut([from, to]) else {
                continue;
            };
            let moved = from_node.withdraw(resource_type, quantity);
            if moved.is_empty() {
                continue;
            }
            let moved_quantity = moved.len() as u64;
            let moved_value: Fixed64 = moved.iter().map(|u| u.value).sum();
            for unit in moved {
                to_node.receive(unit);
            }
            if let Some(link) = self.graph.links.get_mut(link_id) {
                link.record_transfer(direction, moved_value);
            }
            self.event_bus.emit(Event::ResourceTransferred {
                link: link_id,
                resource_type,
                quantity: moved_quantity,
                value: moved_value,
                direction,
                tick,
            });
        }
    }

    /// Set a node's state, emitting an event only on an actual change.
    fn force_state(&mut self, node_id: NodeId, state: NodeState) {
        let Some(node) = self.graph.nodes.get_mut(node_id) else {
            return;
        };
        let previous = node.state();
        if previous == state {
            return;
        }
        node.set_state(state);
        self.event_bus.emit(Event::NodeStateChanged {
            node: node_id,
            previous,
            current: state,
            tick: self.sim_state.tick,
        });
    }

    // -----------------------------------------------------------------------
    // Phase 5: Post-tick -- event delivery and bookkeeping
    // -----------------------------------------------------------------------

    fn phase_post_tick(&mut self) {
        self.event_bus.deliver();
        self.sim_state.tick += 1;
        self.last_state_hash = self.compute_state_hash();
    }

    /// Compute a deterministic hash of the current simulation state.
    ///
    /// Walks every collection in its stored order, so two engines built by
    /// the same construction and command sequence hash identically.
    fn compute_state_hash(&self) -> u64 {
        let mut hasher = StateHash::new();
        hasher.write_u64(self.sim_state.tick);

        for (_, node) in self.graph.nodes() {
            hasher.write_str(node.name());
            hasher.write_fixed64(node.usage_rate());
            hasher.write_fixed64(node.effectiveness());
            hasher.write_u32(node.state() as u32);
            hasher.write_u32(node.signal() as u32);
            for (resource_type, pool) in node.pools() {
                hasher.write_u32(resource_type.0);
                hasher.write_u64(pool.len() as u64);
                hasher.write_fixed64(pool.total_value());
            }
        }

        for (_, link) in self.graph.links() {
            hasher.write_fixed64(link.effectiveness());
            hasher.write_fixed64(link.cumulative_transfer());
            for (resource_type, gradient) in link.gradients() {
                hasher.write_u32(resource_type.0);
                hasher.write_fixed64(gradient);
            }
        }

        for &source_id in &self.source_order {
            let Some(source) = self.sources.get(source_id) else {
                continue;
            };
            hasher.write_str(source.name());
            for &receiver in source.receivers() {
                hasher.write_u64(receiver.data().as_ffi());
            }
            for entry in source.distribution() {
                hasher.write_u32(entry.template.resource_type.0);
                hasher.write_fixed64(entry.template.value);
                hasher.write_fixed64(entry.amount);
            }
        }

        hasher.finish()
    }

    // -----------------------------------------------------------------------
    // Query API (read-only)
    // -----------------------------------------------------------------------

    /// Look up a node by name. Absent names yield `None`.
    pub fn find_node(&self, name: &str) -> Option<NodeId> {
        self.graph.find_node(name)
    }

    /// Look up a source by name. Absent names yield `None`.
    pub fn find_source(&self, name: &str) -> Option<SourceId> {
        self.source_order
            .iter()
            .copied()
            .find(|&id| self.sources[id].name() == name)
    }

    pub fn node(&self, id: NodeId) -> Option<&Node> {
        self.graph.node(id)
    }

    pub fn source(&self, id: SourceId) -> Option<&Source> {
        self.sources.get(id)
    }

    /// Source ids in insertion order (the distribution order).
    pub fn source_ids(&self) -> &[SourceId] {
        &self.source_order
    }

    /// Units of one type currently held by a node (0 if the node is
    /// unknown).
    pub fn resource_count(&self, node: NodeId, resource_type: ResourceTypeId) -> usize {
        self.graph
            .node(node)
            .map_or(0, |n| n.resource_count(resource_type))
    }

    /// A link's most recent gradient for one type.
    pub fn link_gradient(&self, link: LinkId, resource_type: ResourceTypeId) -> Option<Fixed64> {
        self.graph.link(link).and_then(|l| l.gradient(resource_type))
    }

    /// A link's lifetime net directional transfer value.
    pub fn cumulative_transfer(&self, link: LinkId) -> Option<Fixed64> {
        self.graph.link(link).map(|l| l.cumulative_transfer())
    }

    /// Owned snapshot of one node.
    pub fn node_snapshot(&self, id: NodeId) -> Option<NodeSnapshot> {
        let node = self.graph.node(id)?;
        Some(NodeSnapshot {
            id,
            name: node.name().to_string(),
            state: node.state(),
            signal: node.signal(),
            effectiveness: node.effectiveness(),
            pool_counts: node.pools().map(|(t, p)| (t, p.len())).collect(),
            links: self.graph.node_links(id).to_vec(),
        })
    }

    /// Owned snapshot of one link.
    pub fn link_snapshot(&self, id: LinkId) -> Option<LinkSnapshot> {
        let link = self.graph.link(id)?;
        Some(LinkSnapshot {
            id,
            first: link.first(),
            second: link.second(),
            effectiveness: link.effectiveness(),
            min_gradient: link.min_gradient(),
            gradients: link.gradients().collect(),
            cumulative_transfer: link.cumulative_transfer(),
        })
    }

    /// Owned snapshot of one source.
    pub fn source_snapshot(&self, id: SourceId) -> Option<SourceSnapshot> {
        let source = self.sources.get(id)?;
        Some(SourceSnapshot {
            id,
            name: source.name().to_string(),
            receivers: source.receivers().to_vec(),
            distribution: source.distribution().to_vec(),
        })
    }

    /// Owned snapshot of the whole network, in stored order.
    pub fn snapshot(&self) -> NetworkSnapshot {
        NetworkSnapshot {
            tick: self.sim_state.tick,
            nodes: self
                .graph
                .node_ids()
                .iter()
                .filter_map(|&id| self.node_snapshot(id))
                .collect(),
            links: self
                .graph
                .link_ids()
                .iter()
                .filter_map(|&id| self.link_snapshot(id))
                .collect(),
            sources: self
                .source_order
                .iter()
                .filter_map(|&id| self.source_snapshot(id))
                .collect(),
        }
    }
}

// ===========================================================================
// Tests
// ===========================================================================
