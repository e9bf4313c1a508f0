//! Flow statistics for the fluxnet engine.
//!
//! Tracks per-node injection/consumption and per-link transfer throughput
//! over configurable rolling windows. Listens to core events
//! (`ResourceInjected`, `ResourceConsumed`, `ResourceTransferred`) and
//! aggregates them into rolling per-tick rates using [`Fixed64`] arithmetic.
//! A pure observer: it reads the event stream and never touches the engine.
//!
//! # Usage
//!
//! ```ignore
//! let mut stats = FlowStats::new(StatsConfig::default());
//! engine.step();
//! for event in engine.event_bus.recent() {
//!     stats.record(event);
//! }
//! stats.end_tick();
//! let rate = stats.consumption_rate(node, cpu);
//! ```

use std::collections::HashMap;

use fluxnet_core::event::Event;
use fluxnet_core::fixed::Fixed64;
use fluxnet_core::id::{LinkId, NodeId, ResourceTypeId};

// ---------------------------------------------------------------------------
// Configuration
// ---------------------------------------------------------------------------

/// Configuration for the statistics module.
#[derive(Debug, Clone)]
pub struct StatsConfig {
    /// Window size in ticks for rolling averages.
    pub window_size: usize,
    /// Maximum number of historical rate snapshots to retain per metric.
    pub history_capacity: usize,
}

impl Default for StatsConfig {
    fn default() -> Self {
        Self {
            window_size: 60,
            history_capacity: 256,
        }
    }
}

// ---------------------------------------------------------------------------
// RingBuffer -- historical rate snapshots
// ---------------------------------------------------------------------------

/// A fixed-capacity ring buffer storing [`Fixed64`] values for trend
/// analysis. When full, the oldest entry is overwritten. Iterates
/// oldest-to-newest.
#[derive(Debug, Clone)]
pub struct RingBuffer {
    data: Vec<Fixed64>,
    head: usize,
    len: usize,
}

impl RingBuffer {
    /// Create a new ring buffer with the given capacity.
    ///
    /// # Panics
    ///
    /// Panics if `capacity` is zero.
    pub fn new(capacity: usize) -> Self {
        assert!(capacity > 0, "RingBuffer capacity must be > 0");
        Self {
            data: vec![Fixed64::ZERO; capacity],
            head: 0,
            len: 0,
        }
    }

    /// Push a value, overwriting the oldest entry if at capacity.
    pub fn push(&mut self, value: Fixed64) {
        self.data[self.head] = value;
        self.head = (self.head + 1) % self.capacity();
        if self.len < self.capacity() {
            self.len += 1;
        }
    }

    pub fn len(&self) -> usize {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    pub fn capacity(&self) -> usize {
        self.data.len()
    }

    /// Get the most recently pushed value, if any.
    pub fn latest(&self) -> Option<Fixed64> {
        if self.len == 0 {
            return None;
        }
        let idx = if self.head == 0 {
            self.capacity() - 1
        } else {
            self.head - 1
        };
        Some(self.data[idx])
    }

    /// Collect all stored values into a Vec (oldest to newest).
    pub fn to_vec(&self) -> Vec<Fixed64> {
        let start = if self.len < self.capacity() {
            0
        } else {
            self.head
        };
        (0..self.len)
            .map(|i| self.data[(start + i) % self.capacity()])
            .collect()
    }
}

// ---------------------------------------------------------------------------
// Rolling window counter
// ---------------------------------------------------------------------------

/// A rolling window counter tracking a quantity over the most recent N ticks.
///
/// # Tick lifecycle
///
/// 1. Call [`add`](Self::add) zero or more times during the tick.
/// 2. Call [`commit`](Self::commit) exactly once at end-of-tick to write the
///    current tick into the ring and prepare for the next.
///
/// [`rate`](Self::rate) and [`total`](Self::total) include committed ticks
/// plus the in-progress tick, so queries are accurate at any point.
#[derive(Debug, Clone)]
struct RollingWindow {
    tick_counts: Vec<u64>,
    write_pos: usize,
    committed_total: u64,
    current: u64,
    window_size: usize,
    committed_count: usize,
}

impl RollingWindow {
    fn new(window_size: usize) -> Self {
        assert!(window_size > 0, "RollingWindow size must be > 0");
        Self {
            tick_counts: vec![0; window_size],
            write_pos: 0,
            committed_total: 0,
            current: 0,
            window_size,
            committed_count: 0,
        }
    }

    fn add(&mut self, count: u64) {
        self.current += count;
    }

    fn commit(&mut self) {
        if self.committed_count == self.window_size {
            self.committed_total -= self.tick_counts[self.write_pos];
        }
        self.tick_counts[self.write_pos] = self.current;
        self.committed_total += self.current;
        self.current = 0;
        self.write_pos = (self.write_pos + 1) % self.window_size;
        if self.committed_count < self.window_size {
            self.committed_count += 1;
        }
    }

    fn total(&self) -> u64 {
        self.committed_total + self.current
    }

    /// Rolling average as units per tick.
    fn rate(&self) -> Fixed64 {
        let effective_count = if self.current > 0 {
            self.committed_count + 1
        } else {
            self.committed_count
        };
        if effective_count == 0 {
            return Fixed64::ZERO;
        }
        let total = self.committed_total + self.current;
        Fixed64::from_num(total) / Fixed64::from_num(effective_count as u64)
    }
}

// ---------------------------------------------------------------------------
// Per-node statistics
// ---------------------------------------------------------------------------

/// Per-node flow statistics keyed by resource type.
#[derive(Debug, Clone)]
struct NodeFlow {
    injection: HashMap<ResourceTypeId, RollingWindow>,
    consumption: HashMap<ResourceTypeId, RollingWindow>,
    consumption_history: HashMap<ResourceTypeId, RingBuffer>,
    window_size: usize,
    history_capacity: usize,
}

impl NodeFlow {
    fn new(window_size: usize, history_capacity: usize) -> Self {
        Self {
            injection: HashMap::new(),
            consumption: HashMap::new(),
            consumption_history: HashMap::new(),
            window_size,
            history_capacity,
        }
    }

    fn record_injected(&mut self, resource_type: ResourceTypeId, quantity: u64) {
        let window = self
            .injection
            .entry(resource_type)
            .or_insert_with(|| RollingWindow::new(self.window_size));
        window.add(quantity);
    }

    fn record_consumed(&mut self, resource_type: ResourceTypeId, quantity: u64) {
        let window = self
            .consumption
            .entry(resource_type)
            .or_insert_with(|| RollingWindow::new(self.window_size));
        window.add(quantity);
    }

    fn end_tick(&mut self) {
        // Snapshot current consumption rates into history.
        let types: Vec<ResourceTypeId> = self.consumption.keys().copied().collect();
        for resource_type in types {
            let rate = self.consumption[&resource_type].rate();
            let cap = self.history_capacity;
            self.consumption_history
                .entry(resource_type)
                .or_insert_with(|| RingBuffer::new(cap))
                .push(rate);
        }
        for window in self.injection.values_mut() {
            window.commit();
        }
        for window in self.consumption.values_mut() {
            window.commit();
        }
    }
}

// ---------------------------------------------------------------------------
// Per-link statistics
// ---------------------------------------------------------------------------

/// Per-link transfer statistics keyed by resource type.
#[derive(Debug, Clone)]
struct LinkFlow {
    transfers: HashMap<ResourceTypeId, RollingWindow>,
    window_size: usize,
}

impl LinkFlow {
    fn new(window_size: usize) -> Self {
        Self {
            transfers: HashMap::new(),
            window_size,
        }
    }

    fn record_transfer(&mut self, resource_type: ResourceTypeId, quantity: u64) {
        let window = self
            .transfers
            .entry(resource_type)
            .or_insert_with(|| RollingWindow::new(self.window_size));
        window.add(quantity);
    }

    fn end_tick(&mut self) {
        for window in self.transfers.values_mut() {
            window.commit();
        }
    }
}

// ---------------------------------------------------------------------------
// FlowStats
// ---------------------------------------------------------------------------

/// Aggregated flow statistics fed by core events.
#[derive(Debug, Clone)]
pub struct FlowStats {
    config: StatsConfig,
    nodes: HashMap<NodeId, NodeFlow>,
    links: HashMap<LinkId, LinkFlow>,
    ticks_observed: u64,
}

impl FlowStats {
    pub fn new(config: StatsConfig) -> Self {
        Self {
            config,
            nodes: HashMap::new(),
            links: HashMap::new(),
            ticks_observed: 0,
        }
    }

    /// Feed one core event. Unrelated event kinds are ignored.
    pub fn record(&mut self, event: &Event) {
        match event {
            Event::ResourceInjected {
                node,
                resource_type,
                quantity,
                ..
            } => {
                self.node_flow(*node).record_injected(*resource_type, *quantity);
            }
            Event::ResourceConsumed {
                node,
                resource_type,
                quantity,
                ..
            } => {
                self.node_flow(*node).record_consumed(*resource_type, *quantity);
            }
            Event::ResourceTransferred {
                link,
                resource_type,
                quantity,
                ..
            } => {
                self.link_flow(*link).record_transfer(*resource_type, *quantity);
            }
            _ => {}
        }
    }

    /// Advance all windows at end-of-tick.
    pub fn end_tick(&mut self) {
        for flow in self.nodes.values_mut() {
            flow.end_tick();
        }
        for flow in self.links.values_mut() {
            flow.end_tick();
        }
        self.ticks_observed += 1;
    }

    /// Number of completed ticks observed.
    pub fn ticks_observed(&self) -> u64 {
        self.ticks_observed
    }

    /// Rolling injection rate (units/tick) for one node and type.
    pub fn injection_rate(&self, node: NodeId, resource_type: ResourceTypeId) -> Fixed64 {
        self.nodes
            .get(&node)
            .and_then(|f| f.injection.get(&resource_type))
            .map_or(Fixed64::ZERO, RollingWindow::rate)
    }

    /// Rolling consumption rate (units/tick) for one node and type.
    pub fn consumption_rate(&self, node: NodeId, resource_type: ResourceTypeId) -> Fixed64 {
        self.nodes
            .get(&node)
            .and_then(|f| f.consumption.get(&resource_type))
            .map_or(Fixed64::ZERO, RollingWindow::rate)
    }

    /// Total units consumed by a node within the current window.
    pub fn consumption_total(&self, node: NodeId, resource_type: ResourceTypeId) -> u64 {
        self.nodes
            .get(&node)
            .and_then(|f| f.consumption.get(&resource_type))
            .map_or(0, RollingWindow::total)
    }

    /// Rolling transfer rate (units/tick, direction-agnostic) for one link
    /// and type.
    pub fn transfer_rate(&self, link: LinkId, resource_type: ResourceTypeId) -> Fixed64 {
        self.links
            .get(&link)
            .and_then(|f| f.transfers.get(&resource_type))
            .map_or(Fixed64::ZERO, RollingWindow::rate)
    }

    /// Historical consumption-rate snapshots for one node and type, oldest
    /// first.
    pub fn consumption_history(
        &self,
        node: NodeId,
        resource_type: ResourceTypeId,
    ) -> Vec<Fixed64> {
        self.nodes
            .get(&node)
            .and_then(|f| f.consumption_history.get(&resource_type))
            .map_or_else(Vec::new, RingBuffer::to_vec)
    }

    fn node_flow(&mut self, node: NodeId) -> &mut NodeFlow {
        self.nodes
            .entry(node)
            .or_insert_with(|| NodeFlow::new(self.config.window_size, self.config.history_capacity))
    }

    fn link_flow(&mut self, link: LinkId) -> &mut LinkFlow {
        self.links
            .entry(link)
            .or_insert_with(|| LinkFlow::new(self.config.window_size))
    }
}

// ===========================================================================
// Tests
// ===========================================================================
