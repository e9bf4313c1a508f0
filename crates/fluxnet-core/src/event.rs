//! Typed simulation events with buffered delivery.
//!
//! Events are emitted during the distribute, consume, and transfer phases
//! and delivered in batch during post-tick. Consumers are passive: they
//! observe, they never mutate the engine. Pull-style consumers read
//! [`EventBus::recent`] after a step; push-style consumers register a
//! listener with [`EventBus::subscribe`].
//!
//! # Suppression
//!
//! Event kinds can be suppressed via [`EventBus::suppress`], which prevents
//! any recording for that kind. Suppressed events have zero cost.

use crate::fixed::{Fixed64, Ticks};
use crate::id::{LinkId, NodeId, ResourceTypeId, SourceId};
use crate::link::TransferDirection;
use crate::node::{NodeState, Signal};

// ---------------------------------------------------------------------------
// Event types
// ---------------------------------------------------------------------------

/// A simulation event. All events carry the tick at which they occurred.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Event {
    // -- Distribution --
    ResourceInjected {
        source: SourceId,
        node: NodeId,
        resource_type: ResourceTypeId,
        quantity: u64,
        tick: Ticks,
    },

    // -- Consumption --
    ResourceConsumed {
        node: NodeId,
        resource_type: ResourceTypeId,
        quantity: u64,
        value: Fixed64,
        tick: Ticks,
    },

    // -- Transfer --
    ResourceTransferred {
        link: LinkId,
        resource_type: ResourceTypeId,
        quantity: u64,
        value: Fixed64,
        direction: TransferDirection,
        tick: Ticks,
    },

    // -- Node state --
    NodeStateChanged {
        node: NodeId,
        previous: NodeState,
        current: NodeState,
        tick: Ticks,
    },
    SignalSet {
        node: NodeId,
        signal: Signal,
        tick: Ticks,
    },

    // -- Sources --
    SourceAdded {
        source: SourceId,
        tick: Ticks,
    },
    SourceRemoved {
        source: SourceId,
        tick: Ticks,
    },
}

/// Discriminant tag for event types, used for suppression and filtering.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EventKind {
    ResourceInjected,
    ResourceConsumed,
    ResourceTransferred,
    NodeStateChanged,
    SignalSet,
    SourceAdded,
    SourceRemoved,
}

/// Total number of event kinds.
const EVENT_KIND_COUNT: usize = 7;

impl Event {
    /// Get the discriminant kind for this event.
    pub fn kind(&self) -> EventKind {
        match self {
            Event::ResourceInjected { .. } => EventKind::ResourceInjected,
            Event::ResourceConsumed { .. } => EventKind::ResourceConsumed,
            Event::ResourceTransferred { .. } => EventKind::ResourceTransferred,
            Event::NodeStateChanged { .. } => EventKind::NodeStateChanged,
            Event::SignalSet { .. } => EventKind::SignalSet,
            Event::SourceAdded { .. } => EventKind::SourceAdded,
            Event::SourceRemoved { .. } => EventKind::SourceRemoved,
        }
    }
}

impl EventKind {
    fn index(self) -> usize {
        self as usize
    }
}

// ---------------------------------------------------------------------------
// Listeners
// ---------------------------------------------------------------------------

/// A passive listener receives each delivered event read-only.
pub type PassiveListener = Box<dyn FnMut(&Event)>;

/// Handle for unsubscribing a listener.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ListenerId(usize);

// ---------------------------------------------------------------------------
// EventBus
// ---------------------------------------------------------------------------

/// The event bus: a per-tick buffer, delivered in batch at post-tick.
///
/// After delivery the events of the completed tick remain readable via
/// [`recent`](Self::recent) until the next delivery replaces them, so
/// pull-style consumers stay bounded without draining.
#[derive(Default)]
pub struct EventBus {
    /// Events emitted during the current tick, not yet delivered.
    buffer: Vec<Event>,
    /// Events delivered at the most recent post-tick.
    recent: Vec<Event>,
    /// Suppressed event kinds. Suppressed events are never buffered.
    suppressed: [bool; EVENT_KIND_COUNT],
    /// Registered passive listeners. `None` marks unsubscribed slots.
    listeners: Vec<Option<PassiveListener>>,
}

impl std::fmt::Debug for EventBus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EventBus")
            .field("buffer", &self.buffer)
            .field("recent", &self.recent)
            .field("suppressed", &self.suppressed)
            .field("listeners", &self.listeners.len())
            .finish()
    }
}

impl EventBus {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record an event for delivery at the next post-tick. Suppressed kinds
    /// are dropped without buffering.
    pub fn emit(&mut self, event: Event) {
        if self.suppressed[event.kind().index()] {
            return;
        }
        self.buffer.push(event);
    }

    /// Deliver all buffered events to listeners and make them the `recent`
    /// set. Called by the engine during post-tick.
    pub fn deliver(&mut self) {
        self.recent = std::mem::take(&mut self.buffer);
        for listener in self.listeners.iter_mut().flatten() {
            for event in &self.recent {
                listener(event);
            }
        }
    }

    /// Events delivered at the most recent post-tick, in emission order.
    pub fn recent(&self) -> &[Event] {
        &self.recent
    }

    /// Take ownership of the most recent tick's events.
    pub fn take_recent(&mut self) -> Vec<Event> {
        std::mem::take(&mut self.recent)
    }

    /// Number of events buffered for the in-progress tick.
    pub fn buffered_len(&self) -> usize {
        self.buffer.len()
    }

    /// Suppress an event kind. Suppressed events are never buffered.
    pub fn suppress(&mut self, kind: EventKind) {
        self.suppressed[kind.index()] = true;
    }

    /// Re-enable a previously suppressed event kind.
    pub fn unsuppress(&mut self, kind: EventKind) {
        self.suppressed[kind.index()] = false;
    }

    /// Check if an event kind is suppressed.
    pub fn is_suppressed(&self, kind: EventKind) -> bool {
        self.suppressed[kind.index()]
    }

    /// Register a passive listener invoked for every delivered event.
    pub fn subscribe(&mut self, listener: PassiveListener) -> ListenerId {
        let id = ListenerId(self.listeners.len());
        self.listeners.push(Some(listener));
        id
    }

    /// Remove a listener. Unsubscribing twice is a no-op.
    pub fn unsubscribe(&mut self, id: ListenerId) {
        if let Some(slot) = self.listeners.get_mut(id.0) {
            *slot = None;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::RefCell;
    use std::rc::Rc;

    fn injected(tick: Ticks) -> Event {
        let mut sources = slotmap::SlotMap::<SourceId, ()>::with_key();
        let mut nodes = slotmap::SlotMap::<NodeId, ()>::with_key();
        Event::ResourceInjected {
            source: sources.insert(()),
            node: nodes.insert(()),
            resource_type: ResourceTypeId(0),
            quantity: 1,
            tick,
        }
    }

    fn state_changed(tick: Ticks) -> Event {
        let mut nodes = slotmap::SlotMap::<NodeId, ()>::with_key();
        Event::NodeStateChanged {
            node: nodes.insert(()),
            previous: NodeState::Default,
            current: NodeState::Conserving,
            tick,
        }
    }

    #[test]
    fn emit_buffers_until_delivery() {
        let mut bus = EventBus::new();
        bus.emit(injected(0));
        assert_eq!(bus.buffered_len(), 1);
        assert!(bus.recent().is_empty());

        bus.deliver();
        assert_eq!(bus.buffered_len(), 0);
        assert_eq!(bus.recent().len(), 1);
    }

    #[test]
    fn delivery_replaces_recent() {
        let mut bus = EventBus::new();
        bus.emit(injected(0));
        bus.deliver();

        bus.emit(state_changed(1));
        bus.emit(state_changed(1));
        bus.deliver();
        assert_eq!(bus.recent().len(), 2);
    }

    #[test]
    fn suppressed_kinds_are_never_buffered() {
        let mut bus = EventBus::new();
        bus.suppress(EventKind::ResourceInjected);
        bus.emit(injected(0));
        bus.emit(state_changed(0));
        assert_eq!(bus.buffered_len(), 1);

        bus.unsuppress(EventKind::ResourceInjected);
        bus.emit(injected(0));
        assert_eq!(bus.buffered_len(), 2);
    }

    #[test]
    fn listeners_see_each_delivered_event() {
        let seen = Rc::new(RefCell::new(0usize));
        let seen_clone = Rc::clone(&seen);

        let mut bus = EventBus::new();
        bus.subscribe(Box::new(move |_| {
            *seen_clone.borrow_mut() += 1;
        }));

        bus.emit(injected(0));
        bus.emit(state_changed(0));
        bus.deliver();
        assert_eq!(*seen.borrow(), 2);
    }

    #[test]
    fn unsubscribed_listener_is_not_invoked() {
        let seen = Rc::new(RefCell::new(0usize));
        let seen_clone = Rc::clone(&seen);

        let mut bus = EventBus::new();
        let id = bus.subscribe(Box::new(move |_| {
            *seen_clone.borrow_mut() += 1;
        }));
        bus.unsubscribe(id);

        bus.emit(injected(0));
        bus.deliver();
        assert_eq!(*seen.borrow(), 0);
    }

    #[test]
    fn take_recent_leaves_bus_empty() {
        let mut bus = EventBus::new();
        bus.emit(injected(0));
        bus.deliver();

        let events = bus.take_recent();
        assert_eq!(events.len(), 1);
        assert!(bus.recent().is_empty());
    }
}
