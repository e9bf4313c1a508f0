//! Links: pressure-gradient transfer channels between node pairs.
//!
//! A link is an ordered pair of nodes plus a scalar effectiveness factor.
//! The order of `first`/`second` is significant: it fixes the sign
//! convention for gradients (positive means flow first→second) and for the
//! lifetime cumulative-transfer counter.
//!
//! The pure pieces of the per-tick transfer algorithm live here: signal
//! precedence resolution and gradient computation. The unit movement itself
//! is orchestrated by the engine, which can borrow both endpoint nodes
//! mutably at once.

use crate::fixed::Fixed64;
use crate::id::{NodeId, ResourceTypeId};
use crate::node::{Node, NodeState, Signal};
use std::collections::BTreeMap;

/// Default minimum-gradient threshold for new links.
///
/// Any magnitude below 1.0 already floors to zero whole units, so the
/// default gates nothing that could otherwise move.
pub fn default_min_gradient() -> Fixed64 {
    Fixed64::from_num(0.1)
}

// ---------------------------------------------------------------------------
// Direction
// ---------------------------------------------------------------------------

/// Direction of a completed transfer, relative to the link's endpoint order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
pub enum TransferDirection {
    FirstToSecond,
    SecondToFirst,
}

// ---------------------------------------------------------------------------
// Signal resolution
// ---------------------------------------------------------------------------

/// Resolve the states a link forces onto `(first, second)` given their
/// signals, or `None` when existing states persist.
///
/// Precedence:
/// 1. Either signal `Danger`: both nodes `Conserving`.
/// 2. Else `first` `Opportunity`: first `Expending`, second `Default`.
/// 3. Else `second` `Opportunity`: second `Expending`, first `Default`.
///
/// The asymmetry is deliberate: `first`'s Opportunity wins even when both
/// nodes signal it. Only `Danger` is symmetric.
pub fn resolve_signals(first: Signal, second: Signal) -> Option<(NodeState, NodeState)> {
    if first == Signal::Danger || second == Signal::Danger {
        Some((NodeState::Conserving, NodeState::Conserving))
    } else if first == Signal::Opportunity {
        Some((NodeState::Expending, NodeState::Default))
    } else if second == Signal::Opportunity {
        Some((NodeState::Default, NodeState::Expending))
    } else {
        None
    }
}

// ---------------------------------------------------------------------------
// Link
// ---------------------------------------------------------------------------

/// A directed pairwise transfer channel.
///
/// Created at setup; never changes which nodes it connects.
/// `cumulative_transfer` is a running net-directional total across all ticks
/// of the run -- a lifetime statistic, never reset per tick.
#[derive(Debug, Clone, serde::Serialize, serde::Deserialize)]
pub struct Link {
    first: NodeId,
    second: NodeId,
    effectiveness: Fixed64,
    min_gradient: Fixed64,
    gradients: BTreeMap<ResourceTypeId, Fixed64>,
    cumulative_transfer: Fixed64,
}

impl Link {
    pub(crate) fn new(
        first: NodeId,
        second: NodeId,
        effectiveness: Fixed64,
        min_gradient: Fixed64,
    ) -> Self {
        Self {
            first,
            second,
            effectiveness,
            min_gradient,
            gradients: BTreeMap::new(),
            cumulative_transfer: Fixed64::ZERO,
        }
    }

    pub fn first(&self) -> NodeId {
        self.first
    }

    pub fn second(&self) -> NodeId {
        self.second
    }

    pub fn effectiveness(&self) -> Fixed64 {
        self.effectiveness
    }

    pub fn min_gradient(&self) -> Fixed64 {
        self.min_gradient
    }

    pub fn cumulative_transfer(&self) -> Fixed64 {
        self.cumulative_transfer
    }

    /// The gradient computed for one type this tick (`None` before the first
    /// transfer pass or for types absent from both endpoints).
    pub fn gradient(&self, resource_type: ResourceTypeId) -> Option<Fixed64> {
        self.gradients.get(&resource_type).copied()
    }

    /// Iterate (type, gradient) pairs from the most recent transfer pass.
    pub fn gradients(&self) -> impl Iterator<Item = (ResourceTypeId, Fixed64)> + '_ {
        self.gradients.iter().map(|(&t, &g)| (t, g))
    }

    /// Rebuild the gradient table for the union of resource types present in
    /// either endpoint.
    ///
    /// Gradient = `effectiveness * (pressure(first) - pressure(second))`.
    /// Positive means net flow first→second, negative second→first.
    pub(crate) fn compute_gradients(&mut self, first: &Node, second: &Node) {
        let effectiveness = self.effectiveness;
        self.gradients.clear();
        for ty in first.resource_types().chain(second.resource_types()) {
            self.gradients
                .entry(ty)
                .or_insert_with(|| effectiveness * (first.pressure(ty) - second.pressure(ty)));
        }
    }

    pub(crate) fn record_transfer(&mut self, direction: TransferDirection, value: Fixed64) {
        match direction {
            TransferDirection::FirstToSecond => self.cumulative_transfer += value,
            TransferDirection::SecondToFirst => self.cumulative_transfer -= value,
        }
    }
}
