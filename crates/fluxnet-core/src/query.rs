//! Read-only query API for inspecting simulation state.
//!
//! Provides snapshot types that aggregate engine state into convenient views
//! for rendering, reporting, and FFI consumers. All types are owned copies --
//! no references into internal engine storage.

use crate::fixed::{Fixed64, Ticks};
use crate::id::{LinkId, NodeId, ResourceTypeId, SourceId};
use crate::node::{NodeState, Signal};
use crate::source::DistributionEntry;

// ---------------------------------------------------------------------------
// Node snapshot
// ---------------------------------------------------------------------------

/// An aggregated, read-only view of a single node.
#[derive(Debug, Clone, serde::Serialize, serde::Deserialize)]
pub struct NodeSnapshot {
    pub id: NodeId,
    pub name: String,
    pub state: NodeState,
    pub signal: Signal,
    pub effectiveness: Fixed64,
    /// Per-type unit counts, in resource-type id order. Types the node has
    /// seen but currently holds zero of are included with a zero count.
    pub pool_counts: Vec<(ResourceTypeId, usize)>,
    /// Links touching this node, in declaration order.
    pub links: Vec<LinkId>,
}

// ---------------------------------------------------------------------------
// Link snapshot
// ---------------------------------------------------------------------------

/// An aggregated, read-only view of a single link.
///
/// The gradient signs follow the link's endpoint order: positive means net
/// flow first→second. A renderer keying edge width to transfer magnitude
/// must treat a zero magnitude as "no edge activity" for that tick.
#[derive(Debug, Clone, serde::Serialize, serde::Deserialize)]
pub struct LinkSnapshot {
    pub id: LinkId,
    pub first: NodeId,
    pub second: NodeId,
    pub effectiveness: Fixed64,
    pub min_gradient: Fixed64,
    /// Per-type gradients from the most recent transfer pass.
    pub gradients: Vec<(ResourceTypeId, Fixed64)>,
    /// Lifetime net directional value moved over this link. Never reset.
    pub cumulative_transfer: Fixed64,
}

// ---------------------------------------------------------------------------
// Source snapshot
// ---------------------------------------------------------------------------

/// An aggregated, read-only view of a single source.
#[derive(Debug, Clone, serde::Serialize, serde::Deserialize)]
pub struct SourceSnapshot {
    pub id: SourceId,
    pub name: String,
    pub receivers: Vec<NodeId>,
    pub distribution: Vec<DistributionEntry>,
}

// ---------------------------------------------------------------------------
// Network snapshot
// ---------------------------------------------------------------------------

/// A whole-network view taken after a step: everything a renderer needs.
#[derive(Debug, Clone, serde::Serialize, serde::Deserialize)]
pub struct NetworkSnapshot {
    pub tick: Ticks,
    /// Nodes in insertion order.
    pub nodes: Vec<NodeSnapshot>,
    /// Links in declaration order.
    pub links: Vec<LinkSnapshot>,
    /// Sources in insertion order.
    pub sources: Vec<SourceSnapshot>,
}
