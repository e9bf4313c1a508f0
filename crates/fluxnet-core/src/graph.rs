//! The flow graph: nodes and the pairwise links between them.
//!
//! Storage is SlotMap-based with explicit order vectors: nodes iterate in
//! insertion order and links in declaration order. Those orders are an
//! observable part of the simulation contract -- pool mutation is in place,
//! so a node shared by two links can be partially depleted by the first
//! before the second reads its pressure.

use crate::fixed::Fixed64;
use crate::id::{LinkId, NodeId};
use crate::link::{Link, default_min_gradient};
use crate::node::Node;
use serde::{Deserialize, Serialize};
use slotmap::{SecondaryMap, SlotMap};

// ---------------------------------------------------------------------------
// Error types
// ---------------------------------------------------------------------------

/// Errors that can occur while wiring the graph at setup time.
///
/// Runtime operation is silent and best-effort; construction is the one
/// place with a real failure mode.
#[derive(Debug, thiserror::Error)]
pub enum GraphError {
    #[error("duplicate node name: {0}")]
    DuplicateNodeName(String),
    #[error("duplicate source name: {0}")]
    DuplicateSourceName(String),
    #[error("node not found: {0:?}")]
    NodeNotFound(NodeId),
    #[error("link endpoints must differ")]
    SelfLink,
    #[error("usage rate must be within [0, 1], got {0}")]
    UsageRateOutOfRange(Fixed64),
    #[error("link effectiveness must be within (0, 1], got {0}")]
    EffectivenessOutOfRange(Fixed64),
}

// ---------------------------------------------------------------------------
// FlowGraph
// ---------------------------------------------------------------------------

/// Nodes and links with declaration-order iteration and per-node adjacency.
///
/// Nodes and links are created at setup and never destroyed during a run;
/// runtime edits go through the engine's command queue and touch sources,
/// signals, and states only.
#[derive(Debug, Default, Serialize, Deserialize)]
pub struct FlowGraph {
    pub(crate) nodes: SlotMap<NodeId, Node>,
    pub(crate) links: SlotMap<LinkId, Link>,
    /// Node iteration order (insertion order).
    pub(crate) node_order: Vec<NodeId>,
    /// Link iteration order (declaration order). The transfer tie-break.
    pub(crate) link_order: Vec<LinkId>,
    /// Links touching each node, in declaration order.
    pub(crate) adjacency: SecondaryMap<NodeId, Vec<LinkId>>,
}

impl FlowGraph {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a node. Names are unique within a graph; usage rate must lie in
    /// `[0, 1]`.
    pub fn add_node(&mut self, name: &str, usage_rate: Fixed64) -> Result<NodeId, GraphError> {
        if usage_rate < Fixed64::ZERO || usage_rate > Fixed64::from_num(1) {
            return Err(GraphError::UsageRateOutOfRange(usage_rate));
        }
        if self.find_node(name).is_some() {
            return Err(GraphError::DuplicateNodeName(name.to_string()));
        }
        let id = self.nodes.insert(Node::new(name.to_string(), usage_rate));
        self.node_order.push(id);
        self.adjacency.insert(id, Vec::new());
        Ok(id)
    }

    /// Add a link between two existing, distinct nodes with the default
    /// minimum-gradient threshold.
    pub fn add_link(
        &mut self,
        first: NodeId,
        second: NodeId,
        effectiveness: Fixed64,
    ) -> Result<LinkId, GraphError> {
        self.add_link_with_tolerance(first, second, effectiveness, default_min_gradient())
    }

    /// Add a link with an explicit minimum-gradient threshold: per tick and
    /// per resource type, gradients with magnitude below the threshold move
    /// nothing.
    pub fn add_link_with_tolerance(
        &mut self,
        first: NodeId,
        second: NodeId,
        effectiveness: Fixed64,
        min_gradient: Fixed64,
    ) -> Result<LinkId, GraphError> {
        if effectiveness <= Fixed64::ZERO || effectiveness > Fixed64::from_num(1) {
            return Err(GraphError::EffectivenessOutOfRange(effectiveness));
        }
        if !self.nodes.contains_key(first) {
            return Err(GraphError::NodeNotFound(first));
        }
        if !self.nodes.contains_key(second) {
            return Err(GraphError::NodeNotFound(second));
        }
        if first == second {
            return Err(GraphError::SelfLink);
        }
        let id = self
            .links
            .insert(Link::new(first, second, effectiveness, min_gradient));
        self.link_order.push(id);
        self.adjacency[first].push(id);
        self.adjacency[second].push(id);
        Ok(id)
    }

    /// Look up a node by name. Absent names yield `None`, never an error.
    pub fn find_node(&self, name: &str) -> Option<NodeId> {
        self.node_order
            .iter()
            .copied()
            .find(|&id| self.nodes[id].name() == name)
    }

    pub fn node(&self, id: NodeId) -> Option<&Node> {
        self.nodes.get(id)
    }

    pub fn node_mut(&mut self, id: NodeId) -> Option<&mut Node> {
        self.nodes.get_mut(id)
    }

    pub fn link(&self, id: LinkId) -> Option<&Link> {
        self.links.get(id)
    }

    pub fn node_count(&self) -> usize {
        self.node_order.len()
    }

    pub fn link_count(&self) -> usize {
        self.link_order.len()
    }

    /// Node ids in insertion order.
    pub fn node_ids(&self) -> &[NodeId] {
        &self.node_order
    }

    /// Link ids in declaration order.
    pub fn link_ids(&self) -> &[LinkId] {
        &self.link_order
    }

    /// Links touching a node, in declaration order.
    pub fn node_links(&self, id: NodeId) -> &[LinkId] {
        self.adjacency.get(id).map_or(&[], Vec::as_slice)
    }

    /// Iterate (id, node) pairs in insertion order.
    pub fn nodes(&self) -> impl Iterator<Item = (NodeId, &Node)> {
        self.node_order.iter().map(|&id| (id, &self.nodes[id]))
    }

    /// Iterate (id, link) pairs in declaration order.
    pub fn links(&self) -> impl Iterator<Item = (LinkId, &Link)> {
        self.link_order.iter().map(|&id| (id, &self.links[id]))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fixed::f64_to_fixed64;

    fn fixed(v: f64) -> Fixed64 {
        f64_to_fixed64(v)
    }

    #[test]
    fn add_node_and_find_by_name() {
        let mut graph = FlowGraph::new();
        let a = graph.add_node("alpha", fixed(0.5)).unwrap();
        assert_eq!(graph.find_node("alpha"), Some(a));
        assert_eq!(graph.find_node("beta"), None);
    }

    #[test]
    fn duplicate_node_name_is_rejected() {
        let mut graph = FlowGraph::new();
        graph.add_node("alpha", fixed(0.5)).unwrap();
        assert!(matches!(
            graph.add_node("alpha", fixed(0.2)),
            Err(GraphError::DuplicateNodeName(_))
        ));
    }

    #[test]
    fn usage_rate_bounds_are_enforced() {
        let mut graph = FlowGraph::new();
        assert!(matches!(
            graph.add_node("bad", fixed(1.5)),
            Err(GraphError::UsageRateOutOfRange(_))
        ));
        assert!(matches!(
            graph.add_node("bad", fixed(-0.1)),
            Err(GraphError::UsageRateOutOfRange(_))
        ));
        // Both endpoints of the range are legal.
        graph.add_node("zero", fixed(0.0)).unwrap();
        graph.add_node("one", fixed(1.0)).unwrap();
    }

    #[test]
    fn self_link_is_rejected() {
        let mut graph = FlowGraph::new();
        let a = graph.add_node("alpha", fixed(0.5)).unwrap();
        assert!(matches!(
            graph.add_link(a, a, fixed(0.5)),
            Err(GraphError::SelfLink)
        ));
    }

    #[test]
    fn link_effectiveness_bounds_are_enforced() {
        let mut graph = FlowGraph::new();
        let a = graph.add_node("alpha", fixed(0.5)).unwrap();
        let b = graph.add_node("beta", fixed(0.5)).unwrap();
        assert!(matches!(
            graph.add_link(a, b, fixed(0.0)),
            Err(GraphError::EffectivenessOutOfRange(_))
        ));
        assert!(matches!(
            graph.add_link(a, b, fixed(1.1)),
            Err(GraphError::EffectivenessOutOfRange(_))
        ));
        graph.add_link(a, b, fixed(1.0)).unwrap();
    }

    #[test]
    fn link_order_is_declaration_order() {
        let mut graph = FlowGraph::new();
        let a = graph.add_node("a", fixed(0.5)).unwrap();
        let b = graph.add_node("b", fixed(0.5)).unwrap();
        let c = graph.add_node("c", fixed(0.5)).unwrap();
        let ab = graph.add_link(a, b, fixed(0.5)).unwrap();
        let bc = graph.add_link(b, c, fixed(0.5)).unwrap();
        assert_eq!(graph.link_ids(), &[ab, bc]);
    }

    #[test]
    fn adjacency_tracks_touching_links() {
        let mut graph = FlowGraph::new();
        let a = graph.add_node("a", fixed(0.5)).unwrap();
        let b = graph.add_node("b", fixed(0.5)).unwrap();
        let c = graph.add_node("c", fixed(0.5)).unwrap();
        let ab = graph.add_link(a, b, fixed(0.5)).unwrap();
        let bc = graph.add_link(b, c, fixed(0.5)).unwrap();
        assert_eq!(graph.node_links(a), &[ab]);
        assert_eq!(graph.node_links(b), &[ab, bc]);
        assert_eq!(graph.node_links(c), &[bc]);
    }
}
