//! Sources: named generators that inject resource units into nodes.
//!
//! A source owns an ordered set of receiving nodes and an ordered table of
//! distribution entries. Once per tick, for every receiver and every entry,
//! the engine injects `floor(amount)` independent clones of the entry's
//! template -- a source with amount 100 and three receivers puts 100 units
//! into *each* receiver, every tick.

use crate::fixed::Fixed64;
use crate::id::{NodeId, ResourceTypeId};
use crate::pool::ResourceUnit;

// ---------------------------------------------------------------------------
// Templates and distribution entries
// ---------------------------------------------------------------------------

/// A prototype resource unit a source stamps clones from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct ResourceTemplate {
    pub resource_type: ResourceTypeId,
    pub value: Fixed64,
}

impl ResourceTemplate {
    pub fn new(resource_type: ResourceTypeId, value: Fixed64) -> Self {
        Self {
            resource_type,
            value,
        }
    }

    /// Stamp an independent unit from this template.
    pub fn instantiate(&self) -> ResourceUnit {
        ResourceUnit::new(self.resource_type, self.value)
    }
}

/// One row of a source's per-tick distribution table.
///
/// The table is an ordered list, not a map: two entries with value-equal
/// templates are legal and both distribute independently.
#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct DistributionEntry {
    pub template: ResourceTemplate,
    pub amount: Fixed64,
}

// ---------------------------------------------------------------------------
// Source
// ---------------------------------------------------------------------------

/// A named generator bound to a set of receiving nodes.
///
/// Sources may be added to or removed from a running simulation at tick
/// boundaries; that is a supported operation, not an ad-hoc one.
#[derive(Debug, Clone, serde::Serialize, serde::Deserialize)]
pub struct Source {
    name: String,
    receivers: Vec<NodeId>,
    distribution: Vec<DistributionEntry>,
}

impl Source {
    pub(crate) fn new(name: String) -> Self {
        Self {
            name,
            receivers: Vec::new(),
            distribution: Vec::new(),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Receivers in insertion order.
    pub fn receivers(&self) -> &[NodeId] {
        &self.receivers
    }

    /// Distribution entries in insertion order.
    pub fn distribution(&self) -> &[DistributionEntry] {
        &self.distribution
    }

    /// Add a receiving node. Adding a node already present is a no-op
    /// (receivers form an ordered set).
    pub fn add_receiver(&mut self, node: NodeId) {
        if !self.receivers.contains(&node) {
            self.receivers.push(node);
        }
    }

    /// Remove a receiving node. Removing an absent node is a no-op.
    pub fn remove_receiver(&mut self, node: NodeId) {
        self.receivers.retain(|&n| n != node);
    }

    /// Append a distribution entry.
    pub fn add_distribution(&mut self, template: ResourceTemplate, amount: Fixed64) {
        self.distribution.push(DistributionEntry { template, amount });
    }

    /// Remove the first entry whose template is value-equal to `template`.
    /// Removing an absent template is a no-op.
    pub fn remove_distribution(&mut self, template: &ResourceTemplate) {
        if let Some(pos) = self
            .distribution
            .iter()
            .position(|e| e.template == *template)
        {
            self.distribution.remove(pos);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fixed::f64_to_fixed64;
    use slotmap::SlotMap;

    fn node_ids(n: usize) -> Vec<NodeId> {
        let mut sm = SlotMap::<NodeId, ()>::with_key();
        (0..n).map(|_| sm.insert(())).collect()
    }

    fn cpu_template() -> ResourceTemplate {
        ResourceTemplate::new(ResourceTypeId(0), f64_to_fixed64(1.0))
    }

    #[test]
    fn receivers_are_an_ordered_set() {
        let ids = node_ids(2);
        let mut source = Source::new("gen".to_string());
        source.add_receiver(ids[0]);
        source.add_receiver(ids[1]);
        source.add_receiver(ids[0]);
        assert_eq!(source.receivers(), &[ids[0], ids[1]]);
    }

    #[test]
    fn remove_absent_receiver_is_noop() {
        let ids = node_ids(2);
        let mut source = Source::new("gen".to_string());
        source.add_receiver(ids[0]);
        source.remove_receiver(ids[1]);
        assert_eq!(source.receivers(), &[ids[0]]);
    }

    #[test]
    fn duplicate_distribution_entries_are_legal() {
        let mut source = Source::new("gen".to_string());
        source.add_distribution(cpu_template(), f64_to_fixed64(10.0));
        source.add_distribution(cpu_template(), f64_to_fixed64(5.0));
        assert_eq!(source.distribution().len(), 2);
    }

    #[test]
    fn remove_distribution_takes_first_match() {
        let mut source = Source::new("gen".to_string());
        source.add_distribution(cpu_template(), f64_to_fixed64(10.0));
        source.add_distribution(cpu_template(), f64_to_fixed64(5.0));
        source.remove_distribution(&cpu_template());
        assert_eq!(source.distribution().len(), 1);
        assert_eq!(source.distribution()[0].amount, f64_to_fixed64(5.0));
    }

    #[test]
    fn remove_absent_distribution_is_noop() {
        let mut source = Source::new("gen".to_string());
        source.add_distribution(cpu_template(), f64_to_fixed64(10.0));
        let other = ResourceTemplate::new(ResourceTypeId(1), f64_to_fixed64(1.0));
        source.remove_distribution(&other);
        assert_eq!(source.distribution().len(), 1);
    }

    #[test]
    fn template_instantiation_is_independent() {
        let template = cpu_template();
        let a = template.instantiate();
        let mut b = template.instantiate();
        b.value = f64_to_fixed64(99.0);
        assert_eq!(a.value, f64_to_fixed64(1.0));
        assert_eq!(template.value, f64_to_fixed64(1.0));
    }
}
