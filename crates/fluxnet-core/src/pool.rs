//! Resource units and the FIFO pools that hold them.
//!
//! A [`ResourceUnit`] is an immutable-after-creation value: a resource type
//! plus a signed per-unit value. A [`ResourcePool`] is the ordered collection
//! of units of one type owned by a single node; the oldest units are always
//! consumed or transferred first.

use crate::fixed::Fixed64;
use crate::id::ResourceTypeId;
use std::collections::VecDeque;

// ---------------------------------------------------------------------------
// ResourceUnit
// ---------------------------------------------------------------------------

/// One discrete quantity of a typed resource carrying a signed value.
///
/// Cloning produces a value-equal, independent copy; two clones never share
/// state. A negative value models a drain/sink resource.
#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct ResourceUnit {
    pub resource_type: ResourceTypeId,
    pub value: Fixed64,
}

impl ResourceUnit {
    pub fn new(resource_type: ResourceTypeId, value: Fixed64) -> Self {
        Self {
            resource_type,
            value,
        }
    }
}

// ---------------------------------------------------------------------------
// ResourcePool
// ---------------------------------------------------------------------------

/// FIFO collection of units of one resource type.
///
/// Invariant: all units share the pool's type. The engine upholds this by
/// routing every unit through [`Node::receive`](crate::node::Node::receive).
#[derive(Debug, Clone, Default, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct ResourcePool {
    units: VecDeque<ResourceUnit>,
}

impl ResourcePool {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a unit to the back of the pool.
    pub fn push(&mut self, unit: ResourceUnit) {
        self.units.push_back(unit);
    }

    /// Remove and return up to `count` units from the front.
    ///
    /// If fewer than `count` are available, returns only what exists -- no
    /// error, no padding. Ownership of the returned units transfers to the
    /// caller.
    #[must_use = "returns the units actually removed, which may be fewer than requested"]
    pub fn take(&mut self, count: u64) -> Vec<ResourceUnit> {
        let available = self.units.len() as u64;
        let n = count.min(available) as usize;
        self.units.drain(..n).collect()
    }

    /// Number of units currently held.
    pub fn len(&self) -> usize {
        self.units.len()
    }

    /// Whether the pool holds no units.
    pub fn is_empty(&self) -> bool {
        self.units.is_empty()
    }

    /// Sum of all held unit values.
    pub fn total_value(&self) -> Fixed64 {
        self.units.iter().map(|u| u.value).sum()
    }

    /// Iterate units oldest-first.
    pub fn iter(&self) -> impl Iterator<Item = &ResourceUnit> {
        self.units.iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fixed::f64_to_fixed64;

    fn unit(value: f64) -> ResourceUnit {
        ResourceUnit::new(ResourceTypeId(0), f64_to_fixed64(value))
    }

    #[test]
    fn push_and_take_preserve_fifo_order() {
        let mut pool = ResourcePool::new();
        pool.push(unit(1.0));
        pool.push(unit(2.0));
        pool.push(unit(3.0));

        let taken = pool.take(2);
        assert_eq!(taken.len(), 2);
        assert_eq!(taken[0].value, f64_to_fixed64(1.0));
        assert_eq!(taken[1].value, f64_to_fixed64(2.0));
        assert_eq!(pool.len(), 1);
    }

    #[test]
    fn take_more_than_available_is_best_effort() {
        let mut pool = ResourcePool::new();
        pool.push(unit(1.0));
        pool.push(unit(2.0));

        let taken = pool.take(10);
        assert_eq!(taken.len(), 2);
        assert!(pool.is_empty());
    }

    #[test]
    fn take_zero_removes_nothing() {
        let mut pool = ResourcePool::new();
        pool.push(unit(1.0));
        let taken = pool.take(0);
        assert!(taken.is_empty());
        assert_eq!(pool.len(), 1);
    }

    #[test]
    fn total_value_sums_signed_values() {
        let mut pool = ResourcePool::new();
        pool.push(unit(2.0));
        pool.push(unit(-0.5));
        assert_eq!(pool.total_value(), f64_to_fixed64(1.5));
    }

    #[test]
    fn clones_are_independent() {
        let original = unit(1.0);
        let mut copy = original;
        copy.value = f64_to_fixed64(9.0);
        assert_eq!(original.value, f64_to_fixed64(1.0));
        assert_eq!(copy.value, f64_to_fixed64(9.0));
    }
}
