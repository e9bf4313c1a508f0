//! Shared test helpers for integration tests and benchmarks.
//!
//! Gated behind `#[cfg(any(test, feature = "test-utils"))]` so these helpers
//! are available in unit tests, integration tests, and benchmarks (via the
//! `test-utils` feature).

use crate::engine::Engine;
use crate::fixed::Fixed64;
use crate::id::{NodeId, ResourceTypeId};
use crate::registry::{Registry, RegistryBuilder};
use crate::source::ResourceTemplate;

// ===========================================================================
// Fixed-point helper
// ===========================================================================

pub fn fixed(v: f64) -> Fixed64 {
    Fixed64::from_num(v)
}

// ===========================================================================
// Canonical resource types
// ===========================================================================

pub fn cpu() -> ResourceTypeId {
    ResourceTypeId(0)
}
pub fn ram() -> ResourceTypeId {
    ResourceTypeId(1)
}
/// A drain resource: negative per-unit value.
pub fn heat() -> ResourceTypeId {
    ResourceTypeId(2)
}

pub fn cpu_template() -> ResourceTemplate {
    ResourceTemplate::new(cpu(), fixed(1.0))
}
pub fn ram_template() -> ResourceTemplate {
    ResourceTemplate::new(ram(), fixed(2.0))
}
pub fn heat_template() -> ResourceTemplate {
    ResourceTemplate::new(heat(), fixed(-0.5))
}

/// Registry with the canonical test types: CPU (1.0), RAM (2.0), HEAT (-0.5).
pub fn test_registry() -> Registry {
    let mut builder = RegistryBuilder::new();
    builder.register("CPU", fixed(1.0)).unwrap();
    builder.register("RAM", fixed(2.0)).unwrap();
    builder.register("HEAT", fixed(-0.5)).unwrap();
    builder.build()
}

// ===========================================================================
// Engine helpers
// ===========================================================================

/// Put `count` units of `resource_type` (at its registry default value)
/// directly into a node's pool, bypassing sources.
pub fn seed_units(engine: &mut Engine, node: NodeId, resource_type: ResourceTypeId, count: usize) {
    let template = engine
        .registry()
        .template(resource_type)
        .expect("resource type not in registry");
    let node = engine.graph.node_mut(node).expect("node not in graph");
    for _ in 0..count {
        node.receive(template.instantiate());
    }
}

/// A two-node engine with one link, no sources: `a --link--> b`.
pub fn linked_pair(
    rate_a: f64,
    rate_b: f64,
    effectiveness: f64,
) -> (Engine, NodeId, NodeId, crate::id::LinkId) {
    let mut engine = Engine::new(test_registry());
    let a = engine.add_node("a", fixed(rate_a)).unwrap();
    let b = engine.add_node("b", fixed(rate_b)).unwrap();
    let link = engine.add_link(a, b, fixed(effectiveness)).unwrap();
    (engine, a, b, link)
}
