//! The canonical compute-grid scenario.
//!
//! Three nodes with falling usage rates, chained by two links, fed by a CPU
//! generator at the head and a RAM generator in the middle. Used by examples
//! and integration tests as a known-good topology.

use crate::error::ScenarioError;
use fluxnet_core::engine::Engine;
use fluxnet_core::fixed::f64_to_fixed64;
use fluxnet_core::id::{LinkId, NodeId, ResourceTypeId, SourceId};
use fluxnet_core::registry::RegistryBuilder;
use fluxnet_core::source::ResourceTemplate;

/// Handles into the built compute grid.
#[derive(Debug, Clone, Copy)]
pub struct ComputeGrid {
    pub cpu: ResourceTypeId,
    pub ram: ResourceTypeId,
    pub nodes: [NodeId; 3],
    pub links: [LinkId; 2],
    pub cpu_source: SourceId,
    pub ram_source: SourceId,
}

/// Build the compute grid:
///
/// ```text
/// CPU Generator (100/tick) -> Node 1 (0.5) -- Node 2 (0.3) -- Node 3 (0.1)
///                  RAM Generator (200/tick) ----^
/// ```
pub fn build_compute_grid() -> Result<(Engine, ComputeGrid), ScenarioError> {
    let cpu_value = f64_to_fixed64(1.0);
    let ram_value = f64_to_fixed64(2.0);

    let mut types = RegistryBuilder::new();
    let cpu = types.register("CPU", cpu_value)?;
    let ram = types.register("RAM", ram_value)?;
    let registry = types.build();

    let mut engine = Engine::new(registry);

    let n1 = engine.add_node("Node 1", f64_to_fixed64(0.5))?;
    let n2 = engine.add_node("Node 2", f64_to_fixed64(0.3))?;
    let n3 = engine.add_node("Node 3", f64_to_fixed64(0.1))?;

    let l12 = engine.add_link(n1, n2, f64_to_fixed64(0.5))?;
    let l23 = engine.add_link(n2, n3, f64_to_fixed64(0.5))?;

    let cpu_template = ResourceTemplate::new(cpu, cpu_value);
    let ram_template = ResourceTemplate::new(ram, ram_value);

    let cpu_source = engine.add_source("CPU Generator")?;
    engine.add_receiver(cpu_source, n1);
    engine.add_distribution(cpu_source, cpu_template, f64_to_fixed64(100.0));

    let ram_source = engine.add_source("RAM Generator")?;
    engine.add_receiver(ram_source, n2);
    engine.add_distribution(ram_source, ram_template, f64_to_fixed64(200.0));

    Ok((
        engine,
        ComputeGrid {
            cpu,
            ram,
            nodes: [n1, n2, n3],
            links: [l12, l23],
            cpu_source,
            ram_source,
        },
    ))
}
