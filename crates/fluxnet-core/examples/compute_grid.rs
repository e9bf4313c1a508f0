//! Compute grid example: CPU and RAM flowing across a three-node chain.
//!
//! Demonstrates engine construction, sources, links, and reading snapshots
//! after each step.
//!
//! Run with: `cargo run -p fluxnet-core --example compute_grid`

use fluxnet_core::engine::Engine;
use fluxnet_core::fixed::fixed64_to_f64;
use fluxnet_core::registry::RegistryBuilder;

fn fixed(v: f64) -> fluxnet_core::fixed::Fixed64 {
    fluxnet_core::fixed::f64_to_fixed64(v)
}

fn main() {
    // --- Resource types ---

    let mut types = RegistryBuilder::new();
    let cpu = types.register("CPU", fixed(1.0)).unwrap();
    let ram = types.register("RAM", fixed(2.0)).unwrap();
    let registry = types.build();

    let mut engine = Engine::new(registry);

    // --- Three nodes, fastest burner first ---

    let n1 = engine.add_node("Node 1", fixed(0.5)).unwrap();
    let n2 = engine.add_node("Node 2", fixed(0.3)).unwrap();
    let n3 = engine.add_node("Node 3", fixed(0.1)).unwrap();

    // --- Links: 1-2 and 2-3 ---

    engine.add_link(n1, n2, fixed(0.5)).unwrap();
    engine.add_link(n2, n3, fixed(0.5)).unwrap();

    // --- Generators ---

    let cpu_template = engine.registry().template(cpu).unwrap();
    let ram_template = engine.registry().template(ram).unwrap();

    let cpu_gen = engine.add_source("CPU Generator").unwrap();
    engine.add_receiver(cpu_gen, n1);
    engine.add_distribution(cpu_gen, cpu_template, fixed(100.0));

    let ram_gen = engine.add_source("RAM Generator").unwrap();
    engine.add_receiver(ram_gen, n2);
    engine.add_distribution(ram_gen, ram_template, fixed(200.0));

    // --- Run 100 ticks, reporting every 10 ---

    for _ in 0..10 {
        engine.run(10);
        let snapshot = engine.snapshot();
        println!("tick {}:", snapshot.tick);
        for node in &snapshot.nodes {
            let counts: Vec<String> = node
                .pool_counts
                .iter()
                .map(|&(ty, count)| {
                    let name = engine.registry().name(ty).unwrap_or("?");
                    format!("{name}: {count}")
                })
                .collect();
            println!(
                "  {} ({:?}): {} | effectiveness {:.2}",
                node.name,
                node.state,
                counts.join(", "),
                fixed64_to_f64(node.effectiveness)
            );
        }
    }

    println!("\nfinal state hash: {:#x}", engine.state_hash());
}
