//! Signals and commands example: scripting edits against a running engine.
//!
//! Shows the command queue in action -- a danger signal raised at tick 20,
//! cleared at tick 40, and a generator swapped mid-run -- with every edit
//! taking effect at a tick boundary.
//!
//! Run with: `cargo run -p fluxnet-core --example signals_and_commands`

use fluxnet_core::command_queue::Command;
use fluxnet_core::engine::Engine;
use fluxnet_core::node::Signal;
use fluxnet_core::registry::RegistryBuilder;

fn fixed(v: f64) -> fluxnet_core::fixed::Fixed64 {
    fluxnet_core::fixed::f64_to_fixed64(v)
}

fn main() {
    let mut types = RegistryBuilder::new();
    let cpu = types.register("CPU", fixed(1.0)).unwrap();
    let registry = types.build();
    let cpu_template = registry.template(cpu).unwrap();

    let mut engine = Engine::with_command_history(registry, 64);

    let left = engine.add_node("left", fixed(0.5)).unwrap();
    let right = engine.add_node("right", fixed(0.2)).unwrap();
    engine.add_link(left, right, fixed(0.5)).unwrap();

    let r#gen = engine.add_source("feed").unwrap();
    engine.add_receiver(r#gen, left);
    engine.add_distribution(r#gen, cpu_template, fixed(40.0));

    for tick in 0..60u64 {
        match tick {
            20 => engine.submit(Command::SetSignal {
                node: left,
                signal: Signal::Danger,
            }),
            40 => engine.submit(Command::SetSignal {
                node: left,
                signal: Signal::None,
            }),
            _ => {}
        }
        engine.step();

        if tick % 10 == 9 {
            let left_node = engine.node(left).unwrap();
            let right_node = engine.node(right).unwrap();
            println!(
                "tick {:>2}: left={:?} right={:?}",
                tick + 1,
                left_node.state(),
                right_node.state(),
            );
        }
    }

    println!("\ncommand history:");
    for (tick, command) in engine.command_history() {
        println!("  tick {tick}: {command:?}");
    }
}
