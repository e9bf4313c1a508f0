//! The compute grid driven by a scripted timeline, with rolling stats.
//!
//! Reproduces the classic demo: CPU and RAM generators feeding a three-node
//! chain, a danger scare at tick 30, recovery at tick 45, and a generator
//! handover at tick 60 -- all expressed as timeline data instead of
//! hardwired tick checks.
//!
//! Run with: `cargo run -p fluxnet-scenario --example scripted_grid`

use fluxnet_core::command_queue::Command;
use fluxnet_core::fixed::fixed64_to_f64;
use fluxnet_core::node::Signal;
use fluxnet_scenario::{ScenarioRunner, Timeline, build_compute_grid, report};
use fluxnet_stats::{FlowStats, StatsConfig};

fn main() {
    let (engine, grid) = build_compute_grid().expect("grid construction");

    let timeline = Timeline::new()
        .at(
            30,
            Command::SetSignal {
                node: grid.nodes[0],
                signal: Signal::Danger,
            },
        )
        .at(
            45,
            Command::SetSignal {
                node: grid.nodes[0],
                signal: Signal::None,
            },
        )
        .at(
            60,
            Command::RemoveSource {
                name: "CPU Generator".to_string(),
            },
        )
        .at(
            60,
            Command::AddSource {
                name: "Burst Generator".to_string(),
            },
        )
        .at(
            60,
            Command::AddReceiver {
                source: "Burst Generator".to_string(),
                node: grid.nodes[2],
            },
        );

    let mut runner = ScenarioRunner::new(engine, timeline);
    let mut stats = FlowStats::new(StatsConfig::default());

    for tick in 0..100u64 {
        runner.step();
        for event in runner.engine().event_bus.recent() {
            stats.record(event);
        }
        stats.end_tick();

        if tick % 10 == 9 {
            println!("--- tick {} ---", tick + 1);
            print!("{}", report::network_report(runner.engine()));
        }
    }

    println!("rolling rates over the last {} ticks:", 60);
    for (label, node) in [("Node 1", grid.nodes[0]), ("Node 2", grid.nodes[1])] {
        println!(
            "  {label}: cpu burn {:.2}/tick, ram burn {:.2}/tick",
            fixed64_to_f64(stats.consumption_rate(node, grid.cpu)),
            fixed64_to_f64(stats.consumption_rate(node, grid.ram)),
        );
    }
    println!(
        "  link 1-2 cpu throughput: {:.2}/tick",
        fixed64_to_f64(stats.transfer_rate(grid.links[0], grid.cpu))
    );
}
