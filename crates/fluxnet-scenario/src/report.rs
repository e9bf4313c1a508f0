//! One-line-per-node textual summaries.
//!
//! Renders engine snapshots into the classic console form:
//!
//! ```text
//! Node 1 (DEFAULT): Resources=CPU: 50, RAM: 3, Effectiveness=112.00
//! ```
//!
//! Everything here returns `String`s; nothing prints. The caller decides
//! where the text goes.

use fluxnet_core::engine::Engine;
use fluxnet_core::fixed::fixed64_to_f64;
use fluxnet_core::id::NodeId;
use fluxnet_core::node::NodeState;
use fluxnet_core::query::NodeSnapshot;

/// Console label for a node state.
pub fn state_label(state: NodeState) -> &'static str {
    match state {
        NodeState::Default => "DEFAULT",
        NodeState::Conserving => "CONSERVING",
        NodeState::Expending => "EXPENDING",
    }
}

/// Render the `type: count` listing of a node's pools.
pub fn resource_summary(engine: &Engine, snapshot: &NodeSnapshot) -> String {
    let parts: Vec<String> = snapshot
        .pool_counts
        .iter()
        .map(|&(ty, count)| {
            let name = engine.registry().name(ty).unwrap_or("?");
            format!("{name}: {count}")
        })
        .collect();
    parts.join(", ")
}

/// Render one node's summary line, or `None` for an unknown id.
pub fn node_line(engine: &Engine, id: NodeId) -> Option<String> {
    let snapshot = engine.node_snapshot(id)?;
    Some(format!(
        "{} ({}): Resources={}, Effectiveness={:.2}",
        snapshot.name,
        state_label(snapshot.state),
        resource_summary(engine, &snapshot),
        fixed64_to_f64(snapshot.effectiveness)
    ))
}

/// Render every node's summary, one line each in insertion order, with a
/// trailing blank line.
pub fn network_report(engine: &Engine) -> String {
    let mut out = String::new();
    for &id in engine.graph.node_ids() {
        if let Some(line) = node_line(engine, id) {
            out.push_str(&line);
            out.push('\n');
        }
    }
    out.push('\n');
    out
}
