use serde::{Deserialize, Serialize};
use slotmap::new_key_type;

new_key_type! {
    /// Identifies a node (actor) in the flow graph.
    pub struct NodeId;

    /// Identifies a link (transfer channel) in the flow graph.
    pub struct LinkId;

    /// Identifies a source (generator) in the engine.
    pub struct SourceId;
}

/// Identifies a resource type in the registry. Cheap to copy and compare.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct ResourceTypeId(pub u32);

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn resource_type_id_equality() {
        let a = ResourceTypeId(0);
        let b = ResourceTypeId(0);
        let c = ResourceTypeId(1);
        assert_eq!(a, b);
        assert_ne!(a, c);
    }

    #[test]
    fn resource_type_id_ordering() {
        // BTreeMap pool iteration relies on the id ordering.
        assert!(ResourceTypeId(0) < ResourceTypeId(1));
    }

    #[test]
    fn ids_are_hashable() {
        use std::collections::HashMap;
        let mut map = HashMap::new();
        map.insert(ResourceTypeId(0), "cpu");
        map.insert(ResourceTypeId(1), "ram");
        assert_eq!(map[&ResourceTypeId(0)], "cpu");
    }
}
