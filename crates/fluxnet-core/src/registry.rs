//! Immutable resource-type registry, frozen at startup.
//!
//! Resource-type *names* live here; the engine and every hot-path structure
//! work with dense [`ResourceTypeId`]s. Build a registry once with
//! [`RegistryBuilder`], freeze it, and hand it to the engine.

use crate::fixed::Fixed64;
use crate::id::ResourceTypeId;
use crate::source::ResourceTemplate;
use std::collections::HashMap;

// ---------------------------------------------------------------------------
// Error types
// ---------------------------------------------------------------------------

/// Errors that can occur while building a registry.
#[derive(Debug, thiserror::Error)]
pub enum RegistryError {
    #[error("duplicate resource type name: {0}")]
    DuplicateTypeName(String),
}

// ---------------------------------------------------------------------------
// Definitions
// ---------------------------------------------------------------------------

/// A resource type definition.
///
/// `default_value` is the per-unit value a template of this type carries
/// unless a caller overrides it. Negative values model drain/sink resources.
#[derive(Debug, Clone, serde::Serialize, serde::Deserialize)]
pub struct ResourceTypeDef {
    pub name: String,
    pub default_value: Fixed64,
}

// ---------------------------------------------------------------------------
// Builder
// ---------------------------------------------------------------------------

/// Builder for constructing an immutable [`Registry`].
#[derive(Debug, Default)]
pub struct RegistryBuilder {
    types: Vec<ResourceTypeDef>,
    name_to_id: HashMap<String, ResourceTypeId>,
}

impl RegistryBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a resource type. Returns its dense id.
    pub fn register(
        &mut self,
        name: &str,
        default_value: Fixed64,
    ) -> Result<ResourceTypeId, RegistryError> {
        if self.name_to_id.contains_key(name) {
            return Err(RegistryError::DuplicateTypeName(name.to_string()));
        }
        let id = ResourceTypeId(self.types.len() as u32);
        self.types.push(ResourceTypeDef {
            name: name.to_string(),
            default_value,
        });
        self.name_to_id.insert(name.to_string(), id);
        Ok(id)
    }

    /// Freeze the builder into an immutable registry.
    pub fn build(self) -> Registry {
        Registry {
            types: self.types,
            name_to_id: self.name_to_id,
        }
    }
}

// ---------------------------------------------------------------------------
// Registry
// ---------------------------------------------------------------------------

/// Immutable registry of resource types. No mutation after construction.
#[derive(Debug, Clone)]
pub struct Registry {
    types: Vec<ResourceTypeDef>,
    name_to_id: HashMap<String, ResourceTypeId>,
}

impl Registry {
    /// Look up a type id by name. Absent names yield `None`, never an error.
    pub fn id_by_name(&self, name: &str) -> Option<ResourceTypeId> {
        self.name_to_id.get(name).copied()
    }

    /// Look up a type definition by id.
    pub fn def(&self, id: ResourceTypeId) -> Option<&ResourceTypeDef> {
        self.types.get(id.0 as usize)
    }

    /// Look up a type name by id.
    pub fn name(&self, id: ResourceTypeId) -> Option<&str> {
        self.def(id).map(|d| d.name.as_str())
    }

    /// A distribution template for this type carrying its default value.
    pub fn template(&self, id: ResourceTypeId) -> Option<ResourceTemplate> {
        self.def(id).map(|d| ResourceTemplate {
            resource_type: id,
            value: d.default_value,
        })
    }

    /// Number of registered types.
    pub fn len(&self) -> usize {
        self.types.len()
    }

    /// Whether the registry holds no types.
    pub fn is_empty(&self) -> bool {
        self.types.is_empty()
    }

    /// Iterate over (id, def) pairs in registration order.
    pub fn iter(&self) -> impl Iterator<Item = (ResourceTypeId, &ResourceTypeDef)> {
        self.types
            .iter()
            .enumerate()
            .map(|(i, d)| (ResourceTypeId(i as u32), d))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fixed::f64_to_fixed64;

    fn build_two_types() -> (Registry, ResourceTypeId, ResourceTypeId) {
        let mut builder = RegistryBuilder::new();
        let cpu = builder.register("CPU", f64_to_fixed64(1.0)).unwrap();
        let ram = builder.register("RAM", f64_to_fixed64(2.0)).unwrap();
        (builder.build(), cpu, ram)
    }

    #[test]
    fn register_assigns_dense_ids() {
        let (_, cpu, ram) = build_two_types();
        assert_eq!(cpu, ResourceTypeId(0));
        assert_eq!(ram, ResourceTypeId(1));
    }

    #[test]
    fn duplicate_name_is_rejected() {
        let mut builder = RegistryBuilder::new();
        builder.register("CPU", f64_to_fixed64(1.0)).unwrap();
        let err = builder.register("CPU", f64_to_fixed64(5.0));
        assert!(matches!(err, Err(RegistryError::DuplicateTypeName(_))));
    }

    #[test]
    fn lookup_by_name_and_id() {
        let (registry, cpu, ram) = build_two_types();
        assert_eq!(registry.id_by_name("CPU"), Some(cpu));
        assert_eq!(registry.id_by_name("RAM"), Some(ram));
        assert_eq!(registry.id_by_name("DISK"), None);
        assert_eq!(registry.name(cpu), Some("CPU"));
        assert_eq!(registry.name(ResourceTypeId(99)), None);
    }

    #[test]
    fn template_carries_default_value() {
        let (registry, _, ram) = build_two_types();
        let template = registry.template(ram).unwrap();
        assert_eq!(template.resource_type, ram);
        assert_eq!(template.value, f64_to_fixed64(2.0));
    }

    #[test]
    fn iter_in_registration_order() {
        let (registry, cpu, ram) = build_two_types();
        let ids: Vec<_> = registry.iter().map(|(id, _)| id).collect();
        assert_eq!(ids, vec![cpu, ram]);
    }
}
