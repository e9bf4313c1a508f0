use fluxnet_core::graph::GraphError;
use fluxnet_core::registry::RegistryError;

/// Errors that can occur while building a scenario.
#[derive(Debug, thiserror::Error)]
pub enum ScenarioError {
    #[error("registry error: {0}")]
    Registry(#[from] RegistryError),
    #[error("graph error: {0}")]
    Graph(#[from] GraphError),
}
