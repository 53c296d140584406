mod client;
mod inventory;

pub use client::{KubeInventory, connect};
pub use inventory::Inventory;

/// Parameters to push down to the Kubernetes API
#[derive(Debug, Clone, Default)]
pub struct ApiFilters {
    /// Label selector string (e.g., "app=nginx,version=v1"), passed through verbatim
    pub label_selector: Option<String>,
}

impl ApiFilters {
    pub fn labels(selector: Option<&str>) -> Self {
        Self {
            label_selector: selector.filter(|s| !s.is_empty()).map(String::from),
        }
    }

    /// No filtering, used for supporting collections
    pub fn none() -> Self {
        Self::default()
    }
}

/// Namespace restriction for a run
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum Scope {
    #[default]
    AllNamespaces,
    Namespace(String),
}

impl Scope {
    /// Empty or missing namespace means all namespaces
    pub fn from_namespace(namespace: Option<&str>) -> Self {
        match namespace {
            Some(ns) if !ns.is_empty() => Scope::Namespace(ns.to_string()),
            _ => Scope::AllNamespaces,
        }
    }

    pub fn namespace(&self) -> Option<&str> {
        match self {
            Scope::AllNamespaces => None,
            Scope::Namespace(ns) => Some(ns),
        }
    }
}
