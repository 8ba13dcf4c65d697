use serde::{Deserialize, Serialize};

use crate::{Dependency, ResolvedDependency};

/// Snapshot of one dependency configuration (`implementation`, `testRuntimeClasspath`, ...).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DependencyConfiguration {
    /// Unique key of the configuration within its project snapshot.
    pub name: String,
    #[serde(default)]
    pub description: Option<String>,
    pub transitive: bool,
    pub can_be_consumed: bool,
    pub can_be_resolved: bool,
    /// Names of the configurations this one extends, in declaration order.
    ///
    /// Every entry is a key of the owning [`crate::ProjectSnapshot`]'s configuration map; use
    /// [`crate::ProjectSnapshot::extends_from`] to follow them.
    #[serde(default)]
    pub extends_from: Vec<String>,
    #[serde(default)]
    pub requested: Vec<Dependency>,
    /// Resolved dependency trees, one per direct dependency. Empty when the configuration was not
    /// resolved.
    #[serde(default)]
    pub resolved: Vec<ResolvedDependency>,
}

impl DependencyConfiguration {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            description: None,
            transitive: true,
            can_be_consumed: true,
            can_be_resolved: true,
            extends_from: Vec::new(),
            requested: Vec::new(),
            resolved: Vec::new(),
        }
    }

    pub fn extends(&self, name: &str) -> bool {
        self.extends_from.iter().any(|parent| parent == name)
    }

    /// Every resolved node of every tree in this configuration, in pre-order.
    pub fn resolved_nodes(&self) -> impl Iterator<Item = &ResolvedDependency> {
        self.resolved.iter().flat_map(ResolvedDependency::walk)
    }
}
