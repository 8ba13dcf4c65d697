use std::collections::{BTreeMap, BTreeSet, VecDeque};

use serde::{Deserialize, Serialize};

use crate::{DependencyConfiguration, GradlePluginDescriptor, MavenRepository};

/// Immutable snapshot of a build project's dependency model.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProjectSnapshot {
    pub name: String,
    /// Build path of the project (`:` for the root, `:app:core` for nested projects).
    pub path: String,
    pub group: String,
    pub version: String,
    #[serde(default)]
    pub plugins: Vec<GradlePluginDescriptor>,
    #[serde(default)]
    pub maven_repositories: Vec<MavenRepository>,
    #[serde(default)]
    pub maven_plugin_repositories: Vec<MavenRepository>,
    #[serde(default)]
    pub name_to_configuration: BTreeMap<String, DependencyConfiguration>,
}

/// An `extends_from` entry that does not name a configuration of the same snapshot.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct DanglingLink {
    pub configuration: String,
    pub missing: String,
}

impl ProjectSnapshot {
    pub fn configuration(&self, name: &str) -> Option<&DependencyConfiguration> {
        self.name_to_configuration.get(name)
    }

    pub fn configurations(&self) -> impl Iterator<Item = &DependencyConfiguration> {
        self.name_to_configuration.values()
    }

    /// Direct parents of `name`, in declaration order.
    ///
    /// Returns an empty list when `name` is not part of the snapshot.
    pub fn extends_from(&self, name: &str) -> Vec<&DependencyConfiguration> {
        let Some(configuration) = self.configuration(name) else {
            return Vec::new();
        };
        configuration
            .extends_from
            .iter()
            .filter_map(|parent| self.configuration(parent))
            .collect()
    }

    /// All configurations `name` inherits from, directly or transitively, breadth-first.
    ///
    /// Each configuration appears once and `name` itself is never included, even when the
    /// relation is cyclic.
    pub fn hierarchy(&self, name: &str) -> Vec<&DependencyConfiguration> {
        let mut seen = BTreeSet::from([name]);
        let mut queue: VecDeque<&str> = VecDeque::from([name]);
        let mut out = Vec::new();

        while let Some(current) = queue.pop_front() {
            for parent in self.extends_from(current) {
                if seen.insert(parent.name.as_str()) {
                    out.push(parent);
                    queue.push_back(parent.name.as_str());
                }
            }
        }

        out
    }

    /// Configurations that (directly) extend `name`.
    pub fn extended_by(&self, name: &str) -> Vec<&DependencyConfiguration> {
        self.configurations()
            .filter(|configuration| configuration.extends(name))
            .collect()
    }

    /// Lists `extends_from` entries that do not resolve within this snapshot.
    ///
    /// Snapshots produced by the projector never have any; this is meant for snapshots read back
    /// from disk or assembled by hand.
    pub fn dangling_links(&self) -> Vec<DanglingLink> {
        let mut out = Vec::new();
        for configuration in self.configurations() {
            for parent in &configuration.extends_from {
                if !self.name_to_configuration.contains_key(parent) {
                    out.push(DanglingLink {
                        configuration: configuration.name.clone(),
                        missing: parent.clone(),
                    });
                }
            }
        }
        out
    }
}
