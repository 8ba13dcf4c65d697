use std::collections::{BTreeMap, HashMap};
use std::sync::Arc;

use toolmodel_config::StructuralPolicy;
use toolmodel_model::{Dependency, DependencyConfiguration, ResolvedDependency};

use crate::error::ProjectionError;
use crate::host::{HostConfiguration, HostDependency, HostProject, HostResolvedDependency};

/// Everything the projector needs to know about one host configuration.
#[derive(Debug, Clone)]
pub struct ConfigurationInput {
    pub configuration: HostConfiguration,
    pub requested: Vec<HostDependency>,
    pub resolved: Vec<Arc<HostResolvedDependency>>,
}

impl ConfigurationInput {
    pub fn new(configuration: HostConfiguration) -> Self {
        Self {
            configuration,
            requested: Vec::new(),
            resolved: Vec::new(),
        }
    }

    fn name(&self) -> &str {
        &self.configuration.name
    }

    fn to_node(&self) -> DependencyConfiguration {
        let host = &self.configuration;
        DependencyConfiguration {
            name: host.name.clone(),
            description: host.description.clone(),
            transitive: host.transitive,
            can_be_consumed: host.can_be_consumed,
            can_be_resolved: host.can_be_resolved,
            extends_from: Vec::new(),
            requested: self.requested.iter().map(Dependency::from).collect(),
            resolved: self
                .resolved
                .iter()
                .map(|tree| ResolvedDependency::from(tree.as_ref()))
                .collect(),
        }
    }
}

/// Turns host configurations into snapshot configurations and re-links `extends_from` by name.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ConfigurationGraphProjector {
    policy: StructuralPolicy,
}

impl ConfigurationGraphProjector {
    pub fn new(policy: StructuralPolicy) -> Self {
        Self { policy }
    }

    pub fn policy(&self) -> StructuralPolicy {
        self.policy
    }

    /// Reads every configuration of `host` together with its requested and resolved dependencies.
    ///
    /// A configuration whose resolution fails is recorded as unresolved.
    pub fn collect<H: HostProject + ?Sized>(&self, host: &H) -> Vec<ConfigurationInput> {
        let project = host.identity().path;
        host.configurations()
            .into_iter()
            .map(|configuration| {
                let requested = host.requested_dependencies(&configuration.name);
                let resolved = match host.resolved_dependencies(&configuration.name) {
                    Ok(resolved) => resolved,
                    Err(err) => {
                        tracing::warn!(
                            target: "toolmodel.project",
                            project = %project,
                            configuration = %configuration.name,
                            error = %err,
                            "failed to resolve configuration; recording it without resolved dependencies"
                        );
                        Vec::new()
                    }
                };
                ConfigurationInput {
                    configuration,
                    requested,
                    resolved,
                }
            })
            .collect()
    }

    pub fn project(
        &self,
        project: &str,
        inputs: &[ConfigurationInput],
    ) -> Result<BTreeMap<String, DependencyConfiguration>, ProjectionError> {
        let mut nodes = BTreeMap::new();
        // Index of the input that defined each name; later definitions win under best-effort.
        let mut owner: HashMap<&str, usize> = HashMap::new();

        for (index, input) in inputs.iter().enumerate() {
            if owner.insert(input.name(), index).is_some() {
                match self.policy {
                    StructuralPolicy::Strict => {
                        return Err(ProjectionError::DuplicateConfiguration {
                            project: project.to_string(),
                            name: input.name().to_string(),
                        });
                    }
                    StructuralPolicy::BestEffort => {
                        tracing::warn!(
                            target: "toolmodel.project",
                            project = %project,
                            configuration = %input.name(),
                            "configuration defined more than once; keeping the last definition"
                        );
                    }
                }
            }
            nodes.insert(input.name().to_string(), input.to_node());
        }

        for (index, input) in inputs.iter().enumerate() {
            let name = input.name();
            if owner.get(name) != Some(&index) || input.configuration.extends_from.is_empty() {
                continue;
            }

            let parents: Vec<String> = input
                .configuration
                .extends_from
                .iter()
                .filter(|parent| {
                    if parent.as_str() == name {
                        tracing::debug!(
                            target: "toolmodel.project",
                            project = %project,
                            configuration = %name,
                            "dropping self-extension"
                        );
                        return false;
                    }
                    if !nodes.contains_key(parent.as_str()) {
                        tracing::debug!(
                            target: "toolmodel.project",
                            project = %project,
                            configuration = %name,
                            missing = %parent,
                            "extended configuration not found; dropping link"
                        );
                        return false;
                    }
                    true
                })
                .cloned()
                .collect();

            if let Some(node) = nodes.get_mut(name) {
                node.extends_from = parents;
            }
        }

        Ok(nodes)
    }

    /// [`Self::collect`] followed by [`Self::project`].
    pub fn project_host<H: HostProject + ?Sized>(
        &self,
        host: &H,
    ) -> Result<BTreeMap<String, DependencyConfiguration>, ProjectionError> {
        let project = host.identity().path;
        let inputs = self.collect(host);
        self.project(&project, &inputs)
    }
}
