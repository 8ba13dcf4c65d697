//! A host project described entirely by a JSON document.
//!
//! Used by the CLI to project builds exported by another tool, and by tests. Failure markers
//! (`resolutionError`, `error`, `namesError`, `brokenSourceSets`) let a description simulate the
//! host-side failures the collectors must tolerate.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use parking_lot::Mutex;
use serde::Deserialize;
use thiserror::Error;

use crate::error::{ProbeError, ResolutionError};
use crate::host::{
    ConfigurationSetProvider, DependencyProvider, HostBuild, HostConfiguration, HostDependency,
    HostEnvironment, HostExtension, HostKotlinSourceSet, HostPlugin, HostProject, HostRepository,
    HostResolvedDependency, HostSourceSet, MultiplatformExtension, PluginProvider,
    ProjectIdentity, ProjectInstanceId, RepositoryProvider, ResolutionProvider,
    SyntheticConfiguration,
};
use crate::source_sets::KOTLIN_EXTENSION;

#[derive(Debug, Error)]
pub enum StaticHostError {
    #[error("failed to read host description {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("invalid host description {path}: {source}")]
    Json {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StaticConfiguration {
    #[serde(flatten)]
    pub configuration: HostConfiguration,
    #[serde(default)]
    pub requested: Vec<HostDependency>,
    #[serde(default)]
    pub resolved: Vec<Arc<HostResolvedDependency>>,
    /// When set, resolving this configuration fails with this message.
    #[serde(default)]
    pub resolution_error: Option<String>,
}

/// Files a configuration resolves to, or the error resolving it produces.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StaticClasspath {
    #[serde(default)]
    pub files: Vec<PathBuf>,
    #[serde(default)]
    pub error: Option<String>,
}

impl StaticClasspath {
    fn resolve(&self, configuration: &str) -> Result<Vec<PathBuf>, ResolutionError> {
        match &self.error {
            Some(message) => Err(ResolutionError::Failed {
                configuration: configuration.to_string(),
                message: message.clone(),
            }),
            None => Ok(self.files.clone()),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StaticKotlinExtension {
    /// Whether the extension is the multi-platform flavour.
    #[serde(default = "multiplatform_by_default")]
    pub multiplatform: bool,
    #[serde(default)]
    pub source_sets: Vec<HostKotlinSourceSet>,
    /// When set, the source-set names cannot be listed.
    #[serde(default)]
    pub names_error: Option<String>,
    /// Source sets that are listed but fail to load.
    #[serde(default)]
    pub broken_source_sets: Vec<String>,
}

fn multiplatform_by_default() -> bool {
    true
}

impl HostExtension for StaticKotlinExtension {
    fn type_name(&self) -> &str {
        if self.multiplatform {
            "org.jetbrains.kotlin.gradle.dsl.KotlinMultiplatformExtension"
        } else {
            "org.jetbrains.kotlin.gradle.dsl.KotlinJvmProjectExtension"
        }
    }

    fn as_multiplatform(&self) -> Option<&dyn MultiplatformExtension> {
        self.multiplatform.then_some(self as &dyn MultiplatformExtension)
    }
}

impl MultiplatformExtension for StaticKotlinExtension {
    fn source_set_names(&self) -> Result<Vec<String>, ProbeError> {
        if let Some(message) = &self.names_error {
            return Err(ProbeError::UnexpectedValue {
                member: "sourceSets.names".to_string(),
                message: message.clone(),
            });
        }
        Ok(self
            .source_sets
            .iter()
            .map(|source_set| source_set.name.clone())
            .chain(self.broken_source_sets.iter().cloned())
            .collect())
    }

    fn source_set(&self, name: &str) -> Result<HostKotlinSourceSet, ProbeError> {
        if self.broken_source_sets.iter().any(|broken| broken == name) {
            return Err(ProbeError::UnexpectedValue {
                member: format!("sourceSets.getByName({name})"),
                message: "source set could not be loaded".to_string(),
            });
        }
        self.source_sets
            .iter()
            .find(|source_set| source_set.name == name)
            .cloned()
            .ok_or_else(|| ProbeError::MissingMember {
                extension: KOTLIN_EXTENSION.to_string(),
                member: format!("sourceSets.{name}"),
            })
    }
}

/// JSON shape of a [`StaticHostProject`].
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StaticProjectDescription {
    #[serde(flatten)]
    pub identity: ProjectIdentity,
    #[serde(default)]
    pub environment: HostEnvironment,
    #[serde(default)]
    pub configurations: Vec<StaticConfiguration>,
    #[serde(default)]
    pub repositories: Vec<HostRepository>,
    #[serde(default)]
    pub plugin_repositories: Vec<HostRepository>,
    #[serde(default)]
    pub plugins: Vec<HostPlugin>,
    /// `None` when the Java plugin is not applied.
    #[serde(default)]
    pub java_source_sets: Option<Vec<HostSourceSet>>,
    #[serde(default)]
    pub kotlin: Option<StaticKotlinExtension>,
    /// Files of synthetic configurations, keyed by the configuration they extend.
    #[serde(default)]
    pub classpaths: BTreeMap<String, StaticClasspath>,
    #[serde(default)]
    pub buildscript_classpath: StaticClasspath,
    #[serde(default)]
    pub settings_classpath: StaticClasspath,
    #[serde(default)]
    pub subprojects: Vec<StaticProjectDescription>,
}

pub struct StaticHostProject {
    id: ProjectInstanceId,
    description: StaticProjectDescription,
    subprojects: Vec<Arc<dyn HostBuild>>,
    synthetic: Mutex<BTreeMap<String, SyntheticConfiguration>>,
}

impl std::fmt::Debug for StaticHostProject {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("StaticHostProject")
            .field("id", &self.id)
            .field("path", &self.description.identity.path)
            .field("subprojects", &self.subprojects.len())
            .finish_non_exhaustive()
    }
}

impl StaticHostProject {
    /// Every call produces a distinct project instance, subprojects included.
    pub fn new(mut description: StaticProjectDescription) -> Self {
        let subprojects = std::mem::take(&mut description.subprojects)
            .into_iter()
            .map(|sub| Arc::new(StaticHostProject::new(sub)) as Arc<dyn HostBuild>)
            .collect();
        Self {
            id: ProjectInstanceId::fresh(),
            description,
            subprojects,
            synthetic: Mutex::new(BTreeMap::new()),
        }
    }

    pub fn from_json_value(value: serde_json::Value) -> Result<Self, serde_json::Error> {
        Ok(Self::new(serde_json::from_value(value)?))
    }

    pub fn from_json_slice(bytes: &[u8]) -> Result<Self, serde_json::Error> {
        Ok(Self::new(serde_json::from_slice(bytes)?))
    }

    pub fn from_json_file(path: &Path) -> Result<Self, StaticHostError> {
        let bytes = std::fs::read(path).map_err(|source| StaticHostError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_json_slice(&bytes).map_err(|source| StaticHostError::Json {
            path: path.to_path_buf(),
            source,
        })
    }

    pub fn description(&self) -> &StaticProjectDescription {
        &self.description
    }

    /// Synthetic configurations created so far, by name.
    pub fn synthetic_configurations(&self) -> Vec<SyntheticConfiguration> {
        self.synthetic.lock().values().cloned().collect()
    }

    fn find_configuration(&self, name: &str) -> Option<&StaticConfiguration> {
        self.description
            .configurations
            .iter()
            .rev()
            .find(|c| c.configuration.name == name)
    }
}

impl ConfigurationSetProvider for StaticHostProject {
    fn configurations(&self) -> Vec<HostConfiguration> {
        self.description
            .configurations
            .iter()
            .map(|c| c.configuration.clone())
            .collect()
    }
}

impl DependencyProvider for StaticHostProject {
    fn requested_dependencies(&self, configuration: &str) -> Vec<HostDependency> {
        self.find_configuration(configuration)
            .map(|c| c.requested.clone())
            .unwrap_or_default()
    }
}

impl ResolutionProvider for StaticHostProject {
    fn resolved_dependencies(
        &self,
        configuration: &str,
    ) -> Result<Vec<Arc<HostResolvedDependency>>, ResolutionError> {
        let found = self
            .find_configuration(configuration)
            .ok_or_else(|| ResolutionError::UnknownConfiguration(configuration.to_string()))?;
        match &found.resolution_error {
            Some(message) => Err(ResolutionError::Failed {
                configuration: configuration.to_string(),
                message: message.clone(),
            }),
            None => Ok(found.resolved.clone()),
        }
    }
}

impl RepositoryProvider for StaticHostProject {
    fn maven_repositories(&self) -> Vec<HostRepository> {
        self.description.repositories.clone()
    }

    fn maven_plugin_repositories(&self) -> Vec<HostRepository> {
        self.description.plugin_repositories.clone()
    }
}

impl PluginProvider for StaticHostProject {
    fn plugins(&self) -> Vec<HostPlugin> {
        self.description.plugins.clone()
    }
}

impl HostProject for StaticHostProject {
    fn instance_id(&self) -> ProjectInstanceId {
        self.id
    }

    fn identity(&self) -> ProjectIdentity {
        self.description.identity.clone()
    }
}

impl HostBuild for StaticHostProject {
    fn environment(&self) -> HostEnvironment {
        self.description.environment.clone()
    }

    fn java_source_sets(&self) -> Option<Vec<HostSourceSet>> {
        self.description.java_source_sets.clone()
    }

    fn resolve_synthetic(
        &self,
        configuration: &SyntheticConfiguration,
    ) -> Result<Vec<PathBuf>, ResolutionError> {
        if self.find_configuration(&configuration.extends).is_none() {
            return Err(ResolutionError::UnknownConfiguration(
                configuration.extends.clone(),
            ));
        }
        if self.find_configuration(&configuration.name).is_none() {
            self.synthetic
                .lock()
                .entry(configuration.name.clone())
                .or_insert_with(|| configuration.clone());
        }

        self.description
            .classpaths
            .get(&configuration.extends)
            .map_or(Ok(Vec::new()), |classpath| {
                classpath.resolve(&configuration.name)
            })
    }

    fn has_plugin(&self, id: &str) -> bool {
        self.description
            .plugins
            .iter()
            .any(|plugin| plugin.id.as_deref() == Some(id))
    }

    fn find_extension(&self, name: &str) -> Option<&dyn HostExtension> {
        match name {
            KOTLIN_EXTENSION => self
                .description
                .kotlin
                .as_ref()
                .map(|kotlin| kotlin as &dyn HostExtension),
            _ => None,
        }
    }

    fn buildscript_classpath(&self) -> Result<Vec<PathBuf>, ResolutionError> {
        self.description.buildscript_classpath.resolve("classpath")
    }

    fn settings_classpath(&self) -> Result<Vec<PathBuf>, ResolutionError> {
        self.description.settings_classpath.resolve("classpath")
    }

    fn subprojects(&self) -> Vec<Arc<dyn HostBuild>> {
        self.subprojects.clone()
    }
}
