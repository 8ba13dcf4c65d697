//! Collaborator surface a build tool implements so its live project model can be projected.
//!
//! The records in this module are the host's own view of the model: flat Gradle-style
//! coordinates, resolved trees whose sub-trees may be shared between parents, and configuration
//! identities that reference each other by name.

use std::fmt;
use std::path::PathBuf;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use serde::{Deserialize, Serialize};

use crate::error::{ProbeError, ResolutionError};

/// Token identifying one live host project instance.
///
/// Two tokens compare equal only if they were copied from the same [`ProjectInstanceId::fresh`]
/// call; snapshot caching is keyed by it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct ProjectInstanceId(u64);

impl ProjectInstanceId {
    pub fn fresh() -> Self {
        static NEXT: AtomicU64 = AtomicU64::new(1);
        Self(NEXT.fetch_add(1, Ordering::Relaxed))
    }

    pub fn get(self) -> u64 {
        self.0
    }
}

impl fmt::Display for ProjectInstanceId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProjectIdentity {
    pub name: String,
    pub path: String,
    #[serde(default)]
    pub group: String,
    #[serde(default)]
    pub version: String,
}

/// An exclude rule (`group` / `module`, either may be `*`).
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HostExclusion {
    pub group: String,
    pub module: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HostDependency {
    pub group: String,
    pub name: String,
    pub version: String,
    #[serde(default)]
    pub classifier: Option<String>,
    #[serde(default, rename = "type")]
    pub artifact_type: Option<String>,
    pub scope: String,
    #[serde(default)]
    pub exclusions: Vec<HostExclusion>,
    #[serde(default)]
    pub optional: Option<String>,
}

impl HostDependency {
    pub fn new(
        group: impl Into<String>,
        name: impl Into<String>,
        version: impl Into<String>,
        scope: impl Into<String>,
    ) -> Self {
        Self {
            group: group.into(),
            name: name.into(),
            version: version.into(),
            classifier: None,
            artifact_type: None,
            scope: scope.into(),
            exclusions: Vec::new(),
            optional: None,
        }
    }
}

#[derive(Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HostRepository {
    pub name: String,
    pub url: String,
    #[serde(default)]
    pub releases: Option<String>,
    #[serde(default)]
    pub snapshots: Option<String>,
    #[serde(default)]
    pub known_to_exist: bool,
    #[serde(default)]
    pub username: Option<String>,
    #[serde(default)]
    pub password: Option<String>,
    #[serde(default)]
    pub derive_metadata_if_missing: Option<bool>,
}

impl HostRepository {
    pub fn new(name: impl Into<String>, url: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            url: url.into(),
            releases: None,
            snapshots: None,
            known_to_exist: false,
            username: None,
            password: None,
            derive_metadata_if_missing: None,
        }
    }
}

impl fmt::Debug for HostRepository {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("HostRepository")
            .field("name", &self.name)
            .field("url", &self.url)
            .field("username", &self.username)
            .field("password", &self.password.as_ref().map(|_| "<redacted>"))
            .finish_non_exhaustive()
    }
}

/// A resolved node as the host holds it.
///
/// Children are reference counted: the host may hang the same sub-tree under several parents.
/// Since a node can only point at nodes that existed before it, the structure is acyclic.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HostResolvedDependency {
    #[serde(default)]
    pub repository: Option<Arc<HostRepository>>,
    pub group: String,
    pub name: String,
    pub version: String,
    #[serde(default)]
    pub dated_snapshot_version: Option<String>,
    pub requested: HostDependency,
    #[serde(default)]
    pub children: Vec<Arc<HostResolvedDependency>>,
    #[serde(default)]
    pub depth: u32,
}

// Unshared children are dismantled iteratively so long chains do not exhaust the stack.
impl Drop for HostResolvedDependency {
    fn drop(&mut self) {
        let mut pending = std::mem::take(&mut self.children);
        while let Some(child) = pending.pop() {
            if let Ok(mut node) = Arc::try_unwrap(child) {
                pending.append(&mut node.children);
            }
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HostPlugin {
    pub implementation_class: String,
    #[serde(default)]
    pub id: Option<String>,
}

/// Identity and capability flags of one host configuration.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HostConfiguration {
    pub name: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default = "enabled")]
    pub transitive: bool,
    #[serde(default = "enabled")]
    pub can_be_consumed: bool,
    #[serde(default = "enabled")]
    pub can_be_resolved: bool,
    /// Names of the configurations this one extends, in declaration order.
    #[serde(default)]
    pub extends_from: Vec<String>,
}

fn enabled() -> bool {
    true
}

impl HostConfiguration {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            description: None,
            transitive: true,
            can_be_consumed: true,
            can_be_resolved: true,
            extends_from: Vec::new(),
        }
    }

    pub fn extending<I, S>(mut self, parents: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.extends_from = parents.into_iter().map(Into::into).collect();
        self
    }
}

pub trait ConfigurationSetProvider {
    /// Every configuration of the project, in host order.
    fn configurations(&self) -> Vec<HostConfiguration>;
}

pub trait DependencyProvider {
    /// Dependencies declared directly in `configuration`.
    fn requested_dependencies(&self, configuration: &str) -> Vec<HostDependency>;
}

pub trait ResolutionProvider {
    /// Resolved trees of `configuration`, one per direct dependency.
    ///
    /// `Ok(vec![])` means "not resolved yet" and is not an error.
    fn resolved_dependencies(
        &self,
        configuration: &str,
    ) -> Result<Vec<Arc<HostResolvedDependency>>, ResolutionError>;
}

pub trait RepositoryProvider {
    fn maven_repositories(&self) -> Vec<HostRepository>;
    fn maven_plugin_repositories(&self) -> Vec<HostRepository>;
}

pub trait PluginProvider {
    fn plugins(&self) -> Vec<HostPlugin>;
}

/// Everything the snapshot projection reads from a host project.
pub trait HostProject:
    ConfigurationSetProvider + DependencyProvider + ResolutionProvider + RepositoryProvider + PluginProvider
{
    fn instance_id(&self) -> ProjectInstanceId;
    fn identity(&self) -> ProjectIdentity;
}

/// Locations and runtime facts of a host project.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct HostEnvironment {
    pub gradle_version: String,
    pub runtime_version: Option<String>,
    pub vm_vendor: Option<String>,
    pub is_root_project: bool,
    pub project_dir: PathBuf,
    pub root_project_dir: PathBuf,
    pub build_dir: PathBuf,
    pub buildscript_file: Option<PathBuf>,
    pub settings_buildscript_file: Option<PathBuf>,
}

#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HostJavaCompile {
    #[serde(default)]
    pub source_compatibility: Option<String>,
    #[serde(default)]
    pub target_compatibility: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HostSourceSet {
    pub name: String,
    #[serde(default)]
    pub all_source: Vec<PathBuf>,
    #[serde(default)]
    pub resource_dirs: Vec<PathBuf>,
    #[serde(default)]
    pub all_java: Vec<PathBuf>,
    #[serde(default)]
    pub classes_dirs: Vec<PathBuf>,
    #[serde(default)]
    pub compile_classpath: Vec<PathBuf>,
    pub implementation_configuration_name: String,
    /// Compile task settings; absent when the host registered no compile task for the set.
    #[serde(default)]
    pub java_compile: Option<HostJavaCompile>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HostKotlinSourceSet {
    pub name: String,
    #[serde(default)]
    pub kotlin: Vec<PathBuf>,
    pub implementation_configuration_name: String,
    pub compile_only_configuration_name: String,
}

/// A resolvable configuration the collector asks the host to create on the fly.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct SyntheticConfiguration {
    pub name: String,
    pub extends: String,
}

/// A registered build extension, probed for optional capabilities.
pub trait HostExtension: Send + Sync {
    fn type_name(&self) -> &str;

    fn as_multiplatform(&self) -> Option<&dyn MultiplatformExtension> {
        None
    }
}

pub trait MultiplatformExtension {
    fn source_set_names(&self) -> Result<Vec<String>, ProbeError>;
    fn source_set(&self, name: &str) -> Result<HostKotlinSourceSet, ProbeError>;
}

/// The build-side surface of a host project: environment, source sets and classpaths.
pub trait HostBuild: HostProject + Send + Sync {
    fn environment(&self) -> HostEnvironment;

    /// Source sets of the Java plugin; `None` when the plugin is not applied.
    fn java_source_sets(&self) -> Option<Vec<HostSourceSet>>;

    /// Creates `configuration` unless a configuration with that name already exists, then
    /// resolves it to files.
    fn resolve_synthetic(
        &self,
        configuration: &SyntheticConfiguration,
    ) -> Result<Vec<PathBuf>, ResolutionError>;

    fn has_plugin(&self, id: &str) -> bool;

    fn find_extension(&self, name: &str) -> Option<&dyn HostExtension>;

    fn buildscript_classpath(&self) -> Result<Vec<PathBuf>, ResolutionError>;

    fn settings_classpath(&self) -> Result<Vec<PathBuf>, ResolutionError>;

    fn subprojects(&self) -> Vec<Arc<dyn HostBuild>>;
}
