//! Source-set and classpath collection.
//!
//! Everything here is supplementary data: any failure degrades to an empty result and a warning
//! naming the project and the source set or configuration involved.

use std::path::PathBuf;

use toolmodel_config::ProjectionConfig;
use toolmodel_model::{JavaVersionInfo, KotlinSourceSetInfo, SourceSetInfo};

use crate::error::{ProbeError, ResolutionError};
use crate::host::{HostBuild, HostSourceSet, MultiplatformExtension, SyntheticConfiguration};

/// Name under which the Kotlin plugin registers its extension.
pub const KOTLIN_EXTENSION: &str = "kotlin";

/// Plugin id of the Kotlin multi-platform plugin.
pub const KOTLIN_MULTIPLATFORM_PLUGIN_ID: &str = "org.jetbrains.kotlin.multiplatform";

pub struct SourceSetCollector<'a, H: ?Sized> {
    host: &'a H,
    config: &'a ProjectionConfig,
}

impl<'a, H: HostBuild + ?Sized> SourceSetCollector<'a, H> {
    pub fn new(host: &'a H, config: &'a ProjectionConfig) -> Self {
        Self { host, config }
    }

    fn project_path(&self) -> String {
        self.host.identity().path
    }

    /// Resolves a synthetic configuration extending `base`, creating it if needed.
    fn resolve_extending(&self, base: &str) -> Result<Vec<PathBuf>, ResolutionError> {
        let synthetic = SyntheticConfiguration {
            name: self.config.synthetic_configuration_name(base),
            extends: base.to_string(),
        };
        self.host.resolve_synthetic(&synthetic)
    }

    fn implementation_classpath(&self, configuration: &str) -> Vec<PathBuf> {
        match self.resolve_extending(configuration) {
            Ok(files) => files,
            Err(err) => {
                tracing::warn!(
                    target: "toolmodel.project",
                    project = %self.project_path(),
                    configuration = %configuration,
                    error = %err,
                    "failed to resolve dependencies; some type information may be incomplete"
                );
                Vec::new()
            }
        }
    }

    /// Source sets of the Java plugin; empty when the plugin is not applied.
    pub fn java_source_sets(&self) -> Vec<SourceSetInfo> {
        let Some(source_sets) = self.host.java_source_sets() else {
            tracing::debug!(
                target: "toolmodel.project",
                project = %self.project_path(),
                "java plugin not applied; no source sets"
            );
            return Vec::new();
        };

        let environment = self.host.environment();
        source_sets
            .into_iter()
            .map(|source_set| {
                let implementation_classpath =
                    self.implementation_classpath(&source_set.implementation_configuration_name);
                let java_version = source_set.java_compile.as_ref().map(|compile| JavaVersionInfo {
                    created_by: environment.runtime_version.clone(),
                    vm_vendor: environment.vm_vendor.clone(),
                    source_compatibility: compile.source_compatibility.clone(),
                    target_compatibility: compile.target_compatibility.clone(),
                });
                let HostSourceSet {
                    name,
                    all_source,
                    resource_dirs,
                    all_java,
                    classes_dirs,
                    compile_classpath,
                    ..
                } = source_set;

                SourceSetInfo {
                    name,
                    sources: all_source,
                    source_directories: resource_dirs,
                    java: all_java,
                    classes_dirs,
                    compile_classpath,
                    implementation_classpath,
                    java_version,
                }
            })
            .collect()
    }

    /// The multi-platform capability of the `kotlin` extension, if it has one.
    fn multiplatform(&self) -> Option<&'a dyn MultiplatformExtension> {
        self.host
            .find_extension(KOTLIN_EXTENSION)?
            .as_multiplatform()
    }

    pub fn is_multiplatform_kotlin_project(&self) -> bool {
        self.host.has_plugin(KOTLIN_MULTIPLATFORM_PLUGIN_ID) || self.multiplatform().is_some()
    }

    /// Source sets of the Kotlin multi-platform extension, sorted by name.
    ///
    /// Returns an empty list when the extension or its capability is missing or cannot be
    /// enumerated; individual source sets that fail are skipped.
    pub fn kotlin_source_sets(&self) -> Vec<KotlinSourceSetInfo> {
        let project = self.project_path();
        let Some(extension) = self.multiplatform() else {
            tracing::warn!(
                target: "toolmodel.project",
                project = %project,
                "kotlin multi-platform extension not found; no Kotlin source sets collected"
            );
            return Vec::new();
        };

        let mut names = match extension.source_set_names() {
            Ok(names) => names,
            Err(err) => {
                tracing::warn!(
                    target: "toolmodel.project",
                    project = %project,
                    error = %err,
                    "failed to list Kotlin source sets; no Kotlin source sets collected"
                );
                return Vec::new();
            }
        };
        names.sort();
        names.dedup();

        names
            .into_iter()
            .filter_map(|name| match self.kotlin_source_set(extension, &name) {
                Ok(info) => Some(info),
                Err(err) => {
                    tracing::warn!(
                        target: "toolmodel.project",
                        project = %project,
                        source_set = %name,
                        error = %err,
                        "failed to collect Kotlin source set; some type information may be incomplete"
                    );
                    None
                }
            })
            .collect()
    }

    fn kotlin_source_set(
        &self,
        extension: &dyn MultiplatformExtension,
        name: &str,
    ) -> Result<KotlinSourceSetInfo, KotlinSourceSetError> {
        let source_set = extension.source_set(name)?;
        let implementation_classpath =
            self.implementation_classpath(&source_set.implementation_configuration_name);
        let compile_classpath =
            self.resolve_extending(&source_set.compile_only_configuration_name)?;

        Ok(KotlinSourceSetInfo {
            name: name.to_string(),
            kotlin: source_set.kotlin,
            compile_classpath,
            implementation_classpath,
        })
    }
}

#[derive(Debug, thiserror::Error)]
enum KotlinSourceSetError {
    #[error(transparent)]
    Probe(#[from] ProbeError),
    #[error(transparent)]
    Resolution(#[from] ResolutionError),
}
