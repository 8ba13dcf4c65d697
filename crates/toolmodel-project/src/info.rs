use std::path::PathBuf;
use std::sync::Arc;

use toolmodel_model::{
    GradleVersion, KotlinSourceSetInfo, ProjectSnapshot, ProjectSnapshotFile, SourceSetInfo,
};

use crate::assembler::ProjectSnapshotAssembler;
use crate::error::ProjectionError;
use crate::host::{HostBuild, HostEnvironment};
use crate::source_sets::SourceSetCollector;

/// Read-only view of one host project, as handed to tooling.
///
/// Subprojects share the assembler (and therefore its snapshot cache) with their parent.
#[derive(Clone)]
pub struct ProjectInfo {
    host: Arc<dyn HostBuild>,
    assembler: ProjectSnapshotAssembler,
}

impl std::fmt::Debug for ProjectInfo {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ProjectInfo")
            .field("instance", &self.host.instance_id())
            .field("path", &self.host.identity().path)
            .finish_non_exhaustive()
    }
}

impl ProjectInfo {
    pub fn new(host: Arc<dyn HostBuild>, assembler: ProjectSnapshotAssembler) -> Self {
        Self { host, assembler }
    }

    pub fn host(&self) -> &Arc<dyn HostBuild> {
        &self.host
    }

    pub fn assembler(&self) -> &ProjectSnapshotAssembler {
        &self.assembler
    }

    pub fn path(&self) -> String {
        self.host.identity().path
    }

    pub fn environment(&self) -> HostEnvironment {
        self.host.environment()
    }

    /// Version string reported by the build tool, unparsed.
    pub fn gradle_version(&self) -> String {
        self.host.environment().gradle_version
    }

    pub fn is_root_project(&self) -> bool {
        self.host.environment().is_root_project
    }

    pub fn project_dir(&self) -> PathBuf {
        self.host.environment().project_dir
    }

    pub fn root_project_dir(&self) -> PathBuf {
        self.host.environment().root_project_dir
    }

    pub fn build_dir(&self) -> PathBuf {
        self.host.environment().build_dir
    }

    pub fn buildscript_file(&self) -> Option<PathBuf> {
        self.host.environment().buildscript_file
    }

    pub fn settings_buildscript_file(&self) -> Option<PathBuf> {
        self.host.environment().settings_buildscript_file
    }

    pub fn subprojects(&self) -> Vec<ProjectInfo> {
        self.host
            .subprojects()
            .into_iter()
            .map(|host| ProjectInfo::new(host, self.assembler.clone()))
            .collect()
    }

    fn collector(&self) -> SourceSetCollector<'_, dyn HostBuild> {
        SourceSetCollector::new(self.host.as_ref(), self.assembler.config())
    }

    pub fn source_sets(&self) -> Vec<SourceSetInfo> {
        self.collector().java_source_sets()
    }

    pub fn is_multiplatform_kotlin_project(&self) -> bool {
        self.collector().is_multiplatform_kotlin_project()
    }

    pub fn kotlin_source_sets(&self) -> Vec<KotlinSourceSetInfo> {
        self.collector().kotlin_source_sets()
    }

    pub fn buildscript_classpath(&self) -> Vec<PathBuf> {
        match self.host.buildscript_classpath() {
            Ok(files) => files,
            Err(err) => {
                tracing::warn!(
                    target: "toolmodel.project",
                    project = %self.path(),
                    configuration = "classpath",
                    error = %err,
                    "failed to resolve build script classpath"
                );
                Vec::new()
            }
        }
    }

    /// Classpath of the settings script.
    ///
    /// Empty when the build tool is older than the configured minimum version (or reports a
    /// version that cannot be parsed), and when resolution fails.
    pub fn settings_classpath(&self) -> Vec<PathBuf> {
        let reported = self.gradle_version();
        let minimum = &self.assembler.config().settings_classpath_min_gradle_version;
        match GradleVersion::parse(&reported) {
            Ok(version) if version >= *minimum => {}
            Ok(version) => {
                tracing::debug!(
                    target: "toolmodel.project",
                    project = %self.path(),
                    version = %version,
                    minimum = %minimum,
                    "build tool too old for a settings classpath"
                );
                return Vec::new();
            }
            Err(err) => {
                tracing::warn!(
                    target: "toolmodel.project",
                    project = %self.path(),
                    error = %err,
                    "cannot tell whether the settings classpath is available"
                );
                return Vec::new();
            }
        }

        match self.host.settings_classpath() {
            Ok(files) => files,
            Err(err) => {
                tracing::warn!(
                    target: "toolmodel.project",
                    project = %self.path(),
                    configuration = "classpath",
                    error = %err,
                    "failed to resolve settings classpath"
                );
                Vec::new()
            }
        }
    }

    /// The cached dependency-model snapshot of this project.
    pub fn snapshot(&self) -> Result<Arc<ProjectSnapshot>, ProjectionError> {
        self.assembler.snapshot(self.host.as_ref())
    }

    /// Snapshot wrapped for another process, optionally with source sets.
    ///
    /// The envelope shares the cached snapshot.
    pub fn snapshot_file(&self, with_source_sets: bool) -> Result<ProjectSnapshotFile, ProjectionError> {
        let mut file = ProjectSnapshotFile::new(self.snapshot()?);
        if with_source_sets {
            file.source_sets = self.source_sets();
            if self.is_multiplatform_kotlin_project() {
                file.kotlin_source_sets = self.kotlin_source_sets();
            }
        }
        Ok(file)
    }
}
