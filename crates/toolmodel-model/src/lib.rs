//! Serializable value types describing a build project's dependency model.
//!
//! Everything in this crate is a plain value: no handles back into the build tool, so a
//! [`ProjectSnapshot`] can be written to disk or sent to another process and read back with
//! [`read_snapshot_file`] / [`decode`].

mod configuration;
mod coordinates;
mod dependency;
mod gradle_version;
mod project;
mod repository;
mod snapshot_file;
mod source_set;

pub use configuration::DependencyConfiguration;
pub use coordinates::{GroupArtifact, GroupArtifactVersion, ResolvedGroupArtifactVersion};
pub use dependency::{Dependency, ResolvedDependency, Walk};
pub use gradle_version::{GradleVersion, GradleVersionError};
pub use project::{DanglingLink, ProjectSnapshot};
pub use repository::{GradlePluginDescriptor, MavenRepository};
pub use snapshot_file::{
    decode, encode, read_snapshot_file, write_snapshot_file, CodecError, ProjectSnapshotFile,
    SnapshotFormat, PROJECT_SNAPSHOT_FILE_NAME, PROJECT_SNAPSHOT_SCHEMA_VERSION,
};
pub use source_set::{JavaVersionInfo, KotlinSourceSetInfo, SourceSetInfo};
