//! Projection of a live build project model into an immutable [`ProjectSnapshot`].
//!
//! A build tool exposes its model through the collaborator traits in [`host`]. The
//! [`ProjectSnapshotAssembler`] maps every host record into its value counterpart, re-links the
//! configuration `extends_from` relation by name, and caches the result per project instance.
//! [`ProjectInfo`] wraps a host with the build-side extras (source sets, classpaths, directories)
//! tooling usually asks for alongside the snapshot.
//!
//! [`ProjectSnapshot`]: toolmodel_model::ProjectSnapshot

mod assembler;
mod error;
pub mod host;
mod info;
pub mod mapping;
mod projector;
mod source_sets;
mod static_host;

pub use assembler::{ProjectSnapshotAssembler, SnapshotCache};
pub use error::{ProbeError, ProjectionError, ResolutionError};
pub use info::ProjectInfo;
pub use projector::{ConfigurationGraphProjector, ConfigurationInput};
pub use source_sets::{SourceSetCollector, KOTLIN_EXTENSION, KOTLIN_MULTIPLATFORM_PLUGIN_ID};
pub use static_host::{
    StaticClasspath, StaticConfiguration, StaticHostError, StaticHostProject,
    StaticKotlinExtension, StaticProjectDescription,
};
