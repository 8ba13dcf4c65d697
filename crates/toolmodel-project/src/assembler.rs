use std::collections::HashMap;
use std::sync::Arc;

use once_cell::sync::{Lazy, OnceCell};
use parking_lot::Mutex;
use toolmodel_config::ProjectionConfig;
use toolmodel_model::{GradlePluginDescriptor, MavenRepository, ProjectSnapshot};

use crate::error::ProjectionError;
use crate::host::{HostProject, ProjectInstanceId};
use crate::projector::ConfigurationGraphProjector;

type Slot = Arc<OnceCell<Arc<ProjectSnapshot>>>;

/// Snapshots keyed by host project instance.
///
/// Each instance gets its own once-cell, so concurrent callers asking for the same instance
/// build the snapshot at most once while callers for other instances are not blocked. A failed
/// build leaves the slot empty and the next caller retries.
#[derive(Debug, Default)]
pub struct SnapshotCache {
    slots: Mutex<HashMap<ProjectInstanceId, Slot>>,
}

static GLOBAL_CACHE: Lazy<Arc<SnapshotCache>> = Lazy::new(|| Arc::new(SnapshotCache::new()));

impl SnapshotCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// Process-wide cache shared by assemblers built with [`ProjectSnapshotAssembler::global`].
    pub fn global() -> Arc<SnapshotCache> {
        Arc::clone(&GLOBAL_CACHE)
    }

    pub fn get(&self, id: ProjectInstanceId) -> Option<Arc<ProjectSnapshot>> {
        let slot = self.slots.lock().get(&id).cloned()?;
        slot.get().cloned()
    }

    pub fn get_or_try_insert_with<E>(
        &self,
        id: ProjectInstanceId,
        build: impl FnOnce() -> Result<ProjectSnapshot, E>,
    ) -> Result<Arc<ProjectSnapshot>, E> {
        // The map lock only guards slot lookup; building happens outside of it.
        let slot = Arc::clone(self.slots.lock().entry(id).or_default());
        slot.get_or_try_init(|| build().map(Arc::new)).cloned()
    }

    /// Number of instances with a built snapshot.
    pub fn len(&self) -> usize {
        self.slots
            .lock()
            .values()
            .filter(|slot| slot.get().is_some())
            .count()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// Builds [`ProjectSnapshot`]s from host projects and caches them per instance.
#[derive(Debug, Clone)]
pub struct ProjectSnapshotAssembler {
    config: ProjectionConfig,
    cache: Arc<SnapshotCache>,
}

impl Default for ProjectSnapshotAssembler {
    fn default() -> Self {
        Self::new(ProjectionConfig::default())
    }
}

impl ProjectSnapshotAssembler {
    /// An assembler with a private cache.
    pub fn new(config: ProjectionConfig) -> Self {
        Self::with_cache(config, Arc::new(SnapshotCache::new()))
    }

    pub fn with_cache(config: ProjectionConfig, cache: Arc<SnapshotCache>) -> Self {
        Self { config, cache }
    }

    pub fn global(config: ProjectionConfig) -> Self {
        Self::with_cache(config, SnapshotCache::global())
    }

    pub fn config(&self) -> &ProjectionConfig {
        &self.config
    }

    pub fn cache(&self) -> &Arc<SnapshotCache> {
        &self.cache
    }

    /// Runs the projection without consulting or filling the cache.
    pub fn assemble<H: HostProject + ?Sized>(
        &self,
        host: &H,
    ) -> Result<ProjectSnapshot, ProjectionError> {
        let identity = host.identity();
        let _span = tracing::debug_span!(
            target: "toolmodel.project",
            "assemble_snapshot",
            project = %identity.path
        )
        .entered();

        let projector = ConfigurationGraphProjector::new(self.config.structural_policy);
        let inputs = projector.collect(host);
        let name_to_configuration = projector.project(&identity.path, &inputs)?;

        let snapshot = ProjectSnapshot {
            name: identity.name,
            path: identity.path,
            group: identity.group,
            version: identity.version,
            plugins: host
                .plugins()
                .iter()
                .map(GradlePluginDescriptor::from)
                .collect(),
            maven_repositories: host
                .maven_repositories()
                .iter()
                .map(MavenRepository::from)
                .collect(),
            maven_plugin_repositories: host
                .maven_plugin_repositories()
                .iter()
                .map(MavenRepository::from)
                .collect(),
            name_to_configuration,
        };

        tracing::debug!(
            target: "toolmodel.project",
            project = %snapshot.path,
            configurations = snapshot.name_to_configuration.len(),
            "assembled project snapshot"
        );
        Ok(snapshot)
    }

    /// Returns the snapshot of `host`, building it on first request for this instance.
    pub fn snapshot<H: HostProject + ?Sized>(
        &self,
        host: &H,
    ) -> Result<Arc<ProjectSnapshot>, ProjectionError> {
        let id = host.instance_id();
        if let Some(cached) = self.cache.get(id) {
            tracing::trace!(target: "toolmodel.project", instance = %id, "snapshot cache hit");
            return Ok(cached);
        }
        self.cache.get_or_try_insert_with(id, || self.assemble(host))
    }
}
