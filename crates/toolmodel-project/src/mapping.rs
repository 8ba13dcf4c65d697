//! Host record -> snapshot value conversions.
//!
//! The `map_*` functions take and return `Option`s so callers holding possibly-missing host data
//! can forward the absence unchanged.

use toolmodel_model::{
    Dependency, GradlePluginDescriptor, GroupArtifact, GroupArtifactVersion, MavenRepository,
    ResolvedDependency, ResolvedGroupArtifactVersion,
};

use crate::host::{HostDependency, HostExclusion, HostPlugin, HostRepository, HostResolvedDependency};

impl From<&HostExclusion> for GroupArtifact {
    fn from(exclusion: &HostExclusion) -> Self {
        GroupArtifact::new(exclusion.group.clone(), exclusion.module.clone())
    }
}

impl From<&HostDependency> for Dependency {
    fn from(dep: &HostDependency) -> Self {
        Dependency {
            gav: GroupArtifactVersion::new(dep.group.clone(), dep.name.clone(), dep.version.clone()),
            classifier: dep.classifier.clone(),
            type_: dep.artifact_type.clone(),
            scope: dep.scope.clone(),
            exclusions: dep.exclusions.iter().map(GroupArtifact::from).collect(),
            optional: dep.optional.clone(),
        }
    }
}

impl From<&HostRepository> for MavenRepository {
    fn from(repo: &HostRepository) -> Self {
        MavenRepository {
            id: repo.name.clone(),
            uri: repo.url.clone(),
            releases: repo.releases.clone(),
            snapshots: repo.snapshots.clone(),
            known_to_exist: repo.known_to_exist,
            username: repo.username.clone(),
            password: repo.password.clone(),
            derive_metadata_if_missing: repo.derive_metadata_if_missing,
        }
    }
}

impl From<&HostPlugin> for GradlePluginDescriptor {
    fn from(plugin: &HostPlugin) -> Self {
        GradlePluginDescriptor {
            fully_qualified_class_name: plugin.implementation_class.clone(),
            id: plugin.id.clone(),
        }
    }
}

impl From<&HostResolvedDependency> for ResolvedDependency {
    fn from(root: &HostResolvedDependency) -> Self {
        map_resolved_tree(root)
    }
}

pub fn map_group_artifact(exclusion: Option<&HostExclusion>) -> Option<GroupArtifact> {
    exclusion.map(GroupArtifact::from)
}

pub fn map_dependency(dep: Option<&HostDependency>) -> Option<Dependency> {
    dep.map(Dependency::from)
}

pub fn map_repository(repo: Option<&HostRepository>) -> Option<MavenRepository> {
    repo.map(MavenRepository::from)
}

pub fn map_plugin(plugin: Option<&HostPlugin>) -> Option<GradlePluginDescriptor> {
    plugin.map(GradlePluginDescriptor::from)
}

pub fn map_resolved_dependency(
    resolved: Option<&HostResolvedDependency>,
) -> Option<ResolvedDependency> {
    resolved.map(map_resolved_tree)
}

/// Maps one host node without its children.
fn map_resolved_node(node: &HostResolvedDependency) -> ResolvedDependency {
    let mut gav =
        ResolvedGroupArtifactVersion::new(node.group.clone(), node.name.clone(), node.version.clone());
    gav.dated_snapshot_version = node.dated_snapshot_version.clone();

    ResolvedDependency {
        repository: map_repository(node.repository.as_deref()),
        gav,
        requested: Dependency::from(&node.requested),
        dependencies: Vec::with_capacity(node.children.len()),
        depth: node.depth,
    }
}

struct Frame<'a> {
    host: &'a HostResolvedDependency,
    next_child: usize,
    mapped: ResolvedDependency,
}

impl<'a> Frame<'a> {
    fn new(host: &'a HostResolvedDependency) -> Self {
        Self {
            host,
            next_child: 0,
            mapped: map_resolved_node(host),
        }
    }
}

/// Post-order copy of a host tree using an explicit stack; depth is bounded only by memory.
///
/// Shared host sub-trees are copied once per occurrence.
fn map_resolved_tree(root: &HostResolvedDependency) -> ResolvedDependency {
    let mut root_frame = Frame::new(root);
    let mut stack: Vec<Frame<'_>> = Vec::new();

    loop {
        let top = stack.last_mut().unwrap_or(&mut root_frame);
        let host = top.host;
        if let Some(child) = host.children.get(top.next_child) {
            top.next_child += 1;
            stack.push(Frame::new(child));
            continue;
        }

        match stack.pop() {
            Some(done) => stack
                .last_mut()
                .unwrap_or(&mut root_frame)
                .mapped
                .dependencies
                .push(done.mapped),
            None => return root_frame.mapped,
        }
    }
}
