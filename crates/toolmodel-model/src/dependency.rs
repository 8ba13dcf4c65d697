use serde::ser::SerializeStruct;
use serde::{Deserialize, Deserializer, Serialize, Serializer};

use crate::{GroupArtifact, GroupArtifactVersion, MavenRepository, ResolvedGroupArtifactVersion};

/// A requested (unresolved) dependency edge, as declared in a configuration.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Dependency {
    pub gav: GroupArtifactVersion,
    #[serde(default)]
    pub classifier: Option<String>,
    #[serde(default, rename = "type")]
    pub type_: Option<String>,
    pub scope: String,
    /// Exclusions in declaration order.
    #[serde(default)]
    pub exclusions: Vec<GroupArtifact>,
    /// Maven-style `optional` marker; kept as text because builds may set it to a property
    /// reference.
    #[serde(default)]
    pub optional: Option<String>,
}

impl Dependency {
    pub fn new(gav: GroupArtifactVersion, scope: impl Into<String>) -> Self {
        Self {
            gav,
            classifier: None,
            type_: None,
            scope: scope.into(),
            exclusions: Vec::new(),
            optional: None,
        }
    }

    pub fn excludes(&self, ga: &GroupArtifact) -> bool {
        self.exclusions.iter().any(|excluded| {
            (excluded.group_id == "*" || excluded.group_id == ga.group_id)
                && (excluded.artifact_id == "*" || excluded.artifact_id == ga.artifact_id)
        })
    }
}

/// A node of a resolved dependency tree.
///
/// The tree is owned top-down: `dependencies` holds this node's direct children, and a package
/// that appears under several parents is embedded once per occurrence.
///
/// Serialized as a nested struct with camelCase keys. Encoding and decoding recurse once per
/// tree level, and each level may move onto a fresh heap-allocated stack segment, so the depth a
/// codec can handle is bounded by memory rather than by the thread's stack.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedDependency {
    /// Repository the artifact was resolved from; absent for local/undeclared sources.
    pub repository: Option<MavenRepository>,
    pub gav: ResolvedGroupArtifactVersion,
    pub requested: Dependency,
    pub dependencies: Vec<ResolvedDependency>,
    /// Distance from the configuration root; `0` for direct dependencies.
    pub depth: u32,
}

/// Stack left before a tree level switches to a new segment.
const STACK_RED_ZONE: usize = 64 * 1024;
/// Size of each newly allocated stack segment.
const STACK_SEGMENT_SIZE: usize = 1024 * 1024;

impl Serialize for ResolvedDependency {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        stacker::maybe_grow(STACK_RED_ZONE, STACK_SEGMENT_SIZE, || {
            let mut state = serializer.serialize_struct("ResolvedDependency", 5)?;
            state.serialize_field("repository", &self.repository)?;
            state.serialize_field("gav", &self.gav)?;
            state.serialize_field("requested", &self.requested)?;
            state.serialize_field("dependencies", &self.dependencies)?;
            state.serialize_field("depth", &self.depth)?;
            state.end()
        })
    }
}

#[derive(Deserialize)]
#[serde(rename = "ResolvedDependency", rename_all = "camelCase")]
struct ResolvedDependencyFields {
    #[serde(default)]
    repository: Option<MavenRepository>,
    gav: ResolvedGroupArtifactVersion,
    requested: Dependency,
    #[serde(default)]
    dependencies: Vec<ResolvedDependency>,
    depth: u32,
}

impl<'de> Deserialize<'de> for ResolvedDependency {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        stacker::maybe_grow(STACK_RED_ZONE, STACK_SEGMENT_SIZE, || {
            let fields = ResolvedDependencyFields::deserialize(deserializer)?;
            Ok(ResolvedDependency {
                repository: fields.repository,
                gav: fields.gav,
                requested: fields.requested,
                dependencies: fields.dependencies,
                depth: fields.depth,
            })
        })
    }
}

impl ResolvedDependency {
    /// Iterates over this node and all of its descendants in pre-order.
    ///
    /// The traversal uses an explicit stack, so arbitrarily deep trees are fine.
    pub fn walk(&self) -> Walk<'_> {
        Walk { stack: vec![self] }
    }

    /// Number of nodes in the tree rooted at `self` (including `self`).
    pub fn node_count(&self) -> usize {
        self.walk().count()
    }

    /// Largest `depth` value found in the tree rooted at `self`.
    pub fn max_depth(&self) -> u32 {
        self.walk().map(|node| node.depth).max().unwrap_or(self.depth)
    }

    pub fn find(&self, ga: &GroupArtifact) -> Option<&ResolvedDependency> {
        self.walk().find(|node| {
            node.gav.group_id == ga.group_id && node.gav.artifact_id == ga.artifact_id
        })
    }
}

// The default drop glue recurses once per tree level; deep trees would overflow the stack.
impl Drop for ResolvedDependency {
    fn drop(&mut self) {
        let mut pending = std::mem::take(&mut self.dependencies);
        while let Some(mut node) = pending.pop() {
            pending.append(&mut node.dependencies);
        }
    }
}

/// Pre-order iterator returned by [`ResolvedDependency::walk`].
#[derive(Debug, Clone)]
pub struct Walk<'a> {
    stack: Vec<&'a ResolvedDependency>,
}

impl<'a> Iterator for Walk<'a> {
    type Item = &'a ResolvedDependency;

    fn next(&mut self) -> Option<Self::Item> {
        let node = self.stack.pop()?;
        self.stack.extend(node.dependencies.iter().rev());
        Some(node)
    }
}
