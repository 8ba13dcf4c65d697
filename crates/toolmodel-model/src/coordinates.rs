use std::fmt;

use serde::{Deserialize, Serialize};

/// Identity coordinate of an artifact, without a version.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GroupArtifact {
    pub group_id: String,
    pub artifact_id: String,
}

impl GroupArtifact {
    pub fn new(group_id: impl Into<String>, artifact_id: impl Into<String>) -> Self {
        Self {
            group_id: group_id.into(),
            artifact_id: artifact_id.into(),
        }
    }
}

impl fmt::Display for GroupArtifact {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.group_id, self.artifact_id)
    }
}

/// A requested coordinate (`group:artifact:version`).
///
/// The version is the *requested* one and may be a range or a dynamic selector; it is copied
/// verbatim from the build model.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GroupArtifactVersion {
    pub group_id: String,
    pub artifact_id: String,
    pub version: String,
}

impl GroupArtifactVersion {
    pub fn new(
        group_id: impl Into<String>,
        artifact_id: impl Into<String>,
        version: impl Into<String>,
    ) -> Self {
        Self {
            group_id: group_id.into(),
            artifact_id: artifact_id.into(),
            version: version.into(),
        }
    }

    pub fn group_artifact(&self) -> GroupArtifact {
        GroupArtifact::new(self.group_id.clone(), self.artifact_id.clone())
    }
}

impl fmt::Display for GroupArtifactVersion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}:{}", self.group_id, self.artifact_id, self.version)
    }
}

/// The coordinate a dependency actually resolved to.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ResolvedGroupArtifactVersion {
    pub group_id: String,
    pub artifact_id: String,
    pub version: String,
    /// Timestamped qualifier of a snapshot resolution (e.g. `1.0-20240101.120000-3`).
    ///
    /// Only present when `version` is a `-SNAPSHOT` that resolved to a dated build.
    #[serde(default)]
    pub dated_snapshot_version: Option<String>,
}

impl ResolvedGroupArtifactVersion {
    pub fn new(
        group_id: impl Into<String>,
        artifact_id: impl Into<String>,
        version: impl Into<String>,
    ) -> Self {
        Self {
            group_id: group_id.into(),
            artifact_id: artifact_id.into(),
            version: version.into(),
            dated_snapshot_version: None,
        }
    }

    pub fn with_dated_snapshot_version(mut self, dated: impl Into<String>) -> Self {
        self.dated_snapshot_version = Some(dated.into());
        self
    }

    pub fn group_artifact(&self) -> GroupArtifact {
        GroupArtifact::new(self.group_id.clone(), self.artifact_id.clone())
    }

    /// Version string used to locate the artifact: the dated snapshot version when present.
    pub fn effective_version(&self) -> &str {
        self.dated_snapshot_version
            .as_deref()
            .unwrap_or(&self.version)
    }
}

impl fmt::Display for ResolvedGroupArtifactVersion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}:{}", self.group_id, self.artifact_id, self.version)?;
        if let Some(dated) = &self.dated_snapshot_version {
            write!(f, " ({dated})")?;
        }
        Ok(())
    }
}
