use std::fmt;

use serde::{Deserialize, Serialize};

/// A Maven-layout repository a dependency can be downloaded from.
#[derive(Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MavenRepository {
    pub id: String,
    pub uri: String,
    /// Release update policy (e.g. `daily`, `never`), if declared.
    #[serde(default)]
    pub releases: Option<String>,
    /// Snapshot update policy, if declared.
    #[serde(default)]
    pub snapshots: Option<String>,
    /// Whether the repository was already confirmed reachable, so consumers can skip probing it.
    #[serde(default)]
    pub known_to_exist: bool,
    #[serde(default)]
    pub username: Option<String>,
    #[serde(default)]
    pub password: Option<String>,
    #[serde(default)]
    pub derive_metadata_if_missing: Option<bool>,
}

impl MavenRepository {
    pub fn new(id: impl Into<String>, uri: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            uri: uri.into(),
            releases: None,
            snapshots: None,
            known_to_exist: false,
            username: None,
            password: None,
            derive_metadata_if_missing: None,
        }
    }

    pub fn has_credentials(&self) -> bool {
        self.username.is_some() || self.password.is_some()
    }
}

// Hand-written so credentials never end up in logs.
impl fmt::Debug for MavenRepository {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("MavenRepository")
            .field("id", &self.id)
            .field("uri", &self.uri)
            .field("releases", &self.releases)
            .field("snapshots", &self.snapshots)
            .field("known_to_exist", &self.known_to_exist)
            .field("username", &self.username)
            .field("password", &self.password.as_ref().map(|_| "<redacted>"))
            .field(
                "derive_metadata_if_missing",
                &self.derive_metadata_if_missing,
            )
            .finish()
    }
}

/// A plugin applied to the project.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GradlePluginDescriptor {
    pub fully_qualified_class_name: String,
    /// Plugin id (`java-library`, `org.jetbrains.kotlin.jvm`, ...). Absent for plugins applied by
    /// class rather than by id.
    #[serde(default)]
    pub id: Option<String>,
}
