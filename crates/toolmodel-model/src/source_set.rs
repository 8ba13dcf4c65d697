use std::path::PathBuf;

use serde::{Deserialize, Serialize};

/// Java toolchain and language-level details of a source set.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct JavaVersionInfo {
    /// Runtime version of the JVM that ran the build.
    #[serde(default)]
    pub created_by: Option<String>,
    #[serde(default)]
    pub vm_vendor: Option<String>,
    #[serde(default)]
    pub source_compatibility: Option<String>,
    #[serde(default)]
    pub target_compatibility: Option<String>,
}

/// Files and classpaths of one JVM source set (`main`, `test`, ...).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SourceSetInfo {
    pub name: String,
    /// Every source file of the set, all languages included.
    #[serde(default)]
    pub sources: Vec<PathBuf>,
    /// Resource source directories.
    #[serde(default)]
    pub source_directories: Vec<PathBuf>,
    #[serde(default)]
    pub java: Vec<PathBuf>,
    #[serde(default)]
    pub classes_dirs: Vec<PathBuf>,
    #[serde(default)]
    pub compile_classpath: Vec<PathBuf>,
    /// Files of the implementation scope, transitive dependencies included.
    ///
    /// Empty when the implementation scope could not be resolved.
    #[serde(default)]
    pub implementation_classpath: Vec<PathBuf>,
    #[serde(default)]
    pub java_version: Option<JavaVersionInfo>,
}

/// A Kotlin multi-platform source set (`commonMain`, `jvmTest`, ...).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct KotlinSourceSetInfo {
    pub name: String,
    #[serde(default)]
    pub kotlin: Vec<PathBuf>,
    #[serde(default)]
    pub compile_classpath: Vec<PathBuf>,
    #[serde(default)]
    pub implementation_classpath: Vec<PathBuf>,
}
