use std::path::{Path, PathBuf};
use std::sync::Arc;

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::{KotlinSourceSetInfo, ProjectSnapshot, SourceSetInfo};

/// Schema version of [`ProjectSnapshotFile`].
pub const PROJECT_SNAPSHOT_SCHEMA_VERSION: u32 = 1;

/// Conventional file name for a snapshot handed to another process.
pub const PROJECT_SNAPSHOT_FILE_NAME: &str = "toolmodel-snapshot.json";

/// Envelope written when a snapshot crosses a process boundary.
///
/// The project is shared rather than owned so a cached snapshot can be wrapped without copying
/// its resolved trees.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProjectSnapshotFile {
    pub schema_version: u32,
    pub project: Arc<ProjectSnapshot>,
    #[serde(default)]
    pub source_sets: Vec<SourceSetInfo>,
    #[serde(default)]
    pub kotlin_source_sets: Vec<KotlinSourceSetInfo>,
}

impl ProjectSnapshotFile {
    pub fn new(project: impl Into<Arc<ProjectSnapshot>>) -> Self {
        Self {
            schema_version: PROJECT_SNAPSHOT_SCHEMA_VERSION,
            project: project.into(),
            source_sets: Vec::new(),
            kotlin_source_sets: Vec::new(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SnapshotFormat {
    Json,
    Bincode,
}

impl SnapshotFormat {
    /// Guesses the encoding of `bytes`: JSON documents start with `{` (after whitespace).
    pub fn sniff(bytes: &[u8]) -> Self {
        match bytes.iter().find(|b| !b.is_ascii_whitespace()) {
            Some(b'{') => SnapshotFormat::Json,
            _ => SnapshotFormat::Bincode,
        }
    }
}

#[derive(Debug, Error)]
pub enum CodecError {
    #[error("failed to read snapshot file {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to write snapshot file {path}: {source}")]
    Write {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("invalid JSON snapshot: {0}")]
    Json(#[from] serde_json::Error),
    #[error("invalid binary snapshot: {0}")]
    Bincode(#[from] bincode::Error),
    #[error("unsupported snapshot schema version {found} (expected {expected})")]
    UnsupportedSchemaVersion { found: u32, expected: u32 },
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct SchemaProbe {
    schema_version: u32,
}

fn check_schema_version(found: u32) -> Result<(), CodecError> {
    if found == PROJECT_SNAPSHOT_SCHEMA_VERSION {
        Ok(())
    } else {
        Err(CodecError::UnsupportedSchemaVersion {
            found,
            expected: PROJECT_SNAPSHOT_SCHEMA_VERSION,
        })
    }
}

/// Encodes a snapshot file.
///
/// JSON is written compact: indentation grows with tree depth, which would make pretty output
/// quadratic in the depth of the resolved trees.
pub fn encode(file: &ProjectSnapshotFile, format: SnapshotFormat) -> Result<Vec<u8>, CodecError> {
    match format {
        SnapshotFormat::Json => Ok(serde_json::to_vec(file)?),
        SnapshotFormat::Bincode => Ok(bincode::serialize(file)?),
    }
}

/// Parses a JSON document without `serde_json`'s nesting limit; resolved trees may be arbitrarily
/// deep.
fn from_json_unbounded<T: DeserializeOwned>(bytes: &[u8]) -> Result<T, serde_json::Error> {
    let mut de = serde_json::Deserializer::from_slice(bytes);
    de.disable_recursion_limit();
    let value = T::deserialize(&mut de)?;
    de.end()?;
    Ok(value)
}

/// Decodes a snapshot file, rejecting envelopes written with another schema version.
pub fn decode(bytes: &[u8], format: SnapshotFormat) -> Result<ProjectSnapshotFile, CodecError> {
    match format {
        SnapshotFormat::Json => {
            let probe: SchemaProbe = from_json_unbounded(bytes)?;
            check_schema_version(probe.schema_version)?;
            Ok(from_json_unbounded(bytes)?)
        }
        SnapshotFormat::Bincode => {
            // `schema_version` is the first field, so it can be read on its own.
            let found: u32 = bincode::deserialize(bytes)?;
            check_schema_version(found)?;
            Ok(bincode::deserialize(bytes)?)
        }
    }
}

pub fn write_snapshot_file(
    path: &Path,
    file: &ProjectSnapshotFile,
    format: SnapshotFormat,
) -> Result<(), CodecError> {
    let bytes = encode(file, format)?;
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent).map_err(|source| CodecError::Write {
            path: path.to_path_buf(),
            source,
        })?;
    }
    std::fs::write(path, bytes).map_err(|source| CodecError::Write {
        path: path.to_path_buf(),
        source,
    })
}

/// Reads a snapshot file written in either format.
pub fn read_snapshot_file(path: &Path) -> Result<ProjectSnapshotFile, CodecError> {
    let bytes = std::fs::read(path).map_err(|source| CodecError::Read {
        path: path.to_path_buf(),
        source,
    })?;
    decode(&bytes, SnapshotFormat::sniff(&bytes))
}
