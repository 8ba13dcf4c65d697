//! Configuration and logging setup shared by the toolmodel crates.
//!
//! Configuration lives in `toolmodel.toml` at the workspace root (see [`discover_config_path`]).
//! Every key is optional; a missing file yields [`ToolModelConfig::default`].

use std::path::{Path, PathBuf};
use std::sync::{Arc, Once};

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use toolmodel_model::GradleVersion;
use tracing_subscriber::fmt::writer::{BoxMakeWriter, MakeWriterExt};
use tracing_subscriber::prelude::*;
use tracing_subscriber::EnvFilter;

mod diagnostics;
mod schema;

pub use diagnostics::{ConfigDiagnostics, ConfigWarning};
pub use schema::json_schema;

/// Environment variable overriding config discovery.
pub const TOOLMODEL_CONFIG_ENV_VAR: &str = "TOOLMODEL_CONFIG_PATH";

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize, JsonSchema)]
#[serde(default)]
pub struct ToolModelConfig {
    pub logging: LoggingConfig,
    pub projection: ProjectionConfig,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct LoggingConfig {
    /// Either a plain level (`trace`..`error`) or a full `EnvFilter` directive string.
    #[serde(default = "LoggingConfig::default_level")]
    pub level: String,

    /// Emit logs as JSON lines.
    #[serde(default)]
    pub json: bool,

    /// Write logs to stderr.
    #[serde(default = "LoggingConfig::default_stderr")]
    pub stderr: bool,

    /// Append logs to this file as well. If it cannot be opened, file logging is skipped.
    #[serde(default)]
    #[schemars(with = "Option<String>")]
    pub file: Option<PathBuf>,
}

impl LoggingConfig {
    fn default_level() -> String {
        "info".to_owned()
    }

    fn default_stderr() -> bool {
        true
    }

    /// Maps a plain level (or `warning`) to its `EnvFilter` spelling; directive strings pass
    /// through trimmed.
    pub(crate) fn normalize_level_directives(input: &str) -> String {
        let trimmed = input.trim();
        match trimmed.to_ascii_lowercase().as_str() {
            "" => Self::default_level(),
            "warning" => "warn".to_owned(),
            level @ ("trace" | "debug" | "info" | "warn" | "error") => level.to_owned(),
            _ => trimmed.to_owned(),
        }
    }

    /// Effective filter: the configured directives followed by `RUST_LOG`, which therefore wins
    /// for targets both mention. Unparseable input falls back to the configured level alone,
    /// then to `info`.
    pub fn env_filter(&self) -> EnvFilter {
        let configured = Self::normalize_level_directives(&self.level);
        let combined = match std::env::var("RUST_LOG") {
            Ok(env) if !env.trim().is_empty() => format!("{configured},{}", env.trim()),
            _ => configured.clone(),
        };

        EnvFilter::try_new(combined)
            .or_else(|_| EnvFilter::try_new(configured))
            .unwrap_or_else(|_| EnvFilter::new(Self::default_level()))
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: Self::default_level(),
            json: false,
            stderr: Self::default_stderr(),
            file: None,
        }
    }
}

/// What to do when the build model violates an invariant the projection relies on (for
/// example two configurations with the same name).
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "kebab-case")]
pub enum StructuralPolicy {
    /// Fail the projection.
    #[default]
    Strict,
    /// Keep going (last definition wins) and log a warning.
    BestEffort,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct ProjectionConfig {
    #[serde(default)]
    pub structural_policy: StructuralPolicy,

    /// Prefix of the resolvable configurations created to compute implementation classpaths
    /// (`rewrite` + `implementation` = `rewriteimplementation`).
    #[serde(default = "ProjectionConfig::default_synthetic_prefix")]
    pub synthetic_configuration_prefix: String,

    /// Oldest build-tool version whose settings script classpath can be resolved.
    #[serde(default = "ProjectionConfig::default_settings_classpath_min_version")]
    #[schemars(with = "String")]
    pub settings_classpath_min_gradle_version: GradleVersion,
}

impl ProjectionConfig {
    fn default_synthetic_prefix() -> String {
        "rewrite".to_owned()
    }

    fn default_settings_classpath_min_version() -> GradleVersion {
        GradleVersion::new(4, 4)
    }

    /// Name of the synthetic resolvable configuration extending `base`.
    pub fn synthetic_configuration_name(&self, base: &str) -> String {
        format!("{}{}", self.synthetic_configuration_prefix, base)
    }
}

impl Default for ProjectionConfig {
    fn default() -> Self {
        Self {
            structural_policy: StructuralPolicy::default(),
            synthetic_configuration_prefix: Self::default_synthetic_prefix(),
            settings_classpath_min_gradle_version: Self::default_settings_classpath_min_version(),
        }
    }
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config file {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to parse toml config: {0}")]
    Toml(String),
}

impl From<toml::de::Error> for ConfigError {
    fn from(err: toml::de::Error) -> Self {
        // The default `Display` embeds a source snippet; repository passwords may live in the
        // same workspace, so keep just the message.
        ConfigError::Toml(err.message().to_owned())
    }
}

impl ToolModelConfig {
    pub fn load_from_path(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        Ok(Self::load_from_path_with_diagnostics(path)?.0)
    }

    pub fn load_from_path_with_diagnostics(
        path: impl AsRef<Path>,
    ) -> Result<(Self, ConfigDiagnostics), ConfigError> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.display().to_string(),
            source,
        })?;
        Self::load_from_str_with_diagnostics(&text)
    }

    /// Parse a config from TOML, collecting unknown keys and semantic warnings.
    pub fn load_from_str_with_diagnostics(
        text: &str,
    ) -> Result<(Self, ConfigDiagnostics), ConfigError> {
        let (config, unknown_keys) =
            diagnostics::deserialize_toml_with_unknown_keys::<ToolModelConfig>(text)?;
        let warnings = config.validate();
        Ok((
            config,
            ConfigDiagnostics {
                unknown_keys,
                warnings,
            },
        ))
    }

    fn validate(&self) -> Vec<ConfigWarning> {
        let mut warnings = Vec::new();

        let normalized = LoggingConfig::normalize_level_directives(&self.logging.level);
        if EnvFilter::try_new(normalized.clone()).is_err() {
            warnings.push(ConfigWarning::LoggingLevelInvalid {
                value: self.logging.level.clone(),
                normalized,
            });
        }

        if self.projection.synthetic_configuration_prefix.trim().is_empty() {
            warnings.push(ConfigWarning::EmptySyntheticConfigurationPrefix);
        }

        warnings
    }
}

/// Locate the config file for a workspace root.
///
/// Search order:
/// 1) `TOOLMODEL_CONFIG_PATH` (absolute or relative to `workspace_root`)
/// 2) `toolmodel.toml` in `workspace_root`
/// 3) `.toolmodel/config.toml` in `workspace_root`
pub fn discover_config_path(workspace_root: &Path) -> Option<PathBuf> {
    if let Some(value) = std::env::var_os(TOOLMODEL_CONFIG_ENV_VAR) {
        let candidate = PathBuf::from(value);
        let path = if candidate.is_absolute() {
            candidate
        } else {
            workspace_root.join(candidate)
        };
        return Some(path.canonicalize().unwrap_or(path));
    }

    ["toolmodel.toml", ".toolmodel/config.toml"]
        .into_iter()
        .map(|name| workspace_root.join(name))
        .find(|path| path.is_file())
        .map(|path| path.canonicalize().unwrap_or(path))
}

/// Load the configuration for a workspace root.
///
/// If no config is present, returns the default config, `None`, and empty diagnostics.
pub fn load_for_workspace(
    workspace_root: &Path,
) -> Result<(ToolModelConfig, Option<PathBuf>, ConfigDiagnostics), ConfigError> {
    let Some(path) = discover_config_path(workspace_root) else {
        return Ok((ToolModelConfig::default(), None, ConfigDiagnostics::default()));
    };

    let (config, diagnostics) = ToolModelConfig::load_from_path_with_diagnostics(&path)?;
    Ok((config, Some(path), diagnostics))
}

static TRACING_INIT: Once = Once::new();

/// Install the global tracing subscriber described by `logging`.
///
/// Only the first call in a process installs anything; it returns `true` when the subscriber
/// was installed by this call.
pub fn init_tracing(logging: &LoggingConfig) -> bool {
    let mut installed = false;

    TRACING_INIT.call_once(|| {
        let filter = logging.env_filter();

        let mut make_writer = if logging.stderr {
            BoxMakeWriter::new(std::io::stderr)
        } else {
            BoxMakeWriter::new(std::io::sink)
        };

        let file_path = logging.file.as_ref();
        let file = file_path.and_then(|path| {
            std::fs::OpenOptions::new()
                .create(true)
                .append(true)
                .open(path)
                .ok()
        });
        let file_open_failed = file_path.is_some() && file.is_none();
        if let Some(file) = file {
            make_writer = BoxMakeWriter::new(make_writer.and(Arc::new(file)));
        }

        let layer: Box<dyn tracing_subscriber::Layer<_> + Send + Sync> = if logging.json {
            tracing_subscriber::fmt::layer()
                .json()
                .with_writer(make_writer)
                .with_ansi(false)
                .boxed()
        } else {
            tracing_subscriber::fmt::layer()
                .with_writer(make_writer)
                .with_ansi(false)
                .boxed()
        };

        let subscriber = tracing_subscriber::registry().with(filter).with(layer);
        installed = tracing::subscriber::set_global_default(subscriber).is_ok();

        if installed && file_open_failed {
            if let Some(path) = file_path {
                tracing::warn!(
                    target: "toolmodel.config",
                    path = %path.display(),
                    "failed to open log file; logging to the remaining sinks only"
                );
            }
        }
    });

    installed
}
