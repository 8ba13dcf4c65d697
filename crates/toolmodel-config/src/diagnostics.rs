use serde::de::DeserializeOwned;

/// Non-fatal findings produced while loading a config.
///
/// Callers always get a config when deserialization succeeds; these describe what was ignored or
/// looks suspicious.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ConfigDiagnostics {
    /// Keys present in the TOML that the schema does not know, as dotted paths
    /// (`projection.structual_policy`).
    pub unknown_keys: Vec<String>,
    pub warnings: Vec<ConfigWarning>,
}

impl ConfigDiagnostics {
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.unknown_keys.is_empty() && self.warnings.is_empty()
    }

    /// Log every diagnostic at `warn` level.
    pub fn log(&self) {
        for key in &self.unknown_keys {
            tracing::warn!(target: "toolmodel.config", key = %key, "unknown config key ignored");
        }
        for warning in &self.warnings {
            tracing::warn!(target: "toolmodel.config", "{warning}");
        }
    }
}

#[non_exhaustive]
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConfigWarning {
    LoggingLevelInvalid { value: String, normalized: String },
    EmptySyntheticConfigurationPrefix,
}

impl std::fmt::Display for ConfigWarning {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ConfigWarning::LoggingLevelInvalid { value, normalized } => write!(
                f,
                "logging.level `{value}` is not a valid filter (normalized to `{normalized}`); falling back to `info`"
            ),
            ConfigWarning::EmptySyntheticConfigurationPrefix => f.write_str(
                "projection.synthetic_configuration_prefix is empty; synthetic configurations will shadow the scopes they extend",
            ),
        }
    }
}

pub(crate) fn deserialize_toml_with_unknown_keys<T: DeserializeOwned>(
    text: &str,
) -> Result<(T, Vec<String>), toml::de::Error> {
    let mut unknown = Vec::<String>::new();
    let deserializer = toml::de::Deserializer::new(text);
    let value = serde_ignored::deserialize(deserializer, |path| {
        unknown.push(path.to_string().trim_start_matches('.').to_owned());
    })?;
    unknown.sort();
    unknown.dedup();
    Ok((value, unknown))
}
