use std::ffi::OsString;
use std::sync::Mutex;

use tempfile::tempdir;
use toolmodel_config::{
    discover_config_path, load_for_workspace, StructuralPolicy, ToolModelConfig,
    TOOLMODEL_CONFIG_ENV_VAR,
};

static ENV_LOCK: Mutex<()> = Mutex::new(());

struct EnvVarGuard {
    key: &'static str,
    prev: Option<OsString>,
}

impl EnvVarGuard {
    fn set(key: &'static str, value: &std::path::Path) -> Self {
        let prev = std::env::var_os(key);
        std::env::set_var(key, value);
        Self { key, prev }
    }

    fn unset(key: &'static str) -> Self {
        let prev = std::env::var_os(key);
        std::env::remove_var(key);
        Self { key, prev }
    }
}

impl Drop for EnvVarGuard {
    fn drop(&mut self) {
        match &self.prev {
            Some(v) => std::env::set_var(self.key, v),
            None => std::env::remove_var(self.key),
        }
    }
}

#[test]
fn discovers_toolmodel_toml_in_workspace_root() {
    let _lock = ENV_LOCK.lock().expect("ENV_LOCK mutex poisoned");
    let _env = EnvVarGuard::unset(TOOLMODEL_CONFIG_ENV_VAR);

    let dir = tempdir().unwrap();
    let config_path = dir.path().join("toolmodel.toml");
    std::fs::write(
        &config_path,
        "[projection]\nstructural_policy = \"best-effort\"\n",
    )
    .unwrap();

    let discovered = discover_config_path(dir.path()).expect("config should be discovered");
    assert_eq!(discovered, config_path.canonicalize().unwrap_or(config_path));

    let (config, path, diagnostics) = load_for_workspace(dir.path()).unwrap();
    assert!(path.is_some());
    assert!(diagnostics.is_empty(), "{diagnostics:?}");
    assert_eq!(
        config.projection.structural_policy,
        StructuralPolicy::BestEffort
    );
}

#[test]
fn falls_back_to_dot_directory_config() {
    let _lock = ENV_LOCK.lock().expect("ENV_LOCK mutex poisoned");
    let _env = EnvVarGuard::unset(TOOLMODEL_CONFIG_ENV_VAR);

    let dir = tempdir().unwrap();
    std::fs::create_dir_all(dir.path().join(".toolmodel")).unwrap();
    std::fs::write(
        dir.path().join(".toolmodel/config.toml"),
        "[logging]\nlevel = \"debug\"\n",
    )
    .unwrap();

    let (config, path, _) = load_for_workspace(dir.path()).unwrap();
    assert!(path.unwrap().ends_with(".toolmodel/config.toml"));
    assert_eq!(config.logging.level, "debug");
}

#[test]
fn env_var_overrides_discovery_relative_to_workspace_root() {
    let _lock = ENV_LOCK.lock().expect("ENV_LOCK mutex poisoned");

    let dir = tempdir().unwrap();
    std::fs::write(dir.path().join("toolmodel.toml"), "").unwrap();
    std::fs::write(
        dir.path().join("custom.toml"),
        "[projection]\nsynthetic_configuration_prefix = \"ide\"\n",
    )
    .unwrap();

    let _env = EnvVarGuard::set(TOOLMODEL_CONFIG_ENV_VAR, std::path::Path::new("custom.toml"));
    let (config, path, _) = load_for_workspace(dir.path()).unwrap();
    assert!(path.unwrap().ends_with("custom.toml"));
    assert_eq!(config.projection.synthetic_configuration_prefix, "ide");
}

#[test]
fn missing_config_yields_defaults() {
    let _lock = ENV_LOCK.lock().expect("ENV_LOCK mutex poisoned");
    let _env = EnvVarGuard::unset(TOOLMODEL_CONFIG_ENV_VAR);

    let dir = tempdir().unwrap();
    let (config, path, diagnostics) = load_for_workspace(dir.path()).unwrap();
    assert_eq!(config, ToolModelConfig::default());
    assert!(path.is_none());
    assert!(diagnostics.is_empty());
}

#[test]
fn unreadable_config_reports_the_path() {
    let dir = tempdir().unwrap();
    let missing = dir.path().join("nope.toml");
    let err = ToolModelConfig::load_from_path(&missing).unwrap_err();
    assert!(err.to_string().contains("nope.toml"), "{err}");
}
