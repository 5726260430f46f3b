//! Configuration loading

use std::fs;
use std::path::{Path, PathBuf};

use crate::error::{BinderyError, BinderyResult};

use super::types::BuildConfig;

/// Non-fatal configuration warning surfaced to CLI users.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConfigWarning {
    pub key: String,
    pub file: PathBuf,
}

/// Load configuration and collect non-fatal warnings (e.g. unknown keys).
pub fn load_with_warnings(path: &Path) -> BinderyResult<(BuildConfig, Vec<ConfigWarning>)> {
    let content = fs::read_to_string(path)?;

    let mut unknown_paths: Vec<String> = Vec::new();
    let deserializer = toml::de::Deserializer::new(&content);

    let config: BuildConfig = serde_ignored::deserialize(deserializer, |p| {
        unknown_paths.push(p.to_string());
    })
    .map_err(|e| BinderyError::InvalidConfig {
        file: path.to_path_buf(),
        message: e.to_string(),
    })?;

    let warnings = unknown_paths
        .into_iter()
        .map(|path_str| ConfigWarning {
            key: path_str,
            file: path.to_path_buf(),
        })
        .collect();

    Ok((with_env_overrides(config), warnings))
}

/// Load from project config, user config, or defaults.
pub fn load_or_default(project_root: Option<&Path>) -> (BuildConfig, Vec<ConfigWarning>) {
    if let Some(root) = project_root {
        let project_config = root.join("bindery.toml");
        if project_config.exists() {
            if let Ok(loaded) = load_with_warnings(&project_config) {
                return loaded;
            }
        }
    }

    if let Some(user_config_dir) = dirs::config_dir() {
        let user_config = user_config_dir.join("bindery/config.toml");
        if user_config.exists() {
            if let Ok(loaded) = load_with_warnings(&user_config) {
                return loaded;
            }
        }
    }

    (with_env_overrides(BuildConfig::default()), Vec::new())
}

/// Apply environment variable overrides (BINDERY_* prefix)
pub fn with_env_overrides(mut config: BuildConfig) -> BuildConfig {
    if let Ok(environment) = std::env::var("BINDERY_ENVIRONMENT") {
        if environment.is_empty() {
            config.environment = None;
        } else {
            config.environment = Some(environment);
        }
    }

    if let Ok(group) = std::env::var("BINDERY_DEFAULT_GROUP") {
        if !group.is_empty() {
            config.default_group = group;
        }
    }

    config
}
