//! Module-loader configuration source
//!
//! The loader config is a JSON path-mapping table, optionally wrapped in a
//! `System.config({ ... })` call for direct consumption by the loader
//! runtime. The wrapper is stripped textually and the payload parsed as
//! data; configuration is never obtained by executing code. The file on
//! disk is never rewritten - derived path entries are injected into the
//! in-memory value only.

use std::collections::BTreeMap;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::catalog::Site;
use crate::config::BuildConfig;
use crate::error::{BinderyError, BinderyResult};
use crate::template;
use crate::urls;

/// Parsed loader configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct LoaderConfig {
    /// Path-mapping table (wildcard patterns -> locations)
    #[serde(default)]
    pub paths: BTreeMap<String, String>,

    /// Loader settings this core carries through untouched
    #[serde(flatten)]
    pub extra: serde_json::Map<String, serde_json::Value>,
}

impl LoaderConfig {
    /// Read and parse the loader config file.
    ///
    /// Fails with `ConfigurationRead` before any bundle is attempted.
    pub fn read(path: &Path) -> BinderyResult<Self> {
        let source =
            std::fs::read_to_string(path).map_err(|e| BinderyError::ConfigurationRead {
                file: path.to_path_buf(),
                message: e.to_string(),
            })?;
        Self::parse(&source).map_err(|message| BinderyError::ConfigurationRead {
            file: path.to_path_buf(),
            message,
        })
    }

    /// Parse the config source, stripping an optional `System.config(...)`
    /// wrapper.
    pub fn parse(source: &str) -> Result<Self, String> {
        let payload = strip_wrapper(source);
        serde_json::from_str(payload).map_err(|e| e.to_string())
    }

    /// Inject the derived path entries: packages-root wildcards and one
    /// source root per site.
    pub fn inject_derived_paths(&mut self, config: &BuildConfig, sites: &[Site]) {
        let packages = urls::normalize_separators(&config.packages_path);
        self.paths
            .insert("packages/*".to_string(), format!("{packages}/*"));
        for prefix in ["github", "npm", "bower"] {
            self.paths
                .insert(format!("{prefix}:*"), format!("{packages}/{prefix}/*"));
        }
        for site in sites {
            let slug = template::urlify(&site.name);
            self.paths
                .insert(format!("{slug}/*"), format!("sites/{slug}/*"));
        }
    }
}

/// Strip a `System.config( ... )`-style wrapper down to the JSON payload.
fn strip_wrapper(source: &str) -> &str {
    let trimmed = source.trim();
    if trimmed.starts_with('{') {
        return trimmed;
    }
    let Some(start) = trimmed.find('{') else {
        return trimmed;
    };
    let Some(end) = trimmed.rfind('}') else {
        return trimmed;
    };
    if end < start {
        return trimmed;
    }
    &trimmed[start..=end]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_plain_json() {
        let config = LoaderConfig::parse(r#"{ "paths": { "app/*": "src/app/*" } }"#).unwrap();
        assert_eq!(config.paths["app/*"], "src/app/*");
    }

    #[test]
    fn parse_strips_system_config_wrapper() {
        let source = r#"System.config({
            "paths": { "app/*": "src/app/*" },
            "transpiler": "babel"
        });"#;
        let config = LoaderConfig::parse(source).unwrap();
        assert_eq!(config.paths["app/*"], "src/app/*");
        assert_eq!(
            config.extra.get("transpiler"),
            Some(&serde_json::Value::String("babel".to_string()))
        );
    }

    #[test]
    fn parse_failure_is_an_error_not_a_panic() {
        assert!(LoaderConfig::parse("System.config(not json);").is_err());
        assert!(LoaderConfig::parse("").is_err());
    }

    #[test]
    fn read_missing_file_is_configuration_read() {
        let err = LoaderConfig::read(Path::new("/no/such/loader.js")).unwrap_err();
        assert!(matches!(err, BinderyError::ConfigurationRead { .. }));
    }

    #[test]
    fn inject_adds_packages_and_site_roots() {
        let mut loader = LoaderConfig::default();
        let config = BuildConfig::default();
        let sites = vec![Site::new("Base"), Site::new("Extended")];

        loader.inject_derived_paths(&config, &sites);

        assert_eq!(loader.paths["packages/*"], "packages/*");
        assert_eq!(loader.paths["npm:*"], "packages/npm/*");
        assert_eq!(loader.paths["base/*"], "sites/base/*");
        assert_eq!(loader.paths["extended/*"], "sites/extended/*");
    }
}
