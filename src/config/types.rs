//! Configuration type definitions

use std::path::PathBuf;

use serde::{Deserialize, Serialize};

/// Invocation of an external tool (bundler or transpiler)
#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq)]
pub struct CommandConfig {
    /// Program to spawn; `None` disables the tool (dry manifests only)
    #[serde(default)]
    pub program: Option<String>,

    /// Extra arguments passed before the generated ones
    #[serde(default)]
    pub args: Vec<String>,
}

/// Build configuration consumed read-only by the whole pipeline.
///
/// Loaded from `bindery.toml`; every key has a default so an empty file
/// (or no file at all) is a valid configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BuildConfig {
    /// Active environment name for conditional source activation
    #[serde(default)]
    pub environment: Option<String>,

    /// Group that receives the mandatory bootstrap prepends
    #[serde(default = "default_group")]
    pub default_group: String,

    /// Property key used to look up a file's group tag (`groups.<key>`)
    #[serde(default = "default_group_key")]
    pub group_key: String,

    /// Root of the site source trees
    #[serde(default = "default_sources_path")]
    pub sources_path: PathBuf,

    /// Root of the module-loader packages
    #[serde(default = "default_packages_path")]
    pub packages_path: PathBuf,

    /// Module-loader configuration source (path-mapping table)
    #[serde(default = "default_loader_config")]
    pub loader_config: PathBuf,

    /// Where precompiled files are written
    #[serde(default = "default_precompile_path")]
    pub precompile_path: PathBuf,

    /// Where bundles are written
    #[serde(default = "default_bundle_path")]
    pub bundle_path: PathBuf,

    /// Template for on-disk bundle filenames
    #[serde(default = "default_bundle_template")]
    pub bundle_template: String,

    /// Template for public bundle urls
    #[serde(default = "default_bundle_url_template")]
    pub bundle_url_template: String,

    /// Public url of the loader runtime
    #[serde(default = "default_runtime_url")]
    pub runtime_url: String,

    /// Optional banner comment prepended to every output file
    #[serde(default)]
    pub banner: Option<String>,

    /// Serve precompiled files instead of raw sources
    #[serde(default)]
    pub precompile: bool,

    /// Serve bundles instead of raw sources (precompile wins when both set)
    #[serde(default)]
    pub bundle: bool,

    /// External bundler invocation
    #[serde(default)]
    pub bundler: CommandConfig,

    /// External transpiler invocation
    #[serde(default)]
    pub transpiler: CommandConfig,
}

impl Default for BuildConfig {
    fn default() -> Self {
        Self {
            environment: None,
            default_group: default_group(),
            group_key: default_group_key(),
            sources_path: default_sources_path(),
            packages_path: default_packages_path(),
            loader_config: default_loader_config(),
            precompile_path: default_precompile_path(),
            bundle_path: default_bundle_path(),
            bundle_template: default_bundle_template(),
            bundle_url_template: default_bundle_url_template(),
            runtime_url: default_runtime_url(),
            banner: None,
            precompile: false,
            bundle: false,
            bundler: CommandConfig::default(),
            transpiler: CommandConfig::default(),
        }
    }
}

impl BuildConfig {
    /// Path to the loader polyfill bootstrap file
    pub fn polyfill_file(&self) -> PathBuf {
        self.packages_path.join("system-polyfills.js")
    }

    /// Path to the loader runtime core file
    pub fn runtime_file(&self) -> PathBuf {
        self.packages_path.join("system.src.js")
    }
}

fn default_group() -> String {
    "common".to_string()
}

fn default_group_key() -> String {
    "js".to_string()
}

fn default_sources_path() -> PathBuf {
    PathBuf::from("sources")
}

fn default_packages_path() -> PathBuf {
    PathBuf::from("packages")
}

fn default_loader_config() -> PathBuf {
    PathBuf::from("loader.js")
}

fn default_precompile_path() -> PathBuf {
    PathBuf::from("build/precompiled")
}

fn default_bundle_path() -> PathBuf {
    PathBuf::from("build/bundles")
}

fn default_bundle_template() -> String {
    "${site.name.urlify()}/${group.urlify()}.js".to_string()
}

fn default_bundle_url_template() -> String {
    "/${site.name.urlify()}/${group.urlify()}.js".to_string()
}

fn default_runtime_url() -> String {
    "/packages/system.js".to_string()
}
