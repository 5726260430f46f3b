//! Url and path helpers

use std::path::{Path, PathBuf};

use crate::catalog::Site;
use crate::config::BuildConfig;
use crate::template;

/// Normalize platform path separators to forward slashes.
pub fn normalize_separators(path: &Path) -> String {
    path.to_string_lossy().replace('\\', "/")
}

/// Module id for a source file: its path relative to the sources root,
/// separators normalized.
pub fn module_id(file: &Path, sources_root: &Path) -> String {
    let rel = file.strip_prefix(sources_root).unwrap_or(file);
    normalize_separators(rel)
}

/// Public url for a site/group bundle.
pub fn bundle_url(site: &Site, group: &str, config: &BuildConfig) -> String {
    template::render(&config.bundle_url_template, site, group)
}

/// Public url of the loader configuration source.
pub fn loader_config_url(config: &BuildConfig) -> String {
    let filename = config
        .loader_config
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_default();
    format!("/{filename}")
}

/// Priority-ordered lookup roots for serving `.js`/`.json` requests:
/// packages, loader config, then exactly one of precompiled / bundles /
/// raw sources depending on the build toggles.
pub fn serve_roots(config: &BuildConfig) -> Vec<PathBuf> {
    let mut roots = vec![config.packages_path.clone()];
    if let Some(parent) = config.loader_config.parent() {
        roots.push(parent.to_path_buf());
    }
    if config.precompile {
        roots.push(config.precompile_path.clone());
    } else if config.bundle {
        roots.push(config.bundle_path.clone());
    } else {
        roots.push(config.sources_path.clone());
    }
    roots
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn module_id_is_root_relative_and_normalized() {
        assert_eq!(
            module_id(
                Path::new("/project/sources/base/global/js/bootstrap.js"),
                Path::new("/project/sources"),
            ),
            "base/global/js/bootstrap.js"
        );
    }

    #[test]
    fn bundle_url_uses_the_url_template() {
        let config = BuildConfig::default();
        let site = Site::new("Base");
        assert_eq!(bundle_url(&site, "common", &config), "/base/common.js");
    }

    #[test]
    fn serve_roots_priority_follows_build_toggles() {
        let mut config = BuildConfig::default();
        config.loader_config = PathBuf::from("conf/loader.js");

        let raw = serve_roots(&config);
        assert_eq!(raw.last().unwrap(), &config.sources_path);

        config.bundle = true;
        let bundled = serve_roots(&config);
        assert_eq!(bundled.last().unwrap(), &config.bundle_path);

        // precompile wins over bundle
        config.precompile = true;
        let precompiled = serve_roots(&config);
        assert_eq!(precompiled[0], config.packages_path);
        assert_eq!(precompiled[1], PathBuf::from("conf"));
        assert_eq!(precompiled.last().unwrap(), &config.precompile_path);
    }
}
