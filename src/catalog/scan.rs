//! Filesystem scanner building a `FileCatalog` from a sources tree
//!
//! Layout: `<root>/<site>/<category>/<entity>/...`. A site directory may
//! carry a `site.toml` (`name`, `extends`); an entity directory may carry a
//! `groups.toml` mapping content-type keys to group names (`js = "core"`).

use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};

use indexmap::IndexMap;
use serde::Deserialize;

use crate::error::{BinderyError, BinderyResult};

use super::{Entity, FileCatalog, Site, SourceFile};

/// Site directory metadata
#[derive(Debug, Deserialize, Default)]
struct SiteMeta {
    #[serde(default)]
    name: Option<String>,
    #[serde(default)]
    extends: Option<String>,
}

const SITE_META_FILE: &str = "site.toml";
const GROUPS_META_FILE: &str = "groups.toml";

/// Scan `sources_root` into a catalog.
///
/// Sites and files are sorted by path so repeated scans of an unchanged
/// tree yield an identical catalog.
pub fn scan(sources_root: &Path) -> BinderyResult<FileCatalog> {
    if !sources_root.is_dir() {
        return Err(BinderyError::Io(std::io::Error::new(
            std::io::ErrorKind::NotFound,
            format!("sources root not found: {}", sources_root.display()),
        )));
    }

    let mut catalog = FileCatalog::new(sources_root);

    let mut site_dirs: Vec<PathBuf> = fs::read_dir(sources_root)?
        .filter_map(|entry| entry.ok())
        .map(|entry| entry.path())
        .filter(|p| p.is_dir())
        .collect();
    site_dirs.sort();

    for site_dir in site_dirs {
        let dir_name = match site_dir.file_name().and_then(|n| n.to_str()) {
            Some(name) => name.to_string(),
            None => continue,
        };

        let meta = read_site_meta(&site_dir)?;
        let site_name = meta.name.unwrap_or_else(|| dir_name.clone());
        let mut site = Site::new(site_name.clone());
        site.extends = meta.extends;
        catalog.add_site(site);

        for entity in scan_site(&site_dir, &site_name, sources_root)? {
            catalog.add_entity(entity);
        }
    }

    Ok(catalog)
}

fn read_site_meta(site_dir: &Path) -> BinderyResult<SiteMeta> {
    let meta_path = site_dir.join(SITE_META_FILE);
    if !meta_path.exists() {
        return Ok(SiteMeta::default());
    }
    let content = fs::read_to_string(&meta_path)?;
    toml::from_str(&content).map_err(|e| BinderyError::InvalidConfig {
        file: meta_path,
        message: e.to_string(),
    })
}

fn scan_site(
    site_dir: &Path,
    site_name: &str,
    sources_root: &Path,
) -> BinderyResult<Vec<Entity>> {
    let mut files = Vec::new();
    collect_files(site_dir, &mut files)?;
    files.sort();

    let mut entities: IndexMap<String, Entity> = IndexMap::new();
    let mut group_cache: HashMap<PathBuf, HashMap<String, String>> = HashMap::new();

    for path in files {
        let file_name = path.file_name().and_then(|n| n.to_str()).unwrap_or("");
        if file_name == SITE_META_FILE || file_name == GROUPS_META_FILE {
            continue;
        }

        let entity_path = entity_path_for(&path, sources_root);
        let entity_dir = sources_root.join(&entity_path);

        let groups = match group_cache.get(&entity_dir) {
            Some(groups) => groups.clone(),
            None => {
                let groups = read_groups_meta(&entity_dir)?;
                group_cache.insert(entity_dir.clone(), groups.clone());
                groups
            }
        };

        let mut file = SourceFile::new(&path, site_name);
        file.groups = groups;

        entities
            .entry(entity_path.clone())
            .or_insert_with(|| Entity::new(site_name, entity_path))
            .files
            .push(file);
    }

    Ok(entities.into_values().collect())
}

fn read_groups_meta(entity_dir: &Path) -> BinderyResult<HashMap<String, String>> {
    let meta_path = entity_dir.join(GROUPS_META_FILE);
    if !meta_path.exists() {
        return Ok(HashMap::new());
    }
    let content = fs::read_to_string(&meta_path)?;
    toml::from_str(&content).map_err(|e| BinderyError::InvalidConfig {
        file: meta_path,
        message: e.to_string(),
    })
}

fn collect_files(dir: &Path, files: &mut Vec<PathBuf>) -> BinderyResult<()> {
    for entry in fs::read_dir(dir)? {
        let entry = entry?;
        let path = entry.path();
        if path.is_dir() {
            collect_files(&path, files)?;
        } else {
            files.push(path);
        }
    }
    Ok(())
}

/// Entity owning a file: the first three path components below the sources
/// root (`site/category/name`), or two when the file sits that shallow.
fn entity_path_for(path: &Path, sources_root: &Path) -> String {
    let rel = path.strip_prefix(sources_root).unwrap_or(path);
    let components: Vec<String> = rel
        .components()
        .map(|c| c.as_os_str().to_string_lossy().into_owned())
        .collect();
    // Last component is the file itself
    let depth = components.len().saturating_sub(1).min(3);
    components[..depth.max(1)].join("/")
}
