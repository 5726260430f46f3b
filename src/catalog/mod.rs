//! Site / entity / file catalog
//!
//! The read-only model the pipeline operates on: sites (with linear
//! inheritance), entities (named units owning files) and source files
//! (with content type and group tags). Catalogs are built once per run,
//! either programmatically or by scanning a sources tree (`scan`).

mod scan;

use std::collections::HashMap;
use std::path::{Path, PathBuf};

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

use crate::error::{BinderyError, BinderyResult};

pub use scan::scan;

/// Query sentinel matching every site or entity
pub const WILDCARD: &str = "*";

/// Content type tag derived from a file extension
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ContentType {
    Js,
    Css,
    Json,
    Other,
}

impl ContentType {
    pub fn from_path(path: &Path) -> Self {
        match path.extension().and_then(|e| e.to_str()) {
            Some("js") => ContentType::Js,
            Some("css") => ContentType::Css,
            Some("json") => ContentType::Json,
            _ => ContentType::Other,
        }
    }
}

/// A site, optionally extending a parent site
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Site {
    /// Display name; also the template value for `${site.name}`
    pub name: String,
    /// Parent site name, forming a linear inheritance chain
    pub extends: Option<String>,
}

impl Site {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            extends: None,
        }
    }

    pub fn with_extends(mut self, parent: impl Into<String>) -> Self {
        self.extends = Some(parent.into());
        self
    }
}

/// A source file owned by an entity
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SourceFile {
    /// Absolute path on disk
    pub path: PathBuf,
    pub content_type: ContentType,
    /// Owning site name
    pub site: String,
    /// Group tags keyed by content-type property (e.g. "js" -> "core")
    pub groups: HashMap<String, String>,
}

impl SourceFile {
    pub fn new(path: impl Into<PathBuf>, site: impl Into<String>) -> Self {
        let path = path.into();
        let content_type = ContentType::from_path(&path);
        Self {
            path,
            content_type,
            site: site.into(),
            groups: HashMap::new(),
        }
    }

    pub fn with_group(mut self, key: impl Into<String>, group: impl Into<String>) -> Self {
        self.groups.insert(key.into(), group.into());
        self
    }

    /// The file's group tag for `key`, or the default group when untagged
    pub fn group(&self, key: &str, default_group: &str) -> String {
        self.groups
            .get(key)
            .cloned()
            .unwrap_or_else(|| default_group.to_string())
    }
}

/// A named unit (e.g. a UI component) owning a set of files
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Entity {
    /// Owning site name
    pub site: String,
    /// Full path string, e.g. "base/modules/teaser"
    pub path_string: String,
    pub files: Vec<SourceFile>,
}

impl Entity {
    pub fn new(site: impl Into<String>, path_string: impl Into<String>) -> Self {
        Self {
            site: site.into(),
            path_string: path_string.into(),
            files: Vec::new(),
        }
    }

    pub fn with_file(mut self, file: SourceFile) -> Self {
        self.files.push(file);
        self
    }

    /// Path string without the leading site segment.
    ///
    /// Identifies the same entity across an inheritance chain.
    pub fn local_path(&self) -> &str {
        self.path_string
            .split_once('/')
            .map(|(_, rest)| rest)
            .unwrap_or(&self.path_string)
    }
}

/// Read-only catalog of sites, entities and files for one run
#[derive(Debug, Clone, Default)]
pub struct FileCatalog {
    sources_root: PathBuf,
    sites: Vec<Site>,
    entities: Vec<Entity>,
}

impl FileCatalog {
    pub fn new(sources_root: impl Into<PathBuf>) -> Self {
        Self {
            sources_root: sources_root.into(),
            sites: Vec::new(),
            entities: Vec::new(),
        }
    }

    pub fn add_site(&mut self, site: Site) {
        self.sites.push(site);
    }

    pub fn add_entity(&mut self, entity: Entity) {
        self.entities.push(entity);
    }

    /// Root all module ids are computed relative to
    pub fn sources_root(&self) -> &Path {
        &self.sources_root
    }

    /// All sites in catalog order
    pub fn sites(&self) -> &[Site] {
        &self.sites
    }

    /// Resolve exactly one site by name
    pub fn find_site(&self, query: &str) -> BinderyResult<&Site> {
        self.sites
            .iter()
            .find(|s| s.name.eq_ignore_ascii_case(query))
            .ok_or_else(|| BinderyError::NotFound {
                query: query.to_string(),
            })
    }

    /// Inheritance chain for `site`, root first, `site` last
    pub fn inheritance_chain<'a>(&'a self, site: &'a Site) -> Vec<&'a Site> {
        let mut chain = vec![site];
        let mut current = site;
        while let Some(parent_name) = &current.extends {
            match self.sites.iter().find(|s| &s.name == parent_name) {
                // Guard against cycles in hand-built catalogs
                Some(parent) if !chain.iter().any(|s| s.name == parent.name) => {
                    chain.push(parent);
                    current = parent;
                }
                _ => break,
            }
        }
        chain.reverse();
        chain
    }

    /// Entities matched by `query` in catalog order.
    ///
    /// `"*"` matches everything; otherwise exact path or path prefix.
    pub fn entities(&self, query: &str) -> BinderyResult<Vec<&Entity>> {
        if query == WILDCARD {
            return Ok(self.entities.iter().collect());
        }
        let prefix = format!("{}/", query.trim_end_matches('/'));
        let matched: Vec<&Entity> = self
            .entities
            .iter()
            .filter(|e| e.path_string == query || e.path_string.starts_with(&prefix))
            .collect();
        if matched.is_empty() {
            return Err(BinderyError::NotFound {
                query: query.to_string(),
            });
        }
        Ok(matched)
    }

    /// Files of `site` (and its ancestors, root first) with matching content
    /// type, grouped by their group tag in first-discovery order.
    pub fn files_by_site_grouped(
        &self,
        site: &Site,
        content_type: ContentType,
        group_key: &str,
        default_group: &str,
    ) -> IndexMap<String, Vec<&SourceFile>> {
        let mut grouped: IndexMap<String, Vec<&SourceFile>> = IndexMap::new();
        for ancestor in self.inheritance_chain(site) {
            for entity in self.entities.iter().filter(|e| e.site == ancestor.name) {
                for file in entity.files.iter().filter(|f| f.content_type == content_type) {
                    let group = file.group(group_key, default_group);
                    grouped.entry(group).or_default().push(file);
                }
            }
        }
        grouped
    }

    /// Like `files_by_site_grouped`, but scoped to an explicit entity set.
    ///
    /// For every entity the whole inheritance chain is walked ancestor-first,
    /// so subclass bundles layer correctly over base-site modules.
    pub fn files_for_entities_grouped(
        &self,
        site: &Site,
        entities: &[&Entity],
        content_type: ContentType,
        group_key: &str,
        default_group: &str,
    ) -> IndexMap<String, Vec<&SourceFile>> {
        let mut grouped: IndexMap<String, Vec<&SourceFile>> = IndexMap::new();
        for ancestor in self.inheritance_chain(site) {
            for wanted in entities {
                let local = wanted.local_path();
                for entity in self
                    .entities
                    .iter()
                    .filter(|e| e.site == ancestor.name && e.local_path() == local)
                {
                    for file in entity.files.iter().filter(|f| f.content_type == content_type)
                    {
                        let group = file.group(group_key, default_group);
                        grouped.entry(group).or_default().push(file);
                    }
                }
            }
        }
        grouped
    }

    /// The entity owning `path`, for mapping watch notifications
    pub fn entity_for_path(&self, path: &Path) -> Option<&Entity> {
        let rel = path.strip_prefix(&self.sources_root).ok()?;
        let rel = rel.to_string_lossy().replace(std::path::MAIN_SEPARATOR, "/");
        self.entities
            .iter()
            .filter(|e| rel.starts_with(&format!("{}/", e.path_string)) || rel == e.path_string)
            .max_by_key(|e| e.path_string.len())
    }
}
