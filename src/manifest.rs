//! Bundle manifest generation
//!
//! Partitions a site's JS corpus into named bundles: per group an include
//! set (that group's modules), an exclude set (every other module of the
//! site), a templated filename, and - for the default group - the fixed
//! bootstrap prepend list. Manifests are computed fresh on every call and
//! never persisted.

use std::path::PathBuf;

use indexmap::IndexMap;
use serde::Serialize;

use crate::catalog::{ContentType, Entity, FileCatalog, Site, WILDCARD};
use crate::config::BuildConfig;
use crate::error::BinderyResult;
use crate::events::{BuildEvent, Reporter};
use crate::template;
use crate::urls;

/// Computed description of one bundle prior to compilation
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct BundleManifest {
    /// Templated output filename, e.g. `base/common.js`
    pub filename: String,
    /// Bootstrap files concatenated before the bundled source
    pub prepend: Vec<PathBuf>,
    /// Wire-format placeholder, always empty
    pub append: Vec<PathBuf>,
    /// Module ids bundled in, insertion order preserved
    pub include: Vec<String>,
    /// Module ids subtracted, ordered as in the site's module list
    pub exclude: Vec<String>,
}

/// Group -> manifest mapping for one site, first-discovery ordered
pub type SiteManifests = IndexMap<String, BundleManifest>;

/// Parameters for one generation run
#[derive(Debug, Clone)]
pub struct GeneratorParams {
    /// Site query; `"*"` enumerates every catalog site
    pub query: String,
    /// Overrides the configured bundle filename template
    pub filename_template: Option<String>,
}

impl Default for GeneratorParams {
    fn default() -> Self {
        Self {
            query: WILDCARD.to_string(),
            filename_template: None,
        }
    }
}

/// Computes bundle manifests from the file catalog.
pub struct ManifestGenerator<'a> {
    catalog: &'a FileCatalog,
    config: &'a BuildConfig,
    reporter: Reporter,
}

impl<'a> ManifestGenerator<'a> {
    pub fn new(catalog: &'a FileCatalog, config: &'a BuildConfig, reporter: Reporter) -> Self {
        Self {
            catalog,
            config,
            reporter,
        }
    }

    /// Generate manifests for every site matched by `params.query`,
    /// in catalog order.
    pub fn generate_all(
        &self,
        params: &GeneratorParams,
    ) -> BinderyResult<Vec<(Site, SiteManifests)>> {
        let sites: Vec<&Site> = if params.query == WILDCARD {
            self.catalog.sites().iter().collect()
        } else {
            vec![self.catalog.find_site(&params.query)?]
        };

        let mut result = Vec::with_capacity(sites.len());
        for site in sites {
            let manifests = self.generate(site, params);
            result.push((site.clone(), manifests));
        }
        Ok(result)
    }

    /// Generate the group -> manifest mapping for one site.
    pub fn generate(&self, site: &Site, params: &GeneratorParams) -> SiteManifests {
        let grouped = self.catalog.files_by_site_grouped(
            site,
            ContentType::Js,
            &self.config.group_key,
            &self.config.default_group,
        );
        self.build_manifests(site, params, grouped)
    }

    /// Generate manifests scoped to an explicit entity set.
    pub fn generate_for_entities(
        &self,
        site: &Site,
        entities: &[&Entity],
        params: &GeneratorParams,
    ) -> SiteManifests {
        let grouped = self.catalog.files_for_entities_grouped(
            site,
            entities,
            ContentType::Js,
            &self.config.group_key,
            &self.config.default_group,
        );
        self.build_manifests(site, params, grouped)
    }

    fn build_manifests(
        &self,
        site: &Site,
        params: &GeneratorParams,
        grouped: IndexMap<String, Vec<&crate::catalog::SourceFile>>,
    ) -> SiteManifests {
        let template = params
            .filename_template
            .as_deref()
            .unwrap_or(&self.config.bundle_template);
        let sources_root = self.catalog.sources_root();

        // Every module of this scope, ordered and de-duplicated
        let mut all_modules: Vec<String> = Vec::new();
        for files in grouped.values() {
            for file in files {
                let module = urls::module_id(&file.path, sources_root);
                if !all_modules.contains(&module) {
                    all_modules.push(module);
                }
            }
        }

        let mut manifests = SiteManifests::new();
        for (group, files) in &grouped {
            if files.is_empty() {
                continue;
            }

            let mut include: Vec<String> = Vec::with_capacity(files.len());
            for file in files {
                let module = urls::module_id(&file.path, sources_root);
                if !include.contains(&module) {
                    include.push(module);
                }
            }

            let exclude: Vec<String> = all_modules
                .iter()
                .filter(|m| !include.contains(m))
                .cloned()
                .collect();

            let filename = template::render(template, site, group);

            let mut prepend = Vec::new();
            if group == &self.config.default_group {
                prepend.push(self.config.polyfill_file());
                prepend.push(self.config.runtime_file());
                prepend.push(self.config.loader_config.clone());
            }

            self.reporter.emit(BuildEvent::ManifestGenerated {
                site: site.name.clone(),
                group: group.clone(),
                filename: filename.clone(),
            });

            manifests.insert(
                group.clone(),
                BundleManifest {
                    filename,
                    prepend,
                    append: Vec::new(),
                    include,
                    exclude,
                },
            );
        }
        manifests
    }
}

/// Inclusion/exclusion expression for the external bundler:
/// includes joined by `+`, and - outside the default group - excludes
/// subtracted with `-`.
pub fn bundle_expression(manifest: &BundleManifest, group: &str, default_group: &str) -> String {
    let mut expression = manifest.include.join(" + ");
    if group != default_group && !manifest.exclude.is_empty() {
        expression.push_str(" - ");
        expression.push_str(&manifest.exclude.join(" - "));
    }
    expression
}
