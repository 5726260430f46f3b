//! Bundle compile stage
//!
//! Source stage adapting generated manifests into calls against the
//! external bundler: include/exclude expression in, bundled source out,
//! prepends concatenated in front, one output record per manifest.

use std::collections::HashSet;
use std::path::PathBuf;

use crate::bundler::ModuleBundler;
use crate::catalog::FileCatalog;
use crate::config::BuildConfig;
use crate::error::{BinderyError, BinderyResult};
use crate::events::{BuildEvent, Reporter};
use crate::loader_config::LoaderConfig;
use crate::manifest::{bundle_expression, GeneratorParams, ManifestGenerator};
use crate::pipeline::{FileStream, Stage, StageParams, VirtualFile};

pub struct BundleStage<'a, B: ModuleBundler> {
    catalog: &'a FileCatalog,
    bundler: B,
    reporter: Reporter,
}

impl<'a, B: ModuleBundler> BundleStage<'a, B> {
    pub fn new(catalog: &'a FileCatalog, bundler: B, reporter: Reporter) -> Self {
        Self {
            catalog,
            bundler,
            reporter,
        }
    }
}

impl<B: ModuleBundler> Stage for BundleStage<'_, B> {
    fn process(
        &mut self,
        input: Option<FileStream>,
        config: &BuildConfig,
        params: &StageParams,
    ) -> BinderyResult<FileStream> {
        // Source stage: an existing stream passes through untouched
        if let Some(input) = input {
            return Ok(input);
        }

        // Fatal before any bundle is attempted
        let mut loader = LoaderConfig::read(&config.loader_config)?;
        loader.inject_derived_paths(config, self.catalog.sites());

        let generator = ManifestGenerator::new(self.catalog, config, self.reporter.clone());
        let generator_params = GeneratorParams {
            query: params.query.clone(),
            filename_template: params.filename_template.clone(),
        };
        let site_manifests = generator.generate_all(&generator_params)?;

        self.reporter.emit(BuildEvent::SectionStarted {
            name: format!("Bundling js files for <{}>", params.query),
        });

        let (tx, stream) = FileStream::channel();
        // Each distinct module is reported once per compile batch
        let mut seen_modules: HashSet<PathBuf> = HashSet::new();

        for (_site, manifests) in &site_manifests {
            for (group, manifest) in manifests {
                self.reporter.emit(BuildEvent::BundleStarted {
                    filename: manifest.filename.clone(),
                });

                let expression = bundle_expression(manifest, group, &config.default_group);
                let bundled = self
                    .bundler
                    .bundle(&expression, &loader)
                    .map_err(|message| BinderyError::BundleCompile {
                        bundle: manifest.filename.clone(),
                        message,
                    })?;

                for module in &manifest.include {
                    let path = self.catalog.sources_root().join(module);
                    if seen_modules.insert(path.clone()) {
                        self.reporter.emit(BuildEvent::ModuleAdded {
                            module: module.clone(),
                            kilobytes: crate::fs::size_kb(&path),
                        });
                    }
                }

                let mut contents = String::new();
                for prepend in &manifest.prepend {
                    contents.push_str(&std::fs::read_to_string(prepend)?);
                    self.reporter.emit(BuildEvent::Prepended {
                        path: prepend.display().to_string(),
                    });
                }
                contents.push_str(&bundled);

                let _ = tx.send(VirtualFile::new(manifest.filename.clone(), contents));
            }
        }

        Ok(stream)
    }
}
