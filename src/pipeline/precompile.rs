//! Precompile stage
//!
//! Source stage transpiling every JS file of the selected entities to the
//! loader format. Failures are per-file: the file is dropped, siblings and
//! sibling entities keep processing.

use std::path::PathBuf;

use crate::activate::activate_environment;
use crate::catalog::{ContentType, Entity, FileCatalog};
use crate::config::BuildConfig;
use crate::error::BinderyResult;
use crate::events::{BuildEvent, Reporter};
use crate::pipeline::{FileStream, Stage, StageParams, VirtualFile};
use crate::transpiler::{TranspileOptions, Transpiler};
use crate::urls;

pub struct PrecompileStage<'a, T: Transpiler> {
    catalog: &'a FileCatalog,
    transpiler: T,
    reporter: Reporter,
}

impl<'a, T: Transpiler> PrecompileStage<'a, T> {
    pub fn new(catalog: &'a FileCatalog, transpiler: T, reporter: Reporter) -> Self {
        Self {
            catalog,
            transpiler,
            reporter,
        }
    }

    /// Transpile one entity's JS files.
    ///
    /// Never fails the batch for a bad file; the returned sequence simply
    /// lacks it.
    pub fn process_entity(
        &mut self,
        entity: &Entity,
        config: &BuildConfig,
    ) -> Vec<VirtualFile> {
        let sources_root = self.catalog.sources_root();
        let options = TranspileOptions::fixed();
        let mut result = Vec::new();

        for file in entity
            .files
            .iter()
            .filter(|f| f.content_type == ContentType::Js)
        {
            let relative = PathBuf::from(urls::module_id(&file.path, sources_root));
            self.reporter.emit(BuildEvent::TranspileStarted {
                path: relative.display().to_string(),
            });

            let source = match std::fs::read_to_string(&file.path) {
                Ok(source) => source,
                Err(e) => {
                    self.reporter.emit(BuildEvent::TranspileFailed {
                        path: relative.display().to_string(),
                        message: e.to_string(),
                    });
                    continue;
                }
            };

            let activated = activate_environment(&source, config.environment.as_deref());
            match self.transpiler.transpile(&activated, &options) {
                Ok(contents) => result.push(VirtualFile::new(relative, contents)),
                Err(message) => {
                    self.reporter.emit(BuildEvent::TranspileFailed {
                        path: relative.display().to_string(),
                        message,
                    });
                }
            }
        }
        result
    }

    /// Fan out over every entity matched by `query`, catalog order.
    pub fn process_entities(
        &mut self,
        config: &BuildConfig,
        query: &str,
    ) -> BinderyResult<Vec<VirtualFile>> {
        let entities: Vec<Entity> = self
            .catalog
            .entities(query)?
            .into_iter()
            .cloned()
            .collect();
        let mut result = Vec::new();
        for entity in &entities {
            result.extend(self.process_entity(entity, config));
        }
        Ok(result)
    }
}

impl<T: Transpiler> Stage for PrecompileStage<'_, T> {
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

        self.reporter.emit(BuildEvent::SectionStarted {
            name: format!("Precompiling js files for <{}>", params.query),
        });

        let files = self.process_entities(config, &params.query)?;
        Ok(FileStream::from_files(files))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::{Site, SourceFile};
    use crate::pipeline::StageExt;
    use std::fs;
    use tempfile::tempdir;

    /// Fails for any source containing "boom".
    struct TouchyTranspiler;

    impl Transpiler for TouchyTranspiler {
        fn transpile(&self, source: &str, _options: &TranspileOptions) -> Result<String, String> {
            if source.contains("boom") {
                return Err("unexpected token".to_string());
            }
            Ok(format!("System.register([], function () {{ {source} }});"))
        }
    }

    fn project() -> (tempfile::TempDir, FileCatalog, BuildConfig) {
        let dir = tempdir().unwrap();
        let root = dir.path().join("sources");

        let good = root.join("base/global/js/bootstrap.js");
        let bad = root.join("base/modules/broken/js/broken.js");
        fs::create_dir_all(good.parent().unwrap()).unwrap();
        fs::create_dir_all(bad.parent().unwrap()).unwrap();
        fs::write(&good, "const ok = 1;\n").unwrap();
        fs::write(&bad, "boom(\n").unwrap();

        let mut catalog = FileCatalog::new(&root);
        catalog.add_site(Site::new("base"));
        catalog.add_entity(
            Entity::new("base", "base/global/js").with_file(SourceFile::new(good, "base")),
        );
        catalog.add_entity(
            Entity::new("base", "base/modules/broken").with_file(SourceFile::new(bad, "base")),
        );

        let mut config = BuildConfig::default();
        config.sources_path = root;
        (dir, catalog, config)
    }

    #[test]
    fn failing_file_is_dropped_but_siblings_survive() {
        let (_dir, catalog, config) = project();
        let mut stage = PrecompileStage::new(&catalog, TouchyTranspiler, Reporter::silent());

        let out = stage.run(&config, &StageParams::default()).unwrap();
        assert_eq!(out.len(), 1);
        assert_eq!(out[0].path, PathBuf::from("base/global/js/bootstrap.js"));
        assert!(out[0].contents.starts_with("System.register"));
    }

    #[test]
    fn failing_entity_yields_empty_sequence_without_error() {
        let (_dir, catalog, config) = project();
        let mut stage = PrecompileStage::new(&catalog, TouchyTranspiler, Reporter::silent());

        let entity = catalog.entities("base/modules/broken").unwrap()[0].clone();
        let out = stage.process_entity(&entity, &config);
        assert!(out.is_empty());
    }

    #[test]
    fn query_scopes_without_reordering_and_unknown_query_fails() {
        let (_dir, catalog, config) = project();
        let mut stage = PrecompileStage::new(&catalog, TouchyTranspiler, Reporter::silent());

        let scoped = stage.process_entities(&config, "base/global/js").unwrap();
        assert_eq!(scoped.len(), 1);

        assert!(stage.process_entities(&config, "nope").is_err());
    }

    #[test]
    fn environment_blocks_are_activated_before_transpiling() {
        let (dir, mut catalog, mut config) = project();
        let root = dir.path().join("sources");
        let guarded = root.join("base/global/js/guarded.js");
        fs::write(
            &guarded,
            "/* +environment: development */debug();/* -environment */run();\n",
        )
        .unwrap();
        catalog.add_entity(
            Entity::new("base", "base/global/guarded")
                .with_file(SourceFile::new(&guarded, "base")),
        );

        config.environment = Some("development".to_string());
        let mut stage = PrecompileStage::new(&catalog, TouchyTranspiler, Reporter::silent());
        let out = stage
            .process_entities(&config, "base/global/guarded")
            .unwrap();
        assert!(out[0].contents.contains("debug();"));

        config.environment = None;
        let mut stage = PrecompileStage::new(&catalog, TouchyTranspiler, Reporter::silent());
        let out = stage
            .process_entities(&config, "base/global/guarded")
            .unwrap();
        assert!(!out[0].contents.contains("debug();"));
        assert!(out[0].contents.contains("run();"));
    }
}
