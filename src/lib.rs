//! Bindery - javascript bundle pipeline for multi-site source trees
//!
//! Bindery scans a site-structured source tree, partitions its javascript
//! into named bundles, and drives a uniform stage pipeline to precompile,
//! bundle, decorate and write the results. A watch mode rebuilds the
//! affected entity whenever a source file changes.

pub mod activate;
pub mod bundler;
pub mod catalog;
pub mod config;
pub mod error;
pub mod events;
pub mod fs;
pub mod loader_config;
pub mod manifest;
pub mod pipeline;
pub mod template;
pub mod transpiler;
pub mod urls;
pub mod watcher;

// Re-exports for convenience
pub use bundler::{CommandBundler, ModuleBundler};
pub use catalog::{ContentType, Entity, FileCatalog, Site, SourceFile};
pub use config::{BuildConfig, ConfigWarning};
pub use error::{BinderyError, BinderyResult};
pub use events::{BuildEvent, ReportMode, Reporter};
pub use manifest::{BundleManifest, GeneratorParams, ManifestGenerator, SiteManifests};
pub use pipeline::{
    BundleStage, DecorateStage, FileStream, PrecompileStage, Stage, StageExt, StageParams,
    VirtualFile, WriteFilesStage,
};
pub use transpiler::{CommandTranspiler, IdentityTranspiler, TranspileOptions, Transpiler};
pub use watcher::{watch, WatchOptions};
