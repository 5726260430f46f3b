//! Build events and reporting
//!
//! No global logger: components receive an explicit `Reporter` and emit
//! `BuildEvent`s, rendered as human-readable lines or NDJSON for CI.

use std::path::Path;

use serde::Serialize;

/// Build event types, serialized as NDJSON in `--json` mode
#[derive(Debug, Clone, Serialize)]
#[serde(tag = "event", rename_all = "snake_case")]
pub enum BuildEvent {
    SectionStarted {
        name: String,
    },
    ManifestGenerated {
        site: String,
        group: String,
        filename: String,
    },
    BundleStarted {
        filename: String,
    },
    /// A distinct source module entered a bundle (reported once per batch)
    ModuleAdded {
        module: String,
        kilobytes: f64,
    },
    Prepended {
        path: String,
    },
    FileWritten {
        path: String,
        bytes: usize,
    },
    TranspileStarted {
        path: String,
    },
    /// Recoverable: the file is skipped, the batch continues
    TranspileFailed {
        path: String,
        message: String,
    },
    WatchStarted {
        source: String,
    },
    FileChanged {
        path: String,
    },
    RebuildStarted {
        entity: String,
    },
    RebuildComplete {
        entity: String,
        written: usize,
    },
    Error {
        message: String,
    },
    Shutdown,
}

impl BuildEvent {
    pub fn to_json(&self) -> String {
        serde_json::to_string(self).unwrap_or_else(|_| "{}".to_string())
    }

    fn human(&self) -> String {
        match self {
            BuildEvent::SectionStarted { name } => format!("==> {name}"),
            BuildEvent::ManifestGenerated {
                site,
                group,
                filename,
            } => format!("    manifest <{site}> / <{group}> -> {filename}"),
            BuildEvent::BundleStarted { filename } => format!("    bundling <{filename}>"),
            BuildEvent::ModuleAdded { module, kilobytes } => {
                format!("      added {module} <{kilobytes:.1}kb>")
            }
            BuildEvent::Prepended { path } => format!("      prepended {path}"),
            BuildEvent::FileWritten { path, bytes } => {
                format!("    wrote {path} ({bytes} bytes)")
            }
            BuildEvent::TranspileStarted { path } => format!("    transpiling <{path}>"),
            BuildEvent::TranspileFailed { path, message } => {
                format!("warning: failed transpiling <{path}>: {message}")
            }
            BuildEvent::WatchStarted { source } => format!("==> watching {source}"),
            BuildEvent::FileChanged { path } => format!("    changed {path}"),
            BuildEvent::RebuildStarted { entity } => format!("==> rebuilding <{entity}>"),
            BuildEvent::RebuildComplete { entity, written } => {
                format!("    <{entity}> done, {written} file(s)")
            }
            BuildEvent::Error { message } => format!("error: {message}"),
            BuildEvent::Shutdown => "==> shutdown".to_string(),
        }
    }
}

/// Output mode for the reporter
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ReportMode {
    #[default]
    Human,
    Json,
    Silent,
}

/// Explicitly passed event sink; cheap to clone into each stage.
#[derive(Debug, Clone, Default)]
pub struct Reporter {
    mode: ReportMode,
    verbose: bool,
}

impl Reporter {
    pub fn new(mode: ReportMode) -> Self {
        Self {
            mode,
            verbose: false,
        }
    }

    pub fn verbose(mut self, verbose: bool) -> Self {
        self.verbose = verbose;
        self
    }

    /// Silent reporter for tests and library embedding
    pub fn silent() -> Self {
        Self::new(ReportMode::Silent)
    }

    pub fn is_json(&self) -> bool {
        self.mode == ReportMode::Json
    }

    pub fn emit(&self, event: BuildEvent) {
        match self.mode {
            ReportMode::Silent => {}
            ReportMode::Json => println!("{}", event.to_json()),
            ReportMode::Human => {
                // Per-module detail only with -v
                if !self.verbose {
                    if let BuildEvent::ModuleAdded { .. } | BuildEvent::Prepended { .. } = event {
                        return;
                    }
                }
                match &event {
                    BuildEvent::TranspileFailed { .. } | BuildEvent::Error { .. } => {
                        eprintln!("{}", event.human())
                    }
                    _ => println!("{}", event.human()),
                }
            }
        }
    }

    /// Shorthand for reporting a path-bearing event
    pub fn file_written(&self, path: &Path, bytes: usize) {
        self.emit(BuildEvent::FileWritten {
            path: path.display().to_string(),
            bytes,
        });
    }
}
