//! Pipeline and stage composition
//!
//! Every build step is a `Stage`: stream of file records in, stream out.
//! A stage given no input is a source stage and populates its own output;
//! a stage given an input transforms record by record. Stages compose with
//! `pipe` and are driven to completion with `run`.
//!
//! Streams are FIFO channels filled synchronously on the caller - no OS
//! threads, matching the strictly sequential execution model. Dropping the
//! sender is the end-of-stream signal.

mod bundle;
mod decorate;
mod precompile;
mod write;

use std::path::PathBuf;
use std::sync::mpsc::{channel, Receiver, Sender};

use crate::config::BuildConfig;
use crate::error::BinderyResult;

pub use bundle::BundleStage;
pub use decorate::DecorateStage;
pub use precompile::PrecompileStage;
pub use write::WriteFilesStage;

/// An in-memory file record flowing through the pipeline
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VirtualFile {
    /// Output-relative path
    pub path: PathBuf,
    pub contents: String,
}

impl VirtualFile {
    pub fn new(path: impl Into<PathBuf>, contents: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            contents: contents.into(),
        }
    }
}

/// FIFO stream of file records; iteration ends when every sender is gone.
pub struct FileStream {
    rx: Receiver<VirtualFile>,
}

impl FileStream {
    /// New stream plus the sender that feeds it
    pub fn channel() -> (Sender<VirtualFile>, FileStream) {
        let (tx, rx) = channel();
        (tx, FileStream { rx })
    }

    /// Already-closed stream holding the given records
    pub fn from_files(files: Vec<VirtualFile>) -> FileStream {
        let (tx, stream) = Self::channel();
        for file in files {
            let _ = tx.send(file);
        }
        stream
    }

    /// Closed, empty stream
    pub fn empty() -> FileStream {
        Self::from_files(Vec::new())
    }

    /// Drain the stream to completion
    pub fn collect(self) -> Vec<VirtualFile> {
        Iterator::collect(self.into_iter())
    }
}

impl Iterator for FileStream {
    type Item = VirtualFile;

    fn next(&mut self) -> Option<VirtualFile> {
        self.rx.recv().ok()
    }
}

/// Per-run stage parameters
#[derive(Debug, Clone)]
pub struct StageParams {
    /// Site/entity query, `"*"` by default
    pub query: String,
    /// Overrides the configured write root of the sink stage
    pub destination: Option<PathBuf>,
    /// Overrides the configured bundle filename template
    pub filename_template: Option<String>,
}

impl Default for StageParams {
    fn default() -> Self {
        Self {
            query: crate::catalog::WILDCARD.to_string(),
            destination: None,
            filename_template: None,
        }
    }
}

impl StageParams {
    pub fn with_query(query: impl Into<String>) -> Self {
        Self {
            query: query.into(),
            ..Default::default()
        }
    }
}

/// One unit of the pipeline.
///
/// `&mut self` keeps any wrapped external adapter exclusively owned by the
/// in-flight run; a stage instance is single-use per `run`.
pub trait Stage {
    fn process(
        &mut self,
        input: Option<FileStream>,
        config: &BuildConfig,
        params: &StageParams,
    ) -> BinderyResult<FileStream>;
}

/// Composition and driving, available on every stage
pub trait StageExt: Stage + Sized {
    /// Chain `next` after this stage; chains associate left to right.
    fn pipe<S: Stage>(self, next: S) -> Piped<Self, S> {
        Piped {
            first: self,
            second: next,
        }
    }

    /// Drive the chain to completion and return what the tail emitted.
    fn run(
        &mut self,
        config: &BuildConfig,
        params: &StageParams,
    ) -> BinderyResult<Vec<VirtualFile>> {
        Ok(self.process(None, config, params)?.collect())
    }
}

impl<T: Stage> StageExt for T {}

/// Two stages composed into one
pub struct Piped<A, B> {
    first: A,
    second: B,
}

impl<A: Stage, B: Stage> Stage for Piped<A, B> {
    fn process(
        &mut self,
        input: Option<FileStream>,
        config: &BuildConfig,
        params: &StageParams,
    ) -> BinderyResult<FileStream> {
        let intermediate = self.first.process(input, config, params)?;
        self.second.process(Some(intermediate), config, params)
    }
}
