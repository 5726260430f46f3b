//! Write stage
//!
//! Sink stage persisting every incoming file below a root directory. Writes
//! are atomic (temp file + rename) and records are forwarded downstream so
//! further stages or the driver can still observe them.

use std::path::PathBuf;

use crate::config::BuildConfig;
use crate::error::BinderyResult;
use crate::events::Reporter;
use crate::fs;
use crate::pipeline::{FileStream, Stage, StageParams};

pub struct WriteFilesStage {
    default_root: PathBuf,
    reporter: Reporter,
}

impl WriteFilesStage {
    pub fn new(default_root: impl Into<PathBuf>, reporter: Reporter) -> Self {
        Self {
            default_root: default_root.into(),
            reporter,
        }
    }
}

impl Stage for WriteFilesStage {
    fn process(
        &mut self,
        input: Option<FileStream>,
        _config: &BuildConfig,
        params: &StageParams,
    ) -> BinderyResult<FileStream> {
        let input = input.unwrap_or_else(FileStream::empty);
        let root = params
            .destination
            .as_deref()
            .unwrap_or(&self.default_root);

        let mut written = Vec::new();
        for file in input {
            let target = root.join(&file.path);
            // Unchanged outputs keep their mtime so downstream watchers
            // do not re-trigger
            let unchanged = std::fs::read(&target)
                .map(|existing| fs::hash_content(&existing) == fs::hash_content(file.contents.as_bytes()))
                .unwrap_or(false);
            if !unchanged {
                fs::write_atomic(&target, file.contents.as_bytes())?;
                self.reporter.file_written(&target, file.contents.len());
            }
            written.push(file);
        }
        Ok(FileStream::from_files(written))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pipeline::VirtualFile;
    use tempfile::tempdir;

    fn stream() -> FileStream {
        FileStream::from_files(vec![
            VirtualFile::new("base/global/js/bootstrap.js", "bootstrap();"),
            VirtualFile::new("base/common.js", "common();"),
        ])
    }

    #[test]
    fn files_land_below_the_default_root_with_parents_created() {
        let dir = tempdir().unwrap();
        let mut stage = WriteFilesStage::new(dir.path(), Reporter::silent());

        let out = stage
            .process(
                Some(stream()),
                &BuildConfig::default(),
                &StageParams::default(),
            )
            .unwrap()
            .collect();

        assert_eq!(out.len(), 2);
        let written = std::fs::read_to_string(dir.path().join("base/global/js/bootstrap.js"))
            .unwrap();
        assert_eq!(written, "bootstrap();");
    }

    #[test]
    fn destination_parameter_overrides_the_default_root() {
        let default = tempdir().unwrap();
        let other = tempdir().unwrap();
        let mut stage = WriteFilesStage::new(default.path(), Reporter::silent());

        let params = StageParams {
            destination: Some(other.path().to_path_buf()),
            ..StageParams::default()
        };
        stage
            .process(Some(stream()), &BuildConfig::default(), &params)
            .unwrap()
            .collect();

        assert!(other.path().join("base/common.js").exists());
        assert!(!default.path().join("base/common.js").exists());
    }

    #[test]
    fn unchanged_content_is_not_rewritten() {
        let dir = tempdir().unwrap();
        let mut stage = WriteFilesStage::new(dir.path(), Reporter::silent());
        let params = StageParams::default();
        let config = BuildConfig::default();

        stage
            .process(Some(stream()), &config, &params)
            .unwrap()
            .collect();
        let target = dir.path().join("base/common.js");
        let first = std::fs::metadata(&target).unwrap().modified().unwrap();

        std::thread::sleep(std::time::Duration::from_millis(20));
        stage
            .process(Some(stream()), &config, &params)
            .unwrap()
            .collect();
        let second = std::fs::metadata(&target).unwrap().modified().unwrap();
        assert_eq!(first, second);
    }

    #[test]
    fn records_are_forwarded_unchanged() {
        let dir = tempdir().unwrap();
        let mut stage = WriteFilesStage::new(dir.path(), Reporter::silent());

        let out = stage
            .process(
                Some(stream()),
                &BuildConfig::default(),
                &StageParams::default(),
            )
            .unwrap()
            .collect();
        assert_eq!(out[1].contents, "common();");
    }
}
