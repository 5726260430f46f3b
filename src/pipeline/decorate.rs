//! Decorate stage
//!
//! Prepends a comment banner to every file passing through. The banner
//! template supports `${date}` and `${environment}` placeholders. Without a
//! configured banner the stage is a pass-through.

use chrono::Local;

use crate::config::BuildConfig;
use crate::error::BinderyResult;
use crate::pipeline::{FileStream, Stage, StageParams, VirtualFile};

#[derive(Debug, Default)]
pub struct DecorateStage;

impl DecorateStage {
    pub fn new() -> Self {
        Self
    }

    fn render_banner(template: &str, environment: Option<&str>) -> String {
        let date = Local::now().format("%Y-%m-%d %H:%M:%S").to_string();
        template
            .replace("${date}", &date)
            .replace("${environment}", environment.unwrap_or("production"))
    }
}

impl Stage for DecorateStage {
    fn process(
        &mut self,
        input: Option<FileStream>,
        config: &BuildConfig,
        _params: &StageParams,
    ) -> BinderyResult<FileStream> {
        let input = input.unwrap_or_else(FileStream::empty);
        let banner = match &config.banner {
            Some(banner) if !banner.is_empty() => banner.clone(),
            _ => return Ok(input),
        };

        let rendered = Self::render_banner(&banner, config.environment.as_deref());
        let files = input
            .map(|file| {
                VirtualFile::new(
                    file.path,
                    format!("/** {rendered} **/\n{}", file.contents),
                )
            })
            .collect();
        Ok(FileStream::from_files(files))
    }
}
