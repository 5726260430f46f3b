//! External module bundler boundary
//!
//! The bundler resolves and concatenates module graphs; this core only
//! builds its inclusion/exclusion expression and path mapping. A bundler
//! value is exclusively owned by one in-flight compile call (`&mut self`)
//! because its configuration is per-run state.

use std::io::Write;
use std::process::{Command, Stdio};

use crate::loader_config::LoaderConfig;

/// Black-box bundler: expression + path mapping in, bundle source out.
///
/// Errors are plain messages; the compile stage attaches the failing
/// bundle's name and aborts the batch.
pub trait ModuleBundler {
    fn bundle(&mut self, expression: &str, loader: &LoaderConfig) -> Result<String, String>;
}

/// Bundler that spawns an external command.
///
/// Contract: the loader configuration (JSON) is fed on stdin, the module
/// expression is the final argument, the bundle source is read from stdout.
#[derive(Debug, Clone)]
pub struct CommandBundler {
    program: String,
    args: Vec<String>,
}

impl CommandBundler {
    pub fn new(program: impl Into<String>, args: Vec<String>) -> Self {
        Self {
            program: program.into(),
            args,
        }
    }

    /// Build from the `[bundler]` config table; `None` when no program is
    /// configured.
    pub fn from_config(config: &crate::config::CommandConfig) -> Option<Self> {
        config
            .program
            .as_ref()
            .map(|program| Self::new(program, config.args.clone()))
    }
}

impl ModuleBundler for CommandBundler {
    fn bundle(&mut self, expression: &str, loader: &LoaderConfig) -> Result<String, String> {
        let loader_json = serde_json::to_string(loader).map_err(|e| e.to_string())?;

        let mut child = Command::new(&self.program)
            .args(&self.args)
            .arg(expression)
            .stdin(Stdio::piped())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .spawn()
            .map_err(|e| format!("failed to spawn {}: {e}", self.program))?;

        if let Some(stdin) = child.stdin.as_mut() {
            stdin
                .write_all(loader_json.as_bytes())
                .map_err(|e| e.to_string())?;
        }

        let output = child.wait_with_output().map_err(|e| e.to_string())?;
        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            return Err(format!(
                "{} exited with {}: {}",
                self.program,
                output.status,
                stderr.trim()
            ));
        }

        String::from_utf8(output.stdout).map_err(|e| e.to_string())
    }
}
