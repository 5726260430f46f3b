//! External transpiler boundary
//!
//! Transpilation options are fixed and non-configurable: precompiled files
//! must target the loader's module format with a deterministic injection
//! policy, independent of whatever the project's own toolchain does.

use std::io::Write;
use std::process::{Command, Stdio};

/// Fixed transpile option set
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TranspileOptions {
    /// Output module format, always the loader format
    pub module_format: &'static str,
    pub inject_helpers: bool,
    pub inject_polyfill: bool,
    pub inject_regenerator: bool,
}

impl TranspileOptions {
    /// The one supported option set.
    pub fn fixed() -> Self {
        Self {
            module_format: "system",
            inject_helpers: false,
            inject_polyfill: false,
            inject_regenerator: false,
        }
    }
}

/// Black-box transpiler: source text in, transformed source out.
///
/// Errors are plain messages; the precompile stage attaches the failing
/// file and keeps going with its siblings.
pub trait Transpiler {
    fn transpile(&self, source: &str, options: &TranspileOptions) -> Result<String, String>;
}

/// Transpiler that spawns an external command, feeding source on stdin and
/// reading the result from stdout.
#[derive(Debug, Clone)]
pub struct CommandTranspiler {
    program: String,
    args: Vec<String>,
}

impl CommandTranspiler {
    pub fn new(program: impl Into<String>, args: Vec<String>) -> Self {
        Self {
            program: program.into(),
            args,
        }
    }

    /// Build from the `[transpiler]` config table; `None` when no program
    /// is configured.
    pub fn from_config(config: &crate::config::CommandConfig) -> Option<Self> {
        config
            .program
            .as_ref()
            .map(|program| Self::new(program, config.args.clone()))
    }
}

impl Transpiler for CommandTranspiler {
    fn transpile(&self, source: &str, options: &TranspileOptions) -> Result<String, String> {
        let mut command = Command::new(&self.program);
        command
            .args(&self.args)
            .arg("--module-format")
            .arg(options.module_format);
        if !options.inject_helpers {
            command.arg("--no-helpers");
        }
        if !options.inject_polyfill {
            command.arg("--no-polyfill");
        }
        if !options.inject_regenerator {
            command.arg("--no-regenerator");
        }

        let mut child = command
            .stdin(Stdio::piped())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .spawn()
            .map_err(|e| format!("failed to spawn {}: {e}", self.program))?;

        if let Some(stdin) = child.stdin.as_mut() {
            stdin
                .write_all(source.as_bytes())
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

/// Pass-through transpiler for projects that only need activation and
/// layout, not language downleveling.
#[derive(Debug, Clone, Copy, Default)]
pub struct IdentityTranspiler;

impl Transpiler for IdentityTranspiler {
    fn transpile(&self, source: &str, _options: &TranspileOptions) -> Result<String, String> {
        Ok(source.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fixed_options_target_the_loader_format() {
        let options = TranspileOptions::fixed();
        assert_eq!(options.module_format, "system");
        assert!(!options.inject_helpers);
        assert!(!options.inject_polyfill);
        assert!(!options.inject_regenerator);
    }

    #[test]
    fn identity_transpiler_returns_source_unchanged() {
        let result = IdentityTranspiler
            .transpile("const a = 1;", &TranspileOptions::fixed())
            .unwrap();
        assert_eq!(result, "const a = 1;");
    }

    #[test]
    fn missing_program_fails_with_message() {
        let transpiler = CommandTranspiler::new("bindery-no-such-transpiler", vec![]);
        let err = transpiler
            .transpile("x", &TranspileOptions::fixed())
            .unwrap_err();
        assert!(err.contains("failed to spawn"));
    }
}
