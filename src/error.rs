//! Error types for bindery
//!
//! Library errors use `thiserror`; the binary wraps them in `anyhow`.

use std::path::PathBuf;
use thiserror::Error;

/// Result type alias for bindery operations
pub type BinderyResult<T> = Result<T, BinderyError>;

/// Main error type for bindery operations
#[derive(Error, Debug)]
pub enum BinderyError {
    /// A site or entity query matched nothing
    #[error("nothing matched query '{query}'")]
    NotFound { query: String },

    /// A single source file failed to transpile.
    ///
    /// Recoverable: the file is dropped, siblings keep processing.
    #[error("failed to transpile {file}: {message}")]
    Transpile { file: PathBuf, message: String },

    /// The external bundler failed for a manifest.
    ///
    /// Fatal for the whole compile batch.
    #[error("failed to compile bundle '{bundle}': {message}")]
    BundleCompile { bundle: String, message: String },

    /// Module-loader configuration source unreadable or unparseable
    #[error("cannot read loader configuration {file}: {message}")]
    ConfigurationRead { file: PathBuf, message: String },

    /// Invalid bindery.toml or sidecar configuration
    #[error("invalid configuration in {file}: {message}")]
    InvalidConfig { file: PathBuf, message: String },

    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl BinderyError {
    /// Per-item errors are reported and skipped; everything else fails the run.
    pub fn is_recoverable(&self) -> bool {
        matches!(self, BinderyError::Transpile { .. })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    #[test]
    fn test_error_display_not_found() {
        let err = BinderyError::NotFound {
            query: "base/elements".to_string(),
        };
        assert_eq!(err.to_string(), "nothing matched query 'base/elements'");
    }

    #[test]
    fn test_error_display_bundle_compile() {
        let err = BinderyError::BundleCompile {
            bundle: "base/common.js".to_string(),
            message: "module not found".to_string(),
        };
        assert_eq!(
            err.to_string(),
            "failed to compile bundle 'base/common.js': module not found"
        );
    }

    #[test]
    fn test_transpile_errors_are_recoverable() {
        let err = BinderyError::Transpile {
            file: PathBuf::from("base/global/js/bootstrap.js"),
            message: "unexpected token".to_string(),
        };
        assert!(err.is_recoverable());

        let fatal = BinderyError::ConfigurationRead {
            file: PathBuf::from("loader.js"),
            message: "not json".to_string(),
        };
        assert!(!fatal.is_recoverable());
    }
}
