//! Build configuration
//!
//! `bindery.toml` loading with unknown-key warnings and `BINDERY_*`
//! environment overrides. The configuration is read-only input to the
//! pipeline; nothing in the core mutates it.

mod loader;
mod types;

pub use loader::{load_or_default, load_with_warnings, with_env_overrides, ConfigWarning};
pub use types::{BuildConfig, CommandConfig};
