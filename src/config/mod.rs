//! Configuration loading, layering, and validation for pkgprobe.
//!
//! This module handles all aspects of configuration:
//! - Schema definitions in [`schema`]
//! - File discovery and loading in [`loader`]
//! - Layering of config files in [`merger`]
//! - `PKGPROBE_*` variables in [`environment`]
//! - Validation and defaults in [`validator`]
//!
//! # Example
//!
//! ```
//! use pkgprobe::config::{load_settings, ConfigOverrides};
//! use tempfile::TempDir;
//! use std::fs;
//!
//! let temp = TempDir::new().unwrap();
//! let dir = temp.path().join(".pkgprobe");
//! fs::create_dir_all(&dir).unwrap();
//! fs::write(dir.join("config.yml"), "host: https://h/\ncatalog: catalog.yml").unwrap();
//!
//! let settings = load_settings(temp.path(), None, ConfigOverrides::default()).unwrap();
//! assert_eq!(settings.host, "https://h");
//! ```
//!
//! # Configuration Sources
//!
//! Later sources override earlier ones:
//! 1. Built-in defaults
//! 2. User global config (`~/.pkgprobe/config.yml`)
//! 3. Project config (`.pkgprobe/config.yml`) or `--config <path>`
//! 4. `PKGPROBE_*` environment variables
//! 5. Command-line flags

pub mod environment;
pub mod loader;
pub mod merger;
pub mod schema;
pub mod validator;

use std::path::{Path, PathBuf};

pub use environment::{load_system_env, overrides_from_env};
pub use loader::{load_config, load_config_value, load_merged_config, ConfigPaths, CONFIG_DIR};
pub use merger::{merge_configs, overlay};
pub use schema::{ConfigOverrides, ProbeConfig, Settings};
pub use validator::{resolve, resolve_cache_dir, validate, validate_config, ValidationError};

use crate::error::Result;

/// Load every configuration source and resolve the final settings.
///
/// `flags` are the command-line overrides and win over everything else.
pub fn load_settings(
    project_root: &Path,
    config_override: Option<&Path>,
    flags: ConfigOverrides,
) -> Result<Settings> {
    let mut config = load_config(project_root, config_override)?;
    let env = overrides_from_env(&load_system_env())?;
    config.apply(&env.merge(flags));
    resolve(config, project_root)
}

/// Resolve only the cache directory, through the same layers as
/// [`load_settings`].
pub fn load_cache_dir(
    project_root: &Path,
    config_override: Option<&Path>,
    flags: ConfigOverrides,
) -> Result<PathBuf> {
    let mut config = load_config(project_root, config_override)?;
    let env = overrides_from_env(&load_system_env())?;
    config.apply(&env.merge(flags));
    Ok(resolve_cache_dir(&config, project_root))
}
