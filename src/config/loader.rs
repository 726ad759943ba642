//! Configuration file discovery and loading.
//!
//! This module handles finding and loading configuration files from
//! various locations in the correct priority order.

use crate::config::merger::merge_configs;
use crate::config::schema::ProbeConfig;
use crate::error::{ProbeError, Result};
use std::fs;
use std::path::{Path, PathBuf};

/// Name of the per-user and per-project config directory.
pub const CONFIG_DIR: &str = ".pkgprobe";

/// Paths to configuration files in priority order (later overrides earlier).
///
/// Merge order:
/// 1. User global config (`~/.pkgprobe/config.yml`)
/// 2. Project config (`.pkgprobe/config.yml`), or an explicit `--config` file
#[derive(Debug, Clone, Default)]
pub struct ConfigPaths {
    /// User's global config: ~/.pkgprobe/config.yml
    pub user_global: Option<PathBuf>,

    /// Project config: .pkgprobe/config.yml
    pub project: Option<PathBuf>,
}

impl ConfigPaths {
    /// Discover config files for the given project root.
    pub fn discover(project_root: &Path) -> Self {
        Self {
            user_global: Self::find_user_global(),
            project: existing(project_root.join(CONFIG_DIR).join("config.yml")),
        }
    }

    /// Discover the user config, but use `path` instead of the project config.
    ///
    /// Unlike discovered files, an explicit path must exist.
    pub fn with_override(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Err(ProbeError::ConfigNotFound {
                path: path.to_path_buf(),
            });
        }
        Ok(Self {
            user_global: Self::find_user_global(),
            project: Some(path.to_path_buf()),
        })
    }

    fn find_user_global() -> Option<PathBuf> {
        existing(dirs::home_dir()?.join(CONFIG_DIR).join("config.yml"))
    }

    /// Returns all existing config paths in merge order.
    pub fn all_existing(&self) -> Vec<&PathBuf> {
        self.user_global.iter().chain(self.project.iter()).collect()
    }
}

fn existing(path: PathBuf) -> Option<PathBuf> {
    path.exists().then_some(path)
}

/// Load a config file as raw YAML Value (for merging).
pub fn load_config_value(path: &Path) -> Result<serde_yaml::Value> {
    let content = fs::read_to_string(path).map_err(|e| {
        if e.kind() == std::io::ErrorKind::NotFound {
            ProbeError::ConfigNotFound {
                path: path.to_path_buf(),
            }
        } else {
            ProbeError::Io(e)
        }
    })?;

    serde_yaml::from_str(&content).map_err(|e| ProbeError::ConfigParseError {
        path: path.to_path_buf(),
        message: e.to_string(),
    })
}

/// Load and merge the config files in `paths`.
///
/// No config file at all is not an error; the result is then all defaults.
///
/// # Errors
///
/// Returns `ConfigParseError` if any config file is invalid.
pub fn load_merged_config(paths: &ConfigPaths) -> Result<ProbeConfig> {
    let mut values = Vec::new();
    for path in paths.all_existing() {
        tracing::debug!("Loading config {}", path.display());
        values.push(load_config_value(path)?);
    }

    let merged = merge_configs(&values);
    let source = paths
        .all_existing()
        .last()
        .map(|p| p.to_path_buf())
        .unwrap_or_else(|| PathBuf::from(CONFIG_DIR).join("config.yml"));

    serde_yaml::from_value(merged).map_err(|e| ProbeError::ConfigParseError {
        path: source,
        message: e.to_string(),
    })
}

/// Load config for a project, with an optional explicit config file.
pub fn load_config(project_root: &Path, config_override: Option<&Path>) -> Result<ProbeConfig> {
    let paths = match config_override {
        Some(path) => ConfigPaths::with_override(path)?,
        None => ConfigPaths::discover(project_root),
    };
    load_merged_config(&paths)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::probe::Concurrency;
    use tempfile::TempDir;

    fn project_with(content: &str) -> TempDir {
        let temp = TempDir::new().unwrap();
        let dir = temp.path().join(CONFIG_DIR);
        fs::create_dir_all(&dir).unwrap();
        fs::write(dir.join("config.yml"), content).unwrap();
        temp
    }

    #[test]
    fn discover_finds_project_config() {
        let temp = project_with("host: https://h");
        let paths = ConfigPaths::discover(temp.path());
        assert!(paths.project.is_some());
    }

    #[test]
    fn discover_returns_none_for_missing_project_config() {
        let temp = TempDir::new().unwrap();
        let paths = ConfigPaths::discover(temp.path());
        assert!(paths.project.is_none());
    }

    #[test]
    fn merged_layers_prefer_project() {
        let temp = TempDir::new().unwrap();
        let user = temp.path().join("user.yml");
        let project = temp.path().join("project.yml");
        fs::write(&user, "host: https://user\nmax_concurrency: 8\nmax_retries: 5").unwrap();
        fs::write(&project, "host: https://project\nmax_concurrency: null").unwrap();

        let paths = ConfigPaths {
            user_global: Some(user),
            project: Some(project),
        };
        let config = load_merged_config(&paths).unwrap();
        assert_eq!(config.host.as_deref(), Some("https://project"));
        assert_eq!(config.max_concurrency, None);
        assert_eq!(config.max_retries, Some(5));
    }

    #[test]
    fn no_files_means_defaults() {
        let config = load_merged_config(&ConfigPaths::default()).unwrap();
        assert_eq!(config, ProbeConfig::default());
    }

    #[test]
    fn load_config_reads_project_file() {
        let temp = project_with("catalog: packages.yml\nmax_concurrency: 3");
        let config = load_config(temp.path(), None).unwrap();
        assert_eq!(config.catalog, Some(PathBuf::from("packages.yml")));
        assert_eq!(config.max_concurrency, Some(Concurrency::Bounded(3)));
    }

    #[test]
    fn load_config_override_must_exist() {
        let temp = TempDir::new().unwrap();
        let result = load_config(temp.path(), Some(&temp.path().join("nope.yml")));
        assert!(matches!(result, Err(ProbeError::ConfigNotFound { .. })));
    }

    #[test]
    fn invalid_yaml_returns_parse_error() {
        let temp = project_with("host: [unclosed");
        let result = load_config(temp.path(), None);
        assert!(matches!(result, Err(ProbeError::ConfigParseError { .. })));
    }

    #[test]
    fn wrong_type_returns_parse_error() {
        let temp = project_with("max_retries: lots");
        let result = load_config(temp.path(), None);
        assert!(matches!(result, Err(ProbeError::ConfigParseError { .. })));
    }
}
