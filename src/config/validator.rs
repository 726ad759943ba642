//! Configuration validation and resolution.
//!
//! Validation collects every problem rather than stopping at the first,
//! so all of them can be fixed at once.

use std::path::{Path, PathBuf};

use crate::config::schema::{
    ProbeConfig, Settings, DEFAULT_MAX_RETRIES, DEFAULT_TIMEOUT_SECONDS, MAX_TIMEOUT_SECONDS,
};
use crate::error::{ProbeError, Result};
use crate::probe::Concurrency;

/// Validation error with context.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidationError {
    /// Offending key.
    pub field: &'static str,
    /// Human-readable error message
    pub message: String,
}

/// Validate a configuration and return all errors.
pub fn validate_config(config: &ProbeConfig) -> Vec<ValidationError> {
    let mut errors = Vec::new();

    match config.host.as_deref().map(str::trim) {
        None | Some("") => errors.push(ValidationError {
            field: "host",
            message: "host is not set".to_string(),
        }),
        Some(_) => {}
    }

    if config.catalog.as_ref().is_none_or(|p| p.as_os_str().is_empty()) {
        errors.push(ValidationError {
            field: "catalog",
            message: "catalog path is not set".to_string(),
        });
    }

    if let Some(timeout) = config.timeout_seconds {
        if !(timeout.is_finite() && timeout > 0.0) {
            errors.push(ValidationError {
                field: "timeout_seconds",
                message: format!("timeout_seconds must be positive, got {}", timeout),
            });
        } else if timeout > MAX_TIMEOUT_SECONDS {
            errors.push(ValidationError {
                field: "timeout_seconds",
                message: format!(
                    "timeout_seconds must be at most {}, got {}",
                    MAX_TIMEOUT_SECONDS, timeout
                ),
            });
        }
    }

    if config.max_concurrency == Some(Concurrency::Bounded(0)) {
        errors.push(ValidationError {
            field: "max_concurrency",
            message: "max_concurrency must be at least 1".to_string(),
        });
    }

    if config.deadline_seconds == Some(0) {
        errors.push(ValidationError {
            field: "deadline_seconds",
            message: "deadline_seconds must be at least 1".to_string(),
        });
    }

    errors
}

/// Validate a configuration, failing on the first batch of errors.
pub fn validate(config: &ProbeConfig) -> Result<()> {
    let errors = validate_config(config);

    if errors.is_empty() {
        Ok(())
    } else {
        let messages: Vec<_> = errors.iter().map(|e| e.message.clone()).collect();
        Err(ProbeError::ConfigValidationError {
            message: messages.join("; "),
        })
    }
}

/// Validate and fill in defaults.
///
/// Relative `catalog` and `cache_dir` paths are resolved against
/// `project_root`.
pub fn resolve(config: ProbeConfig, project_root: &Path) -> Result<Settings> {
    validate(&config)?;

    let absolute = |p: PathBuf| absolute_to(project_root, p);

    Ok(Settings {
        host: config
            .host
            .unwrap_or_default()
            .trim()
            .trim_end_matches('/')
            .to_string(),
        catalog: absolute(config.catalog.unwrap_or_default()),
        cache_dir: config
            .cache_dir
            .map(absolute)
            .unwrap_or_else(crate::cache::default_cache_dir),
        max_concurrency: config.max_concurrency.unwrap_or_default(),
        timeout_seconds: config.timeout_seconds.unwrap_or(DEFAULT_TIMEOUT_SECONDS),
        max_retries: config.max_retries.unwrap_or(DEFAULT_MAX_RETRIES),
        deadline_seconds: config.deadline_seconds,
    })
}

/// Cache directory alone, for commands that never touch the network.
///
/// Host and catalog are not required here.
pub fn resolve_cache_dir(config: &ProbeConfig, project_root: &Path) -> PathBuf {
    config
        .cache_dir
        .clone()
        .map(|p| absolute_to(project_root, p))
        .unwrap_or_else(crate::cache::default_cache_dir)
}

fn absolute_to(root: &Path, path: PathBuf) -> PathBuf {
    if path.is_absolute() {
        path
    } else {
        root.join(path)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn minimal() -> ProbeConfig {
        ProbeConfig {
            host: Some("https://downloads.example.com/".into()),
            catalog: Some("packages.yml".into()),
            ..Default::default()
        }
    }

    #[test]
    fn minimal_config_is_valid() {
        assert!(validate_config(&minimal()).is_empty());
    }

    #[test]
    fn missing_host_and_catalog_are_both_reported() {
        let errors = validate_config(&ProbeConfig::default());
        let fields: Vec<_> = errors.iter().map(|e| e.field).collect();
        assert_eq!(fields, vec!["host", "catalog"]);
    }

    #[test]
    fn non_positive_timeout_is_rejected() {
        for timeout in [0.0, -1.0, f64::NAN] {
            let config = ProbeConfig {
                timeout_seconds: Some(timeout),
                ..minimal()
            };
            assert_eq!(validate_config(&config)[0].field, "timeout_seconds");
        }
    }

    #[test]
    fn oversized_timeout_is_rejected() {
        for timeout in [86_400.5, 1e30, f64::MAX] {
            let config = ProbeConfig {
                timeout_seconds: Some(timeout),
                ..minimal()
            };
            let errors = validate_config(&config);
            assert_eq!(errors.len(), 1);
            assert_eq!(errors[0].field, "timeout_seconds");
            assert!(resolve(config, Path::new("/project")).is_err());
        }

        let config = ProbeConfig {
            timeout_seconds: Some(86_400.0),
            ..minimal()
        };
        assert!(validate_config(&config).is_empty());
    }

    #[test]
    fn zero_concurrency_is_rejected() {
        let config = ProbeConfig {
            max_concurrency: Some(Concurrency::Bounded(0)),
            ..minimal()
        };
        let err = validate(&config).unwrap_err();
        assert!(err.to_string().contains("max_concurrency"));
    }

    #[test]
    fn resolve_applies_defaults() {
        let settings = resolve(minimal(), Path::new("/work")).unwrap();
        assert_eq!(settings.host, "https://downloads.example.com");
        assert_eq!(settings.catalog, PathBuf::from("/work/packages.yml"));
        assert_eq!(settings.cache_dir, crate::cache::default_cache_dir());
        assert_eq!(settings.max_concurrency, Concurrency::Unbounded);
        assert_eq!(settings.timeout_seconds, 10.0);
        assert_eq!(settings.max_retries, 2);
        assert_eq!(settings.deadline_seconds, None);
    }

    #[test]
    fn resolve_keeps_absolute_paths() {
        let config = ProbeConfig {
            catalog: Some("/etc/pkgprobe/catalog.json".into()),
            cache_dir: Some("reports".into()),
            ..minimal()
        };
        let settings = resolve(config, Path::new("/work")).unwrap();
        assert_eq!(settings.catalog, PathBuf::from("/etc/pkgprobe/catalog.json"));
        assert_eq!(settings.cache_dir, PathBuf::from("/work/reports"));
    }

    #[test]
    fn cache_dir_resolves_without_host_or_catalog() {
        let config = ProbeConfig {
            cache_dir: Some("reports".into()),
            ..Default::default()
        };
        assert_eq!(
            resolve_cache_dir(&config, Path::new("/work")),
            PathBuf::from("/work/reports")
        );
        assert_eq!(
            resolve_cache_dir(&ProbeConfig::default(), Path::new("/work")),
            crate::cache::default_cache_dir()
        );
    }

    #[test]
    fn resolve_rejects_invalid() {
        let result = resolve(ProbeConfig::default(), Path::new("/work"));
        assert!(matches!(
            result,
            Err(ProbeError::ConfigValidationError { .. })
        ));
    }
}
