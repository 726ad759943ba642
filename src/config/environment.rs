//! Environment variable overrides.
//!
//! Every setting can be supplied as a `PKGPROBE_*` variable. Environment
//! values override config files and are themselves overridden by flags.

use std::collections::HashMap;
use std::path::PathBuf;

use crate::config::schema::ConfigOverrides;
use crate::error::{ProbeError, Result};
use crate::probe::Concurrency;

pub const ENV_HOST: &str = "PKGPROBE_HOST";
pub const ENV_CATALOG: &str = "PKGPROBE_CATALOG";
pub const ENV_CACHE_DIR: &str = "PKGPROBE_CACHE_DIR";
pub const ENV_MAX_CONCURRENCY: &str = "PKGPROBE_MAX_CONCURRENCY";
pub const ENV_TIMEOUT: &str = "PKGPROBE_TIMEOUT";
pub const ENV_MAX_RETRIES: &str = "PKGPROBE_MAX_RETRIES";

/// Load environment variables from system.
pub fn load_system_env() -> HashMap<String, String> {
    std::env::vars().collect()
}

/// Read overrides from a set of environment variables.
///
/// Empty values are ignored.
///
/// # Errors
///
/// Returns `ConfigValidationError` when a numeric variable does not parse.
pub fn overrides_from_env(env: &HashMap<String, String>) -> Result<ConfigOverrides> {
    let get = |key: &str| env.get(key).map(|v| v.trim()).filter(|v| !v.is_empty());

    let max_concurrency = get(ENV_MAX_CONCURRENCY)
        .map(|v| v.parse::<Concurrency>().map_err(|e| invalid(ENV_MAX_CONCURRENCY, &e)))
        .transpose()?;
    let timeout_seconds = get(ENV_TIMEOUT)
        .map(|v| v.parse::<f64>().map_err(|e| invalid(ENV_TIMEOUT, &e.to_string())))
        .transpose()?;
    let max_retries = get(ENV_MAX_RETRIES)
        .map(|v| v.parse::<u32>().map_err(|e| invalid(ENV_MAX_RETRIES, &e.to_string())))
        .transpose()?;

    Ok(ConfigOverrides {
        host: get(ENV_HOST).map(str::to_string),
        catalog: get(ENV_CATALOG).map(PathBuf::from),
        cache_dir: get(ENV_CACHE_DIR).map(PathBuf::from),
        max_concurrency,
        timeout_seconds,
        max_retries,
        deadline_seconds: None,
    })
}

fn invalid(key: &str, message: &str) -> ProbeError {
    ProbeError::ConfigValidationError {
        message: format!("{}: {}", key, message),
    }
}
