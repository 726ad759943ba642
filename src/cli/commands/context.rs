//! Shared setup for commands: settings, the orchestrator and the runtime.

use std::future::Future;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;

use indicatif::ProgressBar;

use crate::cache::AvailabilityCache;
use crate::catalog::TargetCatalog;
use crate::config::{load_cache_dir, load_settings, ConfigOverrides, Settings};
use crate::error::{ProbeError, Result};
use crate::orchestrator::{ProbeOrchestrator, ProgressCallback, RunProgress};
use crate::probe::Prober;
use crate::ui::show_as_bar;

/// Where a command finds its configuration.
#[derive(Debug, Clone, Default)]
pub struct CommandContext {
    project_root: PathBuf,
    config_override: Option<PathBuf>,
    overrides: ConfigOverrides,
}

impl CommandContext {
    pub fn new(
        project_root: impl Into<PathBuf>,
        config_override: Option<PathBuf>,
        overrides: ConfigOverrides,
    ) -> Self {
        Self {
            project_root: project_root.into(),
            config_override,
            overrides,
        }
    }

    pub fn project_root(&self) -> &Path {
        &self.project_root
    }

    /// Fully resolved settings; host and catalog must be configured.
    pub fn settings(&self) -> Result<Settings> {
        load_settings(
            &self.project_root,
            self.config_override.as_deref(),
            self.overrides.clone(),
        )
    }

    /// The cache alone, for commands that never probe.
    pub fn cache(&self) -> Result<AvailabilityCache> {
        let dir = load_cache_dir(
            &self.project_root,
            self.config_override.as_deref(),
            self.overrides.clone(),
        )?;
        tracing::debug!("Using cache directory {}", dir.display());
        Ok(AvailabilityCache::new(dir))
    }
}

/// Load the catalog and build an orchestrator from `settings`.
pub fn build_orchestrator(settings: &Settings) -> Result<ProbeOrchestrator> {
    let catalog = TargetCatalog::load(&settings.catalog, &settings.host)?;
    let prober = Prober::new(settings.prober_options())?;
    tracing::debug!(
        "Catalog {} with {} categories, concurrency {}",
        settings.catalog.display(),
        catalog.categories().len(),
        settings.max_concurrency
    );
    Ok(ProbeOrchestrator::new(
        catalog,
        prober,
        AvailabilityCache::new(&settings.cache_dir),
    ))
}

/// Drive `bar` from orchestrator progress events.
pub fn progress_to_bar(bar: ProgressBar) -> ProgressCallback {
    Arc::new(move |event| match event {
        RunProgress::VersionStarting { version, targets } => {
            bar.set_message(format!("Checking {} ({} packages)", version, targets));
        }
        RunProgress::Batch { progress, .. } => {
            show_as_bar(&bar, progress.total as u64);
            bar.set_position(progress.completed as u64);
        }
        RunProgress::VersionFinished { version, found } => {
            tracing::debug!("{}: {} found", version, found);
        }
    })
}

/// Run `future` to completion on a fresh runtime, within `deadline` if set.
pub fn run_async<T, F>(deadline: Option<Duration>, future: F) -> Result<T>
where
    F: Future<Output = Result<T>>,
{
    let runtime = tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .build()?;

    runtime.block_on(async move {
        match deadline {
            Some(limit) => tokio::time::timeout(limit, future)
                .await
                .map_err(|_| ProbeError::DeadlineExceeded {
                    seconds: limit.as_secs(),
                })?,
            None => future.await,
        }
    })
}
