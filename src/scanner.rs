//! Search for the newest fully published build of a version family.

use futures::future::join_all;

use crate::catalog::TargetFilter;
use crate::error::Result;
use crate::orchestrator::{ProbeOrchestrator, RecheckScope};
use crate::version::{BaseVersion, Version};

/// Options for [`VersionScanner`].
///
/// By default only unchecked builds are probed.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ScanOptions {
    /// Recheck recorded builds before scanning new ones.
    pub recheck: Option<RecheckScope>,
}

/// Finds the highest build whose packages all exist.
///
/// The search resumes after the last build recorded in the cache, so
/// builds already looked at are never probed twice.
pub struct VersionScanner<'a> {
    orchestrator: &'a ProbeOrchestrator,
    options: ScanOptions,
}

impl<'a> VersionScanner<'a> {
    pub fn new(orchestrator: &'a ProbeOrchestrator) -> Self {
        Self {
            orchestrator,
            options: ScanOptions::default(),
        }
    }

    pub fn with_options(mut self, options: ScanOptions) -> Self {
        self.options = options;
        self
    }

    /// Unchecked builds of `base` up to and including `max_builds`, highest first.
    pub async fn candidates(&self, base: BaseVersion, max_builds: u32) -> Result<Vec<Version>> {
        let last = self
            .orchestrator
            .with_cache(move |cache| cache.last_checked_version(base))
            .await?;
        let start = last.map_or(0, |v| v.build);

        Ok((start.saturating_add(1)..=max_builds)
            .rev()
            .map(|build| base.with_build(build))
            .collect())
    }

    /// Probe every candidate build concurrently and return the newest one
    /// for which every selected package was found.
    ///
    /// Returns `None` when no new build qualifies, including when the
    /// cache already covers every build up to `max_builds`.
    pub async fn find_latest_fully_available(
        &self,
        base: BaseVersion,
        max_builds: u32,
        filter: &TargetFilter,
    ) -> Result<Option<Version>> {
        if let Some(scope) = self.options.recheck {
            let changes = self.orchestrator.recheck(base, scope, filter).await?;
            if !changes.is_empty() {
                tracing::info!("Recheck updated {} packages", changes.len());
            }
        }

        let candidates = self.candidates(base, max_builds).await?;
        if candidates.is_empty() {
            tracing::info!("No unchecked builds of {} up to {}", base, max_builds);
            return Ok(None);
        }
        tracing::info!(
            "Scanning {} builds of {} ({} down to {})",
            candidates.len(),
            base,
            candidates[0].build,
            candidates[candidates.len() - 1].build
        );

        let runs = join_all(
            candidates
                .iter()
                .map(|version| self.orchestrator.run(std::slice::from_ref(version), filter)),
        )
        .await;

        let mut latest = None;
        for (version, run) in candidates.iter().zip(runs) {
            let run = run?;
            if run.summary.all_found() {
                tracing::info!("All packages found in {}", version);
                latest = latest.max(Some(*version));
            } else {
                tracing::debug!(
                    "Not all packages found in {} ({}/{})",
                    version,
                    run.summary.found,
                    run.summary.total
                );
            }
        }

        Ok(latest)
    }
}
