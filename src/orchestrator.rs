//! Probe run orchestration.
//!
//! Ties the catalog, the prober and the cache together: expand each
//! version into targets, probe them, persist what was learned and group
//! the outcome into a report.

use std::collections::BTreeMap;
use std::sync::Arc;
use std::time::{Duration, Instant};

use anyhow::Context;
use indexmap::IndexMap;
use serde::Serialize;

use crate::cache::{AvailabilityCache, CacheRow, CacheTable, Lookup};
use crate::catalog::{TargetCatalog, TargetFilter};
use crate::error::Result;
use crate::probe::{BatchProgress, Existence, ProbeResult, Prober};
use crate::version::{BaseVersion, Version};

/// Progress events emitted while a run is in flight.
#[derive(Debug, Clone, Copy)]
pub enum RunProgress {
    /// A version is about to be probed.
    VersionStarting { version: Version, targets: usize },
    /// A sub-batch of a large version finished.
    Batch {
        version: Version,
        progress: BatchProgress,
    },
    /// A version finished.
    VersionFinished { version: Version, found: usize },
}

/// Callback receiving [`RunProgress`] events.
pub type ProgressCallback = Arc<dyn Fn(RunProgress) + Send + Sync>;

/// One package line of a [`GroupedReport`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ReportEntry {
    pub url: String,
    /// `true`, `false` or `null` when the probe was inconclusive.
    pub result: Existence,
    pub status_code: Option<u16>,
    pub error: Option<String>,
}

/// version → category → package → outcome.
///
/// Versions are sorted; categories and packages keep catalog order.
pub type GroupedReport = BTreeMap<Version, IndexMap<String, IndexMap<String, ReportEntry>>>;

/// Counts over a set of results.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct ProbeSummary {
    pub total: usize,
    pub found: usize,
    pub not_found: usize,
    /// Inconclusive probes.
    pub errors: usize,
}

impl ProbeSummary {
    pub fn from_results(results: &[ProbeResult]) -> Self {
        let mut summary = Self {
            total: results.len(),
            ..Self::default()
        };
        for result in results {
            match result.exists {
                Existence::Found => summary.found += 1,
                Existence::Missing => summary.not_found += 1,
                Existence::Unknown => summary.errors += 1,
            }
        }
        summary
    }

    /// At least one result, and every result found.
    pub fn all_found(&self) -> bool {
        self.total > 0 && self.found == self.total
    }
}

/// Outcome of [`ProbeOrchestrator::run`].
#[derive(Debug, Clone)]
pub struct ProbeRun {
    pub report: GroupedReport,
    /// Flat results, in the order they were probed.
    pub results: Vec<ProbeResult>,
    pub summary: ProbeSummary,
    pub duration: Duration,
}

impl ProbeRun {
    /// Results belonging to one version.
    pub fn results_for<'a>(&'a self, version: &'a Version) -> impl Iterator<Item = &'a ProbeResult> {
        self.results.iter().filter(move |r| r.version == *version)
    }
}

/// Which recorded versions a recheck covers.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RecheckScope {
    /// The newest `n` recorded builds.
    Latest(usize),
    /// Every recorded build.
    All,
}

impl Default for RecheckScope {
    fn default() -> Self {
        Self::Latest(2)
    }
}

/// A package whose probed state differs from what the cache held.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StatusChange {
    pub version: Version,
    pub category: String,
    pub name: String,
    pub previous: Lookup,
    pub current: Existence,
}

/// Runs probes for versions and keeps the cache current.
pub struct ProbeOrchestrator {
    catalog: TargetCatalog,
    prober: Prober,
    cache: AvailabilityCache,
    on_progress: Option<ProgressCallback>,
}

impl ProbeOrchestrator {
    pub fn new(catalog: TargetCatalog, prober: Prober, cache: AvailabilityCache) -> Self {
        Self {
            catalog,
            prober,
            cache,
            on_progress: None,
        }
    }

    /// Receive progress events during runs.
    pub fn with_progress(mut self, callback: ProgressCallback) -> Self {
        self.on_progress = Some(callback);
        self
    }

    pub fn catalog(&self) -> &TargetCatalog {
        &self.catalog
    }

    pub fn cache(&self) -> &AvailabilityCache {
        &self.cache
    }

    fn emit(&self, event: RunProgress) {
        if let Some(callback) = &self.on_progress {
            callback(event);
        }
    }

    /// Run a cache operation on the blocking pool.
    pub(crate) async fn with_cache<T, F>(&self, f: F) -> Result<T>
    where
        T: Send + 'static,
        F: FnOnce(&AvailabilityCache) -> Result<T> + Send + 'static,
    {
        let cache = self.cache.clone();
        tokio::task::spawn_blocking(move || f(&cache))
            .await
            .context("Cache task failed")?
    }

    /// Expand and probe one version.
    async fn probe_version(&self, version: Version, filter: &TargetFilter) -> Vec<ProbeResult> {
        let targets = self.catalog.expand(&version, filter);
        if targets.is_empty() {
            tracing::warn!("No targets for {} with the current filters", version);
            return Vec::new();
        }

        tracing::debug!("Probing {} targets for {}", targets.len(), version);
        self.emit(RunProgress::VersionStarting {
            version,
            targets: targets.len(),
        });
        self.prober
            .probe_with_progress(&targets, |progress| {
                self.emit(RunProgress::Batch { version, progress })
            })
            .await
    }

    /// Probe each version in turn, persist and report.
    ///
    /// A version's results are written to the cache only when at least one
    /// package was found; a build with nothing published yet stays
    /// unrecorded so later scans look at it again.
    ///
    /// # Errors
    ///
    /// Cache failures abort the run. Per-target failures never do; they
    /// show up as `false` or `null` results.
    pub async fn run(&self, versions: &[Version], filter: &TargetFilter) -> Result<ProbeRun> {
        let start = Instant::now();
        let mut report = GroupedReport::new();
        let mut results = Vec::new();

        for &version in versions {
            let version_results = self.probe_version(version, filter).await;

            let found = version_results.iter().filter(|r| r.exists.is_found()).count();
            if found > 0 {
                let rows: Vec<CacheRow> = version_results.iter().map(CacheRow::from).collect();
                let inserted = self.with_cache(move |cache| cache.write(&rows)).await?;
                tracing::debug!("Recorded {} new rows for {}", inserted, version);
            } else if !version_results.is_empty() {
                tracing::debug!("Nothing found for {}, not recording", version);
            }
            self.emit(RunProgress::VersionFinished { version, found });

            let by_category = report.entry(version).or_default();
            for result in &version_results {
                by_category.entry(result.category.clone()).or_default().insert(
                    result.name.clone(),
                    ReportEntry {
                        url: result.url.clone(),
                        result: result.exists,
                        status_code: result.status_code,
                        error: result.error.clone(),
                    },
                );
            }
            results.extend(version_results);
        }

        let summary = ProbeSummary::from_results(&results);
        tracing::info!(
            "Checked {} packages: {} found, {} not found, {} errors",
            summary.total,
            summary.found,
            summary.not_found,
            summary.errors
        );

        Ok(ProbeRun {
            report,
            results,
            summary,
            duration: start.elapsed(),
        })
    }

    /// Probe recorded versions again and record anything that changed.
    ///
    /// For each selected version, every fresh result is compared with the
    /// cached state of its package. If any differ, all of that version's
    /// results replace the cached rows.
    pub async fn recheck(
        &self,
        base: BaseVersion,
        scope: RecheckScope,
        filter: &TargetFilter,
    ) -> Result<Vec<StatusChange>> {
        let table: CacheTable = self.with_cache(move |cache| cache.open(base)).await?;
        let versions = match scope {
            RecheckScope::Latest(count) => table.latest_versions(count),
            RecheckScope::All => {
                let mut all = table.versions();
                all.reverse();
                all
            }
        };

        if versions.is_empty() {
            tracing::info!("No recorded versions of {} to recheck", base);
            return Ok(Vec::new());
        }
        tracing::info!("Rechecking {} recorded versions of {}", versions.len(), base);

        let mut changes = Vec::new();
        for version in versions {
            let results = self.probe_version(version, filter).await;

            let version_changes: Vec<StatusChange> = results
                .iter()
                .filter_map(|result| {
                    let previous =
                        table.lookup(&version, Some(&result.name), Some(&result.category));
                    (previous != Lookup::Recorded(result.exists)).then(|| StatusChange {
                        version,
                        category: result.category.clone(),
                        name: result.name.clone(),
                        previous,
                        current: result.exists,
                    })
                })
                .collect();

            if version_changes.is_empty() {
                tracing::debug!("No changes for {}", version);
                continue;
            }

            for change in &version_changes {
                tracing::info!(
                    "{} {}/{}: {} -> {}",
                    change.version,
                    change.category,
                    change.name,
                    change.previous.label(),
                    change.current.label()
                );
            }
            let rows: Vec<CacheRow> = results.iter().map(CacheRow::from).collect();
            self.with_cache(move |cache| cache.update(&rows)).await?;
            changes.extend(version_changes);
        }

        Ok(changes)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::probe::{Concurrency, ProberOptions, RetryPolicy};
    use httpmock::prelude::*;
    use httpmock::Method::HEAD;
    use std::path::Path;
    use std::sync::Mutex;
    use tempfile::TempDir;

    const CATALOG: &str = r#"
core:
  pkgA: "{host}/{version}/{build}/pkgA.zip"
  pkgB: "{host}/{version}/{build}/pkgB.zip"
"#;

    fn orchestrator(server: &MockServer, cache_dir: &Path) -> ProbeOrchestrator {
        let catalog =
            TargetCatalog::parse(CATALOG, Path::new("catalog.yml"), &server.base_url()).unwrap();
        let prober = Prober::new(ProberOptions {
            concurrency: Concurrency::Bounded(4),
            timeout: Duration::from_secs(2),
            retry: RetryPolicy::new(0),
        })
        .unwrap();
        ProbeOrchestrator::new(catalog, prober, AvailabilityCache::new(cache_dir))
    }

    fn v(s: &str) -> Version {
        s.parse().unwrap()
    }

    #[test]
    fn summary_counts() {
        let version = v("7.5.0.1");
        let target = crate::probe::Target {
            version,
            category: "core".into(),
            name: "a".into(),
            url: "u".into(),
        };
        let results = vec![
            ProbeResult::with_status(&target, 200, 1),
            ProbeResult::with_status(&target, 404, 1),
            ProbeResult::unknown(&target, "Timeout", 3),
        ];
        let summary = ProbeSummary::from_results(&results);
        assert_eq!(
            summary,
            ProbeSummary {
                total: 3,
                found: 1,
                not_found: 1,
                errors: 1
            }
        );
        assert!(!summary.all_found());
        assert!(!ProbeSummary::default().all_found());
    }

    #[tokio::test]
    async fn report_keeps_catalog_order() {
        let server = MockServer::start_async().await;
        server
            .mock_async(|when, then| {
                when.method(HEAD);
                then.status(404);
            })
            .await;

        let catalog = TargetCatalog::parse(
            "zeta:\n  pkgZ: \"{host}/z\"\n  pkgM: \"{host}/m\"\nalpha:\n  pkgA: \"{host}/a\"\n",
            Path::new("catalog.yml"),
            &server.base_url(),
        )
        .unwrap();
        let prober = Prober::new(ProberOptions {
            timeout: Duration::from_secs(2),
            retry: RetryPolicy::new(0),
            ..ProberOptions::default()
        })
        .unwrap();
        let temp = TempDir::new().unwrap();
        let orchestrator =
            ProbeOrchestrator::new(catalog, prober, AvailabilityCache::new(temp.path()));

        let run = orchestrator
            .run(&[v("7.5.0.1")], &TargetFilter::default())
            .await
            .unwrap();

        let categories = &run.report[&v("7.5.0.1")];
        assert_eq!(
            categories.keys().collect::<Vec<_>>(),
            vec!["zeta", "alpha"]
        );
        assert_eq!(
            categories["zeta"].keys().collect::<Vec<_>>(),
            vec!["pkgZ", "pkgM"]
        );

        let json = serde_json::to_string(&run.report).unwrap();
        let position = |key: &str| json.find(key).unwrap();
        assert!(position("zeta") < position("alpha"));
        assert!(position("pkgZ") < position("pkgM"));
    }

    #[test]
    fn default_recheck_scope_is_latest_two() {
        assert_eq!(RecheckScope::default(), RecheckScope::Latest(2));
    }

    #[tokio::test]
    async fn run_groups_and_persists_partial_success() {
        let server = MockServer::start_async().await;
        server
            .mock_async(|when, then| {
                when.method(HEAD).path("/7.5.0/12/pkgA.zip");
                then.status(200);
            })
            .await;
        server
            .mock_async(|when, then| {
                when.method(HEAD).path("/7.5.0/12/pkgB.zip");
                then.status(404);
            })
            .await;

        let temp = TempDir::new().unwrap();
        let orchestrator = orchestrator(&server, temp.path());
        let run = orchestrator
            .run(&[v("7.5.0.12")], &TargetFilter::default())
            .await
            .unwrap();

        let core = &run.report[&v("7.5.0.12")]["core"];
        assert_eq!(core["pkgA"].result, Existence::Found);
        assert_eq!(core["pkgA"].status_code, Some(200));
        assert_eq!(core["pkgB"].result, Existence::Missing);
        assert_eq!(run.summary.found, 1);
        assert_eq!(run.summary.not_found, 1);

        let cache = orchestrator.cache();
        assert_eq!(
            cache.lookup(&v("7.5.0.12"), Some("pkgB"), None).unwrap(),
            Lookup::Recorded(Existence::Missing)
        );
    }

    #[tokio::test]
    async fn nothing_found_is_not_recorded() {
        let server = MockServer::start_async().await;
        server
            .mock_async(|when, then| {
                when.method(HEAD);
                then.status(404);
            })
            .await;

        let temp = TempDir::new().unwrap();
        let orchestrator = orchestrator(&server, temp.path());
        let run = orchestrator
            .run(&[v("7.5.0.1")], &TargetFilter::default())
            .await
            .unwrap();

        assert_eq!(run.summary.not_found, 2);
        assert_eq!(
            orchestrator.cache().lookup(&v("7.5.0.1"), None, None).unwrap(),
            Lookup::NotRecorded
        );
    }

    #[tokio::test]
    async fn versions_run_in_order_with_progress() {
        let server = MockServer::start_async().await;
        server
            .mock_async(|when, then| {
                when.method(HEAD);
                then.status(200);
            })
            .await;

        let temp = TempDir::new().unwrap();
        let events = Arc::new(Mutex::new(Vec::new()));
        let sink = Arc::clone(&events);
        let orchestrator = orchestrator(&server, temp.path()).with_progress(Arc::new(move |e: RunProgress| {
            if let RunProgress::VersionFinished { version, found } = e {
                sink.lock().unwrap().push((version, found));
            }
        }));

        let run = orchestrator
            .run(&[v("7.5.0.2"), v("7.5.0.1")], &TargetFilter::default())
            .await
            .unwrap();

        assert_eq!(run.results.len(), 4);
        assert_eq!(run.results_for(&v("7.5.0.1")).count(), 2);
        assert_eq!(
            *events.lock().unwrap(),
            vec![(v("7.5.0.2"), 2), (v("7.5.0.1"), 2)]
        );
    }

    #[tokio::test]
    async fn filter_excluding_everything_yields_empty_version() {
        let server = MockServer::start_async().await;
        let temp = TempDir::new().unwrap();
        let orchestrator = orchestrator(&server, temp.path());

        let run = orchestrator
            .run(&[v("7.5.0.1")], &TargetFilter::category("docs"))
            .await
            .unwrap();

        assert!(run.results.is_empty());
        assert!(run.report[&v("7.5.0.1")].is_empty());
        assert!(!run.summary.all_found());
    }

    #[tokio::test]
    async fn recheck_updates_changed_versions() {
        let server = MockServer::start_async().await;
        server
            .mock_async(|when, then| {
                when.method(HEAD);
                then.status(200);
            })
            .await;

        let temp = TempDir::new().unwrap();
        let orchestrator = orchestrator(&server, temp.path());
        let stale = |build: u32, name: &str, exists: Option<bool>| CacheRow {
            version: BaseVersion::new(7, 5, 0).with_build(build),
            build,
            category: "core".into(),
            name: name.into(),
            url: String::new(),
            exists,
            status_code: None,
            error: None,
        };
        orchestrator
            .cache()
            .write(&[
                stale(1, "pkgA", Some(true)),
                stale(1, "pkgB", Some(false)),
                stale(2, "pkgA", Some(true)),
                stale(2, "pkgB", Some(true)),
                stale(3, "pkgA", Some(true)),
                stale(3, "pkgB", None),
            ])
            .unwrap();

        let changes = orchestrator
            .recheck(
                BaseVersion::new(7, 5, 0),
                RecheckScope::Latest(2),
                &TargetFilter::default(),
            )
            .await
            .unwrap();

        // Build 1 is outside the scope; build 2 is unchanged.
        assert_eq!(changes.len(), 1);
        assert_eq!(changes[0].version, v("7.5.0.3"));
        assert_eq!(changes[0].name, "pkgB");
        assert_eq!(changes[0].previous, Lookup::Recorded(Existence::Unknown));
        assert_eq!(changes[0].current, Existence::Found);

        let cache = orchestrator.cache();
        assert_eq!(
            cache.lookup(&v("7.5.0.3"), None, None).unwrap(),
            Lookup::Recorded(Existence::Found)
        );
        assert_eq!(
            cache.lookup(&v("7.5.0.1"), Some("pkgB"), None).unwrap(),
            Lookup::Recorded(Existence::Missing)
        );
    }

    #[tokio::test]
    async fn recheck_of_unknown_family_is_empty() {
        let server = MockServer::start_async().await;
        let temp = TempDir::new().unwrap();
        let orchestrator = orchestrator(&server, temp.path());
        let changes = orchestrator
            .recheck(
                BaseVersion::new(1, 0, 0),
                RecheckScope::All,
                &TargetFilter::default(),
            )
            .await
            .unwrap();
        assert!(changes.is_empty());
    }
}
