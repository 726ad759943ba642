//! HEAD-based existence checks.
//!
//! A [`Prober`] owns one HTTP client and one admission gate. Every call to
//! [`Prober::probe`] shares that gate, so concurrent callers (for example a
//! version scan fanning out over many builds) stay within the same limit.

use std::time::Duration;

use anyhow::Context;
use futures::future::join_all;
use reqwest::Client;

use crate::error::Result;

use super::gate::{AdmissionGate, Concurrency};
use super::retry::{Attempt, RetryPolicy};
use super::{ProbeResult, Target};

/// Batches larger than this are split into sub-batches.
pub const LARGE_BATCH_THRESHOLD: usize = 100;

/// Size of each sub-batch of a large batch.
pub const SUB_BATCH_SIZE: usize = 50;

/// Upper bound for establishing a connection.
const CONNECT_TIMEOUT: Duration = Duration::from_secs(5);

/// Progress signal emitted after each sub-batch of a large batch.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BatchProgress {
    /// Sub-batches finished so far.
    pub batch: usize,
    /// Total sub-batches.
    pub batches: usize,
    /// Targets resolved so far.
    pub completed: usize,
    /// Targets in the whole batch.
    pub total: usize,
}

/// Settings for a [`Prober`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ProberOptions {
    pub concurrency: Concurrency,
    /// Timeout for a single HEAD request.
    pub timeout: Duration,
    pub retry: RetryPolicy,
}

impl Default for ProberOptions {
    fn default() -> Self {
        Self {
            concurrency: Concurrency::Unbounded,
            timeout: Duration::from_secs(10),
            retry: RetryPolicy::default(),
        }
    }
}

/// What a single attempt established.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Verdict {
    Status(u16),
    ConnectionFailed,
}

/// Concurrent URL existence checker.
pub struct Prober {
    client: Client,
    gate: AdmissionGate,
    options: ProberOptions,
}

impl Prober {
    /// Create a prober with its own HTTP client.
    pub fn new(options: ProberOptions) -> Result<Self> {
        let client = Client::builder()
            .user_agent(concat!("pkgprobe/", env!("CARGO_PKG_VERSION")))
            .connect_timeout(CONNECT_TIMEOUT.min(options.timeout))
            .pool_max_idle_per_host(20)
            .build()
            .context("Failed to build HTTP client")?;

        Ok(Self {
            client,
            gate: AdmissionGate::new(options.concurrency),
            options,
        })
    }

    pub fn options(&self) -> &ProberOptions {
        &self.options
    }

    /// Probe every target; `results[i]` belongs to `targets[i]`.
    pub async fn probe(&self, targets: &[Target]) -> Vec<ProbeResult> {
        self.probe_with_progress(targets, |_| {}).await
    }

    /// Like [`probe`](Self::probe), reporting progress between sub-batches.
    ///
    /// Batches of more than [`LARGE_BATCH_THRESHOLD`] targets run in
    /// sequential sub-batches of [`SUB_BATCH_SIZE`]. The result set is the
    /// same either way.
    pub async fn probe_with_progress(
        &self,
        targets: &[Target],
        mut on_batch: impl FnMut(BatchProgress),
    ) -> Vec<ProbeResult> {
        if targets.len() <= LARGE_BATCH_THRESHOLD {
            return join_all(targets.iter().map(|t| self.check_with_retry(t))).await;
        }

        let batches = targets.len().div_ceil(SUB_BATCH_SIZE);
        let mut results = Vec::with_capacity(targets.len());

        for (index, chunk) in targets.chunks(SUB_BATCH_SIZE).enumerate() {
            let chunk_results = join_all(chunk.iter().map(|t| self.check_with_retry(t))).await;
            results.extend(chunk_results);

            let progress = BatchProgress {
                batch: index + 1,
                batches,
                completed: results.len(),
                total: targets.len(),
            };
            tracing::debug!(
                "Progress: {}/{} batches completed",
                progress.batch,
                progress.batches
            );
            on_batch(progress);
        }

        results
    }

    async fn check_with_retry(&self, target: &Target) -> ProbeResult {
        // One slot covers every attempt for this target, backoff included.
        let _permit = self.gate.admit().await;

        match self.options.retry.run(|_| self.check_once(target)).await {
            Ok((Verdict::Status(status), attempts)) => {
                tracing::debug!("HTTP {} for {}", status, target.url);
                ProbeResult::with_status(target, status, attempts)
            }
            Ok((Verdict::ConnectionFailed, attempts)) => {
                ProbeResult::missing(target, "Connection failed", attempts)
            }
            Err(exhausted) => {
                tracing::error!(
                    "Failed to check {} after {} attempts: {}",
                    target.url,
                    exhausted.attempts,
                    exhausted.reason
                );
                ProbeResult::unknown(target, exhausted.reason, exhausted.attempts)
            }
        }
    }

    async fn check_once(&self, target: &Target) -> Attempt<Verdict> {
        let request = self
            .client
            .head(&target.url)
            .timeout(self.options.timeout)
            .send();

        match request.await {
            Ok(response) => Attempt::Conclusive(Verdict::Status(response.status().as_u16())),
            Err(e) if e.is_timeout() => {
                tracing::debug!("Timeout for {}", target.url);
                Attempt::Transient("Timeout".to_string())
            }
            Err(e) if e.is_connect() => {
                tracing::debug!("Connection error for {}: {}", target.url, e);
                Attempt::Conclusive(Verdict::ConnectionFailed)
            }
            Err(e) => {
                tracing::debug!("Unexpected error for {}: {}", target.url, e);
                Attempt::Transient(e.to_string())
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::probe::Existence;
    use crate::version::Version;
    use httpmock::prelude::*;
    use httpmock::Method::HEAD;

    fn target(name: &str, url: String) -> Target {
        Target {
            version: Version::new(7, 5, 0, 12),
            category: "core".to_string(),
            name: name.to_string(),
            url,
        }
    }

    fn fast_options() -> ProberOptions {
        ProberOptions {
            concurrency: Concurrency::Unbounded,
            timeout: Duration::from_millis(200),
            retry: RetryPolicy::new(2).with_backoff_step(Duration::from_millis(10)),
        }
    }

    #[tokio::test]
    async fn found_on_200_without_retry() {
        let server = MockServer::start_async().await;
        let mock = server
            .mock_async(|when, then| {
                when.method(HEAD).path("/7.5.0/12/pkgA.zip");
                then.status(200);
            })
            .await;

        let prober = Prober::new(fast_options()).unwrap();
        let results = prober
            .probe(&[target("pkgA", server.url("/7.5.0/12/pkgA.zip"))])
            .await;

        assert_eq!(results.len(), 1);
        assert_eq!(results[0].exists, Existence::Found);
        assert_eq!(results[0].status_code, Some(200));
        assert_eq!(results[0].attempts, 1);
        mock.assert_calls_async(1).await;
    }

    #[tokio::test]
    async fn non_200_is_conclusive_negative() {
        let server = MockServer::start_async().await;
        let mock = server
            .mock_async(|when, then| {
                when.method(HEAD).path("/gone.zip");
                then.status(503);
            })
            .await;

        let prober = Prober::new(fast_options()).unwrap();
        let results = prober.probe(&[target("gone", server.url("/gone.zip"))]).await;

        assert_eq!(results[0].exists, Existence::Missing);
        assert_eq!(results[0].status_code, Some(503));
        assert_eq!(results[0].attempts, 1);
        mock.assert_calls_async(1).await;
    }

    #[tokio::test]
    async fn connection_refused_is_missing() {
        let prober = Prober::new(fast_options()).unwrap();
        let results = prober
            .probe(&[target("offline", "http://127.0.0.1:1/pkg.zip".to_string())])
            .await;

        assert_eq!(results[0].exists, Existence::Missing);
        assert_eq!(results[0].error.as_deref(), Some("Connection failed"));
        assert!(results[0].status_code.is_none());
        assert_eq!(results[0].attempts, 1);
    }

    #[tokio::test]
    async fn timeout_exhausts_retries() {
        let server = MockServer::start_async().await;
        server
            .mock_async(|when, then| {
                when.method(HEAD).path("/slow.zip");
                then.status(200).delay(Duration::from_millis(1500));
            })
            .await;

        let prober = Prober::new(fast_options()).unwrap();
        let results = prober.probe(&[target("slow", server.url("/slow.zip"))]).await;

        assert_eq!(results[0].exists, Existence::Unknown);
        assert_eq!(results[0].error.as_deref(), Some("Timeout"));
        assert_eq!(results[0].attempts, 3);
    }

    #[tokio::test]
    async fn results_keep_input_order_under_skewed_latency() {
        let server = MockServer::start_async().await;
        let mut targets = Vec::new();
        for i in 0..24u64 {
            let path = format!("/pkg-{}.zip", i);
            // Scrambled delays so completion order differs from input order.
            let delay = (i * 37 % 11) * 15;
            let status = if i % 3 == 0 { 404 } else { 200 };
            server
                .mock_async(|when, then| {
                    when.method(HEAD).path(path.as_str());
                    then.status(status).delay(Duration::from_millis(delay));
                })
                .await;
            targets.push(target(&format!("pkg-{}", i), server.url(&path)));
        }

        let prober = Prober::new(ProberOptions {
            timeout: Duration::from_secs(5),
            ..fast_options()
        })
        .unwrap();
        let results = prober.probe(&targets).await;

        assert_eq!(results.len(), targets.len());
        for (i, (result, target)) in results.iter().zip(&targets).enumerate() {
            assert_eq!(result.name, target.name);
            assert_eq!(result.url, target.url);
            let expected = if i % 3 == 0 {
                Existence::Missing
            } else {
                Existence::Found
            };
            assert_eq!(result.exists, expected, "target {}", i);
        }
    }

    #[tokio::test]
    async fn bounded_concurrency_still_resolves_everything() {
        let server = MockServer::start_async().await;
        server
            .mock_async(|when, then| {
                when.method(HEAD).path("/pkg.zip");
                then.status(200).delay(Duration::from_millis(20));
            })
            .await;

        let prober = Prober::new(ProberOptions {
            concurrency: Concurrency::Bounded(2),
            timeout: Duration::from_secs(5),
            ..fast_options()
        })
        .unwrap();
        let targets: Vec<Target> = (0..10)
            .map(|i| target(&format!("p{}", i), server.url("/pkg.zip")))
            .collect();
        let results = prober.probe(&targets).await;

        assert_eq!(results.len(), 10);
        assert!(results.iter().all(|r| r.exists == Existence::Found));
    }

    #[tokio::test]
    async fn large_batches_report_progress() {
        let server = MockServer::start_async().await;
        server
            .mock_async(|when, then| {
                when.method(HEAD).path("/bulk.zip");
                then.status(200);
            })
            .await;

        let prober = Prober::new(ProberOptions {
            timeout: Duration::from_secs(5),
            ..fast_options()
        })
        .unwrap();
        let targets: Vec<Target> = (0..120)
            .map(|i| target(&format!("p{}", i), server.url("/bulk.zip")))
            .collect();

        let mut progress = Vec::new();
        let results = prober
            .probe_with_progress(&targets, |p| progress.push(p))
            .await;

        assert_eq!(results.len(), 120);
        for (result, target) in results.iter().zip(&targets) {
            assert_eq!(result.name, target.name);
        }
        assert_eq!(
            progress.iter().map(|p| (p.batch, p.batches)).collect::<Vec<_>>(),
            vec![(1, 3), (2, 3), (3, 3)]
        );
        assert_eq!(
            progress.iter().map(|p| p.completed).collect::<Vec<_>>(),
            vec![50, 100, 120]
        );
    }

    #[tokio::test]
    async fn small_batches_emit_no_progress() {
        let prober = Prober::new(fast_options()).unwrap();
        let mut calls = 0;
        let results = prober.probe_with_progress(&[], |_| calls += 1).await;
        assert!(results.is_empty());
        assert_eq!(calls, 0);
    }
}
