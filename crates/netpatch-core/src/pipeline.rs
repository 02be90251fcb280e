//! Pipeline driver
//!
//! Acquire one snapshot, resolve every request against it, then apply the
//! resolved ones. Outcomes come back in request order whatever the apply
//! concurrency.

use futures::stream::{self, StreamExt};
use futures::FutureExt;
use std::any::Any;
use std::panic::AssertUnwindSafe;
use std::time::Duration;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

use crate::error::{ApplyError, DiscoveryError, PipelineError, Result};
use crate::model::Snapshot;
use crate::outcome::{Outcome, Report};
use crate::request::SubscriptionRequest;
use crate::resolve::{ResolvedSubscription, Resolver, Unresolved};
use crate::traits::{Applier, SnapshotProvider};

/// Pipeline configuration
#[derive(Debug, Clone)]
pub struct PipelineConfig {
    /// Upper bound on snapshot acquisition; exceeding it fails the run
    pub discovery_timeout: Duration,
    /// Per-apply bound; exceeding it fails only that request
    pub apply_timeout: Option<Duration>,
    /// Maximum apply operations in flight (values below 1 mean 1)
    pub concurrency: usize,
    /// Log every resolution and apply at info level instead of debug
    pub verbose: bool,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            discovery_timeout: crate::DEFAULT_DISCOVERY_TIMEOUT,
            apply_timeout: None,
            concurrency: 1,
            verbose: false,
        }
    }
}

/// Subscription pipeline over a snapshot provider and an applier
pub struct Pipeline<P, A> {
    provider: P,
    applier: A,
    config: PipelineConfig,
    cancel: CancellationToken,
}

impl<P, A> Pipeline<P, A>
where
    P: SnapshotProvider,
    A: Applier,
{
    pub fn new(provider: P, applier: A) -> Self {
        Self::with_config(provider, applier, PipelineConfig::default())
    }

    pub fn with_config(provider: P, applier: A, config: PipelineConfig) -> Self {
        Self {
            provider,
            applier,
            config,
            cancel: CancellationToken::new(),
        }
    }

    /// Use an externally owned cancellation token
    pub fn with_cancellation(mut self, token: CancellationToken) -> Self {
        self.cancel = token;
        self
    }

    pub fn config(&self) -> &PipelineConfig {
        &self.config
    }

    /// Run the whole pipeline.
    ///
    /// Only snapshot acquisition can fail the run; resolution and apply
    /// failures are reported per request in the returned [`Report`].
    pub async fn run(&self, requests: &[SubscriptionRequest]) -> Result<Report> {
        let snapshot = self.acquire().await?;
        Ok(self.run_with_snapshot(&snapshot, requests).await)
    }

    /// Acquire a snapshot under the configured timeout
    pub async fn acquire(&self) -> Result<Snapshot> {
        let limit = self.config.discovery_timeout;
        info!("Acquiring device snapshot (timeout {:?})", limit);

        let acquired = tokio::select! {
            biased;
            _ = self.cancel.cancelled() => return Err(PipelineError::Cancelled),
            result = tokio::time::timeout(limit, self.provider.acquire(limit)) => result,
        };

        let snapshot = acquired.map_err(|_| DiscoveryError::Timeout(limit))??;
        info!(devices = snapshot.len(), "Device snapshot acquired");
        Ok(snapshot)
    }

    /// Resolve and apply against an already acquired snapshot
    pub async fn run_with_snapshot(
        &self,
        snapshot: &Snapshot,
        requests: &[SubscriptionRequest],
    ) -> Report {
        let resolver = Resolver::new(snapshot);
        let resolved = resolver.resolve_all(requests);

        info!(
            requests = requests.len(),
            resolved = resolved.iter().filter(|r| r.is_ok()).count(),
            "Applying subscriptions"
        );

        let outcomes: Vec<Outcome> = stream::iter(resolved)
            .map(|item| self.settle(item))
            .buffered(self.config.concurrency.max(1))
            .collect()
            .await;

        let report = Report::new(outcomes);
        let summary = report.summary();
        info!(
            applied = summary.applied,
            failed = summary.failed,
            unresolved = summary.unresolved,
            "Subscriptions processed"
        );
        report
    }

    async fn settle(
        &self,
        item: std::result::Result<ResolvedSubscription<'_>, Unresolved>,
    ) -> Outcome {
        match item {
            Ok(subscription) => self.apply_one(subscription).await,
            Err(reason) => {
                if self.config.verbose {
                    info!(%reason, "Skipping unresolved subscription");
                }
                Outcome::Unresolved { reason }
            }
        }
    }

    async fn apply_one(&self, subscription: ResolvedSubscription<'_>) -> Outcome {
        let route = subscription.route();

        if self.cancel.is_cancelled() {
            debug!(%route, "Run cancelled, not dispatching");
            return Outcome::ApplyFailed {
                route,
                error: ApplyError::Cancelled,
            };
        }

        if self.config.verbose {
            info!("Adding: {}", route);
        } else {
            debug!("Adding: {}", route);
        }

        let call = AssertUnwindSafe(self.applier.apply(
            subscription.rx_device,
            subscription.rx_channel,
            subscription.tx_channel,
            subscription.tx_device,
        ))
        .catch_unwind();

        let result = match self.config.apply_timeout {
            Some(limit) => tokio::time::timeout(limit, call)
                .await
                .unwrap_or(Ok(Err(ApplyError::Timeout(limit)))),
            None => call.await,
        };

        let error = match result {
            Ok(Ok(())) => return Outcome::Applied { route },
            Ok(Err(error)) => error,
            Err(panic) => ApplyError::Panicked(panic_message(panic.as_ref())),
        };

        warn!(%route, %error, "Failed to add subscription");
        Outcome::ApplyFailed { route, error }
    }
}

fn panic_message(payload: &(dyn Any + Send)) -> String {
    if let Some(msg) = payload.downcast_ref::<&str>() {
        (*msg).to_string()
    } else if let Some(msg) = payload.downcast_ref::<String>() {
        msg.clone()
    } else {
        "unknown panic payload".to_string()
    }
}
