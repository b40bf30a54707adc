// SPDX-FileCopyrightText: 2026 Chatlytics Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Periodic recomputation of moving-window analytics.
//!
//! Each tick lists the moving analytics and pushes one job per id onto a
//! bounded queue drained by a fixed set of workers. Jobs are independent and
//! unordered. A failed job is logged and dropped; the next tick retries it
//! naturally.

use std::sync::Arc;
use std::time::Duration;

use tokio::sync::{Mutex, mpsc};
use tokio::time::MissedTickBehavior;
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, info, warn};
use uuid::Uuid;

use chatlytics_core::ChatlyticsError;

use crate::service::AnalyticService;

#[derive(Debug, Clone)]
pub struct SchedulerSettings {
    pub interval: Duration,
    pub workers: usize,
    pub queue_capacity: usize,
}

impl Default for SchedulerSettings {
    fn default() -> Self {
        Self {
            interval: Duration::from_secs(900),
            workers: 4,
            queue_capacity: 1024,
        }
    }
}

/// How a single recompute job ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum JobOutcome {
    Recomputed,
    /// The analytic was deleted between listing and computing.
    Skipped,
    Failed,
}

impl JobOutcome {
    fn as_str(self) -> &'static str {
        match self {
            Self::Recomputed => "success",
            Self::Skipped => "skipped",
            Self::Failed => "error",
        }
    }
}

pub struct RecomputeScheduler {
    service: AnalyticService,
    settings: SchedulerSettings,
}

impl RecomputeScheduler {
    pub fn new(service: AnalyticService, settings: SchedulerSettings) -> Self {
        Self { service, settings }
    }

    /// Run until `cancel` fires. The first tick happens immediately.
    pub async fn run(self, cancel: CancellationToken) {
        let workers = self.settings.workers.max(1);
        let (tx, rx) = mpsc::channel::<Uuid>(self.settings.queue_capacity.max(1));
        let rx = Arc::new(Mutex::new(rx));

        let handles: Vec<_> = (0..workers)
            .map(|worker| {
                let rx = rx.clone();
                let service = self.service.clone();
                let cancel = cancel.clone();
                tokio::spawn(async move { worker_loop(worker, service, rx, cancel).await })
            })
            .collect();

        info!(
            interval_secs = self.settings.interval.as_secs(),
            workers, "recompute scheduler started"
        );

        let mut interval = tokio::time::interval(self.settings.interval);
        interval.set_missed_tick_behavior(MissedTickBehavior::Skip);

        loop {
            tokio::select! {
                _ = interval.tick() => {
                    match self.enqueue_moving(&tx, &cancel).await {
                        Ok(queued) => debug!(queued, "recompute jobs queued"),
                        Err(e) => error!(error = %e, "failed to list moving analytics"),
                    }
                }
                _ = cancel.cancelled() => break,
            }
        }

        drop(tx);
        for handle in handles {
            if let Err(e) = handle.await {
                error!(error = %e, "recompute worker panicked");
            }
        }
        info!("recompute scheduler stopped");
    }

    /// Queue one job per moving analytic. Returns the number queued.
    async fn enqueue_moving(
        &self,
        tx: &mpsc::Sender<Uuid>,
        cancel: &CancellationToken,
    ) -> Result<usize, ChatlyticsError> {
        let ids = self.service.moving_ids().await?;
        let mut queued = 0;
        for id in ids {
            tokio::select! {
                sent = tx.send(id) => {
                    if sent.is_err() {
                        break;
                    }
                    queued += 1;
                }
                _ = cancel.cancelled() => break,
            }
        }
        Ok(queued)
    }

    /// Recompute every moving analytic inline, one after another.
    pub async fn run_once(&self) -> Result<Vec<(Uuid, JobOutcome)>, ChatlyticsError> {
        let ids = self.service.moving_ids().await?;
        let mut outcomes = Vec::with_capacity(ids.len());
        for id in ids {
            outcomes.push((id, recompute(&self.service, id).await));
        }
        Ok(outcomes)
    }
}

async fn worker_loop(
    worker: usize,
    service: AnalyticService,
    rx: Arc<Mutex<mpsc::Receiver<Uuid>>>,
    cancel: CancellationToken,
) {
    loop {
        let job = tokio::select! {
            job = async { rx.lock().await.recv().await } => job,
            _ = cancel.cancelled() => None,
        };
        let Some(id) = job else {
            break;
        };
        let outcome = recompute(&service, id).await;
        debug!(worker, id = %id, outcome = outcome.as_str(), "recompute job finished");
    }
}

async fn recompute(service: &AnalyticService, id: Uuid) -> JobOutcome {
    let outcome = match service.compute(id).await {
        Ok(_) => JobOutcome::Recomputed,
        Err(ChatlyticsError::NotFound { .. }) => {
            debug!(id = %id, "analytic vanished before recompute");
            JobOutcome::Skipped
        }
        Err(e) => {
            warn!(id = %id, error = %e, "recompute failed");
            JobOutcome::Failed
        }
    };

    #[cfg(feature = "prometheus")]
    chatlytics_prometheus::record_recompute_job(outcome.as_str());

    outcome
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::compute::{ComputeEngine, EngineSettings};
    use crate::store::InMemoryStore;
    use chatlytics_test_utils::fixtures::dimension_descriptor;
    use chatlytics_test_utils::{MockSearchExecutor, MockTaskManager};
    use tracing_test::traced_test;

    fn service(search: &MockSearchExecutor) -> AnalyticService {
        let engine = ComputeEngine::new(
            Arc::new(search.clone()),
            Arc::new(MockTaskManager::new()),
            EngineSettings::default(),
        );
        AnalyticService::new(Arc::new(InMemoryStore::new()), engine)
    }

    #[tokio::test]
    #[traced_test]
    async fn deleted_analytic_is_skipped() {
        let service = service(&MockSearchExecutor::new());
        assert_eq!(recompute(&service, Uuid::new_v4()).await, JobOutcome::Skipped);
        assert!(logs_contain("analytic vanished before recompute"));
    }

    #[tokio::test]
    #[traced_test]
    async fn failure_is_logged_as_warning() {
        let search = MockSearchExecutor::new();
        search.push_failure("shard unavailable").await;
        let service = service(&search);
        let analytic = service
            .create(&dimension_descriptor("count", "user", "active"))
            .await
            .unwrap();

        assert_eq!(recompute(&service, analytic.id).await, JobOutcome::Failed);
        assert!(logs_contain("recompute failed"));
        assert!(logs_contain("shard unavailable"));
    }

    #[test]
    fn outcome_labels() {
        assert_eq!(JobOutcome::Recomputed.as_str(), "success");
        assert_eq!(JobOutcome::Skipped.as_str(), "skipped");
        assert_eq!(JobOutcome::Failed.as_str(), "error");
    }
}
