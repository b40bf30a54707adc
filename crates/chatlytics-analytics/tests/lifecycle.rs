// SPDX-FileCopyrightText: 2026 Chatlytics Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Analytic lifecycle, scheduler, and ingestion tests.

use std::sync::Arc;
use std::time::Duration;

use serde_json::json;
use tokio_util::sync::CancellationToken;

use chatlytics_analytics::{
    AnalyticService, AnalyticState, ChatMessage, ComputeEngine, EngineSettings, InMemoryStore,
    JobOutcome, MessageIngestor, RecomputeScheduler, SchedulerSettings,
};
use chatlytics_core::ChatlyticsError;
use chatlytics_test_utils::fixtures::{dimension_descriptor, request_message};
use chatlytics_test_utils::{MockSearchExecutor, MockTaskManager};

fn service(search: &MockSearchExecutor) -> AnalyticService {
    let engine = ComputeEngine::new(
        Arc::new(search.clone()),
        Arc::new(MockTaskManager::new()),
        EngineSettings::default(),
    );
    AnalyticService::new(Arc::new(InMemoryStore::new()), engine)
}

fn fixed_descriptor() -> serde_json::Value {
    let mut raw = dimension_descriptor("count", "user", "total");
    raw["timespan"] = json!({
        "type": "fixed",
        "start": "2026-01-01T00:00:00Z",
        "end": "2026-02-01T00:00:00Z",
    });
    raw
}

#[tokio::test]
async fn create_compute_recompute_delete() {
    let search = MockSearchExecutor::new();
    search.push_value(3.0).await;
    search.push_value(5.0).await;
    let service = service(&search);

    let created = service
        .create(&dimension_descriptor("count", "user", "total"))
        .await
        .unwrap();
    assert_eq!(created.state(), AnalyticState::Pending);

    let first = service.compute(created.id).await.unwrap();
    assert_eq!(first.state(), AnalyticState::Computed);
    assert_eq!(first.id, created.id);

    let second = service.compute(created.id).await.unwrap();
    let (Some(a), Some(b)) = (&first.result, &second.result) else {
        panic!("results missing");
    };
    assert!(b.created_at() >= a.created_at());
    assert_ne!(a, b);
    assert_eq!(service.get(created.id).await.unwrap().result, second.result);

    service.delete(created.id).await.unwrap();
    assert!(matches!(
        service.get(created.id).await.unwrap_err(),
        ChatlyticsError::NotFound { .. }
    ));
    assert!(matches!(
        service.compute(created.id).await.unwrap_err(),
        ChatlyticsError::NotFound { .. }
    ));
    assert!(matches!(
        service.delete(created.id).await.unwrap_err(),
        ChatlyticsError::NotFound { .. }
    ));
}

#[tokio::test]
async fn create_computed_discards_analytic_on_failure() {
    let search = MockSearchExecutor::new();
    search.push_failure("connection reset").await;
    search.push_value(7.0).await;
    let service = service(&search);
    let raw = dimension_descriptor("count", "user", "total");

    let err = service.create_computed(&raw).await.unwrap_err();
    assert!(matches!(err, ChatlyticsError::Executor { .. }));
    assert!(service.list(None).await.unwrap().is_empty());

    let created = service.create_computed(&raw).await.unwrap();
    assert_eq!(created.state(), AnalyticState::Computed);
    assert_eq!(service.list(None).await.unwrap().len(), 1);
}

#[tokio::test]
async fn run_once_only_touches_moving_windows() {
    let search = MockSearchExecutor::new();
    let service = service(&search);
    let moving = service
        .create(&dimension_descriptor("count", "user", "total"))
        .await
        .unwrap();
    let fixed = service.create(&fixed_descriptor()).await.unwrap();

    let scheduler = RecomputeScheduler::new(service.clone(), SchedulerSettings::default());
    let outcomes = scheduler.run_once().await.unwrap();

    assert_eq!(outcomes, vec![(moving.id, JobOutcome::Recomputed)]);
    assert_eq!(
        service.get(moving.id).await.unwrap().state(),
        AnalyticState::Computed
    );
    assert_eq!(
        service.get(fixed.id).await.unwrap().state(),
        AnalyticState::Pending
    );
}

#[tokio::test]
async fn failed_jobs_are_reported_not_retried() {
    let search = MockSearchExecutor::new();
    search.push_failure("timeout").await;
    let service = service(&search);
    let analytic = service
        .create(&dimension_descriptor("count", "bot", "total"))
        .await
        .unwrap();

    let scheduler = RecomputeScheduler::new(service.clone(), SchedulerSettings::default());
    let outcomes = scheduler.run_once().await.unwrap();

    assert_eq!(outcomes, vec![(analytic.id, JobOutcome::Failed)]);
    assert_eq!(search.call_count().await, 1);
}

#[tokio::test]
async fn background_scheduler_recomputes_until_cancelled() {
    let search = MockSearchExecutor::new();
    let service = service(&search);
    let moving = service
        .create(&dimension_descriptor("segmentation", "message", "all"))
        .await
        .unwrap();
    let fixed = service.create(&fixed_descriptor()).await.unwrap();

    let cancel = CancellationToken::new();
    let scheduler = RecomputeScheduler::new(
        service.clone(),
        SchedulerSettings {
            interval: Duration::from_secs(3600),
            workers: 2,
            queue_capacity: 8,
        },
    );
    let handle = tokio::spawn(scheduler.run(cancel.clone()));

    let mut computed = false;
    for _ in 0..100 {
        if service.get(moving.id).await.unwrap().result.is_some() {
            computed = true;
            break;
        }
        tokio::time::sleep(Duration::from_millis(10)).await;
    }
    cancel.cancel();
    handle.await.unwrap();

    assert!(computed, "moving analytic was never recomputed");
    assert!(service.get(fixed.id).await.unwrap().result.is_none());
}

#[tokio::test]
async fn ingest_batch_indexes_by_id() {
    let search = MockSearchExecutor::new();
    let ingestor = MessageIngestor::new(Arc::new(search.clone()), "messages");
    let messages: Vec<ChatMessage> = vec![
        serde_json::from_value(request_message("m-1", "u-1")).unwrap(),
        serde_json::from_value(request_message("m-2", "u-2")).unwrap(),
    ];

    let count = ingestor.ingest_batch(&messages).await.unwrap();

    assert_eq!(count, 2);
    let indexed = search.indexed().await;
    assert_eq!(indexed[0].index, "messages");
    assert_eq!(indexed[1].id, "m-2");
    assert_eq!(indexed[1].document["user_id"], "u-2");
}

#[tokio::test]
async fn invalid_message_in_batch_writes_nothing() {
    let search = MockSearchExecutor::new();
    let ingestor = MessageIngestor::new(Arc::new(search.clone()), "messages");
    let mut bad: ChatMessage = serde_json::from_value(request_message("m-2", "u-2")).unwrap();
    bad.project = String::new();
    let messages = vec![
        serde_json::from_value(request_message("m-1", "u-1")).unwrap(),
        bad,
    ];

    let err = ingestor.ingest_batch(&messages).await.unwrap_err();

    assert!(err.is_client_error());
    assert!(search.indexed().await.is_empty());
}
