// SPDX-FileCopyrightText: 2026 Chatlytics Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! SQLite store tests against temporary database files.

use std::sync::Arc;

use chrono::{Duration, Utc};
use serde_json::json;
use tempfile::TempDir;
use uuid::Uuid;

use chatlytics_analytics::{
    Analytic, AnalyticResult, AnalyticService, AnalyticState, AnalyticStore, ComputeEngine,
    DescriptorBuilder, EngineSettings, ResolvedWindow, Segment,
};
use chatlytics_core::{ChatlyticsError, HealthStatus, PluginAdapter};
use chatlytics_storage::SqliteStore;
use chatlytics_test_utils::fixtures::{aggregation_descriptor, dimension_descriptor};
use chatlytics_test_utils::{MockSearchExecutor, MockTaskManager};

async fn temp_store() -> (TempDir, SqliteStore) {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("analytics.db");
    let store = SqliteStore::open(path.to_str().unwrap(), true).await.unwrap();
    (dir, store)
}

fn analytic(raw: serde_json::Value) -> Analytic {
    Analytic::new(DescriptorBuilder::build(&raw).unwrap())
}

fn window() -> ResolvedWindow {
    ResolvedWindow {
        from: None,
        to: Utc::now(),
    }
}

#[tokio::test]
async fn insert_then_get_returns_same_document() {
    let (_dir, store) = temp_store().await;
    let mut raw = dimension_descriptor("count", "transaction", "open");
    raw["task_id"] = json!("t-9");
    let a = analytic(raw);

    store.insert(&a).await.unwrap();

    assert_eq!(store.get(a.id).await.unwrap(), Some(a));
    assert_eq!(store.get(Uuid::new_v4()).await.unwrap(), None);
}

#[tokio::test]
async fn save_result_replaces_whole_result() {
    let (_dir, store) = temp_store().await;
    let a = analytic(dimension_descriptor("segmentation", "message", "all"));
    store.insert(&a).await.unwrap();

    let first = AnalyticResult::segmentation(vec![Segment::new("request", 3)], window(), Utc::now());
    store.save_result(a.id, &first).await.unwrap();
    let second = AnalyticResult::segmentation(vec![Segment::new("response", 1)], window(), Utc::now());
    store.save_result(a.id, &second).await.unwrap();

    let stored = store.get(a.id).await.unwrap().unwrap();
    assert_eq!(stored.state(), AnalyticState::Computed);
    assert_eq!(stored.result, Some(second.clone()));
    assert_eq!(stored.updated_at, second.created_at());
}

#[tokio::test]
async fn save_result_for_unknown_id_is_not_found() {
    let (_dir, store) = temp_store().await;
    let result = AnalyticResult::count(1, None, window(), Utc::now());
    let err = store.save_result(Uuid::new_v4(), &result).await.unwrap_err();
    assert!(matches!(err, ChatlyticsError::NotFound { .. }));
}

#[tokio::test]
async fn mismatched_result_family_is_rejected() {
    let (_dir, store) = temp_store().await;
    let a = analytic(dimension_descriptor("count", "user", "total"));
    store.insert(&a).await.unwrap();

    let wrong = AnalyticResult::aggregation(None, window(), Utc::now());
    assert!(matches!(
        store.save_result(a.id, &wrong).await.unwrap_err(),
        ChatlyticsError::Internal(_)
    ));
    assert_eq!(store.get(a.id).await.unwrap().unwrap().result, None);
}

#[tokio::test]
async fn list_and_moving_ids() {
    let (_dir, store) = temp_store().await;
    let moving = analytic(dimension_descriptor("count", "user", "total"));
    let today = analytic(aggregation_descriptor("avg", "intent.confidence"));
    let mut fixed_raw = dimension_descriptor("count", "bot", "total");
    fixed_raw["project"] = json!("other");
    fixed_raw["timespan"] = json!({
        "type": "fixed",
        "start": "2026-01-01T00:00:00Z",
        "end": "2026-02-01T00:00:00Z",
    });
    let mut fixed = analytic(fixed_raw);
    let mut today = today;
    today.created_at = moving.created_at + Duration::seconds(1);
    fixed.created_at = moving.created_at + Duration::seconds(2);

    for a in [&moving, &today, &fixed] {
        store.insert(a).await.unwrap();
    }

    let all: Vec<Uuid> = store.list(None).await.unwrap().iter().map(|a| a.id).collect();
    assert_eq!(all, vec![moving.id, today.id, fixed.id]);
    assert_eq!(store.list(Some("p")).await.unwrap().len(), 2);
    assert_eq!(store.list(Some("other")).await.unwrap()[0].id, fixed.id);

    assert_eq!(store.moving_ids().await.unwrap(), vec![moving.id, today.id]);
}

#[tokio::test]
async fn delete_reports_existence() {
    let (_dir, store) = temp_store().await;
    let a = analytic(dimension_descriptor("count", "task", "closed"));
    store.insert(&a).await.unwrap();

    assert!(store.delete(a.id).await.unwrap());
    assert!(!store.delete(a.id).await.unwrap());
    assert!(store.list(None).await.unwrap().is_empty());
}

#[tokio::test]
async fn data_survives_reopen() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("nested").join("analytics.db");
    let path = path.to_str().unwrap().to_string();

    let a = analytic(dimension_descriptor("count", "conversation", "new"));
    {
        let store = SqliteStore::open(&path, true).await.unwrap();
        store.insert(&a).await.unwrap();
        store.shutdown().await.unwrap();
    }

    let store = SqliteStore::open(&path, true).await.unwrap();
    assert_eq!(store.get(a.id).await.unwrap(), Some(a));
    assert_eq!(store.health_check().await.unwrap(), HealthStatus::Healthy);
}

#[tokio::test]
async fn service_runs_over_sqlite() {
    let (_dir, store) = temp_store().await;
    let search = MockSearchExecutor::new();
    search.push_value(7.0).await;
    let engine = ComputeEngine::new(
        Arc::new(search),
        Arc::new(MockTaskManager::new()),
        EngineSettings::default(),
    );
    let service = AnalyticService::new(Arc::new(store), engine);

    let created = service
        .create(&dimension_descriptor("count", "user", "total"))
        .await
        .unwrap();
    let computed = service.compute(created.id).await.unwrap();

    let Some(AnalyticResult::Count(count)) = computed.result else {
        panic!("expected a count result");
    };
    assert_eq!(count.count, 7);
    assert_eq!(service.list(Some("p")).await.unwrap().len(), 1);
}
