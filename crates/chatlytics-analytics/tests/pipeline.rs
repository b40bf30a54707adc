// SPDX-FileCopyrightText: 2026 Chatlytics Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Descriptor -> query -> result pipeline tests against mock executors.
//!
//! Each test builds its own engine with fresh mocks; tests are independent
//! and order-insensitive.

use std::sync::Arc;

use chrono::{TimeZone, Utc};
use serde_json::json;

use chatlytics_analytics::{
    AggregationValue, AnalyticResult, AnalyticService, ComputeEngine, DescriptorBuilder,
    EngineSettings, InMemoryStore, Segment,
};
use chatlytics_core::{ChatlyticsError, ValidationError};
use chatlytics_test_utils::fixtures::{
    aggregation_descriptor, dimension_descriptor, task, transaction,
};
use chatlytics_test_utils::{MockSearchExecutor, MockTaskManager};

fn engine(search: &MockSearchExecutor, tasks: &MockTaskManager) -> ComputeEngine {
    ComputeEngine::new(
        Arc::new(search.clone()),
        Arc::new(tasks.clone()),
        EngineSettings::default(),
    )
}

fn now() -> chrono::DateTime<Utc> {
    Utc.with_ymd_and_hms(2026, 5, 31, 12, 0, 0).unwrap()
}

// ---- Scenario: user total count ----

#[tokio::test]
async fn user_total_reads_cardinality_value() {
    let search = MockSearchExecutor::new();
    search.push_value(7.0).await;
    let descriptor = DescriptorBuilder::build(&dimension_descriptor("count", "user", "total")).unwrap();

    let result = engine(&search, &MockTaskManager::new())
        .compute_at(&descriptor, now())
        .await
        .unwrap();

    let AnalyticResult::Count(count) = result else {
        panic!("expected count result, got {result:?}");
    };
    assert_eq!(count.count, 7);
    assert_eq!(count.created_at, now());
    assert_eq!(count.to, now());
    assert_eq!(count.from, Some(Utc.with_ymd_and_hms(2026, 5, 1, 12, 0, 0).unwrap()));

    let calls = search.calls().await;
    assert_eq!(calls.len(), 1);
    assert_eq!(calls[0].index, "messages");
    assert_eq!(
        calls[0].body["aggs"]["type_count"],
        json!({"cardinality": {"field": "user_id"}})
    );
}

// ---- Scenario: message segmentation ----

#[tokio::test]
async fn message_all_segments_follow_buckets() {
    let search = MockSearchExecutor::new();
    search.push_buckets(&[("request", 3), ("response", 2)]).await;
    let descriptor =
        DescriptorBuilder::build(&dimension_descriptor("segmentation", "message", "all")).unwrap();

    let result = engine(&search, &MockTaskManager::new())
        .compute_at(&descriptor, now())
        .await
        .unwrap();

    let AnalyticResult::Segmentation(segmentation) = result else {
        panic!("expected segmentation result, got {result:?}");
    };
    assert_eq!(
        segmentation.segments,
        vec![Segment::new("request", 3), Segment::new("response", 2)]
    );
}

// ---- Scenario: aggregation with no matching data ----

#[tokio::test]
async fn min_without_value_is_absent() {
    let search = MockSearchExecutor::new();
    search
        .push_response(json!({"aggregations": {"type_count": {}}}))
        .await;
    let descriptor =
        DescriptorBuilder::build(&aggregation_descriptor("min", "intent.confidence")).unwrap();

    let result = engine(&search, &MockTaskManager::new())
        .compute_at(&descriptor, now())
        .await
        .unwrap();

    let AnalyticResult::Aggregation(aggregation) = result else {
        panic!("expected aggregation result, got {result:?}");
    };
    assert_eq!(aggregation.aggregation, None);
    // today: midnight to midnight.
    assert_eq!(
        aggregation.from,
        Some(Utc.with_ymd_and_hms(2026, 5, 31, 0, 0, 0).unwrap())
    );
    assert_eq!(aggregation.to, Utc.with_ymd_and_hms(2026, 6, 1, 0, 0, 0).unwrap());
}

// ---- Scenario: invalid metric never reaches the executor ----

#[tokio::test]
async fn bogus_metric_fails_before_any_query() {
    let search = MockSearchExecutor::new();
    let store = Arc::new(InMemoryStore::new());
    let service = AnalyticService::new(store.clone(), engine(&search, &MockTaskManager::new()));

    let err = service
        .create(&dimension_descriptor("count", "user", "bogus"))
        .await
        .unwrap_err();

    assert!(matches!(
        err,
        ChatlyticsError::Validation(ValidationError::UnknownMetric { .. })
    ));
    assert!(err.is_client_error());
    assert_eq!(search.call_count().await, 0);
    assert!(store.is_empty());
}

// ---- Multi-query metrics ----

#[tokio::test]
async fn new_users_is_set_difference() {
    let search = MockSearchExecutor::new();
    search
        .push_key_page(&[("u1", 4), ("u2", 1), ("u3", 2)], None)
        .await;
    search.push_key_page(&[("u2", 9), ("u9", 1)], None).await;
    let descriptor = DescriptorBuilder::build(&dimension_descriptor("count", "user", "new")).unwrap();

    let result = engine(&search, &MockTaskManager::new())
        .compute_at(&descriptor, now())
        .await
        .unwrap();

    let AnalyticResult::Count(count) = result else {
        panic!("expected count result");
    };
    assert_eq!(count.count, 2);

    let calls = search.calls().await;
    assert_eq!(calls.len(), 2);
    assert_eq!(
        calls[0].body["aggs"]["type_count"]["composite"]["sources"],
        json!([{"key": {"terms": {"field": "user_id"}}}])
    );
    let before_range = &calls[1].body["query"]["bool"]["filter"][1]["range"]["timestamp"];
    assert_eq!(before_range["lt"], "2026-05-01T12:00:00.000Z");
}

#[tokio::test]
async fn new_users_scan_every_page_of_history() {
    let search = MockSearchExecutor::new();
    let engine = ComputeEngine::new(
        Arc::new(search.clone()),
        Arc::new(MockTaskManager::new()),
        EngineSettings {
            terms_size: 2,
            ..EngineSettings::default()
        },
    );
    // In window: u1, u2, u3 across two pages.
    search.push_key_page(&[("u1", 1), ("u2", 1)], Some("u2")).await;
    search.push_key_page(&[("u3", 1)], None).await;
    // Before window: u2 only shows up past the first page.
    search.push_key_page(&[("u7", 5), ("u9", 1)], Some("u9")).await;
    search.push_key_page(&[("u10", 2), ("u2", 8)], Some("u2")).await;
    search.push_key_page(&[], None).await;
    let descriptor = DescriptorBuilder::build(&dimension_descriptor("count", "user", "new")).unwrap();

    let result = engine.compute_at(&descriptor, now()).await.unwrap();

    let AnalyticResult::Count(count) = result else {
        panic!("expected count result");
    };
    assert_eq!(count.count, 2);

    let calls = search.calls().await;
    assert_eq!(calls.len(), 5);
    let composite = |i: usize| calls[i].body["aggs"]["type_count"]["composite"].clone();
    assert!(composite(0).get("after").is_none());
    assert_eq!(composite(1)["after"], json!({"key": "u2"}));
    assert!(composite(2).get("after").is_none());
    assert_eq!(composite(3)["after"], json!({"key": "u9"}));
    assert_eq!(composite(4)["after"], json!({"key": "u2"}));
}

#[tokio::test]
async fn new_users_fail_when_a_history_page_fails() {
    let search = MockSearchExecutor::new();
    search.push_key_page(&[("u1", 1)], None).await;
    search.push_failure("shard unavailable").await;
    let descriptor = DescriptorBuilder::build(&dimension_descriptor("count", "user", "new")).unwrap();

    let err = engine(&search, &MockTaskManager::new())
        .compute_at(&descriptor, now())
        .await
        .unwrap_err();

    assert!(matches!(err, ChatlyticsError::Executor { .. }));
}

#[tokio::test]
async fn new_conversations_over_all_time_skip_the_before_query() {
    let search = MockSearchExecutor::new();
    search.push_key_page(&[("c1", 1), ("c2", 1)], None).await;
    let mut raw = dimension_descriptor("count", "conversation", "new");
    raw["timespan"] = json!({"type": "moving", "value": "all"});
    let descriptor = DescriptorBuilder::build(&raw).unwrap();

    let result = engine(&search, &MockTaskManager::new())
        .compute_at(&descriptor, now())
        .await
        .unwrap();

    let AnalyticResult::Count(count) = result else {
        panic!("expected count result");
    };
    assert_eq!(count.count, 2);
    assert_eq!(count.from, None);
    assert_eq!(search.call_count().await, 1);
}

#[tokio::test]
async fn from_bot_sums_responses_and_notifications() {
    let search = MockSearchExecutor::new();
    search.push_buckets(&[("response", 5)]).await;
    search.push_buckets(&[("notification", 3)]).await;
    let descriptor =
        DescriptorBuilder::build(&dimension_descriptor("count", "message", "from_bot")).unwrap();

    let result = engine(&search, &MockTaskManager::new())
        .compute_at(&descriptor, now())
        .await
        .unwrap();

    let AnalyticResult::Count(count) = result else {
        panic!("expected count result");
    };
    assert_eq!(count.count, 8);
    assert_eq!(search.call_count().await, 2);
}

#[tokio::test]
async fn fallback_reports_count_and_total() {
    let search = MockSearchExecutor::new();
    search.push_value(4.0).await;
    search.push_value(40.0).await;
    let descriptor =
        DescriptorBuilder::build(&dimension_descriptor("count", "dialogue", "fallback")).unwrap();

    let result = engine(&search, &MockTaskManager::new())
        .compute_at(&descriptor, now())
        .await
        .unwrap();

    let AnalyticResult::Count(count) = result else {
        panic!("expected count result");
    };
    assert_eq!(count.count, 4);
    assert_eq!(count.total, Some(40));

    let first = &search.calls().await[0].body;
    let filters = first["query"]["bool"]["filter"].as_array().unwrap();
    assert!(filters.contains(&json!({"term": {"intent.name": "default"}})));
}

#[tokio::test]
async fn engaged_users_count_keys_above_threshold() {
    let search = MockSearchExecutor::new();
    search
        .push_key_page(&[("u1", 12), ("u2", 3), ("u3", 1)], None)
        .await;
    let descriptor =
        DescriptorBuilder::build(&dimension_descriptor("count", "user", "engaged")).unwrap();

    let result = engine(&search, &MockTaskManager::new())
        .compute_at(&descriptor, now())
        .await
        .unwrap();

    let AnalyticResult::Count(count) = result else {
        panic!("expected count result");
    };
    assert_eq!(count.count, 2);
    let body = &search.calls().await[0].body;
    let filters = body["query"]["bool"]["filter"].as_array().unwrap();
    assert!(filters.contains(&json!({"term": {"type": "request"}})));
    assert!(body["aggs"]["type_count"].get("composite").is_some());
}

#[tokio::test]
async fn engaged_users_are_not_capped_by_page_size() {
    let search = MockSearchExecutor::new();
    let engine = ComputeEngine::new(
        Arc::new(search.clone()),
        Arc::new(MockTaskManager::new()),
        EngineSettings {
            terms_size: 2,
            ..EngineSettings::default()
        },
    );
    search.push_key_page(&[("u1", 4), ("u2", 3)], Some("u2")).await;
    search.push_key_page(&[("u3", 9), ("u4", 2)], Some("u4")).await;
    search.push_key_page(&[("u5", 3)], None).await;
    let descriptor =
        DescriptorBuilder::build(&dimension_descriptor("count", "user", "engaged")).unwrap();

    let result = engine.compute_at(&descriptor, now()).await.unwrap();

    let AnalyticResult::Count(count) = result else {
        panic!("expected count result");
    };
    assert_eq!(count.count, 4);
    assert_eq!(search.call_count().await, 3);
}

// ---- Segment order ----

#[tokio::test]
async fn unique_counts_decide_segment_order() {
    let search = MockSearchExecutor::new();
    search
        .push_response(json!({"aggregations": {"type_count": {"buckets": [
            {"key": "web", "doc_count": 50, "unique": {"value": 2}},
            {"key": "telegram", "doc_count": 20, "unique": {"value": 9}},
            {"key": "sms", "doc_count": 5, "unique": {"value": 4}},
        ]}}}))
        .await;
    let descriptor =
        DescriptorBuilder::build(&dimension_descriptor("segmentation", "user", "channel")).unwrap();

    let result = engine(&search, &MockTaskManager::new())
        .compute_at(&descriptor, now())
        .await
        .unwrap();

    let AnalyticResult::Segmentation(segmentation) = result else {
        panic!("expected segmentation result, got {result:?}");
    };
    assert_eq!(
        segmentation.segments,
        vec![
            Segment::new("telegram", 9),
            Segment::new("sms", 4),
            Segment::new("web", 2),
        ]
    );
}

// ---- Task manager metrics ----

#[tokio::test]
async fn open_tasks_come_from_task_manager() {
    let search = MockSearchExecutor::new();
    let tasks = MockTaskManager::with_records(
        vec![task("t1", "refund", false), task("t2", "refund", true), task("t3", "booking", false)],
        vec![],
    );
    let descriptor = DescriptorBuilder::build(&dimension_descriptor("count", "task", "open")).unwrap();

    let result = engine(&search, &tasks).compute_at(&descriptor, now()).await.unwrap();

    let AnalyticResult::Count(count) = result else {
        panic!("expected count result");
    };
    assert_eq!(count.count, 2);
    assert_eq!(search.call_count().await, 0);

    let queries = tasks.queries().await;
    assert_eq!(queries[0].app_id, "p");
    assert_eq!(queries[0].creation_to, now());
}

#[tokio::test]
async fn transaction_status_segments_respect_task_id() {
    let tasks = MockTaskManager::with_records(
        vec![],
        vec![
            transaction("x1", "t1", true),
            transaction("x2", "t1", false),
            transaction("x3", "t2", true),
        ],
    );
    let mut raw = dimension_descriptor("segmentation", "transaction", "status");
    raw["task_id"] = json!("t1");
    let descriptor = DescriptorBuilder::build(&raw).unwrap();

    let result = engine(&MockSearchExecutor::new(), &tasks)
        .compute_at(&descriptor, now())
        .await
        .unwrap();

    let AnalyticResult::Segmentation(segmentation) = result else {
        panic!("expected segmentation result");
    };
    assert_eq!(
        segmentation.segments,
        vec![Segment::new("open", 1), Segment::new("closed", 1)]
    );
}

// ---- Aggregations ----

#[tokio::test]
async fn stats_aggregation_with_filters() {
    let search = MockSearchExecutor::new();
    search
        .push_response(json!({"aggregations": {"type_count": {
            "count": 3, "min": 0.2, "max": 0.9, "avg": 0.5, "sum": 1.5,
        }}}))
        .await;
    let mut raw = aggregation_descriptor("stats", "intent.confidence");
    raw["filters"] = json!([{"field": "channel", "operation": "term", "value": "web"}]);
    let descriptor = DescriptorBuilder::build(&raw).unwrap();

    let result = engine(&search, &MockTaskManager::new())
        .compute_at(&descriptor, now())
        .await
        .unwrap();

    let AnalyticResult::Aggregation(aggregation) = result else {
        panic!("expected aggregation result");
    };
    let Some(AggregationValue::Stats(stats)) = aggregation.aggregation else {
        panic!("expected stats");
    };
    assert_eq!(stats["avg"], 0.5);
    assert_eq!(stats.len(), 5);

    let body = &search.calls().await[0].body;
    assert!(
        body["query"]["bool"]["filter"]
            .as_array()
            .unwrap()
            .contains(&json!({"term": {"channel": "web"}}))
    );
}

// ---- Failure propagation ----

#[tokio::test]
async fn executor_failure_propagates_without_partial_result() {
    let search = MockSearchExecutor::new();
    search.push_failure("cluster unavailable").await;
    let store = Arc::new(InMemoryStore::new());
    let service = AnalyticService::new(store, engine(&search, &MockTaskManager::new()));

    let analytic = service
        .create(&dimension_descriptor("count", "bot", "total"))
        .await
        .unwrap();
    let err = service.compute(analytic.id).await.unwrap_err();

    assert!(matches!(err, ChatlyticsError::Executor { .. }));
    assert!(!err.is_client_error());
    assert!(service.get(analytic.id).await.unwrap().result.is_none());
}
