// SPDX-FileCopyrightText: 2026 Chatlytics Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Computation engines.
//!
//! [`ComputeEngine`] dispatches a descriptor to the engine of its family.
//! Each engine resolves the window, runs the metric's query through the
//! injected executors, and wraps the extracted value in the matching result.
//! Executor failures propagate unchanged; absent response data reads as zero.

mod aggregation;
mod count;
mod segmentation;

use std::collections::{HashMap, HashSet};
use std::sync::Arc;
use std::time::Instant;

use chrono::{DateTime, Utc};
use serde_json::Value;
use tracing::debug;

use chatlytics_core::{ChatlyticsError, SearchExecutor, TaskManagerClient, TaskQuery};

use crate::descriptor::AnalyticDescriptor;
use crate::query::{SearchQuery, SearchResponse};
use crate::result::AnalyticResult;
use crate::time_window::ResolvedWindow;

pub use aggregation::AggregationComputation;
pub use count::CountComputation;
pub use segmentation::SegmentationComputation;

/// Tunables shared by the engines.
#[derive(Debug, Clone)]
pub struct EngineSettings {
    pub messages_index: String,
    /// Minimum requests in the window for a user to count as engaged.
    pub engaged_min_requests: u64,
    /// Intent name the NLU assigns when nothing matched.
    pub fallback_intent: String,
    /// Bucket limit of terms aggregations and page size of key scans.
    pub terms_size: usize,
}

impl Default for EngineSettings {
    fn default() -> Self {
        Self {
            messages_index: "messages".to_string(),
            engaged_min_requests: 3,
            fallback_intent: "default".to_string(),
            terms_size: 10_000,
        }
    }
}

/// The executors and settings a computation runs against.
#[derive(Clone)]
pub struct ComputeContext {
    pub search: Arc<dyn SearchExecutor>,
    pub tasks: Arc<dyn TaskManagerClient>,
    pub settings: EngineSettings,
}

impl ComputeContext {
    /// Run `query` against the messages index.
    pub(crate) async fn run(&self, query: SearchQuery) -> Result<SearchResponse, ChatlyticsError> {
        let body = query.to_body();
        debug!(index = %self.settings.messages_index, body = %body, "executing search");
        let raw: Value = self
            .search
            .search(&self.settings.messages_index, body)
            .await?;
        Ok(SearchResponse::new(raw))
    }

    pub(crate) fn task_query(
        project: &str,
        window: &ResolvedWindow,
        task_id: Option<&str>,
    ) -> TaskQuery {
        TaskQuery {
            app_id: project.to_string(),
            creation_from: window.from,
            creation_to: window.to,
            task_id: task_id.map(str::to_string),
        }
    }

    /// Every distinct `field` value matching `query` with its document count.
    ///
    /// Pages through a composite aggregation until the executor stops
    /// returning an `after_key`, so the result is never truncated.
    pub(crate) async fn distinct_keys(
        &self,
        query: SearchQuery,
        field: &str,
    ) -> Result<HashMap<String, u64>, ChatlyticsError> {
        let page_size = self.settings.terms_size.max(1);
        let mut keys = HashMap::new();
        let mut after: Option<Value> = None;
        let mut pages = 0usize;

        loop {
            let response = self
                .run(query.clone().composite(field, page_size, after.as_ref()))
                .await?;
            pages += 1;

            let buckets = response.buckets();
            let exhausted = buckets.len() < page_size;
            for bucket in buckets {
                *keys.entry(bucket.key).or_default() += bucket.doc_count;
            }

            match response.after_key() {
                Some(next) if !exhausted && after.as_ref() != Some(next) => {
                    after = Some(next.clone());
                }
                _ => break,
            }
        }

        debug!(field, pages, keys = keys.len(), "scanned distinct keys");
        Ok(keys)
    }

    /// Number of distinct `field` values active in the window but never before it.
    pub(crate) async fn new_entities(
        &self,
        base: SearchQuery,
        window: &ResolvedWindow,
        field: &str,
    ) -> Result<u64, ChatlyticsError> {
        let in_window: HashSet<String> = self
            .distinct_keys(base.clone().within(window), field)
            .await?
            .into_keys()
            .collect();

        let before_window = match window.from {
            Some(from) => self
                .distinct_keys(base.before(from), field)
                .await?
                .into_keys()
                .collect(),
            None => HashSet::new(),
        };

        Ok(set_difference_count(&in_window, &before_window))
    }
}

/// `|in_window \ before_window|`.
pub fn set_difference_count(in_window: &HashSet<String>, before_window: &HashSet<String>) -> u64 {
    in_window.difference(before_window).count() as u64
}

/// Dispatches descriptors to their computation engine.
#[derive(Clone)]
pub struct ComputeEngine {
    context: ComputeContext,
}

impl ComputeEngine {
    pub fn new(
        search: Arc<dyn SearchExecutor>,
        tasks: Arc<dyn TaskManagerClient>,
        settings: EngineSettings,
    ) -> Self {
        Self {
            context: ComputeContext {
                search,
                tasks,
                settings,
            },
        }
    }

    pub async fn compute(
        &self,
        descriptor: &AnalyticDescriptor,
    ) -> Result<AnalyticResult, ChatlyticsError> {
        self.compute_at(descriptor, Utc::now()).await
    }

    /// Compute with `now` as both the resolution instant and `created_at`.
    pub async fn compute_at(
        &self,
        descriptor: &AnalyticDescriptor,
        now: DateTime<Utc>,
    ) -> Result<AnalyticResult, ChatlyticsError> {
        let started = Instant::now();
        let result = match descriptor {
            AnalyticDescriptor::Count(d) => CountComputation::compute(&self.context, d, now).await,
            AnalyticDescriptor::Segmentation(d) => {
                SegmentationComputation::compute(&self.context, d, now).await
            }
            AnalyticDescriptor::Aggregation(d) => {
                AggregationComputation::compute(&self.context, d, now).await
            }
        };

        let elapsed = started.elapsed().as_secs_f64();
        let outcome = if result.is_ok() { "success" } else { "error" };
        debug!(
            kind = %descriptor.kind(),
            project = descriptor.project(),
            outcome,
            elapsed_secs = elapsed,
            "computation finished"
        );
        #[cfg(feature = "prometheus")]
        chatlytics_prometheus::record_computation(&descriptor.kind().to_string(), outcome, elapsed);

        result
    }
}
