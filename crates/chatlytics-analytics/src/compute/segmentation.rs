// SPDX-FileCopyrightText: 2026 Chatlytics Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

use std::collections::HashMap;

use chrono::{DateTime, Utc};

use chatlytics_core::ChatlyticsError;

use super::ComputeContext;
use crate::descriptor::{
    BotSegmentMetric, ConversationSegmentMetric, DialogueSegmentMetric, MessageSegmentMetric,
    SegmentationDescriptor, SegmentationMetric, TaskSegmentMetric, UserSegmentMetric,
};
use crate::query::{SearchQuery, TermsOptions};
use crate::result::{AnalyticResult, Segment};

/// How a search-backed segmentation splits the messages.
struct Split<'a> {
    field: &'a str,
    /// Only requests, e.g. for intent splits.
    requests_only: bool,
    /// Count distinct values of this field per segment instead of documents.
    unique: Option<&'a str>,
}

impl<'a> Split<'a> {
    fn by(field: &'a str) -> Self {
        Self {
            field,
            requests_only: false,
            unique: None,
        }
    }

    fn unique(mut self, field: &'a str) -> Self {
        self.unique = Some(field);
        self
    }

    fn requests_only(mut self) -> Self {
        self.requests_only = true;
        self
    }
}

/// Segmentation engine.
pub struct SegmentationComputation;

impl SegmentationComputation {
    pub async fn compute(
        ctx: &ComputeContext,
        descriptor: &SegmentationDescriptor,
        now: DateTime<Utc>,
    ) -> Result<AnalyticResult, ChatlyticsError> {
        let window = descriptor.time_span.resolve(now);
        let project = descriptor.project.as_str();

        let split = match &descriptor.metric {
            SegmentationMetric::User(UserSegmentMetric::Channel) => {
                Split::by("channel").unique("user_id")
            }
            SegmentationMetric::User(UserSegmentMetric::Language) => {
                Split::by("language").unique("user_id")
            }
            SegmentationMetric::Message(MessageSegmentMetric::All) => Split::by("type"),
            SegmentationMetric::Message(MessageSegmentMetric::Channel) => Split::by("channel"),
            SegmentationMetric::Message(MessageSegmentMetric::Intent) => {
                Split::by("intent.name").requests_only()
            }
            SegmentationMetric::Conversation(ConversationSegmentMetric::Channel) => {
                Split::by("channel").unique("conversation_id")
            }
            SegmentationMetric::Dialogue(DialogueSegmentMetric::Intents) => {
                Split::by("intent.name").requests_only().unique("conversation_id")
            }
            SegmentationMetric::Bot(BotSegmentMetric::Messages) => Split::by("bot_id"),
            SegmentationMetric::Task(metric) => {
                let query = ComputeContext::task_query(project, &window, None);
                let records = ctx.tasks.list_tasks(&query).await?;
                let segments = task_segments(
                    *metric,
                    records.iter().map(|t| (t.label.as_str(), t.is_open())),
                );
                return Ok(AnalyticResult::segmentation(segments, window, now));
            }
            SegmentationMetric::Transaction { metric, task_id } => {
                let query = ComputeContext::task_query(project, &window, task_id.as_deref());
                let records = ctx.tasks.list_transactions(&query).await?;
                let segments = task_segments(
                    *metric,
                    records.iter().map(|t| (t.label.as_str(), t.is_open())),
                );
                return Ok(AnalyticResult::segmentation(segments, window, now));
            }
        };

        let mut query = SearchQuery::for_project(project).within(&window);
        if split.requests_only {
            query = query.term("type", "request");
        }
        let response = ctx
            .run(query.terms(
                split.field,
                TermsOptions {
                    size: ctx.settings.terms_size,
                    unique: split.unique,
                },
            ))
            .await?;

        let mut segments: Vec<Segment> = response
            .buckets()
            .into_iter()
            .map(|bucket| {
                let count = bucket.count();
                Segment::new(bucket.key, count)
            })
            .collect();
        // Unique counts can reorder what the cluster sorted by doc_count.
        segments.sort_by(|a, b| b.count.cmp(&a.count));

        Ok(AnalyticResult::segmentation(segments, window, now))
    }
}

/// Split task-manager records by label or by open/closed status.
///
/// Label segments are ordered by count descending, then label.
fn task_segments<'a>(
    metric: TaskSegmentMetric,
    records: impl Iterator<Item = (&'a str, bool)>,
) -> Vec<Segment> {
    match metric {
        TaskSegmentMetric::Status => {
            let (mut open, mut closed) = (0, 0);
            for (_, is_open) in records {
                if is_open {
                    open += 1;
                } else {
                    closed += 1;
                }
            }
            vec![Segment::new("open", open), Segment::new("closed", closed)]
        }
        TaskSegmentMetric::Label => {
            let mut counts: HashMap<&str, u64> = HashMap::new();
            for (label, _) in records {
                *counts.entry(label).or_default() += 1;
            }
            let mut segments: Vec<Segment> = counts
                .into_iter()
                .map(|(label, count)| Segment::new(label, count))
                .collect();
            segments.sort_by(|a, b| b.count.cmp(&a.count).then_with(|| a.label.cmp(&b.label)));
            segments
        }
    }
}
