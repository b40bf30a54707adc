// SPDX-FileCopyrightText: 2026 Chatlytics Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

use std::collections::BTreeMap;

use chrono::{DateTime, Utc};

use chatlytics_core::ChatlyticsError;

use super::ComputeContext;
use crate::descriptor::{
    BotCountMetric, ConversationCountMetric, CountDescriptor, CountMetric, DialogueCountMetric,
    MessageCountMetric, TaskCountMetric, UserCountMetric,
};
use crate::query::{SearchQuery, TermsOptions};
use crate::result::AnalyticResult;

/// Count engine.
pub struct CountComputation;

impl CountComputation {
    pub async fn compute(
        ctx: &ComputeContext,
        descriptor: &CountDescriptor,
        now: DateTime<Utc>,
    ) -> Result<AnalyticResult, ChatlyticsError> {
        let window = descriptor.time_span.resolve(now);
        let project = descriptor.project.as_str();
        let scoped = || SearchQuery::for_project(project).within(&window);

        let (count, total) = match &descriptor.metric {
            CountMetric::User(metric) => {
                let count = match metric {
                    UserCountMetric::Total => {
                        ctx.run(scoped().metric("cardinality", "user_id")).await?.count()
                    }
                    UserCountMetric::Active => {
                        ctx.run(
                            scoped()
                                .term("type", "request")
                                .metric("cardinality", "user_id"),
                        )
                        .await?
                        .count()
                    }
                    UserCountMetric::Engaged => {
                        let requests = ctx
                            .distinct_keys(scoped().term("type", "request"), "user_id")
                            .await?;
                        requests
                            .values()
                            .filter(|count| **count >= ctx.settings.engaged_min_requests)
                            .count() as u64
                    }
                    UserCountMetric::New => {
                        ctx.new_entities(SearchQuery::for_project(project), &window, "user_id")
                            .await?
                    }
                };
                (count, None)
            }
            CountMetric::Message(metric) => {
                let count = match metric {
                    MessageCountMetric::Total => {
                        ctx.run(scoped().metric("value_count", "type")).await?.count()
                    }
                    MessageCountMetric::FromUsers => {
                        message_type_count(ctx, &scoped, "request").await?
                    }
                    MessageCountMetric::Responses => {
                        message_type_count(ctx, &scoped, "response").await?
                    }
                    MessageCountMetric::Notifications => {
                        message_type_count(ctx, &scoped, "notification").await?
                    }
                    MessageCountMetric::FromBot => bot_message_count(ctx, &scoped).await?,
                };
                (count, None)
            }
            CountMetric::Task(metric) => {
                let query = ComputeContext::task_query(project, &window, None);
                let open = ctx
                    .tasks
                    .list_tasks(&query)
                    .await?
                    .iter()
                    .map(|t| t.is_open())
                    .collect::<Vec<_>>();
                (task_count(*metric, &open), None)
            }
            CountMetric::Transaction { metric, task_id } => {
                let query = ComputeContext::task_query(project, &window, task_id.as_deref());
                let open = ctx
                    .tasks
                    .list_transactions(&query)
                    .await?
                    .iter()
                    .map(|t| t.is_open())
                    .collect::<Vec<_>>();
                (task_count(*metric, &open), None)
            }
            CountMetric::Conversation(metric) => {
                let count = match metric {
                    ConversationCountMetric::Total => {
                        ctx.run(scoped().metric("cardinality", "conversation_id"))
                            .await?
                            .count()
                    }
                    ConversationCountMetric::New => {
                        ctx.new_entities(
                            SearchQuery::for_project(project),
                            &window,
                            "conversation_id",
                        )
                        .await?
                    }
                };
                (count, None)
            }
            CountMetric::Dialogue(DialogueCountMetric::Fallback) => {
                fallback_ratio(ctx, &scoped).await?
            }
            CountMetric::Dialogue(DialogueCountMetric::Intents) => {
                let count = ctx
                    .run(scoped().metric("cardinality", "intent.name"))
                    .await?
                    .count();
                (count, None)
            }
            CountMetric::Bot(BotCountMetric::Total) => {
                let count = ctx.run(scoped().metric("cardinality", "bot_id")).await?.count();
                (count, None)
            }
        };

        Ok(AnalyticResult::count(count, total, window, now))
    }
}

async fn message_type_count(
    ctx: &ComputeContext,
    scoped: &impl Fn() -> SearchQuery,
    message_type: &str,
) -> Result<u64, ChatlyticsError> {
    Ok(ctx
        .run(scoped().term("type", message_type).metric("value_count", "type"))
        .await?
        .count())
}

/// Responses plus notifications, merged per bucket key.
async fn bot_message_count(
    ctx: &ComputeContext,
    scoped: &impl Fn() -> SearchQuery,
) -> Result<u64, ChatlyticsError> {
    let mut per_type: BTreeMap<String, u64> = BTreeMap::new();
    for message_type in ["response", "notification"] {
        let options = TermsOptions {
            size: ctx.settings.terms_size,
            ..TermsOptions::default()
        };
        let response = ctx
            .run(scoped().term("type", message_type).terms("type", options))
            .await?;
        for bucket in response.buckets() {
            *per_type.entry(bucket.key).or_default() += bucket.doc_count;
        }
    }
    Ok(per_type.values().sum())
}

/// Fallback-intent requests against all messages in the window.
async fn fallback_ratio(
    ctx: &ComputeContext,
    scoped: &impl Fn() -> SearchQuery,
) -> Result<(u64, Option<u64>), ChatlyticsError> {
    let fallback = ctx
        .run(
            scoped()
                .term("type", "request")
                .term("intent.name", ctx.settings.fallback_intent.as_str())
                .metric("cardinality", "id"),
        )
        .await?
        .count();
    let all = ctx.run(scoped().metric("cardinality", "id")).await?.count();
    Ok((fallback, Some(all)))
}

fn task_count(metric: TaskCountMetric, open_flags: &[bool]) -> u64 {
    let matching = match metric {
        TaskCountMetric::Total => open_flags.len(),
        TaskCountMetric::Open => open_flags.iter().filter(|open| **open).count(),
        TaskCountMetric::Closed => open_flags.iter().filter(|open| !**open).count(),
    };
    matching as u64
}
