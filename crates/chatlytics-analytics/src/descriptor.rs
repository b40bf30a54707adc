// SPDX-FileCopyrightText: 2026 Chatlytics Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Typed analytic descriptors.
//!
//! A descriptor states *what* to compute: a count or a segmentation over one
//! dimension, or a raw field aggregation. The metric allow-list of every
//! (type, dimension) pair is the variant set of a dedicated enum, so an
//! out-of-list metric cannot be represented once parsing has succeeded.

use serde::{Deserialize, Deserializer, Serialize, Serializer};
use serde_json::{Map, Value, json};
use strum::{Display, EnumString, IntoStaticStr, VariantNames};

use crate::builder::DescriptorBuilder;
use crate::time_window::TimeWindow;

/// The three descriptor (and result) families.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Display, EnumString, IntoStaticStr)]
#[strum(serialize_all = "lowercase", ascii_case_insensitive)]
pub enum DescriptorKind {
    Count,
    Segmentation,
    Aggregation,
}

/// The entity category an analytic targets.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Display, EnumString, IntoStaticStr, VariantNames,
)]
#[strum(serialize_all = "lowercase", ascii_case_insensitive)]
pub enum Dimension {
    User,
    Message,
    Task,
    Transaction,
    Conversation,
    Dialogue,
    Bot,
}

macro_rules! metric_enum {
    ($(#[$meta:meta])* $name:ident { $($variant:ident),+ $(,)? }) => {
        $(#[$meta])*
        #[derive(
            Debug, Clone, Copy, PartialEq, Eq, Hash, Display, EnumString, IntoStaticStr,
            VariantNames,
        )]
        #[strum(serialize_all = "snake_case", ascii_case_insensitive)]
        pub enum $name {
            $($variant),+
        }
    };
}

metric_enum!(
    /// Count metrics of the user dimension.
    UserCountMetric { Total, Active, Engaged, New }
);
metric_enum!(
    /// Count metrics of the message dimension.
    MessageCountMetric { Total, FromUsers, FromBot, Responses, Notifications }
);
metric_enum!(
    /// Count metrics shared by the task and transaction dimensions.
    TaskCountMetric { Total, Open, Closed }
);
metric_enum!(ConversationCountMetric { Total, New });
metric_enum!(DialogueCountMetric { Fallback, Intents });
metric_enum!(BotCountMetric { Total });

metric_enum!(UserSegmentMetric { Channel, Language });
metric_enum!(
    /// Segmentation metrics of the message dimension. `All` splits by message type.
    MessageSegmentMetric { All, Channel, Intent }
);
metric_enum!(
    /// Segmentation metrics shared by the task and transaction dimensions.
    TaskSegmentMetric { Label, Status }
);
metric_enum!(ConversationSegmentMetric { Channel });
metric_enum!(DialogueSegmentMetric { Intents });
metric_enum!(BotSegmentMetric { Messages });

/// A count metric bound to its dimension.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CountMetric {
    User(UserCountMetric),
    Message(MessageCountMetric),
    Task(TaskCountMetric),
    Transaction {
        metric: TaskCountMetric,
        task_id: Option<String>,
    },
    Conversation(ConversationCountMetric),
    Dialogue(DialogueCountMetric),
    Bot(BotCountMetric),
}

impl CountMetric {
    pub fn dimension(&self) -> Dimension {
        match self {
            Self::User(_) => Dimension::User,
            Self::Message(_) => Dimension::Message,
            Self::Task(_) => Dimension::Task,
            Self::Transaction { .. } => Dimension::Transaction,
            Self::Conversation(_) => Dimension::Conversation,
            Self::Dialogue(_) => Dimension::Dialogue,
            Self::Bot(_) => Dimension::Bot,
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            Self::User(m) => m.into(),
            Self::Message(m) => m.into(),
            Self::Task(m) | Self::Transaction { metric: m, .. } => m.into(),
            Self::Conversation(m) => m.into(),
            Self::Dialogue(m) => m.into(),
            Self::Bot(m) => m.into(),
        }
    }

    /// Allow-list of count metrics for a dimension.
    pub fn allowed(dimension: Dimension) -> &'static [&'static str] {
        match dimension {
            Dimension::User => UserCountMetric::VARIANTS,
            Dimension::Message => MessageCountMetric::VARIANTS,
            Dimension::Task | Dimension::Transaction => TaskCountMetric::VARIANTS,
            Dimension::Conversation => ConversationCountMetric::VARIANTS,
            Dimension::Dialogue => DialogueCountMetric::VARIANTS,
            Dimension::Bot => BotCountMetric::VARIANTS,
        }
    }

    fn task_id(&self) -> Option<&str> {
        match self {
            Self::Transaction { task_id, .. } => task_id.as_deref(),
            _ => None,
        }
    }
}

/// A segmentation metric bound to its dimension.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SegmentationMetric {
    User(UserSegmentMetric),
    Message(MessageSegmentMetric),
    Task(TaskSegmentMetric),
    Transaction {
        metric: TaskSegmentMetric,
        task_id: Option<String>,
    },
    Conversation(ConversationSegmentMetric),
    Dialogue(DialogueSegmentMetric),
    Bot(BotSegmentMetric),
}

impl SegmentationMetric {
    pub fn dimension(&self) -> Dimension {
        match self {
            Self::User(_) => Dimension::User,
            Self::Message(_) => Dimension::Message,
            Self::Task(_) => Dimension::Task,
            Self::Transaction { .. } => Dimension::Transaction,
            Self::Conversation(_) => Dimension::Conversation,
            Self::Dialogue(_) => Dimension::Dialogue,
            Self::Bot(_) => Dimension::Bot,
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            Self::User(m) => m.into(),
            Self::Message(m) => m.into(),
            Self::Task(m) | Self::Transaction { metric: m, .. } => m.into(),
            Self::Conversation(m) => m.into(),
            Self::Dialogue(m) => m.into(),
            Self::Bot(m) => m.into(),
        }
    }

    /// Allow-list of segmentation metrics for a dimension.
    pub fn allowed(dimension: Dimension) -> &'static [&'static str] {
        match dimension {
            Dimension::User => UserSegmentMetric::VARIANTS,
            Dimension::Message => MessageSegmentMetric::VARIANTS,
            Dimension::Task | Dimension::Transaction => TaskSegmentMetric::VARIANTS,
            Dimension::Conversation => ConversationSegmentMetric::VARIANTS,
            Dimension::Dialogue => DialogueSegmentMetric::VARIANTS,
            Dimension::Bot => BotSegmentMetric::VARIANTS,
        }
    }

    fn task_id(&self) -> Option<&str> {
        match self {
            Self::Transaction { task_id, .. } => task_id.as_deref(),
            _ => None,
        }
    }
}

/// Aggregation kinds accepted by the `aggregation` descriptor.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Display, EnumString, IntoStaticStr, VariantNames,
)]
#[strum(serialize_all = "snake_case", ascii_case_insensitive)]
pub enum AggregationKind {
    Avg,
    Min,
    Max,
    Sum,
    Stats,
    ExtendedStats,
    ValueCount,
    Cardinality,
    Percentiles,
}

impl AggregationKind {
    /// Whether the search engine answers with a single `value`.
    pub fn is_single_value(self) -> bool {
        !matches!(self, Self::Stats | Self::ExtendedStats | Self::Percentiles)
    }
}

/// Comparison operation of an aggregation filter.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Display, EnumString, IntoStaticStr, VariantNames,
)]
#[strum(serialize_all = "lowercase", ascii_case_insensitive)]
pub enum FilterOperation {
    /// Strictly greater than.
    Gr,
    /// Greater than or equal.
    Gre,
    /// Strictly less than.
    Lq,
    /// Less than or equal.
    Lqe,
    /// Exact term match.
    Term,
    /// Full-text match.
    Match,
}

/// A restriction on the documents an aggregation runs over.
#[derive(Debug, Clone, PartialEq)]
pub struct Filter {
    pub field: String,
    pub operation: FilterOperation,
    pub value: Value,
}

impl Filter {
    pub fn to_repr(&self) -> Value {
        json!({
            "field": self.field,
            "operation": self.operation.to_string(),
            "value": self.value,
        })
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct CountDescriptor {
    pub project: String,
    pub time_span: TimeWindow,
    pub metric: CountMetric,
}

#[derive(Debug, Clone, PartialEq)]
pub struct SegmentationDescriptor {
    pub project: String,
    pub time_span: TimeWindow,
    pub metric: SegmentationMetric,
}

#[derive(Debug, Clone, PartialEq)]
pub struct AggregationDescriptor {
    pub project: String,
    pub time_span: TimeWindow,
    pub field: String,
    pub aggregation: AggregationKind,
    pub filters: Vec<Filter>,
}

/// A validated description of an analytic.
///
/// Serializes to (and deserializes from) the descriptor document format; see
/// [`AnalyticDescriptor::to_repr`] and [`DescriptorBuilder::build`].
#[derive(Debug, Clone, PartialEq)]
pub enum AnalyticDescriptor {
    Count(CountDescriptor),
    Segmentation(SegmentationDescriptor),
    Aggregation(AggregationDescriptor),
}

impl AnalyticDescriptor {
    pub fn kind(&self) -> DescriptorKind {
        match self {
            Self::Count(_) => DescriptorKind::Count,
            Self::Segmentation(_) => DescriptorKind::Segmentation,
            Self::Aggregation(_) => DescriptorKind::Aggregation,
        }
    }

    pub fn project(&self) -> &str {
        match self {
            Self::Count(d) => &d.project,
            Self::Segmentation(d) => &d.project,
            Self::Aggregation(d) => &d.project,
        }
    }

    pub fn time_span(&self) -> &TimeWindow {
        match self {
            Self::Count(d) => &d.time_span,
            Self::Segmentation(d) => &d.time_span,
            Self::Aggregation(d) => &d.time_span,
        }
    }

    /// The dimension targeted, if any. Aggregations have none.
    pub fn dimension(&self) -> Option<Dimension> {
        match self {
            Self::Count(d) => Some(d.metric.dimension()),
            Self::Segmentation(d) => Some(d.metric.dimension()),
            Self::Aggregation(_) => None,
        }
    }

    /// The canonical descriptor document.
    pub fn to_repr(&self) -> Value {
        let mut doc = Map::new();
        doc.insert("type".into(), json!(self.kind().to_string()));
        doc.insert("project".into(), json!(self.project()));
        doc.insert("timespan".into(), self.time_span().to_repr());

        match self {
            Self::Count(d) => {
                insert_dimension(&mut doc, d.metric.dimension(), d.metric.name(), d.metric.task_id())
            }
            Self::Segmentation(d) => {
                insert_dimension(&mut doc, d.metric.dimension(), d.metric.name(), d.metric.task_id())
            }
            Self::Aggregation(d) => {
                doc.insert("field".into(), json!(d.field));
                doc.insert("aggregation".into(), json!(d.aggregation.to_string()));
                if !d.filters.is_empty() {
                    let filters = d.filters.iter().map(Filter::to_repr).collect();
                    doc.insert("filters".into(), Value::Array(filters));
                }
            }
        }

        Value::Object(doc)
    }
}

fn insert_dimension(
    doc: &mut Map<String, Value>,
    dimension: Dimension,
    metric: &str,
    task_id: Option<&str>,
) {
    doc.insert("dimension".into(), json!(dimension.to_string()));
    doc.insert("metric".into(), json!(metric));
    if let Some(task_id) = task_id {
        doc.insert("task_id".into(), json!(task_id));
    }
}

impl Serialize for AnalyticDescriptor {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        self.to_repr().serialize(serializer)
    }
}

impl<'de> Deserialize<'de> for AnalyticDescriptor {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = Value::deserialize(deserializer)?;
        DescriptorBuilder::build(&raw).map_err(serde::de::Error::custom)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::str::FromStr;

    #[test]
    fn allow_lists_match_the_documented_metrics() {
        assert_eq!(
            CountMetric::allowed(Dimension::User),
            &["total", "active", "engaged", "new"]
        );
        assert_eq!(
            CountMetric::allowed(Dimension::Message),
            &["total", "from_users", "from_bot", "responses", "notifications"]
        );
        assert_eq!(
            CountMetric::allowed(Dimension::Transaction),
            CountMetric::allowed(Dimension::Task)
        );
        assert_eq!(
            SegmentationMetric::allowed(Dimension::Message),
            &["all", "channel", "intent"]
        );
    }

    #[test]
    fn metric_names_parse_case_insensitively() {
        assert_eq!(
            MessageCountMetric::from_str("FROM_BOT").unwrap(),
            MessageCountMetric::FromBot
        );
        assert_eq!(Dimension::from_str("Dialogue").unwrap(), Dimension::Dialogue);
        assert_eq!(
            AggregationKind::from_str("extended_stats").unwrap(),
            AggregationKind::ExtendedStats
        );
        assert!(UserCountMetric::from_str("bogus").is_err());
    }

    #[test]
    fn single_value_aggregations() {
        assert!(AggregationKind::Min.is_single_value());
        assert!(AggregationKind::Cardinality.is_single_value());
        assert!(!AggregationKind::Stats.is_single_value());
        assert!(!AggregationKind::Percentiles.is_single_value());
    }

    #[test]
    fn transaction_repr_carries_task_id() {
        let descriptor = AnalyticDescriptor::Count(CountDescriptor {
            project: "p".into(),
            time_span: TimeWindow::all(),
            metric: CountMetric::Transaction {
                metric: TaskCountMetric::Open,
                task_id: Some("t-9".into()),
            },
        });
        let repr = descriptor.to_repr();
        assert_eq!(repr["type"], "count");
        assert_eq!(repr["dimension"], "transaction");
        assert_eq!(repr["metric"], "open");
        assert_eq!(repr["task_id"], "t-9");
        assert_eq!(repr["timespan"], json!({"type": "moving", "value": "all"}));
    }

    #[test]
    fn aggregation_repr_omits_empty_filters() {
        let descriptor = AnalyticDescriptor::Aggregation(AggregationDescriptor {
            project: "p".into(),
            time_span: TimeWindow::today(),
            field: "intent.confidence".into(),
            aggregation: AggregationKind::Avg,
            filters: vec![],
        });
        let repr = descriptor.to_repr();
        assert_eq!(repr["aggregation"], "avg");
        assert!(repr.get("filters").is_none());
        assert!(descriptor.dimension().is_none());
    }

    #[test]
    fn serde_uses_the_document_format() {
        let raw = json!({
            "type": "segmentation",
            "project": "p",
            "timespan": {"type": "moving", "value": "7d"},
            "dimension": "message",
            "metric": "all",
        });
        let descriptor: AnalyticDescriptor = serde_json::from_value(raw.clone()).unwrap();
        assert_eq!(descriptor.kind(), DescriptorKind::Segmentation);
        assert_eq!(serde_json::to_value(&descriptor).unwrap(), raw);
    }

    #[test]
    fn serde_rejects_invalid_documents() {
        let raw = json!({
            "type": "count",
            "project": "p",
            "timespan": {"type": "moving", "value": "7d"},
            "dimension": "user",
            "metric": "bogus",
        });
        let err = serde_json::from_value::<AnalyticDescriptor>(raw).unwrap_err();
        assert!(err.to_string().contains("bogus"));
    }
}
