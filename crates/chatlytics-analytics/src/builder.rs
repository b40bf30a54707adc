// SPDX-FileCopyrightText: 2026 Chatlytics Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Parsing of untyped descriptor documents into [`AnalyticDescriptor`].

use std::str::FromStr;

use serde_json::{Map, Value};

use chatlytics_core::ValidationError;

use crate::descriptor::{
    AggregationDescriptor, AggregationKind, AnalyticDescriptor, BotCountMetric, BotSegmentMetric,
    ConversationCountMetric, ConversationSegmentMetric, CountDescriptor, CountMetric,
    DescriptorKind, DialogueCountMetric, DialogueSegmentMetric, Dimension, Filter,
    FilterOperation, MessageCountMetric, MessageSegmentMetric, SegmentationDescriptor,
    SegmentationMetric, TaskCountMetric, TaskSegmentMetric, UserCountMetric, UserSegmentMetric,
};
use crate::time_window::TimeWindow;

/// Builds typed descriptors from descriptor documents.
///
/// Validation order is `type`, `project`, `timespan`, then the
/// family-specific fields. The first failure is returned.
pub struct DescriptorBuilder;

impl DescriptorBuilder {
    pub fn build(raw: &Value) -> Result<AnalyticDescriptor, ValidationError> {
        let doc = raw.as_object().ok_or_else(|| ValidationError::InvalidField {
            field: "descriptor",
            reason: "expected a JSON object".to_string(),
        })?;

        let kind_raw = required_str(doc, "type")?;
        let kind = DescriptorKind::from_str(kind_raw)
            .map_err(|_| ValidationError::UnrecognizedDescriptorType(kind_raw.to_string()))?;

        let project = required_str(doc, "project")?;
        if project.trim().is_empty() {
            return Err(ValidationError::InvalidField {
                field: "project",
                reason: "must not be empty".to_string(),
            });
        }
        let project = project.to_string();

        let time_span = TimeWindow::from_repr(
            doc.get("timespan")
                .filter(|v| !v.is_null())
                .ok_or(ValidationError::MissingField("timespan"))?,
        )?;

        match kind {
            DescriptorKind::Count => {
                let metric = parse_count_metric(doc)?;
                Ok(AnalyticDescriptor::Count(CountDescriptor {
                    project,
                    time_span,
                    metric,
                }))
            }
            DescriptorKind::Segmentation => {
                let metric = parse_segmentation_metric(doc)?;
                Ok(AnalyticDescriptor::Segmentation(SegmentationDescriptor {
                    project,
                    time_span,
                    metric,
                }))
            }
            DescriptorKind::Aggregation => {
                let field = required_str(doc, "field")?.to_string();
                let aggregation_raw = required_str(doc, "aggregation")?;
                let aggregation = AggregationKind::from_str(aggregation_raw)
                    .map_err(|_| ValidationError::UnknownAggregation(aggregation_raw.to_string()))?;
                let filters = parse_filters(doc.get("filters"))?;
                Ok(AnalyticDescriptor::Aggregation(AggregationDescriptor {
                    project,
                    time_span,
                    field,
                    aggregation,
                    filters,
                }))
            }
        }
    }
}

fn required_str<'a>(
    doc: &'a Map<String, Value>,
    field: &'static str,
) -> Result<&'a str, ValidationError> {
    match doc.get(field) {
        None | Some(Value::Null) => Err(ValidationError::MissingField(field)),
        Some(Value::String(s)) => Ok(s),
        Some(_) => Err(ValidationError::InvalidField {
            field,
            reason: "expected a string".to_string(),
        }),
    }
}

fn parse_dimension(doc: &Map<String, Value>) -> Result<(Dimension, &str), ValidationError> {
    let raw = required_str(doc, "dimension")?;
    let dimension = Dimension::from_str(raw)
        .map_err(|_| ValidationError::UnrecognizedDimension(raw.to_string()))?;
    let metric = required_str(doc, "metric")?;
    Ok((dimension, metric))
}

fn parse_task_id(doc: &Map<String, Value>) -> Result<Option<String>, ValidationError> {
    match doc.get("task_id") {
        None | Some(Value::Null) => Ok(None),
        Some(Value::String(s)) => Ok(Some(s.clone())),
        Some(_) => Err(ValidationError::InvalidField {
            field: "task_id",
            reason: "expected a string".to_string(),
        }),
    }
}

/// Parse `raw` as the metric enum `M`, naming the pair on failure.
fn metric<M: FromStr>(
    kind: DescriptorKind,
    dimension: Dimension,
    raw: &str,
) -> Result<M, ValidationError> {
    M::from_str(raw).map_err(|_| ValidationError::UnknownMetric {
        kind: kind.to_string(),
        dimension: dimension.to_string(),
        metric: raw.to_string(),
    })
}

fn parse_count_metric(doc: &Map<String, Value>) -> Result<CountMetric, ValidationError> {
    let (dimension, raw) = parse_dimension(doc)?;
    let kind = DescriptorKind::Count;
    Ok(match dimension {
        Dimension::User => CountMetric::User(metric::<UserCountMetric>(kind, dimension, raw)?),
        Dimension::Message => {
            CountMetric::Message(metric::<MessageCountMetric>(kind, dimension, raw)?)
        }
        Dimension::Task => CountMetric::Task(metric::<TaskCountMetric>(kind, dimension, raw)?),
        Dimension::Transaction => CountMetric::Transaction {
            metric: metric::<TaskCountMetric>(kind, dimension, raw)?,
            task_id: parse_task_id(doc)?,
        },
        Dimension::Conversation => {
            CountMetric::Conversation(metric::<ConversationCountMetric>(kind, dimension, raw)?)
        }
        Dimension::Dialogue => {
            CountMetric::Dialogue(metric::<DialogueCountMetric>(kind, dimension, raw)?)
        }
        Dimension::Bot => CountMetric::Bot(metric::<BotCountMetric>(kind, dimension, raw)?),
    })
}

fn parse_segmentation_metric(
    doc: &Map<String, Value>,
) -> Result<SegmentationMetric, ValidationError> {
    let (dimension, raw) = parse_dimension(doc)?;
    let kind = DescriptorKind::Segmentation;
    Ok(match dimension {
        Dimension::User => {
            SegmentationMetric::User(metric::<UserSegmentMetric>(kind, dimension, raw)?)
        }
        Dimension::Message => {
            SegmentationMetric::Message(metric::<MessageSegmentMetric>(kind, dimension, raw)?)
        }
        Dimension::Task => {
            SegmentationMetric::Task(metric::<TaskSegmentMetric>(kind, dimension, raw)?)
        }
        Dimension::Transaction => SegmentationMetric::Transaction {
            metric: metric::<TaskSegmentMetric>(kind, dimension, raw)?,
            task_id: parse_task_id(doc)?,
        },
        Dimension::Conversation => {
            let m = metric::<ConversationSegmentMetric>(kind, dimension, raw)?;
            SegmentationMetric::Conversation(m)
        }
        Dimension::Dialogue => {
            SegmentationMetric::Dialogue(metric::<DialogueSegmentMetric>(kind, dimension, raw)?)
        }
        Dimension::Bot => SegmentationMetric::Bot(metric::<BotSegmentMetric>(kind, dimension, raw)?),
    })
}

fn parse_filters(raw: Option<&Value>) -> Result<Vec<Filter>, ValidationError> {
    let items = match raw {
        None | Some(Value::Null) => return Ok(Vec::new()),
        Some(Value::Array(items)) => items,
        Some(_) => {
            return Err(ValidationError::InvalidField {
                field: "filters",
                reason: "expected an array".to_string(),
            });
        }
    };

    items
        .iter()
        .map(|item| {
            let obj = item.as_object().ok_or_else(|| ValidationError::InvalidField {
                field: "filters",
                reason: "each filter must be an object".to_string(),
            })?;
            let field = match obj.get("field") {
                Some(Value::String(s)) => s.clone(),
                _ => return Err(ValidationError::MissingField("filters.field")),
            };
            let operation = match obj.get("operation") {
                Some(Value::String(op)) => FilterOperation::from_str(op)
                    .map_err(|_| ValidationError::UnknownFilterOperation(op.clone()))?,
                _ => return Err(ValidationError::MissingField("filters.operation")),
            };
            let value = obj
                .get("value")
                .filter(|v| !v.is_null())
                .cloned()
                .ok_or(ValidationError::MissingField("filters.value"))?;
            Ok(Filter {
                field,
                operation,
                value,
            })
        })
        .collect()
}
