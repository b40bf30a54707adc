// SPDX-FileCopyrightText: 2026 Chatlytics Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use serde_json::Value;

use chatlytics_core::ChatlyticsError;

use super::ComputeContext;
use crate::descriptor::{AggregationDescriptor, AggregationKind};
use crate::query::{SearchQuery, SearchResponse};
use crate::result::{AggregationValue, AnalyticResult};

/// Aggregation engine.
pub struct AggregationComputation;

impl AggregationComputation {
    pub async fn compute(
        ctx: &ComputeContext,
        descriptor: &AggregationDescriptor,
        now: DateTime<Utc>,
    ) -> Result<AnalyticResult, ChatlyticsError> {
        let window = descriptor.time_span.resolve(now);

        let query = descriptor.filters.iter().fold(
            SearchQuery::for_project(&descriptor.project).within(&window),
            |query, filter| query.with_filter(filter),
        );
        let kind: &'static str = descriptor.aggregation.into();
        let response = ctx.run(query.metric(kind, &descriptor.field)).await?;

        let value = extract(descriptor.aggregation, &response);
        Ok(AnalyticResult::aggregation(value, window, now))
    }
}

fn extract(kind: AggregationKind, response: &SearchResponse) -> Option<AggregationValue> {
    if kind.is_single_value() {
        return response.value().map(AggregationValue::Scalar);
    }

    let agg = response.aggregation()?;
    let source = match kind {
        AggregationKind::Percentiles => agg.get("values")?,
        _ => agg,
    };
    let stats = numeric_entries(source);
    (!stats.is_empty()).then_some(AggregationValue::Stats(stats))
}

/// Top-level numeric members of an object; nulls and nested objects are dropped.
fn numeric_entries(raw: &Value) -> BTreeMap<String, f64> {
    raw.as_object()
        .map(|obj| {
            obj.iter()
                .filter_map(|(name, v)| v.as_f64().map(|n| (name.clone(), n)))
                .collect()
        })
        .unwrap_or_default()
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn response(agg: Value) -> SearchResponse {
        SearchResponse::new(json!({ "aggregations": { "type_count": agg } }))
    }

    #[test]
    fn single_value_reads_value() {
        let value = extract(AggregationKind::Avg, &response(json!({"value": 0.75})));
        assert_eq!(value, Some(AggregationValue::Scalar(0.75)));
    }

    #[test]
    fn single_value_missing_is_none() {
        assert_eq!(extract(AggregationKind::Min, &response(json!({}))), None);
        assert_eq!(
            extract(AggregationKind::Min, &response(json!({"value": null}))),
            None
        );
        assert_eq!(
            extract(AggregationKind::Max, &SearchResponse::new(json!({}))),
            None
        );
    }

    #[test]
    fn extended_stats_keep_numeric_members() {
        let value = extract(
            AggregationKind::ExtendedStats,
            &response(json!({
                "count": 4,
                "min": 0.1,
                "max": null,
                "std_deviation_bounds": {"upper": 1.0, "lower": 0.0},
            })),
        );
        let Some(AggregationValue::Stats(stats)) = value else {
            panic!("expected stats, got {value:?}");
        };
        assert_eq!(stats.len(), 2);
        assert_eq!(stats["count"], 4.0);
        assert_eq!(stats["min"], 0.1);
    }

    #[test]
    fn percentiles_read_values_object() {
        let value = extract(
            AggregationKind::Percentiles,
            &response(json!({"values": {"50.0": 0.5, "99.0": 0.9}})),
        );
        let Some(AggregationValue::Stats(stats)) = value else {
            panic!("expected stats, got {value:?}");
        };
        assert_eq!(stats["50.0"], 0.5);
        assert_eq!(
            extract(AggregationKind::Percentiles, &response(json!({}))),
            None
        );
    }
}
