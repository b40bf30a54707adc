// SPDX-FileCopyrightText: 2026 Chatlytics Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Search query bodies and response extraction.
//!
//! Every search-backed metric is a filtered bool query over one project with
//! at most one aggregation named [`AGGREGATION_NAME`]. Response readers treat
//! missing keys as "no matching data": zero, empty, or `None`.

use std::collections::HashSet;

use chrono::{DateTime, SecondsFormat, Utc};
use serde_json::{Map, Value, json};

use crate::descriptor::{Filter, FilterOperation};
use crate::time_window::ResolvedWindow;

/// Name of the single aggregation every metric query carries.
pub const AGGREGATION_NAME: &str = "type_count";

/// Source name of the single-field composite aggregation.
pub const COMPOSITE_SOURCE: &str = "key";

/// Field holding the message instant in the messages index.
pub const TIMESTAMP_FIELD: &str = "timestamp";

/// Options of a `terms` bucket aggregation.
#[derive(Debug, Clone, Default)]
pub struct TermsOptions<'a> {
    pub size: usize,
    /// Field whose cardinality per bucket replaces `doc_count`.
    pub unique: Option<&'a str>,
}

/// A filtered query with an optional aggregation.
#[derive(Debug, Clone)]
pub struct SearchQuery {
    filters: Vec<Value>,
    aggregation: Option<Value>,
}

impl SearchQuery {
    pub fn for_project(project: &str) -> Self {
        Self {
            filters: vec![json!({ "term": { "project": project } })],
            aggregation: None,
        }
    }

    /// Restrict to `[from, to)`. An unbounded window only gets the upper bound.
    pub fn within(mut self, window: &ResolvedWindow) -> Self {
        let mut range = Map::new();
        if let Some(from) = window.from {
            range.insert("gte".into(), json!(instant(from)));
        }
        range.insert("lt".into(), json!(instant(window.to)));
        self.filters
            .push(json!({ "range": { TIMESTAMP_FIELD: Value::Object(range) } }));
        self
    }

    /// Restrict to documents strictly before `instant`.
    pub fn before(mut self, at: DateTime<Utc>) -> Self {
        self.filters
            .push(json!({ "range": { TIMESTAMP_FIELD: { "lt": instant(at) } } }));
        self
    }

    pub fn term(mut self, field: &str, value: impl Into<Value>) -> Self {
        self.filters
            .push(json!({ "term": { field: value.into() } }));
        self
    }

    pub fn with_filter(mut self, filter: &Filter) -> Self {
        let clause = match filter.operation {
            FilterOperation::Gr => range(&filter.field, "gt", &filter.value),
            FilterOperation::Gre => range(&filter.field, "gte", &filter.value),
            FilterOperation::Lq => range(&filter.field, "lt", &filter.value),
            FilterOperation::Lqe => range(&filter.field, "lte", &filter.value),
            FilterOperation::Term => json!({ "term": { filter.field.as_str(): filter.value } }),
            FilterOperation::Match => json!({ "match": { filter.field.as_str(): filter.value } }),
        };
        self.filters.push(clause);
        self
    }

    /// A single metric aggregation such as `cardinality` or `avg`.
    pub fn metric(mut self, kind: &str, field: &str) -> Self {
        self.aggregation = Some(json!({ kind: { "field": field } }));
        self
    }

    /// A `terms` bucket aggregation on `field`.
    pub fn terms(mut self, field: &str, options: TermsOptions<'_>) -> Self {
        let mut terms = Map::new();
        terms.insert("field".into(), json!(field));
        terms.insert("size".into(), json!(options.size));

        let mut agg = Map::new();
        agg.insert("terms".into(), Value::Object(terms));
        if let Some(unique) = options.unique {
            agg.insert(
                "aggs".into(),
                json!({ "unique": { "cardinality": { "field": unique } } }),
            );
        }
        self.aggregation = Some(Value::Object(agg));
        self
    }

    /// One page of a `composite` aggregation over the distinct values of
    /// `field`, resuming after `after` when given.
    pub fn composite(mut self, field: &str, size: usize, after: Option<&Value>) -> Self {
        let mut composite = Map::new();
        composite.insert("size".into(), json!(size));
        composite.insert(
            "sources".into(),
            json!([{ COMPOSITE_SOURCE: { "terms": { "field": field } } }]),
        );
        if let Some(after) = after {
            composite.insert("after".into(), after.clone());
        }
        self.aggregation = Some(json!({ "composite": Value::Object(composite) }));
        self
    }

    pub fn to_body(&self) -> Value {
        let mut body = Map::new();
        body.insert("size".into(), json!(0));
        body.insert(
            "query".into(),
            json!({ "bool": { "filter": self.filters } }),
        );
        if let Some(agg) = &self.aggregation {
            body.insert("aggs".into(), json!({ AGGREGATION_NAME: agg }));
        }
        Value::Object(body)
    }
}

fn instant(at: DateTime<Utc>) -> String {
    at.to_rfc3339_opts(SecondsFormat::Millis, true)
}

fn range(field: &str, op: &str, value: &Value) -> Value {
    json!({ "range": { field: { op: value } } })
}

/// One bucket of a `terms` aggregation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Bucket {
    pub key: String,
    pub doc_count: u64,
    pub unique: Option<u64>,
}

impl Bucket {
    /// The unique count when present, the document count otherwise.
    pub fn count(&self) -> u64 {
        self.unique.unwrap_or(self.doc_count)
    }
}

/// Read-only view over a raw search response.
#[derive(Debug, Clone)]
pub struct SearchResponse(Value);

impl SearchResponse {
    pub fn new(raw: Value) -> Self {
        Self(raw)
    }

    /// The `type_count` aggregation object, if present.
    pub fn aggregation(&self) -> Option<&Value> {
        self.0
            .get("aggregations")
            .and_then(|aggs| aggs.get(AGGREGATION_NAME))
            .filter(|agg| !agg.is_null())
    }

    /// `aggregations.type_count.value` as a number.
    pub fn value(&self) -> Option<f64> {
        self.aggregation()
            .and_then(|agg| agg.get("value"))
            .and_then(Value::as_f64)
    }

    /// The metric value as a count, zero when absent.
    pub fn count(&self) -> u64 {
        self.value().map(to_count).unwrap_or(0)
    }

    pub fn buckets(&self) -> Vec<Bucket> {
        self.aggregation()
            .and_then(|agg| agg.get("buckets"))
            .and_then(Value::as_array)
            .map(|buckets| buckets.iter().filter_map(parse_bucket).collect())
            .unwrap_or_default()
    }

    pub fn bucket_keys(&self) -> HashSet<String> {
        self.buckets().into_iter().map(|b| b.key).collect()
    }

    /// `after_key` of a composite page; absent on the last page.
    pub fn after_key(&self) -> Option<&Value> {
        self.aggregation()
            .and_then(|agg| agg.get("after_key"))
            .filter(|key| !key.is_null())
    }
}

fn to_count(value: f64) -> u64 {
    if value.is_finite() && value > 0.0 {
        value.round() as u64
    } else {
        0
    }
}

fn parse_bucket(raw: &Value) -> Option<Bucket> {
    let key = match raw.get("key")? {
        // Composite buckets key by source name.
        Value::Object(sources) => match sources.get(COMPOSITE_SOURCE)? {
            Value::String(s) => s.clone(),
            Value::Null => return None,
            other => other.to_string(),
        },
        Value::String(s) => s.clone(),
        Value::Null => return None,
        other => other.to_string(),
    };
    let doc_count = raw.get("doc_count").and_then(Value::as_u64).unwrap_or(0);
    let unique = raw
        .get("unique")
        .and_then(|u| u.get("value"))
        .and_then(Value::as_f64)
        .map(to_count);
    Some(Bucket {
        key,
        doc_count,
        unique,
    })
}
