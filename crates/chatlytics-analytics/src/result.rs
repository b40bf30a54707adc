// SPDX-FileCopyrightText: 2026 Chatlytics Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Result envelopes.
//!
//! Every envelope carries its creation instant and the resolved window
//! bounds. Serialized field names follow the published result documents
//! (`creationDt`, `fromDt`, `toDt`).

use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::descriptor::DescriptorKind;
use crate::time_window::ResolvedWindow;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CountResult {
    pub count: u64,
    /// Population the count is measured against, when the metric has one.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub total: Option<u64>,
    #[serde(rename = "creationDt")]
    pub created_at: DateTime<Utc>,
    #[serde(rename = "fromDt", default)]
    pub from: Option<DateTime<Utc>>,
    #[serde(rename = "toDt")]
    pub to: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Segment {
    #[serde(rename = "type")]
    pub label: String,
    pub count: u64,
}

impl Segment {
    pub fn new(label: impl Into<String>, count: u64) -> Self {
        Self {
            label: label.into(),
            count,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SegmentationResult {
    pub segments: Vec<Segment>,
    #[serde(rename = "creationDt")]
    pub created_at: DateTime<Utc>,
    #[serde(rename = "fromDt", default)]
    pub from: Option<DateTime<Utc>>,
    #[serde(rename = "toDt")]
    pub to: DateTime<Utc>,
}

/// A single number or a map of statistic name to number.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum AggregationValue {
    Scalar(f64),
    Stats(BTreeMap<String, f64>),
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AggregationResult {
    /// `None` when no document matched.
    pub aggregation: Option<AggregationValue>,
    #[serde(rename = "creationDt")]
    pub created_at: DateTime<Utc>,
    #[serde(rename = "fromDt", default)]
    pub from: Option<DateTime<Utc>>,
    #[serde(rename = "toDt")]
    pub to: DateTime<Utc>,
}

/// The typed output of a computation, tagged like its descriptor.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum AnalyticResult {
    Count(CountResult),
    Segmentation(SegmentationResult),
    Aggregation(AggregationResult),
}

impl AnalyticResult {
    pub fn count(
        count: u64,
        total: Option<u64>,
        window: ResolvedWindow,
        created_at: DateTime<Utc>,
    ) -> Self {
        Self::Count(CountResult {
            count,
            total,
            created_at,
            from: window.from,
            to: window.to,
        })
    }

    pub fn segmentation(
        segments: Vec<Segment>,
        window: ResolvedWindow,
        created_at: DateTime<Utc>,
    ) -> Self {
        Self::Segmentation(SegmentationResult {
            segments,
            created_at,
            from: window.from,
            to: window.to,
        })
    }

    pub fn aggregation(
        aggregation: Option<AggregationValue>,
        window: ResolvedWindow,
        created_at: DateTime<Utc>,
    ) -> Self {
        Self::Aggregation(AggregationResult {
            aggregation,
            created_at,
            from: window.from,
            to: window.to,
        })
    }

    pub fn kind(&self) -> DescriptorKind {
        match self {
            Self::Count(_) => DescriptorKind::Count,
            Self::Segmentation(_) => DescriptorKind::Segmentation,
            Self::Aggregation(_) => DescriptorKind::Aggregation,
        }
    }

    pub fn created_at(&self) -> DateTime<Utc> {
        match self {
            Self::Count(r) => r.created_at,
            Self::Segmentation(r) => r.created_at,
            Self::Aggregation(r) => r.created_at,
        }
    }

    pub fn window(&self) -> ResolvedWindow {
        let (from, to) = match self {
            Self::Count(r) => (r.from, r.to),
            Self::Segmentation(r) => (r.from, r.to),
            Self::Aggregation(r) => (r.from, r.to),
        };
        ResolvedWindow { from, to }
    }
}
