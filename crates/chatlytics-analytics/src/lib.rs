// SPDX-FileCopyrightText: 2026 Chatlytics Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Analytics engine for Chatlytics.
//!
//! The pipeline runs leaf-first: a [`TimeWindow`] resolves to concrete bounds,
//! a descriptor document is parsed by [`DescriptorBuilder`] into a typed
//! [`AnalyticDescriptor`], the [`ComputeEngine`] turns it into search or
//! task-manager queries, and the answer is wrapped in an [`AnalyticResult`].
//! [`AnalyticService`] persists analytics through an [`AnalyticStore`] and
//! [`RecomputeScheduler`] keeps moving-window analytics fresh.

pub mod analytic;
pub mod builder;
pub mod compute;
pub mod descriptor;
pub mod ingest;
pub mod query;
pub mod result;
pub mod scheduler;
pub mod service;
pub mod store;
pub mod time_window;

pub use analytic::{Analytic, AnalyticState};
pub use builder::DescriptorBuilder;
pub use compute::{ComputeEngine, EngineSettings, set_difference_count};
pub use descriptor::{AnalyticDescriptor, DescriptorKind, Dimension};
pub use ingest::{ChatMessage, MessageIngestor, MessageType};
pub use result::{AggregationValue, AnalyticResult, Segment};
pub use scheduler::{JobOutcome, RecomputeScheduler, SchedulerSettings};
pub use service::AnalyticService;
pub use store::{AnalyticStore, InMemoryStore};
pub use time_window::{ResolvedWindow, TimeWindow};
