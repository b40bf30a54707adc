// SPDX-FileCopyrightText: 2026 Chatlytics Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! REST gateway for Chatlytics.
//!
//! Exposes the analytic lifecycle and message ingestion over HTTP. `/v1/*`
//! routes sit behind bearer-token auth; `/health` and `/metrics` are public.

pub mod auth;
pub mod error;
pub mod handlers;
pub mod server;

pub use auth::AuthConfig;
pub use error::{ApiError, ErrorResponse};
pub use server::{GatewayState, HealthState, ServerConfig, router, start_server};
