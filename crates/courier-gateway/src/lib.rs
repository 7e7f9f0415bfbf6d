// SPDX-FileCopyrightText: 2026 Courier Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! HTTP gateway for the Courier delivery service.
//!
//! Exposes the failover orchestrator over a small JSON API: submit a
//! message, read delivery history, validate a provider identifier, and
//! inspect or override connectivity. `/health` and `/metrics` are always
//! public; every other route sits behind the optional bearer token.

pub mod auth;
pub mod handlers;
pub mod server;

pub use auth::AuthConfig;
pub use server::{GatewayState, HealthState, MetricsRender, ServerConfig, router, start_server};
