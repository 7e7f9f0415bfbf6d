// SPDX-FileCopyrightText: 2026 Courier Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Failover delivery engine for the Courier service.
//!
//! [`FailoverOrchestrator`] turns an [`OutboundMessage`](courier_core::OutboundMessage)
//! into a sealed [`DeliveryRecord`](courier_core::DeliveryRecord): it snapshots the
//! [`NetworkMonitor`], orders the installed channels with [`plan_route`],
//! tries the primary, falls back to the secondary on any transport
//! failure, and appends the result to history.

pub mod error;
pub mod events;
pub mod limit;
pub mod metrics;
pub mod network;
pub mod orchestrator;
pub mod route;

pub use error::DispatchError;
pub use events::{DeliveryEvent, EventBus};
pub use limit::ChannelLimits;
pub use network::NetworkMonitor;
pub use orchestrator::{FailoverOrchestrator, OrchestratorBuilder};
pub use route::{RoutePlan, RouteReason, plan_route};
