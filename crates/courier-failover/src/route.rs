// SPDX-FileCopyrightText: 2026 Courier Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Channel ordering.
//!
//! Pure decision logic: given the connectivity snapshot, the caller's
//! preference, the configured default order, and which channels have an
//! adapter installed, produce the ordered route and a reason string for
//! logs and events.

use courier_core::{Channel, Connectivity};
use serde::Serialize;

/// Why the route has the order it has.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum RouteReason {
    /// Offline: the offline-capable channel goes first.
    OfflineOverride,
    /// The caller's preferred channel goes first.
    Preferred,
    /// No preference; configured default order.
    DefaultOrder,
}

impl std::fmt::Display for RouteReason {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(match self {
            RouteReason::OfflineOverride => "offline_override",
            RouteReason::Preferred => "preferred",
            RouteReason::DefaultOrder => "default_order",
        })
    }
}

/// The ordered channels to try for one message.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RoutePlan {
    /// At most two entries, no duplicates, only installed channels.
    pub channels: Vec<Channel>,
    pub reason: RouteReason,
    /// Channels dropped from the ideal order because no adapter is installed.
    pub skipped: Vec<Channel>,
}

impl RoutePlan {
    pub fn primary(&self) -> Option<Channel> {
        self.channels.first().copied()
    }

    pub fn is_empty(&self) -> bool {
        self.channels.is_empty()
    }
}

/// Decide the channel order for one dispatch.
pub fn plan_route(
    connectivity: Connectivity,
    preferred: Option<Channel>,
    default_order: &[Channel],
    installed: &[Channel],
) -> RoutePlan {
    let (first, reason) = match (connectivity, preferred) {
        (Connectivity::Offline, _) => (Some(Channel::offline_capable()), RouteReason::OfflineOverride),
        (Connectivity::Online, Some(channel)) => (Some(channel), RouteReason::Preferred),
        (Connectivity::Online, None) => (None, RouteReason::DefaultOrder),
    };

    let mut ideal: Vec<Channel> = Vec::with_capacity(Channel::ALL.len());
    let tail = default_order.iter().copied().chain(Channel::ALL);
    for channel in first.into_iter().chain(tail) {
        if !ideal.contains(&channel) {
            ideal.push(channel);
        }
    }

    let (channels, skipped): (Vec<Channel>, Vec<Channel>) =
        ideal.into_iter().partition(|c| installed.contains(c));

    RoutePlan {
        channels,
        reason,
        skipped,
    }
}
