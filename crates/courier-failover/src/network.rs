// SPDX-FileCopyrightText: 2026 Courier Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Connectivity tracking.
//!
//! [`NetworkMonitor`] is a cloneable handle over a `watch` channel. Writers
//! report transitions; the orchestrator takes one snapshot per dispatch.

use std::sync::Arc;
use std::time::Duration;

use courier_core::Connectivity;
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

/// Shared, injectable view of the current connectivity state.
#[derive(Clone)]
pub struct NetworkMonitor {
    tx: Arc<watch::Sender<Connectivity>>,
}

impl NetworkMonitor {
    pub fn new(initial: Connectivity) -> Self {
        let (tx, _rx) = watch::channel(initial);
        Self { tx: Arc::new(tx) }
    }

    /// The state right now.
    pub fn snapshot(&self) -> Connectivity {
        *self.tx.borrow()
    }

    /// Report a state. Returns `true` when this was a transition.
    pub fn set(&self, state: Connectivity) -> bool {
        let changed = self.tx.send_if_modified(|current| {
            if *current == state {
                false
            } else {
                *current = state;
                true
            }
        });
        if changed {
            info!(state = %state, "connectivity changed");
            crate::metrics::set_connectivity(state);
        }
        changed
    }

    /// Receiver that observes every subsequent transition.
    pub fn subscribe(&self) -> watch::Receiver<Connectivity> {
        self.tx.subscribe()
    }

    /// Periodically `HEAD` `url` and report online on any response,
    /// offline on a connection failure or timeout.
    pub fn spawn_probe(
        &self,
        url: String,
        interval: Duration,
        cancel: CancellationToken,
    ) -> Result<JoinHandle<()>, reqwest::Error> {
        let client = reqwest::Client::builder().timeout(interval).build()?;
        let monitor = self.clone();
        info!(url = %url, interval_secs = interval.as_secs(), "starting connectivity probe");

        Ok(tokio::spawn(async move {
            let mut ticker = tokio::time::interval(interval);
            ticker.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Delay);
            loop {
                tokio::select! {
                    _ = cancel.cancelled() => {
                        debug!("connectivity probe stopped");
                        break;
                    }
                    _ = ticker.tick() => {
                        let state = match client.head(&url).send().await {
                            Ok(_) => Connectivity::Online,
                            Err(e) => {
                                warn!(error = %e, "connectivity probe failed");
                                Connectivity::Offline
                            }
                        };
                        monitor.set(state);
                    }
                }
            }
        }))
    }
}

impl Default for NetworkMonitor {
    fn default() -> Self {
        Self::new(Connectivity::Online)
    }
}
