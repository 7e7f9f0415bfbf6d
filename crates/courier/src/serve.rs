// SPDX-FileCopyrightText: 2026 Courier Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! `courier serve` command implementation.
//!
//! Opens storage, builds whichever channels are configured, starts the
//! optional connectivity probe, and serves the gateway until SIGINT or
//! SIGTERM.

use std::sync::Arc;
use std::time::Duration;

use courier_config::CourierConfig;
use courier_core::CourierError;
use courier_failover::NetworkMonitor;
use courier_gateway::{AuthConfig, GatewayState, HealthState, MetricsRender, ServerConfig};
use metrics_exporter_prometheus::PrometheusBuilder;
use tracing::{info, warn};

use crate::{shutdown, wiring};

/// Runs the `courier serve` command.
pub async fn run_serve(config: CourierConfig) -> Result<(), CourierError> {
    info!(name = %config.service.name, "starting courier serve");

    let metrics_render = install_metrics();

    let history = wiring::open_history(&config).await?;
    let monitor = NetworkMonitor::new(config.network.initial_state);
    courier_failover::metrics::set_connectivity(config.network.initial_state);
    let orchestrator = Arc::new(wiring::build_orchestrator(
        &config,
        history.clone(),
        monitor.clone(),
    )?);

    let cancel = shutdown::install_signal_handler();

    let probe = match &config.network.probe_url {
        Some(url) => Some(
            monitor
                .spawn_probe(
                    url.clone(),
                    Duration::from_secs(config.network.probe_interval_secs),
                    cancel.clone(),
                )
                .map_err(|e| CourierError::Internal(format!("failed to start connectivity probe: {e}")))?,
        ),
        None => None,
    };

    if config.gateway.bearer_token.is_none() {
        warn!("gateway.bearer_token is not set; the API accepts unauthenticated requests");
    }

    let state = GatewayState {
        orchestrator,
        auth: AuthConfig {
            bearer_token: config.gateway.bearer_token.clone(),
        },
        health: HealthState::new(metrics_render),
    };
    let server_config = ServerConfig {
        host: config.gateway.host.clone(),
        port: config.gateway.port,
    };

    let served = courier_gateway::start_server(&server_config, state, cancel.clone()).await;

    // Stop the probe whether the server exited cleanly or not.
    cancel.cancel();
    if let Some(probe) = probe {
        let _ = probe.await;
    }
    history.close().await?;
    served?;

    info!("courier serve shutdown complete");
    Ok(())
}

/// Install the Prometheus recorder and hand back a render closure.
///
/// Failure leaves metrics disabled; delivery keeps working.
fn install_metrics() -> Option<MetricsRender> {
    match PrometheusBuilder::new().install_recorder() {
        Ok(handle) => {
            courier_failover::metrics::register_metrics();
            info!("prometheus metrics recorder installed");
            Some(Arc::new(move || handle.render()))
        }
        Err(e) => {
            warn!(error = %e, "prometheus initialization failed, continuing without metrics");
            None
        }
    }
}

/// Initializes the tracing subscriber with the given log level.
///
/// Logs go to stderr so one-shot commands keep stdout for their output.
pub fn init_tracing(log_level: &str) {
    use tracing_subscriber::EnvFilter;

    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(format!("courier={log_level},warn")));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(true)
        .with_writer(std::io::stderr)
        .init();
}
