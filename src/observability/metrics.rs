//! Metrics collection and exposition.
//!
//! # Metrics
//! - `dynamic_upstream_operations_total` (counter): by upstream, action, outcome
//! - `dynamic_upstream_rejected_total` (counter): requests rejected before lookup completed, by kind
//! - `dynamic_upstream_peers` (gauge): peers per upstream after a mutation
//! - `dynamic_upstream_zone_used_bytes` (gauge): zone bytes in use per upstream

use std::net::SocketAddr;

use metrics::{counter, gauge};
use metrics_exporter_prometheus::PrometheusBuilder;

use crate::error::{ErrorKind, UpstreamResult};

/// Install the Prometheus exporter listening on `addr`.
///
/// Must be called from within a Tokio runtime.
pub fn init_metrics(addr: SocketAddr) {
    match PrometheusBuilder::new().with_http_listener(addr).install() {
        Ok(()) => tracing::info!(address = %addr, "Metrics exporter listening"),
        Err(e) => tracing::error!(address = %addr, error = %e, "Failed to install metrics exporter"),
    }
}

pub fn record_operation(upstream: &str, action: &'static str, result: &UpstreamResult<()>) {
    let outcome = match result {
        Ok(()) => "ok",
        Err(e) => e.kind().as_str(),
    };
    counter!(
        "dynamic_upstream_operations_total",
        "upstream" => upstream.to_string(),
        "action" => action,
        "outcome" => outcome
    )
    .increment(1);
}

pub fn record_rejected(kind: ErrorKind) {
    counter!("dynamic_upstream_rejected_total", "kind" => kind.as_str()).increment(1);
}

pub fn record_group_state(upstream: &str, peers: usize, zone_used: usize) {
    gauge!("dynamic_upstream_peers", "upstream" => upstream.to_string()).set(peers as f64);
    gauge!("dynamic_upstream_zone_used_bytes", "upstream" => upstream.to_string())
        .set(zone_used as f64);
}
