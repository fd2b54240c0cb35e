// Copyright (c) 2025 Erick Bourgeois, firestoned
// SPDX-License-Identifier: MIT

//! Prometheus metrics for the routeplane control plane.
//!
//! All metrics live in [`METRICS_REGISTRY`] under the
//! `routeplane_firestoned_io_` namespace and are exposed on the admin
//! surface's `/metrics` endpoint.

use prometheus::{CounterVec, Encoder, Opts, Registry, TextEncoder};
use std::sync::LazyLock;

/// Namespace prefix for all routeplane metrics (prometheus-safe)
const METRICS_NAMESPACE: &str = "routeplane_firestoned_io";

/// Global Prometheus metrics registry
pub static METRICS_REGISTRY: LazyLock<Registry> = LazyLock::new(Registry::new);

/// DNS provider record operations by direction and outcome
///
/// Labels:
/// - `direction`: `add` or `remove`
/// - `outcome`: `ok` or `error`
pub static DNS_RECORD_OPS_TOTAL: LazyLock<CounterVec> = LazyLock::new(|| {
    let opts = Opts::new(
        format!("{METRICS_NAMESPACE}_dns_record_ops_total"),
        "DNS provider record operations by direction and outcome",
    );
    let counter = CounterVec::new(opts, &["direction", "outcome"]).unwrap();
    METRICS_REGISTRY
        .register(Box::new(counter.clone()))
        .unwrap();
    counter
});

/// Full resync passes driven through the administrative sync action
pub static RESYNC_PASSES_TOTAL: LazyLock<CounterVec> = LazyLock::new(|| {
    let opts = Opts::new(
        format!("{METRICS_NAMESPACE}_resync_passes_total"),
        "Full DNS resync passes",
    );
    let counter = CounterVec::new(opts, &[]).unwrap();
    METRICS_REGISTRY
        .register(Box::new(counter.clone()))
        .unwrap();
    counter
});

/// Per-node scatter-gather calls by action and settled status
///
/// Labels:
/// - `action`: `sync`, `stats` or `info`
/// - `status`: `fulfilled` or `rejected`
pub static SCATTER_CALLS_TOTAL: LazyLock<CounterVec> = LazyLock::new(|| {
    let opts = Opts::new(
        format!("{METRICS_NAMESPACE}_scatter_calls_total"),
        "Per-node scatter-gather calls by action and settled status",
    );
    let counter = CounterVec::new(opts, &["action", "status"]).unwrap();
    METRICS_REGISTRY
        .register(Box::new(counter.clone()))
        .unwrap();
    counter
});

/// Record one DNS provider operation.
pub fn dns_record_op(direction: &str, outcome: &str) {
    DNS_RECORD_OPS_TOTAL
        .with_label_values(&[direction, outcome])
        .inc();
}

/// Record one full resync pass.
pub fn resync_pass() {
    RESYNC_PASSES_TOTAL.with_label_values::<&str>(&[]).inc();
}

/// Record one settled per-node agent call.
pub fn scatter_call(action: &str, status: &str) {
    SCATTER_CALLS_TOTAL
        .with_label_values(&[action, status])
        .inc();
}

/// Render the registry in Prometheus text exposition format.
#[must_use]
pub fn gather() -> String {
    let encoder = TextEncoder::new();
    let mut buffer = Vec::new();
    if encoder
        .encode(&METRICS_REGISTRY.gather(), &mut buffer)
        .is_err()
    {
        return String::new();
    }
    String::from_utf8(buffer).unwrap_or_default()
}

#[cfg(test)]
#[path = "metrics_tests.rs"]
mod metrics_tests;
