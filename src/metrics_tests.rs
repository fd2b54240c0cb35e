// Copyright (c) 2025 Erick Bourgeois, firestoned
// SPDX-License-Identifier: MIT

//! Unit tests for `metrics.rs`

use super::*;

#[test]
fn test_counters_show_up_in_exposition() {
    dns_record_op("add", "ok");
    dns_record_op("remove", "error");
    resync_pass();
    scatter_call("stats", "fulfilled");
    scatter_call("stats", "rejected");

    let exposition = gather();
    assert!(exposition.contains("routeplane_firestoned_io_dns_record_ops_total"));
    assert!(exposition.contains("routeplane_firestoned_io_resync_passes_total"));
    assert!(exposition.contains("routeplane_firestoned_io_scatter_calls_total"));
    assert!(exposition.contains("direction=\"add\""));
    assert!(exposition.contains("status=\"rejected\""));
}

#[test]
fn test_counters_are_monotonic() {
    // other tests drive the same counter concurrently, so lower-bound only
    let before = DNS_RECORD_OPS_TOTAL
        .with_label_values(&["add", "ok"])
        .get();
    dns_record_op("add", "ok");
    dns_record_op("add", "ok");
    let after = DNS_RECORD_OPS_TOTAL
        .with_label_values(&["add", "ok"])
        .get();
    assert!(after >= before + 2.0);
}
