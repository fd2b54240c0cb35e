// Copyright (c) 2025 Erick Bourgeois, firestoned
// SPDX-License-Identifier: MIT

//! Event-driven DNS reconciliation.
//!
//! Maintains the invariant: for every non-deleted route with vHost `V` and
//! every enabled router `R`, an A-record `V -> R.ipv4` exists; when either
//! side is removed, the record is removed.
//!
//! The protocol is a single forward pass per mutation, not a periodic
//! sweep. Each pass enumerates the opposite registry and issues one
//! idempotent provider call per item. Items are independent failure
//! domains: a failed call is logged with full context and skipped, the
//! rest of the pass continues, and the triggering mutation still succeeds.
//! There is no internal retry - at-least-once consistency comes from the
//! provider's idempotent add/remove semantics, and [`DnsReconciler::resync`]
//! heals anything a missed event or an `enabled` toggle left behind.

use crate::entities::{Route, Router};
use crate::errors::RegistryError;
use crate::events::{DomainEvent, EventHandler};
use crate::metrics;
use crate::providers::{CallContext, DnsProvider};
use crate::store::EntityStore;
use async_trait::async_trait;
use std::collections::HashSet;
use std::sync::Arc;
use tracing::{error, info};

/// Record type managed by the reconciler.
const RECORD_TYPE: &str = "A";

/// Outcome of a [`DnsReconciler::resync`] pass.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ResyncReport {
    /// Records added because a desired pair was missing
    pub added: usize,
    /// Managed records removed because their pair is no longer desired
    pub removed: usize,
    /// Provider calls that failed and were skipped
    pub failed: usize,
}

/// Stateless DNS reconciler, subscribed to route and router lifecycle
/// events.
///
/// Reads registry state through the injected stores and writes only to the
/// DNS provider, never back into its own registries.
pub struct DnsReconciler {
    routes: Arc<dyn EntityStore<Route>>,
    routers: Arc<dyn EntityStore<Router>>,
    dns: Arc<dyn DnsProvider>,
}

impl DnsReconciler {
    #[must_use]
    pub fn new(
        routes: Arc<dyn EntityStore<Route>>,
        routers: Arc<dyn EntityStore<Router>>,
        dns: Arc<dyn DnsProvider>,
    ) -> Self {
        Self {
            routes,
            routers,
            dns,
        }
    }

    /// Add an A-record for `v_host` on every enabled router.
    ///
    /// Failures are per-router: each is logged and counted, the remaining
    /// routers still get their record.
    pub async fn add_vhost(&self, v_host: &str, owner: Option<&str>) -> Result<(), RegistryError> {
        let ctx = CallContext::for_owner(owner);
        for router in self.enabled_routers().await? {
            match self
                .dns
                .add_record(&ctx, v_host, RECORD_TYPE, &router.ipv4)
                .await
            {
                Ok(record) => {
                    metrics::dns_record_op("add", "ok");
                    info!(
                        record = %record.id,
                        ip = %router.ipv4,
                        v_host,
                        "added record for vHost"
                    );
                }
                Err(err) => {
                    metrics::dns_record_op("add", "error");
                    error!(
                        ip = %router.ipv4,
                        v_host,
                        error = %err,
                        "failed to add record for vHost"
                    );
                }
            }
        }
        Ok(())
    }

    /// Remove the A-record for `v_host` from every enabled router.
    pub async fn remove_vhost(
        &self,
        v_host: &str,
        owner: Option<&str>,
    ) -> Result<(), RegistryError> {
        let ctx = CallContext::for_owner(owner);
        for router in self.enabled_routers().await? {
            match self
                .dns
                .remove_record(&ctx, v_host, RECORD_TYPE, &router.ipv4)
                .await
            {
                Ok(record) => {
                    metrics::dns_record_op("remove", "ok");
                    info!(
                        record = %record.map(|r| r.id).unwrap_or_default(),
                        ip = %router.ipv4,
                        v_host,
                        "removed record for vHost"
                    );
                }
                Err(err) => {
                    metrics::dns_record_op("remove", "error");
                    error!(
                        ip = %router.ipv4,
                        v_host,
                        error = %err,
                        "failed to remove record for vHost"
                    );
                }
            }
        }
        Ok(())
    }

    /// Fan a newly created enabled router out to every active vHost.
    async fn router_created(&self, router: &Router) -> Result<(), RegistryError> {
        for route in self.active_routes().await? {
            let ctx = CallContext::for_owner(route.owner.as_deref());
            match self
                .dns
                .add_record(&ctx, &route.v_host, RECORD_TYPE, &router.ipv4)
                .await
            {
                Ok(record) => {
                    metrics::dns_record_op("add", "ok");
                    info!(
                        record = %record.id,
                        ip = %router.ipv4,
                        v_host = %route.v_host,
                        "added record for vHost"
                    );
                }
                Err(err) => {
                    metrics::dns_record_op("add", "error");
                    error!(
                        ip = %router.ipv4,
                        v_host = %route.v_host,
                        error = %err,
                        "failed to add record for vHost"
                    );
                }
            }
        }
        Ok(())
    }

    /// Withdraw a removed enabled router from every active vHost.
    async fn router_removed(&self, router: &Router) -> Result<(), RegistryError> {
        for route in self.active_routes().await? {
            let ctx = CallContext::for_owner(route.owner.as_deref());
            match self
                .dns
                .remove_record(&ctx, &route.v_host, RECORD_TYPE, &router.ipv4)
                .await
            {
                Ok(record) => {
                    metrics::dns_record_op("remove", "ok");
                    info!(
                        record = %record.map(|r| r.id).unwrap_or_default(),
                        ip = %router.ipv4,
                        v_host = %route.v_host,
                        "removed record for vHost"
                    );
                }
                Err(err) => {
                    metrics::dns_record_op("remove", "error");
                    error!(
                        ip = %router.ipv4,
                        v_host = %route.v_host,
                        error = %err,
                        "failed to remove record for vHost"
                    );
                }
            }
        }
        Ok(())
    }

    /// Full desired-vs-actual reconciliation pass.
    ///
    /// Computes the complete desired mapping (active vHosts x enabled router
    /// IPv4s), lists the provider's current A-records, adds every missing
    /// pair and removes managed pairs that are no longer desired. Records
    /// whose FQDN is not an active vHost are not ours and stay untouched.
    ///
    /// Hooked to the administrative `routes.sync` action; heals missed
    /// events and `enabled` toggles that bypass the event path.
    ///
    /// # Errors
    ///
    /// Only a failing registry read aborts the pass; provider failures are
    /// counted in the report like in the event-driven passes. A failing
    /// record listing yields an empty actual set, so the pass degrades to
    /// add-only.
    pub async fn resync(&self) -> Result<ResyncReport, RegistryError> {
        let routes = self.active_routes().await?;
        let routers = self.enabled_routers().await?;
        metrics::resync_pass();

        let mut desired: HashSet<(String, String)> = HashSet::new();
        for route in &routes {
            for router in &routers {
                desired.insert((route.v_host.clone(), router.ipv4.clone()));
            }
        }

        let actual = match self.dns.list_records(RECORD_TYPE).await {
            Ok(records) => records,
            Err(err) => {
                error!(error = %err, "resync could not list records, add-only pass");
                Vec::new()
            }
        };
        let managed: HashSet<&str> = routes.iter().map(|r| r.v_host.as_str()).collect();
        let present: HashSet<(String, String)> = actual
            .iter()
            .filter(|r| r.record_type == RECORD_TYPE)
            .map(|r| (r.fqdn.clone(), r.data.clone()))
            .collect();

        let mut report = ResyncReport::default();
        for (v_host, ip) in &desired {
            if present.contains(&(v_host.clone(), ip.clone())) {
                continue;
            }
            let owner = routes
                .iter()
                .find(|r| r.v_host == *v_host)
                .and_then(|r| r.owner.clone());
            let ctx = CallContext::for_owner(owner.as_deref());
            match self.dns.add_record(&ctx, v_host, RECORD_TYPE, ip).await {
                Ok(_) => {
                    metrics::dns_record_op("add", "ok");
                    report.added += 1;
                }
                Err(err) => {
                    metrics::dns_record_op("add", "error");
                    error!(%ip, %v_host, error = %err, "resync failed to add record");
                    report.failed += 1;
                }
            }
        }
        for (v_host, ip) in &present {
            if desired.contains(&(v_host.clone(), ip.clone())) || !managed.contains(v_host.as_str())
            {
                continue;
            }
            let ctx = CallContext::default();
            match self.dns.remove_record(&ctx, v_host, RECORD_TYPE, ip).await {
                Ok(_) => {
                    metrics::dns_record_op("remove", "ok");
                    report.removed += 1;
                }
                Err(err) => {
                    metrics::dns_record_op("remove", "error");
                    error!(%ip, %v_host, error = %err, "resync failed to remove record");
                    report.failed += 1;
                }
            }
        }

        info!(
            added = report.added,
            removed = report.removed,
            failed = report.failed,
            "resync pass complete"
        );
        Ok(report)
    }

    async fn enabled_routers(&self) -> Result<Vec<Router>, RegistryError> {
        Ok(self
            .routers
            .list()
            .await?
            .into_iter()
            .filter(|r| r.enabled)
            .collect())
    }

    async fn active_routes(&self) -> Result<Vec<Route>, RegistryError> {
        self.routes.list().await
    }
}

#[async_trait]
impl EventHandler for DnsReconciler {
    fn name(&self) -> &'static str {
        "dns.reconciler"
    }

    async fn handle(&self, event: &DomainEvent) -> anyhow::Result<()> {
        match event {
            DomainEvent::RouteCreated(route) => {
                self.add_vhost(&route.v_host, route.owner.as_deref())
                    .await?;
            }
            DomainEvent::RouteRemoved(route) => {
                self.remove_vhost(&route.v_host, route.owner.as_deref())
                    .await?;
            }
            DomainEvent::RouterCreated(router) if router.enabled => {
                self.router_created(router).await?;
            }
            DomainEvent::RouterRemoved(router) if router.enabled => {
                self.router_removed(router).await?;
            }
            DomainEvent::RouterCreated(_) | DomainEvent::RouterRemoved(_) => {}
        }
        Ok(())
    }
}

#[cfg(test)]
#[path = "reconciler_tests.rs"]
mod reconciler_tests;
