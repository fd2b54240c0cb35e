// Copyright (c) 2025 Erick Bourgeois, firestoned
// SPDX-License-Identifier: MIT

//! Host registry: backend pools of the routes.
//!
//! Hosts are backend-selection data for the traffic dispatcher and carry no
//! DNS side effects. Every query runs through the route scope guard before
//! touching storage, and a `routes.removed` event cascades into removal of
//! every host bound to that route.

use crate::entities::{Host, HostGroup, Protocol};
use crate::errors::RegistryError;
use crate::events::{DomainEvent, EventHandler};
use crate::guard::route_scope;
use crate::providers::{CallContext, PermissionGate};
use crate::store::EntityStore;
use async_trait::async_trait;
use std::sync::Arc;
use tracing::{error, info};

/// Parameters for creating a host.
#[derive(Debug, Clone, Default)]
pub struct CreateHost {
    pub route: Option<String>,
    pub hostname: String,
    pub port: u16,
    pub weight: Option<u32>,
    pub vnodes: Option<u32>,
    pub group: Option<HostGroup>,
    pub protocol: Option<Protocol>,
    pub cluster: Option<String>,
}

/// Filter for host queries. The `route` field is what the scope guard
/// injects; the rest narrow the result further.
#[derive(Debug, Clone, Default)]
pub struct HostQuery {
    pub route: Option<String>,
    pub hostname: Option<String>,
    pub port: Option<u16>,
    pub cluster: Option<String>,
    pub group: Option<HostGroup>,
}

impl HostQuery {
    fn matches(&self, host: &Host) -> bool {
        self.route.as_deref().is_none_or(|r| host.route == r)
            && self.hostname.as_deref().is_none_or(|h| host.hostname == h)
            && self.port.is_none_or(|p| host.port == p)
            && self.cluster.as_deref().is_none_or(|c| host.cluster == c)
            && self.group.is_none_or(|g| host.group == g)
    }
}

/// Registry of backend hosts, always scoped to an authorized route.
pub struct HostRegistry {
    store: Arc<dyn EntityStore<Host>>,
    gate: Arc<dyn PermissionGate>,
}

impl HostRegistry {
    #[must_use]
    pub fn new(store: Arc<dyn EntityStore<Host>>, gate: Arc<dyn PermissionGate>) -> Self {
        Self { store, gate }
    }

    /// Create a host in a route's pool.
    ///
    /// The route reference is mandatory and resolved through the permission
    /// gate; `(route, hostname, port)` must be unique among non-deleted
    /// hosts.
    ///
    /// # Errors
    ///
    /// [`RegistryError::Validation`] for a missing route or hostname,
    /// [`RegistryError::Forbidden`] for an unresolvable route,
    /// [`RegistryError::Conflict`] for a duplicate (route, hostname, port).
    pub async fn create(
        &self,
        ctx: &CallContext,
        params: CreateHost,
    ) -> Result<Host, RegistryError> {
        let route = route_scope(self.gate.as_ref(), ctx, params.route.as_deref(), true)
            .await?
            .ok_or_else(|| RegistryError::required("route"))?;
        if params.hostname.is_empty() {
            return Err(RegistryError::required("hostname"));
        }

        if self
            .resolve_host(ctx, &route, &params.hostname, params.port)
            .await?
            .is_some()
        {
            return Err(RegistryError::Conflict {
                field: "(route, hostname, port)".to_string(),
                message: format!(
                    "'{}:{}' is already attached to route '{route}'",
                    params.hostname, params.port
                ),
            });
        }

        let mut host = Host::new(&route, &params.hostname, params.port);
        if let Some(weight) = params.weight {
            host.weight = weight;
        }
        if let Some(vnodes) = params.vnodes {
            host.vnodes = vnodes;
        }
        if let Some(group) = params.group {
            host.group = group;
        }
        if let Some(protocol) = params.protocol {
            host.protocol = protocol;
        }
        if let Some(cluster) = params.cluster {
            host.cluster = cluster;
        }

        let host = self.store.insert(host).await?;
        info!(
            host = %host.id,
            route = %host.route,
            backend = format!("{}:{}", host.hostname, host.port),
            "host created"
        );
        Ok(host)
    }

    /// List hosts; the route parameter is required.
    pub async fn list(
        &self,
        ctx: &CallContext,
        mut query: HostQuery,
    ) -> Result<Vec<Host>, RegistryError> {
        query.route = route_scope(self.gate.as_ref(), ctx, query.route.as_deref(), true).await?;
        self.filtered(&query).await
    }

    /// Find hosts; unlike `list` the route parameter is optional here, but
    /// when present it is still resolved through the gate.
    pub async fn find(
        &self,
        ctx: &CallContext,
        mut query: HostQuery,
    ) -> Result<Vec<Host>, RegistryError> {
        query.route = route_scope(self.gate.as_ref(), ctx, query.route.as_deref(), false).await?;
        self.filtered(&query).await
    }

    /// Count hosts; the route parameter is required.
    pub async fn count(&self, ctx: &CallContext, query: HostQuery) -> Result<usize, RegistryError> {
        Ok(self.list(ctx, query).await?.len())
    }

    /// Fetch a live host by id.
    pub async fn get(&self, id: &str) -> Result<Option<Host>, RegistryError> {
        self.store.get(id).await
    }

    /// Soft-delete a host. No DNS side effects.
    ///
    /// # Errors
    ///
    /// [`RegistryError::NotFound`] when the host does not exist or is
    /// already deleted.
    pub async fn remove(&self, id: &str) -> Result<Host, RegistryError> {
        let host = self
            .store
            .remove(id)
            .await
            .map_err(|_| RegistryError::NotFound {
                kind: "host".to_string(),
                id: id.to_string(),
            })?;
        info!(host = %host.id, route = %host.route, "host removed");
        Ok(host)
    }

    /// Resolve the unique live host for `(route, hostname, port)`.
    pub async fn resolve_host(
        &self,
        ctx: &CallContext,
        route: &str,
        hostname: &str,
        port: u16,
    ) -> Result<Option<Host>, RegistryError> {
        let hosts = self
            .find(
                ctx,
                HostQuery {
                    route: Some(route.to_string()),
                    hostname: Some(hostname.to_string()),
                    port: Some(port),
                    ..HostQuery::default()
                },
            )
            .await?;
        Ok(hosts.into_iter().next())
    }

    /// Find the first host matching the query and remove it, if any.
    pub async fn find_and_remove(
        &self,
        ctx: &CallContext,
        query: HostQuery,
    ) -> Result<Option<Host>, RegistryError> {
        match self.find(ctx, query).await?.into_iter().next() {
            Some(host) => Ok(Some(self.remove(&host.id).await?)),
            None => Ok(None),
        }
    }

    async fn filtered(&self, query: &HostQuery) -> Result<Vec<Host>, RegistryError> {
        Ok(self
            .store
            .list()
            .await?
            .into_iter()
            .filter(|h| query.matches(h))
            .collect())
    }
}

/// Removes every host of a route when the route is removed.
///
/// Delegated straight to the store: the cascade must run even when the
/// caller's context cannot resolve the (already removed) route through the
/// gate. Failures are logged per host and never fail the route removal.
pub struct HostCascade {
    store: Arc<dyn EntityStore<Host>>,
}

impl HostCascade {
    #[must_use]
    pub fn new(store: Arc<dyn EntityStore<Host>>) -> Self {
        Self { store }
    }
}

#[async_trait]
impl EventHandler for HostCascade {
    fn name(&self) -> &'static str {
        "hosts.cascade"
    }

    async fn handle(&self, event: &DomainEvent) -> anyhow::Result<()> {
        let DomainEvent::RouteRemoved(route) = event else {
            return Ok(());
        };
        let bound: Vec<Host> = self
            .store
            .list()
            .await?
            .into_iter()
            .filter(|h| h.route == route.id)
            .collect();
        for host in bound {
            if let Err(err) = self.store.remove(&host.id).await {
                error!(
                    host = %host.id,
                    route = %route.id,
                    error = %err,
                    "unable to delete host of removed route"
                );
            }
        }
        Ok(())
    }
}

#[cfg(test)]
#[path = "hosts_tests.rs"]
mod hosts_tests;
