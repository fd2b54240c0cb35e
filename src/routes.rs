// Copyright (c) 2025 Erick Bourgeois, firestoned
// SPDX-License-Identifier: MIT

//! Route registry: routable virtual hosts.
//!
//! Owns validation and the vHost uniqueness invariant, delegates persistence
//! to the entity store, and publishes `routes.created` / `routes.removed`
//! domain events that drive the DNS reconciler and the host cascade.

use crate::entities::{Route, Strategy};
use crate::errors::RegistryError;
use crate::events::{DomainEvent, EventBus};
use crate::providers::CallContext;
use crate::store::EntityStore;
use std::sync::Arc;
use tracing::info;

/// Minimum vHost length accepted by [`RouteRegistry::create`].
pub const MIN_VHOST_LEN: usize = 3;

/// Parameters for creating a route.
#[derive(Debug, Clone, Default)]
pub struct CreateRoute {
    pub v_host: String,
    pub zone: Option<String>,
    pub strategy: Option<Strategy>,
    pub certs: Option<bool>,
    pub auth: Option<String>,
}

/// Mutable route fields; `Some` sets, `None` leaves unchanged.
///
/// The vHost and both session tokens are immutable after creation.
#[derive(Debug, Clone, Default)]
pub struct UpdateRoute {
    pub zone: Option<Option<String>>,
    pub strategy: Option<Strategy>,
    pub certs: Option<bool>,
    pub auth: Option<Option<String>>,
}

/// Active vHost entry, the reconciler's enumeration unit for router events.
#[derive(Debug, Clone, PartialEq)]
pub struct VHostEntry {
    pub id: String,
    pub v_host: String,
    pub owner: Option<String>,
}

/// Registry of routable virtual hosts.
pub struct RouteRegistry {
    store: Arc<dyn EntityStore<Route>>,
    events: Arc<EventBus>,
}

impl RouteRegistry {
    #[must_use]
    pub fn new(store: Arc<dyn EntityStore<Route>>, events: Arc<EventBus>) -> Self {
        Self { store, events }
    }

    /// Create a route.
    ///
    /// The vHost is normalized to lowercase and must be at least
    /// [`MIN_VHOST_LEN`] characters and unique among non-deleted routes.
    /// Session tokens are generated here, once. Publishes
    /// [`DomainEvent::RouteCreated`] and awaits its handlers (the DNS
    /// fan-out) before returning.
    ///
    /// # Errors
    ///
    /// [`RegistryError::Validation`] for a short vHost,
    /// [`RegistryError::Conflict`] for a duplicate one.
    pub async fn create(
        &self,
        ctx: &CallContext,
        params: CreateRoute,
    ) -> Result<Route, RegistryError> {
        let v_host = params.v_host.trim().to_lowercase();
        if v_host.len() < MIN_VHOST_LEN {
            return Err(RegistryError::Validation {
                field: "vHost".to_string(),
                message: format!("vHost must be at least {MIN_VHOST_LEN} characters"),
            });
        }
        if self.resolve_route(&v_host).await?.is_some() {
            return Err(RegistryError::Conflict {
                field: "vHost".to_string(),
                message: format!("The vHost '{v_host}' is already in use"),
            });
        }

        let mut route = Route::new(&v_host, params.zone);
        if let Some(strategy) = params.strategy {
            route.strategy = strategy;
        }
        if let Some(certs) = params.certs {
            route.certs = certs;
        }
        route.auth = params.auth;
        route.owner = ctx.user_id.clone();

        let route = self.store.insert(route).await?;
        info!(route = %route.id, v_host = %route.v_host, "route created");
        self.events
            .publish(&DomainEvent::RouteCreated(route.clone()))
            .await;
        Ok(route)
    }

    /// Update mutable route fields.
    ///
    /// # Errors
    ///
    /// [`RegistryError::NotFound`] when the route does not exist or is
    /// deleted.
    pub async fn update(&self, id: &str, changes: UpdateRoute) -> Result<Route, RegistryError> {
        let mut route = self.get(id).await?.ok_or_else(|| RegistryError::NotFound {
            kind: "route".to_string(),
            id: id.to_string(),
        })?;
        if let Some(zone) = changes.zone {
            route.zone = zone;
        }
        if let Some(strategy) = changes.strategy {
            route.strategy = strategy;
        }
        if let Some(certs) = changes.certs {
            route.certs = certs;
        }
        if let Some(auth) = changes.auth {
            route.auth = auth;
        }
        self.store.update(route).await
    }

    /// Soft-delete a route and publish [`DomainEvent::RouteRemoved`].
    ///
    /// The event drives both the DNS record removal fan-out and the cascade
    /// that removes every host bound to this route; both are awaited before
    /// this returns, and neither can fail the removal itself.
    ///
    /// # Errors
    ///
    /// [`RegistryError::NotFound`] when the route does not exist or is
    /// already deleted.
    pub async fn remove(&self, id: &str) -> Result<Route, RegistryError> {
        let route = self.store.remove(id).await.map_err(|_| {
            RegistryError::NotFound {
                kind: "route".to_string(),
                id: id.to_string(),
            }
        })?;
        info!(route = %route.id, v_host = %route.v_host, "route removed");
        self.events
            .publish(&DomainEvent::RouteRemoved(route.clone()))
            .await;
        Ok(route)
    }

    /// Fetch a live route by id.
    pub async fn get(&self, id: &str) -> Result<Option<Route>, RegistryError> {
        self.store.get(id).await
    }

    /// Live routes, optionally filtered by zone.
    pub async fn find(&self, zone: Option<&str>) -> Result<Vec<Route>, RegistryError> {
        let routes = self.store.list().await?;
        Ok(match zone {
            Some(zone) => routes
                .into_iter()
                .filter(|r| r.zone.as_deref() == Some(zone))
                .collect(),
            None => routes,
        })
    }

    /// Count live routes, optionally filtered by zone.
    pub async fn count(&self, zone: Option<&str>) -> Result<usize, RegistryError> {
        Ok(self.find(zone).await?.len())
    }

    /// Resolve a live route by its vHost.
    pub async fn resolve_route(&self, v_host: &str) -> Result<Option<Route>, RegistryError> {
        Ok(self
            .store
            .list()
            .await?
            .into_iter()
            .find(|r| r.v_host == v_host))
    }

    /// Active vHost entries, optionally filtered by zone.
    ///
    /// This is the reconciler's enumeration for router lifecycle events:
    /// every entry needs an A-record against every enabled router.
    pub async fn vhosts(&self, zone: Option<&str>) -> Result<Vec<VHostEntry>, RegistryError> {
        Ok(self
            .find(zone)
            .await?
            .into_iter()
            .map(|r| VHostEntry {
                id: r.id,
                v_host: r.v_host,
                owner: r.owner,
            })
            .collect())
    }
}

#[cfg(test)]
#[path = "routes_tests.rs"]
mod routes_tests;
