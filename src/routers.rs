// Copyright (c) 2025 Erick Bourgeois, firestoned
// SPDX-License-Identifier: MIT

//! Router registry: edge nodes advertised via DNS.
//!
//! Create and remove publish `routers.created` / `routers.removed` events
//! that drive the DNS fan-out. The `enabled` toggle goes through the plain
//! update path with no event hook; `routes.sync` re-drives DNS from the
//! full desired state and picks the change up there.

use crate::entities::Router;
use crate::errors::RegistryError;
use crate::events::{DomainEvent, EventBus};
use crate::store::EntityStore;
use std::sync::Arc;
use tracing::info;

/// Parameters for creating a router.
#[derive(Debug, Clone, Default)]
pub struct CreateRouter {
    pub node: String,
    pub zone: String,
    pub ipv4: String,
    pub ipv6: Option<String>,
    pub priority: Option<u32>,
    pub enabled: Option<bool>,
}

/// Mutable router fields; `Some` sets, `None` leaves unchanged.
#[derive(Debug, Clone, Default)]
pub struct UpdateRouter {
    pub zone: Option<String>,
    pub priority: Option<u32>,
    pub ipv4: Option<String>,
    pub ipv6: Option<Option<String>>,
    pub enabled: Option<bool>,
}

/// Registry of edge router nodes.
pub struct RouterRegistry {
    store: Arc<dyn EntityStore<Router>>,
    events: Arc<EventBus>,
}

impl RouterRegistry {
    #[must_use]
    pub fn new(store: Arc<dyn EntityStore<Router>>, events: Arc<EventBus>) -> Self {
        Self { store, events }
    }

    /// Create a router and publish [`DomainEvent::RouterCreated`].
    ///
    /// When the router is created enabled, the event handler adds an
    /// A-record for every active vHost before this returns.
    ///
    /// # Errors
    ///
    /// [`RegistryError::Validation`] when `node`, `zone` or `ipv4` is empty.
    pub async fn create(&self, params: CreateRouter) -> Result<Router, RegistryError> {
        for (field, value) in [
            ("node", &params.node),
            ("zone", &params.zone),
            ("ipv4", &params.ipv4),
        ] {
            if value.is_empty() {
                return Err(RegistryError::required(field));
            }
        }

        let mut router = Router::new(&params.node, &params.zone, &params.ipv4);
        router.ipv6 = params.ipv6;
        if let Some(priority) = params.priority {
            router.priority = priority;
        }
        if let Some(enabled) = params.enabled {
            router.enabled = enabled;
        }

        let router = self.store.insert(router).await?;
        info!(
            router = %router.id,
            node = %router.node,
            ipv4 = %router.ipv4,
            enabled = router.enabled,
            "router created"
        );
        self.events
            .publish(&DomainEvent::RouterCreated(router.clone()))
            .await;
        Ok(router)
    }

    /// Update mutable router fields.
    ///
    /// An `enabled` flip is not event-wired: the record set is healed on
    /// the next `routes.sync` resync pass instead, so the toggle is logged
    /// for the operator.
    ///
    /// # Errors
    ///
    /// [`RegistryError::NotFound`] when the router does not exist or is
    /// deleted.
    pub async fn update(&self, id: &str, changes: UpdateRouter) -> Result<Router, RegistryError> {
        let mut router = self.get(id).await?.ok_or_else(|| RegistryError::NotFound {
            kind: "router".to_string(),
            id: id.to_string(),
        })?;
        if let Some(zone) = changes.zone {
            router.zone = zone;
        }
        if let Some(priority) = changes.priority {
            router.priority = priority;
        }
        if let Some(ipv4) = changes.ipv4 {
            router.ipv4 = ipv4;
        }
        if let Some(ipv6) = changes.ipv6 {
            router.ipv6 = ipv6;
        }
        if let Some(enabled) = changes.enabled {
            if enabled != router.enabled {
                info!(
                    router = %router.id,
                    node = %router.node,
                    enabled,
                    "router enabled flag toggled; DNS records heal on next routes.sync"
                );
            }
            router.enabled = enabled;
        }
        self.store.update(router).await
    }

    /// Soft-delete a router and publish [`DomainEvent::RouterRemoved`].
    ///
    /// When the router was enabled, the event handler removes its A-record
    /// for every active vHost before this returns.
    ///
    /// # Errors
    ///
    /// [`RegistryError::NotFound`] when the router does not exist or is
    /// already deleted.
    pub async fn remove(&self, id: &str) -> Result<Router, RegistryError> {
        let router = self
            .store
            .remove(id)
            .await
            .map_err(|_| RegistryError::NotFound {
                kind: "router".to_string(),
                id: id.to_string(),
            })?;
        info!(router = %router.id, node = %router.node, "router removed");
        self.events
            .publish(&DomainEvent::RouterRemoved(router.clone()))
            .await;
        Ok(router)
    }

    /// Fetch a live router by id.
    pub async fn get(&self, id: &str) -> Result<Option<Router>, RegistryError> {
        self.store.get(id).await
    }

    /// Live routers, optionally filtered by zone.
    pub async fn find(&self, zone: Option<&str>) -> Result<Vec<Router>, RegistryError> {
        let routers = self.store.list().await?;
        Ok(match zone {
            Some(zone) => routers.into_iter().filter(|r| r.zone == zone).collect(),
            None => routers,
        })
    }

    /// Count live routers, optionally filtered by zone.
    pub async fn count(&self, zone: Option<&str>) -> Result<usize, RegistryError> {
        Ok(self.find(zone).await?.len())
    }

    /// Live routers participating in DNS, the reconciler's enumeration for
    /// route lifecycle events.
    pub async fn enabled_routers(&self) -> Result<Vec<Router>, RegistryError> {
        Ok(self
            .store
            .list()
            .await?
            .into_iter()
            .filter(|r| r.enabled)
            .collect())
    }
}

#[cfg(test)]
#[path = "routers_tests.rs"]
mod routers_tests;
