// Copyright (c) 2025 Erick Bourgeois, firestoned
// SPDX-License-Identifier: MIT

//! Route scoping guard for host queries.
//!
//! Every host read/write path (list, count, find, create) is pre-scoped to
//! a route the caller may act on. Uniform scoping is a security invariant,
//! not a per-operation opt-in: the host registry runs this guard before any
//! storage access.

use crate::entities::Route;
use crate::errors::RegistryError;
use crate::providers::{CallContext, PermissionGate, ResolvedRoute};
use crate::store::EntityStore;
use async_trait::async_trait;
use std::sync::Arc;

/// Resolve the route scope for a host query.
///
/// Returns the resolved route id to inject into the query filter, or
/// `None` when the operation declares its route parameter optional and the
/// caller gave none.
///
/// # Errors
///
/// - [`RegistryError::Validation`] when the route is absent but required
///   (the query never reaches storage)
/// - [`RegistryError::Forbidden`] when the supplied route does not resolve
///   for this caller - deliberately the same answer for "no such route" and
///   "not yours", so existence is not leaked
pub async fn route_scope(
    gate: &dyn PermissionGate,
    ctx: &CallContext,
    route: Option<&str>,
    route_required: bool,
) -> Result<Option<String>, RegistryError> {
    if let Some(route) = route {
        return match gate.resolve_route(ctx, route).await? {
            Some(resolved) => Ok(Some(resolved.id)),
            None => Err(RegistryError::Forbidden {
                route: route.to_string(),
            }),
        };
    }
    if route_required {
        return Err(RegistryError::required("route"));
    }
    Ok(None)
}

/// Permission gate backed by the route store.
///
/// A route resolves when it exists, is not deleted, and is either unowned
/// or owned by the caller. System calls (no user in the context) resolve
/// any live route.
pub struct StoreGate {
    routes: Arc<dyn EntityStore<Route>>,
}

impl StoreGate {
    #[must_use]
    pub fn new(routes: Arc<dyn EntityStore<Route>>) -> Self {
        Self { routes }
    }
}

#[async_trait]
impl PermissionGate for StoreGate {
    async fn resolve_route(
        &self,
        ctx: &CallContext,
        route: &str,
    ) -> Result<Option<ResolvedRoute>, RegistryError> {
        let Some(route) = self.routes.get(route).await? else {
            return Ok(None);
        };
        if let (Some(owner), Some(user)) = (&route.owner, &ctx.user_id) {
            if owner != user {
                return Ok(None);
            }
        }
        Ok(Some(ResolvedRoute {
            id: route.id,
            v_host: route.v_host,
            owner: route.owner,
        }))
    }
}

#[cfg(test)]
#[path = "guard_tests.rs"]
mod guard_tests;
