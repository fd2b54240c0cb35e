// Copyright (c) 2025 Erick Bourgeois, firestoned
// SPDX-License-Identifier: MIT

//! Domain events and the in-process event bus.
//!
//! Registries publish a [`DomainEvent`] after each successful create/remove
//! mutation, carrying the full entity payload. The [`EventBus`] fans the
//! event out to every registered [`EventHandler`] and awaits them all before
//! the mutation returns, so a registry call is only "done" once its derived
//! effects (DNS fan-out, host cascade) have run.
//!
//! Handler failures are logged and swallowed: a failing DNS pass must never
//! fail the mutation that triggered it, and one handler must not starve
//! another.

use crate::entities::{Route, Router};
use async_trait::async_trait;
use std::sync::Arc;
use tracing::error;

/// Lifecycle event emitted by the registries.
///
/// Host mutations carry no events: hosts are backend-selection data with no
/// DNS footprint, and their cascade removal is itself driven by
/// [`DomainEvent::RouteRemoved`].
#[derive(Debug, Clone)]
pub enum DomainEvent {
    /// A route was created (`routes.created`)
    RouteCreated(Route),
    /// A route was soft-deleted (`routes.removed`)
    RouteRemoved(Route),
    /// A router was created (`routers.created`)
    RouterCreated(Router),
    /// A router was soft-deleted (`routers.removed`)
    RouterRemoved(Router),
}

impl DomainEvent {
    /// Dotted event name as exposed to external consumers.
    #[must_use]
    pub fn name(&self) -> &'static str {
        match self {
            Self::RouteCreated(_) => "routes.created",
            Self::RouteRemoved(_) => "routes.removed",
            Self::RouterCreated(_) => "routers.created",
            Self::RouterRemoved(_) => "routers.removed",
        }
    }
}

/// A subscriber to domain events.
#[async_trait]
pub trait EventHandler: Send + Sync {
    /// Handler name used in failure logs.
    fn name(&self) -> &'static str;

    /// React to one event. Errors are logged by the bus, never propagated.
    async fn handle(&self, event: &DomainEvent) -> anyhow::Result<()>;
}

/// Synchronous in-process event fan-out.
///
/// Handlers run sequentially in registration order; ordering between them
/// carries no semantic guarantee and none may assume another ran first.
#[derive(Default)]
pub struct EventBus {
    handlers: Vec<Arc<dyn EventHandler>>,
}

impl EventBus {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a handler. Registration happens once during wiring, before
    /// any mutation traffic.
    pub fn subscribe(&mut self, handler: Arc<dyn EventHandler>) {
        self.handlers.push(handler);
    }

    /// Publish an event to every handler, isolating failures per handler.
    pub async fn publish(&self, event: &DomainEvent) {
        for handler in &self.handlers {
            if let Err(err) = handler.handle(event).await {
                error!(
                    handler = handler.name(),
                    event = event.name(),
                    error = %err,
                    "event handler failed"
                );
            }
        }
    }
}

#[cfg(test)]
#[path = "events_tests.rs"]
mod events_tests;
