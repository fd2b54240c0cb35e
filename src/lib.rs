// Copyright (c) 2025 Erick Bourgeois, firestoned
// SPDX-License-Identifier: MIT

//! # Routeplane - Reverse-Proxy Control Plane
//!
//! Routeplane is the control plane of a multi-tenant reverse-proxy platform.
//! It tracks routable virtual hosts (routes), the backend pool each route
//! balances across (hosts), and the edge nodes whose public IPs are
//! advertised via DNS (routers).
//!
//! ## Overview
//!
//! Two cores sit at the center of this crate:
//!
//! - The **DNS reconciler**: registry mutations emit domain events; each
//!   event triggers a single forward pass translating the mutation into a
//!   set of idempotent DNS provider calls, with per-record failure
//!   isolation. An on-demand full resync heals anything the event path
//!   missed.
//! - The **scatter-gather coordinator**: one targeted call per cluster node,
//!   issued concurrently and joined unconditionally, each outcome settled as
//!   fulfilled or rejected so no single node can fail a cluster query.
//!
//! ## Modules
//!
//! - [`entities`] - Route/Host/Router data model
//! - [`store`] - entity store contract and in-memory implementation
//! - [`events`] - domain events and the synchronous event bus
//! - [`routes`], [`hosts`], [`routers`] - the three registries
//! - [`guard`] - route scoping guard for host queries
//! - [`reconciler`] - event-driven DNS reconciliation and resync
//! - [`scatter`] - cluster scatter-gather coordinator
//! - [`admin`] - the `sync`/`stats`/`info` administrative queries
//! - [`providers`] - collaborator contracts (DNS, permissions, nodes, agents)
//! - [`domains`], [`agents`] - HTTP implementations of those contracts
//! - [`api`] - axum surface for the administrative queries
//!
//! ## Example
//!
//! ```rust,no_run
//! use routeplane::entities::Strategy;
//! use routeplane::routes::CreateRoute;
//!
//! let params = CreateRoute {
//!     v_host: "app.example.com".to_string(),
//!     zone: Some("eu".to_string()),
//!     strategy: Some(Strategy::RoundRobin),
//!     ..CreateRoute::default()
//! };
//! ```

pub mod admin;
pub mod agents;
pub mod api;
pub mod domains;
pub mod entities;
pub mod errors;
pub mod events;
pub mod guard;
pub mod hosts;
pub mod metrics;
pub mod providers;
pub mod reconciler;
pub mod routers;
pub mod routes;
pub mod scatter;
pub mod store;

#[cfg(test)]
pub(crate) mod testutil;
