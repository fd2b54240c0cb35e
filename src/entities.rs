// Copyright (c) 2025 Erick Bourgeois, firestoned
// SPDX-License-Identifier: MIT

//! Entity types for the routeplane control plane.
//!
//! Three registries make up the logical state of the platform:
//!
//! - [`Route`] - a routable virtual host (vHost) traffic is accepted for
//! - [`Host`] - a backend target a route distributes traffic to
//! - [`Router`] - an edge node whose public IP is advertised via DNS
//!
//! All three are soft-deleted: removal stamps `deleted_at` and the record
//! stays in the store. Wire names follow the platform's JSON conventions
//! (`vHost`, `metricSession`, `deletedAt`, ...).
//!
//! # Example
//!
//! ```rust
//! use routeplane::entities::{Route, Strategy};
//!
//! let route = Route::new("app.example.com", Some("eu".to_string()));
//! assert_eq!(route.strategy, Strategy::Latency);
//! assert!(route.certs);
//! assert_eq!(route.metric_session.len(), 20); // 10 random bytes, hex
//! ```

use chrono::{DateTime, Utc};
use rand::RngExt;
use serde::{Deserialize, Serialize};

/// Load-balancing strategy for a route.
///
/// Stored as configuration for the traffic dispatcher; the control plane
/// never interprets it beyond persistence.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
pub enum Strategy {
    /// Pick a backend uniformly at random
    Random,
    /// Hash the client IP onto the backend ring
    #[serde(rename = "IPHash")]
    IpHash,
    /// Prefer the backend with the lowest observed latency
    #[default]
    Latency,
    /// Rotate through backends in order
    RoundRobin,
}

/// Deployment cohort of a backend host, e.g. for blue/green rollouts.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "UPPERCASE")]
pub enum HostGroup {
    #[default]
    Blue,
    Green,
}

/// Protocol used to reach a backend host.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum Protocol {
    #[default]
    Http,
    Https,
}

/// A routable virtual host.
///
/// The `v_host` is globally unique among non-deleted routes. The two session
/// tokens are generated once at creation and immutable afterwards; they
/// authenticate the metric and log streams of the data path.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Route {
    /// Opaque server-assigned identifier
    #[serde(default)]
    pub id: String,

    /// Virtual hostname (FQDN), lowercase, length >= 3
    #[serde(rename = "vHost")]
    pub v_host: String,

    /// Optional grouping tag, constrains which routers advertise this vHost
    #[serde(default)]
    pub zone: Option<String>,

    /// Load-balancing policy for the dispatcher
    #[serde(default)]
    pub strategy: Strategy,

    /// Whether certificates are provisioned for this vHost
    #[serde(default = "default_true")]
    pub certs: bool,

    /// Optional auth backend reference
    #[serde(default)]
    pub auth: Option<String>,

    /// Session token for the metric stream, immutable after creation
    #[serde(default)]
    pub metric_session: String,

    /// Session token for the log stream, immutable after creation
    #[serde(default)]
    pub log_session: String,

    /// Owning user, managed by the permission gate
    #[serde(default)]
    pub owner: Option<String>,

    #[serde(default)]
    pub created_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub updated_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub deleted_at: Option<DateTime<Utc>>,
}

impl Route {
    /// Build a new route with defaults and freshly generated session tokens.
    ///
    /// The vHost is normalized to lowercase; length validation happens in
    /// the registry so the error can carry the offending field.
    #[must_use]
    pub fn new(v_host: &str, zone: Option<String>) -> Self {
        Self {
            id: String::new(),
            v_host: v_host.trim().to_lowercase(),
            zone,
            strategy: Strategy::default(),
            certs: true,
            auth: None,
            metric_session: generate_session(),
            log_session: generate_session(),
            owner: None,
            created_at: None,
            updated_at: None,
            deleted_at: None,
        }
    }
}

/// A backend target in a route's load-balancing pool.
///
/// `(route, hostname, port)` is unique among non-deleted hosts. Hosts carry
/// no DNS state; `weight` and `vnodes` feed the dispatcher's hash ring.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Host {
    /// Opaque server-assigned identifier
    #[serde(default)]
    pub id: String,

    /// Owning route id, immutable
    pub route: String,

    /// Backend hostname or address
    pub hostname: String,

    /// Backend port
    pub port: u16,

    /// Relative share of traffic
    #[serde(default = "default_weight")]
    pub weight: u32,

    /// Number of hash-ring replicas attributable to this host
    #[serde(default = "default_vnodes")]
    pub vnodes: u32,

    /// Deployment cohort
    #[serde(default)]
    pub group: HostGroup,

    /// Protocol used to reach the backend
    #[serde(default)]
    pub protocol: Protocol,

    /// Cluster tag
    #[serde(default = "default_cluster")]
    pub cluster: String,

    #[serde(default)]
    pub created_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub updated_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub deleted_at: Option<DateTime<Utc>>,
}

impl Host {
    /// Build a new host for a route with pool defaults.
    #[must_use]
    pub fn new(route: &str, hostname: &str, port: u16) -> Self {
        Self {
            id: String::new(),
            route: route.to_string(),
            hostname: hostname.to_string(),
            port,
            weight: default_weight(),
            vnodes: default_vnodes(),
            group: HostGroup::default(),
            protocol: Protocol::default(),
            cluster: default_cluster(),
            created_at: None,
            updated_at: None,
            deleted_at: None,
        }
    }
}

/// An edge node advertising public IPs for active vHosts via DNS.
///
/// Only enabled routers participate in DNS reconciliation; a disabled
/// router keeps its registry record but is excluded from record fan-out.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Router {
    /// Opaque server-assigned identifier
    #[serde(default)]
    pub id: String,

    /// Identifier of the edge process/instance
    pub node: String,

    /// Zone this router serves
    pub zone: String,

    /// Ordering hint for the dispatcher, lower is preferred
    #[serde(default = "default_priority")]
    pub priority: u32,

    /// Public IPv4 address advertised in A-records
    pub ipv4: String,

    /// Optional public IPv6 address
    #[serde(default)]
    pub ipv6: Option<String>,

    /// Whether this router participates in DNS
    #[serde(default = "default_true")]
    pub enabled: bool,

    #[serde(default)]
    pub created_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub updated_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub deleted_at: Option<DateTime<Utc>>,
}

impl Router {
    /// Build a new enabled router with default priority.
    #[must_use]
    pub fn new(node: &str, zone: &str, ipv4: &str) -> Self {
        Self {
            id: String::new(),
            node: node.to_string(),
            zone: zone.to_string(),
            priority: default_priority(),
            ipv4: ipv4.to_string(),
            ipv6: None,
            enabled: true,
            created_at: None,
            updated_at: None,
            deleted_at: None,
        }
    }
}

/// Generate an opaque session token: 10 random bytes, hex-encoded.
#[must_use]
pub fn generate_session() -> String {
    let mut bytes = [0u8; 10];
    rand::rng().fill(&mut bytes[..]);
    bytes.iter().map(|b| format!("{b:02x}")).collect()
}

fn default_true() -> bool {
    true
}

fn default_weight() -> u32 {
    200
}

fn default_vnodes() -> u32 {
    50
}

fn default_cluster() -> String {
    "default".to_string()
}

fn default_priority() -> u32 {
    5
}

#[cfg(test)]
#[path = "entities_tests.rs"]
mod entities_tests;
