// Copyright (c) 2025 Erick Bourgeois, firestoned
// SPDX-License-Identifier: MIT

//! Collaborator contracts the control plane depends on.
//!
//! Everything the reconciler and coordinator touch outside their own
//! registries sits behind one of these traits, injected at construction:
//!
//! - [`DnsProvider`] - idempotent A-record add/remove (plus listing for the
//!   resync pass) on the platform's domains service
//! - [`PermissionGate`] - resolves whether a caller may act on a route
//! - [`NodeDirectory`] - snapshot of the live cluster node list
//! - [`ProxyAgent`] - remote `sync`/`stats`/`info` actions, one instance
//!   per node
//!
//! Tests substitute in-memory fakes; the daemon wires the HTTP
//! implementations from [`crate::domains`] and [`crate::agents`].

use crate::errors::{AgentError, ClusterError, DnsError, RegistryError};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Caller identity threaded through collaborator calls.
///
/// DNS records are owned by the user who owns the triggering route, so the
/// reconciler builds a context from `route.owner` for every provider call.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct CallContext {
    /// Acting user id, `None` for system-initiated calls
    pub user_id: Option<String>,
}

impl CallContext {
    /// Context acting on behalf of a record owner.
    #[must_use]
    pub fn for_owner(owner: Option<&str>) -> Self {
        Self {
            user_id: owner.map(ToString::to_string),
        }
    }
}

/// A DNS record as reported by the provider.
///
/// The id is used only for logging; the control plane keeps no DNS state of
/// its own.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DnsRecord {
    /// Provider-assigned record identifier
    pub id: String,
    /// Record FQDN (the vHost)
    pub fqdn: String,
    /// Record type, always "A" for reconciled records
    #[serde(rename = "type")]
    pub record_type: String,
    /// Record data (router IPv4)
    pub data: String,
}

/// Idempotent DNS record operations on the domains service.
///
/// Adding an existing record and removing a non-existent record are both
/// no-op successes; that idempotence is what gives the event-driven
/// reconciler at-least-once safety under races and redelivery.
#[async_trait]
pub trait DnsProvider: Send + Sync {
    /// Add a record, returning it (id included) for logging.
    async fn add_record(
        &self,
        ctx: &CallContext,
        fqdn: &str,
        record_type: &str,
        data: &str,
    ) -> Result<DnsRecord, DnsError>;

    /// Remove a record; returns the removed record when one existed.
    async fn remove_record(
        &self,
        ctx: &CallContext,
        fqdn: &str,
        record_type: &str,
        data: &str,
    ) -> Result<Option<DnsRecord>, DnsError>;

    /// List current records of one type, consumed by the resync pass.
    async fn list_records(&self, record_type: &str) -> Result<Vec<DnsRecord>, DnsError>;
}

/// A route reference as resolved by the permission gate.
#[derive(Debug, Clone, PartialEq)]
pub struct ResolvedRoute {
    pub id: String,
    pub v_host: String,
    pub owner: Option<String>,
}

/// Authorization seam for route-scoped access.
///
/// `Ok(None)` means "not resolvable for this caller" and covers both
/// non-existent and unauthorized routes; the guard maps it to a 403 either
/// way so existence never leaks.
#[async_trait]
pub trait PermissionGate: Send + Sync {
    async fn resolve_route(
        &self,
        ctx: &CallContext,
        route: &str,
    ) -> Result<Option<ResolvedRoute>, RegistryError>;
}

/// Snapshot source for the live cluster node list.
#[async_trait]
pub trait NodeDirectory: Send + Sync {
    /// Current node identifiers. Nodes joining or leaving after the
    /// snapshot are not retroactively included or excluded.
    async fn nodes(&self) -> Result<Vec<String>, ClusterError>;
}

/// Remote action exposed by every proxy agent.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AgentAction {
    /// Re-drive the agent's route/DNS state
    Sync,
    /// Traffic statistics
    Stats,
    /// Process/build information
    Info,
}

impl AgentAction {
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Sync => "sync",
            Self::Stats => "stats",
            Self::Info => "info",
        }
    }
}

/// Targeted call surface of the per-node proxy agents.
///
/// Calls are explicitly addressed to one node, never load-balanced: each
/// node reports its own local state.
#[async_trait]
pub trait ProxyAgent: Send + Sync {
    async fn call(
        &self,
        node: &str,
        action: AgentAction,
        params: &Value,
    ) -> Result<Value, AgentError>;
}
