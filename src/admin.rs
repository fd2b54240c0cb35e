// Copyright (c) 2025 Erick Bourgeois, firestoned
// SPDX-License-Identifier: MIT

//! Administrative query surface: `routes.sync`, `routes.stats`,
//! `routes.info`.
//!
//! Thin callers of the scatter-gather coordinator. Each scatters one agent
//! action across the cluster and exposes only the fulfilled entries;
//! rejected entries stay visible in logs and metrics but never fail the
//! query. `sync` additionally drives a full DNS resync pass first, which is
//! the operator's lever to re-drive reconciliation after partial failures.

use crate::errors::ClusterError;
use crate::providers::AgentAction;
use crate::reconciler::DnsReconciler;
use crate::scatter::{fulfilled, NodeOutcome, ScatterGather};
use serde_json::Value;
use std::sync::Arc;
use tracing::{error, warn};

/// Read-only administrative operations over the proxy agents.
pub struct AdminQuery {
    scatter: ScatterGather,
    reconciler: Arc<DnsReconciler>,
}

impl AdminQuery {
    #[must_use]
    pub fn new(scatter: ScatterGather, reconciler: Arc<DnsReconciler>) -> Self {
        Self {
            scatter,
            reconciler,
        }
    }

    /// Re-drive DNS reconciliation, then ask every agent to sync its local
    /// state. Returns the fulfilled per-node reports.
    ///
    /// # Errors
    ///
    /// [`ClusterError::DirectoryUnavailable`] when the node snapshot cannot
    /// be obtained; a failing resync is logged and does not fail the query.
    pub async fn sync(&self) -> Result<Vec<NodeOutcome>, ClusterError> {
        if let Err(err) = self.reconciler.resync().await {
            error!(error = %err, "resync pass failed before agent sync");
        }
        self.call(AgentAction::Sync).await
    }

    /// Traffic statistics from every reachable agent.
    ///
    /// # Errors
    ///
    /// [`ClusterError::DirectoryUnavailable`] when the node snapshot cannot
    /// be obtained.
    pub async fn stats(&self) -> Result<Vec<NodeOutcome>, ClusterError> {
        self.call(AgentAction::Stats).await
    }

    /// Process information from every reachable agent.
    ///
    /// # Errors
    ///
    /// [`ClusterError::DirectoryUnavailable`] when the node snapshot cannot
    /// be obtained.
    pub async fn info(&self) -> Result<Vec<NodeOutcome>, ClusterError> {
        self.call(AgentAction::Info).await
    }

    async fn call(&self, action: AgentAction) -> Result<Vec<NodeOutcome>, ClusterError> {
        let outcomes = self.scatter.scatter(action, &Value::Null).await?;
        let total = outcomes.len();
        let ok = fulfilled(outcomes);
        if ok.len() < total {
            warn!(
                action = action.as_str(),
                fulfilled = ok.len(),
                total,
                "some nodes did not answer"
            );
        }
        Ok(ok)
    }
}

#[cfg(test)]
#[path = "admin_tests.rs"]
mod admin_tests;
