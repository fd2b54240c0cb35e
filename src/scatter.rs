// Copyright (c) 2025 Erick Bourgeois, firestoned
// SPDX-License-Identifier: MIT

//! Cluster-wide scatter-gather coordinator.
//!
//! Executes one proxy-agent action against every currently known cluster
//! node and returns one settled outcome per node: fulfilled with the
//! agent's payload or rejected with the captured error, never thrown.
//!
//! The node list is a snapshot from the node directory; nodes joining or
//! leaving mid-flight are not retroactively included or excluded. Calls are
//! issued concurrently, explicitly targeted (every node reports its own
//! local state, so nothing is load-balanced), and joined unconditionally -
//! one unreachable node must not abort, cancel or reorder the others.
//! Retries and timeouts beyond the transport's own are the caller's
//! business, per node.

use crate::errors::ClusterError;
use crate::metrics;
use crate::providers::{AgentAction, NodeDirectory, ProxyAgent};
use futures::future::join_all;
use serde::Serialize;
use serde_json::Value;
use std::sync::Arc;
use tracing::debug;

/// One per-branch outcome of a scatter pass: a value or a captured error.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "lowercase", tag = "status")]
pub enum Settled {
    /// The node answered; `info` is its opaque diagnostic payload
    Fulfilled {
        info: Value,
    },
    /// The call failed; `reason` is the captured transport/agent error
    Rejected {
        reason: String,
    },
}

impl Settled {
    #[must_use]
    pub fn is_fulfilled(&self) -> bool {
        matches!(self, Self::Fulfilled { .. })
    }
}

/// Outcome of one node's call, in snapshot order.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct NodeOutcome {
    /// The targeted node identifier
    #[serde(rename = "nodeID")]
    pub node: String,
    /// Settled result of the call
    #[serde(flatten)]
    pub settled: Settled,
}

/// Fan-out/fan-in coordinator over the proxy agents.
pub struct ScatterGather {
    directory: Arc<dyn NodeDirectory>,
    agent: Arc<dyn ProxyAgent>,
}

impl ScatterGather {
    #[must_use]
    pub fn new(directory: Arc<dyn NodeDirectory>, agent: Arc<dyn ProxyAgent>) -> Self {
        Self { directory, agent }
    }

    /// Run `action` on every node and settle all outcomes.
    ///
    /// Returns one entry per node, in the same order as the directory
    /// snapshot. Individual failures are captured as
    /// [`Settled::Rejected`]; the full sequence is preserved for internal
    /// diagnostics and filtered by callers that only want successes.
    ///
    /// # Errors
    ///
    /// [`ClusterError::DirectoryUnavailable`] when the node snapshot itself
    /// cannot be obtained - the only failure that aborts the batch.
    pub async fn scatter(
        &self,
        action: AgentAction,
        params: &Value,
    ) -> Result<Vec<NodeOutcome>, ClusterError> {
        let nodes = self.directory.nodes().await?;
        debug!(action = action.as_str(), nodes = nodes.len(), "scatter pass");

        let calls = nodes
            .iter()
            .map(|node| self.agent.call(node, action, params));
        let settled = join_all(calls).await;

        Ok(nodes
            .into_iter()
            .zip(settled)
            .map(|(node, result)| {
                let settled = match result {
                    Ok(info) => {
                        metrics::scatter_call(action.as_str(), "fulfilled");
                        Settled::Fulfilled { info }
                    }
                    Err(err) => {
                        metrics::scatter_call(action.as_str(), "rejected");
                        Settled::Rejected {
                            reason: err.to_string(),
                        }
                    }
                };
                NodeOutcome { node, settled }
            })
            .collect())
    }
}

/// Keep only the fulfilled entries of a scatter result, the shape exposed
/// on the administrative surface.
#[must_use]
pub fn fulfilled(outcomes: Vec<NodeOutcome>) -> Vec<NodeOutcome> {
    outcomes
        .into_iter()
        .filter(|o| o.settled.is_fulfilled())
        .collect()
}

#[cfg(test)]
#[path = "scatter_tests.rs"]
mod scatter_tests;
