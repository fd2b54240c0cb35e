// Copyright (c) 2025 Erick Bourgeois, firestoned
// SPDX-License-Identifier: MIT

//! Proxy-agent HTTP client and node directory implementations.
//!
//! Every cluster node runs a proxy-agent process exposing `sync`, `stats`
//! and `info`. [`HttpProxyAgent`] addresses one explicit node per call;
//! the scatter-gather coordinator owns fan-out and failure capture, so
//! this client just reports one call's outcome honestly.

use crate::errors::{AgentError, ClusterError};
use crate::providers::{AgentAction, NodeDirectory, ProxyAgent};
use async_trait::async_trait;
use serde_json::Value;
use std::time::Duration;
use tracing::debug;

/// Default per-request timeout for agent calls. Doubles as the per-node
/// failure bound of a scatter pass: the coordinator imposes nothing else.
const REQUEST_TIMEOUT: Duration = Duration::from_secs(15);

/// HTTP client for the per-node proxy agents.
pub struct HttpProxyAgent {
    client: reqwest::Client,
    /// Port the agent listens on, same on every node
    agent_port: u16,
}

impl HttpProxyAgent {
    #[must_use]
    pub fn new(agent_port: u16) -> Self {
        let client = reqwest::Client::builder()
            .timeout(REQUEST_TIMEOUT)
            .build()
            .unwrap_or_default();
        Self { client, agent_port }
    }

    fn action_url(&self, node: &str, action: AgentAction) -> String {
        format!(
            "http://{node}:{}/v1/proxy/agent/{}",
            self.agent_port,
            action.as_str()
        )
    }
}

#[async_trait]
impl ProxyAgent for HttpProxyAgent {
    async fn call(
        &self,
        node: &str,
        action: AgentAction,
        params: &Value,
    ) -> Result<Value, AgentError> {
        let url = self.action_url(node, action);
        debug!(node, action = action.as_str(), "calling proxy agent");

        let response = self
            .client
            .post(&url)
            .json(params)
            .send()
            .await
            .map_err(|err| AgentError::Unreachable {
                node: node.to_string(),
                reason: err.to_string(),
            })?;

        let status = response.status();
        if !status.is_success() {
            return Err(AgentError::BadStatus {
                node: node.to_string(),
                status: status.as_u16(),
            });
        }
        response
            .json::<Value>()
            .await
            .map_err(|err| AgentError::BadPayload {
                node: node.to_string(),
                reason: err.to_string(),
            })
    }
}

/// Node directory backed by a fixed, operator-supplied node list.
///
/// Suitable for the small operator-controlled clusters this control plane
/// targets; a discovery-backed directory implements the same trait.
pub struct StaticNodeDirectory {
    nodes: Vec<String>,
}

impl StaticNodeDirectory {
    #[must_use]
    pub fn new(nodes: Vec<String>) -> Self {
        Self { nodes }
    }
}

#[async_trait]
impl NodeDirectory for StaticNodeDirectory {
    async fn nodes(&self) -> Result<Vec<String>, ClusterError> {
        if self.nodes.is_empty() {
            return Err(ClusterError::DirectoryUnavailable {
                reason: "no nodes configured".to_string(),
            });
        }
        Ok(self.nodes.clone())
    }
}
