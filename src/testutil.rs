// Copyright (c) 2025 Erick Bourgeois, firestoned
// SPDX-License-Identifier: MIT

//! In-memory collaborator fakes shared by the unit tests.

use crate::errors::{AgentError, ClusterError, DnsError, RegistryError};
use crate::providers::{
    AgentAction, CallContext, DnsProvider, DnsRecord, NodeDirectory, PermissionGate, ProxyAgent,
    ResolvedRoute,
};
use async_trait::async_trait;
use serde_json::Value;
use std::collections::{HashMap, HashSet};
use std::sync::Mutex;

/// One call observed by the [`RecordingDnsProvider`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DnsCall {
    pub direction: &'static str,
    pub fqdn: String,
    pub data: String,
    pub user: Option<String>,
}

/// DNS provider fake that records every call and can be scripted to fail
/// on specific (fqdn, data) pairs.
#[derive(Default)]
pub struct RecordingDnsProvider {
    pub calls: Mutex<Vec<DnsCall>>,
    pub fail_on: Mutex<HashSet<(String, String)>>,
    pub listing: Mutex<Vec<DnsRecord>>,
    pub fail_listing: Mutex<bool>,
}

impl RecordingDnsProvider {
    pub fn fail_on(&self, fqdn: &str, data: &str) {
        self.fail_on
            .lock()
            .unwrap()
            .insert((fqdn.to_string(), data.to_string()));
    }

    pub fn set_listing(&self, records: Vec<DnsRecord>) {
        *self.listing.lock().unwrap() = records;
    }

    pub fn calls(&self) -> Vec<DnsCall> {
        self.calls.lock().unwrap().clone()
    }

    pub fn calls_for(&self, direction: &str) -> Vec<DnsCall> {
        self.calls()
            .into_iter()
            .filter(|c| c.direction == direction)
            .collect()
    }

    fn record(&self, direction: &'static str, ctx: &CallContext, fqdn: &str, data: &str) -> bool {
        self.calls.lock().unwrap().push(DnsCall {
            direction,
            fqdn: fqdn.to_string(),
            data: data.to_string(),
            user: ctx.user_id.clone(),
        });
        !self
            .fail_on
            .lock()
            .unwrap()
            .contains(&(fqdn.to_string(), data.to_string()))
    }
}

#[async_trait]
impl DnsProvider for RecordingDnsProvider {
    async fn add_record(
        &self,
        ctx: &CallContext,
        fqdn: &str,
        _record_type: &str,
        data: &str,
    ) -> Result<DnsRecord, DnsError> {
        if self.record("add", ctx, fqdn, data) {
            Ok(DnsRecord {
                id: format!("rec-{}", self.calls.lock().unwrap().len()),
                fqdn: fqdn.to_string(),
                record_type: "A".to_string(),
                data: data.to_string(),
            })
        } else {
            Err(DnsError::AddFailed {
                fqdn: fqdn.to_string(),
                data: data.to_string(),
                reason: "scripted failure".to_string(),
            })
        }
    }

    async fn remove_record(
        &self,
        ctx: &CallContext,
        fqdn: &str,
        _record_type: &str,
        data: &str,
    ) -> Result<Option<DnsRecord>, DnsError> {
        if self.record("remove", ctx, fqdn, data) {
            Ok(None)
        } else {
            Err(DnsError::RemoveFailed {
                fqdn: fqdn.to_string(),
                data: data.to_string(),
                reason: "scripted failure".to_string(),
            })
        }
    }

    async fn list_records(&self, _record_type: &str) -> Result<Vec<DnsRecord>, DnsError> {
        if *self.fail_listing.lock().unwrap() {
            return Err(DnsError::ListFailed {
                reason: "scripted failure".to_string(),
            });
        }
        Ok(self.listing.lock().unwrap().clone())
    }
}

/// Gate that resolves every route reference as-is.
pub struct AllowAllGate;

#[async_trait]
impl PermissionGate for AllowAllGate {
    async fn resolve_route(
        &self,
        _ctx: &CallContext,
        route: &str,
    ) -> Result<Option<ResolvedRoute>, RegistryError> {
        Ok(Some(ResolvedRoute {
            id: route.to_string(),
            v_host: String::new(),
            owner: None,
        }))
    }
}

/// Gate that resolves nothing.
pub struct DenyAllGate;

#[async_trait]
impl PermissionGate for DenyAllGate {
    async fn resolve_route(
        &self,
        _ctx: &CallContext,
        _route: &str,
    ) -> Result<Option<ResolvedRoute>, RegistryError> {
        Ok(None)
    }
}

/// Node directory that always fails.
pub struct FailingDirectory;

#[async_trait]
impl NodeDirectory for FailingDirectory {
    async fn nodes(&self) -> Result<Vec<String>, ClusterError> {
        Err(ClusterError::DirectoryUnavailable {
            reason: "scripted outage".to_string(),
        })
    }
}

/// Proxy agent fake answering from a per-node script.
///
/// Unscripted nodes fail as unreachable.
#[derive(Default)]
pub struct ScriptedAgent {
    responses: HashMap<String, Result<Value, String>>,
}

impl ScriptedAgent {
    pub fn respond(mut self, node: &str, value: Value) -> Self {
        self.responses.insert(node.to_string(), Ok(value));
        self
    }

    pub fn fail(mut self, node: &str, reason: &str) -> Self {
        self.responses
            .insert(node.to_string(), Err(reason.to_string()));
        self
    }
}

#[async_trait]
impl ProxyAgent for ScriptedAgent {
    async fn call(
        &self,
        node: &str,
        _action: AgentAction,
        _params: &Value,
    ) -> Result<Value, AgentError> {
        match self.responses.get(node) {
            Some(Ok(value)) => Ok(value.clone()),
            Some(Err(reason)) => Err(AgentError::Unreachable {
                node: node.to_string(),
                reason: reason.clone(),
            }),
            None => Err(AgentError::Unreachable {
                node: node.to_string(),
                reason: "not scripted".to_string(),
            }),
        }
    }
}
