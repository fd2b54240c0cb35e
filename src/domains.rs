// Copyright (c) 2025 Erick Bourgeois, firestoned
// SPDX-License-Identifier: MIT

//! HTTP client for the platform's domains service.
//!
//! Implements [`DnsProvider`] against the domains service REST API. The
//! service owns record storage and propagation; this client only issues the
//! idempotent add/remove/list calls the reconciler needs. Record ownership
//! travels in the `x-user-id` header taken from the call context.

use crate::errors::DnsError;
use crate::providers::{CallContext, DnsProvider, DnsRecord};
use async_trait::async_trait;
use reqwest::StatusCode;
use serde_json::json;
use std::time::Duration;
use tracing::debug;

/// Default per-request timeout for domains service calls.
const REQUEST_TIMEOUT: Duration = Duration::from_secs(10);

/// Header carrying the acting user for record ownership.
const USER_HEADER: &str = "x-user-id";

/// Domains service client.
pub struct HttpDnsProvider {
    client: reqwest::Client,
    base_url: String,
}

impl HttpDnsProvider {
    /// Build a client for the domains service at `base_url`
    /// (e.g. `http://domains.internal:8600`).
    #[must_use]
    pub fn new(base_url: &str) -> Self {
        let client = reqwest::Client::builder()
            .timeout(REQUEST_TIMEOUT)
            .build()
            .unwrap_or_default();
        Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
        }
    }

    fn records_url(&self) -> String {
        format!("{}/v1/domains/records", self.base_url)
    }

    fn apply_ctx(&self, req: reqwest::RequestBuilder, ctx: &CallContext) -> reqwest::RequestBuilder {
        match &ctx.user_id {
            Some(user) => req.header(USER_HEADER, user),
            None => req,
        }
    }
}

#[async_trait]
impl DnsProvider for HttpDnsProvider {
    async fn add_record(
        &self,
        ctx: &CallContext,
        fqdn: &str,
        record_type: &str,
        data: &str,
    ) -> Result<DnsRecord, DnsError> {
        let body = json!({ "fqdn": fqdn, "type": record_type, "data": data });
        let req = self.apply_ctx(self.client.post(self.records_url()), ctx);
        let response = req.json(&body).send().await.map_err(|err| {
            DnsError::ProviderUnreachable {
                endpoint: self.base_url.clone(),
                reason: err.to_string(),
            }
        })?;

        let status = response.status();
        if !status.is_success() {
            return Err(DnsError::AddFailed {
                fqdn: fqdn.to_string(),
                data: data.to_string(),
                reason: format!("HTTP {}", status.as_u16()),
            });
        }
        debug!(fqdn, data, "record added on domains service");
        response
            .json::<DnsRecord>()
            .await
            .map_err(|err| DnsError::AddFailed {
                fqdn: fqdn.to_string(),
                data: data.to_string(),
                reason: format!("undecodable response: {err}"),
            })
    }

    async fn remove_record(
        &self,
        ctx: &CallContext,
        fqdn: &str,
        record_type: &str,
        data: &str,
    ) -> Result<Option<DnsRecord>, DnsError> {
        let body = json!({ "fqdn": fqdn, "type": record_type, "data": data });
        let req = self.apply_ctx(self.client.delete(self.records_url()), ctx);
        let response = req.json(&body).send().await.map_err(|err| {
            DnsError::ProviderUnreachable {
                endpoint: self.base_url.clone(),
                reason: err.to_string(),
            }
        })?;

        let status = response.status();
        // Removing a record that is already gone is a no-op success.
        if status == StatusCode::NOT_FOUND {
            debug!(fqdn, data, "record already absent on domains service");
            return Ok(None);
        }
        if !status.is_success() {
            return Err(DnsError::RemoveFailed {
                fqdn: fqdn.to_string(),
                data: data.to_string(),
                reason: format!("HTTP {}", status.as_u16()),
            });
        }
        debug!(fqdn, data, "record removed on domains service");
        response
            .json::<Option<DnsRecord>>()
            .await
            .map_err(|err| DnsError::RemoveFailed {
                fqdn: fqdn.to_string(),
                data: data.to_string(),
                reason: format!("undecodable response: {err}"),
            })
    }

    async fn list_records(&self, record_type: &str) -> Result<Vec<DnsRecord>, DnsError> {
        let response = self
            .client
            .get(self.records_url())
            .query(&[("type", record_type)])
            .send()
            .await
            .map_err(|err| DnsError::ProviderUnreachable {
                endpoint: self.base_url.clone(),
                reason: err.to_string(),
            })?;

        let status = response.status();
        if !status.is_success() {
            return Err(DnsError::ListFailed {
                reason: format!("HTTP {}", status.as_u16()),
            });
        }
        response
            .json::<Vec<DnsRecord>>()
            .await
            .map_err(|err| DnsError::ListFailed {
                reason: format!("undecodable response: {err}"),
            })
    }
}
