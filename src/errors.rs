// Copyright (c) 2025 Erick Bourgeois, firestoned
// SPDX-License-Identifier: MIT

//! Error types for registry mutations, DNS operations and cluster queries.
//!
//! The taxonomy mirrors how failures surface to callers:
//!
//! - [`RegistryError`] - synchronous validation/permission/uniqueness failures
//!   on the registry mutation path, mapped to HTTP-style codes (422, 403, 404)
//! - [`DnsError`] - a single DNS provider add/remove/list call failed; logged
//!   and skipped by the reconciler, never propagated to the mutating caller
//! - [`AgentError`] - one proxy-agent call failed; captured as a rejected
//!   scatter-gather entry, never thrown
//! - [`ClusterError`] - the node directory itself is unavailable, the only
//!   case in which an administrative query fails outright

use thiserror::Error;

/// Errors returned synchronously from registry operations.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum RegistryError {
    /// A required field is missing or malformed (HTTP 422)
    #[error("validation failed for field '{field}': {message}")]
    Validation {
        /// The offending field name
        field: String,
        /// Explanation of what is missing or malformed
        message: String,
    },

    /// A uniqueness invariant would be violated (HTTP 422)
    ///
    /// Covers the vHost uniqueness of routes and the (route, hostname, port)
    /// uniqueness of hosts, both scoped to non-deleted records.
    #[error("conflict on '{field}': {message}")]
    Conflict {
        /// The field (or field tuple) that conflicts
        field: String,
        /// Explanation including the conflicting value
        message: String,
    },

    /// The caller has no right for the referenced route (HTTP 403)
    ///
    /// Deliberately returned for both unauthorized and non-existent routes
    /// so existence is not leaked to unauthorized callers.
    #[error("You have no right for the route '{route}'")]
    Forbidden {
        /// The route reference the caller supplied, kept for audit
        route: String,
    },

    /// The referenced entity does not exist or is deleted (HTTP 404)
    #[error("{kind} '{id}' not found")]
    NotFound {
        /// Entity kind ("route", "host", "router")
        kind: String,
        /// The identifier that failed to resolve
        id: String,
    },

    /// The backing entity store failed (HTTP 500)
    #[error("entity store failure: {0}")]
    Store(String),
}

impl RegistryError {
    /// Shorthand for a missing-required-field validation error.
    #[must_use]
    pub fn required(field: &str) -> Self {
        Self::Validation {
            field: field.to_string(),
            message: format!("{field} is required"),
        }
    }

    /// HTTP status code this error maps to on the admin surface.
    #[must_use]
    pub fn http_code(&self) -> u16 {
        match self {
            Self::Validation { .. } | Self::Conflict { .. } => 422,
            Self::Forbidden { .. } => 403,
            Self::NotFound { .. } => 404,
            Self::Store(_) => 500,
        }
    }
}

/// Errors from DNS provider record operations.
///
/// Provider operations are idempotent: adding an existing record and removing
/// a missing record are both no-op successes, so these errors only surface
/// genuine provider/transport failures.
#[derive(Error, Debug, Clone)]
pub enum DnsError {
    /// Failed to add an A-record for a (vHost, router IP) pair
    #[error("failed to add record {fqdn} -> {data}: {reason}")]
    AddFailed {
        /// The vHost FQDN
        fqdn: String,
        /// The record data (router IPv4)
        data: String,
        /// Provider-reported reason
        reason: String,
    },

    /// Failed to remove an A-record for a (vHost, router IP) pair
    #[error("failed to remove record {fqdn} -> {data}: {reason}")]
    RemoveFailed {
        /// The vHost FQDN
        fqdn: String,
        /// The record data (router IPv4)
        data: String,
        /// Provider-reported reason
        reason: String,
    },

    /// Failed to list current records during a resync pass
    #[error("failed to list records: {reason}")]
    ListFailed {
        /// Provider-reported reason
        reason: String,
    },

    /// The provider endpoint could not be reached
    #[error("DNS provider at {endpoint} unreachable: {reason}")]
    ProviderUnreachable {
        /// The provider endpoint
        endpoint: String,
        /// Transport-level reason
        reason: String,
    },
}

/// Errors from a single proxy-agent call.
///
/// These are captured per node inside scatter-gather results and never
/// raised through the coordinator.
#[derive(Error, Debug, Clone)]
pub enum AgentError {
    /// The node did not answer (connection refused, DNS, timeout)
    #[error("node '{node}' unreachable: {reason}")]
    Unreachable {
        /// The target node identifier
        node: String,
        /// Transport-level reason
        reason: String,
    },

    /// The node answered with a non-success status
    #[error("node '{node}' returned HTTP {status}")]
    BadStatus {
        /// The target node identifier
        node: String,
        /// HTTP status code returned by the agent
        status: u16,
    },

    /// The node answered with a payload that could not be decoded
    #[error("node '{node}' returned an undecodable payload: {reason}")]
    BadPayload {
        /// The target node identifier
        node: String,
        /// Decode failure reason
        reason: String,
    },
}

/// Errors that fail a whole administrative query.
#[derive(Error, Debug, Clone)]
pub enum ClusterError {
    /// The node directory could not produce a node snapshot
    #[error("node directory unavailable: {reason}")]
    DirectoryUnavailable {
        /// Underlying reason
        reason: String,
    },
}

#[cfg(test)]
#[path = "errors_tests.rs"]
mod errors_tests;
