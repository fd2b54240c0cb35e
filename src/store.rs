// Copyright (c) 2025 Erick Bourgeois, firestoned
// SPDX-License-Identifier: MIT

//! Entity store contract and in-memory implementation.
//!
//! The registries never write records themselves; all persistence goes
//! through [`EntityStore`], which owns identifier assignment, timestamps
//! and soft-delete semantics. Production deployments back this trait with
//! the platform's entity service; [`MemoryStore`] is the reference
//! implementation used by the daemon's standalone mode and by tests.
//!
//! Soft delete: `remove` stamps `deleted_at` and keeps the record. `list`
//! and `get` only see live records (the default "not deleted" scope);
//! `list_all` includes tombstones for diagnostic use.

use crate::errors::RegistryError;
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use rand::RngExt;
use std::collections::HashMap;
use tokio::sync::RwLock;

/// Accessors the store needs on every entity it manages.
pub trait Entity: Clone + Send + Sync + 'static {
    fn id(&self) -> &str;
    fn set_id(&mut self, id: String);
    fn deleted_at(&self) -> Option<DateTime<Utc>>;
    fn set_deleted_at(&mut self, at: Option<DateTime<Utc>>);
    fn set_created_at(&mut self, at: DateTime<Utc>);
    fn set_updated_at(&mut self, at: DateTime<Utc>);
}

macro_rules! impl_entity {
    ($ty:ty) => {
        impl Entity for $ty {
            fn id(&self) -> &str {
                &self.id
            }
            fn set_id(&mut self, id: String) {
                self.id = id;
            }
            fn deleted_at(&self) -> Option<DateTime<Utc>> {
                self.deleted_at
            }
            fn set_deleted_at(&mut self, at: Option<DateTime<Utc>>) {
                self.deleted_at = at;
            }
            fn set_created_at(&mut self, at: DateTime<Utc>) {
                self.created_at = Some(at);
            }
            fn set_updated_at(&mut self, at: DateTime<Utc>) {
                self.updated_at = Some(at);
            }
        }
    };
}

impl_entity!(crate::entities::Route);
impl_entity!(crate::entities::Host);
impl_entity!(crate::entities::Router);

/// Narrow persistence contract consumed by the registries.
///
/// Field validation, pagination and REST generation live behind this seam;
/// the control plane only needs identifier assignment, timestamps and
/// soft-delete bookkeeping.
#[async_trait]
pub trait EntityStore<T: Entity>: Send + Sync {
    /// Insert a new entity; the store assigns the id and `created_at`.
    async fn insert(&self, entity: T) -> Result<T, RegistryError>;

    /// Replace an existing live entity; the store stamps `updated_at`.
    async fn update(&self, entity: T) -> Result<T, RegistryError>;

    /// Soft-delete a live entity and return it with `deleted_at` set.
    async fn remove(&self, id: &str) -> Result<T, RegistryError>;

    /// Fetch a live entity by id.
    async fn get(&self, id: &str) -> Result<Option<T>, RegistryError>;

    /// All live (non-deleted) entities.
    async fn list(&self) -> Result<Vec<T>, RegistryError>;

    /// All entities including soft-deleted tombstones.
    async fn list_all(&self) -> Result<Vec<T>, RegistryError>;
}

/// In-memory entity store.
///
/// Insertion order is preserved so listings are deterministic, which the
/// reconciler tests rely on for call-count assertions.
pub struct MemoryStore<T: Entity> {
    inner: RwLock<Inner<T>>,
}

struct Inner<T> {
    records: HashMap<String, T>,
    order: Vec<String>,
}

impl<T: Entity> MemoryStore<T> {
    #[must_use]
    pub fn new() -> Self {
        Self {
            inner: RwLock::new(Inner {
                records: HashMap::new(),
                order: Vec::new(),
            }),
        }
    }
}

impl<T: Entity> Default for MemoryStore<T> {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl<T: Entity> EntityStore<T> for MemoryStore<T> {
    async fn insert(&self, mut entity: T) -> Result<T, RegistryError> {
        let mut inner = self.inner.write().await;
        let id = generate_id();
        entity.set_id(id.clone());
        entity.set_created_at(Utc::now());
        entity.set_deleted_at(None);
        inner.records.insert(id.clone(), entity.clone());
        inner.order.push(id);
        Ok(entity)
    }

    async fn update(&self, mut entity: T) -> Result<T, RegistryError> {
        let mut inner = self.inner.write().await;
        let id = entity.id().to_string();
        match inner.records.get(&id) {
            Some(current) if current.deleted_at().is_none() => {
                entity.set_updated_at(Utc::now());
                inner.records.insert(id, entity.clone());
                Ok(entity)
            }
            _ => Err(RegistryError::NotFound {
                kind: "entity".to_string(),
                id,
            }),
        }
    }

    async fn remove(&self, id: &str) -> Result<T, RegistryError> {
        let mut inner = self.inner.write().await;
        match inner.records.get_mut(id) {
            Some(entity) if entity.deleted_at().is_none() => {
                entity.set_deleted_at(Some(Utc::now()));
                Ok(entity.clone())
            }
            _ => Err(RegistryError::NotFound {
                kind: "entity".to_string(),
                id: id.to_string(),
            }),
        }
    }

    async fn get(&self, id: &str) -> Result<Option<T>, RegistryError> {
        let inner = self.inner.read().await;
        Ok(inner
            .records
            .get(id)
            .filter(|e| e.deleted_at().is_none())
            .cloned())
    }

    async fn list(&self) -> Result<Vec<T>, RegistryError> {
        let inner = self.inner.read().await;
        Ok(inner
            .order
            .iter()
            .filter_map(|id| inner.records.get(id))
            .filter(|e| e.deleted_at().is_none())
            .cloned()
            .collect())
    }

    async fn list_all(&self) -> Result<Vec<T>, RegistryError> {
        let inner = self.inner.read().await;
        Ok(inner
            .order
            .iter()
            .filter_map(|id| inner.records.get(id))
            .cloned()
            .collect())
    }
}

/// Generate an opaque record identifier: 12 random bytes, hex-encoded.
fn generate_id() -> String {
    let mut bytes = [0u8; 12];
    rand::rng().fill(&mut bytes[..]);
    bytes.iter().map(|b| format!("{b:02x}")).collect()
}

#[cfg(test)]
#[path = "store_tests.rs"]
mod store_tests;
