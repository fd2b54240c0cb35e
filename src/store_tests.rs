// Copyright (c) 2025 Erick Bourgeois, firestoned
// SPDX-License-Identifier: MIT

//! Unit tests for `store.rs`

use super::*;
use crate::entities::Route;

#[tokio::test]
async fn test_insert_assigns_id_and_created_at() {
    let store = MemoryStore::<Route>::new();

    let route = store.insert(Route::new("app.example.com", None)).await.unwrap();

    assert!(!route.id.is_empty());
    assert!(route.created_at.is_some());
    assert!(route.deleted_at.is_none());
    assert_eq!(store.get(&route.id).await.unwrap().unwrap().id, route.id);
}

#[tokio::test]
async fn test_ids_are_unique() {
    let store = MemoryStore::<Route>::new();

    let a = store.insert(Route::new("a.example.com", None)).await.unwrap();
    let b = store.insert(Route::new("b.example.com", None)).await.unwrap();

    assert_ne!(a.id, b.id);
}

#[tokio::test]
async fn test_remove_is_soft_delete() {
    let store = MemoryStore::<Route>::new();
    let route = store.insert(Route::new("app.example.com", None)).await.unwrap();

    let removed = store.remove(&route.id).await.unwrap();
    assert!(removed.deleted_at.is_some());

    // invisible to the live scope, still present among tombstones
    assert!(store.get(&route.id).await.unwrap().is_none());
    assert!(store.list().await.unwrap().is_empty());
    assert_eq!(store.list_all().await.unwrap().len(), 1);
}

#[tokio::test]
async fn test_remove_twice_fails() {
    let store = MemoryStore::<Route>::new();
    let route = store.insert(Route::new("app.example.com", None)).await.unwrap();

    store.remove(&route.id).await.unwrap();
    assert!(store.remove(&route.id).await.is_err());
}

#[tokio::test]
async fn test_update_stamps_updated_at() {
    let store = MemoryStore::<Route>::new();
    let mut route = store.insert(Route::new("app.example.com", None)).await.unwrap();

    route.zone = Some("eu".to_string());
    let updated = store.update(route).await.unwrap();

    assert!(updated.updated_at.is_some());
    assert_eq!(
        store.get(&updated.id).await.unwrap().unwrap().zone.as_deref(),
        Some("eu")
    );
}

#[tokio::test]
async fn test_update_deleted_entity_fails() {
    let store = MemoryStore::<Route>::new();
    let route = store.insert(Route::new("app.example.com", None)).await.unwrap();
    let removed = store.remove(&route.id).await.unwrap();

    assert!(store.update(removed).await.is_err());
}

#[tokio::test]
async fn test_list_preserves_insertion_order() {
    let store = MemoryStore::<Route>::new();
    for name in ["a.example.com", "b.example.com", "c.example.com"] {
        store.insert(Route::new(name, None)).await.unwrap();
    }

    let hosts: Vec<String> = store
        .list()
        .await
        .unwrap()
        .into_iter()
        .map(|r| r.v_host)
        .collect();
    assert_eq!(hosts, ["a.example.com", "b.example.com", "c.example.com"]);
}
