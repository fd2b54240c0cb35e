// Copyright (c) 2025 Erick Bourgeois, firestoned
// SPDX-License-Identifier: MIT

//! Unit tests for `hosts.rs`

use super::*;
use crate::entities::Route;
use crate::store::MemoryStore;
use crate::testutil::{AllowAllGate, DenyAllGate};

fn registry() -> (HostRegistry, Arc<MemoryStore<Host>>) {
    let store = Arc::new(MemoryStore::<Host>::new());
    (
        HostRegistry::new(store.clone(), Arc::new(AllowAllGate)),
        store,
    )
}

fn params(route: Option<&str>, hostname: &str, port: u16) -> CreateHost {
    CreateHost {
        route: route.map(ToString::to_string),
        hostname: hostname.to_string(),
        port,
        ..CreateHost::default()
    }
}

#[tokio::test]
async fn test_create_requires_route() {
    let (registry, store) = registry();

    let err = registry
        .create(&CallContext::default(), params(None, "10.0.0.5", 8080))
        .await
        .unwrap_err();

    assert_eq!(err, RegistryError::required("route"));
    // validation fires before storage is touched
    assert!(store.list_all().await.unwrap().is_empty());
}

#[tokio::test]
async fn test_create_unresolvable_route_is_forbidden() {
    let store = Arc::new(MemoryStore::<Host>::new());
    let registry = HostRegistry::new(store, Arc::new(DenyAllGate));

    let err = registry
        .create(
            &CallContext::default(),
            params(Some("r1"), "10.0.0.5", 8080),
        )
        .await
        .unwrap_err();

    assert_eq!(
        err,
        RegistryError::Forbidden {
            route: "r1".to_string(),
        }
    );
}

#[tokio::test]
async fn test_create_applies_pool_defaults() {
    let (registry, _) = registry();

    let host = registry
        .create(
            &CallContext::default(),
            params(Some("r1"), "10.0.0.5", 8080),
        )
        .await
        .unwrap();

    assert_eq!(host.route, "r1");
    assert_eq!(host.weight, 200);
    assert_eq!(host.vnodes, 50);
    assert_eq!(host.cluster, "default");
}

#[tokio::test]
async fn test_create_rejects_duplicate_backend() {
    let (registry, _) = registry();
    let ctx = CallContext::default();
    registry
        .create(&ctx, params(Some("r1"), "10.0.0.5", 8080))
        .await
        .unwrap();

    let err = registry
        .create(&ctx, params(Some("r1"), "10.0.0.5", 8080))
        .await
        .unwrap_err();
    assert!(matches!(err, RegistryError::Conflict { .. }));

    // same backend under a different route is fine
    registry
        .create(&ctx, params(Some("r2"), "10.0.0.5", 8080))
        .await
        .unwrap();
    // and a different port under the same route too
    registry
        .create(&ctx, params(Some("r1"), "10.0.0.5", 8081))
        .await
        .unwrap();
}

#[tokio::test]
async fn test_backend_is_reusable_after_removal() {
    let (registry, _) = registry();
    let ctx = CallContext::default();
    let host = registry
        .create(&ctx, params(Some("r1"), "10.0.0.5", 8080))
        .await
        .unwrap();
    registry.remove(&host.id).await.unwrap();

    registry
        .create(&ctx, params(Some("r1"), "10.0.0.5", 8080))
        .await
        .unwrap();
}

#[tokio::test]
async fn test_list_requires_route() {
    let (registry, _) = registry();

    let err = registry
        .list(&CallContext::default(), HostQuery::default())
        .await
        .unwrap_err();
    assert_eq!(err, RegistryError::required("route"));
}

#[tokio::test]
async fn test_find_route_is_optional() {
    let (registry, _) = registry();
    let ctx = CallContext::default();
    registry
        .create(&ctx, params(Some("r1"), "10.0.0.5", 8080))
        .await
        .unwrap();
    registry
        .create(&ctx, params(Some("r2"), "10.0.0.6", 8080))
        .await
        .unwrap();

    let all = registry.find(&ctx, HostQuery::default()).await.unwrap();
    assert_eq!(all.len(), 2);

    let scoped = registry
        .list(
            &ctx,
            HostQuery {
                route: Some("r1".to_string()),
                ..HostQuery::default()
            },
        )
        .await
        .unwrap();
    assert_eq!(scoped.len(), 1);
    assert_eq!(scoped[0].hostname, "10.0.0.5");
}

#[tokio::test]
async fn test_resolve_host() {
    let (registry, _) = registry();
    let ctx = CallContext::default();
    let host = registry
        .create(&ctx, params(Some("r1"), "10.0.0.5", 8080))
        .await
        .unwrap();

    let resolved = registry
        .resolve_host(&ctx, "r1", "10.0.0.5", 8080)
        .await
        .unwrap()
        .unwrap();
    assert_eq!(resolved.id, host.id);

    assert!(registry
        .resolve_host(&ctx, "r1", "10.0.0.5", 9999)
        .await
        .unwrap()
        .is_none());
}

#[tokio::test]
async fn test_find_and_remove() {
    let (registry, store) = registry();
    let ctx = CallContext::default();
    registry
        .create(&ctx, params(Some("r1"), "10.0.0.5", 8080))
        .await
        .unwrap();

    let removed = registry
        .find_and_remove(
            &ctx,
            HostQuery {
                route: Some("r1".to_string()),
                hostname: Some("10.0.0.5".to_string()),
                port: Some(8080),
                ..HostQuery::default()
            },
        )
        .await
        .unwrap();

    assert!(removed.is_some());
    assert!(store.list().await.unwrap().is_empty());

    let none = registry
        .find_and_remove(
            &ctx,
            HostQuery {
                route: Some("r1".to_string()),
                ..HostQuery::default()
            },
        )
        .await
        .unwrap();
    assert!(none.is_none());
}

#[tokio::test]
async fn test_cascade_removes_hosts_of_removed_route() {
    let store = Arc::new(MemoryStore::<Host>::new());
    let registry = HostRegistry::new(store.clone(), Arc::new(AllowAllGate));
    let ctx = CallContext::default();

    registry
        .create(&ctx, params(Some("r1"), "10.0.0.5", 8080))
        .await
        .unwrap();
    registry
        .create(&ctx, params(Some("r1"), "10.0.0.6", 8080))
        .await
        .unwrap();
    registry
        .create(&ctx, params(Some("r2"), "10.0.0.7", 8080))
        .await
        .unwrap();

    let mut route = Route::new("app.example.com", None);
    route.id = "r1".to_string();
    let cascade = HostCascade::new(store.clone());
    cascade
        .handle(&DomainEvent::RouteRemoved(route))
        .await
        .unwrap();

    let survivors = store.list().await.unwrap();
    assert_eq!(survivors.len(), 1);
    assert_eq!(survivors[0].route, "r2");
}
