// Copyright (c) 2025 Erick Bourgeois, firestoned
// SPDX-License-Identifier: MIT

//! Unit tests for `routers.rs`

use super::*;
use crate::events::EventHandler;
use crate::store::MemoryStore;
use async_trait::async_trait;
use std::sync::Mutex;

struct EventRecorder {
    seen: Mutex<Vec<String>>,
}

#[async_trait]
impl EventHandler for EventRecorder {
    fn name(&self) -> &'static str {
        "recorder"
    }

    async fn handle(&self, event: &DomainEvent) -> anyhow::Result<()> {
        self.seen.lock().unwrap().push(event.name().to_string());
        Ok(())
    }
}

fn registry() -> (RouterRegistry, Arc<EventRecorder>) {
    let recorder = Arc::new(EventRecorder {
        seen: Mutex::new(Vec::new()),
    });
    let mut bus = EventBus::new();
    bus.subscribe(recorder.clone());
    (
        RouterRegistry::new(Arc::new(MemoryStore::<Router>::new()), Arc::new(bus)),
        recorder,
    )
}

fn params(node: &str, ipv4: &str) -> CreateRouter {
    CreateRouter {
        node: node.to_string(),
        zone: "eu".to_string(),
        ipv4: ipv4.to_string(),
        ..CreateRouter::default()
    }
}

#[tokio::test]
async fn test_create_defaults_and_event() {
    let (registry, recorder) = registry();

    let router = registry.create(params("node-1", "198.51.100.7")).await.unwrap();

    assert_eq!(router.priority, 5);
    assert!(router.enabled);
    assert_eq!(*recorder.seen.lock().unwrap(), ["routers.created"]);
}

#[tokio::test]
async fn test_create_requires_ipv4() {
    let (registry, recorder) = registry();

    let err = registry.create(params("node-1", "")).await.unwrap_err();

    assert_eq!(err, RegistryError::required("ipv4"));
    assert!(recorder.seen.lock().unwrap().is_empty());
}

#[tokio::test]
async fn test_remove_emits_event() {
    let (registry, recorder) = registry();
    let router = registry.create(params("node-1", "198.51.100.7")).await.unwrap();

    registry.remove(&router.id).await.unwrap();

    assert_eq!(
        *recorder.seen.lock().unwrap(),
        ["routers.created", "routers.removed"]
    );
}

#[tokio::test]
async fn test_enabled_toggle_is_not_event_wired() {
    let (registry, recorder) = registry();
    let router = registry.create(params("node-1", "198.51.100.7")).await.unwrap();

    let updated = registry
        .update(
            &router.id,
            UpdateRouter {
                enabled: Some(false),
                ..UpdateRouter::default()
            },
        )
        .await
        .unwrap();

    assert!(!updated.enabled);
    // the toggle goes through the plain update path; routes.sync heals DNS
    assert_eq!(*recorder.seen.lock().unwrap(), ["routers.created"]);
}

#[tokio::test]
async fn test_enabled_routers_filters_disabled() {
    let (registry, _) = registry();
    registry.create(params("node-1", "198.51.100.7")).await.unwrap();
    let off = registry
        .create(CreateRouter {
            enabled: Some(false),
            ..params("node-2", "198.51.100.8")
        })
        .await
        .unwrap();

    let enabled = registry.enabled_routers().await.unwrap();

    assert_eq!(enabled.len(), 1);
    assert_eq!(enabled[0].node, "node-1");
    assert_ne!(enabled[0].id, off.id);
}

#[tokio::test]
async fn test_find_filters_by_zone() {
    let (registry, _) = registry();
    registry.create(params("node-1", "198.51.100.7")).await.unwrap();
    registry
        .create(CreateRouter {
            zone: "us".to_string(),
            ..params("node-2", "198.51.100.8")
        })
        .await
        .unwrap();

    assert_eq!(registry.find(Some("eu")).await.unwrap().len(), 1);
    assert_eq!(registry.find(None).await.unwrap().len(), 2);
    assert_eq!(registry.count(Some("us")).await.unwrap(), 1);
}
