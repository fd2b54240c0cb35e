// Copyright (c) 2025 Erick Bourgeois, firestoned
// SPDX-License-Identifier: MIT

//! Unit tests for `scatter.rs`

use super::*;
use crate::agents::StaticNodeDirectory;
use crate::testutil::{FailingDirectory, ScriptedAgent};
use serde_json::json;

fn coordinator(nodes: &[&str], agent: ScriptedAgent) -> ScatterGather {
    let directory = StaticNodeDirectory::new(nodes.iter().map(ToString::to_string).collect());
    ScatterGather::new(Arc::new(directory), Arc::new(agent))
}

#[tokio::test]
async fn test_scatter_settles_every_node_in_snapshot_order() {
    let agent = ScriptedAgent::default()
        .respond("node-a", json!({"uptime": 41}))
        .fail("node-b", "connection refused")
        .respond("node-c", json!({"uptime": 43}));
    let coordinator = coordinator(&["node-a", "node-b", "node-c"], agent);

    let outcomes = coordinator
        .scatter(AgentAction::Info, &Value::Null)
        .await
        .unwrap();

    assert_eq!(outcomes.len(), 3);
    assert_eq!(outcomes[0].node, "node-a");
    assert_eq!(
        outcomes[0].settled,
        Settled::Fulfilled {
            info: json!({"uptime": 41}),
        }
    );
    assert_eq!(outcomes[1].node, "node-b");
    match &outcomes[1].settled {
        Settled::Rejected { reason } => {
            assert!(reason.contains("node-b"));
            assert!(reason.contains("connection refused"));
        }
        other => panic!("expected rejection, got {other:?}"),
    }
    assert_eq!(outcomes[2].node, "node-c");
    assert!(outcomes[2].settled.is_fulfilled());
}

#[tokio::test]
async fn test_unscripted_node_is_rejected_not_fatal() {
    let agent = ScriptedAgent::default().respond("node-a", json!({}));
    let coordinator = coordinator(&["node-a", "node-b"], agent);

    let outcomes = coordinator
        .scatter(AgentAction::Stats, &Value::Null)
        .await
        .unwrap();

    assert!(outcomes[0].settled.is_fulfilled());
    assert!(!outcomes[1].settled.is_fulfilled());
}

#[tokio::test]
async fn test_directory_outage_aborts_the_batch() {
    let coordinator = ScatterGather::new(
        Arc::new(FailingDirectory),
        Arc::new(ScriptedAgent::default()),
    );

    let err = coordinator
        .scatter(AgentAction::Sync, &Value::Null)
        .await
        .unwrap_err();

    assert!(matches!(err, ClusterError::DirectoryUnavailable { .. }));
}

#[tokio::test]
async fn test_fulfilled_keeps_only_successful_entries() {
    let outcomes = vec![
        NodeOutcome {
            node: "node-a".to_string(),
            settled: Settled::Fulfilled { info: json!(1) },
        },
        NodeOutcome {
            node: "node-b".to_string(),
            settled: Settled::Rejected {
                reason: "down".to_string(),
            },
        },
    ];

    let ok = fulfilled(outcomes);

    assert_eq!(ok.len(), 1);
    assert_eq!(ok[0].node, "node-a");
}

#[test]
fn test_outcome_wire_shape() {
    let ok = NodeOutcome {
        node: "node-a".to_string(),
        settled: Settled::Fulfilled {
            info: json!({"connections": 12}),
        },
    };
    assert_eq!(
        serde_json::to_value(&ok).unwrap(),
        json!({
            "nodeID": "node-a",
            "status": "fulfilled",
            "info": {"connections": 12},
        })
    );

    let failed = NodeOutcome {
        node: "node-b".to_string(),
        settled: Settled::Rejected {
            reason: "connection refused".to_string(),
        },
    };
    assert_eq!(
        serde_json::to_value(&failed).unwrap(),
        json!({
            "nodeID": "node-b",
            "status": "rejected",
            "reason": "connection refused",
        })
    );
}
