#[cfg(test)]
mod tests {
    use crate::broker::handlers::broker_router;
    use crate::broker::protocol::{ReplicaTarget, ReplicationStatus, Role};
    use crate::broker::store::{AuditAction, MessageStore};
    use serde_json::json;
    use std::sync::Arc;
    use std::time::Duration;

    async fn spawn_broker(node_id: &str) -> (String, Arc<MessageStore>) {
        let store = Arc::new(MessageStore::new(node_id));
        let app = broker_router(store.clone());
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });
        (format!("http://{}", addr), store)
    }

    // ============================================================
    // LOCAL STORE TESTS
    // ============================================================

    #[tokio::test]
    async fn test_store_without_replicas_writes_primary_entry() {
        let store = MessageStore::new("node-a");

        let results = store
            .store("order_1", json!({"event": "order_placed", "userId": 42}), &[])
            .await;
        assert!(results.is_empty());

        let entry = store.fetch("order_1").expect("entry should exist");
        assert_eq!(entry.role, Role::Primary);
        assert!(entry.replica_of.is_none());
        assert_eq!(entry.payload["userId"], 42);
        assert_eq!(store.message_count(), 1);
    }

    #[tokio::test]
    async fn test_same_key_is_last_writer_wins() {
        let store = MessageStore::new("node-a");

        store.store("k", json!({"v": 1}), &[]).await;
        store.store("k", json!({"v": 2}), &[]).await;

        assert_eq!(store.fetch("k").unwrap().payload["v"], 2);
        assert_eq!(store.message_count(), 1);

        // Both writes remain visible in the audit log.
        let summary = store.audit_summary().await;
        assert_eq!(summary.stored_as_primary, 2);
    }

    #[tokio::test]
    async fn test_replica_entry_remembers_its_primary() {
        let store = MessageStore::new("node-b");

        store
            .store_replica("order_1", json!({"event": "order_placed"}), "node-a")
            .await;

        let entry = store.fetch("order_1").unwrap();
        assert_eq!(entry.role, Role::Replica);
        assert_eq!(entry.replica_of.as_deref(), Some("node-a"));

        let summary = store.audit_summary().await;
        assert_eq!(summary.stored_as_replica, 1);
        assert_eq!(summary.stored_as_primary, 0);
    }

    #[tokio::test]
    async fn test_fetch_missing_key_returns_none() {
        let store = MessageStore::new("node-a");
        assert!(store.fetch("missing_42").is_none());
    }

    #[tokio::test]
    async fn test_promote_flags_node_and_audits() {
        let store = MessageStore::new("node-c");
        assert!(!store.is_promoted());

        store.promote().await;

        assert!(store.is_promoted());
        let summary = store.audit_summary().await;
        assert_eq!(summary.promoted_to_primary, 1);

        // Promotion records carry no key.
        let primaries = store.audit_records(AuditAction::StoredAsPrimary).await;
        assert!(primaries.is_empty());
    }

    // ============================================================
    // REPLICATION FAN-OUT TESTS
    // ============================================================

    #[tokio::test]
    async fn test_replication_fans_out_to_live_peer() {
        let (replica_url, replica_store) = spawn_broker("node-b").await;
        let primary = MessageStore::new("node-a");

        let results = primary
            .store(
                "order_1",
                json!({"event": "order_placed"}),
                &[ReplicaTarget {
                    node: "node-b".to_string(),
                    url: replica_url,
                }],
            )
            .await;

        assert_eq!(results.len(), 1);
        assert_eq!(results[0].status, ReplicationStatus::Success);
        assert_eq!(results[0].node, "node-b");

        let copy = replica_store.fetch("order_1").expect("replica copy");
        assert_eq!(copy.role, Role::Replica);
        assert_eq!(copy.replica_of.as_deref(), Some("node-a"));
    }

    #[tokio::test]
    async fn test_unreachable_replica_degrades_but_does_not_fail() {
        let primary =
            MessageStore::with_replication_timeout("node-a", Duration::from_millis(300));

        let results = primary
            .store(
                "order_1",
                json!({"event": "order_placed"}),
                &[ReplicaTarget {
                    node: "node-dead".to_string(),
                    // Nothing listens here; the connection is refused.
                    url: "http://127.0.0.1:9".to_string(),
                }],
            )
            .await;

        assert_eq!(results.len(), 1);
        assert_eq!(results[0].status, ReplicationStatus::Failed);
        assert!(results[0].error.is_some());

        // The local primary write survives the degraded fan-out.
        assert_eq!(primary.fetch("order_1").unwrap().role, Role::Primary);
    }

    #[tokio::test]
    async fn test_replication_order_follows_target_list() {
        let (url_b, store_b) = spawn_broker("node-b").await;
        let (url_c, store_c) = spawn_broker("node-c").await;
        let primary = MessageStore::new("node-a");

        let results = primary
            .store(
                "order_1",
                json!({"seq": 1}),
                &[
                    ReplicaTarget { node: "node-b".to_string(), url: url_b },
                    ReplicaTarget { node: "node-c".to_string(), url: url_c },
                ],
            )
            .await;

        let nodes: Vec<&str> = results.iter().map(|r| r.node.as_str()).collect();
        assert_eq!(nodes, ["node-b", "node-c"]);
        assert!(store_b.fetch("order_1").is_some());
        assert!(store_c.fetch("order_1").is_some());
    }
}
