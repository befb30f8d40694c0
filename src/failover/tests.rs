#[cfg(test)]
mod tests {
    use crate::broker::handlers::broker_router;
    use crate::broker::store::MessageStore;
    use crate::config::BrokerEndpoint;
    use crate::failover::controller::FailoverController;
    use crate::failover::state::FailoverState;
    use crate::health::detector::HealthDetector;
    use crate::health::types::NodeStatus;
    use crate::ring::ring::HashRing;
    use std::sync::Arc;
    use std::time::Duration;
    use tokio::sync::mpsc;

    // ============================================================
    // OVERRIDE STATE TESTS
    // ============================================================

    #[tokio::test]
    async fn test_resolve_without_override_is_identity() {
        let state = FailoverState::new();
        assert_eq!(state.resolve("node-a").await, "node-a");
        assert!(!state.is_active().await);
        assert_eq!(state.total().await, 0);
    }

    #[tokio::test]
    async fn test_promotion_rewrites_resolution_and_logs_event() {
        let state = FailoverState::new();
        state.record_promotion("node-a", "node-b").await;

        assert_eq!(state.resolve("node-a").await, "node-b");
        assert_eq!(state.resolve("node-b").await, "node-b");
        assert!(state.is_active().await);

        let events = state.events().await;
        assert_eq!(events.len(), 1);
        assert_eq!(events[0].failed_node, "node-a");
        assert_eq!(events[0].promoted_node, "node-b");
        assert!(!events[0].id.is_empty());

        let snapshot = state.snapshot().await;
        assert_eq!(snapshot.get("node-a").map(String::as_str), Some("node-b"));
    }

    #[tokio::test]
    async fn test_repeated_promotion_keeps_full_event_history() {
        let state = FailoverState::new();
        state.record_promotion("node-a", "node-b").await;
        state.record_promotion("node-a", "node-c").await;

        // Latest promotion wins in the map; the log keeps both.
        assert_eq!(state.resolve("node-a").await, "node-c");
        assert_eq!(state.total().await, 2);
    }

    // ============================================================
    // PROMOTION PROTOCOL TESTS (real sockets)
    // ============================================================

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

    fn detector_for(targets: Vec<BrokerEndpoint>) -> Arc<HealthDetector> {
        // Never started: the controller only uses it to flip FAILED_OVER.
        let (tx, _rx) = mpsc::channel(16);
        HealthDetector::new(targets, tx)
    }

    #[tokio::test]
    async fn test_failure_promotes_next_responsive_broker() {
        let (url_b, store_b) = spawn_broker("node-b").await;
        let (url_c, _store_c) = spawn_broker("node-c").await;

        let mut ring = HashRing::new();
        // node-a is "down": nothing listens on its port.
        ring.add_node("node-a", "http://127.0.0.1:9");
        ring.add_node("node-b", &url_b);
        ring.add_node("node-c", &url_c);
        let ring = Arc::new(ring);

        let state = Arc::new(FailoverState::new());
        let health = detector_for(vec![
            BrokerEndpoint { name: "node-a".to_string(), url: "http://127.0.0.1:9".to_string() },
            BrokerEndpoint { name: "node-b".to_string(), url: url_b.clone() },
            BrokerEndpoint { name: "node-c".to_string(), url: url_c.clone() },
        ]);

        let controller = FailoverController::with_timeout(
            ring,
            state.clone(),
            health.clone(),
            Duration::from_millis(500),
        );
        controller.handle_failure("node-a").await;

        // node-b sits clockwise of node-a and is alive, so it wins.
        assert_eq!(state.resolve("node-a").await, "node-b");
        assert!(store_b.is_promoted());
        assert_eq!(health.record("node-a").unwrap().status, NodeStatus::FailedOver);
        assert_eq!(state.total().await, 1);
    }

    #[tokio::test]
    async fn test_unresponsive_candidates_are_walked_past() {
        let (url_c, store_c) = spawn_broker("node-c").await;

        let mut ring = HashRing::new();
        ring.add_node("node-a", "http://127.0.0.1:9");
        // node-b is also down; the walk must reach node-c.
        ring.add_node("node-b", "http://127.0.0.1:9");
        ring.add_node("node-c", &url_c);
        let ring = Arc::new(ring);

        let state = Arc::new(FailoverState::new());
        let health = detector_for(vec![BrokerEndpoint {
            name: "node-a".to_string(),
            url: "http://127.0.0.1:9".to_string(),
        }]);

        let controller = FailoverController::with_timeout(
            ring,
            state.clone(),
            health,
            Duration::from_millis(500),
        );
        controller.handle_failure("node-a").await;

        assert_eq!(state.resolve("node-a").await, "node-c");
        assert!(store_c.is_promoted());
    }

    #[tokio::test]
    async fn test_no_candidate_means_degraded_not_promoted() {
        let mut ring = HashRing::new();
        ring.add_node("node-a", "http://127.0.0.1:9");
        ring.add_node("node-b", "http://127.0.0.1:9");
        let ring = Arc::new(ring);

        let state = Arc::new(FailoverState::new());
        let health = detector_for(vec![BrokerEndpoint {
            name: "node-a".to_string(),
            url: "http://127.0.0.1:9".to_string(),
        }]);

        let controller = FailoverController::with_timeout(
            ring,
            state.clone(),
            health.clone(),
            Duration::from_millis(300),
        );
        controller.handle_failure("node-a").await;

        // No override: writes for node-a keys will fail loudly at the router.
        assert!(!state.is_active().await);
        assert_eq!(state.total().await, 0);
        assert_ne!(health.record("node-a").unwrap().status, NodeStatus::FailedOver);
    }
}
