use ringmq::config;
use ringmq::coordinator::handlers::coordinator_router;
use ringmq::coordinator::router::RequestRouter;
use ringmq::failover::controller::FailoverController;
use ringmq::failover::state::FailoverState;
use ringmq::health::detector::HealthDetector;
use ringmq::ring::ring::HashRing;

use std::net::SocketAddr;
use std::sync::Arc;
use tokio::sync::mpsc;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_max_level(tracing::Level::INFO)
        .init();

    let brokers = config::broker_nodes_from_env()?;
    let replication_factor = config::replication_factor_from_env();
    let virtual_nodes = config::virtual_nodes_from_env();
    let port = config::port_from_env(config::DEFAULT_COORDINATOR_PORT);

    // 1. Placement: the ring is built once from configuration and never
    //    mutated afterwards, so request handlers share it lock-free.
    let mut ring = HashRing::with_virtual_nodes(virtual_nodes);
    for broker in &brokers {
        ring.add_node(&broker.name, &broker.url);
    }
    let ring = Arc::new(ring);
    tracing::info!(
        "Ring initialized: {} brokers, {} virtual nodes each, replication factor {}",
        ring.node_count(),
        virtual_nodes,
        replication_factor
    );

    // 2. Failover state and the health -> failover event pipeline:
    let failover = Arc::new(FailoverState::new());
    let (event_tx, event_rx) = mpsc::channel(64);

    let health = HealthDetector::new(brokers.clone(), event_tx);
    let controller = FailoverController::new(ring.clone(), failover.clone(), health.clone());
    controller.start(event_rx);
    health.clone().start().await;

    // 3. Request routing + HTTP surface:
    let router = Arc::new(RequestRouter::new(
        ring.clone(),
        failover.clone(),
        replication_factor,
    ));
    let app = coordinator_router(router, ring, health.clone(), failover);

    let addr = SocketAddr::from(([0, 0, 0, 0], port));
    tracing::info!("Coordinator listening on {}", addr);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    // Probes stop before exit so no failover events fire during shutdown.
    health.stop().await;
    tracing::info!("Coordinator stopped");

    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!("Failed to listen for shutdown signal: {}", e);
    }
}
