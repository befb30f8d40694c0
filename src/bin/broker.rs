use ringmq::broker::handlers::broker_router;
use ringmq::broker::store::MessageStore;
use ringmq::config;

use std::net::SocketAddr;
use std::sync::Arc;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_max_level(tracing::Level::INFO)
        .init();

    let node_id = config::node_id_from_env()?;
    let port = config::port_from_env(config::DEFAULT_BROKER_PORT);

    let store = Arc::new(MessageStore::new(&node_id));
    let app = broker_router(store);

    let addr = SocketAddr::from(([0, 0, 0, 0], port));
    tracing::info!("Broker {} listening on {}", node_id, addr);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
