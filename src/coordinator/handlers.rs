//! Coordinator API Handlers
//!
//! The coordinator's public HTTP surface: the produce/consume data path plus
//! read-only snapshots of the ring, routing, health, and failover state.
//! Handlers stay thin — they validate input, call into the router or the
//! owning component, and translate failures into the error taxonomy
//! (400 client input, 404 consume miss, 500 routing error, 503 primary
//! unreachable).

use super::protocol::*;
use super::router::RequestRouter;
use crate::failover::state::FailoverState;
use crate::health::detector::HealthDetector;
use crate::ring::ring::HashRing;

use axum::response::{IntoResponse, Response};
use axum::routing::{get, post};
use axum::{Extension, Json, Router, extract::Path, http::StatusCode};
use chrono::Utc;
use std::collections::BTreeMap;
use std::sync::Arc;

/// Builds the coordinator route table. Shared by the `coordinator` binary and
/// the integration tests.
pub fn coordinator_router(
    router: Arc<RequestRouter>,
    ring: Arc<HashRing>,
    health: Arc<HealthDetector>,
    failover: Arc<FailoverState>,
) -> Router {
    Router::new()
        .route(ENDPOINT_PRODUCE, post(handle_produce))
        .route(&format!("{}/:key", ENDPOINT_CONSUME), get(handle_consume))
        .route(ENDPOINT_RING, get(handle_ring))
        .route(&format!("{}/:key", ENDPOINT_ROUTE), get(handle_route))
        .route(ENDPOINT_HEALTH_NODES, get(handle_health_nodes))
        .route(ENDPOINT_FAILOVER_STATUS, get(handle_failover_status))
        .route(ENDPOINT_HEALTH, get(handle_health))
        .layer(Extension(router))
        .layer(Extension(ring))
        .layer(Extension(health))
        .layer(Extension(failover))
}

pub async fn handle_produce(
    Extension(router): Extension<Arc<RequestRouter>>,
    Json(req): Json<ProduceRequest>,
) -> Response {
    let (Some(key), Some(payload)) = (req.key, req.payload) else {
        return (
            StatusCode::BAD_REQUEST,
            Json(CoordinatorErrorResponse::new(
                "both key and payload are required",
                None,
            )),
        )
            .into_response();
    };
    if key.is_empty() {
        return (
            StatusCode::BAD_REQUEST,
            Json(CoordinatorErrorResponse::new("key must not be empty", Some(key))),
        )
            .into_response();
    }

    let route = match router.resolve(&key).await {
        Ok(route) => route,
        Err(e) => {
            tracing::error!("Routing failed for {}: {}", key, e);
            return (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(CoordinatorErrorResponse::new(e.to_string(), Some(key))),
            )
                .into_response();
        }
    };

    match router.dispatch_store(&route, &key, payload).await {
        Ok(store_response) => {
            tracing::info!(
                "Produced {} -> {} (replicas: {:?})",
                key,
                route.primary,
                route.replicas
            );
            (
                StatusCode::CREATED,
                Json(ProduceResponse {
                    success: true,
                    key,
                    key_hash: route.key_hash,
                    primary: route.primary,
                    replicas: route.replicas,
                    replication_results: store_response.replication_results,
                }),
            )
                .into_response()
        }
        Err(e) => {
            tracing::error!("Produce of {} failed at primary {}: {}", key, route.primary, e);
            (
                StatusCode::SERVICE_UNAVAILABLE,
                Json(CoordinatorErrorResponse::new(
                    format!("primary {} unreachable: {}", route.primary, e),
                    Some(key),
                )),
            )
                .into_response()
        }
    }
}

pub async fn handle_consume(
    Extension(router): Extension<Arc<RequestRouter>>,
    Path(key): Path<String>,
) -> Response {
    match router.consume(&key).await {
        Ok(Some(outcome)) => (
            StatusCode::OK,
            Json(ConsumeResponse {
                success: true,
                key,
                payload: outcome.entry.payload,
                timestamp: outcome.entry.timestamp,
                role: outcome.entry.role,
                served_by: outcome.served_by,
                source: outcome.source,
                failover: outcome.failover,
            }),
        )
            .into_response(),
        Ok(None) => (
            StatusCode::NOT_FOUND,
            Json(CoordinatorErrorResponse::new(
                "message not found on any broker",
                Some(key),
            )),
        )
            .into_response(),
        Err(e) => {
            tracing::error!("Consume routing failed for {}: {}", key, e);
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(CoordinatorErrorResponse::new(e.to_string(), Some(key))),
            )
                .into_response()
        }
    }
}

pub async fn handle_ring(Extension(ring): Extension<Arc<HashRing>>) -> Json<RingResponse> {
    let mut nodes = BTreeMap::new();
    for name in ring.node_names() {
        if let Some(broker) = ring.node(name) {
            nodes.insert(
                name.clone(),
                RingNodeInfo {
                    url: broker.url.clone(),
                    virtual_node_count: broker.virtual_positions.len(),
                    ring_coverage: (ring.coverage(name) * 100.0).round() / 100.0,
                },
            );
        }
    }

    Json(RingResponse {
        total_nodes: ring.node_count(),
        virtual_node_count: ring.virtual_nodes_per_broker(),
        total_virtual_nodes: ring.total_virtual_nodes(),
        hash_space: crate::ring::hash::HASH_SPACE,
        nodes,
    })
}

pub async fn handle_route(
    Extension(router): Extension<Arc<RequestRouter>>,
    Extension(ring): Extension<Arc<HashRing>>,
    Path(key): Path<String>,
) -> Response {
    match router.resolve(&key).await {
        Ok(route) => {
            let replica_urls = route
                .replicas
                .iter()
                .map(|name| ring.node_url(name).unwrap_or_default().to_string())
                .collect();
            (
                StatusCode::OK,
                Json(RouteResponse {
                    key,
                    key_hash: route.key_hash,
                    primary_url: ring.node_url(&route.primary).unwrap_or_default().to_string(),
                    primary: route.primary,
                    replicas: route.replicas,
                    replica_urls,
                    failover_active: route.failover_active,
                }),
            )
                .into_response()
        }
        Err(e) => (
            StatusCode::INTERNAL_SERVER_ERROR,
            Json(CoordinatorErrorResponse::new(e.to_string(), Some(key))),
        )
            .into_response(),
    }
}

pub async fn handle_health_nodes(
    Extension(health): Extension<Arc<HealthDetector>>,
) -> Json<HealthNodesResponse> {
    Json(health.snapshot())
}

pub async fn handle_failover_status(
    Extension(failover): Extension<Arc<FailoverState>>,
) -> Json<FailoverStatusResponse> {
    Json(FailoverStatusResponse {
        total_failovers: failover.total().await,
        active_promotions: failover.snapshot().await,
        events: failover.events().await,
    })
}

pub async fn handle_health() -> Json<CoordinatorHealthResponse> {
    Json(CoordinatorHealthResponse {
        status: "healthy".to_string(),
        service: SERVICE_NAME.to_string(),
        timestamp: Utc::now(),
    })
}
