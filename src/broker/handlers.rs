//! Broker API Handlers
//!
//! HTTP endpoints that expose the `MessageStore` to the coordinator and to
//! peer brokers. These handlers translate requests into store calls and wrap
//! the results in the wire DTOs from `protocol.rs`.

use super::protocol::*;
use super::store::{AuditAction, MessageStore};

use axum::response::{IntoResponse, Response};
use axum::routing::{get, post};
use axum::{Extension, Json, Router, extract::Path, http::StatusCode};
use chrono::Utc;
use std::sync::Arc;

/// Builds the full broker route table. Shared by the `broker` binary and the
/// integration tests, which spawn the same surface on an ephemeral port.
pub fn broker_router(store: Arc<MessageStore>) -> Router {
    Router::new()
        .route(ENDPOINT_STORE, post(handle_store))
        .route(ENDPOINT_REPLICATE, post(handle_replicate))
        .route(&format!("{}/:key", ENDPOINT_FETCH), get(handle_fetch))
        .route(ENDPOINT_HEALTH, get(handle_health))
        .route(ENDPOINT_MESSAGES, get(handle_messages))
        .route(ENDPOINT_LOG, get(handle_log))
        .route(ENDPOINT_PROMOTE, post(handle_promote))
        .layer(Extension(store))
}

/// Primary write. Stores locally, fans out to the listed replicas, and
/// reports the per-replica outcome without failing on degraded replication.
pub async fn handle_store(
    Extension(store): Extension<Arc<MessageStore>>,
    Json(req): Json<StoreRequest>,
) -> Response {
    if req.key.is_empty() {
        return (
            StatusCode::BAD_REQUEST,
            Json(BrokerErrorResponse {
                success: false,
                error: "key must not be empty".to_string(),
                key: None,
            }),
        )
            .into_response();
    }

    let results = store.store(&req.key, req.payload, &req.replicate_to).await;
    let replicated_to = results
        .iter()
        .filter(|r| r.status == ReplicationStatus::Success)
        .map(|r| r.node.clone())
        .collect();

    (
        StatusCode::CREATED,
        Json(StoreResponse {
            success: true,
            node: store.node_id().to_string(),
            role: Role::Primary,
            key: req.key,
            replicated_to,
            replication_results: results,
        }),
    )
        .into_response()
}

/// Replica write, invoked by a primary during fan-out.
pub async fn handle_replicate(
    Extension(store): Extension<Arc<MessageStore>>,
    Json(req): Json<ReplicateRequest>,
) -> (StatusCode, Json<ReplicateResponse>) {
    store
        .store_replica(&req.key, req.payload, &req.primary_node)
        .await;

    (
        StatusCode::OK,
        Json(ReplicateResponse {
            success: true,
            node: store.node_id().to_string(),
            role: Role::Replica,
            key: req.key,
        }),
    )
}

pub async fn handle_fetch(
    Extension(store): Extension<Arc<MessageStore>>,
    Path(key): Path<String>,
) -> Response {
    match store.fetch(&key) {
        Some(entry) => (
            StatusCode::OK,
            Json(FetchResponse {
                success: true,
                node: store.node_id().to_string(),
                key,
                payload: entry.payload,
                timestamp: entry.timestamp,
                role: entry.role,
                replica_of: entry.replica_of,
            }),
        )
            .into_response(),
        None => (
            StatusCode::NOT_FOUND,
            Json(BrokerErrorResponse {
                success: false,
                error: "message not found".to_string(),
                key: Some(key),
            }),
        )
            .into_response(),
    }
}

pub async fn handle_health(
    Extension(store): Extension<Arc<MessageStore>>,
) -> Json<BrokerHealthResponse> {
    Json(BrokerHealthResponse {
        status: "healthy".to_string(),
        node: store.node_id().to_string(),
        message_count: store.message_count(),
        timestamp: Utc::now(),
    })
}

pub async fn handle_messages(
    Extension(store): Extension<Arc<MessageStore>>,
) -> Json<MessagesResponse> {
    let messages = store.messages_snapshot();
    Json(MessagesResponse {
        node: store.node_id().to_string(),
        message_count: messages.len(),
        messages,
    })
}

pub async fn handle_log(Extension(store): Extension<Arc<MessageStore>>) -> Json<AuditLogResponse> {
    Json(AuditLogResponse {
        node: store.node_id().to_string(),
        summary: store.audit_summary().await,
        stored_as_primary: store.audit_records(AuditAction::StoredAsPrimary).await,
        stored_as_replica: store.audit_records(AuditAction::StoredAsReplica).await,
    })
}

pub async fn handle_promote(
    Extension(store): Extension<Arc<MessageStore>>,
) -> (StatusCode, Json<PromoteResponse>) {
    store.promote().await;

    (
        StatusCode::OK,
        Json(PromoteResponse {
            success: true,
            node: store.node_id().to_string(),
            message: format!("{} now accepts primary writes", store.node_id()),
        }),
    )
}
