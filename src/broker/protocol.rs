//! Broker Network Protocol
//!
//! Defines the broker-side API endpoints and Data Transfer Objects used by the
//! coordinator (store, fetch, promote) and by peer brokers (replicate).
//!
//! These structures are serialized as JSON over HTTP. Field names follow the
//! external wire contract, hence the camelCase renames.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

// --- API Endpoints ---

/// Primary write path: store locally, then fan out to replicas.
pub const ENDPOINT_STORE: &str = "/store";
/// Replica write path, invoked by the primary during fan-out.
pub const ENDPOINT_REPLICATE: &str = "/replicate";
/// Read path for a single key.
pub const ENDPOINT_FETCH: &str = "/fetch";
/// Liveness probe consumed by the coordinator's health detector.
pub const ENDPOINT_HEALTH: &str = "/health";
/// Full dump of the local store, for inspection.
pub const ENDPOINT_MESSAGES: &str = "/messages";
/// Audit log readout.
pub const ENDPOINT_LOG: &str = "/log";
/// Failover promotion marker.
pub const ENDPOINT_PROMOTE: &str = "/promote";

// --- Data Transfer Objects ---

/// One replica destination for a primary write.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReplicaTarget {
    pub node: String,
    pub url: String,
}

/// Outcome of replicating one entry to one replica.
///
/// Replication failures are reported here rather than failing the write; a
/// degraded fan-out still acknowledges the primary copy.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReplicationResult {
    pub node: String,
    pub status: ReplicationStatus,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ReplicationStatus {
    Success,
    Failed,
}

/// Role a stored entry holds on this broker.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    Primary,
    Replica,
}

#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StoreRequest {
    pub key: String,
    pub payload: serde_json::Value,
    #[serde(default)]
    pub replicate_to: Vec<ReplicaTarget>,
}

#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StoreResponse {
    pub success: bool,
    pub node: String,
    pub role: Role,
    pub key: String,
    pub replicated_to: Vec<String>,
    pub replication_results: Vec<ReplicationResult>,
}

#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReplicateRequest {
    pub key: String,
    pub payload: serde_json::Value,
    pub primary_node: String,
}

#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReplicateResponse {
    pub success: bool,
    pub node: String,
    pub role: Role,
    pub key: String,
}

#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FetchResponse {
    pub success: bool,
    pub node: String,
    pub key: String,
    pub payload: serde_json::Value,
    pub timestamp: DateTime<Utc>,
    pub role: Role,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub replica_of: Option<String>,
}

#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BrokerHealthResponse {
    pub status: String,
    pub node: String,
    pub message_count: usize,
    pub timestamp: DateTime<Utc>,
}

/// Snapshot view of one stored entry, used by `/messages`.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MessageView {
    pub payload: serde_json::Value,
    pub timestamp: DateTime<Utc>,
    pub role: Role,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub replica_of: Option<String>,
}

#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MessagesResponse {
    pub node: String,
    pub message_count: usize,
    pub messages: BTreeMap<String, MessageView>,
}

/// Per-action counters over the audit log.
#[derive(Debug, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AuditSummary {
    pub stored_as_primary: usize,
    pub stored_as_replica: usize,
    pub promoted_to_primary: usize,
}

#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AuditLogResponse {
    pub node: String,
    pub summary: AuditSummary,
    pub stored_as_primary: Vec<AuditRecordView>,
    pub stored_as_replica: Vec<AuditRecordView>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AuditRecordView {
    pub id: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub key: Option<String>,
    pub timestamp: DateTime<Utc>,
}

#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PromoteResponse {
    pub success: bool,
    pub node: String,
    pub message: String,
}

/// Uniform failure body: a human-readable reason plus the offending key
/// where one applies.
#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BrokerErrorResponse {
    pub success: bool,
    pub error: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub key: Option<String>,
}
