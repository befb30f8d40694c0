//! Coordinator Network Protocol
//!
//! Wire DTOs for the coordinator's public surface: the produce/consume data
//! path plus the read-only introspection endpoints.

use crate::broker::protocol::{ReplicationResult, Role};
use crate::failover::state::FailoverEvent;
use crate::health::types::HealthRecord;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashMap};

pub const SERVICE_NAME: &str = "ringmq-coordinator";

// --- API Endpoints ---

pub const ENDPOINT_PRODUCE: &str = "/produce";
pub const ENDPOINT_CONSUME: &str = "/consume";
pub const ENDPOINT_RING: &str = "/ring";
pub const ENDPOINT_ROUTE: &str = "/route";
pub const ENDPOINT_HEALTH_NODES: &str = "/health/nodes";
pub const ENDPOINT_FAILOVER_STATUS: &str = "/failover/status";
pub const ENDPOINT_HEALTH: &str = "/health";

// --- Data Transfer Objects ---

/// Client write request. Both fields are validated by the handler so their
/// absence yields a clean 400 rather than a deserialization error.
#[derive(Debug, Serialize, Deserialize)]
pub struct ProduceRequest {
    pub key: Option<String>,
    pub payload: Option<serde_json::Value>,
}

#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProduceResponse {
    pub success: bool,
    pub key: String,
    pub key_hash: u32,
    pub primary: String,
    pub replicas: Vec<String>,
    pub replication_results: Vec<ReplicationResult>,
}

#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ConsumeResponse {
    pub success: bool,
    pub key: String,
    pub payload: serde_json::Value,
    pub timestamp: DateTime<Utc>,
    /// Role of the entry on the broker that served it.
    pub role: Role,
    pub served_by: String,
    /// Whether the serving broker is the key's raw primary, before overrides.
    pub source: Role,
    /// True when any failover override is active at the time of the read.
    pub failover: bool,
}

#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RingNodeInfo {
    pub url: String,
    pub virtual_node_count: usize,
    /// Percentage of the hash space owned by this broker.
    pub ring_coverage: f64,
}

#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RingResponse {
    pub total_nodes: usize,
    pub virtual_node_count: usize,
    pub total_virtual_nodes: usize,
    pub hash_space: u64,
    pub nodes: BTreeMap<String, RingNodeInfo>,
}

#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RouteResponse {
    pub key: String,
    pub key_hash: u32,
    pub primary: String,
    pub primary_url: String,
    pub replicas: Vec<String>,
    pub replica_urls: Vec<String>,
    pub failover_active: bool,
}

#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FailoverStatusResponse {
    pub total_failovers: usize,
    pub active_promotions: HashMap<String, String>,
    pub events: Vec<FailoverEvent>,
}

#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CoordinatorHealthResponse {
    pub status: String,
    pub service: String,
    pub timestamp: DateTime<Utc>,
}

/// `/health/nodes` body: broker name to its probe record.
pub type HealthNodesResponse = BTreeMap<String, HealthRecord>;

#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CoordinatorErrorResponse {
    pub success: bool,
    pub error: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub key: Option<String>,
}

impl CoordinatorErrorResponse {
    pub fn new(error: impl Into<String>, key: Option<String>) -> Self {
        Self {
            success: false,
            error: error.into(),
            key,
        }
    }
}
