use super::protocol::{
    AuditRecordView, AuditSummary, ENDPOINT_REPLICATE, MessageView, ReplicaTarget,
    ReplicateRequest, ReplicationResult, ReplicationStatus, Role,
};
use chrono::{DateTime, Utc};
use dashmap::DashMap;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;
use tokio::sync::RwLock;

/// Upper bound on one replicate call to a peer broker.
pub const REPLICATION_TIMEOUT: Duration = Duration::from_secs(2);

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MessageEntry {
    pub payload: serde_json::Value,
    pub timestamp: DateTime<Utc>,
    pub role: Role,
    pub replica_of: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AuditAction {
    StoredAsPrimary,
    StoredAsReplica,
    PromotedToPrimary,
}

#[derive(Debug, Clone)]
pub struct AuditRecord {
    pub id: String,
    pub action: AuditAction,
    pub key: Option<String>,
    pub timestamp: DateTime<Utc>,
}

impl AuditRecord {
    fn new(action: AuditAction, key: Option<String>) -> Self {
        Self {
            id: uuid::Uuid::new_v4().to_string(),
            action,
            key,
            timestamp: Utc::now(),
        }
    }
}

/// Per-node in-memory keyed store.
///
/// Writes to the same key are last-writer-wins by arrival order on this node;
/// no cross-broker ordering is enforced. Every mutation appends to the local
/// audit log.
pub struct MessageStore {
    node_id: String,
    messages: DashMap<String, MessageEntry>,
    audit: RwLock<Vec<AuditRecord>>,
    promoted: AtomicBool,
    http_client: reqwest::Client,
    replication_timeout: Duration,
}

impl MessageStore {
    pub fn new(node_id: &str) -> Self {
        Self::with_replication_timeout(node_id, REPLICATION_TIMEOUT)
    }

    pub fn with_replication_timeout(node_id: &str, replication_timeout: Duration) -> Self {
        Self {
            node_id: node_id.to_string(),
            messages: DashMap::new(),
            audit: RwLock::new(Vec::new()),
            promoted: AtomicBool::new(false),
            http_client: reqwest::Client::new(),
            replication_timeout,
        }
    }

    pub fn node_id(&self) -> &str {
        &self.node_id
    }

    /// PRIMARY write path: stores locally, then fans out to each replica in
    /// order. A replica failure is recorded in the result set; it neither
    /// rolls back the local write nor fails the operation.
    pub async fn store(
        &self,
        key: &str,
        payload: serde_json::Value,
        replicate_to: &[ReplicaTarget],
    ) -> Vec<ReplicationResult> {
        self.messages.insert(
            key.to_string(),
            MessageEntry {
                payload: payload.clone(),
                timestamp: Utc::now(),
                role: Role::Primary,
                replica_of: None,
            },
        );
        self.append_audit(AuditAction::StoredAsPrimary, Some(key.to_string()))
            .await;

        let mut results = Vec::with_capacity(replicate_to.len());
        for target in replicate_to {
            match self.replicate_to_peer(target, key, &payload).await {
                Ok(()) => {
                    tracing::debug!("Replicated {} to {}", key, target.node);
                    results.push(ReplicationResult {
                        node: target.node.clone(),
                        status: ReplicationStatus::Success,
                        error: None,
                    });
                }
                Err(e) => {
                    tracing::warn!("Replication of {} to {} failed: {}", key, target.node, e);
                    results.push(ReplicationResult {
                        node: target.node.clone(),
                        status: ReplicationStatus::Failed,
                        error: Some(e.to_string()),
                    });
                }
            }
        }

        results
    }

    async fn replicate_to_peer(
        &self,
        target: &ReplicaTarget,
        key: &str,
        payload: &serde_json::Value,
    ) -> anyhow::Result<()> {
        let request = ReplicateRequest {
            key: key.to_string(),
            payload: payload.clone(),
            primary_node: self.node_id.clone(),
        };
        let response = self
            .http_client
            .post(format!("{}{}", target.url, ENDPOINT_REPLICATE))
            .json(&request)
            .timeout(self.replication_timeout)
            .send()
            .await?;

        if !response.status().is_success() {
            anyhow::bail!("replica returned {}", response.status());
        }
        Ok(())
    }

    /// REPLICA write path: stores the copy pushed by a primary.
    pub async fn store_replica(&self, key: &str, payload: serde_json::Value, primary_node: &str) {
        self.messages.insert(
            key.to_string(),
            MessageEntry {
                payload,
                timestamp: Utc::now(),
                role: Role::Replica,
                replica_of: Some(primary_node.to_string()),
            },
        );
        self.append_audit(AuditAction::StoredAsReplica, Some(key.to_string()))
            .await;
    }

    pub fn fetch(&self, key: &str) -> Option<MessageEntry> {
        self.messages.get(key).map(|entry| entry.value().clone())
    }

    /// Marks this node as a writable primary after coordinator-driven
    /// failover. Existing replica entries remain; future primary writes
    /// routed here are accepted like any other.
    pub async fn promote(&self) {
        self.promoted.store(true, Ordering::SeqCst);
        self.append_audit(AuditAction::PromotedToPrimary, None).await;
        tracing::info!("Node {} promoted to primary", self.node_id);
    }

    pub fn is_promoted(&self) -> bool {
        self.promoted.load(Ordering::SeqCst)
    }

    pub fn message_count(&self) -> usize {
        self.messages.len()
    }

    pub fn messages_snapshot(&self) -> BTreeMap<String, MessageView> {
        self.messages
            .iter()
            .map(|entry| {
                (
                    entry.key().clone(),
                    MessageView {
                        payload: entry.value().payload.clone(),
                        timestamp: entry.value().timestamp,
                        role: entry.value().role,
                        replica_of: entry.value().replica_of.clone(),
                    },
                )
            })
            .collect()
    }

    pub async fn audit_summary(&self) -> AuditSummary {
        let audit = self.audit.read().await;
        let mut summary = AuditSummary::default();
        for record in audit.iter() {
            match record.action {
                AuditAction::StoredAsPrimary => summary.stored_as_primary += 1,
                AuditAction::StoredAsReplica => summary.stored_as_replica += 1,
                AuditAction::PromotedToPrimary => summary.promoted_to_primary += 1,
            }
        }
        summary
    }

    pub async fn audit_records(&self, action: AuditAction) -> Vec<AuditRecordView> {
        let audit = self.audit.read().await;
        audit
            .iter()
            .filter(|record| record.action == action)
            .map(|record| AuditRecordView {
                id: record.id.clone(),
                key: record.key.clone(),
                timestamp: record.timestamp,
            })
            .collect()
    }

    async fn append_audit(&self, action: AuditAction, key: Option<String>) {
        let mut audit = self.audit.write().await;
        audit.push(AuditRecord::new(action, key));
    }
}
