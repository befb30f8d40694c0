use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use tokio::sync::RwLock;

/// One completed promotion, appended to the event log and never mutated.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FailoverEvent {
    pub id: String,
    pub failed_node: String,
    pub promoted_node: String,
    pub timestamp: DateTime<Utc>,
}

#[derive(Default)]
struct FailoverInner {
    /// failed broker -> promoted broker. Entries are inserted on promotion
    /// and never removed automatically; recovery keeps the new topology.
    overrides: HashMap<String, String>,
    events: Vec<FailoverEvent>,
}

/// The single source of post-failover routing truth.
///
/// The override map and event log sit behind one lock so every reader gets a
/// consistent snapshot: all overrides applied to a request are resolved from
/// the same logical moment. Callers must snapshot and release before doing
/// any outbound I/O.
pub struct FailoverState {
    inner: RwLock<FailoverInner>,
}

impl FailoverState {
    pub fn new() -> Self {
        Self {
            inner: RwLock::new(FailoverInner::default()),
        }
    }

    /// The effective broker for `name`: its promotion target if one exists,
    /// otherwise itself.
    pub async fn resolve(&self, name: &str) -> String {
        let inner = self.inner.read().await;
        inner
            .overrides
            .get(name)
            .cloned()
            .unwrap_or_else(|| name.to_string())
    }

    /// Copy of the full override map, taken under a single read lock.
    pub async fn snapshot(&self) -> HashMap<String, String> {
        self.inner.read().await.overrides.clone()
    }

    pub async fn is_active(&self) -> bool {
        !self.inner.read().await.overrides.is_empty()
    }

    pub async fn record_promotion(&self, failed_node: &str, promoted_node: &str) {
        let mut inner = self.inner.write().await;
        inner
            .overrides
            .insert(failed_node.to_string(), promoted_node.to_string());
        inner.events.push(FailoverEvent {
            id: uuid::Uuid::new_v4().to_string(),
            failed_node: failed_node.to_string(),
            promoted_node: promoted_node.to_string(),
            timestamp: Utc::now(),
        });
    }

    pub async fn total(&self) -> usize {
        self.inner.read().await.events.len()
    }

    pub async fn events(&self) -> Vec<FailoverEvent> {
        self.inner.read().await.events.clone()
    }
}

impl Default for FailoverState {
    fn default() -> Self {
        Self::new()
    }
}
