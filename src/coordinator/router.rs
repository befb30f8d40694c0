use crate::broker::protocol::{
    ENDPOINT_FETCH, ENDPOINT_STORE, FetchResponse, ReplicaTarget, Role, StoreRequest,
    StoreResponse,
};
use crate::failover::state::FailoverState;
use crate::ring::ring::{HashRing, KeyPlacement};

use anyhow::Result;
use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

/// Upper bound on any outbound broker call made on the request path.
pub const REQUEST_TIMEOUT: Duration = Duration::from_secs(2);

/// Placement for one key after the override map has been applied.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedRoute {
    pub key_hash: u32,
    /// The ring's unmodified head for this key.
    pub raw_primary: String,
    /// Where writes actually go: `override[raw_primary]` or the raw primary.
    pub primary: String,
    /// Raw replicas mapped through overrides, deduplicated, primary removed.
    pub replicas: Vec<String>,
    /// Whether any override existed in the snapshot this route came from.
    pub failover_active: bool,
}

/// Maps a raw placement through an override snapshot (taken under a single
/// lock, so the whole route reflects one logical moment).
pub fn apply_overrides(
    placement: KeyPlacement,
    overrides: &HashMap<String, String>,
) -> ResolvedRoute {
    let primary = overrides
        .get(&placement.primary)
        .cloned()
        .unwrap_or_else(|| placement.primary.clone());

    let mut replicas = Vec::with_capacity(placement.replicas.len());
    for raw in &placement.replicas {
        let effective = overrides.get(raw).cloned().unwrap_or_else(|| raw.clone());
        if effective != primary && !replicas.contains(&effective) {
            replicas.push(effective);
        }
    }

    ResolvedRoute {
        key_hash: placement.key_hash,
        raw_primary: placement.primary,
        primary,
        replicas,
        failover_active: !overrides.is_empty(),
    }
}

/// What a successful consume found, and where.
#[derive(Debug)]
pub struct ConsumeOutcome {
    pub served_by: String,
    /// Primary iff the serving broker is the key's raw primary.
    pub source: Role,
    pub failover: bool,
    pub entry: FetchResponse,
}

/// Orchestrates the data path: resolves placement, drives the primary write
/// with replication fan-out, and walks replicas on reads.
pub struct RequestRouter {
    ring: Arc<HashRing>,
    failover: Arc<FailoverState>,
    replication_factor: usize,
    http_client: reqwest::Client,
    timeout: Duration,
}

impl RequestRouter {
    pub fn new(
        ring: Arc<HashRing>,
        failover: Arc<FailoverState>,
        replication_factor: usize,
    ) -> Self {
        Self::with_timeout(ring, failover, replication_factor, REQUEST_TIMEOUT)
    }

    pub fn with_timeout(
        ring: Arc<HashRing>,
        failover: Arc<FailoverState>,
        replication_factor: usize,
        timeout: Duration,
    ) -> Self {
        Self {
            ring,
            failover,
            replication_factor: replication_factor.max(1),
            http_client: reqwest::Client::new(),
            timeout,
        }
    }

    pub fn replication_factor(&self) -> usize {
        self.replication_factor
    }

    /// Effective placement for a key. Fails only when the ring is empty,
    /// which is a programmer error surfaced as a routing error.
    pub async fn resolve(&self, key: &str) -> Result<ResolvedRoute> {
        let placement = self.ring.nodes_for_key(key, self.replication_factor)?;
        let overrides = self.failover.snapshot().await;
        Ok(apply_overrides(placement, &overrides))
    }

    /// Single-attempt write against the effective primary. The primary fans
    /// out to the resolved replicas itself; its per-replica report is passed
    /// through untouched. Any transport or status failure here means the
    /// primary is unreachable — there is no retry at the coordinator.
    pub async fn dispatch_store(
        &self,
        route: &ResolvedRoute,
        key: &str,
        payload: serde_json::Value,
    ) -> Result<StoreResponse> {
        let url = self
            .ring
            .node_url(&route.primary)
            .ok_or_else(|| anyhow::anyhow!("no url registered for broker {}", route.primary))?;

        let replicate_to: Vec<ReplicaTarget> = route
            .replicas
            .iter()
            .filter_map(|name| {
                self.ring.node_url(name).map(|u| ReplicaTarget {
                    node: name.clone(),
                    url: u.to_string(),
                })
            })
            .collect();

        let response = self
            .http_client
            .post(format!("{}{}", url, ENDPOINT_STORE))
            .json(&StoreRequest {
                key: key.to_string(),
                payload,
                replicate_to,
            })
            .timeout(self.timeout)
            .send()
            .await?;

        if !response.status().is_success() {
            anyhow::bail!(
                "primary {} rejected the write with {}",
                route.primary,
                response.status()
            );
        }
        Ok(response.json::<StoreResponse>().await?)
    }

    /// Read with fallback: effective primary first, then the effective
    /// replicas in ring order. The first broker that answers with the entry
    /// wins; `Ok(None)` means every candidate failed or had no copy.
    pub async fn consume(&self, key: &str) -> Result<Option<ConsumeOutcome>> {
        let route = self.resolve(key).await?;

        let mut candidates = Vec::with_capacity(1 + route.replicas.len());
        candidates.push(route.primary.clone());
        candidates.extend(route.replicas.iter().cloned());

        for candidate in candidates {
            let Some(url) = self.ring.node_url(&candidate) else {
                continue;
            };

            let response = self
                .http_client
                .get(format!("{}{}/{}", url, ENDPOINT_FETCH, key))
                .timeout(self.timeout)
                .send()
                .await;

            match response {
                Ok(resp) if resp.status().is_success() => match resp.json::<FetchResponse>().await
                {
                    Ok(entry) => {
                        let source = if candidate == route.raw_primary {
                            Role::Primary
                        } else {
                            Role::Replica
                        };
                        return Ok(Some(ConsumeOutcome {
                            served_by: candidate,
                            source,
                            failover: route.failover_active,
                            entry,
                        }));
                    }
                    Err(e) => {
                        tracing::warn!("Malformed fetch body from {}: {}", candidate, e);
                    }
                },
                Ok(resp) => {
                    tracing::debug!("{} has no copy of {} ({})", candidate, key, resp.status());
                }
                Err(e) => {
                    tracing::debug!("Fetch from {} failed for {}: {}", candidate, key, e);
                }
            }
        }

        Ok(None)
    }
}
