//! Failover Controller
//!
//! Reacts to health events: when a broker is declared FAILED, walks the broker
//! list clockwise from the failed node, probes candidates, and promotes the
//! first responsive one. The resulting override rewrites routing for every key
//! whose raw primary was the failed broker.
//!
//! Events are drained from a single channel by a single consumer, so two
//! failovers never run concurrently for the same broker.

use super::state::FailoverState;
use crate::broker::protocol::{ENDPOINT_HEALTH, ENDPOINT_PROMOTE};
use crate::health::detector::HealthDetector;
use crate::health::types::HealthEvent;
use crate::ring::ring::HashRing;

use std::sync::Arc;
use std::time::Duration;
use tokio::sync::mpsc;

pub const CANDIDATE_TIMEOUT: Duration = Duration::from_secs(2);

pub struct FailoverController {
    ring: Arc<HashRing>,
    state: Arc<FailoverState>,
    health: Arc<HealthDetector>,
    http_client: reqwest::Client,
    timeout: Duration,
}

impl FailoverController {
    pub fn new(
        ring: Arc<HashRing>,
        state: Arc<FailoverState>,
        health: Arc<HealthDetector>,
    ) -> Arc<Self> {
        Self::with_timeout(ring, state, health, CANDIDATE_TIMEOUT)
    }

    pub fn with_timeout(
        ring: Arc<HashRing>,
        state: Arc<FailoverState>,
        health: Arc<HealthDetector>,
        timeout: Duration,
    ) -> Arc<Self> {
        Arc::new(Self {
            ring,
            state,
            health,
            http_client: reqwest::Client::new(),
            timeout,
        })
    }

    /// Spawns the event consumer. Returns immediately; the consumer runs
    /// until the detector side of the channel is dropped.
    pub fn start(self: Arc<Self>, mut events: mpsc::Receiver<HealthEvent>) {
        tokio::spawn(async move {
            while let Some(event) = events.recv().await {
                match event {
                    HealthEvent::Failed(name) => self.handle_failure(&name).await,
                    HealthEvent::Recovered(name) => self.handle_recovery(&name).await,
                }
            }
            tracing::debug!("Failover controller exiting: event channel closed");
        });
    }

    /// Promotion protocol for one failed broker.
    pub async fn handle_failure(&self, failed_node: &str) {
        tracing::warn!("Failover: handling failure of {}", failed_node);

        let Some(candidate) = self.select_candidate(failed_node).await else {
            tracing::error!(
                "Failover: no responsive candidate for {}; cluster degraded for its keys",
                failed_node
            );
            return;
        };

        match self.promote(&candidate).await {
            Ok(()) => {
                self.state.record_promotion(failed_node, &candidate).await;
                self.health.mark_failed_over(failed_node);
                tracing::info!("Failover complete: {} -> {}", failed_node, candidate);
            }
            Err(e) => {
                // No override is inserted; the next failure event retries
                // candidate selection from scratch.
                tracing::error!("Failover: promoting {} failed: {}", candidate, e);
            }
        }
    }

    async fn handle_recovery(&self, node: &str) {
        // Overrides are retained on purpose: un-promoting during a flap risks
        // split-brain, and moving data back is an operator decision.
        tracing::info!(
            "Broker {} recovered; existing promotions stay in place",
            node
        );
    }

    /// Walks the broker list clockwise from the failed node's index and
    /// returns the first candidate whose `/health` answers within the timeout.
    async fn select_candidate(&self, failed_node: &str) -> Option<String> {
        let names = self.ring.node_names();
        let failed_idx = names.iter().position(|n| n == failed_node)?;

        for step in 1..names.len() {
            let candidate = &names[(failed_idx + step) % names.len()];
            let Some(url) = self.ring.node_url(candidate) else {
                continue;
            };

            if self.probe(url).await {
                tracing::info!("Failover: selected {} for {}", candidate, failed_node);
                return Some(candidate.clone());
            }
            tracing::debug!("Failover: candidate {} unresponsive, walking on", candidate);
        }

        None
    }

    async fn probe(&self, url: &str) -> bool {
        self.http_client
            .get(format!("{}{}", url, ENDPOINT_HEALTH))
            .timeout(self.timeout)
            .send()
            .await
            .map(|resp| resp.status().is_success())
            .unwrap_or(false)
    }

    async fn promote(&self, candidate: &str) -> anyhow::Result<()> {
        let url = self
            .ring
            .node_url(candidate)
            .ok_or_else(|| anyhow::anyhow!("candidate {} not in ring", candidate))?;

        let response = self
            .http_client
            .post(format!("{}{}", url, ENDPOINT_PROMOTE))
            .timeout(self.timeout)
            .send()
            .await?;

        if !response.status().is_success() {
            anyhow::bail!("promote returned {}", response.status());
        }
        Ok(())
    }
}
