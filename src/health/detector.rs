use super::types::{HealthEvent, HealthRecord, NodeStatus};
use crate::broker::protocol::ENDPOINT_HEALTH;
use crate::config::BrokerEndpoint;

use dashmap::DashMap;
use std::collections::BTreeMap;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::{Mutex, mpsc};
use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;

pub const PROBE_INTERVAL: Duration = Duration::from_secs(5);
pub const FAILURE_THRESHOLD: u32 = 3;
pub const PROBE_TIMEOUT: Duration = Duration::from_secs(2);

pub struct HealthDetector {
    targets: Vec<BrokerEndpoint>,
    records: DashMap<String, HealthRecord>,
    events: mpsc::Sender<HealthEvent>,
    interval: Duration,
    threshold: u32,
    timeout: Duration,
    http_client: reqwest::Client,
    probe_task: Mutex<Option<JoinHandle<()>>>,
}

impl HealthDetector {
    pub fn new(targets: Vec<BrokerEndpoint>, events: mpsc::Sender<HealthEvent>) -> Arc<Self> {
        Self::with_params(
            targets,
            events,
            PROBE_INTERVAL,
            FAILURE_THRESHOLD,
            PROBE_TIMEOUT,
        )
    }

    pub fn with_params(
        targets: Vec<BrokerEndpoint>,
        events: mpsc::Sender<HealthEvent>,
        interval: Duration,
        threshold: u32,
        timeout: Duration,
    ) -> Arc<Self> {
        let records = DashMap::new();
        for target in &targets {
            records.insert(target.name.clone(), HealthRecord::new());
        }

        Arc::new(Self {
            targets,
            records,
            events,
            interval,
            threshold: threshold.max(1),
            timeout,
            http_client: reqwest::Client::new(),
            probe_task: Mutex::new(None),
        })
    }

    /// Spawns the periodic probe loop. One round probes every broker; events
    /// for the round are emitted only once the round completes. If a round
    /// overruns the interval, the next tick is skipped rather than queued.
    pub async fn start(self: Arc<Self>) {
        tracing::info!(
            "Health detector started: {} brokers, interval {:?}, threshold {}",
            self.targets.len(),
            self.interval,
            self.threshold
        );

        let detector = self.clone();
        let handle = tokio::spawn(async move {
            let mut interval = tokio::time::interval(detector.interval);
            interval.set_missed_tick_behavior(MissedTickBehavior::Skip);

            loop {
                interval.tick().await;
                detector.probe_round().await;
            }
        });

        *self.probe_task.lock().await = Some(handle);
    }

    /// Cancels the probe loop. The in-flight round is abandoned; no events
    /// are emitted afterwards.
    pub async fn stop(&self) {
        if let Some(handle) = self.probe_task.lock().await.take() {
            handle.abort();
            tracing::info!("Health detector stopped");
        }
    }

    async fn probe_round(&self) {
        let mut round_events = Vec::new();

        for target in &self.targets {
            let alive = self.probe(&target.url).await;

            if let Some(mut record) = self.records.get_mut(&target.name) {
                if alive {
                    if record.record_success() {
                        tracing::info!("Broker {} recovered", target.name);
                        round_events.push(HealthEvent::Recovered(target.name.clone()));
                    }
                } else if record.record_failure(self.threshold) {
                    tracing::warn!(
                        "Broker {} declared FAILED after {} consecutive probe failures",
                        target.name,
                        record.fail_count
                    );
                    round_events.push(HealthEvent::Failed(target.name.clone()));
                } else if record.status == NodeStatus::Healthy {
                    tracing::debug!(
                        "Probe failure {}/{} for {}",
                        record.fail_count,
                        self.threshold,
                        target.name
                    );
                }
            }
        }

        for event in round_events {
            if self.events.send(event).await.is_err() {
                tracing::warn!("Health event dropped: failover controller is gone");
            }
        }
    }

    async fn probe(&self, url: &str) -> bool {
        let response = self
            .http_client
            .get(format!("{}{}", url, ENDPOINT_HEALTH))
            .timeout(self.timeout)
            .send()
            .await;

        match response {
            Ok(resp) => resp.status().is_success(),
            Err(_) => false,
        }
    }

    /// External marker set by the failover controller once a replacement has
    /// been promoted for this broker.
    pub fn mark_failed_over(&self, name: &str) {
        if let Some(mut record) = self.records.get_mut(name) {
            record.status = NodeStatus::FailedOver;
        }
    }

    pub fn record(&self, name: &str) -> Option<HealthRecord> {
        self.records.get(name).map(|r| r.value().clone())
    }

    /// Point-in-time copy of every broker's record, for `/health/nodes`.
    pub fn snapshot(&self) -> BTreeMap<String, HealthRecord> {
        self.records
            .iter()
            .map(|entry| (entry.key().clone(), entry.value().clone()))
            .collect()
    }
}
